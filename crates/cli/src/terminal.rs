//! [`Ui`] for an interactive terminal.

use std::io::{BufRead, Write};

use labres_core::{Modal, Ui};

/// Prompts on stderr and reads answers from stdin.
///
/// With `assume_yes`, confirmations are granted without prompting. With
/// `quiet`, notices are suppressed.
pub struct TerminalUi {
    assume_yes: bool,
    quiet: bool,
}

impl TerminalUi {
    pub fn new(assume_yes: bool, quiet: bool) -> Self {
        TerminalUi { assume_yes, quiet }
    }
}

impl Ui for TerminalUi {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [s/N] ", message);
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input).is_err() {
            return false;
        }
        is_affirmative(&input)
    }

    fn notify(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }

    fn show_modal(&self, modal: Modal) {
        tracing::debug!(%modal, "show modal");
    }

    fn hide_modal(&self, modal: Modal) {
        tracing::debug!(%modal, "hide modal");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "yes" | "y" | "s" | "si" | "sí"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        for answer in ["yes\n", "Y\n", "s", "SI\n", "sí\n", "  y  "] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["", "\n", "no", "n", "nope", "yess"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let ui = TerminalUi::new(true, false);
        assert!(ui.confirm("¿Borrar?"));
    }
}
