//! The user-facing side effects a view controller needs.
//!
//! Controllers never talk to a terminal or a window directly; they ask a
//! [`Ui`] to confirm, to show a one-shot notice, or to open and close a
//! modal. This keeps the controllers testable with [`RecordingUi`].

use std::fmt;
use std::sync::Mutex;

/// Modals the results view opens and closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    ResultDetail,
    CreateResult,
}

impl fmt::Display for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modal::ResultDetail => write!(f, "resultDetailModal"),
            Modal::CreateResult => write!(f, "createResultModal"),
        }
    }
}

pub trait Ui: Send + Sync {
    /// Ask the user to confirm `message`. `false` cancels the action.
    fn confirm(&self, message: &str) -> bool;

    /// Show a one-shot notice.
    fn notify(&self, message: &str);

    fn show_modal(&self, modal: Modal);

    fn hide_modal(&self, modal: Modal);
}

/// What happened to a user action.
///
/// Remote failures are already reported through the [`Ui`] or the view's
/// error state by the time a caller sees [`Outcome::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote call succeeded and local state was updated.
    Applied,
    /// The user declined the confirmation.
    Cancelled,
    /// Local validation failed; nothing was sent.
    Rejected,
    /// The remote call failed; local state is unchanged.
    Failed,
}

/// A single interaction recorded by [`RecordingUi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Confirm(String),
    Notify(String),
    ShowModal(Modal),
    HideModal(Modal),
}

/// A [`Ui`] that records every interaction and answers confirmations with
/// a fixed reply.
#[derive(Debug)]
pub struct RecordingUi {
    confirm_reply: bool,
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new(confirm_reply: bool) -> Self {
        Self {
            confirm_reply,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        // Recover data even if mutex was poisoned by a panic in another thread
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages passed to [`Ui::notify`], in order.
    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notify(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: UiEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl Ui for RecordingUi {
    fn confirm(&self, message: &str) -> bool {
        self.record(UiEvent::Confirm(message.to_string()));
        self.confirm_reply
    }

    fn notify(&self, message: &str) {
        self.record(UiEvent::Notify(message.to_string()));
    }

    fn show_modal(&self, modal: Modal) {
        self.record(UiEvent::ShowModal(modal));
    }

    fn hide_modal(&self, modal: Modal) {
        self.record(UiEvent::HideModal(modal));
    }
}
