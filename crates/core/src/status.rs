//! Status labels and their badge styles.
//!
//! Statuses arrive as free-form strings. Classification lowercases the
//! label and matches it exactly against the known set; anything else falls
//! into [`StatusBadge::Secondary`].

/// Status labels offered when creating or updating a result.
pub const STATUS_OPTIONS: [&str; 4] = ["Pendiente", "En Proceso", "Finalizado", "Crítico"];

/// Status given to a result created without an explicit one.
pub const DEFAULT_STATUS: &str = "Pendiente";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBadge {
    Success,
    Warning,
    Danger,
    Info,
    Secondary,
}

impl StatusBadge {
    pub fn classify(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "finalizado" => StatusBadge::Success,
            "pendiente" => StatusBadge::Warning,
            "crítico" | "critico" => StatusBadge::Danger,
            "en proceso" => StatusBadge::Info,
            _ => StatusBadge::Secondary,
        }
    }

    /// Bootstrap badge classes for this bucket.
    pub fn css_class(self) -> &'static str {
        match self {
            StatusBadge::Success => "bg-success",
            StatusBadge::Warning => "bg-warning text-dark",
            StatusBadge::Danger => "bg-danger",
            StatusBadge::Info => "bg-info text-dark",
            StatusBadge::Secondary => "bg-secondary",
        }
    }
}

/// Badge classes for a free-form status string. Never fails.
pub fn status_badge_class(status: &str) -> &'static str {
    StatusBadge::classify(status).css_class()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_their_buckets() {
        assert_eq!(status_badge_class("Finalizado"), "bg-success");
        assert_eq!(status_badge_class("Pendiente"), "bg-warning text-dark");
        assert_eq!(status_badge_class("Crítico"), "bg-danger");
        assert_eq!(status_badge_class("critico"), "bg-danger");
        assert_eq!(status_badge_class("En Proceso"), "bg-info text-dark");
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(
            status_badge_class("FINALIZADO"),
            status_badge_class("finalizado")
        );
        assert_eq!(StatusBadge::classify("CRÍTICO"), StatusBadge::Danger);
        assert_eq!(StatusBadge::classify("eN pRoCeSo"), StatusBadge::Info);
    }

    #[test]
    fn unknown_statuses_default_to_secondary() {
        for status in ["", "completed", "in_progress", " pendiente", "Finalizado."] {
            assert_eq!(status_badge_class(status), "bg-secondary", "{status:?}");
        }
    }

    #[test]
    fn every_option_has_a_specific_badge() {
        for option in STATUS_OPTIONS {
            assert_ne!(StatusBadge::classify(option), StatusBadge::Secondary);
        }
        assert!(STATUS_OPTIONS.contains(&DEFAULT_STATUS));
    }
}
