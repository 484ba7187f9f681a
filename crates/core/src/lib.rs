//! labres-core: client-side state for the lab results front-end.
//!
//! - [`ResultList`] -- paginated in-memory cache of results
//! - [`ResultsView`] / [`LabsView`] -- controllers binding user actions to
//!   the remote stores
//! - [`Ui`] -- confirmation, notices and modals, injected into controllers
//! - display helpers: [`status_badge_class`], [`label_for`], [`format_date`]

pub mod labels;
pub mod labs_view;
pub mod list;
pub mod results_view;
pub mod status;
pub mod ui;

pub use labels::{format_date, label_for, LabLabel, INVALID_DATE, UNKNOWN_LAB};
pub use labs_view::{FormMode, LabsView};
pub use list::{ResultList, DEFAULT_PAGE_SIZE};
pub use results_view::{ResultDraft, ResultsView};
pub use status::{status_badge_class, StatusBadge, DEFAULT_STATUS, STATUS_OPTIONS};
pub use ui::{Modal, Outcome, RecordingUi, Ui, UiEvent};
