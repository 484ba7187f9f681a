//! Controller behind the results screen.
//!
//! Wires user actions to the [`ResultStore`], keeps a [`ResultList`] in sync
//! with what the store returned, and reports every outcome through the
//! injected [`Ui`]. Remote failures stop here: they become an error message
//! or a notice and never propagate to the caller.
//!
//! Mutations patch the local list optimistically from the store's response
//! instead of reloading. The list can therefore drift from the server (for
//! example when another client deletes a result) until the next
//! [`ResultsView::load_results`].

use labres_storage::{Lab, LabDirectory, LabResult, NewResult, ResultStore};

use crate::labels::{self, LabLabel};
use crate::list::ResultList;
use crate::status::{self, DEFAULT_STATUS, STATUS_OPTIONS};
use crate::ui::{Modal, Outcome, Ui};

const MSG_MISSING_FIELDS: &str = "Por favor, complete todos los campos requeridos.";
const MSG_CONFIRM_DELETE: &str = "¿Estás seguro de que deseas eliminar este resultado?";
const MSG_CREATED: &str = "Resultado creado exitosamente";
const MSG_DELETED: &str = "Resultado eliminado exitosamente";
const MSG_STATUS_UPDATED: &str = "Estado actualizado exitosamente";

/// Form state for a result being created. Fields hold raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDraft {
    pub lab_id: String,
    pub nif: String,
    pub patient_name: String,
    pub data: String,
    pub status: String,
}

impl Default for ResultDraft {
    fn default() -> Self {
        Self {
            lab_id: String::new(),
            nif: String::new(),
            patient_name: String::new(),
            data: String::new(),
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

impl ResultDraft {
    /// Build the creation payload, or `None` if a required field is blank
    /// or the lab id is not an integer. Text fields are trimmed.
    pub fn to_new_result(&self, date_ms: i64) -> Option<NewResult> {
        let nif = self.nif.trim();
        let patient_name = self.patient_name.trim();
        let data = self.data.trim();
        if nif.is_empty() || patient_name.is_empty() || data.is_empty() {
            return None;
        }
        let lab_id = self.lab_id.trim().parse::<i64>().ok()?;
        Some(NewResult {
            lab_id,
            nif: nif.to_string(),
            patient_name: patient_name.to_string(),
            data: data.to_string(),
            status: self.status.clone(),
            date: date_ms,
        })
    }
}

pub struct ResultsView<S, D, U> {
    store: S,
    directory: D,
    ui: U,
    list: ResultList,
    labs: Vec<Lab>,
    selected: Option<LabResult>,
    draft: ResultDraft,
    creating: bool,
}

impl<S, D, U> ResultsView<S, D, U>
where
    S: ResultStore,
    D: LabDirectory,
    U: Ui,
{
    pub fn new(store: S, directory: D, ui: U, page_size: usize) -> Self {
        Self {
            store,
            directory,
            ui,
            list: ResultList::new(page_size),
            labs: Vec::new(),
            selected: None,
            draft: ResultDraft::default(),
            creating: false,
        }
    }

    /// Load results, then labs.
    pub async fn init(&mut self) {
        self.load_results().await;
        self.load_labs().await;
    }

    /// Replace the list with the store's current contents.
    ///
    /// On failure the previous list is kept and [`ResultList::error`] is set.
    pub async fn load_results(&mut self) -> Outcome {
        self.list.set_loading(true);
        self.list.clear_error();

        let outcome = match self.store.list_all().await {
            Ok(results) => {
                tracing::info!(count = results.len(), "results loaded");
                self.list.load(results);
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading results");
                self.list.set_error(format!(
                    "Error al cargar los resultados: {}",
                    e.user_message()
                ));
                Outcome::Failed
            }
        };

        self.list.set_loading(false);
        outcome
    }

    /// Refresh the lab directory used for labels. Failures are only logged.
    pub async fn load_labs(&mut self) -> Outcome {
        match self.directory.list_all().await {
            Ok(labs) => {
                tracing::info!(count = labs.len(), "labs loaded");
                self.labs = labs;
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading labs");
                Outcome::Failed
            }
        }
    }

    pub fn change_page(&mut self, page: usize) -> bool {
        self.list.change_page(page)
    }

    pub fn page(&self) -> &[LabResult] {
        self.list.page()
    }

    /// Select result `id` and open the detail modal. Unknown ids are ignored.
    pub fn show_result_detail(&mut self, id: i64) {
        if let Some(result) = self.list.find(id) {
            self.selected = Some(result.clone());
            self.ui.show_modal(Modal::ResultDetail);
        }
    }

    /// Reset the create form and open its modal.
    pub fn show_create_form(&mut self) {
        self.draft = ResultDraft::default();
        self.ui.show_modal(Modal::CreateResult);
    }

    pub fn draft_mut(&mut self) -> &mut ResultDraft {
        &mut self.draft
    }

    /// Submit the create form.
    ///
    /// The new result is prepended to the list without changing the
    /// current page.
    pub async fn create_result(&mut self) -> Outcome {
        let Some(new_result) = self.draft.to_new_result(now_ms()) else {
            self.ui.notify(MSG_MISSING_FIELDS);
            return Outcome::Rejected;
        };

        self.creating = true;
        match self.store.create(new_result).await {
            Ok(created) => {
                tracing::debug!(id = created.id, "result created");
                self.list.insert_created(created);
                self.creating = false;
                self.ui.hide_modal(Modal::CreateResult);
                self.ui.notify(MSG_CREATED);
                Outcome::Applied
            }
            Err(e) => {
                self.creating = false;
                tracing::error!(error = %e, "error creating result");
                self.ui.notify(&format!(
                    "Error al crear el resultado: {}",
                    e.user_message()
                ));
                Outcome::Failed
            }
        }
    }

    /// Delete result `id` after the user confirms.
    pub async fn delete_result(&mut self, id: i64) -> Outcome {
        if !self.ui.confirm(MSG_CONFIRM_DELETE) {
            return Outcome::Cancelled;
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.list.remove_by_id(id);
                self.ui.notify(MSG_DELETED);
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(id, error = %e, "error deleting result");
                self.ui.notify(&format!(
                    "Error al eliminar el resultado: {}",
                    e.user_message()
                ));
                Outcome::Failed
            }
        }
    }

    /// Change the status of result `id`.
    ///
    /// If the result is no longer in the local list the store's response is
    /// dropped; the call still counts as applied.
    pub async fn update_result_status(&mut self, id: i64, status: &str) -> Outcome {
        match self.store.update_status(id, status).await {
            Ok(updated) => {
                self.list.patch_status(id, updated);
                self.ui.notify(MSG_STATUS_UPDATED);
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(id, error = %e, "error updating status");
                self.ui.notify(&format!(
                    "Error al actualizar el estado: {}",
                    e.user_message()
                ));
                Outcome::Failed
            }
        }
    }

    // ── Display helpers ──────────────────────────────────────────────────────

    pub fn lab_name(&self, lab_id: i64) -> &str {
        labels::label_for(lab_id, &self.labs, LabLabel::Name)
    }

    pub fn lab_key_name(&self, lab_id: i64) -> &str {
        labels::label_for(lab_id, &self.labs, LabLabel::KeyName)
    }

    pub fn status_badge_class(&self, status: &str) -> &'static str {
        status::status_badge_class(status)
    }

    pub fn status_options(&self) -> &'static [&'static str] {
        &STATUS_OPTIONS
    }

    pub fn format_date(&self, timestamp_ms: i64) -> String {
        labels::format_date(timestamp_ms)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn list(&self) -> &ResultList {
        &self.list
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn selected(&self) -> Option<&LabResult> {
        self.selected.as_ref()
    }

    pub fn draft(&self) -> &ResultDraft {
        &self.draft
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }
}

fn now_ms() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}
