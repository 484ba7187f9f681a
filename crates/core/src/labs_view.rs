//! Controller behind the labs screen.
//!
//! Unlike [`ResultsView`](crate::ResultsView), every successful mutation
//! here is followed by a full reload of the directory rather than a local
//! patch, so the list always reflects the server after a save or delete.

use labres_storage::{Lab, LabDirectory, LabParams};

use crate::ui::{Outcome, Ui};

const MSG_LOAD_FAILED: &str = "Error al cargar los laboratorios";
const MSG_CREATE_FAILED: &str = "Error al crear el laboratorio";
const MSG_UPDATE_FAILED: &str = "Error al actualizar el laboratorio";
const MSG_DELETE_FAILED: &str = "Error al eliminar el laboratorio";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Creating,
    Editing(Lab),
}

pub struct LabsView<D, U> {
    directory: D,
    ui: U,
    labs: Vec<Lab>,
    loading: bool,
    error: Option<String>,
    mode: FormMode,
    form: LabParams,
}

impl<D, U> LabsView<D, U>
where
    D: LabDirectory,
    U: Ui,
{
    pub fn new(directory: D, ui: U) -> Self {
        Self {
            directory,
            ui,
            labs: Vec::new(),
            loading: false,
            error: None,
            mode: FormMode::Closed,
            form: LabParams::default(),
        }
    }

    pub async fn load_labs(&mut self) -> Outcome {
        self.loading = true;
        self.error = None;

        let outcome = match self.directory.list_all().await {
            Ok(labs) => {
                tracing::info!(count = labs.len(), "labs loaded");
                self.labs = labs;
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading labs");
                self.error = Some(MSG_LOAD_FAILED.to_string());
                Outcome::Failed
            }
        };

        self.loading = false;
        outcome
    }

    pub fn open_create_form(&mut self) {
        self.mode = FormMode::Creating;
        self.form = LabParams::default();
    }

    /// Open the form pre-filled with `lab`'s current values.
    pub fn open_edit_form(&mut self, lab: Lab) {
        self.form = LabParams {
            key_name: lab.key_name.clone(),
            name: lab.name.clone(),
            description: lab.description.clone(),
        };
        self.mode = FormMode::Editing(lab);
    }

    pub fn close_form(&mut self) {
        self.mode = FormMode::Closed;
        self.form = LabParams::default();
    }

    pub fn form_mut(&mut self) -> &mut LabParams {
        &mut self.form
    }

    /// Create or update, depending on how the form was opened.
    ///
    /// All three fields are required; a blank one makes this a no-op.
    /// On success the directory is reloaded and the form closed.
    pub async fn save_lab(&mut self) -> Outcome {
        if self.form.key_name.is_empty()
            || self.form.name.is_empty()
            || self.form.description.is_empty()
        {
            return Outcome::Rejected;
        }

        let params = self.form.clone();
        let result = match &self.mode {
            FormMode::Editing(lab) => self
                .directory
                .update(&lab.ulid, params)
                .await
                .map_err(|e| (MSG_UPDATE_FAILED, e)),
            FormMode::Creating | FormMode::Closed => self
                .directory
                .create(params)
                .await
                .map_err(|e| (MSG_CREATE_FAILED, e)),
        };

        match result {
            Ok(lab) => {
                tracing::debug!(id = lab.id, key_name = %lab.key_name, "lab saved");
                self.load_labs().await;
                self.close_form();
                Outcome::Applied
            }
            Err((message, e)) => {
                tracing::error!(error = %e, "{message}");
                self.error = Some(message.to_string());
                Outcome::Failed
            }
        }
    }

    /// Delete `lab` after the user confirms, then reload.
    pub async fn delete_lab(&mut self, lab: &Lab) -> Outcome {
        let prompt = format!(
            "¿Está seguro de que desea eliminar el laboratorio \"{}\"?",
            lab.name
        );
        if !self.ui.confirm(&prompt) {
            return Outcome::Cancelled;
        }

        match self.directory.delete(lab.id).await {
            Ok(()) => {
                self.load_labs().await;
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(id = lab.id, error = %e, "error deleting lab");
                self.error = Some(MSG_DELETE_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &LabParams {
        &self.form
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RecordingUi, UiEvent};
    use labres_storage::{MemoryLabDirectory, StoreError};

    fn params(key: &str, name: &str, description: &str) -> LabParams {
        LabParams {
            key_name: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    fn view(confirm: bool) -> LabsView<MemoryLabDirectory, RecordingUi> {
        LabsView::new(
            MemoryLabDirectory::with_labs(vec![
                params(
                    "LAB-CLI-01",
                    "Laboratorio Clínico General",
                    "Laboratorio para análisis clínicos generales",
                ),
                params(
                    "LAB-HEM-01",
                    "Laboratorio de Hematología",
                    "Especializado en análisis de sangre y hemograma completo",
                ),
            ]),
            RecordingUi::new(confirm),
        )
    }

    #[tokio::test]
    async fn load_populates_labs() {
        let mut v = view(true);
        assert_eq!(v.load_labs().await, Outcome::Applied);
        assert_eq!(v.labs().len(), 2);
        assert!(!v.is_loading());
        assert_eq!(v.error(), None);
    }

    #[tokio::test]
    async fn load_failure_sets_fixed_message() {
        let mut v = view(true);
        v.load_labs().await;
        v.directory()
            .fail_with(StoreError::Backend("down".to_string()))
            .await;
        assert_eq!(v.load_labs().await, Outcome::Failed);
        assert_eq!(v.error(), Some("Error al cargar los laboratorios"));
        assert_eq!(v.labs().len(), 2);
        assert!(!v.is_loading());
    }

    #[tokio::test]
    async fn create_reloads_and_closes_form() {
        let mut v = view(true);
        v.load_labs().await;
        v.open_create_form();
        assert_eq!(v.mode(), &FormMode::Creating);
        *v.form_mut() = params(
            "LAB-MB-01",
            "Laboratorio de Microbiología",
            "Análisis de cultivos",
        );

        assert_eq!(v.save_lab().await, Outcome::Applied);
        assert_eq!(v.labs().len(), 3);
        assert_eq!(v.labs()[2].key_name, "LAB-MB-01");
        assert_eq!(v.mode(), &FormMode::Closed);
        assert_eq!(v.form(), &LabParams::default());
    }

    #[tokio::test]
    async fn edit_updates_by_ulid() {
        let mut v = view(true);
        v.load_labs().await;
        let lab = v.labs()[1].clone();
        v.open_edit_form(lab.clone());
        assert_eq!(v.form().key_name, "LAB-HEM-01");
        v.form_mut().name = "Hematología".to_string();

        assert_eq!(v.save_lab().await, Outcome::Applied);
        assert_eq!(v.labs()[1].name, "Hematología");
        assert_eq!(v.labs()[1].ulid, lab.ulid);
        assert_eq!(v.labs().len(), 2);
    }

    #[tokio::test]
    async fn blank_field_is_a_no_op() {
        let mut v = view(true);
        v.open_create_form();
        *v.form_mut() = params("LAB-MB-01", "Microbiología", "");
        assert_eq!(v.save_lab().await, Outcome::Rejected);
        assert_eq!(v.mode(), &FormMode::Creating);
        v.load_labs().await;
        assert_eq!(v.labs().len(), 2);
    }

    #[tokio::test]
    async fn create_failure_keeps_form_open() {
        let mut v = view(true);
        v.load_labs().await;
        v.open_create_form();
        *v.form_mut() = params("LAB-CLI-01", "Duplicado", "Misma clave");
        assert_eq!(v.save_lab().await, Outcome::Failed);
        assert_eq!(v.error(), Some("Error al crear el laboratorio"));
        assert_eq!(v.mode(), &FormMode::Creating);
    }

    #[tokio::test]
    async fn update_failure_reports_update_message() {
        let mut v = view(true);
        v.load_labs().await;
        let lab = v.labs()[0].clone();
        v.open_edit_form(lab);
        v.directory()
            .fail_with(StoreError::Backend("down".to_string()))
            .await;
        assert_eq!(v.save_lab().await, Outcome::Failed);
        assert_eq!(v.error(), Some("Error al actualizar el laboratorio"));
    }

    #[tokio::test]
    async fn delete_confirms_with_lab_name() {
        let mut v = view(true);
        v.load_labs().await;
        let lab = v.labs()[0].clone();
        assert_eq!(v.delete_lab(&lab).await, Outcome::Applied);
        assert_eq!(v.labs().len(), 1);
        assert_eq!(
            v.ui().events(),
            vec![UiEvent::Confirm(
                "¿Está seguro de que desea eliminar el laboratorio \"Laboratorio Clínico General\"?"
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn declined_delete_keeps_lab() {
        let mut v = view(false);
        v.load_labs().await;
        let lab = v.labs()[0].clone();
        assert_eq!(v.delete_lab(&lab).await, Outcome::Cancelled);
        v.load_labs().await;
        assert_eq!(v.labs().len(), 2);
    }

    #[tokio::test]
    async fn delete_failure_sets_error() {
        let mut v = view(true);
        v.load_labs().await;
        let mut ghost = v.labs()[0].clone();
        ghost.id = 404;
        assert_eq!(v.delete_lab(&ghost).await, Outcome::Failed);
        assert_eq!(v.error(), Some("Error al eliminar el laboratorio"));
    }
}
