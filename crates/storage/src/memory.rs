//! In-memory `ResultStore` and `LabDirectory` backends.
//!
//! Both assign sequential ids starting at 1 and fresh ULIDs, and apply the
//! same payload validation as the REST backend. Intended for tests and
//! local tooling; nothing is persisted.
//!
//! `fail_with` makes every subsequent call return the given error until
//! `recover` is called, which lets callers exercise their failure paths.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::record::{Lab, LabParams, LabResult, NewResult, ResultFilter};
use crate::traits::{LabDirectory, ResultStore};
use crate::ulid;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
    failure: Option<StoreError>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
            failure: None,
        }
    }
}

impl<T> Table<T> {
    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), StoreError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(StoreError::Invalid(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn validate_result(result: &NewResult) -> Result<(), StoreError> {
    check_len("nif", &result.nif, 2, 50)?;
    check_len("patientName", &result.patient_name, 3, 100)?;
    check_len("data", &result.data, 1, usize::MAX)?;
    check_len("status", &result.status, 1, usize::MAX)?;
    Ok(())
}

fn validate_lab(params: &LabParams) -> Result<(), StoreError> {
    check_len("keyName", &params.key_name, 2, 50)?;
    check_len("name", &params.name, 3, 100)?;
    check_len("description", &params.description, 0, 500)?;
    Ok(())
}

// ──────────────────────────────────────────────
// MemoryResultStore
// ──────────────────────────────────────────────

/// Result store backed by a `Vec` behind an async mutex.
#[derive(Default)]
pub struct MemoryResultStore {
    table: Mutex<Table<LabResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `results`, in order.
    ///
    /// Ids and ULIDs are assigned as if each had been created in turn.
    pub fn with_results(results: Vec<NewResult>) -> Self {
        let mut table = Table::default();
        for result in results {
            let id = table.allocate_id();
            table.rows.push(result.into_result(id, ulid::generate()));
        }
        Self {
            table: Mutex::new(table),
        }
    }

    /// Make every call fail with `err` until [`recover`](Self::recover).
    pub async fn fail_with(&self, err: StoreError) {
        self.table.lock().await.failure = Some(err);
    }

    pub async fn recover(&self) {
        self.table.lock().await.failure = None;
    }

    /// Number of stored results, ignoring any injected failure.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn select<F>(&self, pred: F) -> Result<Vec<LabResult>, StoreError>
    where
        F: Fn(&LabResult) -> bool + Send,
    {
        let table = self.table.lock().await;
        table.check()?;
        Ok(table.rows.iter().filter(|r| pred(r)).cloned().collect())
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn list_all(&self) -> Result<Vec<LabResult>, StoreError> {
        self.select(|_| true).await
    }

    async fn create(&self, result: NewResult) -> Result<LabResult, StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        validate_result(&result)?;
        let id = table.allocate_id();
        let created = result.into_result(id, ulid::generate());
        table.rows.push(created.clone());
        Ok(created)
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<LabResult, StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        check_len("status", status, 1, usize::MAX)?;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::ResultNotFound(id.to_string()))?;
        row.status = status.to_string();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        let pos = table
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::ResultNotFound(id.to_string()))?;
        table.rows.remove(pos);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<LabResult, StoreError> {
        self.select(|r| r.id == id)
            .await?
            .pop()
            .ok_or_else(|| StoreError::ResultNotFound(id.to_string()))
    }

    async fn get_by_ulid(&self, ulid: &str) -> Result<LabResult, StoreError> {
        self.select(|r| r.ulid == ulid)
            .await?
            .pop()
            .ok_or_else(|| StoreError::ResultNotFound(ulid.to_string()))
    }

    async fn list_by_lab(&self, lab_id: i64) -> Result<Vec<LabResult>, StoreError> {
        self.select(|r| r.lab_id == lab_id).await
    }

    async fn list_by_patient(&self, nif: &str) -> Result<Vec<LabResult>, StoreError> {
        self.select(|r| r.nif == nif).await
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<LabResult>, StoreError> {
        self.select(|r| r.status == status).await
    }

    async fn search_by_patient_name(
        &self,
        patient_name: &str,
    ) -> Result<Vec<LabResult>, StoreError> {
        let filter = ResultFilter {
            patient_name: Some(patient_name.to_string()),
            ..Default::default()
        };
        self.select(|r| filter.matches(r)).await
    }

    async fn list_by_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<LabResult>, StoreError> {
        self.select(|r| r.date >= start_ms && r.date <= end_ms).await
    }

    async fn filter(&self, filter: &ResultFilter) -> Result<Vec<LabResult>, StoreError> {
        self.select(|r| filter.matches(r)).await
    }

    async fn update(&self, id: i64, result: NewResult) -> Result<LabResult, StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        validate_result(&result)?;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::ResultNotFound(id.to_string()))?;
        let ulid = std::mem::take(&mut row.ulid);
        *row = result.into_result(id, ulid);
        Ok(row.clone())
    }
}

// ──────────────────────────────────────────────
// MemoryLabDirectory
// ──────────────────────────────────────────────

/// Lab directory backed by a `Vec` behind an async mutex.
///
/// Key names are unique, as in the REST backend.
#[derive(Default)]
pub struct MemoryLabDirectory {
    table: Mutex<Table<Lab>>,
}

impl MemoryLabDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labs(labs: Vec<LabParams>) -> Self {
        let mut table = Table::default();
        for params in labs {
            let id = table.allocate_id();
            table.rows.push(Lab {
                id,
                ulid: ulid::generate(),
                key_name: params.key_name,
                name: params.name,
                description: params.description,
            });
        }
        Self {
            table: Mutex::new(table),
        }
    }

    pub async fn fail_with(&self, err: StoreError) {
        self.table.lock().await.failure = Some(err);
    }

    pub async fn recover(&self) {
        self.table.lock().await.failure = None;
    }

    async fn find<F>(&self, what: &str, pred: F) -> Result<Lab, StoreError>
    where
        F: Fn(&Lab) -> bool + Send,
    {
        let table = self.table.lock().await;
        table.check()?;
        table
            .rows
            .iter()
            .find(|l| pred(l))
            .cloned()
            .ok_or_else(|| StoreError::LabNotFound(what.to_string()))
    }
}

#[async_trait]
impl LabDirectory for MemoryLabDirectory {
    async fn list_all(&self) -> Result<Vec<Lab>, StoreError> {
        let table = self.table.lock().await;
        table.check()?;
        Ok(table.rows.clone())
    }

    async fn get(&self, id: i64) -> Result<Lab, StoreError> {
        self.find(&id.to_string(), |l| l.id == id).await
    }

    async fn get_by_ulid(&self, ulid: &str) -> Result<Lab, StoreError> {
        self.find(ulid, |l| l.ulid == ulid).await
    }

    async fn get_by_key_name(&self, key_name: &str) -> Result<Lab, StoreError> {
        self.find(key_name, |l| l.key_name == key_name).await
    }

    async fn create(&self, params: LabParams) -> Result<Lab, StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        validate_lab(&params)?;
        if table.rows.iter().any(|l| l.key_name == params.key_name) {
            return Err(StoreError::Invalid(format!(
                "keyName '{}' already exists",
                params.key_name
            )));
        }
        let lab = Lab {
            id: table.allocate_id(),
            ulid: ulid::generate(),
            key_name: params.key_name,
            name: params.name,
            description: params.description,
        };
        table.rows.push(lab.clone());
        Ok(lab)
    }

    async fn update(&self, ulid: &str, params: LabParams) -> Result<Lab, StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        validate_lab(&params)?;
        if table
            .rows
            .iter()
            .any(|l| l.key_name == params.key_name && l.ulid != ulid)
        {
            return Err(StoreError::Invalid(format!(
                "keyName '{}' already exists",
                params.key_name
            )));
        }
        let lab = table
            .rows
            .iter_mut()
            .find(|l| l.ulid == ulid)
            .ok_or_else(|| StoreError::LabNotFound(ulid.to_string()))?;
        lab.key_name = params.key_name;
        lab.name = params.name;
        lab.description = params.description;
        Ok(lab.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        table.check()?;
        let pos = table
            .rows
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StoreError::LabNotFound(id.to_string()))?;
        table.rows.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_result(lab_id: i64, nif: &str, name: &str, status: &str) -> NewResult {
        NewResult {
            lab_id,
            nif: nif.to_string(),
            patient_name: name.to_string(),
            data: "Resultado".to_string(),
            status: status.to_string(),
            date: 1_700_000_000_000,
        }
    }

    fn lab(key: &str, name: &str) -> LabParams {
        LabParams {
            key_name: key.to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_ulids() {
        let store = MemoryResultStore::new();
        let a = store
            .create(new_result(1, "00000101-2", "Paciente 1-1", "Pendiente"))
            .await
            .unwrap();
        let b = store
            .create(new_result(1, "00000102-3", "Paciente 1-2", "Pendiente"))
            .await
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_ne!(a.ulid, b.ulid);
        assert!(a.created_at().is_some());
        assert_eq!(store.get_by_ulid(&b.ulid).await.unwrap(), b);
    }

    #[tokio::test]
    async fn create_rejects_short_patient_name() {
        let store = MemoryResultStore::new();
        let err = store
            .create(new_result(1, "00000101-2", "Al", "Pendiente"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_status_and_delete_report_missing_ids() {
        let store = MemoryResultStore::with_results(vec![new_result(
            1,
            "00000101-2",
            "Paciente 1-1",
            "Pendiente",
        )]);
        let updated = store.update_status(1, "Finalizado").await.unwrap();
        assert_eq!(updated.status, "Finalizado");

        assert_eq!(
            store.update_status(9, "Finalizado").await,
            Err(StoreError::ResultNotFound("9".to_string()))
        );
        assert_eq!(
            store.delete(9).await,
            Err(StoreError::ResultNotFound("9".to_string()))
        );
        store.delete(1).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let store = MemoryResultStore::with_results(vec![new_result(
            1,
            "00000101-2",
            "Paciente 1-1",
            "Pendiente",
        )]);
        let before = store.get(1).await.unwrap();
        let after = store
            .update(1, new_result(2, "00000201-3", "Paciente 2-1", "En Proceso"))
            .await
            .unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.ulid, before.ulid);
        assert_eq!(after.lab_id, 2);
    }

    #[tokio::test]
    async fn queries_select_matching_results() {
        let store = MemoryResultStore::with_results(vec![
            new_result(1, "00000101-2", "Paciente 1-1", "Pendiente"),
            new_result(1, "00000102-3", "Paciente 1-2", "Finalizado"),
            new_result(2, "00000201-3", "Paciente 2-1", "Pendiente"),
        ]);
        assert_eq!(store.list_by_lab(1).await.unwrap().len(), 2);
        assert_eq!(store.list_by_patient("00000201-3").await.unwrap().len(), 1);
        assert_eq!(store.list_by_status("Pendiente").await.unwrap().len(), 2);
        assert_eq!(store.search_by_patient_name("paciente 1").await.unwrap().len(), 2);
        assert_eq!(
            store
                .list_by_date_range(1_700_000_000_000, 1_700_000_000_000)
                .await
                .unwrap()
                .len(),
            3
        );
        let filter = ResultFilter {
            lab_id: Some(1),
            status: Some("Pendiente".to_string()),
            ..Default::default()
        };
        let found = store.filter(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nif, "00000101-2");
    }

    #[tokio::test]
    async fn injected_failure_applies_until_recovered() {
        let store = MemoryResultStore::new();
        store.fail_with(StoreError::Backend("down".to_string())).await;
        assert_eq!(
            store.list_all().await,
            Err(StoreError::Backend("down".to_string()))
        );
        store.recover().await;
        assert_eq!(store.list_all().await, Ok(vec![]));
    }

    #[tokio::test]
    async fn lab_directory_crud() {
        let dir =
            MemoryLabDirectory::with_labs(vec![lab("LAB-CLI-01", "Laboratorio Clínico General")]);
        let created = dir
            .create(lab("LAB-HEM-01", "Laboratorio de Hematología"))
            .await
            .unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(dir.get_by_key_name("LAB-HEM-01").await.unwrap(), created);

        let updated = dir
            .update(&created.ulid, lab("LAB-HEM-02", "Hematología"))
            .await
            .unwrap();
        assert_eq!(updated.key_name, "LAB-HEM-02");
        assert_eq!(dir.get(2).await.unwrap(), updated);

        dir.delete(1).await.unwrap();
        assert_eq!(dir.list_all().await.unwrap(), vec![updated]);
        assert_eq!(dir.get(1).await, Err(StoreError::LabNotFound("1".to_string())));
    }

    #[tokio::test]
    async fn lab_key_names_are_unique() {
        let dir = MemoryLabDirectory::with_labs(vec![
            lab("LAB-CLI-01", "Laboratorio Clínico General"),
            lab("LAB-HEM-01", "Laboratorio de Hematología"),
        ]);
        assert!(matches!(
            dir.create(lab("LAB-CLI-01", "Otro laboratorio")).await,
            Err(StoreError::Invalid(_))
        ));
        let hem = dir.get_by_key_name("LAB-HEM-01").await.unwrap();
        assert!(matches!(
            dir.update(&hem.ulid, lab("LAB-CLI-01", "Hematología")).await,
            Err(StoreError::Invalid(_))
        ));
    }
}
