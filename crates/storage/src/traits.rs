use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{Lab, LabParams, LabResult, NewResult, ResultFilter};

/// The service of record for lab test results.
///
/// Every mutating call returns the canonical record as stored, so callers
/// can patch their local copy without a reload.
///
/// ## Failure model
///
/// Calls are single attempts: implementations must not retry, de-duplicate
/// or time out on their own. A failed call surfaces as a [`StoreError`]
/// whose [`StoreError::user_message`] is fit for display.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so they can be held in
/// long-lived controllers and moved across async task boundaries.
#[async_trait]
pub trait ResultStore: Send + Sync + 'static {
    // ── Core operations ──────────────────────────────────────────────────────

    /// All results, in store order.
    async fn list_all(&self) -> Result<Vec<LabResult>, StoreError>;

    /// Create a result. The store assigns `id` and `ulid`.
    async fn create(&self, result: NewResult) -> Result<LabResult, StoreError>;

    /// Change the status of result `id` and return the updated record.
    ///
    /// Returns `Err(StoreError::ResultNotFound)` if `id` does not exist.
    async fn update_status(&self, id: i64, status: &str) -> Result<LabResult, StoreError>;

    /// Delete result `id`.
    ///
    /// Returns `Err(StoreError::ResultNotFound)` if `id` does not exist.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    // ── Lookups ──────────────────────────────────────────────────────────────

    async fn get(&self, id: i64) -> Result<LabResult, StoreError>;

    async fn get_by_ulid(&self, ulid: &str) -> Result<LabResult, StoreError>;

    async fn list_by_lab(&self, lab_id: i64) -> Result<Vec<LabResult>, StoreError>;

    /// Results for the patient with national id `nif`.
    async fn list_by_patient(&self, nif: &str) -> Result<Vec<LabResult>, StoreError>;

    async fn list_by_status(&self, status: &str) -> Result<Vec<LabResult>, StoreError>;

    /// Results whose patient name contains `patient_name`.
    async fn search_by_patient_name(
        &self,
        patient_name: &str,
    ) -> Result<Vec<LabResult>, StoreError>;

    /// Results dated within `[start_ms, end_ms]`.
    async fn list_by_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<LabResult>, StoreError>;

    /// Results matching every set criterion of `filter`.
    async fn filter(&self, filter: &ResultFilter) -> Result<Vec<LabResult>, StoreError>;

    /// Replace every field of result `id` except its identity.
    async fn update(&self, id: i64, result: NewResult) -> Result<LabResult, StoreError>;
}

/// The service of record for laboratory metadata.
#[async_trait]
pub trait LabDirectory: Send + Sync + 'static {
    /// All labs, in directory order.
    async fn list_all(&self) -> Result<Vec<Lab>, StoreError>;

    async fn get(&self, id: i64) -> Result<Lab, StoreError>;

    async fn get_by_ulid(&self, ulid: &str) -> Result<Lab, StoreError>;

    async fn get_by_key_name(&self, key_name: &str) -> Result<Lab, StoreError>;

    async fn create(&self, params: LabParams) -> Result<Lab, StoreError>;

    /// Update the lab identified by `ulid`.
    async fn update(&self, ulid: &str, params: LabParams) -> Result<Lab, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
