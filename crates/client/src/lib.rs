//! HTTP-backed [`ResultStore`](labres_storage::ResultStore) and
//! [`LabDirectory`](labres_storage::LabDirectory).
//!
//! Both talk JSON to the lab results backend. Every call is a single
//! attempt; failures map onto [`StoreError`] with the backend's `message`
//! preserved for display.

mod http;
mod labs;
mod results;

pub use labs::HttpLabDirectory;
pub use results::HttpResultStore;

use labres_storage::StoreError;
use serde::Serialize;

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Invalid(e.to_string()))
}
