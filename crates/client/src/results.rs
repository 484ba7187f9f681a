//! [`ResultStore`] backed by the results REST API under `/api/results`.

use async_trait::async_trait;
use labres_storage::{LabResult, NewResult, ResultFilter, ResultStore, StoreError};
use serde_json::json;

use crate::http::{encode_segment, HttpClient, Method, Request};

const RESULTS_PATH: &str = "api/results";

/// Talks to a remote results service over HTTP.
#[derive(Clone)]
pub struct HttpResultStore {
    client: HttpClient,
}

impl HttpResultStore {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Self {
        HttpResultStore {
            client: HttpClient::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    fn path(suffix: &str) -> String {
        if suffix.is_empty() {
            RESULTS_PATH.to_string()
        } else {
            format!("{}/{}", RESULTS_PATH, suffix)
        }
    }

    async fn fetch_one(&self, request: Request, key: String) -> Result<LabResult, StoreError> {
        // The backend answers a missing lookup with `200 null`.
        self.client
            .fetch::<Option<LabResult>>(request)
            .await?
            .ok_or(StoreError::ResultNotFound(key))
    }
}

#[async_trait]
impl ResultStore for HttpResultStore {
    async fn list_all(&self) -> Result<Vec<LabResult>, StoreError> {
        self.client
            .fetch(Request::new(Method::Get, Self::path("")))
            .await
    }

    async fn create(&self, result: NewResult) -> Result<LabResult, StoreError> {
        let body = crate::to_body(&result)?;
        self.client
            .fetch(Request::new(Method::Post, Self::path("")).json(body))
            .await
    }

    async fn update_status(&self, id: i64, status: &str) -> Result<LabResult, StoreError> {
        let request = Request::new(Method::Patch, Self::path(&format!("{}/status", id)))
            .json(json!({ "status": status }));
        self.fetch_one(request, id.to_string()).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.client
            .execute(Request::new(Method::Delete, Self::path(&id.to_string())))
            .await
    }

    async fn get(&self, id: i64) -> Result<LabResult, StoreError> {
        let request = Request::new(Method::Get, Self::path(&id.to_string()));
        self.fetch_one(request, id.to_string()).await
    }

    async fn get_by_ulid(&self, ulid: &str) -> Result<LabResult, StoreError> {
        let request = Request::new(
            Method::Get,
            Self::path(&format!("ulid/{}", encode_segment(ulid))),
        );
        self.fetch_one(request, ulid.to_string()).await
    }

    async fn list_by_lab(&self, lab_id: i64) -> Result<Vec<LabResult>, StoreError> {
        self.client
            .fetch(Request::new(Method::Get, Self::path(&format!("lab/{}", lab_id))))
            .await
    }

    async fn list_by_patient(&self, nif: &str) -> Result<Vec<LabResult>, StoreError> {
        let path = Self::path(&format!("patient/{}", encode_segment(nif)));
        self.client.fetch(Request::new(Method::Get, path)).await
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<LabResult>, StoreError> {
        let path = Self::path(&format!("status/{}", encode_segment(status)));
        self.client.fetch(Request::new(Method::Get, path)).await
    }

    async fn search_by_patient_name(
        &self,
        patient_name: &str,
    ) -> Result<Vec<LabResult>, StoreError> {
        let request =
            Request::new(Method::Get, Self::path("search")).query("patientName", patient_name);
        self.client.fetch(request).await
    }

    async fn list_by_date_range(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<LabResult>, StoreError> {
        let request = Request::new(Method::Get, Self::path("date-range"))
            .query("start", start_ms)
            .query("end", end_ms);
        self.client.fetch(request).await
    }

    async fn filter(&self, filter: &ResultFilter) -> Result<Vec<LabResult>, StoreError> {
        let mut request = Request::new(Method::Get, Self::path("filter"));
        for (key, value) in filter.query_pairs() {
            request = request.query(key, value);
        }
        self.client.fetch(request).await
    }

    async fn update(&self, id: i64, result: NewResult) -> Result<LabResult, StoreError> {
        let body = crate::to_body(&result)?;
        let request = Request::new(Method::Put, Self::path(&id.to_string())).json(body);
        self.fetch_one(request, id.to_string()).await
    }
}
