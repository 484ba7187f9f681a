//! [`LabDirectory`] backed by the labs REST API under `/labs`.

use async_trait::async_trait;
use labres_storage::{Lab, LabDirectory, LabParams, StoreError};

use crate::http::{encode_segment, HttpClient, Method, Request};

#[derive(Clone)]
pub struct HttpLabDirectory {
    client: HttpClient,
}

impl HttpLabDirectory {
    pub fn new(base_url: &str) -> Self {
        HttpLabDirectory {
            client: HttpClient::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    async fn fetch_one(&self, path: String, key: String) -> Result<Lab, StoreError> {
        self.client
            .fetch::<Option<Lab>>(Request::new(Method::Get, path))
            .await?
            .ok_or(StoreError::LabNotFound(key))
    }
}

#[async_trait]
impl LabDirectory for HttpLabDirectory {
    async fn list_all(&self) -> Result<Vec<Lab>, StoreError> {
        self.client.fetch(Request::new(Method::Get, "labs")).await
    }

    async fn get(&self, id: i64) -> Result<Lab, StoreError> {
        self.fetch_one(format!("labs/{}", id), id.to_string()).await
    }

    async fn get_by_ulid(&self, ulid: &str) -> Result<Lab, StoreError> {
        let path = format!("labs/ulid/{}", encode_segment(ulid));
        self.fetch_one(path, ulid.to_string()).await
    }

    async fn get_by_key_name(&self, key_name: &str) -> Result<Lab, StoreError> {
        let path = format!("labs/key/{}", encode_segment(key_name));
        self.fetch_one(path, key_name.to_string()).await
    }

    async fn create(&self, params: LabParams) -> Result<Lab, StoreError> {
        let body = crate::to_body(&params)?;
        self.client
            .fetch(Request::new(Method::Post, "labs").json(body))
            .await
    }

    async fn update(&self, ulid: &str, params: LabParams) -> Result<Lab, StoreError> {
        let body = crate::to_body(&params)?;
        let path = format!("labs/{}", encode_segment(ulid));
        self.client
            .fetch::<Option<Lab>>(Request::new(Method::Patch, path).json(body))
            .await?
            .ok_or_else(|| StoreError::LabNotFound(ulid.to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.client
            .execute(Request::new(Method::Delete, format!("labs/{}", id)))
            .await
    }
}
