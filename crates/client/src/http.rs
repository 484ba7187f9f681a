//! Blocking JSON-over-HTTP plumbing shared by the store implementations.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Non-success statuses are read rather than
//! raised by `ureq`, so the backend's error body can be surfaced.

use std::fmt;

use labres_storage::StoreError;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request relative to the client's base URL.
pub(crate) struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(&'static str, String)>,
    pub(crate) body: Option<serde_json::Value>,
}

impl Request {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub(crate) fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone)]
pub(crate) struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        HttpClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `request` and decode the JSON response body as `T`.
    pub(crate) async fn fetch<T>(&self, request: Request) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.send(request, |url, body| {
            body.read_json::<T>().map_err(|e| StoreError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })
        .await
    }

    /// Send `request` and ignore any response body.
    pub(crate) async fn execute(&self, request: Request) -> Result<(), StoreError> {
        self.send(request, |_, _| Ok(())).await
    }

    async fn send<T, F>(&self, request: Request, decode: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&str, &mut ureq::Body) -> Result<T, StoreError> + Send + 'static,
    {
        let url = self.url(&request.path);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || {
            tracing::debug!(method = %request.method, url = %url, "sending request");
            let mut response =
                call(&agent, &url, &request).map_err(|e| StoreError::Transport {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .body_mut()
                    .read_to_string()
                    .unwrap_or_default();
                tracing::debug!(status = status.as_u16(), url = %url, "request failed");
                return Err(StoreError::Http {
                    url,
                    status: status.as_u16(),
                    detail: error_detail(&text),
                });
            }

            decode(&url, response.body_mut())
        })
        .await
        .map_err(|e| StoreError::Backend(format!("task join error: {}", e)))?
    }
}

fn call(
    agent: &ureq::Agent,
    url: &str,
    request: &Request,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let body = request
        .body
        .clone()
        .unwrap_or(serde_json::Value::Null);
    match request.method {
        Method::Get => with_query(agent.get(url), &request.query).call(),
        Method::Delete => with_query(agent.delete(url), &request.query).call(),
        Method::Post => with_query(agent.post(url), &request.query).send_json(&body),
        Method::Put => with_query(agent.put(url), &request.query).send_json(&body),
        Method::Patch => with_query(agent.patch(url), &request.query).send_json(&body),
    }
}

fn with_query<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(&'static str, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in query {
        builder = builder.query(*key, value);
    }
    builder
}

/// The `message` field of a JSON error body, if there is one.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Percent-encode a single path segment.
///
/// Everything except RFC 3986 unreserved characters is escaped, so slashes
/// and spaces in NIFs or status labels cannot change the route.
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = HttpClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.url("/api/results"),
            "http://localhost:8080/api/results"
        );
        assert_eq!(client.url("labs"), "http://localhost:8080/labs");
    }

    #[test]
    fn error_detail_reads_message_field() {
        let body = r#"{"timestamp":"2024-01-01","status":404,"error":"Not Found","message":"Result not found","path":"/api/results/9"}"#;
        assert_eq!(error_detail(body), Some("Result not found".to_string()));
    }

    #[test]
    fn error_detail_ignores_missing_or_blank_message() {
        assert_eq!(error_detail(r#"{"error":"Internal Server Error"}"#), None);
        assert_eq!(error_detail(r#"{"message":"  "}"#), None);
        assert_eq!(error_detail("<html>502 Bad Gateway</html>"), None);
        assert_eq!(error_detail(""), None);
    }

    #[test]
    fn encode_segment_escapes_reserved_characters() {
        assert_eq!(encode_segment("00000101-2"), "00000101-2");
        assert_eq!(encode_segment("En Proceso"), "En%20Proceso");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment("Crítico"), "Cr%C3%ADtico");
    }

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
