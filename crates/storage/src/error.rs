/// All errors that can be returned by a `ResultStore` or `LabDirectory`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The backend answered with a non-success status.
    ///
    /// `detail` is the `message` field of the JSON error body, when the
    /// backend sent one.
    #[error("Http failure response for {url}: {status}")]
    Http {
        url: String,
        status: u16,
        detail: Option<String>,
    },

    /// The response body could not be decoded into the expected record.
    #[error("invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// No result with the given id or ulid.
    #[error("result not found: {0}")]
    ResultNotFound(String),

    /// No lab with the given id, ulid or key name.
    #[error("lab not found: {0}")]
    LabNotFound(String),

    /// The backend rejected the payload.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// A backend-specific error.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// The single human-readable message shown to the user.
    ///
    /// Prefers the message nested in the backend's error body and falls
    /// back to this error's own description.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Http {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_body_detail() {
        let err = StoreError::Http {
            url: "http://localhost:8080/api/results".to_string(),
            status: 404,
            detail: Some("Result not found".to_string()),
        };
        assert_eq!(err.user_message(), "Result not found");
    }

    #[test]
    fn user_message_falls_back_to_top_level() {
        let err = StoreError::Http {
            url: "http://localhost:8080/api/results".to_string(),
            status: 500,
            detail: None,
        };
        assert_eq!(
            err.user_message(),
            "Http failure response for http://localhost:8080/api/results: 500"
        );
    }

    #[test]
    fn blank_detail_is_ignored() {
        let err = StoreError::Http {
            url: "http://x/labs".to_string(),
            status: 400,
            detail: Some("  ".to_string()),
        };
        assert_eq!(err.user_message(), "Http failure response for http://x/labs: 400");
    }

    #[test]
    fn non_http_errors_use_display() {
        let err = StoreError::ResultNotFound("42".to_string());
        assert_eq!(err.user_message(), "result not found: 42");
    }
}
