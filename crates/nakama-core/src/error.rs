use serde_json::{Map, Value};

/// Errors surfaced by the sync engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Non-2xx response. `fields` carries whatever JSON object the server sent back.
    #[error("HTTP {status_code}: {message}")]
    Status {
        status_code: u16,
        message: String,
        fields: Map<String, Value>,
    },
    #[error("Transport error: {message}")]
    Transport { message: String },
    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    #[error("Notification delivery failed: {message}")]
    Notifier { message: String },
}

impl CoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        CoreError::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            CoreError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Server-supplied field, e.g. `{"content": "too long"}` on a 422.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            CoreError::Status { fields, .. } => fields.get(name),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => CoreError::Status {
                status_code: status.as_u16(),
                message: err.to_string(),
                fields: Map::new(),
            },
            None => CoreError::transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accessors() {
        let mut fields = Map::new();
        fields.insert("content".to_string(), json!("required"));
        let err = CoreError::Status {
            status_code: 422,
            message: "Unprocessable Entity".to_string(),
            fields,
        };
        assert_eq!(err.status_code(), Some(422));
        assert!(!err.is_unauthorized());
        assert_eq!(err.field("content"), Some(&json!("required")));
        assert_eq!(err.to_string(), "HTTP 422: Unprocessable Entity");
    }

    #[test]
    fn test_non_status_errors_have_no_code() {
        let err = CoreError::transport("connection reset");
        assert_eq!(err.status_code(), None);
        assert!(err.field("anything").is_none());
    }
}
