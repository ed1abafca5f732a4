use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PAGE_SIZE};
use crate::error::CoreError;

/// Engine configuration, loadable from a camelCase JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// Server origin; API paths are appended to it
    pub base_url: String,
    pub page_size: usize,
    pub channel_capacity: usize,
    /// Also suppress OS notifications about the post currently being read
    pub suppress_current_post: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl CoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::invalid_input(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: CoreConfig = serde_json::from_str(&content)?;
        Ok(config.normalized())
    }

    /// Clamp values that would break pagination or channels
    pub fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.channel_capacity == 0 {
            self.channel_capacity = DEFAULT_CHANNEL_CAPACITY;
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            suppress_current_post: false,
            auth_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config_minimal() {
        let config: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 25);
        assert!(!config.suppress_current_post);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"baseUrl": "https://nakama.example/", "pageSize": 0, "suppressCurrentPost": true, "authToken": "abc"}}"#
        )
        .unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://nakama.example");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.suppress_current_post);
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }
}
