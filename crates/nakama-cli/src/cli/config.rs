use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nakama_core::CoreConfig;

/// Env var overriding the configured server origin.
pub const BASE_URL_ENV: &str = "NAKAMA_BASE_URL";

/// `<config dir>/nakama/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nakama").join("config.json"))
}

/// Load config from a JSON file
pub fn load_config(path: &Path) -> Result<CoreConfig> {
    CoreConfig::load(path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Build the effective config.
///
/// Priority: explicit flags > `--config` file > default config file > built-in defaults.
/// `base_url` should already include the env var fallback.
pub fn resolve_config(
    path: Option<&Path>,
    base_url: Option<String>,
    token: Option<String>,
) -> Result<CoreConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_config(&path)?,
            None => CoreConfig::default(),
        },
    };

    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(token) = token {
        config.auth_token = Some(token);
    }
    Ok(config.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_config_from_file() {
        let file = config_file(
            r#"{"baseUrl": "https://nakama.example/", "pageSize": 10, "suppressCurrentPost": true}"#,
        );
        let config = resolve_config(Some(file.path()), None, None).unwrap();
        assert_eq!(config.base_url, "https://nakama.example");
        assert_eq!(config.page_size, 10);
        assert!(config.suppress_current_post);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let file = config_file(r#"{"baseUrl": "https://a.example", "authToken": "old"}"#);
        let config = resolve_config(
            Some(file.path()),
            Some("http://localhost:4000".to_string()),
            Some("new".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:4000");
        assert_eq!(config.auth_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_config(Some(&dir.path().join("nope.json")), None, None).unwrap_err();
        assert!(err.to_string().contains("Failed to load config file"));
    }

    #[test]
    fn test_parse_config_minimal() {
        let file = config_file("{}");
        let config = resolve_config(Some(file.path()), None, None).unwrap();
        assert_eq!(config.page_size, nakama_core::constants::DEFAULT_PAGE_SIZE);
    }
}
