pub mod commands;
pub mod config;
pub mod notifier;
pub mod render;

pub use config::{default_config_path, resolve_config, BASE_URL_ENV};
pub use notifier::TerminalNotifier;
