pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod store;
pub mod streaming;
pub mod tracing_setup;
pub mod transport;
pub mod view;

pub use config::CoreConfig;
pub use error::CoreError;
pub use runtime::{CoreRuntime, SessionCaches};
pub use session::StreamView;
pub use view::View;
