//! The HTTP collaborator the engine talks through.
//!
//! Everything outside the sync engine (auth, cookies, retries on the wire) lives behind
//! this trait. `http` is the real implementation, `memory` a scripted one.

pub mod http;
pub mod memory;
pub mod sse;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;

pub trait Transport: Send + Sync {
    /// `GET path`. Non-2xx responses come back as `CoreError::Status`.
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Value, CoreError>>;

    /// `POST path` with a JSON body.
    fn post<'a>(&'a self, path: &'a str, payload: Value)
        -> BoxFuture<'a, Result<Value, CoreError>>;

    /// Server-sent events for `path`, one parsed JSON payload per message.
    ///
    /// Malformed frames never reach the stream. The stream ends when the connection
    /// drops or when it is dropped.
    fn subscribe(&self, path: &str) -> BoxStream<'static, Value>;
}

pub async fn get_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
) -> Result<T, CoreError> {
    let value = transport.get(path).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn post_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    payload: Value,
) -> Result<T, CoreError> {
    let value = transport.post(path, payload).await?;
    Ok(serde_json::from_value(value)?)
}
