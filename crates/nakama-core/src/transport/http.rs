use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::sse::SseDecoder;
use super::Transport;
use crate::config::CoreConfig;
use crate::error::CoreError;

/// reqwest-backed transport with a cookie store, like the browser client it replaces.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    /// Flipped on any 401 so the auth layer can drop its session
    unauthorized: Arc<watch::Sender<bool>>,
}

impl HttpTransport {
    pub fn new(config: &CoreConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        let (unauthorized, _rx) = watch::channel(false);
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            unauthorized: Arc::new(unauthorized),
        })
    }

    pub fn watch_unauthorized(&self) -> watch::Receiver<bool> {
        self.unauthorized.subscribe()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn handle_response(&self, response: Response) -> Result<Value, CoreError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        let payload = if is_json {
            response.json::<Value>().await?
        } else {
            Value::String(response.text().await?)
        };

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %self.base_url, "server rejected session");
            self.unauthorized.send_replace(true);
        }

        if !status.is_success() {
            return Err(status_error(status, payload));
        }

        Ok(payload)
    }
}

fn status_error(status: StatusCode, payload: Value) -> CoreError {
    let mut message = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let mut fields = Map::new();

    match payload {
        Value::Object(map) => {
            if let Some(Value::String(server_message)) = map.get("message") {
                message = server_message.clone();
            }
            fields = map;
        }
        Value::String(text) if !text.trim().is_empty() => message = text.trim().to_string(),
        _ => {}
    }

    CoreError::Status {
        status_code: status.as_u16(),
        message,
        fields,
    }
}

async fn open_event_stream(
    request: RequestBuilder,
    unauthorized: &watch::Sender<bool>,
    path: &str,
) -> Option<Response> {
    let response = match request.header(ACCEPT, "text/event-stream").send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(%path, error = %e, "could not open live channel");
            return None;
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        unauthorized.send_replace(true);
    }
    if !status.is_success() {
        tracing::warn!(%path, %status, "live channel refused");
        return None;
    }
    Some(response)
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move {
            let response = self.authorize(self.client.get(self.url(path))).send().await?;
            self.handle_response(response).await
        })
    }

    fn post<'a>(
        &'a self,
        path: &'a str,
        payload: Value,
    ) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move {
            let response = self
                .authorize(self.client.post(self.url(path)))
                .json(&payload)
                .send()
                .await?;
            self.handle_response(response).await
        })
    }

    fn subscribe(&self, path: &str) -> BoxStream<'static, Value> {
        let request = self.authorize(self.client.get(self.url(path)));
        let unauthorized = self.unauthorized.clone();
        let path = path.to_string();

        Box::pin(async_stream::stream! {
            if let Some(response) = open_event_stream(request, &unauthorized, &path).await {
                let mut decoder = SseDecoder::new();
                let mut body = response.bytes_stream();

                while let Some(chunk) = body.next().await {
                    let chunk = match chunk {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            tracing::warn!(%path, error = %e, "live channel dropped");
                            break;
                        }
                    };
                    for data in decoder.feed(&chunk) {
                        match serde_json::from_str::<Value>(&data) {
                            Ok(value) => yield value,
                            Err(e) => tracing::debug!(%path, error = %e, "skipping malformed frame"),
                        }
                    }
                }
            }
            tracing::debug!(%path, "event stream finished");
        })
    }
}
