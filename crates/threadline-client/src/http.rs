//! # REST Transport
//!
//! Thin wrapper over `reqwest` that knows the backend's conventions.
//!
//! ## Response Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  status      body                              result                   │
//! │  ──────      ────                              ──────                   │
//! │  2xx         [ ... ] / { ... } (no success)    Ok(body)                 │
//! │  2xx         { "success": true, ... }          Ok(body)                 │
//! │  2xx         { "success": false, "message" }   Rejected(message)        │
//! │  2xx         empty                             Ok(null)                 │
//! │  non-2xx     { "message": "..." }              Rejected(message)        │
//! │  non-2xx     anything else                     Status(code)             │
//! │  no answer   -                                 Network(cause)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every request carries `Authorization: Bearer <token>` while a session is
//! signed in.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;
use url::Url;

use threadline_core::entities::LookupKind;
use threadline_core::Named;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionHandle;

/// Shared HTTP client bound to one backend and one session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(ApiClient {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Sends a request and returns the unwrapped JSON body.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ClientResult<Value> {
        let url = self.url(path)?;
        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "API request"
        );

        interpret(status, &bytes)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<T> {
        let body = self.execute::<()>(Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Value> {
        self.execute(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        self.execute::<()>(Method::DELETE, path, &[], None).await
    }

    /// Rows of a read-only lookup table (categories, provinces, ...).
    pub async fn lookup(&self, kind: LookupKind) -> ClientResult<Vec<Named>> {
        self.get(kind.resource(), &[]).await
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Maps status + body to the unwrapped payload or a typed error.
pub(crate) fn interpret(status: StatusCode, bytes: &[u8]) -> ClientResult<Value> {
    let body: Option<Value> = if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice(bytes).ok()
    };

    if !status.is_success() {
        return Err(match body.as_ref().and_then(message_of) {
            Some(message) => ClientError::Rejected {
                status: Some(status),
                message,
            },
            None => ClientError::Status { status },
        });
    }

    match body {
        None if !bytes.iter().all(u8::is_ascii_whitespace) => Err(ClientError::Decode(
            "response body is not JSON".to_string(),
        )),
        None => Ok(Value::Null),
        Some(value) => {
            if value.get("success").and_then(Value::as_bool) == Some(false) {
                return Err(ClientError::Rejected {
                    status: Some(status),
                    message: message_of(&value)
                        .unwrap_or_else(|| "The request was rejected".to_string()),
                });
            }
            Ok(value)
        }
    }
}

fn message_of(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// The `message` of a success envelope, if the server sent one.
pub fn envelope_message(value: &Value) -> Option<String> {
    message_of(value)
}
