//! # Client Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │   Rejection     │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Violations     │  │  success:false  │  │  Connection, timeout    │ │
//! │  │  before any     │  │  non-2xx with   │  │  undecodable body       │ │
//! │  │  request        │  │  a message      │  │                         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  never logged   │  │  shown verbatim │  │  "Failed to load ..."   │ │
//! │  │                 │  │                 │  │  cause logged at error  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Session     │  │  Configuration  │  │       Domain            │ │
//! │  │  NotLoggedIn    │  │  InvalidConfig  │  │  CoreError (cart, ...)  │ │
//! │  │  Forbidden      │  │  InvalidUrl     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried: the caller shows the message and the user decides.

use reqwest::StatusCode;
use thiserror::Error;

use threadline_core::{CoreError, Screen, Violations};

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Validation
    // =========================================================================
    /// Form rules failed; no request was sent.
    #[error("{0}")]
    Validation(Violations),

    // =========================================================================
    // Server Rejections
    // =========================================================================
    /// The backend refused the operation (`success: false` or non-2xx with a
    /// message). The text is the server's own.
    #[error("{message}")]
    Rejected {
        status: Option<StatusCode>,
        message: String,
    },

    /// Non-2xx response without a usable message.
    #[error("Request failed: {status}")]
    Status { status: StatusCode },

    // =========================================================================
    // Transport
    // =========================================================================
    /// Connection refused, DNS failure, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not what the endpoint promises.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Session
    // =========================================================================
    #[error("Not logged in")]
    NotLoggedIn,

    /// The signed-in role has no access to the screen.
    #[error("{role} cannot manage {screen}")]
    Forbidden { role: String, screen: Screen },

    /// Removal was confirmed for a record that is no longer pending.
    #[error("No removal is pending for record {0}")]
    NoPendingRemoval(i64),

    /// Submit called without an open form.
    #[error("No form is open")]
    NoOpenForm,

    // =========================================================================
    // Checkout
    // =========================================================================
    /// The account has no customer record to place orders against.
    #[error("Account {username} has no customer profile")]
    NoCustomerProfile { username: String },

    /// Some cart lines became orders before a request failed. The cart is
    /// left untouched.
    #[error("Checkout stopped after {} order(s): {source}", placed.len())]
    CheckoutIncomplete {
        placed: Vec<String>,
        source: Box<ClientError>,
    },

    // =========================================================================
    // Configuration and storage
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Domain
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<Violations> for ClientError {
    fn from(violations: Violations) -> Self {
        ClientError::Validation(violations)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let (true, Some(status)) = (err.is_status(), err.status()) {
            ClientError::Status { status }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Local form rules failed.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// The server answered and said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. } | ClientError::Status { .. })
    }

    /// The request never produced a usable answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Decode(_))
    }

    /// 401 from the backend, usually an expired token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected { status: Some(StatusCode::UNAUTHORIZED), .. }
                | ClientError::Status { status: StatusCode::UNAUTHORIZED }
        )
    }

    /// Violations when this is a validation failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ClientError::Validation(v) => Some(v),
            _ => None,
        }
    }
}
