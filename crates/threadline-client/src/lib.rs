//! # threadline-client: REST Client Layer for Threadline
//!
//! Talks to the Threadline backend: authentication, one CRUD collection per
//! managed entity, the storefront checkout and the stock alert poller.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Client Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              CrudController<S, R>  (orchestrator)                │  │
//! │  │  list state · open form · pending removal · reload-after-write   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ R: RemoteCollection<S>                  │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  Resource<S>   │  │  Storefront    │  │  StockAlertPoller      │    │
//! │  │  GET/POST/PUT/ │  │  cart edits    │  │  products every 30s    │    │
//! │  │  DELETE        │  │  checkout      │  │  watch channel         │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          └──────────────────┬┴───────────────────────┘                  │
//! │                             ▼                                           │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ApiClient (reqwest) ── bearer token from SessionHandle          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML configuration with environment overrides
//! - [`error`] - Client error types
//! - [`session`] - Token, user and cart, persisted between runs
//! - [`http`] - Request execution and envelope handling
//! - [`resource`] - `RemoteCollection` trait and its REST implementation
//! - [`auth`] - Login, registration, password change
//! - [`orchestrator`] - Generic CRUD controller
//! - [`checkout`] - Cart and order placement
//! - [`notifications`] - Reorder alerts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use threadline_client::{ApiClient, ClientConfig, CrudController, Resource, SessionHandle};
//! use threadline_core::entities::ProductSchema;
//!
//! let config = ClientConfig::load(None)?;
//! let api = ApiClient::new(&config, SessionHandle::in_memory())?;
//!
//! let mut products = CrudController::new(Resource::<ProductSchema>::new(api));
//! products.load().await?;
//! println!("{} products", products.records().len());
//! ```

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod notifications;
pub mod orchestrator;
pub mod resource;
pub mod session;

pub use auth::AuthService;
pub use checkout::{Receipt, Storefront};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use notifications::{stock_alerts, StockAlert, StockAlertPoller};
pub use orchestrator::{CrudController, FormSubject, LoadState, OpenForm, PendingRemoval};
pub use resource::{RemoteCollection, Resource};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionHandle, SessionStore};
