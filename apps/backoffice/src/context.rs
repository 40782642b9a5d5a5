//! Shared state for one CLI invocation: configuration, restored session and
//! the API client built on top of them.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use threadline_client::{
    ApiClient, AuthService, ClientConfig, CrudController, FileSessionStore, Resource,
    SessionHandle, Storefront,
};
use threadline_core::entities::{OrderSchema, ProductSchema};
use threadline_core::EntitySchema;

pub struct AppContext {
    pub config: ClientConfig,
    pub config_path: Option<PathBuf>,
    pub json: bool,
    api: ApiClient,
}

impl AppContext {
    /// Loads config, restores the stored session and builds the client.
    pub async fn initialize(config_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let config = ClientConfig::load(config_path.clone()).context("Failed to load configuration")?;

        let session = match config.session_path() {
            Some(path) => {
                debug!(?path, "Session file");
                SessionHandle::new(Arc::new(FileSessionStore::new(path)))
            }
            None => {
                warn!("No data directory available; the session will not be kept");
                SessionHandle::in_memory()
            }
        };
        session.restore().await.context("Failed to read the stored session")?;

        let api = ApiClient::new(&config, session)?;
        Ok(AppContext {
            config,
            config_path,
            json,
            api,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionHandle {
        self.api.session()
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone())
    }

    pub fn resource<S: EntitySchema>(&self) -> Resource<S> {
        Resource::new(self.api.clone())
    }

    pub fn controller<S: EntitySchema>(&self) -> CrudController<S, Resource<S>> {
        CrudController::new(self.resource())
    }

    pub fn storefront(&self) -> Storefront<Resource<ProductSchema>, Resource<OrderSchema>> {
        Storefront::new(self.session().clone(), self.resource(), self.resource())
    }
}
