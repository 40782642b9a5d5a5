//! # Remote Collections
//!
//! `RemoteCollection` is the seam between the CRUD controller and the
//! network: the real [`Resource`] speaks REST, tests plug in an in-memory
//! fake.
//!
//! ```text
//! GET    /<resource>                  list
//! GET    /<resource>/{id}             get
//! GET    /<resource>/search?f=term    search (partial match, server side)
//! POST   /<resource>                  create
//! PUT    /<resource>/{id}             update
//! DELETE /<resource>/{id}             delete
//! ```

use async_trait::async_trait;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, info};

use threadline_core::EntitySchema;

use crate::error::ClientResult;
use crate::http::ApiClient;

/// CRUD operations on one REST collection.
#[async_trait]
pub trait RemoteCollection<S: EntitySchema>: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<S::Record>>;

    async fn get(&self, id: i64) -> ClientResult<S::Record>;

    async fn search(&self, term: &str) -> ClientResult<Vec<S::Record>>;

    async fn create(&self, form: &S::Form) -> ClientResult<()>;

    async fn update(&self, id: i64, form: &S::Form) -> ClientResult<()>;

    async fn delete(&self, id: i64) -> ClientResult<()>;
}

/// REST-backed collection for schema `S`.
pub struct Resource<S> {
    api: ApiClient,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Clone for Resource<S> {
    fn clone(&self) -> Self {
        Resource {
            api: self.api.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: EntitySchema> Resource<S> {
    pub fn new(api: ApiClient) -> Self {
        Resource {
            api,
            _schema: PhantomData,
        }
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", S::RESOURCE, id)
    }
}

#[async_trait]
impl<S: EntitySchema> RemoteCollection<S> for Resource<S> {
    async fn list(&self) -> ClientResult<Vec<S::Record>> {
        let started = Instant::now();
        let records: Vec<S::Record> = self.api.get(S::RESOURCE, &[]).await?;
        debug!(
            resource = S::RESOURCE,
            count = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched collection"
        );
        Ok(records)
    }

    async fn get(&self, id: i64) -> ClientResult<S::Record> {
        self.api.get(&Self::item_path(id), &[]).await
    }

    async fn search(&self, term: &str) -> ClientResult<Vec<S::Record>> {
        let path = format!("{}/search", S::RESOURCE);
        self.api.get(&path, &[(S::SEARCH_FIELD, term)]).await
    }

    async fn create(&self, form: &S::Form) -> ClientResult<()> {
        self.api.post(S::RESOURCE, form).await?;
        info!(resource = S::RESOURCE, "Created record");
        Ok(())
    }

    async fn update(&self, id: i64, form: &S::Form) -> ClientResult<()> {
        self.api.put(&Self::item_path(id), form).await?;
        info!(resource = S::RESOURCE, id, "Updated record");
        Ok(())
    }

    async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&Self::item_path(id)).await?;
        info!(resource = S::RESOURCE, id, "Deleted record");
        Ok(())
    }
}
