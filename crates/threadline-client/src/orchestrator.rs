//! # CRUD Controller
//!
//! One generic controller drives every management screen. It owns the last
//! successfully fetched list, the open form and the pending removal.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──load()──► Loading ──ok──► Loaded                               │
//! │                       │                                                 │
//! │                       └──err──► Failed("Failed to load products")       │
//! │                                  (previous list kept on screen)         │
//! │                                                                         │
//! │   open_create() / open_edit(r) ──► form open                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   submit() ── violations ──► form stays open, NO request                │
//! │        │                                                                │
//! │        ├── POST / PUT fails ──► form stays open with the message        │
//! │        │                                                                │
//! │        └── ok ──► form closed ──► load()                                │
//! │                                                                         │
//! │   request_remove(id) ──► PendingRemoval ──confirm_remove──► DELETE      │
//! │                               │                                │        │
//! │                               └──cancel_remove──► dropped      ▼        │
//! │                                                             load()      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations take `&mut self`, so a controller has at most one request in
//! flight. Writes are never patched into the local list; the list is always
//! re-fetched.

use std::fmt;
use tracing::{error, info, warn};

use threadline_core::query::{self, ListQuery};
use threadline_core::EntitySchema;

use crate::error::{ClientError, ClientResult};
use crate::resource::RemoteCollection;

// =============================================================================
// State
// =============================================================================

/// Where the list is in its fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    /// User-facing message; the list keeps its previous contents.
    Failed(String),
}

/// What the open form will do on submit.
pub enum FormSubject<S: EntitySchema> {
    Create,
    Edit(S::Record),
}

impl<S: EntitySchema> fmt::Debug for FormSubject<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormSubject::Create => f.write_str("Create"),
            FormSubject::Edit(r) => f.debug_tuple("Edit").field(r).finish(),
        }
    }
}

/// An open create/edit form.
pub struct OpenForm<S: EntitySchema> {
    pub subject: FormSubject<S>,
    pub form: S::Form,
    /// Last validation or server message shown on the form.
    pub error: Option<String>,
}

impl<S: EntitySchema> fmt::Debug for OpenForm<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenForm")
            .field("subject", &self.subject)
            .field("form", &self.form)
            .field("error", &self.error)
            .finish()
    }
}

/// Confirmation token for a delete. Only [`CrudController::request_remove`]
/// creates one, and confirming consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    id: i64,
}

impl PendingRemoval {
    pub fn id(&self) -> i64 {
        self.id
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct CrudController<S: EntitySchema, R> {
    remote: R,
    records: Vec<S::Record>,
    state: LoadState,
    last_error: Option<String>,
    form: Option<OpenForm<S>>,
    pending: Option<i64>,
}

impl<S, R> CrudController<S, R>
where
    S: EntitySchema,
    R: RemoteCollection<S>,
{
    pub fn new(remote: R) -> Self {
        CrudController {
            remote,
            records: Vec::new(),
            state: LoadState::Idle,
            last_error: None,
            form: None,
            pending: None,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Last successful fetch, in server order.
    pub fn records(&self) -> &[S::Record] {
        &self.records
    }

    /// User-facing message of the last failed operation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn open_form(&self) -> Option<&OpenForm<S>> {
        self.form.as_ref()
    }

    /// The form being edited, for field changes between open and submit.
    pub fn form_mut(&mut self) -> Option<&mut S::Form> {
        self.form.as_mut().map(|open| &mut open.form)
    }

    /// Records matching `query`, in display order.
    pub fn visible(&self, query: &ListQuery<S::Record>) -> Vec<&S::Record> {
        query::apply(&self.records, query)
    }

    pub fn find(&self, id: i64) -> Option<&S::Record> {
        self.records.iter().find(|r| S::record_id(r) == id)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetches the full collection. On failure the previous list stays.
    pub async fn load(&mut self) -> ClientResult<()> {
        self.state = LoadState::Loading;
        match self.remote.list().await {
            Ok(records) => {
                info!(resource = S::RESOURCE, count = records.len(), "Loaded");
                self.records = records;
                self.state = LoadState::Loaded;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = self.failure_message("load", &e);
                self.state = LoadState::Failed(message.clone());
                self.last_error = Some(message);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Opens a blank form with a generated number.
    pub fn open_create(&mut self) -> &mut S::Form {
        self.install_form(FormSubject::Create, S::new_form())
    }

    /// Opens a form pre-filled from `record`.
    pub fn open_edit(&mut self, record: S::Record) -> &mut S::Form {
        let form = S::edit_form(&record);
        self.install_form(FormSubject::Edit(record), form)
    }

    /// Opens the edit form for a loaded record by id.
    pub fn open_edit_by_id(&mut self, id: i64) -> Option<&mut S::Form> {
        let record = self.find(id)?.clone();
        Some(self.open_edit(record))
    }

    fn install_form(&mut self, subject: FormSubject<S>, form: S::Form) -> &mut S::Form {
        let open = self.form.insert(OpenForm {
            subject,
            form,
            error: None,
        });
        &mut open.form
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validates and sends the open form.
    ///
    /// Violations are returned without any request and the form stays open.
    /// Server failures also keep the form open, carrying the message. On
    /// success the form closes and the list is reloaded.
    pub async fn submit(&mut self) -> ClientResult<()> {
        let open = self.form.as_mut().ok_or(ClientError::NoOpenForm)?;
        S::prepare(&mut open.form);

        let violations = S::validate(&open.form);
        if !violations.is_empty() {
            open.error = Some(violations.joined());
            return Err(ClientError::Validation(violations));
        }

        let (verb, result) = match &open.subject {
            FormSubject::Create => ("create", self.remote.create(&open.form).await),
            FormSubject::Edit(record) => (
                "update",
                self.remote.update(S::record_id(record), &open.form).await,
            ),
        };

        match result {
            Ok(()) => {
                self.form = None;
                self.reload_after_write().await;
                Ok(())
            }
            Err(e) => {
                let message = self.failure_message(verb, &e);
                if let Some(open) = self.form.as_mut() {
                    open.error = Some(message.clone());
                }
                self.last_error = Some(message);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// First step of a delete. Nothing is sent until the token is confirmed.
    pub fn request_remove(&mut self, id: i64) -> PendingRemoval {
        self.pending = Some(id);
        PendingRemoval { id }
    }

    /// Issues the DELETE, then reloads.
    pub async fn confirm_remove(&mut self, pending: PendingRemoval) -> ClientResult<()> {
        if self.pending != Some(pending.id) {
            return Err(ClientError::NoPendingRemoval(pending.id));
        }
        self.pending = None;

        match self.remote.delete(pending.id).await {
            Ok(()) => {
                self.reload_after_write().await;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(self.failure_message("delete", &e));
                Err(e)
            }
        }
    }

    pub fn cancel_remove(&mut self, pending: PendingRemoval) {
        if self.pending == Some(pending.id) {
            self.pending = None;
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn reload_after_write(&mut self) {
        if let Err(e) = self.load().await {
            warn!(resource = S::RESOURCE, error = %e, "Reload after write failed");
        }
    }

    /// Rejections and validation speak for themselves; anything else becomes
    /// "Failed to <verb> <entity>" with the cause logged.
    fn failure_message(&self, verb: &str, e: &ClientError) -> String {
        if e.is_rejection() || e.is_validation() {
            return e.to_string();
        }
        error!(resource = S::RESOURCE, verb, error = %e, "Request failed");
        format!("Failed to {} {}", verb, S::LABEL)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use threadline_core::entities::product::ProductFacet;
    use threadline_core::entities::{Product, ProductSchema};
    use threadline_core::{Money, Named, Ref};

    /// In-memory collection that counts every call.
    #[derive(Default, Clone)]
    pub(crate) struct FakeProducts {
        pub rows: Arc<Mutex<Vec<Product>>>,
        pub fail_list: Arc<Mutex<bool>>,
        pub reject_writes: Arc<Mutex<Option<String>>>,
        pub lists: Arc<AtomicUsize>,
        pub writes: Arc<AtomicUsize>,
        pub deletes: Arc<AtomicUsize>,
    }

    impl FakeProducts {
        pub fn with(rows: Vec<Product>) -> Self {
            let fake = FakeProducts::default();
            *fake.rows.lock().unwrap() = rows;
            fake
        }
    }

    #[async_trait]
    impl RemoteCollection<ProductSchema> for FakeProducts {
        async fn list(&self) -> ClientResult<Vec<Product>> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if *self.fail_list.lock().unwrap() {
                return Err(ClientError::Network("connection refused".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn get(&self, id: i64) -> ClientResult<Product> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(ClientError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }

        async fn search(&self, term: &str) -> ClientResult<Vec<Product>> {
            let q = ListQuery::<Product>::new().search(term);
            Ok(query::filter(&self.rows.lock().unwrap(), &q)
                .into_iter()
                .cloned()
                .collect())
        }

        async fn create(&self, form: &threadline_core::entities::ProductForm) -> ClientResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.reject_writes.lock().unwrap().clone() {
                return Err(ClientError::Rejected {
                    status: None,
                    message,
                });
            }
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            rows.push(Product {
                id,
                product_no: form.product_no.clone(),
                name: form.name.clone(),
                cost_price: form.cost_price,
                selling_price: form.selling_price,
                quantity_in_stock: form.quantity_in_stock,
                profit_percentage: form.profit_percentage,
                is_active: form.is_active,
                ..Product::default()
            });
            Ok(())
        }

        async fn update(
            &self,
            id: i64,
            form: &threadline_core::entities::ProductForm,
        ) -> ClientResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|p| p.id == id) {
                row.name = form.name.clone();
                row.selling_price = form.selling_price;
            }
            Ok(())
        }

        async fn delete(&self, id: i64) -> ClientResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    fn product(id: i64, name: &str, category: &str) -> Product {
        Product {
            id,
            product_no: format!("PRD{id}"),
            name: name.to_string(),
            cost_price: Money::from_major(10.0),
            selling_price: Money::from_major(15.0),
            category: Some(Named::new(1, category)),
            is_active: true,
            ..Product::default()
        }
    }

    fn controller(fake: &FakeProducts) -> CrudController<ProductSchema, FakeProducts> {
        CrudController::new(fake.clone())
    }

    #[tokio::test]
    async fn test_load_and_filter() {
        let fake = FakeProducts::with(vec![
            product(1, "Linen Shirt", "Tops"),
            product(2, "Chinos", "Bottoms"),
        ]);
        let mut ctl = controller(&fake);
        assert_eq!(ctl.state(), &LoadState::Idle);

        ctl.load().await.unwrap();
        assert_eq!(ctl.state(), &LoadState::Loaded);

        let q = ListQuery::<Product>::new().facet(ProductFacet::Category, "tops");
        let visible: Vec<i64> = ctl.visible(&q).iter().map(|p| p.id).collect();
        assert_eq!(visible, vec![1]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_stale_list() {
        let fake = FakeProducts::with(vec![product(1, "Linen Shirt", "Tops")]);
        let mut ctl = controller(&fake);
        ctl.load().await.unwrap();

        *fake.fail_list.lock().unwrap() = true;
        assert!(ctl.load().await.is_err());

        assert_eq!(ctl.records().len(), 1);
        assert_eq!(ctl.last_error(), Some("Failed to load products"));
        assert_eq!(
            ctl.state(),
            &LoadState::Failed("Failed to load products".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_submit_sends_nothing_and_keeps_form() {
        let fake = FakeProducts::default();
        let mut ctl = controller(&fake);

        let form = ctl.open_create();
        form.name = "Linen Shirt".into();
        form.category = Some(Ref::new(1));
        form.supplier = Some(Ref::new(2));
        form.set_prices(Money::from_major(100.0), Money::from_major(120.0));
        assert_eq!(form.profit_percentage, Some(20.0));
        form.set_selling_price(Money::from_major(90.0));

        let err = ctl.submit().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Selling price must exceed cost price");
        assert_eq!(fake.writes.load(Ordering::SeqCst), 0);
        assert_eq!(fake.lists.load(Ordering::SeqCst), 0);

        let open = ctl.open_form().unwrap();
        assert_eq!(open.error.as_deref(), Some("Selling price must exceed cost price"));
    }

    #[tokio::test]
    async fn test_successful_create_closes_form_and_reloads() {
        let fake = FakeProducts::default();
        let mut ctl = controller(&fake);

        let form = ctl.open_create();
        form.name = "Batik Sarong".into();
        form.category = Some(Ref::new(1));
        form.supplier = Some(Ref::new(2));
        form.set_prices(Money::from_major(100.0), Money::from_major(120.0));

        ctl.submit().await.unwrap();
        assert!(ctl.open_form().is_none());
        assert_eq!(fake.writes.load(Ordering::SeqCst), 1);
        assert_eq!(fake.lists.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.records()[0].name, "Batik Sarong");
        assert!(ctl.records()[0].product_no.starts_with("PRD"));
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_form_open() {
        let fake = FakeProducts::default();
        *fake.reject_writes.lock().unwrap() = Some("Product number already exists".into());
        let mut ctl = controller(&fake);

        let form = ctl.open_create();
        form.name = "Batik Sarong".into();
        form.category = Some(Ref::new(1));
        form.supplier = Some(Ref::new(2));
        form.set_prices(Money::from_major(100.0), Money::from_major(120.0));

        let err = ctl.submit().await.unwrap_err();
        assert!(err.is_rejection());
        let open = ctl.open_form().unwrap();
        assert_eq!(open.error.as_deref(), Some("Product number already exists"));
        assert_eq!(fake.lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_edit_updates_by_id() {
        let fake = FakeProducts::with(vec![product(7, "Chinos", "Bottoms")]);
        let mut ctl = controller(&fake);
        ctl.load().await.unwrap();

        let form = ctl.open_edit_by_id(7).unwrap();
        form.name = "Slim Chinos".into();
        form.supplier = Some(Ref::new(2));
        ctl.submit().await.unwrap();

        assert_eq!(ctl.find(7).unwrap().name, "Slim Chinos");
        assert!(ctl.open_edit_by_id(99).is_none());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let fake = FakeProducts::with(vec![
            product(1, "Linen Shirt", "Tops"),
            product(2, "Chinos", "Bottoms"),
        ]);
        let mut ctl = controller(&fake);
        ctl.load().await.unwrap();

        let pending = ctl.request_remove(1);
        ctl.cancel_remove(pending);
        assert_eq!(fake.deletes.load(Ordering::SeqCst), 0);

        let pending = ctl.request_remove(2);
        ctl.confirm_remove(pending).await.unwrap();
        assert_eq!(fake.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(fake.lists.load(Ordering::SeqCst), 2);
        assert_eq!(ctl.records().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_token_is_refused() {
        let fake = FakeProducts::with(vec![product(1, "Linen Shirt", "Tops")]);
        let mut ctl = controller(&fake);

        let first = ctl.request_remove(1);
        let _second = ctl.request_remove(2);
        let err = ctl.confirm_remove(first).await.unwrap_err();
        assert!(matches!(err, ClientError::NoPendingRemoval(1)));
        assert_eq!(fake.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let mut ctl = controller(&FakeProducts::default());
        assert!(matches!(ctl.submit().await, Err(ClientError::NoOpenForm)));
        ctl.open_create();
        ctl.close_form();
        assert!(ctl.open_form().is_none());
    }
}
