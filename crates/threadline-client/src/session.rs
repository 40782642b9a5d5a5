//! # Session State
//!
//! Bearer token, signed-in user and storefront cart, shared explicitly through
//! a [`SessionHandle`] instead of ambient globals.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionHandle (Clone)                                                  │
//! │  ├── Arc<RwLock<Session>>     token · user · cart                       │
//! │  └── Arc<dyn SessionStore>    file (CLI) or memory (tests)              │
//! │                                                                         │
//! │  readers: ApiClient (token), role checks (user), poller                 │
//! │  writers: login / logout / cart edits → persisted after each change     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tokens are never refreshed: an expired token surfaces as a 401 and the
//! user signs in again.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info};

use threadline_core::cart::Cart;
use threadline_core::{CoreResult, Role, Screen, User};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Session
// =============================================================================

/// What survives between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub cart: Cart,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Persistence for the session between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<Session>>;
    fn save(&self, session: &Session) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file, usually `session.json` in the platform data dir.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<Option<Session>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No stored session");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the last saved session in memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    saved: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &Session) -> ClientResult<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

impl MemorySessionStore {
    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, Option<Session>>> {
        self.saved
            .lock()
            .map_err(|_| ClientError::Storage("session store lock poisoned".into()))
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Shared, persisted session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionHandle {
            inner: Arc::new(RwLock::new(Session::default())),
            store,
        }
    }

    /// Unpersisted session, for tests and one-off tools.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    /// Loads the stored session, if any. Returns whether a user is signed in.
    pub async fn restore(&self) -> ClientResult<bool> {
        let stored = self.store.load()?.unwrap_or_default();
        let authenticated = stored.is_authenticated();
        *self.inner.write().await = stored;
        debug!(authenticated, "Session restored");
        Ok(authenticated)
    }

    pub async fn sign_in(&self, token: String, user: User) -> ClientResult<()> {
        let mut session = self.inner.write().await;
        info!(username = %user.username, role = %user.role, "Signed in");
        session.token = Some(token);
        session.user = Some(user);
        self.store.save(&session)
    }

    /// Drops token, user and cart, locally and on disk.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let mut session = self.inner.write().await;
        if let Some(user) = session.user.take() {
            info!(username = %user.username, "Signed out");
        }
        *session = Session::default();
        self.store.clear()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn require_user(&self) -> ClientResult<User> {
        self.user().await.ok_or(ClientError::NotLoggedIn)
    }

    /// The signed-in user, provided their role may edit through `screen`.
    pub async fn require_manage(&self, screen: Screen) -> ClientResult<User> {
        let user = self.require_user().await?;
        if user.role.can_manage(screen) {
            Ok(user)
        } else {
            Err(ClientError::Forbidden {
                role: user.role.to_string(),
                screen,
            })
        }
    }

    /// The signed-in user, provided `screen` is on their dashboard.
    pub async fn require_view(&self, screen: Screen) -> ClientResult<User> {
        let user = self.require_user().await?;
        if user.role.can_view(screen) {
            Ok(user)
        } else {
            Err(ClientError::Forbidden {
                role: user.role.to_string(),
                screen,
            })
        }
    }

    /// Snapshot of the cart.
    pub async fn cart(&self) -> Cart {
        self.inner.read().await.cart.clone()
    }

    /// Applies a cart change to a copy, saves it, then makes it current.
    ///
    /// A rejected change or a failed save leaves the live cart untouched.
    pub async fn update_cart<R>(&self, f: impl FnOnce(&mut Cart) -> CoreResult<R>) -> ClientResult<R> {
        let mut session = self.inner.write().await;
        let mut next = session.clone();
        let out = f(&mut next.cart)?;
        self.store.save(&next)?;
        *session = next;
        Ok(out)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadline_core::entities::Product;
    use threadline_core::Money;

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "nimal".into(),
            role,
            customer_id: None,
        }
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_restores() {
        let store = Arc::new(MemorySessionStore::default());
        let session = SessionHandle::new(store.clone());
        session.sign_in("tok".into(), user(Role::Ceo)).await.unwrap();

        let again = SessionHandle::new(store);
        assert!(again.restore().await.unwrap());
        assert_eq!(again.token().await.as_deref(), Some("tok"));
        assert_eq!(again.user().await.map(|u| u.role), Some(Role::Ceo));
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let store = Arc::new(MemorySessionStore::default());
        let session = SessionHandle::new(store.clone());
        session.sign_in("tok".into(), user(Role::Customer)).await.unwrap();
        session.sign_out().await.unwrap();

        assert!(session.token().await.is_none());
        assert!(store.load().unwrap().is_none());
        assert!(matches!(session.require_user().await, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_role_gate() {
        let session = SessionHandle::in_memory();
        session.sign_in("tok".into(), user(Role::ProductManager)).await.unwrap();

        assert!(session.require_manage(Screen::Products).await.is_ok());
        let err = session.require_manage(Screen::Employees).await.unwrap_err();
        assert_eq!(err.to_string(), "PRODUCT_MANAGER cannot manage employees");
    }

    #[tokio::test]
    async fn test_cart_changes_are_persisted() {
        let store = Arc::new(MemorySessionStore::default());
        let session = SessionHandle::new(store.clone());
        let product = Product {
            id: 3,
            name: "Sarong".into(),
            selling_price: Money::from_major(12.5),
            quantity_in_stock: 4,
            is_active: true,
            ..Product::default()
        };

        session.update_cart(|cart| cart.add_item(&product, 2)).await.unwrap();
        assert!(session.update_cart(|cart| cart.add_item(&product, 5)).await.is_err());

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.cart.total(), Money::from_major(25.0));
    }

    /// Loads nothing and refuses every save.
    struct ReadOnlyStore;

    impl SessionStore for ReadOnlyStore {
        fn load(&self) -> ClientResult<Option<Session>> {
            Ok(None)
        }

        fn save(&self, _session: &Session) -> ClientResult<()> {
            Err(ClientError::Storage("disk full".into()))
        }

        fn clear(&self) -> ClientResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cart_unchanged() {
        let session = SessionHandle::new(Arc::new(ReadOnlyStore));
        let product = Product {
            id: 3,
            name: "Sarong".into(),
            selling_price: Money::from_major(12.5),
            quantity_in_stock: 4,
            is_active: true,
            ..Product::default()
        };

        let err = session
            .update_cart(|cart| cart.add_item(&product, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
        assert!(session.cart().await.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("threadline-session-{}", std::process::id()));
        let store = FileSessionStore::new(dir.join("session.json"));
        assert!(store.load().unwrap().is_none());

        let session = Session {
            token: Some("tok".into()),
            user: Some(user(Role::DispatchOfficer)),
            cart: Cart::new(),
        };
        store.save(&session).unwrap();
        assert!(store.load().unwrap().unwrap().is_authenticated());

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        let _ = std::fs::remove_dir_all(dir);
    }
}
