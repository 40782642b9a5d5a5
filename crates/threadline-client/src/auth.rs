//! # Authentication
//!
//! ## Login Flow
//! ```text
//! ┌──────────────┐  POST /auth/login          ┌──────────────┐
//! │  AuthService │  {username, password}      │   Backend    │
//! │              │───────────────────────────►│              │
//! │              │  {success, token, user}    │              │
//! │              │◄───────────────────────────│              │
//! └──────┬───────┘                            └──────────────┘
//!        │ sign_in(token, user)
//!        ▼
//!  SessionHandle ──► session.json
//! ```
//!
//! Logout never calls the server; it only forgets the token.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use threadline_core::entities::RegistrationForm;
use threadline_core::{User, Violations};

use crate::error::ClientResult;
use crate::http::{envelope_message, ApiClient};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// Login, registration and password changes.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        AuthService { api }
    }

    /// Exchanges credentials for a token and stores it in the session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let mut v = Violations::new();
        v.required("Username", username);
        v.required("Password", password);
        v.into_result()?;

        let body = LoginRequest {
            username: username.trim(),
            password,
        };
        let value = self.api.post("auth/login", &body).await.map_err(|e| {
            warn!(username = %username.trim(), error = %e, "Login failed");
            e
        })?;
        let LoginResponse { token, user } = serde_json::from_value::<LoginResponse>(value)?;

        self.api.session().sign_in(token, user.clone()).await?;
        Ok(user)
    }

    /// Self-registration as a customer. Does not sign in.
    pub async fn register(&self, mut form: RegistrationForm) -> ClientResult<Option<String>> {
        form.prepare();
        form.validate().into_result()?;

        let value: Value = self.api.post("auth/register", &form).await?;
        info!(username = %form.username, "Customer registered");
        Ok(envelope_message(&value))
    }

    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> ClientResult<Option<String>> {
        let mut v = Violations::new();
        v.password_change(current, new, confirm);
        v.into_result()?;

        self.api.session().require_user().await?;
        let body = ChangePasswordRequest {
            current_password: current,
            new_password: new,
        };
        let value = self.api.put("auth/change-password", &body).await?;
        info!("Password changed");
        Ok(envelope_message(&value))
    }

    /// Local only.
    pub async fn logout(&self) -> ClientResult<()> {
        self.api.session().sign_out().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.api.session().user().await
    }
}
