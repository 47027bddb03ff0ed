use fb_api_types::{AuthResponse, LoginRequest, RegisterRequest, User};
use fb_core::error::ApiError;
use fb_core::session_store::StoredSession;
use reqwest::Method;
use tracing::{info, warn};

use crate::client::FunnelClient;

impl FunnelClient {
    /// Sign in and keep the returned token for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self.request(Method::POST, "/auth/login").json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let auth: AuthResponse = self.json("auth.login", req).await?;
        self.remember(&auth);
        Ok(auth)
    }

    /// Create an account (and tenant) and keep the returned token.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let req = self.request(Method::POST, "/auth/register").json(request);
        let auth: AuthResponse = self.json("auth.register", req).await?;
        self.remember(&auth);
        Ok(auth)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.json("auth.me", self.request(Method::GET, "/auth/me")).await
    }

    /// End the session on the backend, then forget the token locally.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .empty("auth.logout", self.request(Method::GET, "/auth/logout"))
            .await;
        self.clear_token();
        result
    }

    fn remember(&self, auth: &AuthResponse) {
        self.set_token(&auth.token);
        if let Some(store) = self.session_store() {
            let session = StoredSession::new(&auth.token, Some(auth.user.email.clone()));
            if let Err(e) = store.save(&session) {
                warn!(path = %store.path().display(), error = %e, "could not persist session");
            }
        }
        info!(user = %auth.user.email, persisted = self.session_store().is_some(), "signed in");
    }
}
