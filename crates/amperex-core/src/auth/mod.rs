//! Login, logout, and session queries against the dashboard backend.

pub mod reset;

use std::sync::Arc;

use amperex_types::{Credentials, LoginResponse, User};
use anyhow::{Context, Result};

use crate::gateway::{Gateway, GatewayError, GatewayErrorKind};
use crate::navigation::Redirect;
use crate::session::SessionStore;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const LOGIN_FAILED_RETRY: &str = "Login failed. Please try again.";
pub const LOGIN_FAILED: &str = "Login failed";

/// Auth operations on top of the gateway and its session store.
#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn store(&self) -> &Arc<dyn SessionStore> {
        self.gateway.store()
    }

    /// Submits credentials. A response with `success` and a token replaces
    /// the stored session; anything else leaves it untouched.
    ///
    /// A 401 from the login endpoint goes through the gateway like any other
    /// 401 and clears whatever session was stored.
    ///
    /// # Errors
    /// Returns the [`GatewayError`] (downcastable) when the request fails, or
    /// an error if the session cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        tracing::debug!(username = %credentials.username, "login attempt");

        let response: LoginResponse = self
            .gateway
            .post_json("/auth/login", credentials)
            .await?;

        match response.session() {
            Some(session) => {
                self.store()
                    .save(&session)
                    .context("Failed to store session")?;
                tracing::info!(username = %credentials.username, "logged in");
            }
            None => {
                tracing::info!(
                    username = %credentials.username,
                    message = %response.message,
                    "login refused"
                );
            }
        }

        Ok(response)
    }

    /// Notifies the backend, then clears the session and redirects to the
    /// entry route whatever the backend said.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.post_empty("/auth/logout").await {
            tracing::debug!("Logout request failed: {e}");
        }

        if let Err(e) = self.store().clear() {
            tracing::warn!("Failed to clear session: {e:#}");
        }
        self.gateway.navigator().navigate(Redirect::to_entry());
        tracing::info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store().current_user()
    }

    pub fn token(&self) -> Option<String> {
        self.store().token()
    }

    /// Asks the backend who the stored token belongs to.
    ///
    /// # Errors
    /// Returns the [`GatewayError`] when the request fails. A 401 has already
    /// evicted the session by the time this returns.
    pub async fn fetch_me(&self) -> Result<User> {
        let user = self.gateway.get_json("/auth/me").await?;
        Ok(user)
    }
}

/// Inline message for a failed login request.
pub fn login_error_message(error: &anyhow::Error) -> String {
    let Some(err) = error.downcast_ref::<GatewayError>() else {
        return LOGIN_FAILED_RETRY.to_string();
    };

    match err.kind {
        GatewayErrorKind::Unauthorized => INVALID_CREDENTIALS.to_string(),
        GatewayErrorKind::HttpStatus if err.status == Some(500) => SERVER_ERROR.to_string(),
        GatewayErrorKind::Timeout | GatewayErrorKind::Network => NETWORK_ERROR.to_string(),
        GatewayErrorKind::HttpStatus | GatewayErrorKind::Parse => err
            .server_message
            .clone()
            .unwrap_or_else(|| LOGIN_FAILED_RETRY.to_string()),
    }
}

/// Inline message for a response that came back with `success: false`.
pub fn refused_login_message(response: &LoginResponse) -> String {
    if response.message.trim().is_empty() {
        LOGIN_FAILED.to_string()
    } else {
        response.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use amperex_types::Session;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::navigation::NavigationLog;
    use crate::session::MemorySessionStore;

    struct Harness {
        auth: AuthService,
        store: Arc<MemorySessionStore>,
        log: Arc<NavigationLog>,
    }

    fn harness(base_url: &str, session: Option<Session>) -> Harness {
        let store = Arc::new(session.map_or_else(
            MemorySessionStore::new,
            MemorySessionStore::with_session,
        ));
        let log = Arc::new(NavigationLog::new());
        let gateway = Gateway::with_timeout(
            base_url,
            Some(Duration::from_secs(5)),
            store.clone(),
            log.clone(),
        )
        .unwrap();
        Harness {
            auth: AuthService::new(gateway),
            store,
            log,
        }
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "admin", "password": "admin123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Login successful",
                "token": "abc",
                "user": {"id": "1", "username": "admin", "email": "admin@example.com", "role": "admin"}
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Incorrect username or password"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_failed_then_successful_login() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let h = harness(&server.uri(), None);

        let err = h
            .auth
            .login(&Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(login_error_message(&err), INVALID_CREDENTIALS);
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.auth.token(), None);

        let response = h
            .auth
            .login(&Credentials::new("admin", "admin123"))
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(h.auth.token().as_deref(), Some("abc"));
        assert_eq!(h.auth.current_user().unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_refused_login_leaves_session_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Account locked"
            })))
            .mount(&server)
            .await;

        let previous = Session::new("old", None);
        let h = harness(&server.uri(), Some(previous.clone()));
        let response = h
            .auth
            .login(&Credentials::new("admin", "x"))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(refused_login_message(&response), "Account locked");
        assert_eq!(h.store.load().unwrap(), Some(previous));
    }

    #[tokio::test]
    async fn test_success_without_user_stores_token_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "ok",
                "token": "t-1"
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), None);
        h.auth.login(&Credentials::new("a", "b")).await.unwrap();
        assert_eq!(h.auth.token().as_deref(), Some("t-1"));
        assert_eq!(h.auth.current_user(), None);
    }

    #[tokio::test]
    async fn test_server_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), None);
        let err = h.auth.login(&Credentials::new("a", "b")).await.unwrap_err();
        assert_eq!(login_error_message(&err), SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_other_status_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Username too short"})),
            )
            .mount(&server)
            .await;

        let h = harness(&server.uri(), None);
        let err = h.auth.login(&Credentials::new("a", "b")).await.unwrap_err();
        assert_eq!(login_error_message(&err), "Username too short");
    }

    #[tokio::test]
    async fn test_unreachable_backend_message() {
        let h = harness("http://127.0.0.1:1", None);
        let err = h.auth.login(&Credentials::new("a", "b")).await.unwrap_err();
        assert_eq!(login_error_message(&err), NETWORK_ERROR);
    }

    #[test]
    fn test_unknown_error_message() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(login_error_message(&err), LOGIN_FAILED_RETRY);
        let refused = LoginResponse {
            success: false,
            message: String::new(),
            token: None,
            user: None,
        };
        assert_eq!(refused_login_message(&refused), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn test_logout_clears_and_redirects_twice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), Some(Session::new("abc", None)));
        h.auth.logout().await;
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.log.last(), Some(Redirect::to_entry()));

        h.auth.logout().await;
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.log.len(), 2);
    }

    #[tokio::test]
    async fn test_logout_survives_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), Some(Session::new("abc", None)));
        h.auth.logout().await;
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.log.last(), Some(Redirect::to_entry()));

        let h = harness("http://127.0.0.1:1", Some(Session::new("abc", None)));
        h.auth.logout().await;
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.log.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_me_evicts_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), Some(Session::new("forged", None)));
        let err = h.auth.fetch_me().await.unwrap_err();
        let gateway_err = err.downcast_ref::<GatewayError>().unwrap();
        assert_eq!(gateway_err.kind, GatewayErrorKind::Unauthorized);
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.log.last(), Some(Redirect::to_entry()));
    }

    #[tokio::test]
    async fn test_fetch_me_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1", "username": "admin", "email": "admin@example.com", "role": "admin"
            })))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), Some(Session::new("abc", None)));
        let user = h.auth.fetch_me().await.unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role.as_deref(), Some("admin"));
    }
}
