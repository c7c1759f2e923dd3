//! Authentication types: credentials, login envelope, and the client session.

use serde::{Deserialize, Serialize};

/// Message shown when either credential field is blank.
pub const MISSING_CREDENTIALS: &str = "Please enter both username and password";

/// A signed-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Human name; only some sources (the password-reset demo) fill it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Name shown in the sidebar/footer.
    pub fn display_name(&self) -> &str {
        if !self.username.is_empty() {
            &self.username
        } else {
            self.name.as_deref().unwrap_or("Guest User")
        }
    }

    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("guest@example.com")
    }
}

/// Username/password pair submitted once per login attempt. Never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Rejects blank fields before anything goes over the wire.
    ///
    /// # Errors
    /// Returns the inline message to display when a field is empty.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(MISSING_CREDENTIALS);
        }
        Ok(())
    }
}

// Keep passwords out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl LoginResponse {
    /// Returns the session to persist, if this response grants one.
    pub fn session(&self) -> Option<Session> {
        if !self.success {
            return None;
        }
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        Some(Session {
            token: token.to_string(),
            user: self.user.clone(),
        })
    }
}

/// Client-held token + user pair.
///
/// The serialized key names match the browser storage keys the dashboard
/// used (`authToken`, `user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "authToken")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}
