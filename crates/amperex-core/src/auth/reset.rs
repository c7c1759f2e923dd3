//! Password-reset demo.
//!
//! There is no reset endpoint on the backend. The email step always
//! succeeds after a simulated round trip, and the OTP step accepts exactly
//! one configured code, then signs in with a fixed demo identity.

use std::time::Duration;

use amperex_types::{Session, User};

use crate::config::Config;

/// Token installed by a successful OTP verification.
pub const DEMO_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.eyJ1c2VySWQiOiI2NzgyZjMxZjU2ZWM2ZDUwOGQ1MjQzYzEiLCJlbWFpbCI6ImFkbWluQGV4YW1wbGUuY29tIiwiaWF0IjoxNzM2NTk2NzY3LCJleHAiOjE3MzY2ODMxNjd9.dummy";

pub const DEMO_USER_ID: &str = "6782f31f56ec6d508d5243c1";
pub const DEMO_USERNAME: &str = "admin";
pub const DEMO_NAME: &str = "Admin User";

/// Number of digits in a verification code.
pub const OTP_LENGTH: usize = 6;

/// Settings for the simulated reset steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub otp_code: String,
    pub delay: Duration,
}

impl Default for PasswordReset {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PasswordReset {
    pub fn from_config(config: &Config) -> Self {
        Self {
            otp_code: config.demo.otp_code.clone(),
            delay: config.demo_delay(),
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        code == self.otp_code
    }

    pub fn invalid_code_message(&self) -> String {
        format!("Invalid OTP. Please use {} for demo.", self.otp_code)
    }

    pub fn resent_notice(&self) -> String {
        format!("OTP resent! Use {}", self.otp_code)
    }

    /// Stands in for the server round trip of a reset step.
    pub async fn round_trip(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Session created by a verified OTP for `email`.
pub fn demo_session(email: &str) -> Session {
    Session::new(
        DEMO_TOKEN,
        Some(User {
            id: DEMO_USER_ID.to_string(),
            username: DEMO_USERNAME.to_string(),
            email: Some(email.to_string()),
            role: None,
            name: Some(DEMO_NAME.to_string()),
        }),
    )
}
