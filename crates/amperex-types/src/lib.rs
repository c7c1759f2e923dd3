//! Shared data model for the AmpereX console.
//!
//! Wire types mirror the JSON the dashboard backend speaks (camelCase keys),
//! so they can be used directly with `reqwest::Response::json`.

pub mod auth;
pub mod dashboard;

pub use auth::{Credentials, LoginResponse, Session, User};
pub use dashboard::{DashboardSummary, StatsResponse};
