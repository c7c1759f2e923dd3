//! Core AmpereX library (session, gateway, auth, navigation, dashboard).

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod logging;
pub mod login_flow;
pub mod navigation;
pub mod session;
