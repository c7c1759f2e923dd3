//! Feature slices for the TUI (state/update/render per page).

pub mod dashboard;
pub mod login;
pub mod team;
