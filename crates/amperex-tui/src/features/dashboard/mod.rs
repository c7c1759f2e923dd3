//! Dashboard page: summary statistics and where they came from.

mod render;
mod state;

pub use render::{format_count, render_dashboard};
pub use state::DashboardState;
