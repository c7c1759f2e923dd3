//! Team page.

mod render;

pub use render::render_team;
