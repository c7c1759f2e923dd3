//! Login page: sign in, forgot password, OTP verification.

mod render;
mod state;
mod update;

pub use render::render_login;
pub use state::{Field, LoginState};
pub use update::{handle_delay_elapsed, handle_key, handle_login_finished};
