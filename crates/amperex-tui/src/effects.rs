//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They cover I/O and task spawning only; the reducer never performs either.

use std::time::Duration;

use amperex_core::login_flow::DemoStep;
use amperex_core::navigation::Route;
use amperex_types::Credentials;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Run the guard for `route` and show it if admitted.
    EnterRoute(Route),

    /// Send credentials to the backend.
    Authenticate { epoch: u64, credentials: Credentials },

    /// Wait out a simulated reset step.
    StartDelay {
        epoch: u64,
        step: DemoStep,
        duration: Duration,
    },

    /// Store the demo session after a verified OTP.
    StartDemoSession { email: String },

    /// Fetch dashboard statistics (guarded).
    LoadStats,

    Logout,
}
