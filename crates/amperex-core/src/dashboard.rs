//! Dashboard bootstrap: guard check, then the summary statistics.
//!
//! The summary is always fully populated. When live numbers are not
//! available the fixed fallback summary is used, and [`StatsSource`] says
//! why, so an outage is not mistaken for real data.

use std::fmt;

use amperex_types::{DashboardSummary, StatsResponse};

use crate::gateway::{Gateway, GatewayErrorKind};
use crate::navigation::{GuardOutcome, Redirect, Route, RouteGuard};

/// Why the fallback summary is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// `api.offline` is set; no request was made.
    NotConfigured,
    /// No response (refused, DNS, timeout).
    Unreachable(String),
    /// The backend answered with an error status or an unreadable body.
    BackendError(String),
}

/// Where the displayed summary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsSource {
    Live,
    /// The backend answered `success: false` but still sent numbers.
    Degraded { message: String },
    Fallback(FallbackReason),
}

impl fmt::Display for StatsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsSource::Live => write!(f, "live"),
            StatsSource::Degraded { message } => write!(f, "degraded: {message}"),
            StatsSource::Fallback(FallbackReason::NotConfigured) => {
                write!(f, "sample data (backend not configured)")
            }
            StatsSource::Fallback(FallbackReason::Unreachable(msg)) => {
                write!(f, "sample data (backend unreachable: {msg})")
            }
            StatsSource::Fallback(FallbackReason::BackendError(msg)) => {
                write!(f, "sample data (backend error: {msg})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsOutcome {
    pub summary: DashboardSummary,
    pub source: StatsSource,
}

impl StatsOutcome {
    fn fallback(reason: FallbackReason) -> Self {
        Self {
            summary: DashboardSummary::fallback(),
            source: StatsSource::Fallback(reason),
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == StatsSource::Live
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    /// The dashboard may not be shown. Nothing was fetched, or the backend
    /// rejected the session (already cleared by the gateway).
    Redirected(Redirect),
    Ready(StatsOutcome),
}

#[derive(Clone)]
pub struct DashboardService {
    gateway: Gateway,
}

impl DashboardService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Runs the guard for `/dashboard`, then loads the statistics once.
    pub async fn bootstrap(&self, guard: &RouteGuard) -> Bootstrap {
        if let GuardOutcome::Redirected(redirect) = guard.check_route(Route::Dashboard) {
            return Bootstrap::Redirected(redirect);
        }
        self.load_stats().await
    }

    async fn load_stats(&self) -> Bootstrap {
        if self.gateway.is_offline() {
            return Bootstrap::Ready(StatsOutcome::fallback(FallbackReason::NotConfigured));
        }

        let outcome = match self
            .gateway
            .get_json::<StatsResponse>("/dashboard/stats")
            .await
        {
            Ok(response) if response.success => StatsOutcome {
                summary: response.data,
                source: StatsSource::Live,
            },
            Ok(response) => StatsOutcome {
                summary: response.data,
                source: StatsSource::Degraded {
                    message: response
                        .message
                        .unwrap_or_else(|| "Backend reported a failure".to_string()),
                },
            },
            Err(e) if e.kind == GatewayErrorKind::Unauthorized => {
                return Bootstrap::Redirected(Redirect::to_entry());
            }
            Err(e) if e.is_transport() => {
                tracing::warn!("Dashboard stats unavailable: {e}");
                StatsOutcome::fallback(FallbackReason::Unreachable(e.message))
            }
            Err(e) => {
                tracing::warn!("Dashboard stats failed: {e}");
                StatsOutcome::fallback(FallbackReason::BackendError(e.message))
            }
        };

        Bootstrap::Ready(outcome)
    }
}
