use amperex_core::dashboard::StatsOutcome;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<StatsOutcome>,
    pub loading: bool,
    pub loaded_at: Option<DateTime<Local>>,
}

impl DashboardState {
    /// Marks a fetch in flight. Returns false if one already is.
    pub fn start_loading(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish(&mut self, outcome: StatsOutcome, at: DateTime<Local>) {
        self.stats = Some(outcome);
        self.loaded_at = Some(at);
        self.loading = false;
    }
}
