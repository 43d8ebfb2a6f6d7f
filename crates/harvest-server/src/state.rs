use chrono::NaiveDate;
use harvest_core::config::Config;
use harvest_core::store::Store;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Fixed "today" for projections; `None` uses the local calendar date.
    pinned_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            pinned_today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Open a fresh connection. Call from inside `spawn_blocking`.
    pub fn store(&self) -> harvest_core::Result<Store> {
        self.config.open_store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_today_wins() {
        let cfg = Config::for_data_dir(std::path::Path::new("/tmp/harvest-test"));
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let state = AppState::new(cfg).with_today(d);
        assert_eq!(state.today(), d);
    }
}
