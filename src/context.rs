use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::IssueTrackerService;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
}

impl AppContext {
    pub fn new(config: AppConfig, issue_tracker: Arc<dyn IssueTrackerService>) -> Self {
        Self {
            config,
            issue_tracker,
        }
    }

    #[cfg(test)]
    pub fn for_tests(issue_tracker: Arc<dyn IssueTrackerService>) -> Self {
        use crate::config::StoredConfig;

        let config = AppConfig::from_sources(StoredConfig::default(), |_| None)
            .expect("default config is valid");
        Self::new(config, issue_tracker)
    }
}
