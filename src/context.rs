use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{BlockStore, IssueTrackerService, Notifier};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub blocks: Arc<dyn BlockStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        issue_tracker: Arc<dyn IssueTrackerService>,
        blocks: Arc<dyn BlockStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            issue_tracker,
            blocks,
            notifier,
        }
    }
}
