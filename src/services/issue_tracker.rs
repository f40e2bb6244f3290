use async_trait::async_trait;

use crate::config::ConnectionSettings;
use crate::domain::ticket::{TicketKey, TicketRecord};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn fetch_issue(
        &self,
        key: &TicketKey,
        connection: &ConnectionSettings,
    ) -> AppResult<TicketRecord>;

    async fn search(
        &self,
        jql: &str,
        max_results: usize,
        connection: &ConnectionSettings,
    ) -> AppResult<Vec<TicketRecord>>;
}
