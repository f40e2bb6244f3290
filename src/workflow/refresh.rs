use chrono::Utc;
use tracing::{info, warn};

use crate::cache::{LedgerEntry, RefreshLedger};
use crate::config::OrgSelector;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::update::{UpdateOutcome, update_block};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub removed: usize,
    pub failed: usize,
}

pub fn ledger_entry(block_id: &str, org: OrgSelector, outcome: &UpdateOutcome) -> LedgerEntry {
    LedgerEntry {
        block_id: block_id.to_string(),
        keys: outcome.keys.iter().map(ToString::to_string).collect(),
        org,
        updated_at: Utc::now(),
    }
}

pub async fn refresh_all(ctx: &AppContext, ledger: &mut RefreshLedger) -> AppResult<RefreshSummary> {
    let mut summary = RefreshSummary::default();
    let pending: Vec<LedgerEntry> = ledger.entries().to_vec();

    for entry in pending {
        match update_block(ctx, &entry.block_id, entry.org).await {
            Ok(outcome) => {
                if outcome.written {
                    ledger.record(ledger_entry(&entry.block_id, entry.org, &outcome));
                }
                summary.refreshed += 1;
            }
            Err(AppError::BlockNotFound { .. } | AppError::NoIssues { .. }) => {
                ledger.remove(&entry.block_id);
                summary.removed += 1;
            }
            Err(error @ AppError::Configuration(_)) => return Err(error),
            Err(error) => {
                warn!(block_id = %entry.block_id, %error, "refresh failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        refreshed = summary.refreshed,
        removed = summary.removed,
        failed = summary.failed,
        "refresh finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::{Harness, stored_config};

    fn entry(block_id: &str) -> LedgerEntry {
        LedgerEntry {
            block_id: block_id.to_string(),
            keys: Vec::new(),
            org: OrgSelector::Primary,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn refreshes_and_prunes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = RefreshLedger::load_from(dir.path().join("ledger.json")).unwrap();
        ledger.record(entry("live"));
        ledger.record(entry("gone"));
        ledger.record(entry("empty"));

        let harness = Harness::new(stored_config(), &["DEV-1"]);
        harness.blocks.put("live", "DEV-1");
        harness.blocks.put("empty", "no tickets anymore");

        let summary = refresh_all(&harness.ctx, &mut ledger).await.unwrap();

        assert_eq!(
            summary,
            RefreshSummary {
                refreshed: 1,
                removed: 2,
                failed: 0
            }
        );
        assert_eq!(ledger.entries().len(), 1);
        assert_eq!(ledger.entries()[0].keys, ["DEV-1"]);
    }

    #[tokio::test]
    async fn configuration_error_stops_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = RefreshLedger::load_from(dir.path().join("ledger.json")).unwrap();
        let mut secondary = entry("b");
        secondary.org = OrgSelector::Secondary;
        ledger.record(secondary);

        let harness = Harness::new(stored_config(), &["DEV-1"]);
        harness.blocks.put("b", "DEV-1");

        let result = refresh_all(&harness.ctx, &mut ledger).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(ledger.entries().len(), 1);
    }
}
