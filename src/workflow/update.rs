use std::collections::HashMap;

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::{ConnectionSettings, OrgSelector};
use crate::context::AppContext;
use crate::domain::properties::{BlockProperties, strip_properties, synthesize_properties};
use crate::domain::ticket::{TicketKey, TicketRecord};
use crate::error::{AppError, AppResult};
use crate::services::Severity;
use crate::text::{PatternLibrary, collect_issue_keys, format_issue, replace_issues};

pub const MISSING_CREDENTIALS: &str = "Jira credentials not set. Update your configuration.";
pub const NO_ISSUES: &str = "Couldn't find any Jira issues.";

#[derive(Debug)]
pub struct UpdateOutcome {
    pub keys: Vec<TicketKey>,
    pub fetched: usize,
    pub written: bool,
}

pub(crate) fn connection_for(ctx: &AppContext, org: OrgSelector) -> AppResult<ConnectionSettings> {
    ctx.config.connection(org).inspect_err(|error| {
        let message = if ctx.config.credentials_missing(org) {
            MISSING_CREDENTIALS.to_string()
        } else {
            error.to_string()
        };
        ctx.notifier.show_message(&message, Severity::Error);
    })
}

pub async fn fetch_batch(
    ctx: &AppContext,
    keys: &[TicketKey],
    connection: &ConnectionSettings,
) -> AppResult<IndexMap<TicketKey, TicketRecord>> {
    let requests = keys.iter().map(|key| async move {
        let result = ctx.issue_tracker.fetch_issue(key, connection).await;
        (key, result)
    });

    let mut records = IndexMap::new();
    for (key, result) in join_all(requests).await {
        match result {
            Ok(record) => {
                records.insert(key.clone(), record);
            }
            Err(AppError::NotFound { .. }) => ctx
                .notifier
                .show_message(&format!("Could not find issue {key}."), Severity::Warning),
            Err(error) if error.is_recoverable() => ctx
                .notifier
                .show_message(&format!("Failed to fetch {key}: {error}"), Severity::Error),
            Err(error) => return Err(error),
        }
    }

    debug!(requested = keys.len(), fetched = records.len(), "fetch batch done");
    Ok(records)
}

pub async fn update_block(
    ctx: &AppContext,
    block_id: &str,
    org: OrgSelector,
) -> AppResult<UpdateOutcome> {
    let connection = connection_for(ctx, org)?;

    let raw = ctx
        .blocks
        .block_text(block_id)
        .await?
        .ok_or_else(|| AppError::BlockNotFound {
            block_id: block_id.to_string(),
        })?;
    let content = strip_properties(&raw);

    let hosts = ctx.config.pattern_hosts();
    let library = PatternLibrary::new(ctx.config.syntax(), hosts.as_slice())?;
    let keys = collect_issue_keys(&content, &library);
    if keys.is_empty() {
        ctx.notifier.show_message(NO_ISSUES, Severity::Error);
        return Err(AppError::NoIssues {
            block_id: block_id.to_string(),
        });
    }

    let records = fetch_batch(ctx, &keys, &connection).await?;
    if records.is_empty() {
        return Ok(UpdateOutcome {
            keys,
            fetched: 0,
            written: false,
        });
    }

    let text = if ctx.config.update_inline_text() {
        let settings = ctx.config.format_settings();
        let fragments: HashMap<TicketKey, String> = records
            .iter()
            .map(|(key, record)| (key.clone(), format_issue(record, &settings)))
            .collect();
        let replacement = replace_issues(&content, &library, &fragments);
        debug!(
            replaced = replacement.ledger.keys().count(),
            "references rewritten"
        );
        replacement.text
    } else {
        content
    };

    let properties: Option<BlockProperties> = if ctx.config.add_to_block_properties() {
        let flags = ctx.config.property_flags();
        keys.iter()
            .find_map(|key| records.get(key))
            .map(|record| synthesize_properties(record, &flags))
    } else {
        None
    };

    ctx.blocks
        .update_block(block_id, &text, properties.as_ref())
        .await?;
    info!(block_id, fetched = records.len(), "block updated");

    Ok(UpdateOutcome {
        keys,
        fetched: records.len(),
        written: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoredConfig;
    use crate::workflow::testing::{Harness, stored_config};

    #[tokio::test]
    async fn rewrites_bare_key() {
        let harness = Harness::new(stored_config(), &["DEV-42"]);
        harness.blocks.put("b1", "Check DEV-42 please");

        let outcome = update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        assert!(outcome.written);
        assert_eq!(
            harness.blocks.text("b1"),
            "Check [\u{1F7E2} Done - DEV-42|Fix bug](https://org/browse/DEV-42) please"
        );
        assert!(harness.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_ticket_is_reported_and_skipped() {
        let harness = Harness::new(stored_config(), &["DEV-1"]);
        harness.blocks.put("b1", "DEV-1 and DEV-404");

        let outcome = update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        assert_eq!(outcome.keys.len(), 2);
        assert_eq!(outcome.fetched, 1);
        assert!(harness.blocks.text("b1").ends_with(" and DEV-404"));
        assert_eq!(
            harness.notifier.messages(),
            [("Could not find issue DEV-404.".to_string(), Severity::Warning)]
        );
    }

    #[tokio::test]
    async fn transient_failure_is_reported_as_error() {
        let harness = Harness::new(stored_config(), &["DEV-1"]).with_broken("DEV-2");
        harness.blocks.put("b1", "DEV-1 DEV-2");

        update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        let messages = harness.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].0.starts_with("Failed to fetch DEV-2: "));
        assert_eq!(messages[0].1, Severity::Error);
    }

    #[tokio::test]
    async fn no_keys_notifies_and_leaves_block() {
        let harness = Harness::new(stored_config(), &[]);
        harness.blocks.put("b1", "nothing here");

        let result = update_block(&harness.ctx, "b1", OrgSelector::Primary).await;

        assert!(matches!(result, Err(AppError::NoIssues { .. })));
        assert_eq!(harness.blocks.writes(), 0);
        assert_eq!(harness.notifier.messages()[0].0, NO_ISSUES);
    }

    #[tokio::test]
    async fn missing_credentials_abort_before_fetching() {
        let harness = Harness::new(StoredConfig::default(), &["DEV-1"]);
        harness.blocks.put("b1", "DEV-1");

        let result = update_block(&harness.ctx, "b1", OrgSelector::Primary).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(harness.tracker.calls(), 0);
        assert_eq!(harness.notifier.messages()[0].0, MISSING_CREDENTIALS);
    }

    #[tokio::test]
    async fn non_recoverable_fetch_error_aborts_batch() {
        let harness = Harness::new(stored_config(), &["DEV-1"]).with_misconfigured("DEV-2");
        harness.blocks.put("b1", "DEV-1 DEV-2");

        let result = update_block(&harness.ctx, "b1", OrgSelector::Primary).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(harness.blocks.writes(), 0);
    }

    #[tokio::test]
    async fn nothing_fetched_skips_write() {
        let harness = Harness::new(stored_config(), &[]);
        harness.blocks.put("b1", "DEV-9");

        let outcome = update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        assert!(!outcome.written);
        assert_eq!(harness.blocks.writes(), 0);
    }

    #[tokio::test]
    async fn properties_come_from_first_fetched_key() {
        let mut stored = stored_config();
        stored.update_inline_text = Some(false);
        stored.add_to_block_properties = Some(true);
        stored.show_summary = Some(true);
        let harness = Harness::new(stored, &["OPS-2"]);
        harness.blocks.put("b1", "DEV-1 OPS-2\nowner:: me");

        update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        let (text, properties) = harness.blocks.last_write();
        assert_eq!(text, "DEV-1 OPS-2");
        let properties = properties.unwrap();
        assert_eq!(properties.get("summary").map(String::as_str), Some("Fix bug"));
        assert_eq!(properties.len(), 1);
    }

    #[tokio::test]
    async fn secondary_org_requires_enable_flag() {
        let harness = Harness::new(stored_config(), &["DEV-1"]);
        harness.blocks.put("b1", "DEV-1");

        let result = update_block(&harness.ctx, "b1", OrgSelector::Secondary).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(
            harness.notifier.messages(),
            [(
                "configuration error: second organization is not enabled".to_string(),
                Severity::Error
            )]
        );
    }

    #[tokio::test]
    async fn keeps_plain_lines_below_properties() {
        let harness = Harness::new(stored_config(), &["DEV-1", "DEV-2"]);
        harness.blocks.put("b1", "DEV-1\nowner:: me\nping DEV-2");

        update_block(&harness.ctx, "b1", OrgSelector::Primary)
            .await
            .unwrap();

        let (text, _) = harness.blocks.last_write();
        assert_eq!(
            text,
            "[\u{1F7E2} Done - DEV-1|Fix bug](https://org/browse/DEV-1)\n\
             ping [\u{1F7E2} Done - DEV-2|Fix bug](https://org/browse/DEV-2)"
        );
    }

    #[tokio::test]
    async fn missing_block_is_reported() {
        let harness = Harness::new(stored_config(), &["DEV-1"]);
        let result = update_block(&harness.ctx, "gone", OrgSelector::Primary).await;
        assert!(matches!(result, Err(AppError::BlockNotFound { .. })));
    }
}
