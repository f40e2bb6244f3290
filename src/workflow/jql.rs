use tracing::info;

use crate::config::OrgSelector;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::services::Severity;
use crate::text::format_issue;
use crate::workflow::update::connection_for;

pub const JQL_MAX_RESULTS: usize = 50;

pub async fn pull_query(
    ctx: &AppContext,
    parent_id: &str,
    org: OrgSelector,
    query: Option<&str>,
) -> AppResult<usize> {
    let connection = connection_for(ctx, org)?;

    if ctx.blocks.block_text(parent_id).await?.is_none() {
        return Err(AppError::BlockNotFound {
            block_id: parent_id.to_string(),
        });
    }

    let jql = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => query.to_string(),
        None => ctx.config.jql_query(),
    };

    let records = ctx
        .issue_tracker
        .search(&jql, JQL_MAX_RESULTS, &connection)
        .await?;
    if records.is_empty() {
        ctx.notifier
            .show_message("No issues matched the query.", Severity::Info);
        return Ok(0);
    }

    let settings = ctx.config.format_settings();
    let children: Vec<String> = records
        .iter()
        .map(|record| format_issue(record, &settings))
        .collect();

    ctx.blocks.insert_child_blocks(parent_id, &children).await?;
    info!(parent_id, inserted = children.len(), "query results inserted");
    Ok(children.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_JQL_QUERY;
    use crate::workflow::testing::{Harness, stored_config};

    #[tokio::test]
    async fn inserts_one_child_per_result() {
        let harness = Harness::new(stored_config(), &["DEV-1", "DEV-2"]);
        harness.blocks.put("p", "Open work");

        let inserted = pull_query(&harness.ctx, "p", OrgSelector::Primary, None)
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(
            harness.blocks.text("p"),
            "Open work\n\
             - [\u{1F7E2} Done - DEV-1|Fix bug](https://org/browse/DEV-1)\n\
             - [\u{1F7E2} Done - DEV-2|Fix bug](https://org/browse/DEV-2)"
        );
        assert_eq!(
            harness.tracker.queries(),
            [(DEFAULT_JQL_QUERY.to_string(), JQL_MAX_RESULTS)]
        );
    }

    #[tokio::test]
    async fn explicit_query_overrides_configured_one() {
        let mut stored = stored_config();
        stored.jql_query = Some("project = OPS".to_string());
        let harness = Harness::new(stored, &["OPS-1"]);
        harness.blocks.put("p", "");

        pull_query(&harness.ctx, "p", OrgSelector::Primary, Some("project = DEV"))
            .await
            .unwrap();
        pull_query(&harness.ctx, "p", OrgSelector::Primary, Some("  "))
            .await
            .unwrap();

        let queries: Vec<String> = harness
            .tracker
            .queries()
            .into_iter()
            .map(|(jql, _)| jql)
            .collect();
        assert_eq!(queries, ["project = DEV", "project = OPS"]);
    }

    #[tokio::test]
    async fn empty_result_inserts_nothing() {
        let harness = Harness::new(stored_config(), &[]);
        harness.blocks.put("p", "Open work");

        let inserted = pull_query(&harness.ctx, "p", OrgSelector::Primary, None)
            .await
            .unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(harness.blocks.text("p"), "Open work");
        assert_eq!(harness.notifier.messages()[0].1, Severity::Info);
    }

    #[tokio::test]
    async fn missing_parent_is_an_error() {
        let harness = Harness::new(stored_config(), &["DEV-1"]);
        let result = pull_query(&harness.ctx, "gone", OrgSelector::Primary, None).await;
        assert!(matches!(result, Err(AppError::BlockNotFound { .. })));
        assert!(harness.tracker.queries().is_empty());
    }
}
