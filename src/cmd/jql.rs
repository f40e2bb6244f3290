use std::path::PathBuf;

use crate::cmd::block_id;
use crate::config::OrgSelector;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::jql::pull_query;

#[derive(Debug, Clone)]
pub struct JqlCommandArgs {
    pub block: PathBuf,
    pub second: bool,
    pub query: Option<String>,
}

pub async fn run(ctx: &AppContext, args: JqlCommandArgs) -> AppResult<usize> {
    let id = block_id(&args.block).await?;
    pull_query(
        ctx,
        &id,
        OrgSelector::from_flag(args.second),
        args.query.as_deref(),
    )
    .await
}
