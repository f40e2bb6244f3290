use std::path::PathBuf;

use crate::cache::RefreshLedger;
use crate::cmd::block_id;
use crate::config::OrgSelector;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::refresh::ledger_entry;
use crate::workflow::update::{UpdateOutcome, update_block};

#[derive(Debug, Clone)]
pub struct UpdateCommandArgs {
    pub block: PathBuf,
    pub second: bool,
}

pub async fn run(ctx: &AppContext, args: UpdateCommandArgs) -> AppResult<UpdateOutcome> {
    let id = block_id(&args.block).await?;
    let org = OrgSelector::from_flag(args.second);
    let outcome = update_block(ctx, &id, org).await?;

    if outcome.written {
        let mut ledger = RefreshLedger::load()?;
        ledger.record(ledger_entry(&id, org, &outcome));
        ledger.save()?;
    }

    Ok(outcome)
}
