use tracing::debug;

use crate::cache::RefreshLedger;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::refresh::{RefreshSummary, refresh_all};

pub async fn run(ctx: &AppContext) -> AppResult<RefreshSummary> {
    let mut ledger = RefreshLedger::load()?;
    debug!(path = %ledger.path().display(), entries = ledger.entries().len(), "loaded refresh ledger");

    let result = refresh_all(ctx, &mut ledger).await;
    ledger.save()?;
    result
}
