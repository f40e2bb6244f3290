pub mod config;
pub mod jql;
pub mod refresh;
pub mod update;

use std::path::Path;

use crate::error::{AppError, AppResult};

/// Block ids are absolute paths so ledger entries survive a change of cwd.
pub(crate) async fn block_id(path: &Path) -> AppResult<String> {
    match tokio::fs::canonicalize(path).await {
        Ok(absolute) => Ok(absolute.display().to_string()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::BlockNotFound {
            block_id: path.display().to_string(),
        }),
        Err(err) => Err(AppError::Io(err)),
    }
}
