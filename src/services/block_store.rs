use async_trait::async_trait;

use crate::domain::properties::BlockProperties;
use crate::error::AppResult;

#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Current content of a block, `None` when the block does not exist.
    async fn block_text(&self, block_id: &str) -> AppResult<Option<String>>;

    /// Overwrites the block content in one write. When `properties` is given
    /// they are merged over the block's existing property section.
    async fn update_block(
        &self,
        block_id: &str,
        text: &str,
        properties: Option<&BlockProperties>,
    ) -> AppResult<()>;

    async fn insert_child_blocks(&self, parent_id: &str, children: &[String]) -> AppResult<()>;
}
