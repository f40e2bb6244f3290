use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::properties::{BlockProperties, render_properties, split_properties};
use crate::error::{AppError, AppResult};
use crate::services::BlockStore;

/// Block id is the file path; trailing `key:: value` lines are properties.
#[derive(Debug, Default, Clone)]
pub struct FileBlockStore;

impl FileBlockStore {
    pub fn new() -> Self {
        Self
    }

    async fn read(path: &Path) -> AppResult<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(store_error(path, err)),
        }
    }

    async fn read_existing(path: &Path) -> AppResult<String> {
        Self::read(path).await?.ok_or_else(|| AppError::BlockNotFound {
            block_id: path.display().to_string(),
        })
    }

    /// Writes through a sibling temp file so readers never see a partial block.
    async fn write(path: &Path, contents: &str) -> AppResult<()> {
        let staging = staging_path(path);
        fs::write(&staging, contents)
            .await
            .map_err(|err| store_error(&staging, err))?;
        fs::rename(&staging, path)
            .await
            .map_err(|err| store_error(path, err))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.ticketlink-tmp"))
}

fn store_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::BlockStore(format!("{}: {err}", path.display()))
}

#[async_trait]
impl BlockStore for FileBlockStore {
    async fn block_text(&self, block_id: &str) -> AppResult<Option<String>> {
        Self::read(Path::new(block_id)).await
    }

    async fn update_block(
        &self,
        block_id: &str,
        text: &str,
        properties: Option<&BlockProperties>,
    ) -> AppResult<()> {
        let path = Path::new(block_id);
        let existing = Self::read_existing(path).await?;

        let (_, mut merged) = split_properties(&existing);
        if let Some(properties) = properties {
            for (key, value) in properties {
                merged.insert(key.clone(), value.clone());
            }
        }

        debug!(block_id, properties = merged.len(), "writing block");
        Self::write(path, &render_properties(text.trim_end_matches('\n'), &merged)).await
    }

    async fn insert_child_blocks(&self, parent_id: &str, children: &[String]) -> AppResult<()> {
        if children.is_empty() {
            return Ok(());
        }

        let path = Path::new(parent_id);
        let existing = Self::read_existing(path).await?;
        let (content, properties) = split_properties(&existing);

        let mut updated = content.trim_end_matches('\n').to_string();
        for child in children {
            if !updated.is_empty() {
                updated.push('\n');
            }
            updated.push_str("- ");
            updated.push_str(child);
        }

        debug!(parent_id, children = children.len(), "inserting child blocks");
        Self::write(path, &render_properties(&updated, &properties)).await
    }
}
