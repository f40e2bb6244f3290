use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::config::{AppConfig, ConnectionSettings, StoredConfig, StoredOrg};
use crate::context::AppContext;
use crate::domain::properties::BlockProperties;
use crate::domain::ticket::tests::record;
use crate::domain::ticket::{TicketKey, TicketRecord};
use crate::error::{AppError, AppResult};
use crate::services::{BlockStore, IssueTrackerService, Notifier, Severity};

pub fn stored_config() -> StoredConfig {
    StoredConfig {
        primary: StoredOrg {
            base_url: Some("https://acme.atlassian.net".to_string()),
            username: Some("me@example.com".to_string()),
            api_token: Some("token".to_string()),
            ..StoredOrg::default()
        },
        ..StoredConfig::default()
    }
}

/// Knows a fixed set of tickets; every other key is a 404.
#[derive(Default)]
pub struct MockTracker {
    records: IndexMap<String, TicketRecord>,
    broken: Mutex<HashSet<String>>,
    misconfigured: Mutex<HashSet<String>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockTracker {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTrackerService for MockTracker {
    async fn fetch_issue(
        &self,
        key: &TicketKey,
        _connection: &ConnectionSettings,
    ) -> AppResult<TicketRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.misconfigured.lock().unwrap().contains(key.as_str()) {
            return Err(AppError::Configuration("bad connection".to_string()));
        }
        if self.broken.lock().unwrap().contains(key.as_str()) {
            return Err(AppError::IssueTracker("Jira responded with 502".to_string()));
        }
        self.records
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                key: key.to_string(),
            })
    }

    async fn search(
        &self,
        jql: &str,
        max_results: usize,
        _connection: &ConnectionSettings,
    ) -> AppResult<Vec<TicketRecord>> {
        self.queries
            .lock()
            .unwrap()
            .push((jql.to_string(), max_results));
        Ok(self.records.values().take(max_results).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryBlocks {
    blocks: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, Option<BlockProperties>)>>,
}

impl MemoryBlocks {
    pub fn put(&self, id: &str, text: &str) {
        self.blocks
            .lock()
            .unwrap()
            .insert(id.to_string(), text.to_string());
    }

    pub fn text(&self, id: &str) -> String {
        self.blocks.lock().unwrap()[id].clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_write(&self) -> (String, Option<BlockProperties>) {
        self.writes.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl BlockStore for MemoryBlocks {
    async fn block_text(&self, block_id: &str) -> AppResult<Option<String>> {
        Ok(self.blocks.lock().unwrap().get(block_id).cloned())
    }

    async fn update_block(
        &self,
        block_id: &str,
        text: &str,
        properties: Option<&BlockProperties>,
    ) -> AppResult<()> {
        let mut blocks = self.blocks.lock().unwrap();
        let slot = blocks
            .get_mut(block_id)
            .ok_or_else(|| AppError::BlockNotFound {
                block_id: block_id.to_string(),
            })?;
        *slot = text.to_string();
        self.writes
            .lock()
            .unwrap()
            .push((text.to_string(), properties.cloned()));
        Ok(())
    }

    async fn insert_child_blocks(&self, parent_id: &str, children: &[String]) -> AppResult<()> {
        let mut blocks = self.blocks.lock().unwrap();
        let slot = blocks
            .get_mut(parent_id)
            .ok_or_else(|| AppError::BlockNotFound {
                block_id: parent_id.to_string(),
            })?;
        for child in children {
            slot.push_str("\n- ");
            slot.push_str(child);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_message(&self, text: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((text.to_string(), severity));
    }
}

pub struct Harness {
    pub ctx: AppContext,
    pub tracker: Arc<MockTracker>,
    pub blocks: Arc<MemoryBlocks>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(stored: StoredConfig, known: &[&str]) -> Self {
        let tracker = Arc::new(MockTracker {
            records: known
                .iter()
                .map(|key| (key.to_string(), record(key)))
                .collect(),
            ..MockTracker::default()
        });
        let blocks = Arc::new(MemoryBlocks::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = AppContext::new(
            AppConfig::from_stored(stored),
            tracker.clone(),
            blocks.clone(),
            notifier.clone(),
        );

        Self {
            ctx,
            tracker,
            blocks,
            notifier,
        }
    }

    pub fn with_broken(self, key: &str) -> Self {
        self.tracker.broken.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn with_misconfigured(self, key: &str) -> Self {
        self.tracker
            .misconfigured
            .lock()
            .unwrap()
            .insert(key.to_string());
        self
    }
}
