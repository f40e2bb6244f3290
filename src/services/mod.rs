pub mod block_store;
pub mod issue_tracker;
pub mod notifier;

pub use block_store::BlockStore;
pub use issue_tracker::IssueTrackerService;
pub use notifier::{Notifier, Severity};
