pub mod block_file;
pub mod console;
pub mod jira;

pub use block_file::FileBlockStore;
pub use console::ConsoleNotifier;
pub use jira::JiraClient;
