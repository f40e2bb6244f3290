pub mod keys;
pub mod patterns;
pub mod replace;
pub mod template;

pub use keys::collect_issue_keys;
pub use patterns::{PatternLibrary, Syntax};
pub use replace::replace_issues;
pub use template::{FormatSettings, format_issue};
