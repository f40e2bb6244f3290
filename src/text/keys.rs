use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::domain::ticket::TicketKey;
use crate::text::patterns::PatternLibrary;

static KEY_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z][A-Z0-9]+-[0-9]+").unwrap());

const CLOSING_DELIMITERS: [&str; 3] = ["]]", "))", "}}"];

fn ends_token(after: &str) -> bool {
    after.is_empty()
        || after.starts_with(char::is_whitespace)
        || CLOSING_DELIMITERS.iter().any(|d| after.starts_with(d))
}

/// Every ticket key in `text`, first occurrence first, without duplicates.
pub fn extract_issues(text: &str) -> Vec<TicketKey> {
    let mut keys = IndexSet::new();
    let mut at = 0;

    while let Some(found) = KEY_TOKEN.find_at(text, at) {
        if ends_token(&text[found.end()..]) {
            if let Some(key) = TicketKey::parse(found.as_str()) {
                keys.insert(key);
            }
            at = found.end();
        } else {
            at = found.start() + text[found.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }

    keys.into_iter().collect()
}

pub fn collect_issue_keys(text: &str, library: &PatternLibrary) -> Vec<TicketKey> {
    let mut keys: IndexSet<TicketKey> = extract_issues(text).into_iter().collect();
    keys.extend(library.linked_keys(text));
    keys.into_iter().collect()
}
