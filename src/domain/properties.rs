use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::domain::ticket::TicketRecord;

pub type BlockProperties = IndexMap<String, String>;

static PROPERTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+?)::\s*(.*?)\s*$").unwrap());

/// Which ticket fields are attached to a block as `key:: value` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFlags {
    pub summary: bool,
    pub assignee: bool,
    pub priority: bool,
    pub fix_version: bool,
    pub status: bool,
    pub reporter: bool,
    pub resolution: bool,
    pub custom_tags: Option<String>,
}

pub fn synthesize_properties(ticket: &TicketRecord, flags: &PropertyFlags) -> BlockProperties {
    let mut properties = BlockProperties::new();

    if flags.summary {
        properties.insert("summary".to_string(), ticket.summary.clone());
    }
    if flags.assignee {
        properties.insert("assignee".to_string(), ticket.assignee_name.clone());
    }
    if flags.priority {
        properties.insert("priority".to_string(), ticket.priority.clone());
    }
    if flags.fix_version {
        properties.insert("fix-version".to_string(), ticket.fix_version_label());
    }
    if flags.status {
        properties.insert("status".to_string(), ticket.status_name.clone());
    }
    if flags.reporter {
        properties.insert("reporter".to_string(), ticket.reporter_name.clone());
    }
    if let (true, Some(resolution)) = (flags.resolution, &ticket.resolution_name) {
        properties.insert("resolution".to_string(), resolution.clone());
    }
    if let Some(tags) = flags.custom_tags.as_deref().filter(|t| !t.trim().is_empty()) {
        properties.insert("tags".to_string(), tags.to_string());
    }

    properties
}

fn first_property_line(lines: &[&str]) -> usize {
    lines
        .iter()
        .position(|line| PROPERTY_LINE.is_match(line))
        .unwrap_or(lines.len())
}

/// Splits a block into its content and its properties. The property section
/// starts at the first `key:: value` line; any other line found after it
/// stays part of the content.
pub fn split_properties(text: &str) -> (String, BlockProperties) {
    let lines: Vec<&str> = text.split('\n').collect();
    let cut = first_property_line(&lines);

    let mut content: Vec<&str> = lines[..cut].to_vec();
    let mut properties = BlockProperties::new();
    for &line in &lines[cut..] {
        match PROPERTY_LINE.captures(line) {
            Some(caps) => {
                properties.insert(caps[1].trim().to_string(), caps[2].to_string());
            }
            None => content.push(line),
        }
    }

    (content.join("\n"), properties)
}

pub fn strip_properties(text: &str) -> String {
    split_properties(text).0
}

pub fn render_properties(content: &str, properties: &BlockProperties) -> String {
    let mut rendered = content.to_string();
    for (key, value) in properties {
        rendered.push('\n');
        rendered.push_str(key);
        rendered.push_str(":: ");
        rendered.push_str(value);
    }
    rendered
}
