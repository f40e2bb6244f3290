use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::domain::ticket::TicketRecord;
use crate::text::patterns::Syntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Key,
    StatusCategoryIcon,
    StatusCategoryName,
    Summary,
    Assignee,
    Priority,
    FixVersion,
    Status,
    IssueType,
    Creator,
    Reporter,
    Resolution,
    Link,
}

impl Placeholder {
    pub const ALL: [Placeholder; 13] = [
        Placeholder::Key,
        Placeholder::StatusCategoryIcon,
        Placeholder::StatusCategoryName,
        Placeholder::Summary,
        Placeholder::Assignee,
        Placeholder::Priority,
        Placeholder::FixVersion,
        Placeholder::Status,
        Placeholder::IssueType,
        Placeholder::Creator,
        Placeholder::Reporter,
        Placeholder::Resolution,
        Placeholder::Link,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Key => "key",
            Placeholder::StatusCategoryIcon => "statuscategoryicon",
            Placeholder::StatusCategoryName => "statuscategoryname",
            Placeholder::Summary => "summary",
            Placeholder::Assignee => "assignee",
            Placeholder::Priority => "priority",
            Placeholder::FixVersion => "fixversion",
            Placeholder::Status => "status",
            Placeholder::IssueType => "issuetype",
            Placeholder::Creator => "creator",
            Placeholder::Reporter => "reporter",
            Placeholder::Resolution => "resolution",
            Placeholder::Link => "link",
        }
    }

    fn value(self, ticket: &TicketRecord) -> String {
        match self {
            Placeholder::Key => ticket.key.to_string(),
            Placeholder::StatusCategoryIcon => ticket.status_category_color.icon().to_string(),
            Placeholder::StatusCategoryName => ticket.status_category_name.clone(),
            Placeholder::Summary => ticket.summary.clone(),
            Placeholder::Assignee => ticket.assignee_name.clone(),
            Placeholder::Priority => ticket.priority.clone(),
            Placeholder::FixVersion => ticket.fix_version_label(),
            Placeholder::Status => ticket.status_name.clone(),
            Placeholder::IssueType => ticket.issue_type.clone(),
            Placeholder::Creator => ticket.creator_name.clone(),
            Placeholder::Reporter => ticket.reporter_name.clone(),
            Placeholder::Resolution => ticket.resolution_label().to_string(),
            Placeholder::Link => ticket.url.clone(),
        }
    }
}

static PLACEHOLDER_PATTERNS: LazyLock<Vec<(Placeholder, Regex)>> = LazyLock::new(|| {
    Placeholder::ALL
        .iter()
        .map(|&p| (p, Regex::new(&format!("(?i)%{}%", p.name())).unwrap()))
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSettings {
    pub template: String,
    pub syntax: Syntax,
    pub expert_mode: bool,
}

/// Replaces every known `%name%` (any letter case). Unknown names stay as written.
pub fn interpolate(template: &str, ticket: &TicketRecord) -> String {
    PLACEHOLDER_PATTERNS
        .iter()
        .fold(template.to_string(), |text, (placeholder, pattern)| {
            pattern
                .replace_all(&text, NoExpand(&placeholder.value(ticket)))
                .into_owned()
        })
}

pub fn format_link(syntax: Syntax, url: &str, text: &str) -> String {
    match syntax {
        Syntax::Markdown => format!("[{text}]({url})"),
        Syntax::OrgMode => format!("[[{url}][{text}]]"),
    }
}

pub fn format_issue(ticket: &TicketRecord, settings: &FormatSettings) -> String {
    if settings.expert_mode {
        return interpolate(&settings.template, ticket);
    }

    let segments = split_bracket_spans(&settings.template);
    if !segments.iter().any(|s| matches!(s, Segment::Span(_))) {
        let plain: String = segments
            .iter()
            .map(|s| match s {
                Segment::Text(text) | Segment::Span(text) => text.as_str(),
            })
            .collect();
        return format_link(settings.syntax, &ticket.url, &interpolate(&plain, ticket));
    }

    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => interpolate(text, ticket),
            Segment::Span(text) => {
                format_link(settings.syntax, &ticket.url, &interpolate(text, ticket))
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Span(String),
}

fn split_bracket_spans(template: &str) -> Vec<Segment> {
    let chars: Vec<char> = template.chars().collect();
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                text.push(chars[i + 1]);
                i += 2;
            }
            '[' => match span_end(&chars, i) {
                Some(end) => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Span(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                }
                None => {
                    text.push('[');
                    i += 1;
                }
            },
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Index of the `]` closing the span opened at `open`. Escaped brackets do not count.
fn span_end(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}
