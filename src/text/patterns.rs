use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::ticket::TicketKey;
use crate::error::{AppError, AppResult};

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[(?P<description>(?:[^\[\]]|\[(?:[^\[\]]|\[[^\[\]]*\])*\])*)\]\((?P<url>https?://[^\s/]+/browse/(?P<issue>[A-Z][A-Z0-9]{1,6}-[0-9]{1,8}))\)",
    )
    .unwrap()
});

static ORG_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[\[(?P<url>https?://[^\s/]+/browse/(?P<issue>[A-Z][A-Z0-9]{1,6}-[0-9]{1,8}))\]\[(?P<description>[^\]]*)\]\]",
    )
    .unwrap()
});

/// Cloud-hosted instances; self-hosted ones are only caught by host-anchored variants.
static CLOUD_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<url>https?://[^\s/()\[\]]{1,25}\.atlassian\.net/browse/(?P<issue>[A-Z][A-Z0-9]{1,6}-[0-9]{1,8}))",
    )
    .unwrap()
});

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<issue>[A-Z][A-Z0-9]+-[0-9]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    #[default]
    Markdown,
    OrgMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Link,
    Url,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    MarkdownUrl,
    OrgUrl,
    /// Preceded by whitespace or nothing, and not followed by an optional
    /// character then `]`.
    MarkdownKey,
    OrgKey,
}

impl Boundary {
    fn allows(self, text: &str, start: usize, end: usize) -> bool {
        let before = &text[..start];
        let after = &text[end..];
        match self {
            Boundary::None => true,
            Boundary::MarkdownUrl => !before.ends_with('(') && !after.starts_with(')'),
            Boundary::OrgUrl => !before.ends_with("[[") && !after.starts_with("]]"),
            Boundary::MarkdownKey => standalone(before) && !closes_within_one(after, "]"),
            Boundary::OrgKey => standalone(before) && !closes_within_one(after, "]]"),
        }
    }
}

fn standalone(before: &str) -> bool {
    before.chars().next_back().is_none_or(char::is_whitespace)
}

/// `after` starts with `closing`, or with one non-newline character followed by it.
fn closes_within_one(after: &str, closing: &str) -> bool {
    if after.starts_with(closing) {
        return true;
    }
    match after.chars().next() {
        Some(c) if !matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') => {
            after[c.len_utf8()..].starts_with(closing)
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    pub start: usize,
    pub end: usize,
    pub full: &'t str,
    pub description: Option<&'t str>,
    pub url: Option<&'t str>,
    pub key: TicketKey,
}

impl<'t> PatternMatch<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let whole = caps.get(0)?;
        let key = TicketKey::parse(caps.name("issue")?.as_str())?;
        Some(Self {
            start: whole.start(),
            end: whole.end(),
            full: whole.as_str(),
            description: caps.name("description").map(|m| m.as_str()),
            url: caps.name("url").map(|m| m.as_str()),
            key,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IssuePattern {
    kind: PatternKind,
    regex: Regex,
    boundary: Boundary,
}

impl IssuePattern {
    fn new(kind: PatternKind, regex: Regex, boundary: Boundary) -> Self {
        Self {
            kind,
            regex,
            boundary,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn find_iter<'t>(&self, text: &'t str) -> Vec<PatternMatch<'t>> {
        let mut found = Vec::new();
        let mut at = 0;

        while at <= text.len() {
            let Some(caps) = self.regex.captures_at(text, at) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            if !self.boundary.allows(text, whole.start(), whole.end()) {
                at = next_char(text, whole.start());
                continue;
            }

            if let Some(found_match) = PatternMatch::from_captures(&caps) {
                found.push(found_match);
            }
            at = if whole.is_empty() {
                next_char(text, whole.end())
            } else {
                whole.end()
            };
        }

        found
    }
}

fn next_char(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<IssuePattern>,
}

impl PatternLibrary {
    pub fn new<S: AsRef<str>>(syntax: Syntax, hosts: &[S]) -> AppResult<Self> {
        let (link, url_boundary, key_boundary) = match syntax {
            Syntax::Markdown => (&MARKDOWN_LINK, Boundary::MarkdownUrl, Boundary::MarkdownKey),
            Syntax::OrgMode => (&ORG_LINK, Boundary::OrgUrl, Boundary::OrgKey),
        };

        let mut links = vec![IssuePattern::new(
            PatternKind::Link,
            Regex::clone(link),
            Boundary::None,
        )];
        let mut urls = vec![IssuePattern::new(
            PatternKind::Url,
            CLOUD_URL.clone(),
            url_boundary,
        )];

        for host in hosts {
            let host: &str = host.as_ref();
            if host.is_empty() {
                continue;
            }
            let host = regex::escape(host);
            let url = format!(r"(?P<url>https?://{host}/browse/(?P<issue>[A-Z][A-Z0-9]+-[0-9]+))");
            let anchored_link = match syntax {
                Syntax::Markdown => format!(r"\[(?P<description>[^\]]*)\]\({url}\)"),
                Syntax::OrgMode => format!(r"\[\[{url}\]\[(?P<description>[^\]]*)\]\]"),
            };
            links.push(IssuePattern::new(
                PatternKind::Link,
                compile(&anchored_link)?,
                Boundary::None,
            ));
            urls.push(IssuePattern::new(
                PatternKind::Url,
                compile(&url)?,
                url_boundary,
            ));
        }

        let mut patterns = links;
        patterns.extend(urls);
        patterns.push(IssuePattern::new(
            PatternKind::Key,
            BARE_KEY.clone(),
            key_boundary,
        ));

        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[IssuePattern] {
        &self.patterns
    }

    pub fn linked_keys(&self, text: &str) -> Vec<TicketKey> {
        self.patterns
            .iter()
            .filter(|p| p.kind() != PatternKind::Key)
            .flat_map(|p| p.find_iter(text))
            .map(|m| m.key)
            .collect()
    }
}

fn compile(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern)
        .map_err(|err| AppError::Configuration(format!("invalid host pattern: {err}")))
}
