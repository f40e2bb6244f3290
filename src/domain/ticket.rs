use std::borrow::Borrow;
use std::fmt;

/// Project prefix, dash, numeric id: `DEV-42`. The prefix is uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketKey(String);

impl TicketKey {
    pub fn parse(value: &str) -> Option<Self> {
        let (prefix, number) = value.split_once('-')?;
        let mut prefix_chars = prefix.chars();
        let head_ok = prefix_chars
            .next()
            .is_some_and(|c| c.is_ascii_uppercase());
        let tail: Vec<char> = prefix_chars.collect();
        let tail_ok =
            !tail.is_empty() && tail.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        let number_ok = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());

        (head_ok && tail_ok && number_ok).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TicketKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategoryColor {
    Yellow,
    Green,
    Other,
}

impl StatusCategoryColor {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("yellow") => StatusCategoryColor::Yellow,
            Some("green") => StatusCategoryColor::Green,
            _ => StatusCategoryColor::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            StatusCategoryColor::Yellow => "\u{1F535}",
            StatusCategoryColor::Green => "\u{1F7E2}",
            StatusCategoryColor::Other => "\u{26AA}\u{FE0F}",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    pub key: TicketKey,
    pub summary: String,
    pub status_name: String,
    pub status_category_name: String,
    pub status_category_color: StatusCategoryColor,
    pub issue_type: String,
    pub priority: String,
    pub creator_name: String,
    pub reporter_name: String,
    pub assignee_name: String,
    pub fix_versions: Vec<String>,
    pub resolution_name: Option<String>,
    pub url: String,
}

impl TicketRecord {
    pub fn fix_version_label(&self) -> String {
        if self.fix_versions.is_empty() {
            "None".to_string()
        } else {
            self.fix_versions.join(", ")
        }
    }

    pub fn resolution_label(&self) -> &str {
        self.resolution_name.as_deref().unwrap_or("None")
    }
}
