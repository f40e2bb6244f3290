use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::properties::PropertyFlags;
use crate::error::{AppError, AppResult};
use crate::text::{FormatSettings, Syntax};

const CONFIG_DIR_NAME: &str = "ticketlink";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_LINK_FORMAT: &str = "%statuscategoryicon% %statuscategoryname% - %key%|%summary%";
pub const DEFAULT_JQL_QUERY: &str =
    "assignee = currentUser() AND statusCategory != Done and Updated >= -30d";
pub const DEFAULT_API_VERSION: &str = "3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgSelector {
    #[default]
    Primary,
    Secondary,
}

impl OrgSelector {
    pub fn from_flag(second: bool) -> Self {
        if second {
            OrgSelector::Secondary
        } else {
            OrgSelector::Primary
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    BasicAuth,
    PersonalAccessToken,
}

impl AuthMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic" | "basic auth" | "basicauth" => Some(AuthMode::BasicAuth),
            "pat" | "bearer" | "personal access token" => Some(AuthMode::PersonalAccessToken),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub base_host: String,
    pub username: String,
    pub api_token: String,
    pub auth_mode: AuthMode,
    pub api_version: String,
}

impl ConnectionSettings {
    pub fn rest_base(&self) -> String {
        format!("https://{}/rest/api/{}", self.base_host, self.api_version)
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("https://{}/browse/{}", self.base_host, key)
    }
}

/// Strips scheme and trailing slashes so every consumer sees a bare host.
pub fn normalize_host(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredOrg {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub auth_type: Option<String>,
    pub api_version: Option<String>,
}

impl StoredOrg {
    fn host(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(normalize_host)
            .filter(|host| !host.is_empty())
    }

    fn credentials_missing(&self) -> bool {
        let pat = non_empty(&self.auth_type).and_then(|value| AuthMode::from_str(&value))
            == Some(AuthMode::PersonalAccessToken);
        self.host().is_none()
            || non_empty(&self.api_token).is_none()
            || (!pat && non_empty(&self.username).is_none())
    }

    fn connection(&self) -> AppResult<ConnectionSettings> {
        let base_host = self
            .host()
            .ok_or_else(|| AppError::Configuration("Jira base URL not configured".to_string()))?;
        let api_token = non_empty(&self.api_token)
            .ok_or_else(|| AppError::Configuration("Jira API token not configured".to_string()))?;

        let auth_mode = match non_empty(&self.auth_type) {
            None => AuthMode::BasicAuth,
            Some(value) => AuthMode::from_str(&value).ok_or_else(|| {
                AppError::Configuration(format!("unknown auth type '{value}' (use basic or pat)"))
            })?,
        };

        let username = non_empty(&self.username).unwrap_or_default();
        if auth_mode == AuthMode::BasicAuth && username.is_empty() {
            return Err(AppError::Configuration(
                "Jira username not configured".to_string(),
            ));
        }

        let api_version = non_empty(&self.api_version).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if api_version != "2" && api_version != "3" {
            return Err(AppError::Configuration(format!(
                "unsupported Jira API version '{api_version}' (use 2 or 3)"
            )));
        }

        Ok(ConnectionSettings {
            base_host,
            username,
            api_token,
            auth_mode,
            api_version,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    pub primary: StoredOrg,
    pub enable_second: Option<bool>,
    pub secondary: StoredOrg,
    pub issue_link_format: Option<String>,
    pub issue_link_format_org_mode: Option<String>,
    pub org_mode: Option<bool>,
    pub expert_mode: Option<bool>,
    pub update_inline_text: Option<bool>,
    pub add_to_block_properties: Option<bool>,
    pub show_summary: Option<bool>,
    pub show_assignee: Option<bool>,
    pub show_priority: Option<bool>,
    pub show_fix_version: Option<bool>,
    pub show_status: Option<bool>,
    pub show_reporter: Option<bool>,
    pub show_resolution: Option<bool>,
    pub custom_tags: Option<String>,
    pub jql_query: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            ("TICKETLINK_BASE_URL", &mut self.primary.base_url),
            ("TICKETLINK_USERNAME", &mut self.primary.username),
            ("TICKETLINK_API_TOKEN", &mut self.primary.api_token),
        ];
        for (name, target) in overrides {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *target = Some(value);
            }
        }
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("no user configuration directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    stored: StoredConfig,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let mut stored = StoredConfig::load()?;
        stored.apply_env_overrides(|name| env::var(name).ok());
        Ok(Self::from_stored(stored))
    }

    pub fn from_stored(stored: StoredConfig) -> Self {
        Self { stored }
    }

    pub fn second_enabled(&self) -> bool {
        self.stored.enable_second.unwrap_or(false)
    }

    pub fn connection(&self, org: OrgSelector) -> AppResult<ConnectionSettings> {
        match org {
            OrgSelector::Primary => self.stored.primary.connection(),
            OrgSelector::Secondary if self.second_enabled() => self.stored.secondary.connection(),
            OrgSelector::Secondary => Err(AppError::Configuration(
                "second organization is not enabled".to_string(),
            )),
        }
    }

    pub fn credentials_missing(&self, org: OrgSelector) -> bool {
        match org {
            OrgSelector::Primary => self.stored.primary.credentials_missing(),
            OrgSelector::Secondary => {
                self.second_enabled() && self.stored.secondary.credentials_missing()
            }
        }
    }

    pub fn syntax(&self) -> Syntax {
        if self.stored.org_mode.unwrap_or(false) {
            Syntax::OrgMode
        } else {
            Syntax::Markdown
        }
    }

    /// Hosts for the host-anchored matchers; the second one only when enabled.
    pub fn pattern_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.stored.primary.host().into_iter().collect();
        if self.second_enabled() {
            hosts.extend(self.stored.secondary.host());
        }
        hosts
    }

    pub fn format_settings(&self) -> FormatSettings {
        let syntax = self.syntax();
        let template = match syntax {
            Syntax::Markdown => non_empty(&self.stored.issue_link_format),
            Syntax::OrgMode => non_empty(&self.stored.issue_link_format_org_mode),
        }
        .unwrap_or_else(|| DEFAULT_LINK_FORMAT.to_string());

        FormatSettings {
            template,
            syntax,
            expert_mode: self.stored.expert_mode.unwrap_or(false),
        }
    }

    pub fn property_flags(&self) -> PropertyFlags {
        let s = &self.stored;
        PropertyFlags {
            summary: s.show_summary.unwrap_or(false),
            assignee: s.show_assignee.unwrap_or(false),
            priority: s.show_priority.unwrap_or(false),
            fix_version: s.show_fix_version.unwrap_or(false),
            status: s.show_status.unwrap_or(false),
            reporter: s.show_reporter.unwrap_or(false),
            resolution: s.show_resolution.unwrap_or(false),
            custom_tags: non_empty(&s.custom_tags),
        }
    }

    pub fn update_inline_text(&self) -> bool {
        self.stored.update_inline_text.unwrap_or(true)
    }

    pub fn add_to_block_properties(&self) -> bool {
        self.stored.add_to_block_properties.unwrap_or(false)
    }

    pub fn jql_query(&self) -> String {
        non_empty(&self.stored.jql_query).unwrap_or_else(|| DEFAULT_JQL_QUERY.to_string())
    }
}
