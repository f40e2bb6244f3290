use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_JQL_QUERY, DEFAULT_LINK_FORMAT, StoredConfig, StoredOrg, config_file_path,
};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring ticketlink.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    prompt_org("Primary", &mut cfg.primary)?;

    apply_flag_prompt("Enable a second organization", &mut cfg.enable_second)?;
    if cfg.enable_second.unwrap_or(false) {
        prompt_org("Second", &mut cfg.secondary)?;
    }

    println!("\nLink format placeholders: %key% %summary% %status% %statuscategoryicon% %statuscategoryname%");
    println!("  %priority% %assignee% %reporter% %creator% %issuetype% %fixversion% %resolution% %link%");
    println!("Default: {DEFAULT_LINK_FORMAT}");
    apply_prompt("Issue link format", &mut cfg.issue_link_format, false)?;
    apply_flag_prompt("Use org-mode links", &mut cfg.org_mode)?;
    if cfg.org_mode.unwrap_or(false) {
        apply_prompt(
            "Issue link format (org mode)",
            &mut cfg.issue_link_format_org_mode,
            false,
        )?;
    }
    apply_flag_prompt(
        "Expert mode (format supplies its own link)",
        &mut cfg.expert_mode,
    )?;
    apply_flag_prompt("Rewrite ticket references in text", &mut cfg.update_inline_text)?;

    apply_flag_prompt("Add ticket fields as block properties", &mut cfg.add_to_block_properties)?;
    if cfg.add_to_block_properties.unwrap_or(false) {
        apply_flag_prompt("  summary", &mut cfg.show_summary)?;
        apply_flag_prompt("  assignee", &mut cfg.show_assignee)?;
        apply_flag_prompt("  priority", &mut cfg.show_priority)?;
        apply_flag_prompt("  fix version", &mut cfg.show_fix_version)?;
        apply_flag_prompt("  status", &mut cfg.show_status)?;
        apply_flag_prompt("  reporter", &mut cfg.show_reporter)?;
        apply_flag_prompt("  resolution", &mut cfg.show_resolution)?;
        apply_prompt("  custom tags", &mut cfg.custom_tags, false)?;
    }

    println!("\nDefault query: {DEFAULT_JQL_QUERY}");
    apply_prompt("JQL query for `ticketlink jql`", &mut cfg.jql_query, false)?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn prompt_org(label: &str, org: &mut StoredOrg) -> AppResult<()> {
    println!("{label} organization");
    apply_prompt(
        "  Jira base URL (e.g., company.atlassian.net)",
        &mut org.base_url,
        false,
    )?;
    apply_prompt("  Username / email", &mut org.username, false)?;
    apply_prompt("  API token", &mut org.api_token, true)?;
    apply_prompt("  Auth type (basic/pat)", &mut org.auth_type, false)?;
    apply_prompt("  API version (2/3)", &mut org.api_version, false)?;
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    show_org("Primary", &cfg.primary);
    println!("Second organization enabled: {}", display_flag(cfg.enable_second, false));
    if cfg.enable_second.unwrap_or(false) {
        show_org("Second", &cfg.secondary);
    }
    println!("Issue link format: {}", display_value(&cfg.issue_link_format));
    println!(
        "Issue link format (org mode): {}",
        display_value(&cfg.issue_link_format_org_mode)
    );
    println!("Org mode: {}", display_flag(cfg.org_mode, false));
    println!("Expert mode: {}", display_flag(cfg.expert_mode, false));
    println!(
        "Rewrite inline text: {}",
        display_flag(cfg.update_inline_text, true)
    );
    println!(
        "Block properties: {}",
        display_flag(cfg.add_to_block_properties, false)
    );
    println!("Custom tags: {}", display_value(&cfg.custom_tags));
    println!("JQL query: {}", display_value(&cfg.jql_query));

    Ok(())
}

fn show_org(label: &str, org: &StoredOrg) {
    println!("{label} organization:");
    println!("  Jira base URL: {}", display_value(&org.base_url));
    println!("  Username: {}", display_value(&org.username));
    println!("  API token: {}", mask_secret(&org.api_token));
    println!("  Auth type: {}", display_value(&org.auth_type));
    println!("  API version: {}", display_value(&org.api_version));
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    let current = match (target.as_deref(), secret) {
        (Some(_), true) => Some("****".to_string()),
        (value, _) => value.map(str::to_string),
    };
    match parse_answer(&read_answer(field, current.as_deref())?) {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn apply_flag_prompt(field: &str, target: &mut Option<bool>) -> AppResult<()> {
    let current = target.map(|flag| if flag { "yes" } else { "no" });
    match parse_answer(&read_answer(field, current)?) {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(parse_flag(&value)?),
    }
    Ok(())
}

fn read_answer(field: &str, current: Option<&str>) -> AppResult<String> {
    let mut stdout = io::stdout();

    match current {
        Some(value) => write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

fn parse_answer(input: &str) -> PromptAction {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        PromptAction::Keep
    } else if trimmed == "-" {
        PromptAction::Clear
    } else {
        PromptAction::Set(trimmed.to_string())
    }
}

fn parse_flag(value: &str) -> AppResult<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "true" | "on" => Ok(true),
        "n" | "no" | "false" | "off" => Ok(false),
        other => Err(AppError::Configuration(format!(
            "expected yes or no, got '{other}'"
        ))),
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_flag(value: Option<bool>, default: bool) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None if default => "yes (default)",
        None => "no (default)",
    }
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_answers() {
        assert_eq!(parse_answer("\n"), PromptAction::Keep);
        assert_eq!(parse_answer(" - \n"), PromptAction::Clear);
        assert_eq!(
            parse_answer("acme.atlassian.net\n"),
            PromptAction::Set("acme.atlassian.net".to_string())
        );
    }

    #[test]
    fn parses_flags() {
        assert!(parse_flag("Yes").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(&Some("abcdefghij".to_string())), "abc***hij");
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn shows_flag_defaults() {
        assert_eq!(display_flag(None, true), "yes (default)");
        assert_eq!(display_flag(Some(false), true), "no");
    }
}
