use std::fmt::Display;
use std::io::{self, Write};
use std::str::FromStr;

use clap::{Args, Subcommand};

use crate::config::{DEFAULT_CANDIDATE_LIMIT, StoredConfig, config_file_path};
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

    println!("Configuring warroom.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt(
        "Jira base URL (e.g., https://company.atlassian.net)",
        &mut cfg.jira_base_url,
        false,
    )?;
    apply_prompt("Jira email", &mut cfg.jira_email, false)?;
    apply_prompt("Jira API token", &mut cfg.jira_token, true)?;
    apply_parsed_prompt(
        "Candidates checked per auto-assign",
        &mut cfg.candidate_limit,
    )?;
    apply_parsed_prompt("Only assign human accounts (true/false)", &mut cfg.humans_only)?;
    apply_parsed_prompt("Read attempts before giving up", &mut cfg.retry_attempts)?;
    apply_parsed_prompt(
        "Initial retry backoff (ms)",
        &mut cfg.retry_initial_backoff_ms,
    )?;

    if cfg.candidate_limit == Some(0) {
        return Err(AppError::Configuration(
            "candidate limit must be at least 1".to_string(),
        ));
    }

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    for line in summary_lines(&cfg) {
        println!("{line}");
    }

    Ok(())
}

fn summary_lines(cfg: &StoredConfig) -> Vec<String> {
    vec![
        format!("Jira base URL: {}", display_value(&cfg.jira_base_url)),
        format!("Jira email: {}", display_value(&cfg.jira_email)),
        format!("Jira API token: {}", mask_secret(&cfg.jira_token)),
        format!(
            "Candidate limit: {}",
            cfg.candidate_limit.unwrap_or(DEFAULT_CANDIDATE_LIMIT)
        ),
        format!("Humans only: {}", cfg.humans_only.unwrap_or(false)),
        format!("Read attempts: {}", display_value(&cfg.retry_attempts)),
        format!(
            "Initial retry backoff (ms): {}",
            display_value(&cfg.retry_initial_backoff_ms)
        ),
    ]
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn apply_parsed_prompt<T>(field: &str, target: &mut Option<T>) -> AppResult<()>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let current = target.as_ref().map(|value| value.to_string());
    match prompt(field, current.as_deref(), false)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(raw) => {
            let parsed = raw
                .parse::<T>()
                .map_err(|err| AppError::Configuration(format!("invalid value for {field}: {err}")))?;
            *target = Some(parsed);
        }
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::from_input(&input))
}

fn display_value<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token.chars().skip(token.chars().count() - 3).collect();
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

impl PromptAction {
    fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(&Some("abcdefghij".to_string())), "abc***hij");
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn masks_multibyte_secrets_by_character() {
        assert_eq!(mask_secret(&Some("éééé".to_string())), "***");
        assert_eq!(mask_secret(&Some("ключ-токен".to_string())), "клю***кен");
    }

    #[test]
    fn summary_lists_retry_settings() {
        let cfg = StoredConfig {
            jira_token: Some("abcdefghij".to_string()),
            retry_attempts: Some(4),
            retry_initial_backoff_ms: Some(350),
            ..StoredConfig::default()
        };

        let lines = summary_lines(&cfg);

        assert!(lines.contains(&"Jira API token: abc***hij".to_string()));
        assert!(lines.contains(&"Read attempts: 4".to_string()));
        assert!(lines.contains(&"Initial retry backoff (ms): 350".to_string()));
        assert!(lines.contains(&"Jira base URL: <not set>".to_string()));
    }

    #[test]
    fn interprets_prompt_input() {
        assert_eq!(PromptAction::from_input("\n"), PromptAction::Keep);
        assert_eq!(PromptAction::from_input(" - \n"), PromptAction::Clear);
        assert_eq!(
            PromptAction::from_input("https://acme.atlassian.net\n"),
            PromptAction::Set("https://acme.atlassian.net".to_string())
        );
    }

    #[test]
    fn displays_unset_values() {
        assert_eq!(display_value::<String>(&None), "<not set>");
        assert_eq!(display_value(&Some(String::new())), "<not set>");
        assert_eq!(display_value(&Some(3u32)), "3");
    }
}
