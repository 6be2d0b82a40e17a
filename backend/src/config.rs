use std::time::Duration;

use eyre::{bail, Result, WrapErr};

const DEFAULT_DATABASE_URL: &str = "sqlite://sessions.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub github_api_url: String,
    pub github_timeout: Duration,
    pub replace_existing_sessions: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let github_timeout = match var("GITHUB_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .wrap_err_with(|| format!("GITHUB_TIMEOUT_SECS is not a number: {}", value))?,
            None => DEFAULT_GITHUB_TIMEOUT_SECS,
        };
        let replace_existing_sessions = match var("REPLACE_EXISTING_SESSIONS") {
            Some(value) => parse_flag(&value)
                .wrap_err("REPLACE_EXISTING_SESSIONS must be a boolean")?,
            None => false,
        };

        Ok(Config {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            github_api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            github_timeout: Duration::from_secs(github_timeout),
            replace_existing_sessions,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value {:?}", other),
    }
}
