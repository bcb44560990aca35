use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm::openai::DEFAULT_BASE_URL;
use crate::persona::{ModelOptions, Persona, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE};
use crate::titles::fan_out::DEFAULT_MAX_CONCURRENCY;

/// Default per-request HTTP timeout for model calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the model provider (TITLER_API_KEY, falling back to OPENAI_API_KEY)
    pub api_key: String,
    /// OpenAI-compatible endpoint, e.g. https://api.openai.com/v1 or http://localhost:11434/v1
    pub base_url: String,
    /// System prompt plus model options shared by every call
    pub persona: Persona,
    /// Cap on concurrent title-generation calls
    pub max_concurrency: NonZeroUsize,
    /// Timeout for each HTTP attempt
    pub request_timeout: Duration,
    /// Deadline for a whole pipeline run (None = wait indefinitely)
    pub run_timeout: Option<Duration>,
    /// Client-side pacing for model calls (None = unpaced)
    pub requests_per_second: Option<f64>,
    /// Web server bind address
    #[cfg(feature = "web")]
    pub bind: String,
    /// Web server port
    #[cfg(feature = "web")]
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the API key, which is only checked
    /// by commands that actually call the model (`require_api_key`).
    pub fn load() -> Result<Self> {
        let api_key = env::var("TITLER_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .unwrap_or_default();

        let options = ModelOptions {
            model: env::var("TITLER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: parse_var("TITLER_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE),
        };
        let system_prompt =
            env::var("TITLER_SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        let max_concurrency = match env::var("TITLER_MAX_CONCURRENCY") {
            Ok(raw) => parse_concurrency(&raw)?,
            Err(_) => DEFAULT_MAX_CONCURRENCY,
        };

        let request_timeout = Duration::from_secs(
            parse_var("TITLER_REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        let run_timeout = match env::var("TITLER_RUN_TIMEOUT_SECS") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_run_timeout(&raw)?),
            _ => None,
        };
        let requests_per_second = parse_var("TITLER_REQUESTS_PER_SECOND")?;

        Ok(Self {
            api_key,
            base_url: env::var("TITLER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            persona: Persona::new(system_prompt, options),
            max_concurrency,
            request_timeout,
            run_timeout,
            requests_per_second,
            #[cfg(feature = "web")]
            bind: env::var("TITLER_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            #[cfg(feature = "web")]
            port: parse_var("TITLER_PORT")?.unwrap_or(3000),
        })
    }

    /// Check that a model credential is configured.
    ///
    /// Local OpenAI-compatible servers (Ollama, vLLM) usually accept any key,
    /// so a non-default base URL is allowed to run without one.
    pub fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() && self.base_url == DEFAULT_BASE_URL {
            anyhow::bail!(
                "TITLER_API_KEY not set. Add it to your .env file,\n\
                 or point TITLER_BASE_URL at a local OpenAI-compatible server."
            );
        }
        Ok(())
    }

    /// API key with everything but the last four characters hidden.
    pub fn redacted_api_key(&self) -> String {
        redact(&self.api_key)
    }
}

/// Parse a positive concurrency cap.
pub fn parse_concurrency(raw: &str) -> Result<NonZeroUsize> {
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("max concurrency must be a positive integer, got {raw:?}"))?;
    NonZeroUsize::new(value).context("max concurrency must be at least 1")
}

/// Parse a whole-run deadline in seconds. Zero would time out every run.
pub fn parse_run_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("run timeout must be a positive number of seconds, got {raw:?}"))?;
    if secs == 0 {
        anyhow::bail!("run timeout must be at least 1 second; leave it unset for no deadline");
    }
    Ok(Duration::from_secs(secs))
}

/// Read and parse an optional env var. Unset is Ok(None); unparseable is an error.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_accepts_positive_integers() {
        assert_eq!(parse_concurrency("4").unwrap().get(), 4);
        assert_eq!(parse_concurrency(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn concurrency_rejects_zero_and_garbage() {
        assert!(parse_concurrency("0").is_err());
        assert!(parse_concurrency("-1").is_err());
        assert!(parse_concurrency("many").is_err());
    }

    #[test]
    fn run_timeout_rejects_zero() {
        assert_eq!(parse_run_timeout("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_run_timeout(" 5 ").unwrap(), Duration::from_secs(5));
        assert!(parse_run_timeout("0").is_err());
        assert!(parse_run_timeout("soon").is_err());
    }

    #[test]
    fn redaction_keeps_only_tail() {
        assert_eq!(redact(""), "(not set)");
        assert_eq!(redact("short"), "****");
        assert_eq!(redact("sk-abcdefghijklmnop"), "****mnop");
    }

    #[test]
    fn api_key_optional_for_local_servers() {
        let mut config = Config {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            persona: Persona::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(1),
            run_timeout: None,
            requests_per_second: None,
            #[cfg(feature = "web")]
            bind: "127.0.0.1".to_string(),
            #[cfg(feature = "web")]
            port: 0,
        };
        assert!(config.require_api_key().is_err());

        config.base_url = "http://localhost:11434/v1".to_string();
        assert!(config.require_api_key().is_ok());
    }
}
