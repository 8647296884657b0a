//! Runtime configuration
//!
//! Per-run options are built with [`RunOptions`]:
//!
//! ```ignore
//! let options = RunOptions::new()
//!     .with_max_turns(10)
//!     .with_stream(true)
//!     .with_model_override("gpt-4o-mini");
//! ```
//!
//! Process-wide defaults can also be loaded from a JSON file with `ANTHILL_*`
//! environment overrides via [`AnthillConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Options for a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Maximum number of completions; `None` means unbounded
    #[serde(default)]
    pub max_turns: Option<usize>,

    /// Whether tool invocations are executed; when false the run ends after one completion
    #[serde(default = "default_true")]
    pub execute_tools: bool,

    /// Whether completions are requested as delta streams
    #[serde(default)]
    pub stream: bool,

    /// Model used instead of each agent's own model
    #[serde(default)]
    pub model_override: Option<String>,

    /// Trace request and completion payloads
    #[serde(default)]
    pub debug: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_turns: None,
            execute_tools: true,
            stream: false,
            model_override: None,
            debug: false,
        }
    }
}

impl RunOptions {
    /// Create default options (unbounded turns, tools executed, no streaming)
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of completions
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Enable or disable tool execution
    pub fn with_execute_tools(mut self, execute_tools: bool) -> Self {
        self.execute_tools = execute_tools;
        self
    }

    /// Enable or disable streamed completions
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Use this model for every agent
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    /// Enable or disable payload tracing
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check whether another completion is allowed after `turns` completions
    pub fn turn_allowed(&self, turns: usize) -> bool {
        self.max_turns.map_or(true, |max| turns < max)
    }
}

/// Retry policy for step-wise completions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per completion, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Set the attempt bound (at least one attempt is always made)
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay between attempts (saturates at `u64::MAX` milliseconds)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Directory for a daily rolling log file; console only when absent
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix for the rolling log file
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "anthill.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthillConfig {
    /// Default options for runs
    #[serde(default)]
    pub run: RunOptions,

    /// Step-wise retry policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Logging setup
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnthillConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `ANTHILL_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognized keys: `ANTHILL_MAX_TURNS`, `ANTHILL_EXECUTE_TOOLS`, `ANTHILL_STREAM`,
    /// `ANTHILL_MODEL`, `ANTHILL_DEBUG`, `ANTHILL_RETRY_ATTEMPTS`, `ANTHILL_RETRY_DELAY_MS`,
    /// `ANTHILL_LOG_LEVEL`, `ANTHILL_LOG_JSON`, `ANTHILL_LOG_DIR`. Unparsable values are
    /// logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(turns) = parse_var(&lookup, "ANTHILL_MAX_TURNS", |v| v.parse().ok()) {
            self.run.max_turns = Some(turns);
        }
        if let Some(flag) = parse_var(&lookup, "ANTHILL_EXECUTE_TOOLS", parse_bool) {
            self.run.execute_tools = flag;
        }
        if let Some(flag) = parse_var(&lookup, "ANTHILL_STREAM", parse_bool) {
            self.run.stream = flag;
        }
        if let Some(model) = lookup("ANTHILL_MODEL").filter(|m| !m.trim().is_empty()) {
            self.run.model_override = Some(model);
        }
        if let Some(flag) = parse_var(&lookup, "ANTHILL_DEBUG", parse_bool) {
            self.run.debug = flag;
        }
        if let Some(attempts) = parse_var(&lookup, "ANTHILL_RETRY_ATTEMPTS", |v| v.parse().ok()) {
            self.retry = self.retry.clone().with_max_attempts(attempts);
        }
        if let Some(delay) = parse_var(&lookup, "ANTHILL_RETRY_DELAY_MS", |v| v.parse().ok()) {
            self.retry.delay_ms = delay;
        }
        if let Some(level) = lookup("ANTHILL_LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            self.logging.level = level;
        }
        if let Some(flag) = parse_var(&lookup, "ANTHILL_LOG_JSON", parse_bool) {
            self.logging.json = flag;
        }
        if let Some(dir) = lookup("ANTHILL_LOG_DIR").filter(|d| !d.trim().is_empty()) {
            self.logging.directory = Some(PathBuf::from(dir));
        }
    }
}

fn parse_var<F, T, P>(lookup: &F, key: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!("[Config] Ignoring invalid value for {}: {:?}", key, raw);
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_retry_delay_saturates() {
        let retry = RetryPolicy::default().with_delay(Duration::from_millis(250));
        assert_eq!(retry.delay(), Duration::from_millis(250));

        let huge = RetryPolicy::default().with_delay(Duration::MAX);
        assert_eq!(huge.delay_ms, u64::MAX);
    }

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::new()
            .with_max_turns(2)
            .with_execute_tools(false)
            .with_stream(true)
            .with_model_override("small")
            .with_debug(true);

        assert_eq!(options.max_turns, Some(2));
        assert!(!options.execute_tools);
        assert!(options.stream);
        assert_eq!(options.model_override.as_deref(), Some("small"));
        assert!(options.debug);
    }

    #[test]
    fn test_turn_allowed() {
        let unbounded = RunOptions::new();
        assert!(unbounded.turn_allowed(10_000));

        let bounded = RunOptions::new().with_max_turns(2);
        assert!(bounded.turn_allowed(1));
        assert!(!bounded.turn_allowed(2));
        assert!(!RunOptions::new().with_max_turns(0).turn_allowed(0));
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let config: AnthillConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnthillConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(1));
        assert!(config.run.execute_tools);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"run": {{"max_turns": 5, "stream": true}}, "retry": {{"delay_ms": 10}}}}"#
        )
        .unwrap();

        let config = AnthillConfig::from_file(file.path()).unwrap();
        assert_eq!(config.run.max_turns, Some(5));
        assert!(config.run.stream);
        assert!(config.run.execute_tools);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 10);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AnthillConfig::from_file(dir.path().join("missing.json")).is_err());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = AnthillConfig::from_file(&bad).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ANTHILL_MAX_TURNS", "4"),
            ("ANTHILL_STREAM", "yes"),
            ("ANTHILL_MODEL", "override-model"),
            ("ANTHILL_RETRY_ATTEMPTS", "0"),
            ("ANTHILL_LOG_DIR", "/tmp/anthill-logs"),
            ("ANTHILL_DEBUG", "maybe"),
        ]
        .into_iter()
        .collect();

        let mut config = AnthillConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.run.max_turns, Some(4));
        assert!(config.run.stream);
        assert_eq!(config.run.model_override.as_deref(), Some("override-model"));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(
            config.logging.directory,
            Some(PathBuf::from("/tmp/anthill-logs"))
        );
        // Invalid values are ignored
        assert!(!config.run.debug);
    }
}
