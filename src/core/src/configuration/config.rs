use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Args;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const MIN_QUERY_TIMEOUT_MS: u64 = 1;
const MAX_QUERY_TIMEOUT_MS: u64 = 60_000;

/// Runtime configuration of the tracker and the command-line driver.
///
/// Loaded from a TOML file where every key is optional, then adjusted with
/// command-line overrides.
///
/// # Examples
///
/// ```
/// use netusage::configuration::Config;
///
/// let config = Config::from_toml_str("restart_policy = \"reject\"").unwrap();
/// assert_eq!(config.query_timeout_ms, 2000);
/// ```
///
/// # Fields Overview
///
/// - `query_timeout_ms`: upper bound on each OS query (byte counters, connection table)
/// - `restart_policy`: behavior of a second `start` for a pid that is already monitored
/// - `exclude_loopback`: leave `lo`/`lo0` out of the system-wide byte counters
/// - `log_level`: default log filter when `RUST_LOG` is not set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query_timeout_ms: u64,
    pub restart_policy: RestartPolicy,
    pub exclude_loopback: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_timeout_ms: 2000,
            restart_policy: RestartPolicy::Replace,
            exclude_loopback: false,
            log_level: String::from("info"),
        }
    }
}

impl Config {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line values on top of the loaded configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.query_timeout_ms = timeout_ms;
        }
        if let Some(policy) = overrides.restart_policy {
            self.restart_policy = policy;
        }
        if overrides.exclude_loopback {
            self.exclude_loopback = true;
        }
        if let Some(ref level) = overrides.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_QUERY_TIMEOUT_MS..=MAX_QUERY_TIMEOUT_MS).contains(&self.query_timeout_ms) {
            return Err(ConfigError::NotInRange(format!(
                "query_timeout_ms must be between {} and {}, got {}",
                MIN_QUERY_TIMEOUT_MS, MAX_QUERY_TIMEOUT_MS, self.query_timeout_ms
            )));
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            ConfigError::InvalidValue(format!("unknown log level '{}'", self.log_level))
        })
    }
}

/// Command-line flags overriding values from the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Upper bound on each OS query, in milliseconds
    #[arg(long, global = true, env = "NETUSAGE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// What a second start for an already monitored pid does
    #[arg(long, global = true, value_enum)]
    pub restart_policy: Option<RestartPolicy>,

    /// Leave loopback interfaces out of the byte counters
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub exclude_loopback: bool,

    /// Default log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Parser)]
    struct OverridesUnderTest {
        #[command(flatten)]
        overrides: ConfigOverrides,
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.query_timeout_ms, 2000);
        assert_eq!(config.restart_policy, RestartPolicy::Replace);
        assert!(!config.exclude_loopback);
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "query_timeout_ms = 500\n\
             restart_policy = \"reject\"\n\
             exclude_loopback = true\n\
             log_level = \"debug\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.query_timeout_ms, 500);
        assert_eq!(config.query_timeout(), Duration::from_millis(500));
        assert_eq!(config.restart_policy, RestartPolicy::Reject);
        assert!(config.exclude_loopback);
        assert_eq!(config.log_level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Config::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_unknown_restart_policy() {
        let result = Config::from_toml_str("restart_policy = \"ignore\"");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_timeout_out_of_range() {
        assert!(matches!(
            Config::from_toml_str("query_timeout_ms = 0"),
            Err(ConfigError::NotInRange(_))
        ));
        assert!(matches!(
            Config::from_toml_str("query_timeout_ms = 600000"),
            Err(ConfigError::NotInRange(_))
        ));
    }

    #[test]
    fn test_unknown_log_level() {
        let result = Config::from_toml_str("log_level = \"loud\"");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_overrides_from_args() {
        let parsed = OverridesUnderTest::try_parse_from([
            "netusage",
            "--timeout-ms",
            "750",
            "--restart-policy",
            "reject",
            "--exclude-loopback",
            "--log-level",
            "warn",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        let mut config = Config::default();
        config.apply_overrides(&parsed.overrides);

        assert_eq!(config.query_timeout_ms, 750);
        assert_eq!(config.restart_policy, RestartPolicy::Reject);
        assert!(config.exclude_loopback);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_absent_overrides_keep_file_values() {
        let mut config =
            Config::from_toml_str("query_timeout_ms = 300\nexclude_loopback = true").unwrap();
        config.apply_overrides(&ConfigOverrides::default());

        assert_eq!(config.query_timeout_ms, 300);
        assert!(config.exclude_loopback);
        assert_eq!(config.restart_policy, RestartPolicy::Replace);
    }
}
