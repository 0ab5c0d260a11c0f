//! Command-line interface parsing for Duaread
//!
//! Handles parsing of CLI arguments using clap: which subcategory to open,
//! the --offline switch for cache-only reading, and the API base override.

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The subcategory id is empty or contains path characters
    #[error("Invalid subcategory id: '{0}'. Ids are plain identifiers like '12' or 'sub_12'")]
    InvalidSubcategory(String),
}

/// Duaread - read daily duas with offline caching and audio recitation
#[derive(Parser, Debug)]
#[command(name = "duaread")]
#[command(about = "Terminal dua reader with offline caching")]
#[command(version)]
pub struct Cli {
    /// Subcategory id to open
    ///
    /// Examples:
    ///   duaread            # Open the default subcategory
    ///   duaread 12         # Open subcategory 12
    ///   duaread --offline  # Read from the local store only
    #[arg(value_name = "SUBCATEGORY", default_value = "1")]
    pub subcategory: String,

    /// Read from the local store only; never touch the network
    #[arg(long)]
    pub offline: bool,

    /// Override the content API base URL
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Subcategory id the reader opens with
    pub subcategory: String,
    /// Whether all network access is disabled
    pub offline: bool,
    /// API base override, if given
    pub api_base: Option<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            subcategory: "1".to_string(),
            offline: false,
            api_base: None,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the subcategory id is unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let id = cli.subcategory.trim();
        if id.is_empty() || id.contains(['/', '\\', '.']) || id.contains(char::is_whitespace) {
            return Err(CliError::InvalidSubcategory(cli.subcategory.clone()));
        }

        Ok(StartupConfig {
            subcategory: id.to_string(),
            offline: cli.offline,
            api_base: cli.api_base.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_uses_default_subcategory() {
        let cli = Cli::parse_from(["duaread"]);
        assert_eq!(cli.subcategory, "1");
        assert!(!cli.offline);
        assert!(cli.api_base.is_none());
    }

    #[test]
    fn test_cli_parse_positional_subcategory() {
        let cli = Cli::parse_from(["duaread", "sub_12"]);
        assert_eq!(cli.subcategory, "sub_12");
    }

    #[test]
    fn test_cli_parse_offline_flag() {
        let cli = Cli::parse_from(["duaread", "--offline"]);
        assert!(cli.offline);
    }

    #[test]
    fn test_cli_parse_api_base() {
        let cli = Cli::parse_from(["duaread", "--api-base", "http://localhost:8080"]);
        assert_eq!(cli.api_base.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert_eq!(config.subcategory, "1");
        assert!(!config.offline);
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_startup_config_from_cli_trims_id() {
        let cli = Cli::parse_from(["duaread", "12"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.subcategory, "12");
    }

    #[test]
    fn test_startup_config_rejects_empty_id() {
        let cli = Cli::parse_from(["duaread", "   "]);
        let result = StartupConfig::from_cli(&cli);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_rejects_path_characters() {
        for bad in ["../etc", "a/b", "a\\b", "a.b"] {
            let cli = Cli::parse_from(["duaread", bad]);
            let result = StartupConfig::from_cli(&cli);
            assert!(result.is_err(), "'{}' should be rejected", bad);
            let err = result.unwrap_err();
            assert!(err.to_string().contains("Invalid subcategory"));
        }
    }

    #[test]
    fn test_startup_config_carries_flags() {
        let cli = Cli::parse_from([
            "duaread",
            "12",
            "--offline",
            "--api-base",
            "http://localhost:9999",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.offline);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:9999"));
    }
}
