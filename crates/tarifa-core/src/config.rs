// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tarifa.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! TOML configuration: feed location, block markers and display units

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/1goqE2sj--smB2hsw3TSC1u65y-Ind-zd/export?format=csv&id=1goqE2sj--smB2hsw3TSC1u65y-Ind-zd";

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_owned()
}

fn default_30() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tarifa/{}", env!("CARGO_PKG_VERSION"))
}

fn default_table_marker() -> String {
    "TABELA_HORARIA".to_owned()
}

fn default_constants_marker() -> String {
    "TABELA_CONSTANTES".to_owned()
}

fn default_market_summary_marker() -> String {
    "TABELA_MEDIA_OMIE".to_owned()
}

fn default_futures_marker() -> String {
    "TABELA_OMIP".to_owned()
}

fn default_currency_unit() -> String {
    "€/kWh".to_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TarifaConfig {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub layout: FeedLayout,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// CSV export URL of the published spreadsheet
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_30")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: 30,
            user_agent: default_user_agent(),
        }
    }
}

/// Sentinel tokens that introduce the secondary blocks of the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLayout {
    #[serde(default = "default_table_marker")]
    pub table_marker: String,

    #[serde(default = "default_constants_marker")]
    pub constants_marker: String,

    #[serde(default = "default_market_summary_marker")]
    pub market_summary_marker: String,

    #[serde(default = "default_futures_marker")]
    pub futures_marker: String,
}

impl Default for FeedLayout {
    fn default() -> Self {
        Self {
            table_marker: default_table_marker(),
            constants_marker: default_constants_marker(),
            market_summary_marker: default_market_summary_marker(),
            futures_marker: default_futures_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Unit appended to prices in chart tooltips and axis labels
    #[serde(default = "default_currency_unit")]
    pub currency_unit: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_unit: default_currency_unit(),
        }
    }
}

impl TarifaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Ok(Self::load(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "feed.url",
                reason: "must not be empty".to_owned(),
            });
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "feed.timeout_secs",
                reason: "must be greater than zero".to_owned(),
            });
        }
        let markers = [
            ("layout.table_marker", &self.layout.table_marker),
            ("layout.constants_marker", &self.layout.constants_marker),
            ("layout.market_summary_marker", &self.layout.market_summary_marker),
            ("layout.futures_marker", &self.layout.futures_marker),
        ];
        for (field, marker) in markers {
            if marker.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "marker must not be empty".to_owned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TarifaError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = TarifaConfig::default();
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.layout.table_marker, "TABELA_HORARIA");
        assert_eq!(config.layout.constants_marker, "TABELA_CONSTANTES");
        assert_eq!(config.display.currency_unit, "€/kWh");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\ntimeout_secs = 5\n\n[layout]\ntable_marker = \"HOURLY\"").unwrap();

        let config = TarifaConfig::load(file.path()).unwrap();
        assert_eq!(config.feed.timeout_secs, 5);
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.layout.table_marker, "HOURLY");
        assert_eq!(config.layout.constants_marker, "TABELA_CONSTANTES");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\ntimeout_secs = 0").unwrap();

        let err = TarifaConfig::load(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "feed.timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut config = TarifaConfig::default();
        config.layout.futures_marker = "  ".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed\nurl = ").unwrap();
        assert!(matches!(
            TarifaConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = TarifaConfig::load_or_default(None).unwrap();
        assert_eq!(config, TarifaConfig::default());
    }

    #[test]
    fn test_load_or_default_reports_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feed]\nurl = \"\"").unwrap();

        let err = TarifaConfig::load_or_default(Some(file.path())).unwrap_err();
        assert!(matches!(
            err,
            TarifaError::Config(ConfigError::Invalid {
                field: "feed.url",
                ..
            })
        ));
        assert!(err.to_string().contains("feed.url"));

        let missing = TarifaConfig::load_or_default(Some(Path::new("/nonexistent/tarifa.toml")));
        assert!(matches!(missing, Err(TarifaError::Config(ConfigError::Io(_)))));
    }
}
