use chrono_tz::Tz;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::precision::MAX_DECIMALS;
use crate::models::{LevelTable, LevelTableError, RawLevels};

/// EURUSD institutional levels for the ~1.04 regime.
const EURUSD_SUPPORTS: &[f64] = &[
    1.0200, 1.0250, 1.0300, 1.0350, 1.0400, 1.0450, 1.0500, 1.0550, 1.0600, 1.0650, 1.0700,
    1.0750, 1.0800, 1.0850, 1.0900, 1.0950, 1.1000,
];
const EURUSD_RESISTANCES: &[f64] = &[
    1.0250, 1.0300, 1.0350, 1.0400, 1.0450, 1.0500, 1.0550, 1.0600, 1.0650, 1.0700, 1.0750,
    1.0800, 1.0850, 1.0900, 1.0950, 1.1000, 1.1050,
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read levels file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse levels file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid level table: {0}")]
    Levels(#[from] LevelTableError),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Everything instrument-specific the engines need. Retargeting to another
/// pair means changing this, never the algorithms.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// Price units per pip (0.0001 for EURUSD).
    pub pip_size: f64,
    /// USD per pip per standard lot.
    pub pip_value: f64,
    pub proximity_pips: f64,
    pub default_stop_pips: f64,
    pub min_rr_ratio: f64,
    /// Decimals used when quoting suggested prices.
    pub price_decimals: u32,
    pub min_price: f64,
    pub max_price: f64,
    pub levels: LevelTable,
}

impl InstrumentConfig {
    pub fn eurusd() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            pip_size: 0.0001,
            pip_value: 10.0,
            proximity_pips: 30.0,
            default_stop_pips: 25.0,
            min_rr_ratio: 2.0,
            price_decimals: 5,
            min_price: 0.5,
            max_price: 2.0,
            levels: default_eurusd_levels(),
        }
    }

    /// Replace the level table with one loaded from a JSON file.
    pub fn with_levels_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        self.levels = load_levels(path.as_ref(), self.min_price, self.max_price)?;
        Ok(self)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let positive = [
            ("PIP_SIZE", self.pip_size),
            ("PIP_VALUE", self.pip_value),
            ("PROXIMITY_PIPS", self.proximity_pips),
            ("DEFAULT_STOP_PIPS", self.default_stop_pips),
            ("MIN_RR_RATIO", self.min_rr_ratio),
            ("MIN_PRICE", self.min_price),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: format!("{} must be a positive number", value),
                });
            }
        }
        if !(1..=MAX_DECIMALS).contains(&self.price_decimals) {
            return Err(ConfigError::InvalidValue {
                key: "PRICE_DECIMALS",
                reason: format!("{} must be between 1 and {}", self.price_decimals, MAX_DECIMALS),
            });
        }
        if self.max_price.is_nan() || self.max_price <= self.min_price {
            return Err(ConfigError::InvalidValue {
                key: "MAX_PRICE",
                reason: format!("{} must exceed MIN_PRICE {}", self.max_price, self.min_price),
            });
        }
        Ok(())
    }
}

fn default_eurusd_levels() -> LevelTable {
    // Static tables are sorted and in range; build without re-checking.
    LevelTable::new_unchecked(EURUSD_SUPPORTS.to_vec(), EURUSD_RESISTANCES.to_vec())
}

pub fn load_levels(path: &Path, min_price: f64, max_price: f64) -> Result<LevelTable, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawLevels = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LevelTable::from_raw(raw, min_price, max_price)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub instrument: InstrumentConfig,

    // Risk defaults offered to the trader
    pub default_bankroll: f64,
    pub default_risk_percent: f64,

    // History
    pub history_file: String,
    #[serde(serialize_with = "serialize_tz")]
    pub display_tz: Tz,

    // Logging
    pub log_level: String,
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(tz.name())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let base = InstrumentConfig::eurusd();
        let mut instrument = InstrumentConfig {
            symbol: env("SYMBOL", &base.symbol),
            pip_size: env("PIP_SIZE", "0.0001").parse().unwrap_or(base.pip_size),
            pip_value: env("PIP_VALUE", "10").parse().unwrap_or(base.pip_value),
            proximity_pips: env("PROXIMITY_PIPS", "30")
                .parse()
                .unwrap_or(base.proximity_pips),
            default_stop_pips: env("DEFAULT_STOP_PIPS", "25")
                .parse()
                .unwrap_or(base.default_stop_pips),
            min_rr_ratio: env("MIN_RR_RATIO", "2").parse().unwrap_or(base.min_rr_ratio),
            price_decimals: env("PRICE_DECIMALS", "5")
                .parse()
                .unwrap_or(base.price_decimals),
            min_price: env("MIN_PRICE", "0.5").parse().unwrap_or(base.min_price),
            max_price: env("MAX_PRICE", "2.0").parse().unwrap_or(base.max_price),
            levels: base.levels,
        };
        instrument.check()?;

        if let Ok(path) = std::env::var("LEVELS_FILE") {
            instrument = instrument.with_levels_file(path)?;
        } else {
            // Defaults must still respect a narrowed price range.
            instrument.levels = LevelTable::new(
                instrument.levels.supports().to_vec(),
                instrument.levels.resistances().to_vec(),
                instrument.min_price,
                instrument.max_price,
            )?;
        }

        let tz_name = env("DISPLAY_TZ", "America/Sao_Paulo");
        let display_tz: Tz = tz_name.parse().map_err(|_| ConfigError::InvalidValue {
            key: "DISPLAY_TZ",
            reason: format!("unknown timezone {}", tz_name),
        })?;

        let default_bankroll = env("DEFAULT_BANKROLL", "10000").parse().unwrap_or(10_000.0);
        let default_risk_percent = env("DEFAULT_RISK_PERCENT", "1").parse().unwrap_or(1.0);

        Ok(Config {
            instrument,
            default_bankroll,
            default_risk_percent,
            history_file: env("HISTORY_FILE", "data/trade_history.json"),
            display_tz,
            log_level: env("LOG_LEVEL", "info"),
        })
    }
}
