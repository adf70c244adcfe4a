use chrono::{DateTime, Utc};

use crate::config::{Config, InstrumentConfig};
use crate::core::LevelClassifier;
use crate::models::{LevelTable, TradeDirection, TradeResult};
use crate::trading::TradeRecord;

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// EURUSD parameters over a synthetic level table.
pub fn instrument_with_levels(supports: Vec<f64>, resistances: Vec<f64>) -> InstrumentConfig {
    let mut inst = InstrumentConfig::eurusd();
    inst.levels = LevelTable::new(supports, resistances, inst.min_price, inst.max_price).unwrap();
    inst
}

pub fn default_test_classifier() -> LevelClassifier {
    LevelClassifier::new(InstrumentConfig::eurusd())
}

/// EURUSD defaults with a throwaway history file. Does not read the environment.
pub fn default_test_config() -> Config {
    Config {
        instrument: InstrumentConfig::eurusd(),
        default_bankroll: 10_000.0,
        default_risk_percent: 1.0,
        history_file: std::env::temp_dir()
            .join(format!("fx_desk_test_{}.json", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        display_tz: chrono_tz::America::Sao_Paulo,
        log_level: "debug".to_string(),
    }
}

pub fn make_record(
    direction: TradeDirection,
    result: TradeResult,
    profit_loss: Option<f64>,
) -> TradeRecord {
    let price = 1.0420;
    TradeRecord {
        id: crate::trading::trade_record::new_trade_id(fixed_time()),
        timestamp: fixed_time(),
        analyzed_price: price,
        direction,
        entry_price: None,
        stop_loss: None,
        take_profit: None,
        lot_size: None,
        result,
        profit_loss,
        notes: None,
    }
}

