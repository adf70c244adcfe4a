use chrono::{DateTime, Utc};
use fx_setup_desk::config::{Config, InstrumentConfig};
use fx_setup_desk::desk::TradingDesk;
use fx_setup_desk::models::LevelTable;
use fx_setup_desk::trading::MemoryHistoryStore;

pub fn session_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// EURUSD parameters over synthetic levels.
pub fn synthetic_instrument(supports: &[f64], resistances: &[f64]) -> InstrumentConfig {
    let mut inst = InstrumentConfig::eurusd();
    inst.levels = LevelTable::new(
        supports.to_vec(),
        resistances.to_vec(),
        inst.min_price,
        inst.max_price,
    )
    .unwrap();
    inst
}

pub fn test_config(instrument: InstrumentConfig) -> Config {
    Config {
        instrument,
        default_bankroll: 10_000.0,
        default_risk_percent: 1.0,
        history_file: std::env::temp_dir()
            .join(format!("fx_desk_integ_{}", std::process::id()))
            .join("history.json")
            .to_string_lossy()
            .to_string(),
        display_tz: chrono_tz::UTC,
        log_level: "info".to_string(),
    }
}

/// Desk over the default EURUSD table with an in-memory history.
pub fn memory_desk() -> TradingDesk<MemoryHistoryStore> {
    let mut desk = TradingDesk::new(
        test_config(InstrumentConfig::eurusd()),
        MemoryHistoryStore::new(),
    );
    desk.sim_time = Some(session_start());
    desk
}
