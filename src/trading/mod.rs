pub mod history;
pub mod stats;
pub mod trade_record;

pub use history::{HistoryError, HistoryStore, JsonHistoryStore, MemoryHistoryStore};
pub use stats::TradingStats;
pub use trade_record::{TradeRecord, TradeUpdate};
