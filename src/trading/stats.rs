use serde::{Deserialize, Serialize};

use crate::models::{TradeDirection, TradeResult};
use crate::trading::trade_record::TradeRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub pending: usize,
    /// Percent of completed trades that were wins.
    pub win_rate: f64,
    pub total_profit_loss: f64,
    pub buy_count: usize,
    pub sell_count: usize,
    pub wait_count: usize,
}

impl TradingStats {
    pub fn from_records(records: &[TradeRecord]) -> Self {
        let count_result = |r: TradeResult| records.iter().filter(|t| t.result == r).count();
        let count_direction =
            |d: TradeDirection| records.iter().filter(|t| t.direction == d).count();

        let wins = count_result(TradeResult::Win);
        let losses = count_result(TradeResult::Loss);
        let breakeven = count_result(TradeResult::Breakeven);
        let pending = count_result(TradeResult::Pending);
        let completed = wins + losses + breakeven;

        let win_rate = if completed > 0 {
            wins as f64 / completed as f64 * 100.0
        } else {
            0.0
        };

        let total_profit_loss: f64 = records.iter().filter_map(|t| t.profit_loss).sum();

        TradingStats {
            total_trades: records.len(),
            wins,
            losses,
            breakeven,
            pending,
            win_rate,
            total_profit_loss,
            buy_count: count_direction(TradeDirection::Buy),
            sell_count: count_direction(TradeDirection::Sell),
            wait_count: count_direction(TradeDirection::Wait),
        }
    }
}
