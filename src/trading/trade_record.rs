use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::classifier::SetupAnalysis;
use crate::models::{TradeDirection, TradeResult};

fn default_pending() -> TradeResult {
    TradeResult::Pending
}

/// One analysed price, enriched later with the risk plan and the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub analyzed_price: f64,
    pub direction: TradeDirection,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub lot_size: Option<f64>,
    #[serde(default = "default_pending")]
    pub result: TradeResult,
    #[serde(default)]
    pub profit_loss: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TradeRecord {
    /// Pending record for a fresh classification.
    pub fn from_analysis(analysis: &SetupAnalysis, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_trade_id(timestamp),
            timestamp,
            analyzed_price: analysis.input_price,
            direction: analysis.direction,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            lot_size: None,
            result: TradeResult::Pending,
            profit_loss: None,
            notes: None,
        }
    }

    pub fn has_plan(&self) -> bool {
        self.entry_price.is_some() && self.stop_loss.is_some() && self.take_profit.is_some()
    }

    /// Merge an update. Recording a result always replaces `profit_loss`,
    /// clearing it when the update carries none.
    pub fn apply(&mut self, update: &TradeUpdate) {
        if let Some(v) = update.entry_price {
            self.entry_price = Some(v);
        }
        if let Some(v) = update.stop_loss {
            self.stop_loss = Some(v);
        }
        if let Some(v) = update.take_profit {
            self.take_profit = Some(v);
        }
        if let Some(v) = update.lot_size {
            self.lot_size = Some(v);
        }
        if let Some(result) = update.result {
            self.result = result;
            self.profit_loss = update.profit_loss;
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
    }
}

/// `trade_<unix millis>_<9 random chars>`
pub fn new_trade_id(timestamp: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("trade_{}_{}", timestamp.timestamp_millis(), &suffix[..9])
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeUpdate {
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub lot_size: Option<f64>,
    pub result: Option<TradeResult>,
    pub profit_loss: Option<f64>,
    pub notes: Option<String>,
}

impl TradeUpdate {
    pub fn risk_plan(entry_price: f64, stop_loss: f64, take_profit: f64, lot_size: f64) -> Self {
        Self {
            entry_price: Some(entry_price),
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            lot_size: Some(lot_size),
            ..Default::default()
        }
    }

    pub fn outcome(result: TradeResult, profit_loss: Option<f64>) -> Self {
        Self {
            result: Some(result),
            profit_loss,
            ..Default::default()
        }
    }

    pub fn note(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{default_test_classifier, fixed_time};

    #[test]
    fn record_from_analysis_is_pending() {
        let analysis = default_test_classifier().classify(1.0420);
        let rec = TradeRecord::from_analysis(&analysis, fixed_time());
        assert_eq!(rec.analyzed_price, 1.0420);
        assert_eq!(rec.direction, analysis.direction);
        assert_eq!(rec.result, TradeResult::Pending);
        assert!(!rec.has_plan());
        assert!(rec.id.starts_with(&format!("trade_{}_", fixed_time().timestamp_millis())));
        assert_eq!(rec.id.rsplit('_').next().map(str::len), Some(9));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_trade_id(fixed_time()), new_trade_id(fixed_time()));
    }

    #[test]
    fn apply_plan_then_outcome() {
        let analysis = default_test_classifier().classify(1.0420);
        let mut rec = TradeRecord::from_analysis(&analysis, fixed_time());

        rec.apply(&TradeUpdate::risk_plan(1.0420, 1.0395, 1.0470, 0.4));
        assert!(rec.has_plan());
        assert_eq!(rec.lot_size, Some(0.4));

        rec.apply(&TradeUpdate::outcome(TradeResult::Win, Some(200.0)));
        assert_eq!(rec.result, TradeResult::Win);
        assert_eq!(rec.profit_loss, Some(200.0));
        // plan survives an outcome update
        assert_eq!(rec.entry_price, Some(1.0420));

        rec.apply(&TradeUpdate::outcome(TradeResult::Breakeven, None));
        assert_eq!(rec.profit_loss, None);
    }

    #[test]
    fn missing_result_deserializes_as_pending() {
        let json = r#"{
            "id": "trade_1_abcdefghi",
            "timestamp": "2025-01-15T12:00:00Z",
            "analyzed_price": 1.04,
            "direction": "WAIT"
        }"#;
        let rec: TradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.result, TradeResult::Pending);
        assert!(rec.entry_price.is_none());
    }
}
