use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "BUY",
            TradeDirection::Sell => "SELL",
            TradeDirection::Wait => "WAIT",
        }
    }

    /// True for BUY and SELL.
    pub fn is_active(&self) -> bool {
        !matches!(self, TradeDirection::Wait)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
    Pending,
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeResult::Win => write!(f, "WIN"),
            TradeResult::Loss => write!(f, "LOSS"),
            TradeResult::Breakeven => write!(f, "BREAKEVEN"),
            TradeResult::Pending => write!(f, "PENDING"),
        }
    }
}

impl TradeResult {
    pub fn from_str_loose(s: &str) -> Option<TradeResult> {
        match s.to_lowercase().as_str() {
            "win" | "w" => Some(TradeResult::Win),
            "loss" | "l" => Some(TradeResult::Loss),
            "breakeven" | "be" => Some(TradeResult::Breakeven),
            "pending" => Some(TradeResult::Pending),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        !matches!(self, TradeResult::Pending)
    }
}

/// Price inputs of a risk plan, named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Entry,
    StopLoss,
    TakeProfit,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Entry => write!(f, "entry price"),
            PriceField::StopLoss => write!(f, "stop loss"),
            PriceField::TakeProfit => write!(f, "take profit"),
        }
    }
}
