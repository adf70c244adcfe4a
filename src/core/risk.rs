use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::InstrumentConfig;
use crate::core::precision::{round1, round2};
use crate::models::{PriceField, TradeDirection};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    #[error("no active setup: the current recommendation is WAIT")]
    NoActiveSetup,

    #[error("{0} is missing")]
    MissingField(PriceField),

    #[error("stop loss must be {} the entry price for a {direction}", placement(.direction, false))]
    InvalidStopPlacement { direction: TradeDirection },

    #[error("take profit must be {} the entry price for a {direction}", placement(.direction, true))]
    InvalidTargetPlacement { direction: TradeDirection },

    #[error("bankroll and risk percent must be positive numbers")]
    InvalidRiskBudget,
}

fn placement(direction: &TradeDirection, target: bool) -> &'static str {
    match (direction, target) {
        (TradeDirection::Buy, false) | (TradeDirection::Sell, true) => "below",
        _ => "above",
    }
}

/// Account budget for one trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBudget {
    pub bankroll: f64,
    /// Percent of bankroll put at risk, e.g. `1.0` for 1%.
    pub risk_percent: f64,
}

/// Position size and risk metrics, rounded for display: money and lots to
/// 2 decimals, pips to 1 decimal, reward ratio to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskCalculation {
    pub value_at_risk: f64,
    pub distance_pips: f64,
    pub lot_size: f64,
    pub risk_reward: f64,
    pub potential_profit: f64,
    pub potential_loss: f64,
}

/// Entry, stop and target that passed validation for `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePlan {
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone)]
pub struct RiskSizer {
    pip_size: f64,
    pip_value: f64,
}

impl RiskSizer {
    pub fn new(instrument: &InstrumentConfig) -> Self {
        Self {
            pip_size: instrument.pip_size,
            pip_value: instrument.pip_value,
        }
    }

    /// Check that entry, stop and target are present and placed consistently
    /// with `direction`.
    pub fn validate(
        &self,
        direction: TradeDirection,
        entry_price: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<(), ValidationError> {
        self.check_plan(direction, entry_price, stop_loss, take_profit)
            .map(|_| ())
    }

    /// Same checks as [`validate`](RiskSizer::validate), handing back the
    /// accepted prices.
    pub fn check_plan(
        &self,
        direction: TradeDirection,
        entry_price: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<PricePlan, ValidationError> {
        if !direction.is_active() {
            return Err(ValidationError::NoActiveSetup);
        }

        let entry = require(entry_price, PriceField::Entry)?;
        let stop = require(stop_loss, PriceField::StopLoss)?;
        let target = require(take_profit, PriceField::TakeProfit)?;

        let (stop_ok, target_ok) = if direction == TradeDirection::Buy {
            (stop < entry, target > entry)
        } else {
            (stop > entry, target < entry)
        };

        if !stop_ok {
            return Err(ValidationError::InvalidStopPlacement { direction });
        }
        if !target_ok {
            return Err(ValidationError::InvalidTargetPlacement { direction });
        }
        Ok(PricePlan {
            direction,
            entry_price: entry,
            stop_loss: stop,
            take_profit: target,
        })
    }

    pub fn validate_budget(&self, budget: &RiskBudget) -> Result<(), ValidationError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(budget.bankroll) && ok(budget.risk_percent) {
            Ok(())
        } else {
            Err(ValidationError::InvalidRiskBudget)
        }
    }

    /// Size a position. Inputs are expected to have passed [`validate`];
    /// otherwise the result degrades to zero lots and zero reward rather
    /// than failing.
    ///
    /// [`validate`]: RiskSizer::validate
    pub fn compute_risk(
        &self,
        bankroll: f64,
        risk_percent: f64,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        direction: TradeDirection,
    ) -> RiskCalculation {
        let value_at_risk = bankroll * risk_percent / 100.0;
        let scale = 1.0 / self.pip_size;

        let (distance_pips, tp_distance_pips) = match direction {
            TradeDirection::Buy => (
                (entry_price - stop_loss) * scale,
                (take_profit - entry_price) * scale,
            ),
            TradeDirection::Sell => (
                (stop_loss - entry_price) * scale,
                (entry_price - take_profit) * scale,
            ),
            TradeDirection::Wait => {
                warn!("compute_risk called without an active setup");
                (0.0, 0.0)
            }
        };

        let (lot_size, risk_reward) = if distance_pips > 0.0 {
            (
                value_at_risk / (distance_pips * self.pip_value),
                tp_distance_pips / distance_pips,
            )
        } else {
            if direction.is_active() {
                warn!(
                    "non-positive stop distance {:.1} pips for {}; sizing to zero",
                    distance_pips, direction
                );
            }
            (0.0, 0.0)
        };

        let potential_loss = value_at_risk;
        let potential_profit = value_at_risk * risk_reward;

        debug!(
            "risk {}: VaR {:.2}, stop {:.1} pips, {:.2} lots, R:R {:.2}",
            direction, value_at_risk, distance_pips, lot_size, risk_reward
        );

        RiskCalculation {
            value_at_risk: round2(value_at_risk),
            distance_pips: round1(distance_pips),
            lot_size: round2(lot_size),
            risk_reward: round2(risk_reward),
            potential_profit: round2(potential_profit),
            potential_loss: round2(potential_loss),
        }
    }
}

fn require(value: Option<f64>, field: PriceField) -> Result<f64, ValidationError> {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer() -> RiskSizer {
        RiskSizer::new(&InstrumentConfig::eurusd())
    }

    #[test]
    fn wait_has_no_active_setup() {
        let err = sizer()
            .validate(TradeDirection::Wait, Some(1.1), Some(1.09), Some(1.12))
            .unwrap_err();
        assert_eq!(err, ValidationError::NoActiveSetup);
    }

    #[test]
    fn missing_zero_or_non_finite_fields() {
        let s = sizer();
        assert_eq!(
            s.validate(TradeDirection::Buy, None, Some(1.09), Some(1.12)),
            Err(ValidationError::MissingField(PriceField::Entry))
        );
        assert_eq!(
            s.validate(TradeDirection::Buy, Some(1.1), Some(0.0), Some(1.12)),
            Err(ValidationError::MissingField(PriceField::StopLoss))
        );
        assert_eq!(
            s.validate(TradeDirection::Sell, Some(1.1), Some(1.12), Some(f64::NAN)),
            Err(ValidationError::MissingField(PriceField::TakeProfit))
        );
        assert_eq!(
            s.validate(TradeDirection::Buy, Some(f64::INFINITY), Some(1.09), Some(1.12)),
            Err(ValidationError::MissingField(PriceField::Entry))
        );
        assert_eq!(
            s.validate(TradeDirection::Sell, Some(1.1), Some(f64::NEG_INFINITY), Some(1.05)),
            Err(ValidationError::MissingField(PriceField::StopLoss))
        );
    }

    #[test]
    fn buy_stop_above_entry_is_rejected() {
        let err = sizer()
            .validate(TradeDirection::Buy, Some(1.1000), Some(1.1050), Some(1.1200))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidStopPlacement {
                direction: TradeDirection::Buy
            }
        );
        assert_eq!(
            err.to_string(),
            "stop loss must be below the entry price for a BUY"
        );
    }

    #[test]
    fn buy_target_below_entry_is_rejected() {
        let err = sizer()
            .validate(TradeDirection::Buy, Some(1.1000), Some(1.0950), Some(1.0990))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTargetPlacement { .. }));
    }

    #[test]
    fn sell_placement_is_mirrored() {
        let s = sizer();
        assert!(s
            .validate(TradeDirection::Sell, Some(1.1000), Some(1.1025), Some(1.0950))
            .is_ok());
        assert!(matches!(
            s.validate(TradeDirection::Sell, Some(1.1000), Some(1.0975), Some(1.0950)),
            Err(ValidationError::InvalidStopPlacement { .. })
        ));
        let err = s
            .validate(TradeDirection::Sell, Some(1.1000), Some(1.1025), Some(1.1050))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "take profit must be below the entry price for a SELL"
        );
    }

    #[test]
    fn known_buy_sizing() {
        let r = sizer().compute_risk(10_000.0, 1.0, 1.1000, 1.0975, 1.1050, TradeDirection::Buy);
        assert_eq!(r.value_at_risk, 100.0);
        assert_eq!(r.distance_pips, 25.0);
        assert_eq!(r.lot_size, 0.4);
        assert_eq!(r.risk_reward, 2.0);
        assert_eq!(r.potential_profit, 200.0);
        assert_eq!(r.potential_loss, 100.0);
    }

    #[test]
    fn known_sell_sizing() {
        // 5000 * 1% = 50 at risk, 20 pip stop, 60 pip target
        let r = sizer().compute_risk(5_000.0, 1.0, 1.0500, 1.0520, 1.0440, TradeDirection::Sell);
        assert_eq!(r.value_at_risk, 50.0);
        assert_eq!(r.distance_pips, 20.0);
        assert_eq!(r.lot_size, 0.25);
        assert_eq!(r.risk_reward, 3.0);
        assert_eq!(r.potential_profit, 150.0);
    }

    #[test]
    fn degenerate_inputs_size_to_zero() {
        let s = sizer();
        let r = s.compute_risk(10_000.0, 1.0, 1.1000, 1.1050, 1.1200, TradeDirection::Buy);
        assert_eq!(r.lot_size, 0.0);
        assert_eq!(r.risk_reward, 0.0);
        assert_eq!(r.potential_profit, 0.0);
        assert_eq!(r.potential_loss, 100.0);

        let w = s.compute_risk(10_000.0, 1.0, 1.1000, 1.0975, 1.1050, TradeDirection::Wait);
        assert_eq!(w.distance_pips, 0.0);
        assert_eq!(w.lot_size, 0.0);
    }

    #[test]
    fn budget_must_be_positive() {
        let s = sizer();
        assert!(s
            .validate_budget(&RiskBudget {
                bankroll: 10_000.0,
                risk_percent: 1.0
            })
            .is_ok());
        assert_eq!(
            s.validate_budget(&RiskBudget {
                bankroll: 0.0,
                risk_percent: 1.0
            }),
            Err(ValidationError::InvalidRiskBudget)
        );
        assert_eq!(
            s.validate_budget(&RiskBudget {
                bankroll: 100.0,
                risk_percent: f64::INFINITY
            }),
            Err(ValidationError::InvalidRiskBudget)
        );
    }
}
