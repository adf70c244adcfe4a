use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InstrumentConfig;
use crate::core::precision::{fmt_level, fmt_pips, round_to};
use crate::models::TradeDirection;

/// Absorbs float noise in pip distances so a price exactly on the proximity
/// boundary still counts as inside it.
const PIP_TOLERANCE: f64 = 1e-6;

/// Directional recommendation for one quoted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupAnalysis {
    pub direction: TradeDirection,
    pub input_price: f64,
    pub message: String,
    pub explanation: String,
    pub context: String,
    pub invalidation_conditions: String,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
    /// `None` when there is no support below the price.
    pub support_distance_pips: Option<f64>,
    /// `None` when there is no resistance above the price.
    pub resistance_distance_pips: Option<f64>,
    #[serde(default)]
    pub suggested_entry: Option<f64>,
    #[serde(default)]
    pub suggested_stop_loss: Option<f64>,
    #[serde(default)]
    pub suggested_take_profit: Option<f64>,
}

impl SetupAnalysis {
    pub fn has_setup(&self) -> bool {
        self.direction.is_active()
    }
}

/// Maps a price to BUY / SELL / WAIT from the instrument's level table.
///
/// Support proximity is checked before resistance proximity, so a price
/// within range of both is a BUY.
#[derive(Debug, Clone)]
pub struct LevelClassifier {
    instrument: InstrumentConfig,
}

impl LevelClassifier {
    pub fn new(instrument: InstrumentConfig) -> Self {
        Self { instrument }
    }

    pub fn instrument(&self) -> &InstrumentConfig {
        &self.instrument
    }

    /// Classify a finite positive price. Never fails.
    pub fn classify(&self, price: f64) -> SetupAnalysis {
        let levels = &self.instrument.levels;
        let support = levels.nearest_support_below(price);
        let resistance = levels.nearest_resistance_above(price);

        let support_pips = support.map(|s| self.pips_between(price, s));
        let resistance_pips = resistance.map(|r| self.pips_between(price, r));

        let proximity = self.instrument.proximity_pips + PIP_TOLERANCE;

        debug!(
            "classify {:.5}: support {} ({} pips), resistance {} ({} pips)",
            price,
            fmt_level(support),
            fmt_pips(support_pips),
            fmt_level(resistance),
            fmt_pips(resistance_pips)
        );

        let analysis = match (support, support_pips, resistance, resistance_pips) {
            (Some(level), Some(pips), _, _) if pips <= proximity => {
                self.buy_setup(price, level, pips)
            }
            (_, _, Some(level), Some(pips)) if pips <= proximity => {
                self.sell_setup(price, level, pips)
            }
            _ => self.wait(price, support, support_pips, resistance, resistance_pips),
        };

        SetupAnalysis {
            nearest_support: support,
            nearest_resistance: resistance,
            support_distance_pips: support_pips,
            resistance_distance_pips: resistance_pips,
            ..analysis
        }
    }

    fn pips_per_unit(&self) -> f64 {
        1.0 / self.instrument.pip_size
    }

    fn pips_between(&self, a: f64, b: f64) -> f64 {
        (a - b).abs() * self.pips_per_unit()
    }

    /// (stop distance, target distance) in price units.
    fn bracket(&self) -> (f64, f64) {
        let stop_pips = self.instrument.default_stop_pips;
        let scale = self.pips_per_unit();
        (
            stop_pips / scale,
            stop_pips * self.instrument.min_rr_ratio / scale,
        )
    }

    fn buy_setup(&self, price: f64, level: f64, pips: f64) -> SetupAnalysis {
        let (stop_dist, target_dist) = self.bracket();
        let decimals = self.instrument.price_decimals;

        SetupAnalysis {
            direction: TradeDirection::Buy,
            input_price: price,
            message: format!("BUY - DISCOUNT DEFENDED AT {:.4}", level),
            explanation: format!(
                "Price {:.5} is near institutional support at {:.4} ({:.1} pips away). \
                 This is a discount zone where institutional buyers typically defend positions.",
                price, level, pips
            ),
            context: "Institutional support zone identified. The market is trading at a discount, \
                      favouring long entries with controlled risk."
                .to_string(),
            invalidation_conditions: format!(
                "The idea is invalidated if price breaks and closes below {:.4} with volume. \
                 Technical stop sits below the invalidation zone.",
                level
            ),
            nearest_support: None,
            nearest_resistance: None,
            support_distance_pips: None,
            resistance_distance_pips: None,
            suggested_entry: Some(price),
            suggested_stop_loss: Some(round_to(price - stop_dist, decimals)),
            suggested_take_profit: Some(round_to(price + target_dist, decimals)),
        }
    }

    fn sell_setup(&self, price: f64, level: f64, pips: f64) -> SetupAnalysis {
        let (stop_dist, target_dist) = self.bracket();
        let decimals = self.instrument.price_decimals;

        SetupAnalysis {
            direction: TradeDirection::Sell,
            input_price: price,
            message: format!("SELL - PREMIUM REJECTED AT {:.4}", level),
            explanation: format!(
                "Price {:.5} is near institutional resistance at {:.4} ({:.1} pips away). \
                 This is a premium zone where institutional sellers typically distribute positions.",
                price, level, pips
            ),
            context: "Institutional resistance zone identified. The market is trading at a premium, \
                      favouring short entries with controlled risk."
                .to_string(),
            invalidation_conditions: format!(
                "The idea is invalidated if price breaks and closes above {:.4} with volume. \
                 Technical stop sits above the invalidation zone.",
                level
            ),
            nearest_support: None,
            nearest_resistance: None,
            support_distance_pips: None,
            resistance_distance_pips: None,
            suggested_entry: Some(price),
            suggested_stop_loss: Some(round_to(price + stop_dist, decimals)),
            suggested_take_profit: Some(round_to(price - target_dist, decimals)),
        }
    }

    fn wait(
        &self,
        price: f64,
        support: Option<f64>,
        support_pips: Option<f64>,
        resistance: Option<f64>,
        resistance_pips: Option<f64>,
    ) -> SetupAnalysis {
        SetupAnalysis {
            direction: TradeDirection::Wait,
            input_price: price,
            message: "WAIT - NO CLEAR INSTITUTIONAL ZONE".to_string(),
            explanation: format!(
                "Price {:.5} sits between institutional zones. Nearest support: {} ({} pips). \
                 Nearest resistance: {} ({} pips).",
                price,
                fmt_level(support),
                fmt_pips(support_pips),
                fmt_level(resistance),
                fmt_pips(resistance_pips)
            ),
            context: format!(
                "Price is in a neutral zone, more than {:.0} pips from any institutional level. \
                 Wait for price to approach support (to buy) or resistance (to sell).",
                self.instrument.proximity_pips
            ),
            invalidation_conditions:
                "No active setup. Monitor the approach to institutional zones for a new analysis."
                    .to_string(),
            nearest_support: None,
            nearest_resistance: None,
            support_distance_pips: None,
            resistance_distance_pips: None,
            suggested_entry: None,
            suggested_stop_loss: None,
            suggested_take_profit: None,
        }
    }
}
