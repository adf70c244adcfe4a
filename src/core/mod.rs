pub mod classifier;
pub mod precision;
pub mod price_input;
pub mod risk;

pub use classifier::{LevelClassifier, SetupAnalysis};
pub use price_input::{check_price, parse_price, PriceInputError};
pub use risk::{PricePlan, RiskBudget, RiskCalculation, RiskSizer, ValidationError};
