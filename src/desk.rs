use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::{
    check_price, parse_price, LevelClassifier, PricePlan, RiskBudget, RiskCalculation, RiskSizer,
    SetupAnalysis, ValidationError,
};
use crate::models::{TradeDirection, TradeResult};
use crate::trading::{HistoryStore, TradeRecord, TradeUpdate, TradingStats};

/// Wires price → classification → history → risk plan → outcome.
///
/// The engines only compute; every write to the history store happens here,
/// as its own step after the computation that produced it.
pub struct TradingDesk<S: HistoryStore> {
    config: Config,
    classifier: LevelClassifier,
    sizer: RiskSizer,
    store: S,
    /// When set, used instead of Utc::now() for record timestamps
    pub sim_time: Option<DateTime<Utc>>,
}

impl<S: HistoryStore> TradingDesk<S> {
    pub fn new(config: Config, store: S) -> Self {
        let inst = &config.instrument;
        info!(
            "{} desk: {} supports, {} resistances, proximity {} pips, stop {} pips, min R:R {}",
            inst.symbol,
            inst.levels.supports().len(),
            inst.levels.resistances().len(),
            inst.proximity_pips,
            inst.default_stop_pips,
            inst.min_rr_ratio
        );

        let classifier = LevelClassifier::new(inst.clone());
        let sizer = RiskSizer::new(inst);

        Self {
            config,
            classifier,
            sizer,
            store,
            sim_time: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &LevelClassifier {
        &self.classifier
    }

    pub fn sizer(&self) -> &RiskSizer {
        &self.sizer
    }

    pub fn default_budget(&self) -> RiskBudget {
        RiskBudget {
            bankroll: self.config.default_bankroll,
            risk_percent: self.config.default_risk_percent,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.sim_time.unwrap_or_else(Utc::now)
    }

    /// Parse a typed price and analyse it.
    pub async fn analyze_input(&mut self, input: &str) -> Result<(SetupAnalysis, TradeRecord)> {
        let price = parse_price(input, &self.config.instrument)?;
        self.analyze(price).await
    }

    /// Classify `price` and append a pending record for it.
    pub async fn analyze(&mut self, price: f64) -> Result<(SetupAnalysis, TradeRecord)> {
        let price = check_price(price, &self.config.instrument)?;

        let analysis = self.classifier.classify(price);
        info!("{:.5} -> {}: {}", price, analysis.direction, analysis.message);

        let record = TradeRecord::from_analysis(&analysis, self.now());
        self.store
            .add(record.clone())
            .await
            .context("saving analysis to history")?;

        Ok((analysis, record))
    }

    /// Risk preview from the analysis' own suggestions. `None` for WAIT.
    pub fn suggested_plan(
        &self,
        analysis: &SetupAnalysis,
        budget: &RiskBudget,
    ) -> Option<Result<RiskCalculation, ValidationError>> {
        if !analysis.has_setup() {
            return None;
        }
        let checked = self.compute_checked(
            analysis.direction,
            budget,
            analysis.suggested_entry,
            analysis.suggested_stop_loss,
            analysis.suggested_take_profit,
        );
        Some(checked.map(|(_, calc)| calc))
    }

    /// Validate and size a plan for a recorded analysis, then save the plan
    /// on that record.
    pub async fn plan(
        &mut self,
        record_id: &str,
        budget: &RiskBudget,
        entry_price: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<(RiskCalculation, TradeRecord)> {
        let record = self.store.get(record_id).await?;

        let (prices, calc) =
            self.compute_checked(record.direction, budget, entry_price, stop_loss, take_profit)?;

        let update = TradeUpdate::risk_plan(
            prices.entry_price,
            prices.stop_loss,
            prices.take_profit,
            calc.lot_size,
        );
        let updated = self.store.update(record_id, &update).await?;

        info!(
            "Plan saved for {}: {} {:.2} lots, risk ${:.2}, R:R {:.2}",
            record_id, record.direction, calc.lot_size, calc.value_at_risk, calc.risk_reward
        );
        Ok((calc, updated))
    }

    /// `plan` against the most recent record.
    pub async fn plan_latest(
        &mut self,
        budget: &RiskBudget,
        entry_price: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<(RiskCalculation, TradeRecord)> {
        let id = self.latest_id().await?;
        self.plan(&id, budget, entry_price, stop_loss, take_profit).await
    }

    pub async fn latest_id(&self) -> Result<String> {
        self.store
            .latest()
            .await?
            .map(|r| r.id)
            .context("history is empty; analyse a price first")
    }

    pub async fn record_result(
        &mut self,
        record_id: &str,
        result: TradeResult,
        profit_loss: Option<f64>,
    ) -> Result<TradeRecord> {
        if let Some(pnl) = profit_loss {
            if !pnl.is_finite() {
                anyhow::bail!("profit/loss must be a finite number");
            }
        }
        let updated = self
            .store
            .update(record_id, &TradeUpdate::outcome(result, profit_loss))
            .await?;
        info!("Result for {}: {}", record_id, result);
        Ok(updated)
    }

    pub async fn annotate(&mut self, record_id: &str, notes: &str) -> Result<TradeRecord> {
        Ok(self.store.update(record_id, &TradeUpdate::note(notes)).await?)
    }

    pub async fn delete(&mut self, record_id: &str) -> Result<()> {
        self.store.delete(record_id).await?;
        info!("Deleted {}", record_id);
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<TradeRecord>> {
        Ok(self.store.list().await?)
    }

    pub async fn stats(&self) -> Result<TradingStats> {
        let records = self.store.list().await?;
        Ok(TradingStats::from_records(&records))
    }

    /// Timestamp rendered in the desk's display timezone.
    pub fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.config.display_tz)
            .format("%d/%m/%y %H:%M")
            .to_string()
    }

    fn compute_checked(
        &self,
        direction: TradeDirection,
        budget: &RiskBudget,
        entry_price: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<(PricePlan, RiskCalculation), ValidationError> {
        let prices = self
            .sizer
            .check_plan(direction, entry_price, stop_loss, take_profit)
            .inspect_err(|e| debug!("plan rejected: {}", e))?;
        self.sizer
            .validate_budget(budget)
            .inspect_err(|e| warn!("{}", e))?;

        let calc = self.sizer.compute_risk(
            budget.bankroll,
            budget.risk_percent,
            prices.entry_price,
            prices.stop_loss,
            prices.take_profit,
            prices.direction,
        );
        Ok((prices, calc))
    }
}
