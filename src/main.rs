use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use fx_setup_desk::config::Config;
use fx_setup_desk::core::precision::{fmt_level, fmt_pips};
use fx_setup_desk::core::{RiskBudget, RiskCalculation, SetupAnalysis};
use fx_setup_desk::desk::TradingDesk;
use fx_setup_desk::models::TradeResult;
use fx_setup_desk::trading::{JsonHistoryStore, TradeRecord};

const USAGE: &str = "\
usage: fx-setup-desk <command>

  analyze <price>                                   classify a price and log it
  plan <id|latest> <entry> <stop> <target> [bankroll] [risk%]
                                                    size and save a risk plan
  result <id> <win|loss|breakeven|pending> [pnl]    record the outcome
  note <id> <text...>                               attach notes to a record
  delete <id>                                       remove a record
  history                                           list records, newest first
  stats                                             win rate and counts
  levels                                            show the level table";

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let store = JsonHistoryStore::open(&cfg.history_file).await?;
    let mut desk = TradingDesk::new(cfg, store);

    match command.as_str() {
        "analyze" => {
            let input = args.get(1).context("analyze needs a price")?;
            let (analysis, record) = desk.analyze_input(input).await?;
            print_analysis(&analysis);
            println!("Recorded as {}", record.id);

            let budget = desk.default_budget();
            if let Some(plan) = desk.suggested_plan(&analysis, &budget) {
                println!();
                println!(
                    "Suggested plan (bankroll ${:.2}, risk {}%):",
                    budget.bankroll, budget.risk_percent
                );
                print_risk(&plan?);
            }
        }
        "plan" => {
            if args.len() < 5 {
                bail!("plan needs <id|latest> <entry> <stop> <target>");
            }
            let id = match args[1].as_str() {
                "latest" => desk.latest_id().await?,
                other => other.to_string(),
            };
            let entry = parse_number(&args[2]);
            let stop = parse_number(&args[3]);
            let target = parse_number(&args[4]);

            let defaults = desk.default_budget();
            let budget = RiskBudget {
                bankroll: args
                    .get(5)
                    .and_then(|s| parse_number(s))
                    .unwrap_or(defaults.bankroll),
                risk_percent: args
                    .get(6)
                    .and_then(|s| parse_number(s))
                    .unwrap_or(defaults.risk_percent),
            };

            let (calc, record) = desk.plan(&id, &budget, entry, stop, target).await?;
            print_risk(&calc);
            println!("Saved on {}", record.id);
        }
        "result" => {
            let id = args.get(1).context("result needs a record id")?;
            let result = args
                .get(2)
                .and_then(|s| TradeResult::from_str_loose(s))
                .context("result needs one of win, loss, breakeven, pending")?;
            let pnl = match args.get(3) {
                Some(s) => Some(parse_number(s).with_context(|| format!("bad pnl {:?}", s))?),
                None => None,
            };
            let record = desk.record_result(id, result, pnl).await?;
            print_record(&desk, &record);
        }
        "note" => {
            let id = args.get(1).context("note needs a record id")?;
            if args.len() < 3 {
                bail!("note needs some text");
            }
            let record = desk.annotate(id, &args[2..].join(" ")).await?;
            print_record(&desk, &record);
        }
        "delete" => {
            let id = args.get(1).context("delete needs a record id")?;
            desk.delete(id).await?;
            println!("Deleted {}", id);
        }
        "history" => {
            let records = desk.history().await?;
            if records.is_empty() {
                println!("No trades recorded yet.");
            }
            for record in &records {
                print_record(&desk, record);
            }
        }
        "stats" => {
            let s = desk.stats().await?;
            println!("Total:      {}", s.total_trades);
            println!("Win rate:   {:.1}%", s.win_rate);
            println!("Wins:       {}", s.wins);
            println!("Losses:     {}", s.losses);
            println!("Breakeven:  {}", s.breakeven);
            println!("Pending:    {}", s.pending);
            println!("Total P/L:  ${:.2}", s.total_profit_loss);
            println!(
                "Signals:    {} BUY / {} SELL / {} WAIT",
                s.buy_count, s.sell_count, s.wait_count
            );
        }
        "levels" => {
            let inst = &desk.config().instrument;
            println!("{} levels", inst.symbol);
            println!("  supports:    {}", join_levels(inst.levels.supports()));
            println!("  resistances: {}", join_levels(inst.levels.resistances()));
        }
        other => {
            println!("{}", USAGE);
            bail!("unknown command {:?}", other);
        }
    }

    Ok(())
}

/// Lenient numeric parse: comma decimal separator allowed, `None` on garbage
/// so validation reports the field as missing.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().replacen(',', ".", 1).parse().ok()
}

fn join_levels(levels: &[f64]) -> String {
    levels
        .iter()
        .map(|l| format!("{:.4}", l))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_analysis(a: &SetupAnalysis) {
    println!("{}", a.message);
    println!("  {}", a.explanation);
    println!("  Context: {}", a.context);
    println!("  Invalidation: {}", a.invalidation_conditions);
    println!(
        "  Support {} ({} pips) | Resistance {} ({} pips)",
        fmt_level(a.nearest_support),
        fmt_pips(a.support_distance_pips),
        fmt_level(a.nearest_resistance),
        fmt_pips(a.resistance_distance_pips)
    );
    if let (Some(entry), Some(sl), Some(tp)) = (
        a.suggested_entry,
        a.suggested_stop_loss,
        a.suggested_take_profit,
    ) {
        println!("  Entry {:.5} | Stop {:.5} | Target {:.5}", entry, sl, tp);
    }
}

fn print_risk(r: &RiskCalculation) {
    println!("  Value at risk:    ${:.2}", r.value_at_risk);
    println!("  Stop distance:    {:.1} pips", r.distance_pips);
    println!("  Lot size:         {:.2} lots", r.lot_size);
    println!("  R/R:              1:{:.1}", r.risk_reward);
    println!("  Potential loss:   -${:.2}", r.potential_loss);
    println!("  Potential profit: +${:.2}", r.potential_profit);
}

fn print_record<S: fx_setup_desk::trading::HistoryStore>(desk: &TradingDesk<S>, r: &TradeRecord) {
    let mut line = format!(
        "{}  {}  {:<4} @ {:.5}  {}",
        r.id,
        desk.format_timestamp(r.timestamp),
        r.direction.as_str(),
        r.analyzed_price,
        r.result
    );
    if let (Some(entry), Some(sl), Some(tp)) = (r.entry_price, r.stop_loss, r.take_profit) {
        line.push_str(&format!("  E {:.5} SL {:.5} TP {:.5}", entry, sl, tp));
    }
    if let Some(lots) = r.lot_size {
        line.push_str(&format!("  {:.2} lots", lots));
    }
    if let Some(pnl) = r.profit_loss {
        line.push_str(&format!("  P/L {:+.2}", pnl));
    }
    println!("{}", line);
    if let Some(notes) = &r.notes {
        println!("    {}", notes);
    }
}
