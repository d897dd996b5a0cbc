//! Report rendering: text summary and trade-log CSV export.

use std::io::Write;

use sigcast_core::{Side, TradeKind, TradeRecord};

use crate::runner::RunOutcome;

/// Render a human-readable summary block for one run.
pub fn text_summary(outcome: &RunOutcome) -> String {
    let result = &outcome.result;
    let metrics = &outcome.metrics;
    let profit_factor = if result.profit_factor.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", result.profit_factor)
    };

    let mut out = String::new();
    out.push_str(&format!("run: {} ({})\n", outcome.config.name, &outcome.run_id[..12]));
    out.push_str(&format!("bars processed:    {}\n", result.bars_processed));
    out.push_str(&format!(
        "trades:            {} ({} win / {} loss / {} flat)\n",
        result.total_trades, result.win_trades, result.loss_trades, result.flat_trades
    ));
    out.push_str(&format!("win rate:          {:.1}%\n", result.win_rate));
    out.push_str(&format!("net profit:        {:+.4}\n", metrics.net_profit));
    out.push_str(&format!("average profit:    {:+.4}\n", result.average_profit));
    out.push_str(&format!("profit factor:     {profit_factor}\n"));
    out.push_str(&format!("max drawdown:      {:.4}\n", result.max_drawdown));
    out.push_str(&format!(
        "tp hits:           {} ({:.0}% of trades)\n",
        result.tp_hit_count,
        metrics.tp_hit_rate * 100.0
    ));
    out.push_str(&format!("exposure:          {:.1}%\n", metrics.exposure * 100.0));
    out.push_str(&format!(
        "streaks:           {} wins / {} losses\n",
        metrics.max_consecutive_wins, metrics.max_consecutive_losses
    ));
    out
}

/// Write the audit trail as CSV, one row per record.
pub fn write_trade_log<W: Write>(records: &[TradeRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["bar_index", "date", "kind", "side", "price", "profit", "reason"])?;
    for record in records {
        let kind = match record.kind {
            TradeKind::Entry => "ENTRY",
            TradeKind::Exit => "EXIT",
            TradeKind::Skip => "SKIP",
        };
        let side = match record.side {
            Some(Side::Buy) => "BUY",
            Some(Side::Sell) => "SELL",
            None => "",
        };
        let profit = record
            .profit
            .map(|p| format!("{p:.6}"))
            .unwrap_or_default();
        csv_writer.write_record([
            record.bar_index.to_string(),
            record.date.format("%Y-%m-%d").to_string(),
            kind.to_string(),
            side.to_string(),
            format!("{:.6}", record.price),
            profit,
            record.reason.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
