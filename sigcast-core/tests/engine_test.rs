//! End-to-end replay scenarios and run-level invariants.
//!
//! Fixtures are hand-built bar series where the expected entries and exits
//! can be verified by inspection; the generator-based tests check invariants
//! (no overlap, conservation, determinism) on longer series.

use chrono::NaiveDate;
use sigcast_core::{
    run, BacktestConfig, Bar, ConfirmationConfig, ExitPolicy, IndicatorSet, SeriesForecast, Side,
    TradeKind,
};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn make_bar(index: usize, close: f64) -> Bar {
    Bar {
        index,
        date: base_date() + chrono::Duration::days(index as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000,
        indicators: IndicatorSet::empty(),
    }
}

/// Synthetic walk with forward-only derived indicators, in the spirit of a
/// deterministic pseudo-random LCG series.
fn make_walk_bars(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;
    let mut closes: Vec<f64> = Vec::with_capacity(n);

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.02; // -2.0 to +2.0
        price += change;
        price = price.max(10.0);
        closes.push(price);

        let mut bar = make_bar(i, price);
        let ind = &mut bar.indicators;
        if i + 1 >= 20 {
            ind.sma_20 = closes[i + 1 - 20..=i].iter().sum::<f64>() / 20.0;
        }
        if i + 1 >= 50 {
            ind.sma_50 = closes[i + 1 - 50..=i].iter().sum::<f64>() / 50.0;
        }
        ind.atr_14 = 0.6 + change.abs() * 0.2;
        ind.rsi_14 = 30.0 + (seed % 40) as f64;
        ind.macd = ((seed >> 8) % 100) as f64 * 0.01 - 0.5;
        ind.macd_signal = ((seed >> 16) % 100) as f64 * 0.01 - 0.5;
        bars.push(bar);
    }

    bars
}

fn walk_forecast(bars: &[Bar]) -> SeriesForecast {
    // One bar ahead of the close, so the forecast has real direction.
    SeriesForecast::from_values(bars.iter().map(|b| b.close * 1.001).collect())
}

#[test]
fn flat_forecast_flat_sma_skips_every_bar() {
    // Gate always passes (rising SMA-50, ATR 1.0 > 0.5), but the trigger has
    // nothing to act on: every decision bar is a reasoned skip.
    let mut bars: Vec<Bar> = (0..10).map(|i| make_bar(i, 100.0)).collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        bar.indicators.sma_50 = 100.0 + 0.1 * i as f64;
        bar.indicators.sma_20 = 100.0;
        bar.indicators.atr_14 = 1.0;
        bar.indicators.rsi_14 = 40.0;
        bar.indicators.macd = 1.0;
        bar.indicators.macd_signal = 0.5;
    }
    let forecast = SeriesForecast::from_values(vec![100.0; 10]);
    let result = run(&bars, &forecast, &BacktestConfig::default()).unwrap();

    assert_eq!(result.total_trades, 0);
    // Entries stop holding_period (3) bars before the end: bars 0..7 visited.
    assert_eq!(result.bars_processed, 7);
    assert_eq!(result.records.len(), 7);
    assert!(result.records.iter().all(|r| r.kind == TradeKind::Skip));
    assert_eq!(result.records[0].reason, "insufficient history");
    for record in &result.records[1..] {
        assert_eq!(record.reason, "flat forecast and flat SMA");
    }
}

#[test]
fn lookback_take_profit_closes_on_window_max() {
    // Gate opens only at index 5; the buy there take-profits at index 7 on
    // the window max (entry+1.2), one bar before the deadline.
    let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.4, 101.2, 100.3, 100.3];
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        let ind = &mut bar.indicators;
        ind.sma_50 = if i < 5 { 100.0 } else { 100.0 + 0.1 * (i - 4) as f64 };
        ind.atr_14 = 1.0;
        ind.rsi_14 = 40.0;
        ind.macd = 1.0;
        ind.macd_signal = 0.5;
    }
    let forecast = SeriesForecast::from_values((0..10).map(|i| 100.0 + i as f64).collect());
    let config = BacktestConfig {
        exit: ExitPolicy::FixedLookbackTp {
            lookback: 3,
            threshold: 1.0,
            threshold_atr_mult: None,
        },
        ..BacktestConfig::default()
    };
    let result = run(&bars, &forecast, &config).unwrap();

    let entries: Vec<_> = result.records.iter().filter(|r| r.is_entry()).collect();
    let exits: Vec<_> = result.records.iter().filter(|r| r.is_exit()).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bar_index, 5);
    assert_eq!(entries[0].side, Some(Side::Buy));
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].bar_index, 7);
    assert!((exits[0].profit.unwrap() - 1.2).abs() < 1e-12);

    assert_eq!(result.total_trades, 1);
    assert_eq!(result.win_trades, 1);
    assert_eq!(result.tp_hit_count, 1);
    assert_eq!(result.profit_factor, f64::INFINITY);
}

#[test]
fn trailing_stop_closes_sell_on_retrace() {
    // Sell at index 2 (entry 100, ATR 2.0, factor 0.5 -> stop distance 1.0).
    // Favorable move to 97.0, then a 1.2 retrace trips the stop at 98.2.
    let closes = [100.0, 100.0, 100.0, 99.0, 97.0, 97.5, 98.2, 98.2, 98.2, 98.2];
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        let ind = &mut bar.indicators;
        ind.sma_50 = if i < 2 { 100.0 } else { 100.0 + 0.1 * (i - 1) as f64 };
        ind.atr_14 = 2.0;
        ind.rsi_14 = 60.0;
        ind.macd = 0.5;
        ind.macd_signal = 1.0;
    }
    let forecast = SeriesForecast::from_values((0..10).map(|i| 100.0 - i as f64).collect());
    let config = BacktestConfig {
        exit: ExitPolicy::TrailingStop { trail_atr_mult: 0.5 },
        holding_period: 6,
        ..BacktestConfig::default()
    };
    let result = run(&bars, &forecast, &config).unwrap();

    let entries: Vec<_> = result.records.iter().filter(|r| r.is_entry()).collect();
    let exits: Vec<_> = result.records.iter().filter(|r| r.is_exit()).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bar_index, 2);
    assert_eq!(entries[0].side, Some(Side::Sell));
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].bar_index, 6);
    assert!((exits[0].profit.unwrap() - 1.8).abs() < 1e-12);
    assert!(exits[0].reason.contains("trailing stop"));
    assert_eq!(result.tp_hit_count, 1);
}

#[test]
fn deadline_close_books_the_loss() {
    // Unreachable take-profit: the forced close at entry+3 settles at a loss.
    let closes = [100.0, 100.0, 99.8, 99.6, 99.4, 99.4, 99.4];
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        let ind = &mut bar.indicators;
        ind.sma_50 = if i < 1 { 100.0 } else { 100.0 + 0.1 * i as f64 };
        ind.atr_14 = 1.0;
        ind.rsi_14 = 40.0;
        ind.macd = 1.0;
        ind.macd_signal = 0.5;
    }
    let forecast = SeriesForecast::from_values((0..7).map(|i| 100.0 + i as f64).collect());
    let config = BacktestConfig {
        exit: ExitPolicy::FixedLookbackTp {
            lookback: 3,
            threshold: 50.0,
            threshold_atr_mult: None,
        },
        ..BacktestConfig::default()
    };
    let result = run(&bars, &forecast, &config).unwrap();

    let exits: Vec<_> = result.records.iter().filter(|r| r.is_exit()).collect();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].bar_index, 4); // entry at 1, deadline 1+3
    assert_eq!(exits[0].reason, "holding period expired");
    assert!((exits[0].profit.unwrap() - (-0.6)).abs() < 1e-12);
    assert_eq!(result.loss_trades, 1);
    assert_eq!(result.tp_hit_count, 0);
    assert_eq!(result.profit_factor, 0.0);
    assert!((result.max_drawdown - 0.6).abs() < 1e-12);
}

#[test]
fn trade_ranges_never_overlap() {
    let bars = make_walk_bars(400);
    let forecast = walk_forecast(&bars);
    let result = run(&bars, &forecast, &BacktestConfig::default()).unwrap();

    let mut last_exit: Option<usize> = None;
    let mut open_entry: Option<usize> = None;
    for record in &result.records {
        match record.kind {
            TradeKind::Entry => {
                assert!(open_entry.is_none(), "entry at {} while a position is open", record.bar_index);
                if let Some(exit) = last_exit {
                    assert!(record.bar_index > exit, "entry at {} inside previous trade", record.bar_index);
                }
                open_entry = Some(record.bar_index);
            }
            TradeKind::Exit => {
                let entry = open_entry.take().expect("exit without entry");
                assert!(record.bar_index > entry);
                last_exit = Some(record.bar_index);
            }
            TradeKind::Skip => {}
        }
    }
}

#[test]
fn trade_counts_are_conserved() {
    let bars = make_walk_bars(400);
    let forecast = walk_forecast(&bars);
    let result = run(&bars, &forecast, &BacktestConfig::default()).unwrap();

    assert_eq!(
        result.total_trades,
        result.win_trades + result.loss_trades + result.flat_trades
    );
    let exits = result.records.iter().filter(|r| r.is_exit()).count();
    assert_eq!(result.total_trades, exits);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let bars = make_walk_bars(300);
    let forecast = walk_forecast(&bars);
    let config = BacktestConfig::default();

    let first = run(&bars, &forecast, &config).unwrap();
    let second = run(&bars, &forecast, &config).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn missing_atr_fails_the_gate_before_any_entry() {
    // An ATR-scaled exit policy can never capture a NaN ATR: the gate
    // rejects any decision bar where ATR-14 is unavailable, so the first
    // entry lands on the first bar with a real ATR.
    let mut bars: Vec<Bar> = (0..12).map(|i| make_bar(i, 100.0)).collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        let ind = &mut bar.indicators;
        ind.sma_50 = 100.0 + 0.1 * i as f64;
        ind.atr_14 = if i < 5 { f64::NAN } else { 2.0 };
        ind.rsi_14 = 40.0;
        ind.macd = 1.0;
        ind.macd_signal = 0.5;
    }
    let forecast = SeriesForecast::from_values((0..12).map(|i| 100.0 + i as f64).collect());
    let config = BacktestConfig {
        exit: ExitPolicy::TrailingStop { trail_atr_mult: 0.5 },
        holding_period: 4,
        ..BacktestConfig::default()
    };
    let result = run(&bars, &forecast, &config).unwrap();

    for record in result.records.iter().filter(|r| (1..5).contains(&r.bar_index)) {
        assert_eq!(record.kind, TradeKind::Skip);
        assert_eq!(record.reason, "atr-14 unavailable");
    }
    let entries: Vec<_> = result.records.iter().filter(|r| r.is_entry()).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bar_index, 5);
}

#[test]
fn stop_after_yields_a_stable_prefix() {
    let bars = make_walk_bars(300);
    let forecast = walk_forecast(&bars);
    let full = run(&bars, &forecast, &BacktestConfig::default()).unwrap();

    for stop in [10usize, 60, 150] {
        let config = BacktestConfig {
            stop_after: Some(stop),
            ..BacktestConfig::default()
        };
        let partial = run(&bars, &forecast, &config).unwrap();
        let expected: Vec<_> = full.records.iter().filter(|r| r.bar_index < stop).collect();
        let actual: Vec<_> = partial.records.iter().collect();
        assert_eq!(actual, expected, "prefix mismatch at stop_after={stop}");
    }
}

#[test]
fn oscillator_exit_policy_runs_end_to_end() {
    let closes = [100.0, 100.0, 100.2, 100.4, 100.6, 100.6, 100.6, 100.6];
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect();
    for (i, bar) in bars.iter_mut().enumerate() {
        let ind = &mut bar.indicators;
        ind.sma_50 = if i < 1 { 100.0 } else { 100.0 + 0.1 * i as f64 };
        ind.atr_14 = 1.0;
        // Cool at entry, overbought two bars later.
        ind.rsi_14 = if i >= 3 { 75.0 } else { 40.0 };
        ind.macd = 1.0;
        ind.macd_signal = 0.5;
    }
    let forecast = SeriesForecast::from_values((0..8).map(|i| 100.0 + i as f64).collect());
    let config = BacktestConfig {
        exit: ExitPolicy::OscillatorExit {
            overbought: 70.0,
            oversold: 30.0,
        },
        holding_period: 5,
        confirmation: ConfirmationConfig::default(),
        ..BacktestConfig::default()
    };
    let result = run(&bars, &forecast, &config).unwrap();

    let entries: Vec<_> = result.records.iter().filter(|r| r.is_entry()).collect();
    let exits: Vec<_> = result.records.iter().filter(|r| r.is_exit()).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bar_index, 1);
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].bar_index, 3);
    assert!(exits[0].reason.contains("rsi"));
}
