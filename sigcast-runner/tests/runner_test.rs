//! Runner integration tests: CSV loading, end-to-end runs, sweep parity.

use std::io::Write;

use sigcast_runner::{
    load_bars, load_forecast, run_single, run_sweep, run_sweep_serial, text_summary,
    write_trade_log, LoadError, ParamGrid, RunConfig,
};
use tempfile::NamedTempFile;

const BAR_HEADER: &str = "date,open,high,low,close,volume,sma_20,sma_50,rsi_14,macd,macd_signal,atr_14";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file.flush().expect("flush");
    file
}

/// Bar CSV where the gate opens at row 6 and a buy take-profits two bars
/// later on the lookback max.
fn scenario_csv() -> String {
    let mut text = String::from(BAR_HEADER);
    text.push('\n');
    let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.4, 101.2, 100.3, 100.3];
    for (i, close) in closes.iter().enumerate() {
        let sma_50 = if i < 5 { 100.0 } else { 100.0 + 0.1 * (i - 4) as f64 };
        text.push_str(&format!(
            "2024-01-{:02},{close},{},{},{close},1000,100.0,{sma_50},40.0,1.0,0.5,1.0\n",
            i + 2,
            close + 0.5,
            close - 0.5,
        ));
    }
    text
}

fn scenario_forecast_csv() -> String {
    let mut text = String::from("date,predicted\n");
    for i in 0..10 {
        text.push_str(&format!("2024-01-{:02},{}\n", i + 2, 100.0 + i as f64));
    }
    text
}

#[test]
fn loads_bars_with_contiguous_indices() {
    let file = write_temp(&scenario_csv());
    let bars = load_bars(file.path()).unwrap();
    assert_eq!(bars.len(), 10);
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(bar.index, i);
    }
    assert_eq!(bars[7].close, 101.2);
    assert_eq!(bars[6].indicators.sma_50, 100.2);
    // Optional columns absent from the file load as NaN.
    assert!(bars[0].indicators.adx_14.is_nan());
}

#[test]
fn missing_required_column_is_fatal() {
    // No atr_14 column.
    let text = "date,open,high,low,close,volume,sma_20,sma_50,rsi_14,macd,macd_signal\n\
                2024-01-02,100.0,100.5,99.5,100.0,1000,100.0,100.0,40.0,1.0,0.5\n";
    let file = write_temp(text);
    match load_bars(file.path()) {
        Err(LoadError::MissingColumn { column }) => assert_eq!(column, "atr_14"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn empty_indicator_cell_loads_as_nan() {
    let text = format!(
        "{BAR_HEADER}\n2024-01-02,100.0,100.5,99.5,100.0,1000,,,40.0,1.0,0.5,1.0\n"
    );
    let file = write_temp(&text);
    let bars = load_bars(file.path()).unwrap();
    assert!(bars[0].indicators.sma_20.is_nan());
    assert!(bars[0].indicators.sma_50.is_nan());
    assert_eq!(bars[0].indicators.rsi_14, 40.0);
}

#[test]
fn unparsable_price_names_row_and_column() {
    let text = format!(
        "{BAR_HEADER}\n2024-01-02,100.0,100.5,99.5,not-a-number,1000,100.0,100.0,40.0,1.0,0.5,1.0\n"
    );
    let file = write_temp(&text);
    match load_bars(file.path()) {
        Err(LoadError::BadField { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "close");
        }
        other => panic!("expected BadField, got {other:?}"),
    }
}

#[test]
fn forecast_gaps_are_explicit() {
    let text = "date,predicted\n2024-01-02,100.0\n2024-01-03,\n2024-01-04,102.0\n";
    let file = write_temp(text);
    let forecast = load_forecast(file.path()).unwrap();
    assert_eq!(forecast.len(), 3);
}

#[test]
fn csv_scenario_runs_end_to_end() {
    let bar_file = write_temp(&scenario_csv());
    let forecast_file = write_temp(&scenario_forecast_csv());
    let bars = load_bars(bar_file.path()).unwrap();
    let forecast = load_forecast(forecast_file.path()).unwrap();

    let mut config = RunConfig::default();
    config.engine.exit = sigcast_core::ExitPolicy::FixedLookbackTp {
        lookback: 3,
        threshold: 1.0,
        threshold_atr_mult: None,
    };
    let outcome = run_single(&config, &bars, &forecast).unwrap();

    assert_eq!(outcome.result.total_trades, 1);
    assert_eq!(outcome.result.win_trades, 1);
    assert_eq!(outcome.result.tp_hit_count, 1);

    let summary = text_summary(&outcome);
    assert!(summary.contains("profit factor:     inf"));

    let mut buffer = Vec::new();
    write_trade_log(&outcome.result.records, &mut buffer).unwrap();
    let log = String::from_utf8(buffer).unwrap();
    assert!(log.contains("ENTRY,BUY"));
    assert!(log.contains("EXIT,BUY"));
}

#[test]
fn parallel_sweep_matches_serial() {
    let bar_file = write_temp(&scenario_csv());
    let forecast_file = write_temp(&scenario_forecast_csv());
    let bars = load_bars(bar_file.path()).unwrap();
    let forecast = load_forecast(forecast_file.path()).unwrap();

    let grid = ParamGrid::default_grid();
    let configs = grid.generate_configs(&RunConfig::default());

    let parallel = run_sweep(&configs, &bars, &forecast).unwrap();
    let serial = run_sweep_serial(&configs, &bars, &forecast).unwrap();

    assert_eq!(parallel.len(), serial.len());
    for (p, s) in parallel.iter().zip(&serial) {
        assert_eq!(p.run_id, s.run_id);
        assert_eq!(
            serde_json::to_string(&p.result).unwrap(),
            serde_json::to_string(&s.result).unwrap()
        );
    }
}
