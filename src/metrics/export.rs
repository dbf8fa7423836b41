use crate::engine::TradeRecord;
use crate::metrics::summary::BacktestReport;
use anyhow::{Context, Result};
use std::path::Path;

//writes every report, in the given order, as a pretty printed json array
pub fn write_json_report(path: &Path, reports: &[BacktestReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json).context(format!("Failed to write report: {:?}", path))?;
    Ok(())
}

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .context(format!("Failed to create CSV file: {:?}", path))?;

    for trade in trades {
        writer.serialize(trade)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyParams;
    use crate::data::{PriceSeries, NO_FEAR_DATA};
    use crate::engine::simulate;
    use serde_json::Value;

    fn series() -> PriceSeries {
        PriceSeries::from_timestamps(
            vec![1_704_067_200, 1_704_067_260, 1_704_067_320],
            vec![100.0, 101.0, 102.0],
            vec![1.0; 3],
            vec![NO_FEAR_DATA; 3],
        )
        .unwrap()
    }

    fn params() -> StrategyParams {
        StrategyParams {
            reentry_pct_values: 0.0,
            reentry_window_values: 0,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn json_report_keeps_order() {
        let s = series();
        let p = params();
        let output = simulate(&s, &p, false);
        let reports = vec![
            BacktestReport::from_output(1, &output, &s, &p),
            BacktestReport::from_output(0, &output, &s, &p),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_report(&path, &reports).unwrap();

        let written: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["test_id"], 2);
        assert_eq!(written[1]["reentry_hits"], 1);
    }

    #[test]
    fn trades_csv_uses_reason_codes() {
        let output = simulate(&series(), &params(), true);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades_csv(&path, &output.trades).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "entry_time");
        assert_eq!(&headers[5], "entry_reason");

        let rows: Vec<TradeRecord> = reader.deserialize().map(|row| row.unwrap()).collect();
        assert_eq!(rows, output.trades);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(",R1,END,"));
    }
}
