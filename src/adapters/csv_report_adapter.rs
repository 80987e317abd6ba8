//! CSV report adapter.
//!
//! Writes the per-bar pipeline table to the output path, and the summary
//! metrics to a sibling `<stem>_metrics.csv` file.

use crate::domain::error::VoltraderError;
use crate::domain::metrics::Metrics;
use crate::domain::pipeline::PipelineTable;
use crate::ports::report_port::ReportPort;
use std::path::{Path, PathBuf};

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn metrics_path(output_path: &str) -> PathBuf {
        let path = Path::new(output_path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        path.with_file_name(format!("{}_metrics.csv", stem))
    }

    fn write_table(table: &PipelineTable, output_path: &str) -> Result<(), VoltraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| VoltraderError::Report {
            reason: format!("failed to open {}: {}", output_path, e),
        })?;

        wtr.write_record([
            "timestamp",
            "close",
            "market_return",
            "ann_vol",
            "forecast",
            "leverage_cap",
            "leverage_ratio",
            "raw_target",
            "sl_threshold",
            "sigma_event",
            "buffered_pos",
            "position",
            "transaction_cost",
            "holding_cost",
            "net_return",
            "equity",
            "buy_hold_equity",
        ])
        .map_err(|e| VoltraderError::Report {
            reason: format!("header write failed: {}", e),
        })?;

        for i in 0..table.len() {
            wtr.write_record([
                table.time[i].format("%Y-%m-%d %H:%M:%S").to_string(),
                table.close[i].to_string(),
                table.market_return[i].to_string(),
                table.ann_vol[i].to_string(),
                table.forecast[i].to_string(),
                table.leverage_cap[i].to_string(),
                table.leverage_ratio[i].to_string(),
                table.raw_target[i].to_string(),
                table.sl_threshold[i].to_string(),
                (table.sigma_event[i] as u8).to_string(),
                table.buffered_pos[i].to_string(),
                table.position[i].to_string(),
                table.transaction_cost[i].to_string(),
                table.holding_cost[i].to_string(),
                table.net_return[i].to_string(),
                table.equity[i].to_string(),
                table.buy_hold_equity[i].to_string(),
            ])
            .map_err(|e| VoltraderError::Report {
                reason: format!("row {} write failed: {}", i, e),
            })?;
        }

        wtr.flush().map_err(|e| VoltraderError::Report {
            reason: format!("flush failed: {}", e),
        })
    }

    fn write_metrics(metrics: &Metrics, path: &Path) -> Result<(), VoltraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| VoltraderError::Report {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let rows: [(&str, String); 11] = [
            ("total_return", metrics.total_return.to_string()),
            ("annualized_return", metrics.annualized_return.to_string()),
            ("sharpe_ratio", metrics.sharpe_ratio.to_string()),
            ("max_drawdown", metrics.max_drawdown.to_string()),
            (
                "max_drawdown_duration",
                metrics.max_drawdown_duration.to_string(),
            ),
            ("calmar_ratio", metrics.calmar_ratio.to_string()),
            ("trade_count", metrics.trade_count.to_string()),
            ("time_in_market", metrics.time_in_market.to_string()),
            ("breach_count", metrics.breach_count.to_string()),
            ("final_equity", metrics.final_equity.to_string()),
            ("buy_hold_return", metrics.buy_hold_return.to_string()),
        ];

        wtr.write_record(["metric", "value"])
            .map_err(|e| VoltraderError::Report {
                reason: format!("header write failed: {}", e),
            })?;
        for (name, value) in rows {
            wtr.write_record([name, &value])
                .map_err(|e| VoltraderError::Report {
                    reason: format!("metric {} write failed: {}", name, e),
                })?;
        }

        wtr.flush().map_err(|e| VoltraderError::Report {
            reason: format!("flush failed: {}", e),
        })
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        table: &PipelineTable,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), VoltraderError> {
        Self::write_table(table, output_path)?;
        Self::write_metrics(metrics, &Self::metrics_path(output_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlc::Bar;
    use crate::domain::params::StrategyParams;
    use crate::domain::pipeline::run_pipeline;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn sample_table() -> PipelineTable {
        let bars: Vec<Bar> = (0..120)
            .map(|i| {
                let close = 100.0 * 1.001_f64.powi(i);
                Bar {
                    time: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        + chrono::Duration::hours(i as i64),
                    open: close,
                    high: close * 1.005,
                    low: close * 0.995,
                    close,
                }
            })
            .collect();
        run_pipeline(&bars, &StrategyParams::default(), "test").unwrap()
    }

    #[test]
    fn writes_table_and_metrics_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("run.csv");
        let out_str = out.to_string_lossy().into_owned();

        let table = sample_table();
        let metrics = Metrics::compute(&table, 10_000.0, 8760.0);
        CsvReportAdapter::new()
            .write(&table, &metrics, &out_str)
            .unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("timestamp,close,market_return"));
        assert!(header.ends_with("equity,buy_hold_equity"));
        assert_eq!(lines.count(), table.len());

        let metrics_file = dir.path().join("run_metrics.csv");
        let metrics_content = fs::read_to_string(metrics_file).unwrap();
        assert!(metrics_content.contains("total_return"));
        assert!(metrics_content.contains("sharpe_ratio"));
        assert!(metrics_content.contains("breach_count"));
    }

    #[test]
    fn sigma_event_serialized_as_flag() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("run.csv");
        let out_str = out.to_string_lossy().into_owned();

        let table = sample_table();
        let metrics = Metrics::compute(&table, 10_000.0, 8760.0);
        CsvReportAdapter::new()
            .write(&table, &metrics, &out_str)
            .unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let first_row = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = first_row.split(',').collect();
        assert!(fields[9] == "0" || fields[9] == "1");
    }

    #[test]
    fn metrics_path_derivation() {
        assert_eq!(
            CsvReportAdapter::metrics_path("/tmp/out/run.csv"),
            PathBuf::from("/tmp/out/run_metrics.csv")
        );
        assert_eq!(
            CsvReportAdapter::metrics_path("report.csv"),
            PathBuf::from("report_metrics.csv")
        );
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let table = sample_table();
        let metrics = Metrics::compute(&table, 10_000.0, 8760.0);
        let result = CsvReportAdapter::new().write(&table, &metrics, "/nonexistent/dir/out.csv");
        assert!(matches!(result, Err(VoltraderError::Report { .. })));
    }
}
