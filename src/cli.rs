//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{build_params, validate_config};
use crate::domain::error::VoltraderError;
use crate::domain::metrics::Metrics;
use crate::domain::params::StrategyParams;
use crate::domain::pipeline::run_pipeline;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "voltrader",
    about = "Vol-targeted single-asset trading research engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the research pipeline over a bar series
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the per-bar table (and metrics sidecar) here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured csv_path
        #[arg(long)]
        data: Option<PathBuf>,
        /// Stop after config validation and parameter construction
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range of the configured series
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            data,
            dry_run,
        } => run_pipeline_command(&config, output.as_ref(), data.as_ref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data } => run_info(&config, data.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = VoltraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn resolve_data_path(
    adapter: &dyn ConfigPort,
    data_override: Option<&PathBuf>,
) -> Result<PathBuf, VoltraderError> {
    match data_override {
        Some(p) => Ok(p.clone()),
        None => adapter
            .get_string("data", "csv_path")
            .map(PathBuf::from)
            .ok_or_else(|| VoltraderError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_path".to_string(),
            }),
    }
}

fn run_pipeline_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate config
    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build parameters
    let params = match build_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Strategy: {} trend rule(s), vol span {}, max leverage {}",
        params.trend_rules.len(),
        params.vol_span,
        params.max_leverage
    );

    if dry_run {
        eprintln!("Dry run: config valid");
        return ExitCode::SUCCESS;
    }

    // Stage 4: Load bars
    let data_path = match resolve_data_path(&adapter, data_override) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading bars from {}", data_path.display());
    let source = data_path.display().to_string();
    let data_port = CsvAdapter::new(data_path);
    let bars = match data_port.load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} bars", bars.len());

    // Stage 5: Run pipeline
    let table = match run_pipeline(&bars, &params, &source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 6: Metrics and summary
    let metrics = Metrics::compute(&table, params.initial_capital, params.bars_per_year);
    print_summary(&metrics, &params);

    // Stage 7: Report
    if let Some(out) = output_path {
        let out_str = out.display().to_string();
        let report = CsvReportAdapter::new();
        if let Err(e) = report.write(&table, &metrics, &out_str) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Report written to {}", out_str);
    }

    ExitCode::SUCCESS
}

fn print_summary(metrics: &Metrics, params: &StrategyParams) {
    println!("Initial capital:    {:.2}", params.initial_capital);
    println!("Final equity:       {:.2}", metrics.final_equity);
    println!("Total return:       {:.2}%", metrics.total_return * 100.0);
    println!(
        "Annualized return:  {:.2}%",
        metrics.annualized_return * 100.0
    );
    println!("Buy & hold return:  {:.2}%", metrics.buy_hold_return * 100.0);
    println!("Sharpe ratio:       {:.3}", metrics.sharpe_ratio);
    println!("Max drawdown:       {:.2}%", metrics.max_drawdown * 100.0);
    println!("Calmar ratio:       {:.3}", metrics.calmar_ratio);
    println!("Trades:             {}", metrics.trade_count);
    println!(
        "Time in market:     {:.1}%",
        metrics.time_in_market * 100.0
    );
    println!("Breaker events:     {}", metrics.breach_count);
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match validate_config(&adapter).and_then(|_| build_params(&adapter)) {
        Ok(params) => {
            println!("Config OK");
            println!("  trend rules:   {}", params.trend_rules.len());
            println!("  vol span:      {}", params.vol_span);
            println!("  max leverage:  {}", params.max_leverage);
            println!("  bear leverage: {}", params.bear_leverage);
            println!("  buffer:        {}", params.buffer_fraction);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf, data_override: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_path = match resolve_data_path(&adapter, data_override) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(data_path.clone());
    match data_port.data_range() {
        Ok(Some((first, last, count))) => {
            println!("{}", data_path.display());
            println!("  bars:  {}", count);
            println!("  first: {}", first);
            println!("  last:  {}", last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("error: no bars in {}", data_path.display());
            let err = VoltraderError::NoData {
                data_source: data_path.display().to_string(),
            };
            (&err).into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
