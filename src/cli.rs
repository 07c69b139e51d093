//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market_adapter::CsvMarketAdapter;
use crate::adapters::csv_statistics_adapter::CsvStatisticsAdapter;
use crate::adapters::csv_table::CsvTable;
use crate::adapters::csv_trade_log::CsvTradeLogWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::margin_execution::MarginExecution;
use crate::adapters::prediction_classifier::PredictionClassifier;
use crate::adapters::tracing_observer::TracingObserver;
use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::catalog::{all_months, SequenceCatalog};
use crate::domain::error::TreeTraderError;
use crate::domain::settings::BacktestSettings;
use crate::domain::simulator::{CancelFlag, RunReport, TradingSimulator};
use crate::ports::observer_port::SimulationObserver;

#[derive(Parser, Debug)]
#[command(name = "treetrader", about = "Decision tree trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay every ranked chunk and write one trade log per chunk
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [model] algorithm
        #[arg(short, long)]
        algorithm: Option<String>,
        /// Validate config and load statistics without trading
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the chunks of every bucket ranked by error rate
    Rank {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        algorithm: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub type CsvSimulator =
    TradingSimulator<CsvMarketAdapter, PredictionClassifier, MarginExecution, CsvTradeLogWriter>;

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            algorithm,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, algorithm.as_deref())
            } else {
                run_backtest(&config, algorithm.as_deref())
            }
        }
        Command::Rank { config, algorithm } => run_rank(&config, algorithm.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn report(err: TreeTraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(report)
}

/// Read and validate settings, applying a command line algorithm override.
pub fn load_settings(
    path: &PathBuf,
    algorithm: Option<&str>,
) -> Result<BacktestSettings, TreeTraderError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    let mut settings = BacktestSettings::from_config(&adapter)?;
    if let Some(name) = algorithm {
        settings.algorithm = name.parse::<DecisionTreeAlgorithm>()?;
    }
    Ok(settings)
}

pub fn csv_table(settings: &BacktestSettings) -> CsvTable {
    CsvTable::new()
        .with_delimiter(settings.delimiter)
        .with_skip(usize::from(settings.has_header))
}

pub fn statistics_source(settings: &BacktestSettings) -> CsvStatisticsAdapter {
    CsvStatisticsAdapter::new(
        settings.statistics_path.clone(),
        &settings.instrument,
        &settings.year,
    )
    .with_table(csv_table(settings))
}

pub fn build_simulator(settings: &BacktestSettings) -> CsvSimulator {
    let table = csv_table(settings);
    let market = CsvMarketAdapter::new(
        settings.market_path.clone(),
        &settings.instrument,
        &settings.year,
        settings.chunk_size,
    )
    .with_table(table);
    let classifier = PredictionClassifier::new(settings.results_root()).with_table(table);
    TradingSimulator::new(
        market,
        classifier,
        MarginExecution::new(),
        CsvTradeLogWriter::new(),
    )
}

/// Initialize, prepare and run a simulator wired to the CSV adapters.
pub fn run_backtest_pipeline(
    settings: &BacktestSettings,
    observer: &mut dyn SimulationObserver,
    cancel: &CancelFlag,
) -> Result<RunReport, TreeTraderError> {
    let source = statistics_source(settings);
    let mut simulator = build_simulator(settings);

    simulator.initialize(
        &source,
        &settings.periods,
        settings.min_cases,
        settings.results_root(),
    )?;
    simulator.prepare_for_algorithm(settings.algorithm)?;
    simulator.set_quantities(settings.quantities)?;
    simulator.run_until_cancelled(observer, cancel)
}

fn run_backtest(config_path: &PathBuf, algorithm: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let settings = match load_settings(config_path, algorithm) {
        Ok(s) => s,
        Err(e) => return report(e),
    };

    eprintln!(
        "Backtesting {} {} with {} over periods {}",
        settings.instrument,
        settings.year,
        settings.algorithm,
        settings.periods.join(",")
    );

    let mut observer = TracingObserver::new();
    let result = match run_backtest_pipeline(&settings, &mut observer, &CancelFlag::new()) {
        Ok(r) => r,
        Err(e) => return report(e),
    };

    let records: u64 = result
        .candidates
        .iter()
        .map(|c| c.records_processed)
        .sum();

    eprintln!("\n=== Backtest Summary ===");
    eprintln!("Chunks traded:    {}", result.candidates.len());
    eprintln!("Burned out:       {}", result.burned_out());
    eprintln!("Records replayed: {}", records);
    eprintln!(
        "Results written to: {}",
        settings.results_root().join("TradingResults").display()
    );
    ExitCode::SUCCESS
}

fn build_ranked_catalog(settings: &BacktestSettings) -> Result<SequenceCatalog, TreeTraderError> {
    let source = statistics_source(settings);
    let mut catalog =
        SequenceCatalog::build(&source, &all_months(), &settings.periods, settings.min_cases)?;
    catalog.rank(settings.algorithm)?;
    Ok(catalog)
}

pub fn run_dry_run(config_path: &PathBuf, algorithm: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let settings = match load_settings(config_path, algorithm) {
        Ok(s) => s,
        Err(e) => return report(e),
    };
    eprintln!("Config validated successfully");

    let catalog = match build_ranked_catalog(&settings) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    eprintln!(
        "\n{} buckets, {} candidate chunks with at least {} cases",
        catalog.len(),
        catalog.total_sequences(),
        settings.min_cases
    );
    eprintln!(
        "Initial balance {:.2}, bid size {:.2}, margin ratio {}",
        settings.quantities.initial_balance,
        settings.quantities.bid_size,
        settings.quantities.margin_ratio
    );
    eprintln!("\nDry run complete. No trades executed.");
    ExitCode::SUCCESS
}

fn run_rank(config_path: &PathBuf, algorithm: Option<&str>) -> ExitCode {
    let settings = match load_settings(config_path, algorithm) {
        Ok(s) => s,
        Err(e) => return report(e),
    };
    let catalog = match build_ranked_catalog(&settings) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    println!("month,period,rank,chunk,cases,error_rate");
    for (key, sequences) in catalog.buckets() {
        for (rank, sequence) in sequences.iter().enumerate() {
            let rate = match sequence.error_rate(settings.algorithm) {
                Ok(r) => r,
                Err(e) => return report(e),
            };
            println!(
                "{},{},{},{},{},{:.6}",
                key.month,
                key.period,
                rank + 1,
                sequence.chunk,
                sequence.cases,
                rate
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match BacktestSettings::from_config(&adapter) {
        Ok(settings) => {
            eprintln!(
                "Config is valid: {} {}, algorithm {}, periods {}",
                settings.instrument,
                settings.year,
                settings.algorithm,
                settings.periods.join(",")
            );
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_backtest_with_override() {
        let cli = Cli::parse_from([
            "treetrader",
            "backtest",
            "--config",
            "model.ini",
            "--algorithm",
            "C50",
        ]);
        match cli.command {
            Command::Backtest {
                config,
                algorithm,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("model.ini"));
                assert_eq!(algorithm.as_deref(), Some("C50"));
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_rank() {
        let cli = Cli::parse_from(["treetrader", "rank", "-c", "model.ini"]);
        assert!(matches!(cli.command, Command::Rank { algorithm: None, .. }));
    }
}
