//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::{CsvAdapter, write_price_table};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::analysis::{AnalysisConfig, AnalysisReport, run_analysis};
use crate::domain::charts::render_charts;
use crate::domain::config_validation::{PriceSource, validate_analysis_config};
use crate::domain::error::CryptofolioError;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

pub const DEFAULT_OUTPUT_DIR: &str = "charts";

#[derive(Parser, Debug)]
#[command(name = "cryptofolio", about = "Fixed-weight crypto portfolio analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, evaluate portfolios and write charts
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Chart directory (overrides [output] directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download the configured price table to a CSV file
    Fetch {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze { config, output } => run_analyze(config.as_ref(), output.as_ref()),
        Command::Fetch { output, config } => run_fetch(&output, config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CryptofolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Build the price adapter for a resolved source.
pub fn build_price_port(source: &PriceSource) -> Result<Box<dyn PricePort>, CryptofolioError> {
    let port: Box<dyn PricePort> = match source {
        PriceSource::Yahoo => Box::new(YahooAdapter::new()?),
        PriceSource::Csv(path) => Box::new(CsvAdapter::new(path.clone())),
    };
    Ok(port)
}

pub fn resolve_output_dir(output: Option<&PathBuf>, adapter: &dyn ConfigPort) -> PathBuf {
    output
        .cloned()
        .or_else(|| {
            adapter
                .get_string("output", "directory")
                .map(|d| PathBuf::from(d.trim()))
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn fmt_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn fmt_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "n/a".to_string()
    }
}

/// Plain-text summary: analysed span, then one row per portfolio.
pub fn format_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();
    match (report.first_date(), report.last_date()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Returns {} to {} ({} price rows, {} return rows)\n\n",
            first,
            last,
            report.price_rows,
            report.returns.len()
        )),
        _ => out.push_str(&format!("{} price rows, no returns\n\n", report.price_rows)),
    }

    let width = report
        .results
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("Portfolio".len()))
        .max()
        .unwrap_or_default();

    out.push_str(&format!(
        "{:<width$}  {:>8}  {:>12}  {:>12}\n",
        "Portfolio",
        "Sharpe",
        "Max Drawdown",
        "Total Return",
        width = width
    ));
    for r in &report.results {
        out.push_str(&format!(
            "{:<width$}  {:>8}  {:>12}  {:>12}\n",
            r.name,
            fmt_ratio(r.metrics.sharpe_ratio),
            fmt_pct(r.metrics.max_drawdown),
            fmt_pct(r.metrics.total_return),
            width = width
        ));
    }
    out
}

fn resolve(adapter: &dyn ConfigPort) -> Result<(AnalysisConfig, Box<dyn PricePort>), ExitCode> {
    validate_analysis_config(adapter)
        .and_then(|(config, source)| Ok((config, build_price_port(&source)?)))
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })
}

fn run_analyze(config_path: Option<&PathBuf>, output: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (config, price_port) = match resolve(&adapter) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let report = match run_analysis(price_port.as_ref(), &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print!("{}", format_summary(&report));

    let output_dir = resolve_output_dir(output, &adapter);
    let charts = SvgChartAdapter::new(output_dir.clone());
    if let Err(e) = render_charts(&charts, &report) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    info!(directory = %output_dir.display(), "charts written");

    ExitCode::SUCCESS
}

fn run_fetch(output: &PathBuf, config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (config, price_port) = match resolve(&adapter) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let table = match price_port.fetch_closes(&config.tickers, config.start_date, config.end_date)
    {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = write_price_table(output, &table) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    info!(path = %output.display(), rows = table.len(), "price table written");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (config, source) = match validate_analysis_config(&adapter) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let source = match source {
        PriceSource::Yahoo => "yahoo".to_string(),
        PriceSource::Csv(path) => format!("csv ({})", path.display()),
    };

    println!("Tickers:        {}", config.tickers.join(", "));
    println!(
        "Period:         {} to {} (end exclusive)",
        config.start_date, config.end_date
    );
    println!("Risk-free rate: {}", config.risk_free_rate);
    println!("Provider:       {}", source);
    println!("Portfolios:");
    for p in &config.portfolios {
        let weights: Vec<String> = config
            .tickers
            .iter()
            .filter_map(|t| p.weight(t).filter(|w| *w != 0.0).map(|w| format!("{} {:.4}", t, w)))
            .collect();
        println!("  {}: {}", p.name, weights.join(", "));
    }
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{PortfolioResult, evaluate_portfolios};
    use crate::domain::portfolio::Portfolio;
    use crate::domain::table::AssetTable;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn cli_parses_analyze_without_flags() {
        let cli = Cli::try_parse_from(["cryptofolio", "analyze"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Analyze {
                config: None,
                output: None
            }
        ));
    }

    #[test]
    fn cli_fetch_requires_output() {
        assert!(Cli::try_parse_from(["cryptofolio", "fetch"]).is_err());
        let cli = Cli::try_parse_from(["cryptofolio", "fetch", "-o", "prices.csv"]).unwrap();
        match cli.command {
            Command::Fetch { output, config } => {
                assert_eq!(output, PathBuf::from("prices.csv"));
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let (config, source) = validate_analysis_config(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(source, PriceSource::Yahoo);
    }

    #[test]
    fn output_dir_precedence() {
        let adapter = FileConfigAdapter::from_string("[output]\ndirectory = out\n").unwrap();
        let flag = PathBuf::from("flag");
        assert_eq!(resolve_output_dir(Some(&flag), &adapter), flag);
        assert_eq!(resolve_output_dir(None, &adapter), PathBuf::from("out"));
        assert_eq!(
            resolve_output_dir(None, &FileConfigAdapter::empty()),
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        );
    }

    #[test]
    fn csv_source_builds_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date,A\n2024-01-02,10\n2024-01-03,11\n").unwrap();

        let port = build_price_port(&PriceSource::Csv(path)).unwrap();
        let table = port
            .fetch_closes(&["A".to_string()], d("2024-01-01"), d("2024-02-01"))
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn summary_lists_each_portfolio() {
        let mut returns = AssetTable::new(vec!["A".into()]);
        returns.push_row(d("2024-01-02"), vec![0.5]).unwrap();
        returns.push_row(d("2024-01-03"), vec![0.5]).unwrap();
        let portfolios = vec![Portfolio::from_aligned("Only A", &["A".to_string()], &[1.0]).unwrap()];
        let results: Vec<PortfolioResult> = evaluate_portfolios(&returns, &portfolios, 0.0).unwrap();
        let report = AnalysisReport {
            price_rows: 3,
            returns,
            results,
        };

        let summary = format_summary(&report);
        assert!(summary.starts_with("Returns 2024-01-02 to 2024-01-03 (3 price rows, 2 return rows)"));
        let row = summary.lines().find(|l| l.starts_with("Only A")).unwrap();
        // Constant returns: zero deviation, so Sharpe is not finite.
        assert!(row.contains("n/a"));
        assert!(row.contains("125.00%"));
        assert!(row.contains("0.00%"));
    }
}
