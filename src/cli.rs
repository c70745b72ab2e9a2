//! CLI definition and dispatch.
//!
//! Diagnostics and progress go to stderr, results to stdout, so output can be
//! piped or redirected cleanly.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{run_backtest, TradeRules};
use crate::domain::config_validation::{build_analyze_config, build_backtest_config};
use crate::domain::error::SigtraderError;
use crate::domain::frame::{analyze, AnalyzeConfig, IndicatorFrame};
use crate::domain::pairs::{find_cointegrated_pairs, pair_spread, DEFAULT_SPREAD_WINDOW};
use crate::domain::relative_strength::benchmark_symbol;
use crate::domain::screener::{parse_ticker_list, screen};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Technical signal scoring and backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a single ticker and print its latest signal
    Analyze {
        #[arg(long)]
        ticker: String,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        lookback: usize,
    },
    /// Replay a strategy over a ticker's history
    Backtest {
        #[arg(long)]
        ticker: String,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy variant: score or mean-reversion
        #[arg(short, long, default_value = "score")]
        strategy: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        lookback: usize,
    },
    /// Score a list of tickers (all CSV files in the data dir by default)
    Screen {
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        lookback: usize,
    },
    /// Scan a ticker universe for cointegrated pairs
    Pairs {
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = 0)]
        lookback: usize,
    },
    /// Z-score of a pair's price-ratio spread
    Spread {
        #[arg(long)]
        ticker_a: String,
        #[arg(long)]
        ticker_b: String,
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SPREAD_WINDOW)]
        window: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            ticker,
            data_dir,
            config,
            lookback,
        } => run_analyze(&ticker, &data_dir, config.as_ref(), lookback),
        Command::Backtest {
            ticker,
            data_dir,
            config,
            strategy,
            output,
            lookback,
        } => run_backtest_command(
            &ticker,
            &data_dir,
            config.as_ref(),
            &strategy,
            output.as_ref(),
            lookback,
        ),
        Command::Screen {
            tickers,
            data_dir,
            config,
            output,
            lookback,
        } => run_screen(
            tickers.as_deref(),
            &data_dir,
            config.as_ref(),
            output.as_ref(),
            lookback,
        ),
        Command::Pairs {
            tickers,
            data_dir,
            lookback,
        } => run_pairs(tickers.as_deref(), &data_dir, lookback),
        Command::Spread {
            ticker_a,
            ticker_b,
            data_dir,
            window,
        } => run_spread(&ticker_a, &ticker_b, &data_dir, window),
    }
}

/// Load the INI config, or an empty one so defaults apply when no file is
/// given.
fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| {
            let err = SigtraderError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }),
        None => FileConfigAdapter::from_string("").map_err(|reason| {
            let err = SigtraderError::ConfigParse {
                file: "<defaults>".to_string(),
                reason,
            };
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }),
    }
}

/// Resolve the strategy name from the command line into a predicate pair.
pub fn resolve_rules(name: &str) -> Result<TradeRules, SigtraderError> {
    match name {
        "score" | "signal-score" => Ok(TradeRules::score_driven()),
        "mean-reversion" => Ok(TradeRules::mean_reversion()),
        other => Err(SigtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "strategy".to_string(),
            reason: format!("unknown strategy '{other}', expected score or mean-reversion"),
        }),
    }
}

fn build_frame(
    provider: &dyn DataPort,
    ticker: &str,
    lookback: usize,
    config: &AnalyzeConfig,
) -> Result<IndicatorFrame, SigtraderError> {
    eprintln!("Loading bars for {ticker}...");
    let bars = provider.fetch_daily_bars(ticker, lookback)?;
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            ticker: ticker.to_string(),
        });
    }
    eprintln!("  {} bars", bars.len());

    let benchmark_closes: Option<Vec<f64>> = if config.score.use_relative_strength {
        let index = benchmark_symbol(ticker);
        match provider.fetch_benchmark_bars(index, lookback) {
            Ok(bench) if !bench.is_empty() => Some(bench.iter().map(|b| b.close).collect()),
            _ => {
                eprintln!("warning: benchmark {index} unavailable, relative strength skipped");
                None
            }
        }
    } else {
        None
    };

    analyze(ticker, bars, benchmark_closes.as_deref(), config)
}

fn run_analyze(
    ticker: &str,
    data_dir: &PathBuf,
    config_path: Option<&PathBuf>,
    lookback: usize,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_analyze_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let provider = CsvAdapter::new(data_dir.clone());
    let frame = match build_frame(&provider, ticker, lookback, &config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let last = frame.len() - 1;
    let bar = &frame.bars[last];
    println!("{} @ {} ({})", frame.ticker, bar.close, bar.date);

    match frame.latest_signal() {
        Some((score, recommendation)) => {
            println!(
                "Signal score: {}/{} -> {}",
                score,
                config.score.rule_count(),
                recommendation
            );
        }
        None => {
            let err = SigtraderError::InsufficientData {
                ticker: ticker.to_string(),
                bars: frame.len(),
                minimum: config.score.min_bars(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    }

    if let Some(short) = frame.sma_short[last] {
        println!("SMA({}): {:.2}", config.score.short_window, short);
    }
    if let Some(long) = frame.sma_long[last] {
        println!("SMA({}): {:.2}", config.score.long_window, long);
    }
    if let Some(rsi) = frame.rsi[last] {
        println!("RSI({}): {:.1}", config.score.rsi_period, rsi);
    }
    if let Some(histogram) = frame.macd_histogram[last] {
        println!("MACD histogram: {:.3}", histogram);
    }
    if let Some(atr) = frame.atr[last] {
        println!("ATR({}): {:.2}", config.score.atr_period, atr);
    }
    if let Some(rs) = frame.relative_strength[last] {
        println!("Relative strength (20d): {:+.2}%", rs * 100.0);
    }
    match frame.latest_risk() {
        Some(levels) => println!(
            "Stop loss: {:.2}  Take profit: {:.2}",
            levels.stop_loss, levels.take_profit
        ),
        None => println!("Risk levels: unavailable (ATR missing)"),
    }

    ExitCode::SUCCESS
}

fn run_backtest_command(
    ticker: &str,
    data_dir: &PathBuf,
    config_path: Option<&PathBuf>,
    strategy: &str,
    output: Option<&PathBuf>,
    lookback: usize,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let analyze_config = match build_analyze_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let backtest_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let rules = match resolve_rules(strategy) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let provider = CsvAdapter::new(data_dir.clone());
    let frame = match build_frame(&provider, ticker, lookback, &analyze_config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Running {} backtest over {} bars...", rules.name, frame.len());
    let result = match run_backtest(&frame, &rules, &backtest_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print!("{}", TextReportAdapter::format_backtest(&result));

    if let Some(path) = output {
        if let Err(e) = TextReportAdapter.write_backtest(&result, &path.display().to_string()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("Report written to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_screen(
    tickers: Option<&str>,
    data_dir: &PathBuf,
    config_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
    lookback: usize,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_analyze_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let provider = CsvAdapter::new(data_dir.clone());
    let ticker_list = match resolve_tickers(tickers, &provider) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Screening {} tickers...", ticker_list.len());
    let report = screen(&provider, &ticker_list, lookback, &config);
    print!("{}", TextReportAdapter::format_screen(&report));

    if let Some(path) = output {
        if let Err(e) = TextReportAdapter.write_screen(&report, &path.display().to_string()) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("Report written to {}", path.display());
    }

    if report.results.is_empty() && !report.failures.is_empty() {
        return ExitCode::from(5);
    }
    ExitCode::SUCCESS
}

fn run_pairs(tickers: Option<&str>, data_dir: &PathBuf, lookback: usize) -> ExitCode {
    let provider = CsvAdapter::new(data_dir.clone());
    let ticker_list = match resolve_tickers(tickers, &provider) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut series = Vec::with_capacity(ticker_list.len());
    for ticker in &ticker_list {
        match provider.fetch_daily_bars(ticker, lookback) {
            Ok(bars) if !bars.is_empty() => series.push((ticker.clone(), bars)),
            Ok(_) => eprintln!("warning: skipping {ticker} (no data)"),
            Err(e) => eprintln!("warning: skipping {ticker} ({e})"),
        }
    }

    eprintln!(
        "Scanning {} tickers ({} pairs)...",
        series.len(),
        series.len() * series.len().saturating_sub(1) / 2
    );
    let scan = find_cointegrated_pairs(&series);

    if scan.pairs.is_empty() {
        println!("No cointegrated pairs found.");
    } else {
        println!("Pair                 P-Value");
        println!("{}", "-".repeat(30));
        for pair in &scan.pairs {
            println!(
                "{:<20} {:.4}",
                format!("{}-{}", pair.ticker_a, pair.ticker_b),
                pair.p_value
            );
        }
    }
    for skipped in &scan.skipped {
        eprintln!(
            "skipped {}-{}: {:?}",
            skipped.ticker_a, skipped.ticker_b, skipped.reason
        );
    }

    ExitCode::SUCCESS
}

fn run_spread(ticker_a: &str, ticker_b: &str, data_dir: &PathBuf, window: usize) -> ExitCode {
    let provider = CsvAdapter::new(data_dir.clone());

    let bars_a = match provider.fetch_daily_bars(ticker_a, 0) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bars_b = match provider.fetch_daily_bars(ticker_b, 0) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let spread = pair_spread(&bars_a, &bars_b, window);
    if spread.ratio.is_empty() {
        let err = SigtraderError::NoData {
            ticker: format!("{ticker_a}/{ticker_b}"),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    println!(
        "{}/{}: {} shared sessions",
        ticker_a,
        ticker_b,
        spread.ratio.len()
    );
    let last = spread.ratio.len() - 1;
    println!(
        "Latest ratio: {:.4} ({})",
        spread.ratio[last], spread.dates[last]
    );
    match spread.latest_z() {
        Some(z) => {
            println!("Latest Z-score: {:+.2}", z);
            if z > 2.0 {
                println!("Spread stretched high (short-the-spread territory)");
            } else if z < -2.0 {
                println!("Spread stretched low (long-the-spread territory)");
            }
        }
        None => println!("Z-score: unavailable (inside warm-up window)"),
    }

    ExitCode::SUCCESS
}

fn resolve_tickers(
    tickers: Option<&str>,
    provider: &CsvAdapter,
) -> Result<Vec<String>, SigtraderError> {
    match tickers {
        Some(list) => parse_ticker_list(list),
        None => provider.list_tickers(),
    }
}
