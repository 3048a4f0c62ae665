//! LRA main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use lra_api::start_server;
use lra_config::{Config, ConfigError};
use lra_core::{
    render, render_ledger_table, render_table, AccountClass, AccountQuery, LedgerFilter, LraEngine, ReportPeriod,
    ReportRequest, UnitField,
};
use lra_parser::FileTableSource;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "lra")]
#[command(version = "0.1.0")]
#[command(about = "Budget realization report (LRA) builder for general ledgers", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the report and print it
    Report {
        /// Chart of accounts table (overrides the configured file)
        #[arg(long)]
        chart: Option<PathBuf>,
        /// General ledger table (overrides the configured file)
        #[arg(long)]
        ledger: Option<PathBuf>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        from_month: Option<u32>,
        #[arg(long)]
        to_month: Option<u32>,
        /// Organizational unit to include (repeatable)
        #[arg(long = "unit")]
        units: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List chart accounts at a level below a code or within a report class
    Accounts {
        #[arg(long)]
        code: Option<String>,
        /// Report class by root code or name (e.g. 4, revenue)
        #[arg(long)]
        class: Option<AccountClass>,
        #[arg(long)]
        level: u32,
        /// Chart of accounts table (overrides the configured file)
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// List ledger postings by account, unit and period with the closing saldo
    Ledger {
        /// Account level to list at
        #[arg(long)]
        level: Option<u32>,
        /// Account code at --level (repeatable)
        #[arg(long = "account")]
        accounts: Vec<String>,
        /// Unit column to filter on: unit or sub_unit
        #[arg(long, default_value_t = UnitField::Unit)]
        unit_field: UnitField,
        /// Unit (or sub-unit) to include (repeatable)
        #[arg(long = "unit")]
        units: Vec<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        from_month: Option<u32>,
        #[arg(long)]
        to_month: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
        /// Chart of accounts table (overrides the configured file)
        #[arg(long)]
        chart: Option<PathBuf>,
        /// General ledger table (overrides the configured file)
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP API server
    Serve,
    /// Print a default configuration file
    InitConfig,
}

fn load_config(path: &PathBuf) -> (Config, Option<String>) {
    match Config::load(path.clone()) {
        Ok(config) => (config, None),
        Err(ConfigError::FileNotFound { path }) => (
            Config::default(),
            Some(format!("Config file {} not found, using defaults", path)),
        ),
        Err(e) => (Config::default(), Some(format!("{}", e.to_details()))),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, problem) = load_config(&args.config);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    if let Some(problem) = problem {
        if args.config.exists() {
            anyhow::bail!("Failed to load configuration: {}", problem);
        }
        log::warn!("{}", problem);
    }

    log::info!(
        "Config loaded: data path={}, chart={}, ledger={}",
        config.data.path.display(),
        config.data.chart_file,
        config.data.ledger_file
    );

    let rt = Runtime::new()?;
    rt.block_on(run(args.command, config))
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    match command {
        Command::Report {
            chart,
            ledger,
            year,
            from_month,
            to_month,
            units,
            json,
        } => {
            let source = FileTableSource::new(
                chart.unwrap_or_else(|| config.chart_path()),
                ledger.unwrap_or_else(|| config.ledger_path()),
            );
            let engine = LraEngine::new(config.report.clone(), Arc::new(source));
            let request = ReportRequest {
                period: ReportPeriod::from_parts(year, from_month, to_month)?,
                units,
            };
            let report = engine
                .report(&request)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("LAPORAN REALISASI ANGGARAN - {}", report.period_description);
                if !report.units.is_empty() {
                    println!("Unit: {}", report.units.join(", "));
                }
                println!();
                print!("{}", render_table(&render(&report, &config.currency)));
                println!(
                    "{}: {}",
                    report.totals.residual_label,
                    report.totals.residual_label.description()
                );
                println!();
                println!("{}", report.diagnostics.summary());
                for issue in report.diagnostics.issues() {
                    eprintln!("{}", issue);
                }
            }
        }
        Command::Accounts {
            code,
            class,
            level,
            chart,
        } => {
            let chart_path = chart.unwrap_or_else(|| config.chart_path());
            let source = FileTableSource::new(chart_path, config.ledger_path());
            let engine = LraEngine::new(config.report.clone(), Arc::new(source));
            let response = engine
                .accounts(&AccountQuery { class, code, level })
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;
            for account in &response.accounts {
                println!("{}\t{}", account.code, account.name);
            }
            log::info!(
                "{} accounts at level {} below {}",
                response.total_count,
                level,
                response.parent
            );
        }
        Command::Ledger {
            level,
            accounts,
            unit_field,
            units,
            year,
            from_month,
            to_month,
            offset,
            limit,
            chart,
            ledger,
            json,
        } => {
            let source = FileTableSource::new(
                chart.unwrap_or_else(|| config.chart_path()),
                ledger.unwrap_or_else(|| config.ledger_path()),
            );
            let engine = LraEngine::new(config.report.clone(), Arc::new(source));
            let filter = LedgerFilter {
                level,
                accounts,
                unit_field,
                units,
                period: ReportPeriod::from_parts(year, from_month, to_month)?,
                offset,
                limit,
            };
            let view = engine
                .ledger(&filter)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("BUKU BESAR - {}", view.period_description);
                if !view.filter.units.is_empty() {
                    println!("{}: {}", view.filter.unit_field, view.filter.units.join(", "));
                }
                println!();
                print!("{}", render_ledger_table(&view, &config.currency));
                println!();
                println!(
                    "{} of {} postings shown, {} with non-numeric amounts",
                    view.lines.len(),
                    view.total_count,
                    view.non_numeric_rows
                );
            }
        }
        Command::Serve => {
            let source = FileTableSource::new(config.chart_path(), config.ledger_path());
            let engine = Arc::new(LraEngine::new(config.report.clone(), Arc::new(source)));
            start_server(config, engine)
                .await
                .context("HTTP server failed")?;
        }
        Command::InitConfig => print!("{}", Config::generate_default()),
    }
    Ok(())
}
