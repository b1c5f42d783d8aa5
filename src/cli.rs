//! CLI definition and dispatch.
//!
//! One subcommand per desk workflow: `init` bootstraps the schema, `trade`
//! and `mark` write, `overview`, `trade-log` and `chart` read. Status goes
//! to stderr, data to stdout.

use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_export::write_trade_log;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart::format_pnl_chart;
use crate::adapters::text_report::{format_pivot, format_trade_log};
use crate::domain::booking::{book_trade, mark_to_market};
use crate::domain::error::PnldeskError;
use crate::domain::market::{Category, Operation, Product, Shipment};
use crate::domain::pivot::{latest_mtm_pivot, latest_position_pivot, monthly_pnl_pivot};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;

#[derive(Parser, Debug)]
#[command(name = "pnldesk", about = "Commodity trade / position / MTM tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the ledger tables
    Init {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Book a trade across the selected categories and shipments
    Trade {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        product: Product,
        #[arg(long)]
        operation: Operation,
        /// Trade year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        tons: i64,
        /// Entry level in percent
        #[arg(long)]
        level: f64,
        /// Categories to book against (defaults to all)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<Category>,
        /// Shipment codes to book against (defaults to all)
        #[arg(long, value_delimiter = ',')]
        shipments: Vec<Shipment>,
    },
    /// Mark historical trades to a new MTM level
    Mark {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        product: Product,
        #[arg(long)]
        year: Option<i32>,
        /// New MTM level in percent
        #[arg(long)]
        mtm: f64,
        #[arg(long, value_delimiter = ',')]
        categories: Vec<Category>,
        #[arg(long, value_delimiter = ',')]
        shipments: Vec<Shipment>,
    },
    /// Show MTM / monthly PnL / position tables
    Overview {
        #[arg(short, long)]
        config: PathBuf,
        /// Restrict to one product (defaults to all three)
        #[arg(long)]
        product: Option<Product>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Dump the trade log (text, or CSV with --output)
    TradeLog {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the PnL time-series chart as an SVG file
    Chart {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        product: Product,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Init { config } => run_init(&config),
        Command::Trade {
            config,
            product,
            operation,
            year,
            tons,
            level,
            categories,
            shipments,
        } => run_trade(
            &config, product, operation, year, tons, level, categories, shipments,
        ),
        Command::Mark {
            config,
            product,
            year,
            mtm,
            categories,
            shipments,
        } => run_mark(&config, product, year, mtm, categories, shipments),
        Command::Overview {
            config,
            product,
            year,
        } => run_overview(&config, product, year),
        Command::TradeLog { config, output } => run_trade_log(&config, output.as_ref()),
        Command::Chart {
            config,
            product,
            output,
        } => run_chart(&config, product, output.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PnldeskError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Pick the storage backend from the config: a `[sqlite] path` wins, then
/// the Postgres connection string.
pub fn open_ledger(config: &FileConfigAdapter) -> Result<Box<dyn LedgerPort>, PnldeskError> {
    #[cfg(feature = "sqlite")]
    if config.get_string("sqlite", "path").is_some() {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        return Ok(Box::new(SqliteAdapter::from_config(config)?));
    }

    #[cfg(feature = "postgres")]
    if config.get_string("postgres", "connection_string").is_some()
        || config.get_string("database", "conninfo").is_some()
    {
        use crate::adapters::postgres_adapter::PostgresAdapter;
        return Ok(Box::new(PostgresAdapter::from_config(config)?));
    }

    let _ = config;
    Err(PnldeskError::ConfigMissing {
        section: "sqlite".into(),
        key: "path".into(),
    })
}

fn default_year(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| Utc::now().year())
}

fn resolve_categories(categories: Vec<Category>) -> Vec<Category> {
    if categories.is_empty() {
        Category::ALL.to_vec()
    } else {
        categories
    }
}

fn resolve_shipments(shipments: Vec<Shipment>) -> Vec<Shipment> {
    if shipments.is_empty() {
        Shipment::ALL.to_vec()
    } else {
        shipments
    }
}

fn connect(config_path: &PathBuf) -> Result<Box<dyn LedgerPort>, ExitCode> {
    let config = load_config(config_path)?;
    open_ledger(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_init(config_path: &PathBuf) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    match ledger.create_schema() {
        Ok(()) => {
            eprintln!("Ledger schema ready");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_trade(
    config_path: &PathBuf,
    product: Product,
    operation: Operation,
    year: Option<i32>,
    tons: i64,
    level: f64,
    categories: Vec<Category>,
    shipments: Vec<Shipment>,
) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let year = default_year(year);
    let categories = resolve_categories(categories);
    let shipments = resolve_shipments(shipments);

    match book_trade(
        ledger.as_ref(),
        product,
        operation,
        year,
        tons,
        level,
        &categories,
        &shipments,
    ) {
        Ok(inserted) => {
            eprintln!("Inserted {inserted} trade(s) and updated positions");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_mark(
    config_path: &PathBuf,
    product: Product,
    year: Option<i32>,
    mtm: f64,
    categories: Vec<Category>,
    shipments: Vec<Shipment>,
) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let year = default_year(year);
    let categories = resolve_categories(categories);
    let shipments = resolve_shipments(shipments);

    match mark_to_market(ledger.as_ref(), product, year, mtm, &categories, &shipments) {
        Ok(summary) => {
            for id in &summary.skipped {
                eprintln!("warning: skipping trade {id} (unrecognized operation)");
            }
            eprintln!("Marked {} trade(s)", summary.marked);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_overview(config_path: &PathBuf, product: Option<Product>, year: Option<i32>) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let year = default_year(year);
    let products: Vec<Product> = match product {
        Some(p) => vec![p],
        None => Product::ALL.to_vec(),
    };

    for product in products {
        let mtm_rows = match ledger.load_mtm_rows(product, year) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        let pnl_rows = match ledger.load_pnl_rows(product, year) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        let pos_rows = match ledger.load_position_rows(product, year) {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        println!("=== {product} ({year}) ===\n");
        println!("{}", format_pivot("MTM", &latest_mtm_pivot(&mtm_rows)));
        println!("{}", format_pivot("PNL", &monthly_pnl_pivot(&pnl_rows)));
        println!("{}", format_pivot("POS", &latest_position_pivot(&pos_rows)));
    }

    ExitCode::SUCCESS
}

fn run_trade_log(config_path: &PathBuf, output: Option<&PathBuf>) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let trades = match ledger.load_trades() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match output {
        Some(path) => {
            let file = match fs::File::create(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("error: failed to create {}: {e}", path.display());
                    return ExitCode::from(1);
                }
            };
            if let Err(e) = write_trade_log(file, &trades) {
                eprintln!("error: {e}");
                return (&e).into();
            }
            eprintln!("Trade log written to: {}", path.display());
        }
        None => print!("{}", format_trade_log(&trades)),
    }

    ExitCode::SUCCESS
}

fn run_chart(config_path: &PathBuf, product: Product, output: Option<&PathBuf>) -> ExitCode {
    let ledger = match connect(config_path) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let points = match ledger.load_pnl_series(product) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if points.is_empty() {
        eprintln!("No PnL timeseries available for {product}");
        return ExitCode::SUCCESS;
    }

    let svg = format_pnl_chart(&points);
    let output = output
        .cloned()
        .unwrap_or_else(|| PathBuf::from("pnl_chart.svg"));

    match fs::write(&output, &svg) {
        Ok(()) => {
            eprintln!("Chart written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write chart: {e}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selections_default_to_all() {
        assert_eq!(resolve_categories(vec![]), Category::ALL.to_vec());
        assert_eq!(resolve_shipments(vec![]), Shipment::ALL.to_vec());
    }

    #[test]
    fn explicit_selections_are_kept() {
        let cats = resolve_categories(vec![Category::FobPaper]);
        assert_eq!(cats, vec![Category::FobPaper]);
        let ships = resolve_shipments(vec![Shipment::Cnf, Shipment::Vsl]);
        assert_eq!(ships, vec![Shipment::Cnf, Shipment::Vsl]);
    }

    #[test]
    fn year_defaults_to_current() {
        assert_eq!(default_year(Some(2024)), 2024);
        assert_eq!(default_year(None), Utc::now().year());
    }

    #[test]
    fn cli_parses_trade_command() {
        let cli = Cli::try_parse_from([
            "pnldesk",
            "trade",
            "--config",
            "desk.ini",
            "--product",
            "SoyBean",
            "--operation",
            "Purchase",
            "--tons",
            "100",
            "--level",
            "36",
            "--categories",
            "FOB Vessel,FOB Paper",
            "--shipments",
            "VSL",
        ])
        .unwrap();

        match cli.command {
            Command::Trade {
                product,
                operation,
                tons,
                level,
                categories,
                shipments,
                ..
            } => {
                assert_eq!(product, Product::SoyBean);
                assert_eq!(operation, Operation::Purchase);
                assert_eq!(tons, 100);
                assert_eq!(level, 36.0);
                assert_eq!(categories, vec![Category::FobVessel, Category::FobPaper]);
                assert_eq!(shipments, vec![Shipment::Vsl]);
            }
            other => panic!("expected Trade, got {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_product() {
        let result = Cli::try_parse_from([
            "pnldesk",
            "chart",
            "--config",
            "desk.ini",
            "--product",
            "Wheat",
        ]);
        assert!(result.is_err());
    }
}
