//! CLI entry point for the Order Analytics tool.
//!
//! Loads the restaurant tables, runs every aggregation and prints the report.
//! Subcommands narrow the output to a single section or export the combined
//! order lines.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use order_analytics::config::DataFiles;
use order_analytics::dataset::Dataset;
use order_analytics::output::{
    Chart, print_json, print_pretty, render_chart, render_customers, render_overall,
    render_payments, render_text, write_lines_csv,
};
use order_analytics::report::Report;
use serde_json::{Map, Value, to_value};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "order_analytics")]
#[command(about = "Sales, customer and feedback analytics for a restaurant", long_about = None)]
struct Cli {
    /// Directory holding categories.csv, menu.csv, order_data.csv and feedback_data.csv
    #[arg(short, long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Number of entries in each ranking
    #[arg(short, long, global = true, default_value_t = 5)]
    top: usize,

    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// GMV, order counts and the best-selling categories and items
    Overall,
    /// Breakdown of payment methods
    Payments,
    /// Repeat customers, favourites and feedback highlights
    Customers,
    /// Text charts (all of them when no flag is given)
    Charts(ChartArgs),
    /// Write the combined restaurant orders view to a CSV file
    Export {
        /// Destination file
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Gzip compress the CSV
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ChartArgs {
    /// Customer ordering times by hour
    #[arg(long)]
    hours: bool,

    /// Monthly sales volume
    #[arg(long)]
    monthly: bool,

    /// Ordering behaviour by category
    #[arg(long)]
    categories: bool,
}

impl ChartArgs {
    fn selected(&self) -> Vec<Chart> {
        let picked: Vec<Chart> = [
            (self.hours, Chart::OrderingTimes),
            (self.monthly, Chart::MonthlySales),
            (self.categories, Chart::Categories),
        ]
        .into_iter()
        .filter_map(|(on, chart)| on.then_some(chart))
        .collect();

        if picked.is_empty() {
            vec![Chart::OrderingTimes, Chart::MonthlySales, Chart::Categories]
        } else {
            picked
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/order_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("order_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    // Reports go to stdout, so stderr stays quiet unless RUST_LOG asks otherwise.
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    run(cli)
}

/// What to print after the report is built.
enum Section {
    All,
    Overall,
    Payments,
    Customers,
    Charts(Vec<Chart>),
}

#[tracing::instrument(skip_all, fields(data_dir = ?cli.data_dir, top = cli.top, json = cli.json))]
fn run(cli: Cli) -> Result<()> {
    let files = DataFiles::resolve(cli.data_dir.as_deref());
    let dataset = Dataset::load(&files).context("Failed to load restaurant data")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let section = match cli.command {
        Some(Commands::Export { path, gzip }) => return export(&mut out, &dataset, &path, gzip),
        None => Section::All,
        Some(Commands::Overall) => Section::Overall,
        Some(Commands::Payments) => Section::Payments,
        Some(Commands::Customers) => Section::Customers,
        Some(Commands::Charts(args)) => Section::Charts(args.selected()),
    };

    let report = Report::build(&dataset, cli.top);
    print_pretty(&report);
    render(&mut out, &report, &section, cli.json)?;

    info!("Done");
    Ok(())
}

fn export(out: &mut impl Write, dataset: &Dataset, path: &Path, gzip: bool) -> Result<()> {
    let joined = dataset.catalog().join(&dataset.orders);
    write_lines_csv(path, &joined.lines, gzip)
        .with_context(|| format!("Failed to export to {}", path.display()))?;
    writeln!(out, "Wrote {} order lines to {}", joined.lines.len(), path.display())?;
    Ok(())
}

fn render(out: &mut impl Write, report: &Report, section: &Section, as_json: bool) -> Result<()> {
    if as_json {
        let value = match section {
            Section::All => {
                print_json(out, report)?;
                return Ok(());
            }
            Section::Overall => object([
                ("overall", to_value(&report.overall)?),
                ("top_categories", to_value(&report.top_categories)?),
                ("top_items", to_value(&report.top_items)?),
            ]),
            Section::Payments => to_value(&report.payments)?,
            Section::Customers => object([
                ("customers", to_value(&report.customers)?),
                ("highlights", to_value(&report.highlights)?),
                ("top_rated_items", to_value(&report.top_rated_items)?),
            ]),
            Section::Charts(charts) => {
                let mut map = Map::new();
                for chart in charts {
                    let (key, value) = match chart {
                        Chart::OrderingTimes => ("hourly_orders", to_value(report.hourly_orders)?),
                        Chart::MonthlySales => ("monthly_sales", to_value(&report.monthly_sales)?),
                        Chart::Categories => ("categories", to_value(&report.categories)?),
                    };
                    map.insert(key.to_string(), value);
                }
                Value::Object(map)
            }
        };
        print_json(out, &value)?;
        return Ok(());
    }

    match section {
        Section::All => render_text(out, report)?,
        Section::Overall => render_overall(out, report)?,
        Section::Payments => render_payments(out, report)?,
        Section::Customers => render_customers(out, report)?,
        Section::Charts(charts) => {
            for chart in charts {
                render_chart(out, report, *chart)?;
            }
        }
    }
    Ok(())
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}
