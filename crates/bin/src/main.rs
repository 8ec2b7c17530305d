//! Screener CLI binary.
//!
//! Provides a command-line interface for screening the equity universe.

mod integration;

use chrono::Duration;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager::{open_cache, print_cache_info};
use integration::fetcher::SourceFetcher;
use integration::logging::init_logging;
use screener::data::config::{
    DEFAULT_CATALOG_URL, DEFAULT_RESULTS_BASE_URL, DEFAULT_UNIVERSE_URL,
};
use screener::data::{
    ALL_SECTORS, CatalogOrigin, Diagnostic, FetchConfig, FilterSelection, SourceConfig, StyleTag,
    TaxFilter,
};
use screener::output::{
    DEFAULT_TOP_N, Distribution, ScreenReport, ScreenStats, active_filters, security_frame,
};
use screener::{FilteredView, Session, SessionConfig};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Screener: filter listed equities by setup, market, PEA, style and sector", long_about = None)]
#[command(version)]
struct Cli {
    /// Read every resource from this directory instead of the network
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Setup catalog location
    #[arg(long, global = true, default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Universe table location
    #[arg(long, global = true, default_value = DEFAULT_UNIVERSE_URL)]
    universe_url: String,

    /// Base location of setup result files
    #[arg(long, global = true, default_value = DEFAULT_RESULTS_BASE_URL)]
    results_url: String,

    /// Disable caching (always fetch fresh data)
    #[arg(long, global = true)]
    no_cache: bool,

    /// Force refresh cached data
    #[arg(long, global = true)]
    refresh: bool,

    /// Maximum age of cached responses, in minutes
    #[arg(long, global = true, default_value = "60")]
    max_age: i64,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct SelectionArgs {
    /// Setup display name (repeatable; securities matching any setup pass)
    #[arg(long = "setup")]
    setups: Vec<String>,

    /// Market (repeatable)
    #[arg(long = "market")]
    markets: Vec<String>,

    /// PEA filter: any, eligible, ineligible or pme
    #[arg(long, default_value = "any")]
    pea: TaxFilter,

    /// Investment style column, e.g. grow or mom (repeatable; any one suffices)
    #[arg(long = "style")]
    styles: Vec<StyleTag>,

    /// Sector, or "Tous" for every sector
    #[arg(long, default_value = ALL_SECTORS)]
    sector: String,
}

impl SelectionArgs {
    fn selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::new()
            .with_tax(self.pea)
            .with_sector(&self.sector);
        for setup in &self.setups {
            selection = selection.with_setup(setup.as_str());
        }
        for market in &self.markets {
            selection = selection.with_market(market.as_str());
        }
        for &style in &self.styles {
            selection = selection.with_style(style);
        }
        selection
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply filters and list the passing securities
    Screen {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the setup catalog
    Setups,

    /// List the markets in the universe
    Markets,

    /// List the sectors in the universe
    Sectors,

    /// Distributions, style counts and style correlation for a selection
    Stats {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Number of sectors shown
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Show or clear the response cache
    Cache {
        /// Remove every cached response
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format == LogFormat::Json);

    if let Commands::Cache { clear } = cli.command {
        return manage_cache(clear);
    }

    let fetch_config = FetchConfig {
        use_cache: !cli.no_cache,
        force_refresh: cli.refresh,
        max_age: cache_max_age(cli.max_age)?,
    };
    let config = SessionConfig::new(SourceConfig {
        catalog_url: cli.catalog_url,
        universe_url: cli.universe_url,
        results_base_url: cli.results_url,
    });
    let fetcher = SourceFetcher::from_options(cli.data_dir, fetch_config)?;
    let session = open_session(fetcher, config).await?;

    match cli.command {
        Commands::Screen { selection, format } => {
            let selection = selection.selection();
            let view = screen_with_progress(&session, &selection).await?;
            match format {
                OutputFormat::Text => print_screen(&session, &view)?,
                OutputFormat::Json => print_screen_json(&session, &view)?,
            }
        }
        Commands::Setups => list_setups(&session),
        Commands::Markets => {
            for market in session.universe().markets() {
                println!("{market}");
            }
        }
        Commands::Sectors => {
            println!("{ALL_SECTORS}");
            for sector in session.universe().sectors() {
                println!("{sector}");
            }
        }
        Commands::Stats { selection, top } => {
            let selection = selection.selection();
            let view = screen_with_progress(&session, &selection).await?;
            print_stats(&session, &view, top);
        }
        Commands::Cache { .. } => {}
    }

    Ok(())
}

fn cache_max_age(minutes: i64) -> Result<Duration, Box<dyn std::error::Error>> {
    if minutes < 0 {
        return Err(format!("--max-age must not be negative, got {minutes}").into());
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| format!("--max-age {minutes} is out of range").into())
}

fn spinner(message: &'static str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

async fn open_session(
    fetcher: SourceFetcher,
    config: SessionConfig,
) -> Result<Session<SourceFetcher>, Box<dyn std::error::Error>> {
    let pb = spinner("Loading setup catalog and universe...")?;
    match Session::open(fetcher, config).await {
        Ok(session) => {
            pb.finish_and_clear();
            report_diagnostics(session.catalog().diagnostics());
            report_diagnostics(session.universe().diagnostics());
            Ok(session)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

async fn screen_with_progress<'a>(
    session: &'a Session<SourceFetcher>,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>, Box<dyn std::error::Error>> {
    let pb = spinner("Fetching setup results...")?;
    let view = session.screen(selection).await;
    pb.finish_and_clear();
    Ok(view)
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics.iter().filter(|d| d.is_warning()) {
        eprintln!("warning: {diagnostic}");
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\nSetups:");
    for diagnostic in diagnostics {
        let marker = if diagnostic.is_warning() { "!" } else { "+" };
        println!("  {marker} {diagnostic}");
    }
}

fn print_screen(
    session: &Session<SourceFetcher>,
    view: &FilteredView<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = ScreenStats::compute(session.universe(), view.rows());

    println!("{}", stats.summary);

    let filters = active_filters(view.selection());
    if !filters.is_empty() {
        println!("\nActive filters:");
        for line in filters {
            println!("  {line}");
        }
    }

    print_diagnostics(view.diagnostics());
    println!();

    if view.is_empty() {
        println!("No security matches the selected criteria.");
        return Ok(());
    }

    let df = security_frame(view.rows(), &[])?;
    let df = df.select(["Market", "Name", "Symbol", "PEA", "PEA-PME", "Sector"])?;
    println!("{df}");
    Ok(())
}

fn print_screen_json(
    session: &Session<SourceFetcher>,
    view: &FilteredView<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = ScreenReport::new(session.universe(), view.selection(), view.rows());
    let diagnostics: Vec<String> = view.diagnostics().iter().map(ToString::to_string).collect();

    let output = json!({
        "report": report,
        "diagnostics": diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn list_setups(session: &Session<SourceFetcher>) {
    let catalog = session.catalog();
    let origin = match catalog.origin() {
        CatalogOrigin::Remote => "remote",
        CatalogOrigin::Fallback => "built-in",
    };

    println!("Setups ({} from {origin} catalog)", catalog.len());
    println!("{}", "=".repeat(80));
    for setup in catalog.setups() {
        println!(
            "{:<32} {:<36} {}",
            setup.name,
            setup.source_file.as_deref().unwrap_or("-"),
            setup.description.as_deref().unwrap_or("")
        );
    }
}

fn print_stats(session: &Session<SourceFetcher>, view: &FilteredView<'_>, top: usize) {
    let universe = session.universe();
    let stats = ScreenStats::compute(universe, view.rows());

    println!("{}", stats.summary);
    print_diagnostics(view.diagnostics());

    if view.is_empty() {
        println!("\nNo security matches the selected criteria.");
        return;
    }

    println!();
    print!("{}", stats.markets.to_ascii_table("Markets"));
    println!();
    let sectors = Distribution::sectors(view.rows()).top(top);
    print!("{}", sectors.to_ascii_table(&format!("Top {top} sectors")));

    for (label, split) in [("PEA", stats.pea), ("PEA-PME", stats.pea_pme)] {
        if let Some(split) = split {
            println!(
                "\n{label}: {} eligible, {} not eligible",
                split.eligible, split.ineligible
            );
        }
    }

    if !stats.styles.is_empty() {
        println!("\nStyles");
        println!("{}", "-".repeat(40));
        for count in &stats.styles {
            println!("{:<30} {:>9}", count.style.column(), count.count);
        }
    }

    if let Some(correlation) = &stats.correlation {
        println!("\nStyle correlation");
        print!("{}", correlation.to_ascii_table());
    }
}

fn manage_cache(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cache = open_cache()?;
    if clear {
        cache.clear_all()?;
        println!("Cache cleared.");
    }
    print_cache_info(&cache)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_max_age() {
        assert_eq!(cache_max_age(90).unwrap(), Duration::minutes(90));
        assert_eq!(cache_max_age(0).unwrap(), Duration::zero());
        assert!(cache_max_age(-1).is_err());
        assert!(cache_max_age(i64::MAX).is_err());
    }

    #[test]
    fn test_cli_parses_selection() {
        let cli = Cli::try_parse_from([
            "screener", "--max-age", "5", "screen", "--setup", "MomUp", "--pea", "pme",
            "--style", "grow",
        ])
        .unwrap();
        assert_eq!(cli.max_age, 5);
        let Commands::Screen { selection, .. } = cli.command else {
            panic!("expected the screen command");
        };
        let selection = selection.selection();
        assert_eq!(selection.setups, vec!["MomUp".to_string()]);
        assert_eq!(selection.tax, TaxFilter::PeaPmeEligible);
    }
}
