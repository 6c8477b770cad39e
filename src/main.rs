use anyhow::Context;
use clap::{Parser, Subcommand};
use plot_locator::config::Settings;
use plot_locator::location::{
    format_coords, DistanceEngine, ExactMatchResolver, Level, LocationStore, SearchIndex,
    SearchType,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Plot Locator: Botswana location hierarchy, search and proximity.
///
/// Examples:
///   plotloc serve --port 8080
///   plotloc settlements 9
///   plotloc search gabo --type settlement
///   plotloc resolve ward "Block 8" --parent 101
///   plotloc nearby --lat -24.65 --lng 25.91 --radius 15
#[derive(Parser)]
#[command(name = "plotloc", version, about, long_about = None)]
struct Cli {
    /// Settings file. Defaults to ~/.plotloc/config.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON dataset overriding the configured one.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// List all districts.
    Districts,
    /// List the settlements of a district.
    Settlements { district_id: u32 },
    /// List the wards of a settlement.
    Wards { settlement_id: u32 },
    /// Ranked search across the hierarchy.
    Search {
        query: String,
        #[arg(long = "type", short = 't', default_value = "all")]
        kind: SearchType,
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },
    /// Exact, case-insensitive match of typed text at one level.
    Resolve {
        level: Level,
        text: String,
        /// Parent id narrowing the candidates.
        #[arg(long)]
        parent: Option<u32>,
    },
    /// Settlements (or plots) within a radius of a point.
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
        #[arg(long)]
        plots: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if let Some(path) = cli.dataset.clone() {
        settings.dataset = Some(path);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = settings.open_store().context("loading location dataset")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime.block_on(plot_locator::server::start(&settings, store))?;
        }
        Command::Districts => print_json(&store.districts())?,
        Command::Settlements { district_id } => print_json(&store.settlements_in(district_id)?)?,
        Command::Wards { settlement_id } => print_json(&store.wards_in(settlement_id)?)?,
        Command::Search { query, kind, limit } => {
            let index = SearchIndex::new(Arc::new(store));
            let limit = limit.unwrap_or(settings.default_limit);
            let results = index.search(&query, kind, limit)?;
            eprintln!("  {} result(s) for '{}'", results.total(), query.trim());
            print_json(&results)?;
        }
        Command::Resolve { level, text, parent } => {
            let hit = ExactMatchResolver::new(&store).resolve(level, &text, parent);
            if hit.is_none() {
                eprintln!("  No exact {} match for '{}'", level, text.trim());
            }
            print_json(&hit)?;
        }
        Command::Nearby { lat, lng, radius, plots } => {
            anyhow::ensure!(
                plot_locator::location::geo::valid_coords(lat, lng),
                "invalid coordinates. Lat: -90..90, Lng: -180..180"
            );
            anyhow::ensure!(
                radius.is_finite() && radius >= 0.0,
                "radius must be a non-negative number"
            );
            eprintln!("  Within {} km of {}", radius, format_coords(lat, lng));
            nearby(&store, lat, lng, radius, plots)?;
        }
    }
    Ok(())
}

fn nearby(
    store: &LocationStore,
    lat: f64,
    lng: f64,
    radius: f64,
    plots: bool,
) -> anyhow::Result<()> {
    let engine = DistanceEngine::new(store);
    if plots {
        print_json(&engine.find_nearby_plots(lat, lng, radius))
    } else {
        print_json(&engine.find_nearby(lat, lng, radius))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
