// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use poi_atlas::{load_file, AtlasConfig, Menu, PoiStore, DEFAULT_MAP_SIZE};

/// POI Atlas - points of interest, visitors and the questions you can ask about them
#[derive(Parser)]
#[command(name = "poi-atlas")]
#[command(version)]
#[command(about = "In-memory POI store with spatial queries and visit statistics", long_about = None)]
struct Cli {
    /// JSON or YAML document to load before starting
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Side length of the square map
    #[arg(long, global = true, default_value_t = DEFAULT_MAP_SIZE)]
    map_size: i64,

    /// Log every store mutation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console menu (default)
    Menu,

    /// Load the config document and print what was applied
    Load {
        /// Print the load report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the loaded store in a terminal UI
    Browse,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut store = PoiStore::with_config(AtlasConfig::default().with_map_size(cli.map_size));

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(&mut store, cli.config.as_deref()),
        Commands::Load { json } => run_load(&mut store, cli.config.as_deref(), json),
        Commands::Browse => run_browse(&mut store, cli.config.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_menu(store: &mut PoiStore, config: Option<&Path>) -> Result<()> {
    if let Some(path) = config {
        match load_file(store, path) {
            Ok(report) => println!("Configuration loaded successfully! ({})", report.summary()),
            Err(e) => println!("Error loading configuration: {:#}", e),
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(store, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}

fn run_load(store: &mut PoiStore, config: Option<&Path>, json: bool) -> Result<()> {
    let Some(path) = config else {
        eprintln!("❌ No configuration file given!");
        eprintln!("   Run: poi-atlas --config <file> load");
        std::process::exit(2);
    };

    let report = load_file(store, path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Loaded {}", path.display());
        println!("  {}", report.summary());
        println!("  {} POIs and {} visitors in store", store.poi_count(), store.visitor_count());
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_browse(store: &mut PoiStore, config: Option<&Path>) -> Result<()> {
    if let Some(path) = config {
        load_file(store, path)?;
    }

    let mut app = ui::App::new(store);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_browse(_store: &mut PoiStore, _config: Option<&Path>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
