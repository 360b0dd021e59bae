use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use animal_registry::{Menu, Registry, Store};

#[derive(Parser)]
#[command(name = "animal-registry")]
#[command(version = animal_registry::VERSION)]
#[command(about = "Console registry of animals backed by SQLite", long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "animals.db")]
    db: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Initialise the global tracing subscriber. Respects `RUST_LOG`; falls
/// back to the supplied level when it is not set.
fn init_tracing(level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(level);

    let store = Store::open(&cli.db)
        .with_context(|| format!("failed to open store at {}", cli.db.display()))?;

    let mut registry = Registry::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(stdin.lock(), stdout.lock());
    menu.run(&store, &mut registry)
        .context("interactive session failed")?;

    Ok(())
}
