use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use futures::future::try_join_all;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use govgraph_core::{Config, GraphStore, PropertyGraphStore, StoreError};

mod render;

#[derive(Parser)]
#[command(name = "govgraph")]
#[command(about = "Canonical resource ids and property graph for government data", long_about = None)]
struct Cli {
    /// Config file (defaults to ./govgraph.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,
    /// Print the canonical id of each IRI, minting where needed
    Resolve {
        /// External IRIs
        #[arg(required = true)]
        iris: Vec<String>,
    },
    /// Load a resource and everything it references, as JSON
    Show {
        /// Canonical id, external form or bare integer
        id: String,
    },
    /// Show row counts
    Stats,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    init_tracing(&config);

    match cli.command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Init => {
            let store = GraphStore::open(&config).await?;
            store.initialize().await?;
            println!("Initialized property graph store");
            if !config.store.is_memory() {
                println!("  Path: {}", config.store.path);
            }
        }
        Commands::Resolve { iris } => {
            let store = open_initialized(&config).await?;
            let resolved = try_join_all(iris.iter().map(|iri| store.resolve(iri))).await?;
            for (iri, canonical) in iris.iter().zip(resolved) {
                println!("{} -> {}", iri, canonical);
            }
        }
        Commands::Show { id } => {
            let store = open_initialized(&config).await?;
            let resource = store
                .ids()
                .parse(&id)
                .ok_or_else(|| eyre!("Not a resource id: {}", id))?;

            let graph = store.load_graph(resource).await?;
            let document = render::render_graph(&graph, store.ids());
            println!("{}", serde_json::to_string_pretty(&document)?);

            for (failed, err) in &graph.failures {
                eprintln!("warning: {} could not be loaded: {}", store.ids().format(*failed), err);
            }
        }
        Commands::Stats => {
            let store = open_initialized(&config).await?;
            let stats = store.get_stats().await?;
            println!("Sources:    {}", stats.sources);
            println!("Resources:  {}", stats.resources);
            println!("Properties: {}", stats.properties);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `logging.filter`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_initialized(config: &Config) -> Result<GraphStore> {
    let store = GraphStore::open(config).await?;
    // a memory store starts empty on every run
    if config.store.is_memory() {
        store.initialize().await?;
    }
    if !store.is_initialized().await? {
        return Err(StoreError::NotInitialized.into());
    }
    Ok(store)
}
