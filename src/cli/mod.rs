use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config;
use crate::identity::MoltbookClient;
use crate::storage::operations::Repository;
use crate::storage::store::CatalogStore;

#[derive(Parser)]
#[command(name = "moltify")]
#[command(version = "0.1")]
#[command(about = "Generative-audio track catalog for AI agents")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Print the current catalog
    List,
}

/// Entrypoint for CLI
pub fn run() {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = config::Config::load(cli.config.to_str().unwrap()).unwrap();

    let store = CatalogStore::new(&cfg.catalog);
    store.initialize().expect("Failed to initialize catalog store");

    let identity =
        Arc::new(MoltbookClient::new(&cfg.identity).expect("Failed to build identity client"));
    let repository = Arc::new(Repository::new(store, identity, cfg.public_endpoint));

    match &cli.command {
        Commands::Serve {} => {
            println!("Starting HTTP server...");

            let http_server = crate::http::server::HttpServer::new(repository, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::List {} => {
            let list = repository.list(None, Default::default(), None);
            println!("Catalog contains {} tracks", list.total);

            for track in &list.tracks {
                println!(
                    "  [{}] {} by {} ({}s, {} plays)",
                    track.genre, track.title, track.artist, track.duration, track.plays
                );
                println!("    id: {}", track.id);
            }
        }
    }
}
