use brand_memory::cli::commands;
use brand_memory::cli::{Cli, Commands};
use brand_memory::{Settings, logging};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Missing settings file means defaults
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Chunk {
            file,
            size,
            overlap,
            json,
        } => commands::chunk::run(&settings, file.as_deref(), size, overlap, json),
        Commands::Ingest {
            client_id,
            title,
            source_type,
            source_ref,
            created_by,
            metadata,
            file,
        } => {
            let args = commands::ingest::IngestArgs {
                client_id,
                title,
                source_type,
                source_ref,
                created_by,
                metadata,
            };
            commands::ingest::run(&settings, args, file.as_deref()).await;
        }
        Commands::Search {
            client_id,
            query,
            limit,
            threshold,
            json,
        } => {
            commands::search::run(&settings, &client_id, &query, limit, threshold, json).await;
        }
        Commands::Serve { bind } => commands::serve::run(&settings, bind).await,
    }
}
