//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Brand knowledge memory for content agents
#[derive(Parser)]
#[command(
    name = "brand-memory",
    version = env!("CARGO_PKG_VERSION"),
    about = "Brand knowledge memory for content agents",
    long_about = "Ingest brand documents into a per-client vector memory and search it by meaning.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ brand-memory init\n  $ brand-memory ingest --client acme --title \"Voice guide\" voice.md\n  $ brand-memory search --client acme \"how do we talk about pricing?\"\n  $ brand-memory serve --bind 0.0.0.0:8787"
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .brand-memory directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display effective settings with credentials redacted")]
    Config,

    /// Preview how a document would be split
    #[command(
        about = "Split text into chunks locally without calling any backend",
        after_help = "Examples:\n  brand-memory chunk voice.md\n  cat notes.txt | brand-memory chunk --size 400 --overlap 50 --json"
    )]
    Chunk {
        /// File to read (stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Window size in characters (overrides config)
        #[arg(long)]
        size: Option<usize>,

        /// Overlap in characters (overrides config)
        #[arg(long)]
        overlap: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Ingest a document into a client's memory
    #[command(
        about = "Store, chunk and embed a brand document",
        after_help = "Examples:\n  brand-memory ingest --client acme --title \"Voice guide\" voice.md\n  echo \"Never use the word cheap\" | brand-memory ingest --client acme --source-type note"
    )]
    Ingest {
        /// Tenant the document belongs to
        #[arg(long = "client", value_name = "ID")]
        client_id: String,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Origin category (default: manual)
        #[arg(long)]
        source_type: Option<String>,

        /// External reference (URL, file name)
        #[arg(long)]
        source_ref: Option<String>,

        /// Creator identifier
        #[arg(long)]
        created_by: Option<String>,

        /// Extra metadata as a JSON object
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,

        /// File to read (stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Search a client's memory
    #[command(
        about = "Find the stored passages most similar to a query",
        after_help = "Examples:\n  brand-memory search --client acme \"tone for product launches\"\n  brand-memory search --client acme \"pricing\" --limit 3 --threshold 0.5 --json"
    )]
    Search {
        /// Tenant to search
        #[arg(long = "client", value_name = "ID")]
        client_id: String,

        /// Natural language query
        query: String,

        /// Maximum number of matches (overrides config)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Minimum similarity score (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API
    #[command(
        about = "Serve the ingest and search HTTP API",
        after_help = "Routes:\n  GET  /health\n  POST /v1/brand/ingest\n  POST /v1/brand/search"
    )]
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
}
