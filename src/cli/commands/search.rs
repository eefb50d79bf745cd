//! Search command.

use crate::config::Settings;
use crate::engine::{BrandMemory, SearchOptions};

/// Run search command.
pub async fn run(
    settings: &Settings,
    client_id: &str,
    query: &str,
    limit: Option<u32>,
    threshold: Option<f64>,
    json: bool,
) {
    let memory = match BrandMemory::from_settings(settings) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let defaults = memory.search_defaults();
    let options = SearchOptions {
        match_count: limit.unwrap_or(defaults.match_count),
        similarity_threshold: threshold.unwrap_or(defaults.similarity_threshold),
    };

    match memory.search(client_id, query, options).await {
        Ok(matches) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&matches).unwrap_or_default()
                );
            } else if matches.is_empty() {
                eprintln!("No results found.");
            } else {
                for (i, m) in matches.iter().enumerate() {
                    println!(
                        "\n{}. {} (score: {:.3})",
                        i + 1,
                        m.title().unwrap_or("(untitled)"),
                        m.similarity
                    );
                    if let Some(chunk_index) = m.chunk_index {
                        println!("   Chunk: {chunk_index}");
                    }
                    println!("   {}", m.content.trim());
                }
            }
        }
        Err(e) => {
            eprintln!("Search failed: {e}");
            std::process::exit(1);
        }
    }
}
