//! Local chunk preview.

use std::path::Path;

use crate::config::Settings;
use crate::documents::{Chunker, ChunkingConfig, RawChunk, WindowChunker};

/// Effective chunking parameters: settings overridden by flags.
pub fn effective_config(
    settings: &Settings,
    size: Option<usize>,
    overlap: Option<usize>,
) -> ChunkingConfig {
    ChunkingConfig::new(
        size.unwrap_or(settings.chunking.chunk_size),
        overlap.unwrap_or(settings.chunking.overlap),
    )
}

fn preview(content: &str) -> String {
    let single_line: String = content
        .chars()
        .take(80)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if content.chars().count() > 80 {
        format!("{single_line}...")
    } else {
        single_line
    }
}

/// Run chunk command.
pub fn run(
    settings: &Settings,
    file: Option<&Path>,
    size: Option<usize>,
    overlap: Option<usize>,
    json: bool,
) {
    let config = effective_config(settings, size, overlap);
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let text = super::read_input_or_exit(file);
    let chunks: Vec<RawChunk> = WindowChunker::new().chunk(&text, &config);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&chunks).unwrap_or_default()
        );
        return;
    }

    if chunks.is_empty() {
        eprintln!("No chunks: input is empty.");
        return;
    }

    println!(
        "{} chunk(s) (size {}, overlap {})",
        chunks.len(),
        config.chunk_size,
        config.overlap
    );
    for chunk in &chunks {
        println!(
            "\n[{}] chars {}..{} ({} chars)",
            chunk.index,
            chunk.char_range.0,
            chunk.char_range.1,
            chunk.char_count()
        );
        println!("   {}", preview(&chunk.content));
    }
}
