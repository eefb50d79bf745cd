//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod chunk;
pub mod ingest;
pub mod init;
pub mod search;
pub mod serve;

use std::io::Read;
use std::path::Path;

/// Read a whole file, or stdin when no path is given.
pub fn read_input(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Read input or exit with a message naming the source.
pub(crate) fn read_input_or_exit(file: Option<&Path>) -> String {
    match read_input(file) {
        Ok(text) => text,
        Err(e) => {
            let source = file.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
            eprintln!("Error: failed to read {source}: {e}");
            std::process::exit(1);
        }
    }
}
