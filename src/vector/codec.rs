//! Text literal format for vector columns.
//!
//! Vectors are written as `[v0,v1,...,vn]`, every component with exactly
//! eight digits after the decimal point and no whitespace.

use std::fmt::Write;

use thiserror::Error;

/// Digits kept after the decimal point when encoding.
pub const VECTOR_LITERAL_PRECISION: usize = 8;

/// Errors from parsing a vector literal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VectorLiteralError {
    #[error("Vector literal must be wrapped in square brackets")]
    MissingBrackets,

    #[error("Invalid vector component at position {position}: '{value}'")]
    InvalidComponent { position: usize, value: String },
}

/// Encode a vector into the storage literal format.
pub fn encode_vector(vector: &[f64]) -> String {
    // ~12 bytes per component for typical unit-range embeddings
    let mut out = String::with_capacity(2 + vector.len() * 12);
    out.push('[');
    for (i, value) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{value:.prec$}", prec = VECTOR_LITERAL_PRECISION);
    }
    out.push(']');
    out
}

/// Parse a storage literal back into a vector.
///
/// Accepts surrounding whitespace and spaces after commas, which some
/// backends emit when reading the column back.
pub fn decode_vector(literal: &str) -> Result<Vec<f64>, VectorLiteralError> {
    let inner = literal
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(VectorLiteralError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .enumerate()
        .map(|(position, part)| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| VectorLiteralError::InvalidComponent {
                    position,
                    value: part.to_string(),
                })
        })
        .collect()
}
