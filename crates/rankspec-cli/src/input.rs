//! Reading purified data files.
//!
//! A data file is a JSON array of rows, one row per respondent and one 0/1
//! entry per item. Comments and trailing commas are accepted.

use std::path::Path;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use rankspec_core::DenseMatrix;

pub struct Dataset {
    pub matrix: DenseMatrix,
    /// Hex SHA-256 of the rows, independent of the file's formatting.
    pub fingerprint: String,
}

pub fn load_dataset(path: &Path, items: Option<usize>) -> Result<Dataset> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_dataset(&content, items).with_context(|| format!("loading {}", path.display()))
}

pub fn parse_dataset(content: &str, items: Option<usize>) -> Result<Dataset> {
    let rows: Vec<Vec<f64>> =
        serde_json_lenient::from_str(content).context("expected a JSON array of numeric rows")?;
    if rows.is_empty() {
        bail!("no rows");
    }
    if let Some(expected) = items {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            bail!("row {} has {} items, expected {expected}", i + 1, row.len());
        }
    }
    let fingerprint = fingerprint(&rows)?;
    let matrix = DenseMatrix::from_real_rows(&rows)?;
    Ok(Dataset {
        matrix,
        fingerprint,
    })
}

fn fingerprint(rows: &[Vec<f64>]) -> Result<String> {
    let canonical = serde_json::to_vec(rows)?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}
