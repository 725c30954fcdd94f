//! Decomposition reports: the JSON document and the terminal table.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use rankspec_core::{DenseMatrix, MatrixView, Shape, Vector};
use rankspec_engine::{Decomposition, SortedData};

#[derive(Debug, Serialize)]
pub struct CellSummary {
    pub k: usize,
    pub shape: Shape,
    /// The tracked subset is the winners rather than the losers.
    pub complemented: bool,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct ComponentReport {
    pub k: usize,
    pub j: usize,
    pub shape: Shape,
    pub q: Vector,
    #[serde(rename = "Q")]
    pub corrected: Vector,
    #[serde(rename = "R")]
    pub ranked: DenseMatrix,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub n: usize,
    pub generated_at: DateTime<Utc>,
    pub fingerprint: String,
    pub cells: Vec<CellSummary>,
    pub components: Vec<ComponentReport>,
}

impl Report {
    pub fn new(sorted: &SortedData, decomposition: Decomposition, fingerprint: String) -> Self {
        let cells = sorted
            .cells
            .iter()
            .map(|c| CellSummary {
                k: c.k,
                shape: c.shape.clone(),
                complemented: c.complemented,
                rows: c.rows,
            })
            .collect();
        let components = decomposition
            .components
            .into_iter()
            .map(|c| ComponentReport {
                k: c.k,
                j: c.level,
                shape: c.shape,
                q: c.raw,
                corrected: c.corrected,
                ranked: c.ranked,
            })
            .collect();
        Self {
            n: decomposition.n,
            generated_at: Utc::now(),
            fingerprint,
            cells,
            components,
        }
    }

    fn cell(&self, k: usize) -> Option<&CellSummary> {
        self.cells.iter().find(|c| c.k == k)
    }

    /// Human-readable rendering, `top` ranked rows per component.
    pub fn render_table(&self, top: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "n = {}, {} rows, input {}",
            self.n,
            self.cells.iter().map(|c| c.rows).sum::<usize>(),
            short_hash(&self.fingerprint)
        );
        let _ = writeln!(
            out,
            "generated {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "{}", "─".repeat(58));
        let _ = writeln!(out, "{:>4} {:>10} {:>8}  tracked", "k", "shape", "rows");
        for c in &self.cells {
            let tracked = if c.complemented { "winners" } else { "losers" };
            let _ = writeln!(
                out,
                "{:>4} {:>10} {:>8}  {tracked}",
                c.k,
                c.shape.to_string(),
                c.rows
            );
        }

        for comp in &self.components {
            let side = match self.cell(comp.k) {
                Some(c) if c.complemented => "winners",
                _ => "losers",
            };
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "k = {}, j = {}, shape {} ({side})",
                comp.k, comp.j, comp.shape
            );
            let _ = writeln!(out, "{}", "─".repeat(58));
            for r in 1..=comp.ranked.rows().min(top) {
                let Some(row) = comp.ranked.row(r) else {
                    continue;
                };
                let value = row.get(1).unwrap_or_default();
                let items: Vec<String> = (2..=row.len())
                    .filter(|&c| row.get(c).is_some_and(|l| l == 2.0))
                    .map(|c| (c - 1).to_string())
                    .collect();
                let _ = writeln!(
                    out,
                    "{:>4} {:>12} {{{}}}",
                    r,
                    format!("{value:.4}"),
                    items.join(",")
                );
            }
        }
        out
    }
}

fn short_hash(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
