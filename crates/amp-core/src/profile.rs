//! Missingness profile of a dataset.
//!
//! Summarizes which combinations of columns are missing together and how
//! often, plus per-column and overall missing rates.

use std::collections::HashMap;

use amp_common::Dataset;
use serde::Serialize;
use tracing::info;

/// One distinct row-level missingness mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskCount {
    /// `true` where the column is missing.
    pub missing: Vec<bool>,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessProfile {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Distinct masks, most frequent first (ties broken by mask order).
    pub masks: Vec<MaskCount>,
    pub columns: Vec<ColumnMissing>,
    /// Fraction of rows with at least one missing cell.
    pub incomplete_row_fraction: f64,
    /// Fraction of all cells that are missing.
    pub missing_cell_fraction: f64,
}

impl MissingnessProfile {
    pub fn from_dataset(data: &Dataset) -> Self {
        let mut counts: HashMap<Vec<bool>, usize> = HashMap::new();
        for row in data.rows() {
            let mask: Vec<bool> = row.iter().map(|c| c.is_missing()).collect();
            *counts.entry(mask).or_default() += 1;
        }
        let mut masks: Vec<MaskCount> = counts
            .into_iter()
            .map(|(missing, rows)| MaskCount { missing, rows })
            .collect();
        masks.sort_by(|a, b| b.rows.cmp(&a.rows).then_with(|| a.missing.cmp(&b.missing)));

        let columns = (0..data.n_cols())
            .map(|col| ColumnMissing {
                column: data.column_name(col),
                missing: data.column_missing_count(col),
            })
            .collect();

        let incomplete_rows: usize = masks
            .iter()
            .filter(|m| m.missing.iter().any(|&x| x))
            .map(|m| m.rows)
            .sum();
        let n_cells = data.n_rows() * data.n_cols();

        Self {
            n_rows: data.n_rows(),
            n_cols: data.n_cols(),
            masks,
            columns,
            incomplete_row_fraction: ratio(incomplete_rows, data.n_rows()),
            missing_cell_fraction: ratio(data.missing_count(), n_cells),
        }
    }

    pub fn log(&self) {
        info!(
            rows = self.n_rows,
            distinct_masks = self.masks.len(),
            incomplete_row_fraction = self.incomplete_row_fraction,
            missing_cell_fraction = self.missing_cell_fraction,
            "Missingness profile"
        );
        for mask in &self.masks {
            let pattern: String = mask
                .missing
                .iter()
                .map(|&m| if m { '0' } else { '1' })
                .collect();
            info!(pattern = %pattern, rows = mask.rows, "Observed-value mask");
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
