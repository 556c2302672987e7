use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::model::{Dimension, Listing};

/// Count matrix of two categorical dimensions.
///
/// Rows follow the caller-supplied order; columns are sorted. Every cell is
/// present, combinations with no listings hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub row_keys: Vec<String>,
    pub column_keys: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<u64>>,
}

impl PivotTable {
    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn cell(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.row_keys.iter().position(|k| k == row)?;
        let c = self.column_keys.iter().position(|k| k == column)?;
        Some(self.cells[r][c])
    }

    /// Counts for one column key across all rows, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<u64>> {
        let c = self.column_keys.iter().position(|k| k == column)?;
        Some(self.cells.iter().map(|row| row[c]).collect())
    }
}

/// Count listings by (`rows`, `columns`) value pairs.
///
/// Only listings whose row value appears in `row_order` are counted, and the
/// output rows keep that order (repeated keys are kept once). Listings with
/// no value for either dimension are skipped.
pub fn pivot_counts(
    listings: &[Listing],
    rows: Dimension,
    columns: Dimension,
    row_order: &[String],
) -> PivotTable {
    let mut row_keys: Vec<String> = Vec::with_capacity(row_order.len());
    let mut row_pos: HashMap<&str, usize> = HashMap::new();
    for key in row_order {
        if !row_pos.contains_key(key.as_str()) {
            row_pos.insert(key.as_str(), row_keys.len());
            row_keys.push(key.clone());
        }
    }

    let mut counts: BTreeMap<(usize, String), u64> = BTreeMap::new();
    let mut column_set: BTreeSet<String> = BTreeSet::new();
    for listing in listings {
        let (Some(r), Some(c)) = (rows.key(listing), columns.key(listing)) else {
            continue;
        };
        let Some(&r_idx) = row_pos.get(r.as_str()) else {
            continue;
        };
        column_set.insert(c.clone());
        *counts.entry((r_idx, c)).or_default() += 1;
    }

    let column_keys: Vec<String> = column_set.into_iter().collect();
    let cells = (0..row_keys.len())
        .map(|r_idx| {
            column_keys
                .iter()
                .map(|c| counts.get(&(r_idx, c.clone())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    PivotTable {
        row_dimension: rows,
        column_dimension: columns,
        row_keys,
        column_keys,
        cells,
    }
}

/// [`pivot_counts`] over every row value present, sorted. Model years sort
/// numerically.
pub fn pivot_counts_all(listings: &[Listing], rows: Dimension, columns: Dimension) -> PivotTable {
    let order: BTreeSet<String> = listings.iter().filter_map(|l| rows.key(l)).collect();
    let mut order: Vec<String> = order.into_iter().collect();
    if rows == Dimension::ModelYear {
        order.sort_by_key(|year| year.parse::<i64>().unwrap_or(i64::MAX));
    }
    pivot_counts(listings, rows, columns, &order)
}
