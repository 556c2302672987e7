use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::model::{Dimension, Listing, NumericColumn};

/// Text shown wherever an aggregate has no input values.
pub const NO_DATA: &str = "no data";

// ---------------------------------------------------------------------------
// AggregationSpec / SummaryTable
// ---------------------------------------------------------------------------

/// Aggregation applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggFn {
    /// Number of listings in the group.
    Count,
    /// Mean of the column over listings where it is present.
    Mean(NumericColumn),
}

impl AggFn {
    /// Axis label for the aggregated value.
    pub fn label(self) -> String {
        match self {
            AggFn::Count => "count".to_string(),
            AggFn::Mean(column) => format!("mean {}", column.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationSpec {
    /// One dimension, or two for a pairwise grouping.
    pub group_by: Vec<Dimension>,
    pub function: AggFn,
}

impl AggregationSpec {
    pub fn count_by(dim: Dimension) -> Self {
        Self {
            group_by: vec![dim],
            function: AggFn::Count,
        }
    }

    pub fn count_by_pair(rows: Dimension, columns: Dimension) -> Self {
        Self {
            group_by: vec![rows, columns],
            function: AggFn::Count,
        }
    }

    pub fn mean_by(dim: Dimension, column: NumericColumn) -> Self {
        Self {
            group_by: vec![dim],
            function: AggFn::Mean(column),
        }
    }
}

/// Group key → aggregate, iterated in key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub group_by: Vec<Dimension>,
    pub function: AggFn,
    pub entries: BTreeMap<Vec<String>, f64>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[&str]) -> Option<f64> {
        let key: Vec<String> = key.iter().map(|k| k.to_string()).collect();
        self.entries.get(&key).copied()
    }

    /// Entries of a single-dimension table as `(key, value)` pairs.
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.join(" / "), *v))
            .collect()
    }
}

/// Group `listings` per `spec` and aggregate each group.
///
/// Listings lacking a value for any grouping dimension are skipped. For
/// `Mean`, groups without a single present value are left out instead of
/// reporting NaN.
pub fn aggregate(listings: &[Listing], spec: &AggregationSpec) -> SummaryTable {
    // (count of rows, sum of present values, count of present values)
    let mut groups: BTreeMap<Vec<String>, (usize, f64, usize)> = BTreeMap::new();

    'rows: for listing in listings {
        let mut key = Vec::with_capacity(spec.group_by.len());
        for dim in &spec.group_by {
            match dim.key(listing) {
                Some(k) => key.push(k),
                None => continue 'rows,
            }
        }
        let acc = groups.entry(key).or_insert((0, 0.0, 0));
        acc.0 += 1;
        if let AggFn::Mean(column) = spec.function {
            if let Some(v) = column.value(listing) {
                acc.1 += v;
                acc.2 += 1;
            }
        }
    }

    let entries = groups
        .into_iter()
        .filter_map(|(key, (rows, sum, present))| match spec.function {
            AggFn::Count => Some((key, rows as f64)),
            AggFn::Mean(_) if present == 0 => None,
            AggFn::Mean(_) => Some((key, sum / present as f64)),
        })
        .collect();

    SummaryTable {
        group_by: spec.group_by.clone(),
        function: spec.function,
        entries,
    }
}

// ---------------------------------------------------------------------------
// Scalar aggregates
// ---------------------------------------------------------------------------

/// Mean of `column` ignoring missing values; `None` when there are none.
pub fn mean(listings: &[Listing], column: NumericColumn) -> Option<f64> {
    let (sum, n) = listings
        .iter()
        .filter_map(|l| column.value(l))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Number of distinct values of `dim`, ignoring listings without one.
pub fn distinct_count(listings: &[Listing], dim: Dimension) -> usize {
    listings
        .iter()
        .filter_map(|l| dim.key(l))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub rows: usize,
    pub mean_price: Option<f64>,
    pub distinct_models: usize,
}

impl Metrics {
    pub fn compute(listings: &[Listing]) -> Self {
        Metrics {
            rows: listings.len(),
            mean_price: mean(listings, NumericColumn::Price),
            distinct_models: distinct_count(listings, Dimension::Model),
        }
    }

    /// Mean price for display, `"no data"` when undefined.
    pub fn mean_price_text(&self) -> String {
        match self.mean_price {
            Some(p) => format!("${p:.0}"),
            None => NO_DATA.to_string(),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listings, mean price {}, {} models",
            self.rows,
            self.mean_price_text(),
            self.distinct_models
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::listing;

    fn priced(manufacturer: &str, price: Option<f64>) -> Listing {
        let mut l = listing(manufacturer, "good", Some(2015));
        l.price = price;
        l
    }

    #[test]
    fn mean_ignores_missing_and_flags_empty() {
        let rows = vec![priced("ford", Some(10.0)), priced("ford", None), priced("ford", Some(20.0))];
        assert_eq!(mean(&rows, NumericColumn::Price), Some(15.0));
        assert_eq!(mean(&[], NumericColumn::Price), None);
        assert_eq!(mean(&[priced("ford", None)], NumericColumn::Price), None);
    }

    #[test]
    fn empty_metrics_show_no_data_instead_of_nan() {
        let m = Metrics::compute(&[]);
        assert_eq!(m.rows, 0);
        assert_eq!(m.mean_price_text(), NO_DATA);
        assert_eq!(m.to_string(), "0 listings, mean price no data, 0 models");
    }

    #[test]
    fn count_by_groups_in_key_order() {
        let rows = vec![priced("ram", None), priced("bmw", None), priced("ram", None)];
        let table = aggregate(&rows, &AggregationSpec::count_by(Dimension::Manufacturer));
        assert_eq!(
            table.pairs(),
            vec![("bmw".to_string(), 1.0), ("ram".to_string(), 2.0)]
        );
    }

    #[test]
    fn mean_by_omits_groups_without_values() {
        let rows = vec![
            priced("ram", Some(100.0)),
            priced("ram", Some(300.0)),
            priced("bmw", None),
        ];
        let spec = AggregationSpec::mean_by(Dimension::Manufacturer, NumericColumn::Price);
        let table = aggregate(&rows, &spec);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&["ram"]), Some(200.0));
        assert!(table.entries.values().all(|v| v.is_finite()));
    }

    #[test]
    fn function_labels_name_the_column() {
        assert_eq!(AggFn::Count.label(), "count");
        assert_eq!(AggFn::Mean(NumericColumn::Price).label(), "mean price");
    }

    #[test]
    fn pair_grouping_skips_rows_without_year() {
        let mut rows = vec![priced("ram", None), priced("ram", None)];
        rows[1].model_year = None;
        let spec = AggregationSpec::count_by_pair(Dimension::ModelYear, Dimension::Condition);
        let table = aggregate(&rows, &spec);
        assert_eq!(table.get(&["2015", "good"]), Some(1.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_count_counts_unique_keys() {
        let rows = vec![priced("ram", None), priced("bmw", None), priced("ram", None)];
        assert_eq!(distinct_count(&rows, Dimension::Manufacturer), 2);
        assert_eq!(distinct_count(&rows, Dimension::Model), 2);
    }
}
