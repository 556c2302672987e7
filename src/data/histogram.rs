use serde::Serialize;

use super::model::{Listing, NumericColumn};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// How bucket counts are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Normalization {
    /// Raw number of values per bucket.
    #[default]
    Count,
    /// Bucket count divided by the number of binned values; buckets sum to 1.
    Proportion,
    /// Proportion divided by bucket width; the histogram area is 1.
    Density,
}

impl Normalization {
    /// The dashboard's "normalize" checkbox selects proportions.
    pub fn from_flag(normalize: bool) -> Self {
        if normalize {
            Normalization::Proportion
        } else {
            Normalization::Count
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            Normalization::Count => "count",
            Normalization::Proportion => "proportion",
            Normalization::Density => "density",
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One bucket. Buckets are half-open `[start, end)` except the last, which
/// also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    /// Number of values that fell inside the edges.
    pub total: usize,
    pub normalization: Normalization,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sum of all bucket values.
    pub fn sum(&self) -> f64 {
        self.bins.iter().map(|b| b.value).sum()
    }
}

/// `bins + 1` evenly spaced edges from 0 to `max`.
///
/// A non-positive (or non-finite) `max` yields the single bucket `[0, 1]`.
pub fn edges_from_zero(max: f64, bins: usize) -> Result<Vec<f64>> {
    if bins == 0 {
        return Err(DashboardError::InvalidBins);
    }
    if !(max.is_finite() && max > 0.0) {
        return Ok(vec![0.0, 1.0]);
    }
    let step = max / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| i as f64 * step).collect();
    edges.push(max);
    Ok(edges)
}

/// Bucket `values` into the given ascending `edges`.
///
/// Values outside `[edges[0], edges[last]]` and non-finite values are not
/// counted and do not contribute to `total`.
pub fn histogram<I>(values: I, edges: &[f64], normalization: Normalization) -> Result<Histogram>
where
    I: IntoIterator<Item = f64>,
{
    if edges.len() < 2 {
        return Err(DashboardError::InvalidBins);
    }
    let n_bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[n_bins];

    let mut counts = vec![0usize; n_bins];
    for v in values {
        if !v.is_finite() || v < first || v > last {
            continue;
        }
        // Number of edges <= v, minus one, is the bucket; `last` folds into
        // the final bucket.
        let idx = edges.partition_point(|e| *e <= v).saturating_sub(1);
        counts[idx.min(n_bins - 1)] += 1;
    }

    let total: usize = counts.iter().sum();
    let bins = edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| {
            let (start, end) = (w[0], w[1]);
            let value = match normalization {
                _ if total == 0 => 0.0,
                Normalization::Count => count as f64,
                Normalization::Proportion => count as f64 / total as f64,
                Normalization::Density if end > start => {
                    count as f64 / (total as f64 * (end - start))
                }
                Normalization::Density => 0.0,
            };
            Bin { start, end, value }
        })
        .collect();

    Ok(Histogram {
        bins,
        total,
        normalization,
    })
}

fn column_values<'a>(
    listings: impl IntoIterator<Item = &'a Listing>,
    column: NumericColumn,
) -> Vec<f64> {
    listings
        .into_iter()
        .filter_map(|l| column.value(l))
        .collect()
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

/// Histogram of one numeric column with `bins` buckets from 0 to its max.
pub fn column_histogram(
    listings: &[Listing],
    column: NumericColumn,
    bins: usize,
    normalization: Normalization,
) -> Result<Histogram> {
    let values = column_values(listings, column);
    let edges = edges_from_zero(max_of(&values), bins)?;
    histogram(values, &edges, normalization)
}

/// Histograms of `column` for manufacturers `a` and `b` on shared edges.
///
/// The edges run from 0 to the max over both sub-populations so the two
/// histograms line up. `a == b` is allowed and yields two identical
/// histograms.
pub fn compare_histograms(
    listings: &[Listing],
    column: NumericColumn,
    a: &str,
    b: &str,
    bins: usize,
    normalization: Normalization,
) -> Result<(Histogram, Histogram)> {
    let of = |name: &str| {
        column_values(listings.iter().filter(|l| l.manufacturer == name), column)
    };
    let (values_a, values_b) = (of(a), of(b));
    let max = max_of(&values_a).max(max_of(&values_b));
    let edges = edges_from_zero(max, bins)?;
    Ok((
        histogram(values_a, &edges, normalization)?,
        histogram(values_b, &edges, normalization)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::listing;

    const EPS: f64 = 1e-9;

    #[test]
    fn edges_span_zero_to_max() {
        let edges = edges_from_zero(100.0, 4).unwrap();
        assert_eq!(edges, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(edges_from_zero(0.0, 4).unwrap(), vec![0.0, 1.0]);
        assert!(matches!(
            edges_from_zero(10.0, 0),
            Err(DashboardError::InvalidBins)
        ));
    }

    #[test]
    fn maximum_lands_in_last_bucket() {
        let h = histogram([0.0, 24.9, 25.0, 100.0], &[0.0, 25.0, 50.0, 75.0, 100.0], Normalization::Count)
            .unwrap();
        let counts: Vec<f64> = h.bins.iter().map(|b| b.value).collect();
        assert_eq!(counts, vec![2.0, 1.0, 0.0, 1.0]);
        assert_eq!(h.total, 4);
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let h = histogram([-5.0, 5.0, 11.0, f64::NAN], &[0.0, 10.0], Normalization::Count).unwrap();
        assert_eq!(h.total, 1);
        assert_eq!(h.sum(), 1.0);
    }

    #[test]
    fn proportions_sum_to_one_and_density_integrates_to_one() {
        let values = [1.0, 2.0, 2.5, 7.0, 9.0];
        let edges = [0.0, 2.0, 10.0];
        let p = histogram(values, &edges, Normalization::Proportion).unwrap();
        assert!((p.sum() - 1.0).abs() < EPS);

        let d = histogram(values, &edges, Normalization::Density).unwrap();
        let area: f64 = d.bins.iter().map(|b| b.value * b.width()).sum();
        assert!((area - 1.0).abs() < EPS);
    }

    #[test]
    fn empty_population_is_all_zero_not_nan() {
        let h = histogram(Vec::<f64>::new(), &[0.0, 1.0], Normalization::Proportion).unwrap();
        assert!(h.is_empty());
        assert!(h.bins.iter().all(|b| b.value == 0.0));
    }

    #[test]
    fn comparison_shares_edges_from_combined_max() {
        let mut cheap = listing("kia", "good", None);
        cheap.price = Some(5_000.0);
        let mut pricey = listing("bmw", "good", None);
        pricey.price = Some(40_000.0);
        let rows = vec![cheap, pricey];

        let (a, b) =
            compare_histograms(&rows, NumericColumn::Price, "kia", "bmw", 8, Normalization::Count)
                .unwrap();
        let edges_a: Vec<(f64, f64)> = a.bins.iter().map(|b| (b.start, b.end)).collect();
        let edges_b: Vec<(f64, f64)> = b.bins.iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(edges_a, edges_b);
        assert_eq!(a.bins.last().map(|b| b.end), Some(40_000.0));
        assert_eq!((a.total, b.total), (1, 1));
        assert_eq!(a.bins[1].value, 1.0);
    }

    #[test]
    fn same_manufacturer_on_both_sides_gives_identical_histograms() {
        let rows = vec![listing("kia", "good", None), listing("kia", "fair", None)];
        let (a, b) =
            compare_histograms(&rows, NumericColumn::Odometer, "kia", "kia", 5, Normalization::Proportion)
                .unwrap();
        assert_eq!(a, b);
    }
}
