use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::aggregate::SummaryTable;
use crate::data::filter::Selection;
use crate::data::histogram::{Bin, Histogram};
use crate::data::model::{Listing, NumericColumn};
use crate::data::pivot::PivotTable;

// ---------------------------------------------------------------------------
// Chart specification – renderer-agnostic description of one chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Scatter,
    StackedBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesData {
    /// `(x, y)` pairs.
    Points(Vec<[f64; 2]>),
    /// Numeric buckets with their value.
    Buckets(Vec<Bin>),
    /// Category label with its value, in display order.
    Categories(Vec<(String, f64)>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Points(p) => p.len(),
            SeriesData::Buckets(b) => b.len(),
            SeriesData::Categories(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Write the chart specification as pretty JSON.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing chart spec")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing chart spec to {}", path.display()))?;
        Ok(())
    }

    /// Category labels of the first series, used for the x axis of bar charts.
    pub fn category_labels(&self) -> Vec<&str> {
        match self.series.first().map(|s| &s.data) {
            Some(SeriesData::Categories(c)) => c.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Label formatting
// ---------------------------------------------------------------------------

/// Describe a selection for a title: `"all manufacturers"`, `"ford, kia"`,
/// or `"ford, kia, ram and 2 more"`.
pub fn selection_label(selection: &Selection, plural: &str) -> String {
    const SHOWN: usize = 3;
    match selection {
        Selection::All => format!("all {plural}"),
        Selection::Only(set) if set.is_empty() => format!("no {plural}"),
        Selection::Only(set) => {
            let shown: Vec<&str> = set.iter().take(SHOWN).map(String::as_str).collect();
            let rest = set.len().saturating_sub(SHOWN);
            if rest == 0 {
                shown.join(", ")
            } else {
                format!("{} and {rest} more", shown.join(", "))
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn column_label(column: NumericColumn) -> String {
    capitalize(&column.name().replace('_', " "))
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Single-population histogram.
pub fn histogram_chart(column: NumericColumn, hist: &Histogram, scope: &str) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Histogram,
        title: format!("{} distribution ({scope})", column_label(column)),
        x_label: column.name().to_string(),
        y_label: hist.normalization.axis_label().to_string(),
        series: vec![Series {
            name: column.name().to_string(),
            data: SeriesData::Buckets(hist.bins.clone()),
        }],
    }
}

/// Two histograms on shared edges, one series per manufacturer.
pub fn comparison_chart(
    column: NumericColumn,
    a: (&str, &Histogram),
    b: (&str, &Histogram),
) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Histogram,
        title: format!("{} distribution: {} vs {}", column_label(column), a.0, b.0),
        x_label: column.name().to_string(),
        y_label: a.1.normalization.axis_label().to_string(),
        series: [a, b]
            .into_iter()
            .map(|(name, hist)| Series {
                name: name.to_string(),
                data: SeriesData::Buckets(hist.bins.clone()),
            })
            .collect(),
    }
}

/// Scatter of `y` against `x` over listings where both are present.
pub fn scatter_chart(
    listings: &[Listing],
    x: NumericColumn,
    y: NumericColumn,
    scope: &str,
) -> ChartSpec {
    let points: Vec<[f64; 2]> = listings
        .iter()
        .filter_map(|l| Some([x.value(l)?, y.value(l)?]))
        .collect();
    ChartSpec {
        kind: ChartKind::Scatter,
        title: format!("{} vs {} ({scope})", column_label(y), column_label(x)),
        x_label: x.name().to_string(),
        y_label: y.name().to_string(),
        series: vec![Series {
            name: format!("{} / {}", y.name(), x.name()),
            data: SeriesData::Points(points),
        }],
    }
}

/// Stacked bars: one bar per pivot row, one stacked series per pivot column.
pub fn stacked_bar_chart(pivot: &PivotTable, title: String) -> ChartSpec {
    let series = pivot
        .column_keys
        .iter()
        .enumerate()
        .map(|(c, col_key)| Series {
            name: col_key.clone(),
            data: SeriesData::Categories(
                pivot
                    .row_keys
                    .iter()
                    .zip(&pivot.cells)
                    .map(|(row_key, row)| (row_key.clone(), row[c] as f64))
                    .collect(),
            ),
        })
        .collect();
    ChartSpec {
        kind: ChartKind::StackedBar,
        title,
        x_label: pivot.row_dimension.name().to_string(),
        y_label: "count".to_string(),
        series,
    }
}

/// Bars from a summary table. A two-dimension table stacks its second key;
/// a one-dimension table is a single series.
pub fn summary_chart(summary: &SummaryTable, title: String, y_label: &str) -> ChartSpec {
    let x_label = summary
        .group_by
        .first()
        .map(|d| d.name().to_string())
        .unwrap_or_default();

    let series = if summary.group_by.len() >= 2 {
        let mut rows: Vec<String> = Vec::new();
        let mut by_series: std::collections::BTreeMap<&str, Vec<(String, f64)>> =
            std::collections::BTreeMap::new();
        for (key, value) in &summary.entries {
            if !rows.contains(&key[0]) {
                rows.push(key[0].clone());
            }
            by_series
                .entry(key[1].as_str())
                .or_default()
                .push((key[0].clone(), *value));
        }
        // Every series gets every row so stacks line up.
        by_series
            .into_iter()
            .map(|(name, values)| Series {
                name: name.to_string(),
                data: SeriesData::Categories(
                    rows.iter()
                        .map(|r| {
                            let v = values
                                .iter()
                                .find(|(k, _)| k == r)
                                .map(|(_, v)| *v)
                                .unwrap_or(0.0);
                            (r.clone(), v)
                        })
                        .collect(),
                ),
            })
            .collect()
    } else {
        vec![Series {
            name: y_label.to_string(),
            data: SeriesData::Categories(summary.pairs()),
        }]
    };

    ChartSpec {
        kind: ChartKind::StackedBar,
        title,
        x_label,
        y_label: y_label.to_string(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{aggregate, AggregationSpec};
    use crate::data::histogram::{compare_histograms, Normalization};
    use crate::data::model::Dimension;
    use crate::data::pivot::pivot_counts;

    fn listing(manufacturer: &str, condition: &str, price: f64, odometer: Option<f64>) -> Listing {
        Listing {
            price: Some(price),
            model_year: Some(2015),
            model: format!("{manufacturer} x"),
            condition: condition.into(),
            vehicle_type: "sedan".into(),
            manufacturer: manufacturer.into(),
            odometer,
        }
    }

    #[test]
    fn selection_label_truncates_long_lists() {
        assert_eq!(selection_label(&Selection::All, "manufacturers"), "all manufacturers");
        assert_eq!(
            selection_label(&Selection::only(["kia", "ford"]), "manufacturers"),
            "ford, kia"
        );
        assert_eq!(
            selection_label(&Selection::only(["a", "b", "c", "d", "e"]), "types"),
            "a, b, c and 2 more"
        );
    }

    #[test]
    fn comparison_title_names_both_manufacturers() {
        let rows = vec![listing("kia", "good", 100.0, None), listing("bmw", "good", 900.0, None)];
        let (ha, hb) =
            compare_histograms(&rows, NumericColumn::Price, "kia", "bmw", 3, Normalization::Count)
                .unwrap();
        let chart = comparison_chart(NumericColumn::Price, ("kia", &ha), ("bmw", &hb));
        assert_eq!(chart.title, "Price distribution: kia vs bmw");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.y_label, "count");
        assert_eq!(chart.kind, ChartKind::Histogram);
    }

    #[test]
    fn scatter_skips_rows_missing_either_axis() {
        let rows = vec![
            listing("kia", "good", 100.0, Some(5.0)),
            listing("kia", "good", 200.0, None),
        ];
        let chart = scatter_chart(&rows, NumericColumn::Odometer, NumericColumn::Price, "all");
        assert_eq!(chart.series[0].data, SeriesData::Points(vec![[5.0, 100.0]]));
        assert_eq!(chart.title, "Price vs Odometer (all)");
    }

    #[test]
    fn stacked_bar_has_one_series_per_column_key() {
        let rows = vec![
            listing("kia", "good", 1.0, None),
            listing("ram", "fair", 1.0, None),
            listing("ram", "good", 1.0, None),
        ];
        let order = vec!["ram".to_string(), "kia".to_string()];
        let pivot = pivot_counts(&rows, Dimension::Manufacturer, Dimension::Condition, &order);
        let chart = stacked_bar_chart(&pivot, "Condition by manufacturer".into());
        assert_eq!(chart.category_labels(), ["ram", "kia"]);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["fair", "good"]);
        assert_eq!(
            chart.series[0].data,
            SeriesData::Categories(vec![("ram".into(), 1.0), ("kia".into(), 0.0)])
        );
    }

    #[test]
    fn summary_chart_fills_missing_pairs_with_zero() {
        let rows = vec![listing("kia", "good", 1.0, None), listing("ram", "fair", 1.0, None)];
        let summary = aggregate(
            &rows,
            &AggregationSpec::count_by_pair(Dimension::Manufacturer, Dimension::Condition),
        );
        let chart = summary_chart(&summary, "t".into(), "count");
        assert_eq!(chart.series.len(), 2);
        assert!(chart.series.iter().all(|s| s.data.len() == 2));
    }

    #[test]
    fn export_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let rows = vec![listing("kia", "good", 1.0, Some(2.0))];
        let chart = scatter_chart(&rows, NumericColumn::Odometer, NumericColumn::Price, "all");
        chart.export_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "scatter");
        assert_eq!(value["series"][0]["data"]["points"][0][1], 1.0);
    }
}
