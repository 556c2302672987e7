use log::{debug, warn};

use crate::chart::{
    comparison_chart, histogram_chart, scatter_chart, selection_label, stacked_bar_chart,
    summary_chart, ChartSpec,
};
use crate::data::aggregate::{aggregate, AggregationSpec, Metrics};
use crate::data::filter::{filter, FilterSpec};
use crate::data::histogram::{column_histogram, compare_histograms, Normalization};
use crate::data::model::{Dimension, Listing, ListingTable, NumericColumn};
use crate::data::pivot::{pivot_counts, pivot_counts_all};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Which chart the dashboard is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Distribution of one numeric column.
    Histogram { column: NumericColumn },
    /// One numeric column plotted against another.
    Scatter { x: NumericColumn, y: NumericColumn },
    /// Price distributions of two manufacturers on shared bins.
    ManufacturerComparison {
        a: String,
        b: String,
        normalize: bool,
    },
    /// Vehicle types stacked per manufacturer, most listed manufacturer first.
    TypesByManufacturer,
    /// Conditions stacked per model year.
    ConditionByYear,
    /// Bars of an arbitrary grouping, e.g. mean price per manufacturer.
    Summary { spec: AggregationSpec },
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Histogram { .. } => "Histogram",
            View::Scatter { .. } => "Scatter",
            View::ManufacturerComparison { .. } => "Compare manufacturers",
            View::TypesByManufacturer => "Types by manufacturer",
            View::ConditionByYear => "Condition by year",
            View::Summary { .. } => "Summary",
        }
    }
}

/// Everything needed to evaluate one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub filter: FilterSpec,
    pub view: View,
    pub histogram_bins: usize,
    pub preview_rows: usize,
}

/// Render-ready result of one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub metrics: Metrics,
    pub chart: ChartSpec,
    /// First rows of the filtered table.
    pub preview: Vec<Listing>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Run filter → aggregate → chart for one request.
///
/// Fails with `EmptySelection` before touching any rows when a multi-select
/// was cleared, and with `NoMatchingRows` when nothing is left to chart.
pub fn evaluate(table: &ListingTable, request: &ViewRequest) -> Result<RenderOutput> {
    if let Err(err) = request.filter.validate() {
        warn!("{err}");
        return Err(err);
    }
    if request.view == View::ConditionByYear && table.year_bounds.is_none() {
        return Err(DashboardError::NoModelYears);
    }

    let filtered = filter(table, &request.filter);
    debug!(
        "{}: {} of {} listings pass the filters",
        request.view.title(),
        filtered.len(),
        table.len()
    );
    if filtered.is_empty() {
        return Err(DashboardError::NoMatchingRows);
    }

    let chart = build_chart(&filtered, request)?;
    Ok(RenderOutput {
        metrics: Metrics::compute(&filtered.listings),
        chart,
        preview: filtered
            .listings
            .iter()
            .take(request.preview_rows)
            .cloned()
            .collect(),
    })
}

fn build_chart(filtered: &ListingTable, request: &ViewRequest) -> Result<ChartSpec> {
    let rows = &filtered.listings;
    let scope = selection_label(&request.filter.manufacturers, "manufacturers");

    let chart = match &request.view {
        View::Histogram { column } => {
            let hist =
                column_histogram(rows, *column, request.histogram_bins, Normalization::Count)?;
            if hist.is_empty() {
                return Err(DashboardError::NoMatchingRows);
            }
            histogram_chart(*column, &hist, &scope)
        }
        View::Scatter { x, y } => {
            let chart = scatter_chart(rows, *x, *y, &scope);
            if chart.series.iter().all(|s| s.data.is_empty()) {
                return Err(DashboardError::NoMatchingRows);
            }
            chart
        }
        View::ManufacturerComparison { a, b, normalize } => {
            let (ha, hb) = compare_histograms(
                rows,
                NumericColumn::Price,
                a,
                b,
                request.histogram_bins,
                Normalization::from_flag(*normalize),
            )?;
            if ha.is_empty() && hb.is_empty() {
                return Err(DashboardError::NoMatchingRows);
            }
            comparison_chart(NumericColumn::Price, (a.as_str(), &ha), (b.as_str(), &hb))
        }
        View::TypesByManufacturer => {
            let order = filtered.manufacturers_by_count();
            let pivot = pivot_counts(rows, Dimension::Manufacturer, Dimension::Type, &order);
            stacked_bar_chart(&pivot, format!("Vehicle types by manufacturer ({scope})"))
        }
        View::ConditionByYear => {
            let pivot = pivot_counts_all(rows, Dimension::ModelYear, Dimension::Condition);
            if pivot.row_keys.is_empty() {
                return Err(DashboardError::NoMatchingRows);
            }
            let years = match request.filter.year_range {
                Some((lo, hi)) => format!("{lo}-{hi}"),
                None => "all years".to_string(),
            };
            stacked_bar_chart(&pivot, format!("Condition by model year ({years})"))
        }
        View::Summary { spec } => {
            let summary = aggregate(rows, spec);
            if summary.is_empty() {
                return Err(DashboardError::NoMatchingRows);
            }
            let groups: Vec<&str> = spec.group_by.iter().map(|d| d.name()).collect();
            let label = spec.function.label();
            let title = format!("{label} by {} ({scope})", groups.join(" and "));
            summary_chart(&summary, title, &label)
        }
    };
    Ok(chart)
}
