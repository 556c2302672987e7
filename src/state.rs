use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::config::DashboardConfig;
use crate::data::aggregate::AggregationSpec;
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterSpec, Selection};
use crate::data::model::{Dimension, ListingTable, NumericColumn};
use crate::error::DashboardError;
use crate::pipeline::{evaluate, RenderOutput, View, ViewRequest};

// ---------------------------------------------------------------------------
// View selector
// ---------------------------------------------------------------------------

/// Tabs of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Histogram,
    Scatter,
    Compare,
    TypesByManufacturer,
    ConditionByYear,
    MeanPrice,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Histogram,
        ViewKind::Scatter,
        ViewKind::Compare,
        ViewKind::TypesByManufacturer,
        ViewKind::ConditionByYear,
        ViewKind::MeanPrice,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Histogram => "Histogram",
            ViewKind::Scatter => "Price vs odometer",
            ViewKind::Compare => "Compare manufacturers",
            ViewKind::TypesByManufacturer => "Types by manufacturer",
            ViewKind::ConditionByYear => "Condition by year",
            ViewKind::MeanPrice => "Mean price by manufacturer",
        }
    }

    /// Whether the model year range applies to this view.
    pub fn uses_year_range(self) -> bool {
        matches!(self, ViewKind::ConditionByYear)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    cache: DatasetCache,

    /// Source of the current dataset.
    pub data_path: PathBuf,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<ListingTable>>,

    /// Checked values of each multi-select.
    pub checked: BTreeMap<Dimension, BTreeSet<String>>,

    /// Inclusive model year range for year-based views.
    pub year_range: (i32, i32),

    pub include_small_manufacturers: bool,

    pub view: ViewKind,
    pub histogram_column: NumericColumn,
    pub compare_a: String,
    pub compare_b: String,
    pub normalize: bool,

    /// Result of the last pipeline evaluation.
    pub result: Option<Result<RenderOutput, DashboardError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    dirty: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            config,
            cache: DatasetCache::new(),
            dataset: None,
            checked: BTreeMap::new(),
            year_range: (0, 0),
            include_small_manufacturers: true,
            view: ViewKind::Histogram,
            histogram_column: NumericColumn::Odometer,
            compare_a: String::new(),
            compare_b: String::new(),
            normalize: false,
            result: None,
            status_message: None,
            dirty: false,
        }
    }

    /// Load (or fetch from the cache) the dataset at `path`.
    ///
    /// On failure the dataset is dropped and the error becomes the status
    /// message; no charts are drawn until a load succeeds.
    pub fn load(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        match self.cache.get_or_load(path) {
            Ok(table) => self.set_dataset(table),
            Err(e) => self.fail_load(e),
        }
    }

    /// Re-read the current file, bypassing the cache.
    ///
    /// A failed reload keeps the dataset already on screen, the same table
    /// the cache keeps, and only reports the error.
    pub fn reload(&mut self) {
        let path = self.data_path.clone();
        match self.cache.reload(&path) {
            Ok(table) => self.set_dataset(table),
            Err(e) if self.dataset.is_some() => {
                log::error!("Failed to reload {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
            Err(e) => self.fail_load(e),
        }
    }

    fn fail_load(&mut self, e: DashboardError) {
        log::error!("Failed to load data: {e}");
        self.dataset = None;
        self.result = None;
        self.status_message = Some(format!("Error: {e}"));
    }

    /// Ingest a newly loaded dataset, initialise selections.
    pub fn set_dataset(&mut self, dataset: Arc<ListingTable>) {
        self.checked = Dimension::FILTERABLE
            .iter()
            .map(|dim| (*dim, dataset.values(*dim).cloned().collect()))
            .collect();
        self.year_range = dataset.year_bounds.unwrap_or((0, 0));

        // Configured names first, then the most listed manufacturers.
        let by_count = dataset.manufacturers_by_count();
        let mut picks: Vec<&String> = Vec::with_capacity(2);
        for name in self.config.default_manufacturers.iter().chain(&by_count) {
            if picks.len() == 2 {
                break;
            }
            if !picks.contains(&name) {
                picks.push(name);
            }
        }
        let compare_a = picks.first().map(|s| s.to_string()).unwrap_or_default();
        let compare_b = picks.get(1).map(|s| s.to_string()).unwrap_or_else(|| compare_a.clone());
        self.compare_a = compare_a;
        self.compare_b = compare_b;

        self.dataset = Some(dataset);
        self.status_message = None;
        self.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Current widget state as a filter spec.
    pub fn filter_spec(&self) -> FilterSpec {
        let selection = |dim: Dimension| {
            let checked = self.checked.get(&dim).cloned().unwrap_or_default();
            match self.dataset.as_ref().and_then(|ds| ds.unique_values.get(&dim)) {
                Some(all) => Selection::from_checked(&checked, all),
                None => Selection::Only(checked),
            }
        };
        FilterSpec {
            manufacturers: selection(Dimension::Manufacturer),
            conditions: selection(Dimension::Condition),
            types: selection(Dimension::Type),
            year_range: self.view.uses_year_range().then_some(self.year_range),
            include_small_manufacturers: self.include_small_manufacturers,
            small_manufacturer_threshold: self.config.small_manufacturer_threshold,
        }
    }

    /// Current widget state as a pipeline request.
    pub fn request(&self) -> ViewRequest {
        let view = match self.view {
            ViewKind::Histogram => View::Histogram {
                column: self.histogram_column,
            },
            ViewKind::Scatter => View::Scatter {
                x: NumericColumn::Odometer,
                y: NumericColumn::Price,
            },
            ViewKind::Compare => View::ManufacturerComparison {
                a: self.compare_a.clone(),
                b: self.compare_b.clone(),
                normalize: self.normalize,
            },
            ViewKind::TypesByManufacturer => View::TypesByManufacturer,
            ViewKind::ConditionByYear => View::ConditionByYear,
            ViewKind::MeanPrice => View::Summary {
                spec: AggregationSpec::mean_by(Dimension::Manufacturer, NumericColumn::Price),
            },
        };
        ViewRequest {
            filter: self.filter_spec(),
            view,
            histogram_bins: self.config.histogram_bins,
            preview_rows: self.config.preview_rows,
        }
    }

    /// Re-run the pipeline if any widget changed since the last run.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if let Some(ds) = &self.dataset {
            self.result = Some(evaluate(ds, &self.request()));
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.checked.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.mark_dirty();
    }

    /// Select all values of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            let all = ds.values(dim).cloned().collect();
            self.checked.insert(dim, all);
            self.mark_dirty();
        }
    }

    /// Deselect all values of a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.checked.insert(dim, BTreeSet::new());
        self.mark_dirty();
    }

    /// Write the chart currently shown to `path` as JSON.
    pub fn export_chart(&self, path: &Path) -> anyhow::Result<()> {
        let output = match &self.result {
            Some(Ok(output)) => output,
            _ => anyhow::bail!("no chart to export"),
        };
        output
            .chart
            .export_json(path)
            .context("exporting current chart")
    }
}
