use std::io;
use std::path::Path;

use log::{debug, info};

use super::model::{Listing, ListingTable, UNKNOWN};
use crate::error::{DashboardError, Result};

/// Columns the dashboard reads. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "price",
    "model_year",
    "model",
    "condition",
    "type",
    "manufacturer",
    "odometer",
];

/// Columns that may be absent because they can be derived from others.
const DERIVABLE_COLUMNS: [&str; 1] = ["manufacturer"];

// ---------------------------------------------------------------------------
// Column check
// ---------------------------------------------------------------------------

/// Which columns a file carries and whether each required one is among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReport {
    pub present: Vec<String>,
    pub required: Vec<(&'static str, bool)>,
}

impl ColumnReport {
    fn from_headers(headers: &[String]) -> Self {
        let required = REQUIRED_COLUMNS
            .iter()
            .map(|&col| (col, headers.iter().any(|h| h == col)))
            .collect();
        ColumnReport {
            present: headers.to_vec(),
            required,
        }
    }

    /// Required columns that are absent and cannot be derived.
    pub fn missing(&self) -> Vec<String> {
        self.required
            .iter()
            .filter(|(col, present)| !present && !DERIVABLE_COLUMNS.contains(col))
            .map(|(col, _)| col.to_string())
            .collect()
    }

    /// Human-readable listing, one column per line.
    pub fn render(&self) -> String {
        let mut out = String::from("Columns in file:\n");
        for col in &self.present {
            out.push_str(&format!("  - {col}\n"));
        }
        out.push_str("Required columns:\n");
        for (col, present) in &self.required {
            let mark = if *present { "yes" } else { "NO " };
            out.push_str(&format!("  [{mark}] {col}\n"));
        }
        out
    }
}

/// Read only the header row of `path` and report on its columns.
pub fn check_columns(path: &Path) -> Result<ColumnReport> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;
    Ok(ColumnReport::from_headers(&headers))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the listing table from a comma-delimited file with a header row.
///
/// Fails with `SourceNotFound` when the path does not exist and with
/// `EmptyDataset` when the file has a header but no rows.
pub fn load_file(path: &Path) -> Result<ListingTable> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;
    let report = ColumnReport::from_headers(&headers);

    let missing = report.missing();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let idx = ColumnIndex::new(&headers);
    if idx.manufacturer.is_none() {
        info!("{}: no manufacturer column, deriving it from model", path.display());
    }

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|source| DashboardError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let listing = idx.listing(&record);
        if row_no < 3 {
            debug!("row {row_no}: {listing:?}");
        }
        listings.push(listing);
    }

    if listings.is_empty() {
        return Err(DashboardError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }

    let table = ListingTable::from_listings(listings);
    info!(
        "Loaded {} listings from {} ({} manufacturers)",
        table.len(),
        path.display(),
        table.manufacturer_counts().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV helpers
// ---------------------------------------------------------------------------

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DashboardError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => DashboardError::Io(e),
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn read_headers<R: io::Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>> {
    let headers = reader.headers().map_err(|source| DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect())
}

/// Header positions of the columns the loader reads.
struct ColumnIndex {
    price: Option<usize>,
    model_year: Option<usize>,
    model: Option<usize>,
    condition: Option<usize>,
    vehicle_type: Option<usize>,
    manufacturer: Option<usize>,
    odometer: Option<usize>,
}

impl ColumnIndex {
    fn new(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        ColumnIndex {
            price: find("price"),
            model_year: find("model_year"),
            model: find("model"),
            condition: find("condition"),
            vehicle_type: find("type"),
            manufacturer: find("manufacturer"),
            odometer: find("odometer"),
        }
    }

    fn listing(&self, record: &csv::StringRecord) -> Listing {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let model = categorical(cell(self.model));
        let manufacturer = match self.manufacturer {
            Some(_) => categorical(cell(self.manufacturer)).to_lowercase(),
            None => manufacturer_from_model(&model),
        };

        Listing {
            price: parse_non_negative(cell(self.price)),
            model_year: parse_year(cell(self.model_year)),
            model,
            condition: categorical(cell(self.condition)),
            vehicle_type: categorical(cell(self.vehicle_type)),
            manufacturer,
            odometer: parse_non_negative(cell(self.odometer)),
        }
    }
}

fn categorical(s: &str) -> String {
    if s.is_empty() {
        UNKNOWN.to_string()
    } else {
        s.to_string()
    }
}

/// First whitespace-separated token of the model name (`"ford f-150"` → `"ford"`).
pub fn manufacturer_from_model(model: &str) -> String {
    model
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_non_negative(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Years are sometimes written as floats (`2011.0`) by dataframe exports.
fn parse_year(s: &str) -> Option<i32> {
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < f64::from(i32::MAX))
        .map(|v| v as i32)
}
