use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// Placeholder used for empty categorical cells so they stay selectable.
pub const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Listing – one row of the vehicle table
// ---------------------------------------------------------------------------

/// One vehicle advertisement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub price: Option<f64>,
    pub model_year: Option<i32>,
    pub model: String,
    pub condition: String,
    /// Body type (`sedan`, `SUV`, `pickup`, ...). Named `type` in the file.
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub manufacturer: String,
    pub odometer: Option<f64>,
}

// ---------------------------------------------------------------------------
// Column descriptors
// ---------------------------------------------------------------------------

/// Numeric columns that can feed histograms, scatter plots and means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NumericColumn {
    Price,
    ModelYear,
    Odometer,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::Price,
        NumericColumn::ModelYear,
        NumericColumn::Odometer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Price => "price",
            NumericColumn::ModelYear => "model_year",
            NumericColumn::Odometer => "odometer",
        }
    }

    pub fn value(self, listing: &Listing) -> Option<f64> {
        match self {
            NumericColumn::Price => listing.price,
            NumericColumn::ModelYear => listing.model_year.map(f64::from),
            NumericColumn::Odometer => listing.odometer,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns usable as a grouping key.
///
/// `ModelYear` is numeric in the file but groups like a category; listings
/// with a missing year have no key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dimension {
    Manufacturer,
    Condition,
    Type,
    Model,
    ModelYear,
}

impl Dimension {
    /// Dimensions offered as multi-select filters.
    pub const FILTERABLE: [Dimension; 3] =
        [Dimension::Manufacturer, Dimension::Condition, Dimension::Type];

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Manufacturer => "manufacturer",
            Dimension::Condition => "condition",
            Dimension::Type => "type",
            Dimension::Model => "model",
            Dimension::ModelYear => "model_year",
        }
    }

    /// Categorical value of this dimension for a listing, if any.
    pub fn key(self, listing: &Listing) -> Option<String> {
        match self {
            Dimension::Manufacturer => Some(listing.manufacturer.clone()),
            Dimension::Condition => Some(listing.condition.clone()),
            Dimension::Type => Some(listing.vehicle_type.clone()),
            Dimension::Model => Some(listing.model.clone()),
            Dimension::ModelYear => listing.model_year.map(|y| y.to_string()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// ListingTable – the loaded, read-only dataset
// ---------------------------------------------------------------------------

/// All listings plus pre-computed indices for the filter widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    pub listings: Vec<Listing>,
    /// Sorted unique values for each filterable dimension.
    pub unique_values: BTreeMap<Dimension, BTreeSet<String>>,
    /// Smallest and largest model year present.
    pub year_bounds: Option<(i32, i32)>,
}

impl ListingTable {
    /// Build column indices from the loaded listings.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = Dimension::FILTERABLE
            .iter()
            .map(|dim| (*dim, BTreeSet::new()))
            .collect();
        let mut year_bounds: Option<(i32, i32)> = None;

        for listing in &listings {
            for dim in Dimension::FILTERABLE {
                if let Some(key) = dim.key(listing) {
                    unique_values.entry(dim).or_default().insert(key);
                }
            }
            if let Some(year) = listing.model_year {
                year_bounds = Some(match year_bounds {
                    Some((lo, hi)) => (lo.min(year), hi.max(year)),
                    None => (year, year),
                });
            }
        }

        ListingTable {
            listings,
            unique_values,
            year_bounds,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Unique values of a filterable dimension (empty for other dimensions).
    pub fn values(&self, dim: Dimension) -> impl Iterator<Item = &String> {
        self.unique_values.get(&dim).into_iter().flatten()
    }

    /// Listing count per manufacturer.
    pub fn manufacturer_counts(&self) -> BTreeMap<&str, usize> {
        manufacturer_counts(&self.listings)
    }

    /// Manufacturers ordered by descending listing count, ties by name.
    pub fn manufacturers_by_count(&self) -> Vec<String> {
        let mut counted: Vec<(&str, usize)> = self.manufacturer_counts().into_iter().collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counted.into_iter().map(|(name, _)| name.to_string()).collect()
    }
}

/// Listing count per manufacturer over any set of listings.
pub fn manufacturer_counts<'a, I>(listings: I) -> BTreeMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for listing in listings {
        *counts.entry(listing.manufacturer.as_str()).or_default() += 1;
    }
    counts
}
