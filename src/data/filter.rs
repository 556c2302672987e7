use std::collections::BTreeSet;

use super::model::{manufacturer_counts, Dimension, Listing, ListingTable};
use crate::error::{DashboardError, Result};

/// Default minimum listing count for a manufacturer to be kept when small
/// manufacturers are excluded.
pub const DEFAULT_SMALL_MANUFACTURER_THRESHOLD: usize = 1000;

// ---------------------------------------------------------------------------
// Selection – membership predicate for one categorical column
// ---------------------------------------------------------------------------

/// Selected values of a multi-select widget.
///
/// `All` keeps every row. `Only` keeps rows whose value is in the set; an
/// empty `Only` set is an empty selection and is rejected by
/// [`FilterSpec::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Only(set) if set.is_empty())
    }

    /// Collapse an explicit set back to `All` when it covers every value.
    pub fn from_checked(checked: &BTreeSet<String>, all: &BTreeSet<String>) -> Self {
        if !all.is_empty() && checked.is_superset(all) {
            Selection::All
        } else {
            Selection::Only(checked.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// Predicates narrowing the listing table; rows must satisfy all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub manufacturers: Selection,
    pub conditions: Selection,
    pub types: Selection,
    /// Inclusive model year range. Rows with a missing year are dropped when
    /// this is set.
    pub year_range: Option<(i32, i32)>,
    pub include_small_manufacturers: bool,
    pub small_manufacturer_threshold: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            manufacturers: Selection::All,
            conditions: Selection::All,
            types: Selection::All,
            year_range: None,
            include_small_manufacturers: true,
            small_manufacturer_threshold: DEFAULT_SMALL_MANUFACTURER_THRESHOLD,
        }
    }
}

impl FilterSpec {
    /// Reject specs where a multi-select has been cleared.
    pub fn validate(&self) -> Result<()> {
        for (dim, selection) in [
            (Dimension::Manufacturer, &self.manufacturers),
            (Dimension::Condition, &self.conditions),
            (Dimension::Type, &self.types),
        ] {
            if selection.is_empty() {
                return Err(DashboardError::EmptySelection {
                    dimension: dim.name(),
                });
            }
        }
        Ok(())
    }

    fn matches_row(&self, listing: &Listing) -> bool {
        self.manufacturers.contains(&listing.manufacturer)
            && self.conditions.contains(&listing.condition)
            && self.types.contains(&listing.vehicle_type)
            && self.matches_year(listing)
    }

    fn matches_year(&self, listing: &Listing) -> bool {
        match (self.year_range, listing.model_year) {
            (None, _) => true,
            (Some((lo, hi)), Some(year)) => lo <= year && year <= hi,
            (Some(_), None) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of listings that pass every predicate of `spec`.
///
/// The small-manufacturer threshold is applied last, counting rows that
/// already pass the other predicates. Because a kept manufacturer keeps all
/// of its counted rows, filtering the result again changes nothing.
pub fn filtered_indices(listings: &[Listing], spec: &FilterSpec) -> Vec<usize> {
    let mut indices: Vec<usize> = listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| spec.matches_row(listing))
        .map(|(i, _)| i)
        .collect();

    if !spec.include_small_manufacturers {
        let large: BTreeSet<&str> = manufacturer_counts(indices.iter().map(|&i| &listings[i]))
            .into_iter()
            .filter(|(_, count)| *count >= spec.small_manufacturer_threshold)
            .map(|(name, _)| name)
            .collect();
        indices.retain(|&i| large.contains(listings[i].manufacturer.as_str()));
    }

    indices
}

/// Subset of `table` matching `spec`. An empty result is not an error.
pub fn filter(table: &ListingTable, spec: &FilterSpec) -> ListingTable {
    let listings = filtered_indices(&table.listings, spec)
        .into_iter()
        .map(|i| table.listings[i].clone())
        .collect();
    ListingTable::from_listings(listings)
}
