/// Data layer: listing types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///   vehicles_us.csv
///        │
///        ▼
///   ┌──────────┐      ┌───────┐
///   │  loader   │ ◄── │ cache │  one Arc<ListingTable> per source path
///   └──────────┘      └───────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ListingTable │  Vec<Listing>, unique values, year bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec predicates → subset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────────────┐
///   │ aggregate / histogram / pivot │  summaries for the chart adapter
///   └─────────────────────────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod histogram;
pub mod loader;
pub mod model;
pub mod pivot;
