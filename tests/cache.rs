mod common;

use std::sync::Arc;

use common::{csv, row, TestWorkspace};
use vehicle_dash::data::cache::DatasetCache;
use vehicle_dash::error::DashboardError;

fn one_row(price: &str) -> String {
    csv(&[row(price, "2015", "kia soul", "good", "1000", "hatchback", "kia")])
}

#[test]
fn repeated_loads_share_one_table() {
    let ws = TestWorkspace::new();
    let path = ws.write("v.csv", &one_row("100"));
    let cache = DatasetCache::new();

    let first = cache.get_or_load(&path).expect("load");
    // Changing the file does not matter until the entry is invalidated.
    ws.write("v.csv", &one_row("200"));
    let second = cache.get_or_load(&path).expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.listings[0].price, Some(100.0));

    assert!(cache.invalidate(&path));
    let third = cache.get_or_load(&path).expect("reload");
    assert_eq!(third.listings[0].price, Some(200.0));
    // Old handles still see the old table in full.
    assert_eq!(first.listings[0].price, Some(100.0));
}

#[test]
fn reload_replaces_and_failed_reload_keeps_old_table() {
    let ws = TestWorkspace::new();
    let path = ws.write("v.csv", &one_row("100"));
    let cache = DatasetCache::new();
    cache.get_or_load(&path).expect("load");

    ws.write("v.csv", &one_row("300"));
    let reloaded = cache.reload(&path).expect("reload");
    assert_eq!(reloaded.listings[0].price, Some(300.0));

    ws.write("v.csv", &csv(&[]));
    assert!(matches!(
        cache.reload(&path),
        Err(DashboardError::EmptyDataset { .. })
    ));
    let still = cache.get_or_load(&path).expect("cached");
    assert_eq!(still.listings[0].price, Some(300.0));
}

#[test]
fn failed_loads_are_not_cached() {
    let ws = TestWorkspace::new();
    let path = ws.path().join("later.csv");
    let cache = DatasetCache::new();
    assert!(cache.get_or_load(&path).is_err());
    assert!(!cache.contains(&path));

    ws.write("later.csv", &one_row("100"));
    assert!(cache.get_or_load(&path).is_ok());
    cache.clear();
    assert!(!cache.contains(&path));
}
