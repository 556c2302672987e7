mod common;

use common::{csv, row, TestWorkspace};
use vehicle_dash::data::loader::{check_columns, load_file};
use vehicle_dash::data::model::{Dimension, UNKNOWN};
use vehicle_dash::error::DashboardError;

#[test]
fn loads_listings_and_ignores_extra_columns() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "vehicles_us.csv",
        &csv(&[
            row("9400", "2011.0", "bmw x5", "good", "145000.0", "SUV", "bmw"),
            row("25500", "", "ford f-150", "good", "88705.0", "pickup", "ford"),
            row("5500", "2013.0", "hyundai sonata", "like new", "", "sedan", "hyundai"),
        ]),
    );

    let table = load_file(&path).expect("load");
    assert_eq!(table.len(), 3);

    let first = &table.listings[0];
    assert_eq!(first.price, Some(9400.0));
    assert_eq!(first.model_year, Some(2011));
    assert_eq!(first.odometer, Some(145_000.0));
    assert_eq!(first.vehicle_type, "SUV");

    assert_eq!(table.listings[1].model_year, None);
    assert_eq!(table.listings[2].odometer, None);
    assert_eq!(table.year_bounds, Some((2011, 2013)));
    assert_eq!(table.values(Dimension::Condition).count(), 2);
}

#[test]
fn missing_file_is_source_not_found() {
    let ws = TestWorkspace::new();
    let err = load_file(&ws.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::SourceNotFound { .. }));
    assert!(err.is_terminal_for_session());
}

#[test]
fn header_only_file_is_empty_dataset() {
    let ws = TestWorkspace::new();
    let path = ws.write("empty.csv", &csv(&[]));
    assert!(matches!(
        load_file(&path),
        Err(DashboardError::EmptyDataset { .. })
    ));
}

#[test]
fn missing_required_column_is_reported() {
    let ws = TestWorkspace::new();
    let path = ws.write("partial.csv", "price,model,condition\n100,ford focus,good\n");
    match load_file(&path) {
        Err(DashboardError::MissingColumns { columns, .. }) => {
            assert_eq!(columns, ["model_year", "type", "odometer"]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn manufacturer_is_derived_from_model_when_column_absent() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "no_maker.csv",
        "price,model_year,model,condition,odometer,type\n\
         9400,2011,bmw x5,good,145000,SUV\n\
         25500,2009,ford f-150,,88705,pickup\n",
    );
    let table = load_file(&path).expect("load");
    let makers: Vec<&str> = table
        .listings
        .iter()
        .map(|l| l.manufacturer.as_str())
        .collect();
    assert_eq!(makers, ["bmw", "ford"]);
    assert_eq!(table.listings[1].condition, UNKNOWN);

    let report = check_columns(&path).expect("report");
    assert!(report.missing().is_empty());
    assert!(report.required.contains(&("manufacturer", false)));
}

#[test]
fn manufacturer_names_are_case_folded_like_derived_ones() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "mixed_case.csv",
        &csv(&[
            row("9400", "2011", "Ford focus", "good", "1000", "sedan", "Ford"),
            row("8000", "2012", "ford fiesta", "good", "2000", "sedan", "ford"),
            row("7000", "2013", "Kia rio", "fair", "3000", "sedan", ""),
        ]),
    );
    let table = load_file(&path).expect("load");
    let makers: Vec<&str> = table
        .values(Dimension::Manufacturer)
        .map(String::as_str)
        .collect();
    assert_eq!(makers, ["ford", UNKNOWN]);
    assert_eq!(table.manufacturer_counts().get("ford"), Some(&2));
}

#[test]
fn malformed_csv_surfaces_as_csv_error() {
    let ws = TestWorkspace::new();
    let mut bytes = common::HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(b"\n\xff\xfe,2011,x,good,6,gas,1,a,SUV,w,1,d,1,bmw\n");
    let path = ws.path().join("bad.csv");
    std::fs::write(&path, bytes).expect("write");
    assert!(matches!(load_file(&path), Err(DashboardError::Csv { .. })));
}
