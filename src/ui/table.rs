use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::Listing;

const HEADERS: [&str; 7] = [
    "price",
    "model_year",
    "model",
    "condition",
    "type",
    "manufacturer",
    "odometer",
];

fn cell_text(listing: &Listing, col: usize) -> String {
    let number = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_default();
    match col {
        0 => number(listing.price),
        1 => listing.model_year.map(|y| y.to_string()).unwrap_or_default(),
        2 => listing.model.clone(),
        3 => listing.condition.clone(),
        4 => listing.vehicle_type.clone(),
        5 => listing.manufacturer.clone(),
        _ => number(listing.odometer),
    }
}

/// Tabular preview of the first filtered listings.
pub fn preview_table(ui: &mut Ui, rows: &[Listing]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(20.0, |mut header| {
            for name in HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let listing = &rows[row.index()];
                for col in 0..HEADERS.len() {
                    row.col(|ui| {
                        ui.label(cell_text(listing, col));
                    });
                }
            });
        });
}
