use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{Dimension, ListingTable, NumericColumn};
use crate::error::DashboardError;
use crate::state::{AppState, ViewKind};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => Arc::clone(ds),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-dimension multi-selects (collapsible) ----
            for dim in Dimension::FILTERABLE {
                let n_total = dataset.values(dim).count();
                let n_selected = state.checked.get(&dim).map_or(0, |s| s.len());
                let header_text = format!("{dim}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.name())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in dataset.values(dim) {
                            let mut checked = state
                                .checked
                                .get(&dim)
                                .is_some_and(|s| s.contains(val));
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
            }
            ui.separator();

            let threshold = state.config.small_manufacturer_threshold;
            if ui
                .checkbox(
                    &mut state.include_small_manufacturers,
                    format!("Include manufacturers with < {threshold} listings"),
                )
                .changed()
            {
                state.mark_dirty();
            }
            ui.separator();

            view_controls(ui, state, &dataset);
        });
}

/// Widgets that only matter for the active view.
fn view_controls(ui: &mut Ui, state: &mut AppState, dataset: &ListingTable) {
    match state.view {
        ViewKind::Histogram => {
            ui.strong("Column");
            let before = state.histogram_column;
            egui::ComboBox::from_id_salt("histogram_column")
                .selected_text(state.histogram_column.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for col in NumericColumn::ALL {
                        ui.selectable_value(&mut state.histogram_column, col, col.name());
                    }
                });
            if state.histogram_column != before {
                state.mark_dirty();
            }
        }
        ViewKind::Compare => {
            let manufacturers: Vec<String> =
                dataset.values(Dimension::Manufacturer).cloned().collect();
            let mut changed = false;
            for (label, current) in [
                ("Manufacturer A", &mut state.compare_a),
                ("Manufacturer B", &mut state.compare_b),
            ] {
                ui.strong(label);
                egui::ComboBox::from_id_salt(label)
                    .selected_text(current.as_str())
                    .show_ui(ui, |ui: &mut Ui| {
                        for name in &manufacturers {
                            let selected = current.as_str() == name.as_str();
                            if ui.selectable_label(selected, name.as_str()).clicked() {
                                *current = name.clone();
                                changed = true;
                            }
                        }
                    });
            }
            changed |= ui
                .checkbox(&mut state.normalize, "Normalize histograms")
                .changed();
            if changed {
                state.mark_dirty();
            }
        }
        ViewKind::ConditionByYear => {
            let Some((lo, hi)) = dataset.year_bounds else {
                ui.label("No model years in this dataset.");
                return;
            };
            ui.strong("Model years");
            let (mut from, mut to) = state.year_range;
            let from_changed = ui
                .add(egui::Slider::new(&mut from, lo..=hi).text("from"))
                .changed();
            let to_changed = ui
                .add(egui::Slider::new(&mut to, lo..=hi).text("to"))
                .changed();
            if from_changed || to_changed {
                // Drag the other end along so the range stays ordered.
                if from > to {
                    if from_changed {
                        to = from;
                    } else {
                        from = to;
                    }
                }
                state.year_range = (from, to);
                state.mark_dirty();
            }
        }
        ViewKind::Scatter | ViewKind::TypesByManufacturer | ViewKind::MeanPrice => {}
    }
}

// ---------------------------------------------------------------------------
// Central panel – view tabs, metrics, chart and preview
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            let text = match &state.status_message {
                Some(msg) => RichText::new(msg).color(Color32::RED),
                None => RichText::new("Open a data file  (File → Open…)"),
            };
            ui.heading(text);
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        for kind in ViewKind::ALL {
            if ui.selectable_value(&mut state.view, kind, kind.label()).changed() {
                state.mark_dirty();
            }
        }
    });
    ui.separator();

    match &state.result {
        None => {
            ui.spinner();
        }
        Some(Err(err)) => {
            let text = match err {
                DashboardError::EmptySelection { .. } => format!("Please {err}."),
                DashboardError::NoMatchingRows => "No data for the current selection.".to_string(),
                DashboardError::NoModelYears => "This dataset has no model years.".to_string(),
                other => format!("Error: {other}"),
            };
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(RichText::new(text).color(Color32::YELLOW));
            });
        }
        Some(Ok(output)) => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new(format!("{} listings", output.metrics.rows)).strong());
                ui.separator();
                ui.label(format!("Mean price: {}", output.metrics.mean_price_text()));
                ui.separator();
                ui.label(format!("Models: {}", output.metrics.distinct_models));
            });

            egui::CollapsingHeader::new("Preview")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
                        ui.set_max_height(240.0);
                        table::preview_table(ui, &output.preview);
                    });
                });

            plot::chart_plot(ui, &output.chart);
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Export chart…").clicked() {
                export_chart_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded from {}",
                ds.len(),
                state.data_path.display()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

fn export_chart_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart specification")
        .add_filter("JSON", &["json"])
        .set_file_name("chart.json")
        .save_file();

    if let Some(path) = file {
        match state.export_chart(&path) {
            Ok(()) => {
                log::info!("Exported chart to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export chart: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
