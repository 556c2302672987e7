use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use crate::chart::{ChartKind, ChartSpec, SeriesData};
use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// Chart rendering (central panel)
// ---------------------------------------------------------------------------

/// Draw a chart specification with egui_plot.
pub fn chart_plot(ui: &mut Ui, chart: &ChartSpec) {
    ui.heading(&chart.title);

    let colors = SeriesColors::for_chart(chart);
    let categories: Vec<String> = chart
        .category_labels()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut plot = Plot::new("chart_plot")
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if chart.kind == ChartKind::StackedBar {
        plot = plot.x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_tick(&categories, mark.value)
        });
    }

    plot.show(ui, |plot_ui| match chart.kind {
        ChartKind::Histogram => {
            for (idx, series) in chart.series.iter().enumerate() {
                let SeriesData::Buckets(bins) = &series.data else {
                    continue;
                };
                let bars: Vec<Bar> = bins
                    .iter()
                    .map(|b| Bar::new(b.center(), b.value).width(b.width()))
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&series.name)
                        .color(colors.translucent_at(idx)),
                );
            }
        }
        ChartKind::Scatter => {
            for (idx, series) in chart.series.iter().enumerate() {
                let SeriesData::Points(points) = &series.data else {
                    continue;
                };
                let points: PlotPoints = points.iter().copied().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(colors.translucent_at(idx))
                        .radius(2.0),
                );
            }
        }
        ChartKind::StackedBar => {
            let mut stacked: Vec<BarChart> = Vec::with_capacity(chart.series.len());
            for (idx, series) in chart.series.iter().enumerate() {
                let SeriesData::Categories(values) = &series.data else {
                    continue;
                };
                let bars: Vec<Bar> = values
                    .iter()
                    .enumerate()
                    .map(|(i, (label, v))| Bar::new(i as f64, *v).width(0.7).name(label))
                    .collect();
                let below: Vec<&BarChart> = stacked.iter().collect();
                let bar_chart = BarChart::new(bars)
                    .name(&series.name)
                    .color(colors.color_at(idx))
                    .stack_on(&below);
                stacked.push(bar_chart);
            }
            for bar_chart in stacked {
                plot_ui.bar_chart(bar_chart);
            }
        }
    });
}

/// Tick label for a bar position: the category name on whole positions.
fn category_tick(categories: &[String], value: f64) -> String {
    if value.fract().abs() > f64::EPSILON || value < 0.0 {
        return String::new();
    }
    categories
        .get(value as usize)
        .cloned()
        .unwrap_or_default()
}
