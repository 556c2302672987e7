use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::chart::ChartSpec;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series position → Color32
// ---------------------------------------------------------------------------

/// Assigns each series of a chart its own colour.
///
/// Colours are keyed by series position, so two series sharing a name (a
/// manufacturer compared with itself) still get distinct colours.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    colors: Vec<Color32>,
    default_color: Color32,
}

impl SeriesColors {
    pub fn for_chart(chart: &ChartSpec) -> Self {
        SeriesColors {
            colors: generate_palette(chart.series.len()),
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Colour of the series at `index`.
    pub fn color_at(&self, index: usize) -> Color32 {
        self.colors.get(index).copied().unwrap_or(self.default_color)
    }

    /// Same colour with reduced opacity, for overlapping histograms.
    pub fn translucent_at(&self, index: usize) -> Color32 {
        self.color_at(index).gamma_multiply(0.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, Series, SeriesData};

    fn chart(names: &[&str]) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::StackedBar,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series: names
                .iter()
                .map(|n| Series {
                    name: n.to_string(),
                    data: SeriesData::Categories(Vec::new()),
                })
                .collect(),
        }
    }

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn duplicate_series_names_keep_distinct_colours() {
        let colors = SeriesColors::for_chart(&chart(&["kia", "kia"]));
        assert_ne!(colors.color_at(0), colors.color_at(1));
        assert_eq!(colors.color_at(9), Color32::LIGHT_BLUE);
    }
}
