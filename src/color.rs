use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            to_color32(Hsl::new(hue, 0.75, 0.55).into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Country colours: country name → Color32
// ---------------------------------------------------------------------------

/// Assigns each country a stable colour from the evenly spaced palette.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over the full, sorted country list so a country
    /// keeps its colour whichever pair is selected.
    pub fn new(countries: &[String]) -> Self {
        let palette = generate_palette(countries.len());
        let mapping = countries.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping
            .get(country)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

fn linear(c: (f32, f32, f32)) -> LinSrgb {
    Srgb::new(c.0, c.1, c.2).into_linear()
}

/// Diverging blue → grey → red scale for a coefficient in `[-1, 1]`.
/// NaN maps to a flat grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::from_gray(90);
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        linear(NEUTRAL).mix(linear(COOL), -t)
    } else {
        linear(NEUTRAL).mix(linear(WARM), t)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Sequential purple → yellow ramp for `value` within `[min, max]`.
pub fn sequential(value: f64, min: f64, max: f64) -> Color32 {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0) as f32
    } else {
        0.5
    };
    let hue = 270.0 - 210.0 * t;
    to_color32(Hsl::new(hue, 0.70, 0.35 + 0.25 * t).into_color())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length_and_distinct_colours() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn country_colours_are_stable_and_default_for_unknown() {
        let countries = vec!["Chile".to_string(), "Peru".to_string()];
        let cm = ColorMap::new(&countries);
        assert_eq!(cm.color_for("Chile"), ColorMap::new(&countries).color_for("Chile"));
        assert_ne!(cm.color_for("Chile"), cm.color_for("Peru"));
        assert_eq!(cm.color_for("Atlantis"), Color32::LIGHT_BLUE);
    }

    #[test]
    fn diverging_scale_runs_blue_to_red() {
        let low = diverging(-1.0);
        let high = diverging(1.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        assert_eq!(diverging(f64::NAN), Color32::from_gray(90));
    }

    #[test]
    fn sequential_scale_tolerates_flat_range() {
        assert_eq!(sequential(3.0, 3.0, 3.0), sequential(0.0, 1.0, 1.0));
    }
}
