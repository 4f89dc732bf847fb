// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Choropleth maps: features filled by the value of their matching data row.

use core::fmt;
use std::sync::Arc;

use peniko::Color;
use serde::Deserialize;
use vistage_charts::color::de_colors;
use vistage_charts::{
    LegendItem, ScaleSequential, ScaleThreshold, ValueFormatter, equal_interval_thresholds,
};

use crate::map::{MapFrame, MapInput, MapOptions, MapScaffold};

/// Default sequential palette, light to dark.
pub const DEFAULT_SCHEME: [Color; 5] = [
    Color::from_rgb8(0xd6, 0xe9, 0xf5),
    Color::from_rgb8(0x9f, 0xc7, 0xe3),
    Color::from_rgb8(0x5c, 0x9d, 0xcc),
    Color::from_rgb8(0x20, 0x60, 0x95),
    Color::from_rgb8(0x00, 0x3c, 0x57),
];

/// How values become colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScaleKind {
    /// Discrete bins split at `thresholds`.
    #[default]
    Threshold,
    /// Continuous interpolation through `colors` over the data range.
    Sequential,
}

/// A caller-supplied value to color function.
#[derive(Clone)]
pub struct CustomColor(Arc<dyn Fn(f64) -> Color + Send + Sync>);

impl CustomColor {
    /// Wraps `f`.
    pub fn new(f: impl Fn(f64) -> Color + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for CustomColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomColor(..)")
    }
}

/// Choropleth props.
///
/// ```
/// use vistage_geo::ChoroplethOptions;
///
/// let options = ChoroplethOptions::from_json(r##"{
///     "featureIdPath": "properties.iso",
///     "dataKeyField": "code",
///     "thresholds": [100, 300, 700],
///     "colors": ["#eeeeee", "#bbbbbb", "#888888", "#444444"]
/// }"##).unwrap();
/// assert_eq!(options.map.feature_id_path, "properties.iso");
/// assert_eq!(options.colors.len(), 4);
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoroplethOptions {
    /// Shared map props.
    #[serde(flatten)]
    pub map: MapOptions,
    /// Scale kind.
    pub color_scale: ColorScaleKind,
    /// Threshold breaks; empty derives equal-interval breaks from the data.
    pub thresholds: Vec<f64>,
    /// Bin colors, or sequential stops.
    #[serde(deserialize_with = "de_colors")]
    pub colors: Vec<Color>,
    /// Bin count for derived breaks.
    pub bins: usize,
    /// Overrides both scale kinds.
    #[serde(skip)]
    pub custom_color: Option<CustomColor>,
}

impl Default for ChoroplethOptions {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            color_scale: ColorScaleKind::default(),
            thresholds: Vec::new(),
            colors: DEFAULT_SCHEME.to_vec(),
            bins: 5,
            custom_color: None,
        }
    }
}

impl ChoroplethOptions {
    /// Parses camelCase JSON props.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the shared map props.
    pub fn with_map(mut self, map: MapOptions) -> Self {
        self.map = map;
        self
    }

    /// Sets the scale kind.
    pub fn with_color_scale(mut self, kind: ColorScaleKind) -> Self {
        self.color_scale = kind;
        self
    }

    /// Sets explicit threshold breaks.
    pub fn with_thresholds(mut self, thresholds: impl IntoIterator<Item = f64>) -> Self {
        self.thresholds = thresholds.into_iter().collect();
        self
    }

    /// Sets the colors.
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Sets the derived bin count.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins.max(1);
        self
    }

    /// Colors features with `f` instead of a scale.
    pub fn with_custom_color(mut self, f: impl Fn(f64) -> Color + Send + Sync + 'static) -> Self {
        self.custom_color = Some(CustomColor::new(f));
        self
    }
}

/// A resolved value to color mapping.
#[derive(Clone, Debug)]
pub enum Colorer {
    /// Discrete bins.
    Threshold(ScaleThreshold<Color>),
    /// Continuous.
    Sequential(ScaleSequential),
    /// Caller-supplied.
    Custom(CustomColor),
}

impl Colorer {
    /// Resolves the scale for the values present in the data.
    pub fn new(options: &ChoroplethOptions, values: &[f64]) -> Self {
        if let Some(custom) = &options.custom_color {
            return Self::Custom(custom.clone());
        }
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let colors = if options.colors.is_empty() {
            DEFAULT_SCHEME.to_vec()
        } else {
            options.colors.clone()
        };
        match options.color_scale {
            ColorScaleKind::Sequential => {
                let domain = if min <= max { (min, max) } else { (0.0, 1.0) };
                Self::Sequential(ScaleSequential::new(domain, colors))
            }
            ColorScaleKind::Threshold => {
                let thresholds = if options.thresholds.is_empty() {
                    equal_interval_thresholds(min, max, options.bins)
                } else {
                    options.thresholds.clone()
                };
                let range = bin_colors(&colors, thresholds.len() + 1);
                Self::Threshold(ScaleThreshold::new(thresholds, range))
            }
        }
    }

    /// Color of `value`.
    pub fn color(&self, value: f64) -> Option<Color> {
        match self {
            Self::Threshold(scale) => scale.map(value).copied(),
            Self::Sequential(scale) => scale.map(value),
            Self::Custom(CustomColor(f)) => value.is_finite().then(|| f(value)),
        }
    }

    /// Legend entries describing the scale.
    pub fn legend(&self, format: &ValueFormatter) -> Vec<LegendItem> {
        match self {
            Self::Threshold(scale) => {
                let t = scale.domain();
                if t.is_empty() {
                    return Vec::new();
                }
                scale
                    .range()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let label = match i {
                            0 => format!("< {}", format.format(t[0])),
                            i if i == t.len() => format!(">= {}", format.format(t[i - 1])),
                            i => format!("{}-{}", format.format(t[i - 1]), format.format(t[i])),
                        };
                        LegendItem::solid(label, *c).with_key(format!("bin-{i}"))
                    })
                    .collect()
            }
            Self::Sequential(scale) => {
                let (d0, d1) = scale.domain();
                let steps = 5;
                (0..steps)
                    .filter_map(|i| {
                        let v = d0 + (d1 - d0) * i as f64 / (steps - 1) as f64;
                        let c = scale.map(v)?;
                        Some(LegendItem::solid(format.format(v), c).with_key(format!("stop-{i}")))
                    })
                    .collect()
            }
            Self::Custom(_) => Vec::new(),
        }
    }
}

/// `n` colors: `colors` itself when the counts agree, else samples along it.
fn bin_colors(colors: &[Color], n: usize) -> Vec<Color> {
    if colors.len() == n || n == 0 {
        return colors.to_vec();
    }
    let ramp = ScaleSequential::new((0.0, (n.max(2) - 1) as f64), colors.to_vec());
    (0..n)
        .filter_map(|i| ramp.map(i as f64))
        .collect()
}

/// A choropleth map.
#[derive(Clone, Debug, Default)]
pub struct ChoroplethMap {
    /// Props.
    pub options: ChoroplethOptions,
}

impl ChoroplethMap {
    /// A choropleth with `options`.
    pub fn new(options: ChoroplethOptions) -> Self {
        Self { options }
    }

    /// Colors every matched feature; unmatched features get the missing color.
    pub fn layout(&self, input: &MapInput<'_>) -> MapFrame {
        let o = &self.options;
        let values: Vec<f64> = input
            .rows
            .iter()
            .filter_map(|r| r.number(&o.map.value_field))
            .collect();
        let colorer = Colorer::new(o, &values);
        let mut scaffold = MapScaffold::build(input, &o.map, colorer.legend(&o.map.value_format));
        for f in &mut scaffold.features {
            if let Some(c) = f.value.and_then(|v| colorer.color(v)) {
                f.fill = c;
            }
        }
        scaffold.finish(input, &o.map, Vec::new(), Color::TRANSPARENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: [Color; 4] = [
        Color::from_rgb8(1, 0, 0),
        Color::from_rgb8(2, 0, 0),
        Color::from_rgb8(3, 0, 0),
        Color::from_rgb8(4, 0, 0),
    ];

    fn threshold(thresholds: &[f64]) -> Colorer {
        let options = ChoroplethOptions::default()
            .with_thresholds(thresholds.iter().copied())
            .with_colors(C);
        Colorer::new(&options, &[])
    }

    #[test]
    fn threshold_bins_follow_their_breaks() {
        let c = threshold(&[100.0, 300.0, 700.0]);
        assert_eq!(c.color(150.0), Some(C[1]));
        assert_eq!(c.color(99.0), Some(C[0]));
        assert_eq!(c.color(300.0), Some(C[2]), "a break belongs to the upper bin");
        assert_eq!(c.color(10_000.0), Some(C[3]));
        assert_eq!(c.color(f64::NAN), None);
    }

    #[test]
    fn threshold_legend_names_each_bin() {
        let labels: Vec<_> = threshold(&[100.0, 300.0, 700.0])
            .legend(&ValueFormatter::Default)
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(labels, ["< 100", "100-300", "300-700", ">= 700"]);
    }

    #[test]
    fn derived_breaks_split_the_data_range_evenly() {
        let options = ChoroplethOptions::default().with_bins(4);
        let c = Colorer::new(&options, &[0.0, 40.0, 100.0]);
        match &c {
            Colorer::Threshold(s) => {
                assert_eq!(s.domain(), [25.0, 50.0, 75.0]);
                assert_eq!(s.range().len(), 4);
                assert_eq!(s.range()[0], DEFAULT_SCHEME[0]);
                assert_eq!(s.range()[3], DEFAULT_SCHEME[4]);
            }
            other => panic!("expected a threshold scale, got {other:?}"),
        }
    }

    #[test]
    fn custom_colors_win_over_scales() {
        let red = Color::from_rgb8(0xff, 0, 0);
        let options = ChoroplethOptions::default()
            .with_color_scale(ColorScaleKind::Sequential)
            .with_custom_color(move |v| if v > 1.0 { red } else { Color::BLACK });
        let c = Colorer::new(&options, &[0.0, 2.0]);
        assert_eq!(c.color(2.0), Some(red));
        assert!(c.legend(&ValueFormatter::Default).is_empty());
    }

    #[test]
    fn sequential_interpolates_across_the_extent() {
        let options = ChoroplethOptions::default()
            .with_color_scale(ColorScaleKind::Sequential)
            .with_colors([Color::BLACK, Color::WHITE]);
        let c = Colorer::new(&options, &[10.0, 20.0]);
        assert_eq!(c.color(10.0), Some(Color::BLACK));
        assert_eq!(c.color(25.0), Some(Color::WHITE));
        assert_eq!(c.legend(&ValueFormatter::Default).len(), 5);
    }
}
