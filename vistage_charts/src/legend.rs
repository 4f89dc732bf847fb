// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend mark generation.
//!
//! A "swatches + labels" legend that flows left to right and wraps at a maximum width.
//! Every entry has a key and a hit-testable rectangle so hosts can drive series
//! highlighting from legend hover.

use kurbo::{Point, Rect};
use peniko::{Brush, Color};
use vistage_core::{Mark, MarkId, MarkState, TextAnchor, TextBaseline};

use crate::color;
use crate::layout::Size;
use crate::measure::TextMeasurer;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// A legend entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    /// Series key reported on hit.
    pub key: String,
    /// The label string shown next to the swatch.
    pub label: String,
    /// The swatch fill paint.
    pub fill: Brush,
    /// Interaction state (highlighted/dimmed with its series).
    pub state: MarkState,
}

impl LegendItem {
    /// An entry whose key is its label, with a solid swatch.
    pub fn solid(label: impl Into<String>, color: Color) -> Self {
        let label = label.into();
        Self {
            key: label.clone(),
            label,
            fill: Brush::Solid(color),
            state: MarkState::default(),
        }
    }

    /// Sets a key distinct from the label.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the interaction state.
    pub fn with_state(mut self, state: MarkState) -> Self {
        self.state = state;
        self
    }
}

/// A positioned, hit-testable legend entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Index into [`LegendSwatchesSpec::items`].
    pub index: usize,
    /// Series key.
    pub key: String,
    /// Swatch plus label bounds.
    pub rect: Rect,
}

struct Placed {
    swatch: Rect,
    label: Point,
    entry: Rect,
}

/// An unpositioned legend specification (swatches + labels).
///
/// Use this with a measure/arrange layout pass:
/// - Measure: call [`LegendSwatchesSpec::measure`] to get a desired size.
/// - Arrange: call [`LegendSwatchesSpec::marks`] and [`LegendSwatchesSpec::entries`] once
///   you know the origin.
#[derive(Clone, Debug)]
pub struct LegendSwatchesSpec {
    /// Stable-id base; each generated mark uses a deterministic offset from this base.
    pub id_base: u64,
    /// Swatch square size.
    pub swatch_size: f64,
    /// Horizontal gap between swatch and label.
    pub label_dx: f64,
    /// Horizontal gap between entries.
    pub item_gap: f64,
    /// Vertical gap between wrapped rows.
    pub row_gap: f64,
    /// Entries wrap onto a new row past this width.
    pub max_width: f64,
    /// Label font size.
    pub font_size: f64,
    /// Label color.
    pub text_fill: Brush,
    /// Items in display order.
    pub items: Vec<LegendItem>,
}

impl LegendSwatchesSpec {
    /// Creates a new legend specification with defaults.
    pub fn new(id_base: u64, items: Vec<LegendItem>) -> Self {
        Self {
            id_base,
            swatch_size: 12.0,
            label_dx: 6.0,
            item_gap: 16.0,
            row_gap: 6.0,
            max_width: f64::INFINITY,
            font_size: 12.0,
            text_fill: Brush::Solid(color::TEXT),
            items,
        }
    }

    /// Set the label text paint.
    pub fn with_text_fill(mut self, text_fill: impl Into<Brush>) -> Self {
        self.text_fill = text_fill.into();
        self
    }

    /// Set the label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the swatch size.
    pub fn with_swatch_size(mut self, swatch_size: f64) -> Self {
        self.swatch_size = swatch_size;
        self
    }

    /// Sets the wrapping width.
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = max_width.max(0.0);
        self
    }

    fn row_height(&self) -> f64 {
        self.swatch_size.max(self.font_size)
    }

    fn place(&self, measurer: &dyn TextMeasurer, origin: Point) -> Vec<Placed> {
        let row_h = self.row_height();
        let mut x = 0.0;
        let mut y = 0.0;
        self.items
            .iter()
            .map(|item| {
                let (label_w, _) = measurer.measure(&item.label, self.font_size);
                let w = self.swatch_size + self.label_dx + label_w;
                if x > 0.0 && x + w > self.max_width {
                    x = 0.0;
                    y += row_h + self.row_gap;
                }
                let x0 = origin.x + x;
                let y0 = origin.y + y;
                x += w + self.item_gap;
                Placed {
                    swatch: Rect::new(
                        x0,
                        y0 + (row_h - self.swatch_size) * 0.5,
                        x0 + self.swatch_size,
                        y0 + (row_h + self.swatch_size) * 0.5,
                    ),
                    label: Point::new(x0 + self.swatch_size + self.label_dx, y0 + row_h * 0.5),
                    entry: Rect::new(x0, y0, x0 + w, y0 + row_h),
                }
            })
            .collect()
    }

    /// Measures the desired legend size (width/height).
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> Size {
        let placed = self.place(measurer, Point::ZERO);
        let bounds = placed
            .iter()
            .map(|p| p.entry)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        Size::new(bounds.x1, bounds.y1)
    }

    /// Hit-testable entries for a legend placed at `origin`.
    pub fn entries(&self, measurer: &dyn TextMeasurer, origin: Point) -> Vec<LegendEntry> {
        self.place(measurer, origin)
            .into_iter()
            .zip(&self.items)
            .enumerate()
            .map(|(index, (p, item))| LegendEntry {
                index,
                key: item.key.clone(),
                rect: p.entry,
            })
            .collect()
    }

    /// Generates marks for this legend placed at `origin`.
    pub fn marks(&self, measurer: &dyn TextMeasurer, origin: Point) -> Vec<Mark> {
        let mut out = Vec::with_capacity(self.items.len() * 2);
        for (i, (p, item)) in self
            .place(measurer, origin)
            .into_iter()
            .zip(&self.items)
            .enumerate()
        {
            out.push(
                Mark::builder(MarkId::from_raw(self.id_base + i as u64))
                    .z_index(z_order::LEGEND_SWATCHES)
                    .state(item.state)
                    .rect(p.swatch)
                    .fill(item.fill.clone())
                    .build(),
            );
            out.push(
                TextMarkSpec::new(
                    MarkId::from_raw(self.id_base + 1000 + i as u64),
                    p.label,
                    item.label.clone(),
                )
                .with_font_size(self.font_size)
                .with_fill(self.text_fill.clone())
                .with_anchor(TextAnchor::Start)
                .with_baseline(TextBaseline::Middle)
                .with_z_index(z_order::LEGEND_LABELS)
                .with_state(item.state)
                .mark(),
            );
        }
        out
    }
}

/// Returns the entry containing `point`.
pub fn legend_entry_at(entries: &[LegendEntry], point: Point) -> Option<&LegendEntry> {
    entries.iter().find(|e| e.rect.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::HeuristicTextMeasurer;
    use peniko::color::palette::css;

    fn items() -> Vec<LegendItem> {
        vec![
            LegendItem::solid("A", css::BLACK),
            LegendItem::solid("BBBB", css::BLACK).with_key("b"),
            LegendItem::solid("CC", css::BLACK),
        ]
    }

    #[test]
    fn wrapping_trades_width_for_height() {
        let m = HeuristicTextMeasurer;
        let one_row = LegendSwatchesSpec::new(1, items()).measure(&m);
        let wrapped = LegendSwatchesSpec::new(1, items())
            .with_max_width(60.0)
            .measure(&m);
        assert!(wrapped.width < one_row.width);
        assert!(wrapped.height > one_row.height);
    }

    #[test]
    fn entries_hit_test_by_key() {
        let m = HeuristicTextMeasurer;
        let spec = LegendSwatchesSpec::new(1, items());
        let entries = spec.entries(&m, Point::new(10.0, 20.0));
        assert_eq!(entries[0].rect.origin(), Point::new(10.0, 20.0));
        let mid = entries[1].rect.center();
        assert_eq!(legend_entry_at(&entries, mid).map(|e| e.key.as_str()), Some("b"));
        assert!(legend_entry_at(&entries, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn marks_use_id_offsets_and_carry_state() {
        let m = HeuristicTextMeasurer;
        let mut it = items();
        it[2].state.highlighted = true;
        let marks = LegendSwatchesSpec::new(500, it).marks(&m, Point::ZERO);
        assert_eq!(marks.len(), 6);
        assert_eq!(marks[4].id, MarkId(502));
        assert_eq!(marks[5].id, MarkId(1502));
        assert!(marks[5].state.highlighted);
    }
}
