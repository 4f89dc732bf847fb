// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG serialization of mark lists.
//!
//! This is a debugging/reporting renderer: it paints marks in `(z_index, id)` order and
//! estimates text extents with a fixed glyph width when computing a view box.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::string::{String, ToString};
use std::vec::Vec;

use kurbo::Rect;
use peniko::Brush;

use crate::{Mark, MarkDiff, MarkId, MarkPayload, MarkState, TextAnchor, TextBaseline};

/// An SVG document kept in sync with a stream of [`MarkDiff`]s.
#[derive(Debug, Default)]
pub struct SvgScene {
    marks: HashMap<MarkId, (i32, MarkState, MarkPayload)>,
    view_box: Option<Rect>,
}

impl SvgScene {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document from a full mark list.
    pub fn from_marks(marks: &[Mark]) -> Self {
        let mut out = Self::default();
        for m in marks {
            out.marks
                .insert(m.id, (m.z_index, m.state, m.payload.clone()));
        }
        out
    }

    /// Sets a minimum view box; the output grows it to fit all marks.
    pub fn set_view_box(&mut self, view_box: Rect) {
        self.view_box = Some(view_box);
    }

    /// Applies one frame of diffs.
    pub fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        for diff in diffs {
            match diff {
                MarkDiff::Enter {
                    id,
                    z_index,
                    state,
                    new,
                    ..
                } => {
                    self.marks.insert(*id, (*z_index, *state, (**new).clone()));
                }
                MarkDiff::Update {
                    id,
                    new_z_index,
                    state,
                    new,
                    ..
                } => {
                    self.marks
                        .insert(*id, (*new_z_index, *state, (**new).clone()));
                }
                MarkDiff::Exit { id, .. } => {
                    self.marks.remove(id);
                }
            }
        }
    }

    /// Serializes the document.
    pub fn to_svg_string(&self) -> String {
        let view_box = match (self.view_box, self.content_bounds()) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        }
        .unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 100.0));

        let mut out = String::new();
        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = write!(
            out,
            r#"viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );
        out.push('\n');

        let mut entries: Vec<_> = self.marks.iter().collect();
        entries.sort_by_key(|(id, (z, _, _))| (*z, **id));

        for (_id, (_z, state, payload)) in entries {
            if state.hidden {
                continue;
            }
            let class = state_class(state);
            match payload {
                MarkPayload::Rect(r) => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        r.rect.x0,
                        r.rect.y0,
                        r.rect.width(),
                        r.rect.height(),
                    );
                    write_class(&mut out, class);
                    write_paint_attr(&mut out, "fill", &r.fill);
                    if r.stroke_width > 0.0 {
                        write_paint_attr(&mut out, "stroke", &r.stroke);
                        let _ = write!(out, r#" stroke-width="{}""#, r.stroke_width);
                    }
                    out.push_str("/>\n");
                }
                MarkPayload::Text(t) => {
                    let baseline = match t.baseline {
                        TextBaseline::Middle => "middle",
                        TextBaseline::Alphabetic => "alphabetic",
                        TextBaseline::Hanging => "hanging",
                        TextBaseline::Ideographic => "ideographic",
                    };
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
                        t.pos.x, t.pos.y, t.font_size, baseline
                    );
                    if t.font_weight != 400 {
                        let _ = write!(out, r#" font-weight="{}""#, t.font_weight);
                    }
                    if t.angle != 0.0 {
                        let _ = write!(
                            out,
                            r#" transform="rotate({} {} {})""#,
                            t.angle, t.pos.x, t.pos.y
                        );
                    }
                    out.push_str(match t.anchor {
                        TextAnchor::Start => r#" text-anchor="start""#,
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                        TextAnchor::End => r#" text-anchor="end""#,
                    });
                    write_class(&mut out, class);
                    write_paint_attr(&mut out, "fill", &t.fill);
                    out.push('>');
                    out.push_str(&escape_xml(&t.text));
                    out.push_str("</text>\n");
                }
                MarkPayload::Path(p) => {
                    let d = p.path.to_svg();
                    let _ = write!(out, r#"<path d="{d}""#);
                    write_class(&mut out, class);
                    write_paint_attr(&mut out, "fill", &p.fill);
                    if p.stroke_width > 0.0 {
                        write_paint_attr(&mut out, "stroke", &p.stroke);
                        let _ = write!(out, r#" stroke-width="{}""#, p.stroke_width);
                    }
                    out.push_str("/>\n");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }

    fn content_bounds(&self) -> Option<Rect> {
        let mut rect: Option<Rect> = None;
        for (_z, state, payload) in self.marks.values() {
            if state.hidden {
                continue;
            }
            let b = match payload {
                MarkPayload::Text(t) => Some(estimate_text_bounds_anchored(
                    t.pos.x,
                    t.pos.y,
                    t.font_size,
                    t.anchor,
                    t.baseline,
                    &t.text,
                )),
                _ => payload.bounds(),
            };
            let Some(b) = b else {
                continue;
            };
            rect = Some(match rect {
                None => b,
                Some(r) => r.union(b),
            });
        }

        rect.map(|r| r.inflate(10.0, 10.0))
    }
}

/// Serializes a mark list in one go.
pub fn marks_to_svg(marks: &[Mark], view_box: Option<Rect>) -> String {
    let mut scene = SvgScene::from_marks(marks);
    if let Some(v) = view_box {
        scene.set_view_box(v);
    }
    scene.to_svg_string()
}

fn state_class(state: &MarkState) -> Option<&'static str> {
    if state.highlighted {
        Some("highlighted")
    } else if state.dimmed {
        Some("dimmed")
    } else {
        None
    }
}

fn write_class(out: &mut String, class: Option<&str>) {
    if let Some(c) = class {
        let _ = write!(out, r#" class="{c}""#);
    }
}

fn estimate_text_bounds_anchored(
    x: f64,
    y: f64,
    font_size: f64,
    anchor: TextAnchor,
    baseline: TextBaseline,
    text: &str,
) -> Rect {
    // ~0.6em average glyph width; `y` is converted to an approximate midline.
    let width = 0.6 * font_size * text.chars().count() as f64;
    let half_height = 0.5 * font_size;
    let y_midline = match baseline {
        TextBaseline::Middle => y,
        TextBaseline::Alphabetic => y - 0.3 * font_size,
        TextBaseline::Hanging => y + 0.3 * font_size,
        TextBaseline::Ideographic => y - 0.2 * font_size,
    };
    let (x0, x1) = match anchor {
        TextAnchor::Start => (x, x + width),
        TextAnchor::Middle => (x - width / 2.0, x + width / 2.0),
        TextAnchor::End => (x - width, x),
    };
    Rect::new(x0, y_midline - half_height, x1, y_midline + half_height)
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = std::format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

/// Escapes text content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mark, MarkId, Scene};
    use kurbo::{Point, Rect};
    use peniko::color::palette::css;

    #[test]
    fn renders_rect_and_escaped_text() {
        let marks = std::vec![
            Mark::builder(MarkId(1))
                .rect(Rect::new(0.0, 0.0, 10.0, 20.0))
                .fill(css::RED)
                .build(),
            Mark::builder(MarkId(2))
                .highlighted(true)
                .text(Point::new(5.0, 5.0), "a<b")
                .build(),
        ];
        let svg = marks_to_svg(&marks, None);
        assert!(svg.contains(r##"fill="#ff0000""##), "{svg}");
        assert!(svg.contains("a&lt;b"), "{svg}");
        assert!(svg.contains(r#"class="highlighted""#), "{svg}");
    }

    #[test]
    fn hidden_marks_are_skipped_and_diffs_apply() {
        let mut scene = Scene::new();
        let mut svg = SvgScene::new();
        let diffs = scene.tick(std::vec![
            Mark::builder(MarkId(1))
                .hidden(true)
                .rect(Rect::new(0.0, 0.0, 1.0, 1.0))
                .build(),
        ]);
        svg.apply_diffs(&diffs);
        assert!(!svg.to_svg_string().contains("<rect"));
        svg.apply_diffs(&scene.clear());
        assert!(svg.marks.is_empty());
    }
}
