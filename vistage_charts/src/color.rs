// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color parsing and palettes.

use peniko::Color;
use peniko::color::{Srgb, parse_color as parse_css_color};
use serde::{Deserialize, Deserializer};

/// Default categorical palette for series and bars.
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::from_rgb8(0x20, 0x60, 0x95),
    Color::from_rgb8(0x27, 0xa0, 0xcc),
    Color::from_rgb8(0x00, 0x3c, 0x57),
    Color::from_rgb8(0x11, 0x8c, 0x7b),
    Color::from_rgb8(0xa8, 0xbd, 0x3a),
    Color::from_rgb8(0x87, 0x1a, 0x5b),
    Color::from_rgb8(0xf6, 0x60, 0x68),
    Color::from_rgb8(0x74, 0x6c, 0xb1),
];

/// Default color for highlighted bars and series.
pub const DEFAULT_HIGHLIGHT: Color = Color::from_rgb8(0xf3, 0x94, 0x31);

/// Default text color for labels and axes.
pub const TEXT: Color = Color::from_rgb8(0x22, 0x22, 0x22);

/// Default color for gridlines and axis rules.
pub const RULE: Color = Color::from_rgb8(0xd9, 0xd9, 0xd9);

/// Alpha multiplier applied to de-emphasized marks.
pub const DIMMED_ALPHA: f32 = 0.35;

/// Parses a CSS color string (`#rrggbb`, `#rgb`, `#rrggbbaa`, named colors, `rgb(...)`).
pub fn parse_color(s: &str) -> Option<Color> {
    parse_css_color(s.trim())
        .ok()
        .map(|c| c.to_alpha_color::<Srgb>())
}

/// Picks palette entry `i`, cycling.
pub fn palette_color(palette: &[Color], i: usize) -> Color {
    if palette.is_empty() {
        return DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()];
    }
    palette[i % palette.len()]
}

/// Applies the dimmed alpha.
pub fn dimmed(color: Color) -> Color {
    color.multiply_alpha(DIMMED_ALPHA)
}

/// Deserializes a CSS color string.
pub fn de_color<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
    let s = String::deserialize(d)?;
    parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
}

/// Deserializes an optional CSS color string.
pub fn de_color_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
    let s = Option::<String>::deserialize(d)?;
    s.map(|s| {
        parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    })
    .transpose()
}

/// Deserializes a list of CSS color strings.
pub fn de_colors<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Color>, D::Error> {
    let list = Vec::<String>::deserialize(d)?;
    list.iter()
        .map(|s| {
            parse_color(s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_named() {
        assert_eq!(
            parse_color("#206095").map(|c| c.to_rgba8().to_u8_array()),
            Some([0x20, 0x60, 0x95, 0xff])
        );
        assert!(parse_color("red").is_some());
        assert!(parse_color("not a color").is_none());
    }

    #[test]
    fn palette_cycles_and_falls_back() {
        let p = [DEFAULT_HIGHLIGHT];
        assert_eq!(palette_color(&p, 3), DEFAULT_HIGHLIGHT);
        assert_eq!(palette_color(&[], 8), DEFAULT_PALETTE[0]);
    }
}
