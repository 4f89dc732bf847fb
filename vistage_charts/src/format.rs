// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting for labels and tooltips.
//!
//! [`NumberFormat`] understands a d3-format compatible subset:
//! `[sign][,][.precision][~][type]` with types `f d % e s r` or none.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A malformed format specifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid number format `{spec}`: {reason}")]
pub struct FormatError {
    /// The specifier as given.
    pub spec: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// Decimal and grouping separators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    /// Decimal separator.
    pub decimal: String,
    /// Thousands separator.
    pub thousands: String,
    /// Minus sign.
    pub minus: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            decimal: ".".to_string(),
            thousands: ",".to_string(),
            minus: "-".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Default,
    Fixed,
    Integer,
    Percent,
    Exponent,
    SiPrefix,
    Rounded,
}

/// A parsed number format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    sign: Sign,
    group: bool,
    precision: Option<usize>,
    trim: bool,
    kind: Kind,
    locale: Locale,
}

impl NumberFormat {
    /// Parses a specifier such as `",.0f"`, `".1%"` or `"~s"`.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let err = |reason| FormatError {
            spec: spec.to_string(),
            reason,
        };
        let mut rest = spec;
        let sign = match rest.chars().next() {
            Some('+') => Sign::Plus,
            Some(' ') => Sign::Space,
            Some('-') => Sign::Minus,
            _ => Sign::Minus,
        };
        if sign != Sign::Minus || rest.starts_with('-') {
            rest = &rest[1..];
        }
        let group = rest.starts_with(',');
        if group {
            rest = &rest[1..];
        }
        let mut precision = None;
        if let Some(after) = rest.strip_prefix('.') {
            let digits = after.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Err(err("missing precision after `.`"));
            }
            precision = Some(
                after[..digits]
                    .parse::<usize>()
                    .map_err(|_| err("precision out of range"))?
                    .min(20),
            );
            rest = &after[digits..];
        }
        let trim = rest.starts_with('~');
        if trim {
            rest = &rest[1..];
        }
        let kind = match rest {
            "" => Kind::Default,
            "f" => Kind::Fixed,
            "d" => Kind::Integer,
            "%" => Kind::Percent,
            "e" => Kind::Exponent,
            "s" => Kind::SiPrefix,
            "r" => Kind::Rounded,
            _ => return Err(err("unsupported type")),
        };
        Ok(Self {
            sign,
            group,
            precision,
            trim,
            kind,
            locale: Locale::default(),
        })
    }

    /// Uses the given separators.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Formats `value`.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            let s = if value > 0.0 { "Infinity" } else { "-Infinity" };
            return s.to_string();
        }
        let abs = value.abs();
        let (mut body, suffix) = match self.kind {
            Kind::Default => match self.precision {
                Some(p) => (to_precision(abs, p.max(1)), String::new()),
                None => (default_repr(abs), String::new()),
            },
            Kind::Fixed => (
                format!("{:.*}", self.precision.unwrap_or(6), abs),
                String::new(),
            ),
            Kind::Integer => (format!("{:.0}", abs), String::new()),
            Kind::Percent => (
                format!("{:.*}", self.precision.unwrap_or(6), abs * 100.0),
                "%".to_string(),
            ),
            Kind::Exponent => exponent(abs, self.precision.unwrap_or(6)),
            Kind::SiPrefix => si_prefix(abs, self.precision.unwrap_or(6).max(1)),
            Kind::Rounded => (
                to_precision(abs, self.precision.unwrap_or(6).max(1)),
                String::new(),
            ),
        };
        if self.trim || (self.kind == Kind::Default && self.precision.is_some()) {
            body = trim_zeros(&body);
        }
        let is_zero = body.chars().all(|c| c == '0' || c == '.');
        let thousands = self.group.then_some(self.locale.thousands.as_str());
        body = localize(&body, thousands, &self.locale.decimal);
        let prefix = if value < 0.0 && !is_zero {
            self.locale.minus.as_str()
        } else {
            match self.sign {
                Sign::Plus => "+",
                Sign::Space => " ",
                Sign::Minus => "",
            }
        };
        format!("{prefix}{body}{suffix}")
    }
}

fn default_repr(abs: f64) -> String {
    if abs.fract() == 0.0 && abs < 1e21 {
        format!("{abs:.0}")
    } else {
        format!("{abs}")
    }
}

/// Rounds to `p` significant digits in decimal notation.
fn to_precision(abs: f64, p: usize) -> String {
    if abs == 0.0 {
        return format!("{:.*}", p.saturating_sub(1), 0.0);
    }
    let e = abs.log10().floor();
    let p_f = p as f64;
    if e >= p_f {
        let k = 10_f64.powf(e - p_f + 1.0);
        return format!("{:.0}", (abs / k).round() * k);
    }
    let decimals = (p_f - 1.0 - e).max(0.0);
    #[allow(clippy::cast_possible_truncation, reason = "small non-negative integer")]
    let decimals = decimals as usize;
    format!("{:.*}", decimals, abs)
}

fn exponent(abs: f64, p: usize) -> (String, String) {
    let s = format!("{:.*e}", p, abs);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp = exp.parse::<i32>().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            (mantissa.to_string(), format!("e{sign}{}", exp.abs()))
        }
        None => (s, String::new()),
    }
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

fn si_prefix(abs: f64, p: usize) -> (String, String) {
    let group = if abs == 0.0 {
        0.0
    } else {
        (abs.log10() / 3.0).floor().clamp(-8.0, 8.0)
    };
    let mantissa = abs / 10_f64.powf(group * 3.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to [-8, 8]")]
    let idx = (group as i32 + 8) as usize;
    (
        to_precision(mantissa, p),
        SI_PREFIXES.get(idx).copied().unwrap_or("").to_string(),
    )
}

fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Applies the grouping separator (if any) and the decimal separator.
fn localize(s: &str, thousands: Option<&str>, decimal: &str) -> String {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let digits: Vec<char> = int.chars().collect();
    let mut out = String::with_capacity(s.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if let Some(sep) = thousands
            && i > 0
            && (digits.len() - i) % 3 == 0
        {
            out.push_str(sep);
        }
        out.push(*c);
    }
    if let Some(f) = frac {
        out.push_str(decimal);
        out.push_str(f);
    }
    out
}

/// How raw values become label text.
#[derive(Clone, Default)]
pub enum ValueFormatter {
    /// The raw value; integral values print without decimals.
    #[default]
    Default,
    /// A parsed d3-style format.
    Spec(NumberFormat),
    /// A caller-supplied function.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl ValueFormatter {
    /// Parses a d3-style specifier.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        NumberFormat::parse(spec).map(Self::Spec)
    }

    /// Wraps a function.
    pub fn custom(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Formats `value`.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Default => default_value(value),
            Self::Spec(spec) => spec.format(value),
            Self::Custom(f) => f(value),
        }
    }
}

fn default_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

impl<'de> Deserialize<'de> for ValueFormatter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spec = String::deserialize(deserializer)?;
        Self::parse(&spec).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(spec: &str, v: f64) -> String {
        NumberFormat::parse(spec).unwrap().format(v)
    }

    #[test]
    fn fixed_grouped_and_percent() {
        assert_eq!(f(",.0f", 1_234_567.0), "1,234,567");
        assert_eq!(f(".2f", -3.14159), "-3.14");
        assert_eq!(f(".1%", 0.123), "12.3%");
        assert_eq!(f("+.1f", 2.0), "+2.0");
        assert_eq!(f("d", 3.7), "4");
        assert_eq!(f(".1f", -0.01), "0.0");
    }

    #[test]
    fn significant_and_si() {
        assert_eq!(f(".2r", 1234.0), "1200");
        assert_eq!(f(".3r", 0.012345), "0.0123");
        assert_eq!(f(".2s", 1500.0), "1.5k");
        assert_eq!(f("~s", 2_000_000.0), "2M");
        assert_eq!(f(".3e", 15000.0), "1.500e+4");
        assert_eq!(f("~f", 1.5), "1.5");
    }

    #[test]
    fn locale_separators() {
        let fmt = NumberFormat::parse(",.2f").unwrap().with_locale(Locale {
            decimal: ",".to_string(),
            thousands: ".".to_string(),
            minus: "\u{2212}".to_string(),
        });
        assert_eq!(fmt.format(1234.5), "1.234,50");
        assert_eq!(fmt.format(-2.0), "\u{2212}2,00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(NumberFormat::parse(".f").is_err());
        assert!(NumberFormat::parse("q").is_err());
    }

    #[test]
    fn value_formatter_variants() {
        assert_eq!(ValueFormatter::Default.format(3.0), "3");
        assert_eq!(ValueFormatter::Default.format(2.5), "2.5");
        assert_eq!(ValueFormatter::parse(".1f").unwrap().format(2.0), "2.0");
        let custom = ValueFormatter::custom(|v| format!("{v} units"));
        assert_eq!(custom.format(4.0), "4 units");
        let parsed: ValueFormatter = serde_json::from_str(r#"",.0f""#).unwrap();
        assert_eq!(parsed.format(1000.0), "1,000");
    }
}
