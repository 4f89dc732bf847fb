// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales: pure mappings from data domains to pixel or color ranges.

use peniko::Color;

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Extends the domain outward to nice tick boundaries.
    pub fn nice(mut self, tick_count: usize) -> Self {
        let ticks = nice_ticks(self.domain.0, self.domain.1, tick_count);
        if let (Some(first), Some(last)) = (ticks.first(), ticks.last())
            && ticks.len() >= 2
        {
            self.domain = if self.domain.0 <= self.domain.1 {
                (*first, *last)
            } else {
                (*last, *first)
            };
        }
        self
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Maps a range value back into the domain.
    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        d0 + (y - r0) / denom * (d1 - d0)
    }

    /// The configured domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// The configured range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Nice tick values that fall within the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let eps = (hi - lo).abs() * 1e-9;
        nice_ticks(lo, hi, count)
            .into_iter()
            .filter(|t| *t >= lo - eps && *t <= hi + eps)
            .collect()
    }
}

/// Returns tick values covering `[min, max]` at a 1-2-5 step.
pub fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let step = nice_step((max - min) / count.max(1) as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f.min(10_000.0) as u64
        }
    } else {
        0
    };
    // Snap to the step grid so 0.1 + 0.2 style noise does not leak into labels.
    (0..=n)
        .map(|i| {
            let v = start + step * i as f64;
            (v / step).round() * step
        })
        .collect()
}

/// Rounds a raw step to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A discrete band scale for categorical axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Distance between the starts of adjacent bands.
    pub fn step(&self) -> f64 {
        self.band_width() * (1.0 + self.padding_inner)
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    fn start(&self) -> f64 {
        let (r0, r1) = self.range;
        if r1 >= r0 { r0 } else { r1 }
    }

    /// Returns the start position for the band at `index`.
    pub fn x(&self, index: usize) -> f64 {
        self.start() + self.band_width() * self.padding_outer + self.step() * index as f64
    }

    /// Returns the center position for the band at `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.x(index) + self.band_width() * 0.5
    }

    /// Returns the band whose step slot contains `pos`.
    ///
    /// Each slot extends half the inner padding on both sides of its band, so the whole
    /// padded range is hit-testable.
    pub fn index_at(&self, pos: f64) -> Option<usize> {
        let step = self.step();
        if self.count == 0 || step <= 0.0 {
            return None;
        }
        let bw = self.band_width();
        let origin = self.start() + bw * self.padding_outer - 0.5 * bw * self.padding_inner;
        let t = ((pos - origin) / step).floor();
        if !t.is_finite() || t < 0.0 || t >= self.count as f64 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, reason = "bounded by count above")]
        Some(t as usize)
    }
}

/// A discrete point scale (like band without width).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePoint {
    range: (f64, f64),
    count: usize,
    padding: f64,
}

impl ScalePoint {
    /// Creates a new point scale.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding: 0.5,
        }
    }

    /// Sets the outer padding in point steps.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Distance between adjacent points.
    pub fn step(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 1.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = (n - 1.0) + 2.0 * self.padding;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the position for a point at `index`.
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        if self.count == 1 {
            return 0.5 * (r0 + r1);
        }
        let step = self.step();
        let start = if r1 >= r0 { r0 } else { r1 };
        start + self.padding * step + step * index as f64
    }

    /// Returns the index of the point nearest to `pos`.
    pub fn nearest(&self, pos: f64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let step = self.step();
        if step <= 0.0 {
            return Some(0);
        }
        let t = ((pos - self.x(0)) / step).round();
        let max = (self.count - 1) as f64;
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the index range")]
        Some(t.clamp(0.0, max) as usize)
    }
}

/// A threshold scale: `domain` splits the number line into `domain.len() + 1` bins.
///
/// Matches `d3.scaleThreshold`: a value equal to a threshold falls into the upper bin.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleThreshold<T> {
    domain: Vec<f64>,
    range: Vec<T>,
}

impl<T> ScaleThreshold<T> {
    /// Creates a threshold scale. `domain` should be sorted ascending.
    pub fn new(domain: Vec<f64>, range: Vec<T>) -> Self {
        Self { domain, range }
    }

    /// Bin index for `x`; `None` for NaN.
    pub fn bin(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        Some(self.domain.partition_point(|t| *t <= x))
    }

    /// Maps `x` to its range value, if the range covers that bin.
    pub fn map(&self, x: f64) -> Option<&T> {
        self.range.get(self.bin(x)?)
    }

    /// The thresholds.
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// The bin values.
    pub fn range(&self) -> &[T] {
        &self.range
    }
}

/// `bins - 1` evenly spaced thresholds between `min` and `max`.
pub fn equal_interval_thresholds(min: f64, max: f64, bins: usize) -> Vec<f64> {
    if bins < 2 || !min.is_finite() || !max.is_finite() || min >= max {
        return Vec::new();
    }
    let step = (max - min) / bins as f64;
    (1..bins).map(|i| min + step * i as f64).collect()
}

/// A continuous color scale interpolating between color stops in RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleSequential {
    domain: (f64, f64),
    stops: Vec<Color>,
}

impl ScaleSequential {
    /// Creates a sequential scale over `domain` through `stops` (at least one).
    pub fn new(domain: (f64, f64), stops: Vec<Color>) -> Self {
        Self { domain, stops }
    }

    /// The input domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Maps `x` to a color, clamping to the domain. `None` if there are no stops or `x` is NaN.
    pub fn map(&self, x: f64) -> Option<Color> {
        if x.is_nan() {
            return None;
        }
        let (first, last) = (self.stops.first()?, self.stops.last()?);
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        let t = if span == 0.0 {
            0.0
        } else {
            ((x - d0) / span).clamp(0.0, 1.0)
        };
        if self.stops.len() == 1 || t <= 0.0 {
            return Some(*first);
        }
        if t >= 1.0 {
            return Some(*last);
        }
        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let i_f = pos.floor().min(segments - 1.0);
        #[allow(clippy::cast_possible_truncation, reason = "bounded by the stop count")]
        let i = i_f as usize;
        let a = self.stops[i];
        let b = self.stops[i + 1];
        Some(lerp_color(a, b, pos - i_f))
    }
}

/// Componentwise RGBA interpolation.
pub fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    #[allow(clippy::cast_possible_truncation, reason = "color components are f32")]
    let t = t as f32;
    let mut out = a.components;
    for (o, (x, y)) in out.iter_mut().zip(a.components.iter().zip(b.components.iter())) {
        *o = x + (y - x) * t;
    }
    Color::new(out)
}

/// A square-root scale, mapping value to radius so that area is proportional to value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSqrt {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleSqrt {
    /// Creates a new sqrt scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps `x` (clamped to the domain).
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let s0 = d0.max(0.0).sqrt();
        let s1 = d1.max(0.0).sqrt();
        if s1 == s0 {
            return r1;
        }
        let x = x.clamp(d0.min(d1), d0.max(d1)).max(0.0);
        let t = ((x.sqrt() - s0) / (s1 - s0)).clamp(0.0, 1.0);
        r0 + t * (r1 - r0)
    }
}
