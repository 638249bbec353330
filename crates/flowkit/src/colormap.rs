//! 1D colormaps: `t ∈ [0, 1] → [r, g, b, a]`.
//!
//! Any `Fn(f64) -> [f32; 4]` is a [`Colormap`]. [`TransferFunction`] adds the
//! piecewise-linear control-point form used for speed and scalar colouring.

/// Maps a normalized scalar to RGBA.
pub trait Colormap {
  fn color(&self, t: f64) -> [f32; 4];
}

impl<F: Fn(f64) -> [f32; 4]> Colormap for F {
  #[inline]
  fn color(&self, t: f64) -> [f32; 4] {
    self(t)
  }
}

/// Piecewise-linear RGB transfer function over an arbitrary scalar range.
///
/// Control points are given in scalar units and the function is evaluated
/// after mapping `t ∈ [0, 1]` onto `[range_min, range_max]`. Values beyond
/// the first/last control point take that point's colour.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferFunction {
  points: Vec<(f64, [f32; 3])>,
  range: (f64, f64),
}

impl TransferFunction {
  /// Control points are sorted by position; the range defaults to their span.
  pub fn new(mut points: Vec<(f64, [f32; 3])>) -> Self {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let range = match (points.first(), points.last()) {
      (Some(first), Some(last)) => (first.0, last.0),
      _ => (0.0, 1.0),
    };
    Self { points, range }
  }

  pub fn with_range(mut self, min: f64, max: f64) -> Self {
    self.range = (min, max);
    self
  }

  pub fn range(&self) -> (f64, f64) {
    self.range
  }

  /// Blue → white → red wind-speed map on `[0, 25]`.
  pub fn blue_white_red() -> Self {
    Self::new(vec![
      (0.0, [0.0, 0.0, 1.0]),
      (11.0, [1.0, 1.0, 1.0]),
      (22.0, [1.0, 0.0, 0.0]),
    ])
    .with_range(0.0, 25.0)
  }

  /// Black → white.
  pub fn grayscale() -> Self {
    Self::new(vec![(0.0, [0.0; 3]), (1.0, [1.0; 3])])
  }

  /// RGB at a value in scalar units.
  pub fn rgb_at(&self, value: f64) -> [f32; 3] {
    let Some(first) = self.points.first() else {
      return [1.0; 3];
    };
    if value <= first.0 {
      return first.1;
    }
    for pair in self.points.windows(2) {
      let (a, b) = (pair[0], pair[1]);
      if value <= b.0 {
        let span = b.0 - a.0;
        let s = if span > 0.0 { ((value - a.0) / span) as f32 } else { 1.0 };
        return std::array::from_fn(|c| a.1[c] + (b.1[c] - a.1[c]) * s);
      }
    }
    self.points[self.points.len() - 1].1
  }
}

impl Colormap for TransferFunction {
  fn color(&self, t: f64) -> [f32; 4] {
    let (min, max) = self.range;
    let [r, g, b] = self.rgb_at(min + (max - min) * t.clamp(0.0, 1.0));
    [r, g, b, 1.0]
  }
}

/// Map `value` onto `[0, 1]` over `range`, optionally reversed.
///
/// A collapsed range maps everything to 0.
#[inline]
pub fn normalize_value(value: f64, range: (f64, f64), reversed: bool) -> f64 {
  let (min, max) = range;
  let span = max - min;
  let t = if span.abs() > f64::EPSILON && value.is_finite() {
    ((value - min) / span).clamp(0.0, 1.0)
  } else {
    0.0
  };
  if reversed {
    1.0 - t
  } else {
    t
  }
}
