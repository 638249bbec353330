//! Flat ribbon meshes along traced streamlines.
//!
//! ```text
//!        L0 ────── L1 ────── L2        side n_i = normalize(t_i × up)
//!        │ ╲       │ ╲       │         L_i = p_i + n_i · w/2
//!   p0 ──┼──╲──────┼──╲──────┼── p2    R_i = p_i - n_i · w/2
//!        │   ╲     │   ╲     │
//!        R0 ────── R1 ────── R2        per segment: (L0, R0, R1), (L0, R1, L1)
//! ```
//!
//! Tangents use central differences inside the path and one-sided
//! differences at the two ends. When the tangent is parallel to `up` the
//! side vector falls back to `t × X`.

use glam::DVec3;

use crate::colormap::{normalize_value, Colormap};
use crate::constants::{safe_normalize, DEGENERATE_EPSILON};
use crate::types::{StreamlineMesh, StreamlinePath, TriangleSoup};

#[derive(Clone, Debug, PartialEq)]
pub struct RibbonConfig {
  /// Full ribbon width.
  pub width: f64,
  /// Reference direction the ribbon is kept perpendicular to.
  pub up: DVec3,
}

impl Default for RibbonConfig {
  fn default() -> Self {
    Self {
      width: 0.2,
      up: DVec3::Y,
    }
  }
}

impl RibbonConfig {
  pub fn new(width: f64) -> Self {
    Self {
      width,
      ..Default::default()
    }
  }

  pub fn with_up(mut self, up: DVec3) -> Self {
    self.up = up;
    self
  }
}

/// Ribbon with normals and arc-length UVs (`u` = arc fraction, `v` = 0).
pub fn build_ribbon(path: &StreamlinePath, config: &RibbonConfig) -> StreamlineMesh {
  build(path, config, None)
}

/// Like [`build_ribbon`], with per-vertex colours from the path speeds
/// mapped over `speed_range`.
pub fn build_ribbon_by_speed<C: Colormap + ?Sized>(
  path: &StreamlinePath,
  config: &RibbonConfig,
  colormap: &C,
  speed_range: (f64, f64),
) -> StreamlineMesh {
  let colors: Vec<[f32; 4]> = path
    .speeds()
    .iter()
    .map(|&speed| colormap.color(normalize_value(speed, speed_range, false)))
    .collect();
  build(path, config, Some(colors))
}

fn side_vector(tangent: DVec3, up: DVec3) -> DVec3 {
  let side = tangent.cross(up);
  if side.length() < DEGENERATE_EPSILON {
    safe_normalize(tangent.cross(DVec3::X))
  } else {
    safe_normalize(side)
  }
}

fn build(path: &StreamlinePath, config: &RibbonConfig, colors: Option<Vec<[f32; 4]>>) -> StreamlineMesh {
  let points = path.points();
  let n = points.len();
  let arc_length = path.arc_length();
  let mut soup = TriangleSoup::with_attributes(true, colors.is_some(), true);

  if n < 2 {
    return StreamlineMesh {
      soup,
      point_count: n,
      arc_length,
    };
  }

  let half = config.width * 0.5;
  let up = safe_normalize(config.up);

  // Per-point side vector, edge vertices and arc fraction.
  let mut sides = Vec::with_capacity(n);
  let mut left = Vec::with_capacity(n);
  let mut right = Vec::with_capacity(n);
  let mut fractions = Vec::with_capacity(n);
  let mut travelled = 0.0;
  for i in 0..n {
    let tangent = match i {
      0 => points[1] - points[0],
      i if i == n - 1 => points[i] - points[i - 1],
      i => points[i + 1] - points[i - 1],
    };
    if i > 0 {
      travelled += points[i].distance(points[i - 1]);
    }
    let side = side_vector(safe_normalize(tangent), up);
    sides.push(side);
    left.push(points[i] + side * half);
    right.push(points[i] - side * half);
    fractions.push(if arc_length > 0.0 { (travelled / arc_length) as f32 } else { 0.0 });
  }

  let white = [1.0; 4];
  let color = |i: usize| colors.as_ref().map_or(white, |c| c[i]);
  soup.positions.reserve((n - 1) * 18);
  for i in 1..n {
    let prev = i - 1;
    let corners = [
      (left[prev], prev),
      (right[prev], prev),
      (right[i], i),
      (left[prev], prev),
      (right[i], i),
      (left[i], i),
    ];
    for (position, point) in corners {
      soup.push_vertex(position, sides[point], color(point), [fractions[point], 0.0]);
    }
  }

  StreamlineMesh {
    soup,
    point_count: n,
    arc_length,
  }
}

#[cfg(test)]
#[path = "ribbon_test.rs"]
mod ribbon_test;
