//! Colour-mapped scalar slices through an arbitrary plane.
//!
//! ```text
//!   plane ∩ box ──► convex polygon (u, v) ──► regular grid over its rect
//!                                                   │
//!        ┌──────────┬──────────┐                    ▼
//!        │ ░░ ▓▓▓▓▓▓│▓▓▓▓▓▓ ░░ │     sample scalar at every node,
//!        │ ░▓▓▓▓▓▓▓▓│▓▓▓▓▓▓▓▓░ │     colour it, alpha = inside polygon
//!        ├──────────┼──────────┤
//!        │ ░▓▓▓▓▓▓▓▓│▓▓▓▓▓▓▓▓░ │     keep a triangle when any of its
//!        │ ░░ ▓▓▓▓▓▓│▓▓▓▓▓▓ ░░ │     corners is inside
//!        └──────────┴──────────┘
//! ```
//!
//! The boundary is approximated per cell, not clipped exactly: cells that
//! straddle the polygon edge are kept whole, which leaves a jagged rim.

pub mod plane;

pub use plane::{intersect_plane_aabb, plane_from_points, point_in_polygon, Plane};

use glam::{DVec2, DVec3};

use crate::colormap::{normalize_value, Colormap};
use crate::field::ScalarSampler;
use crate::types::{Aabb, ScalarSliceMesh, TriangleSoup};

/// Slice resampling parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceConfig {
  /// Grid nodes along the plane's `u` axis (at least 2).
  pub res_u: usize,
  /// Grid nodes along the plane's `v` axis (at least 2).
  pub res_v: usize,
  /// Scalar range mapped onto `[0, 1]` before colouring.
  pub range: (f64, f64),
  /// Map `max` to 0 and `min` to 1.
  pub reversed: bool,
}

impl Default for SliceConfig {
  fn default() -> Self {
    Self {
      res_u: 64,
      res_v: 64,
      range: (0.0, 1.0),
      reversed: false,
    }
  }
}

impl SliceConfig {
  pub fn new(res_u: usize, res_v: usize) -> Self {
    Self {
      res_u,
      res_v,
      ..Default::default()
    }
  }

  pub fn with_range(mut self, min: f64, max: f64) -> Self {
    self.range = (min, max);
    self
  }

  pub fn with_reversed(mut self, reversed: bool) -> Self {
    self.reversed = reversed;
    self
  }
}

struct GridNode {
  position: DVec3,
  uv: DVec2,
  color: [f32; 4],
  inside: bool,
}

/// Resample `sampler` on the part of `plane` inside `bounds`.
///
/// Returns an empty mesh when the plane misses the box.
#[tracing::instrument(skip_all, name = "slice_field")]
pub fn slice_field<S, C>(
  sampler: &S,
  plane: &Plane,
  bounds: &Aabb,
  config: &SliceConfig,
  colormap: &C,
) -> ScalarSliceMesh
where
  S: ScalarSampler + ?Sized,
  C: Colormap + ?Sized,
{
  let mut soup = TriangleSoup::with_attributes(true, true, true);
  let polygon = intersect_plane_aabb(plane, bounds);
  if polygon.is_empty() {
    tracing::debug!("plane misses the bounds");
    return ScalarSliceMesh {
      soup,
      polygon,
      range: config.range,
    };
  }

  let polygon_uv: Vec<DVec2> = polygon.iter().map(|&p| plane.project(p)).collect();
  let (lo, hi) = polygon_uv.iter().fold(
    (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
    |(lo, hi), &p| (lo.min(p), hi.max(p)),
  );

  let res_u = config.res_u.max(2);
  let res_v = config.res_v.max(2);
  let extent = hi - lo;
  let mut nodes = Vec::with_capacity(res_u * res_v);
  for j in 0..res_v {
    for i in 0..res_u {
      let fraction = DVec2::new(i as f64 / (res_u - 1) as f64, j as f64 / (res_v - 1) as f64);
      let uv = lo + extent * fraction;
      let position = plane.unproject(uv);
      let value = sampler.sample_scalar(position);
      let mut color = colormap.color(normalize_value(value, config.range, config.reversed));
      let inside = point_in_polygon(uv, &polygon_uv);
      if !inside {
        color[3] = 0.0;
      }
      nodes.push(GridNode {
        position,
        uv: fraction,
        color,
        inside,
      });
    }
  }

  let node = |i: usize, j: usize| i + res_u * j;
  for j in 0..res_v - 1 {
    for i in 0..res_u - 1 {
      let a = node(i, j);
      let b = node(i + 1, j);
      let c = node(i + 1, j + 1);
      let d = node(i, j + 1);
      for triangle in [[a, b, c], [a, c, d]] {
        if !triangle.iter().any(|&n| nodes[n].inside) {
          continue;
        }
        for n in triangle {
          let grid = &nodes[n];
          soup.push_vertex(
            grid.position,
            plane.normal,
            grid.color,
            [grid.uv.x as f32, grid.uv.y as f32],
          );
        }
      }
    }
  }

  tracing::debug!(
    corners = polygon.len(),
    triangles = soup.triangle_count(),
    "sliced field"
  );
  ScalarSliceMesh {
    soup,
    polygon,
    range: config.range,
  }
}

#[cfg(test)]
#[path = "slice_test.rs"]
mod slice_test;
