//! Triangle soup clipping against half-spaces.
//!
//! Both clippers share one core: Sutherland–Hodgman clipping of a single
//! triangle against a list of half-spaces, followed by a fan triangulation
//! oriented by a seed normal.
//!
//! ```text
//!   PlacedSoup* ──► world triangle ──► clip_polygon × planes ──► emit_fan
//!                                            │
//!                      SolidClipper only ──► CapSegments (per box face)
//!                                            │
//!                                            ▼
//!                                       cap loops ──► emit_fan(outward)
//! ```
//!
//! # Vertex Classification
//!
//! A vertex is `In` when `n·p - d > ε`, `Out` when `< -ε` and `On`
//! otherwise. `On` vertices are kept and, for axis-aligned planes, snapped
//! exactly onto the plane coordinate. Intersection points are only created
//! on strict `In ↔ Out` edges, so a polygon touching a plane never grows
//! duplicate corners.

pub mod caps;
pub mod plane;
pub mod solid;

pub use plane::PlaneClipper;
pub use solid::SolidClipper;

use glam::DVec3;
use smallvec::SmallVec;

use crate::constants::{safe_normalize, AREA_EPSILON, SEGMENT_QUANTUM};
use crate::types::{PlacedSoup, TriangleSoup};

/// A clipped triangle: at most 3 + 6 corners against a box.
pub type Polygon = SmallVec<[DVec3; 9]>;

/// Kept region `normal · p >= d` (within tolerance).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfSpace {
  pub normal: DVec3,
  pub d: f64,
  /// `(axis, coordinate)` when the plane is axis-aligned.
  snap: Option<(usize, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
  In,
  On,
  Out,
}

impl HalfSpace {
  /// Half-space from a unit normal and offset. Axis-aligned normals enable
  /// exact snapping of on-plane points.
  pub fn new(normal: DVec3, d: f64) -> Self {
    let mut snap = None;
    for axis in 0..3 {
      let others = [(axis + 1) % 3, (axis + 2) % 3];
      if normal[axis].abs() == 1.0 && others.iter().all(|&o| normal[o] == 0.0) {
        snap = Some((axis, d / normal[axis]));
      }
    }
    Self { normal, d, snap }
  }

  /// Half-space through `point`, keeping the side `normal` points into.
  pub fn through(point: DVec3, normal: DVec3) -> Self {
    let normal = safe_normalize(normal);
    Self::new(normal, normal.dot(point))
  }

  /// The same plane keeping the other side.
  pub fn flipped(&self) -> Self {
    Self::new(-self.normal, -self.d)
  }

  #[inline]
  pub fn signed_distance(&self, p: DVec3) -> f64 {
    self.normal.dot(p) - self.d
  }

  /// Axis and coordinate of an axis-aligned plane.
  pub fn axis(&self) -> Option<(usize, f64)> {
    self.snap
  }

  #[inline]
  fn side(&self, p: DVec3, epsilon: f64) -> Side {
    let distance = self.signed_distance(p);
    if distance > epsilon {
      Side::In
    } else if distance < -epsilon {
      Side::Out
    } else {
      Side::On
    }
  }

  #[inline]
  fn snapped(&self, mut p: DVec3) -> DVec3 {
    if let Some((axis, value)) = self.snap {
      p[axis] = value;
    }
    p
  }

  /// Whether `p` lies on the plane within `epsilon`.
  #[inline]
  pub fn contains(&self, p: DVec3, epsilon: f64) -> bool {
    self.signed_distance(p).abs() <= epsilon
  }
}

/// Sutherland–Hodgman pass of `polygon` against one half-space.
///
/// Returns an empty polygon when fewer than 3 distinct corners survive.
pub fn clip_polygon(polygon: &[DVec3], plane: &HalfSpace, epsilon: f64) -> Polygon {
  let mut out = Polygon::new();
  let n = polygon.len();
  if n < 3 {
    return out;
  }

  let sides: SmallVec<[Side; 9]> = polygon.iter().map(|&p| plane.side(p, epsilon)).collect();
  let distances: SmallVec<[f64; 9]> = polygon.iter().map(|&p| plane.signed_distance(p)).collect();

  for i in 0..n {
    let prev = (i + n - 1) % n;
    let crossing = matches!(
      (sides[prev], sides[i]),
      (Side::In, Side::Out) | (Side::Out, Side::In)
    );
    if crossing {
      let t = distances[prev] / (distances[prev] - distances[i]);
      let p = polygon[prev] + (polygon[i] - polygon[prev]) * t;
      out.push(plane.snapped(p));
    }
    match sides[i] {
      Side::In => out.push(polygon[i]),
      Side::On => out.push(plane.snapped(polygon[i])),
      Side::Out => {}
    }
  }

  dedup_ring(&mut out);
  if out.len() < 3 {
    out.clear();
  }
  out
}

/// Clip against every plane in turn, stopping as soon as nothing is left.
pub fn clip_against(triangle: [DVec3; 3], planes: &[HalfSpace], epsilon: f64) -> Polygon {
  let mut polygon: Polygon = SmallVec::from_slice(&triangle);
  for plane in planes {
    polygon = clip_polygon(&polygon, plane, epsilon);
    if polygon.is_empty() {
      break;
    }
  }
  polygon
}

/// Remove consecutive (and wrap-around) near-duplicate corners.
fn dedup_ring(polygon: &mut Polygon) {
  let limit = SEGMENT_QUANTUM * SEGMENT_QUANTUM;
  polygon.dedup_by(|b, a| a.distance_squared(*b) < limit);
  while polygon.len() > 1 {
    let (first, last) = (polygon[0], polygon[polygon.len() - 1]);
    if first.distance_squared(last) < limit {
      polygon.pop();
    } else {
      break;
    }
  }
}

/// Counts from one fan triangulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanStats {
  pub triangles: usize,
  pub flips: usize,
}

/// Fan-triangulate `polygon` from its first corner into `soup`.
///
/// Triangles whose geometric normal opposes `seed` are emitted with the last
/// two corners swapped and counted as flips. Zero-area triangles are
/// dropped. Each triangle is written with its own unit normal.
pub fn emit_fan(polygon: &[DVec3], seed: DVec3, soup: &mut TriangleSoup) -> FanStats {
  let mut stats = FanStats::default();
  if polygon.len() < 3 {
    return stats;
  }
  let origin = polygon[0];
  for i in 1..polygon.len() - 1 {
    let (mut b, mut c) = (polygon[i], polygon[i + 1]);
    let mut normal = (b - origin).cross(c - origin);
    if normal.length() < AREA_EPSILON {
      continue;
    }
    if normal.dot(seed) < 0.0 {
      std::mem::swap(&mut b, &mut c);
      normal = -normal;
      stats.flips += 1;
    }
    soup.push_triangle([origin, b, c], safe_normalize(normal));
    stats.triangles += 1;
  }
  stats
}

/// World-space corners and orientation seed of one placed triangle.
///
/// The seed is the average vertex normal when the soup carries normals,
/// otherwise the geometric normal.
pub(crate) fn world_triangles<'a>(
  placed: &'a PlacedSoup<'a>,
) -> impl Iterator<Item = ([DVec3; 3], DVec3)> + 'a {
  let normal_matrix = placed.transform.matrix3.inverse().transpose();
  (0..placed.soup.triangle_count()).map(move |t| {
    let corners = placed
      .soup
      .triangle(t)
      .map(|p| placed.transform.transform_point3(p));
    let geometric = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
    let seed = match placed.soup.normals {
      Some(_) => {
        let sum: DVec3 = (0..3)
          .filter_map(|k| placed.soup.vertex_normal(t * 3 + k))
          .map(|n| normal_matrix * n)
          .sum();
        if sum.length() < AREA_EPSILON {
          geometric
        } else {
          sum
        }
      }
      None => geometric,
    };
    (corners, seed)
  })
}

#[cfg(test)]
#[path = "clip_test.rs"]
mod clip_test;
