//! Slicing planes and their intersection with a box.

use glam::{DVec2, DVec3};

use crate::constants::{safe_normalize, DEGENERATE_EPSILON, MERGE_EPSILON, PLANE_EPSILON};
use crate::types::Aabb;

/// Plane with an orthonormal in-plane frame.
///
/// `normal = normalize(u × v)`, so a polygon counter-clockwise in `(u, v)`
/// faces along `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub origin: DVec3,
  pub u: DVec3,
  pub v: DVec3,
  pub normal: DVec3,
}

impl Plane {
  /// The `z = 0` plane with the canonical frame, moved to `origin`.
  pub fn canonical(origin: DVec3) -> Self {
    Self {
      origin,
      u: DVec3::X,
      v: DVec3::Y,
      normal: DVec3::Z,
    }
  }

  /// Plane through `origin` facing `normal`. The in-plane `u` axis is the
  /// world axis least aligned with the normal, projected into the plane.
  pub fn from_normal(origin: DVec3, normal: DVec3) -> Self {
    let normal = safe_normalize(normal);
    if normal.length() < DEGENERATE_EPSILON {
      return Self::canonical(origin);
    }
    let helper = if normal.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    let u = safe_normalize(helper - normal * normal.dot(helper));
    let v = normal.cross(u);
    Self { origin, u, v, normal }
  }

  /// Signed distance along the normal.
  #[inline]
  pub fn signed_distance(&self, p: DVec3) -> f64 {
    self.normal.dot(p - self.origin)
  }

  /// World point to `(u, v)` plane coordinates.
  #[inline]
  pub fn project(&self, p: DVec3) -> DVec2 {
    let d = p - self.origin;
    DVec2::new(d.dot(self.u), d.dot(self.v))
  }

  /// `(u, v)` plane coordinates back to world space.
  #[inline]
  pub fn unproject(&self, uv: DVec2) -> DVec3 {
    self.origin + self.u * uv.x + self.v * uv.y
  }
}

/// Plane through three points, origin at `p0`.
///
/// Falls back to `u = X` when `p1 - p0` is near zero, and to the canonical
/// frame when the three points do not span a plane.
pub fn plane_from_points(p0: DVec3, p1: DVec3, p2: DVec3) -> Plane {
  let edge = p1 - p0;
  let u = if edge.length() < DEGENERATE_EPSILON {
    DVec3::X
  } else {
    edge.normalize()
  };
  let n = safe_normalize(u.cross(p2 - p0));
  let v = n.cross(u);
  if v.length() < DEGENERATE_EPSILON {
    return Plane::canonical(p0);
  }
  let v = v.normalize();
  Plane {
    origin: p0,
    u,
    v,
    normal: safe_normalize(u.cross(v)),
  }
}

/// Convex polygon where `plane` cuts `aabb`, counter-clockwise in the
/// plane's `(u, v)` frame. Fewer than 3 distinct points gives an empty list.
pub fn intersect_plane_aabb(plane: &Plane, aabb: &Aabb) -> Vec<DVec3> {
  let corners = aabb.corners();
  let distances = corners.map(|c| plane.signed_distance(c));

  let mut raw = Vec::with_capacity(12);
  for (a, b) in Aabb::EDGES {
    let (da, db) = (distances[a], distances[b]);
    let a_on = da.abs() <= PLANE_EPSILON;
    let b_on = db.abs() <= PLANE_EPSILON;
    if a_on || b_on {
      if a_on {
        raw.push(corners[a]);
      }
      if b_on {
        raw.push(corners[b]);
      }
    } else if (da < 0.0) != (db < 0.0) {
      let t = da / (da - db);
      raw.push(corners[a] + (corners[b] - corners[a]) * t);
    }
  }

  let mut points: Vec<DVec3> = Vec::with_capacity(raw.len());
  for p in raw {
    if !points.iter().any(|q| q.distance(p) <= MERGE_EPSILON) {
      points.push(p);
    }
  }
  if points.len() < 3 {
    return Vec::new();
  }

  let uv: Vec<DVec2> = points.iter().map(|&p| plane.project(p)).collect();
  let centroid = uv.iter().copied().sum::<DVec2>() / uv.len() as f64;
  let mut order: Vec<usize> = (0..points.len()).collect();
  let angle = |i: usize| {
    let d = uv[i] - centroid;
    d.y.atan2(d.x)
  };
  order.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
  order.into_iter().map(|i| points[i]).collect()
}

/// Even-odd ray cast along `+u`.
pub fn point_in_polygon(p: DVec2, polygon: &[DVec2]) -> bool {
  let n = polygon.len();
  if n < 3 {
    return false;
  }
  let mut inside = false;
  let mut j = n - 1;
  for i in 0..n {
    let (a, b) = (polygon[i], polygon[j]);
    if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
      inside = !inside;
    }
    j = i;
  }
  inside
}

#[cfg(test)]
#[path = "plane_test.rs"]
mod plane_test;
