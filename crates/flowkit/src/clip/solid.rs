//! Box clipping with watertight caps.

use glam::DVec3;

use super::caps::CapSegments;
use super::{clip_against, emit_fan, world_triangles, HalfSpace};
use crate::constants::CLIP_EPSILON;
use crate::types::{Aabb, ClipResult, PlacedSoup, TriangleSoup};

/// Clips placed soups to an axis-aligned box and closes the cut faces.
///
/// Face order: `-X, +X, -Y, +Y, -Z, +Z`. Each half-space keeps the inside
/// of the box, so the outward normal of face `i` is `-planes[i].normal`.
#[derive(Clone, Debug)]
pub struct SolidClipper {
  bounds: Aabb,
  planes: [HalfSpace; 6],
  epsilon: f64,
}

impl SolidClipper {
  pub fn new(bounds: Aabb) -> Self {
    let planes = std::array::from_fn(|face| {
      let axis = face / 2;
      let mut normal = DVec3::ZERO;
      if face % 2 == 0 {
        normal[axis] = 1.0;
        HalfSpace::new(normal, bounds.min[axis])
      } else {
        normal[axis] = -1.0;
        HalfSpace::new(normal, -bounds.max[axis])
      }
    });
    Self {
      bounds,
      planes,
      epsilon: CLIP_EPSILON,
    }
  }

  pub fn with_epsilon(mut self, epsilon: f64) -> Self {
    self.epsilon = epsilon;
    self
  }

  pub fn bounds(&self) -> &Aabb {
    &self.bounds
  }

  pub fn planes(&self) -> &[HalfSpace; 6] {
    &self.planes
  }

  /// Clip every placed soup and add cap triangles on each face.
  #[tracing::instrument(skip_all, name = "solid_clip", fields(soups = soups.len()))]
  pub fn clip(&self, soups: &[PlacedSoup<'_>]) -> ClipResult {
    let mut soup = TriangleSoup::with_attributes(true, false, false);
    let mut faces: [CapSegments; 6] = std::array::from_fn(|face| CapSegments::new(face / 2));
    let mut result = ClipResult::default();

    for placed in soups {
      if let Err(err) = placed.soup.validate() {
        tracing::warn!(%err, "skipping malformed soup");
        continue;
      }
      for (corners, seed) in world_triangles(placed) {
        result.input_triangles += 1;
        let polygon = clip_against(corners, &self.planes, self.epsilon);
        if polygon.is_empty() {
          continue;
        }

        let n = polygon.len();
        for i in 0..n {
          let (a, b) = (polygon[i], polygon[(i + 1) % n]);
          for (plane, segments) in self.planes.iter().zip(faces.iter_mut()) {
            if plane.contains(a, self.epsilon) && plane.contains(b, self.epsilon) {
              segments.toggle(a, b);
            }
          }
        }

        let stats = emit_fan(&polygon, seed, &mut soup);
        result.winding_flips += stats.flips;
      }
    }

    for (plane, segments) in self.planes.iter().zip(&faces) {
      let outward = -plane.normal;
      for cap in segments.loops() {
        result.cap_triangles += emit_fan(&cap, outward, &mut soup).triangles;
      }
    }

    result.output_triangles = soup.triangle_count();
    result.soup = soup;
    tracing::debug!(
      input = result.input_triangles,
      output = result.output_triangles,
      caps = result.cap_triangles,
      flips = result.winding_flips,
      "clipped to box"
    );
    result
  }
}

#[cfg(test)]
#[path = "solid_test.rs"]
mod solid_test;
