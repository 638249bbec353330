//! One-sided plane clipping without caps.

use glam::DVec3;

use super::{clip_polygon, emit_fan, world_triangles, HalfSpace};
use crate::constants::CLIP_EPSILON;
use crate::types::{ClipResult, PlacedSoup, TriangleSoup};

/// Keeps the side of a plane that contains a reference point.
///
/// The cut face is left open; this is a peel-away view, not a solid.
#[derive(Clone, Debug)]
pub struct PlaneClipper {
  half_space: HalfSpace,
  epsilon: f64,
}

impl PlaneClipper {
  /// Plane through `point` with `normal`; the kept side is whichever
  /// contains `reference` (the positive side when it lies on the plane).
  pub fn new(point: DVec3, normal: DVec3, reference: DVec3) -> Self {
    let half_space = HalfSpace::through(point, normal);
    let half_space = if half_space.signed_distance(reference) < 0.0 {
      half_space.flipped()
    } else {
      half_space
    };
    Self {
      half_space,
      epsilon: CLIP_EPSILON,
    }
  }

  pub fn with_epsilon(mut self, epsilon: f64) -> Self {
    self.epsilon = epsilon;
    self
  }

  pub fn half_space(&self) -> &HalfSpace {
    &self.half_space
  }

  #[tracing::instrument(skip_all, name = "plane_clip", fields(soups = soups.len()))]
  pub fn clip(&self, soups: &[PlacedSoup<'_>]) -> ClipResult {
    let mut soup = TriangleSoup::with_attributes(true, false, false);
    let mut result = ClipResult::default();

    for placed in soups {
      if let Err(err) = placed.soup.validate() {
        tracing::warn!(%err, "skipping malformed soup");
        continue;
      }
      for (corners, seed) in world_triangles(placed) {
        result.input_triangles += 1;
        let polygon = clip_polygon(&corners, &self.half_space, self.epsilon);
        result.winding_flips += emit_fan(&polygon, seed, &mut soup).flips;
      }
    }

    result.output_triangles = soup.triangle_count();
    result.soup = soup;
    tracing::debug!(
      input = result.input_triangles,
      output = result.output_triangles,
      "clipped to plane"
    );
    result
  }
}
