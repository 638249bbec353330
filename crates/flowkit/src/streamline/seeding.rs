//! Seed point generation.
//!
//! Plane seeding walks the lattice nodes of one axis-aligned slab of the
//! field with a stride, optionally jittering each seed inside its cell so
//! regular grids do not produce visibly aligned ribbons.
//!
//! ```text
//!   XY plane, stride 2          jitter ≤ fraction · spacing
//!   ●   ·   ●   ·   ●             ┌───────┐
//!   ·   ·   ·   ·   ·             │  ●'   │   ● lattice node
//!   ●   ·   ●   ·   ●             │ ●     │   ●' jittered seed
//!                                 └───────┘
//! ```

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::field::StructuredField;

/// Lattice plane to seed from, named by its two in-plane axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedPlane {
  #[default]
  XY,
  XZ,
  YZ,
}

impl SeedPlane {
  /// `(first in-plane axis, second in-plane axis, normal axis)`.
  pub fn axes(self) -> (usize, usize, usize) {
    match self {
      SeedPlane::XY => (0, 1, 2),
      SeedPlane::XZ => (0, 2, 1),
      SeedPlane::YZ => (1, 2, 0),
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeedConfig {
  pub plane: SeedPlane,
  /// Take every `stride`-th node along both in-plane axes.
  pub stride: usize,
  /// Slab position along the normal axis in `[0, 1]`, used when
  /// `plane_index` is unset.
  pub offset: f64,
  /// Explicit slab index along the normal axis.
  pub plane_index: Option<usize>,
  /// Jitter amplitude as a fraction of one cell; 0 disables jitter.
  pub jitter: f64,
  pub rng_seed: u64,
}

impl Default for SeedConfig {
  fn default() -> Self {
    Self {
      plane: SeedPlane::XY,
      stride: 4,
      offset: 0.5,
      plane_index: None,
      jitter: 0.0,
      rng_seed: 0,
    }
  }
}

impl SeedConfig {
  pub fn new(plane: SeedPlane) -> Self {
    Self {
      plane,
      ..Default::default()
    }
  }

  pub fn with_stride(mut self, stride: usize) -> Self {
    self.stride = stride;
    self
  }

  pub fn with_offset(mut self, offset: f64) -> Self {
    self.offset = offset;
    self
  }

  pub fn with_plane_index(mut self, index: usize) -> Self {
    self.plane_index = Some(index);
    self
  }

  pub fn with_jitter(mut self, fraction: f64, rng_seed: u64) -> Self {
    self.jitter = fraction;
    self.rng_seed = rng_seed;
    self
  }
}

/// Seeds on one lattice slab. Deterministic for a given `rng_seed`.
pub fn plane_seeds(field: &StructuredField, config: &SeedConfig) -> Vec<DVec3> {
  let (a, b, normal) = config.plane.axes();
  let dims = field.dims();
  let spacing = field.spacing();
  let stride = config.stride.max(1);

  let last = dims[normal] - 1;
  let slab = match config.plane_index {
    Some(index) => index.min(last),
    None => (config.offset.clamp(0.0, 1.0) * last as f64).round() as usize,
  };

  let jitter = config.jitter.abs();
  let mut rng = StdRng::seed_from_u64(config.rng_seed);
  let mut seeds = Vec::with_capacity(dims[a].div_ceil(stride) * dims[b].div_ceil(stride));

  for jb in (0..dims[b]).step_by(stride) {
    for ia in (0..dims[a]).step_by(stride) {
      let mut node = [0usize; 3];
      node[a] = ia;
      node[b] = jb;
      node[normal] = slab;
      let mut p = field.node_position(node[0], node[1], node[2]);
      if jitter > 0.0 {
        p[a] += rng.random_range(-jitter..=jitter) * spacing[a];
        p[b] += rng.random_range(-jitter..=jitter) * spacing[b];
      }
      seeds.push(p);
    }
  }

  seeds
}

/// `resolution + 1` evenly spaced seeds from `start` to `end` inclusive.
pub fn line_seeds(start: DVec3, end: DVec3, resolution: usize) -> Vec<DVec3> {
  let resolution = resolution.max(1);
  (0..=resolution)
    .map(|i| start.lerp(end, i as f64 / resolution as f64))
    .collect()
}
