//! Geometric streamline tracing with classic RK4.
//!
//! Each of the four RK stages renormalizes the sampled vector to unit length
//! before scaling by the step `h`, so every step advances a constant arc
//! length regardless of local speed. The result is a geometric streamline,
//! not a time-parametrized pathline.
//!
//! ```text
//!   k1 = n(v(p))
//!   k2 = n(v(p + h/2·k1))          n(x) = x / |x|   (|x| ≈ 0 → x)
//!   k3 = n(v(p + h/2·k2))
//!   k4 = n(v(p + h·k3))
//!   p' = p + h · (k1 + 2k2 + 2k3 + k4) / 6
//! ```
//!
//! Termination, checked in order every step:
//! 1. the position leaves the bounds
//! 2. the unnormalized speed at the current point is below `min_speed`
//! 3. `max_steps` steps have been taken

pub mod ribbon;
pub mod seeding;

pub use ribbon::{build_ribbon, build_ribbon_by_speed, RibbonConfig};
pub use seeding::{line_seeds, plane_seeds, SeedConfig, SeedPlane};

use glam::DVec3;

use crate::constants::safe_normalize;
use crate::field::VectorSampler;
use crate::types::{Aabb, StreamlinePath};

/// Which way to follow the field from the seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegrationDirection {
  #[default]
  Forward,
  Backward,
  /// Backward then forward, joined at the seed.
  Both,
}

/// Integration parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamlineConfig {
  /// Arc length advanced per step.
  pub step: f64,
  /// Maximum number of steps per direction.
  pub max_steps: usize,
  /// Stop where the field magnitude drops below this.
  pub min_speed: f64,
  pub direction: IntegrationDirection,
}

impl Default for StreamlineConfig {
  fn default() -> Self {
    Self {
      step: 0.1,
      max_steps: 700,
      min_speed: 1e-6,
      direction: IntegrationDirection::Forward,
    }
  }
}

impl StreamlineConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_step(mut self, step: f64) -> Self {
    self.step = step;
    self
  }

  pub fn with_max_steps(mut self, max_steps: usize) -> Self {
    self.max_steps = max_steps;
    self
  }

  pub fn with_min_speed(mut self, min_speed: f64) -> Self {
    self.min_speed = min_speed;
    self
  }

  pub fn with_direction(mut self, direction: IntegrationDirection) -> Self {
    self.direction = direction;
    self
  }
}

/// One RK4 step of signed length `h` along the normalized field.
#[inline]
pub fn rk4_step<S: VectorSampler + ?Sized>(sampler: &S, p: DVec3, h: f64) -> DVec3 {
  let dir = |x: DVec3| safe_normalize(sampler.sample_vector(x));
  let k1 = dir(p);
  let k2 = dir(p + k1 * (h * 0.5));
  let k3 = dir(p + k2 * (h * 0.5));
  let k4 = dir(p + k3 * h);
  p + (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0 * h
}

/// Trace in one direction. Returns points and their speeds; empty when the
/// seed itself is out of bounds.
fn trace<S: VectorSampler + ?Sized>(
  sampler: &S,
  seed: DVec3,
  bounds: &Aabb,
  h: f64,
  config: &StreamlineConfig,
) -> (Vec<DVec3>, Vec<f64>) {
  let mut points = Vec::new();
  let mut speeds = Vec::new();
  let mut p = seed;
  let mut steps = 0;

  loop {
    if !p.is_finite() || !bounds.contains_point(p) {
      break;
    }
    let speed = sampler.sample_vector(p).length();
    points.push(p);
    speeds.push(speed);
    if speed < config.min_speed {
      break;
    }
    if steps >= config.max_steps {
      break;
    }
    p = rk4_step(sampler, p, h);
    steps += 1;
  }

  (points, speeds)
}

/// Trace one streamline from `seed` inside `bounds`.
///
/// Fewer than 2 points means "no path"; callers discard those.
pub fn integrate<S: VectorSampler + ?Sized>(
  sampler: &S,
  seed: DVec3,
  bounds: &Aabb,
  config: &StreamlineConfig,
) -> StreamlinePath {
  let h = config.step.abs();
  let (points, speeds) = match config.direction {
    IntegrationDirection::Forward => trace(sampler, seed, bounds, h, config),
    IntegrationDirection::Backward => trace(sampler, seed, bounds, -h, config),
    IntegrationDirection::Both => {
      let (mut points, mut speeds) = trace(sampler, seed, bounds, -h, config);
      let (forward_points, forward_speeds) = trace(sampler, seed, bounds, h, config);
      points.reverse();
      speeds.reverse();
      // Both halves start with the seed; keep it once.
      if !points.is_empty() {
        points.extend(forward_points.into_iter().skip(1));
        speeds.extend(forward_speeds.into_iter().skip(1));
      }
      (points, speeds)
    }
  };
  StreamlinePath::new(points, speeds)
}

/// Trace every seed, keeping only real paths (2 points or more).
#[tracing::instrument(skip_all, fields(seeds = seeds.len()))]
pub fn integrate_seeds<S: VectorSampler + ?Sized>(
  sampler: &S,
  seeds: &[DVec3],
  bounds: &Aabb,
  config: &StreamlineConfig,
) -> Vec<StreamlinePath> {
  let paths: Vec<StreamlinePath> = seeds
    .iter()
    .map(|&seed| integrate(sampler, seed, bounds, config))
    .filter(StreamlinePath::is_path)
    .collect();
  tracing::debug!(kept = paths.len(), "traced streamlines");
  paths
}
