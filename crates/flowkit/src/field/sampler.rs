//! Trilinear sampling over a [`StructuredField`].
//!
//! # Boundary Policy
//!
//! ```text
//!        outside │ inside lattice      │ outside
//!   ─────────────┼─────────────────────┼─────────────
//!    node = 0    │ node = stored value │ node = 0
//! ```
//!
//! Lattice nodes outside `[0, dims - 1]` contribute zero to the blend, they
//! are NOT clamped to the nearest edge. A query half a cell past the boundary
//! therefore returns half the edge value, and a query far outside returns
//! exactly zero. Sampling never fails.

use glam::DVec3;

use super::StructuredField;

/// Anything that yields a vector per world position.
pub trait VectorSampler {
  fn sample_vector(&self, p: DVec3) -> DVec3;
}

/// Anything that yields a scalar per world position.
pub trait ScalarSampler {
  fn sample_scalar(&self, p: DVec3) -> f64;
}

impl<F: Fn(DVec3) -> DVec3> VectorSampler for F {
  #[inline]
  fn sample_vector(&self, p: DVec3) -> DVec3 {
    self(p)
  }
}

/// Trilinear sampler borrowing a field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSampler<'a> {
  field: &'a StructuredField,
}

impl<'a> FieldSampler<'a> {
  pub fn new(field: &'a StructuredField) -> Self {
    Self { field }
  }

  pub fn field(&self) -> &'a StructuredField {
    self.field
  }

  /// Unnormalized vector magnitude at `p`.
  #[inline]
  pub fn sample_speed(&self, p: DVec3) -> f64 {
    self.sample_vector(p).length()
  }

  /// Blend `N` interleaved components from the 8 lattice nodes around `p`.
  fn blend<const N: usize>(&self, data: &[f32], p: DVec3) -> [f64; N] {
    let mut out = [0.0; N];
    if !p.is_finite() {
      return out;
    }

    let field = self.field;
    let grid = (p - field.origin()) / field.spacing();
    let base = grid.floor();
    let frac = grid - base;
    let dims = field.dims();

    for corner in 0..8usize {
      let offset = [corner & 1, (corner >> 1) & 1, (corner >> 2) & 1];
      let mut weight = 1.0;
      let mut index = [0usize; 3];
      let mut inside = true;
      for axis in 0..3 {
        let t = frac[axis];
        weight *= if offset[axis] == 1 { t } else { 1.0 - t };
        let node = base[axis] + offset[axis] as f64;
        if node < 0.0 || node > (dims[axis] - 1) as f64 {
          inside = false;
        } else {
          index[axis] = node as usize;
        }
      }
      if !inside || weight == 0.0 {
        continue;
      }
      let node = field.index(index[0], index[1], index[2]) * N;
      for (c, value) in out.iter_mut().enumerate() {
        *value += weight * data[node + c] as f64;
      }
    }

    out
  }
}

impl VectorSampler for FieldSampler<'_> {
  /// Zero when the field carries no vectors.
  fn sample_vector(&self, p: DVec3) -> DVec3 {
    match self.field.vectors() {
      Some(vectors) => DVec3::from_array(self.blend::<3>(vectors, p)),
      None => DVec3::ZERO,
    }
  }
}

impl ScalarSampler for FieldSampler<'_> {
  /// Zero when the field carries no scalars.
  fn sample_scalar(&self, p: DVec3) -> f64 {
    match self.field.scalars() {
      Some(scalars) => self.blend::<1>(scalars, p)[0],
      None => 0.0,
    }
  }
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;
