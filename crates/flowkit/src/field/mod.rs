//! Structured-points field data: lattice, reader and trilinear sampler.
//!
//! ```text
//!   bytes ──► reader::read_legacy ──► StructuredField ──► FieldSampler
//!                                         │                 ├─ sample_vector
//!                                         │                 └─ sample_scalar
//!                                         └─ bounds / centered
//! ```
//!
//! Lattice node `(i, j, k)` sits at `origin + (i, j, k) * spacing` and is
//! stored at `i + nx * (j + ny * k)` (x fastest).

pub mod reader;
pub mod sampler;

pub use reader::{read_legacy, FieldFile, ReaderOptions};
pub use sampler::{FieldSampler, ScalarSampler, VectorSampler};

use glam::DVec3;

use crate::error::FieldError;
use crate::types::Aabb;

/// Regular 3D lattice with optional scalar and vector samples per node.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredField {
  dims: [usize; 3],
  spacing: DVec3,
  origin: DVec3,
  scalars: Option<Vec<f32>>,
  vectors: Option<Vec<f32>>,
}

impl StructuredField {
  /// Create an empty lattice (no attributes yet).
  pub fn new(dims: [usize; 3], spacing: DVec3, origin: DVec3) -> Result<Self, FieldError> {
    let fits = dims[0]
      .checked_mul(dims[1])
      .and_then(|n| n.checked_mul(dims[2]))
      .and_then(|n| n.checked_mul(3))
      .is_some();
    if dims.contains(&0) || !fits {
      return Err(FieldError::InvalidDimensions(dims));
    }
    if spacing.to_array().iter().any(|s| *s == 0.0 || !s.is_finite()) {
      return Err(FieldError::InvalidSpacing(spacing.to_array()));
    }
    Ok(Self {
      dims,
      spacing,
      origin,
      scalars: None,
      vectors: None,
    })
  }

  /// Attach one scalar per node.
  pub fn with_scalars(mut self, scalars: Vec<f32>) -> Result<Self, FieldError> {
    let expected = self.point_count();
    if scalars.len() != expected {
      return Err(FieldError::BufferLength {
        kind: "scalar",
        expected,
        found: scalars.len(),
      });
    }
    self.scalars = Some(scalars);
    Ok(self)
  }

  /// Attach one interleaved xyz vector per node.
  pub fn with_vectors(mut self, vectors: Vec<f32>) -> Result<Self, FieldError> {
    let expected = self.point_count() * 3;
    if vectors.len() != expected {
      return Err(FieldError::BufferLength {
        kind: "vector",
        expected,
        found: vectors.len(),
      });
    }
    self.vectors = Some(vectors);
    Ok(self)
  }

  pub fn dims(&self) -> [usize; 3] {
    self.dims
  }

  pub fn spacing(&self) -> DVec3 {
    self.spacing
  }

  pub fn origin(&self) -> DVec3 {
    self.origin
  }

  pub fn scalars(&self) -> Option<&[f32]> {
    self.scalars.as_deref()
  }

  pub fn vectors(&self) -> Option<&[f32]> {
    self.vectors.as_deref()
  }

  #[inline]
  pub fn point_count(&self) -> usize {
    self.dims[0] * self.dims[1] * self.dims[2]
  }

  /// Linear storage index of lattice node `(i, j, k)`.
  #[inline]
  pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
    i + self.dims[0] * (j + self.dims[1] * k)
  }

  /// World position of lattice node `(i, j, k)`.
  #[inline]
  pub fn node_position(&self, i: usize, j: usize, k: usize) -> DVec3 {
    self.origin + DVec3::new(i as f64, j as f64, k as f64) * self.spacing
  }

  /// Box spanned by the lattice nodes. Negative spacing is allowed.
  pub fn bounds(&self) -> Aabb {
    let far = self.node_position(self.dims[0] - 1, self.dims[1] - 1, self.dims[2] - 1);
    Aabb::new(self.origin.min(far), self.origin.max(far))
  }

  /// Copy shifted so the lattice centre sits at the world origin.
  pub fn centered(&self) -> Self {
    let mut out = self.clone();
    out.origin = self.origin - self.bounds().center();
    out
  }

  /// Min/max of the scalar attribute, ignoring non-finite samples.
  pub fn scalar_range(&self) -> Option<(f64, f64)> {
    finite_range(self.scalars.as_deref()?.iter().map(|&s| s as f64))
  }

  /// Min/max vector magnitude over all nodes.
  pub fn speed_range(&self) -> Option<(f64, f64)> {
    let vectors = self.vectors.as_deref()?;
    finite_range(
      vectors
        .chunks_exact(3)
        .map(|v| DVec3::new(v[0] as f64, v[1] as f64, v[2] as f64).length()),
    )
  }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
  values
    .filter(|v| v.is_finite())
    .fold(None, |range, v| match range {
      None => Some((v, v)),
      Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    })
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
