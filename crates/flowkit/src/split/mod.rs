//! Connected-component decomposition of triangle soups.
//!
//! # Phases
//!
//! ```text
//!   positions ──► weld ──► welded id / vertex ──► connect ──► union-find
//!                 0 → ⅓                           ⅓ → ⅔         │
//!                                                               ▼
//!   Vec<MeshComponent> ◄── pack raw vertex data ◄── group by root, filter
//!                          ⅔ → 1
//! ```
//!
//! Triangles sharing a single welded vertex are joined, so two shapes
//! touching at one point form one component. Welding only drives
//! connectivity: the packed output carries the original, unwelded vertices.
//!
//! Progress is reported and cancellation polled every [`SPLIT_BATCH`] loop
//! iterations.

pub mod task;
pub mod union_find;
pub mod weld;

pub use task::{SplitCommand, SplitResponse, SplitTask};
pub use union_find::UnionFind;
pub use weld::Welder;

use std::collections::HashMap;

use glam::DVec3;

use crate::constants::SPLIT_BATCH;
use crate::error::{SoupError, SplitError};
use crate::types::{Aabb, MeshComponent, TriangleSoup};

/// Split phases, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPhase {
  Welding,
  Connectivity,
  Packing,
}

impl SplitPhase {
  pub fn as_str(self) -> &'static str {
    match self {
      SplitPhase::Welding => "weld",
      SplitPhase::Connectivity => "connect",
      SplitPhase::Packing => "pack",
    }
  }

  /// Overall progress at `fraction` of the way through this phase.
  pub fn progress(self, fraction: f64) -> f64 {
    let base = match self {
      SplitPhase::Welding => 0.0,
      SplitPhase::Connectivity => 1.0,
      SplitPhase::Packing => 2.0,
    };
    ((base + fraction.clamp(0.0, 1.0)) / 3.0).min(1.0)
  }
}

/// Receives progress; returning `false` cancels the split.
pub trait SplitObserver {
  fn progress(&mut self, value: f64, phase: SplitPhase) -> bool;
}

impl<F: FnMut(f64, SplitPhase) -> bool> SplitObserver for F {
  fn progress(&mut self, value: f64, phase: SplitPhase) -> bool {
    self(value, phase)
  }
}

/// Input of one split. The buffers move into the worker.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitRequest {
  pub positions: Vec<f32>,
  pub normals: Option<Vec<f32>>,
  /// Weld distance.
  pub epsilon: f64,
  /// Components with fewer triangles are dropped.
  pub min_triangles: usize,
}

impl SplitRequest {
  pub fn new(positions: Vec<f32>) -> Self {
    Self {
      positions,
      normals: None,
      epsilon: 1e-4,
      min_triangles: 1,
    }
  }

  pub fn from_soup(soup: TriangleSoup) -> Self {
    Self {
      normals: soup.normals,
      ..Self::new(soup.positions)
    }
  }

  pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
    self.normals = Some(normals);
    self
  }

  pub fn with_epsilon(mut self, epsilon: f64) -> Self {
    self.epsilon = epsilon;
    self
  }

  pub fn with_min_triangles(mut self, min_triangles: usize) -> Self {
    self.min_triangles = min_triangles;
    self
  }

  pub fn validate(&self) -> Result<(), SplitError> {
    if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
      return Err(SplitError::InvalidEpsilon(self.epsilon));
    }
    if self.positions.len() % 9 != 0 {
      return Err(SoupError::PositionLength(self.positions.len()).into());
    }
    if let Some(normals) = &self.normals {
      if normals.len() != self.positions.len() {
        return Err(
          SoupError::AttributeLength {
            kind: "normal",
            expected: self.positions.len(),
            found: normals.len(),
          }
          .into(),
        );
      }
    }
    Ok(())
  }
}

fn checkpoint<O: SplitObserver + ?Sized>(
  observer: &mut O,
  phase: SplitPhase,
  done: usize,
  total: usize,
) -> Result<(), SplitError> {
  let fraction = if total == 0 { 1.0 } else { done as f64 / total as f64 };
  if observer.progress(phase.progress(fraction), phase) {
    Ok(())
  } else {
    Err(SplitError::Canceled)
  }
}

#[inline]
fn vertex(positions: &[f32], v: usize) -> DVec3 {
  let p = &positions[v * 3..v * 3 + 3];
  DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Split `request` into connected components.
///
/// Components are ordered by their first triangle in the input.
#[tracing::instrument(skip_all, name = "split_mesh")]
pub fn split_mesh<O: SplitObserver + ?Sized>(
  request: &SplitRequest,
  observer: &mut O,
) -> Result<Vec<MeshComponent>, SplitError> {
  request.validate()?;
  let positions = &request.positions;
  let vertex_count = positions.len() / 3;
  let triangle_count = positions.len() / 9;

  let mut welder = Welder::with_capacity(request.epsilon, vertex_count);
  let mut welded = Vec::with_capacity(vertex_count);
  for v in 0..vertex_count {
    if v % SPLIT_BATCH == 0 {
      checkpoint(observer, SplitPhase::Welding, v, vertex_count)?;
    }
    welded.push(welder.weld(vertex(positions, v)));
  }
  checkpoint(observer, SplitPhase::Welding, vertex_count, vertex_count)?;

  let mut sets = UnionFind::new(triangle_count);
  let mut owner = vec![u32::MAX; welder.len()];
  for t in 0..triangle_count {
    if t % SPLIT_BATCH == 0 {
      checkpoint(observer, SplitPhase::Connectivity, t, triangle_count)?;
    }
    for &id in &welded[t * 3..t * 3 + 3] {
      let first = &mut owner[id as usize];
      if *first == u32::MAX {
        *first = t as u32;
      } else {
        sets.union(*first, t as u32);
      }
    }
  }
  checkpoint(observer, SplitPhase::Connectivity, triangle_count, triangle_count)?;

  let mut group_of_root: HashMap<u32, usize> = HashMap::new();
  let mut groups: Vec<Vec<u32>> = Vec::new();
  for t in 0..triangle_count as u32 {
    let root = sets.find(t);
    let group = *group_of_root.entry(root).or_insert_with(|| {
      groups.push(Vec::new());
      groups.len() - 1
    });
    groups[group].push(t);
  }
  let total_groups = groups.len();
  groups.retain(|g| g.len() >= request.min_triangles);

  let kept: usize = groups.iter().map(Vec::len).sum();
  let mut packed = 0;
  let mut parts = Vec::with_capacity(groups.len());
  for group in &groups {
    let mut soup = TriangleSoup::from_positions(Vec::with_capacity(group.len() * 9));
    if request.normals.is_some() {
      soup.normals = Some(Vec::with_capacity(group.len() * 9));
    }
    let mut bounds = Aabb::empty();
    for &t in group {
      if packed % SPLIT_BATCH == 0 {
        checkpoint(observer, SplitPhase::Packing, packed, kept)?;
      }
      packed += 1;
      let range = t as usize * 9..t as usize * 9 + 9;
      soup.positions.extend_from_slice(&positions[range.clone()]);
      if let (Some(out), Some(normals)) = (soup.normals.as_mut(), &request.normals) {
        out.extend_from_slice(&normals[range]);
      }
      for k in 0..3 {
        bounds.encapsulate(vertex(positions, t as usize * 3 + k));
      }
    }
    parts.push(MeshComponent {
      soup,
      bounds,
      triangle_count: group.len(),
    });
  }
  checkpoint(observer, SplitPhase::Packing, kept, kept)?;

  tracing::debug!(
    triangles = triangle_count,
    welded = welder.len(),
    components = total_groups,
    kept = parts.len(),
    "split mesh"
  );
  Ok(parts)
}
