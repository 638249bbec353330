//! Epsilon welding through a uniform spatial hash.
//!
//! ```text
//!   cell(p) = round(p / ε)          ┌───┬───┬───┐
//!                                   │   │ ● │   │  ● representative
//!   weld(p): scan the 27 cells      ├───┼───┼───┤  ○ query
//!   around cell(p) for a            │   │ ○ │   │
//!   representative with |r - p| ≤ ε ├───┼───┼───┤
//!                                   │   │   │   │
//!                                   └───┴───┴───┘
//! ```
//!
//! The distance test uses the exact epsilon, so cell membership alone never
//! welds two vertices.

use std::collections::HashMap;

use glam::DVec3;
use smallvec::SmallVec;

/// Incremental vertex welder. Ids are dense, in first-seen order.
#[derive(Debug)]
pub struct Welder {
  epsilon: f64,
  cells: HashMap<[i64; 3], SmallVec<[u32; 2]>>,
  representatives: Vec<DVec3>,
}

impl Welder {
  pub fn new(epsilon: f64) -> Self {
    Self {
      epsilon,
      cells: HashMap::new(),
      representatives: Vec::new(),
    }
  }

  pub fn with_capacity(epsilon: f64, vertices: usize) -> Self {
    Self {
      epsilon,
      cells: HashMap::with_capacity(vertices),
      representatives: Vec::with_capacity(vertices),
    }
  }

  #[inline]
  fn cell(&self, p: DVec3) -> [i64; 3] {
    (p / self.epsilon).round().as_i64vec3().to_array()
  }

  /// Welded id for `p`, registering a new representative if none is close.
  pub fn weld(&mut self, p: DVec3) -> u32 {
    let [cx, cy, cz] = self.cell(p);
    for dz in -1..=1 {
      for dy in -1..=1 {
        for dx in -1..=1 {
          let Some(ids) = offset([cx, cy, cz], [dx, dy, dz]).and_then(|c| self.cells.get(&c))
          else {
            continue;
          };
          if let Some(&id) = ids
            .iter()
            .find(|&&id| self.representatives[id as usize].distance(p) <= self.epsilon)
          {
            return id;
          }
        }
      }
    }

    let id = self.representatives.len() as u32;
    self.representatives.push(p);
    self.cells.entry([cx, cy, cz]).or_default().push(id);
    id
  }

  /// Number of distinct welded vertices.
  pub fn len(&self) -> usize {
    self.representatives.len()
  }

  pub fn is_empty(&self) -> bool {
    self.representatives.is_empty()
  }
}

/// Neighbor cell, `None` past the i64 range.
#[inline]
fn offset(cell: [i64; 3], delta: [i64; 3]) -> Option<[i64; 3]> {
  Some([
    cell[0].checked_add(delta[0])?,
    cell[1].checked_add(delta[1])?,
    cell[2].checked_add(delta[2])?,
  ])
}
