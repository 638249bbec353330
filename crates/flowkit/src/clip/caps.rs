//! Cap reconstruction on the faces of a clip box.
//!
//! Every clipped polygon edge lying on a box face is toggled into that
//! face's segment set. Interior edges arrive twice (once from each adjacent
//! triangle, or once from a side triangle and once from an existing cap) and
//! cancel, leaving the open boundary loop of the cut cross-section.
//!
//! ```text
//!   toggle(a, b):  key = sort(q(a), q(b))      q(p) = round(p_2d / quantum)
//!                  present ? remove : insert
//!
//!   loops:   a ── b ── c          walk unused edges from any endpoint
//!            │         │          until back at the start or stuck
//!            e ─────── d          open chains are dropped
//! ```

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use smallvec::SmallVec;

use crate::constants::SEGMENT_QUANTUM;

type PointKey = [i64; 2];
type SegmentKey = (PointKey, PointKey);

/// Surviving boundary segments on one axis-aligned face.
#[derive(Clone, Debug)]
pub struct CapSegments {
  axis: usize,
  segments: BTreeMap<SegmentKey, (DVec3, DVec3)>,
}

impl CapSegments {
  /// Empty set for a face perpendicular to `axis`.
  pub fn new(axis: usize) -> Self {
    Self {
      axis,
      segments: BTreeMap::new(),
    }
  }

  fn key(&self, p: DVec3) -> PointKey {
    let (a, b) = ((self.axis + 1) % 3, (self.axis + 2) % 3);
    [
      (p[a] / SEGMENT_QUANTUM).round() as i64,
      (p[b] / SEGMENT_QUANTUM).round() as i64,
    ]
  }

  /// Insert the segment, or remove it if already present in either
  /// direction. Segments collapsing to one key are ignored.
  pub fn toggle(&mut self, a: DVec3, b: DVec3) {
    let (ka, kb) = (self.key(a), self.key(b));
    if ka == kb {
      return;
    }
    let key = if ka < kb { (ka, kb) } else { (kb, ka) };
    if self.segments.remove(&key).is_none() {
      self.segments.insert(key, (a, b));
    }
  }

  pub fn len(&self) -> usize {
    self.segments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Closed loops through the surviving segments. Open chains and loops
  /// with fewer than 3 distinct points are discarded.
  pub fn loops(&self) -> Vec<Vec<DVec3>> {
    let mut positions: BTreeMap<PointKey, DVec3> = BTreeMap::new();
    let mut adjacency: BTreeMap<PointKey, SmallVec<[PointKey; 2]>> = BTreeMap::new();
    for (&(ka, kb), &(a, b)) in &self.segments {
      let (pa, pb) = if self.key(a) == ka { (a, b) } else { (b, a) };
      positions.entry(ka).or_insert(pa);
      positions.entry(kb).or_insert(pb);
      adjacency.entry(ka).or_default().push(kb);
      adjacency.entry(kb).or_default().push(ka);
    }

    let mut unused: BTreeSet<SegmentKey> = self.segments.keys().copied().collect();
    let mut loops = Vec::new();
    while let Some(first) = unused.pop_first() {
      let (start, mut current) = first;
      let mut walk = vec![start, current];
      let mut closed = false;
      loop {
        let next = adjacency.get(&current).and_then(|neighbors| {
          neighbors
            .iter()
            .copied()
            .find(|&n| unused.contains(&ordered(current, n)))
        });
        let Some(next) = next else { break };
        unused.remove(&ordered(current, next));
        if next == start {
          closed = true;
          break;
        }
        walk.push(next);
        current = next;
      }

      let distinct: BTreeSet<PointKey> = walk.iter().copied().collect();
      if !closed || distinct.len() < 3 {
        continue;
      }
      loops.push(walk.iter().filter_map(|k| positions.get(k).copied()).collect());
    }
    loops
  }
}

#[inline]
fn ordered(a: PointKey, b: PointKey) -> SegmentKey {
  if a < b {
    (a, b)
  } else {
    (b, a)
  }
}
