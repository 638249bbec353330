//! Disjoint sets over dense `u32` indices.
//!
//! `find` is iterative with full path compression, so deep chains on large
//! meshes never recurse.

#[derive(Clone, Debug)]
pub struct UnionFind {
  parent: Vec<u32>,
  rank: Vec<u8>,
}

impl UnionFind {
  pub fn new(len: usize) -> Self {
    Self {
      parent: (0..len as u32).collect(),
      rank: vec![0; len],
    }
  }

  pub fn len(&self) -> usize {
    self.parent.len()
  }

  pub fn is_empty(&self) -> bool {
    self.parent.is_empty()
  }

  /// Representative of `x`'s set.
  pub fn find(&mut self, x: u32) -> u32 {
    let mut root = x;
    while self.parent[root as usize] != root {
      root = self.parent[root as usize];
    }
    let mut node = x;
    while self.parent[node as usize] != root {
      let next = self.parent[node as usize];
      self.parent[node as usize] = root;
      node = next;
    }
    root
  }

  /// Merge the sets of `a` and `b`. Returns false if already joined.
  pub fn union(&mut self, a: u32, b: u32) -> bool {
    let (ra, rb) = (self.find(a), self.find(b));
    if ra == rb {
      return false;
    }
    let (low, high) = if self.rank[ra as usize] < self.rank[rb as usize] {
      (ra, rb)
    } else {
      (rb, ra)
    };
    self.parent[low as usize] = high;
    if self.rank[low as usize] == self.rank[high as usize] {
      self.rank[high as usize] += 1;
    }
    true
  }
}
