//! Core value types passed between pipeline stages.
//!
//! Every type here is created by one stage and consumed by the next; none is
//! mutated after it leaves the stage that built it.

use glam::{DAffine3, DVec3};

use crate::constants::safe_normalize;
use crate::error::SoupError;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl Aabb {
  /// Box edges as corner index pairs into [`Aabb::corners`].
  pub const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
  ];

  /// Create AABB from min/max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: DVec3::splat(f64::INFINITY),
      max: DVec3::splat(f64::NEG_INFINITY),
    }
  }

  /// Create AABB from center and half-extents.
  pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: DVec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
  }

  /// Check if this AABB contains a point (boundary included).
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// The 8 corners, bit `i` of the index selecting max on axis `i`.
  pub fn corners(&self) -> [DVec3; 8] {
    std::array::from_fn(|i| {
      DVec3::new(
        if i & 1 == 0 { self.min.x } else { self.max.x },
        if i & 2 == 0 { self.min.y } else { self.max.y },
        if i & 4 == 0 { self.min.z } else { self.max.z },
      )
    })
  }
}

impl Default for Aabb {
  fn default() -> Self {
    Self::empty()
  }
}

/// Non-indexed triangle list with optional per-vertex attributes.
///
/// Layout: 9 position floats per triangle; normals parallel to positions;
/// colors 4 floats (RGBA) and UVs 2 floats per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
  pub positions: Vec<f32>,
  pub normals: Option<Vec<f32>>,
  pub colors: Option<Vec<f32>>,
  pub uvs: Option<Vec<f32>>,
}

impl TriangleSoup {
  pub fn new() -> Self {
    Self::default()
  }

  /// Empty soup with the chosen attribute buffers allocated.
  pub fn with_attributes(normals: bool, colors: bool, uvs: bool) -> Self {
    Self {
      positions: Vec::new(),
      normals: normals.then(Vec::new),
      colors: colors.then(Vec::new),
      uvs: uvs.then(Vec::new),
    }
  }

  pub fn from_positions(positions: Vec<f32>) -> Self {
    Self {
      positions,
      ..Default::default()
    }
  }

  pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
    self.normals = Some(normals);
    self
  }

  /// Check buffer lengths against the layout contract.
  pub fn validate(&self) -> Result<(), SoupError> {
    if self.positions.len() % 9 != 0 {
      return Err(SoupError::PositionLength(self.positions.len()));
    }
    let vertices = self.vertex_count();
    let checks = [
      ("normal", &self.normals, 3),
      ("color", &self.colors, 4),
      ("uv", &self.uvs, 2),
    ];
    for (kind, buffer, stride) in checks {
      if let Some(buffer) = buffer {
        if buffer.len() != vertices * stride {
          return Err(SoupError::AttributeLength {
            kind,
            expected: vertices * stride,
            found: buffer.len(),
          });
        }
      }
    }
    Ok(())
  }

  #[inline]
  pub fn vertex_count(&self) -> usize {
    self.positions.len() / 3
  }

  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.positions.len() / 9
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Vertex position `v` widened to f64.
  #[inline]
  pub fn vertex(&self, v: usize) -> DVec3 {
    let p = &self.positions[v * 3..v * 3 + 3];
    DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
  }

  /// Vertex normal `v`, if the soup carries normals.
  #[inline]
  pub fn vertex_normal(&self, v: usize) -> Option<DVec3> {
    self.normals.as_ref().map(|n| {
      let n = &n[v * 3..v * 3 + 3];
      DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64)
    })
  }

  /// Corners of triangle `t`.
  #[inline]
  pub fn triangle(&self, t: usize) -> [DVec3; 3] {
    [self.vertex(t * 3), self.vertex(t * 3 + 1), self.vertex(t * 3 + 2)]
  }

  /// Bounding box of all positions (empty box for an empty soup).
  pub fn bounds(&self) -> Aabb {
    let mut bounds = Aabb::empty();
    for v in 0..self.vertex_count() {
      bounds.encapsulate(self.vertex(v));
    }
    bounds
  }

  /// Append a triangle with one flat normal. The normal is only written if
  /// the soup carries a normal buffer.
  pub fn push_triangle(&mut self, triangle: [DVec3; 3], normal: DVec3) {
    for p in triangle {
      push_vec3(&mut self.positions, p);
      if let Some(normals) = self.normals.as_mut() {
        push_vec3(normals, normal);
      }
    }
  }

  /// Append one vertex with every attribute the soup carries.
  pub(crate) fn push_vertex(
    &mut self,
    position: DVec3,
    normal: DVec3,
    color: [f32; 4],
    uv: [f32; 2],
  ) {
    push_vec3(&mut self.positions, position);
    if let Some(normals) = self.normals.as_mut() {
      push_vec3(normals, normal);
    }
    if let Some(colors) = self.colors.as_mut() {
      colors.extend_from_slice(&color);
    }
    if let Some(uvs) = self.uvs.as_mut() {
      uvs.extend_from_slice(&uv);
    }
  }

  /// Copy with positions mapped through `transform` and normals through its
  /// inverse transpose.
  pub fn transformed(&self, transform: &DAffine3) -> TriangleSoup {
    let mut out = self.clone();
    for v in 0..self.vertex_count() {
      let p = transform.transform_point3(self.vertex(v));
      write_vec3(&mut out.positions, v, p);
    }
    if let Some(normals) = out.normals.as_mut() {
      let normal_matrix = transform.matrix3.inverse().transpose();
      for v in 0..normals.len() / 3 {
        let n = &normals[v * 3..v * 3 + 3];
        let n = DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64);
        write_vec3(normals, v, safe_normalize(normal_matrix * n));
      }
    }
    out
  }

  /// Append every triangle of `other`. Attribute buffers missing on either
  /// side are dropped from the result.
  pub fn append(&mut self, other: &TriangleSoup) {
    fn merge(a: &mut Option<Vec<f32>>, b: &Option<Vec<f32>>, a_empty: bool) {
      if a_empty {
        *a = b.clone();
        return;
      }
      if let (Some(mut merged), Some(b)) = (a.take(), b) {
        merged.extend_from_slice(b);
        *a = Some(merged);
      }
    }
    if other.is_empty() {
      return;
    }
    let was_empty = self.is_empty();
    merge(&mut self.normals, &other.normals, was_empty);
    merge(&mut self.colors, &other.colors, was_empty);
    merge(&mut self.uvs, &other.uvs, was_empty);
    self.positions.extend_from_slice(&other.positions);
  }
}

#[inline]
fn push_vec3(buffer: &mut Vec<f32>, v: DVec3) {
  buffer.extend_from_slice(&[v.x as f32, v.y as f32, v.z as f32]);
}

#[inline]
fn write_vec3(buffer: &mut [f32], index: usize, v: DVec3) {
  buffer[index * 3] = v.x as f32;
  buffer[index * 3 + 1] = v.y as f32;
  buffer[index * 3 + 2] = v.z as f32;
}

/// A triangle soup placed in world space by its owner's transform.
#[derive(Clone, Copy, Debug)]
pub struct PlacedSoup<'a> {
  pub transform: DAffine3,
  pub soup: &'a TriangleSoup,
}

impl<'a> PlacedSoup<'a> {
  pub fn new(transform: DAffine3, soup: &'a TriangleSoup) -> Self {
    Self { transform, soup }
  }

  pub fn identity(soup: &'a TriangleSoup) -> Self {
    Self::new(DAffine3::IDENTITY, soup)
  }
}

/// Traced integral curve. Fewer than 2 points means "no path".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamlinePath {
  points: Vec<DVec3>,
  speeds: Vec<f64>,
}

impl StreamlinePath {
  /// Build a path; `speeds` is padded with zeros or truncated to match.
  pub fn new(points: Vec<DVec3>, mut speeds: Vec<f64>) -> Self {
    speeds.resize(points.len(), 0.0);
    Self { points, speeds }
  }

  pub fn from_points(points: Vec<DVec3>) -> Self {
    Self::new(points, Vec::new())
  }

  pub fn points(&self) -> &[DVec3] {
    &self.points
  }

  /// Unnormalized field magnitude at each point.
  pub fn speeds(&self) -> &[f64] {
    &self.speeds
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// At least two points, so a ribbon can be built.
  pub fn is_path(&self) -> bool {
    self.points.len() >= 2
  }

  pub fn arc_length(&self) -> f64 {
    self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
  }
}

/// Output of the solid and plane clippers, with diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipResult {
  pub soup: TriangleSoup,
  /// Triangles fed in, over all placed soups.
  pub input_triangles: usize,
  /// Triangles emitted, caps included.
  pub output_triangles: usize,
  /// Triangles produced by cap reconstruction.
  pub cap_triangles: usize,
  /// Fan triangles emitted with reversed winding to match their seed normal.
  pub winding_flips: usize,
}

/// One connected piece of a split mesh. Owns its buffers outright.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshComponent {
  pub soup: TriangleSoup,
  pub bounds: Aabb,
  pub triangle_count: usize,
}

/// Ribbon geometry for one traced streamline.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamlineMesh {
  pub soup: TriangleSoup,
  pub point_count: usize,
  pub arc_length: f64,
}

/// Colour-mapped slice through a scalar field.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarSliceMesh {
  pub soup: TriangleSoup,
  /// Plane/box intersection polygon in world space, counter-clockwise in the
  /// plane's (u, v) frame.
  pub polygon: Vec<DVec3>,
  /// Scalar range mapped onto the colormap.
  pub range: (f64, f64),
}

/// Visualization geometry handed to an external renderer or exporter.
#[derive(Clone, Debug, PartialEq)]
pub enum VisMesh {
  Streamline(StreamlineMesh),
  ScalarSlice(ScalarSliceMesh),
  Clip(ClipResult),
  Component(MeshComponent),
}

impl VisMesh {
  pub fn soup(&self) -> &TriangleSoup {
    match self {
      VisMesh::Streamline(mesh) => &mesh.soup,
      VisMesh::ScalarSlice(mesh) => &mesh.soup,
      VisMesh::Clip(result) => &result.soup,
      VisMesh::Component(component) => &component.soup,
    }
  }

  pub fn into_soup(self) -> TriangleSoup {
    match self {
      VisMesh::Streamline(mesh) => mesh.soup,
      VisMesh::ScalarSlice(mesh) => mesh.soup,
      VisMesh::Clip(result) => result.soup,
      VisMesh::Component(component) => component.soup,
    }
  }

  /// Short label for logs and file names.
  pub fn kind(&self) -> &'static str {
    match self {
      VisMesh::Streamline(_) => "streamline",
      VisMesh::ScalarSlice(_) => "slice",
      VisMesh::Clip(_) => "clip",
      VisMesh::Component(_) => "component",
    }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
