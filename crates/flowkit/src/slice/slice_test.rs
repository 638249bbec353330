use super::*;
use crate::colormap::TransferFunction;
use crate::field::{FieldSampler, StructuredField};

/// 3×3×3 lattice over [-1, 1]^3 whose scalar equals the node's x index.
fn ramp_field() -> StructuredField {
  let field = StructuredField::new([3, 3, 3], DVec3::ONE, DVec3::splat(-1.0)).unwrap();
  let mut scalars = vec![0.0; field.point_count()];
  for k in 0..3 {
    for j in 0..3 {
      for i in 0..3 {
        scalars[field.index(i, j, k)] = i as f32;
      }
    }
  }
  field.with_scalars(scalars).unwrap()
}

fn vertex_color(soup: &TriangleSoup, v: usize) -> [f32; 4] {
  let colors = soup.colors.as_ref().unwrap();
  [colors[v * 4], colors[v * 4 + 1], colors[v * 4 + 2], colors[v * 4 + 3]]
}

#[test]
fn test_axis_plane_slice() {
  let field = ramp_field();
  let sampler = FieldSampler::new(&field);
  let plane = Plane::from_normal(DVec3::ZERO, DVec3::Z);
  let config = SliceConfig::new(3, 3).with_range(0.0, 2.0);
  let mesh = slice_field(&sampler, &plane, &field.bounds(), &config, &TransferFunction::grayscale());

  assert_eq!(mesh.polygon.len(), 4);
  assert_eq!(mesh.range, (0.0, 2.0));
  assert_eq!(mesh.soup.triangle_count(), 8);
  mesh.soup.validate().unwrap();

  let soup = &mesh.soup;
  let mut saw_center = false;
  let mut saw_outside = false;
  for v in 0..soup.vertex_count() {
    let p = soup.vertex(v);
    assert_eq!(soup.vertex_normal(v), Some(DVec3::Z));
    if p == DVec3::ZERO {
      saw_center = true;
      assert_eq!(vertex_color(soup, v), [0.5, 0.5, 0.5, 1.0]);
    }
    if p == DVec3::new(1.0, 1.0, 0.0) {
      saw_outside = true;
      assert_eq!(vertex_color(soup, v)[3], 0.0);
    }
  }
  assert!(saw_center);
  assert!(saw_outside);
}

#[test]
fn test_reversed_range() {
  let field = ramp_field();
  let sampler = FieldSampler::new(&field);
  let plane = Plane::from_normal(DVec3::ZERO, DVec3::Z);
  let gray = TransferFunction::grayscale();

  let forward = slice_field(&sampler, &plane, &field.bounds(), &SliceConfig::new(3, 3).with_range(0.0, 2.0), &gray);
  let reversed = slice_field(
    &sampler,
    &plane,
    &field.bounds(),
    &SliceConfig::new(3, 3).with_range(0.0, 2.0).with_reversed(true),
    &gray,
  );
  // First vertex is the (-1, -1) node, scalar 0.
  assert_eq!(forward.soup.vertex(0), DVec3::new(-1.0, -1.0, 0.0));
  assert_eq!(vertex_color(&forward.soup, 0), [0.0, 0.0, 0.0, 1.0]);
  assert_eq!(vertex_color(&reversed.soup, 0), [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_oblique_slice_drops_outside_cells() {
  let field = ramp_field();
  let sampler = FieldSampler::new(&field);
  let plane = Plane::from_normal(DVec3::ZERO, DVec3::ONE);
  let mesh = slice_field(
    &sampler,
    &plane,
    &field.bounds(),
    &SliceConfig::new(21, 21).with_range(0.0, 2.0),
    &TransferFunction::grayscale(),
  );
  assert_eq!(mesh.polygon.len(), 6);
  let full = 2 * 20 * 20;
  let triangles = mesh.soup.triangle_count();
  assert!(triangles > full / 2 && triangles < full);
  mesh.soup.validate().unwrap();
}

#[test]
fn test_plane_missing_bounds_is_empty() {
  let field = ramp_field();
  let sampler = FieldSampler::new(&field);
  let plane = Plane::from_normal(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);
  let mesh = slice_field(
    &sampler,
    &plane,
    &field.bounds(),
    &SliceConfig::default(),
    &TransferFunction::grayscale(),
  );
  assert!(mesh.soup.is_empty());
  assert!(mesh.polygon.is_empty());
}

#[test]
fn test_resolution_is_clamped() {
  let field = ramp_field();
  let sampler = FieldSampler::new(&field);
  let plane = Plane::from_normal(DVec3::ZERO, DVec3::Z);
  let mesh = slice_field(
    &sampler,
    &plane,
    &field.bounds(),
    &SliceConfig::new(0, 1),
    &TransferFunction::grayscale(),
  );
  // One cell, two triangles.
  assert_eq!(mesh.soup.triangle_count(), 2);
}
