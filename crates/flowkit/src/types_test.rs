use super::*;

fn unit_triangle() -> TriangleSoup {
  TriangleSoup::from_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    .with_normals(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
}

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = Aabb::empty();
  assert!(!aabb.is_valid());
  aabb.encapsulate(DVec3::new(1.0, 2.0, 3.0));
  aabb.encapsulate(DVec3::new(-1.0, -2.0, -3.0));

  assert_eq!(aabb.min, DVec3::new(-1.0, -2.0, -3.0));
  assert_eq!(aabb.max, DVec3::new(1.0, 2.0, 3.0));
  assert!(aabb.is_valid());
}

#[test]
fn test_aabb_contains_boundary() {
  let aabb = Aabb::new(DVec3::ZERO, DVec3::ONE);
  assert!(aabb.contains_point(DVec3::ONE));
  assert!(aabb.contains_point(DVec3::ZERO));
  assert!(!aabb.contains_point(DVec3::new(1.0 + 1e-9, 0.5, 0.5)));
}

#[test]
fn test_aabb_corners_and_edges() {
  let aabb = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
  let corners = aabb.corners();
  assert_eq!(corners[0], DVec3::splat(-1.0));
  assert_eq!(corners[7], DVec3::splat(1.0));
  // Every edge joins corners that differ on exactly one axis.
  for (a, b) in Aabb::EDGES {
    assert_eq!((a ^ b).count_ones(), 1);
    assert_eq!(corners[a].distance(corners[b]), 2.0);
  }
}

#[test]
fn test_soup_counts_and_bounds() {
  let soup = unit_triangle();
  assert!(soup.validate().is_ok());
  assert_eq!(soup.triangle_count(), 1);
  assert_eq!(soup.vertex_count(), 3);

  let bounds = soup.bounds();
  assert_eq!(bounds.min, DVec3::ZERO);
  assert_eq!(bounds.max, DVec3::new(1.0, 1.0, 0.0));
}

#[test]
fn test_soup_validate_rejects_bad_lengths() {
  let soup = TriangleSoup::from_positions(vec![0.0; 8]);
  assert_eq!(soup.validate(), Err(SoupError::PositionLength(8)));

  let soup = TriangleSoup::from_positions(vec![0.0; 9]).with_normals(vec![0.0; 6]);
  assert!(matches!(
    soup.validate(),
    Err(SoupError::AttributeLength { kind: "normal", .. })
  ));
}

#[test]
fn test_soup_transformed_moves_positions_and_rotates_normals() {
  let soup = unit_triangle();
  let transform = DAffine3::from_translation(DVec3::new(0.0, 0.0, 5.0))
    * DAffine3::from_rotation_x(std::f64::consts::FRAC_PI_2);
  let moved = soup.transformed(&transform);

  assert!((moved.vertex(2) - DVec3::new(0.0, 0.0, 6.0)).length() < 1e-6);
  let n = moved.vertex_normal(0).unwrap();
  assert!((n - DVec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
}

#[test]
fn test_soup_append_keeps_shared_attributes() {
  let mut soup = TriangleSoup::new();
  soup.append(&unit_triangle());
  soup.append(&unit_triangle());
  assert_eq!(soup.triangle_count(), 2);
  assert_eq!(soup.normals.as_ref().map(Vec::len), Some(18));

  // A soup without normals drops the normal buffer.
  soup.append(&TriangleSoup::from_positions(vec![0.0; 9]));
  assert_eq!(soup.triangle_count(), 3);
  assert!(soup.normals.is_none());
  assert!(soup.validate().is_ok());
}

#[test]
fn test_streamline_path_speeds_padded() {
  let path = StreamlinePath::new(vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)], vec![1.0]);
  assert_eq!(path.speeds(), &[1.0, 0.0, 0.0]);
  assert!(path.is_path());
  assert_eq!(path.arc_length(), 2.0);
  assert!(!StreamlinePath::from_points(vec![DVec3::ZERO]).is_path());
}

#[test]
fn test_vis_mesh_kinds() {
  let mesh = VisMesh::Clip(ClipResult::default());
  assert_eq!(mesh.kind(), "clip");
  assert!(mesh.soup().is_empty());
}
