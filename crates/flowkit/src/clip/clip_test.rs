use super::*;
use crate::constants::CLIP_EPSILON;

fn right_triangle() -> [DVec3; 3] {
  [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 2.0, 0.0)]
}

#[test]
fn test_axis_aligned_half_space_snaps() {
  let keep_below = HalfSpace::new(-DVec3::X, -1.0);
  assert_eq!(keep_below.axis(), Some((0, 1.0)));
  assert_eq!(HalfSpace::through(DVec3::ONE, DVec3::ONE).axis(), None);
  assert_eq!(keep_below.flipped().axis(), Some((0, 1.0)));
  assert_eq!(keep_below.flipped().normal, DVec3::X);
}

#[test]
fn test_fully_inside_is_unchanged() {
  let plane = HalfSpace::new(DVec3::Z, -1.0);
  let polygon = clip_polygon(&right_triangle(), &plane, CLIP_EPSILON);
  assert_eq!(polygon.as_slice(), &right_triangle());
}

#[test]
fn test_fully_outside_is_empty() {
  let plane = HalfSpace::new(DVec3::Z, 1.0);
  assert!(clip_polygon(&right_triangle(), &plane, CLIP_EPSILON).is_empty());
}

#[test]
fn test_cut_corner_grows_polygon() {
  // Keep x <= 1: the corner at x = 2 is replaced by two crossing points.
  let plane = HalfSpace::new(-DVec3::X, -1.0);
  let polygon = clip_polygon(&right_triangle(), &plane, CLIP_EPSILON);
  assert_eq!(
    polygon.as_slice(),
    &[
      DVec3::ZERO,
      DVec3::new(1.0, 0.0, 0.0),
      DVec3::new(1.0, 1.0, 0.0),
      DVec3::new(0.0, 2.0, 0.0),
    ]
  );
}

#[test]
fn test_touching_vertex_adds_no_duplicates() {
  // Keep x <= 2: the far corner lies on the plane.
  let plane = HalfSpace::new(-DVec3::X, -2.0);
  let polygon = clip_polygon(&right_triangle(), &plane, CLIP_EPSILON);
  assert_eq!(polygon.len(), 3);

  // Keep x >= 2: only the on-plane corner survives, which is not a polygon.
  let polygon = clip_polygon(&right_triangle(), &plane.flipped(), CLIP_EPSILON);
  assert!(polygon.is_empty());
}

#[test]
fn test_near_plane_vertex_is_snapped() {
  let triangle = [
    DVec3::new(1.0 + 1e-7, 0.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
    DVec3::new(0.0, 0.0, 1.0),
  ];
  let plane = HalfSpace::new(-DVec3::X, -1.0);
  let polygon = clip_polygon(&triangle, &plane, CLIP_EPSILON);
  assert_eq!(polygon[0], DVec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_clip_against_box_planes() {
  let planes = [HalfSpace::new(-DVec3::X, -1.0), HalfSpace::new(-DVec3::Y, -1.0)];
  let polygon = clip_against(right_triangle(), &planes, CLIP_EPSILON);
  // The hypotenuse x + y = 2 is cut down to the single point (1, 1); the
  // y pass starts with the crossing on the edge back to the origin.
  assert_eq!(
    polygon.as_slice(),
    &[
      DVec3::new(0.0, 1.0, 0.0),
      DVec3::ZERO,
      DVec3::new(1.0, 0.0, 0.0),
      DVec3::new(1.0, 1.0, 0.0),
    ]
  );
}

#[test]
fn test_emit_fan_orients_by_seed() {
  let square = [
    DVec3::ZERO,
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(1.0, 1.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
  ];
  let mut soup = TriangleSoup::with_attributes(true, false, false);
  let stats = emit_fan(&square, DVec3::Z, &mut soup);
  assert_eq!(stats, FanStats { triangles: 2, flips: 0 });
  assert_eq!(soup.vertex_normal(0), Some(DVec3::Z));

  let mut flipped = TriangleSoup::with_attributes(true, false, false);
  let stats = emit_fan(&square, -DVec3::Z, &mut flipped);
  assert_eq!(stats.flips, 2);
  assert_eq!(flipped.vertex_normal(0), Some(-DVec3::Z));
  assert_eq!(flipped.vertex(1), DVec3::new(1.0, 1.0, 0.0));
}

#[test]
fn test_emit_fan_drops_zero_area() {
  let collinear = [
    DVec3::ZERO,
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(2.0, 0.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
  ];
  let mut soup = TriangleSoup::new();
  let stats = emit_fan(&collinear, DVec3::Z, &mut soup);
  assert_eq!(stats.triangles, 1);
  assert_eq!(soup.triangle_count(), 1);
}
