use std::collections::HashMap;

use glam::DAffine3;

use super::*;

/// Octahedron `|x| + |y| + |z| = r` with outward winding and flat normals.
fn octahedron(r: f64) -> TriangleSoup {
  let mut soup = TriangleSoup::with_attributes(true, false, false);
  for signs in 0..8 {
    let s = |bit: usize| if signs & (1 << bit) == 0 { 1.0 } else { -1.0 };
    let a = DVec3::new(s(0) * r, 0.0, 0.0);
    let mut b = DVec3::new(0.0, s(1) * r, 0.0);
    let mut c = DVec3::new(0.0, 0.0, s(2) * r);
    if s(0) * s(1) * s(2) < 0.0 {
      std::mem::swap(&mut b, &mut c);
    }
    let normal = (b - a).cross(c - a).normalize();
    soup.push_triangle([a, b, c], normal);
  }
  soup
}

/// Axis-aligned cube with outward winding.
fn cube(center: DVec3, half: f64) -> TriangleSoup {
  let mut soup = TriangleSoup::with_attributes(true, false, false);
  let aabb = Aabb::from_center_half_extents(center, DVec3::splat(half));
  let c = aabb.corners();
  // Quads as corner indices, counter-clockwise seen from outside.
  let quads = [
    ([0, 4, 6, 2], -DVec3::X),
    ([1, 3, 7, 5], DVec3::X),
    ([0, 1, 5, 4], -DVec3::Y),
    ([2, 6, 7, 3], DVec3::Y),
    ([0, 2, 3, 1], -DVec3::Z),
    ([4, 5, 7, 6], DVec3::Z),
  ];
  for (q, normal) in quads {
    soup.push_triangle([c[q[0]], c[q[1]], c[q[2]]], normal);
    soup.push_triangle([c[q[0]], c[q[2]], c[q[3]]], normal);
  }
  soup
}

/// Every undirected edge must be shared by an even number of triangles.
fn assert_closed(soup: &TriangleSoup) {
  let key = |p: DVec3| (p * 1e4).round().as_i64vec3().to_array();
  let mut edges: HashMap<_, usize> = HashMap::new();
  for t in 0..soup.triangle_count() {
    let tri = soup.triangle(t).map(key);
    for i in 0..3 {
      let (a, b) = (tri[i], tri[(i + 1) % 3]);
      *edges.entry(if a < b { (a, b) } else { (b, a) }).or_default() += 1;
    }
  }
  for (edge, count) in edges {
    assert_eq!(count % 2, 0, "open edge {edge:?}");
  }
}

fn unit_box() -> Aabb {
  Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0))
}

#[test]
fn test_box_faces_are_axis_planes() {
  let clipper = SolidClipper::new(unit_box());
  let planes = clipper.planes();
  assert_eq!(planes[0].axis(), Some((0, -1.0)));
  assert_eq!(planes[1].axis(), Some((0, 1.0)));
  assert_eq!(planes[5].normal, -DVec3::Z);
}

#[test]
fn test_enclosing_cube_has_no_surface_inside() {
  // Every face of a side-4 cube lies outside [-1, 1]^3.
  let cube = cube(DVec3::ZERO, 2.0);
  let result = SolidClipper::new(unit_box()).clip(&[PlacedSoup::identity(&cube)]);
  assert_eq!(result.input_triangles, 12);
  assert_eq!(result.output_triangles, 0);
  assert!(result.soup.is_empty());
}

#[test]
fn test_octahedron_clip_is_closed() {
  let solid = octahedron(2.0);
  let result = SolidClipper::new(unit_box()).clip(&[PlacedSoup::identity(&solid)]);

  assert_eq!(result.input_triangles, 8);
  // One triangle per face, a diamond cap on each box face.
  assert_eq!(result.cap_triangles, 12);
  assert_eq!(result.output_triangles, 20);
  assert_eq!(result.winding_flips, 0);
  assert_eq!(result.soup.bounds(), unit_box());
  result.soup.validate().unwrap();
  assert_closed(&result.soup);
}

#[test]
fn test_caps_face_outward() {
  let solid = octahedron(2.0);
  let result = SolidClipper::new(unit_box()).clip(&[PlacedSoup::identity(&solid)]);
  let soup = &result.soup;
  let first_cap = result.output_triangles - result.cap_triangles;
  for t in first_cap..soup.triangle_count() {
    let [a, b, c] = soup.triangle(t);
    let normal = (b - a).cross(c - a);
    let centroid = (a + b + c) / 3.0;
    assert!(normal.dot(centroid) > 0.0);
  }
}

#[test]
fn test_clip_is_idempotent() {
  let clipper = SolidClipper::new(unit_box());
  let solid = octahedron(2.0);
  let first = clipper.clip(&[PlacedSoup::identity(&solid)]);
  let second = clipper.clip(&[PlacedSoup::identity(&first.soup)]);

  assert_eq!(second.input_triangles, first.output_triangles);
  assert_eq!(second.output_triangles, first.output_triangles);
  assert_eq!(second.cap_triangles, 0);
  assert_closed(&second.soup);
}

#[test]
fn test_geometry_inside_is_untouched() {
  let small = cube(DVec3::ZERO, 0.5);
  let result = SolidClipper::new(unit_box()).clip(&[PlacedSoup::identity(&small)]);
  assert_eq!(result.output_triangles, 12);
  assert_eq!(result.cap_triangles, 0);
  assert_eq!(result.soup.positions, small.positions);
}

#[test]
fn test_transform_is_applied() {
  let solid = octahedron(1.0);
  let placed = PlacedSoup::new(DAffine3::from_scale(DVec3::splat(2.0)), &solid);
  let result = SolidClipper::new(unit_box()).clip(&[placed]);
  assert_eq!(result.output_triangles, 20);
  assert_closed(&result.soup);
}

#[test]
fn test_reversed_normals_count_flips() {
  let mut solid = octahedron(2.0);
  if let Some(normals) = solid.normals.as_mut() {
    normals.iter_mut().for_each(|n| *n = -*n);
  }
  let result = SolidClipper::new(unit_box()).clip(&[PlacedSoup::identity(&solid)]);
  assert_eq!(result.winding_flips, 8);
  assert_eq!(result.output_triangles, 20);
}

#[test]
fn test_malformed_soup_is_skipped() {
  let broken = TriangleSoup::from_positions(vec![0.0; 10]);
  let solid = octahedron(2.0);
  let result = SolidClipper::new(unit_box())
    .clip(&[PlacedSoup::identity(&broken), PlacedSoup::identity(&solid)]);
  assert_eq!(result.input_triangles, 8);
  assert_eq!(result.output_triangles, 20);
}
