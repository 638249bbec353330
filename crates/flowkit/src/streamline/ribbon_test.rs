use super::*;
use crate::colormap::TransferFunction;

fn straight_path(n: usize) -> StreamlinePath {
  let points = (0..n).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
  let speeds = (0..n).map(|i| i as f64).collect();
  StreamlinePath::new(points, speeds)
}

#[test]
fn test_triangle_count_is_two_per_segment() {
  let mesh = build_ribbon(&straight_path(5), &RibbonConfig::new(1.0));
  assert_eq!(mesh.soup.triangle_count(), 8);
  assert_eq!(mesh.point_count, 5);
  assert_eq!(mesh.arc_length, 4.0);
  mesh.soup.validate().unwrap();
}

#[test]
fn test_short_path_is_empty() {
  let mesh = build_ribbon(&straight_path(1), &RibbonConfig::default());
  assert!(mesh.soup.is_empty());
  assert_eq!(mesh.point_count, 1);
}

#[test]
fn test_straight_ribbon_lies_across_up() {
  let mesh = build_ribbon(&straight_path(2), &RibbonConfig::new(1.0));
  let soup = &mesh.soup;
  // X tangent, Y up: side is +Z.
  assert_eq!(soup.vertex(0), DVec3::new(0.0, 0.0, 0.5));
  assert_eq!(soup.vertex(1), DVec3::new(0.0, 0.0, -0.5));
  assert_eq!(soup.vertex(2), DVec3::new(1.0, 0.0, -0.5));
  assert_eq!(soup.vertex(5), DVec3::new(1.0, 0.0, 0.5));
  for v in 0..soup.vertex_count() {
    assert_eq!(soup.vertex_normal(v), Some(DVec3::Z));
  }
}

#[test]
fn test_uv_follows_arc_fraction() {
  let mesh = build_ribbon(&straight_path(3), &RibbonConfig::new(1.0));
  let uvs = mesh.soup.uvs.as_ref().unwrap();
  // Second segment starts at the midpoint and ends at the tip.
  assert_eq!(&uvs[12..14], &[0.5, 0.0]);
  assert_eq!(&uvs[22..24], &[1.0, 0.0]);
}

#[test]
fn test_tangent_parallel_to_up_falls_back() {
  let path = StreamlinePath::from_points(vec![DVec3::ZERO, DVec3::Y]);
  let mesh = build_ribbon(&path, &RibbonConfig::new(2.0));
  // Y × X = -Z.
  assert_eq!(mesh.soup.vertex(0), DVec3::new(0.0, 0.0, -1.0));
  assert!(mesh.soup.positions.iter().all(|v| v.is_finite()));
}

#[test]
fn test_custom_up_vector() {
  let mesh = build_ribbon(&straight_path(2), &RibbonConfig::new(1.0).with_up(DVec3::Z));
  // X × Z = -Y.
  assert_eq!(mesh.soup.vertex(0), DVec3::new(0.0, -0.5, 0.0));
}

#[test]
fn test_colored_by_speed() {
  let path = straight_path(3);
  let gray = TransferFunction::grayscale();
  let mesh = build_ribbon_by_speed(&path, &RibbonConfig::new(1.0), &gray, (0.0, 2.0));
  let colors = mesh.soup.colors.as_ref().unwrap();
  assert_eq!(colors.len(), mesh.soup.vertex_count() * 4);
  // First vertex sits on point 0 (speed 0), last on point 2 (speed 2).
  assert_eq!(&colors[0..4], &[0.0, 0.0, 0.0, 1.0]);
  let tail = colors.len() - 4;
  assert_eq!(&colors[tail..], &[1.0, 1.0, 1.0, 1.0]);
  mesh.soup.validate().unwrap();
}
