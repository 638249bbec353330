use super::*;

#[test]
fn test_safe_normalize_unit() {
  let v = safe_normalize(DVec3::new(3.0, 0.0, 4.0));
  assert!((v.length() - 1.0).abs() < 1e-12);
  assert!((v.x - 0.6).abs() < 1e-12);
}

#[test]
fn test_safe_normalize_zero_stays_zero() {
  let v = safe_normalize(DVec3::ZERO);
  assert_eq!(v, DVec3::ZERO);
  assert!(v.is_finite());
}

#[test]
fn test_tolerance_ladder_ordering() {
  assert!(NORMALIZE_EPSILON < DEGENERATE_EPSILON);
  assert!(SEGMENT_QUANTUM < CLIP_EPSILON);
  assert!(SPLIT_BATCH > 0);
}
