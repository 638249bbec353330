use super::*;

#[test]
fn test_new_rejects_zero_dims_and_spacing() {
  assert_eq!(
    StructuredField::new([0, 2, 2], DVec3::ONE, DVec3::ZERO),
    Err(FieldError::InvalidDimensions([0, 2, 2]))
  );
  assert!(matches!(
    StructuredField::new([2, 2, 2], DVec3::new(1.0, 0.0, 1.0), DVec3::ZERO),
    Err(FieldError::InvalidSpacing(_))
  ));
}

#[test]
fn test_new_rejects_unaddressable_lattice() {
  let dims = [1 << 32, 1 << 32, 4];
  assert_eq!(
    StructuredField::new(dims, DVec3::ONE, DVec3::ZERO),
    Err(FieldError::InvalidDimensions(dims))
  );
}

#[test]
fn test_attribute_lengths_checked() {
  let field = StructuredField::new([2, 2, 2], DVec3::ONE, DVec3::ZERO).unwrap();
  assert!(field.clone().with_scalars(vec![0.0; 8]).is_ok());
  assert_eq!(
    field.clone().with_scalars(vec![0.0; 7]),
    Err(FieldError::BufferLength {
      kind: "scalar",
      expected: 8,
      found: 7
    })
  );
  assert!(field.clone().with_vectors(vec![0.0; 24]).is_ok());
  assert!(field.with_vectors(vec![0.0; 8]).is_err());
}

#[test]
fn test_index_is_x_fastest() {
  let field = StructuredField::new([3, 4, 5], DVec3::ONE, DVec3::ZERO).unwrap();
  assert_eq!(field.index(1, 0, 0), 1);
  assert_eq!(field.index(0, 1, 0), 3);
  assert_eq!(field.index(0, 0, 1), 12);
  assert_eq!(field.index(2, 3, 4), field.point_count() - 1);
}

#[test]
fn test_bounds_and_centered() {
  let field =
    StructuredField::new([3, 3, 2], DVec3::new(0.5, 1.0, 2.0), DVec3::new(10.0, 0.0, 0.0))
      .unwrap();
  let bounds = field.bounds();
  assert_eq!(bounds.min, DVec3::new(10.0, 0.0, 0.0));
  assert_eq!(bounds.max, DVec3::new(11.0, 2.0, 2.0));

  let centered = field.centered();
  assert_eq!(centered.bounds().center(), DVec3::ZERO);
  assert_eq!(centered.bounds().size(), bounds.size());
}

#[test]
fn test_bounds_with_negative_spacing() {
  let field = StructuredField::new([2, 2, 2], DVec3::new(-1.0, 1.0, 1.0), DVec3::ZERO).unwrap();
  let bounds = field.bounds();
  assert_eq!(bounds.min.x, -1.0);
  assert_eq!(bounds.max.x, 0.0);
}

#[test]
fn test_ranges() {
  let field = StructuredField::new([2, 1, 1], DVec3::ONE, DVec3::ZERO)
    .unwrap()
    .with_scalars(vec![-2.0, 5.0])
    .unwrap()
    .with_vectors(vec![3.0, 4.0, 0.0, 0.0, 0.0, 1.0])
    .unwrap();
  assert_eq!(field.scalar_range(), Some((-2.0, 5.0)));
  assert_eq!(field.speed_range(), Some((1.0, 5.0)));
}
