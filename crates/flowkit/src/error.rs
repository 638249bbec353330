//! Error types for the fallible stages.
//!
//! Geometry stages never fail: degenerate input yields empty output. Only
//! parsing and explicit validation produce errors.

use thiserror::Error;

/// Legacy structured-points parse failure. No partial field is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
  #[error("unexpected end of file while reading {context}")]
  UnexpectedEof { context: &'static str },

  #[error("not a legacy field file: missing '# vtk DataFile' signature")]
  MissingSignature,

  #[error("only BINARY files are supported, found '{0}'")]
  NotBinary(String),

  #[error("unsupported dataset '{0}', expected STRUCTURED_POINTS")]
  UnsupportedDataset(String),

  #[error("missing {0} declaration")]
  MissingHeader(&'static str),

  #[error("malformed '{keyword}' line: {line}")]
  MalformedLine { keyword: &'static str, line: String },

  #[error("POINT_DATA must be positive, found {0}")]
  InvalidPointCount(i64),

  #[error("POINT_DATA {declared} does not match DIMENSIONS product {expected}")]
  PointCountMismatch { declared: usize, expected: usize },

  #[error("unsupported data type '{0}', expected float or double")]
  UnsupportedDataType(String),

  #[error("unsupported attribute block '{0}'")]
  UnsupportedAttribute(String),

  #[error("{block} payload needs {needed} bytes but only {available} remain")]
  BufferOverrun {
    block: String,
    needed: usize,
    available: usize,
  },

  #[error(transparent)]
  Field(#[from] FieldError),
}

/// A `StructuredField` that would violate its invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
  #[error("dimensions must be positive with an addressable node count, found {0:?}")]
  InvalidDimensions([usize; 3]),

  #[error("spacing components must be nonzero and finite, found {0:?}")]
  InvalidSpacing([f64; 3]),

  #[error("{kind} buffer has {found} values, expected {expected}")]
  BufferLength {
    kind: &'static str,
    expected: usize,
    found: usize,
  },
}

/// Binary STL input failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StlError {
  #[error("STL buffer is {0} bytes, shorter than the 84 byte header")]
  TooShort(usize),

  #[error("STL declares {declared} triangles but holds {available} bytes of facets")]
  Truncated { declared: u32, available: usize },
}

/// Triangle soup buffers that break the layout contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoupError {
  #[error("position buffer length {0} is not a multiple of 9")]
  PositionLength(usize),

  #[error("{kind} buffer length {found} does not match expected {expected}")]
  AttributeLength {
    kind: &'static str,
    expected: usize,
    found: usize,
  },
}

/// Mesh split failure, relayed by the split task as an error message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
  #[error("weld epsilon must be positive and finite, found {0}")]
  InvalidEpsilon(f64),

  #[error(transparent)]
  Soup(#[from] SoupError),

  #[error("split canceled")]
  Canceled,

  #[error("split worker panicked: {0}")]
  Panicked(String),
}
