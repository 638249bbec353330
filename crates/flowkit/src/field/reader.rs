//! Legacy binary structured-points reader.
//!
//! # File Layout
//!
//! ```text
//! # vtk DataFile Version 3.0          ← signature
//! wind field                          ← free-form title (may be empty)
//! BINARY                              ← ASCII files are rejected
//! DATASET STRUCTURED_POINTS
//! DIMENSIONS nx ny nz
//! SPACING sx sy sz                    ← ASPECT_RATIO accepted as synonym
//! ORIGIN ox oy oz
//! POINT_DATA N                        ← must equal nx·ny·nz
//! SCALARS <name> float [ncomp]
//! LOOKUP_TABLE <table>
//! <N·ncomp big-endian values>
//! VECTORS <name> float
//! <3N big-endian values>
//! CELL_DATA ...                       ← parsing stops here
//! ```
//!
//! Header lines are whitespace-delimited ASCII; payloads are big-endian
//! `float` (or `double`, narrowed to f32) and are byte-swapped to host order.

use glam::DVec3;

use super::StructuredField;
use crate::error::FormatError;

/// Which attribute blocks to keep when a file carries several.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReaderOptions {
  /// Keep the `SCALARS` block with this name (default: the first one).
  pub scalar_name: Option<String>,
  /// Keep the `VECTORS` block with this name (default: the first one).
  pub vector_name: Option<String>,
}

impl ReaderOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_scalar_name(mut self, name: impl Into<String>) -> Self {
    self.scalar_name = Some(name.into());
    self
  }

  pub fn with_vector_name(mut self, name: impl Into<String>) -> Self {
    self.vector_name = Some(name.into());
    self
  }
}

/// Parsed field plus the names of the attribute blocks that were kept.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFile {
  pub field: StructuredField,
  pub scalar_name: Option<String>,
  pub vector_name: Option<String>,
}

/// Payload element type.
#[derive(Clone, Copy, Debug, PartialEq)]
enum DataType {
  Float,
  Double,
}

impl DataType {
  fn parse(token: &str) -> Result<Self, FormatError> {
    match token.to_ascii_lowercase().as_str() {
      "float" => Ok(DataType::Float),
      "double" => Ok(DataType::Double),
      _ => Err(FormatError::UnsupportedDataType(token.to_string())),
    }
  }

  fn size(self) -> usize {
    match self {
      DataType::Float => 4,
      DataType::Double => 8,
    }
  }
}

/// Byte cursor that can read ASCII header lines and raw payloads.
struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  fn remaining(&self) -> usize {
    self.bytes.len() - self.pos
  }

  /// Next line as-is (trailing `\r` removed), `None` at end of input.
  fn raw_line(&mut self) -> Option<String> {
    if self.pos >= self.bytes.len() {
      return None;
    }
    let rest = &self.bytes[self.pos..];
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    self.pos += (end + 1).min(rest.len());
    let line = rest[..end].strip_suffix(b"\r").unwrap_or(&rest[..end]);
    Some(String::from_utf8_lossy(line).into_owned())
  }

  /// Next non-blank line, trimmed.
  fn next_line(&mut self) -> Option<String> {
    while let Some(line) = self.raw_line() {
      let trimmed = line.trim();
      if !trimmed.is_empty() {
        return Some(trimmed.to_string());
      }
    }
    None
  }

  fn take(&mut self, block: &str, needed: usize) -> Result<&'a [u8], FormatError> {
    if needed > self.remaining() {
      return Err(FormatError::BufferOverrun {
        block: block.to_string(),
        needed,
        available: self.remaining(),
      });
    }
    let slice = &self.bytes[self.pos..self.pos + needed];
    self.pos += needed;
    Ok(slice)
  }

  /// Take `count · width` elements of `size` bytes each. A length that does
  /// not fit in `usize` is reported as an overrun.
  fn take_elements(
    &mut self,
    block: &str,
    count: usize,
    width: usize,
    size: usize,
  ) -> Result<&'a [u8], FormatError> {
    match count.checked_mul(width).and_then(|n| n.checked_mul(size)) {
      Some(needed) => self.take(block, needed),
      None => Err(FormatError::BufferOverrun {
        block: block.to_string(),
        needed: usize::MAX,
        available: self.remaining(),
      }),
    }
  }
}

/// Node count of a lattice, `None` when it overflows `usize`.
fn lattice_points(dims: [usize; 3]) -> Option<usize> {
  dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

fn decode(payload: &[u8], data_type: DataType) -> Vec<f32> {
  match data_type {
    DataType::Float => payload
      .chunks_exact(4)
      .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
      .collect(),
    DataType::Double => payload
      .chunks_exact(8)
      .map(|c| f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32)
      .collect(),
  }
}

fn parse_triple<T: std::str::FromStr>(
  keyword: &'static str,
  line: &str,
  tokens: &[&str],
) -> Result<[T; 3], FormatError> {
  let malformed = || FormatError::MalformedLine {
    keyword,
    line: line.to_string(),
  };
  if tokens.len() < 4 {
    return Err(malformed());
  }
  let a = tokens[1].parse().map_err(|_| malformed())?;
  let b = tokens[2].parse().map_err(|_| malformed())?;
  let c = tokens[3].parse().map_err(|_| malformed())?;
  Ok([a, b, c])
}

/// Which of several same-kind blocks to keep.
fn wants(requested: &Option<String>, kept: &Option<(String, Vec<f32>)>, name: &str) -> bool {
  match requested {
    Some(requested) => requested == name && kept.is_none(),
    None => kept.is_none(),
  }
}

/// Parse a legacy binary structured-points file.
///
/// Fails with [`FormatError`] on anything other than a `BINARY`
/// `STRUCTURED_POINTS` dataset, on a missing or non-positive `POINT_DATA`,
/// and when a payload runs past the end of the buffer.
#[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
pub fn read_legacy(bytes: &[u8], options: &ReaderOptions) -> Result<FieldFile, FormatError> {
  let mut cursor = Cursor::new(bytes);

  let signature = cursor
    .raw_line()
    .ok_or(FormatError::UnexpectedEof { context: "signature" })?;
  if !signature.trim_start().to_ascii_lowercase().starts_with("# vtk") {
    return Err(FormatError::MissingSignature);
  }
  // Title line, free-form and possibly blank.
  cursor
    .raw_line()
    .ok_or(FormatError::UnexpectedEof { context: "title" })?;
  let format = cursor
    .next_line()
    .ok_or(FormatError::UnexpectedEof { context: "file format" })?;
  if !format.eq_ignore_ascii_case("BINARY") {
    return Err(FormatError::NotBinary(format));
  }

  let mut dataset_seen = false;
  let mut dims: Option<[usize; 3]> = None;
  let mut spacing = DVec3::ONE;
  let mut origin = DVec3::ZERO;
  let mut point_count: Option<usize> = None;
  let mut scalars: Option<(String, Vec<f32>)> = None;
  let mut vectors: Option<(String, Vec<f32>)> = None;

  while let Some(line) = cursor.next_line() {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let keyword = tokens[0].to_ascii_uppercase();

    match keyword.as_str() {
      "DATASET" => {
        let kind = tokens.get(1).copied().unwrap_or("");
        if !kind.eq_ignore_ascii_case("STRUCTURED_POINTS") {
          return Err(FormatError::UnsupportedDataset(kind.to_string()));
        }
        dataset_seen = true;
      }
      "DIMENSIONS" => {
        let d: [i64; 3] = parse_triple("DIMENSIONS", &line, &tokens)?;
        let d = d.map(|n| usize::try_from(n).unwrap_or(0));
        if d.contains(&0) || lattice_points(d).is_none() {
          return Err(FormatError::MalformedLine {
            keyword: "DIMENSIONS",
            line: line.clone(),
          });
        }
        dims = Some(d);
      }
      "SPACING" | "ASPECT_RATIO" => {
        spacing = DVec3::from_array(parse_triple("SPACING", &line, &tokens)?);
      }
      "ORIGIN" => {
        origin = DVec3::from_array(parse_triple("ORIGIN", &line, &tokens)?);
      }
      "POINT_DATA" => {
        let declared: i64 = tokens
          .get(1)
          .and_then(|t| t.parse().ok())
          .ok_or_else(|| FormatError::MalformedLine {
            keyword: "POINT_DATA",
            line: line.clone(),
          })?;
        if declared <= 0 {
          return Err(FormatError::InvalidPointCount(declared));
        }
        let d = dims.ok_or(FormatError::MissingHeader("DIMENSIONS"))?;
        let expected = lattice_points(d).ok_or_else(|| FormatError::MalformedLine {
          keyword: "DIMENSIONS",
          line: line.clone(),
        })?;
        if declared as usize != expected {
          return Err(FormatError::PointCountMismatch {
            declared: declared as usize,
            expected,
          });
        }
        point_count = Some(expected);
      }
      "SCALARS" => {
        let n = point_count.ok_or(FormatError::MissingHeader("POINT_DATA"))?;
        if tokens.len() < 3 {
          return Err(FormatError::MalformedLine {
            keyword: "SCALARS",
            line: line.clone(),
          });
        }
        let name = tokens[1].to_string();
        let data_type = DataType::parse(tokens[2])?;
        let components: usize = match tokens.get(3) {
          Some(t) => t.parse().map_err(|_| FormatError::MalformedLine {
            keyword: "SCALARS",
            line: line.clone(),
          })?,
          None => 1,
        };
        let table = cursor
          .next_line()
          .ok_or(FormatError::UnexpectedEof { context: "LOOKUP_TABLE" })?;
        if !table.to_ascii_uppercase().starts_with("LOOKUP_TABLE") {
          return Err(FormatError::MalformedLine {
            keyword: "LOOKUP_TABLE",
            line: table,
          });
        }
        let block = format!("SCALARS {name}");
        let payload = cursor.take_elements(&block, n, components, data_type.size())?;
        if components == 1 && wants(&options.scalar_name, &scalars, &name) {
          scalars = Some((name, decode(payload, data_type)));
        } else {
          tracing::debug!(%block, components, "skipping scalar block");
        }
      }
      "VECTORS" | "NORMALS" => {
        let n = point_count.ok_or(FormatError::MissingHeader("POINT_DATA"))?;
        if tokens.len() < 3 {
          return Err(FormatError::MalformedLine {
            keyword: "VECTORS",
            line: line.clone(),
          });
        }
        let name = tokens[1].to_string();
        let data_type = DataType::parse(tokens[2])?;
        let block = format!("{keyword} {name}");
        let payload = cursor.take_elements(&block, n, 3, data_type.size())?;
        if keyword == "VECTORS" && wants(&options.vector_name, &vectors, &name) {
          vectors = Some((name, decode(payload, data_type)));
        } else {
          tracing::debug!(%block, "skipping vector block");
        }
      }
      "CELL_DATA" => break,
      _ => return Err(FormatError::UnsupportedAttribute(tokens[0].to_string())),
    }
  }

  if !dataset_seen {
    return Err(FormatError::MissingHeader("DATASET"));
  }
  let dims = dims.ok_or(FormatError::MissingHeader("DIMENSIONS"))?;
  if point_count.is_none() {
    return Err(FormatError::MissingHeader("POINT_DATA"));
  }
  if options.scalar_name.is_some() && scalars.is_none() {
    tracing::warn!(name = ?options.scalar_name, "requested scalar block not found");
  }
  if options.vector_name.is_some() && vectors.is_none() {
    tracing::warn!(name = ?options.vector_name, "requested vector block not found");
  }

  let mut field = StructuredField::new(dims, spacing, origin)?;
  let mut scalar_name = None;
  let mut vector_name = None;
  if let Some((name, values)) = scalars {
    field = field.with_scalars(values)?;
    scalar_name = Some(name);
  }
  if let Some((name, values)) = vectors {
    field = field.with_vectors(values)?;
    vector_name = Some(name);
  }

  tracing::debug!(
    ?dims,
    scalars = ?scalar_name,
    vectors = ?vector_name,
    "parsed structured points"
  );

  Ok(FieldFile {
    field,
    scalar_name,
    vector_name,
  })
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
