//! Binary STL encoding and decoding.
//!
//! ```text
//!   offset  size        content
//!   0       80          name, truncated / zero padded
//!   80      4           u32 triangle count (LE)
//!   84      50 · count  normal 3×f32, vertices 9×f32, u16 attribute = 0
//! ```
//!
//! All numbers are little-endian.

use glam::DVec3;

use crate::constants::safe_normalize;
use crate::error::StlError;
use crate::types::TriangleSoup;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Encode `soup` as binary STL.
///
/// Facet normals are the normalized average of the vertex normals when the
/// soup carries them, otherwise the geometric normal.
pub fn write_stl(soup: &TriangleSoup, name: &str) -> Vec<u8> {
  let triangles = soup.triangle_count();
  let mut bytes = Vec::with_capacity(HEADER_LEN + 4 + triangles * FACET_LEN);

  let mut header = [0u8; HEADER_LEN];
  let name = name.as_bytes();
  let len = name.len().min(HEADER_LEN);
  header[..len].copy_from_slice(&name[..len]);
  bytes.extend_from_slice(&header);
  bytes.extend_from_slice(&(triangles as u32).to_le_bytes());

  for t in 0..triangles {
    let [a, b, c] = soup.triangle(t);
    let averaged: Option<DVec3> = (0..3)
      .map(|k| soup.vertex_normal(t * 3 + k))
      .sum();
    let normal = match averaged {
      Some(n) if n.length() > 0.0 => safe_normalize(n),
      _ => safe_normalize((b - a).cross(c - a)),
    };
    for v in [normal, a, b, c] {
      for component in v.to_array() {
        bytes.extend_from_slice(&(component as f32).to_le_bytes());
      }
    }
    bytes.extend_from_slice(&0u16.to_le_bytes());
  }

  bytes
}

/// Decode binary STL. Facet normals are copied to all three vertices.
///
/// ASCII STL (`solid ...` text) is not supported. Its text is read as a
/// binary header, so the declared triangle count is garbage and decoding
/// fails with [`StlError::Truncated`] or [`StlError::TooShort`].
pub fn read_stl(bytes: &[u8]) -> Result<TriangleSoup, StlError> {
  if bytes.len() < HEADER_LEN + 4 {
    return Err(StlError::TooShort(bytes.len()));
  }
  let mut count = [0u8; 4];
  count.copy_from_slice(&bytes[HEADER_LEN..HEADER_LEN + 4]);
  let declared = u32::from_le_bytes(count);

  let facets = &bytes[HEADER_LEN + 4..];
  let needed = match (declared as usize).checked_mul(FACET_LEN) {
    Some(needed) if needed <= facets.len() => needed,
    _ => {
      return Err(StlError::Truncated {
        declared,
        available: facets.len(),
      })
    }
  };

  let triangles = declared as usize;
  let mut positions = Vec::with_capacity(triangles * 9);
  let mut normals = Vec::with_capacity(triangles * 9);
  for facet in facets[..needed].chunks_exact(FACET_LEN) {
    let floats: Vec<f32> = facet[..48]
      .chunks_exact(4)
      .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
      .collect();
    for _ in 0..3 {
      normals.extend_from_slice(&floats[..3]);
    }
    positions.extend_from_slice(&floats[3..12]);
  }

  Ok(TriangleSoup::from_positions(positions).with_normals(normals))
}
