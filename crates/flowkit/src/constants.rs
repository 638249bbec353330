//! Numerical tolerances shared by the geometry stages.
//!
//! # Tolerance Ladder
//!
//! ```text
//! ┌──────────────────────────┬──────────┬─────────────────────────────────────┐
//! │ Constant                 │ Value    │ Used by                             │
//! ├──────────────────────────┼──────────┼─────────────────────────────────────┤
//! │ NORMALIZE_EPSILON        │ 1e-12    │ guarded normalization everywhere    │
//! │ DEGENERATE_EPSILON       │ 1e-9     │ plane basis, ribbon side vector     │
//! │ PLANE_EPSILON            │ 1e-9     │ plane/AABB edge classification      │
//! │ MERGE_EPSILON            │ 1e-5     │ slice polygon point merging         │
//! │ CLIP_EPSILON             │ 1e-5     │ clip in/on/out and cap segments     │
//! │ SEGMENT_QUANTUM          │ 1e-6     │ cap segment hash grid               │
//! │ AREA_EPSILON             │ 1e-14    │ zero-area fan triangle rejection    │
//! └──────────────────────────┴──────────┴─────────────────────────────────────┘
//! ```

use glam::DVec3;

/// Lengths below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f64 = 1e-12;

/// Cross products shorter than this are considered degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Signed distance below which a box corner counts as lying on a slice plane.
pub const PLANE_EPSILON: f64 = 1e-9;

/// Slice polygon points closer than this are merged.
pub const MERGE_EPSILON: f64 = 1e-5;

/// Half-space tolerance for clipping and for on-plane cap segment detection.
pub const CLIP_EPSILON: f64 = 1e-5;

/// Grid step for quantizing cap segment endpoints into hash keys.
pub const SEGMENT_QUANTUM: f64 = 1e-6;

/// Doubled-area threshold for dropping degenerate fan triangles.
pub const AREA_EPSILON: f64 = 1e-14;

/// Number of loop iterations between split progress reports and cancel polls.
pub const SPLIT_BATCH: usize = 4096;

/// Normalize `v`, treating a near-zero length as length 1.
///
/// Keeps every stage total over degenerate input: a zero vector stays zero
/// instead of turning into NaN.
#[inline]
pub fn safe_normalize(v: DVec3) -> DVec3 {
  let len = v.length();
  if len < NORMALIZE_EPSILON {
    v
  } else {
    v / len
  }
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
