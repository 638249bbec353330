//! flowkit - Wind-field visualization and mesh preprocessing for CFD setup
//!
//! Loads structured-points vector/scalar fields, traces streamlines through
//! them, slices them with colour-mapped planes, and prepares triangle soups
//! for simulation by clipping them against a domain box or plane and
//! splitting them into connected components.
//!
//! # Pipeline
//!
//! ```text
//!   .vtk bytes ──► field::read_legacy ──► StructuredField ──► FieldSampler
//!                                                             │        │
//!                       streamline::{plane_seeds, integrate} ◄┘        └► slice::slice_field
//!                                  │                                        │
//!                        streamline::build_ribbon                  ScalarSliceMesh
//!                                  │
//!                            StreamlineMesh
//!
//!   TriangleSoup + DAffine3 ──► clip::{SolidClipper, PlaneClipper} ──► ClipResult
//!   TriangleSoup ──► split::{split_mesh, SplitTask} ──► Vec<MeshComponent>
//!   TriangleSoup ◄─► stl::{write_stl, read_stl}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use flowkit::{FieldSession, ReaderOptions, SeedConfig, SeedPlane};
//!
//! let mut session = FieldSession::new();
//! session.load(&std::fs::read("wind.vtk")?, &ReaderOptions::default())?;
//! let meshes = session.streamlines(
//!   &SeedConfig::new(SeedPlane::XY),
//!   &Default::default(),
//!   &Default::default(),
//!   &flowkit::TransferFunction::blue_white_red(),
//! );
//! ```
//!
//! Geometry is computed in f64 (`glam::DVec3`); vertex buffers are flat f32.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{FieldError, FormatError, SoupError, SplitError, StlError};
pub use types::{
  Aabb, ClipResult, MeshComponent, PlacedSoup, ScalarSliceMesh, StreamlineMesh, StreamlinePath,
  TriangleSoup, VisMesh,
};

// Structured fields, the legacy reader and trilinear samplers
pub mod field;
pub use field::{
  read_legacy, FieldFile, FieldSampler, ReaderOptions, ScalarSampler, StructuredField,
  VectorSampler,
};

pub mod colormap;
pub use colormap::{normalize_value, Colormap, TransferFunction};

// RK4 streamline tracing, seeding and ribbon meshing
pub mod streamline;
pub use streamline::{
  build_ribbon, build_ribbon_by_speed, integrate, integrate_seeds, line_seeds, plane_seeds,
  IntegrationDirection, RibbonConfig, SeedConfig, SeedPlane, StreamlineConfig,
};

// Planar slices through scalar fields
pub mod slice;
pub use slice::{intersect_plane_aabb, slice_field, Plane, SliceConfig};

// Box and plane clipping with cap reconstruction
pub mod clip;
pub use clip::{HalfSpace, PlaneClipper, SolidClipper};

pub mod stl;
pub use stl::{read_stl, write_stl};

// Connected-component splitting, inline or on the rayon pool
pub mod split;
pub use split::{split_mesh, SplitPhase, SplitRequest, SplitResponse, SplitTask};

pub mod session;
pub use session::{FieldSession, SplitTicket};
