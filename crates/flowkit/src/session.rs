//! Caller-owned session state.
//!
//! A [`FieldSession`] holds the one field kept across repeated slices and
//! traces, and at most one in-flight split. Starting a new split cancels the
//! previous one; responses are tagged with the [`SplitTicket`] of the run
//! that produced them, and a replaced run's responses are never delivered.

use std::sync::Arc;

use crate::colormap::Colormap;
use crate::error::FormatError;
use crate::field::{read_legacy, FieldFile, FieldSampler, ReaderOptions, StructuredField};
use crate::slice::{slice_field, Plane, SliceConfig};
use crate::split::{SplitRequest, SplitResponse, SplitTask};
use crate::streamline::{
  build_ribbon_by_speed, integrate_seeds, plane_seeds, RibbonConfig, SeedConfig, StreamlineConfig,
};
use crate::types::{ScalarSliceMesh, StreamlineMesh};

/// Identifies one split run within its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SplitTicket(u64);

/// Session-scoped cache and task slot.
#[derive(Default)]
pub struct FieldSession {
  field: Option<Arc<StructuredField>>,
  scalar_name: Option<String>,
  vector_name: Option<String>,
  split: Option<(SplitTicket, SplitTask)>,
  next_ticket: u64,
}

impl FieldSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse and cache a field, replacing any previous one. On error the
  /// previous field stays cached.
  pub fn load(&mut self, bytes: &[u8], options: &ReaderOptions) -> Result<Arc<StructuredField>, FormatError> {
    let FieldFile {
      field,
      scalar_name,
      vector_name,
    } = read_legacy(bytes, options)?;
    self.scalar_name = scalar_name;
    self.vector_name = vector_name;
    Ok(self.set_field(field))
  }

  /// Cache an already built field.
  pub fn set_field(&mut self, field: StructuredField) -> Arc<StructuredField> {
    let field = Arc::new(field);
    self.field = Some(Arc::clone(&field));
    field
  }

  pub fn field(&self) -> Option<&Arc<StructuredField>> {
    self.field.as_ref()
  }

  pub fn scalar_name(&self) -> Option<&str> {
    self.scalar_name.as_deref()
  }

  pub fn vector_name(&self) -> Option<&str> {
    self.vector_name.as_deref()
  }

  /// Drop the cached field.
  pub fn clear_field(&mut self) {
    self.field = None;
    self.scalar_name = None;
    self.vector_name = None;
  }

  /// Seed, trace and mesh streamlines over the cached field, coloured by
  /// speed over the field's speed range. Empty without a field.
  pub fn streamlines<C: Colormap + ?Sized>(
    &self,
    seeds: &SeedConfig,
    config: &StreamlineConfig,
    ribbon: &RibbonConfig,
    colormap: &C,
  ) -> Vec<StreamlineMesh> {
    let Some(field) = self.field.as_deref() else {
      return Vec::new();
    };
    let sampler = FieldSampler::new(field);
    let speed_range = field.speed_range().unwrap_or((0.0, 1.0));
    let seed_points = plane_seeds(field, seeds);
    integrate_seeds(&sampler, &seed_points, &field.bounds(), config)
      .iter()
      .map(|path| build_ribbon_by_speed(path, ribbon, colormap, speed_range))
      .collect()
  }

  /// Slice the cached field. `None` without a field.
  pub fn slice<C: Colormap + ?Sized>(
    &self,
    plane: &Plane,
    config: &SliceConfig,
    colormap: &C,
  ) -> Option<ScalarSliceMesh> {
    let field = self.field.as_deref()?;
    let sampler = FieldSampler::new(field);
    Some(slice_field(&sampler, plane, &field.bounds(), config, colormap))
  }

  /// Start a split, canceling and discarding any split still in flight.
  pub fn start_split(&mut self, request: SplitRequest) -> SplitTicket {
    self.cancel_split();
    let ticket = SplitTicket(self.next_ticket);
    self.next_ticket += 1;
    self.split = Some((ticket, SplitTask::start(request)));
    tracing::debug!(ticket = ticket.0, "split started");
    ticket
  }

  /// Cancel the current split; its later responses are dropped.
  pub fn cancel_split(&mut self) {
    if let Some((ticket, task)) = self.split.take() {
      task.cancel();
      tracing::debug!(ticket = ticket.0, "split canceled");
    }
  }

  pub fn is_splitting(&self) -> bool {
    self.split.is_some()
  }

  /// Next response of the current split. The slot frees itself after the
  /// terminal response.
  pub fn poll_split(&mut self) -> Option<(SplitTicket, SplitResponse)> {
    let (ticket, task) = self.split.as_mut()?;
    let ticket = *ticket;
    let response = task.try_recv()?;
    if response.is_terminal() {
      self.split = None;
    }
    Some((ticket, response))
  }

  /// Block until the current split finishes.
  pub fn wait_split(&mut self) -> Option<(SplitTicket, SplitResponse)> {
    let (ticket, task) = self.split.take()?;
    Some((ticket, task.wait()))
  }
}

#[cfg(test)]
mod tests {
  use glam::DVec3;

  use super::*;
  use crate::colormap::TransferFunction;
  use crate::streamline::SeedPlane;

  fn wind_field() -> StructuredField {
    StructuredField::new([4, 4, 4], DVec3::ONE, DVec3::ZERO)
      .unwrap()
      .with_vectors([1.0f32, 0.0, 0.0].repeat(64))
      .unwrap()
      .with_scalars((0..64).map(|i| (i % 4) as f32).collect())
      .unwrap()
  }

  fn triangles(count: usize) -> SplitRequest {
    let positions = (0..count)
      .flat_map(|i| {
        let x = i as f32 * 10.0;
        [x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 1.0, 0.0]
      })
      .collect();
    SplitRequest::new(positions)
  }

  #[test]
  fn test_empty_session() {
    let session = FieldSession::new();
    assert!(session.field().is_none());
    assert!(session
      .streamlines(
        &SeedConfig::default(),
        &StreamlineConfig::default(),
        &RibbonConfig::default(),
        &TransferFunction::blue_white_red(),
      )
      .is_empty());
    assert!(session
      .slice(
        &Plane::canonical(DVec3::ZERO),
        &SliceConfig::default(),
        &TransferFunction::grayscale()
      )
      .is_none());
  }

  #[test]
  fn test_cached_field_is_shared() {
    let mut session = FieldSession::new();
    let field = session.set_field(wind_field());
    assert!(Arc::ptr_eq(&field, session.field().unwrap()));
    session.clear_field();
    assert!(session.field().is_none());
  }

  #[test]
  fn test_load_failure_keeps_previous_field() {
    let mut session = FieldSession::new();
    session.set_field(wind_field());
    assert!(session.load(b"not a field", &ReaderOptions::default()).is_err());
    assert!(session.field().is_some());
  }

  #[test]
  fn test_streamlines_and_slice_over_cached_field() {
    let mut session = FieldSession::new();
    session.set_field(wind_field());

    let seeds = SeedConfig::new(SeedPlane::YZ).with_stride(1).with_plane_index(0);
    let config = StreamlineConfig::new().with_step(0.5);
    let meshes = session.streamlines(
      &seeds,
      &config,
      &RibbonConfig::new(0.1),
      &TransferFunction::blue_white_red(),
    );
    // 16 seeds on x = 0, each travelling 3 units in 6 steps.
    assert_eq!(meshes.len(), 16);
    assert!(meshes.iter().all(|m| m.point_count == 7));

    let plane = Plane::from_normal(DVec3::splat(1.5), DVec3::Z);
    let slice = session
      .slice(&plane, &SliceConfig::new(4, 4).with_range(0.0, 3.0), &TransferFunction::grayscale())
      .unwrap();
    assert_eq!(slice.polygon.len(), 4);
    assert!(!slice.soup.is_empty());
  }

  #[test]
  fn test_split_round_trip() {
    let mut session = FieldSession::new();
    let ticket = session.start_split(triangles(3));
    assert!(session.is_splitting());
    let (done_ticket, response) = session.wait_split().unwrap();
    assert_eq!(done_ticket, ticket);
    assert!(matches!(response, SplitResponse::Done { parts } if parts.len() == 3));
    assert!(!session.is_splitting());
  }

  #[test]
  fn test_tickets_count_per_session() {
    let mut a = FieldSession::new();
    let mut b = FieldSession::new();
    let first = a.start_split(triangles(1));
    let second = a.start_split(triangles(1));
    assert_eq!(first, SplitTicket(0));
    assert_eq!(second, SplitTicket(1));
    assert_eq!(b.start_split(triangles(1)), SplitTicket(0));
    a.cancel_split();
    b.cancel_split();
  }

  #[test]
  fn test_restart_discards_previous_split() {
    let mut session = FieldSession::new();
    let first = session.start_split(triangles(2));
    let second = session.start_split(triangles(4));
    assert_ne!(first, second);

    let mut terminal = None;
    for _ in 0..5000 {
      match session.poll_split() {
        Some((ticket, response)) => {
          assert_eq!(ticket, second);
          if response.is_terminal() {
            terminal = Some(response);
            break;
          }
        }
        None => std::thread::sleep(std::time::Duration::from_millis(1)),
      }
    }
    assert!(matches!(terminal, Some(SplitResponse::Done { parts }) if parts.len() == 4));
    assert!(!session.is_splitting());
  }
}
