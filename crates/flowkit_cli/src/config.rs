//! Configuration parsing for the flowkit command line.
//!
//! Every section is optional and falls back to the library defaults, so a
//! config file only has to name what it changes.

use anyhow::{Context, Result};
use flowkit::{
	IntegrationDirection, Plane, RibbonConfig, SeedConfig, SeedPlane, SliceConfig, SplitRequest,
	StreamlineConfig,
};
use glam::{DAffine3, DQuat, DVec3, EulerRot};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub field: FieldSection,
	pub streamlines: StreamlineSection,
	pub slice: SliceSection,
	pub clip: ClipSection,
	pub split: SplitSection,
	pub output: OutputSection,
}

/// Field file and attribute selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSection {
	/// Legacy structured-points file.
	pub path: Option<PathBuf>,
	/// Name of the SCALARS block to keep (default: first).
	pub scalar: Option<String>,
	/// Name of the VECTORS block to keep (default: first).
	pub vector: Option<String>,
	/// Shift the lattice so its centre sits at the origin.
	pub center: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneName {
	#[default]
	Xy,
	Xz,
	Yz,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	#[default]
	Forward,
	Backward,
	Both,
}

/// Seeding, integration and ribbon parameters.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamlineSection {
	pub plane: PlaneName,
	pub stride: usize,
	/// Slab position along the plane normal, 0.0-1.0.
	pub offset: f64,
	/// Explicit slab index, overrides `offset`.
	pub plane_index: Option<usize>,
	/// Seed jitter as a fraction of one cell.
	pub jitter: f64,
	pub rng_seed: u64,
	/// Seed along a segment `[start, end]` instead of a lattice plane.
	pub line: Option<[[f64; 3]; 2]>,
	pub line_resolution: usize,
	pub step: f64,
	pub max_steps: usize,
	pub min_speed: f64,
	pub direction: Direction,
	pub width: f64,
	pub up: [f64; 3],
}

impl Default for StreamlineSection {
	fn default() -> Self {
		let seeds = SeedConfig::default();
		let integration = StreamlineConfig::default();
		let ribbon = RibbonConfig::default();
		Self {
			plane: PlaneName::Xy,
			stride: seeds.stride,
			offset: seeds.offset,
			plane_index: None,
			jitter: seeds.jitter,
			rng_seed: seeds.rng_seed,
			line: None,
			line_resolution: 10,
			step: integration.step,
			max_steps: integration.max_steps,
			min_speed: integration.min_speed,
			direction: Direction::Forward,
			width: ribbon.width,
			up: ribbon.up.to_array(),
		}
	}
}

impl StreamlineSection {
	pub fn seed_config(&self) -> SeedConfig {
		let plane = match self.plane {
			PlaneName::Xy => SeedPlane::XY,
			PlaneName::Xz => SeedPlane::XZ,
			PlaneName::Yz => SeedPlane::YZ,
		};
		let mut config = SeedConfig::new(plane)
			.with_stride(self.stride)
			.with_offset(self.offset)
			.with_jitter(self.jitter, self.rng_seed);
		if let Some(index) = self.plane_index {
			config = config.with_plane_index(index);
		}
		config
	}

	pub fn streamline_config(&self) -> StreamlineConfig {
		let direction = match self.direction {
			Direction::Forward => IntegrationDirection::Forward,
			Direction::Backward => IntegrationDirection::Backward,
			Direction::Both => IntegrationDirection::Both,
		};
		StreamlineConfig::new()
			.with_step(self.step)
			.with_max_steps(self.max_steps)
			.with_min_speed(self.min_speed)
			.with_direction(direction)
	}

	pub fn ribbon_config(&self) -> RibbonConfig {
		RibbonConfig::new(self.width).with_up(DVec3::from_array(self.up))
	}
}

/// Slice plane and resampling.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliceSection {
	/// Plane origin; defaults to the field centre.
	pub origin: Option<[f64; 3]>,
	pub normal: [f64; 3],
	pub resolution: [usize; 2],
	/// Scalar range; defaults to the field's scalar range.
	pub range: Option<[f64; 2]>,
	pub reversed: bool,
}

impl Default for SliceSection {
	fn default() -> Self {
		let defaults = SliceConfig::default();
		Self {
			origin: None,
			normal: [0.0, 0.0, 1.0],
			resolution: [defaults.res_u, defaults.res_v],
			range: None,
			reversed: false,
		}
	}
}

impl SliceSection {
	pub fn plane(&self, field_center: DVec3) -> Plane {
		let origin = self.origin.map(DVec3::from_array).unwrap_or(field_center);
		Plane::from_normal(origin, DVec3::from_array(self.normal))
	}

	pub fn slice_config(&self, scalar_range: Option<(f64, f64)>) -> SliceConfig {
		let (min, max) = self
			.range
			.map(|[min, max]| (min, max))
			.or(scalar_range)
			.unwrap_or((0.0, 1.0));
		SliceConfig::new(self.resolution[0], self.resolution[1])
			.with_range(min, max)
			.with_reversed(self.reversed)
	}
}

/// One STL input placed in the world.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacedInput {
	pub path: PathBuf,
	#[serde(default)]
	pub translation: [f64; 3],
	/// XYZ Euler angles in degrees.
	#[serde(default)]
	pub rotation: [f64; 3],
	#[serde(default = "default_scale")]
	pub scale: [f64; 3],
}

fn default_scale() -> [f64; 3] {
	[1.0; 3]
}

impl PlacedInput {
	pub fn transform(&self) -> DAffine3 {
		let [rx, ry, rz] = self.rotation.map(f64::to_radians);
		DAffine3::from_scale_rotation_translation(
			DVec3::from_array(self.scale),
			DQuat::from_euler(EulerRot::XYZ, rx, ry, rz),
			DVec3::from_array(self.translation),
		)
	}
}

/// Single half-space for the plane clipper.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipPlane {
	pub point: [f64; 3],
	pub normal: [f64; 3],
	/// A point on the side to keep.
	pub keep: [f64; 3],
}

/// Clip inputs and volume.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipSection {
	pub inputs: Vec<PlacedInput>,
	pub min: [f64; 3],
	pub max: [f64; 3],
	/// Clip against this plane instead of the box; no caps are built.
	pub plane: Option<ClipPlane>,
	pub epsilon: f64,
}

impl Default for ClipSection {
	fn default() -> Self {
		Self {
			inputs: Vec::new(),
			min: [-1.0; 3],
			max: [1.0; 3],
			plane: None,
			epsilon: flowkit::constants::CLIP_EPSILON,
		}
	}
}

/// Mesh splitting.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitSection {
	pub input: Option<PathBuf>,
	pub epsilon: f64,
	pub min_triangles: usize,
}

impl Default for SplitSection {
	fn default() -> Self {
		let defaults = SplitRequest::new(Vec::new());
		Self {
			input: None,
			epsilon: defaults.epsilon,
			min_triangles: defaults.min_triangles,
		}
	}
}

/// Where STL files are written.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
	pub dir: PathBuf,
}

impl Default for OutputSection {
	fn default() -> Self {
		Self {
			dir: PathBuf::from("out"),
		}
	}
}

impl Config {
	/// Load configuration from a TOML file. Relative paths inside it are
	/// resolved against the file's directory.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		let mut config = Self::parse(&content)?;
		let base = path.parent().unwrap_or(Path::new("."));
		config.resolve_paths(base);
		Ok(config)
	}

	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;

		if config.streamlines.step <= 0.0 || !config.streamlines.step.is_finite() {
			anyhow::bail!("streamlines.step must be positive, got {}", config.streamlines.step);
		}
		if config.split.epsilon <= 0.0 || !config.split.epsilon.is_finite() {
			anyhow::bail!("split.epsilon must be positive, got {}", config.split.epsilon);
		}
		if config.clip.min.iter().zip(&config.clip.max).any(|(lo, hi)| lo > hi) {
			anyhow::bail!(
				"clip.min {:?} must not exceed clip.max {:?}",
				config.clip.min,
				config.clip.max
			);
		}

		Ok(config)
	}

	fn resolve_paths(&mut self, base: &Path) {
		let resolve = |path: &mut PathBuf| {
			if path.is_relative() {
				*path = base.join(&*path);
			}
		};
		if let Some(path) = self.field.path.as_mut() {
			resolve(path);
		}
		for input in &mut self.clip.inputs {
			resolve(&mut input.path);
		}
		if let Some(path) = self.split.input.as_mut() {
			resolve(path);
		}
		resolve(&mut self.output.dir);
	}
}
