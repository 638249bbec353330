//! Wind-field visualization and mesh preparation tool.
//!
//! Reads a TOML config, runs one library stage and writes binary STL:
//!
//! - `info`: field dimensions, bounds and attribute ranges
//! - `streamlines`: ribbons traced from a seed plane or line → streamlines.stl
//! - `slice`: colour-mapped plane through the scalar field → slice.stl
//! - `clip`: placed STL inputs cut to the box (with caps) or a plane → clip.stl
//! - `split`: one STL input broken into connected parts → part_NNN.stl
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowkit::{
	build_ribbon_by_speed, integrate, line_seeds, plane_seeds, read_stl, write_stl, Aabb,
	FieldSampler, FieldSession, PlacedSoup, ReaderOptions, SplitRequest, SplitResponse,
	TransferFunction, TriangleSoup,
};
use glam::DVec3;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::Config;

/// Field visualization and CFD mesh preprocessing.
#[derive(Parser, Debug)]
#[command(name = "flowkit")]
#[command(about = "Streamlines, slices, clipping and splitting for CFD preprocessing")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output directory (default: `output.dir` from the config).
	#[arg(short, long)]
	output: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print field dimensions, bounds and attribute ranges.
	Info,
	/// Trace streamlines and write their ribbons.
	Streamlines,
	/// Slice the scalar field with the configured plane.
	Slice,
	/// Clip the configured inputs against the box or plane.
	Clip,
	/// Split the configured input into connected parts.
	Split,
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();
	let mut config = Config::load(&args.config)?;
	if let Some(output) = args.output {
		config.output.dir = output;
	}

	match args.command {
		Command::Info => info(&config),
		Command::Streamlines => streamlines(&config),
		Command::Slice => slice(&config),
		Command::Clip => clip(&config),
		Command::Split => split(&config),
	}
}

/// Load the configured field into a fresh session.
fn load_field(config: &Config) -> Result<FieldSession> {
	let path = config
		.field
		.path
		.as_deref()
		.context("[field] path is required for this command")?;
	let bytes =
		std::fs::read(path).with_context(|| format!("Failed to read field: {}", path.display()))?;

	let mut options = ReaderOptions::new();
	if let Some(name) = &config.field.scalar {
		options = options.with_scalar_name(name);
	}
	if let Some(name) = &config.field.vector {
		options = options.with_vector_name(name);
	}

	let mut session = FieldSession::new();
	let field = session
		.load(&bytes, &options)
		.with_context(|| format!("Failed to parse field: {}", path.display()))?;
	if config.field.center {
		session.set_field(field.centered());
	}
	Ok(session)
}

fn read_soup(path: &Path) -> Result<TriangleSoup> {
	let bytes =
		std::fs::read(path).with_context(|| format!("Failed to read mesh: {}", path.display()))?;
	read_stl(&bytes).with_context(|| format!("Failed to parse STL: {}", path.display()))
}

fn write_output(config: &Config, name: &str, soup: &TriangleSoup) -> Result<()> {
	let dir = &config.output.dir;
	std::fs::create_dir_all(dir)
		.with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
	let path = dir.join(format!("{name}.stl"));
	std::fs::write(&path, write_stl(soup, name))
		.with_context(|| format!("Failed to write: {}", path.display()))?;
	tracing::info!(
		path = %path.display(),
		triangles = soup.triangle_count(),
		"wrote STL"
	);
	Ok(())
}

fn info(config: &Config) -> Result<()> {
	let session = load_field(config)?;
	let field = session.field().context("no field loaded")?;
	let bounds = field.bounds();

	println!("dimensions: {:?}", field.dims());
	println!("spacing:    {}", field.spacing());
	println!("origin:     {}", field.origin());
	println!("bounds:     {} .. {}", bounds.min, bounds.max);
	match (session.scalar_name(), field.scalar_range()) {
		(Some(name), Some((min, max))) => println!("scalars:    {name} [{min}, {max}]"),
		(Some(name), None) => println!("scalars:    {name} (no finite samples)"),
		_ => println!("scalars:    none"),
	}
	match (session.vector_name(), field.speed_range()) {
		(Some(name), Some((min, max))) => println!("vectors:    {name} |v| in [{min}, {max}]"),
		(Some(name), None) => println!("vectors:    {name} (no finite samples)"),
		_ => println!("vectors:    none"),
	}
	Ok(())
}

fn streamlines(config: &Config) -> Result<()> {
	let session = load_field(config)?;
	let field = Arc::clone(session.field().context("no field loaded")?);
	if field.vectors().is_none() {
		anyhow::bail!("field has no vector attribute to trace");
	}

	let section = &config.streamlines;
	let seeds = match section.line {
		Some([start, end]) => line_seeds(
			DVec3::from_array(start),
			DVec3::from_array(end),
			section.line_resolution,
		),
		None => plane_seeds(&field, &section.seed_config()),
	};
	let integration = section.streamline_config();
	let ribbon = section.ribbon_config();
	let colormap = TransferFunction::blue_white_red();
	let speed_range = field.speed_range().unwrap_or(colormap.range());
	let bounds = field.bounds();
	let sampler = FieldSampler::new(&field);

	let meshes: Vec<_> = seeds
		.par_iter()
		.map(|&seed| integrate(&sampler, seed, &bounds, &integration))
		.filter(|path| path.is_path())
		.map(|path| build_ribbon_by_speed(&path, &ribbon, &colormap, speed_range))
		.collect();
	tracing::info!(seeds = seeds.len(), streamlines = meshes.len(), "traced");

	let mut soup = TriangleSoup::new();
	for mesh in &meshes {
		soup.append(&mesh.soup);
	}
	write_output(config, "streamlines", &soup)
}

fn slice(config: &Config) -> Result<()> {
	let session = load_field(config)?;
	let field = session.field().context("no field loaded")?;
	if field.scalars().is_none() {
		anyhow::bail!("field has no scalar attribute to slice");
	}

	let plane = config.slice.plane(field.bounds().center());
	let slice_config = config.slice.slice_config(field.scalar_range());
	let mesh = session
		.slice(&plane, &slice_config, &TransferFunction::grayscale())
		.context("no field loaded")?;
	if mesh.polygon.is_empty() {
		tracing::warn!("slice plane misses the field bounds");
	}
	write_output(config, "slice", &mesh.soup)
}

fn clip(config: &Config) -> Result<()> {
	let section = &config.clip;
	if section.inputs.is_empty() {
		anyhow::bail!("[[clip.inputs]] must name at least one mesh");
	}

	let soups = section
		.inputs
		.iter()
		.map(|input| read_soup(&input.path))
		.collect::<Result<Vec<_>>>()?;
	let placed: Vec<_> = section
		.inputs
		.iter()
		.zip(&soups)
		.map(|(input, soup)| PlacedSoup::new(input.transform(), soup))
		.collect();

	let result = match &section.plane {
		Some(plane) => flowkit::PlaneClipper::new(
			DVec3::from_array(plane.point),
			DVec3::from_array(plane.normal),
			DVec3::from_array(plane.keep),
		)
		.with_epsilon(section.epsilon)
		.clip(&placed),
		None => flowkit::SolidClipper::new(Aabb::new(
			DVec3::from_array(section.min),
			DVec3::from_array(section.max),
		))
		.with_epsilon(section.epsilon)
		.clip(&placed),
	};
	tracing::info!(
		input = result.input_triangles,
		output = result.output_triangles,
		caps = result.cap_triangles,
		flips = result.winding_flips,
		"clipped"
	);
	write_output(config, "clip", &result.soup)
}

fn split(config: &Config) -> Result<()> {
	let section = &config.split;
	let path = section
		.input
		.as_deref()
		.context("[split] input is required for this command")?;
	let request = SplitRequest::from_soup(read_soup(path)?)
		.with_epsilon(section.epsilon)
		.with_min_triangles(section.min_triangles);

	let mut session = FieldSession::new();
	session.start_split(request);
	let mut last_report = -1.0;
	let parts = loop {
		match session.poll_split() {
			Some((_, SplitResponse::Progress { value, phase })) => {
				if value - last_report >= 0.1 {
					tracing::info!(phase = phase.as_str(), "split {:.0}%", value * 100.0);
					last_report = value;
				}
			}
			Some((_, SplitResponse::Done { parts })) => break parts,
			Some((_, SplitResponse::Canceled)) => anyhow::bail!("split was canceled"),
			Some((_, SplitResponse::Error { message })) => anyhow::bail!("split failed: {message}"),
			None => std::thread::sleep(std::time::Duration::from_millis(5)),
		}
	};

	tracing::info!(parts = parts.len(), "split");
	for (index, part) in parts.iter().enumerate() {
		write_output(config, &format!("part_{index:03}"), &part.soup)?;
	}
	Ok(())
}
