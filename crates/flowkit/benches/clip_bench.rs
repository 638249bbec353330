//! Benchmark box and plane clipping of a tessellated sphere.

use std::f64::consts::{PI, TAU};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowkit::{Aabb, PlaneClipper, PlacedSoup, SolidClipper, TriangleSoup};
use glam::DVec3;

/// UV sphere with outward normals, `2 · rings · segments` triangles.
fn uv_sphere(radius: f64, rings: usize, segments: usize) -> TriangleSoup {
  let point = |ring: usize, segment: usize| {
    let theta = PI * ring as f64 / rings as f64;
    let phi = TAU * segment as f64 / segments as f64;
    DVec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()) * radius
  };

  let mut soup = TriangleSoup::with_attributes(true, false, false);
  for ring in 0..rings {
    for segment in 0..segments {
      let a = point(ring, segment);
      let b = point(ring + 1, segment);
      let c = point(ring + 1, segment + 1);
      let d = point(ring, segment + 1);
      for tri in [[a, c, b], [a, d, c]] {
        let normal = (tri[0] + tri[1] + tri[2]).normalize_or_zero();
        soup.push_triangle(tri, normal);
      }
    }
  }
  soup
}

fn bench_solid_clip(c: &mut Criterion) {
  let mut group = c.benchmark_group("solid_clip");
  let clipper = SolidClipper::new(Aabb::new(DVec3::splat(-0.7), DVec3::splat(0.7)));

  for resolution in [16usize, 64, 128] {
    let sphere = uv_sphere(1.0, resolution, resolution * 2);
    group.throughput(Throughput::Elements(sphere.triangle_count() as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(sphere.triangle_count()),
      &sphere,
      |b, sphere| {
        b.iter(|| {
          let result = clipper.clip(&[PlacedSoup::identity(black_box(sphere))]);
          black_box(result.output_triangles)
        });
      },
    );
  }
  group.finish();
}

fn bench_plane_clip(c: &mut Criterion) {
  let sphere = uv_sphere(1.0, 64, 128);
  let clipper = PlaneClipper::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0), DVec3::splat(-1.0));

  c.bench_function("plane_clip (16k triangles)", |b| {
    b.iter(|| {
      let result = clipper.clip(&[PlacedSoup::identity(black_box(&sphere))]);
      black_box(result.output_triangles)
    });
  });
}

criterion_group!(benches, bench_solid_clip, bench_plane_clip);
criterion_main!(benches);
