//! Renders a depth image of a triangle mesh by casting one ray per pixel.
//!
//! ```text
//! cargo run --release --example depth_svg -- [mesh.glb] [output.svg]
//! ```
//!
//! Without a mesh a random triangle soup is rendered. Node transforms of the glTF
//! file are ignored, only the raw primitive positions are used.

use plotters::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use raykd::geometry::{add, cross, normalize, scale, sub};
use raykd::{BoundingBox, KdTree, Ray, Triangle, random_triangles};
use std::time::Instant;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const FIELD_OF_VIEW: f64 = 50.0;

fn load_gltf(path: &str) -> Result<Vec<Triangle>, Box<dyn std::error::Error>> {
    let (document, buffers, _) = gltf::import(path)?;
    let mut triangles = Vec::new();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f64; 3]> =
                positions.map(|p| [p[0] as f64, p[1] as f64, p[2] as f64]).collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            for chunk in indices.chunks_exact(3) {
                triangles.push(Triangle::new(
                    positions[chunk[0] as usize],
                    positions[chunk[1] as usize],
                    positions[chunk[2] as usize],
                ));
            }
        }
    }
    Ok(triangles)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(2).map(String::as_str).unwrap_or("depth.svg");

    let triangles = match args.get(1) {
        Some(path) => load_gltf(path)?,
        None => {
            let bounds = BoundingBox::from_corners([-1.0; 3], [1.0; 3]);
            let mut rng = StdRng::seed_from_u64(123456789);
            random_triangles(&mut rng, 2000, &bounds, 0.2, 1e-4)
        }
    };
    println!("Loaded {} triangles", triangles.len());

    let start = Instant::now();
    let mut tree = KdTree::new();
    tree.build(&triangles, 24);
    println!("Built in {:?}: {}", start.elapsed(), tree.nodes_statistics());

    let Some(bounds) = tree.scene_bounding_box().copied().filter(|b| b.is_valid()) else {
        println!("Nothing to render");
        return Ok(());
    };

    // Camera on the +z side looking at the scene center
    let radius = bounds.half_size.iter().map(|h| h * h).sum::<f64>().sqrt();
    let distance = radius / (FIELD_OF_VIEW.to_radians() * 0.5).tan() * 1.1;
    let eye = add(bounds.center, [0.0, 0.0, distance]);
    let forward = normalize(sub(bounds.center, eye));
    let right = normalize(cross(forward, [0.0, 1.0, 0.0]));
    let up = cross(right, forward);
    let half_height = (FIELD_OF_VIEW.to_radians() * 0.5).tan();
    let half_width = half_height * WIDTH as f64 / HEIGHT as f64;

    let start = Instant::now();
    let mut depths = Vec::with_capacity((WIDTH * HEIGHT) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let u = (2.0 * (x as f64 + 0.5) / WIDTH as f64 - 1.0) * half_width;
            let v = (1.0 - 2.0 * (y as f64 + 0.5) / HEIGHT as f64) * half_height;
            let direction = normalize(add(forward, add(scale(right, u), scale(up, v))));
            let hit = tree.traverse(&Ray::new(eye, direction));
            depths.push(hit.is_hit().then_some(hit.distance));
        }
    }
    let hits = depths.iter().flatten().count();
    println!("Cast {} rays in {:?}, {} hits", depths.len(), start.elapsed(), hits);

    let near = depths.iter().flatten().copied().fold(f64::INFINITY, f64::min);
    let far = depths.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (far - near).max(f64::EPSILON);

    let root = SVGBackend::new(output, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&BLACK)?;
    for (i, depth) in depths.iter().enumerate() {
        if let Some(d) = depth {
            let shade = (255.0 * (1.0 - 0.8 * (d - near) / range)) as u8;
            let x = (i as u32 % WIDTH) as i32;
            let y = (i as u32 / WIDTH) as i32;
            root.draw_pixel((x, y), &RGBColor(shade, shade, shade))?;
        }
    }
    root.present()?;
    println!("Saved to {}", output);

    Ok(())
}
