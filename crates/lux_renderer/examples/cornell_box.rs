//! Cornell box example.
//!
//! Renders the classic box with a glossy sphere, a rough glass sphere, a
//! torus, a block of smoke, a marble ball moving during the shutter and,
//! optionally, an OBJ mesh, then writes a PPM.
//!
//! Usage: `cornell_box [config.json] [mesh.obj]`
//!
//! Set `RUST_LOG=info` to see progress.

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::Context;
use lux_renderer::{
    render_parallel, AxisRect, Camera, Color, ConstantMedium, Cuboid, Dielectric, DiffuseLight,
    FlipFace, Glossy, Hittable, Lambertian, Material, MovingSphere, NoiseTexture, PpmSink,
    RenderConfig, Scene, Sphere, Torus, Transform, TriangleMesh, Vec3, Winding,
};

const OUTPUT: &str = "cornell_box.ppm";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => RenderConfig::from_json_file(&path)
            .with_context(|| format!("reading render config {}", path))?,
        None => RenderConfig {
            samples_per_pixel: 64,
            max_depth: 20,
            ..Default::default()
        },
    };
    let mesh_path = args.next();

    let start = std::time::Instant::now();
    let scene = build_scene(mesh_path.as_deref());
    log::info!("Scene built in {:?}", start.elapsed());

    let mut camera = Camera::new()
        .with_resolution(400, 400)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0), // look_from
            Vec3::new(278.0, 278.0, 0.0),    // look_at
            Vec3::new(0.0, 1.0, 0.0),        // vup
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);
    camera.initialize();

    let image = render_parallel(&camera, &scene, &config);

    let file = File::create(OUTPUT).with_context(|| format!("creating {}", OUTPUT))?;
    let mut sink = PpmSink::new(BufWriter::new(file));
    image.write_to(&mut sink)?;
    log::info!("Saved to {}", OUTPUT);
    Ok(())
}

fn build_scene(mesh_path: Option<&str>) -> Scene {
    let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.12, 0.45, 0.15)));
    let light_material: Arc<dyn Material> =
        Arc::new(DiffuseLight::from_color(Color::new(1.0, 0.9, 0.7) * 15.0));

    let mut builder = Scene::builder();

    // Walls
    builder
        .add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)))
        .add(Arc::new(AxisRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)))
        .add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())))
        .add(Arc::new(AxisRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())))
        .add(Arc::new(AxisRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));

    // Ceiling light, flipped to face down into the room
    let light: Arc<dyn Hittable> =
        Arc::new(AxisRect::xz(213.0, 343.0, 227.0, 332.0, 554.0, light_material));
    builder.add(Arc::new(FlipFace::new(light.clone()))).add_light(light);

    // Glossy sphere
    let glossy: Arc<dyn Material> = Arc::new(Glossy::new(
        Color::new(0.9, 0.9, 0.5),
        Color::new(0.9, 0.9, 0.9),
        0.1,
        0.2,
    ));
    builder.add(Arc::new(Sphere::new(Vec3::new(140.0, 90.0, 160.0), 90.0, glossy)));

    // Rough glass sphere, also sampled as a light target for caustics
    let glass: Arc<dyn Material> = Arc::new(
        Dielectric::new(1.5)
            .with_roughness(0.05)
            .with_specular_chance(0.05),
    );
    let glass_sphere: Arc<dyn Hittable> =
        Arc::new(Sphere::new(Vec3::new(400.0, 80.0, 150.0), 80.0, glass));
    builder.add(glass_sphere.clone()).add_light(glass_sphere);

    // Torus standing on its rim against the back wall
    let torus: Arc<dyn Hittable> = Arc::new(Torus::new(Vec3::ZERO, 70.0, 20.0, white.clone()));
    let torus = Arc::new(Transform::rotate_y(torus, 30.0));
    builder.add(Arc::new(Transform::translate(torus, Vec3::new(300.0, 90.0, 450.0))));

    // Smoke block
    let block: Arc<dyn Hittable> =
        Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(120.0, 250.0, 120.0), white.clone()));
    let block: Arc<dyn Hittable> = Arc::new(Transform::rotate_y(block, 15.0));
    let block: Arc<dyn Hittable> = Arc::new(Transform::translate(block, Vec3::new(100.0, 0.0, 380.0)));
    builder.add(Arc::new(ConstantMedium::from_color(block, 0.01, Color::ZERO)));

    // Marble ball, blurred by its motion
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(4.0, 7))));
    builder.add(Arc::new(MovingSphere::new(
        Vec3::new(460.0, 400.0, 400.0),
        Vec3::new(490.0, 400.0, 400.0),
        50.0,
        marble,
    )));

    if let Some(path) = mesh_path {
        let mesh: Arc<dyn Hittable> =
            Arc::new(TriangleMesh::load_obj(path, Winding::CounterClockwise, white));
        let mesh: Arc<dyn Hittable> = Arc::new(Transform::scale(mesh, 90.0));
        builder.add(Arc::new(Transform::translate(mesh, Vec3::new(315.0, 150.0, 320.0))));
    }

    builder.build()
}
