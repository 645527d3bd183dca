//! The built-in demo scene: a closed room lit by emissive shapes.

use lux_core::TextureCache;
use lux_renderer::{Camera, Color, Mat4, MeshShape, Scene, Shape, SurfaceMaterial, Vec3};

/// Optional mesh placed in the middle of the room.
pub const MESH_PATH: &str = "assets/TorusKnot.obj";

const ROOM_CHECKER_SIZE: f32 = 5.0;

/// Mostly diffuse surface with a glossy reflective layer mixed in.
fn glossy(albedo: Color) -> SurfaceMaterial {
    SurfaceMaterial::blend(
        SurfaceMaterial::diffuse(albedo),
        SurfaceMaterial::reflective(albedo, 0.1),
        0.3,
    )
}

/// Build the scene and the camera that frames it.
pub fn build(textures: &mut TextureCache) -> (Scene, Camera) {
    let mut scene = Scene::new();

    // Floating spheres
    scene.add_shape(
        Shape::sphere(Vec3::new(0.0, 2.3, 2.0), 0.9),
        glossy(Color::new(1.0, 0.5, 0.1)),
    );
    scene.add_shape(
        Shape::sphere(Vec3::new(1.5, 2.2, 3.0), 0.5),
        SurfaceMaterial::diffuse(Color::new(0.1, 1.0, 0.2)),
    );
    scene.add_shape(
        Shape::sphere(Vec3::new(0.2, -1.8, 1.0), 0.5),
        glossy(Color::new(0.5, 0.0, 0.2)),
    );
    scene.add_shape(
        Shape::sphere(Vec3::new(-2.8, -1.2, 4.0), 1.5),
        SurfaceMaterial::combine(
            glossy(Color::new(0.95, 0.75, 0.1)),
            SurfaceMaterial::emissive(Color::new(0.95, 0.75, 0.1) * 0.2),
        ),
    );
    scene.add_shape(
        Shape::capsule(Vec3::new(1.5, -0.5, 0.0), Vec3::new(2.0, -1.5, 0.0), 0.5),
        SurfaceMaterial::combine(
            glossy(Color::new(0.25, 0.75, 0.6)),
            SurfaceMaterial::emissive(Color::new(0.25, 0.75, 0.6) * 0.2),
        ),
    );

    // Lights
    scene.add_shape(
        Shape::sphere(Vec3::new(0.0, 5.0, 0.0), 0.5),
        SurfaceMaterial::emissive(Color::new(5.0, 2.0, 6.0)),
    );
    scene.add_shape(
        Shape::plane(Vec3::NEG_Y, Vec3::new(0.0, 5.0, 0.0)),
        SurfaceMaterial::emissive(Color::new(1.2, 1.2, 1.5)),
    );

    // Room
    let checker = || SurfaceMaterial::diffuse_checker(Color::ONE, ROOM_CHECKER_SIZE);
    scene.add_shape(
        Shape::plane(Vec3::Y, Vec3::new(0.0, -2.5, 0.0)),
        SurfaceMaterial::blend(checker(), SurfaceMaterial::reflective(Color::ONE, 0.05), 0.2),
    );
    scene.add_shape(Shape::plane(Vec3::NEG_Z, Vec3::new(0.0, 0.0, 5.0)), checker());
    scene.add_shape(Shape::plane(Vec3::Z, Vec3::new(0.0, 0.0, -10.0)), checker());
    scene.add_shape(Shape::plane(Vec3::NEG_X, Vec3::new(5.0, 0.0, 0.0)), checker());
    scene.add_shape(Shape::plane(Vec3::X, Vec3::new(-5.0, 0.0, 0.0)), checker());

    // A missing mesh renders as nothing
    let mesh = MeshShape::from_obj_or_empty(
        MESH_PATH,
        textures,
        Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)),
    );
    if !mesh.is_empty() {
        scene.add_shape(Shape::mesh(mesh), glossy(Color::new(1.0, 1.0, 0.5)));
    }

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 0.0, -7.0), Vec3::ZERO, Vec3::Y)
        .with_fov(53.0);

    (scene, camera)
}
