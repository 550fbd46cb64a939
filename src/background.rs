//! Decorative 3D background: floating solids and a particle field.
//!
//! The scene is a plain simulation. Each [`Scene::advance`] is one display frame; the host
//! supplies pointer and scroll input and draws the result however it likes (see
//! [`crate::poster`] for the CPU rasterizer).

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::foundation::{
    core::{Point, Viewport},
    error::{FolioError, FolioResult},
};

const TIME_STEP: f32 = 0.01;
const FLOAT_AMPLITUDE: f32 = 0.01;
const PARTICLE_SPIN: f32 = 0.0005;
const POINTER_REACH: f32 = 5.0;
const CAMERA_EASE: f32 = 0.05;
const SCROLL_FACTOR: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    Icosahedron,
    Octahedron,
    Tetrahedron,
    Cube,
}

impl Shape {
    pub const ALL: [Self; 4] = [Self::Icosahedron, Self::Octahedron, Self::Tetrahedron, Self::Cube];

    /// Vertices of the unit solid (circumradius 1; the cube has edge length 1).
    pub fn vertices(self) -> Vec<Vec3> {
        match self {
            Self::Icosahedron => {
                let t = (1.0 + 5f32.sqrt()) / 2.0;
                [
                    (-1.0, t, 0.0),
                    (1.0, t, 0.0),
                    (-1.0, -t, 0.0),
                    (1.0, -t, 0.0),
                    (0.0, -1.0, t),
                    (0.0, 1.0, t),
                    (0.0, -1.0, -t),
                    (0.0, 1.0, -t),
                    (t, 0.0, -1.0),
                    (t, 0.0, 1.0),
                    (-t, 0.0, -1.0),
                    (-t, 0.0, 1.0),
                ]
                .into_iter()
                .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
                .collect()
            }
            Self::Octahedron => vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            Self::Tetrahedron => [(1.0, 1.0, 1.0), (-1.0, -1.0, 1.0), (-1.0, 1.0, -1.0), (1.0, -1.0, -1.0)]
                .into_iter()
                .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
                .collect(),
            Self::Cube => {
                let mut v = Vec::with_capacity(8);
                for x in [-0.5, 0.5] {
                    for y in [-0.5, 0.5] {
                        for z in [-0.5, 0.5] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                v
            }
        }
    }

    /// Vertex index pairs of the solid's edges. For these regular solids the edges are
    /// exactly the vertex pairs at minimal distance.
    pub fn edges(self) -> Vec<(usize, usize)> {
        let v = self.vertices();
        let mut min = f32::INFINITY;
        for i in 0..v.len() {
            for j in (i + 1)..v.len() {
                min = min.min(v[i].distance(v[j]));
            }
        }
        let mut edges = Vec::new();
        for i in 0..v.len() {
            for j in (i + 1)..v.len() {
                if (v[i].distance(v[j]) - min).abs() < 1e-4 {
                    edges.push((i, j));
                }
            }
        }
        edges
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MaterialKind {
    Solid,
    Wireframe,
}

/// Flat colour and opacity of a material, straight alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub rgb: [u8; 3],
    pub opacity: f32,
}

impl MaterialKind {
    pub fn material(self) -> Material {
        match self {
            Self::Solid => Material {
                rgb: [0x00, 0xd4, 0xff],
                opacity: 0.7,
            },
            Self::Wireframe => Material {
                rgb: [0x7b, 0x2f, 0xf7],
                opacity: 0.3,
            },
        }
    }
}

pub const PARTICLE_MATERIAL: Material = Material {
    rgb: [0x00, 0xd4, 0xff],
    opacity: 0.8,
};

#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstance {
    pub shape: Shape,
    pub material: MaterialKind,
    pub position: Vec3,
    pub scale: f32,
    pub rotation: Vec3, // euler XYZ, radians
    pub rotation_speed: Vec3,
    pub float_speed: f32,
    pub float_offset: f32,
}

impl MeshInstance {
    fn random(rng: &mut StdRng, spread: f32) -> Self {
        let shape = Shape::ALL[rng.gen_range(0..Shape::ALL.len())];
        let material = if rng.r#gen::<f32>() > 0.5 {
            MaterialKind::Solid
        } else {
            MaterialKind::Wireframe
        };
        let mut centered = |extent: f32| (rng.r#gen::<f32>() - 0.5) * extent;
        let position = Vec3::new(centered(spread), centered(spread), centered(spread));
        let rotation_speed = Vec3::new(centered(0.01), centered(0.01), centered(0.01));

        Self {
            shape,
            material,
            position,
            scale: rng.r#gen::<f32>() * 2.0 + 0.5,
            rotation: Vec3::new(rng.r#gen::<f32>() * PI, rng.r#gen::<f32>() * PI, 0.0),
            rotation_speed,
            float_speed: rng.r#gen::<f32>() * 0.02 + 0.01,
            float_offset: rng.r#gen::<f32>() * PI * 2.0,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            self.position,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particles {
    pub positions: Vec<Vec3>,
    pub rotation_y: f32,
}

impl Particles {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub pixel_ratio: f32,
}

impl Camera {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// The camera never rotates; it looks down -Z from its position.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackgroundOptions {
    pub mesh_count: usize,
    pub particle_count: usize,
    /// Side of the cube the meshes are scattered in.
    pub mesh_spread: f32,
    pub particle_spread: f32,
    pub camera_distance: f32,
    pub seed: u64,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            mesh_count: 25,
            particle_count: 200,
            mesh_spread: 80.0,
            particle_spread: 100.0,
            camera_distance: 30.0,
            seed: 0x00d4_ff7b,
        }
    }
}

impl BackgroundOptions {
    pub fn validate(&self) -> FolioResult<()> {
        if !(self.mesh_spread > 0.0 && self.particle_spread > 0.0) {
            return Err(FolioError::validation("background spreads must be > 0"));
        }
        if !(self.camera_distance > 0.0) {
            return Err(FolioError::validation("background camera_distance must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    meshes: Vec<MeshInstance>,
    particles: Particles,
    camera: Camera,
    time: f32,
    pointer: Point, // normalized, y up
    scroll_y: f64,
    frame: u64,
    running: bool,
}

impl Scene {
    #[tracing::instrument(skip(opts), fields(seed = opts.seed))]
    pub fn new(opts: &BackgroundOptions, viewport: Viewport) -> FolioResult<Self> {
        opts.validate()?;
        let mut rng = StdRng::seed_from_u64(opts.seed);

        let meshes = (0..opts.mesh_count)
            .map(|_| MeshInstance::random(&mut rng, opts.mesh_spread))
            .collect();
        let positions = (0..opts.particle_count)
            .map(|_| {
                let mut c = || (rng.r#gen::<f32>() - 0.5) * opts.particle_spread;
                Vec3::new(c(), c(), c())
            })
            .collect();

        let camera = Camera {
            fov_y_deg: 75.0,
            aspect: viewport.aspect() as f32,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, opts.camera_distance),
            pixel_ratio: viewport.capped_pixel_ratio() as f32,
        };

        Ok(Self {
            meshes,
            particles: Particles {
                positions,
                rotation_y: 0.0,
            },
            camera,
            time: 0.0,
            pointer: Point::ZERO,
            scroll_y: 0.0,
            frame: 0,
            running: true,
        })
    }

    pub fn meshes(&self) -> &[MeshInstance] {
        &self.meshes
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pointer position already normalized to `[-1, 1]`.
    pub fn set_pointer(&mut self, normalized: Point) {
        self.pointer = normalized;
    }

    pub fn set_scroll(&mut self, y: f64) {
        self.scroll_y = y;
    }

    /// Recompute the projection for a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.aspect = viewport.aspect() as f32;
        self.camera.pixel_ratio = viewport.capped_pixel_ratio() as f32;
    }

    /// Cancel the frame loop. Later [`Scene::advance`] calls do nothing.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance one display frame.
    pub fn advance(&mut self) {
        if !self.running {
            return;
        }
        self.time += TIME_STEP;
        self.frame += 1;

        for mesh in &mut self.meshes {
            mesh.rotation += mesh.rotation_speed;
            mesh.position.y +=
                (self.time * mesh.float_speed + mesh.float_offset).sin() * FLOAT_AMPLITUDE;
        }
        self.particles.rotation_y += PARTICLE_SPIN;

        // The pointer steers x; the scroll offset owns the camera height.
        let target_x = self.pointer.x as f32 * POINTER_REACH;
        self.camera.position.x += (target_x - self.camera.position.x) * CAMERA_EASE;
        self.camera.position.y = self.scroll_y as f32 * SCROLL_FACTOR;
    }

    /// Advance until `frame` frames have elapsed since creation.
    pub fn advance_to(&mut self, frame: u64) {
        while self.running && self.frame < frame {
            self.advance();
        }
    }

    /// Normalized device coordinates of a world-space point, if it is in front of the
    /// camera and inside the depth range.
    pub fn project(&self, world: Vec3) -> Option<glam::Vec2> {
        project_with(self.camera.view_projection(), world)
    }
}

pub fn project_with(view_projection: Mat4, world: Vec3) -> Option<glam::Vec2> {
    let clip = view_projection * world.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(ndc.truncate())
}
