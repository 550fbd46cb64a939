//! CPU rasterizer for one background frame.
//!
//! Used for static fallbacks and previews: particles become small dots, every mesh is drawn
//! as its wireframe edges. Pixels are premultiplied RGBA8.

use std::path::Path;

use glam::{Mat4, Vec2};

use crate::{
    background::{Material, PARTICLE_MATERIAL, Scene, project_with},
    foundation::error::{FolioError, FolioResult},
};

pub type PremulRgba8 = [u8; 4];

/// World-space size of one particle.
const PARTICLE_SIZE: f32 = 0.15;
/// Edges reaching further than this outside the viewport (in NDC units) are skipped.
const NDC_LIMIT: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PosterSettings {
    pub width: u32,
    pub height: u32,
    pub clear_rgba: PremulRgba8,
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            clear_rgba: [10, 14, 39, 255],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Poster {
    fn new(settings: &PosterSettings) -> Self {
        let len = settings.width as usize * settings.height as usize;
        Self {
            width: settings.width,
            height: settings.height,
            data: settings.clear_rgba.repeat(len),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    fn blend(&mut self, x: i64, y: i64, src: PremulRgba8, opacity: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let dst = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        self.data[i..i + 4].copy_from_slice(&over(dst, src, opacity));
    }

    fn line(&mut self, a: Vec2, b: Vec2, src: PremulRgba8, opacity: f32) {
        let steps = (b - a).abs().max_element().ceil().max(1.0) as usize;
        for s in 0..=steps {
            let p = a.lerp(b, s as f32 / steps as f32);
            self.blend(p.x.round() as i64, p.y.round() as i64, src, opacity);
        }
    }

    fn dot(&mut self, center: Vec2, radius: f32, src: PremulRgba8, opacity: f32) {
        let r = radius.max(0.5);
        let (x0, x1) = ((center.x - r).floor() as i64, (center.x + r).ceil() as i64);
        let (y0, y1) = ((center.y - r).floor() as i64, (center.y + r).ceil() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                if d <= r + 0.5 {
                    self.blend(x, y, src, opacity);
                }
            }
        }
    }

    pub fn save_png(&self, path: &Path) -> FolioResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| FolioError::render(format!("write png '{}': {e}", path.display())))
    }
}

/// Draw `scene` as it currently stands.
#[tracing::instrument(skip(scene), fields(frame = scene.frame()))]
pub fn render_frame(scene: &Scene, settings: &PosterSettings) -> FolioResult<Poster> {
    if settings.width == 0 || settings.height == 0 {
        return Err(FolioError::validation("poster size must be non-zero"));
    }
    let mut poster = Poster::new(settings);
    let size = Vec2::new(settings.width as f32, settings.height as f32);
    let camera = scene.camera();
    let view = camera.view();
    let view_projection = camera.view_projection();
    let focal = size.y / 2.0 / (camera.fov_y_deg.to_radians() / 2.0).tan();

    let particles = scene.particles();
    let particle_model = particles.model_matrix();
    let src = premul(PARTICLE_MATERIAL);
    for p in &particles.positions {
        let world = particle_model.transform_point3(*p);
        let Some(ndc) = project_with(view_projection, world) else {
            continue;
        };
        let depth = -view.transform_point3(world).z;
        let radius = PARTICLE_SIZE / 2.0 * focal / depth;
        poster.dot(to_pixels(ndc, size), radius, src, PARTICLE_MATERIAL.opacity);
    }

    for mesh in scene.meshes() {
        let material = mesh.material.material();
        let src = premul(material);
        let mvp: Mat4 = view_projection * mesh.model_matrix();
        let projected: Vec<Option<Vec2>> = mesh
            .shape
            .vertices()
            .into_iter()
            .map(|v| project_with(mvp, v).filter(|n| n.abs().max_element() <= NDC_LIMIT))
            .collect();
        for (a, b) in mesh.shape.edges() {
            if let (Some(pa), Some(pb)) = (projected[a], projected[b]) {
                poster.line(to_pixels(pa, size), to_pixels(pb, size), src, material.opacity);
            }
        }
    }

    Ok(poster)
}

fn to_pixels(ndc: Vec2, size: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) / 2.0 * size.x, (1.0 - ndc.y) / 2.0 * size.y)
}

fn premul(material: Material) -> PremulRgba8 {
    let [r, g, b] = material.rgb;
    [r, g, b, 255]
}

/// Source-over with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
