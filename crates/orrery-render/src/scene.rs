//! Per-frame scene description handed to the renderer.

use glam::{Mat4, Vec3, Vec4};

use crate::pipeline::Shading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Sphere,
    Quad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshKind,
    /// Texture file name, as passed to [`TextureLibrary::load`](crate::TextureLibrary::load).
    pub texture: &'static str,
    pub model: Mat4,
    pub tint: Vec4,
    pub shading: Shading,
}

impl DrawItem {
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneFrame {
    pub items: Vec<DrawItem>,
}

impl SceneFrame {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Opaque items first in submission order, then blended items from
    /// farthest to nearest `eye`.
    pub fn sort_for_drawing(&mut self, eye: Vec3) {
        self.items.sort_by(|a, b| {
            match (a.shading.is_blended(), b.shading.is_blended()) {
                (false, false) => std::cmp::Ordering::Equal,
                (false, true) => std::cmp::Ordering::Less,
                (true, false) => std::cmp::Ordering::Greater,
                (true, true) => b
                    .origin()
                    .distance_squared(eye)
                    .total_cmp(&a.origin().distance_squared(eye)),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(shading: Shading, at: Vec3, texture: &'static str) -> DrawItem {
        DrawItem {
            mesh: if shading.is_blended() {
                MeshKind::Quad
            } else {
                MeshKind::Sphere
            },
            texture,
            model: Mat4::from_translation(at),
            tint: Vec4::ONE,
            shading,
        }
    }

    #[test]
    fn test_origin_is_translation() {
        let i = item(Shading::Lit, Vec3::new(1.0, 2.0, 3.0), "earth.jpg");
        assert_eq!(i.origin(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_sort_puts_blended_last_far_to_near() {
        let mut frame = SceneFrame::default();
        frame.push(item(Shading::Ring, Vec3::new(0.0, 0.0, 5.0), "near-ring"));
        frame.push(item(Shading::Unlit, Vec3::ZERO, "background.jpg"));
        frame.push(item(Shading::Ring, Vec3::new(0.0, 0.0, 50.0), "far-ring"));
        frame.push(item(Shading::Lit, Vec3::X, "mars.jpg"));

        frame.sort_for_drawing(Vec3::ZERO);
        let order: Vec<_> = frame.items.iter().map(|i| i.texture).collect();
        assert_eq!(order, ["background.jpg", "mars.jpg", "far-ring", "near-ring"]);
    }
}
