//! Procedural meshes: a UV sphere for bodies and the sky, and a unit quad
//! for rings.

use std::f32::consts::{PI, TAU};

use crate::buffer::VertexPositionNormalUv;

/// Radius of the generated sphere. A body of scale `s` has diameter `s`.
pub const SPHERE_RADIUS: f32 = 0.5;

/// CPU-side mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Latitude/longitude sphere with equirectangular texture coordinates.
///
/// `u = 0.5 + atan2(z, x) / TAU` and `v = 0.5 - asin(y) / PI` on the unit
/// direction. The seam column is duplicated so `u` runs from 0 to 1 without
/// wrapping inside a triangle.
#[must_use]
pub fn uv_sphere(stacks: u32, slices: u32) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize),
        indices: Vec::with_capacity((stacks * slices * 6) as usize),
    };

    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * PI;
        let (ring, y) = phi.sin_cos();
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let theta = (u - 0.5) * TAU;
            let (sin_t, cos_t) = theta.sin_cos();
            let normal = [ring * cos_t, y, ring * sin_t];
            mesh.vertices.push(VertexPositionNormalUv {
                position: normal.map(|c| c * SPHERE_RADIUS),
                normal,
                uv: [u, v],
            });
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Unit quad in the XY plane facing -Z, spanning -0.5..0.5.
#[must_use]
pub fn unit_quad() -> MeshData {
    let normal = [0.0, 0.0, -1.0];
    let corner = |x: f32, y: f32, u: f32, v: f32| VertexPositionNormalUv {
        position: [x, y, 0.0],
        normal,
        uv: [u, v],
    };
    MeshData {
        vertices: vec![
            corner(-0.5, 0.5, 0.0, 0.0),
            corner(0.5, 0.5, 1.0, 0.0),
            corner(0.5, -0.5, 1.0, 1.0),
            corner(-0.5, -0.5, 0.0, 1.0),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(16, 32);
        assert_eq!(mesh.vertices.len(), 17 * 33);
        assert_eq!(mesh.triangle_count(), 16 * 32 * 2);
    }

    #[test]
    fn test_sphere_vertices_on_radius_with_outward_normals() {
        let mesh = uv_sphere(12, 24);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((p.length() - SPHERE_RADIUS).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(p.normalize().dot(n) > 0.999);
        }
    }

    #[test]
    fn test_sphere_uvs_follow_equirect_mapping() {
        let mesh = uv_sphere(8, 16);
        for v in &mesh.vertices {
            let [u, tv] = v.uv;
            assert!((0.0..=1.0).contains(&u));
            assert!((0.0..=1.0).contains(&tv));

            let n = Vec3::from(v.normal);
            let expected_v = 0.5 - n.y.clamp(-1.0, 1.0).asin() / PI;
            assert!((tv - expected_v).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_seam_columns_coincide() {
        let slices = 16;
        let mesh = uv_sphere(8, slices);
        let row = (slices + 1) as usize;
        for i in 1..8 {
            let first = Vec3::from(mesh.vertices[i * row].position);
            let last = Vec3::from(mesh.vertices[i * row + row - 1].position);
            assert!(first.distance(last) < 1e-5);
        }
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = uv_sphere(10, 20);
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn test_degenerate_resolution_clamped() {
        let mesh = uv_sphere(0, 0);
        assert_eq!(mesh.vertices.len(), 3 * 4);
    }

    #[test]
    fn test_quad_spans_unit_square() {
        let quad = unit_quad();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.triangle_count(), 2);
        for v in &quad.vertices {
            assert_eq!(v.position[0].abs(), 0.5);
            assert_eq!(v.position[1].abs(), 0.5);
            assert_eq!(v.position[2], 0.0);
        }
    }
}
