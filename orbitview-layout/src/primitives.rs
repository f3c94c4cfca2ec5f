//! Tessellated primitives used for node bodies and ring guides

use orbitview_core::{LineMesh, Point3f, TriangleMesh, Vector3f};
use std::f32::consts::{PI, TAU};

/// UV sphere centered at the origin with outward vertex normals.
///
/// `segments` is the number of longitudinal slices (clamped to 3),
/// `rings` the number of latitudinal bands (clamped to 2).
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> TriangleMesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let stride = segments + 1;

    let mut vertices = Vec::with_capacity(((rings + 1) * stride) as usize);
    let mut normals = Vec::with_capacity(vertices.capacity());
    for lat in 0..=rings {
        let theta = lat as f32 * PI / rings as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for lon in 0..=segments {
            let phi = lon as f32 * TAU / segments as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = Vector3f::new(sin_t * cos_p, cos_t, sin_t * sin_p);
            vertices.push(Point3f::from(normal * radius));
            normals.push(normal);
        }
    }

    let mut faces = Vec::with_capacity((2 * rings * segments) as usize);
    for lat in 0..rings {
        for lon in 0..segments {
            let a = lat * stride + lon;
            let b = a + stride;
            faces.push([a, b, a + 1]);
            faces.push([b, b + 1, a + 1]);
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.set_normals(normals);
    mesh
}

/// Closed circle of `segments` line segments in the XZ plane
pub fn circle(radius: f32, segments: u32) -> LineMesh {
    let segments = segments.max(3);
    let vertices = (0..segments)
        .map(|i| {
            let angle = i as f32 * TAU / segments as f32;
            Point3f::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect();
    LineMesh::closed_loop(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_vertices_lie_on_surface() {
        let sphere = uv_sphere(2.0, 12, 8);
        assert_eq!(sphere.vertex_count(), 9 * 13);
        assert_eq!(sphere.face_count(), 2 * 8 * 12);
        for v in &sphere.vertices {
            assert_relative_eq!(v.coords.norm(), 2.0, epsilon = 1e-5);
        }
        for n in sphere.normals.as_ref().unwrap() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
        }
        let max_index = sphere.vertex_count() as u32;
        assert!(sphere.faces.iter().flatten().all(|&i| i < max_index));
    }

    #[test]
    fn test_sphere_clamps_degenerate_resolution() {
        let sphere = uv_sphere(1.0, 0, 0);
        assert_eq!(sphere.face_count(), 2 * 2 * 3);
    }

    #[test]
    fn test_circle_is_flat_and_closed() {
        let ring = circle(5.0, 64);
        assert_eq!(ring.segment_count(), 64);
        for v in &ring.vertices {
            assert_relative_eq!(v.y, 0.0);
            assert_relative_eq!((v.x * v.x + v.z * v.z).sqrt(), 5.0, epsilon = 1e-4);
        }
        assert_eq!(ring.segments.last(), Some(&[63, 0]));
    }
}
