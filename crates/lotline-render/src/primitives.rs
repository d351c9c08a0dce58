//! Mesh primitives (box, plane, grid, markers)

use bytemuck::{Pod, Zeroable};

/// A vertex with position, normal, and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Create a box mesh with the given dimensions and color
pub fn create_box_mesh(width: f32, height: f32, depth: f32, color: [f32; 4]) -> Mesh {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let hd = depth / 2.0;

    // 8 corners
    let positions = [
        [-hw, -hh, -hd], // 0: back-bottom-left
        [hw, -hh, -hd],  // 1: back-bottom-right
        [hw, hh, -hd],   // 2: back-top-right
        [-hw, hh, -hd],  // 3: back-top-left
        [-hw, -hh, hd],  // 4: front-bottom-left
        [hw, -hh, hd],   // 5: front-bottom-right
        [hw, hh, hd],    // 6: front-top-right
        [-hw, hh, hd],   // 7: front-top-left
    ];

    let normals = [
        [0.0, 0.0, -1.0], // back
        [0.0, 0.0, 1.0],  // front
        [-1.0, 0.0, 0.0], // left
        [1.0, 0.0, 0.0],  // right
        [0.0, -1.0, 0.0], // bottom
        [0.0, 1.0, 0.0],  // top
    ];

    // 6 faces x 4 vertices; per-face order must produce CCW winding for the
    // outward normal when indexed with [base, base+1, base+2, base, base+2, base+3]
    let face_corners = [
        [0, 3, 2, 1], // back (z-)
        [4, 5, 6, 7], // front (z+)
        [0, 4, 7, 3], // left (x-)
        [5, 1, 2, 6], // right (x+)
        [0, 1, 5, 4], // bottom (y-)
        [3, 7, 6, 2], // top (y+)
    ];

    let mut vertices = Vec::with_capacity(24);
    for (face, corners) in face_corners.iter().enumerate() {
        for &corner in corners {
            vertices.push(Vertex {
                position: positions[corner],
                normal: normals[face],
                color,
            });
        }
    }

    let indices: Vec<u32> = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    Mesh { vertices, indices }
}

/// Create a wireframe box (edges only, for spot borders)
pub fn create_wireframe_box_mesh(width: f32, height: f32, depth: f32, color: [f32; 4]) -> Mesh {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let hd = depth / 2.0;

    let positions = [
        [-hw, -hh, -hd],
        [hw, -hh, -hd],
        [hw, hh, -hd],
        [-hw, hh, -hd],
        [-hw, -hh, hd],
        [hw, -hh, hd],
        [hw, hh, hd],
        [-hw, hh, hd],
    ];

    let vertices: Vec<Vertex> = positions
        .iter()
        .map(|&position| Vertex {
            position,
            normal: [0.0, 1.0, 0.0],
            color,
        })
        .collect();

    // Line indices for 12 edges
    let indices: Vec<u32> = vec![
        // Bottom face edges
        0, 1, 1, 5, 5, 4, 4, 0, // Top face edges
        3, 2, 2, 6, 6, 7, 7, 3, // Vertical edges
        0, 3, 1, 2, 5, 6, 4, 7,
    ];

    Mesh { vertices, indices }
}

/// Create a flat plane mesh lying on y = 0
pub fn create_plane_mesh(width: f32, depth: f32, color: [f32; 4]) -> Mesh {
    let hw = width / 2.0;
    let hd = depth / 2.0;

    let vertices = vec![
        Vertex {
            position: [-hw, 0.0, -hd],
            normal: [0.0, 1.0, 0.0],
            color,
        },
        Vertex {
            position: [hw, 0.0, -hd],
            normal: [0.0, 1.0, 0.0],
            color,
        },
        Vertex {
            position: [hw, 0.0, hd],
            normal: [0.0, 1.0, 0.0],
            color,
        },
        Vertex {
            position: [-hw, 0.0, hd],
            normal: [0.0, 1.0, 0.0],
            color,
        },
    ];

    let indices: Vec<u32> = vec![0, 2, 1, 0, 3, 2];

    Mesh { vertices, indices }
}

/// Create a grid of lines over the ground plane
pub fn create_grid_mesh(size: f32, divisions: u32, color: [f32; 4]) -> Mesh {
    let half = size / 2.0;
    let step = size / divisions as f32;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    let mut idx = 0u32;

    // Lines along X axis
    for i in 0..=divisions {
        let z = -half + i as f32 * step;
        vertices.push(Vertex {
            position: [-half, 0.0, z],
            normal: [0.0, 1.0, 0.0],
            color,
        });
        vertices.push(Vertex {
            position: [half, 0.0, z],
            normal: [0.0, 1.0, 0.0],
            color,
        });
        indices.push(idx);
        indices.push(idx + 1);
        idx += 2;
    }

    // Lines along Z axis
    for i in 0..=divisions {
        let x = -half + i as f32 * step;
        vertices.push(Vertex {
            position: [x, 0.0, -half],
            normal: [0.0, 1.0, 0.0],
            color,
        });
        vertices.push(Vertex {
            position: [x, 0.0, half],
            normal: [0.0, 1.0, 0.0],
            color,
        });
        indices.push(idx);
        indices.push(idx + 1);
        idx += 2;
    }

    Mesh { vertices, indices }
}

/// Create an n-sided prism standing on y = 0, used for the entrance and
/// exit markers at street ends.
pub fn create_marker_mesh(radius: f32, height: f32, sides: u32, color: [f32; 4]) -> Mesh {
    let sides = sides.max(3);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side walls: a quad per segment with an outward-facing normal
    for i in 0..sides {
        let a0 = i as f32 / sides as f32 * std::f32::consts::TAU;
        let a1 = (i + 1) as f32 / sides as f32 * std::f32::consts::TAU;
        let (x0, z0) = (radius * a0.cos(), radius * a0.sin());
        let (x1, z1) = (radius * a1.cos(), radius * a1.sin());
        let mid = (a0 + a1) / 2.0;
        let normal = [mid.cos(), 0.0, mid.sin()];

        let base = vertices.len() as u32;
        vertices.push(Vertex {
            position: [x0, 0.0, z0],
            normal,
            color,
        });
        vertices.push(Vertex {
            position: [x1, 0.0, z1],
            normal,
            color,
        });
        vertices.push(Vertex {
            position: [x1, height, z1],
            normal,
            color,
        });
        vertices.push(Vertex {
            position: [x0, height, z0],
            normal,
            color,
        });
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    // Top cap: fan around the center
    let center = vertices.len() as u32;
    vertices.push(Vertex {
        position: [0.0, height, 0.0],
        normal: [0.0, 1.0, 0.0],
        color,
    });
    let rim_start = vertices.len() as u32;
    for i in 0..sides {
        let a = i as f32 / sides as f32 * std::f32::consts::TAU;
        vertices.push(Vertex {
            position: [radius * a.cos(), height, radius * a.sin()],
            normal: [0.0, 1.0, 0.0],
            color,
        });
    }
    for i in 0..sides {
        let next = (i + 1) % sides;
        indices.extend_from_slice(&[center, rim_start + i, rim_start + next]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_mesh_counts() {
        let mesh = create_box_mesh(60.0, 3.0, 120.0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
    }

    #[test]
    fn test_box_mesh_extents() {
        let mesh = create_box_mesh(60.0, 3.0, 120.0, [1.0; 4]);
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert_eq!(max_x, 30.0);
        assert_eq!(max_y, 1.5);
    }

    #[test]
    fn test_wireframe_box_counts() {
        let mesh = create_wireframe_box_mesh(62.0, 2.0, 122.0, [1.0; 4]);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.index_count(), 24);
    }

    #[test]
    fn test_grid_mesh_counts() {
        let mesh = create_grid_mesh(2000.0, 30, [0.3; 4]);
        // 31 lines each way, 2 vertices per line
        assert_eq!(mesh.vertex_count(), 124);
        assert_eq!(mesh.index_count(), 124);
    }

    #[test]
    fn test_marker_mesh_stands_on_ground() {
        let mesh = create_marker_mesh(5.0, 10.0, 8, [1.0; 4]);
        let min_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MAX, f32::min);
        assert_eq!(min_y, 0.0);
        // 8 sides x 4 wall verts + 1 center + 8 rim
        assert_eq!(mesh.vertex_count(), 41);
    }
}
