use bytemuck::{Pod, Zeroable};

/// Vertex with position, outward normal and texture coordinate.
///
/// `#[repr(C)]` so the mesh can be uploaded to a vertex buffer as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    #[inline]
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends a `(rows + 1) × (cols + 1)` row-major vertex grid as two
    /// triangles per cell.
    pub fn append_grid(&mut self, grid: &[Vertex], rows: u32, cols: u32) {
        debug_assert_eq!(grid.len(), ((rows + 1) * (cols + 1)) as usize);

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(grid);

        let stride = cols + 1;
        for row in 0..rows {
            for col in 0..cols {
                let a = base + row * stride + col;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                self.indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
        }
    }

    /// True when every index refers to an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vertex {
        Vertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, y])
    }

    #[test]
    fn single_cell_grid_makes_two_triangles() {
        let mut mesh = Mesh::default();
        mesh.append_grid(&[v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)], 1, 1);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 3, 0, 3, 2]);
    }

    #[test]
    fn second_grid_indices_are_offset() {
        let quad = [v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)];
        let mut mesh = Mesh::default();
        mesh.append_grid(&quad, 1, 1);
        mesh.append_grid(&quad, 1, 1);
        assert_eq!(&mesh.indices[6..], &[4, 5, 7, 4, 7, 6]);
        assert!(mesh.indices_in_bounds());
    }
}
