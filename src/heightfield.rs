//! The shared land vertex buffer and the brush-overlay buffer.
//!
//! Both are plain row-major grids of scalar elevations that know how to build
//! a renderable mesh and rewrite its position attribute in place. Only the
//! brush engine mutates the land heights, and only while a stroke is active.

use bevy::{
    mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues},
    prelude::*,
};

use crate::grid;

/// Marker for the land mesh entity. Terrain picks ray-cast against this only.
#[derive(Component, Default)]
pub struct Terrain;

/// The land heightfield: `(columns+1) x (rows+1)` vertex elevations, z-major,
/// with the grid centered on the world origin.
#[derive(Resource)]
pub struct Heightfield {
    columns: u32,
    rows: u32,
    cell_size: f32,
    heights: Vec<f32>,
}

impl Heightfield {
    pub fn flat(columns: u32, rows: u32, cell_size: f32) -> Self {
        let count = (columns as usize + 1) * (rows as usize + 1);
        Self {
            columns,
            rows,
            cell_size,
            heights: vec![0.0; count],
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Flat vertex index for a signed cell coordinate (clamped at the border).
    pub fn vertex_index(&self, cell: IVec2) -> usize {
        grid::heightfield_index(cell, self.columns, self.rows)
    }

    pub fn height(&self, cell: IVec2) -> f32 {
        self.heights[self.vertex_index(cell)]
    }

    pub fn set_height(&mut self, cell: IVec2, y: f32) {
        let idx = self.vertex_index(cell);
        self.heights[idx] = y;
    }

    /// World XZ of a vertex / cell corner.
    pub fn cell_origin(&self, cell: IVec2) -> Vec2 {
        Vec2::new(cell.x as f32, cell.y as f32) * self.cell_size
    }

    /// World position of a grid vertex by unsigned lattice coordinates.
    fn vertex_position(&self, ix: u32, iz: u32, y: f32) -> [f32; 3] {
        [
            (ix as f32 - self.columns as f32 / 2.0) * self.cell_size,
            y,
            (iz as f32 - self.rows as f32 / 2.0) * self.cell_size,
        ]
    }

    pub fn build_mesh(&self) -> Mesh {
        let mut positions = Vec::with_capacity(self.heights.len());
        let mut uvs = Vec::with_capacity(self.heights.len());
        for iz in 0..=self.rows {
            for ix in 0..=self.columns {
                let idx = iz as usize * (self.columns as usize + 1) + ix as usize;
                positions.push(self.vertex_position(ix, iz, self.heights[idx]));
                uvs.push([
                    ix as f32 / self.columns as f32,
                    iz as f32 / self.rows as f32,
                ]);
            }
        }
        build_grid_mesh(positions, uvs, self.columns, self.rows)
    }

    /// Rewrite the y of every vertex in an already-built mesh and refresh the
    /// normals. The caller marks the entity `NoFrustumCulling`, so the stale
    /// bounding volume never culls an edited mesh.
    pub fn write_heights(&self, mesh: &mut Mesh) {
        write_heights_to_mesh(mesh, &self.heights);
    }
}

/// The brush overlay: a `(2*radius+1)^2` vertex window mirroring the land
/// heights under the cursor. Lives only while an edit mode is armed.
pub struct PatchGrid {
    radius: i32,
    cell_size: f32,
    heights: Vec<f32>,
}

impl PatchGrid {
    pub fn new(radius: i32, cell_size: f32) -> Self {
        let side = (2 * radius + 1) as usize;
        Self {
            radius,
            cell_size,
            heights: vec![0.0; side * side],
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn height(&self, offset: IVec2) -> f32 {
        self.heights[grid::brush_index(offset, self.radius)]
    }

    pub fn set_height(&mut self, offset: IVec2, y: f32) {
        self.heights[grid::brush_index(offset, self.radius)] = y;
    }

    /// Mesh in overlay-local coordinates; the overlay entity's transform
    /// carries it to the cursor cell.
    pub fn build_mesh(&self) -> Mesh {
        let side = 2 * self.radius + 1;
        let mut positions = Vec::with_capacity(self.heights.len());
        let mut uvs = Vec::with_capacity(self.heights.len());
        for j in -self.radius..=self.radius {
            for i in -self.radius..=self.radius {
                positions.push([
                    i as f32 * self.cell_size,
                    self.height(IVec2::new(i, j)),
                    j as f32 * self.cell_size,
                ]);
                uvs.push([
                    (i + self.radius) as f32 / (side - 1) as f32,
                    (j + self.radius) as f32 / (side - 1) as f32,
                ]);
            }
        }
        build_grid_mesh(positions, uvs, (side - 1) as u32, (side - 1) as u32)
    }

    pub fn write_heights(&self, mesh: &mut Mesh) {
        write_heights_to_mesh(mesh, &self.heights);
    }
}

fn build_grid_mesh(positions: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, columns: u32, rows: u32) -> Mesh {
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let stride = columns + 1;
    let mut indices = Vec::with_capacity(columns as usize * rows as usize * 6);
    for iz in 0..rows {
        for ix in 0..columns {
            let v00 = iz * stride + ix;
            let v10 = v00 + 1;
            let v01 = v00 + stride;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v01, v11, v00, v11, v10]);
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

fn write_heights_to_mesh(mesh: &mut Mesh, heights: &[f32]) {
    if let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        for (position, &y) in positions.iter_mut().zip(heights) {
            position[1] = y;
        }
    }
    mesh.compute_normals();
}
