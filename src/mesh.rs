use glam::Vec3;

use crate::heightfield::HeightGrid;

/// Indexed lattice mesh of a [`HeightGrid`]: one vertex per grid sample and
/// two triangles per cell, split along the `(x+1, z)`-`(x, z+1)` diagonal.
///
/// Shared vertices cannot carry per-face normals, so normals are stored once
/// per triangle in `face_normals`. Use [`TerrainMesh::flat_shaded`] to get
/// buffers with unique vertices per face for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    face_normals: Vec<[f32; 3]>,
}

/// Non-indexed expansion: every triangle owns its three vertices, so every
/// vertex normal is exactly the normal of the face it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatShadedMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn from_grid(grid: &HeightGrid) -> Self {
        let n = grid.resolution();
        let last = (n - 1) as f32;

        let mut positions = Vec::with_capacity(n * n);
        let mut uvs = Vec::with_capacity(n * n);
        for z in 0..n {
            for x in 0..n {
                let (wx, wz) = grid.lattice_position(x, z);
                positions.push([wx, grid.get(x, z), wz]);
                uvs.push([x as f32 / last, z as f32 / last]);
            }
        }

        let cells = (n - 1) * (n - 1);
        let mut indices = Vec::with_capacity(cells * 6);
        for z in 0..n - 1 {
            for x in 0..n - 1 {
                let a = (z * n + x) as u32;
                let b = (z * n + x + 1) as u32;
                let c = ((z + 1) * n + x) as u32;
                let d = ((z + 1) * n + x + 1) as u32;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        let face_normals = indices
            .chunks_exact(3)
            .map(|tri| {
                let [p0, p1, p2] =
                    [tri[0], tri[1], tri[2]].map(|i| Vec3::from(positions[i as usize]));
                face_normal(p0, p1, p2).to_array()
            })
            .collect();

        Self { positions, uvs, indices, face_normals }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` buffer.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn uvs_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn face_normals(&self) -> &[[f32; 3]] {
        &self.face_normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn flat_shaded(&self) -> FlatShadedMesh {
        let count = self.indices.len();
        let mut positions = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for (tri, normal) in self.indices.chunks_exact(3).zip(&self.face_normals) {
            for &i in tri {
                positions.push(self.positions[i as usize]);
                uvs.push(self.uvs[i as usize]);
                normals.push(*normal);
            }
        }

        FlatShadedMesh {
            positions,
            normals,
            uvs,
            indices: (0..count as u32).collect(),
        }
    }
}

/// Outward normal of triangle `(p0, p1, p2)` for the lattice winding, i.e.
/// `(p2 - p1) x (p0 - p1)`. Degenerate triangles get straight up.
pub fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p2 - p1).cross(p0 - p1).try_normalize().unwrap_or(Vec3::Y)
}

/// Stylised height tint: meadow green, lighter green on hills, rock on peaks.
pub fn terrain_color(height: f32) -> [f32; 3] {
    let base = Vec3::new(0.192, 0.48, 0.082);
    let hills = Vec3::new(0.247, 0.573, 0.129);
    let rock = Vec3::new(0.5, 0.5, 0.4);

    let color = base.lerp(hills, smoothstep(1.0, 3.0, height));
    color.lerp(rock, smoothstep(3.5, 4.5, height)).to_array()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(resolution: usize, world_size: f32) -> HeightGrid {
        let heights = (0..resolution * resolution)
            .map(|i| (i % resolution) as f32 * 0.5)
            .collect();
        HeightGrid::from_heights(resolution, world_size, heights).unwrap()
    }

    #[test]
    fn buffer_sizes_match_resolution() {
        for resolution in [2usize, 3, 4, 17] {
            let mesh = TerrainMesh::from_grid(&HeightGrid::flat(resolution, 10.0, 0.0).unwrap());
            assert_eq!(mesh.positions_flat().len(), 3 * resolution * resolution);
            assert_eq!(mesh.uvs_flat().len(), 2 * resolution * resolution);
            assert_eq!(mesh.indices().len(), 6 * (resolution - 1) * (resolution - 1));
            assert_eq!(mesh.face_normals().len(), mesh.triangle_count());
        }
    }

    #[test]
    fn flat_ground_normals_point_up() {
        let mesh = TerrainMesh::from_grid(&HeightGrid::flat(4, 4.0, 2.0).unwrap());
        for n in mesh.face_normals() {
            assert!(Vec3::from(*n).abs_diff_eq(Vec3::Y, 1e-6), "{n:?}");
        }
    }

    #[test]
    fn sloped_normals_face_away_from_the_slope() {
        // Heights rise with x, so normals lean toward -x and stay upward.
        let mesh = TerrainMesh::from_grid(&ramp(5, 8.0));
        for n in mesh.face_normals() {
            assert!(n[1] > 0.0);
            assert!(n[0] < 0.0);
            assert!(n[2].abs() < 1e-6);
        }
    }

    #[test]
    fn uvs_cover_unit_square() {
        let mesh = TerrainMesh::from_grid(&HeightGrid::flat(3, 6.0, 0.0).unwrap());
        assert_eq!(mesh.uvs()[0], [0.0, 0.0]);
        assert_eq!(mesh.uvs()[8], [1.0, 1.0]);
        assert_eq!(mesh.uvs()[1], [0.5, 0.0]);
    }

    #[test]
    fn vertices_follow_grid_heights() {
        let grid = ramp(3, 2.0);
        let mesh = TerrainMesh::from_grid(&grid);
        for z in 0..3 {
            for x in 0..3 {
                let p = mesh.positions()[z * 3 + x];
                assert_eq!(p[1], grid.get(x, z));
            }
        }
    }

    #[test]
    fn flat_shading_gives_each_face_its_own_vertices() {
        let mesh = TerrainMesh::from_grid(&ramp(4, 6.0));
        let flat = mesh.flat_shaded();
        assert_eq!(flat.positions.len(), mesh.indices().len());
        assert_eq!(flat.indices, (0..mesh.indices().len() as u32).collect::<Vec<_>>());

        for (t, face) in flat.normals.chunks_exact(3).enumerate() {
            let expected = mesh.face_normals()[t];
            assert!(face.iter().all(|n| *n == expected));
        }
    }

    #[test]
    fn degenerate_face_defaults_up() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(face_normal(p, p, p), Vec3::Y);
    }

    #[test]
    fn color_bands() {
        assert_eq!(terrain_color(0.0), [0.192, 0.48, 0.082]);
        let peak = terrain_color(10.0);
        for (got, want) in peak.iter().zip([0.5f32, 0.5, 0.4]) {
            assert!((got - want).abs() < 1e-6);
        }
    }
}
