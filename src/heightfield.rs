use crate::config::{check_grid, TerrainConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::mesh::TerrainMesh;
use crate::noise::LatticeNoise;
use crate::sampler::HeightSampler;

/// Square grid of non-negative heights centred on the world origin.
///
/// Row-major: the sample at column `x`, row `z` lives at `z * resolution + x`
/// and sits at world position `(x * spacing - world_size / 2, z * spacing - world_size / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    resolution: usize,
    world_size: f32,
    heights: Vec<f32>,
}

impl HeightGrid {
    pub fn generate(config: &TerrainConfig) -> ConfigResult<Self> {
        config.validate()?;

        let noise = LatticeNoise::new(config.seed);
        let n = config.resolution;
        let spacing = config.world_size / (n - 1) as f32;
        let half = config.world_size / 2.0;

        let mut heights = Vec::with_capacity(n * n);
        for z in 0..n {
            for x in 0..n {
                let world_x = x as f32 * spacing - half;
                let world_z = z as f32 * spacing - half;

                let mut height = 0.0;
                for octave in &config.octaves {
                    height += noise.sample(world_x * octave.frequency, world_z * octave.frequency)
                        * config.max_height
                        * octave.amplitude;
                }
                heights.push(plateau(height, config.plateau_step).max(0.0));
            }
        }

        Ok(Self { resolution: n, world_size: config.world_size, heights })
    }

    /// Wraps precomputed heights. Negative and NaN samples are clamped to 0.
    pub fn from_heights(
        resolution: usize,
        world_size: f32,
        mut heights: Vec<f32>,
    ) -> ConfigResult<Self> {
        check_grid(resolution, world_size)?;
        let expected = resolution * resolution;
        if heights.len() != expected {
            return Err(ConfigError::HeightCountMismatch { expected, actual: heights.len() });
        }
        for h in &mut heights {
            *h = h.max(0.0);
        }
        Ok(Self { resolution, world_size, heights })
    }

    pub fn flat(resolution: usize, world_size: f32, height: f32) -> ConfigResult<Self> {
        Self::from_heights(resolution, world_size, vec![height; resolution * resolution])
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn spacing(&self) -> f32 {
        self.world_size / (self.resolution - 1) as f32
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.heights[z * self.resolution + x]
    }

    /// World-space XZ of lattice point `(x, z)`.
    pub fn lattice_position(&self, x: usize, z: usize) -> (f32, f32) {
        let spacing = self.spacing();
        let half = self.world_size / 2.0;
        (x as f32 * spacing - half, z as f32 * spacing - half)
    }

    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

fn plateau(height: f32, step: f32) -> f32 {
    if step > 0.0 {
        (height / step).round() * step
    } else {
        height
    }
}

/// Generated terrain: the height grid plus the mesh derived from it.
/// Both are immutable once built; consumers borrow them.
#[derive(Debug, Clone)]
pub struct Terrain {
    grid: HeightGrid,
    mesh: TerrainMesh,
}

impl Terrain {
    pub fn generate(config: &TerrainConfig) -> ConfigResult<Self> {
        let grid = HeightGrid::generate(config)?;
        let terrain = Self::from_grid(grid);
        let (lo, hi) = terrain.grid.height_range();
        log::info!(
            "generated terrain: {}x{} over {} units, seed {}, heights {:.2}..{:.2}, {} triangles",
            terrain.grid.resolution,
            terrain.grid.resolution,
            terrain.grid.world_size,
            config.seed,
            lo,
            hi,
            terrain.mesh.triangle_count(),
        );
        Ok(terrain)
    }

    pub fn from_grid(grid: HeightGrid) -> Self {
        let mesh = TerrainMesh::from_grid(&grid);
        Self { grid, mesh }
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn sampler(&self) -> HeightSampler<'_> {
        HeightSampler::new(&self.grid)
    }
}
