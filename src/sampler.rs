use glam::Vec3;

use crate::heightfield::HeightGrid;

/// Half-width of the central-difference stencil, in world units.
pub const NORMAL_SAMPLE_DELTA: f32 = 1.0;

/// Squared length under which a normal counts as degenerate.
const MIN_NORMAL_LENGTH_SQ: f32 = 1e-8;

/// Point queries against a terrain surface.
///
/// Implementors only need `height_at` and `world_size`; the normal defaults to
/// a central-difference estimate over `height_at`. Queries never fail: points
/// off the terrain report height 0 and an upward normal.
pub trait Ground {
    fn height_at(&self, x: f32, z: f32) -> f32;

    fn world_size(&self) -> f32;

    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        if !self.contains(x, z) {
            return Vec3::Y;
        }
        let d = NORMAL_SAMPLE_DELTA;
        let left = self.height_at(x - d, z);
        let right = self.height_at(x + d, z);
        let back = self.height_at(x, z - d);
        let front = self.height_at(x, z + d);
        sanitize_normal(Vec3::new(left - right, 2.0 * d, back - front))
    }

    /// Whether `(x, z)` lies on the square footprint centred on the origin.
    fn contains(&self, x: f32, z: f32) -> bool {
        let half = self.world_size() / 2.0;
        (-half..=half).contains(&x) && (-half..=half).contains(&z)
    }
}

/// Normalizes `n`, or returns straight up when `n` is NaN, infinite or too short.
pub fn sanitize_normal(n: Vec3) -> Vec3 {
    if n.is_finite() && n.length_squared() > MIN_NORMAL_LENGTH_SQ {
        n.normalize()
    } else {
        Vec3::Y
    }
}

/// Borrowed view over a [`HeightGrid`] answering bilinear height queries.
#[derive(Debug, Clone, Copy)]
pub struct HeightSampler<'a> {
    grid: &'a HeightGrid,
}

impl<'a> HeightSampler<'a> {
    pub fn new(grid: &'a HeightGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'a HeightGrid {
        self.grid
    }

    /// Fractional lattice coordinate of a world coordinate, or `None` when it
    /// falls off the grid (NaN included).
    fn to_lattice(&self, coord: f32) -> Option<f32> {
        let size = self.grid.world_size();
        let last = (self.grid.resolution() - 1) as f32;
        let g = (coord + size / 2.0) / size * last;
        (0.0..=last).contains(&g).then_some(g)
    }
}

impl Ground for HeightSampler<'_> {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let (Some(gx), Some(gz)) = (self.to_lattice(x), self.to_lattice(z)) else {
            return 0.0;
        };

        // The last row/column belongs to the cell before it.
        let max_cell = self.grid.resolution() - 2;
        let x0 = (gx as usize).min(max_cell);
        let z0 = (gz as usize).min(max_cell);
        let tx = gx - x0 as f32;
        let tz = gz - z0 as f32;

        let h00 = self.grid.get(x0, z0);
        let h10 = self.grid.get(x0 + 1, z0);
        let h01 = self.grid.get(x0, z0 + 1);
        let h11 = self.grid.get(x0 + 1, z0 + 1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;
        h0 * (1.0 - tz) + h1 * tz
    }

    fn world_size(&self) -> f32 {
        self.grid.world_size()
    }
}
