//! Deterministic 2D lattice noise.
//!
//! Each integer lattice point gets a pseudo-random gradient picked by hashing
//! its coordinates together with the seed. A sample blends the four corner
//! contributions of its cell with the quintic fade curve, so the field is
//! continuous everywhere and its first derivative is continuous as well.
//!
//! The output lies in `[-1, 1]`. Non-finite input is not meaningful: NaN
//! propagates to the output and infinities produce NaN.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatticeNoise {
    seed: u32,
}

impl LatticeNoise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let x0 = x.floor();
        let z0 = z.floor();
        let xi = x0 as i32;
        let zi = z0 as i32;

        let fx = x - x0;
        let fz = z - z0;
        let u = fade(fx);
        let w = fade(fz);

        let g00 = grad(self.hash(xi, zi), fx, fz);
        let g10 = grad(self.hash(xi.wrapping_add(1), zi), fx - 1.0, fz);
        let g01 = grad(self.hash(xi, zi.wrapping_add(1)), fx, fz - 1.0);
        let g11 = grad(
            self.hash(xi.wrapping_add(1), zi.wrapping_add(1)),
            fx - 1.0,
            fz - 1.0,
        );

        lerp(lerp(g00, g10, u), lerp(g01, g11, u), w)
    }

    fn hash(&self, i: i32, j: i32) -> u32 {
        let mut h = (i as u32).wrapping_mul(0x27d4_eb2d);
        h ^= (j as u32).wrapping_mul(0x1656_6791);
        h ^= self.seed.wrapping_mul(0x9e37_79b9);
        h ^= h >> 15;
        h = h.wrapping_mul(0x85eb_ca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2_ae35);
        h ^ (h >> 16)
    }
}

/// Quintic fade `t³(t(6t − 15) + 10)`.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

// Eight directions: the four diagonals and the four axes, halved on the
// diagonals so that every corner contribution stays within [-1, 1].
#[inline]
fn grad(hash: u32, x: f32, z: f32) -> f32 {
    match hash & 7 {
        0 => 0.5 * (x + z),
        1 => 0.5 * (-x + z),
        2 => 0.5 * (x - z),
        3 => 0.5 * (-x - z),
        4 => x,
        5 => -x,
        6 => z,
        _ => -z,
    }
}
