//! Procedural terrain with a tank that drives over it and fires shells.
//!
//! Everything here is windowless: the viewer binary owns the GPU side and
//! feeds [`sim::Simulation`] one [`input::ControlSnapshot`] per frame.

pub mod camera;
pub mod config;
pub mod error;
pub mod heightfield;
pub mod input;
pub mod mesh;
pub mod noise;
pub mod projectile;
pub mod sampler;
pub mod sim;
pub mod tank;

pub use config::GameConfig;
pub use error::{ConfigError, LoadError};
pub use heightfield::{HeightGrid, Terrain};
pub use sampler::{Ground, HeightSampler};
pub use sim::{SimObserver, Simulation};
