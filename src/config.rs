//! Tunable constants for terrain, vehicle, weapons and camera.
//!
//! Every section has sensible defaults, so a TOML file only needs to name the
//! values it overrides:
//!
//! ```toml
//! [terrain]
//! resolution = 64
//! seed = 9
//!
//! [tank]
//! move_speed = 0.15
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, LoadError};

/// Orbit pitch limits in degrees, shared with [`crate::camera::ChaseCamera`].
pub const MIN_PITCH: f32 = 5.0;
pub const MAX_PITCH: f32 = 89.0;

/// Grids larger than this would overflow 32-bit indices once flat-shaded.
pub const MAX_RESOLUTION: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub terrain: TerrainConfig,
    pub tank: TankTuning,
    pub weapons: WeaponTable,
    pub camera: CameraTuning,
}

impl GameConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, LoadError> {
        let config: GameConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.terrain.validate()?;
        self.tank.validate()?;
        self.weapons.cannon.validate()?;
        self.weapons.machine_gun.validate()?;
        self.camera.validate()
    }
}

/// One noise layer: sampled at `world * frequency`, scaled by `amplitude * max_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    pub frequency: f32,
    pub amplitude: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub world_size: f32,
    pub resolution: usize,
    pub max_height: f32,
    pub seed: u32,
    /// Heights snap to multiples of this; zero keeps them continuous.
    pub plateau_step: f32,
    pub octaves: Vec<Octave>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            world_size: 1000.0,
            resolution: 128,
            max_height: 5.0,
            seed: 0,
            plateau_step: 0.5,
            octaves: vec![
                Octave { frequency: 0.003, amplitude: 0.7 },
                Octave { frequency: 0.01, amplitude: 0.1 },
            ],
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_grid(self.resolution, self.world_size)?;
        if !(self.max_height.is_finite() && self.max_height > 0.0) {
            return Err(ConfigError::InvalidMaxHeight { max_height: self.max_height });
        }
        if !(self.plateau_step.is_finite() && self.plateau_step >= 0.0) {
            return Err(ConfigError::InvalidPlateauStep { step: self.plateau_step });
        }
        for (index, octave) in self.octaves.iter().enumerate() {
            if !(octave.frequency.is_finite() && octave.amplitude.is_finite()) {
                return Err(ConfigError::InvalidOctave { index });
            }
        }
        Ok(())
    }
}

pub(crate) fn check_grid(resolution: usize, world_size: f32) -> ConfigResult<()> {
    if resolution < 2 {
        return Err(ConfigError::ResolutionTooSmall { resolution });
    }
    if resolution > MAX_RESOLUTION {
        return Err(ConfigError::ResolutionTooLarge { resolution, max: MAX_RESOLUTION });
    }
    if !(world_size.is_finite() && world_size > 0.0) {
        return Err(ConfigError::InvalidWorldSize { world_size });
    }
    Ok(())
}

/// Locomotion constants. Speeds and steps are expressed per reference frame
/// and scaled by `clamp(dt, 0, max_delta_time) * reference_frame_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub reference_frame_rate: f32,
    pub max_delta_time: f32,

    pub ground_clearance: f32,
    pub footprint_sample_distance: f32,
    /// Fraction of the remaining height gap closed per reference frame.
    pub height_smoothing: f32,
    pub max_height_step: f32,
    pub settle_epsilon: f32,
    pub recovery_threshold: f32,
    pub recovery_ticks: u32,

    /// Terrain alignment only happens while the blended normal's y exceeds this.
    pub min_alignment_up: f32,
    pub center_normal_weight: f32,
    pub offset_normal_weight: f32,
    pub normal_history_weight: f32,
    pub tilt_rate: f32,
    pub max_tilt_rate: f32,

    pub muzzle_forward: f32,
    pub muzzle_height: f32,

    pub spawn_x: f32,
    pub spawn_z: f32,
    /// Seconds outside the terrain footprint before the tank is put back at spawn.
    pub reset_after: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            rotation_speed: 0.02,
            reference_frame_rate: 60.0,
            max_delta_time: 0.1,

            ground_clearance: 0.1,
            footprint_sample_distance: 1.5,
            height_smoothing: 0.2,
            max_height_step: 0.25,
            settle_epsilon: 1e-3,
            recovery_threshold: 1.0,
            recovery_ticks: 15,

            min_alignment_up: 0.7,
            center_normal_weight: 0.6,
            offset_normal_weight: 0.1,
            normal_history_weight: 0.7,
            tilt_rate: 0.1,
            max_tilt_rate: 0.25,

            muzzle_forward: 3.3,
            muzzle_height: 1.25,

            spawn_x: 0.0,
            spawn_z: 0.0,
            reset_after: 3.0,
        }
    }
}

impl TankTuning {
    pub fn validate(&self) -> ConfigResult<()> {
        positive("tank.reference_frame_rate", self.reference_frame_rate)?;
        positive("tank.max_delta_time", self.max_delta_time)?;
        positive("tank.max_height_step", self.max_height_step)?;
        positive("tank.recovery_threshold", self.recovery_threshold)?;
        positive("tank.reset_after", self.reset_after)?;
        non_negative("tank.move_speed", self.move_speed)?;
        non_negative("tank.rotation_speed", self.rotation_speed)?;
        non_negative("tank.footprint_sample_distance", self.footprint_sample_distance)?;
        non_negative("tank.settle_epsilon", self.settle_epsilon)?;
        non_negative("tank.ground_clearance", self.ground_clearance)?;
        finite("tank.spawn_x", self.spawn_x)?;
        finite("tank.spawn_z", self.spawn_z)?;
        finite("tank.muzzle_forward", self.muzzle_forward)?;
        finite("tank.muzzle_height", self.muzzle_height)?;
        if self.recovery_ticks == 0 {
            return Err(ConfigError::ZeroCount { name: "tank.recovery_ticks" });
        }
        unit("tank.height_smoothing", self.height_smoothing)?;
        unit("tank.min_alignment_up", self.min_alignment_up)?;
        unit("tank.center_normal_weight", self.center_normal_weight)?;
        unit("tank.offset_normal_weight", self.offset_normal_weight)?;
        unit("tank.normal_history_weight", self.normal_history_weight)?;
        unit("tank.tilt_rate", self.tilt_rate)?;
        unit("tank.max_tilt_rate", self.max_tilt_rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    /// Minimum seconds between two shots.
    pub cooldown: f32,
    /// Distance travelled per reference frame.
    pub speed: f32,
    pub lifetime: f32,
    pub explosion_duration: f32,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self { cooldown: 0.4, speed: 0.6, lifetime: 2.0, explosion_duration: 0.5 }
    }
}

impl WeaponSpec {
    pub fn validate(&self) -> ConfigResult<()> {
        non_negative("weapon.cooldown", self.cooldown)?;
        positive("weapon.speed", self.speed)?;
        positive("weapon.lifetime", self.lifetime)?;
        non_negative("weapon.explosion_duration", self.explosion_duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub cannon: WeaponSpec,
    pub machine_gun: WeaponSpec,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            cannon: WeaponSpec::default(),
            machine_gun: WeaponSpec {
                cooldown: 0.1,
                speed: 1.2,
                lifetime: 1.0,
                explosion_duration: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Degrees.
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub look_height: f32,
    pub smoothing: f32,
    pub min_terrain_clearance: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            pitch: 45.0,
            distance: 35.0,
            min_distance: 10.0,
            max_distance: 60.0,
            look_height: 2.0,
            smoothing: 0.1,
            min_terrain_clearance: 10.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 2000.0,
        }
    }
}

impl CameraTuning {
    pub fn validate(&self) -> ConfigResult<()> {
        positive("camera.min_distance", self.min_distance)?;
        positive("camera.max_distance", self.max_distance)?;
        ordered(
            "camera.min_distance",
            self.min_distance,
            "camera.max_distance",
            self.max_distance,
        )?;
        within("camera.distance", self.distance, self.min_distance, self.max_distance)?;
        within("camera.pitch", self.pitch, MIN_PITCH, MAX_PITCH)?;
        finite("camera.look_height", self.look_height)?;
        finite("camera.min_terrain_clearance", self.min_terrain_clearance)?;
        positive("camera.fovy", self.fovy)?;
        positive("camera.znear", self.znear)?;
        positive("camera.zfar", self.zfar)?;
        ordered("camera.znear", self.znear, "camera.zfar", self.zfar)?;
        unit("camera.smoothing", self.smoothing)
    }
}

fn positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn within(name: &'static str, value: f32, min: f32, max: f32) -> ConfigResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

fn ordered(
    low: &'static str,
    low_value: f32,
    high: &'static str,
    high_value: f32,
) -> ConfigResult<()> {
    if low_value <= high_value {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { low, low_value, high, high_value })
    }
}

fn unit(name: &'static str, value: f32) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [terrain]
            resolution = 32
            seed = 9

            [weapons.machine_gun]
            cooldown = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(config.terrain.resolution, 32);
        assert_eq!(config.terrain.seed, 9);
        assert_eq!(config.terrain.world_size, 1000.0);
        assert_eq!(config.terrain.octaves.len(), 2);
        assert_eq!(config.weapons.machine_gun.cooldown, 0.05);
        assert_eq!(config.weapons.cannon, WeaponSpec::default());
        assert_eq!(config.tank, TankTuning::default());
    }

    #[test]
    fn rejects_tiny_grid() {
        let err = GameConfig::from_toml_str("[terrain]\nresolution = 1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::ResolutionTooSmall { resolution: 1 })
        ));
    }

    #[test]
    fn rejects_bad_world_and_height() {
        let mut terrain = TerrainConfig::default();
        terrain.world_size = 0.0;
        assert!(matches!(terrain.validate(), Err(ConfigError::InvalidWorldSize { .. })));

        let mut terrain = TerrainConfig::default();
        terrain.max_height = -1.0;
        assert!(matches!(terrain.validate(), Err(ConfigError::InvalidMaxHeight { .. })));
    }

    #[test]
    fn rejects_out_of_range_weights() {
        let mut tank = TankTuning::default();
        tank.normal_history_weight = 1.5;
        assert_eq!(
            tank.validate(),
            Err(ConfigError::OutOfUnitRange { name: "tank.normal_history_weight", value: 1.5 })
        );
    }

    #[test]
    fn rejects_unusable_placement() {
        let err = GameConfig::from_toml_str("[tank]\nground_clearance = nan\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::NonPositive { name: "tank.ground_clearance", .. })
        ));

        let mut tank = TankTuning::default();
        tank.ground_clearance = -0.5;
        assert!(tank.validate().is_err());

        let mut tank = TankTuning::default();
        tank.spawn_x = f32::INFINITY;
        assert!(matches!(
            tank.validate(),
            Err(ConfigError::NonFinite { name: "tank.spawn_x", .. })
        ));

        let mut tank = TankTuning::default();
        tank.muzzle_height = f32::NAN;
        assert!(matches!(tank.validate(), Err(ConfigError::NonFinite { .. })));

        let mut tank = TankTuning::default();
        tank.recovery_ticks = 0;
        assert_eq!(tank.validate(), Err(ConfigError::ZeroCount { name: "tank.recovery_ticks" }));
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let err = GameConfig::from_toml_str("[camera]\nmin_distance = 70.0\nmax_distance = 60.0\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn rejects_bad_camera_placement() {
        let mut camera = CameraTuning::default();
        camera.distance = 80.0;
        assert!(matches!(
            camera.validate(),
            Err(ConfigError::OutOfRange { name: "camera.distance", .. })
        ));

        let mut camera = CameraTuning::default();
        camera.pitch = f32::NAN;
        assert!(camera.validate().is_err());

        let mut camera = CameraTuning::default();
        camera.look_height = f32::INFINITY;
        assert!(matches!(camera.validate(), Err(ConfigError::NonFinite { .. })));

        let mut camera = CameraTuning::default();
        camera.min_terrain_clearance = f32::NAN;
        assert!(camera.validate().is_err());

        let mut camera = CameraTuning::default();
        camera.znear = 3000.0;
        assert!(matches!(camera.validate(), Err(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[terrain\nresolution = ").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tank]\nmove_speed = 0.25").unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.tank.move_speed, 0.25);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
