use std::path::PathBuf;

/// Construction-phase misconfiguration. Per-tick operations never produce these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid resolution must be at least 2, got {resolution}")]
    ResolutionTooSmall { resolution: usize },

    #[error("grid resolution {resolution} exceeds the supported maximum of {max}")]
    ResolutionTooLarge { resolution: usize, max: usize },

    #[error("world size must be positive and finite, got {world_size}")]
    InvalidWorldSize { world_size: f32 },

    #[error("max height must be positive and finite, got {max_height}")]
    InvalidMaxHeight { max_height: f32 },

    #[error("octave {index} has non-finite frequency or amplitude")]
    InvalidOctave { index: usize },

    #[error("plateau step must be zero or positive, got {step}")]
    InvalidPlateauStep { step: f32 },

    #[error("height buffer holds {actual} samples, expected {expected}")]
    HeightCountMismatch { expected: usize, actual: usize },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must lie within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("{name} must lie within [{min}, {max}], got {value}")]
    OutOfRange { name: &'static str, value: f32, min: f32, max: f32 },

    #[error("{low} ({low_value}) must not exceed {high} ({high_value})")]
    InvertedRange { low: &'static str, low_value: f32, high: &'static str, high_value: f32 },
}

/// Failure while reading a config file from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
