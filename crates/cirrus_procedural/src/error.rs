//! # Cloud Error Types
//!
//! All errors that can occur in the procedural cloud core.

use thiserror::Error;

/// Errors that can occur while sampling, synthesizing or configuring clouds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    /// Noise was sampled before a permutation table was built.
    #[error("noise engine sampled before init: no permutation table")]
    Uninitialized,

    /// Weather name did not match any known weather.
    #[error("unknown weather: {0:?}")]
    UnknownWeather(String),

    /// Noise was sampled at an infinite or NaN coordinate.
    #[error("noise sampled at a non-finite coordinate")]
    NonFiniteCoordinate,

    /// A day/night cycle was armed with a period of zero ticks.
    #[error("invalid day/night cycle period: {0} ticks")]
    InvalidCyclePeriod(u32),

    /// Settings failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;
