//! # CIRRUS
//!
//! Procedural cloud tiles for a real-time rendering loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            HOST                              │
//! │   sprites · frame scheduler · screen brightness              │
//! └──────┬──────────────────────────────▲───────────────▲────────┘
//!        │ tick() / texture(layer)      │ CloudImage    │ brightness
//! ┌──────▼──────────────────────────────┴───────────────┴────────┐
//! │                        CloudSystem                           │
//! │  ┌──────────────┐  ┌─────────────────┐  ┌─────────────────┐  │
//! │  │ NoiseEngine  │─>│ TextureSynth.   │<─│ AppearanceState │  │
//! │  └──────────────┘  └────────┬────────┘  └─────────────────┘  │
//! │                      TextureCache                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `system`: The owned per-system state object
//! - `cache`: Tile memoization
//! - `config`: TOML configuration
//! - `display`: Brightness boundary

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod config;
pub mod display;
pub mod system;

// Re-export the procedural core
pub use cirrus_procedural as procedural;

pub use cache::{CacheStats, TextureCache, TextureKey};
pub use config::{CloudConfig, ConfigError};
pub use display::{BrightnessActuator, NullActuator, RecordingActuator};
pub use system::CloudSystem;

pub use cirrus_procedural::{
    AppearanceState, CloudError, CloudImage, CloudResult, NoiseSeed, TickOutcome, Weather,
};
