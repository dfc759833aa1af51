//! # CIRRUS Procedural Clouds
//!
//! Deterministic cloud tiles from seeded gradient noise.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same tiles
//! 2. **Pure**: A tile depends only on (layer, weather, transition, table)
//! 3. **Bounded**: One tile is 32x16 noise samples, O(1) each
//! 4. **No I/O**: Hosts own sprites, scheduling and display
//!
//! ## Core Components
//!
//! - `NoiseEngine`: Seeded permutation table + 2D gradient noise
//! - `TextureSynthesizer`: Noise to palette-indexed `CloudImage`
//! - `AppearanceState`: Weather and day/night transition machine
//!
//! ## Example
//!
//! ```rust
//! use cirrus_procedural::{AppearanceState, NoiseEngine, NoiseSeed, TextureSynthesizer};
//!
//! let engine = NoiseEngine::with_seed(NoiseSeed::new(1337));
//! let synth = TextureSynthesizer::default();
//! let mut appearance = AppearanceState::default();
//!
//! appearance.set_weather("stormy");
//! appearance.enable_cycle(100).unwrap();
//!
//! if appearance.tick().needs_resynthesis() {
//!     let tile = synth
//!         .generate(&engine, 0, appearance.weather(), appearance.transition())
//!         .unwrap();
//!     assert!(tile.pixels().iter().all(|&p| p <= 15));
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod appearance;
pub mod error;
pub mod noise;
pub mod texture;

pub use appearance::{
    AppearanceSettings, AppearanceState, CyclePhase, Direction, TickOutcome, Weather,
};
pub use error::{CloudError, CloudResult};
pub use noise::{NoiseEngine, NoiseSeed, PermutationTable, NOISE_PERIOD};
pub use texture::{
    CloudImage, SynthesisSettings, TextureSynthesizer, MAX_PALETTE_INDEX, TILE_HEIGHT,
    TILE_WIDTH, TRANSPARENT,
};
