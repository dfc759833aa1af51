//! # Cloud Texture Synthesis
//!
//! Paints 32x16 palette-indexed cloud tiles from gradient noise.
//!
//! Each pixel samples the noise field, quantizes the sample into four
//! buckets and maps opaque buckets to a palette index that slides between a
//! bright day range and an inverted night range. Bucket 0 is never painted;
//! that gap is what keeps the clouds wispy.

use serde::{Deserialize, Serialize};

use crate::appearance::Weather;
use crate::error::{CloudError, CloudResult};
use crate::noise::{NoiseEngine, PermutationTable};

/// Width of a cloud tile in pixels.
pub const TILE_WIDTH: usize = 32;

/// Height of a cloud tile in pixels.
pub const TILE_HEIGHT: usize = 16;

/// Palette index meaning "not painted".
pub const TRANSPARENT: u8 = 0;

/// Largest palette index a tile may contain.
pub const MAX_PALETTE_INDEX: u8 = 15;

/// Number of quantization buckets per noise sample.
const BUCKETS: f64 = 4.0;

/// Tunables for tile synthesis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Noise units per pixel.
    pub frequency: f64,
    /// X offset added per layer.
    pub layer_offset_x: f64,
    /// Y offset added per layer.
    pub layer_offset_y: f64,
    /// Number of depth bands; out-of-range layers wrap into `0..layer_count`.
    pub layer_count: u32,
    /// Palette steps removed from opaque pixels while stormy.
    pub storm_darkening: u8,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            frequency: 0.1,
            layer_offset_x: 10.0,
            layer_offset_y: 20.0,
            layer_count: 2,
            storm_darkening: 2,
        }
    }
}

impl SynthesisSettings {
    /// Checks the settings for values synthesis cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` for a non-positive or non-finite
    /// frequency, non-finite offsets, or a darkening step above the palette.
    pub fn validate(&self) -> CloudResult<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(CloudError::InvalidConfig(format!(
                "synthesis frequency must be positive, got {}",
                self.frequency
            )));
        }
        if !self.layer_offset_x.is_finite() || !self.layer_offset_y.is_finite() {
            return Err(CloudError::InvalidConfig(
                "layer offsets must be finite".to_string(),
            ));
        }
        if self.storm_darkening > MAX_PALETTE_INDEX {
            return Err(CloudError::InvalidConfig(format!(
                "storm darkening {} exceeds palette size",
                self.storm_darkening
            )));
        }
        Ok(())
    }
}

/// A synthesized cloud tile.
///
/// Row-major grid of palette indices; `0` is transparent. Every call to
/// [`TextureSynthesizer::generate`] returns a fresh tile owned by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudImage {
    pixels: Box<[u8; TILE_WIDTH * TILE_HEIGHT]>,
}

impl CloudImage {
    /// Creates a fully transparent tile.
    #[must_use]
    pub fn transparent() -> Self {
        Self {
            pixels: Box::new([TRANSPARENT; TILE_WIDTH * TILE_HEIGHT]),
        }
    }

    /// Tile width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        TILE_WIDTH
    }

    /// Tile height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        TILE_HEIGHT
    }

    /// Returns the palette index at `(x, y)`, or `None` outside the tile.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < TILE_WIDTH && y < TILE_HEIGHT).then(|| self.pixels[y * TILE_WIDTH + x])
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, index: u8) {
        self.pixels[y * TILE_WIDTH + x] = index;
    }

    /// Returns all pixels in row-major order.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(TILE_WIDTH)
    }

    /// Number of painted pixels.
    #[must_use]
    pub fn opaque_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != TRANSPARENT).count()
    }

    /// Renders the tile as text, one hex digit per painted pixel.
    ///
    /// Transparent pixels become `.`; rows are separated by `\n`.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((TILE_WIDTH + 1) * TILE_HEIGHT);
        for row in self.rows() {
            for &p in row {
                out.push(if p == TRANSPARENT {
                    '.'
                } else {
                    char::from_digit(u32::from(p), 16).unwrap_or('?')
                });
            }
            out.push('\n');
        }
        out
    }
}

impl Default for CloudImage {
    fn default() -> Self {
        Self::transparent()
    }
}

impl std::fmt::Debug for CloudImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudImage")
            .field("width", &TILE_WIDTH)
            .field("height", &TILE_HEIGHT)
            .field("opaque", &self.opaque_count())
            .finish()
    }
}

/// Turns noise into cloud tiles.
///
/// Holds only settings; the noise table and appearance are passed in on
/// every call, so output is a pure function of
/// `(layer, weather, transition, table)`.
///
/// # Example
///
/// ```rust
/// use cirrus_procedural::{NoiseEngine, NoiseSeed, TextureSynthesizer, Weather};
///
/// let engine = NoiseEngine::with_seed(NoiseSeed::new(1337));
/// let synth = TextureSynthesizer::default();
///
/// let tile = synth.generate(&engine, 0, Weather::Clear, 0.0).unwrap();
/// assert_eq!((tile.width(), tile.height()), (32, 16));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TextureSynthesizer {
    settings: SynthesisSettings,
}

impl TextureSynthesizer {
    /// Creates a synthesizer with the given settings.
    ///
    /// A layer count of zero is raised to one.
    #[must_use]
    pub fn new(mut settings: SynthesisSettings) -> Self {
        if settings.layer_count == 0 {
            tracing::warn!("synthesis layer_count of 0 raised to 1");
            settings.layer_count = 1;
        }
        Self { settings }
    }

    /// Returns the active settings.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &SynthesisSettings {
        &self.settings
    }

    /// Maps any layer index into `0..layer_count`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn normalize_layer(&self, layer: i32) -> u32 {
        // rem_euclid lands in 0..layer_count, which always fits a u32.
        i64::from(layer).rem_euclid(i64::from(self.settings.layer_count)) as u32
    }

    /// Generates a tile for `layer` using the engine's current table.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if the engine has no table.
    pub fn generate(
        &self,
        engine: &NoiseEngine,
        layer: i32,
        weather: Weather,
        transition: f64,
    ) -> CloudResult<CloudImage> {
        Ok(self.generate_with_table(engine.table()?, layer, weather, transition))
    }

    /// Generates a tile from an explicit table.
    #[must_use]
    pub fn generate_with_table(
        &self,
        table: &PermutationTable,
        layer: i32,
        weather: Weather,
        transition: f64,
    ) -> CloudImage {
        let layer = f64::from(self.normalize_layer(layer));
        let transition = if transition.is_nan() {
            0.0
        } else {
            transition.clamp(0.0, 1.0)
        };
        let origin_x = layer * self.settings.layer_offset_x;
        let origin_y = layer * self.settings.layer_offset_y;

        let mut image = CloudImage::transparent();
        for y in 0..TILE_HEIGHT {
            #[allow(clippy::cast_precision_loss)]
            let ny = y as f64 * self.settings.frequency + origin_y;
            for x in 0..TILE_WIDTH {
                #[allow(clippy::cast_precision_loss)]
                let nx = x as f64 * self.settings.frequency + origin_x;
                let index = self.shade(table.sample(nx, ny), weather, transition);
                if index != TRANSPARENT {
                    image.set(x, y, index);
                }
            }
        }
        image
    }

    /// Maps one noise sample to a palette index.
    ///
    /// Bucket 0 stays transparent. Opaque buckets blend the day index
    /// `bucket + 1` toward the night index `14 - bucket` and, while stormy,
    /// darken by `storm_darkening` without dropping below 1.
    #[must_use]
    pub fn shade(&self, noise: f64, weather: Weather, transition: f64) -> u8 {
        let bucket = quantize(noise);
        if bucket == 0 {
            return TRANSPARENT;
        }

        let day = f64::from(bucket + 1);
        let night = f64::from(14 - bucket);
        // Both endpoints lie in 2..=13, so the blend does too.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let blended = (day * (1.0 - transition) + night * transition).round() as u8;

        match weather {
            Weather::Stormy => blended.saturating_sub(self.settings.storm_darkening).max(1),
            Weather::Clear | Weather::Cloudy => blended,
        }
    }
}

/// Quantizes a [0, 1] sample into buckets `0..=3`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(noise: f64) -> u8 {
    ((noise * BUCKETS).floor().clamp(0.0, BUCKETS - 1.0)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseSeed;

    fn table() -> PermutationTable {
        PermutationTable::new(NoiseSeed::new(1337))
    }

    #[test]
    fn test_quantize_buckets() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.2499), 0);
        assert_eq!(quantize(0.25), 1);
        assert_eq!(quantize(0.5), 2);
        assert_eq!(quantize(0.99), 3);
        assert_eq!(quantize(1.0), 3, "a sample of exactly 1.0 stays in range");
    }

    #[test]
    fn test_shade_day_and_night_ranges() {
        let synth = TextureSynthesizer::default();

        // Day: bucket + 1.
        assert_eq!(synth.shade(0.3, Weather::Clear, 0.0), 2);
        assert_eq!(synth.shade(0.6, Weather::Clear, 0.0), 3);
        assert_eq!(synth.shade(0.9, Weather::Clear, 0.0), 4);

        // Night: 14 - bucket.
        assert_eq!(synth.shade(0.3, Weather::Clear, 1.0), 13);
        assert_eq!(synth.shade(0.6, Weather::Clear, 1.0), 12);
        assert_eq!(synth.shade(0.9, Weather::Clear, 1.0), 11);

        // Halfway: (2 + 13) / 2 = 7.5 rounds up.
        assert_eq!(synth.shade(0.3, Weather::Clear, 0.5), 8);
    }

    #[test]
    fn test_shade_transparent_bucket() {
        let synth = TextureSynthesizer::default();
        for weather in Weather::ALL {
            for t in [0.0, 0.5, 1.0] {
                assert_eq!(synth.shade(0.1, weather, t), TRANSPARENT);
            }
        }
    }

    #[test]
    fn test_storm_darkening_floors_at_one() {
        let synth = TextureSynthesizer::default();
        assert_eq!(synth.shade(0.3, Weather::Stormy, 0.0), 1);
        assert_eq!(synth.shade(0.9, Weather::Stormy, 0.0), 2);
        assert_eq!(synth.shade(0.9, Weather::Stormy, 1.0), 9);

        let harsh = TextureSynthesizer::new(SynthesisSettings {
            storm_darkening: 15,
            ..SynthesisSettings::default()
        });
        assert_eq!(harsh.shade(0.9, Weather::Stormy, 1.0), 1);
    }

    #[test]
    fn test_cloudy_matches_clear() {
        let synth = TextureSynthesizer::default();
        let table = table();
        for t in [0.0, 0.3, 1.0] {
            assert_eq!(
                synth.generate_with_table(&table, 1, Weather::Clear, t),
                synth.generate_with_table(&table, 1, Weather::Cloudy, t)
            );
        }
    }

    #[test]
    fn test_palette_bounds() {
        let synth = TextureSynthesizer::default();
        let table = table();
        for layer in 0..4 {
            for weather in Weather::ALL {
                for step in 0..=10 {
                    let t = f64::from(step) / 10.0;
                    let image = synth.generate_with_table(&table, layer, weather, t);
                    assert!(image.pixels().iter().all(|&p| p <= MAX_PALETTE_INDEX));
                }
            }
        }
    }

    #[test]
    fn test_layer_wraps() {
        let synth = TextureSynthesizer::default();
        assert_eq!(synth.normalize_layer(0), 0);
        assert_eq!(synth.normalize_layer(1), 1);
        assert_eq!(synth.normalize_layer(2), 0);
        assert_eq!(synth.normalize_layer(-1), 1);
        assert_eq!(synth.normalize_layer(i32::MIN), 0);

        let table = table();
        assert_eq!(
            synth.generate_with_table(&table, -1, Weather::Clear, 0.0),
            synth.generate_with_table(&table, 1, Weather::Clear, 0.0)
        );
    }

    #[test]
    fn test_zero_layer_count_raised() {
        let synth = TextureSynthesizer::new(SynthesisSettings {
            layer_count: 0,
            ..SynthesisSettings::default()
        });
        assert_eq!(synth.settings().layer_count, 1);
        assert_eq!(synth.normalize_layer(5), 0);
    }

    #[test]
    fn test_out_of_range_transition_is_clamped() {
        let synth = TextureSynthesizer::default();
        let table = table();
        assert_eq!(
            synth.generate_with_table(&table, 0, Weather::Clear, 3.0),
            synth.generate_with_table(&table, 0, Weather::Clear, 1.0)
        );
        assert_eq!(
            synth.generate_with_table(&table, 0, Weather::Clear, -2.0),
            synth.generate_with_table(&table, 0, Weather::Clear, 0.0)
        );
    }

    #[test]
    fn test_generate_requires_table() {
        let synth = TextureSynthesizer::default();
        let engine = NoiseEngine::new();
        assert_eq!(
            synth.generate(&engine, 0, Weather::Clear, 0.0),
            Err(CloudError::Uninitialized)
        );
    }

    #[test]
    fn test_settings_validation() {
        assert!(SynthesisSettings::default().validate().is_ok());

        let bad_frequency = SynthesisSettings {
            frequency: 0.0,
            ..SynthesisSettings::default()
        };
        assert!(matches!(
            bad_frequency.validate(),
            Err(CloudError::InvalidConfig(_))
        ));

        let bad_offset = SynthesisSettings {
            layer_offset_y: f64::INFINITY,
            ..SynthesisSettings::default()
        };
        assert!(bad_offset.validate().is_err());

        let bad_darkening = SynthesisSettings {
            storm_darkening: 16,
            ..SynthesisSettings::default()
        };
        assert!(bad_darkening.validate().is_err());
    }

    #[test]
    fn test_ascii_rendering() {
        let image = CloudImage::transparent();
        let ascii = image.to_ascii();
        assert_eq!(ascii.lines().count(), TILE_HEIGHT);
        assert!(ascii.lines().all(|l| l.len() == TILE_WIDTH && l.chars().all(|c| c == '.')));

        let mut painted = CloudImage::transparent();
        painted.set(0, 0, 12);
        assert!(painted.to_ascii().starts_with('c'));
        assert_eq!(painted.get(0, 0), Some(12));
        assert_eq!(painted.get(TILE_WIDTH, 0), None);
        assert_eq!(painted.opaque_count(), 1);
    }
}
