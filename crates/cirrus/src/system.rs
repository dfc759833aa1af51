//! # Cloud System
//!
//! One owned state object per cloud system: noise table, synthesizer,
//! appearance machine, tile cache and the display boundary.
//!
//! The host drives it once per frame:
//!
//! ```text
//! frame:
//!   outcome = system.tick()            // brightness pushed to the actuator
//!   if system.revision() != seen:      // weather, daytime or cycle changed
//!       for sprite in sprites:
//!           sprite.image = system.texture(sprite.layer)?
//!   for recycled sprite:
//!       sprite.image = system.texture(sprite.layer)?
//! ```
//!
//! Nothing here is global, so independent systems can coexist.

use cirrus_procedural::{
    AppearanceState, CloudImage, CloudResult, NoiseEngine, PermutationTable, TextureSynthesizer,
    TickOutcome, Weather,
};

use crate::cache::{CacheStats, TextureCache, TextureKey};
use crate::config::CloudConfig;
use crate::display::{brightness_level, BrightnessActuator, NullActuator};

/// Cloud tile generator with weather and day/night state.
#[derive(Debug)]
pub struct CloudSystem<A = NullActuator> {
    engine: NoiseEngine,
    synthesizer: TextureSynthesizer,
    appearance: AppearanceState,
    cache: TextureCache,
    actuator: A,
}

impl CloudSystem<NullActuator> {
    /// Creates a system that discards brightness updates.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` if the config fails validation.
    pub fn headless(config: &CloudConfig) -> CloudResult<Self> {
        Self::new(config, NullActuator)
    }
}

impl<A: BrightnessActuator> CloudSystem<A> {
    /// Creates a system seeded from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` if the config fails validation.
    pub fn new(config: &CloudConfig, actuator: A) -> CloudResult<Self> {
        config.validate()?;
        Ok(Self {
            engine: NoiseEngine::with_seed(config.noise_seed()),
            synthesizer: TextureSynthesizer::new(config.synthesis.clone()),
            appearance: AppearanceState::new(config.appearance.clone())?,
            cache: TextureCache::new(config.cache_capacity),
            actuator,
        })
    }

    /// Rebuilds the permutation table from `seed`.
    ///
    /// Every previously generated tile is stale afterwards.
    pub fn reseed(&mut self, seed: u64) {
        self.engine.init(seed.into());
        self.cache.clear();
    }

    /// Installs a table built from a host-provided random source.
    pub fn install_table(&mut self, table: PermutationTable) {
        self.engine.install(table);
        self.cache.clear();
    }

    /// Samples the raw noise field.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if no table is installed and
    /// `CloudError::NonFiniteCoordinate` for infinite or NaN coordinates.
    pub fn sample(&self, x: f64, y: f64) -> CloudResult<f64> {
        self.engine.sample(x, y)
    }

    /// Tile for `layer` under the current weather and transition.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if no table is installed.
    pub fn texture(&mut self, layer: i32) -> CloudResult<CloudImage> {
        let weather = self.appearance.weather();
        let transition = self.appearance.transition();
        self.generate(layer, weather, transition)
    }

    /// Tile for explicit appearance parameters, memoized.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if no table is installed.
    pub fn generate(
        &mut self,
        layer: i32,
        weather: Weather,
        transition: f64,
    ) -> CloudResult<CloudImage> {
        let transition = if transition.is_nan() { 0.0 } else { transition };
        let key = TextureKey::new(self.synthesizer.normalize_layer(layer), weather, transition);
        let (engine, synthesizer) = (&self.engine, &self.synthesizer);
        self.cache.get_or_try_insert_with(key, || {
            synthesizer.generate(engine, layer, weather, transition)
        })
    }

    /// Fresh tiles for every active layer, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::Uninitialized` if no table is installed.
    pub fn refresh(&mut self, layers: &[i32]) -> CloudResult<Vec<CloudImage>> {
        layers.iter().map(|&layer| self.texture(layer)).collect()
    }

    /// Sets the weather by name; unknown names are ignored.
    ///
    /// Returns true if tiles need regenerating.
    pub fn set_weather(&mut self, name: &str) -> bool {
        self.appearance.set_weather(name)
    }

    /// Snaps to full day or full night.
    pub fn set_daytime(&mut self, is_day: bool) {
        self.appearance.set_daytime(is_day);
    }

    /// Arms the day/night cycle.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidCyclePeriod` for a zero period.
    pub fn enable_cycle(&mut self, period_ticks: u32) -> CloudResult<()> {
        self.appearance.enable_cycle(period_ticks)
    }

    /// Advances the appearance machine and pushes brightness to the display.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.appearance.tick();
        if let TickOutcome::Advanced { brightness, .. } = outcome {
            self.actuator.set_brightness(brightness_level(brightness));
        }
        outcome
    }

    /// Counter bumped whenever active tiles must be regenerated.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.appearance.revision()
    }

    /// Weather and transition state.
    #[must_use]
    pub const fn appearance(&self) -> &AppearanceState {
        &self.appearance
    }

    /// Noise engine.
    #[must_use]
    pub const fn engine(&self) -> &NoiseEngine {
        &self.engine
    }

    /// Tile synthesizer.
    #[must_use]
    pub const fn synthesizer(&self) -> &TextureSynthesizer {
        &self.synthesizer
    }

    /// Tile cache counters.
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Display boundary.
    #[must_use]
    pub const fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingActuator;

    #[test]
    fn test_texture_uses_current_appearance() {
        let mut system = CloudSystem::headless(&CloudConfig::default()).unwrap();
        system.set_weather("stormy");
        system.set_daytime(false);

        let direct = system.synthesizer().generate(system.engine(), 1, Weather::Stormy, 1.0);
        assert_eq!(system.texture(1), direct);
    }

    #[test]
    fn test_repeated_texture_hits_cache() {
        let mut system = CloudSystem::headless(&CloudConfig::default()).unwrap();
        let first = system.texture(0).unwrap();
        let second = system.texture(0).unwrap();
        let wrapped = system.texture(2).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, wrapped, "layer 2 wraps to layer 0");
        assert_eq!(system.cache_stats().misses, 1);
        assert_eq!(system.cache_stats().hits, 2);
    }

    #[test]
    fn test_reseed_invalidates_cache() {
        let mut system = CloudSystem::headless(&CloudConfig::default()).unwrap();
        let before = system.texture(0).unwrap();

        system.reseed(4242);
        let after = system.texture(0).unwrap();
        assert_ne!(before, after);
        assert_eq!(system.cache_stats().misses, 2);

        system.reseed(1337);
        assert_eq!(system.texture(0).unwrap(), before);
    }

    #[test]
    fn test_tick_drives_actuator() {
        let mut system = CloudSystem::new(&CloudConfig::default(), RecordingActuator::new()).unwrap();

        assert_eq!(system.tick(), TickOutcome::Idle);
        assert!(system.actuator().levels().is_empty());

        system.enable_cycle(100).unwrap();
        for _ in 0..10 {
            system.tick();
        }
        // 100 - 60 * 0.1
        assert_eq!(system.actuator().levels().len(), 10);
        assert_eq!(system.actuator().last(), Some(94));
    }

    #[test]
    fn test_refresh_returns_one_tile_per_layer() {
        let mut system = CloudSystem::headless(&CloudConfig::default()).unwrap();
        let tiles = system.refresh(&[0, 1, 0]).unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0], tiles[2]);
        assert_ne!(tiles[0], tiles[1]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CloudConfig {
            cache_capacity: 0,
            ..CloudConfig::default()
        };
        assert!(CloudSystem::headless(&config).is_err());
    }
}
