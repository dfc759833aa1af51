//! # Appearance State Machine
//!
//! Weather and the day/night transition that parameterize tile synthesis.
//!
//! ## States
//!
//! - **Weather**: `Clear`, `Cloudy` or `Stormy`. Changed only by a setter.
//! - **Transition**: scalar in [0, 1], 0 = full day, 1 = full night.
//! - **Phase**: `Idle` until a cycle is armed, then `Oscillating` forever.
//!   There is no hold state: the transition keeps sweeping between day and
//!   night, reversing direction every `period_ticks` ticks.
//!
//! Every change that invalidates existing tiles bumps [`AppearanceState::revision`].
//! The host compares revisions to decide when to regenerate its textures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CloudError, CloudResult};

/// Weather affecting cloud shading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    /// Fair weather.
    #[default]
    Clear,
    /// Overcast; shaded like clear.
    Cloudy,
    /// Storm; opaque pixels darken.
    Stormy,
}

impl Weather {
    /// Every weather, in declaration order.
    pub const ALL: [Self; 3] = [Self::Clear, Self::Cloudy, Self::Stormy];

    /// Lowercase name accepted by [`Weather::from_str`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Stormy => "stormy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = CloudError;

    /// Parses a weather name, ignoring ASCII case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|weather| weather.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CloudError::UnknownWeather(name.to_string()))
    }
}

/// Direction the transition scalar moves on each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Toward 1.0 (night).
    #[default]
    TowardNight,
    /// Toward 0.0 (day).
    TowardDay,
}

impl Direction {
    /// `+1.0` toward night, `-1.0` toward day.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::TowardNight => 1.0,
            Self::TowardDay => -1.0,
        }
    }

    /// The opposite direction.
    #[inline]
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::TowardNight => Self::TowardDay,
            Self::TowardDay => Self::TowardNight,
        }
    }
}

/// Whether the day/night cycle is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle armed; ticks do nothing.
    Idle,
    /// Cycle armed; every tick moves the transition.
    Oscillating,
}

/// Tunables for the appearance machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    /// Transition change per tick while cycling.
    pub transition_speed: f64,
    /// Display brightness at full day.
    pub day_brightness: u8,
    /// Display brightness at full night.
    pub night_brightness: u8,
    /// Weather before any setter is called.
    pub initial_weather: Weather,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            transition_speed: 0.01,
            day_brightness: 100,
            night_brightness: 40,
            initial_weather: Weather::Clear,
        }
    }
}

impl AppearanceSettings {
    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` if the speed is not in (0, 1] or
    /// night is brighter than day.
    pub fn validate(&self) -> CloudResult<()> {
        if !(self.transition_speed > 0.0 && self.transition_speed <= 1.0) {
            return Err(CloudError::InvalidConfig(format!(
                "transition speed must be in (0, 1], got {}",
                self.transition_speed
            )));
        }
        if self.night_brightness > self.day_brightness {
            return Err(CloudError::InvalidConfig(format!(
                "night brightness {} exceeds day brightness {}",
                self.night_brightness, self.day_brightness
            )));
        }
        Ok(())
    }
}

/// Result of one [`AppearanceState::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// No cycle armed; nothing changed.
    Idle,
    /// The transition moved and tiles should be regenerated.
    Advanced {
        /// Transition after this tick.
        transition: f64,
        /// Brightness for the display actuator.
        brightness: f64,
        /// True if the direction reversed at the end of this tick.
        direction_flipped: bool,
    },
}

impl TickOutcome {
    /// Returns true if tiles need regenerating.
    #[inline]
    #[must_use]
    pub const fn needs_resynthesis(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

#[derive(Clone, Copy, Debug)]
struct Cycle {
    period_ticks: u32,
    elapsed_ticks: u32,
}

/// Weather plus day/night transition.
#[derive(Clone, Debug)]
pub struct AppearanceState {
    weather: Weather,
    transition: f64,
    direction: Direction,
    cycle: Option<Cycle>,
    revision: u64,
    settings: AppearanceSettings,
}

impl AppearanceState {
    /// Creates a daytime, idle state.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` if `settings` fail validation.
    pub fn new(settings: AppearanceSettings) -> CloudResult<Self> {
        settings.validate()?;
        Ok(Self::with_valid_settings(settings))
    }

    fn with_valid_settings(settings: AppearanceSettings) -> Self {
        Self {
            weather: settings.initial_weather,
            transition: 0.0,
            direction: Direction::default(),
            cycle: None,
            revision: 0,
            settings,
        }
    }

    /// Current weather.
    #[inline]
    #[must_use]
    pub const fn weather(&self) -> Weather {
        self.weather
    }

    /// Current transition scalar, always in [0, 1].
    #[inline]
    #[must_use]
    pub const fn transition(&self) -> f64 {
        self.transition
    }

    /// Current direction of travel.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a cycle is armed.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> CyclePhase {
        if self.cycle.is_some() {
            CyclePhase::Oscillating
        } else {
            CyclePhase::Idle
        }
    }

    /// Returns true once a cycle has been armed.
    #[inline]
    #[must_use]
    pub const fn is_cycling(&self) -> bool {
        self.cycle.is_some()
    }

    /// Ticks between direction flips, if cycling.
    #[must_use]
    pub fn cycle_period(&self) -> Option<u32> {
        self.cycle.map(|cycle| cycle.period_ticks)
    }

    /// Counter bumped on every change that requires resynthesis.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Active settings.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &AppearanceSettings {
        &self.settings
    }

    /// Brightness for the current transition, linear from day to night.
    #[must_use]
    pub fn brightness(&self) -> f64 {
        let day = f64::from(self.settings.day_brightness);
        let night = f64::from(self.settings.night_brightness);
        day + (night - day) * self.transition
    }

    /// Sets the weather by name, ignoring ASCII case.
    ///
    /// Unrecognized names leave the state untouched and are not an error.
    /// Returns true if the weather was applied and tiles need regenerating.
    pub fn set_weather(&mut self, name: &str) -> bool {
        match name.parse::<Weather>() {
            Ok(weather) => {
                self.apply_weather(weather);
                true
            }
            Err(err) => {
                tracing::debug!("ignoring weather change: {err}");
                false
            }
        }
    }

    /// Sets the weather directly.
    pub fn apply_weather(&mut self, weather: Weather) {
        tracing::debug!("weather {} -> {}", self.weather, weather);
        self.weather = weather;
        self.revision += 1;
    }

    /// Snaps the transition to full day (`true`) or full night (`false`).
    ///
    /// An armed cycle keeps running from the snapped value.
    pub fn set_daytime(&mut self, is_day: bool) {
        self.transition = if is_day { 0.0 } else { 1.0 };
        self.revision += 1;
        tracing::debug!("daytime snapped to {}", if is_day { "day" } else { "night" });
    }

    /// Arms the day/night cycle; direction flips every `period_ticks` ticks.
    ///
    /// Calling again re-arms with the new period and restarts the count;
    /// the direction and transition carry over.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidCyclePeriod` if `period_ticks` is zero.
    pub fn enable_cycle(&mut self, period_ticks: u32) -> CloudResult<()> {
        if period_ticks == 0 {
            return Err(CloudError::InvalidCyclePeriod(period_ticks));
        }
        self.cycle = Some(Cycle {
            period_ticks,
            elapsed_ticks: 0,
        });
        tracing::info!("day/night cycle armed: direction flips every {period_ticks} ticks");
        Ok(())
    }

    /// Advances the cycle by one tick.
    ///
    /// Idle states return [`TickOutcome::Idle`] and change nothing.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(cycle) = self.cycle.as_mut() else {
            return TickOutcome::Idle;
        };

        self.transition = (self.transition
            + self.settings.transition_speed * self.direction.sign())
        .clamp(0.0, 1.0);

        cycle.elapsed_ticks += 1;
        let direction_flipped = cycle.elapsed_ticks >= cycle.period_ticks;
        if direction_flipped {
            cycle.elapsed_ticks = 0;
            self.direction = self.direction.reversed();
            tracing::debug!("day/night direction flipped to {:?}", self.direction);
        }

        self.revision += 1;
        let brightness = self.brightness();
        tracing::trace!(
            "appearance tick: transition {:.3}, brightness {:.1}",
            self.transition,
            brightness
        );

        TickOutcome::Advanced {
            transition: self.transition,
            brightness,
            direction_flipped,
        }
    }
}

impl Default for AppearanceState {
    fn default() -> Self {
        Self::with_valid_settings(AppearanceSettings::default())
    }
}
