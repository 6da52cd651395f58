//! Tunables and fixed constants.
//!
//! Registry tunables live in [`UniverseConfig`] and can be loaded from JSON.
//! The tick interval and the per-kind physical constants are fixed: entity
//! lifetimes and speeds are expressed against them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed real-time interval between ticks, in milliseconds.
pub const TICK_INTERVAL_MS: u32 = 25;

/// Converts seconds of game time to whole ticks (truncating).
///
/// ```
/// use kuiper_core::config::seconds_to_ticks;
///
/// assert_eq!(seconds_to_ticks(2.0), 80);
/// assert_eq!(seconds_to_ticks(0.01), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds_to_ticks(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (1000.0 * seconds / f64::from(TICK_INTERVAL_MS)) as u64
}

/// Errors raised while building or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What the accepted range is.
        reason: &'static str,
    },

    /// The JSON source could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Registry tunables.
///
/// Defaults reproduce the classic arcade balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Lives granted by [`Universe::start`](crate::universe::Universe::start)
    /// when the caller does not choose.
    pub lives: u32,
    /// Seconds between game start (or ship loss) and the next ship.
    pub restart_delay_secs: f64,
    /// Seconds the "GAME OVER" state lingers before the game reports over.
    pub game_end_delay_secs: f64,
    /// Play time in seconds at which the difficulty factor reaches 0.5.
    pub mid_difficulty_secs: f64,
    /// Big rocks spawned with each new ship before any deaths.
    pub start_rocks: u32,
    /// Per-axis speed bound for spawned rocks, scaled by difficulty.
    pub max_rock_speed: f64,
    /// Maximum number of UFOs alive at once.
    pub max_ufo_count: u32,
    /// Rock spawn rate at full difficulty, per second.
    pub max_rocks_per_second: f64,
    /// UFO spawn rate, per second.
    pub max_ufos_per_second: f64,
    /// Width of the off-screen roaming band as a fraction of canvas size.
    pub kuiper_zone: f64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            restart_delay_secs: 2.0,
            game_end_delay_secs: 5.0,
            mid_difficulty_secs: 75.0,
            start_rocks: 12,
            max_rock_speed: 5.0,
            max_ufo_count: 4,
            max_rocks_per_second: 1.0,
            max_ufos_per_second: 0.15,
            kuiper_zone: 0.2,
        }
    }
}

impl UniverseConfig {
    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue { field, reason })
            }
        }

        check(self.lives >= 1, "lives", "must be at least 1")?;
        check(
            self.restart_delay_secs.is_finite() && self.restart_delay_secs >= 0.0,
            "restart_delay_secs",
            "must be finite and non-negative",
        )?;
        check(
            self.game_end_delay_secs.is_finite() && self.game_end_delay_secs >= 0.0,
            "game_end_delay_secs",
            "must be finite and non-negative",
        )?;
        check(
            self.mid_difficulty_secs.is_finite() && self.mid_difficulty_secs > 0.0,
            "mid_difficulty_secs",
            "must be finite and positive",
        )?;
        check(
            self.max_rock_speed.is_finite() && self.max_rock_speed >= 0.0,
            "max_rock_speed",
            "must be finite and non-negative",
        )?;
        check(
            self.max_rocks_per_second.is_finite() && self.max_rocks_per_second >= 0.0,
            "max_rocks_per_second",
            "must be finite and non-negative",
        )?;
        check(
            self.max_ufos_per_second.is_finite() && self.max_ufos_per_second >= 0.0,
            "max_ufos_per_second",
            "must be finite and non-negative",
        )?;
        check(
            self.kuiper_zone.is_finite() && (0.0..=1.0).contains(&self.kuiper_zone),
            "kuiper_zone",
            "must be within [0, 1]",
        )?;
        Ok(())
    }

    /// Parses a JSON document and validates it. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rock spawn probability per tick at full difficulty.
    #[must_use]
    pub fn rock_chance_per_tick(&self) -> f64 {
        self.max_rocks_per_second * f64::from(TICK_INTERVAL_MS) / 1000.0
    }

    /// UFO spawn probability per tick.
    #[must_use]
    pub fn ufo_chance_per_tick(&self) -> f64 {
        self.max_ufos_per_second * f64::from(TICK_INTERVAL_MS) / 1000.0
    }
}

/// Settings for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Configuration shared by the game and demo universes.
    pub universe: UniverseConfig,
    /// Lives given to each attract-mode demo run.
    pub demo_lives: u32,
    /// Whether game sound starts enabled.
    pub sound_on: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            demo_lives: 1,
            sound_on: true,
        }
    }
}

impl SessionConfig {
    /// Validates the nested universe config and the session's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.universe.validate()?;
        if self.demo_lives == 0 {
            return Err(ConfigError::InvalidValue {
                field: "demo_lives",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Parses a JSON document and validates it. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// See [`UniverseConfig::from_json_str`].
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
