//! Capability components carried by entities.
//!
//! An [`Entity`](super::Entity) is one record; what it can do is decided by
//! which of these it carries. [`Destructible`] gives impact destruction and
//! fragmentation, [`BulletState`] the one-shot hit latch, [`LabelState`] the
//! text payload. Ship and UFO state live next to their behavior in
//! [`super::ship`] and [`super::ufo`].

use crate::canvas::SoundId;
use crate::random::{RandomExt, SimRng};
use crate::vector::Vector2;

use super::{Body, EntityKind};

/// Speed cap applied to every velocity on assignment, per axis.
pub const SPEED_OF_LIGHT: f64 = 20.0;

/// Reference impact speed. An object of fragility `f` is destroyed above
/// `MAX_IMPACT * (1 - f)`.
pub const MAX_IMPACT: f64 = SPEED_OF_LIGHT / 4.0;

/// Default relative font size for labels.
pub const DEFAULT_LABEL_REM: f64 = 0.8;

/// Default label lifetime in seconds.
pub const DEFAULT_LABEL_SECONDS: f64 = 1.0;

// =============================================================================
// Destructible
// =============================================================================

/// Impact destruction and fragment recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Destructible {
    fragility: f64,
    fragment_kind: EntityKind,
    fragment_count: u32,
    explosion: Option<SoundId>,
    destroyed: bool,
}

impl Default for Destructible {
    fn default() -> Self {
        Self {
            fragility: 1.0,
            fragment_kind: EntityKind::Debris,
            fragment_count: 0,
            explosion: None,
            destroyed: false,
        }
    }
}

impl Destructible {
    /// Creates a recipe. `fragility` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(
        fragility: f64,
        fragment_kind: EntityKind,
        fragment_count: u32,
        explosion: Option<SoundId>,
    ) -> Self {
        let mut d = Self {
            fragment_kind,
            fragment_count,
            explosion,
            ..Self::default()
        };
        d.set_fragility(fragility);
        d
    }

    /// Sets fragility, clamped to `[0, 1]`. NaN becomes 0.
    pub fn set_fragility(&mut self, value: f64) {
        self.fragility = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    /// Fragility in `[0, 1]`.
    #[must_use]
    pub fn fragility(&self) -> f64 {
        self.fragility
    }

    /// Kind of child spawned on death.
    #[must_use]
    pub fn fragment_kind(&self) -> EntityKind {
        self.fragment_kind
    }

    /// Number of children spawned on death.
    #[must_use]
    pub fn fragment_count(&self) -> u32 {
        self.fragment_count
    }

    /// Sound played when fragments are produced on screen.
    #[must_use]
    pub fn explosion(&self) -> Option<SoundId> {
        self.explosion
    }

    /// True once an impact has doomed the entity.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Decides whether a registered collision destroys the owner.
    ///
    /// Only a heavier object (or an equal one on a coin flip) can destroy,
    /// and only above the fragility-scaled impact speed. The coin is only
    /// drawn for equal masses.
    #[allow(clippy::float_cmp)]
    pub(crate) fn assess(&mut self, mass: f64, velocity: Vector2, other: &Body, rng: &mut SimRng) {
        if self.fragility <= 0.0 {
            return;
        }
        let outweighed = other.mass > mass || (other.mass == mass && rng.unit() < 0.5);
        if outweighed && (velocity - other.velocity).length() > MAX_IMPACT * (1.0 - self.fragility) {
            self.destroyed = true;
        }
    }
}

// =============================================================================
// Bullet / Label
// =============================================================================

/// One-shot hit latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulletState {
    /// Set by the first registered collision.
    pub hit: bool,
}

/// Floating text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelState {
    /// Text drawn centred on the entity position.
    pub text: String,
    /// Font size relative to the canvas default.
    pub rem: f64,
}

impl LabelState {
    /// Label with the default size.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rem: DEFAULT_LABEL_REM,
        }
    }
}
