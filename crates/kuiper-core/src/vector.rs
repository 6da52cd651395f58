//! Two-dimensional vector helpers.
//!
//! Positions, velocities and outline points are all [`Vector2`], an alias for
//! [`glam::DVec2`]. Arithmetic, magnitude and distance come from glam; the
//! [`VectorExt`] trait adds the few operations the simulation needs on top:
//!
//! - [`VectorExt::throttle`]: clamp each axis to a maximum magnitude
//! - [`VectorExt::rotated`]: rotate about the origin by an angle in radians
//! - [`VectorExt::BREAK`] / [`VectorExt::is_break`]: the "lift the pen"
//!   sentinel used inside outlines
//! - [`VectorExt::direction_or`]: unit vector with a fallback for zero length
//!
//! # Example
//!
//! ```
//! use kuiper_core::vector::{Vector2, VectorExt};
//!
//! let v = Vector2::new(30.0, -2.0).throttle(20.0);
//! assert_eq!(v, Vector2::new(20.0, -2.0));
//!
//! assert!(Vector2::BREAK.is_break());
//! assert!(Vector2::BREAK.rotated(1.0).is_break());
//! ```

use glam::DVec2;

/// The simulation's 2-D value type.
pub type Vector2 = DVec2;

/// Direction substituted when normalizing a zero-length vector.
pub const DEFAULT_DIRECTION: Vector2 = Vector2::new(
    std::f64::consts::FRAC_1_SQRT_2,
    std::f64::consts::FRAC_1_SQRT_2,
);

/// Simulation-specific operations on [`Vector2`].
pub trait VectorExt: Sized {
    /// Outline sentinel meaning "no point here; start a new line strip".
    const BREAK: Self;

    /// Returns true if this is the outline break sentinel (either axis NaN).
    fn is_break(self) -> bool;

    /// Returns a copy with each axis clamped to `[-max, max]`.
    ///
    /// The break sentinel passes through unchanged.
    #[must_use]
    fn throttle(self, max: f64) -> Self;

    /// Rotates about the origin by `angle` radians.
    ///
    /// A zero angle or the break sentinel returns the input unchanged.
    #[must_use]
    fn rotated(self, angle: f64) -> Self;

    /// Returns the unit vector in this direction, or `fallback` when the
    /// length is zero or not finite.
    #[must_use]
    fn direction_or(self, fallback: Self) -> Self;
}

impl VectorExt for DVec2 {
    const BREAK: Self = DVec2::NAN;

    fn is_break(self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    fn throttle(self, max: f64) -> Self {
        if self.is_break() {
            return self;
        }
        DVec2::new(self.x.clamp(-max, max), self.y.clamp(-max, max))
    }

    fn rotated(self, angle: f64) -> Self {
        if angle == 0.0 || self.is_break() {
            return self;
        }
        let (sn, cs) = angle.sin_cos();
        DVec2::new(cs * self.x - sn * self.y, sn * self.x + cs * self.y)
    }

    fn direction_or(self, fallback: Self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self / len
        } else {
            fallback
        }
    }
}

/// Unit heading for a rotation angle where zero points "up" the canvas
/// (negative y), increasing clockwise.
#[must_use]
pub fn heading(angle: f64) -> Vector2 {
    Vector2::new(angle.sin(), -angle.cos())
}
