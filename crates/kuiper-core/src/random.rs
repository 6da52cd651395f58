//! Random helpers shared by every simulation.
//!
//! Each [`Universe`](crate::universe::Universe) owns one [`SimRng`]; nothing
//! else holds generator state. The [`RandomExt`] trait wraps the two draws the
//! game actually makes.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::vector::Vector2;

/// Generator type owned by each universe.
pub type SimRng = ChaCha8Rng;

/// Uniform draws used by spawning, jitter and timing.
pub trait RandomExt {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform value between `a` and `b`.
    ///
    /// The bounds may be given in either order, and equal bounds return that
    /// value.
    fn between(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.unit()
    }

    /// Vector with each axis uniform in `[-max, max]`.
    fn vector_within(&mut self, max: f64) -> Vector2 {
        Vector2::new(self.between(-max, max), self.between(-max, max))
    }
}

impl<R: Rng> RandomExt for R {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn between_accepts_reversed_bounds() {
        let mut rng = SimRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = rng.between(-1.2, -0.8);
            assert!((-1.2..=-0.8).contains(&v));
            let w = rng.between(-0.8, -1.2);
            assert!((-1.2..=-0.8).contains(&w));
        }
    }

    #[test]
    fn between_equal_bounds() {
        let mut rng = SimRng::seed_from_u64(7);
        assert!((rng.between(3.0, 3.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::seed_from_u64(99);
        let mut b = SimRng::seed_from_u64(99);
        for _ in 0..10 {
            assert!((a.unit() - b.unit()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn vector_within_bounds() {
        let mut rng = SimRng::seed_from_u64(1);
        for _ in 0..50 {
            let v = rng.vector_within(5.0);
            assert!(v.x.abs() <= 5.0 && v.y.abs() <= 5.0);
        }
    }
}
