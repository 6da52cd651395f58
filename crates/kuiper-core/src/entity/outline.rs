//! Entity outlines.
//!
//! An outline is an ordered list of points relative to the entity origin.
//! Consecutive points are joined by line segments; a [`VectorExt::BREAK`]
//! point lifts the pen. The radius is the mean length of the non-break points
//! and is fixed when the outline is built. Rotation produces a cached rotated
//! copy and never touches the radius.

use std::f64::consts::TAU;

use crate::random::RandomExt;
use crate::vector::{Vector2, VectorExt};

/// Point count used for rock polygons.
pub const DEFAULT_POLYGON_POINTS: usize = 21;

/// Smallest point count [`Outline::regular_polygon`] will produce.
const MIN_POLYGON_POINTS: usize = 4;

/// Point list with a fixed radius and a rotation cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    source: Vec<Vector2>,
    rotated: Vec<Vector2>,
    radius: f64,
}

impl Outline {
    /// Builds an outline from explicit points.
    #[must_use]
    pub fn from_points(points: &[Vector2]) -> Self {
        let mut count = 0_u32;
        let mut total = 0.0;
        for p in points.iter().filter(|p| !p.is_break()) {
            count += 1;
            total += p.length();
        }
        let radius = if count == 0 {
            0.0
        } else {
            total / f64::from(count)
        };
        Self {
            source: points.to_vec(),
            rotated: points.to_vec(),
            radius,
        }
    }

    /// Builds a closed polygon of `count` points (at least 4) at `radius`.
    ///
    /// Points are evenly spaced over `count - 1` steps and the last point
    /// repeats the first. With `rng` supplied, every point after the first
    /// has each axis jittered to within 20% of its value.
    pub fn regular_polygon<R: RandomExt>(radius: f64, count: usize, rng: Option<&mut R>) -> Self {
        let count = count.max(MIN_POLYGON_POINTS);
        #[allow(clippy::cast_precision_loss)]
        let delta = TAU / (count - 1) as f64;

        let mut points = Vec::with_capacity(count);
        let mut angle = 0.0_f64;
        let mut rng = rng;
        for n in 0..count - 1 {
            let mut p = Vector2::new(angle.sin(), angle.cos()) * radius;
            if let Some(rng) = rng.as_deref_mut() {
                if n > 0 {
                    p.x = rng.between(p.x * 0.8, p.x * 1.2);
                    p.y = rng.between(p.y * 0.8, p.y * 1.2);
                }
            }
            points.push(p);
            angle += delta;
        }
        points.push(points[0]);
        Self::from_points(&points)
    }

    /// Mean distance of the non-break points from the origin.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Points as built, before rotation.
    #[must_use]
    pub fn source(&self) -> &[Vector2] {
        &self.source
    }

    /// Points rotated to the last angle passed to [`Outline::rotate_to`].
    #[must_use]
    pub fn points(&self) -> &[Vector2] {
        &self.rotated
    }

    /// Recomputes the rotated points for `angle`.
    pub fn rotate_to(&mut self, angle: f64) {
        self.rotated.clear();
        self.rotated
            .extend(self.source.iter().map(|p| p.rotated(angle)));
    }

    /// Line segments of the rotated outline translated by `origin`. Pairs
    /// touching a break point are skipped.
    pub fn segments(&self, origin: Vector2) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
        self.rotated.windows(2).filter_map(move |pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.is_break() || b.is_break() {
                None
            } else {
                Some((a + origin, b + origin))
            }
        })
    }
}
