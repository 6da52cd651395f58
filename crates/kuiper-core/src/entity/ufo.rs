//! UFO perception and steering.
//!
//! During the collision pass a UFO records what it sees of every other
//! entity into a [`Perception`] scratch block: the nearest heavier threat,
//! the nearest other UFO, and the running totals of its peers. The advance
//! pass turns that into one steering impulse. The scratch is cleared at the
//! start of every tick.

use std::f64::consts::PI;

use crate::vector::{Vector2, VectorExt, DEFAULT_DIRECTION};

use super::{Body, EntityKind, Motion};

/// UFO speed cap, per axis.
pub const MAX_SPEED: f64 = 3.0;

const SWIRL_THRUST: f64 = 0.25;
const SWIRL_ROTATE: f64 = 2.0 * PI / 180.0;
const AVOID_ROCK_THRUST: f64 = 0.4;
const AVOID_PEER_THRUST: f64 = 0.2;
const FLOCK_COHESION_THRUST: f64 = 0.2;
const FLOCK_ALIGNMENT_THRUST: f64 = 0.1;

/// Threat ranges, as multiples of the other entity's radius.
const ROCK_RANGE: f64 = 5.0;
const PEER_RANGE: f64 = 2.0;

/// Nearest threat seen this tick.
///
/// `closeness` is distance over the threat range: below 1 is seriously
/// close. `away` is the unit vector from the threat to the UFO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threat {
    /// Distance divided by the combined threat range.
    pub closeness: f64,
    /// Unit vector pointing away from the threat.
    pub away: Vector2,
}

/// What a UFO observed during one collision pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Perception {
    /// Nearest heavier entity.
    pub rock: Option<Threat>,
    /// Nearest other UFO.
    pub peer: Option<Threat>,
    /// Number of other UFOs seen.
    pub flock_count: u32,
    /// Sum of offsets from this UFO to each peer.
    pub flock_offset: Vector2,
    /// Sum of peer velocities.
    pub flock_velocity: Vector2,
}

impl Perception {
    fn observe(slot: &mut Option<Threat>, offset: Vector2, range: f64) {
        let dist = offset.length();
        let closeness = if range > 0.0 { dist / range } else { 0.0 };
        if slot.map_or(true, |t| closeness < t.closeness) {
            *slot = Some(Threat {
                closeness,
                away: offset.direction_or(DEFAULT_DIRECTION),
            });
        }
    }
}

/// Steering state of a UFO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UfoState {
    swirl: Vector2,
    perception: Perception,
}

impl Default for UfoState {
    fn default() -> Self {
        Self {
            swirl: Vector2::new(1.0, 1.0),
            perception: Perception::default(),
        }
    }
}

impl UfoState {
    /// Observations gathered so far this tick.
    #[must_use]
    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    /// Current self-propulsion vector.
    #[must_use]
    pub fn swirl(&self) -> Vector2 {
        self.swirl
    }

    pub(super) fn clear_perception(&mut self) {
        self.perception = Perception::default();
    }

    /// Records `other` as seen from a UFO at `position`.
    pub(super) fn perceive(&mut self, position: Vector2, radius: f64, mass: f64, other: &Body) {
        let offset = position - other.position;
        if other.mass > mass {
            Perception::observe(
                &mut self.perception.rock,
                offset,
                radius + other.radius * ROCK_RANGE,
            );
        }
        if other.kind == EntityKind::Ufo {
            Perception::observe(
                &mut self.perception.peer,
                offset,
                radius + other.radius * PEER_RANGE,
            );
            self.perception.flock_count += 1;
            self.perception.flock_offset += other.position - position;
            self.perception.flock_velocity += other.velocity;
        }
    }

    /// Adds this tick's steering impulse to `motion`.
    pub(super) fn steer(&mut self, motion: &mut Motion) {
        let mut thrust = self.swirl * SWIRL_THRUST;
        self.swirl = self.swirl.rotated(SWIRL_ROTATE);

        let seen = &self.perception;
        if let Some(rock) = seen.rock.filter(|t| t.closeness > 0.0) {
            thrust += rock.away * AVOID_ROCK_THRUST / rock.closeness;
        }
        if let Some(peer) = seen.peer.filter(|t| t.closeness > 0.0) {
            thrust += peer.away * AVOID_PEER_THRUST / peer.closeness;
        }
        if seen.flock_count > 0 {
            let n = f64::from(seen.flock_count);
            let bearing = (seen.flock_offset / n).direction_or(DEFAULT_DIRECTION);
            thrust += bearing * FLOCK_COHESION_THRUST;
            thrust += seen.flock_velocity / n * FLOCK_ALIGNMENT_THRUST;
        }

        motion.set_velocity((motion.velocity() + thrust).throttle(MAX_SPEED));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TickContext;
    use crate::entity::Entity;
    use crate::random::SimRng;
    use rand::SeedableRng;

    fn body(kind: EntityKind, mass: f64, position: Vector2, radius: f64) -> Body {
        Body {
            kind,
            position,
            velocity: Vector2::ZERO,
            radius,
            mass,
        }
    }

    #[test]
    fn perceives_heavier_threat_even_without_collision() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        ufo.set_position(Vector2::new(100.0, 0.0));
        let rock = body(EntityKind::BigRock, 300.0, Vector2::ZERO, 30.0);
        assert!(!ufo.crunch(&rock, &mut rng));

        let seen = ufo.as_ufo().unwrap().perception();
        let threat = seen.rock.unwrap();
        assert!((threat.away - Vector2::new(1.0, 0.0)).length() < 1e-12);
        assert!(threat.closeness > 0.0);
        assert!(seen.peer.is_none());
    }

    #[test]
    fn keeps_nearest_threat() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        let far = body(EntityKind::BigRock, 300.0, Vector2::new(500.0, 0.0), 30.0);
        let near = body(EntityKind::BigRock, 300.0, Vector2::new(0.0, 200.0), 30.0);
        ufo.crunch(&far, &mut rng);
        ufo.crunch(&near, &mut rng);
        ufo.crunch(&far, &mut rng);
        let threat = ufo.as_ufo().unwrap().perception().rock.unwrap();
        assert!((threat.away - Vector2::new(0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn lighter_entities_are_ignored() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        ufo.crunch(&body(EntityKind::Debris, 3.0, Vector2::new(50.0, 0.0), 3.0), &mut rng);
        assert_eq!(ufo.as_ufo().unwrap().perception(), &Perception::default());
    }

    #[test]
    fn peers_accumulate_flock_totals() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        ufo.crunch(&body(EntityKind::Ufo, 15.0, Vector2::new(100.0, 0.0), 8.0), &mut rng);
        ufo.crunch(&body(EntityKind::Ufo, 15.0, Vector2::new(0.0, 100.0), 8.0), &mut rng);
        let seen = ufo.as_ufo().unwrap().perception();
        assert_eq!(seen.flock_count, 2);
        assert_eq!(seen.flock_offset, Vector2::new(100.0, 100.0));
        assert!(seen.peer.is_some());
        // Equal mass is not a rock threat.
        assert!(seen.rock.is_none());
    }

    #[test]
    fn scratch_cleared_at_tick_start() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        ufo.crunch(&body(EntityKind::Ufo, 15.0, Vector2::new(100.0, 0.0), 8.0), &mut rng);
        ufo.begin_tick();
        assert_eq!(ufo.as_ufo().unwrap().perception(), &Perception::default());
    }

    #[test]
    fn lone_ufo_swirls() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, false);
        let mut ufo = Entity::ufo();
        assert!(ufo.advance(&mut ctx));
        assert!((ufo.velocity() - Vector2::new(0.25, 0.25)).length() < 1e-12);
        let swirl = ufo.as_ufo().unwrap().swirl();
        assert!((swirl.length() - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((swirl - Vector2::new(1.0, 1.0)).length() > 1e-6);
    }

    #[test]
    fn flock_pulls_toward_peers_and_matches_their_heading() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        let r = ufo.radius();
        let mut east = body(EntityKind::Ufo, 15.0, Vector2::new(200.0, 0.0), 8.0);
        east.velocity = Vector2::new(1.0, 0.0);
        let mut south = body(EntityKind::Ufo, 15.0, Vector2::new(0.0, 200.0), 8.0);
        south.velocity = Vector2::new(0.0, 1.0);
        assert!(!ufo.crunch(&east, &mut rng));
        assert!(!ufo.crunch(&south, &mut rng));

        let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, false);
        assert!(ufo.advance(&mut ctx));

        let swirl = Vector2::new(1.0, 1.0) * SWIRL_THRUST;
        // Both peers are equally near; the first one seen is kept.
        let avoid = Vector2::new(-1.0, 0.0) * AVOID_PEER_THRUST * (r + 16.0) / 200.0;
        let cohesion = Vector2::new(1.0, 1.0).normalize() * FLOCK_COHESION_THRUST;
        let alignment = Vector2::new(0.5, 0.5) * FLOCK_ALIGNMENT_THRUST;
        let expected = swirl + avoid + cohesion + alignment;
        assert!((ufo.velocity() - expected).length() < 1e-12);
    }

    #[test]
    fn cohesion_points_at_mean_peer_offset() {
        let mut flocking = Entity::ufo();
        let mut lone = Entity::ufo();
        flocking.set_position(Vector2::new(400.0, 300.0));
        lone.set_position(Vector2::new(400.0, 300.0));

        let mut rng = SimRng::seed_from_u64(1);
        let peer = body(EntityKind::Ufo, 15.0, Vector2::new(400.0, 0.0), 8.0);
        flocking.crunch(&peer, &mut rng);

        let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, false);
        flocking.advance(&mut ctx);
        lone.advance(&mut ctx);

        // The peer is straight up: cohesion beats peer avoidance upward.
        let flocked = flocking.velocity() - lone.velocity();
        assert!(flocked.x.abs() < 1e-12);
        assert!(flocked.y < 0.0);
    }

    #[test]
    fn steers_away_from_rock_and_is_capped() {
        let mut rng = SimRng::seed_from_u64(1);
        let mut ufo = Entity::ufo();
        ufo.set_position(Vector2::new(100.0, 0.0));
        ufo.crunch(&body(EntityKind::BigRock, 300.0, Vector2::new(99.0, 0.0), 30.0), &mut rng);
        let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, false);
        ufo.advance(&mut ctx);
        assert!((ufo.velocity().x - MAX_SPEED).abs() < 1e-12);
    }
}
