//! Constructors fixing shape, mass, fragility and recipe per kind.

use std::f64::consts::PI;

use crate::canvas::SoundId;
use crate::config::TICK_INTERVAL_MS;
use crate::context::TickContext;
use crate::random::{RandomExt, SimRng};
use crate::vector::Vector2;

use super::outline::DEFAULT_POLYGON_POINTS;
use super::{
    Behavior, BulletState, Destructible, Entity, EntityKind, LabelState, Outline, ShipState,
    UfoState, DEFAULT_LABEL_SECONDS,
};

/// Lifetime of a bullet fired with zero velocity, in seconds.
const STILL_BULLET_SECONDS: f64 = 0.1;

/// Fraction of the smaller canvas dimension a bullet may travel.
const BULLET_RANGE: f64 = 0.75;

fn points(xy: &[(f64, f64)]) -> Vec<Vector2> {
    xy.iter().map(|&(x, y)| Vector2::new(x, y)).collect()
}

impl Entity {
    /// Builds a fresh entity of `kind`, drawing any randomness from `ctx`.
    ///
    /// Bullets are built at rest and labels empty; callers set velocity,
    /// position and text afterwards.
    pub fn create(kind: EntityKind, ctx: &mut TickContext<'_>) -> Self {
        match kind {
            EntityKind::Ship => Self::ship(),
            EntityKind::BigRock => Self::big_rock(ctx.rng()),
            EntityKind::MediumRock => Self::medium_rock(ctx.rng()),
            EntityKind::SmallRock => Self::small_rock(ctx.rng()),
            EntityKind::Bullet => Self::bullet(Vector2::ZERO, ctx.width(), ctx.height()),
            EntityKind::Debris => Self::debris(ctx.rng()),
            EntityKind::Spark => Self::spark(ctx.rng()),
            EntityKind::Ufo => Self::ufo(),
            EntityKind::Label => Self::label("", DEFAULT_LABEL_SECONDS),
        }
    }

    /// Player ship. Explodes into 5 debris at any heavier impact.
    #[must_use]
    pub fn ship() -> Self {
        let outline = Outline::from_points(&points(&[
            (0.0, -10.0),
            (7.0, 10.0),
            (0.0, 7.0),
            (-7.0, 10.0),
            (0.0, -10.0),
        ]));
        Self::new(EntityKind::Ship, outline, 20.0)
            .with_destructible(Destructible::new(
                1.0,
                EntityKind::Debris,
                5,
                Some(SoundId::SmallExplosion),
            ))
            .with_behavior(Behavior::Ship(ShipState::default()))
    }

    /// Largest rock: splits into two medium rocks, self-destructs within
    /// 10 to 150 seconds.
    pub fn big_rock(rng: &mut SimRng) -> Self {
        Self::rock(
            rng,
            EntityKind::BigRock,
            RockRecipe {
                radius: 30.0,
                fragility: 0.5,
                fragments: (EntityKind::MediumRock, 2),
                mass: 300.0,
                score: 100,
                max_spin: PI / 180.0,
                sound: SoundId::BigExplosion,
                timed: true,
            },
        )
    }

    /// Middle rock: splits into two small rocks, self-destructs within
    /// 10 to 150 seconds.
    pub fn medium_rock(rng: &mut SimRng) -> Self {
        Self::rock(
            rng,
            EntityKind::MediumRock,
            RockRecipe {
                radius: 18.0,
                fragility: 0.4,
                fragments: (EntityKind::SmallRock, 2),
                mass: 150.0,
                score: 50,
                max_spin: PI / 90.0,
                sound: SoundId::MediumExplosion,
                timed: true,
            },
        )
    }

    /// Smallest rock: breaks into three debris, lives until hit.
    pub fn small_rock(rng: &mut SimRng) -> Self {
        Self::rock(
            rng,
            EntityKind::SmallRock,
            RockRecipe {
                radius: 10.0,
                fragility: 0.3,
                fragments: (EntityKind::Debris, 3),
                mass: 75.0,
                score: 25,
                max_spin: PI / 45.0,
                sound: SoundId::SmallExplosion,
                timed: false,
            },
        )
    }

    fn rock(rng: &mut SimRng, kind: EntityKind, recipe: RockRecipe) -> Self {
        let outline = Outline::regular_polygon(recipe.radius, DEFAULT_POLYGON_POINTS, Some(&mut *rng));
        let spin = rng.between(-recipe.max_spin, recipe.max_spin);
        let mut rock = Self::new(kind, outline, recipe.mass)
            .with_destructible(Destructible::new(
                recipe.fragility,
                recipe.fragments.0,
                recipe.fragments.1,
                Some(recipe.sound),
            ))
            .with_spin(spin)
            .with_score(recipe.score);
        if recipe.timed {
            rock.set_max_seconds(rng.between(10.0, 150.0));
        }
        rock
    }

    /// Spinning wreckage; indestructible, lives 1 to 3 seconds.
    pub fn debris(rng: &mut SimRng) -> Self {
        let outline = Outline::from_points(&points(&[(0.0, 3.0), (3.0, 0.0), (-2.0, -3.0), (0.0, 3.0)]));
        let spin = rng.between(-PI / 15.0, PI / 15.0);
        let seconds = rng.between(1.0, 3.0);
        Self::new(EntityKind::Debris, outline, 3.0)
            .with_destructible(Destructible::new(0.0, EntityKind::Debris, 0, None))
            .with_spin(spin)
            .with_max_seconds(seconds)
    }

    /// Massless exhaust streak lasting 0.05 to 0.15 seconds.
    pub fn spark(rng: &mut SimRng) -> Self {
        let outline = Outline::from_points(&points(&[(0.0, 1.0), (0.0, -1.0)]));
        let seconds = rng.between(0.05, 0.15);
        Self::new(EntityKind::Spark, outline, 0.0).with_max_seconds(seconds)
    }

    /// Projectile moving at `velocity` on a `width` x `height` canvas.
    ///
    /// Lives for as many ticks as it needs to cross three quarters of the
    /// smaller canvas dimension; a bullet at rest gets a tenth of a second.
    #[must_use]
    pub fn bullet(velocity: Vector2, width: f64, height: f64) -> Self {
        let speed = velocity.length();
        let seconds = if speed > 0.0 {
            let ticks = BULLET_RANGE * width.min(height) / speed;
            ticks * f64::from(TICK_INTERVAL_MS) / 1000.0
        } else {
            STILL_BULLET_SECONDS
        };
        let mut bullet = Self::new(EntityKind::Bullet, Outline::default(), 1.0)
            .with_behavior(Behavior::Bullet(BulletState::default()))
            .with_max_seconds(seconds);
        bullet.set_velocity(velocity);
        bullet
    }

    /// Flocking adversary; only bullets kill it.
    #[must_use]
    pub fn ufo() -> Self {
        let outline = Outline::from_points(&points(&[
            (5.0, -5.0),
            (10.0, -2.0),
            (10.0, 2.0),
            (8.0, 4.0),
            (-2.0, 4.0),
            (-2.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (-8.0, 4.0),
            (-10.0, 2.0),
            (-10.0, -2.0),
            (10.0, -2.0),
            (10.0, 2.0),
            (-10.0, 2.0),
            (-10.0, -2.0),
            (-5.0, -5.0),
            (0.0, -5.0),
            (-7.0, -2.0),
            (-5.0, -5.0),
            (5.0, -5.0),
        ]));
        Self::new(EntityKind::Ufo, outline, 15.0)
            .with_destructible(Destructible::new(
                0.0,
                EntityKind::Debris,
                5,
                Some(SoundId::SmallExplosion),
            ))
            .with_score(1000)
            .with_behavior(Behavior::Ufo(UfoState::default()))
    }

    /// Massless text lasting `seconds`; zero or negative is unbounded.
    #[must_use]
    pub fn label(text: impl Into<String>, seconds: f64) -> Self {
        Self::new(EntityKind::Label, Outline::default(), 0.0)
            .with_behavior(Behavior::Label(LabelState::new(text)))
            .with_max_seconds(seconds)
    }
}

struct RockRecipe {
    radius: f64,
    fragility: f64,
    fragments: (EntityKind, u32),
    mass: f64,
    score: u32,
    max_spin: f64,
    sound: SoundId,
    timed: bool,
}
