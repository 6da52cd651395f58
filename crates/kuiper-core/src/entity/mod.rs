//! Entity record and per-tick behavior.
//!
//! Every simulated body is one [`Entity`]: a kind tag, a [`Motion`] block
//! (position, velocity, pending velocity, angle, outline), mass and score,
//! an age limit, and a set of optional capabilities:
//!
//! - [`Destructible`]: impact destruction and fragmentation on death
//! - `spin`: constant angular rate, applied after a surviving advance
//! - [`Behavior`]: the kind-specific extra state (ship controls, UFO
//!   perception, bullet hit latch, label text)
//!
//! Kind behavior is dispatched with a `match` on [`Behavior`]; the layered
//! defaults (base motion, then destruction, then spin, then kind behavior)
//! are applied in that fixed order by [`Entity::advance`].
//!
//! # Collision
//!
//! [`Entity::crunch`] is one-sided: it computes this entity's response to a
//! [`Body`] snapshot of the other and stores it as the pending velocity.
//! Pending velocity is committed at the start of the next advance, so every
//! pair in a tick sees velocities as of tick start.
//!
//! # Example
//!
//! ```
//! use kuiper_core::entity::{Entity, EntityKind};
//! use kuiper_core::vector::Vector2;
//!
//! let mut a = Entity::ufo();
//! let mut b = Entity::ufo();
//! a.set_position(Vector2::new(0.0, 0.0));
//! a.set_velocity(Vector2::new(1.0, 0.0));
//! b.set_position(Vector2::new(15.0, 0.0));
//! b.set_velocity(Vector2::new(-1.0, 0.0));
//!
//! assert_eq!(a.kind(), EntityKind::Ufo);
//! assert!(a.body().radius > 0.0);
//! ```

pub mod components;
mod kinds;
pub mod outline;
pub mod ship;
pub mod ufo;

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{AlignHorz, AlignVert, Canvas, SoundMode};
use crate::config::seconds_to_ticks;
use crate::context::TickContext;
use crate::random::SimRng;
use crate::vector::{Vector2, VectorExt, DEFAULT_DIRECTION};

pub use components::{
    BulletState, Destructible, LabelState, DEFAULT_LABEL_REM, DEFAULT_LABEL_SECONDS, MAX_IMPACT,
    SPEED_OF_LIGHT,
};
pub use outline::Outline;
pub use ship::ShipState;
pub use ufo::UfoState;

/// Coefficient of restitution for every collision.
pub const RESTITUTION: f64 = 0.90;

/// Time step used by the approach test: a pair is closing if it would be
/// nearer after this fraction of a tick.
const APPROACH_STEP: f64 = 0.1;

/// Scatter speed given to primary fragments.
const FRAGMENT_SCATTER: f64 = 0.1;

/// Scatter speed given to the secondary debris of large rocks.
const DEBRIS_SCATTER: f64 = 0.2;

/// Secondary debris spawned when a large rock fragments.
const SECONDARY_DEBRIS: u32 = 5;

/// Half length of the stroke drawn for a bullet.
const BULLET_STROKE: f64 = 1.0;

// =============================================================================
// EntityKind
// =============================================================================

/// Closed set of entity kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Player ship.
    Ship,
    /// Largest rock.
    BigRock,
    /// Middle rock.
    MediumRock,
    /// Smallest rock.
    SmallRock,
    /// Ship projectile.
    Bullet,
    /// Spinning wreckage.
    Debris,
    /// Massless exhaust particle.
    Spark,
    /// Autonomous flocking adversary.
    Ufo,
    /// Floating text.
    Label,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Ship,
        Self::BigRock,
        Self::MediumRock,
        Self::SmallRock,
        Self::Bullet,
        Self::Debris,
        Self::Spark,
        Self::Ufo,
        Self::Label,
    ];

    /// True for kinds that roam the off-screen band before wrapping.
    /// Ship and Bullet wrap tightly at the visible edge.
    #[must_use]
    pub const fn is_deep_roaming(self) -> bool {
        !matches!(self, Self::Ship | Self::Bullet)
    }

    /// True for the two rock sizes whose fragmentation adds secondary debris.
    #[must_use]
    pub const fn is_large_rock(self) -> bool {
        matches!(self, Self::BigRock | Self::MediumRock)
    }

    /// True for any rock size.
    #[must_use]
    pub const fn is_rock(self) -> bool {
        matches!(self, Self::BigRock | Self::MediumRock | Self::SmallRock)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ship => "Ship",
            Self::BigRock => "BigRock",
            Self::MediumRock => "MediumRock",
            Self::SmallRock => "SmallRock",
            Self::Bullet => "Bullet",
            Self::Debris => "Debris",
            Self::Spark => "Spark",
            Self::Ufo => "Ufo",
            Self::Label => "Label",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Body / Motion / Behavior
// =============================================================================

/// Tick-start snapshot of the fields another entity may observe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Kind of the observed entity.
    pub kind: EntityKind,
    /// Position at tick start.
    pub position: Vector2,
    /// Velocity at tick start.
    pub velocity: Vector2,
    /// Outline radius.
    pub radius: f64,
    /// Mass; zero for ghosts.
    pub mass: f64,
}

/// Kinematic state shared by all kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Motion {
    position: Vector2,
    velocity: Vector2,
    pending: Vector2,
    angle: f64,
    outline: Outline,
}

impl Motion {
    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Velocity to be committed by the next advance.
    #[must_use]
    pub fn pending_velocity(&self) -> Vector2 {
        self.pending
    }

    /// Rotation in radians, in `[0, 2π)`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Outline with its fixed radius.
    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Sets velocity and pending velocity, throttled to [`SPEED_OF_LIGHT`].
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity.throttle(SPEED_OF_LIGHT);
        self.pending = self.velocity;
    }

    /// Sets the rotation, normalized to one turn, and re-rotates the outline.
    #[allow(clippy::float_cmp)]
    pub fn set_angle(&mut self, angle: f64) {
        let angle = angle.rem_euclid(TAU);
        if angle != self.angle {
            self.angle = angle;
            self.outline.rotate_to(angle);
        }
    }

    fn set_outline(&mut self, outline: Outline) {
        self.outline = outline;
        self.outline.rotate_to(self.angle);
    }
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// No extra state (rocks, debris, sparks).
    Inert,
    /// Ship controls and weapon charge.
    Ship(ShipState),
    /// UFO steering and per-tick perception scratch.
    Ufo(UfoState),
    /// Bullet hit latch.
    Bullet(BulletState),
    /// Label text.
    Label(LabelState),
}

// =============================================================================
// Entity
// =============================================================================

/// A simulated body.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    motion: Motion,
    mass: f64,
    score: u32,
    age: u64,
    max_ticks: Option<u64>,
    alive: bool,
    destructible: Option<Destructible>,
    spin: f64,
    behavior: Behavior,
}

impl Entity {
    /// Creates a bare entity of `kind` with the given outline and mass.
    ///
    /// Capabilities are attached with the `with_*` builders; the kind
    /// constructors ([`Entity::ship`], [`Entity::big_rock`], ...) are the
    /// usual entry points.
    #[must_use]
    pub fn new(kind: EntityKind, outline: Outline, mass: f64) -> Self {
        let mut motion = Motion::default();
        motion.set_outline(outline);
        Self {
            kind,
            motion,
            mass,
            score: 0,
            age: 0,
            max_ticks: None,
            alive: true,
            destructible: None,
            spin: 0.0,
            behavior: Behavior::Inert,
        }
    }

    /// Attaches a destruction recipe.
    #[must_use]
    pub fn with_destructible(mut self, destructible: Destructible) -> Self {
        self.destructible = Some(destructible);
        self
    }

    /// Sets the per-tick rotation rate.
    #[must_use]
    pub fn with_spin(mut self, spin: f64) -> Self {
        self.spin = spin;
        self
    }

    /// Sets the points awarded when a bullet destroys this entity.
    #[must_use]
    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    /// Sets the kind-specific state.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Sets the lifetime; see [`Entity::set_max_seconds`].
    #[must_use]
    pub fn with_max_seconds(mut self, seconds: f64) -> Self {
        self.set_max_seconds(seconds);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Kinematic state.
    #[must_use]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vector2 {
        self.motion.position
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vector2 {
        self.motion.velocity
    }

    /// Velocity to be committed by the next advance.
    #[must_use]
    pub fn pending_velocity(&self) -> Vector2 {
        self.motion.pending
    }

    /// Rotation in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.motion.angle
    }

    /// Outline radius, fixed when the outline was set.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.motion.outline.radius()
    }

    /// Outline.
    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.motion.outline
    }

    /// Mass; zero means the entity never collides.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Points awarded for a bullet kill.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks advanced so far.
    #[must_use]
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Tick limit, if bounded.
    #[must_use]
    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    /// Liveness flag.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Destruction recipe, if any.
    #[must_use]
    pub fn destructible(&self) -> Option<&Destructible> {
        self.destructible.as_ref()
    }

    /// Per-tick rotation rate.
    #[must_use]
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Kind-specific state.
    #[must_use]
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Ship state, if this is the ship.
    #[must_use]
    pub fn as_ship(&self) -> Option<&ShipState> {
        match &self.behavior {
            Behavior::Ship(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable ship state, for control input.
    #[must_use]
    pub fn as_ship_mut(&mut self) -> Option<&mut ShipState> {
        match &mut self.behavior {
            Behavior::Ship(state) => Some(state),
            _ => None,
        }
    }

    /// UFO state, if this is a UFO.
    #[must_use]
    pub fn as_ufo(&self) -> Option<&UfoState> {
        match &self.behavior {
            Behavior::Ufo(state) => Some(state),
            _ => None,
        }
    }

    /// Label state, if this is a label.
    #[must_use]
    pub fn as_label(&self) -> Option<&LabelState> {
        match &self.behavior {
            Behavior::Label(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable label state.
    #[must_use]
    pub fn as_label_mut(&mut self) -> Option<&mut LabelState> {
        match &mut self.behavior {
            Behavior::Label(state) => Some(state),
            _ => None,
        }
    }

    /// True once a bullet has registered a hit.
    #[must_use]
    pub fn has_hit(&self) -> bool {
        matches!(self.behavior, Behavior::Bullet(BulletState { hit: true }))
    }

    /// Snapshot for the collision pass.
    #[must_use]
    pub fn body(&self) -> Body {
        Body {
            kind: self.kind,
            position: self.motion.position,
            velocity: self.motion.velocity,
            radius: self.radius(),
            mass: self.mass,
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Sets the position.
    pub fn set_position(&mut self, position: Vector2) {
        self.motion.set_position(position);
    }

    /// Sets velocity and pending velocity, throttled to [`SPEED_OF_LIGHT`].
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.motion.set_velocity(velocity);
    }

    /// Sets the rotation angle.
    pub fn set_angle(&mut self, angle: f64) {
        self.motion.set_angle(angle);
    }

    /// Replaces the outline; the radius is recomputed.
    pub fn set_outline(&mut self, outline: Outline) {
        self.motion.set_outline(outline);
    }

    /// Sets the lifetime in seconds, converted to whole ticks. Zero or
    /// negative means unbounded.
    pub fn set_max_seconds(&mut self, seconds: f64) {
        self.max_ticks = (seconds > 0.0).then(|| seconds_to_ticks(seconds));
    }

    /// Clears the liveness flag.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Clears per-tick scratch state. Called once at the start of each tick.
    pub fn begin_tick(&mut self) {
        if let Behavior::Ufo(ufo) = &mut self.behavior {
            ufo.clear_perception();
        }
    }

    // -------------------------------------------------------------------------
    // Collision
    // -------------------------------------------------------------------------

    /// Registers a collision with `other` and returns whether one occurred.
    ///
    /// UFOs record `other` for steering before anything else, whether or
    /// not a collision follows. A collision requires both masses positive,
    /// this entity alive, the outlines overlapping and the pair closing.
    /// On collision the pending velocity becomes the momentum-conserving
    /// rebound, a bullet impactor kills this entity, a destructible may be
    /// doomed, and a bullet latches its hit flag.
    pub fn crunch(&mut self, other: &Body, rng: &mut SimRng) -> bool {
        if let Behavior::Ufo(ufo) = &mut self.behavior {
            ufo.perceive(
                self.motion.position,
                self.motion.outline.radius(),
                self.mass,
                other,
            );
        }

        if !self.rebound(other) {
            return false;
        }

        if let Some(destructible) = &mut self.destructible {
            destructible.assess(self.mass, self.motion.velocity, other, rng);
        }
        if let Behavior::Bullet(bullet) = &mut self.behavior {
            bullet.hit = true;
        }
        true
    }

    fn rebound(&mut self, other: &Body) -> bool {
        let m0 = self.mass;
        let m1 = other.mass;
        if !self.alive || m0 <= 0.0 || m1 <= 0.0 {
            return false;
        }

        let dpos = self.motion.position - other.position;
        let dist = dpos.length();
        if dist > self.radius() + other.radius {
            return false;
        }

        let v0 = self.motion.velocity;
        let v1 = other.velocity;
        if dist <= (dpos + (v0 - v1) * APPROACH_STEP).length() {
            // Separating or grazing past.
            return false;
        }

        self.motion.pending = (v0 * m0 + v1 * m1 + (v1 - v0) * m1 * RESTITUTION) / (m0 + m1);
        if other.kind == EntityKind::Bullet {
            self.alive = false;
        }
        true
    }

    // -------------------------------------------------------------------------
    // Advance
    // -------------------------------------------------------------------------

    /// Steps the entity one tick and returns whether it survives.
    ///
    /// Order: bullet hit latch, base motion, destruction and fragmentation,
    /// spin, then kind behavior. Anything spawned goes into `ctx`.
    pub fn advance(&mut self, ctx: &mut TickContext<'_>) -> bool {
        if self.has_hit() {
            self.alive = false;
            return false;
        }

        let moved = self.advance_motion();
        let survived = match &self.destructible {
            Some(destructible) if !moved || destructible.is_destroyed() => {
                self.alive = false;
                self.explode(ctx);
                false
            }
            _ => moved,
        };

        if !survived {
            if let Behavior::Ship(ship) = &mut self.behavior {
                ship.on_death(ctx);
            }
            return false;
        }

        if self.spin != 0.0 {
            self.motion.set_angle(self.motion.angle + self.spin);
        }

        match &mut self.behavior {
            Behavior::Ship(ship) => ship.advance(self.age, &mut self.motion, ctx),
            Behavior::Ufo(ufo) => ufo.steer(&mut self.motion),
            Behavior::Inert | Behavior::Bullet(_) | Behavior::Label(_) => {}
        }
        true
    }

    fn advance_motion(&mut self) -> bool {
        self.age += 1;
        self.motion.velocity = self.motion.pending.throttle(SPEED_OF_LIGHT);
        self.motion.position += self.motion.velocity;
        if self.max_ticks.is_some_and(|max| self.age > max) {
            self.alive = false;
        }
        self.alive
    }

    fn explode(&self, ctx: &mut TickContext<'_>) {
        let Some(destructible) = &self.destructible else {
            return;
        };
        if destructible.fragment_count() == 0 {
            return;
        }

        if let Some(sound) = destructible.explosion() {
            if ctx.ship_present() && ctx.in_view(self.motion.position, self.radius()) {
                ctx.play_sound(sound, SoundMode::Restart);
            }
        }

        let kind = destructible.fragment_kind();
        self.fragment(kind, destructible.fragment_count(), FRAGMENT_SCATTER, ctx);
        if kind.is_large_rock() {
            self.fragment(EntityKind::Debris, SECONDARY_DEBRIS, DEBRIS_SCATTER, ctx);
        }
        debug!(
            parent = %self.kind,
            fragment = %kind,
            count = destructible.fragment_count(),
            "fragmented"
        );
    }

    /// Spawns `count` children in an even fan one radius out from the
    /// parent. Each inherits the parent velocity plus an outward delta of
    /// `scatter`; the deltas cancel over a full fan.
    fn fragment(&self, kind: EntityKind, count: u32, scatter: f64, ctx: &mut TickContext<'_>) {
        if count == 0 {
            return;
        }
        let dir = self.motion.velocity.direction_or(DEFAULT_DIRECTION);
        let mut dp = (dir * self.radius()).rotated(FRAC_PI_2);
        let mut dv = dir.rotated(FRAC_PI_2) * scatter;
        let step = TAU / f64::from(count);

        for _ in 0..count {
            let mut child = Self::create(kind, ctx);
            child.set_position(self.motion.position + dp);
            child.set_velocity(self.motion.velocity + dv);
            ctx.spawn(child);
            dp = dp.rotated(step);
            dv = dv.rotated(step);
        }
    }

    // -------------------------------------------------------------------------
    // Draw
    // -------------------------------------------------------------------------

    /// Draws the entity. Dead entities draw nothing.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        if !self.alive {
            return;
        }
        let pos = self.motion.position;
        match &self.behavior {
            Behavior::Label(label) => {
                if !label.text.is_empty() && label.rem > 0.0 {
                    canvas.draw_text(pos, AlignHorz::Center, AlignVert::Middle, label.rem, &label.text);
                }
            }
            Behavior::Bullet(_) => {
                let dv = self.motion.velocity.direction_or(DEFAULT_DIRECTION) * BULLET_STROKE;
                canvas.draw_line(pos - dv, pos + dv);
            }
            Behavior::Inert | Behavior::Ship(_) | Behavior::Ufo(_) => {
                for (a, b) in self.motion.outline.segments(pos) {
                    canvas.draw_line(a, b);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
