//! Player ship controls and weapon.

use std::f64::consts::PI;

use crate::canvas::{SoundId, SoundMode};
use crate::context::TickContext;
use crate::random::RandomExt;
use crate::vector::{heading, Vector2, VectorExt};

use super::{Entity, Motion};

/// Full weapon charge.
pub const FULL_CHARGE: u32 = 8;

/// Ship speed cap, per axis.
pub const MAX_SPEED: f64 = 4.0;

/// Muzzle speed added to the ship velocity.
pub const BULLET_SPEED: f64 = 8.0;

/// Exhaust speed relative to the ship.
const EXHAUST_SPEED: f64 = 5.0;

/// Ticks between shots.
const LOCK_INC: u32 = 2;

/// Ticks between charge refills.
const CHARGE_INC: u64 = 8;

const FIRE_RECOIL: f64 = 0.0075;
const THRUST_FACTOR: f64 = 0.06;
const ROTATE_STEP: f64 = PI * 10.0 / 360.0;
const EXHAUST_SPARKS: usize = 2;

const NOSE: Vector2 = Vector2::new(0.0, -14.0);
const THRUST_POS: Vector2 = Vector2::new(3.0, 10.0);
const THRUST_PLANE: Vector2 = Vector2::new(-6.0, 0.0);

/// Control latches and weapon state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipState {
    rotating: i32,
    thrusting: bool,
    firing: bool,
    charge: u32,
    fire_lock: u32,
    thrust_sound: bool,
}

impl Default for ShipState {
    fn default() -> Self {
        Self {
            rotating: 0,
            thrusting: false,
            firing: false,
            charge: FULL_CHARGE,
            fire_lock: 0,
            thrust_sound: false,
        }
    }
}

impl ShipState {
    /// Sets the rotation direction: negative is anticlockwise, positive
    /// clockwise, zero stops.
    pub fn rotate(&mut self, direction: i32) {
        self.rotating = direction.signum();
    }

    /// Latches the engine on or off.
    pub fn thrust(&mut self, on: bool) {
        self.thrusting = on;
    }

    /// Latches the trigger on or off.
    pub fn fire(&mut self, on: bool) {
        self.firing = on;
    }

    /// Current rotation direction.
    #[must_use]
    pub fn rotating(&self) -> i32 {
        self.rotating
    }

    /// Whether the engine is latched on.
    #[must_use]
    pub fn thrusting(&self) -> bool {
        self.thrusting
    }

    /// Whether the trigger is latched on.
    #[must_use]
    pub fn firing(&self) -> bool {
        self.firing
    }

    /// Shots available.
    #[must_use]
    pub fn charge(&self) -> u32 {
        self.charge
    }

    /// Overrides the charge, capped at [`FULL_CHARGE`].
    pub fn set_charge(&mut self, charge: u32) {
        self.charge = charge.min(FULL_CHARGE);
    }

    /// Ticks until the gun can fire again.
    #[must_use]
    pub fn fire_lock(&self) -> u32 {
        self.fire_lock
    }

    pub(super) fn on_death(&mut self, ctx: &mut TickContext<'_>) {
        self.thrust_sound = false;
        ctx.stop_sound(SoundId::Thrust);
    }

    /// Applies controls after a surviving advance: rotation, thrust with
    /// exhaust, then either a shot or lock cooldown and charge refill.
    pub(super) fn advance(&mut self, age: u64, motion: &mut Motion, ctx: &mut TickContext<'_>) {
        if self.rotating != 0 {
            motion.set_angle(motion.angle() + ROTATE_STEP * f64::from(self.rotating));
        }
        let angle = motion.angle();
        let tvec = heading(angle);

        if self.thrusting {
            let tpos = THRUST_POS.rotated(angle);
            let tplane = THRUST_PLANE.rotated(angle);
            motion.set_velocity((motion.velocity() + tvec * THRUST_FACTOR).throttle(MAX_SPEED));

            let exhaust = tvec * -EXHAUST_SPEED + motion.velocity();
            for _ in 0..EXHAUST_SPARKS {
                let offset = tpos + tplane * ctx.rng().unit();
                let mut spark = Entity::spark(ctx.rng());
                spark.set_position(motion.position() + offset);
                spark.set_velocity(exhaust);
                spark.set_angle(angle);
                ctx.spawn(spark);
            }

            if !self.thrust_sound {
                self.thrust_sound = true;
                ctx.play_sound(SoundId::Thrust, SoundMode::Loop);
            }
        } else if self.thrust_sound {
            self.thrust_sound = false;
            ctx.stop_sound(SoundId::Thrust);
        }

        if self.firing && self.fire_lock == 0 && self.charge > 0 {
            let bvec = tvec * BULLET_SPEED + motion.velocity();
            motion.set_velocity(motion.velocity() - bvec * FIRE_RECOIL);
            self.charge -= 1;
            self.fire_lock = LOCK_INC;

            let mut bullet = Entity::bullet(bvec, ctx.width(), ctx.height());
            bullet.set_position(motion.position() + NOSE.rotated(angle));
            ctx.spawn(bullet);
            ctx.play_sound(SoundId::GunFire, SoundMode::Restart);
        } else {
            if self.fire_lock > 0 {
                self.fire_lock -= 1;
            }
            if self.charge < FULL_CHARGE && age % CHARGE_INC == 0 {
                self.charge += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SoundCommand;
    use crate::entity::EntityKind;
    use crate::random::SimRng;
    use rand::SeedableRng;

    fn ship_at_center() -> Entity {
        let mut ship = Entity::ship();
        ship.set_position(Vector2::new(400.0, 300.0));
        ship
    }

    mod control_tests {
        use super::*;

        #[test]
        fn rotate_direction_is_signum() {
            let mut state = ShipState::default();
            state.rotate(-7);
            assert_eq!(state.rotating(), -1);
            state.rotate(0);
            assert_eq!(state.rotating(), 0);
        }

        #[test]
        fn rotation_steps_angle() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().rotate(1);
            assert!(ship.advance(&mut ctx));
            assert!((ship.angle() - ROTATE_STEP).abs() < 1e-12);
        }
    }

    mod thrust_tests {
        use super::*;

        #[test]
        fn thrust_accelerates_along_heading_and_emits_sparks() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().thrust(true);
            assert!(ship.advance(&mut ctx));

            assert!((ship.velocity().y + THRUST_FACTOR).abs() < 1e-12);
            assert!(ship.velocity().x.abs() < 1e-12);
            let sparks = ctx.spawned();
            assert_eq!(sparks.len(), 2);
            assert!(sparks.iter().all(|s| s.kind() == EntityKind::Spark));
            assert_eq!(
                ctx.sounds(),
                &[SoundCommand::Play(SoundId::Thrust, SoundMode::Loop)]
            );
        }

        #[test]
        fn thrust_sound_starts_once_and_stops_on_release() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().thrust(true);
            ship.advance(&mut ctx);
            ship.advance(&mut ctx);
            ship.as_ship_mut().unwrap().thrust(false);
            ship.advance(&mut ctx);
            assert_eq!(
                ctx.sounds(),
                &[
                    SoundCommand::Play(SoundId::Thrust, SoundMode::Loop),
                    SoundCommand::Stop(SoundId::Thrust),
                ]
            );
        }

        #[test]
        fn speed_capped() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().thrust(true);
            for _ in 0..200 {
                ship.advance(&mut ctx);
            }
            assert!(ship.velocity().y >= -MAX_SPEED - 1e-12);
        }
    }

    mod fire_tests {
        use super::*;

        #[test]
        fn firing_spawns_bullet_with_recoil() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().fire(true);
            ship.advance(&mut ctx);

            let state = ship.as_ship().unwrap();
            assert_eq!(state.charge(), FULL_CHARGE - 1);
            assert_eq!(state.fire_lock(), LOCK_INC);
            let bullets = ctx.spawned();
            assert_eq!(bullets.len(), 1);
            assert_eq!(bullets[0].kind(), EntityKind::Bullet);
            assert!((bullets[0].velocity().y + BULLET_SPEED).abs() < 1e-12);
            assert!((bullets[0].position() - Vector2::new(400.0, 286.0)).length() < 1e-9);
            // Recoil pushes backwards.
            assert!(ship.velocity().y > 0.0);
        }

        #[test]
        fn lock_limits_fire_rate() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.as_ship_mut().unwrap().fire(true);
            for _ in 0..6 {
                ship.advance(&mut ctx);
            }
            // Fires on ticks 1 and 4 (lock 2 -> 1 -> 0), then 7.
            let shots = ctx
                .spawned()
                .iter()
                .filter(|e| e.kind() == EntityKind::Bullet)
                .count();
            assert_eq!(shots, 2);
        }

        #[test]
        fn empty_charge_does_not_fire_until_refill() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            {
                let state = ship.as_ship_mut().unwrap();
                state.set_charge(0);
                state.fire(true);
            }
            for _ in 0..7 {
                ship.advance(&mut ctx);
                assert_eq!(ship.as_ship().unwrap().charge(), 0);
            }
            assert!(ctx.spawned().is_empty());

            // Age 8 refills one shot; age 9 fires it.
            ship.advance(&mut ctx);
            assert_eq!(ship.as_ship().unwrap().charge(), 1);
            ship.advance(&mut ctx);
            assert_eq!(ship.as_ship().unwrap().charge(), 0);
            assert_eq!(ctx.spawned().len(), 1);
        }

        #[test]
        fn death_stops_thrust_sound() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut ctx = TickContext::new(&mut rng, 800.0, 600.0, true);
            let mut ship = ship_at_center();
            ship.kill();
            assert!(!ship.advance(&mut ctx));
            assert!(ctx.sounds().contains(&SoundCommand::Stop(SoundId::Thrust)));
            assert_eq!(
                ctx.spawned()
                    .iter()
                    .filter(|e| e.kind() == EntityKind::Debris)
                    .count(),
                5
            );
        }
    }
}
