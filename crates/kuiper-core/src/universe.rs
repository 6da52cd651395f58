//! The simulation registry.
//!
//! A [`Universe`] owns every live entity, the generator, and the game
//! bookkeeping (score, lives, phase). It is advanced exactly once per tick:
//!
//! 1. **TIMER**: a due phase timer spawns the next ship or ends the game
//! 2. **SNAPSHOT**: handles and [`Body`] snapshots of every entity alive now
//! 3. **COLLIDE**: every ordered pair of the snapshot is crunched; bullet
//!    kills award score and float a label
//! 4. **ADVANCE**: snapshot entities advance in slot order; the dead are
//!    despawned at once, survivors are wrapped
//! 5. **FLUSH**: entities queued by steps 3 and 4 are inserted and advanced
//!    in the same pass, repeating until nothing new is queued
//! 6. **SPAWN**: rocks and UFOs may appear in the Kuiper zone
//! 7. **SOUND**: queued sound commands go to the canvas
//!
//! Entities created during a tick are never collided in that tick. Random
//! spawns from step 6 are first advanced on the following tick.
//!
//! # Example
//!
//! ```
//! use kuiper_core::canvas::NullCanvas;
//! use kuiper_core::universe::{Phase, Universe};
//!
//! let mut canvas = NullCanvas::default();
//! let mut universe = Universe::new(42);
//! universe.start(3);
//! assert_eq!(universe.phase(), Phase::Playing);
//!
//! for _ in 0..100 {
//!     universe.advance(&mut canvas);
//! }
//! assert_eq!(universe.tick(), 100);
//! assert!(universe.ship().is_some());
//! ```

use std::fmt;

use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::arena::{Arena, EntityId};
use crate::canvas::{AlignHorz, AlignVert, Canvas, SoundId, SoundMode};
use crate::config::{seconds_to_ticks, ConfigError, UniverseConfig, TICK_INTERVAL_MS};
use crate::context::TickContext;
use crate::entity::{Body, Entity, EntityKind};
use crate::random::{RandomExt, SimRng};
use crate::vector::Vector2;

/// Default logical canvas size, used until the first advance or draw.
const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 600.0;

/// Lifetime of floating score labels, in seconds.
const SCORE_LABEL_SECONDS: f64 = 1.0;

/// Relative size of the "GAME OVER" label.
const GAME_OVER_REM: f64 = 2.0;

// =============================================================================
// Phase / Placement
// =============================================================================

/// Game state machine.
///
/// `Inactive` → `Playing` (via [`Universe::start`]) → `RespawnPending` on
/// ship loss with lives left, back to `Playing` when the timer fires, or
/// `GameOver` on the last loss, then `Inactive` after the end delay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No game running.
    Inactive,
    /// Ship in play, or the first ship pending after start.
    Playing,
    /// Ship lost, lives remain, waiting for the restart delay.
    RespawnPending,
    /// Last ship lost, waiting for the end delay.
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inactive => "Inactive",
            Self::Playing => "Playing",
            Self::RespawnPending => "RespawnPending",
            Self::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}

/// Where to put a newly added entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Random point in the off-screen band along a random edge.
    Kuiper,
    /// Canvas centre.
    Center,
    /// Horizontally centred, a quarter of the way down.
    Upper,
    /// Horizontally centred, three quarters of the way down.
    Lower,
}

// =============================================================================
// Universe
// =============================================================================

/// Registry of every live entity plus game bookkeeping.
#[derive(Debug)]
pub struct Universe {
    rng: SimRng,
    seed: u64,
    world: World,
}

/// Everything except the generator, so a [`TickContext`] can borrow the
/// generator while the step mutates the rest.
#[derive(Debug)]
struct World {
    config: UniverseConfig,
    entities: Arena<Entity>,
    ship: Option<EntityId>,
    phase: Phase,
    tick: u64,
    timer: Option<u64>,
    lives: u32,
    deaths: u32,
    score: u64,
    hi_score: u64,
    width: f64,
    height: f64,
}

impl Universe {
    /// Creates an inactive universe with default tunables.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(UniverseConfig::default(), seed)
    }

    /// Creates an inactive universe after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a tunable is out of range.
    pub fn with_config(config: UniverseConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Skips validation; callers have already validated `config`.
    pub(crate) fn build(config: UniverseConfig, seed: u64) -> Self {
        Self {
            rng: SimRng::seed_from_u64(seed),
            seed,
            world: World {
                config,
                entities: Arena::new(),
                ship: None,
                phase: Phase::Inactive,
                tick: 0,
                timer: None,
                lives: 0,
                deaths: 0,
                score: 0,
                hi_score: 0,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
        }
    }

    /// Starts a new game with `lives` (at least one).
    ///
    /// Clears every entity, resets score and tick, and schedules the first
    /// ship after the restart delay. High score and death count carry over.
    pub fn start(&mut self, lives: u32) {
        let w = &mut self.world;
        w.entities.clear();
        w.ship = None;
        w.lives = lives.max(1);
        w.tick = 0;
        w.score = 0;
        w.phase = Phase::Playing;
        w.timer = Some(seconds_to_ticks(w.config.restart_delay_secs));
        info!(lives = w.lives, seed = self.seed, "game started");
    }

    /// Runs one tick against `canvas`.
    pub fn advance(&mut self, canvas: &mut dyn Canvas) {
        self.world.width = canvas.width();
        self.world.height = canvas.height();

        let ship_present = self.world.ship_alive();
        let mut ctx = TickContext::new(
            &mut self.rng,
            self.world.width,
            self.world.height,
            ship_present,
        );
        self.world.step(&mut ctx);

        for command in ctx.take_sounds() {
            command.apply(canvas);
        }
    }

    /// Draws a uniform value in `[0, 1)` from this universe's generator.
    pub fn random(&mut self) -> f64 {
        self.rng.unit()
    }

    /// Draws every entity and the HUD.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        self.world.width = canvas.width();
        self.world.height = canvas.height();
        canvas.begin_draw();
        for entity in self.world.entities.values() {
            entity.draw(canvas);
        }
        self.world.draw_hud(canvas);
        canvas.end_draw();
    }

    /// Inserts `entity` as is. A ship added while no ship is registered
    /// becomes the player ship.
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let is_ship = entity.kind() == EntityKind::Ship;
        let id = self.world.entities.spawn(entity);
        if is_ship && !self.world.ship_alive() {
            self.world.ship = Some(id);
        }
        id
    }

    /// Inserts `entity` at `placement`.
    pub fn add_at(&mut self, mut entity: Entity, placement: Placement) -> EntityId {
        let pos = self.world.place(placement, &mut self.rng);
        entity.set_position(pos);
        self.add(entity)
    }

    /// Adds a label of relative size `rem` lasting `seconds` (zero or
    /// negative for unbounded).
    pub fn add_label(
        &mut self,
        text: impl Into<String>,
        seconds: f64,
        rem: f64,
        placement: Placement,
    ) -> EntityId {
        let mut label = Entity::label(text, seconds);
        if let Some(state) = label.as_label_mut() {
            state.rem = rem;
        }
        self.add_at(label, placement)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Ticks since the last [`Universe::start`].
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.world.tick
    }

    /// Seed the generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tunables in effect.
    #[must_use]
    pub fn config(&self) -> &UniverseConfig {
        &self.world.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.world.phase
    }

    /// True when no game is running.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.world.phase == Phase::Inactive
    }

    /// Lives left, counting the ship in play.
    #[must_use]
    pub fn life_count(&self) -> u32 {
        self.world.lives
    }

    /// Ships lost over the lifetime of this universe.
    #[must_use]
    pub fn death_count(&self) -> u32 {
        self.world.deaths
    }

    /// Score of the current game.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.world.score
    }

    /// Best score seen by this universe.
    #[must_use]
    pub fn hi_score(&self) -> u64 {
        self.world.hi_score
    }

    /// Live entity count.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.world.entities.len()
    }

    /// Live entities of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.world
            .entities
            .values()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// Rock spawn scaling in `[0, 1)`, 0.5 at the mid-difficulty time.
    #[must_use]
    pub fn difficulty(&self) -> f64 {
        self.world.difficulty()
    }

    /// Player ship handle, if the ship is alive.
    #[must_use]
    pub fn ship_id(&self) -> Option<EntityId> {
        self.world.ship.filter(|id| self.world.entities.contains(*id))
    }

    /// Player ship, if alive.
    #[must_use]
    pub fn ship(&self) -> Option<&Entity> {
        self.world.ship.and_then(|id| self.world.entities.get(id))
    }

    /// Mutable player ship, for control input.
    #[must_use]
    pub fn ship_mut(&mut self) -> Option<&mut Entity> {
        self.world.ship.and_then(|id| self.world.entities.get_mut(id))
    }

    /// Entity behind `id`, if still live.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.world.entities.get(id)
    }

    /// Mutable entity behind `id`, if still live.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.world.entities.get_mut(id)
    }

    /// Live entities with their handles, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.world.entities.iter()
    }
}

// =============================================================================
// Tick pipeline
// =============================================================================

impl World {
    fn ship_alive(&self) -> bool {
        self.ship.is_some_and(|id| self.entities.contains(id))
    }

    fn difficulty(&self) -> f64 {
        let mid_ticks = self.config.mid_difficulty_secs * 1000.0 / f64::from(TICK_INTERVAL_MS);
        #[allow(clippy::cast_precision_loss)]
        let t = self.tick as f64;
        1.0 - 1.0 / (1.0 + t / mid_ticks)
    }

    fn step(&mut self, ctx: &mut TickContext<'_>) {
        // TIMER
        if let Some(due) = self.timer {
            if self.tick > due {
                if self.lives > 0 {
                    self.restart(ctx);
                } else {
                    self.timer = None;
                    self.phase = Phase::Inactive;
                    info!(score = self.score, hi_score = self.hi_score, "game over");
                }
            }
        }

        // SNAPSHOT
        let snapshot: Vec<(EntityId, Body)> = self
            .entities
            .iter()
            .map(|(id, entity)| (id, entity.body()))
            .collect();
        for entity in self.entities.values_mut() {
            entity.begin_tick();
        }

        // COLLIDE
        self.collide(&snapshot, ctx);

        // ADVANCE + FLUSH
        let ufo_count = self.advance_entities(&snapshot, ctx);

        // SPAWN
        self.spawn_random(ufo_count, ctx);

        trace!(
            tick = self.tick,
            entities = self.entities.len(),
            ufos = ufo_count,
            "tick complete"
        );
        self.tick += 1;
    }

    fn collide(&mut self, snapshot: &[(EntityId, Body)], ctx: &mut TickContext<'_>) {
        for (i, (id, _)) in snapshot.iter().enumerate() {
            for (j, (_, other)) in snapshot.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(entity) = self.entities.get_mut(*id) else {
                    continue;
                };
                if !entity.crunch(other, ctx.rng()) {
                    continue;
                }
                if other.kind == EntityKind::Bullet && entity.score() > 0 {
                    let points = entity.score();
                    let mut label = Entity::label(points.to_string(), SCORE_LABEL_SECONDS);
                    label.set_position(entity.position());
                    label.set_velocity(entity.velocity());
                    let victim = entity.kind();
                    ctx.spawn(label);
                    self.award(points);
                    debug!(%victim, points, score = self.score, "scored");
                }
            }
        }
    }

    fn award(&mut self, points: u32) {
        self.score += u64::from(points);
        self.hi_score = self.hi_score.max(self.score);
    }

    /// Advances the snapshot, then everything queued during the tick, until
    /// the queue is empty. The dead are despawned and survivors wrapped.
    /// Returns the number of surviving UFOs.
    fn advance_entities(&mut self, snapshot: &[(EntityId, Body)], ctx: &mut TickContext<'_>) -> u32 {
        let mut ufo_count = 0;
        for (id, _) in snapshot {
            ufo_count += self.advance_one(*id, ctx);
        }

        let mut queued = ctx.take_spawned();
        while !queued.is_empty() {
            for entity in queued {
                let id = self.entities.spawn(entity);
                ufo_count += self.advance_one(id, ctx);
            }
            queued = ctx.take_spawned();
        }
        ufo_count
    }

    /// Advances one entity. Returns 1 if it is a UFO that survived.
    fn advance_one(&mut self, id: EntityId, ctx: &mut TickContext<'_>) -> u32 {
        let Some(entity) = self.entities.get_mut(id) else {
            return 0;
        };
        if entity.advance(ctx) {
            wrap(entity, self.width, self.height, self.config.kuiper_zone);
            u32::from(entity.kind() == EntityKind::Ufo)
        } else {
            self.entities.despawn(id);
            if self.ship == Some(id) {
                self.ship_lost(ctx);
            }
            0
        }
    }

    fn ship_lost(&mut self, ctx: &mut TickContext<'_>) {
        self.ship = None;
        ctx.set_ship_present(false);
        self.lives = self.lives.saturating_sub(1);
        self.deaths += 1;

        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.timer = Some(self.tick + seconds_to_ticks(self.config.game_end_delay_secs));
            ctx.play_sound(SoundId::IntroMusic, SoundMode::Once);
            let mut label = Entity::label("GAME OVER", -1.0);
            if let Some(state) = label.as_label_mut() {
                state.rem = GAME_OVER_REM;
            }
            label.set_position(self.place(Placement::Center, ctx.rng()));
            ctx.spawn(label);
            info!(deaths = self.deaths, score = self.score, "last ship lost");
        } else {
            self.phase = Phase::RespawnPending;
            self.timer = Some(self.tick + seconds_to_ticks(self.config.restart_delay_secs));
            info!(lives = self.lives, deaths = self.deaths, "ship lost");
        }
    }

    /// Clears the field and brings in a new ship with a fresh rock batch
    /// sized by how many ships have been lost.
    fn restart(&mut self, ctx: &mut TickContext<'_>) {
        self.entities.clear();
        self.ship = None;
        self.timer = None;
        ctx.play_sound(SoundId::Start, SoundMode::Once);

        let start = self.config.start_rocks;
        let count = restart_batch(start, self.deaths);
        let speed = self.config.max_rock_speed * (0.2 + f64::from(self.deaths) / 10.0);
        for _ in 0..count {
            let velocity = ctx.rng().vector_within(speed);
            let mut rock = Entity::big_rock(ctx.rng());
            rock.set_velocity(velocity);
            rock.set_position(self.place(Placement::Kuiper, ctx.rng()));
            self.entities.spawn(rock);
        }

        let mut ship = Entity::ship();
        ship.set_position(self.place(Placement::Center, ctx.rng()));
        self.ship = Some(self.entities.spawn(ship));
        ctx.set_ship_present(true);
        self.phase = Phase::Playing;
        info!(rocks = count, lives = self.lives, "ship launched");
    }

    fn spawn_random(&mut self, ufo_count: u32, ctx: &mut TickContext<'_>) {
        let difficulty = self.difficulty();
        if ctx.rng().unit() < self.config.rock_chance_per_tick() * difficulty {
            let velocity = ctx.rng().vector_within(self.config.max_rock_speed * difficulty);
            let mut rock = Entity::big_rock(ctx.rng());
            rock.set_velocity(velocity);
            rock.set_position(self.place(Placement::Kuiper, ctx.rng()));
            self.entities.spawn(rock);
            debug!(tick = self.tick, difficulty, "rock spawned");
        }

        if ufo_count < self.config.max_ufo_count
            && ctx.rng().unit() < self.config.ufo_chance_per_tick()
        {
            let mut ufo = Entity::ufo();
            ufo.set_position(self.place(Placement::Kuiper, ctx.rng()));
            self.entities.spawn(ufo);
            debug!(tick = self.tick, ufos = ufo_count + 1, "ufo spawned");
        }
    }

    fn place(&self, placement: Placement, rng: &mut SimRng) -> Vector2 {
        let (cx, cy) = (self.width, self.height);
        match placement {
            Placement::Kuiper => {
                let k = self.config.kuiper_zone;
                let r = rng.unit();
                if r < 0.25 {
                    let x = -k * rng.between(0.2, 0.8) * cx;
                    Vector2::new(x, rng.between(0.0, cy))
                } else if r < 0.5 {
                    let x = cx + k * rng.between(0.2, 0.8) * cx;
                    Vector2::new(x, rng.between(0.0, cy))
                } else if r < 0.75 {
                    let x = rng.between(0.0, cx);
                    Vector2::new(x, -k * rng.between(0.2, 0.8) * cy)
                } else {
                    let x = rng.between(0.0, cx);
                    Vector2::new(x, cy + k * rng.between(0.2, 0.8) * cy)
                }
            }
            Placement::Center => Vector2::new(cx / 2.0, cy / 2.0),
            Placement::Upper => Vector2::new(cx / 2.0, cy / 4.0),
            Placement::Lower => Vector2::new(cx / 2.0, cy * 3.0 / 4.0),
        }
    }

    fn draw_hud(&self, canvas: &mut dyn Canvas) {
        let cx = canvas.width();
        let cy = canvas.height();
        let sx = (cx * 0.01).max(2.0);
        let sy = (cy * 0.01).max(2.0);

        canvas.draw_text(
            Vector2::new(sx, sy),
            AlignHorz::Left,
            AlignVert::Top,
            1.0,
            &format!("SCORE {}", self.score),
        );
        canvas.draw_text(
            Vector2::new(cx - sx, sy),
            AlignHorz::Right,
            AlignVert::Top,
            1.0,
            &format!("HISCORE {}", self.hi_score),
        );
        let charge = self
            .ship
            .and_then(|id| self.entities.get(id))
            .and_then(Entity::as_ship)
            .map(|ship| ship.charge());
        if let Some(charge) = charge {
            canvas.draw_text(
                Vector2::new(sx, cy - sy),
                AlignHorz::Left,
                AlignVert::Bottom,
                1.0,
                &"|".repeat(charge as usize),
            );
        }
        canvas.draw_text(
            Vector2::new(cx - sx, cy - sy),
            AlignHorz::Right,
            AlignVert::Bottom,
            1.0,
            &format!("SHIPS {}", self.lives),
        );
    }
}

/// Big rocks brought in with a new ship: half a start batch more per ship
/// lost so far.
fn restart_batch(start_rocks: u32, deaths: u32) -> u32 {
    start_rocks.saturating_add(start_rocks.saturating_mul(deaths) / 2)
}

/// Wraps `entity` around the canvas. Ships and bullets wrap as soon as they
/// clear the visible edge; everything else roams the Kuiper band first.
fn wrap(entity: &mut Entity, width: f64, height: f64, kuiper: f64) {
    let (mx, my) = if entity.kind().is_deep_roaming() {
        (kuiper * width, kuiper * height)
    } else {
        (entity.radius(), entity.radius())
    };

    let mut pos = entity.position();
    if pos.x < -mx {
        pos.x = width + mx;
    } else if pos.x > width + mx {
        pos.x = -mx;
    }
    if pos.y < -my {
        pos.y = height + my;
    } else if pos.y > height + my {
        pos.y = -my;
    }
    entity.set_position(pos);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::NullCanvas;
    use crate::tests::helpers::{CanvasEvent, RecordingCanvas};

    fn quiet_config() -> UniverseConfig {
        UniverseConfig {
            start_rocks: 0,
            max_rocks_per_second: 0.0,
            max_ufos_per_second: 0.0,
            ..UniverseConfig::default()
        }
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn new_universe_is_inactive() {
            let universe = Universe::new(1);
            assert_eq!(universe.phase(), Phase::Inactive);
            assert!(universe.game_over());
            assert_eq!(universe.entity_count(), 0);
            assert!(universe.ship().is_none());
        }

        #[test]
        fn invalid_config_rejected() {
            let config = UniverseConfig {
                lives: 0,
                ..UniverseConfig::default()
            };
            assert!(Universe::with_config(config, 1).is_err());
        }

        #[test]
        fn start_clamps_lives_and_schedules_ship() {
            let mut universe = Universe::new(1);
            universe.start(0);
            assert_eq!(universe.life_count(), 1);
            assert_eq!(universe.phase(), Phase::Playing);
            assert!(!universe.game_over());
        }
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn first_ship_arrives_after_restart_delay() {
            let mut canvas = RecordingCanvas::new();
            let config = UniverseConfig {
                start_rocks: 12,
                max_rock_speed: 0.0,
                ..quiet_config()
            };
            let mut universe = Universe::with_config(config, 7).unwrap();
            universe.start(3);
            // Timer is 80 ticks; fires on the tick where tick > 80.
            for _ in 0..81 {
                universe.advance(&mut canvas);
            }
            assert!(universe.ship().is_none());
            universe.advance(&mut canvas);
            assert!(universe.ship().is_some());
            assert_eq!(universe.count_of(EntityKind::BigRock), 12);
            assert!(canvas
                .events
                .contains(&CanvasEvent::Play(SoundId::Start, SoundMode::Once)));
        }

        #[test]
        fn ship_at_centre() {
            let mut canvas = NullCanvas::default();
            let mut universe = Universe::with_config(quiet_config(), 7).unwrap();
            universe.start(3);
            for _ in 0..82 {
                universe.advance(&mut canvas);
            }
            let ship = universe.ship().unwrap();
            assert_eq!(ship.position(), Vector2::new(400.0, 300.0));
        }

        #[test]
        fn losing_a_life_schedules_respawn() {
            let mut canvas = NullCanvas::default();
            let mut universe = Universe::with_config(quiet_config(), 7).unwrap();
            universe.start(2);
            for _ in 0..82 {
                universe.advance(&mut canvas);
            }
            universe.ship_mut().unwrap().kill();
            universe.advance(&mut canvas);

            assert!(universe.ship().is_none());
            assert_eq!(universe.phase(), Phase::RespawnPending);
            assert_eq!(universe.life_count(), 1);
            assert_eq!(universe.death_count(), 1);

            for _ in 0..81 {
                universe.advance(&mut canvas);
            }
            assert!(universe.ship().is_some());
            assert_eq!(universe.phase(), Phase::Playing);
        }
    }

    mod wrap_tests {
        use super::*;

        #[test]
        fn tight_wrap_for_ship() {
            let mut ship = Entity::ship();
            let r = ship.radius();
            ship.set_position(Vector2::new(800.0 + r + 0.5, 100.0));
            wrap(&mut ship, 800.0, 600.0, 0.2);
            assert_eq!(ship.position(), Vector2::new(-r, 100.0));
        }

        #[test]
        fn deep_wrap_for_rock() {
            let mut rng = SimRng::seed_from_u64(1);
            let mut rock = Entity::small_rock(&mut rng);
            rock.set_position(Vector2::new(900.0, 100.0));
            wrap(&mut rock, 800.0, 600.0, 0.2);
            assert_eq!(rock.position(), Vector2::new(900.0, 100.0));

            rock.set_position(Vector2::new(961.0, -121.0));
            wrap(&mut rock, 800.0, 600.0, 0.2);
            assert_eq!(rock.position(), Vector2::new(-160.0, 720.0));
        }
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn kuiper_placement_is_off_screen() {
            let universe = Universe::new(3);
            let mut rng = SimRng::seed_from_u64(3);
            for _ in 0..200 {
                let p = universe.world.place(Placement::Kuiper, &mut rng);
                let off_x = p.x < 0.0 || p.x > 800.0;
                let off_y = p.y < 0.0 || p.y > 600.0;
                assert!(off_x || off_y);
                assert!(p.x >= -160.0 && p.x <= 960.0);
                assert!(p.y >= -120.0 && p.y <= 720.0);
            }
        }

        #[test]
        fn fixed_placements() {
            let universe = Universe::new(3);
            let mut rng = SimRng::seed_from_u64(3);
            assert_eq!(universe.world.place(Placement::Upper, &mut rng), Vector2::new(400.0, 150.0));
            assert_eq!(universe.world.place(Placement::Lower, &mut rng), Vector2::new(400.0, 450.0));
        }
    }

    mod spawn_tests {
        use super::*;

        fn in_kuiper_band(p: Vector2) -> bool {
            let off_screen = p.x < 0.0 || p.x > 800.0 || p.y < 0.0 || p.y > 600.0;
            let in_band = (-160.0..=960.0).contains(&p.x) && (-120.0..=720.0).contains(&p.y);
            off_screen && in_band
        }

        #[test]
        fn ufo_count_is_capped() {
            let mut canvas = NullCanvas::default();
            let config = UniverseConfig {
                max_ufos_per_second: 40.0,
                max_ufo_count: 4,
                ..quiet_config()
            };
            let mut universe = Universe::with_config(config, 5).unwrap();

            let mut most = 0;
            for _ in 0..300 {
                universe.advance(&mut canvas);
                let ufos = universe.count_of(EntityKind::Ufo);
                assert!(ufos <= 4);
                most = most.max(ufos);
            }
            assert_eq!(most, 4);
        }

        #[test]
        fn difficulty_scales_rocks_not_ufos() {
            let mut canvas = NullCanvas::default();
            let config = UniverseConfig {
                max_rocks_per_second: 40.0,
                max_ufos_per_second: 40.0,
                ..quiet_config()
            };
            let mut universe = Universe::with_config(config, 5).unwrap();
            assert!(universe.difficulty().abs() < f64::EPSILON);

            universe.advance(&mut canvas);
            assert_eq!(universe.count_of(EntityKind::BigRock), 0);
            assert_eq!(universe.count_of(EntityKind::Ufo), 1);
        }

        #[test]
        fn spawns_appear_in_kuiper_band() {
            let mut canvas = NullCanvas::default();
            let config = UniverseConfig {
                max_rocks_per_second: 40.0,
                max_ufos_per_second: 40.0,
                max_ufo_count: 1,
                ..quiet_config()
            };
            let mut universe = Universe::with_config(config, 9).unwrap();
            universe.world.tick = 3_000_000;

            let mut seen = Vec::new();
            for _ in 0..20 {
                universe.advance(&mut canvas);
                let fresh: Vec<(EntityId, Vector2)> = universe
                    .entities()
                    .filter(|(id, e)| {
                        matches!(e.kind(), EntityKind::BigRock | EntityKind::Ufo) && !seen.contains(id)
                    })
                    .map(|(id, e)| (id, e.position()))
                    .collect();
                for (id, pos) in fresh {
                    assert!(in_kuiper_band(pos), "{pos:?} outside the band");
                    seen.push(id);
                }
            }
            assert!(universe.count_of(EntityKind::BigRock) > 0);
            assert_eq!(universe.count_of(EntityKind::Ufo), 1);
        }
    }

    mod restart_batch_tests {
        use super::*;

        #[test]
        fn grows_by_half_a_batch_per_death() {
            assert_eq!(restart_batch(4, 0), 4);
            assert_eq!(restart_batch(4, 1), 6);
            assert_eq!(restart_batch(4, 3), 10);
        }

        #[test]
        fn saturates_instead_of_overflowing() {
            assert_eq!(restart_batch(u32::MAX, 3), u32::MAX);
            assert_eq!(restart_batch(10, u32::MAX), 10 + u32::MAX / 2);
        }
    }

    mod difficulty_tests {
        use super::*;

        #[test]
        fn difficulty_curve() {
            let mut universe = Universe::new(1);
            assert!(universe.difficulty().abs() < f64::EPSILON);
            universe.world.tick = 3000;
            assert!((universe.difficulty() - 0.5).abs() < 1e-12);
            universe.world.tick = 3_000_000;
            assert!(universe.difficulty() < 1.0);
            assert!(universe.difficulty() > 0.99);
        }
    }

    mod draw_tests {
        use super::*;

        #[test]
        fn hud_shows_score_and_ships() {
            let mut canvas = RecordingCanvas::new();
            let mut universe = Universe::new(1);
            universe.start(3);
            universe.draw(&mut canvas);
            let texts = canvas.texts();
            assert!(texts.contains(&"SCORE 0".to_string()));
            assert!(texts.contains(&"HISCORE 0".to_string()));
            assert!(texts.contains(&"SHIPS 3".to_string()));
            assert_eq!(canvas.events.first(), Some(&CanvasEvent::Begin));
            assert_eq!(canvas.events.last(), Some(&CanvasEvent::End));
        }

        #[test]
        fn hud_shows_charge_bars_with_ship() {
            let mut canvas = RecordingCanvas::new();
            let mut universe = Universe::new(1);
            universe.add_at(Entity::ship(), Placement::Center);
            universe.draw(&mut canvas);
            assert!(canvas.texts().contains(&"||||||||".to_string()));
        }
    }
}
