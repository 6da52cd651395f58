//! Per-tick side-effect collector.
//!
//! Entities never touch the registry or the canvas directly. During a tick
//! they read the canvas bounds and ship presence from a [`TickContext`], draw
//! random numbers from the universe generator through it, and push spawned
//! entities and sound commands into it. The universe inserts and advances
//! queued entities within the same pass, but never collides them in the tick
//! that created them. Sounds go to the canvas at the end of the tick.

use crate::canvas::{Canvas, SoundId, SoundMode};
use crate::entity::Entity;
use crate::random::SimRng;
use crate::vector::Vector2;

/// A sound request queued during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCommand {
    /// Start a sound.
    Play(SoundId, SoundMode),
    /// Stop a sound.
    Stop(SoundId),
}

impl SoundCommand {
    /// Sends the command to a canvas.
    pub fn apply(self, canvas: &mut dyn Canvas) {
        match self {
            Self::Play(id, mode) => canvas.play_sound(id, mode),
            Self::Stop(id) => canvas.stop_sound(id),
        }
    }
}

/// Borrowed view of the universe handed to entities for one tick.
#[derive(Debug)]
pub struct TickContext<'a> {
    rng: &'a mut SimRng,
    width: f64,
    height: f64,
    ship_present: bool,
    spawned: Vec<Entity>,
    sounds: Vec<SoundCommand>,
}

impl<'a> TickContext<'a> {
    /// Creates a context over a `width` x `height` canvas.
    pub fn new(rng: &'a mut SimRng, width: f64, height: f64, ship_present: bool) -> Self {
        Self {
            rng,
            width,
            height,
            ship_present,
            spawned: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// The universe generator.
    pub fn rng(&mut self) -> &mut SimRng {
        self.rng
    }

    /// Canvas width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whether the player ship is alive.
    #[must_use]
    pub fn ship_present(&self) -> bool {
        self.ship_present
    }

    pub(crate) fn set_ship_present(&mut self, present: bool) {
        self.ship_present = present;
    }

    /// True if a circle of radius `r` at `pos` touches the visible canvas.
    #[must_use]
    pub fn in_view(&self, pos: Vector2, r: f64) -> bool {
        pos.x > -r && pos.y > -r && pos.x < self.width + r && pos.y < self.height + r
    }

    /// Queues an entity for insertion later in the advance pass.
    pub fn spawn(&mut self, entity: Entity) {
        self.spawned.push(entity);
    }

    /// Queues a sound start.
    pub fn play_sound(&mut self, id: SoundId, mode: SoundMode) {
        self.sounds.push(SoundCommand::Play(id, mode));
    }

    /// Queues a sound stop.
    pub fn stop_sound(&mut self, id: SoundId) {
        self.sounds.push(SoundCommand::Stop(id));
    }

    /// Entities queued so far.
    #[must_use]
    pub fn spawned(&self) -> &[Entity] {
        &self.spawned
    }

    /// Sound commands queued so far.
    #[must_use]
    pub fn sounds(&self) -> &[SoundCommand] {
        &self.sounds
    }

    /// Removes and returns the queued entities.
    pub fn take_spawned(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.spawned)
    }

    /// Removes and returns the queued sound commands.
    pub fn take_sounds(&mut self) -> Vec<SoundCommand> {
        std::mem::take(&mut self.sounds)
    }
}
