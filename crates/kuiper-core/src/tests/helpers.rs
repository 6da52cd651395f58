//! Test doubles and setup utilities.
//!
//! [`RecordingCanvas`] captures every draw and sound call so tests can assert
//! on what the simulation asked the host to do. The factory functions build
//! universes with random spawning switched off, so a test only sees what it
//! places.

use crate::arena::EntityId;
use crate::canvas::{AlignHorz, AlignVert, Canvas, SoundId, SoundMode};
use crate::config::UniverseConfig;
use crate::entity::Entity;
use crate::universe::Universe;
use crate::vector::Vector2;

// =============================================================================
// Recording Canvas
// =============================================================================

/// One call made against a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// `begin_draw`
    Begin,
    /// `end_draw`
    End,
    /// `draw_line(from, to)`
    Line(Vector2, Vector2),
    /// `draw_text(..)`
    Text {
        pos: Vector2,
        horz: AlignHorz,
        vert: AlignVert,
        rem: f64,
        text: String,
    },
    /// `play_sound(id, mode)`
    Play(SoundId, SoundMode),
    /// `stop_sound(id)`
    Stop(SoundId),
}

/// Canvas that records every call in order.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    /// Calls received so far.
    pub events: Vec<CanvasEvent>,
}

impl RecordingCanvas {
    /// An 800 x 600 canvas.
    pub fn new() -> Self {
        Self::with_size(800.0, 600.0)
    }

    /// A canvas of the given device size.
    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            events: Vec::new(),
        }
    }

    /// Line segments drawn, in order.
    pub fn lines(&self) -> Vec<(Vector2, Vector2)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CanvasEvent::Line(a, b) => Some((*a, *b)),
                _ => None,
            })
            .collect()
    }

    /// Text strings drawn, in order.
    pub fn texts(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CanvasEvent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Play and stop calls, in order.
    pub fn sounds(&self) -> Vec<CanvasEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, CanvasEvent::Play(..) | CanvasEvent::Stop(_)))
            .cloned()
            .collect()
    }

    /// Number of times `id` was started.
    pub fn play_count(&self, id: SoundId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CanvasEvent::Play(s, _) if *s == id))
            .count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn begin_draw(&mut self) {
        self.events.push(CanvasEvent::Begin);
    }

    fn end_draw(&mut self) {
        self.events.push(CanvasEvent::End);
    }

    fn draw_line(&mut self, from: Vector2, to: Vector2) {
        self.events.push(CanvasEvent::Line(from, to));
    }

    fn draw_text(
        &mut self,
        pos: Vector2,
        horz: AlignHorz,
        vert: AlignVert,
        rem: f64,
        text: &str,
    ) -> f64 {
        self.events.push(CanvasEvent::Text {
            pos,
            horz,
            vert,
            rem,
            text: text.to_string(),
        });
        rem * 16.0
    }

    fn play_sound(&mut self, id: SoundId, mode: SoundMode) {
        self.events.push(CanvasEvent::Play(id, mode));
    }

    fn stop_sound(&mut self, id: SoundId) {
        self.events.push(CanvasEvent::Stop(id));
    }
}

// =============================================================================
// Universe Setup
// =============================================================================

/// Config with no start rocks and no random rock or UFO spawns.
pub fn quiet_config() -> UniverseConfig {
    UniverseConfig {
        start_rocks: 0,
        max_rocks_per_second: 0.0,
        max_ufos_per_second: 0.0,
        ..UniverseConfig::default()
    }
}

/// A started universe built from `config` whose first ship has already
/// launched.
pub fn launched_universe(config: UniverseConfig, lives: u32, seed: u64) -> Universe {
    let mut canvas = RecordingCanvas::new();
    let mut universe = Universe::with_config(config, seed).unwrap();
    universe.start(lives);
    while universe.ship().is_none() {
        universe.advance(&mut canvas);
    }
    universe
}

/// A quiet, started universe with its ship at the centre.
pub fn quiet_universe(lives: u32, seed: u64) -> Universe {
    launched_universe(quiet_config(), lives, seed)
}

// =============================================================================
// Entity Placement
// =============================================================================

/// Adds `entity` at `position` moving at `velocity`.
pub fn place(universe: &mut Universe, mut entity: Entity, position: Vector2, velocity: Vector2) -> EntityId {
    entity.set_position(position);
    entity.set_velocity(velocity);
    universe.add(entity)
}

/// Total momentum of every live entity.
pub fn total_momentum<'a>(entities: impl Iterator<Item = &'a Entity>) -> Vector2 {
    entities.map(|e| e.velocity() * e.mass()).sum()
}
