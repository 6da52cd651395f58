//! Drawing and audio collaborator.
//!
//! The core never touches pixels or sound files. Everything visible or
//! audible goes through a [`Canvas`]: line segments, aligned text, and sound
//! commands. Two implementations ship with the crate:
//!
//! - [`ScaledCanvas`] wraps a device canvas and presents it as a logical game
//!   space of constant area, so game physics do not depend on window size.
//! - [`NullCanvas`] has a fixed size and discards everything (headless runs).

use serde::{Deserialize, Serialize};

use crate::vector::Vector2;

/// Logical area presented by [`ScaledCanvas`], in game units squared.
pub const GAME_AREA: f64 = 800.0 * 600.0;

// =============================================================================
// Sound and alignment enums
// =============================================================================

/// Sounds the simulation can request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    /// Attract and game-over music.
    IntroMusic,
    /// New ship entering play.
    Start,
    /// Big rock breaking up.
    BigExplosion,
    /// Medium rock breaking up.
    MediumExplosion,
    /// Small rock, ship or UFO breaking up.
    SmallExplosion,
    /// Ship engine, looped while thrusting.
    Thrust,
    /// Ship gun.
    GunFire,
}

/// How a sound request interacts with an already-playing instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundMode {
    /// Fire and forget.
    Once,
    /// Restart from the beginning if already playing.
    Restart,
    /// Loop until stopped.
    Loop,
}

/// Horizontal text anchor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignHorz {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignVert {
    /// Top of the text at the anchor.
    Top,
    /// Text is centered on the anchor.
    Middle,
    /// Bottom of the text at the anchor.
    Bottom,
}

// =============================================================================
// Canvas trait
// =============================================================================

/// Drawing surface and sound sink consumed by the simulation.
///
/// All coordinates are in the canvas' own units. `draw_text` returns the
/// rendered height so callers can stack lines.
pub trait Canvas {
    /// Canvas width.
    fn width(&self) -> f64;

    /// Canvas height.
    fn height(&self) -> f64;

    /// Opens a frame.
    fn begin_draw(&mut self) {}

    /// Closes a frame.
    fn end_draw(&mut self) {}

    /// Draws a line segment.
    fn draw_line(&mut self, from: Vector2, to: Vector2);

    /// Draws text anchored at `pos`. `rem` is a size relative to the default
    /// font. Returns the rendered height.
    fn draw_text(
        &mut self,
        pos: Vector2,
        horz: AlignHorz,
        vert: AlignVert,
        rem: f64,
        text: &str,
    ) -> f64;

    /// Starts a sound.
    fn play_sound(&mut self, id: SoundId, mode: SoundMode);

    /// Stops a sound if it is playing.
    fn stop_sound(&mut self, id: SoundId);
}

// =============================================================================
// NullCanvas
// =============================================================================

/// Canvas of fixed size that ignores drawing and sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullCanvas {
    width: f64,
    height: f64,
}

impl NullCanvas {
    /// Creates a null canvas with the given logical size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for NullCanvas {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Canvas for NullCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn draw_line(&mut self, _from: Vector2, _to: Vector2) {}

    fn draw_text(
        &mut self,
        _pos: Vector2,
        _horz: AlignHorz,
        _vert: AlignVert,
        rem: f64,
        _text: &str,
    ) -> f64 {
        rem * 16.0
    }

    fn play_sound(&mut self, _id: SoundId, _mode: SoundMode) {}

    fn stop_sound(&mut self, _id: SoundId) {}
}

// =============================================================================
// ScaledCanvas
// =============================================================================

/// Presents a device canvas as a logical space of constant area.
///
/// The logical width and height follow the device's aspect ratio while their
/// product stays [`GAME_AREA`]. Line and text coordinates are multiplied by
/// the scale on the way down; text height is divided on the way back.
/// Sound requests are dropped while sound is off; stop requests always pass.
pub struct ScaledCanvas<'a, C: Canvas + ?Sized> {
    inner: &'a mut C,
    width: f64,
    height: f64,
    scale: f64,
    sound_on: bool,
}

impl<'a, C: Canvas + ?Sized> ScaledCanvas<'a, C> {
    /// Wraps `inner`, computing the logical size from its current dimensions.
    ///
    /// A degenerate device (zero, negative or non-finite size) falls back to
    /// scale 1.0 and an 800x600 logical space.
    pub fn new(inner: &'a mut C, sound_on: bool) -> Self {
        let dev_w = inner.width();
        let dev_h = inner.height();
        let (width, height, scale) = Self::fit(dev_w, dev_h);
        Self {
            inner,
            width,
            height,
            scale,
            sound_on,
        }
    }

    fn fit(dev_w: f64, dev_h: f64) -> (f64, f64, f64) {
        if !(dev_w > 0.0 && dev_h > 0.0 && dev_w.is_finite() && dev_h.is_finite()) {
            return (800.0, 600.0, 1.0);
        }
        let ratio = dev_w / dev_h;
        let width = (ratio * GAME_AREA).sqrt();
        let height = width / ratio;
        let scale = ((dev_w * dev_h) / (width * height)).sqrt();
        if scale.is_finite() && scale > 0.0 {
            (width, height, scale)
        } else {
            (800.0, 600.0, 1.0)
        }
    }

    /// Device units per logical unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether `play_sound` reaches the device.
    #[must_use]
    pub fn sound_on(&self) -> bool {
        self.sound_on
    }
}

impl<C: Canvas + ?Sized> Canvas for ScaledCanvas<'_, C> {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn begin_draw(&mut self) {
        self.inner.begin_draw();
    }

    fn end_draw(&mut self) {
        self.inner.end_draw();
    }

    fn draw_line(&mut self, from: Vector2, to: Vector2) {
        self.inner.draw_line(from * self.scale, to * self.scale);
    }

    fn draw_text(
        &mut self,
        pos: Vector2,
        horz: AlignHorz,
        vert: AlignVert,
        rem: f64,
        text: &str,
    ) -> f64 {
        let height = self
            .inner
            .draw_text(pos * self.scale, horz, vert, rem * self.scale, text);
        height / self.scale
    }

    fn play_sound(&mut self, id: SoundId, mode: SoundMode) {
        if self.sound_on {
            self.inner.play_sound(id, mode);
        }
    }

    fn stop_sound(&mut self, id: SoundId) {
        self.inner.stop_sound(id);
    }
}
