//! # Kuiper Core
//!
//! Tick-driven simulation core for a vector-graphics asteroid shooter.
//!
//! This crate owns the whole game model: entities and their behaviors, the
//! [`Universe`] registry that advances them on a fixed 25 ms tick, and the
//! [`Session`] front that switches between a player game and a self-playing
//! attract-mode demo. Rendering and audio go through the [`Canvas`] trait, so
//! a host supplies a window or runs headless.
//!
//! ## Architecture
//!
//! - **Entities**: one record per body; ships, rocks, debris, sparks,
//!   bullets, UFOs, labels
//! - **Universe**: collide, advance, spawn, in a deterministic order
//! - **Canvas**: drawing and sound collaborator, with a scaling adapter
//!
//! Every universe owns a seeded generator. Two universes built from the same
//! seed and driven by the same inputs produce identical runs.
//!
//! ## Usage
//!
//! ```
//! use kuiper_core::{NullCanvas, Session, KeyId};
//!
//! let mut canvas = NullCanvas::default();
//! let mut session = Session::new(7);
//! session.key(KeyId::Fire, true);
//! for _ in 0..200 {
//!     session.advance(&mut canvas);
//!     session.draw(&mut canvas);
//! }
//! assert!(session.in_play());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod canvas;
pub mod config;
pub mod context;
pub mod entity;
pub mod random;
pub mod session;
pub mod universe;
pub mod vector;

#[cfg(test)]
mod tests;

pub use arena::{Arena, EntityId};
pub use canvas::{AlignHorz, AlignVert, Canvas, NullCanvas, ScaledCanvas, SoundId, SoundMode};
pub use config::{ConfigError, SessionConfig, UniverseConfig, TICK_INTERVAL_MS};
pub use context::{SoundCommand, TickContext};
pub use entity::{Entity, EntityKind};
pub use session::{KeyId, Mode, Session};
pub use universe::{Phase, Placement, Universe};
pub use vector::{Vector2, VectorExt};
