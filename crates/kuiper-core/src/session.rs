//! Player front: the game universe, the attract-mode demo, and key routing.
//!
//! A [`Session`] owns two independent universes. In [`Mode::Attract`] the
//! demo universe is flown by [`autopilot`] with sound muted and restarts
//! itself whenever its game ends. In [`Mode::Game`] key edges drive the
//! player ship, and the session drops back to attract once the game is over.

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::canvas::{Canvas, ScaledCanvas, SoundId};
use crate::config::{ConfigError, SessionConfig};
use crate::entity::{Entity, ShipState};
use crate::random::SimRng;
use crate::universe::{Placement, Universe};

const LABEL_REM: f64 = 2.0;
const NEW_GAME_SECONDS: f64 = 2.0;
const PAUSED_SECONDS: f64 = 0.1;

/// Which universe is active.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Demo universe under autopilot.
    Attract,
    /// Player game.
    Game,
}

/// Discrete input keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyId {
    /// Rotate anticlockwise while held.
    Left,
    /// Rotate clockwise while held.
    Right,
    /// Engine on while held.
    Thrust,
    /// Trigger while held; starts a game from attract mode.
    Fire,
    /// Toggle pause.
    Pause,
    /// Abandon the game.
    Quit,
    /// Toggle sound.
    Sound,
}

/// Random pilot used by the attract-mode demo.
///
/// `r` is a uniform draw in `[0, 1)`. Each band latches a different
/// combination of controls; draws of 0.6 and above leave them unchanged.
pub fn autopilot(ship: &mut ShipState, r: f64) {
    if r < 0.10 {
        ship.fire(true);
    } else if r < 0.15 {
        ship.rotate(-1);
        ship.thrust(false);
    } else if r < 0.30 {
        ship.rotate(1);
    } else if r < 0.45 {
        ship.rotate(0);
        ship.thrust(true);
    } else if r < 0.50 {
        ship.rotate(0);
        ship.fire(false);
    } else if r < 0.60 {
        ship.fire(false);
        ship.thrust(false);
    }
}

/// Game plus attract-mode demo, with pause and sound state.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    game: Universe,
    demo: Universe,
    mode: Mode,
    paused: bool,
    sound_on: bool,
    silence_pending: bool,
    game_autopilot: bool,
}

impl Session {
    /// Creates a session in attract mode with default settings.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(SessionConfig::default(), seed)
    }

    /// Creates a session after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any setting is out of range.
    pub fn with_config(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: SessionConfig, seed: u64) -> Self {
        // Separate streams so the demo never perturbs the game.
        let mut seeder = SimRng::seed_from_u64(seed);
        let game_seed: u64 = seeder.gen();
        let demo_seed: u64 = seeder.gen();

        Self {
            game: Universe::build(config.universe.clone(), game_seed),
            demo: Universe::build(config.universe.clone(), demo_seed),
            sound_on: config.sound_on,
            config,
            mode: Mode::Attract,
            paused: false,
            silence_pending: false,
            game_autopilot: false,
        }
    }

    /// Active mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a player game is active.
    #[must_use]
    pub fn in_play(&self) -> bool {
        self.mode == Mode::Game
    }

    /// True while the game is paused.
    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Whether game sound is enabled. The demo is always muted.
    #[must_use]
    pub fn sound_on(&self) -> bool {
        self.sound_on
    }

    /// Enables or disables game sound. Disabling also stops the intro music
    /// on the next advance.
    pub fn set_sound_on(&mut self, on: bool) {
        if self.sound_on && !on {
            self.silence_pending = true;
        }
        self.sound_on = on;
    }

    /// Lets the autopilot fly the player ship too.
    pub fn set_game_autopilot(&mut self, on: bool) {
        self.game_autopilot = on;
    }

    /// Settings in effect.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Player universe.
    #[must_use]
    pub fn game(&self) -> &Universe {
        &self.game
    }

    /// Mutable player universe.
    pub fn game_mut(&mut self) -> &mut Universe {
        &mut self.game
    }

    /// Attract-mode universe.
    #[must_use]
    pub fn demo(&self) -> &Universe {
        &self.demo
    }

    /// Universe for the current mode.
    #[must_use]
    pub fn active(&self) -> &Universe {
        match self.mode {
            Mode::Game => &self.game,
            Mode::Attract => &self.demo,
        }
    }

    /// Starts a fresh player game.
    pub fn start_game(&mut self) {
        self.mode = Mode::Game;
        self.paused = false;
        self.game.start(self.config.universe.lives);
        self.game
            .add_label("NEW GAME", NEW_GAME_SECONDS, LABEL_REM, Placement::Upper);
        info!(seed = self.game.seed(), "player game started");
    }

    /// Routes a key edge. Returns true when the key was consumed.
    pub fn key(&mut self, key: KeyId, down: bool) -> bool {
        match key {
            KeyId::Sound => {
                if down {
                    self.set_sound_on(!self.sound_on);
                }
                return true;
            }
            KeyId::Pause => {
                if down && self.mode == Mode::Game {
                    self.paused = !self.paused;
                    if self.paused {
                        self.game
                            .add_label("PAUSED", PAUSED_SECONDS, LABEL_REM, Placement::Upper);
                    }
                }
                return true;
            }
            KeyId::Quit => {
                if down && self.mode == Mode::Game {
                    self.mode = Mode::Attract;
                    self.paused = false;
                    info!(score = self.game.score(), "player quit");
                }
                return true;
            }
            _ => {}
        }

        if self.mode == Mode::Game {
            let Some(ship) = self.game.ship_mut().and_then(Entity::as_ship_mut) else {
                return false;
            };
            match key {
                KeyId::Left => ship.rotate(if down { -1 } else { 0 }),
                KeyId::Right => ship.rotate(if down { 1 } else { 0 }),
                KeyId::Thrust => ship.thrust(down),
                KeyId::Fire => ship.fire(down),
                _ => return false,
            }
            return true;
        }

        if key == KeyId::Fire {
            if down {
                self.start_game();
            }
            return true;
        }
        false
    }

    /// Advances the active universe by one tick.
    pub fn advance(&mut self, canvas: &mut dyn Canvas) {
        if self.silence_pending {
            self.silence_pending = false;
            canvas.stop_sound(SoundId::IntroMusic);
        }

        match self.mode {
            Mode::Game => {
                let mut scaled = ScaledCanvas::new(canvas, self.sound_on);
                if !self.paused {
                    if self.game_autopilot {
                        fly(&mut self.game);
                    }
                    self.game.advance(&mut scaled);
                }
                if self.game.game_over() {
                    self.mode = Mode::Attract;
                    self.paused = false;
                    info!(
                        score = self.game.score(),
                        hi_score = self.game.hi_score(),
                        "back to attract mode"
                    );
                }
            }
            Mode::Attract => {
                let mut scaled = ScaledCanvas::new(canvas, false);
                if self.demo.game_over() {
                    self.demo.start(self.config.demo_lives);
                    self.demo
                        .add_label("INSERT COIN", -1.0, LABEL_REM, Placement::Upper);
                }
                fly(&mut self.demo);
                self.demo.advance(&mut scaled);
            }
        }
    }

    /// Draws the active universe.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        let sound_on = self.sound_on && self.mode == Mode::Game;
        let mut scaled = ScaledCanvas::new(canvas, sound_on);
        match self.mode {
            Mode::Game => self.game.draw(&mut scaled),
            Mode::Attract => self.demo.draw(&mut scaled),
        }
    }
}

/// Applies one autopilot draw to the ship of `universe`, if it has one.
fn fly(universe: &mut Universe) {
    if universe.ship().is_none() {
        return;
    }
    let r = universe.random();
    if let Some(ship) = universe.ship_mut().and_then(Entity::as_ship_mut) {
        autopilot(ship, r);
    }
}
