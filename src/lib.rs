//! Water Quest - A timed clean-water collecting arcade game
//!
//! Core modules:
//! - `sim`: Deterministic game loop (spawns, claims, combo, round timer)
//! - `presenter`: Display/audio collaborator contract and event dispatch
//! - `settings`: Player-facing preferences loaded from JSON
//! - `audio`: Web Audio sound effects (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod presenter;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use presenter::{GameSink, LogSink, SoundEffect, dispatch};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default number of grid slots (3x3)
    pub const DEFAULT_GRID_SLOTS: usize = 9;

    /// Round clock period (one decrement per second)
    pub const CLOCK_PERIOD_MS: u64 = 1000;

    /// Base points for a clean claim, before combo bonus
    pub const CLEAN_POINTS: i32 = 10;
    /// Combo bonus per combo step, capped at `MAX_COMBO_BONUS`
    pub const COMBO_BONUS_PER_STEP: u32 = 2;
    pub const MAX_COMBO_BONUS: u32 = 10;
    /// Penalty for claiming a contaminated container
    pub const DIRTY_POINTS: i32 = -5;
    /// Penalty for claiming a storm cloud
    pub const STORM_POINTS: i32 = -15;

    /// Every this many points serves one more person
    pub const POINTS_PER_PERSON: u32 = 10;

    /// End-screen confetti thresholds
    pub const CONFETTI_SCORE: u32 = 100;
    pub const DOUBLE_CONFETTI_SCORE: u32 = 200;

    /// How long on-screen overlays stay up, in milliseconds
    pub const FLOATING_SCORE_MS: i32 = 1000;
    pub const MILESTONE_BANNER_MS: i32 = 2000;
    pub const CONFETTI_MS: i32 = 3000;
    /// Pieces per confetti burst
    pub const CONFETTI_PIECES: usize = 100;
    pub const CONFETTI_COLORS: [&str; 4] = ["#FFC907", "#2E9DF7", "#8BD1CB", "#4FCB53"];
}
