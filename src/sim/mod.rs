//! Deterministic game loop module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual millisecond clock only (the front end feeds elapsed time)
//! - Seeded RNG only
//! - Stable timer order (due time, then timer id)
//! - No rendering or platform dependencies

pub mod config;
pub mod game;
pub mod milestones;
pub mod scheduler;
pub mod scoring;
pub mod state;
pub mod tick;

pub use config::{Difficulty, RoundConfig};
pub use game::{GameEvent, GameLoop, GameTimer};
pub use milestones::{Celebration, EndSummary, MILESTONES, Milestone, check_milestone};
pub use scheduler::{Scheduler, TimerId};
pub use scoring::{ClaimResolution, accuracy, apply_claim, format_delta, resolve_claim};
pub use state::{
    Grid, ItemId, Occupant, OutcomeCounts, OutcomeKind, RoundPhase, RoundState, SpawnedItem,
};
pub use tick::{TickInput, tick};
