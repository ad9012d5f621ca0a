//! Game loop controller
//!
//! Owns the round config, round state, grid, timer queue and RNG. All
//! mutation funnels through the three input handlers and `advance`, and every
//! observable change is queued as a `GameEvent` for the presentation layer.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::config::{Difficulty, RoundConfig};
use super::milestones::{EndSummary, advance_milestone};
use super::scheduler::Scheduler;
use super::scoring::{ClaimResolution, apply_claim};
use super::state::{Grid, ItemId, Occupant, OutcomeKind, RoundPhase, RoundState, SpawnedItem};
use crate::consts::{CLOCK_PERIOD_MS, DEFAULT_GRID_SLOTS};
use crate::error::Result;
use crate::settings::Settings;

/// Timer payloads. Each carries the round it was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTimer {
    Spawn { round: u32 },
    RoundClock { round: u32 },
    Expire { round: u32, item: ItemId },
}

/// Something the display/audio side should react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted {
        round: u32,
        config: RoundConfig,
    },
    ItemSpawned {
        item: SpawnedItem,
    },
    ItemClaimed {
        item: SpawnedItem,
        resolution: ClaimResolution,
    },
    ItemExpired {
        item: SpawnedItem,
        /// A clean item was missed and the combo dropped to zero
        combo_lost: bool,
    },
    ClockTicked {
        time_remaining_secs: u32,
    },
    MilestoneReached {
        threshold: u32,
        message: &'static str,
    },
    RoundEnded {
        summary: EndSummary,
    },
    RoundReset,
}

/// The game loop controller
#[derive(Debug, Clone)]
pub struct GameLoop {
    rng: Pcg32,
    config: RoundConfig,
    state: RoundState,
    grid: Grid,
    scheduler: Scheduler<GameTimer>,
    next_item_id: u64,
    events: Vec<GameEvent>,
}

impl GameLoop {
    /// Create an idle controller with `slot_count` grid slots (at least one)
    pub fn new(seed: u64, slot_count: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            config: RoundConfig::default(),
            state: RoundState::default(),
            grid: Grid::new(slot_count.max(1)),
            scheduler: Scheduler::new(),
            next_item_id: 1,
            events: Vec::new(),
        }
    }

    pub fn with_settings(seed: u64, settings: &Settings) -> Self {
        Self::new(seed, settings.grid_slots)
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Live timers (spawner, clock and item expiries)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Drain the events queued since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start (or restart) a round at a table difficulty
    pub fn on_round_start_requested(&mut self, difficulty: Difficulty) -> Result<()> {
        self.start_round_with(difficulty.config())
    }

    /// Start (or restart) a round with an explicit config
    pub fn start_round_with(&mut self, config: RoundConfig) -> Result<()> {
        config.validate()?;

        // Cancel before touching shared state
        let cancelled = self.scheduler.cancel_all();
        self.grid.clear();

        let round = self.state.round.wrapping_add(1);
        self.config = config;
        self.state = RoundState::new_round(round, &config);

        self.scheduler
            .set_interval(config.spawn_interval_ms, GameTimer::Spawn { round });
        self.scheduler
            .set_interval(CLOCK_PERIOD_MS, GameTimer::RoundClock { round });

        log::info!(
            "Round {} started ({}, {}s, {} stale timers cancelled)",
            round,
            config.difficulty,
            config.round_duration_secs,
            cancelled
        );
        self.events.push(GameEvent::RoundStarted { round, config });
        Ok(())
    }

    /// Player selected an item. Returns true if the claim was scored.
    pub fn on_item_claimed(&mut self, id: ItemId) -> bool {
        if !self.state.is_active() {
            log::debug!("Claim {} ignored: no active round", id);
            return false;
        }
        let Some(occupant) = self.grid.take(id) else {
            log::debug!("Claim {} ignored: item already gone", id);
            return false;
        };
        self.scheduler.cancel(occupant.expiry);

        let item = occupant.item;
        let resolution = apply_claim(&mut self.state, item.kind);
        log::debug!(
            "Claimed {} {} in slot {}: {:+} -> score {}, combo {}",
            item.kind.as_str(),
            item.id,
            item.slot,
            resolution.score_delta,
            self.state.score,
            self.state.combo
        );
        self.events.push(GameEvent::ItemClaimed { item, resolution });

        if let Some(milestone) = advance_milestone(&mut self.state) {
            log::info!("Milestone {} reached", milestone.threshold);
            self.events.push(GameEvent::MilestoneReached {
                threshold: milestone.threshold,
                message: milestone.message,
            });
        }
        true
    }

    /// Back to the start screen, dropping the current round
    pub fn on_reset_requested(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.grid.clear();
        if self.state.phase == RoundPhase::Idle {
            return;
        }
        // Keep the round counter so leaked timers from this round stay stale
        self.state = RoundState {
            round: self.state.round,
            ..RoundState::default()
        };
        log::info!("Round reset ({} timers cancelled)", cancelled);
        self.events.push(GameEvent::RoundReset);
    }

    /// Run every timer that falls due within the next `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(elapsed_ms);
        while let Some(fired) = self.scheduler.pop_due(target) {
            self.handle_timer(fired.payload);
        }
        self.scheduler.advance_to(target);
    }

    fn handle_timer(&mut self, timer: GameTimer) {
        match timer {
            GameTimer::Spawn { round } => {
                if self.is_current(round) {
                    self.spawn_item();
                }
            }
            GameTimer::RoundClock { round } => {
                if self.is_current(round) {
                    self.tick_clock();
                }
            }
            GameTimer::Expire { round, item } => {
                if self.is_current(round) {
                    self.expire_item(item);
                }
            }
        }
    }

    fn is_current(&self, round: u32) -> bool {
        let current = round == self.state.round && self.state.is_active();
        if !current {
            log::debug!("Stale timer for round {} ignored", round);
        }
        current
    }

    fn spawn_item(&mut self) {
        let empty = self.grid.empty_slots();
        if empty.is_empty() {
            log::debug!("Spawn skipped: grid full");
            return;
        }

        // Slot first, then outcome
        let slot = empty[self.rng.random_range(0..empty.len())];
        let roll: f64 = self.rng.random();
        let kind = OutcomeKind::from_roll(roll, &self.config);

        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        let now = self.scheduler.now_ms();
        let lifetime = self.config.item_lifetime_ms;
        let expiry = self.scheduler.set_timeout(
            lifetime,
            GameTimer::Expire {
                round: self.state.round,
                item: id,
            },
        );

        let item = SpawnedItem {
            id,
            kind,
            slot,
            created_at_ms: now,
            expires_at_ms: now.saturating_add(lifetime),
        };
        if !self.grid.place(Occupant { item, expiry }) {
            // Unreachable with a fresh empty-slot list, but keep the timer queue honest
            self.scheduler.cancel(expiry);
            log::warn!("Spawn {} rejected: slot {} occupied", id, slot);
            return;
        }
        log::debug!("Spawned {} {} in slot {}", kind.as_str(), id, slot);
        self.events.push(GameEvent::ItemSpawned { item });
    }

    fn expire_item(&mut self, id: ItemId) {
        let Some(occupant) = self.grid.take(id) else {
            log::debug!("Expiry {} ignored: item already claimed", id);
            return;
        };
        let item = occupant.item;
        let combo_lost = item.kind == OutcomeKind::Clean;
        if combo_lost {
            self.state.combo = 0;
        }
        log::debug!("Expired {} {} in slot {}", item.kind.as_str(), item.id, item.slot);
        self.events.push(GameEvent::ItemExpired { item, combo_lost });
    }

    fn tick_clock(&mut self) {
        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        self.events.push(GameEvent::ClockTicked {
            time_remaining_secs: self.state.time_remaining_secs,
        });
        if self.state.time_remaining_secs == 0 {
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.grid.clear();
        self.state.phase = RoundPhase::Ended;

        let summary = EndSummary::from_state(&self.state, self.config.difficulty);
        log::info!(
            "Round {} ended: score {}, served {}, max combo {}, accuracy {}% ({} timers cancelled)",
            self.state.round,
            summary.score,
            summary.people_served,
            summary.max_combo,
            summary.accuracy,
            cancelled
        );
        self.events.push(GameEvent::RoundEnded { summary });
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(0, DEFAULT_GRID_SLOTS)
    }
}
