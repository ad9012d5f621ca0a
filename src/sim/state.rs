//! Round state and core simulation types
//!
//! Everything the game loop mutates lives here. `RoundState` is recreated at
//! every round start and dropped on reset; nothing is persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::RoundConfig;
use super::scheduler::TimerId;
use crate::consts::POINTS_PER_PERSON;

/// Identifier of a spawned item, unique for the lifetime of a `GameLoop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a spawned item turns out to be when claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// Clean-water container
    Clean,
    /// Contaminated-water container
    Dirty,
    /// Storm cloud
    Storm,
}

impl OutcomeKind {
    /// Map a uniform roll in [0, 1) onto an outcome.
    ///
    /// Storm owns the bottom of the interval, clean the next slice, and dirty
    /// whatever is left.
    pub fn from_roll(roll: f64, config: &RoundConfig) -> Self {
        if roll < config.storm_probability {
            OutcomeKind::Storm
        } else if roll < config.storm_probability + config.clean_probability {
            OutcomeKind::Clean
        } else {
            OutcomeKind::Dirty
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Clean => "clean",
            OutcomeKind::Dirty => "dirty",
            OutcomeKind::Storm => "storm",
        }
    }
}

/// An item sitting in a grid slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedItem {
    pub id: ItemId,
    pub kind: OutcomeKind,
    pub slot: usize,
    /// Virtual clock time of the spawn
    pub created_at_ms: u64,
    /// Virtual clock time the expiry timer fires
    pub expires_at_ms: u64,
}

/// A slot's current item plus the timer that will expire it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub item: SpawnedItem,
    pub expiry: TimerId,
}

/// Fixed set of slots, each holding at most one item
#[derive(Debug, Clone)]
pub struct Grid {
    slots: Vec<Option<Occupant>>,
}

impl Grid {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Indices of unoccupied slots, ascending
    pub fn empty_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Item in a slot, if any
    pub fn item_at(&self, slot: usize) -> Option<&SpawnedItem> {
        self.slots.get(slot)?.as_ref().map(|o| &o.item)
    }

    /// All current items in slot order
    pub fn items(&self) -> impl Iterator<Item = &SpawnedItem> {
        self.slots.iter().flatten().map(|o| &o.item)
    }

    pub fn find(&self, id: ItemId) -> Option<&Occupant> {
        self.slots.iter().flatten().find(|o| o.item.id == id)
    }

    /// Put an item into its slot. Refuses occupied or out-of-range slots.
    pub fn place(&mut self, occupant: Occupant) -> bool {
        match self.slots.get_mut(occupant.item.slot) {
            Some(slot) if slot.is_none() => {
                *slot = Some(occupant);
                true
            }
            _ => false,
        }
    }

    /// Remove an item by id, returning it if it was still present
    pub fn take(&mut self, id: ItemId) -> Option<Occupant> {
        self.slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|o| o.item.id == id))
            .and_then(Option::take)
    }

    /// Empty every slot, returning what was there
    pub fn clear(&mut self) -> Vec<Occupant> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

/// Round timer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round started yet, or reset back to the start screen
    #[default]
    Idle,
    /// Clock and spawner are running
    Running,
    /// Clock hit zero; terminal until the next start
    Ended,
}

/// Claimed items per outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub clean: u32,
    pub dirty: u32,
    pub storm: u32,
}

impl OutcomeCounts {
    pub fn total(&self) -> u32 {
        self.clean + self.dirty + self.storm
    }

    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Clean => self.clean += 1,
            OutcomeKind::Dirty => self.dirty += 1,
            OutcomeKind::Storm => self.storm += 1,
        }
    }
}

/// Mutable per-round state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundState {
    /// Round number, bumped on every start; stale timers compare against it
    pub round: u32,
    pub phase: RoundPhase,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub time_remaining_secs: u32,
    pub counts: OutcomeCounts,
    /// Highest milestone threshold already announced (0 = none)
    pub last_milestone: u32,
}

impl RoundState {
    /// Fresh state for a round that is about to run
    pub fn new_round(round: u32, config: &RoundConfig) -> Self {
        Self {
            round,
            phase: RoundPhase::Running,
            time_remaining_secs: config.round_duration_secs,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// Derived from score; never tracked separately
    pub fn people_served(&self) -> u32 {
        self.score / POINTS_PER_PERSON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::Difficulty;

    fn occupant(id: u64, slot: usize) -> Occupant {
        Occupant {
            item: SpawnedItem {
                id: ItemId(id),
                kind: OutcomeKind::Clean,
                slot,
                created_at_ms: 0,
                expires_at_ms: 1500,
            },
            expiry: TimerId(id),
        }
    }

    #[test]
    fn test_outcome_from_roll_ordering() {
        let config = Difficulty::Normal.config(); // storm 0.1, clean 0.8
        assert_eq!(OutcomeKind::from_roll(0.0, &config), OutcomeKind::Storm);
        assert_eq!(OutcomeKind::from_roll(0.099, &config), OutcomeKind::Storm);
        assert_eq!(OutcomeKind::from_roll(0.1, &config), OutcomeKind::Clean);
        assert_eq!(OutcomeKind::from_roll(0.89, &config), OutcomeKind::Clean);
        assert_eq!(OutcomeKind::from_roll(0.95, &config), OutcomeKind::Dirty);
    }

    #[test]
    fn test_grid_single_occupancy() {
        let mut grid = Grid::new(3);
        assert!(grid.place(occupant(1, 1)));
        assert!(!grid.place(occupant(2, 1)), "slot 1 already taken");
        assert!(!grid.place(occupant(3, 7)), "out of range");
        assert_eq!(grid.empty_slots(), vec![0, 2]);
        assert_eq!(grid.item_at(1).map(|i| i.id), Some(ItemId(1)));
    }

    #[test]
    fn test_grid_take_is_once() {
        let mut grid = Grid::new(2);
        grid.place(occupant(5, 0));
        assert!(grid.take(ItemId(5)).is_some());
        assert!(grid.take(ItemId(5)).is_none());
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_grid_clear() {
        let mut grid = Grid::new(4);
        grid.place(occupant(1, 0));
        grid.place(occupant(2, 3));
        assert_eq!(grid.clear().len(), 2);
        assert_eq!(grid.empty_slots().len(), 4);
    }

    #[test]
    fn test_new_round_state() {
        let config = Difficulty::Hard.config();
        let state = RoundState::new_round(3, &config);
        assert!(state.is_active());
        assert_eq!(state.round, 3);
        assert_eq!(state.time_remaining_secs, 45);
        assert_eq!(state.score, 0);
        assert_eq!(state.counts.total(), 0);
    }

    #[test]
    fn test_people_served_floors() {
        let state = RoundState {
            score: 39,
            ..RoundState::default()
        };
        assert_eq!(state.people_served(), 3);
    }
}
