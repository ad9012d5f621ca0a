//! Per-frame entry point
//!
//! The front end collects player input between frames and hands it over in
//! one `TickInput`; `tick` applies it and then advances the timer queue.

use super::config::Difficulty;
use super::game::GameLoop;
use super::state::ItemId;
use crate::error::Result;

/// Input commands gathered since the last frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Back to the start screen
    pub reset: bool,
    /// Start (or restart) a round
    pub start: Option<Difficulty>,
    /// Items clicked, in click order
    pub claims: Vec<ItemId>,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        !self.reset && self.start.is_none() && self.claims.is_empty()
    }

    /// Clear one-shot input after it has been processed
    pub fn clear(&mut self) {
        self.reset = false;
        self.start = None;
        self.claims.clear();
    }
}

/// Apply one frame of input, then run `elapsed_ms` of timers.
///
/// Reset is handled before start so "reset then play again" in one frame
/// lands in a fresh round. Claims are handled before timers so a click that
/// arrives in the same frame as its item's expiry wins.
pub fn tick(game: &mut GameLoop, input: &TickInput, elapsed_ms: u64) -> Result<()> {
    if input.reset {
        game.on_reset_requested();
    }
    if let Some(difficulty) = input.start {
        game.on_round_start_requested(difficulty)?;
    }
    for &id in &input.claims {
        game.on_item_claimed(id);
    }
    game.advance(elapsed_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::RoundPhase;

    #[test]
    fn test_tick_idle_to_running() {
        let mut game = GameLoop::new(12345, 9);
        assert_eq!(game.phase(), RoundPhase::Idle);

        // Tick without start - should stay idle
        tick(&mut game, &TickInput::default(), 1000).unwrap();
        assert_eq!(game.phase(), RoundPhase::Idle);
        assert_eq!(game.now_ms(), 1000);

        let input = TickInput {
            start: Some(Difficulty::Normal),
            ..Default::default()
        };
        tick(&mut game, &input, 16).unwrap();
        assert_eq!(game.phase(), RoundPhase::Running);
    }

    #[test]
    fn test_claim_beats_same_frame_expiry() {
        let mut game = GameLoop::new(8, 9);
        let input = TickInput {
            start: Some(Difficulty::Easy),
            ..Default::default()
        };
        tick(&mut game, &input, 1000).unwrap();
        let id = game.grid().items().next().unwrap().id;

        // Expiry falls inside this frame, but the click was first
        let input = TickInput {
            claims: vec![id],
            ..Default::default()
        };
        tick(&mut game, &input, 2500).unwrap();
        assert_eq!(game.state().counts.total(), 1);
    }

    #[test]
    fn test_reset_then_start_in_one_frame() {
        let mut game = GameLoop::new(8, 9);
        let start = TickInput {
            start: Some(Difficulty::Hard),
            ..Default::default()
        };
        tick(&mut game, &start, 5000).unwrap();

        let input = TickInput {
            reset: true,
            start: Some(Difficulty::Easy),
            claims: Vec::new(),
        };
        tick(&mut game, &input, 0).unwrap();
        assert_eq!(game.phase(), RoundPhase::Running);
        assert_eq!(game.state().time_remaining_secs, 90);
        assert_eq!(game.grid().occupied_count(), 0);
    }

    #[test]
    fn test_input_clear() {
        let mut input = TickInput {
            reset: true,
            start: Some(Difficulty::Easy),
            claims: vec![ItemId(1)],
        };
        assert!(!input.is_empty());
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two games with same seed should produce identical results
        let mut game1 = GameLoop::new(99999, 9);
        let mut game2 = GameLoop::new(99999, 9);

        let inputs = [
            TickInput {
                start: Some(Difficulty::Hard),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                claims: vec![ItemId(1), ItemId(2)],
                ..Default::default()
            },
            TickInput::default(),
        ];

        for input in &inputs {
            tick(&mut game1, input, 700).unwrap();
            tick(&mut game2, input, 700).unwrap();
        }

        assert_eq!(game1.now_ms(), game2.now_ms());
        assert_eq!(game1.state(), game2.state());
        assert_eq!(game1.take_events(), game2.take_events());
    }
}
