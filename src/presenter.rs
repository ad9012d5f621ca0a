//! Display/audio collaborator contract
//!
//! The game loop never calls out to the screen or speakers itself. It queues
//! `GameEvent`s, and `dispatch` turns a frame's worth of them into calls on a
//! `GameSink`. Sink failures are logged and skipped; they never reach game
//! state.

use crate::error::Result;
use crate::sim::{EndSummary, GameEvent, Grid, OutcomeKind, RoundState, format_delta};

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Round started
    Start,
    /// Clean water collected
    Collect,
    /// Contaminated water claimed, or clean water missed
    Miss,
    /// Storm cloud claimed
    Storm,
    /// Milestone banner
    Milestone,
    /// Clock ran out
    GameOver,
}

impl SoundEffect {
    pub fn for_claim(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Clean => SoundEffect::Collect,
            OutcomeKind::Dirty => SoundEffect::Miss,
            OutcomeKind::Storm => SoundEffect::Storm,
        }
    }
}

/// Front-end hooks driven by game events
pub trait GameSink {
    /// Redraw HUD and grid from the current state
    fn render(&mut self, state: &RoundState, grid: &Grid) -> Result<()>;
    fn play_sound(&mut self, effect: SoundEffect) -> Result<()>;
    /// Pop a `+N`/`-N` label over a slot
    fn show_floating_score(&mut self, slot: usize, delta: i32) -> Result<()>;
    fn show_milestone_banner(&mut self, message: &str) -> Result<()>;
    fn show_end_summary(&mut self, summary: &EndSummary) -> Result<()>;
}

/// Forward a frame's events to `sink`, then render once.
///
/// Returns the number of sink calls that failed.
pub fn dispatch<S: GameSink + ?Sized>(
    events: &[GameEvent],
    state: &RoundState,
    grid: &Grid,
    sink: &mut S,
) -> usize {
    let mut failures = 0;
    let mut check = |result: Result<()>, what: &str| {
        if let Err(e) = result {
            log::warn!("{} failed: {}", what, e);
            failures += 1;
        }
    };

    for event in events {
        match event {
            GameEvent::RoundStarted { .. } => {
                check(sink.play_sound(SoundEffect::Start), "start sound");
            }
            GameEvent::ItemClaimed { item, resolution } => {
                check(
                    sink.play_sound(SoundEffect::for_claim(item.kind)),
                    "claim sound",
                );
                check(
                    sink.show_floating_score(item.slot, resolution.score_delta),
                    "floating score",
                );
            }
            GameEvent::ItemExpired {
                combo_lost: true, ..
            } => {
                check(sink.play_sound(SoundEffect::Miss), "miss sound");
            }
            GameEvent::MilestoneReached { message, .. } => {
                check(sink.show_milestone_banner(message), "milestone banner");
                check(sink.play_sound(SoundEffect::Milestone), "milestone sound");
            }
            GameEvent::RoundEnded { summary } => {
                check(sink.play_sound(SoundEffect::GameOver), "game over sound");
                check(sink.show_end_summary(summary), "end summary");
            }
            GameEvent::ItemSpawned { .. }
            | GameEvent::ItemExpired { .. }
            | GameEvent::ClockTicked { .. }
            | GameEvent::RoundReset => {}
        }
    }

    if !events.is_empty() {
        check(sink.render(state, grid), "render");
    }
    failures
}

/// Sink that narrates to the log; used by the native build
#[derive(Debug, Default)]
pub struct LogSink {
    /// Last rendered (score, time remaining), to avoid logging every frame
    last_hud: Option<(u32, u32)>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameSink for LogSink {
    fn render(&mut self, state: &RoundState, grid: &Grid) -> Result<()> {
        let hud = (state.score, state.time_remaining_secs);
        if self.last_hud != Some(hud) {
            log::info!(
                "score {:>4} | served {:>3} | combo x{} | {:>2}s | {} on grid",
                state.score,
                state.people_served(),
                state.combo,
                state.time_remaining_secs,
                grid.occupied_count()
            );
            self.last_hud = Some(hud);
        }
        Ok(())
    }

    fn play_sound(&mut self, effect: SoundEffect) -> Result<()> {
        log::debug!("sound: {:?}", effect);
        Ok(())
    }

    fn show_floating_score(&mut self, slot: usize, delta: i32) -> Result<()> {
        log::debug!("slot {}: {}", slot, format_delta(delta));
        Ok(())
    }

    fn show_milestone_banner(&mut self, message: &str) -> Result<()> {
        log::info!("*** {} ***", message);
        Ok(())
    }

    fn show_end_summary(&mut self, summary: &EndSummary) -> Result<()> {
        log::info!(
            "Final score {} | people served {} | max combo x{} | accuracy {}%",
            summary.score,
            summary.people_served,
            summary.max_combo,
            summary.accuracy
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::sim::{Difficulty, GameLoop, OutcomeKind, RoundConfig};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Render(u32),
        Sound(SoundEffect),
        Floating(usize, i32),
        Banner(String),
        Summary(u32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_sounds: bool,
    }

    impl GameSink for Recorder {
        fn render(&mut self, state: &RoundState, _grid: &Grid) -> Result<()> {
            self.calls.push(Call::Render(state.score));
            Ok(())
        }

        fn play_sound(&mut self, effect: SoundEffect) -> Result<()> {
            if self.fail_sounds {
                return Err(GameError::Sink("audio context unavailable".into()));
            }
            self.calls.push(Call::Sound(effect));
            Ok(())
        }

        fn show_floating_score(&mut self, slot: usize, delta: i32) -> Result<()> {
            self.calls.push(Call::Floating(slot, delta));
            Ok(())
        }

        fn show_milestone_banner(&mut self, message: &str) -> Result<()> {
            self.calls.push(Call::Banner(message.to_string()));
            Ok(())
        }

        fn show_end_summary(&mut self, summary: &EndSummary) -> Result<()> {
            self.calls.push(Call::Summary(summary.score));
            Ok(())
        }
    }

    fn clean_round() -> GameLoop {
        let mut game = GameLoop::new(3, 9);
        game.start_round_with(RoundConfig {
            spawn_interval_ms: 100,
            item_lifetime_ms: 10_000,
            clean_probability: 1.0,
            storm_probability: 0.0,
            round_duration_secs: 1,
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        game
    }

    #[test]
    fn test_claim_maps_to_sound_then_floating_score() {
        let mut game = clean_round();
        game.advance(100);
        let slot = game.grid().items().next().unwrap().slot;
        let id = game.grid().items().next().unwrap().id;
        game.take_events();

        game.on_item_claimed(id);
        let mut sink = Recorder::default();
        let events = game.take_events();
        let failures = dispatch(&events, game.state(), game.grid(), &mut sink);

        assert_eq!(failures, 0);
        assert_eq!(
            sink.calls,
            vec![
                Call::Sound(SoundEffect::Collect),
                Call::Floating(slot, 10),
                Call::Render(10),
            ]
        );
    }

    #[test]
    fn test_round_end_reports_summary() {
        let mut game = clean_round();
        game.take_events();
        game.advance(1_000);
        let mut sink = Recorder::default();
        let events = game.take_events();
        dispatch(&events, game.state(), game.grid(), &mut sink);

        assert!(sink.calls.contains(&Call::Sound(SoundEffect::GameOver)));
        assert!(sink.calls.contains(&Call::Summary(0)));
        assert_eq!(sink.calls.last(), Some(&Call::Render(0)));
    }

    #[test]
    fn test_sink_failures_are_isolated() {
        let mut game = clean_round();
        game.advance(100);
        let id = game.grid().items().next().unwrap().id;
        game.on_item_claimed(id);
        let score_before = game.state().score;

        let mut sink = Recorder {
            fail_sounds: true,
            ..Recorder::default()
        };
        let events = game.take_events();
        let failures = dispatch(&events, game.state(), game.grid(), &mut sink);

        // Start sound and collect sound both failed; everything else still ran
        assert_eq!(failures, 2);
        assert!(sink.calls.iter().any(|c| matches!(c, Call::Floating(_, 10))));
        assert_eq!(sink.calls.last(), Some(&Call::Render(score_before)));
        assert_eq!(game.state().score, score_before);
    }

    #[test]
    fn test_no_events_no_render() {
        let game = GameLoop::new(1, 9);
        let mut sink = Recorder::default();
        dispatch(&[], game.state(), game.grid(), &mut sink);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_sound_for_claim() {
        assert_eq!(SoundEffect::for_claim(OutcomeKind::Storm), SoundEffect::Storm);
        assert_eq!(SoundEffect::for_claim(OutcomeKind::Dirty), SoundEffect::Miss);
    }
}
