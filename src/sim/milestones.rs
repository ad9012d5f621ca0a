//! Milestone announcements and end-of-round summary

use serde::{Deserialize, Serialize};

use super::config::Difficulty;
use super::scoring::accuracy;
use super::state::RoundState;
use crate::consts::{CONFETTI_SCORE, DOUBLE_CONFETTI_SCORE};

/// A score threshold with its banner text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub threshold: u32,
    pub message: &'static str,
}

/// Milestones in ascending threshold order
pub static MILESTONES: [Milestone; 4] = [
    Milestone {
        threshold: 50,
        message: "Great start! You're making a difference!",
    },
    Milestone {
        threshold: 100,
        message: "Halfway there! Keep going!",
    },
    Milestone {
        threshold: 150,
        message: "Amazing progress! Almost there!",
    },
    Milestone {
        threshold: 200,
        message: "You're a water champion!",
    },
];

/// First milestone reached by `score` that is beyond `last_reached`.
///
/// Only one milestone is reported per call even when a jump crosses several;
/// the rest are picked up on later score changes.
pub fn check_milestone(score: u32, last_reached: u32) -> Option<&'static Milestone> {
    MILESTONES
        .iter()
        .find(|m| score >= m.threshold && last_reached < m.threshold)
}

/// Record the next milestone on `state`, if one was crossed
pub fn advance_milestone(state: &mut RoundState) -> Option<&'static Milestone> {
    let milestone = check_milestone(state.score, state.last_milestone)?;
    state.last_milestone = milestone.threshold;
    Some(milestone)
}

/// End-screen celebration level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Celebration {
    None,
    Confetti,
    DoubleConfetti,
}

impl Celebration {
    /// Confetti bursts to launch on the end screen
    pub fn bursts(self) -> usize {
        match self {
            Celebration::None => 0,
            Celebration::Confetti => 1,
            Celebration::DoubleConfetti => 2,
        }
    }
}

/// Final statistics reported when the clock runs out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSummary {
    pub difficulty: Difficulty,
    pub score: u32,
    pub people_served: u32,
    pub max_combo: u32,
    /// Clean share of claims, percent
    pub accuracy: u32,
    pub clean: u32,
    pub dirty: u32,
    pub storms: u32,
}

impl EndSummary {
    pub fn from_state(state: &RoundState, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            score: state.score,
            people_served: state.people_served(),
            max_combo: state.max_combo,
            accuracy: accuracy(&state.counts),
            clean: state.counts.clean,
            dirty: state.counts.dirty,
            storms: state.counts.storm,
        }
    }

    pub fn celebration(&self) -> Celebration {
        if self.score >= DOUBLE_CONFETTI_SCORE {
            Celebration::DoubleConfetti
        } else if self.score >= CONFETTI_SCORE {
            Celebration::Confetti
        } else {
            Celebration::None
        }
    }

    /// Text offered to the share button
    pub fn share_text(&self) -> String {
        format!(
            "I just helped {} people get clean water in Water Quest!\n\
             Score: {}\n\
             Max Combo: x{}\n\
             Play now and make a difference!",
            self.people_served, self.score, self.max_combo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::OutcomeCounts;

    #[test]
    fn test_table_is_ascending() {
        assert!(MILESTONES.windows(2).all(|w| w[0].threshold < w[1].threshold));
    }

    #[test]
    fn test_fires_once_per_threshold() {
        let mut state = RoundState {
            score: 52,
            ..RoundState::default()
        };
        assert_eq!(advance_milestone(&mut state).map(|m| m.threshold), Some(50));
        assert_eq!(advance_milestone(&mut state), None);
        assert_eq!(state.last_milestone, 50);
    }

    #[test]
    fn test_jump_after_regression_fires_next_threshold_only() {
        // 50 already announced, score dipped to 40, then jumps to 120
        assert_eq!(check_milestone(120, 50).map(|m| m.threshold), Some(100));
    }

    #[test]
    fn test_multi_threshold_jump_reports_one() {
        let mut state = RoundState {
            score: 160,
            ..RoundState::default()
        };
        assert_eq!(advance_milestone(&mut state).map(|m| m.threshold), Some(50));
        assert_eq!(advance_milestone(&mut state).map(|m| m.threshold), Some(100));
        assert_eq!(advance_milestone(&mut state).map(|m| m.threshold), Some(150));
        assert_eq!(advance_milestone(&mut state), None);
    }

    #[test]
    fn test_regression_never_refires() {
        assert_eq!(check_milestone(60, 100), None);
        assert_eq!(check_milestone(0, 200), None);
    }

    #[test]
    fn test_summary_with_no_claims() {
        let state = RoundState::default();
        let summary = EndSummary::from_state(&state, Difficulty::Normal);
        assert_eq!(summary.accuracy, 0);
        assert_eq!(summary.celebration(), Celebration::None);
        assert_eq!(summary.celebration().bursts(), 0);
    }

    #[test]
    fn test_celebration_thresholds() {
        let at = |score| EndSummary {
            score,
            ..EndSummary::from_state(&RoundState::default(), Difficulty::Normal)
        };
        assert_eq!(at(99).celebration().bursts(), 0);
        assert_eq!(at(100).celebration(), Celebration::Confetti);
        assert_eq!(at(100).celebration().bursts(), 1);
        assert_eq!(at(199).celebration().bursts(), 1);
        assert_eq!(at(200).celebration(), Celebration::DoubleConfetti);
        assert_eq!(at(200).celebration().bursts(), 2);
    }

    #[test]
    fn test_summary_stats() {
        let state = RoundState {
            score: 215,
            max_combo: 9,
            counts: OutcomeCounts {
                clean: 18,
                dirty: 1,
                storm: 1,
            },
            ..RoundState::default()
        };
        let summary = EndSummary::from_state(&state, Difficulty::Hard);
        assert_eq!(summary.people_served, 21);
        assert_eq!(summary.accuracy, 90);
        assert_eq!(summary.storms, 1);
        assert_eq!(summary.celebration(), Celebration::DoubleConfetti);
        assert!(summary.share_text().contains("21 people"));
    }
}
