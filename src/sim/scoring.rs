//! Score/combo engine
//!
//! Pure functions over `RoundState`; the game loop calls `apply_claim` once per
//! claimed item and nothing else touches score or combo.

use serde::{Deserialize, Serialize};

use super::state::{OutcomeCounts, OutcomeKind, RoundState};
use crate::consts::*;

/// Result of resolving one claim against the current combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResolution {
    /// Nominal points for the claim (hazards stay negative even if the score floors)
    pub score_delta: i32,
    pub new_combo: u32,
}

/// Combo bonus for a clean claim at the given combo
pub fn combo_bonus(current_combo: u32) -> u32 {
    current_combo
        .saturating_mul(COMBO_BONUS_PER_STEP)
        .min(MAX_COMBO_BONUS)
}

/// Score delta and next combo for claiming an item of `kind`
pub fn resolve_claim(kind: OutcomeKind, current_combo: u32) -> ClaimResolution {
    match kind {
        OutcomeKind::Clean => ClaimResolution {
            score_delta: CLEAN_POINTS + combo_bonus(current_combo) as i32,
            new_combo: current_combo.saturating_add(1),
        },
        OutcomeKind::Dirty => ClaimResolution {
            score_delta: DIRTY_POINTS,
            new_combo: 0,
        },
        OutcomeKind::Storm => ClaimResolution {
            score_delta: STORM_POINTS,
            new_combo: 0,
        },
    }
}

/// Apply a claim: score (floored at zero), combo, max combo and counters
pub fn apply_claim(state: &mut RoundState, kind: OutcomeKind) -> ClaimResolution {
    let resolution = resolve_claim(kind, state.combo);
    let score = i64::from(state.score) + i64::from(resolution.score_delta);
    state.score = score.clamp(0, i64::from(u32::MAX)) as u32;
    state.combo = resolution.new_combo;
    state.max_combo = state.max_combo.max(state.combo);
    state.counts.record(kind);
    resolution
}

/// Clean share of all claims, as a rounded percentage. Zero when nothing was claimed.
pub fn accuracy(counts: &OutcomeCounts) -> u32 {
    let total = counts.total();
    if total == 0 {
        return 0;
    }
    (f64::from(counts.clean) / f64::from(total) * 100.0).round() as u32
}

/// Display label for a claim's points, e.g. `+12` or `-15`
pub fn format_delta(score_delta: i32) -> String {
    if score_delta > 0 {
        format!("+{score_delta}")
    } else {
        score_delta.to_string()
    }
}
