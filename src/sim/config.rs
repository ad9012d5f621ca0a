//! Difficulty table and per-round configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Difficulty levels selectable before a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Round parameters for this difficulty
    pub fn config(&self) -> RoundConfig {
        match self {
            Difficulty::Easy => RoundConfig {
                difficulty: *self,
                spawn_interval_ms: 1000,
                item_lifetime_ms: 2000,
                clean_probability: 0.9,
                storm_probability: 0.05,
                round_duration_secs: 90,
            },
            Difficulty::Normal => RoundConfig {
                difficulty: *self,
                spawn_interval_ms: 800,
                item_lifetime_ms: 1500,
                clean_probability: 0.8,
                storm_probability: 0.1,
                round_duration_secs: 60,
            },
            Difficulty::Hard => RoundConfig {
                difficulty: *self,
                spawn_interval_ms: 600,
                item_lifetime_ms: 1200,
                clean_probability: 0.7,
                storm_probability: 0.15,
                round_duration_secs: 45,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters fixed for the duration of one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Difficulty this config was drawn from (custom configs keep a label too)
    pub difficulty: Difficulty,
    /// Spawn tick period
    pub spawn_interval_ms: u64,
    /// How long an unclaimed item stays in its slot
    pub item_lifetime_ms: u64,
    /// Chance a spawn is clean water
    pub clean_probability: f64,
    /// Chance a spawn is a storm cloud (checked first)
    pub storm_probability: f64,
    /// Round length in whole seconds
    pub round_duration_secs: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Difficulty::default().config()
    }
}

impl RoundConfig {
    /// Check the invariants the game loop relies on
    pub fn validate(&self) -> Result<()> {
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !in_unit(self.clean_probability) || !in_unit(self.storm_probability) {
            return Err(GameError::InvalidConfig(format!(
                "probabilities must be within [0, 1] (clean {}, storm {})",
                self.clean_probability, self.storm_probability
            )));
        }
        // Small epsilon: 0.9 + 0.1 is not exactly 1.0 in binary
        if self.clean_probability + self.storm_probability > 1.0 + 1e-9 {
            return Err(GameError::InvalidConfig(format!(
                "clean + storm probability exceeds 1 ({} + {})",
                self.clean_probability, self.storm_probability
            )));
        }
        if self.spawn_interval_ms == 0 {
            return Err(GameError::InvalidConfig("spawn interval must be non-zero".into()));
        }
        if self.item_lifetime_ms == 0 {
            return Err(GameError::InvalidConfig("item lifetime must be non-zero".into()));
        }
        if self.round_duration_secs == 0 {
            return Err(GameError::InvalidConfig("round duration must be non-zero".into()));
        }
        Ok(())
    }

    /// Short lines shown under the difficulty picker
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Time: {}s", self.round_duration_secs),
            format!(
                "Clean Water Chance: {}%",
                (self.clean_probability * 100.0).round() as u32
            ),
            format!("Storm Chance: {}%", (self.storm_probability * 100.0).round() as u32),
        ]
    }
}
