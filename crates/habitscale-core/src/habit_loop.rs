//! The four-stage habit loop and habit classification.
//!
//! Every habit runs through the same loop:
//!
//! ```text
//! Cue -> Craving -> Response -> Reward -> (Cue ...)
//! ```
//!
//! Entries may be tagged with the stage they act on. The tag is kept for
//! display and never changes a score.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopStage {
    Cue,
    Craving,
    Response,
    Reward,
}

impl LoopStage {
    pub const ALL: [LoopStage; 4] = [
        LoopStage::Cue,
        LoopStage::Craving,
        LoopStage::Response,
        LoopStage::Reward,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LoopStage::Cue => "Cue",
            LoopStage::Craving => "Craving",
            LoopStage::Response => "Response",
            LoopStage::Reward => "Reward",
        }
    }

    /// One-line explanation shown during loop education.
    pub fn description(self) -> &'static str {
        match self {
            LoopStage::Cue => "the trigger that starts the behavior",
            LoopStage::Craving => "the motivation or desire the cue creates",
            LoopStage::Response => "the habit you actually perform",
            LoopStage::Reward => "the payoff that teaches the brain to repeat it",
        }
    }

    /// The stage that follows this one; the loop wraps around.
    pub fn next(self) -> LoopStage {
        match self {
            LoopStage::Cue => LoopStage::Craving,
            LoopStage::Craving => LoopStage::Response,
            LoopStage::Response => LoopStage::Reward,
            LoopStage::Reward => LoopStage::Cue,
        }
    }
}

impl fmt::Display for LoopStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoopStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cue" => Ok(LoopStage::Cue),
            "craving" => Ok(LoopStage::Craving),
            "response" => Ok(LoopStage::Response),
            "reward" => Ok(LoopStage::Reward),
            other => Err(format!("unknown loop stage: {other}")),
        }
    }
}

/// Whether a habit is worth keeping, judged by its long-term total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Good,
    Bad,
    Neutral,
}

impl HabitKind {
    pub fn classify(long_total: f64) -> Self {
        if long_total > 0.0 {
            HabitKind::Good
        } else if long_total < 0.0 {
            HabitKind::Bad
        } else {
            HabitKind::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitAssessment {
    pub kind: HabitKind,
    pub short_total: f64,
    /// Short-term pull points the same way as the long-term verdict.
    pub aligned: bool,
    pub advice: String,
}

impl HabitAssessment {
    /// The brain drops habits whose short-term pull is negative and keeps
    /// the ones that feel good now. A good habit needs positive short-term
    /// pull to survive; a bad habit is only beaten once it no longer pays off.
    pub fn evaluate(short_total: f64, long_total: f64) -> Self {
        let kind = HabitKind::classify(long_total);
        let (aligned, advice) = match kind {
            HabitKind::Good if short_total > 0.0 => (
                true,
                "Good habit with an immediate payoff. Keep the reward visible.",
            ),
            HabitKind::Good => (
                false,
                "Good habit that feels bad right now. Make it more satisfying or it will be dropped.",
            ),
            HabitKind::Bad if short_total <= 0.0 => (
                true,
                "Bad habit that no longer pays off in the short term.",
            ),
            HabitKind::Bad => (
                false,
                "Bad habit that still rewards you now. Add friction until the short-term pull is gone.",
            ),
            HabitKind::Neutral => (
                true,
                "No long-term consequence recorded yet.",
            ),
        };
        Self {
            kind,
            short_total,
            aligned,
            advice: advice.to_string(),
        }
    }
}
