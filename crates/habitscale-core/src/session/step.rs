use std::fmt;

use serde::{Deserialize, Serialize};

/// Linear progression through a decision session.
///
/// ```text
/// NameInput -> ScaleShown -> BiasRevealed -> LoopEducation -> FrictionStage
///     ^__________________________ reset ______________________________|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    NameInput,
    ScaleShown,
    BiasRevealed,
    LoopEducation,
    FrictionStage,
}

impl SessionStep {
    pub fn as_u8(self) -> u8 {
        match self {
            SessionStep::NameInput => 1,
            SessionStep::ScaleShown => 2,
            SessionStep::BiasRevealed => 3,
            SessionStep::LoopEducation => 4,
            SessionStep::FrictionStage => 5,
        }
    }

    /// Following step, or `None` at the terminal stage.
    pub fn next(self) -> Option<SessionStep> {
        match self {
            SessionStep::NameInput => Some(SessionStep::ScaleShown),
            SessionStep::ScaleShown => Some(SessionStep::BiasRevealed),
            SessionStep::BiasRevealed => Some(SessionStep::LoopEducation),
            SessionStep::LoopEducation => Some(SessionStep::FrictionStage),
            SessionStep::FrictionStage => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SessionStep::NameInput => "Name the habit",
            SessionStep::ScaleShown => "Weigh it",
            SessionStep::BiasRevealed => "Remove the present bias",
            SessionStep::LoopEducation => "Understand the loop",
            SessionStep::FrictionStage => "Add friction",
        }
    }
}

impl TryFrom<u8> for SessionStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SessionStep::NameInput),
            2 => Ok(SessionStep::ScaleShown),
            3 => Ok(SessionStep::BiasRevealed),
            4 => Ok(SessionStep::LoopEducation),
            5 => Ok(SessionStep::FrictionStage),
            other => Err(format!("step must be between 1 and 5, got {other}")),
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_u8(), self.title())
    }
}
