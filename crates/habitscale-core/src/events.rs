use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::balance::Tilt;
use crate::habit_loop::LoopStage;
use crate::ledger::EntryList;
use crate::session::SessionStep;

/// Every state change in a session produces an Event.
/// The presentation layer drains them and decides how to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitNamed {
        habit: String,
        at: DateTime<Utc>,
    },
    EntryAdded {
        list: EntryList,
        name: String,
        score: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<LoopStage>,
        at: DateTime<Utc>,
    },
    BalanceUpdated {
        short_total: f64,
        long_total: f64,
        is_biased: bool,
        angle: f64,
        tilt: Tilt,
        at: DateTime<Utc>,
    },
    /// The bias discount was removed. Fires once per session.
    TruthRevealed {
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from: SessionStep,
        to: SessionStep,
        at: DateTime<Utc>,
    },
    /// Short-term pull has been driven to zero or below at the friction stage.
    HabitBroken {
        short_total: f64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_id: Uuid,
        habit: Option<String>,
        step: SessionStep,
        short_total: f64,
        long_total: f64,
        is_biased: bool,
        angle: f64,
        tilt: Tilt,
        success: bool,
        entries: usize,
        at: DateTime<Utc>,
    },
}
