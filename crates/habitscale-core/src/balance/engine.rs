//! Balance engine: turns ledger totals into a tilt angle.
//!
//! ```text
//! left  = short_total
//! right = |long_total| if long_total < 0, else 0
//! right *= 0.1                      (only while biased)
//! angle = clamp((right - left) * 0.3, -30, 30)
//! ```
//!
//! Positive angles mean the long term wins (the habit gets broken),
//! negative angles mean the short term wins. The bias discount only ever
//! touches the right-hand force; short-term pull and positive long-term
//! totals are never discounted.
//!
//! The engine has no notion of time. Any delay before re-rendering belongs
//! to the presentation layer and cannot change the computed angle.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::bias::BiasState;
use crate::events::Event;
use crate::ledger::ScoreLedger;
use crate::session::SessionStep;

/// Future costs count at one tenth of their weight while biased.
pub const BIAS_DISCOUNT: f64 = 0.1;
/// Degrees of tilt per point of force difference.
pub const ANGLE_SCALE: f64 = 0.3;
/// The beam never tilts further than this in either direction.
pub const MAX_TILT: f64 = 30.0;

/// Tilt angle for the given totals. Depends on nothing but its inputs.
pub fn compute_angle(short_total: f64, long_total: f64, is_biased: bool) -> f64 {
    let left_force = short_total;
    let mut right_force = if long_total < 0.0 { long_total.abs() } else { 0.0 };
    if is_biased {
        right_force *= BIAS_DISCOUNT;
    }
    ((right_force - left_force) * ANGLE_SCALE).clamp(-MAX_TILT, MAX_TILT)
}

/// Which side of the beam is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tilt {
    ShortTermWins,
    Level,
    LongTermWins,
}

impl Tilt {
    pub fn from_angle(angle: f64) -> Self {
        if angle > 0.0 {
            Tilt::LongTermWins
        } else if angle < 0.0 {
            Tilt::ShortTermWins
        } else {
            Tilt::Level
        }
    }
}

/// Derived view of the balance. Never stored; rebuilt on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceReading {
    pub short_total: f64,
    pub long_total: f64,
    pub is_biased: bool,
    pub angle: f64,
    pub tilt: Tilt,
}

impl BalanceReading {
    pub fn to_event(&self) -> Event {
        Event::BalanceUpdated {
            short_total: self.short_total,
            long_total: self.long_total,
            is_biased: self.is_biased,
            angle: self.angle,
            tilt: self.tilt,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceEngine {
    bias: BiasState,
}

impl BalanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn bias(&self) -> BiasState {
        self.bias
    }

    pub fn is_biased(&self) -> bool {
        self.bias.is_biased()
    }

    /// Identical inputs always give the same angle; the bias state held
    /// by an engine is only consulted through [`BalanceEngine::reading`].
    pub fn compute_angle(short_total: f64, long_total: f64, is_biased: bool) -> f64 {
        compute_angle(short_total, long_total, is_biased)
    }

    /// The terminal condition of the whole flow: at the friction stage with
    /// no short-term pull left.
    pub fn check_success(step: SessionStep, short_total: f64) -> bool {
        step == SessionStep::FrictionStage && short_total <= 0.0
    }

    /// Read the ledger through the current bias state.
    pub fn reading(&self, ledger: &ScoreLedger) -> BalanceReading {
        let totals = ledger.totals();
        let is_biased = self.is_biased();
        let angle = Self::compute_angle(totals.short_total, totals.long_total, is_biased);
        BalanceReading {
            short_total: totals.short_total,
            long_total: totals.long_total,
            is_biased,
            angle,
            tilt: Tilt::from_angle(angle),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Drop the bias discount for good. Only the first call produces an
    /// event; later calls change nothing.
    pub fn reveal_truth(&mut self) -> Option<Event> {
        if !self.bias.reveal() {
            tracing::debug!("bias already revealed, ignoring");
            return None;
        }
        tracing::info!("present bias revealed");
        Some(Event::TruthRevealed { at: Utc::now() })
    }

    /// Back to the biased state. Only a session reset calls this.
    pub(crate) fn reset(&mut self) {
        self.bias = BiasState::Biased;
    }
}
