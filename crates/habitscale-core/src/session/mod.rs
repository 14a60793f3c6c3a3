//! An owned decision session.
//!
//! All state the flow needs (habit name, step, ledger, bias) lives in one
//! [`Session`] value. Every mutation hands back a freshly computed
//! [`BalanceReading`] and queues [`Event`]s for the presentation layer to
//! drain with [`Session::take_events`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new();
//! session.set_habit("late-night snacking")?;
//! session.add_short_term("tastes good", 8.0, None)?;
//! session.add_long_term("weight gain", -50.0, None)?;
//! session.reveal_truth();
//! ```

mod step;

pub use step::SessionStep;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::balance::{BalanceEngine, BalanceReading};
use crate::error::ValidationError;
use crate::events::Event;
use crate::habit_loop::{HabitAssessment, LoopStage};
use crate::ledger::{EntryList, ScoreLedger};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    habit: Option<String>,
    step: SessionStep,
    ledger: ScoreLedger,
    engine: BalanceEngine,
    /// Set once `HabitBroken` has been emitted for this run.
    #[serde(default)]
    broken: bool,
    #[serde(skip)]
    pending: Vec<Event>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            habit: None,
            step: SessionStep::NameInput,
            ledger: ScoreLedger::new(),
            engine: BalanceEngine::new(),
            broken: false,
            pending: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn habit(&self) -> Option<&str> {
        self.habit.as_deref()
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn engine(&self) -> &BalanceEngine {
        &self.engine
    }

    pub fn reading(&self) -> BalanceReading {
        self.engine.reading(&self.ledger)
    }

    pub fn check_success(&self) -> bool {
        BalanceEngine::check_success(self.step, self.ledger.short_total())
    }

    pub fn assessment(&self) -> HabitAssessment {
        let totals = self.ledger.totals();
        HabitAssessment::evaluate(totals.short_total, totals.long_total)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let reading = self.reading();
        Event::StateSnapshot {
            session_id: self.id,
            habit: self.habit.clone(),
            step: self.step,
            short_total: reading.short_total,
            long_total: reading.long_total,
            is_biased: reading.is_biased,
            angle: reading.angle,
            tilt: reading.tilt,
            success: self.check_success(),
            entries: self.ledger.len(),
            at: Utc::now(),
        }
    }

    /// Hand over queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Name the habit under consideration and move on to the scale.
    /// Renaming is only possible before the scale is shown.
    pub fn set_habit(&mut self, name: &str) -> Result<Option<Event>, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyHabitName);
        }
        if self.step != SessionStep::NameInput {
            tracing::debug!(step = %self.step, "habit already named");
            return Ok(None);
        }
        self.habit = Some(name.to_string());
        self.pending.push(Event::HabitNamed {
            habit: name.to_string(),
            at: Utc::now(),
        });
        Ok(self.advance())
    }

    pub fn add_short_term(
        &mut self,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<BalanceReading, ValidationError> {
        self.add(EntryList::ShortTerm, name, score, stage)
    }

    pub fn add_long_term(
        &mut self,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<BalanceReading, ValidationError> {
        self.add(EntryList::LongTerm, name, score, stage)
    }

    /// Add deliberate resistance. At the friction stage this is what can
    /// tip the session into success.
    pub fn add_friction(
        &mut self,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<BalanceReading, ValidationError> {
        let reading = self.add(EntryList::Friction, name, score, stage)?;
        if !self.broken && BalanceEngine::check_success(self.step, reading.short_total) {
            self.broken = true;
            tracing::info!(short_total = reading.short_total, "habit broken");
            self.pending.push(Event::HabitBroken {
                short_total: reading.short_total,
                at: Utc::now(),
            });
        }
        Ok(reading)
    }

    /// Remove the present bias. This is also the only way from the scale
    /// to the next step; anywhere else it does nothing.
    pub fn reveal_truth(&mut self) -> Option<Event> {
        if self.step != SessionStep::ScaleShown {
            tracing::debug!(step = %self.step, "reveal ignored outside the scale step");
            return None;
        }
        let revealed = self.engine.reveal_truth()?;
        let reading = self.reading();
        self.pending.push(revealed.clone());
        self.pending.push(reading.to_event());
        self.advance();
        Some(revealed)
    }

    /// Move to the next step where the current one allows it.
    pub fn advance(&mut self) -> Option<Event> {
        let from = self.step;
        let allowed = match from {
            SessionStep::NameInput => self.habit.is_some(),
            SessionStep::ScaleShown => !self.engine.is_biased(),
            SessionStep::BiasRevealed | SessionStep::LoopEducation => true,
            SessionStep::FrictionStage => false,
        };
        if !allowed {
            tracing::debug!(step = %from, "advance not allowed");
            return None;
        }
        let to = from.next()?;
        self.step = to;
        tracing::info!(from = from.as_u8(), to = to.as_u8(), "step advanced");
        let event = Event::StepAdvanced {
            from,
            to,
            at: Utc::now(),
        };
        self.pending.push(event.clone());
        Some(event)
    }

    /// Start over: empty ledger, biased again, back to naming the habit.
    /// Keeps the session id.
    pub fn reset(&mut self) -> Event {
        self.ledger.reset();
        self.engine.reset();
        self.habit = None;
        self.step = SessionStep::NameInput;
        self.broken = false;
        self.started_at = Utc::now();
        tracing::info!(session = %self.id, "session reset");
        let event = Event::SessionReset { at: Utc::now() };
        self.pending.push(event.clone());
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn add(
        &mut self,
        list: EntryList,
        name: &str,
        score: f64,
        stage: Option<LoopStage>,
    ) -> Result<BalanceReading, ValidationError> {
        self.ledger.add(list, name, score, stage)?;
        let reading = self.reading();
        self.pending.push(Event::EntryAdded {
            list,
            name: name.trim().to_string(),
            score,
            stage,
            at: Utc::now(),
        });
        self.pending.push(reading.to_event());
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> Session {
        let mut session = Session::new();
        session.set_habit("doomscrolling").unwrap();
        session.take_events();
        session
    }

    #[test]
    fn new_session_waits_for_a_name() {
        let session = Session::new();
        assert_eq!(session.step(), SessionStep::NameInput);
        assert!(session.engine().is_biased());
        assert!(session.habit().is_none());
    }

    #[test]
    fn naming_moves_to_scale() {
        let mut session = Session::new();
        assert!(session.set_habit("  ").is_err());
        assert_eq!(session.step(), SessionStep::NameInput);

        let event = session.set_habit("doomscrolling").unwrap();
        assert!(matches!(event, Some(Event::StepAdvanced { .. })));
        assert_eq!(session.step(), SessionStep::ScaleShown);
        assert_eq!(session.habit(), Some("doomscrolling"));
    }

    #[test]
    fn cannot_skip_naming() {
        let mut session = Session::new();
        assert!(session.advance().is_none());
        assert_eq!(session.step(), SessionStep::NameInput);
    }

    #[test]
    fn scale_step_needs_reveal() {
        let mut session = named();
        assert!(session.advance().is_none());
        assert_eq!(session.step(), SessionStep::ScaleShown);

        assert!(session.reveal_truth().is_some());
        assert_eq!(session.step(), SessionStep::BiasRevealed);
        assert!(!session.engine().is_biased());
    }

    #[test]
    fn reveal_fires_once() {
        let mut session = named();
        session.reveal_truth();
        session.take_events();
        assert!(session.reveal_truth().is_none());
        assert!(session.take_events().is_empty());
        assert_eq!(session.step(), SessionStep::BiasRevealed);
    }

    #[test]
    fn reveal_outside_scale_is_ignored() {
        let mut session = Session::new();
        assert!(session.reveal_truth().is_none());
        assert!(session.engine().is_biased());
    }

    #[test]
    fn mutation_returns_fresh_reading() {
        let mut session = named();
        let reading = session.add_long_term("sleep", -50.0, None).unwrap();
        assert_eq!(reading.long_total, -50.0);
        assert!((reading.angle - 1.5).abs() < 1e-9);

        let events = session.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::EntryAdded { .. }));
        assert!(matches!(events[1], Event::BalanceUpdated { .. }));
    }

    #[test]
    fn rejected_add_queues_nothing() {
        let mut session = named();
        assert!(session.add_friction("snack", 5.0, None).is_err());
        assert!(session.take_events().is_empty());
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn friction_before_stage_five_is_not_success() {
        let mut session = named();
        session.add_short_term("fun", 2.0, None).unwrap();
        session.add_friction("app timer", -4.0, None).unwrap();
        assert!(!session.check_success());
        assert!(!session
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::HabitBroken { .. })));
    }

    #[test]
    fn habit_broken_emitted_once() {
        let mut session = named();
        session.add_short_term("fun", 2.0, None).unwrap();
        session.reveal_truth();
        session.advance();
        session.advance();
        assert_eq!(session.step(), SessionStep::FrictionStage);
        session.take_events();

        session.add_friction("delete app", -4.0, None).unwrap();
        session.add_friction("grayscale", -1.0, None).unwrap();
        let broken = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, Event::HabitBroken { .. }))
            .count();
        assert_eq!(broken, 1);
        assert!(session.check_success());
    }

    #[test]
    fn reset_returns_to_start() {
        let mut session = named();
        let id = session.id();
        session.add_short_term("fun", 2.0, None).unwrap();
        session.reveal_truth();
        session.reset();

        assert_eq!(session.id(), id);
        assert_eq!(session.step(), SessionStep::NameInput);
        assert!(session.engine().is_biased());
        assert!(session.ledger().is_empty());
        assert_eq!(session.reading().angle, 0.0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = named();
        session.add_short_term("fun", 10.0, Some(LoopStage::Reward)).unwrap();
        match session.snapshot() {
            Event::StateSnapshot {
                step,
                short_total,
                entries,
                success,
                ..
            } => {
                assert_eq!(step, SessionStep::ScaleShown);
                assert_eq!(short_total, 10.0);
                assert_eq!(entries, 1);
                assert!(!success);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
