//! Base demands and the habits that serve them.
//!
//! The tree has a fixed root (the person) whose children are base demands.
//! Each demand holds actions keyed by name. An action carries a short-term
//! and a long-term value, usually copied from a finished session, and is
//! ranked by its cp value (their sum). The tree lives in memory only.

use serde::{Deserialize, Serialize};

use crate::error::DemandError;
use crate::habit_loop::HabitAssessment;
use crate::session::Session;

/// Demands every tree starts with unless seeding is switched off.
pub const BASE_DEMANDS: [&str; 10] = [
    "sleep",
    "food",
    "water",
    "safety",
    "health",
    "belonging",
    "love",
    "esteem",
    "learning",
    "play",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandAction {
    pub name: String,
    pub short_value: f64,
    pub long_value: f64,
}

impl DemandAction {
    /// Price-performance of the action: what it pays now plus what it
    /// costs or earns later.
    pub fn cp_value(&self) -> f64 {
        self.short_value + self.long_value
    }

    /// Good/bad habit verdict for the stored values.
    pub fn assessment(&self) -> HabitAssessment {
        HabitAssessment::evaluate(self.short_value, self.long_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseDemand {
    pub name: String,
    actions: Vec<DemandAction>,
}

impl BaseDemand {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            actions: Vec::new(),
        }
    }

    pub fn action(&self, name: &str) -> Option<&DemandAction> {
        self.actions.iter().find(|a| a.name == name.trim())
    }

    /// Actions ranked by cp value, best first. Ties keep name order.
    pub fn ranked_actions(&self) -> Vec<&DemandAction> {
        let mut ranked: Vec<_> = self.actions.iter().collect();
        ranked.sort_by(|a, b| {
            b.cp_value()
                .total_cmp(&a.cp_value())
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandTree {
    demands: Vec<BaseDemand>,
}

impl DemandTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding the ten [`BASE_DEMANDS`], each without actions.
    pub fn seeded() -> Self {
        Self {
            demands: BASE_DEMANDS.iter().map(|name| BaseDemand::new(name)).collect(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Demands in the order they were added.
    pub fn demands(&self) -> &[BaseDemand] {
        &self.demands
    }

    pub fn demand(&self, name: &str) -> Option<&BaseDemand> {
        self.demands.iter().find(|d| d.name == name.trim())
    }

    /// Actions of one demand, best cp value first.
    pub fn actions_by_cp_value(&self, demand: &str) -> Result<Vec<&DemandAction>, DemandError> {
        self.demand(demand)
            .map(BaseDemand::ranked_actions)
            .ok_or_else(|| DemandError::UnknownDemand(demand.trim().to_string()))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add_demand(&mut self, name: &str) -> Result<&BaseDemand, DemandError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DemandError::EmptyDemandName);
        }
        if self.demand(name).is_some() {
            return Err(DemandError::DuplicateDemand(name.to_string()));
        }
        tracing::debug!(demand = name, "demand added");
        self.demands.push(BaseDemand::new(name));
        let index = self.demands.len() - 1;
        Ok(&self.demands[index])
    }

    /// Remove a demand together with its actions.
    pub fn remove_demand(&mut self, name: &str) -> Result<BaseDemand, DemandError> {
        let index = self.index_of(name)?;
        tracing::debug!(demand = name.trim(), "demand removed");
        Ok(self.demands.remove(index))
    }

    /// Add an action, or replace the values of the action with that name.
    pub fn add_action(
        &mut self,
        demand: &str,
        name: &str,
        short_value: f64,
        long_value: f64,
    ) -> Result<&DemandAction, DemandError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DemandError::EmptyActionName);
        }
        let action = DemandAction {
            name: name.to_string(),
            short_value,
            long_value,
        };
        if !short_value.is_finite() || !long_value.is_finite() || !action.cp_value().is_finite() {
            tracing::warn!(demand, action = name, short_value, long_value, "rejected action");
            return Err(DemandError::NonFiniteValue {
                action: name.to_string(),
            });
        }

        let index = self.index_of(demand)?;
        let actions = &mut self.demands[index].actions;
        let slot = match actions.iter().position(|a| a.name == name) {
            Some(slot) => {
                actions[slot] = action;
                slot
            }
            None => {
                actions.push(action);
                actions.len() - 1
            }
        };
        tracing::debug!(demand, action = name, short_value, long_value, "action stored");
        Ok(&actions[slot])
    }

    pub fn remove_action(&mut self, demand: &str, name: &str) -> Result<DemandAction, DemandError> {
        let index = self.index_of(demand)?;
        let actions = &mut self.demands[index].actions;
        let slot = actions
            .iter()
            .position(|a| a.name == name.trim())
            .ok_or_else(|| DemandError::UnknownAction {
                demand: demand.trim().to_string(),
                action: name.trim().to_string(),
            })?;
        Ok(actions.remove(slot))
    }

    /// File the session's habit under `demand`, valued at the session's
    /// current short- and long-term totals.
    pub fn record_session(
        &mut self,
        demand: &str,
        session: &Session,
    ) -> Result<&DemandAction, DemandError> {
        let habit = session.habit().ok_or(DemandError::UnnamedHabit)?;
        let totals = session.ledger().totals();
        self.add_action(demand, habit, totals.short_total, totals.long_total)
    }

    fn index_of(&self, demand: &str) -> Result<usize, DemandError> {
        self.demands
            .iter()
            .position(|d| d.name == demand.trim())
            .ok_or_else(|| DemandError::UnknownDemand(demand.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit_loop::HabitKind;

    #[test]
    fn seeded_tree_has_ten_empty_demands() {
        let tree = DemandTree::seeded();
        assert_eq!(tree.demands().len(), 10);
        assert_eq!(tree.demands()[0].name, "sleep");
        assert!(tree.demands().iter().all(BaseDemand::is_empty));
        assert!(DemandTree::new().demands().is_empty());
    }

    #[test]
    fn demands_are_unique_and_named() {
        let mut tree = DemandTree::seeded();
        tree.add_demand("  rest  ").unwrap();
        assert!(tree.demand("rest").is_some());
        assert_eq!(
            tree.add_demand("sleep").unwrap_err(),
            DemandError::DuplicateDemand("sleep".into())
        );
        assert_eq!(tree.add_demand(" ").unwrap_err(), DemandError::EmptyDemandName);
        assert_eq!(tree.demands().len(), 11);
    }

    #[test]
    fn removing_a_demand_drops_its_actions() {
        let mut tree = DemandTree::seeded();
        tree.add_action("food", "cook at home", 2.0, 8.0).unwrap();
        let removed = tree.remove_demand("food").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(tree.demand("food").is_none());
        assert_eq!(
            tree.remove_demand("food").unwrap_err(),
            DemandError::UnknownDemand("food".into())
        );
    }

    #[test]
    fn actions_are_ranked_by_cp_value() {
        let mut tree = DemandTree::seeded();
        tree.add_action("food", "fast food", 8.0, -30.0).unwrap();
        tree.add_action("food", "cook at home", 2.0, 8.0).unwrap();
        tree.add_action("food", "meal prep", 1.0, 9.0).unwrap();
        tree.add_action("food", "skip lunch", -2.0, -5.0).unwrap();

        let names: Vec<_> = tree
            .actions_by_cp_value("food")
            .unwrap()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["cook at home", "meal prep", "skip lunch", "fast food"]);
        assert!(tree.actions_by_cp_value("flying").is_err());
    }

    #[test]
    fn adding_an_existing_action_replaces_its_values() {
        let mut tree = DemandTree::seeded();
        tree.add_action("play", "video games", 9.0, -10.0).unwrap();
        let action = tree.add_action("play", " video games ", 4.0, -2.0).unwrap();
        assert_eq!(action.cp_value(), 2.0);
        assert_eq!(tree.demand("play").unwrap().len(), 1);
    }

    #[test]
    fn bad_actions_leave_the_tree_unchanged() {
        let mut tree = DemandTree::seeded();
        let before = tree.clone();
        assert_eq!(
            tree.add_action("play", "", 1.0, 1.0).unwrap_err(),
            DemandError::EmptyActionName
        );
        assert!(matches!(
            tree.add_action("play", "chess", f64::NAN, 1.0),
            Err(DemandError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            tree.add_action("play", "chess", f64::MAX, f64::MAX),
            Err(DemandError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            tree.add_action("flying", "chess", 1.0, 1.0),
            Err(DemandError::UnknownDemand(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn remove_action_reports_unknown_names() {
        let mut tree = DemandTree::seeded();
        tree.add_action("sleep", "no screens in bed", -1.0, 10.0).unwrap();
        let removed = tree.remove_action("sleep", "no screens in bed").unwrap();
        assert_eq!(removed.long_value, 10.0);
        assert!(matches!(
            tree.remove_action("sleep", "no screens in bed"),
            Err(DemandError::UnknownAction { .. })
        ));
    }

    #[test]
    fn session_totals_become_action_values() {
        let mut tree = DemandTree::seeded();
        let mut session = Session::new();
        assert_eq!(
            tree.record_session("food", &session).unwrap_err(),
            DemandError::UnnamedHabit
        );

        session.set_habit("late snacks").unwrap();
        session.add_short_term("taste", 8.0, None).unwrap();
        session.add_long_term("weight gain", -30.0, None).unwrap();

        let action = tree.record_session("food", &session).unwrap();
        assert_eq!(action.name, "late snacks");
        assert_eq!(action.short_value, 8.0);
        assert_eq!(action.long_value, -30.0);
        assert_eq!(action.cp_value(), -22.0);
        assert_eq!(action.assessment().kind, HabitKind::Bad);
    }
}
