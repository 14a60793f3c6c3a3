//! # Habitscale Core Library
//!
//! Decision support for keeping or breaking a habit. Short-term
//! gratification and long-term cost are weighed on a balance whose tilt is
//! computed here; rendering, step navigation and any animation delays are
//! left to whatever front-end drives a [`Session`].
//!
//! ## Architecture
//!
//! - **Ledger**: two append-only lists of scored entries and their totals
//! - **Balance**: the tilt angle, the present-bias discount and the success check
//! - **Session**: owned per-user state tying ledger, bias and step together
//! - **Habit loop**: cue/craving/response/reward education and habit classification
//! - **Demand tree**: base demands and the habits filed under them, ranked by cp value
//! - **Storage**: TOML configuration (sessions themselves are never persisted)
//!
//! ## Key Components
//!
//! - [`ScoreLedger`]: Entry storage and totals
//! - [`BalanceEngine`]: Tilt angle and success verdict
//! - [`Session`]: One user's walk through the decision flow
//! - [`DemandTree`]: Base demands with their actions
//! - [`Config`]: Application configuration management

pub mod balance;
pub mod demand_tree;
pub mod error;
pub mod events;
pub mod habit_loop;
pub mod ledger;
pub mod session;
pub mod storage;

pub use balance::{compute_angle, BalanceEngine, BalanceReading, BiasState, Tilt};
pub use demand_tree::{BaseDemand, DemandAction, DemandTree};
pub use error::{ConfigError, CoreError, DemandError, ValidationError};
pub use events::Event;
pub use habit_loop::{HabitAssessment, HabitKind, LoopStage};
pub use ledger::{EntryList, LedgerTotals, ScoreEntry, ScoreLedger};
pub use session::{Session, SessionStep};
pub use storage::Config;
