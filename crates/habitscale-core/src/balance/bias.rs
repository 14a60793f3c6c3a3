//! Present-bias state.
//!
//! ```text
//! Biased -> Unbiased
//! ```
//!
//! The only way back to `Biased` is a full session reset, which builds a
//! fresh state rather than reversing this one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasState {
    /// Future costs are discounted.
    #[default]
    Biased,
    /// The truth has been revealed; costs count at full weight.
    Unbiased,
}

impl BiasState {
    pub fn is_biased(self) -> bool {
        self == BiasState::Biased
    }

    /// Apply the one-way transition. Returns `true` only when this call
    /// actually flipped the state.
    pub fn reveal(&mut self) -> bool {
        match self {
            BiasState::Biased => {
                *self = BiasState::Unbiased;
                true
            }
            BiasState::Unbiased => false,
        }
    }
}
