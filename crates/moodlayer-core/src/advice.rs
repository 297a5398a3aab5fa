//! Advice record returned to the presentation layer.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ADVICE: &str = "Take a moment to breathe and reflect on your day.";
pub const DEFAULT_ACTION: &str = "Try a 5-minute meditation.";

const FALLBACK_ADVICE: &str = "Based on your emotional profile, it seems you're experiencing a mix \
of feelings today. Remember that all emotions are valid and temporary. Take this moment to \
acknowledge how you feel without judgment.";
const FALLBACK_ACTION: &str =
    "Try a 10-minute walk outside to clear your mind and reset your energy.";

/// AI-generated advice and a concrete next step.
///
/// Both fields are always populated; [`Default`] yields the placeholder pair
/// used whenever the contract payload carries nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub advice: String,
    pub suggested_action: String,
}

impl Default for AdviceResponse {
    fn default() -> Self {
        Self::new(DEFAULT_ADVICE, DEFAULT_ACTION)
    }
}

impl AdviceResponse {
    pub fn new(advice: impl Into<String>, suggested_action: impl Into<String>) -> Self {
        Self {
            advice: advice.into(),
            suggested_action: suggested_action.into(),
        }
    }

    /// Advice text paired with the default action.
    pub fn with_default_action(advice: impl Into<String>) -> Self {
        Self::new(advice, DEFAULT_ACTION)
    }

    /// Sample advice shown when the contract could not be reached.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ADVICE, FALLBACK_ACTION)
    }
}
