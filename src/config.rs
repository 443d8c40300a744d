#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a [`ForwardChainer`](crate::ForwardChainer) run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainerConfig {
    /// Maximum number of saturation passes before giving up. `None` runs to
    /// a fixpoint, which always exists for knowledge bases without function
    /// symbols.
    pub max_iterations: Option<usize>,
}

impl ChainerConfig {
    /// Unlimited passes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of saturation passes
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Returns true once `iterations` passes have used up the budget
    #[must_use]
    pub fn exhausted(&self, iterations: usize) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
    }
}
