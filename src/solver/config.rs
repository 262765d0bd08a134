//! Configuration and statistics for episode solves.

use serde::{Deserialize, Serialize};

/// Configuration for a single episode solve.
///
/// The future reward and the conditional flag come from the episode's place
/// in its scenario: episode chaining feeds the start value of everything
/// that follows into the next solve, and sets `conditional` when a door
/// gates the continuation.
///
/// # Example
/// ```
/// use gridworld_solver::solver::SolveConfig;
///
/// let config = SolveConfig::new().with_future_reward(4).with_conditional(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Reward available after this episode ends.
    pub future_reward: u32,

    /// If true, the future reward is granted only when the episode passes:
    /// every green coin collected and no red coin collected. If false, the
    /// future reward is added to every halt value unconditionally.
    pub conditional: bool,

    /// Frontier pops between progress callbacks.
    ///
    /// This is purely a scheduling courtesy for interactive hosts; it has no
    /// effect on the computed tables.
    pub yield_interval: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            future_reward: 0,
            conditional: false,
            yield_interval: 500,
        }
    }
}

impl SolveConfig {
    /// Create a config with default settings: no future reward,
    /// unconditional, yield every 500 pops.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the reward available after the episode.
    pub fn with_future_reward(mut self, reward: u32) -> Self {
        self.future_reward = reward;
        self
    }

    /// Builder method: set whether the future reward requires passing.
    pub fn with_conditional(mut self, conditional: bool) -> Self {
        self.conditional = conditional;
        self
    }

    /// Builder method: set the progress callback interval.
    pub fn with_yield_interval(mut self, interval: usize) -> Self {
        self.yield_interval = interval;
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.yield_interval == 0 {
            return Err(ConfigError::ZeroYieldInterval);
        }
        Ok(())
    }
}

/// Errors that can occur when validating a solve configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The progress interval must be at least one frontier pop.
    ZeroYieldInterval,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroYieldInterval => {
                write!(f, "yield interval must be at least 1 frontier pop")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics from a solve run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    /// Frontier pops processed. A state can surface more than once: a
    /// deferred state is revisited after its children resolve.
    pub visits: u64,

    /// States finalized so far.
    pub states: usize,

    /// Largest frontier depth observed.
    pub peak_frontier: usize,

    /// Wall-clock time spent solving, in seconds.
    pub elapsed_seconds: f64,

    /// Finalized states per second.
    pub states_per_second: f64,
}

impl SolveStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the rate field from the current counters.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.states_per_second = self.states as f64 / self.elapsed_seconds;
        }
    }
}
