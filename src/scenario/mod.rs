//! Episode chaining: scenarios solved by backward induction.
//!
//! A scenario is an ordered list of episodes. A door can stand between an
//! episode and the rest of the scenario; it opens only when the episode
//! passes (every green coin collected, no red coin collected). The value of
//! everything after an episode therefore reaches that episode as *future
//! reward*: unconditional when nothing gates it, conditional when a door
//! does.
//!
//! Solving runs in reverse episode order: the last episode is solved with
//! zero future reward, and each earlier episode receives the start-state
//! value of the episode after it. Every episode is solved exactly once per
//! scenario run; playback only reads the resulting tables.

mod demo;
mod output;
mod playback;

pub use demo::{evaluation_pipeline, gauntlet};
pub use output::{render, EpisodeReport, ScenarioReport};
pub use playback::{run_episode, run_scenario, Rollout, ScenarioRun, Step};

use crate::solver::{SolveConfig, SolveStats, Solution, Solver};
use crate::world::{ParseError, World};

/// One episode in a scenario: a grid plus whether a door gates what follows.
#[derive(Debug, Clone)]
pub struct EpisodeDef {
    /// Grid text for this episode.
    pub grid: String,

    /// True when a door follows this episode, so passing it is required to
    /// unlock the rest of the scenario.
    pub gate_after: bool,

    /// Display label, e.g. `"testing"` or `"deployment"`.
    pub label: String,
}

impl EpisodeDef {
    /// Create an episode definition.
    pub fn new(grid: impl Into<String>, gate_after: bool, label: impl Into<String>) -> Self {
        Self {
            grid: grid.into(),
            gate_after,
            label: label.into(),
        }
    }
}

/// An ordered list of dependent episodes.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Display name.
    pub name: String,

    /// The episodes, in the order they are played.
    pub episodes: Vec<EpisodeDef>,
}

impl Scenario {
    /// Create a scenario from its episodes.
    pub fn new(name: impl Into<String>, episodes: Vec<EpisodeDef>) -> Self {
        Self {
            name: name.into(),
            episodes,
        }
    }
}

/// One solved episode: the parsed world, its tables and its definition.
#[derive(Debug, Clone)]
pub struct SolvedEpisode {
    /// The parsed world.
    pub world: World,

    /// The episode's value and policy tables.
    pub solution: Solution,

    /// The definition this episode was built from.
    pub def: EpisodeDef,
}

/// All episodes of a scenario, solved.
#[derive(Debug, Clone)]
pub struct SolvedScenario {
    /// The scenario's display name.
    pub name: String,

    /// Solved episodes in play order.
    pub episodes: Vec<SolvedEpisode>,
}

impl SolvedScenario {
    /// Maximum achievable value across the whole scenario: the first
    /// episode's start value, which already accumulates everything later.
    pub fn total_value(&self) -> u32 {
        self.episodes
            .first()
            .map(|episode| episode.solution.start_value())
            .unwrap_or(0)
    }
}

/// Solve every episode of a scenario by backward induction.
///
/// Episodes are solved last to first. The running future reward starts at
/// zero; after each solve it becomes that episode's start value. An episode
/// followed by a door is solved with the future reward conditional on its
/// pass condition.
///
/// # Errors
/// Returns the first [`ParseError`] encountered; episode grids are parsed
/// in reverse play order.
pub fn solve_scenario(scenario: &Scenario) -> Result<SolvedScenario, ParseError> {
    solve_scenario_with_progress(scenario, |_, _| true)
        .map(|solved| solved.expect("a solve without cancellation always completes"))
}

/// Cancellable variant of [`solve_scenario`].
///
/// `on_progress(episode_index, stats)` fires on every solver yield, with the
/// index of the episode currently being solved (in play order). Returning
/// `false` abandons the scenario and yields `Ok(None)`.
pub fn solve_scenario_with_progress<F>(
    scenario: &Scenario,
    mut on_progress: F,
) -> Result<Option<SolvedScenario>, ParseError>
where
    F: FnMut(usize, &SolveStats) -> bool,
{
    let mut solved: Vec<SolvedEpisode> = Vec::with_capacity(scenario.episodes.len());
    let mut future_reward = 0;

    for (index, def) in scenario.episodes.iter().enumerate().rev() {
        let world = World::parse(&def.grid)?;
        let config = SolveConfig::new()
            .with_future_reward(future_reward)
            .with_conditional(def.gate_after);

        let outcome =
            Solver::new(&world, config).run_with_progress(|stats| on_progress(index, stats));
        let Some(solution) = outcome else {
            return Ok(None);
        };

        future_reward = solution.start_value();
        solved.push(SolvedEpisode {
            world,
            solution,
            def: def.clone(),
        });
    }

    solved.reverse();
    Ok(Some(SolvedScenario {
        name: scenario.name.clone(),
        episodes: solved,
    }))
}
