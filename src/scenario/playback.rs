//! Policy playback: replay a solved episode or scenario step by step.
//!
//! Playback only reads the tables. It looks up the action for the current
//! pre-pickup state, applies the pickups, and either stops (halt, or no
//! entry for the state) or takes the single step. An optimal policy never
//! revisits a state, because looping is dominated by halting, so the number
//! of steps is bounded by the number of finalized states; the bound is enforced
//! as a defensive cap.

use crate::solver::{Action, CoinSet, Position, Solution, State};
use crate::world::World;

use super::SolvedScenario;

/// One executed playback step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The pre-pickup state the action was looked up at.
    pub state: State,

    /// The action taken there; the final step is always a halt.
    pub action: Action,
}

/// The trace of following a policy from an episode's start state.
#[derive(Debug, Clone)]
pub struct Rollout {
    /// Every step taken, in order, ending with the halt.
    pub steps: Vec<Step>,

    /// Position the episode ended at.
    pub end: Position,

    /// Green coins collected by the end.
    pub green: CoinSet,

    /// Red coins collected by the end.
    pub red: CoinSet,

    /// Whether playback ended on an explicit halt rather than the step cap.
    pub halted: bool,

    /// Whether the episode passed: every green coin, no red coin.
    pub passed: bool,
}

impl Rollout {
    /// Total coins collected.
    pub fn coins(&self) -> u32 {
        self.green.len() + self.red.len()
    }

    /// Number of movement steps taken (the trailing halt excluded).
    pub fn moves(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.action != Action::Halt)
            .count()
    }
}

/// Follow a solution's policy from the episode's start state.
pub fn run_episode(world: &World, solution: &Solution) -> Rollout {
    let mut pos = world.start();
    let mut green = CoinSet::EMPTY;
    let mut red = CoinSet::EMPTY;
    let mut steps = Vec::new();
    let mut halted = false;

    // an optimal policy visits each state at most once
    let step_cap = solution.len() + 1;

    while steps.len() < step_cap {
        let state = State { pos, green, red };
        let (new_green, new_red, _) = world.pickups(pos, green, red);
        green = new_green;
        red = new_red;

        // no entry means the state was never reachable under the policy;
        // treat it as a halt rather than guessing
        let action = solution.action(&state).unwrap_or(Action::Halt);
        steps.push(Step { state, action });

        let dir = match action {
            Action::Halt => {
                halted = true;
                break;
            }
            Action::Move(dir) => dir,
        };
        match world.step(pos, dir) {
            Some(next) => pos = next,
            None => {
                debug_assert!(false, "policy stepped out of bounds at {}", state.key());
                break;
            }
        }
    }

    let passed = world.passes(green, red);
    Rollout {
        steps,
        end: pos,
        green,
        red,
        halted,
        passed,
    }
}

/// A whole-scenario playback run.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    /// One rollout per episode actually played.
    pub rollouts: Vec<Rollout>,

    /// Index of the gated episode that failed, if the run stopped early.
    pub stopped_at: Option<usize>,
}

impl ScenarioRun {
    /// Whether every episode was played.
    pub fn completed(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Green coins collected across all played episodes.
    pub fn total_green(&self) -> u32 {
        self.rollouts.iter().map(|r| r.green.len()).sum()
    }

    /// Red coins collected across all played episodes.
    pub fn total_red(&self) -> u32 {
        self.rollouts.iter().map(|r| r.red.len()).sum()
    }

    /// All coins collected across all played episodes.
    pub fn total_coins(&self) -> u32 {
        self.total_green() + self.total_red()
    }
}

/// Play every episode of a solved scenario in order.
///
/// After a gated episode that failed its pass condition the door stays shut
/// and the run stops; episodes behind it are never played.
pub fn run_scenario(solved: &SolvedScenario) -> ScenarioRun {
    let mut rollouts = Vec::with_capacity(solved.episodes.len());
    let mut stopped_at = None;

    for (index, episode) in solved.episodes.iter().enumerate() {
        let rollout = run_episode(&episode.world, &episode.solution);
        let failed_gate = episode.def.gate_after && !rollout.passed;
        rollouts.push(rollout);
        if failed_gate {
            stopped_at = Some(index);
            break;
        }
    }

    ScenarioRun {
        rollouts,
        stopped_at,
    }
}
