//! # Grid-World Policy Solver
//!
//! An exact dynamic-programming solver for small deterministic grid worlds
//! containing collectible coins and doors whose openness depends on what has
//! been collected. For every reachable (position, collected-coins) state it
//! computes the best achievable value and the action achieving it, and it
//! chains episodes together so that the value of later episodes feeds earlier
//! ones as conditional or unconditional future reward.
//!
//! ## Features
//!
//! - **Exact solving**: full exploration of the reachable state graph, with
//!   an explicit cycle-breaking rule for marker-free loops
//! - **Episode chaining**: backward induction across dependent episodes,
//!   where a door gates access to everything that follows
//! - **Policy playback**: deterministic step-by-step replay of a solved
//!   policy, guaranteed to terminate
//! - **Cooperative progress**: periodic, cancellable progress callbacks for
//!   interactive hosts
//!
//! ## Quick Start
//!
//! ```ignore
//! use gridworld_solver::solve;
//!
//! let grid = "#####\n#g.r#\n#.S.#\n#####";
//! let solution = solve(grid, 0, false)?;
//! assert_eq!(solution.start_value(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`solver`]: the core engine: states, config, tables and the frontier
//!   algorithm
//! - [`world`]: the grid model and transition function
//! - [`scenario`]: episode chaining, playback and report output
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Scenario Chaining                     │
//! │  - reverse-order solves     - future-reward threading    │
//! │  - policy playback          - report output              │
//! └──────────────────────────────────────────────────────────┘
//!                             │ one solve per episode
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Episode Solver                       │
//! │  - explicit frontier        - cycle-breaking rule        │
//! │  - value/policy tables      - progress callbacks         │
//! └──────────────────────────────────────────────────────────┘
//!                             │ legal moves, pickups, doors
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Grid World                         │
//! │  - text parsing             - door openness masks        │
//! │  - coin pickup rule         - pass condition             │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

/// Scenario module: episode definitions, backward-induction chaining,
/// playback and output formatting.
pub mod scenario;

/// Core solver module: state types, configuration, tables and the engine.
pub mod solver;

/// Grid world module: parsing and the transition function.
pub mod world;

// Re-export commonly used types at crate root for convenience
pub use scenario::{solve_scenario, EpisodeDef, Scenario, SolvedScenario};
pub use solver::{
    solve, Action, CoinSet, Direction, Position, Solution, SolveConfig, SolveStats, Solver, State,
};
pub use world::{ParseError, World};
