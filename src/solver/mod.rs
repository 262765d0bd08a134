//! Episode solver module.
//!
//! This module contains the exact dynamic-programming engine and its
//! supporting types:
//!
//! - [`state`]: positions, directions, actions, collection sets and the
//!   composite solver state with its canonical string key
//! - [`config`]: solve configuration and statistics
//! - [`storage`]: the populate-once value and policy tables
//! - [`engine`]: the frontier-based solver and the [`Solution`] it produces
//!
//! # Usage
//!
//! For a one-off solve, [`solve`] parses and solves in one call:
//!
//! ```ignore
//! let solution = gridworld_solver::solve(grid_text, 0, false)?;
//! println!("value {}", solution.start_value());
//! ```
//!
//! For control over yielding and cancellation, build a [`Solver`] directly:
//!
//! ```ignore
//! let world = World::parse(grid_text)?;
//! let config = SolveConfig::new().with_yield_interval(200);
//! let solution = Solver::new(&world, config)
//!     .run_with_progress(|stats| { draw_spinner(stats); !cancel_requested() });
//! ```

pub mod config;
pub mod engine;
pub mod state;
pub mod storage;

// Re-export main types for convenient access
pub use config::{ConfigError, SolveConfig, SolveStats};
pub use engine::{Solution, Solver};
pub use state::{Action, CoinSet, Direction, Position, State};
pub use storage::{PolicyExport, PolicyStore};

use crate::world::{ParseError, World};

/// Parse a grid and solve it in one call.
///
/// `future_reward` is the value available after the episode ends;
/// `conditional` grants it only when the episode passes (every green coin
/// collected, no red coin collected).
///
/// # Errors
/// Returns a [`ParseError`] when the grid text is malformed; solving never
/// starts on a malformed grid.
pub fn solve(grid_text: &str, future_reward: u32, conditional: bool) -> Result<Solution, ParseError> {
    let world = World::parse(grid_text)?;
    let config = SolveConfig::new()
        .with_future_reward(future_reward)
        .with_conditional(conditional);
    Ok(Solver::new(&world, config).run())
}
