//! Report formatting for solved scenarios.
//!
//! Reports are plain serde structures keyed by canonical state keys, so a
//! saved JSON file is enough to replay a policy elsewhere.

use std::fs::File;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::solver::{CoinSet, PolicyExport, Position};
use crate::world::{Cell, World};

use super::SolvedScenario;

/// Summary of one solved episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// The episode's display label.
    pub label: String,

    /// The grid text it was built from.
    pub grid: String,

    /// Whether a door gates the rest of the scenario behind this episode.
    pub gate_after: bool,

    /// Best achievable value from the start state.
    pub start_value: u32,

    /// Number of reachable states finalized.
    pub states: usize,

    /// Value and policy tables keyed by canonical state keys.
    pub tables: PolicyExport,
}

/// Summary of a whole solved scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// The scenario's display name.
    pub name: String,

    /// Maximum achievable value across the scenario.
    pub total_value: u32,

    /// Per-episode reports, in play order.
    pub episodes: Vec<EpisodeReport>,
}

impl ScenarioReport {
    /// Build a report from a solved scenario.
    pub fn new(solved: &SolvedScenario) -> Self {
        let episodes = solved
            .episodes
            .iter()
            .map(|episode| EpisodeReport {
                label: episode.def.label.clone(),
                grid: episode.def.grid.clone(),
                gate_after: episode.def.gate_after,
                start_value: episode.solution.start_value(),
                states: episode.solution.len(),
                tables: episode.solution.export(),
            })
            .collect();

        Self {
            name: solved.name.clone(),
            total_value: solved.total_value(),
            episodes,
        }
    }

    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }

    /// Print a one-line-per-episode summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.name);
        println!("Max total value: {}", self.total_value);
        for (index, episode) in self.episodes.iter().enumerate() {
            println!(
                "  [{}] {:<12} value {:>3} | {:>5} states | {}",
                index + 1,
                episode.label,
                episode.start_value,
                episode.states,
                if episode.gate_after { "door after" } else { "open" }
            );
        }
    }
}

/// Render a world state as ANSI-colored text.
///
/// Uncollected coins show as colored `o`, doors as `D` (shut, yellow) or `/`
/// (open, recomputed from the given sets), the current position as a cyan
/// `@` drawn over whatever it stands on.
pub fn render(world: &World, pos: Position, green: CoinSet, red: CoinSet) -> String {
    let mut out = String::new();
    for row in 0..world.rows() {
        for col in 0..world.cols() {
            let cell_pos = Position::new(row, col);
            if cell_pos == pos {
                out.push_str("\x1b[1;36m@\x1b[0m");
                continue;
            }
            if world
                .green_coins()
                .iter()
                .any(|c| c.pos == cell_pos && !green.contains(c.id))
            {
                out.push_str("\x1b[32mo\x1b[0m");
                continue;
            }
            if world
                .red_coins()
                .iter()
                .any(|c| c.pos == cell_pos && !red.contains(c.id))
            {
                out.push_str("\x1b[31mo\x1b[0m");
                continue;
            }
            match world.cell(cell_pos) {
                Cell::Wall => out.push('#'),
                Cell::Floor => out.push('.'),
                Cell::Door(index) => {
                    if world.doors()[index].is_open(green, red) {
                        out.push_str("\x1b[33m/\x1b[0m");
                    } else {
                        out.push_str("\x1b[33mD\x1b[0m");
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}
