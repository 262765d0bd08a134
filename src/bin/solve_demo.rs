//! Demo driver: solves the built-in scenarios and plays them back.
//!
//! Runs the gauntlet and the evaluation pipeline, prints each episode's
//! outcome with a rendered final frame, and saves the full policy tables to
//! `solved_scenarios.json`.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use gridworld_solver::scenario::{
    evaluation_pipeline, gauntlet, render, run_scenario, solve_scenario_with_progress,
    ScenarioReport, ScenarioRun, SolvedScenario,
};

fn main() {
    println!("=== Grid-World Policy Solver ===\n");

    let total_start = Instant::now();
    let scenarios = vec![gauntlet(), evaluation_pipeline()];
    let mut reports = Vec::new();

    for (index, scenario) in scenarios.iter().enumerate() {
        println!(
            "[{}/{}] {} ({} episodes)",
            index + 1,
            scenarios.len(),
            scenario.name,
            scenario.episodes.len()
        );

        let scenario_start = Instant::now();
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("  {spinner} solving episode {msg}")
                .expect("static template is valid"),
        );

        let solved = solve_scenario_with_progress(scenario, |episode, stats| {
            bar.set_message(format!("{} ({} states)", episode + 1, stats.states));
            bar.tick();
            true
        });
        bar.finish_and_clear();

        let solved = match solved {
            Ok(Some(solved)) => solved,
            Ok(None) => unreachable!("demo solves are never cancelled"),
            Err(error) => {
                eprintln!("bad grid in scenario '{}': {}", scenario.name, error);
                std::process::exit(1);
            }
        };

        println!(
            "  solved in {:.2}s, max total value {}",
            scenario_start.elapsed().as_secs_f64(),
            solved.total_value()
        );

        let run = run_scenario(&solved);
        print_run(&solved, &run);

        reports.push(ScenarioReport::new(&solved));
    }

    println!("\n=== Complete ===");
    println!("Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    for report in &reports {
        report.print_summary();
    }

    let path = "solved_scenarios.json";
    match save_reports(&reports, path) {
        Ok(_) => println!("\nSaved policy tables: {}", path),
        Err(error) => eprintln!("\nError saving {}: {}", path, error),
    }
}

/// Print each played episode with its rendered final frame.
fn print_run(solved: &SolvedScenario, run: &ScenarioRun) {
    for (index, (episode, rollout)) in solved.episodes.iter().zip(&run.rollouts).enumerate() {
        println!(
            "  episode {} ({}): {} moves, {} coins ({} green, {} red), {}",
            index + 1,
            episode.def.label,
            rollout.moves(),
            rollout.coins(),
            rollout.green.len(),
            rollout.red.len(),
            if rollout.passed { "passed" } else { "failed" }
        );
        for line in render(&episode.world, rollout.end, rollout.green, rollout.red).lines() {
            println!("    {}", line);
        }
    }

    match run.stopped_at {
        Some(index) => println!(
            "  stopped: episode {} failed and its door stayed shut",
            index + 1
        ),
        None => println!(
            "  run complete: {} coins total ({} green, {} red)",
            run.total_coins(),
            run.total_green(),
            run.total_red()
        ),
    }
}

/// Save all scenario reports into one JSON file.
fn save_reports(reports: &[ScenarioReport], path: &str) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())
}
