use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use gridbot_runtime::agent::{Agent, Navigator};
use gridbot_runtime::config::SimConfig;
use gridbot_runtime::logging;
use gridbot_runtime::model::{CellKind, Grid, Position, scenario};
use gridbot_runtime::protocol::sequencer::{OrderMode, TaskSequencer};
use gridbot_runtime::protocol::{NavState, StepOutcome};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridbot", about = "Headless grid agent simulation")]
struct Cli {
    /// JSON config file, applied before GRIDBOT_* env overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    #[arg(long)]
    tasks: Option<usize>,
    #[arg(long)]
    obstacles: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// heuristic, gemini, openai, ollama or auto.
    #[arg(long)]
    order: Option<OrderMode>,
    #[arg(long, default_value_t = 500)]
    max_steps: usize,
    /// Toggle an obstacle before a step, as STEP:ROW,COL. Repeatable.
    #[arg(long = "edit", value_parser = parse_edit)]
    edits: Vec<Edit>,
    /// Only print the final grid and summary.
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Debug)]
struct Edit {
    before_step: usize,
    pos: Position,
}

fn parse_edit(s: &str) -> Result<Edit, String> {
    let (step, cell) = s.split_once(':').ok_or("expected STEP:ROW,COL")?;
    let (row, col) = cell.split_once(',').ok_or("expected STEP:ROW,COL")?;
    let number = |v: &str| v.trim().parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Edit {
        before_step: step
            .trim()
            .parse()
            .map_err(|e| format!("{step:?}: {e}"))?,
        pos: Position::new(number(row)?, number(col)?),
    })
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let base = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    let mut config = base.apply_env()?;

    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(tasks) = cli.tasks {
        config.num_tasks = tasks;
    }
    if let Some(obstacles) = cli.obstacles {
        config.num_obstacles = obstacles;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(order) = cli.order {
        config.order_mode = order;
    }
    Ok(config)
}

fn print_step(step: usize, outcome: &StepOutcome) {
    let mv = outcome
        .moved
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".into());
    let mut line = format!("step {step:>4}  {mv:<5}");
    if outcome.replanned {
        line.push_str(&format!("  {}", "replanned".yellow()));
    }
    for task in &outcome.skipped {
        line.push_str(&format!("  {}", format!("skipped {task}").red()));
    }
    if let Some(task) = outcome.collected {
        line.push_str(&format!("  {}", format!("collected {task}").green()));
    }
    if outcome.state == NavState::Complete {
        line.push_str(&format!("  {}", "mission complete".green().bold()));
    }
    println!("{line}");
}

fn render(grid: &Grid, nav: &Navigator) -> String {
    let path: HashSet<Position> = nav.path_cells(grid).into_iter().collect();
    let mut out = String::new();
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            let pos = Position::new(r as i32, c as i32);
            let cell = match grid.kind(pos) {
                Some(CellKind::Obstacle) => "#".bright_black(),
                Some(CellKind::Agent) => "A".blue().bold(),
                Some(CellKind::Task) => "T".green().bold(),
                _ if nav.completed().contains(&pos) => "x".dimmed(),
                _ if path.contains(&pos) => "*".yellow(),
                _ => ".".dimmed(),
            };
            out.push_str(&format!("{cell} "));
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init("warn");

    let config = load_config(&cli)?;
    let scenario = scenario::generate(&config)?;
    println!(
        "{} agent at {}, {} tasks, {}x{} grid",
        "Scenario:".bold(),
        scenario.agent,
        scenario.tasks.len(),
        config.rows,
        config.cols
    );
    let mut grid = scenario.grid;

    let sequencer = TaskSequencer::for_mode(config.order_mode, &config.providers);
    for (name, description) in sequencer.describe() {
        println!("  {} {}", format!("{name}:").cyan(), description.dimmed());
    }
    let mut nav = Navigator::for_grid(&grid, &sequencer)?;

    let order = nav
        .order()
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    println!("{} {}", "Order:".bold(), order);
    println!("{}", render(&grid, &nav));

    for step in 1..=cli.max_steps {
        if nav.is_complete() {
            break;
        }
        for edit in cli.edits.iter().filter(|e| e.before_step == step) {
            match grid.toggle_obstacle(edit.pos) {
                Ok(kind) => println!("edit  {} -> {:?}", edit.pos, kind),
                Err(err) => println!("edit  {} ignored: {}", edit.pos, err),
            }
        }
        let outcome = nav.step(&mut grid);
        if !cli.quiet {
            print_step(step, &outcome);
        }
    }

    println!("\n{}", render(&grid, &nav));
    println!("{}", nav.summary().bold());
    for event in nav.log().milestones() {
        println!("  [{}] {}", event.label(), event);
    }
    Ok(())
}
