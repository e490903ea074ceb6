//! npc-sim: headless runner for the NPC decision engine.
//!
//! - `npc-sim run` - load a scenario and advance it tick by tick
//! - `npc-sim path` - query the pathfinder on a station
//! - `npc-sim init` - write a starter scenario file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use npc_brain::{AiEvent, AlertSignal, ContestPerception, Scenario, TickReport};
use npc_core::{Coord, GridView, StationView};
use npc_nav::{path_cost, PathResult, Pathfinder, StationGrid};

const DEFAULT_SCENARIO: &str = include_str!("default_scenario.yaml");

#[derive(Parser)]
#[command(name = "npc-sim")]
#[command(about = "Headless NPC decision engine runner", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance a scenario
    Run {
        /// Scenario file; the built-in outpost scenario when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of ticks to run
        #[arg(short, long, default_value_t = 20)]
        ticks: u64,

        /// Override the scenario seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print each tick report as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Find a path between two tiles
    Path {
        /// Start tile as `x,y`
        #[arg(long, value_parser = parse_coord)]
        from: Coord,

        /// Goal tile as `x,y`
        #[arg(long, value_parser = parse_coord)]
        to: Coord,

        /// Take the station from this scenario instead of the outpost
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Barricade these rooms first
        #[arg(long)]
        barricade: Vec<String>,
    },

    /// Write a starter scenario
    Init {
        /// Destination file
        #[arg(default_value = "scenario.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            seed,
            json,
        } => run_scenario(scenario.as_deref(), ticks, seed, json),
        Commands::Path {
            from,
            to,
            scenario,
            barricade,
        } => find_path(from, to, scenario.as_deref(), &barricade),
        Commands::Init { output, force } => init_scenario(&output, force),
    }
}

fn parse_coord(raw: &str) -> Result<Coord, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in `{raw}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in `{raw}`: {e}"))?;
    Ok(Coord::new(x, y))
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display())),
        None => Scenario::from_yaml_str(DEFAULT_SCENARIO).context("Built-in scenario is invalid"),
    }
}

fn run_scenario(path: Option<&Path>, ticks: u64, seed: Option<u64>, json: bool) -> Result<()> {
    let mut scenario = load_scenario(path)?;
    if let Some(seed) = seed {
        let mut file = scenario.file().clone();
        file.seed = seed;
        scenario = Scenario::from_file(file)?;
    }
    tracing::info!(
        actors = scenario.actors().len(),
        seed = scenario.file().seed,
        ticks,
        "Starting simulation"
    );

    let (mut scheduler, mut grid) = scenario.build();
    let listener = scheduler.channel().subscribe();
    let mut perception = ContestPerception::default();

    for _ in 0..ticks {
        let report = scheduler.advance_tick(&mut grid, Some(&mut perception));
        for event in listener.drain() {
            log_event(&event);
        }
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report, |id| {
                scheduler
                    .actor(id)
                    .map(|a| format!("{} {}", a.name, a.pos))
                    .unwrap_or_else(|| id.to_string())
            });
        }
    }

    let stats = scheduler.pathfinder().stats();
    tracing::info!(
        ticks = scheduler.tick(),
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        "Simulation finished"
    );
    Ok(())
}

fn print_report(report: &TickReport, describe: impl Fn(npc_core::ActorId) -> String) {
    println!(
        "tick {:>3}  hour {:02}  budget {}/{}{}",
        report.tick,
        report.hour,
        report.budget_spent,
        report.budget_limit,
        if report.alert.active {
            format!("  ALERT ({} turns)", report.alert.turns_remaining)
        } else {
            String::new()
        }
    );
    for (id, decision) in &report.decisions {
        println!("  {:<28} {:?}", describe(*id), decision);
    }
}

fn log_event(event: &AiEvent) {
    match event {
        AiEvent::Attack {
            attacker, target, ..
        } => tracing::info!(%attacker, %target, "Attack"),
        AiEvent::Confrontation { actor, quarry, .. } => {
            tracing::info!(%actor, %quarry, "Confrontation")
        }
        AiEvent::Alert { signal, .. } => match signal {
            AlertSignal::Raised { observer, .. } => tracing::info!(%observer, "Alert raised"),
            AlertSignal::Easing { message, .. } | AlertSignal::StandDown { message } => {
                tracing::info!("{message}")
            }
        },
        AiEvent::BarricadeAttempt { actor, message, .. } => tracing::info!(%actor, "{message}"),
        other => tracing::debug!(event = ?other, "Event"),
    }
}

fn find_path(
    from: Coord,
    to: Coord,
    scenario: Option<&Path>,
    barricades: &[String],
) -> Result<()> {
    let mut grid: StationGrid = match scenario {
        Some(_) => load_scenario(scenario)?.grid().clone(),
        None => StationGrid::outpost(),
    };
    for room in barricades {
        if grid.room(room).is_none() {
            bail!("Unknown room `{room}`");
        }
        grid.barricade(room);
    }
    for at in [from, to] {
        if !grid.in_bounds(at) {
            bail!("{at} is outside the {}x{} station", grid.width(), grid.height());
        }
    }

    let mut pathfinder = Pathfinder::new();
    match pathfinder.find_path(from, to, &grid, 0) {
        PathResult::Found(tiles) => {
            println!(
                "{} -> {}: {} steps, cost {:.3}",
                grid.room_name_of(from),
                grid.room_name_of(to),
                tiles.len() - 1,
                path_cost(&tiles)
            );
            for at in &tiles {
                println!("  {at}  {}", grid.room_name_of(*at));
            }
        }
        PathResult::NoPath => {
            let (dx, dy) = from.step_toward(to);
            println!("No path from {from} to {to}; greedy step would be ({dx}, {dy})");
        }
    }
    Ok(())
}

fn init_scenario(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    std::fs::write(output, DEFAULT_SCENARIO)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote starter scenario to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  npc-sim run --scenario {}", output.display());
    Ok(())
}
