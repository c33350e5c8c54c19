mod policy;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use stranded_game::{GameController, GameState, Scenario};

use policy::Policy;

const TURN_CEILING: u32 = 24;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Forest,
    Mountain,
    Desert,
    All,
}

impl ScenarioArg {
    fn scenarios(self) -> Vec<(&'static str, Scenario)> {
        match self {
            Self::Forest => vec![("forest", Scenario::forest_autumn())],
            Self::Mountain => vec![("mountain", Scenario::mountain_winter())],
            Self::Desert => vec![("desert", Scenario::desert_summer())],
            Self::All => vec![
                ("forest", Scenario::forest_autumn()),
                ("mountain", Scenario::mountain_winter()),
                ("desert", Scenario::desert_summer()),
            ],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stranded-sim", version)]
#[command(about = "Headless campaign runner for the Stranded survival engine")]
struct Args {
    /// Scenario preset to run
    #[arg(long, value_enum, default_value_t = ScenarioArg::All)]
    scenario: ScenarioArg,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Decision policy driving every run
    #[arg(long, value_enum, default_value_t = Policy::Cautious)]
    policy: Policy,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// Verbose per-turn output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct RunRecord {
    scenario: &'static str,
    seed: u64,
    outcome: String,
    reason: String,
    turns: u32,
    survival_probability: f32,
    crossings: usize,
    principles: usize,
}

fn split_seeds(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("bad seed '{s}'")))
        .collect()
}

fn run_campaign(
    label: &'static str,
    scenario: Scenario,
    seed: u64,
    policy: Policy,
    verbose: bool,
) -> Result<RunRecord> {
    let mut controller = GameController::new(seed);
    let mut state = GameState::new(scenario, Vec::new());

    while !state.is_ended() {
        let offers = controller.available_decisions(&state);
        if offers.is_empty() {
            bail!("active game offered no decisions (scenario {label}, seed {seed})");
        }
        let pick = policy.choose(&offers, &state);
        let next = controller
            .make_decision(&state, &pick)
            .with_context(|| format!("resolving '{pick}' on turn {}", state.turn))?;
        if verbose {
            let outcome = next.history.last().expect("accepted decision recorded");
            log::info!(
                "seed {seed} turn {}: {pick} -> {} ({})",
                state.turn,
                outcome.tier,
                outcome.quality
            );
        }
        if next.turn > TURN_CEILING {
            bail!("campaign overran the turn ceiling (scenario {label}, seed {seed})");
        }
        state = next;
    }

    let outcome = state
        .outcome
        .as_ref()
        .context("ended game is missing its outcome")?;
    Ok(RunRecord {
        scenario: label,
        seed,
        outcome: outcome.kind.key().to_string(),
        reason: outcome.reason.key().to_string(),
        turns: state.turn,
        survival_probability: state.metrics.survival_probability,
        crossings: state.crossings.len(),
        principles: state.principles.len(),
    })
}

fn print_console(records: &[RunRecord]) {
    println!("{}", "stranded-sim campaign report".bold());
    for record in records {
        let outcome = match record.outcome.as_str() {
            "survived" => record.outcome.green(),
            "barely_survived" => record.outcome.yellow(),
            _ => record.outcome.red(),
        };
        println!(
            "  {:<8} seed {:<12} {:<16} via {:<18} turns {:<3} sp {:>5.1} crossings {:<3} principles {}",
            record.scenario,
            record.seed,
            outcome,
            record.reason,
            record.turns,
            record.survival_probability,
            record.crossings,
            record.principles,
        );
    }
    let survived = records.iter().filter(|r| r.outcome == "survived").count();
    let barely = records
        .iter()
        .filter(|r| r.outcome == "barely_survived")
        .count();
    let died = records.iter().filter(|r| r.outcome == "died").count();
    println!(
        "{}: {} survived, {} barely, {} died of {} runs",
        "totals".bold(),
        survived.to_string().green(),
        barely.to_string().yellow(),
        died.to_string().red(),
        records.len()
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let seeds = split_seeds(&args.seeds)?;
    if seeds.is_empty() {
        bail!("no seeds supplied");
    }

    let mut records = Vec::new();
    for (label, scenario) in args.scenario.scenarios() {
        for &seed in &seeds {
            records.push(run_campaign(
                label,
                scenario.clone(),
                seed,
                args.policy,
                args.verbose,
            )?);
        }
    }

    match args.report.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => print_console(&records),
    }
    Ok(())
}
