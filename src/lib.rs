pub mod battle;
pub mod battle_log;
pub mod combatant;
pub mod damage;
pub mod data;
pub mod errors;
pub mod matrix;
pub mod model;
pub mod moveset;
pub mod rng;
pub mod stats;
pub mod team;
pub mod types;

use crate::battle::{simulate_battle, BattleOptions, BattleResult};
use crate::combatant::Combatant;
use crate::data::{DataProvider, LocalDataProvider, MoveResolver, PokeApiProvider};
use crate::matrix::{
    compute_matrix, required_moves, to_csv, validate_team_sizes, write_csv, MatrixOptions,
};
use crate::model::{CombatantSpec, TeamsFile};
use crate::moveset::generate_random_moveset;
use crate::rng::RandomSource;
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub teams_path: PathBuf,
    pub data_path: Option<PathBuf>,
    pub use_pokeapi: bool,
    pub seed: u64,
    pub max_turns: usize,
    pub json: bool,
    pub matrix: bool,
    pub sims_per_cell: usize,
    pub output_path: Option<PathBuf>,
}

pub fn load_teams(path: &Path) -> anyhow::Result<TeamsFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read teams file at {}", path.display()))?;
    let parsed: TeamsFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed)
}

pub fn load_data(path: &Path) -> anyhow::Result<LocalDataProvider> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file at {}", path.display()))?;
    LocalDataProvider::from_json(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}

/// Turns teams-file entries into combatants, generating a random moveset for any
/// entry that does not list its moves.
pub async fn build_roster<R: RandomSource + ?Sized>(
    provider: &dyn DataProvider,
    specs: &[CombatantSpec],
    rng: &mut R,
) -> anyhow::Result<Vec<Combatant>> {
    let mut roster = Vec::with_capacity(specs.len());
    for spec in specs {
        let species = provider
            .fetch_species(&spec.species)
            .await
            .with_context(|| format!("Unknown species {}", spec.species))?;
        let moveset = match &spec.moves {
            Some(_) => None,
            None => Some(generate_random_moveset(&species, rng)),
        };
        let mut combatant = Combatant::from_spec(species, spec)
            .with_context(|| format!("Invalid entry for {}", spec.species))?;
        if let Some(moveset) = moveset {
            combatant.set_moveset(moveset)?;
        }
        roster.push(combatant);
    }
    Ok(roster)
}

fn describe(result: Option<BattleResult>) -> &'static str {
    match result {
        Some(BattleResult::Team1Wins) => "Team 1 won",
        Some(BattleResult::Team2Wins) => "Team 2 won",
        Some(BattleResult::Draw) => "Draw",
        None => "No result (turn limit reached)",
    }
}

pub async fn run(opts: CliOptions) -> anyhow::Result<()> {
    let provider: Arc<dyn DataProvider> = if opts.use_pokeapi {
        Arc::new(PokeApiProvider::new())
    } else {
        let path = opts
            .data_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--data is required unless --pokeapi is set"))?;
        Arc::new(load_data(path)?)
    };
    let resolver = Arc::new(MoveResolver::new(provider.clone()));

    let teams = load_teams(&opts.teams_path)?;
    let mut rng = SmallRng::seed_from_u64(opts.seed);
    let team1 = build_roster(provider.as_ref(), &teams.team1, &mut rng)
        .await
        .context("Failed to build team 1")?;
    let team2 = build_roster(provider.as_ref(), &teams.team2, &mut rng)
        .await
        .context("Failed to build team 2")?;
    validate_team_sizes(&team1, &team2)?;

    if opts.matrix {
        for name in required_moves(&[&team1, &team2]) {
            if let Err(err) = resolver.resolve(&name).await {
                log::warn!("{err}; turns using it will be skipped");
            }
        }
        let options = MatrixOptions {
            sims_per_cell: opts.sims_per_cell,
            seed: opts.seed,
            max_turns: opts.max_turns,
            ..MatrixOptions::default()
        };
        let win_rates = tokio::task::spawn_blocking(move || {
            compute_matrix(&resolver, &team1, &team2, &options)
        })
        .await
        .context("Matrix computation panicked")??;
        match &opts.output_path {
            Some(path) => {
                write_csv(&win_rates, path)?;
                println!(
                    "Wrote {}x{} matrix to {}",
                    win_rates.len(),
                    win_rates.first().map(|r| r.len()).unwrap_or(0),
                    path.display()
                );
            }
            None => println!("{}", to_csv(&win_rates)),
        }
        return Ok(());
    }

    let options = BattleOptions {
        max_turns: opts.max_turns,
        seed: opts.seed,
    };
    let snapshot = simulate_battle(resolver, team1, team2, &options).await?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for line in &snapshot.log {
            println!("{line}");
        }
        println!(
            "{} after {} turns.",
            describe(snapshot.result),
            snapshot.turns_taken
        );
    }
    Ok(())
}
