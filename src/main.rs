use pokemon_battle_sim::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: pokemon-battle-sim --teams teams.json [--data data.json | --pokeapi] [--seed SEED] \
[--max-turns N] [--json] [--matrix [--sims-per-cell N] [--output matrix.csv]] [--log-level LEVEL]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<(CliOptions, LevelFilter)> {
    let mut teams_path = PathBuf::from("teams.json");
    let mut data_path = None;
    let mut use_pokeapi = false;
    let mut seed = 0u64;
    let mut max_turns = 500usize;
    let mut json = false;
    let mut matrix = false;
    let mut sims_per_cell = 100usize;
    let mut output_path = None;
    let mut log_level = LevelFilter::WARN;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--teams" => {
                teams_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--teams requires a path (e.g. --teams teams.json)")
                })?;
            }
            "--data" => {
                data_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--data requires a path (e.g. --data data.json)")
                })?);
            }
            "--pokeapi" => use_pokeapi = true,
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--max-turns" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-turns requires a number"))?;
                max_turns = val.parse()?;
            }
            "--json" => json = true,
            "--matrix" => matrix = true,
            "--sims-per-cell" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims-per-cell requires a number"))?;
                sims_per_cell = val.parse()?;
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?);
            }
            "--log-level" => {
                let val = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--log-level requires one of off, error, warn, info, debug, trace")
                })?;
                log_level = val.parse()?;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok((
        CliOptions {
            teams_path,
            data_path,
            use_pokeapi,
            seed,
            max_turns,
            json,
            matrix,
            sims_per_cell,
            output_path,
        },
        log_level,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (opts, log_level) = parse_args()?;
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();
    run(opts).await
}
