use crate::battle::{simulate_battle, BattleOptions, BattleResult};
use crate::combatant::{Combatant, MAX_ROSTER_SIZE};
use crate::data::MoveResolver;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct MatrixOptions {
    pub sims_per_cell: usize,
    pub seed: u64,
    /// Members drawn from each roster per selection.
    pub selection_size: usize,
    pub max_turns: usize,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            sims_per_cell: 100,
            seed: 0,
            selection_size: 3,
            max_turns: BattleOptions::default().max_turns,
        }
    }
}

/// All `k`-element index combinations of `0..len`, in lexicographic order.
fn combinations(len: usize, k: usize) -> Vec<Vec<usize>> {
    fn extend(start: usize, len: usize, k: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..len {
            current.push(i);
            extend(i + 1, len, k, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    if k > 0 && k <= len {
        extend(0, len, k, &mut Vec::with_capacity(k), &mut out);
    }
    out
}

fn selections(team: &[Combatant], k: usize) -> Vec<Vec<Combatant>> {
    combinations(team.len(), k)
        .iter()
        .map(|indices| indices.iter().map(|&idx| team[idx].clone()).collect())
        .collect()
}

/// Move names every battle in the matrix may look up.
pub fn required_moves(teams: &[&[Combatant]]) -> Vec<String> {
    let mut names: Vec<String> = teams
        .iter()
        .flat_map(|team| team.iter())
        .flat_map(|member| member.moveset().iter().map(|mv| mv.name.clone()))
        .collect();
    names.push(crate::battle::STRUGGLE.to_string());
    names.sort();
    names.dedup();
    names
}

/// Win rate of every team 1 selection (rows) against every team 2 selection
/// (columns). Draws and battles that hit the turn limit count as half a win.
///
/// Cells run in parallel, each on its own single-threaded runtime, so the resolver
/// should already hold every move the rosters use.
pub fn compute_matrix(
    resolver: &Arc<MoveResolver>,
    team1: &[Combatant],
    team2: &[Combatant],
    options: &MatrixOptions,
) -> anyhow::Result<Vec<Vec<f64>>> {
    if options.sims_per_cell == 0 {
        anyhow::bail!("sims per cell must be > 0");
    }
    let k = options.selection_size;
    let selections1 = selections(team1, k.min(team1.len()));
    let selections2 = selections(team2, k.min(team2.len()));
    let tasks: Vec<(usize, usize)> = (0..selections1.len())
        .flat_map(|a| (0..selections2.len()).map(move |b| (a, b)))
        .collect();
    log::info!(
        "computing {}x{} matchup matrix with {} battles per cell",
        selections1.len(),
        selections2.len(),
        options.sims_per_cell
    );

    let cell_results: Vec<CellResult> = tasks
        .par_iter()
        .map(|&(a_idx, b_idx)| -> anyhow::Result<CellResult> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let mut cell_rng =
                SmallRng::seed_from_u64(options.seed ^ ((a_idx as u64) << 32) ^ (b_idx as u64));
            let mut wins = 0u64;
            let mut ties = 0u64;
            for _ in 0..options.sims_per_cell {
                let battle = BattleOptions {
                    max_turns: options.max_turns,
                    seed: cell_rng.gen(),
                };
                let snapshot = runtime.block_on(simulate_battle(
                    resolver.clone(),
                    selections1[a_idx].clone(),
                    selections2[b_idx].clone(),
                    &battle,
                ))?;
                match snapshot.result {
                    Some(BattleResult::Team1Wins) => wins += 1,
                    Some(BattleResult::Team2Wins) => {}
                    Some(BattleResult::Draw) | None => ties += 1,
                }
            }
            let total = options.sims_per_cell as f64;
            Ok(CellResult {
                a_idx,
                b_idx,
                win_rate: (wins as f64 + 0.5 * ties as f64) / total,
            })
        })
        .collect::<anyhow::Result<_>>()?;

    let mut matrix = vec![vec![0.0; selections2.len()]; selections1.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    Ok(matrix)
}

pub fn write_csv(matrix: &[Vec<f64>], path: &std::path::Path) -> anyhow::Result<()> {
    std::fs::write(path, to_csv(matrix))?;
    Ok(())
}

pub fn to_csv(matrix: &[Vec<f64>]) -> String {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| format!("{value:.4}"))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}

pub fn validate_team_sizes(team1: &[Combatant], team2: &[Combatant]) -> anyhow::Result<()> {
    for (number, team) in [(1, team1), (2, team2)] {
        if team.is_empty() || team.len() > MAX_ROSTER_SIZE {
            anyhow::bail!(
                "Team {number} must have between 1 and {MAX_ROSTER_SIZE} Pokémon, got {}",
                team.len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_of_six_choose_three() {
        let combos = combinations(6, 3);
        assert_eq!(combos.len(), 20);
        assert_eq!(combos[0], vec![0, 1, 2]);
        assert_eq!(combos[19], vec![3, 4, 5]);
        assert!(combinations(2, 3).is_empty());
        assert_eq!(combinations(1, 1), vec![vec![0]]);
    }

    #[test]
    fn csv_rows_and_precision() {
        let csv = to_csv(&[vec![0.5, 1.0], vec![0.0, 0.123_45]]);
        assert_eq!(csv, "0.5000,1.0000\n0.0000,0.1235");
    }
}
