//! Team-building helpers: random quick-battle teams, ratings, analysis, member
//! suggestions and share codes.

use crate::combatant::{Combatant, Roster, MAX_ROSTER_SIZE};
use crate::errors::RosterError;
use crate::model::{Species, StatName};
use crate::moveset::generate_random_moveset;
use crate::rng::{shuffle, RandomSource};
use crate::stats::Nature;
use crate::types::{strengths, weaknesses, PokemonType};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Abilities handed out to randomly generated combatants. They carry no mechanics.
pub const RANDOM_ABILITIES: [&str; 4] = ["Adaptability", "Huge Power", "Thick Fat", "Super Luck"];

const RANDOM_LEVEL_MIN: u8 = 5;
const RANDOM_LEVEL_SPAN: f64 = 95.0;

/// A combatant with a random level in 5..=99, ability, nature and moveset.
pub fn random_combatant<R: RandomSource + ?Sized>(
    species: &Species,
    rng: &mut R,
) -> Result<Combatant, RosterError> {
    let level = (rng.unit() * RANDOM_LEVEL_SPAN).floor() as u8 + RANDOM_LEVEL_MIN;
    let ability = RANDOM_ABILITIES[rng.index(RANDOM_ABILITIES.len())];
    let nature = Nature::ALL[rng.index(Nature::ALL.len())];
    let moveset = generate_random_moveset(species, rng);
    Combatant::new(species.clone(), level)?
        .with_ability(ability)
        .with_nature(nature)
        .with_moveset(moveset)
}

/// Draws `size` distinct species from `pool` and randomizes each of them.
pub fn generate_random_team<R: RandomSource + ?Sized>(
    pool: &[Species],
    size: usize,
    rng: &mut R,
) -> Result<Roster, RosterError> {
    if size > MAX_ROSTER_SIZE {
        return Err(RosterError::Full(size));
    }
    let mut picks: Vec<&Species> = pool.iter().collect();
    shuffle(&mut picks, rng);
    let members = picks
        .into_iter()
        .take(size)
        .map(|species| random_combatant(species, rng))
        .collect::<Result<Vec<_>, _>>()?;
    Roster::from_members(members)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRating {
    pub type_coverage: f64,
    pub stats_balance: f64,
    pub team_size: f64,
    pub overall: f64,
    pub suggestions: Vec<String>,
}

/// Scores a team from 0 to 100 on type coverage, stat balance and size.
pub fn rate_team(team: &[Combatant]) -> TeamRating {
    let type_coverage = type_coverage_score(team);
    let stats_balance = stats_balance_score(team);
    let team_size = team.len() as f64 / MAX_ROSTER_SIZE as f64 * 100.0;
    let overall = (type_coverage + stats_balance + team_size) / 3.0;

    let mut suggestions = Vec::new();
    if type_coverage < 60.0 {
        suggestions.push(
            "Consider adding Pokémon with different types to improve type coverage.".to_string(),
        );
    }
    if stats_balance < 60.0 {
        suggestions.push(
            "Try to balance your team's stats by including Pokémon with diverse stat distributions."
                .to_string(),
        );
    }
    if team_size < 100.0 {
        suggestions.push(format!(
            "Add {} more Pokémon to complete your team.",
            MAX_ROSTER_SIZE.saturating_sub(team.len())
        ));
    }
    if suggestions.is_empty() {
        suggestions.push(
            "Great job! Your team looks well-balanced. Keep experimenting to find the perfect combination."
                .to_string(),
        );
    }

    TeamRating {
        type_coverage,
        stats_balance,
        team_size,
        overall,
        suggestions,
    }
}

fn type_coverage_score(team: &[Combatant]) -> f64 {
    let mut covered = BTreeSet::new();
    let mut weak_to = BTreeSet::new();
    for member in team {
        for &t in member.types() {
            covered.extend(strengths(t));
            weak_to.extend(weaknesses(t));
        }
    }
    let total = PokemonType::ALL.len() as f64;
    (covered.len() as f64 / total + (1.0 - weak_to.len() as f64 / total)) * 50.0
}

fn stats_balance_score(team: &[Combatant]) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    let averages: Vec<f64> = StatName::ALL
        .iter()
        .map(|&name| {
            let total: u32 = team.iter().filter_map(|m| m.stat(name)).sum();
            f64::from(total) / team.len() as f64
        })
        .collect();
    let mean = averages.iter().sum::<f64>() / averages.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance =
        averages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / averages.len() as f64;
    (100.0 - variance.sqrt() / mean * 100.0).clamp(0.0, 100.0)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TeamAnalysis {
    pub type_counts: BTreeMap<PokemonType, usize>,
    /// Defending types the team's types hit super effectively, by how many members.
    pub strengths: BTreeMap<PokemonType, usize>,
    pub weaknesses: BTreeMap<PokemonType, usize>,
    /// Rounded per-stat averages across the team.
    pub average_stats: Vec<(StatName, u32)>,
}

pub fn analyze_team(team: &[Combatant]) -> TeamAnalysis {
    let mut analysis = TeamAnalysis::default();
    for member in team {
        for &t in member.types() {
            *analysis.type_counts.entry(t).or_default() += 1;
            for strong in strengths(t) {
                *analysis.strengths.entry(strong).or_default() += 1;
            }
            for weak in weaknesses(t) {
                *analysis.weaknesses.entry(weak).or_default() += 1;
            }
        }
    }
    if !team.is_empty() {
        analysis.average_stats = StatName::ALL
            .iter()
            .map(|&name| {
                let total: u32 = team.iter().filter_map(|m| m.stat(name)).sum();
                (name, (f64::from(total) / team.len() as f64).round() as u32)
            })
            .collect();
    }
    analysis
}

pub const MAX_SUGGESTIONS: usize = 3;
/// Smallest base-stat gap from the team average worth mentioning in a suggestion.
const NOTABLE_STAT_GAP: i64 = 20;

/// A pool species proposed to cover the team's type weaknesses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemberSuggestion {
    pub species: Species,
    /// The suggested type this species was picked for.
    pub covers: PokemonType,
    pub reason: String,
}

/// Proposes up to three species from `pool` whose types hit the team's
/// weaknesses super effectively, one per suggested type.
///
/// Suggested types are visited in chart order and the first matching species in
/// the pool wins. Species already on the team are skipped.
pub fn suggest_members(team: &[Combatant], pool: &[Species]) -> Vec<MemberSuggestion> {
    if team.is_empty() {
        return Vec::new();
    }
    let weak_to: BTreeSet<PokemonType> = team
        .iter()
        .flat_map(|member| member.types().iter().flat_map(|&t| weaknesses(t)))
        .collect();
    let weak_list = weak_to
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let averages: Vec<(StatName, i64)> = StatName::ALL
        .iter()
        .map(|&name| {
            let total: u32 = team
                .iter()
                .filter_map(|m| m.species().base_stat(name))
                .sum();
            (name, (f64::from(total) / team.len() as f64).round() as i64)
        })
        .collect();

    let mut picked: Vec<MemberSuggestion> = Vec::new();
    for covering in PokemonType::ALL
        .into_iter()
        .filter(|&t| strengths(t).any(|strong| weak_to.contains(&strong)))
    {
        if picked.len() >= MAX_SUGGESTIONS {
            break;
        }
        let candidate = pool.iter().find(|species| {
            species.types.contains(&covering)
                && team.iter().all(|m| m.name() != species.name)
                && picked.iter().all(|s| s.species.name != species.name)
        });
        let Some(species) = candidate else {
            continue;
        };
        let gaps: Vec<String> = averages
            .iter()
            .filter_map(|&(name, average)| {
                let diff = i64::from(species.base_stat(name)?) - average;
                if diff.abs() < NOTABLE_STAT_GAP {
                    return None;
                }
                Some(if diff > 0 {
                    format!("higher {} (+{diff})", name.as_str())
                } else {
                    format!("lower {} ({diff})", name.as_str())
                })
            })
            .collect();
        let stat_reason = if gaps.is_empty() {
            "Its stats are similar to your team's average.".to_string()
        } else {
            format!("It has {} compared to your team's average.", gaps.join(", "))
        };
        picked.push(MemberSuggestion {
            species: species.clone(),
            covers: covering,
            reason: format!(
                "{} is a {covering}-type Pokémon that can help cover your team's weakness to {weak_list} types. {stat_reason}",
                species.name
            ),
        });
    }
    picked
}

#[derive(Debug, Error)]
pub enum ShareCodeError {
    #[error("share code is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("share code does not contain a team")]
    Json(#[from] serde_json::Error),
    #[error("shared team is invalid")]
    Roster(#[from] RosterError),
}

/// Encodes a team as base64 JSON.
pub fn encode_team(team: &Roster) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(team.members())?;
    Ok(BASE64_STANDARD.encode(json))
}

/// Decodes a share code, recomputing every member's stats from its level.
pub fn decode_team(code: &str) -> Result<Roster, ShareCodeError> {
    let raw = BASE64_STANDARD.decode(code.trim())?;
    let mut members: Vec<Combatant> = serde_json::from_slice(&raw)?;
    for member in &mut members {
        member.set_level(member.level())?;
    }
    Ok(Roster::from_members(members)?)
}
