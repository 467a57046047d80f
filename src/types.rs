use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 18 elemental types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Electric,
        PokemonType::Grass,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Dark,
        PokemonType::Steel,
        PokemonType::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PokemonType::Normal => "normal",
            PokemonType::Fire => "fire",
            PokemonType::Water => "water",
            PokemonType::Electric => "electric",
            PokemonType::Grass => "grass",
            PokemonType::Ice => "ice",
            PokemonType::Fighting => "fighting",
            PokemonType::Poison => "poison",
            PokemonType::Ground => "ground",
            PokemonType::Flying => "flying",
            PokemonType::Psychic => "psychic",
            PokemonType::Bug => "bug",
            PokemonType::Rock => "rock",
            PokemonType::Ghost => "ghost",
            PokemonType::Dragon => "dragon",
            PokemonType::Dark => "dark",
            PokemonType::Steel => "steel",
            PokemonType::Fairy => "fairy",
        }
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownTypeError(pub String);

impl fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type {}", self.0)
    }
}

impl std::error::Error for UnknownTypeError {}

impl FromStr for PokemonType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        PokemonType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| UnknownTypeError(s.to_string()))
    }
}

type Row = &'static [(PokemonType, f64)];

// Attacking type -> defending types whose multiplier differs from 1.
static TYPE_CHART: phf::Map<&'static str, Row> = phf_map! {
    "normal" => &[
        (PokemonType::Rock, 0.5),
        (PokemonType::Ghost, 0.0),
        (PokemonType::Steel, 0.5),
    ],
    "fire" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Water, 0.5),
        (PokemonType::Grass, 2.0),
        (PokemonType::Ice, 2.0),
        (PokemonType::Bug, 2.0),
        (PokemonType::Rock, 0.5),
        (PokemonType::Dragon, 0.5),
        (PokemonType::Steel, 2.0),
    ],
    "water" => &[
        (PokemonType::Fire, 2.0),
        (PokemonType::Water, 0.5),
        (PokemonType::Grass, 0.5),
        (PokemonType::Ground, 2.0),
        (PokemonType::Rock, 2.0),
        (PokemonType::Dragon, 0.5),
    ],
    "electric" => &[
        (PokemonType::Water, 2.0),
        (PokemonType::Electric, 0.5),
        (PokemonType::Grass, 0.5),
        (PokemonType::Ground, 0.0),
        (PokemonType::Flying, 2.0),
        (PokemonType::Dragon, 0.5),
    ],
    "grass" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Water, 2.0),
        (PokemonType::Grass, 0.5),
        (PokemonType::Poison, 0.5),
        (PokemonType::Ground, 2.0),
        (PokemonType::Flying, 0.5),
        (PokemonType::Bug, 0.5),
        (PokemonType::Rock, 2.0),
        (PokemonType::Dragon, 0.5),
        (PokemonType::Steel, 0.5),
    ],
    "ice" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Water, 0.5),
        (PokemonType::Grass, 2.0),
        (PokemonType::Ice, 0.5),
        (PokemonType::Ground, 2.0),
        (PokemonType::Flying, 2.0),
        (PokemonType::Dragon, 2.0),
        (PokemonType::Steel, 0.5),
    ],
    "fighting" => &[
        (PokemonType::Normal, 2.0),
        (PokemonType::Ice, 2.0),
        (PokemonType::Poison, 0.5),
        (PokemonType::Flying, 0.5),
        (PokemonType::Psychic, 0.5),
        (PokemonType::Bug, 0.5),
        (PokemonType::Rock, 2.0),
        (PokemonType::Ghost, 0.0),
        (PokemonType::Dark, 2.0),
        (PokemonType::Steel, 2.0),
        (PokemonType::Fairy, 0.5),
    ],
    "poison" => &[
        (PokemonType::Grass, 2.0),
        (PokemonType::Poison, 0.5),
        (PokemonType::Ground, 0.5),
        (PokemonType::Rock, 0.5),
        (PokemonType::Ghost, 0.5),
        (PokemonType::Steel, 0.0),
        (PokemonType::Fairy, 2.0),
    ],
    "ground" => &[
        (PokemonType::Fire, 2.0),
        (PokemonType::Electric, 2.0),
        (PokemonType::Grass, 0.5),
        (PokemonType::Poison, 2.0),
        (PokemonType::Flying, 0.0),
        (PokemonType::Bug, 0.5),
        (PokemonType::Rock, 2.0),
        (PokemonType::Steel, 2.0),
    ],
    "flying" => &[
        (PokemonType::Electric, 0.5),
        (PokemonType::Grass, 2.0),
        (PokemonType::Fighting, 2.0),
        (PokemonType::Bug, 2.0),
        (PokemonType::Rock, 0.5),
        (PokemonType::Steel, 0.5),
    ],
    "psychic" => &[
        (PokemonType::Fighting, 2.0),
        (PokemonType::Poison, 2.0),
        (PokemonType::Psychic, 0.5),
        (PokemonType::Dark, 0.0),
        (PokemonType::Steel, 0.5),
    ],
    "bug" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Grass, 2.0),
        (PokemonType::Fighting, 0.5),
        (PokemonType::Poison, 0.5),
        (PokemonType::Flying, 0.5),
        (PokemonType::Psychic, 2.0),
        (PokemonType::Ghost, 0.5),
        (PokemonType::Dark, 2.0),
        (PokemonType::Steel, 0.5),
        (PokemonType::Fairy, 0.5),
    ],
    "rock" => &[
        (PokemonType::Fire, 2.0),
        (PokemonType::Ice, 2.0),
        (PokemonType::Fighting, 0.5),
        (PokemonType::Ground, 0.5),
        (PokemonType::Flying, 2.0),
        (PokemonType::Bug, 2.0),
        (PokemonType::Steel, 0.5),
    ],
    "ghost" => &[
        (PokemonType::Normal, 0.0),
        (PokemonType::Psychic, 2.0),
        (PokemonType::Ghost, 2.0),
        (PokemonType::Dark, 0.5),
    ],
    "dragon" => &[
        (PokemonType::Dragon, 2.0),
        (PokemonType::Steel, 0.5),
        (PokemonType::Fairy, 0.0),
    ],
    "dark" => &[
        (PokemonType::Fighting, 0.5),
        (PokemonType::Psychic, 2.0),
        (PokemonType::Ghost, 2.0),
        (PokemonType::Dark, 0.5),
        (PokemonType::Fairy, 0.5),
    ],
    "steel" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Water, 0.5),
        (PokemonType::Electric, 0.5),
        (PokemonType::Ice, 2.0),
        (PokemonType::Rock, 2.0),
        (PokemonType::Steel, 0.5),
        (PokemonType::Fairy, 2.0),
    ],
    "fairy" => &[
        (PokemonType::Fire, 0.5),
        (PokemonType::Fighting, 2.0),
        (PokemonType::Poison, 0.5),
        (PokemonType::Dragon, 2.0),
        (PokemonType::Dark, 2.0),
        (PokemonType::Steel, 0.5),
    ],
};

/// Damage multiplier of an `attacking` move against a defender with the given types.
///
/// Multipliers of each defending type multiply together, so the result is one of
/// 0, 0.25, 0.5, 1, 2 or 4 for one- and two-typed defenders.
pub fn effectiveness(attacking: PokemonType, defending: &[PokemonType]) -> f64 {
    defending
        .iter()
        .map(|defender| single_type_effectiveness(attacking, *defender))
        .product()
}

pub fn single_type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
    TYPE_CHART
        .get(attacking.as_str())
        .and_then(|row| row.iter().find(|(t, _)| *t == defending))
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// Defending types this attacking type hits for double damage.
pub fn strengths(attacking: PokemonType) -> impl Iterator<Item = PokemonType> {
    PokemonType::ALL
        .into_iter()
        .filter(move |defending| single_type_effectiveness(attacking, *defending) > 1.0)
}

/// Attacking types that hit this defending type for double damage.
pub fn weaknesses(defending: PokemonType) -> impl Iterator<Item = PokemonType> {
    PokemonType::ALL
        .into_iter()
        .filter(move |attacking| single_type_effectiveness(*attacking, defending) > 1.0)
}
