use crate::types::PokemonType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatName {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatName {
    pub const ALL: [StatName; 6] = [
        StatName::Hp,
        StatName::Attack,
        StatName::Defense,
        StatName::SpecialAttack,
        StatName::SpecialDefense,
        StatName::Speed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatName::Hp => "hp",
            StatName::Attack => "attack",
            StatName::Defense => "defense",
            StatName::SpecialAttack => "special-attack",
            StatName::SpecialDefense => "special-defense",
            StatName::Speed => "speed",
        }
    }
}

/// A catalog base stat together with its level-derived value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: StatName,
    pub base_value: u32,
    #[serde(default)]
    pub value: u32,
}

impl Stat {
    pub fn base(name: StatName, base_value: u32) -> Self {
        Self {
            name,
            base_value,
            value: base_value,
        }
    }
}

pub fn stat_value(stats: &[Stat], name: StatName) -> Option<u32> {
    stats.iter().find(|s| s.name == name).map(|s| s.value)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    #[default]
    Physical,
    Special,
    Status,
}

/// A move learned by leveling up. Battle metadata is optional because the catalog
/// does not always carry it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnableMove {
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: Option<PokemonType>,
    #[serde(default)]
    pub level_learned_at: u32,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub pp: Option<u32>,
    #[serde(default)]
    pub category: Option<MoveCategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineMove {
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: Option<PokemonType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: u32,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub moves: Vec<LearnableMove>,
    #[serde(default)]
    pub tm_moves: Vec<MachineMove>,
}

impl Species {
    pub fn base_stat(&self, name: StatName) -> Option<u32> {
        self.stats
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.base_value)
    }

    /// Home region derived from the national dex number.
    pub fn region(&self) -> &'static str {
        match self.id {
            0..=151 => "kanto",
            152..=251 => "johto",
            252..=386 => "hoenn",
            387..=493 => "sinnoh",
            494..=649 => "unova",
            650..=721 => "kalos",
            722..=809 => "alola",
            810..=898 => "galar",
            899..=1025 => "paldea",
            _ => "national",
        }
    }
}

/// A moveset entry with battle metadata filled in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: Option<PokemonType>,
    pub power: u32,
    pub accuracy: u32,
    pub pp: u32,
    pub category: MoveCategory,
}

impl Move {
    /// A bare entry, for movesets picked by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            move_type: None,
            power: 0,
            accuracy: 100,
            pp: 20,
            category: MoveCategory::Physical,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub effect: String,
    pub short_effect: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Battle-relevant attributes of a move, as returned by the move data resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveDetails {
    pub id: u32,
    pub name: String,
    /// `None` means the move never misses.
    pub accuracy: Option<u32>,
    /// `None` means the move does not deal damage.
    pub power: Option<u32>,
    pub pp: u32,
    #[serde(rename = "type")]
    pub move_type: PokemonType,
    pub category: MoveCategory,
    #[serde(default)]
    pub effect_entries: Vec<EffectEntry>,
}

impl MoveDetails {
    pub fn short_effect(&self, language: &str) -> Option<&str> {
        self.effect_entries
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.short_effect.as_str())
    }
}

/// A roster member as written in a teams file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CombatantSpec {
    pub species: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub nature: Option<String>,
    #[serde(default)]
    pub ability: Option<String>,
    /// Move names; a random moveset is generated when absent.
    #[serde(default)]
    pub moves: Option<Vec<String>>,
}

fn default_level() -> u8 {
    50
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TeamsFile {
    pub team1: Vec<CombatantSpec>,
    pub team2: Vec<CombatantSpec>,
}
