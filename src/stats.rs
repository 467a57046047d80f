use crate::model::{Stat, StatName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Fixed individual value and effort assumptions folded into the formulas.
const IV: u32 = 31;
const EV_TERM: u32 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

impl Nature {
    pub const ALL: [Nature; 25] = [
        Nature::Hardy,
        Nature::Lonely,
        Nature::Brave,
        Nature::Adamant,
        Nature::Naughty,
        Nature::Bold,
        Nature::Docile,
        Nature::Relaxed,
        Nature::Impish,
        Nature::Lax,
        Nature::Timid,
        Nature::Hasty,
        Nature::Serious,
        Nature::Jolly,
        Nature::Naive,
        Nature::Modest,
        Nature::Mild,
        Nature::Quiet,
        Nature::Bashful,
        Nature::Rash,
        Nature::Calm,
        Nature::Gentle,
        Nature::Sassy,
        Nature::Careful,
        Nature::Quirky,
    ];

    /// The (raised, lowered) stat pair, or `None` for neutral natures.
    pub fn effect(self) -> Option<(StatName, StatName)> {
        use StatName::*;
        match self {
            Nature::Hardy | Nature::Docile | Nature::Serious | Nature::Bashful | Nature::Quirky => {
                None
            }
            Nature::Lonely => Some((Attack, Defense)),
            Nature::Brave => Some((Attack, Speed)),
            Nature::Adamant => Some((Attack, SpecialAttack)),
            Nature::Naughty => Some((Attack, SpecialDefense)),
            Nature::Bold => Some((Defense, Attack)),
            Nature::Relaxed => Some((Defense, Speed)),
            Nature::Impish => Some((Defense, SpecialAttack)),
            Nature::Lax => Some((Defense, SpecialDefense)),
            Nature::Timid => Some((Speed, Attack)),
            Nature::Hasty => Some((Speed, Defense)),
            Nature::Jolly => Some((Speed, SpecialAttack)),
            Nature::Naive => Some((Speed, SpecialDefense)),
            Nature::Modest => Some((SpecialAttack, Attack)),
            Nature::Mild => Some((SpecialAttack, Defense)),
            Nature::Quiet => Some((SpecialAttack, Speed)),
            Nature::Rash => Some((SpecialAttack, SpecialDefense)),
            Nature::Calm => Some((SpecialDefense, Attack)),
            Nature::Gentle => Some((SpecialDefense, Defense)),
            Nature::Sassy => Some((SpecialDefense, Speed)),
            Nature::Careful => Some((SpecialDefense, SpecialAttack)),
        }
    }

    /// Parses a nature name, falling back to a neutral nature for unknown names.
    pub fn from_name_or_neutral(name: &str) -> Self {
        name.parse().unwrap_or(Nature::Hardy)
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Nature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Nature::ALL
            .into_iter()
            .find(|n| n.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown nature {s}"))
    }
}

/// Nature multiplier as a ratio in tenths: 11 (raised), 9 (lowered) or 10.
pub fn stat_modifier(nature: Nature, stat: StatName) -> u32 {
    match nature.effect() {
        Some((raised, _)) if raised == stat => 11,
        Some((_, lowered)) if lowered == stat => 9,
        _ => 10,
    }
}

pub fn calc_hp(base: u32, level: u32) -> u32 {
    (2 * base + IV + EV_TERM) * level / 100 + level + 10
}

pub fn calc_stat(base: u32, level: u32) -> u32 {
    (2 * base + IV + EV_TERM) * level / 100 + 5
}

/// Recomputes every stat's `value` from its `base_value` at `level`.
///
/// The level is not validated; callers keep it within 1..=100.
pub fn calculate_stats(base_stats: &[Stat], level: u32) -> Vec<Stat> {
    base_stats
        .iter()
        .map(|stat| {
            let value = match stat.name {
                StatName::Hp => calc_hp(stat.base_value, level),
                _ => calc_stat(stat.base_value, level),
            };
            Stat {
                value,
                ..stat.clone()
            }
        })
        .collect()
}

/// Applies the nature multiplier to already level-scaled stats, flooring the result.
pub fn apply_nature(stats: &mut [Stat], nature: Nature) {
    for stat in stats.iter_mut() {
        stat.value = stat.value * stat_modifier(nature, stat.name) / 10;
    }
}
