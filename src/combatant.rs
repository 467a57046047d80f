use crate::errors::RosterError;
use crate::model::{stat_value, CombatantSpec, Move, Species, Stat, StatName};
use crate::moveset::MAX_MOVESET_SIZE;
use crate::stats::{apply_nature, calculate_stats, Nature};
use crate::types::PokemonType;
use serde::{Deserialize, Serialize};

pub const MAX_ROSTER_SIZE: usize = 6;
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;

/// A species instance with a level, nature, ability and moveset.
///
/// `stats` always reflects the current level and nature; the setters keep it in sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    species: Species,
    level: u8,
    stats: Vec<Stat>,
    moveset: Vec<Move>,
    ability: String,
    nature: Nature,
}

impl Combatant {
    /// Fails when the level is out of range or the species lacks one of the six base stats.
    pub fn new(species: Species, level: u8) -> Result<Self, RosterError> {
        check_level(level)?;
        check_base_stats(&species)?;
        let mut combatant = Self {
            species,
            level,
            stats: Vec::new(),
            moveset: Vec::new(),
            ability: String::new(),
            nature: Nature::Hardy,
        };
        combatant.recompute_stats();
        Ok(combatant)
    }

    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self.recompute_stats();
        self
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    pub fn with_moveset(mut self, moveset: Vec<Move>) -> Result<Self, RosterError> {
        self.set_moveset(moveset)?;
        Ok(self)
    }

    /// Builds a combatant from a teams-file entry. Moves listed by name get default
    /// metadata; battle mechanics resolve the real values at use time.
    pub fn from_spec(species: Species, spec: &CombatantSpec) -> Result<Self, RosterError> {
        let mut combatant = Self::new(species, spec.level)?;
        if let Some(nature) = &spec.nature {
            combatant = combatant.with_nature(Nature::from_name_or_neutral(nature));
        }
        if let Some(ability) = &spec.ability {
            combatant.ability = ability.clone();
        }
        if let Some(moves) = &spec.moves {
            combatant.set_moveset(moves.iter().map(Move::named).collect())?;
        }
        Ok(combatant)
    }

    pub fn name(&self) -> &str {
        &self.species.name
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn types(&self) -> &[PokemonType] {
        &self.species.types
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn stats(&self) -> &[Stat] {
        &self.stats
    }

    pub fn stat(&self, name: StatName) -> Option<u32> {
        stat_value(&self.stats, name)
    }

    pub fn max_hp(&self) -> u32 {
        self.stat(StatName::Hp).unwrap_or(0)
    }

    pub fn moveset(&self) -> &[Move] {
        &self.moveset
    }

    pub fn ability(&self) -> &str {
        &self.ability
    }

    pub fn nature(&self) -> Nature {
        self.nature
    }

    pub fn set_level(&mut self, level: u8) -> Result<(), RosterError> {
        check_level(level)?;
        check_base_stats(&self.species)?;
        self.level = level;
        self.recompute_stats();
        Ok(())
    }

    pub fn set_nature(&mut self, nature: Nature) {
        self.nature = nature;
        self.recompute_stats();
    }

    pub fn set_moveset(&mut self, moveset: Vec<Move>) -> Result<(), RosterError> {
        if moveset.len() > MAX_MOVESET_SIZE {
            return Err(RosterError::MovesetTooLarge(moveset.len()));
        }
        self.moveset = moveset;
        Ok(())
    }

    fn recompute_stats(&mut self) {
        self.stats = calculate_stats(&self.species.stats, u32::from(self.level));
        apply_nature(&mut self.stats, self.nature);
    }
}

fn check_level(level: u8) -> Result<(), RosterError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(RosterError::InvalidLevel(level))
    }
}

fn check_base_stats(species: &Species) -> Result<(), RosterError> {
    match StatName::ALL
        .into_iter()
        .find(|stat| stat_value(&species.stats, *stat).is_none())
    {
        Some(stat) => Err(RosterError::MissingStat {
            species: species.name.clone(),
            stat: stat.as_str(),
        }),
        None => Ok(()),
    }
}

/// Ordered team of up to six combatants.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<Combatant>) -> Result<Self, RosterError> {
        if members.len() > MAX_ROSTER_SIZE {
            return Err(RosterError::Full(members.len()));
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.members.get(index)
    }

    pub fn add(&mut self, combatant: Combatant) -> Result<(), RosterError> {
        if self.members.len() >= MAX_ROSTER_SIZE {
            return Err(RosterError::Full(self.members.len()));
        }
        self.members.push(combatant);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Combatant, RosterError> {
        self.check_index(index)?;
        Ok(self.members.remove(index))
    }

    /// Moves the member at `from` to position `to`, shifting the others.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), RosterError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let member = self.members.remove(from);
        self.members.insert(to, member);
        Ok(())
    }

    pub fn set_level(&mut self, index: usize, level: u8) -> Result<(), RosterError> {
        self.check_index(index)?;
        self.members[index].set_level(level)
    }

    pub fn set_moveset(&mut self, index: usize, moveset: Vec<Move>) -> Result<(), RosterError> {
        self.check_index(index)?;
        self.members[index].set_moveset(moveset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter()
    }

    pub fn into_members(self) -> Vec<Combatant> {
        self.members
    }

    fn check_index(&self, index: usize) -> Result<(), RosterError> {
        if index < self.members.len() {
            Ok(())
        } else {
            Err(RosterError::IndexOutOfRange {
                index,
                len: self.members.len(),
            })
        }
    }
}
