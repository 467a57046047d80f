use super::normalize_name;
use crate::errors::DataError;
use crate::model::{MoveDetails, Species};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of move and species records.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Looks up a move by its normalized name.
    async fn fetch_move(&self, name: &str) -> Result<MoveDetails, DataError>;
    /// Looks up a species by name or national dex number.
    async fn fetch_species(&self, name_or_id: &str) -> Result<Species, DataError>;
}

/// On-disk layout of a local data file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocalDataFile {
    #[serde(default)]
    pub moves: Vec<MoveDetails>,
    #[serde(default)]
    pub species: Vec<Species>,
}

/// In-memory provider, typically loaded from a JSON data file.
#[derive(Debug, Default, Clone)]
pub struct LocalDataProvider {
    moves: HashMap<String, MoveDetails>,
    species: HashMap<String, Species>,
}

impl LocalDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: LocalDataFile) -> Self {
        let mut provider = Self::new();
        for mv in file.moves {
            provider.insert_move(mv);
        }
        for species in file.species {
            provider.insert_species(species);
        }
        provider
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<LocalDataFile>(raw).map(Self::from_file)
    }

    pub fn insert_move(&mut self, details: MoveDetails) {
        self.moves.insert(normalize_name(&details.name), details);
    }

    pub fn insert_species(&mut self, species: Species) {
        self.species.insert(normalize_name(&species.name), species);
    }

    pub fn with_move(mut self, details: MoveDetails) -> Self {
        self.insert_move(details);
        self
    }

    pub fn with_species(mut self, species: Species) -> Self {
        self.insert_species(species);
        self
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.values().map(|s| s.name.as_str())
    }
}

#[async_trait]
impl DataProvider for LocalDataProvider {
    async fn fetch_move(&self, name: &str) -> Result<MoveDetails, DataError> {
        self.moves
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| DataError::NotFound(name.to_string()))
    }

    async fn fetch_species(&self, name_or_id: &str) -> Result<Species, DataError> {
        let key = normalize_name(name_or_id);
        if let Some(species) = self.species.get(&key) {
            return Ok(species.clone());
        }
        key.parse::<u32>()
            .ok()
            .and_then(|id| self.species.values().find(|s| s.id == id))
            .cloned()
            .ok_or_else(|| DataError::NotFound(name_or_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DATA: &str = r#"{
        "moves": [
            {"id": 33, "name": "tackle", "accuracy": 100, "power": 40, "pp": 35,
             "type": "normal", "category": "physical"}
        ],
        "species": [
            {"id": 25, "name": "pikachu", "types": ["electric"],
             "stats": [{"name": "hp", "base_value": 35}]}
        ]
    }"#;

    #[tokio::test]
    async fn loads_moves_and_species_from_json() {
        let provider = LocalDataProvider::from_json(DATA).unwrap();
        let tackle = provider.fetch_move("Tackle").await.unwrap();
        assert_eq!(tackle.power, Some(40));
        assert!(tackle.effect_entries.is_empty());
        assert_eq!(provider.fetch_species("pikachu").await.unwrap().id, 25);
        assert_eq!(provider.fetch_species("25").await.unwrap().name, "pikachu");
    }

    #[tokio::test]
    async fn unknown_records_are_not_found() {
        let provider = LocalDataProvider::from_json(DATA).unwrap();
        assert_matches!(
            provider.fetch_move("hyper-beam").await,
            Err(DataError::NotFound(name)) if name == "hyper-beam"
        );
        assert_matches!(
            provider.fetch_species("151").await,
            Err(DataError::NotFound(_))
        );
    }
}
