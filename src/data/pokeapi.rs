use super::normalize_name;
use super::provider::DataProvider;
use crate::errors::DataError;
use crate::model::{
    EffectEntry, LearnableMove, MachineMove, MoveCategory, MoveDetails, Species, Stat, StatName,
};
use crate::types::PokemonType;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Provider backed by the public PokeAPI REST service.
pub struct PokeApiProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiEffectEntry {
    effect: String,
    short_effect: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct ApiMove {
    id: u32,
    name: String,
    accuracy: Option<u32>,
    power: Option<u32>,
    pp: Option<u32>,
    #[serde(rename = "type")]
    move_type: NamedResource,
    damage_class: Option<NamedResource>,
    #[serde(default)]
    effect_entries: Vec<ApiEffectEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiTypeSlot {
    slot: u8,
    #[serde(rename = "type")]
    type_ref: NamedResource,
}

#[derive(Debug, Deserialize)]
struct ApiStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct ApiVersionGroupDetail {
    level_learned_at: u32,
    move_learn_method: NamedResource,
}

#[derive(Debug, Deserialize)]
struct ApiPokemonMove {
    #[serde(rename = "move")]
    move_ref: NamedResource,
    #[serde(default)]
    version_group_details: Vec<ApiVersionGroupDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiPokemon {
    id: u32,
    name: String,
    types: Vec<ApiTypeSlot>,
    stats: Vec<ApiStat>,
    #[serde(default)]
    moves: Vec<ApiPokemonMove>,
}

fn malformed(name: &str, message: impl Into<String>) -> DataError {
    DataError::Malformed {
        name: name.to_string(),
        message: message.into(),
    }
}

fn parse_type(record: &str, raw: &str) -> Result<PokemonType, DataError> {
    raw.parse()
        .map_err(|_| malformed(record, format!("unknown type {raw}")))
}

fn parse_category(record: &str, raw: &str) -> Result<MoveCategory, DataError> {
    match raw {
        "physical" => Ok(MoveCategory::Physical),
        "special" => Ok(MoveCategory::Special),
        "status" => Ok(MoveCategory::Status),
        other => Err(malformed(record, format!("unknown damage class {other}"))),
    }
}

fn parse_stat_name(raw: &str) -> Option<StatName> {
    StatName::ALL.into_iter().find(|name| name.as_str() == raw)
}

fn convert_move(raw: ApiMove) -> Result<MoveDetails, DataError> {
    let move_type = parse_type(&raw.name, &raw.move_type.name)?;
    let category = match &raw.damage_class {
        Some(class) => parse_category(&raw.name, &class.name)?,
        None => MoveCategory::Status,
    };
    Ok(MoveDetails {
        id: raw.id,
        name: raw.name,
        accuracy: raw.accuracy,
        power: raw.power,
        pp: raw.pp.unwrap_or(0),
        move_type,
        category,
        effect_entries: raw
            .effect_entries
            .into_iter()
            .map(|entry| EffectEntry {
                effect: entry.effect,
                short_effect: entry.short_effect,
                language: entry.language.name,
            })
            .collect(),
    })
}

fn convert_pokemon(raw: ApiPokemon) -> Result<Species, DataError> {
    let mut slots = raw.types;
    slots.sort_by_key(|slot| slot.slot);
    let types = slots
        .iter()
        .map(|slot| parse_type(&raw.name, &slot.type_ref.name))
        .collect::<Result<Vec<_>, _>>()?;
    if types.is_empty() {
        return Err(malformed(&raw.name, "species has no types"));
    }

    let stats: Vec<Stat> = raw
        .stats
        .iter()
        .filter_map(|s| parse_stat_name(&s.stat.name).map(|name| Stat::base(name, s.base_stat)))
        .collect();
    if stats.len() != StatName::ALL.len() {
        return Err(malformed(
            &raw.name,
            format!("expected 6 base stats, found {}", stats.len()),
        ));
    }

    let mut moves = Vec::new();
    let mut tm_moves = Vec::new();
    for entry in raw.moves {
        let level_up = entry
            .version_group_details
            .iter()
            .find(|detail| detail.move_learn_method.name == "level-up");
        if let Some(detail) = level_up {
            moves.push(LearnableMove {
                name: entry.move_ref.name.clone(),
                move_type: None,
                level_learned_at: detail.level_learned_at,
                power: None,
                accuracy: None,
                pp: None,
                category: None,
            });
        }
        if entry
            .version_group_details
            .iter()
            .any(|detail| detail.move_learn_method.name == "machine")
        {
            tm_moves.push(MachineMove {
                name: entry.move_ref.name,
                move_type: None,
            });
        }
    }

    Ok(Species {
        id: raw.id,
        name: raw.name,
        types,
        stats,
        moves,
        tm_moves,
    })
}

impl PokeApiProvider {
    pub fn new() -> Self {
        Self::with_base_url(POKEAPI_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, name: &str) -> Result<T, DataError> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| DataError::Request {
                name: name.to_string(),
                error: err.into(),
            })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::NotFound(name.to_string()));
        }
        let response = response.error_for_status().map_err(|err| DataError::Request {
            name: name.to_string(),
            error: err.into(),
        })?;
        let body = response.text().await.map_err(|err| DataError::Request {
            name: name.to_string(),
            error: err.into(),
        })?;
        serde_json::from_str(&body).map_err(|err| malformed(name, err.to_string()))
    }
}

impl Default for PokeApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for PokeApiProvider {
    async fn fetch_move(&self, name: &str) -> Result<MoveDetails, DataError> {
        let key = normalize_name(name);
        let raw: ApiMove = self.get_json(&format!("move/{key}"), name).await?;
        convert_move(raw)
    }

    async fn fetch_species(&self, name_or_id: &str) -> Result<Species, DataError> {
        let key = normalize_name(name_or_id);
        let raw: ApiPokemon = self.get_json(&format!("pokemon/{key}"), name_or_id).await?;
        convert_pokemon(raw)
    }
}
