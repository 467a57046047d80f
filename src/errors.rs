use thiserror::Error;

/// Failure of a [`DataProvider`](crate::data::DataProvider) lookup.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no record found for {0}")]
    NotFound(String),
    #[error("request for {name} failed")]
    Request {
        name: String,
        #[source]
        error: anyhow::Error,
    },
    #[error("malformed record for {name}: {message}")]
    Malformed { name: String, message: String },
}

#[derive(Debug, Error)]
#[error("failed to resolve move {name}")]
pub struct MoveResolutionError {
    pub name: String,
    #[source]
    pub source: DataError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("team {0} has no members")]
    EmptyRoster(u8),
    #[error("team {team} has {size} members, at most {max} are allowed")]
    RosterTooLarge { team: u8, size: usize, max: usize },
    #[error("battle is not in progress")]
    NotInProgress,
    #[error("a turn is currently being executed")]
    TurnInProgress,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster is full ({0} members)")]
    Full(usize),
    #[error("index {index} is out of range for a roster of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("level {0} is outside 1..=100")]
    InvalidLevel(u8),
    #[error("a moveset holds at most 4 moves, got {0}")]
    MovesetTooLarge(usize),
    #[error("{species} has no base {stat} stat")]
    MissingStat { species: String, stat: &'static str },
}
