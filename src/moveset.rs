use crate::model::{Move, MoveCategory, Species};
use crate::rng::{shuffle, RandomSource};
use std::collections::HashSet;

pub const MAX_MOVESET_SIZE: usize = 4;

const DEFAULT_POWER: u32 = 0;
const DEFAULT_ACCURACY: u32 = 100;
const DEFAULT_PP: u32 = 20;

/// Candidate moves: level-up moves first, then machine moves, each name once.
pub fn move_pool(species: &Species) -> Vec<Move> {
    let mut seen = HashSet::new();
    let level_up = species.moves.iter().map(|mv| Move {
        name: mv.name.clone(),
        move_type: mv.move_type,
        power: mv.power.unwrap_or(DEFAULT_POWER),
        accuracy: mv
            .accuracy
            .filter(|acc| *acc > 0)
            .unwrap_or(DEFAULT_ACCURACY),
        pp: mv.pp.filter(|pp| *pp > 0).unwrap_or(DEFAULT_PP),
        category: mv.category.unwrap_or(MoveCategory::Physical),
    });
    let machine = species.tm_moves.iter().map(|mv| Move {
        move_type: mv.move_type,
        ..Move::named(mv.name.clone())
    });
    level_up
        .chain(machine)
        .filter(|mv| seen.insert(mv.name.to_ascii_lowercase()))
        .collect()
}

/// Picks up to four distinct moves uniformly at random from the species' pool.
///
/// Species with fewer than four candidates get all of them, in shuffled order.
pub fn generate_random_moveset<R: RandomSource + ?Sized>(
    species: &Species,
    rng: &mut R,
) -> Vec<Move> {
    let mut pool = move_pool(species);
    shuffle(&mut pool, rng);
    pool.truncate(MAX_MOVESET_SIZE);
    pool
}
