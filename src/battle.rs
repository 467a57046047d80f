use crate::battle_log::BattleLog;
use crate::combatant::{Combatant, MAX_ROSTER_SIZE};
use crate::damage::{check_hit_with, compute_damage_with};
use crate::data::MoveResolver;
use crate::errors::{BattleError, MoveResolutionError};
use crate::model::MoveDetails;
use crate::rng::RandomSource;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Move used by a combatant with an empty moveset.
pub const STRUGGLE: &str = "struggle";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Team number as shown in the log.
    pub fn number(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BattlePhase {
    Setup,
    InProgress,
    Concluded,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BattleResult {
    Team1Wins,
    Team2Wins,
    Draw,
}

impl BattleResult {
    fn won_by(side: Side) -> Self {
        match side {
            Side::One => BattleResult::Team1Wins,
            Side::Two => BattleResult::Team2Wins,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BattleOptions {
    pub max_turns: usize,
    pub seed: u64,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            max_turns: 500,
            seed: 0,
        }
    }
}

/// What happened during one call to [`BattleSession::advance`].
#[derive(Clone, Debug, PartialEq)]
pub struct TurnSummary {
    pub side: Side,
    pub move_name: String,
    pub hit: bool,
    pub damage: u32,
    pub fainted: bool,
    /// The move could not be resolved and the turn was skipped.
    pub degraded: bool,
    pub result: Option<BattleResult>,
}

impl TurnSummary {
    fn new(side: Side, move_name: &str) -> Self {
        Self {
            side,
            move_name: move_name.to_string(),
            hit: false,
            damage: 0,
            fainted: false,
            degraded: false,
            result: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceOutcome {
    Turn(TurnSummary),
    /// Another turn was already executing; nothing changed.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SideSnapshot {
    pub names: Vec<String>,
    pub hp: Vec<u32>,
    pub max_hp: Vec<u32>,
    pub active: usize,
}

/// Read-only copy of a battle, safe to hold while the session keeps running.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleSnapshot {
    pub phase: BattlePhase,
    pub turn: Side,
    pub turns_taken: usize,
    pub team1: SideSnapshot,
    pub team2: SideSnapshot,
    pub result: Option<BattleResult>,
    pub log: Vec<String>,
}

/// Attacker and move chosen for a turn, tied to the battle they were chosen in.
struct PendingTurn {
    battle_id: u64,
    side: Side,
    move_name: String,
}

#[derive(Clone, Debug, Default)]
struct SideState {
    roster: Vec<Combatant>,
    hp: Vec<u32>,
    max_hp: Vec<u32>,
    active: usize,
}

impl SideState {
    fn new(roster: Vec<Combatant>) -> Self {
        let max_hp: Vec<u32> = roster.iter().map(Combatant::max_hp).collect();
        Self {
            hp: max_hp.clone(),
            max_hp,
            roster,
            active: 0,
        }
    }

    fn active(&self) -> &Combatant {
        &self.roster[self.active]
    }

    /// First member after `index` that can still fight.
    fn next_alive_after(&self, index: usize) -> Option<usize> {
        self.hp
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, hp)| **hp > 0)
            .map(|(idx, _)| idx)
    }

    fn all_fainted(&self) -> bool {
        self.hp.iter().all(|hp| *hp == 0)
    }

    fn snapshot(&self) -> SideSnapshot {
        SideSnapshot {
            names: self.roster.iter().map(|c| c.name().to_string()).collect(),
            hp: self.hp.clone(),
            max_hp: self.max_hp.clone(),
            active: self.active,
        }
    }
}

/// Rosters, HP pools and log of a single battle.
///
/// Team 1 always acts first and the sides then strictly alternate. There is no
/// speed or priority ordering.
pub struct BattleState {
    team1: SideState,
    team2: SideState,
    turn: Side,
    phase: BattlePhase,
    result: Option<BattleResult>,
    turns_taken: usize,
    /// Bumped by every `begin` and `clear`.
    battle_id: u64,
    log: BattleLog,
    rng: Box<dyn RandomSource>,
}

impl BattleState {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            team1: SideState::default(),
            team2: SideState::default(),
            turn: Side::One,
            phase: BattlePhase::Setup,
            result: None,
            turns_taken: 0,
            battle_id: 0,
            log: BattleLog::new(),
            rng,
        }
    }

    fn side(&self, side: Side) -> &SideState {
        match side {
            Side::One => &self.team1,
            Side::Two => &self.team2,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::One => &mut self.team1,
            Side::Two => &mut self.team2,
        }
    }

    fn begin(&mut self, team1: Vec<Combatant>, team2: Vec<Combatant>) -> Result<(), BattleError> {
        for (side, roster) in [(Side::One, &team1), (Side::Two, &team2)] {
            if roster.is_empty() {
                log::error!("cannot start battle: team {} is empty", side.number());
                return Err(BattleError::EmptyRoster(side.number()));
            }
            if roster.len() > MAX_ROSTER_SIZE {
                log::error!(
                    "cannot start battle: team {} has {} members",
                    side.number(),
                    roster.len()
                );
                return Err(BattleError::RosterTooLarge {
                    team: side.number(),
                    size: roster.len(),
                    max: MAX_ROSTER_SIZE,
                });
            }
        }

        self.team1 = SideState::new(team1);
        self.team2 = SideState::new(team2);
        self.turn = Side::One;
        self.phase = BattlePhase::InProgress;
        self.result = None;
        self.turns_taken = 0;
        self.battle_id += 1;
        self.log.clear();
        let (first, second) = (
            self.team1.active().name().to_string(),
            self.team2.active().name().to_string(),
        );
        log::info!("battle started: {first} vs {second}");
        self.log.log_send_out(&first, &second);
        Ok(())
    }

    fn clear(&mut self) {
        self.team1 = SideState::default();
        self.team2 = SideState::default();
        self.turn = Side::One;
        self.phase = BattlePhase::Setup;
        self.result = None;
        self.turns_taken = 0;
        self.battle_id += 1;
        self.log.clear();
    }

    /// Picks the side to act and its move, before any await.
    fn prepare_turn(&mut self) -> Result<PendingTurn, BattleError> {
        if self.phase != BattlePhase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        let side = self.turn;
        let moveset = match side {
            Side::One => self.team1.active().moveset(),
            Side::Two => self.team2.active().moveset(),
        };
        let move_name = if moveset.is_empty() {
            STRUGGLE.to_string()
        } else {
            moveset[self.rng.index(moveset.len())].name.clone()
        };
        Ok(PendingTurn {
            battle_id: self.battle_id,
            side,
            move_name,
        })
    }

    /// Applies a prepared turn. Fails without touching the state when the battle it
    /// was prepared for has since been replaced, reset or concluded.
    fn apply_turn(
        &mut self,
        pending: &PendingTurn,
        resolved: Result<Arc<MoveDetails>, MoveResolutionError>,
    ) -> Result<TurnSummary, BattleError> {
        if pending.battle_id != self.battle_id || self.phase != BattlePhase::InProgress {
            log::warn!("discarding turn prepared for a battle that is no longer running");
            return Err(BattleError::NotInProgress);
        }
        let (side, move_name) = (pending.side, pending.move_name.as_str());
        self.turns_taken += 1;
        let mut summary = TurnSummary::new(side, move_name);
        let attacker_name = self.side(side).active().name().to_string();

        let details = match resolved {
            Ok(details) => details,
            Err(err) => {
                log::warn!("turn {} skipped: {err}: {}", self.turns_taken, err.source);
                self.log.log_resolution_failure(&attacker_name, move_name);
                summary.degraded = true;
                self.turn = side.opponent();
                return Ok(summary);
            }
        };
        summary.move_name = details.name.clone();

        let outcome = {
            let (attacking, defending) = match side {
                Side::One => (&self.team1, &self.team2),
                Side::Two => (&self.team2, &self.team1),
            };
            let rng = &mut *self.rng;
            if check_hit_with(&details, rng) {
                Some(compute_damage_with(
                    attacking.active(),
                    defending.active(),
                    &details,
                    rng,
                ))
            } else {
                None
            }
        };

        let Some(outcome) = outcome else {
            log::debug!("turn {}: {attacker_name} missed", self.turns_taken);
            self.log.log_miss(&attacker_name, &details.name);
            self.turn = side.opponent();
            return Ok(summary);
        };

        summary.hit = true;
        self.log.push(outcome.message);
        let target_side = side.opponent();
        let target = self.side_mut(target_side);
        let idx = target.active;
        let before = target.hp[idx];
        let after = before.saturating_sub(outcome.damage);
        target.hp[idx] = after;
        let max_hp = target.max_hp[idx];
        let target_name = target.roster[idx].name().to_string();
        summary.damage = before - after;
        log::debug!(
            "turn {}: {attacker_name} -> {target_name} for {}",
            self.turns_taken,
            summary.damage
        );
        if summary.damage > 0 {
            self.log
                .log_hp_loss(&target_name, summary.damage, after, max_hp);
        }

        if after == 0 {
            summary.fainted = true;
            summary.result = self.handle_faint(target_side);
        }
        if self.phase == BattlePhase::InProgress {
            self.turn = side.opponent();
        }
        Ok(summary)
    }

    fn handle_faint(&mut self, side: Side) -> Option<BattleResult> {
        let fainted = self.side(side).active;
        let name = self.side(side).roster[fainted].name().to_string();
        self.log.log_faint(&name);

        if let Some(next) = self.side(side).next_alive_after(fainted) {
            let state = self.side_mut(side);
            state.active = next;
            let next_name = state.roster[next].name().to_string();
            self.log.log_switch_in(&next_name);
            return None;
        }

        self.log.log_out_of_pokemon(side.number());
        let result = if self.side(side.opponent()).all_fainted() {
            self.log.log_draw();
            BattleResult::Draw
        } else {
            self.log.log_win(side.opponent().number());
            BattleResult::won_by(side.opponent())
        };
        self.phase = BattlePhase::Concluded;
        self.result = Some(result);
        log::info!(
            "battle concluded after {} turns: {result:?}",
            self.turns_taken
        );
        Some(result)
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            phase: self.phase,
            turn: self.turn,
            turns_taken: self.turns_taken,
            team1: self.team1.snapshot(),
            team2: self.team2.snapshot(),
            result: self.result,
            log: self.log.lines().to_vec(),
        }
    }
}

/// A battle driven one turn at a time.
///
/// All methods take `&self`, so a session can be shared between tasks. Only one
/// turn executes at a time: an `advance` that arrives while another is awaiting
/// move data returns [`AdvanceOutcome::Ignored`].
pub struct BattleSession {
    resolver: Arc<MoveResolver>,
    state: Mutex<BattleState>,
    executing: AtomicBool,
}

impl BattleSession {
    pub fn new(resolver: Arc<MoveResolver>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            resolver,
            state: Mutex::new(BattleState::new(rng)),
            executing: AtomicBool::new(false),
        }
    }

    pub fn seeded(resolver: Arc<MoveResolver>, seed: u64) -> Self {
        Self::new(resolver, Box::new(SmallRng::seed_from_u64(seed)))
    }

    fn lock_state(&self) -> MutexGuard<'_, BattleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    /// Starts a new battle, discarding any previous one.
    pub fn start(&self, team1: Vec<Combatant>, team2: Vec<Combatant>) -> Result<(), BattleError> {
        // The flag is checked under the state lock so an `advance` cannot prepare
        // its turn between the check and the rewrite.
        let mut state = self.lock_state();
        if self.is_executing() {
            return Err(BattleError::TurnInProgress);
        }
        state.begin(team1, team2)
    }

    /// Returns to `Setup`, dropping rosters and log.
    pub fn reset(&self) -> Result<(), BattleError> {
        let mut state = self.lock_state();
        if self.is_executing() {
            return Err(BattleError::TurnInProgress);
        }
        state.clear();
        Ok(())
    }

    /// Executes one turn for the side whose turn it is.
    pub async fn advance(&self) -> Result<AdvanceOutcome, BattleError> {
        if self
            .executing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("advance ignored: a turn is already executing");
            return Ok(AdvanceOutcome::Ignored);
        }
        let _release = scopeguard::guard(&self.executing, |flag| {
            flag.store(false, Ordering::Release);
        });

        let pending = self.lock_state().prepare_turn()?;
        let resolved = self.resolver.resolve(&pending.move_name).await;
        let summary = self.lock_state().apply_turn(&pending, resolved)?;
        Ok(AdvanceOutcome::Turn(summary))
    }

    /// Advances until the battle concludes or `max_turns` turns have run.
    ///
    /// Returns `None` when the turn limit is hit first.
    pub async fn run_to_completion(
        &self,
        max_turns: usize,
    ) -> Result<Option<BattleResult>, BattleError> {
        if let Some(result) = self.result() {
            return Ok(Some(result));
        }
        for _ in 0..max_turns {
            match self.advance().await? {
                AdvanceOutcome::Turn(summary) => {
                    if let Some(result) = summary.result {
                        return Ok(Some(result));
                    }
                }
                AdvanceOutcome::Ignored => tokio::task::yield_now().await,
            }
        }
        log::info!("battle stopped after reaching the {max_turns} turn limit");
        Ok(None)
    }

    pub fn phase(&self) -> BattlePhase {
        self.lock_state().phase()
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.lock_state().result()
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        self.lock_state().snapshot()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.lock_state().log().lines().to_vec()
    }

    pub fn log_json(&self) -> serde_json::Value {
        self.lock_state().log().to_json()
    }

    #[cfg(test)]
    fn with_state<T>(&self, f: impl FnOnce(&mut BattleState) -> T) -> T {
        f(&mut self.lock_state())
    }
}

/// Runs a seeded battle between two rosters to completion.
pub async fn simulate_battle(
    resolver: Arc<MoveResolver>,
    team1: Vec<Combatant>,
    team2: Vec<Combatant>,
    options: &BattleOptions,
) -> Result<BattleSnapshot, BattleError> {
    let session = BattleSession::seeded(resolver, options.seed);
    session.start(team1, team2)?;
    session.run_to_completion(options.max_turns).await?;
    Ok(session.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::test_support::species;
    use crate::data::{DataProvider, LocalDataProvider};
    use crate::errors::DataError;
    use crate::model::{Move, MoveCategory, Species};
    use crate::rng::ScriptedRandom;
    use crate::types::PokemonType;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    fn move_details(name: &str, accuracy: Option<u32>, power: u32) -> MoveDetails {
        MoveDetails {
            id: 1,
            name: name.to_string(),
            accuracy,
            power: Some(power),
            pp: 35,
            move_type: PokemonType::Normal,
            category: MoveCategory::Physical,
            effect_entries: Vec::new(),
        }
    }

    fn resolver() -> Arc<MoveResolver> {
        let provider = LocalDataProvider::new()
            .with_move(move_details("tackle", None, 40))
            .with_move(move_details("focus-blast", Some(50), 120))
            .with_move(move_details("struggle", None, 50));
        Arc::new(MoveResolver::new(Arc::new(provider)))
    }

    fn mon(name: &str, level: u8, base: u32, moves: &[&str]) -> Combatant {
        Combatant::new(species(name, &[PokemonType::Fighting], [base; 6]), level)
            .unwrap()
            .with_moveset(moves.iter().copied().map(Move::named).collect())
            .unwrap()
    }

    fn session() -> BattleSession {
        BattleSession::new(
            resolver(),
            Box::new(ScriptedRandom::new(Vec::new()).with_fallback(0.5)),
        )
    }

    #[test]
    fn start_validates_rosters() {
        let session = session();
        assert_eq!(
            session.start(Vec::new(), vec![mon("b", 5, 50, &[])]),
            Err(BattleError::EmptyRoster(1))
        );
        assert_eq!(
            session.start(vec![mon("a", 5, 50, &[])], Vec::new()),
            Err(BattleError::EmptyRoster(2))
        );
        let seven = vec![mon("b", 5, 50, &[]); 7];
        assert_matches!(
            session.start(vec![mon("a", 5, 50, &[])], seven),
            Err(BattleError::RosterTooLarge { team: 2, size: 7, .. })
        );
        assert_eq!(session.phase(), BattlePhase::Setup);
        assert!(session.log_lines().is_empty());
    }

    #[tokio::test]
    async fn advance_requires_a_running_battle() {
        let session = session();
        assert_eq!(session.advance().await, Err(BattleError::NotInProgress));
        assert!(!session.is_executing());
    }

    #[tokio::test]
    async fn start_initializes_hp_and_log() {
        let session = session();
        let a = mon("machop", 50, 70, &["tackle"]);
        let max_hp = a.max_hp();
        session
            .start(vec![a], vec![mon("mankey", 50, 40, &["tackle"])])
            .unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, BattlePhase::InProgress);
        assert_eq!(snapshot.turn, Side::One);
        assert_eq!(snapshot.team1.hp, vec![max_hp]);
        assert_eq!(snapshot.team1.max_hp, vec![max_hp]);
        assert_eq!(snapshot.log, vec!["machop and mankey are sent out to battle!"]);
    }

    #[tokio::test]
    async fn fainting_walks_through_the_roster() {
        let session = session();
        session
            .start(
                vec![mon("hitmonlee", 100, 100, &["tackle"])],
                vec![
                    mon("first", 5, 50, &["tackle"]),
                    mon("second", 5, 50, &["tackle"]),
                    mon("third", 5, 50, &["tackle"]),
                ],
            )
            .unwrap();
        session.with_state(|state| state.team2.hp = vec![1, 1, 1]);

        let turn = session.advance().await.unwrap();
        assert_matches!(turn, AdvanceOutcome::Turn(TurnSummary { fainted: true, damage: 1, .. }));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.team2.active, 1);
        assert_eq!(snapshot.turn, Side::Two);
        let max_hp = snapshot.team2.max_hp[0];
        assert_eq!(
            &snapshot.log[1..],
            [
                "hitmonlee used tackle!".to_string(),
                format!("first lost 1 HP! (0/{max_hp} HP remaining)"),
                "first fainted!".to_string(),
                "Go! second!".to_string(),
            ]
        );

        // second attacks, then gets knocked out.
        session.advance().await.unwrap();
        session.advance().await.unwrap();
        assert_eq!(session.snapshot().team2.active, 2);
        assert!(session.log_lines().contains(&"Go! third!".to_string()));

        session.advance().await.unwrap();
        let last = session.advance().await.unwrap();
        assert_matches!(
            last,
            AdvanceOutcome::Turn(TurnSummary { result: Some(BattleResult::Team1Wins), .. })
        );
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, BattlePhase::Concluded);
        assert_eq!(snapshot.team2.hp, vec![0, 0, 0]);
        assert_eq!(
            &snapshot.log[snapshot.log.len() - 3..],
            [
                "third fainted!".to_string(),
                "Team 2 is out of usable Pokémon!".to_string(),
                "Team 1 wins the battle!".to_string(),
            ]
        );
        assert_eq!(session.advance().await, Err(BattleError::NotInProgress));
    }

    #[tokio::test]
    async fn double_knockout_is_a_draw() {
        let session = session();
        session
            .start(
                vec![mon("a", 50, 80, &["tackle"])],
                vec![mon("b", 50, 80, &["tackle"])],
            )
            .unwrap();
        session.with_state(|state| {
            state.team1.hp = vec![0];
            state.team2.hp = vec![1];
        });
        let turn = session.advance().await.unwrap();
        assert_matches!(
            turn,
            AdvanceOutcome::Turn(TurnSummary { result: Some(BattleResult::Draw), .. })
        );
        assert_eq!(
            session.log_lines().last().map(String::as_str),
            Some("The battle ended in a draw!")
        );
    }

    #[tokio::test]
    async fn missed_attack_flips_the_turn() {
        // move index 0, then an accuracy draw of 90 against 50.
        let rng = ScriptedRandom::new([0.0, 0.9]).with_fallback(0.5);
        let session = BattleSession::new(resolver(), Box::new(rng));
        session
            .start(
                vec![mon("machamp", 50, 80, &["focus-blast"])],
                vec![mon("snorlax", 50, 80, &["tackle"])],
            )
            .unwrap();
        let hp_before = session.snapshot().team2.hp;
        let turn = session.advance().await.unwrap();
        assert_matches!(turn, AdvanceOutcome::Turn(TurnSummary { hit: false, .. }));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.team2.hp, hp_before);
        assert_eq!(snapshot.turn, Side::Two);
        assert_eq!(
            &snapshot.log[1..],
            [
                "machamp used focus-blast!".to_string(),
                "machamp's attack missed!".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn unresolvable_move_degrades_the_turn() {
        let session = session();
        session
            .start(
                vec![mon("ditto", 50, 50, &["transform"])],
                vec![mon("eevee", 50, 50, &["tackle"])],
            )
            .unwrap();
        let turn = session.advance().await.unwrap();
        assert_matches!(turn, AdvanceOutcome::Turn(TurnSummary { degraded: true, damage: 0, .. }));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.team2.hp, snapshot.team2.max_hp);
        assert_eq!(snapshot.turn, Side::Two);
        assert_eq!(
            snapshot.log.last().map(String::as_str),
            Some("ditto tried to use transform, but something went wrong!")
        );
        assert!(!session.is_executing());
    }

    #[tokio::test]
    async fn empty_moveset_struggles() {
        let session = session();
        session
            .start(vec![mon("magikarp", 50, 50, &[])], vec![mon("eevee", 50, 50, &[])])
            .unwrap();
        let turn = session.advance().await.unwrap();
        assert_matches!(turn, AdvanceOutcome::Turn(TurnSummary { ref move_name, hit: true, .. }) if move_name == "struggle");
    }

    #[tokio::test]
    async fn reset_returns_to_setup() {
        let session = session();
        session
            .start(vec![mon("a", 50, 50, &[])], vec![mon("b", 50, 50, &[])])
            .unwrap();
        session.reset().unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, BattlePhase::Setup);
        assert!(snapshot.log.is_empty());
        assert!(snapshot.team1.names.is_empty());
    }

    #[tokio::test]
    async fn run_to_completion_respects_the_turn_limit() {
        let session = session();
        session
            .start(
                vec![mon("a", 50, 250, &["tackle"])],
                vec![mon("b", 50, 250, &["tackle"])],
            )
            .unwrap();
        assert_eq!(session.run_to_completion(2).await, Ok(None));
        assert_eq!(session.snapshot().turns_taken, 2);
        assert_eq!(session.phase(), BattlePhase::InProgress);
    }

    #[tokio::test]
    async fn faint_skips_members_already_down() {
        let session = session();
        session
            .start(
                vec![mon("hitmonlee", 100, 100, &["tackle"])],
                vec![
                    mon("first", 5, 50, &["tackle"]),
                    mon("second", 5, 50, &["tackle"]),
                    mon("third", 5, 50, &["tackle"]),
                ],
            )
            .unwrap();
        session.with_state(|state| state.team2.hp = vec![1, 0, 1]);

        let turn = session.advance().await.unwrap();
        assert_matches!(turn, AdvanceOutcome::Turn(TurnSummary { fainted: true, result: None, .. }));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.team2.active, 2);
        assert_eq!(snapshot.log.last().map(String::as_str), Some("Go! third!"));
        assert!(!snapshot.log.contains(&"Go! second!".to_string()));
    }

    struct GatedProvider {
        inner: LocalDataProvider,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl DataProvider for GatedProvider {
        async fn fetch_move(&self, name: &str) -> Result<MoveDetails, DataError> {
            self.gate.notified().await;
            self.inner.fetch_move(name).await
        }

        async fn fetch_species(&self, name_or_id: &str) -> Result<Species, DataError> {
            self.inner.fetch_species(name_or_id).await
        }
    }

    #[tokio::test]
    async fn turn_prepared_for_a_replaced_battle_is_discarded() {
        let gate = Arc::new(Notify::new());
        let provider = GatedProvider {
            inner: LocalDataProvider::new()
                .with_move(move_details("tackle", None, 40))
                .with_move(move_details("pound", None, 40)),
            gate: gate.clone(),
        };
        let session = BattleSession::new(
            Arc::new(MoveResolver::new(Arc::new(provider))),
            Box::new(ScriptedRandom::new(Vec::new())),
        );
        session
            .start(
                vec![mon("a", 50, 80, &["tackle"])],
                vec![mon("b", 50, 80, &["tackle"])],
            )
            .unwrap();

        // Swap the battle underneath a turn that is waiting on move data.
        let (turn, ()) = tokio::join!(session.advance(), async {
            session.with_state(|state| {
                state
                    .begin(
                        vec![mon("c", 50, 80, &["pound"])],
                        vec![mon("d", 50, 80, &["pound"])],
                    )
                    .unwrap()
            });
            gate.notify_one();
        });
        assert_eq!(turn, Err(BattleError::NotInProgress));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.turns_taken, 0);
        assert_eq!(snapshot.log, vec!["c and d are sent out to battle!"]);
        assert!(!session.is_executing());

        // The same for a reset, which leaves both rosters empty. Pound is not cached
        // yet, so this turn also waits on the gate.
        let (turn, ()) = tokio::join!(session.advance(), async {
            session.with_state(BattleState::clear);
            gate.notify_one();
        });
        assert_eq!(turn, Err(BattleError::NotInProgress));
        assert_eq!(session.phase(), BattlePhase::Setup);
    }
}
