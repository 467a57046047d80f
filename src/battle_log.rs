use serde_json::json;

/// Append-only, human-readable battle transcript.
///
/// A landed attack writes the damage message ("X used M!" plus any critical or
/// effectiveness suffix) first, then the HP-loss line for the defender.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleLog {
    lines: Vec<String>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn log_send_out(&mut self, first: &str, second: &str) {
        self.push(format!("{first} and {second} are sent out to battle!"));
    }

    pub fn log_miss(&mut self, attacker: &str, move_name: &str) {
        self.push(format!("{attacker} used {move_name}!"));
        self.push(format!("{attacker}'s attack missed!"));
    }

    pub fn log_hp_loss(&mut self, target: &str, damage: u32, hp: u32, max_hp: u32) {
        self.push(format!(
            "{target} lost {damage} HP! ({hp}/{max_hp} HP remaining)"
        ));
    }

    pub fn log_faint(&mut self, target: &str) {
        self.push(format!("{target} fainted!"));
    }

    pub fn log_switch_in(&mut self, name: &str) {
        self.push(format!("Go! {name}!"));
    }

    pub fn log_resolution_failure(&mut self, attacker: &str, move_name: &str) {
        self.push(format!(
            "{attacker} tried to use {move_name}, but something went wrong!"
        ));
    }

    pub fn log_out_of_pokemon(&mut self, team: u8) {
        self.push(format!("Team {team} is out of usable Pokémon!"));
    }

    pub fn log_win(&mut self, team: u8) {
        self.push(format!("Team {team} wins the battle!"));
    }

    pub fn log_draw(&mut self) {
        self.push("The battle ended in a draw!");
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({ "log": self.lines })
    }
}
