use crate::combatant::Combatant;
use crate::data::MoveResolver;
use crate::errors::MoveResolutionError;
use crate::model::{MoveCategory, MoveDetails, StatName};
use crate::rng::RandomSource;
use crate::types::effectiveness;

pub const CRITICAL_CHANCE: f64 = 1.0 / 16.0;
pub const CRITICAL_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;
// Used when a combatant lacks the stat a move needs.
const FALLBACK_STAT: u32 = 50;

const NO_EFFECT_DESCRIPTION: &str = "No effect description available.";

#[derive(Clone, Debug, PartialEq)]
pub struct DamageOutcome {
    pub damage: u32,
    pub message: String,
    pub critical: bool,
    pub effectiveness: f64,
}

impl DamageOutcome {
    fn message_only(message: String) -> Self {
        Self {
            damage: 0,
            message,
            critical: false,
            effectiveness: 1.0,
        }
    }
}

/// Accuracy roll against resolved move data. Moves without accuracy never miss and
/// consume no draw.
pub fn check_hit_with<R: RandomSource + ?Sized>(details: &MoveDetails, rng: &mut R) -> bool {
    match details.accuracy {
        None => true,
        Some(accuracy) => rng.unit() * 100.0 <= f64::from(accuracy),
    }
}

pub async fn check_hit<R: RandomSource + ?Sized>(
    resolver: &MoveResolver,
    move_name: &str,
    rng: &mut R,
) -> Result<bool, MoveResolutionError> {
    let details = resolver.resolve(move_name).await?;
    Ok(check_hit_with(&details, rng))
}

/// Damage dealt by `attacker` using `details` against `defender`.
///
/// Each multiplier is applied in order with truncation after every step: base
/// damage, STAB, type effectiveness, then the 85..=100% random factor. Draws one
/// value for the critical roll and one for the random factor, and none at all for
/// status or powerless moves.
pub fn compute_damage_with<R: RandomSource + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    details: &MoveDetails,
    rng: &mut R,
) -> DamageOutcome {
    if details.category == MoveCategory::Status {
        let effect = details.short_effect("en").unwrap_or(NO_EFFECT_DESCRIPTION);
        return DamageOutcome::message_only(format!(
            "{} used {}! {}",
            attacker.name(),
            details.name,
            effect
        ));
    }

    let power = match details.power {
        Some(power) if power > 0 => power,
        _ => {
            return DamageOutcome::message_only(format!(
                "{} used {}, but it had no effect!",
                attacker.name(),
                details.name
            ))
        }
    };

    let critical = rng.chance(CRITICAL_CHANCE);
    let crit_mod = if critical { CRITICAL_MULTIPLIER } else { 1.0 };
    let (attack_stat, defense_stat) = match details.category {
        MoveCategory::Special => (StatName::SpecialAttack, StatName::SpecialDefense),
        _ => (StatName::Attack, StatName::Defense),
    };
    let attack = f64::from(attacker.stat(attack_stat).unwrap_or(FALLBACK_STAT));
    let defense = f64::from(defender.stat(defense_stat).unwrap_or(FALLBACK_STAT).max(1));
    let level = f64::from(attacker.level());

    let mut damage =
        ((((2.0 * level * crit_mod) / 5.0 + 2.0) * f64::from(power) * attack / defense) / 50.0
            + 2.0)
            .floor();

    if attacker.types().contains(&details.move_type) {
        damage = (damage * STAB_MULTIPLIER).floor();
    }

    let type_mod = effectiveness(details.move_type, defender.types());
    damage = (damage * type_mod).floor();

    let random = ((rng.unit() * 16.0).floor() + 85.0) / 100.0;
    damage = (damage * random).floor();

    let mut message = format!("{} used {}!", attacker.name(), details.name);
    if critical {
        message.push_str(" A critical hit!");
    }
    if type_mod > 1.0 {
        message.push_str(" It's super effective!");
    } else if type_mod > 0.0 && type_mod < 1.0 {
        message.push_str(" It's not very effective...");
    } else if type_mod == 0.0 {
        message.push_str(" It had no effect...");
        damage = 0.0;
    }

    DamageOutcome {
        damage: damage as u32,
        message,
        critical,
        effectiveness: type_mod,
    }
}

pub async fn compute_damage<R: RandomSource + ?Sized>(
    resolver: &MoveResolver,
    attacker: &Combatant,
    defender: &Combatant,
    move_name: &str,
    rng: &mut R,
) -> Result<DamageOutcome, MoveResolutionError> {
    let details = resolver.resolve(move_name).await?;
    Ok(compute_damage_with(attacker, defender, &details, rng))
}
