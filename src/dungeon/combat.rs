//! Encounter resolution. Pure game logic, no rendering or IO.
//!
//! Idle → spawn → InCombat → (use_move | flee)* → Resolved(outcome) →
//! resolve → Idle. Every call runs to completion; the [`Session`] is the only
//! place encounter state lives.

use rand::seq::SliceRandom;
use rand::Rng;

use super::catalog::Catalog;
use super::effects::{self, Afflicted, StatusEffect, TickEvent};
use super::inventory::add_item;
use super::progression::gain_xp;
use super::state::{
    percent_of, CharacterState, DamageClass, EnemyTemplate, EquipSlot, MoveDef,
    DEFEAT_GOLD_PENALTY_PCT, FLEE_CHANCE, SLOT_COUNT,
};
use crate::error::ActionError;
use crate::log::LogLine;

// ── Session ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Fled,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InCombat,
    Resolved(Outcome),
}

#[derive(Clone, Debug)]
pub struct EnemyInstance {
    pub template: EnemyTemplate,
    pub hp: u32,
    pub max_hp: u32,
    pub effects: Vec<StatusEffect>,
}

impl EnemyInstance {
    pub fn spawn<R: Rng + ?Sized>(template: &EnemyTemplate, rng: &mut R) -> Self {
        let hp = rng.gen_range(template.hp_min..=template.hp_max).max(1);
        Self { template: template.clone(), hp, max_hp: hp, effects: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }
}

impl Afflicted for EnemyInstance {
    fn hp(&self) -> u32 {
        self.hp
    }
    fn max_hp(&self) -> u32 {
        self.max_hp
    }
    fn set_hp(&mut self, hp: u32) {
        self.hp = hp.min(self.max_hp);
    }
    fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
        &mut self.effects
    }
}

/// Ephemeral context for the current encounter and the swap workflow.
#[derive(Clone, Debug)]
pub struct Session {
    pub phase: Phase,
    pub enemy: Option<EnemyInstance>,
    /// Effects on the player (regen); cleared when the encounter ends.
    pub player_effects: Vec<StatusEffect>,
    /// Slot picked for a swap, waiting for the replacement move.
    pub pending_swap: Option<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, enemy: None, player_effects: Vec::new(), pending_swap: None }
    }

    pub fn in_combat(&self) -> bool {
        self.phase == Phase::InCombat
    }

    pub fn enemy(&self) -> Option<&EnemyInstance> {
        self.enemy.as_ref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The player as an effect target: HP lives in the character, effects in
/// the session.
struct PlayerSide<'a> {
    state: &'a mut CharacterState,
    effects: &'a mut Vec<StatusEffect>,
}

impl Afflicted for PlayerSide<'_> {
    fn hp(&self) -> u32 {
        self.state.hp
    }
    fn max_hp(&self) -> u32 {
        self.state.max_hp
    }
    fn set_hp(&mut self, hp: u32) {
        self.state.hp = hp.min(self.state.max_hp);
    }
    fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
        self.effects
    }
}

// ── Formulas ─────────────────────────────────────────────────

/// Damage a non-heal move deals before any enemy-side modifiers.
pub fn player_damage(mv: &MoveDef, state: &CharacterState, catalog: &Catalog) -> u32 {
    let base = i64::from(mv.base_damage);
    let total = match mv.class {
        DamageClass::Physical => {
            let weapon = catalog.equipped_bonus(&state.equipment, EquipSlot::Weapon).strength;
            let strength = i64::from(state.stats.strength) + i64::from(weapon);
            base + strength * 14 / 10
        }
        DamageClass::Magic => base + i64::from(state.stats.magic) * 16 / 10,
        DamageClass::Utility => base,
    };
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

/// HP restored by a heal move.
pub fn heal_amount(mv: &MoveDef, state: &CharacterState) -> u32 {
    let total = u64::from(mv.base_damage.unsigned_abs()) + u64::from(state.stats.magic) * 15 / 10;
    u32::try_from(total).unwrap_or(u32::MAX)
}

pub fn player_defense(state: &CharacterState, catalog: &Catalog) -> u32 {
    let armor = catalog.equipped_bonus(&state.equipment, EquipSlot::Armor).vitality;
    state.stats.vitality.saturating_add(armor) / 2
}

/// Enemy hit against the player. Never below 1.
pub fn counter_damage(enemy: &EnemyInstance, state: &CharacterState, catalog: &Catalog) -> u32 {
    let attack = effects::modified_attack(enemy.template.attack, &enemy.effects);
    attack.saturating_sub(player_defense(state, catalog)).max(1)
}

// ── Actions ──────────────────────────────────────────────────

/// Start an encounter in `zone_id`, which also becomes the selected zone.
pub fn spawn<R: Rng + ?Sized>(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    zone_id: &str,
    rng: &mut R,
    log: &mut Vec<LogLine>,
) -> Result<(), ActionError> {
    if session.phase != Phase::Idle {
        return Err(ActionError::InCombat);
    }
    let zone = catalog
        .zone(zone_id)
        .ok_or_else(|| ActionError::UnknownZone { id: zone_id.to_string() })?;
    let template = zone
        .enemies
        .choose(rng)
        .ok_or_else(|| ActionError::EmptyZone { zone: zone.name.clone() })?;

    let enemy = EnemyInstance::spawn(template, rng);
    tracing::debug!(zone = zone_id, enemy = %enemy.template.id, hp = enemy.hp, "encounter spawned");
    log.push(LogLine::neutral(format!(
        "A wild {} appears in {}! ({} HP)",
        enemy.name(),
        zone.name,
        enemy.hp
    )));

    state.zone = zone_id.to_string();
    session.enemy = Some(enemy);
    session.player_effects.clear();
    session.pending_swap = None;
    session.phase = Phase::InCombat;
    Ok(())
}

/// Resolve one player turn using the move in `slot`.
///
/// Rejections leave every piece of state untouched. Once the move goes off,
/// cooldowns tick down at the end of the turn whatever the outcome.
pub fn use_move(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    slot: usize,
    log: &mut Vec<LogLine>,
) -> Result<Phase, ActionError> {
    if !session.in_combat() {
        return Err(ActionError::NotInCombat);
    }
    if slot >= SLOT_COUNT {
        return Err(ActionError::InvalidSlot { slot });
    }

    let assigned = state.move_slots[slot].as_deref();
    let turns = state.cooldown(slot);
    if turns > 0 {
        let name = assigned
            .and_then(|id| catalog.move_def(id))
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("Slot {}", slot + 1));
        return Err(ActionError::OnCooldown { name, turns });
    }
    let move_id = assigned.ok_or(ActionError::EmptySlot { slot })?;
    let mv = catalog
        .move_def(move_id)
        .ok_or_else(|| ActionError::UnknownMove { id: move_id.to_string() })?;
    if !state.stats.meets(&mv.requirement) {
        return Err(ActionError::RequirementUnmet {
            name: mv.name.clone(),
            magic: mv.requirement.magic,
            strength: mv.requirement.strength,
        });
    }
    let Some(enemy) = session.enemy.as_mut() else {
        return Err(ActionError::NotInCombat);
    };

    let magic = state.stats.magic;

    if mv.is_heal() {
        let before = state.hp;
        state.hp = state.hp.saturating_add(heal_amount(mv, state)).min(state.max_hp);
        log.push(LogLine::good(format!(
            "{} {} restores {} HP.",
            mv.icon,
            mv.name,
            state.hp - before
        )));
    } else {
        let damage = player_damage(mv, state, catalog);
        enemy.hp = enemy.hp.saturating_sub(damage);
        if damage > 0 || mv.class != DamageClass::Utility {
            log.push(LogLine::good(format!(
                "{} {} hits {} for {} damage.",
                mv.icon,
                mv.name,
                enemy.name(),
                damage
            )));
        }

        if let Some(template) = &mv.effect {
            let events = if template.targets_caster() {
                let mut player =
                    PlayerSide { state: &mut *state, effects: &mut session.player_effects };
                effects::attach(&mut player, template, mv.class, magic)
            } else {
                effects::attach(enemy, template, mv.class, magic)
            };
            let target = if template.targets_caster() { "You" } else { enemy.name() };
            log.push(LogLine::neutral(format!("{} gains {}.", target, template.name)));
            log_ticks(log, target, &events);
        }
    }

    if mv.cooldown > 0 {
        state.cooldowns.insert(slot, mv.cooldown);
    } else {
        state.cooldowns.remove(&slot);
    }

    if enemy.hp == 0 {
        session.phase = Phase::Resolved(Outcome::Victory);
        log.push(LogLine::good(format!("{} is defeated!", enemy.name())));
        decrement_cooldowns(state);
        return Ok(session.phase);
    }

    let events = effects::apply_ticks(enemy, magic);
    log_ticks(log, enemy.name(), &events);
    let mut player = PlayerSide { state: &mut *state, effects: &mut session.player_effects };
    let events = effects::apply_ticks(&mut player, magic);
    log_ticks(log, "You", &events);

    if enemy.hp == 0 {
        session.phase = Phase::Resolved(Outcome::Victory);
        log.push(LogLine::good(format!("{} succumbs!", enemy.name())));
        decrement_cooldowns(state);
        return Ok(session.phase);
    }

    enemy_attack(state, session, catalog, log);
    decrement_cooldowns(state);
    Ok(session.phase)
}

/// Try to escape. Failing gives the enemy a free hit.
pub fn flee<R: Rng + ?Sized>(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    rng: &mut R,
    log: &mut Vec<LogLine>,
) -> Result<Phase, ActionError> {
    if !session.in_combat() {
        return Err(ActionError::NotInCombat);
    }
    if rng.gen_bool(FLEE_CHANCE) {
        session.phase = Phase::Resolved(Outcome::Fled);
        log.push(LogLine::muted("You got away safely."));
    } else {
        log.push(LogLine::bad("You couldn't escape!"));
        enemy_attack(state, session, catalog, log);
    }
    Ok(session.phase)
}

/// Settle a finished encounter and return to Idle.
///
/// Victory pays out gold, XP and one loot roll; fleeing and defeat pay
/// nothing (the defeat penalty is taken when the player falls).
pub fn resolve<R: Rng + ?Sized>(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    rng: &mut R,
    log: &mut Vec<LogLine>,
) -> Option<Outcome> {
    let outcome = match session.phase {
        Phase::Resolved(outcome) => outcome,
        _ => return None,
    };
    let enemy = session.enemy.take();

    if let (Outcome::Victory, Some(enemy)) = (outcome, enemy) {
        let t = &enemy.template;
        let gold = rng.gen_range(t.gold_min..=t.gold_max);
        state.gold = state.gold.saturating_add(gold);
        log.push(LogLine::good(format!("Victory! +{} gold, +{} XP.", gold, t.xp)));
        gain_xp(state, catalog, t.xp, log);

        if let Some(item_id) = t.loot.choose(rng) {
            add_item(state, item_id, 1);
            let name = catalog.item(item_id).map(|i| i.name.as_str()).unwrap_or(item_id);
            log.push(LogLine::good(format!("Looted {}.", name)));
        }
    }

    tracing::debug!(?outcome, "encounter resolved");
    session.phase = Phase::Idle;
    session.player_effects.clear();
    Some(outcome)
}

fn enemy_attack(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    log: &mut Vec<LogLine>,
) {
    let Some(enemy) = session.enemy.as_ref() else {
        return;
    };
    let damage = counter_damage(enemy, state, catalog);
    state.hp = state.hp.saturating_sub(damage);
    log.push(LogLine::bad(format!("{} hits you for {} damage.", enemy.name(), damage)));

    if state.hp == 0 {
        let lost = apply_defeat_penalty(state);
        log.push(LogLine::bad(format!(
            "You were defeated by {} and lost {} gold.",
            enemy.name(),
            lost
        )));
        session.phase = Phase::Resolved(Outcome::Defeat);
    }
}

/// Lose a share of gold and get patched up. Returns the gold lost.
pub fn apply_defeat_penalty(state: &mut CharacterState) -> u64 {
    let lost = percent_of(state.gold, DEFEAT_GOLD_PENALTY_PCT).min(state.gold);
    state.gold -= lost;
    state.hp = state.max_hp;
    lost
}

fn decrement_cooldowns(state: &mut CharacterState) {
    for turns in state.cooldowns.values_mut() {
        *turns = turns.saturating_sub(1);
    }
    state.cooldowns.retain(|_, turns| *turns > 0);
}

fn log_ticks(log: &mut Vec<LogLine>, target: &str, events: &[TickEvent]) {
    for event in events {
        let line = match event {
            TickEvent::Damaged { effect, amount } => {
                LogLine::good(format!("{} takes {} {} damage.", target, amount, effect))
            }
            TickEvent::Healed { effect, amount } => {
                LogLine::good(format!("{} recovers {} HP from {}.", target, amount, effect))
            }
            TickEvent::Expired { effect } => {
                LogLine::muted(format!("{} wears off ({}).", effect, target))
            }
        };
        log.push(line);
    }
}

// ── Tests ────────────────────────────────────────────────────
