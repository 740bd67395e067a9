//! XP, levels, stat allocation and move acquisition.

use super::catalog::Catalog;
use super::state::{
    percent_of, CharacterState, EquipSlot, StatKind, BASE_MAX_HP, HP_PER_VITALITY,
    SKILL_POINTS_PER_LEVEL, STAT_POINTS_PER_LEVEL, XP_GROWTH_PCT,
};
use crate::error::ActionError;
use crate::log::LogLine;

// ── Max HP ───────────────────────────────────────────────────

/// Saturates at `u32::MAX`; loaded saves can carry any stat value.
pub fn compute_max_hp(state: &CharacterState, catalog: &Catalog) -> u32 {
    let armor = catalog.equipped_bonus(&state.equipment, EquipSlot::Armor).vitality;
    state
        .stats
        .vitality
        .saturating_add(armor)
        .saturating_mul(HP_PER_VITALITY)
        .saturating_add(BASE_MAX_HP)
}

/// Recompute max HP after a stat or equipment change. HP is clamped, never
/// raised.
pub fn refresh_max_hp(state: &mut CharacterState, catalog: &Catalog) {
    state.max_hp = compute_max_hp(state, catalog);
    state.hp = state.hp.min(state.max_hp);
}

// ── Level Up ─────────────────────────────────────────────────

/// Add XP and process every level-up it pays for. Returns levels gained.
pub fn gain_xp(
    state: &mut CharacterState,
    catalog: &Catalog,
    amount: u64,
    log: &mut Vec<LogLine>,
) -> u32 {
    state.xp = state.xp.saturating_add(amount);
    let mut gained = 0;

    while state.xp >= state.xp_to_next {
        state.xp -= state.xp_to_next;
        state.level = state.level.saturating_add(1);
        state.stat_points = state.stat_points.saturating_add(STAT_POINTS_PER_LEVEL);
        state.skill_points = state.skill_points.saturating_add(SKILL_POINTS_PER_LEVEL);
        state.xp_to_next = percent_of(state.xp_to_next, XP_GROWTH_PCT).max(1);
        state.max_hp = compute_max_hp(state, catalog);
        state.hp = state.max_hp;
        gained += 1;

        tracing::debug!(level = state.level, next = state.xp_to_next, "level up");
        log.push(LogLine::good(format!(
            "Level up! You are now level {} (+{} stat points, +{} skill point).",
            state.level, STAT_POINTS_PER_LEVEL, SKILL_POINTS_PER_LEVEL
        )));
    }
    gained
}

// ── Stats ────────────────────────────────────────────────────

pub fn allocate_stat(
    state: &mut CharacterState,
    catalog: &Catalog,
    stat: StatKind,
    log: &mut Vec<LogLine>,
) -> Result<(), ActionError> {
    if state.stat_points == 0 {
        return Err(ActionError::NoStatPoints);
    }
    state.stat_points -= 1;
    let value = state.stats.get_mut(stat);
    *value = value.saturating_add(1);
    refresh_max_hp(state, catalog);
    log.push(LogLine::good(format!("{} increased to {}.", stat.label(), state.stats.get(stat))));
    Ok(())
}

// ── Moves ────────────────────────────────────────────────────

/// Buy a move. Both costs are checked before either is paid.
pub fn learn_move(
    state: &mut CharacterState,
    catalog: &Catalog,
    move_id: &str,
    log: &mut Vec<LogLine>,
) -> Result<(), ActionError> {
    let mv = catalog
        .move_def(move_id)
        .ok_or_else(|| ActionError::UnknownMove { id: move_id.to_string() })?;
    if state.owns(move_id) {
        return Err(ActionError::AlreadyOwned { name: mv.name.clone() });
    }
    if state.gold < mv.cost.gold {
        return Err(ActionError::NotEnoughGold { have: state.gold, need: mv.cost.gold });
    }
    if state.skill_points < mv.cost.skill_points {
        return Err(ActionError::NotEnoughSkillPoints {
            have: state.skill_points,
            need: mv.cost.skill_points,
        });
    }

    state.gold -= mv.cost.gold;
    state.skill_points -= mv.cost.skill_points;
    state.moves_owned.insert(mv.id.clone());
    log.push(LogLine::good(format!("You learned {} {}!", mv.icon, mv.name)));
    Ok(())
}

/// Wipe everything back to a fresh character.
pub fn reset_progression(state: &mut CharacterState, log: &mut Vec<LogLine>) {
    *state = CharacterState::new();
    tracing::info!("progression reset");
    log.push(LogLine::muted("Progress reset. A new adventure begins."));
}
