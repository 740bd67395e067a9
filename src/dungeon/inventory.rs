//! Inventory and equipment actions.
//!
//! All actions except [`add_item`] are locked while an encounter is running.

use super::catalog::Catalog;
use super::combat::Session;
use super::progression::refresh_max_hp;
use super::state::{CharacterState, EquipSlot, ItemDef};
use crate::error::ActionError;
use crate::log::LogLine;

pub fn add_item(state: &mut CharacterState, item_id: &str, count: u32) {
    if count == 0 {
        return;
    }
    let entry = state.inventory.entry(item_id.to_string()).or_insert(0);
    *entry = entry.saturating_add(count);
}

fn remove_one(state: &mut CharacterState, item_id: &str) {
    if let Some(count) = state.inventory.get_mut(item_id) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            state.inventory.remove(item_id);
        }
    }
}

/// Look up an item the player is holding.
fn held<'a>(
    state: &CharacterState,
    session: &Session,
    catalog: &'a Catalog,
    item_id: &str,
) -> Result<&'a ItemDef, ActionError> {
    if session.in_combat() {
        return Err(ActionError::InCombat);
    }
    let item = catalog
        .item(item_id)
        .ok_or_else(|| ActionError::UnknownItem { id: item_id.to_string() })?;
    if state.item_count(item_id) == 0 {
        return Err(ActionError::NotInInventory { name: item.name.clone() });
    }
    Ok(item)
}

/// Equip from the inventory. Whatever was in the slot goes back to the bag.
pub fn equip_item(
    state: &mut CharacterState,
    session: &Session,
    catalog: &Catalog,
    item_id: &str,
    log: &mut Vec<LogLine>,
) -> Result<EquipSlot, ActionError> {
    let item = held(state, session, catalog, item_id)?;
    let slot = item.slot.ok_or_else(|| ActionError::NotEquippable { name: item.name.clone() })?;

    remove_one(state, item_id);
    if let Some(previous) = state.equipment.slot_mut(slot).replace(item.id.clone()) {
        add_item(state, &previous, 1);
    }
    refresh_max_hp(state, catalog);
    log.push(LogLine::good(format!("Equipped {} {} ({}).", item.icon, item.name, slot.label())));
    Ok(slot)
}

pub fn unequip(
    state: &mut CharacterState,
    session: &Session,
    catalog: &Catalog,
    slot: EquipSlot,
    log: &mut Vec<LogLine>,
) -> Result<(), ActionError> {
    if session.in_combat() {
        return Err(ActionError::InCombat);
    }
    let item_id = state.equipment.slot_mut(slot).take().ok_or(ActionError::NothingEquipped)?;
    add_item(state, &item_id, 1);
    refresh_max_hp(state, catalog);
    let name = catalog.item(&item_id).map(|i| i.name.as_str()).unwrap_or(&item_id);
    log.push(LogLine::muted(format!("Unequipped {}.", name)));
    Ok(())
}

/// Drink or eat a consumable.
pub fn use_item(
    state: &mut CharacterState,
    session: &Session,
    catalog: &Catalog,
    item_id: &str,
    log: &mut Vec<LogLine>,
) -> Result<u32, ActionError> {
    let item = held(state, session, catalog, item_id)?;
    if item.heal == 0 {
        return Err(ActionError::NotUsable { name: item.name.clone() });
    }
    if state.hp >= state.max_hp {
        return Err(ActionError::FullHp);
    }

    remove_one(state, item_id);
    let before = state.hp;
    state.hp = state.hp.saturating_add(item.heal).min(state.max_hp);
    let healed = state.hp - before;
    log.push(LogLine::good(format!("{} {} restores {} HP.", item.icon, item.name, healed)));
    Ok(healed)
}

pub fn sell_item(
    state: &mut CharacterState,
    session: &Session,
    catalog: &Catalog,
    item_id: &str,
    log: &mut Vec<LogLine>,
) -> Result<u64, ActionError> {
    let item = held(state, session, catalog, item_id)?;
    remove_one(state, item_id);
    state.gold = state.gold.saturating_add(item.sell_price);
    log.push(LogLine::neutral(format!("Sold {} for {} gold.", item.name, item.sell_price)));
    Ok(item.sell_price)
}
