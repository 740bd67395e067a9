//! Save/load for Dungeon Incremental.
//!
//! The blob is flat JSON mirroring [`CharacterState`] field for field, with no
//! version number. Loading never fails hard:
//!
//! - unknown fields are ignored and missing ones take their starting values
//!   (`#[serde(default)]`);
//! - ids the catalog no longer knows, duplicate slot entries and out-of-range
//!   values are dropped or clamped;
//! - a blob that doesn't parse at all is discarded and the game starts fresh.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::progression::compute_max_hp;
use super::state::{
    CharacterState, EquipSlot, Equipment, Stats, SLOT_COUNT, START_MOVE, START_ZONE,
};
use crate::error::SaveError;

/// Key the blob is stored under.
pub const STORAGE_KEY: &str = "dungeonIncrementalSave";

/// Autosave interval in ticks. 10 ticks/sec × 10 s.
pub const AUTOSAVE_INTERVAL: u32 = 100;

// ── Blob ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSave {
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub gold: u64,
    pub skill_points: u32,
    pub stat_points: u32,
    pub stats: Stats,
    pub hp: u32,
    pub max_hp: u32,
    pub moves_owned: Vec<String>,
    pub move_slots: Vec<Option<String>>,
    pub cooldowns: BTreeMap<usize, u32>,
    pub inventory: BTreeMap<String, u32>,
    pub equipment: Equipment,
    pub zone: String,
}

impl Default for CharacterSave {
    fn default() -> Self {
        extract_save(&CharacterState::new())
    }
}

pub fn extract_save(state: &CharacterState) -> CharacterSave {
    CharacterSave {
        level: state.level,
        xp: state.xp,
        xp_to_next: state.xp_to_next,
        gold: state.gold,
        skill_points: state.skill_points,
        stat_points: state.stat_points,
        stats: state.stats,
        hp: state.hp,
        max_hp: state.max_hp,
        moves_owned: state.moves_owned.iter().cloned().collect(),
        move_slots: state.move_slots.to_vec(),
        cooldowns: state.cooldowns.clone(),
        inventory: state.inventory.clone(),
        equipment: state.equipment.clone(),
        zone: state.zone.clone(),
    }
}

/// Rebuild a character from a blob, repairing anything the catalog or the
/// state invariants reject.
pub fn apply_save(save: CharacterSave, catalog: &Catalog) -> CharacterState {
    let mut moves_owned: BTreeSet<String> = save
        .moves_owned
        .into_iter()
        .filter(|id| catalog.move_def(id).is_some())
        .collect();
    moves_owned.insert(START_MOVE.to_string());

    let mut move_slots: [Option<String>; SLOT_COUNT] = Default::default();
    for (slot, entry) in save.move_slots.into_iter().take(SLOT_COUNT).enumerate() {
        let Some(id) = entry else { continue };
        let duplicate = move_slots.iter().flatten().any(|m| *m == id);
        if moves_owned.contains(&id) && !duplicate {
            move_slots[slot] = Some(id);
        }
    }

    let cooldowns = save
        .cooldowns
        .into_iter()
        .filter(|&(slot, turns)| slot < SLOT_COUNT && turns > 0 && move_slots[slot].is_some())
        .collect();

    let inventory = save
        .inventory
        .into_iter()
        .filter(|(id, count)| *count > 0 && catalog.item(id).is_some())
        .collect();

    let mut equipment = Equipment::default();
    for slot in [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Accessory] {
        let fits = |id: &String| catalog.item(id).is_some_and(|item| item.slot == Some(slot));
        *equipment.slot_mut(slot) = save.equipment.get(slot).map(str::to_string).filter(fits);
    }

    let zone = if catalog.zone(&save.zone).is_some() { save.zone } else { START_ZONE.to_string() };

    let xp_to_next = save.xp_to_next.max(1);
    let mut state = CharacterState {
        level: save.level.max(1),
        xp: save.xp.min(xp_to_next - 1),
        xp_to_next,
        gold: save.gold,
        skill_points: save.skill_points,
        stat_points: save.stat_points,
        stats: save.stats,
        hp: save.hp,
        max_hp: save.max_hp,
        moves_owned,
        move_slots,
        cooldowns,
        inventory,
        equipment,
        zone,
    };
    state.max_hp = compute_max_hp(&state, catalog);
    state.hp = state.hp.min(state.max_hp);
    state
}

// ── Stores ───────────────────────────────────────────────────

/// Key-value blob store the game persists into.
pub trait SaveStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str);
}

/// In-process store for native builds and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser localStorage. WASM only.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn read(&self, key: &str) -> Option<String> {
        get_storage()?.get_item(key).ok()?
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), SaveError> {
        let storage = get_storage().ok_or(SaveError::StorageUnavailable)?;
        storage.set_item(key, blob).map_err(|e| {
            web_sys::console::warn_1(
                &format!("Dungeon Incremental: localStorage write failed: {e:?}").into(),
            );
            SaveError::Write(format!("{e:?}"))
        })
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = get_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// ── Save / Load ──────────────────────────────────────────────

pub fn save_game<S: SaveStore + ?Sized>(
    store: &mut S,
    state: &CharacterState,
) -> Result<(), SaveError> {
    let json = serde_json::to_string(&extract_save(state))?;
    store.write(STORAGE_KEY, &json)
}

/// Restore the saved character, if there is a usable one.
///
/// A blob that fails to parse is deleted so the next save starts clean.
pub fn load_game<S: SaveStore + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
) -> Option<CharacterState> {
    let json = store.read(STORAGE_KEY)?;
    match serde_json::from_str::<CharacterSave>(&json) {
        Ok(save) => Some(apply_save(save, catalog)),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable save");
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(
                &format!("Dungeon Incremental: save data is corrupt, discarding: {e}").into(),
            );
            store.remove(STORAGE_KEY);
            None
        }
    }
}

pub fn delete_save<S: SaveStore + ?Sized>(store: &mut S) {
    store.remove(STORAGE_KEY);
}
