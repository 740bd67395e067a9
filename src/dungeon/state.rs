//! Dungeon Incremental state. Data structures only, no logic.
//!
//! Catalog definitions (moves, items, enemies) are immutable once loaded;
//! [`CharacterState`] is the only long-lived mutable state and is what gets
//! persisted. Encounter state lives in [`super::combat::Session`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ── Balance ───────────────────────────────────────────────────

/// Number of move slots on the combat bar.
pub const SLOT_COUNT: usize = 4;

/// Chance (0..1) that a flee attempt succeeds.
pub const FLEE_CHANCE: f64 = 0.6;

/// Percent of held gold lost on defeat.
pub const DEFEAT_GOLD_PENALTY_PCT: u64 = 12;

/// Stat points granted per level.
pub const STAT_POINTS_PER_LEVEL: u32 = 3;

/// Skill points granted per level.
pub const SKILL_POINTS_PER_LEVEL: u32 = 1;

/// XP threshold growth per level, in percent.
pub const XP_GROWTH_PCT: u64 = 125;

pub const BASE_MAX_HP: u32 = 20;
pub const HP_PER_VITALITY: u32 = 4;

pub const START_XP_TO_NEXT: u64 = 50;
pub const START_STAT: u32 = 5;
pub const START_MOVE: &str = "strike";
pub const START_ZONE: &str = "forest";

/// `floor(value * pct / 100)`, saturating at `u64::MAX`.
pub fn percent_of(value: u64, pct: u64) -> u64 {
    (value / 100).saturating_mul(pct).saturating_add(value % 100 * pct / 100)
}

// ── Moves ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageClass {
    Physical,
    Magic,
    Utility,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirement {
    pub magic: u32,
    pub strength: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cost {
    pub gold: u64,
    pub skill_points: u32,
}

/// Template for a timed effect a move attaches on hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub id: String,
    pub name: String,
    pub duration: u32,
    #[serde(default)]
    pub damage_per_turn: Option<u32>,
    #[serde(default)]
    pub heal_per_turn: Option<u32>,
    /// Multiplies the afflicted enemy's attack (e.g. 0.7 = weakened).
    #[serde(default)]
    pub attack_multiplier: Option<f64>,
}

impl EffectTemplate {
    /// Regen-only templates land on the caster; everything else on the enemy.
    pub fn targets_caster(&self) -> bool {
        self.heal_per_turn.unwrap_or(0) > 0
            && self.damage_per_turn.unwrap_or(0) == 0
            && self.attack_multiplier.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub class: DamageClass,
    /// Negative for heals.
    pub base_damage: i32,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default)]
    pub effect: Option<EffectTemplate>,
    #[serde(default)]
    pub cooldown: u32,
}

impl MoveDef {
    pub fn is_heal(&self) -> bool {
        self.class == DamageClass::Utility && self.base_damage < 0
    }
}

// ── Items ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

impl EquipSlot {
    pub fn label(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Accessory => "accessory",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBonus {
    pub magic: u32,
    pub strength: u32,
    pub vitality: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// `None` for loot and consumables.
    #[serde(default)]
    pub slot: Option<EquipSlot>,
    #[serde(default)]
    pub bonus: StatBonus,
    /// Flat HP restored when used; 0 means not usable.
    #[serde(default)]
    pub heal: u32,
    #[serde(default)]
    pub sell_price: u64,
}

// ── Enemies ───────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub hp_min: u32,
    pub hp_max: u32,
    pub attack: u32,
    pub xp: u64,
    pub gold_min: u64,
    pub gold_max: u64,
    #[serde(default)]
    pub loot: Vec<String>,
}

// ── Character ─────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Magic,
    Strength,
    Vitality,
}

impl StatKind {
    pub fn label(self) -> &'static str {
        match self {
            StatKind::Magic => "Magic",
            StatKind::Strength => "Strength",
            StatKind::Vitality => "Vitality",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub magic: u32,
    pub strength: u32,
    pub vitality: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self { magic: START_STAT, strength: START_STAT, vitality: START_STAT }
    }
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Magic => self.magic,
            StatKind::Strength => self.strength,
            StatKind::Vitality => self.vitality,
        }
    }

    pub fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::Magic => &mut self.magic,
            StatKind::Strength => &mut self.strength,
            StatKind::Vitality => &mut self.vitality,
        }
    }

    pub fn meets(&self, req: &Requirement) -> bool {
        self.magic >= req.magic && self.strength >= req.strength
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub accessory: Option<String>,
}

impl Equipment {
    pub fn get(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_deref(),
            EquipSlot::Armor => self.armor.as_deref(),
            EquipSlot::Accessory => self.accessory.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<String> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Accessory => &mut self.accessory,
        }
    }
}

/// Persistent player progression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterState {
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub gold: u64,
    pub skill_points: u32,
    pub stat_points: u32,
    pub stats: Stats,
    pub hp: u32,
    pub max_hp: u32,
    pub moves_owned: BTreeSet<String>,
    pub move_slots: [Option<String>; SLOT_COUNT],
    /// Sparse: slots without an entry are ready.
    pub cooldowns: BTreeMap<usize, u32>,
    pub inventory: BTreeMap<String, u32>,
    pub equipment: Equipment,
    pub zone: String,
}

impl CharacterState {
    pub fn new() -> Self {
        let stats = Stats::default();
        let max_hp = BASE_MAX_HP + stats.vitality * HP_PER_VITALITY;
        Self {
            level: 1,
            xp: 0,
            xp_to_next: START_XP_TO_NEXT,
            gold: 0,
            skill_points: 0,
            stat_points: 0,
            stats,
            hp: max_hp,
            max_hp,
            moves_owned: BTreeSet::from([START_MOVE.to_string()]),
            move_slots: [Some(START_MOVE.to_string()), None, None, None],
            cooldowns: BTreeMap::new(),
            inventory: BTreeMap::new(),
            equipment: Equipment::default(),
            zone: START_ZONE.to_string(),
        }
    }

    pub fn cooldown(&self, slot: usize) -> u32 {
        self.cooldowns.get(&slot).copied().unwrap_or(0)
    }

    /// Slot currently holding `move_id`, if any.
    pub fn slot_of(&self, move_id: &str) -> Option<usize> {
        self.move_slots.iter().position(|s| s.as_deref() == Some(move_id))
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    pub fn owns(&self, move_id: &str) -> bool {
        self.moves_owned.contains(move_id)
    }
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let s = CharacterState::new();
        assert_eq!(s.level, 1);
        assert_eq!(s.xp_to_next, 50);
        assert_eq!(s.max_hp, 40);
        assert_eq!(s.hp, 40);
        assert_eq!(s.gold, 0);
        assert_eq!(s.zone, "forest");
        assert!(s.owns("strike"));
        assert_eq!(s.slot_of("strike"), Some(0));
        assert!(s.cooldowns.is_empty());
    }

    #[test]
    fn cooldown_defaults_to_zero() {
        let mut s = CharacterState::new();
        assert_eq!(s.cooldown(2), 0);
        s.cooldowns.insert(2, 3);
        assert_eq!(s.cooldown(2), 3);
    }

    #[test]
    fn percent_of_rounds_down_without_overflow() {
        assert_eq!(percent_of(250, 12), 30);
        assert_eq!(percent_of(99, 12), 11);
        assert_eq!(percent_of(62, 125), 77);
        assert_eq!(percent_of(u64::MAX, 12), u64::MAX / 100 * 12 + u64::MAX % 100 * 12 / 100);
        assert_eq!(percent_of(u64::MAX, 125), u64::MAX);
    }

    #[test]
    fn requirement_check() {
        let stats = Stats { magic: 10, strength: 3, vitality: 5 };
        assert!(stats.meets(&Requirement { magic: 5, strength: 0 }));
        assert!(!stats.meets(&Requirement { magic: 5, strength: 4 }));
    }

    #[test]
    fn regen_template_targets_caster() {
        let regen = EffectTemplate {
            id: "regen".into(),
            name: "Regen".into(),
            duration: 3,
            damage_per_turn: None,
            heal_per_turn: Some(4),
            attack_multiplier: None,
        };
        assert!(regen.targets_caster());
        let poison = EffectTemplate { heal_per_turn: None, damage_per_turn: Some(3), ..regen };
        assert!(!poison.targets_caster());
    }

    #[test]
    fn heal_moves_are_negative_utility() {
        let mv = MoveDef {
            id: "mend".into(),
            name: "Mend".into(),
            icon: String::new(),
            class: DamageClass::Utility,
            base_damage: -8,
            requirement: Requirement::default(),
            cost: Cost::default(),
            effect: None,
            cooldown: 2,
        };
        assert!(mv.is_heal());
        let bash = MoveDef { class: DamageClass::Physical, ..mv };
        assert!(!bash.is_heal());
    }
}
