//! Static game data: moves, items and per-zone enemy pools.
//!
//! A [`Catalog`] is built once at startup (from [`Catalog::builtin`] or
//! JSON) and validated up front, so lookups during play never have to deal
//! with dangling ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{
    Cost, DamageClass, EffectTemplate, EnemyTemplate, EquipSlot, Equipment, ItemDef, MoveDef,
    Requirement, StatBonus, START_MOVE, START_ZONE,
};
use crate::error::CatalogError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub enemies: Vec<EnemyTemplate>,
}

/// Serialized form of a catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogData {
    pub moves: Vec<MoveDef>,
    pub items: Vec<ItemDef>,
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    moves: BTreeMap<String, MoveDef>,
    items: BTreeMap<String, ItemDef>,
    zones: BTreeMap<String, Zone>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(data: CatalogData) -> Result<Self, CatalogError> {
        let mut moves = BTreeMap::new();
        for mv in data.moves {
            if let Some(effect) = &mv.effect {
                if mv.is_heal() {
                    return Err(CatalogError::HealWithEffect { id: mv.id });
                }
                if effect.duration == 0 {
                    return Err(CatalogError::ZeroDuration { id: effect.id.clone() });
                }
            }
            if moves.contains_key(&mv.id) {
                return Err(CatalogError::DuplicateId { kind: "move", id: mv.id });
            }
            moves.insert(mv.id.clone(), mv);
        }

        let mut items = BTreeMap::new();
        for item in data.items {
            if items.contains_key(&item.id) {
                return Err(CatalogError::DuplicateId { kind: "item", id: item.id });
            }
            items.insert(item.id.clone(), item);
        }

        let mut zones = BTreeMap::new();
        for zone in data.zones {
            for enemy in &zone.enemies {
                validate_enemy(enemy, &items)?;
            }
            if zones.contains_key(&zone.id) {
                return Err(CatalogError::DuplicateId { kind: "zone", id: zone.id });
            }
            zones.insert(zone.id.clone(), zone);
        }

        if !moves.contains_key(START_MOVE) {
            return Err(CatalogError::DanglingReference {
                owner: "starting kit".into(),
                kind: "move",
                id: START_MOVE.into(),
            });
        }
        if !zones.contains_key(START_ZONE) {
            return Err(CatalogError::DanglingReference {
                owner: "starting kit".into(),
                kind: "zone",
                id: START_ZONE.into(),
            });
        }

        Ok(Self { moves, items, zones })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::new(data)
    }

    /// The content shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_data())
    }

    pub fn move_def(&self, id: &str) -> Option<&MoveDef> {
        self.moves.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn moves(&self) -> impl Iterator<Item = &MoveDef> {
        self.moves.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Stat bonus of whatever is equipped in `slot` (zero if empty).
    pub fn equipped_bonus(&self, equipment: &Equipment, slot: EquipSlot) -> StatBonus {
        equipment
            .get(slot)
            .and_then(|id| self.item(id))
            .map(|item| item.bonus)
            .unwrap_or_default()
    }
}

fn validate_enemy(
    enemy: &EnemyTemplate,
    items: &BTreeMap<String, ItemDef>,
) -> Result<(), CatalogError> {
    if enemy.hp_max == 0 {
        return Err(CatalogError::ZeroHp { id: enemy.id.clone() });
    }
    if enemy.hp_min > enemy.hp_max {
        return Err(CatalogError::InvertedRange {
            owner: enemy.id.clone(),
            what: "hp",
            min: u64::from(enemy.hp_min),
            max: u64::from(enemy.hp_max),
        });
    }
    if enemy.gold_min > enemy.gold_max {
        return Err(CatalogError::InvertedRange {
            owner: enemy.id.clone(),
            what: "gold",
            min: enemy.gold_min,
            max: enemy.gold_max,
        });
    }
    if let Some(missing) = enemy.loot.iter().find(|id| !items.contains_key(*id)) {
        return Err(CatalogError::DanglingReference {
            owner: enemy.id.clone(),
            kind: "item",
            id: missing.clone(),
        });
    }
    Ok(())
}

// ── Built-in content ──────────────────────────────────────────

fn mv(
    id: &str,
    name: &str,
    icon: &str,
    class: DamageClass,
    base_damage: i32,
    cooldown: u32,
) -> MoveDef {
    MoveDef {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        class,
        base_damage,
        requirement: Requirement::default(),
        cost: Cost::default(),
        effect: None,
        cooldown,
    }
}

impl MoveDef {
    fn requires(self, magic: u32, strength: u32) -> Self {
        Self { requirement: Requirement { magic, strength }, ..self }
    }

    fn costs(self, gold: u64, skill_points: u32) -> Self {
        Self { cost: Cost { gold, skill_points }, ..self }
    }

    fn with_effect(self, effect: EffectTemplate) -> Self {
        Self { effect: Some(effect), ..self }
    }
}

fn effect(id: &str, name: &str, duration: u32) -> EffectTemplate {
    EffectTemplate {
        id: id.into(),
        name: name.into(),
        duration,
        damage_per_turn: None,
        heal_per_turn: None,
        attack_multiplier: None,
    }
}

fn dot(id: &str, name: &str, duration: u32, damage: u32) -> EffectTemplate {
    EffectTemplate { damage_per_turn: Some(damage), ..effect(id, name, duration) }
}

fn item(id: &str, name: &str, icon: &str, sell_price: u64) -> ItemDef {
    ItemDef {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        slot: None,
        bonus: StatBonus::default(),
        heal: 0,
        sell_price,
    }
}

/// `bonus` is (magic, strength, vitality).
fn gear(
    id: &str,
    name: &str,
    icon: &str,
    slot: EquipSlot,
    bonus: (u32, u32, u32),
    sell_price: u64,
) -> ItemDef {
    let (magic, strength, vitality) = bonus;
    ItemDef {
        slot: Some(slot),
        bonus: StatBonus { magic, strength, vitality },
        ..item(id, name, icon, sell_price)
    }
}

fn enemy(
    id: &str,
    name: &str,
    hp: (u32, u32),
    attack: u32,
    xp: u64,
    gold: (u64, u64),
    loot: &[&str],
) -> EnemyTemplate {
    EnemyTemplate {
        id: id.into(),
        name: name.into(),
        hp_min: hp.0,
        hp_max: hp.1,
        attack,
        xp,
        gold_min: gold.0,
        gold_max: gold.1,
        loot: loot.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn builtin_data() -> CatalogData {
    use DamageClass::*;

    let weaken = EffectTemplate { attack_multiplier: Some(0.7), ..effect("weaken", "Weaken", 3) };
    let regen = EffectTemplate { heal_per_turn: Some(4), ..effect("regen", "Regen", 4) };

    let moves = vec![
        mv("strike", "Strike", "🗡️", Physical, 4, 0),
        mv("cleave", "Cleave", "🪓", Physical, 10, 2).requires(0, 8).costs(100, 2),
        mv("poison_dart", "Poison Dart", "🎯", Physical, 2, 3)
            .costs(40, 1)
            .with_effect(dot("poison", "Poison", 4, 3)),
        mv("fireball", "Fireball", "🔥", Magic, 12, 2).requires(5, 0).costs(50, 1),
        mv("ignite", "Ignite", "♨️", Magic, 6, 3)
            .requires(8, 0)
            .costs(120, 2)
            .with_effect(dot("burn", "Burn", 3, 2)),
        mv("mend", "Mend", "💚", Utility, -8, 3).requires(3, 0).costs(30, 1),
        mv("hex", "Hex", "🌀", Utility, 0, 4).requires(4, 0).costs(60, 1).with_effect(weaken),
        mv("regenerate", "Regenerate", "🌿", Utility, 0, 5)
            .requires(6, 0)
            .costs(80, 1)
            .with_effect(regen),
    ];

    let items = vec![
        gear("rusty_sword", "Rusty Sword", "🗡️", EquipSlot::Weapon, (0, 2, 0), 10),
        gear("iron_sword", "Iron Sword", "⚔️", EquipSlot::Weapon, (0, 5, 0), 40),
        gear("leather_armor", "Leather Armor", "🥋", EquipSlot::Armor, (0, 0, 2), 15),
        gear("chainmail", "Chainmail", "🛡️", EquipSlot::Armor, (0, 0, 5), 60),
        gear("lucky_charm", "Lucky Charm", "🍀", EquipSlot::Accessory, (2, 0, 0), 25),
        ItemDef { heal: 25, ..item("health_potion", "Health Potion", "🧪", 5) },
        item("slime_gel", "Slime Gel", "🟢", 3),
        item("wolf_pelt", "Wolf Pelt", "🐺", 8),
        item("goblin_ear", "Goblin Ear", "👂", 6),
        item("bone", "Bone", "🦴", 4),
        item("ectoplasm", "Ectoplasm", "👻", 15),
        item("golem_core", "Golem Core", "🪨", 30),
    ];

    let zones = vec![
        Zone {
            id: "forest".into(),
            name: "Whispering Forest".into(),
            enemies: vec![
                enemy("slime", "Slime", (10, 14), 3, 8, (2, 5), &["slime_gel", "health_potion"]),
                enemy("wolf", "Wolf", (16, 20), 6, 14, (4, 9), &["wolf_pelt", "health_potion"]),
            ],
        },
        Zone {
            id: "caves".into(),
            name: "Damp Caves".into(),
            enemies: vec![
                enemy("goblin", "Goblin", (22, 28), 8, 22, (8, 15), &["goblin_ear", "rusty_sword"]),
                enemy(
                    "skeleton",
                    "Skeleton",
                    (26, 32),
                    10,
                    28,
                    (10, 18),
                    &["bone", "leather_armor"],
                ),
            ],
        },
        Zone {
            id: "ruins".into(),
            name: "Sunken Ruins".into(),
            enemies: vec![
                enemy(
                    "wraith",
                    "Wraith",
                    (35, 42),
                    14,
                    45,
                    (20, 35),
                    &["ectoplasm", "lucky_charm", "iron_sword"],
                ),
                enemy("golem", "Golem", (50, 60), 12, 60, (25, 40), &["golem_core", "chainmail"]),
            ],
        },
    ];

    CatalogData { moves, items, zones }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::new(builtin_data()).unwrap();
        assert!(catalog.move_def(START_MOVE).is_some());
        assert!(catalog.zone(START_ZONE).is_some());
        for zone in catalog.zones() {
            assert!(!zone.enemies.is_empty(), "{} has no enemies", zone.id);
        }
    }

    #[test]
    fn all_effects_have_a_payload() {
        let catalog = Catalog::builtin().unwrap();
        for mv in catalog.moves() {
            if let Some(e) = &mv.effect {
                let has_payload = e.damage_per_turn.is_some()
                    || e.heal_per_turn.is_some()
                    || e.attack_multiplier.is_some();
                assert!(has_payload, "{} effect does nothing", mv.id);
            }
        }
    }

    #[test]
    fn rejects_dangling_loot() {
        let mut data = builtin_data();
        data.zones[0].enemies[0].loot.push("unobtainium".into());
        let err = Catalog::new(data).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DanglingReference {
                owner: "slime".into(),
                kind: "item",
                id: "unobtainium".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_move() {
        let mut data = builtin_data();
        let dup = data.moves[0].clone();
        data.moves.push(dup);
        assert!(matches!(
            Catalog::new(data),
            Err(CatalogError::DuplicateId { kind: "move", .. })
        ));
    }

    #[test]
    fn rejects_inverted_hp_range() {
        let mut data = builtin_data();
        data.zones[0].enemies[0].hp_min = 99;
        assert!(matches!(
            Catalog::new(data),
            Err(CatalogError::InvertedRange { what: "hp", .. })
        ));
    }

    #[test]
    fn rejects_zero_duration_effect() {
        let mut data = builtin_data();
        let dart = data.moves.iter_mut().find(|m| m.id == "poison_dart").unwrap();
        dart.effect.as_mut().unwrap().duration = 0;
        assert_eq!(
            Catalog::new(data).unwrap_err(),
            CatalogError::ZeroDuration { id: "poison".into() }
        );
    }

    #[test]
    fn rejects_heal_move_with_effect() {
        let mut data = builtin_data();
        let mend = data.moves.iter_mut().find(|m| m.id == "mend").unwrap();
        mend.effect = Some(dot("poison", "Poison", 3, 2));
        assert_eq!(
            Catalog::new(data).unwrap_err(),
            CatalogError::HealWithEffect { id: "mend".into() }
        );

        let json = r#"{
            "moves": [
                { "id": "strike", "name": "Strike", "class": "physical", "base_damage": 4 },
                { "id": "salve", "name": "Salve", "class": "utility", "base_damage": -5,
                  "effect": { "id": "regen", "name": "Regen", "duration": 2, "heal_per_turn": 1 } }
            ],
            "zones": [ { "id": "forest", "name": "Forest", "enemies": [] } ]
        }"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::HealWithEffect { .. })));
    }

    #[test]
    fn builtin_content_is_unchanged_by_the_helpers() {
        let catalog = Catalog::builtin().unwrap();
        let dart = catalog.move_def("poison_dart").unwrap();
        assert_eq!(dart.cost, Cost { gold: 40, skill_points: 1 });
        assert_eq!(dart.cooldown, 3);
        assert_eq!(dart.effect.as_ref().unwrap().damage_per_turn, Some(3));
        let cleave = catalog.move_def("cleave").unwrap();
        assert_eq!(cleave.requirement, Requirement { magic: 0, strength: 8 });
        assert_eq!(catalog.item("chainmail").unwrap().bonus.vitality, 5);
    }

    #[test]
    fn rejects_missing_starter_move() {
        let mut data = builtin_data();
        data.moves.retain(|m| m.id != START_MOVE);
        assert!(matches!(
            Catalog::new(data),
            Err(CatalogError::DanglingReference { kind: "move", .. })
        ));
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "moves": [
                { "id": "strike", "name": "Strike", "class": "physical", "base_damage": 4 },
                { "id": "zap", "name": "Zap", "class": "magic", "base_damage": 7,
                  "requirement": { "magic": 3 }, "cooldown": 1,
                  "effect": { "id": "shock", "name": "Shock", "duration": 2, "damage_per_turn": 1 } }
            ],
            "items": [ { "id": "stick", "name": "Stick", "slot": "weapon", "bonus": { "strength": 1 } } ],
            "zones": [ { "id": "forest", "name": "Forest", "enemies": [
                { "id": "rat", "name": "Rat", "hp_min": 5, "hp_max": 6, "attack": 2,
                  "xp": 3, "gold_min": 1, "gold_max": 2, "loot": ["stick"] }
            ] } ]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let zap = catalog.move_def("zap").unwrap();
        assert_eq!(zap.requirement.magic, 3);
        assert_eq!(zap.requirement.strength, 0);
        assert_eq!(zap.effect.as_ref().unwrap().damage_per_turn, Some(1));
        assert_eq!(catalog.item("stick").unwrap().slot, Some(EquipSlot::Weapon));
    }

    #[test]
    fn malformed_json_is_a_catalog_error() {
        assert!(matches!(Catalog::from_json("{ nope"), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn equipped_bonus_reads_item() {
        let catalog = Catalog::builtin().unwrap();
        let mut eq = Equipment::default();
        assert_eq!(catalog.equipped_bonus(&eq, EquipSlot::Weapon).strength, 0);
        eq.weapon = Some("iron_sword".into());
        assert_eq!(catalog.equipped_bonus(&eq, EquipSlot::Weapon).strength, 5);
    }
}
