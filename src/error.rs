//! Error types.
//!
//! [`ActionError`] covers every recoverable rejection of a player action; its
//! `Display` text is what the player sees in the log. [`CatalogError`] is a
//! configuration error raised once when static data is loaded.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{name} is on cooldown ({turns} turns left)")]
    OnCooldown { name: String, turns: u32 },

    #[error("Slot {} is empty", .slot + 1)]
    EmptySlot { slot: usize },

    #[error("There is no slot {}", .slot + 1)]
    InvalidSlot { slot: usize },

    #[error("Unknown move '{id}'")]
    UnknownMove { id: String },

    #[error("Unknown item '{id}'")]
    UnknownItem { id: String },

    #[error("Unknown zone '{id}'")]
    UnknownZone { id: String },

    #[error("No enemies roam {zone}")]
    EmptyZone { zone: String },

    #[error("{name} requires {magic} magic and {strength} strength")]
    RequirementUnmet { name: String, magic: u32, strength: u32 },

    #[error("You don't know {name}")]
    NotOwned { name: String },

    #[error("You already know {name}")]
    AlreadyOwned { name: String },

    #[error("{name} is already assigned to slot {}", .slot + 1)]
    DuplicateAssignment { name: String, slot: usize },

    #[error("Not enough gold ({have}/{need})")]
    NotEnoughGold { have: u64, need: u64 },

    #[error("Not enough skill points ({have}/{need})")]
    NotEnoughSkillPoints { have: u32, need: u32 },

    #[error("No stat points to allocate")]
    NoStatPoints,

    #[error("Can't do that while in combat")]
    InCombat,

    #[error("You are not in combat")]
    NotInCombat,

    #[error("You don't have any {name}")]
    NotInInventory { name: String },

    #[error("{name} can't be equipped")]
    NotEquippable { name: String },

    #[error("{name} can't be used")]
    NotUsable { name: String },

    #[error("Nothing equipped in that slot")]
    NothingEquipped,

    #[error("HP is already full")]
    FullHp,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{owner} references unknown {kind} '{id}'")]
    DanglingReference { owner: String, kind: &'static str, id: String },

    #[error("{owner} has an inverted {what} range ({min} > {max})")]
    InvertedRange { owner: String, what: &'static str, min: u64, max: u64 },

    #[error("effect '{id}' has a zero duration")]
    ZeroDuration { id: String },

    #[error("heal move '{id}' can't carry an effect")]
    HealWithEffect { id: String },

    #[error("enemy '{id}' has a zero hp range")]
    ZeroHp { id: String },

    #[error("catalog JSON is malformed: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("failed to serialize save: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("storage write failed: {0}")]
    Write(String),
}
