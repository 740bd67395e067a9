//! Dungeon Incremental: turn-based combat and character progression.
//!
//! [`DungeonGame`] is the action surface a UI talks to. Each action either
//! succeeds, returning the log lines it produced and persisting the
//! character, or is rejected with an [`ActionError`] and changes nothing.

pub mod catalog;
pub mod combat;
pub mod effects;
pub mod inventory;
pub mod progression;
pub mod save;
pub mod slots;
pub mod state;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::log::{GameLog, LogLine, LogSink};

use catalog::Catalog;
use combat::{Outcome, Session};
use save::{SaveStore, AUTOSAVE_INTERVAL};
use state::{CharacterState, EquipSlot, StatKind};

/// Player actions as data, for UIs that queue or serialize input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Spawn { zone: String },
    UseMove { slot: usize },
    Flee,
    BeginSwap { slot: usize },
    CancelSwap,
    AssignMove { move_id: String },
    AllocateStat { stat: StatKind },
    LearnMove { move_id: String },
    EquipItem { item_id: String },
    Unequip { slot: EquipSlot },
    UseItem { item_id: String },
    SellItem { item_id: String },
    ResetProgression,
}

pub struct DungeonGame<S: SaveStore> {
    catalog: Catalog,
    state: CharacterState,
    session: Session,
    store: S,
    log: GameLog,
    rng: ChaCha8Rng,
    autosave_ticks: u32,
    last_outcome: Option<Outcome>,
}

impl<S: SaveStore> DungeonGame<S> {
    /// Start from whatever `store` holds (or a fresh character), with an
    /// entropy-seeded RNG.
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self::with_rng(catalog, store, ChaCha8Rng::from_entropy())
    }

    /// Deterministic variant for tests and replays.
    pub fn with_seed(catalog: Catalog, store: S, seed: u64) -> Self {
        Self::with_rng(catalog, store, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, mut store: S, rng: ChaCha8Rng) -> Self {
        let state = match save::load_game(&mut store, &catalog) {
            Some(state) => {
                tracing::info!(level = state.level, gold = state.gold, "save loaded");
                state
            }
            None => CharacterState::new(),
        };
        Self {
            catalog,
            state,
            session: Session::new(),
            store,
            log: GameLog::new(),
            rng,
            autosave_ticks: 0,
            last_outcome: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn in_combat(&self) -> bool {
        self.session.in_combat()
    }

    /// How the most recent encounter ended.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    // ── Actions ──────────────────────────────────────────────

    pub fn spawn_encounter(&mut self, zone: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            combat::spawn(&mut g.state, &mut g.session, &g.catalog, zone, &mut g.rng, log)
        })
    }

    pub fn use_move(&mut self, slot: usize) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            combat::use_move(&mut g.state, &mut g.session, &g.catalog, slot, log)?;
            g.settle(log);
            Ok(())
        })
    }

    pub fn flee(&mut self) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            combat::flee(&mut g.state, &mut g.session, &g.catalog, &mut g.rng, log)?;
            g.settle(log);
            Ok(())
        })
    }

    pub fn begin_swap(&mut self, slot: usize) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            slots::begin_swap(&mut g.session, slot)?;
            log.push(LogLine::muted(format!("Choose a move for slot {}.", slot + 1)));
            Ok(())
        })
    }

    pub fn cancel_swap(&mut self) {
        slots::cancel_swap(&mut self.session);
    }

    pub fn assign_move(&mut self, move_id: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            slots::assign_move(&mut g.state, &mut g.session, &g.catalog, move_id, log).map(|_| ())
        })
    }

    pub fn allocate_stat(&mut self, stat: StatKind) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| progression::allocate_stat(&mut g.state, &g.catalog, stat, log))
    }

    pub fn learn_move(&mut self, move_id: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            if g.session.in_combat() {
                return Err(ActionError::InCombat);
            }
            progression::learn_move(&mut g.state, &g.catalog, move_id, log)
        })
    }

    pub fn equip_item(&mut self, item_id: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            inventory::equip_item(&mut g.state, &g.session, &g.catalog, item_id, log).map(|_| ())
        })
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| inventory::unequip(&mut g.state, &g.session, &g.catalog, slot, log))
    }

    pub fn use_item(&mut self, item_id: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            inventory::use_item(&mut g.state, &g.session, &g.catalog, item_id, log).map(|_| ())
        })
    }

    pub fn sell_item(&mut self, item_id: &str) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            inventory::sell_item(&mut g.state, &g.session, &g.catalog, item_id, log).map(|_| ())
        })
    }

    pub fn reset_progression(&mut self) -> Result<Vec<LogLine>, ActionError> {
        self.run(|g, log| {
            if g.session.in_combat() {
                return Err(ActionError::InCombat);
            }
            progression::reset_progression(&mut g.state, log);
            g.session = Session::new();
            g.last_outcome = None;
            Ok(())
        })
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Vec<LogLine>, ActionError> {
        match command {
            Command::Spawn { zone } => self.spawn_encounter(&zone),
            Command::UseMove { slot } => self.use_move(slot),
            Command::Flee => self.flee(),
            Command::BeginSwap { slot } => self.begin_swap(slot),
            Command::CancelSwap => {
                self.cancel_swap();
                Ok(Vec::new())
            }
            Command::AssignMove { move_id } => self.assign_move(&move_id),
            Command::AllocateStat { stat } => self.allocate_stat(stat),
            Command::LearnMove { move_id } => self.learn_move(&move_id),
            Command::EquipItem { item_id } => self.equip_item(&item_id),
            Command::Unequip { slot } => self.unequip(slot),
            Command::UseItem { item_id } => self.use_item(&item_id),
            Command::SellItem { item_id } => self.sell_item(&item_id),
            Command::ResetProgression => self.reset_progression(),
        }
    }

    /// Advance the autosave timer by `delta_ticks` (10 ticks/sec). Returns
    /// true if a save was written.
    pub fn tick(&mut self, delta_ticks: u32) -> bool {
        self.autosave_ticks = self.autosave_ticks.saturating_add(delta_ticks);
        if self.autosave_ticks < AUTOSAVE_INTERVAL {
            return false;
        }
        self.autosave_ticks = 0;
        self.persist()
    }

    /// Write the character to the store now.
    pub fn persist(&mut self) -> bool {
        match save::save_game(&mut self.store, &self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                false
            }
        }
    }

    // ── Internals ────────────────────────────────────────────

    fn run<F>(&mut self, action: F) -> Result<Vec<LogLine>, ActionError>
    where
        F: FnOnce(&mut Self, &mut Vec<LogLine>) -> Result<(), ActionError>,
    {
        let mut lines = Vec::new();
        match action(self, &mut lines) {
            Ok(()) => {
                for line in &lines {
                    self.log.push(line.clone());
                }
                self.persist();
                Ok(lines)
            }
            Err(e) => {
                self.log.push(LogLine::bad(e.to_string()));
                Err(e)
            }
        }
    }

    /// Pay out a finished encounter straight away.
    fn settle(&mut self, log: &mut Vec<LogLine>) {
        if let Some(outcome) =
            combat::resolve(&mut self.state, &mut self.session, &self.catalog, &mut self.rng, log)
        {
            self.last_outcome = Some(outcome);
        }
    }
}
