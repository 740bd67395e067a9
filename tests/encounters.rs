//! End-to-end play through the public API: fight, level, spend, reload.

use dungeon_incremental::dungeon::catalog::Catalog;
use dungeon_incremental::dungeon::combat::Outcome;
use dungeon_incremental::dungeon::save::{MemoryStore, SaveStore, STORAGE_KEY};
use dungeon_incremental::dungeon::state::{StatKind, SLOT_COUNT};
use dungeon_incremental::{ActionError, DungeonGame};

fn new_game(seed: u64) -> DungeonGame<MemoryStore> {
    DungeonGame::with_seed(Catalog::builtin().unwrap(), MemoryStore::new(), seed)
}

/// Spam slot 0 until the encounter ends.
fn fight(game: &mut DungeonGame<MemoryStore>, zone: &str) -> Outcome {
    game.spawn_encounter(zone).unwrap();
    let mut turns = 0;
    while game.in_combat() {
        game.use_move(0).unwrap();
        turns += 1;
        assert!(turns < 100, "encounter in {zone} never ended");
    }
    game.last_outcome().unwrap()
}

fn assert_invariants(game: &DungeonGame<MemoryStore>) {
    let s = game.state();
    assert!(s.hp <= s.max_hp);
    assert!(s.xp < s.xp_to_next);
    let slotted: Vec<_> = s.move_slots.iter().flatten().collect();
    for (i, id) in slotted.iter().enumerate() {
        assert!(!slotted[i + 1..].contains(id), "{id} slotted twice");
        assert!(s.owns(id));
    }
    assert!(s.cooldowns.keys().all(|&slot| slot < SLOT_COUNT));
}

#[test]
fn forest_grind_levels_the_character() {
    let mut game = new_game(2024);
    let mut victories = 0;
    for _ in 0..20 {
        if fight(&mut game, "forest") == Outcome::Victory {
            victories += 1;
        }
        assert_invariants(&game);
        assert!(!game.in_combat());
    }
    assert!(victories > 0);
    assert!(game.state().level >= 2);
    assert!(game.state().stat_points >= 3);
    assert!(game.state().gold > 0);
}

#[test]
fn level_up_points_feed_back_into_combat() {
    let mut game = new_game(99);
    while game.state().level < 2 {
        fight(&mut game, "forest");
    }
    let before = game.state().stats.strength;
    let points = game.state().stat_points;
    for _ in 0..points {
        game.allocate_stat(StatKind::Strength).unwrap();
    }
    assert_eq!(game.state().stats.strength, before + points);
    assert_eq!(game.allocate_stat(StatKind::Strength), Err(ActionError::NoStatPoints));
}

#[test]
fn learned_moves_can_be_slotted_and_used() {
    let mut game = new_game(5);
    while game.state().gold < 50 || game.state().skill_points < 1 {
        fight(&mut game, "forest");
    }
    game.learn_move("fireball").unwrap();
    assert_eq!(game.assign_move("fireball").map(|_| ()), Ok(()));
    assert_eq!(game.state().slot_of("fireball"), Some(1));

    game.spawn_encounter("forest").unwrap();
    game.use_move(1).unwrap();
    if game.in_combat() {
        // Fireball has a cooldown of 2, so it can't go off twice in a row.
        assert!(matches!(game.use_move(1), Err(ActionError::OnCooldown { .. })));
    }
}

#[test]
fn progress_survives_a_reload() {
    let mut game = new_game(11);
    for _ in 0..5 {
        fight(&mut game, "forest");
    }
    let store = game.store().clone();
    assert!(store.read(STORAGE_KEY).is_some());

    let reloaded = DungeonGame::with_seed(Catalog::builtin().unwrap(), store, 12);
    assert_eq!(reloaded.state(), game.state());
}

#[test]
fn corrupted_save_starts_fresh() {
    let mut store = MemoryStore::new();
    store.write(STORAGE_KEY, "{\"level\": \"three\"").unwrap();
    let game = DungeonGame::with_seed(Catalog::builtin().unwrap(), store, 1);
    assert_eq!(game.state().level, 1);
    assert!(game.store().read(STORAGE_KEY).is_none());
}
