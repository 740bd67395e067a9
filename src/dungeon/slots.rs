//! Move bar management: the four combat slots and the swap workflow.
//!
//! A move id never sits in two slots at once. Every path that writes
//! `move_slots` goes through [`assign_move`], which checks that before it
//! touches anything.

use super::catalog::Catalog;
use super::combat::Session;
use super::state::{CharacterState, SLOT_COUNT};
use crate::error::ActionError;
use crate::log::LogLine;

/// Pick `slot` as the destination of the next [`assign_move`].
pub fn begin_swap(session: &mut Session, slot: usize) -> Result<(), ActionError> {
    if session.in_combat() {
        return Err(ActionError::InCombat);
    }
    if slot >= SLOT_COUNT {
        return Err(ActionError::InvalidSlot { slot });
    }
    session.pending_swap = Some(slot);
    Ok(())
}

pub fn cancel_swap(session: &mut Session) {
    session.pending_swap = None;
}

/// Put `move_id` on the bar. Returns the slot it ended up in.
///
/// With a pending swap the move goes to that slot; otherwise to the first
/// empty slot, or over slot 0 when the bar is full. A slot that receives a
/// new move starts with no cooldown.
pub fn assign_move(
    state: &mut CharacterState,
    session: &mut Session,
    catalog: &Catalog,
    move_id: &str,
    log: &mut Vec<LogLine>,
) -> Result<usize, ActionError> {
    if session.in_combat() {
        return Err(ActionError::InCombat);
    }
    let mv = catalog
        .move_def(move_id)
        .ok_or_else(|| ActionError::UnknownMove { id: move_id.to_string() })?;
    if !state.owns(move_id) {
        return Err(ActionError::NotOwned { name: mv.name.clone() });
    }
    let current = state.slot_of(move_id);

    let target = match session.pending_swap {
        Some(target) => match current {
            Some(slot) if slot == target => {
                session.pending_swap = None;
                log.push(LogLine::muted(format!("{} stays in slot {}.", mv.name, slot + 1)));
                return Ok(slot);
            }
            Some(slot) => {
                return Err(ActionError::DuplicateAssignment { name: mv.name.clone(), slot })
            }
            None => target,
        },
        None => {
            if let Some(slot) = current {
                return Err(ActionError::DuplicateAssignment { name: mv.name.clone(), slot });
            }
            state.move_slots.iter().position(Option::is_none).unwrap_or(0)
        }
    };

    let replaced = state.move_slots[target].replace(mv.id.clone());
    state.cooldowns.remove(&target);
    session.pending_swap = None;

    let replaced_name = replaced.as_deref().and_then(|id| catalog.move_def(id)).map(|m| &m.name);
    let text = match replaced_name {
        Some(old) => format!("{} {} replaces {} in slot {}.", mv.icon, mv.name, old, target + 1),
        None => format!("{} {} assigned to slot {}.", mv.icon, mv.name, target + 1),
    };
    log.push(LogLine::good(text));
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::combat::Phase;
    use crate::dungeon::testing::fixture_catalog;

    fn learned(ids: &[&str]) -> CharacterState {
        let mut s = CharacterState::new();
        for id in ids {
            s.moves_owned.insert(id.to_string());
        }
        s
    }

    #[test]
    fn fills_first_empty_slot() {
        let catalog = fixture_catalog();
        let mut s = learned(&["fireball", "mend"]);
        let mut session = Session::new();
        let mut log = Vec::new();
        assert_eq!(assign_move(&mut s, &mut session, &catalog, "fireball", &mut log), Ok(1));
        assert_eq!(assign_move(&mut s, &mut session, &catalog, "mend", &mut log), Ok(2));
        assert_eq!(s.move_slots[2].as_deref(), Some("mend"));
    }

    #[test]
    fn full_bar_overwrites_slot_zero_and_clears_cooldown() {
        let catalog = fixture_catalog();
        let mut s = learned(&["fireball", "mend", "hex", "cleave"]);
        s.move_slots = [
            Some("strike".into()),
            Some("fireball".into()),
            Some("mend".into()),
            Some("hex".into()),
        ];
        s.cooldowns.insert(0, 3);
        let mut session = Session::new();
        let mut log = Vec::new();
        assert_eq!(assign_move(&mut s, &mut session, &catalog, "cleave", &mut log), Ok(0));
        assert_eq!(s.move_slots[0].as_deref(), Some("cleave"));
        assert_eq!(s.cooldown(0), 0);
        assert!(!s.move_slots.iter().any(|m| m.as_deref() == Some("strike")));
        // Strike is still known, just not slotted.
        assert!(s.owns("strike"));
    }

    #[test]
    fn swap_targets_pending_slot() {
        let catalog = fixture_catalog();
        let mut s = learned(&["fireball"]);
        s.cooldowns.insert(0, 2);
        let mut session = Session::new();
        let mut log = Vec::new();
        begin_swap(&mut session, 0).unwrap();
        assert_eq!(assign_move(&mut s, &mut session, &catalog, "fireball", &mut log), Ok(0));
        assert_eq!(s.move_slots[0].as_deref(), Some("fireball"));
        assert_eq!(s.cooldown(0), 0);
        assert_eq!(session.pending_swap, None);
    }

    #[test]
    fn same_slot_reassignment_is_a_noop() {
        let catalog = fixture_catalog();
        let mut s = CharacterState::new();
        s.cooldowns.insert(0, 2);
        let mut session = Session::new();
        let mut log = Vec::new();
        begin_swap(&mut session, 0).unwrap();
        assert_eq!(assign_move(&mut s, &mut session, &catalog, "strike", &mut log), Ok(0));
        assert_eq!(s.cooldown(0), 2);
        assert_eq!(session.pending_swap, None);
    }

    #[test]
    fn moving_a_slotted_move_elsewhere_is_rejected() {
        let catalog = fixture_catalog();
        let mut s = CharacterState::new();
        let mut session = Session::new();
        let mut log = Vec::new();
        begin_swap(&mut session, 2).unwrap();
        let before = s.clone();
        assert_eq!(
            assign_move(&mut s, &mut session, &catalog, "strike", &mut log),
            Err(ActionError::DuplicateAssignment { name: "Strike".into(), slot: 0 })
        );
        assert_eq!(s, before);
        assert_eq!(session.pending_swap, Some(2));

        cancel_swap(&mut session);
        assert_eq!(
            assign_move(&mut s, &mut session, &catalog, "strike", &mut log),
            Err(ActionError::DuplicateAssignment { name: "Strike".into(), slot: 0 })
        );
    }

    #[test]
    fn unknown_and_unowned_moves_are_rejected() {
        let catalog = fixture_catalog();
        let mut s = CharacterState::new();
        let mut session = Session::new();
        let mut log = Vec::new();
        assert!(matches!(
            assign_move(&mut s, &mut session, &catalog, "meteor", &mut log),
            Err(ActionError::UnknownMove { .. })
        ));
        assert_eq!(
            assign_move(&mut s, &mut session, &catalog, "fireball", &mut log),
            Err(ActionError::NotOwned { name: "Fireball".into() })
        );
    }

    #[test]
    fn swap_workflow_is_locked_in_combat() {
        let catalog = fixture_catalog();
        let mut s = learned(&["fireball"]);
        let mut session = Session::new();
        session.phase = Phase::InCombat;
        let mut log = Vec::new();
        assert_eq!(begin_swap(&mut session, 1), Err(ActionError::InCombat));
        assert_eq!(
            assign_move(&mut s, &mut session, &catalog, "fireball", &mut log),
            Err(ActionError::InCombat)
        );
        assert_eq!(s.slot_of("fireball"), None);
    }

    #[test]
    fn begin_swap_rejects_bad_slot() {
        let mut session = Session::new();
        assert_eq!(begin_swap(&mut session, 4), Err(ActionError::InvalidSlot { slot: 4 }));
        assert_eq!(session.pending_swap, None);
    }
}
