//! Status effects: damage-over-time, regen and attack debuffs.
//!
//! Effects are owned by whatever they are attached to and kept in insertion
//! order. The remaining-turns counter is the only thing that decides how many
//! more ticks an effect gets, so calling [`apply_ticks`] twice in the same turn
//! consumes two ticks, never more than the effect's duration in total.

use super::state::{DamageClass, EffectTemplate};

#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub id: String,
    pub name: String,
    pub remaining: u32,
    pub damage_per_turn: Option<u32>,
    pub heal_per_turn: Option<u32>,
    pub attack_multiplier: Option<f64>,
    /// Damage class of the move that applied it; magic DoTs scale with the
    /// applier's magic.
    pub source: DamageClass,
}

impl StatusEffect {
    pub fn from_template(template: &EffectTemplate, source: DamageClass) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            remaining: template.duration,
            damage_per_turn: template.damage_per_turn,
            heal_per_turn: template.heal_per_turn,
            attack_multiplier: template.attack_multiplier,
            source,
        }
    }

    /// Damage one tick deals, including the magic bonus.
    pub fn tick_damage(&self, applier_magic: u32) -> u32 {
        match self.damage_per_turn {
            Some(dot) if dot > 0 => {
                let bonus = if self.source == DamageClass::Magic { applier_magic / 2 } else { 0 };
                dot.saturating_add(bonus)
            }
            _ => 0,
        }
    }

    pub fn tick_heal(&self) -> u32 {
        self.heal_per_turn.unwrap_or(0)
    }
}

/// Anything that can carry status effects.
pub trait Afflicted {
    fn hp(&self) -> u32;
    fn max_hp(&self) -> u32;
    fn set_hp(&mut self, hp: u32);
    fn effects_mut(&mut self) -> &mut Vec<StatusEffect>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickEvent {
    Damaged { effect: String, amount: u32 },
    Healed { effect: String, amount: u32 },
    Expired { effect: String },
}

/// Apply one tick of `effect` to `hp`. Returns whether it had anything to tick.
fn tick_once(
    effect: &StatusEffect,
    hp: &mut u32,
    max_hp: u32,
    applier_magic: u32,
    events: &mut Vec<TickEvent>,
) -> bool {
    if effect.remaining == 0 {
        return false;
    }
    let mut ticked = false;

    let damage = effect.tick_damage(applier_magic);
    if damage > 0 {
        *hp = hp.saturating_sub(damage);
        events.push(TickEvent::Damaged { effect: effect.name.clone(), amount: damage });
        ticked = true;
    }

    let heal = effect.tick_heal();
    if heal > 0 {
        let before = *hp;
        *hp = hp.saturating_add(heal).min(max_hp);
        events.push(TickEvent::Healed { effect: effect.name.clone(), amount: *hp - before });
        ticked = true;
    }

    ticked
}

/// End-of-turn processing: tick every effect once, then drop expired ones.
pub fn apply_ticks<T: Afflicted + ?Sized>(target: &mut T, applier_magic: u32) -> Vec<TickEvent> {
    let mut events = Vec::new();
    let mut effects = std::mem::take(target.effects_mut());
    let mut hp = target.hp();
    let max_hp = target.max_hp();

    for effect in effects.iter_mut() {
        if effect.remaining == 0 {
            continue;
        }
        tick_once(effect, &mut hp, max_hp, applier_magic, &mut events);
        // Modifier-only effects tick nothing but still run out.
        effect.remaining -= 1;
    }

    effects.retain(|e| {
        if e.remaining == 0 {
            events.push(TickEvent::Expired { effect: e.name.clone() });
            false
        } else {
            true
        }
    });

    target.set_hp(hp);
    *target.effects_mut() = effects;
    events
}

/// Attach a fresh instance of `template`, ticking it once immediately.
///
/// The immediate tick consumes one turn of the duration, so a duration-3 DoT
/// hits three times in total. An effect already present with the same id is
/// replaced in place.
pub fn attach<T: Afflicted + ?Sized>(
    target: &mut T,
    template: &EffectTemplate,
    source: DamageClass,
    applier_magic: u32,
) -> Vec<TickEvent> {
    let mut events = Vec::new();
    let mut effect = StatusEffect::from_template(template, source);

    let mut hp = target.hp();
    if tick_once(&effect, &mut hp, target.max_hp(), applier_magic, &mut events) {
        effect.remaining -= 1;
    }
    target.set_hp(hp);

    let effects = target.effects_mut();
    let existing = effects.iter().position(|e| e.id == effect.id);
    if effect.remaining == 0 {
        if let Some(idx) = existing {
            effects.remove(idx);
        }
        events.push(TickEvent::Expired { effect: effect.name });
        return events;
    }
    match existing {
        Some(idx) => effects[idx] = effect,
        None => effects.push(effect),
    }
    events
}

/// Attack after every active multiplier, applied in insertion order with
/// flooring after each step.
pub fn modified_attack(base: u32, effects: &[StatusEffect]) -> u32 {
    effects
        .iter()
        .filter_map(|e| e.attack_multiplier)
        .fold(base, |atk, m| (atk as f64 * m).floor().max(0.0) as u32)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    struct Target {
        hp: u32,
        effects: Vec<StatusEffect>,
    }

    impl Afflicted for Target {
        fn hp(&self) -> u32 {
            self.hp
        }
        fn max_hp(&self) -> u32 {
            u32::MAX
        }
        fn set_hp(&mut self, hp: u32) {
            self.hp = hp;
        }
        fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
            &mut self.effects
        }
    }

    fn arb_source() -> impl Strategy<Value = DamageClass> {
        prop_oneof![
            Just(DamageClass::Physical),
            Just(DamageClass::Magic),
            Just(DamageClass::Utility),
        ]
    }

    proptest! {
        #[test]
        fn prop_dot_lifetime_total_is_tick_times_duration(
            dot in 1u32..20,
            duration in 1u32..8,
            magic in 0u32..50,
            source in arb_source(),
            extra_calls in 0usize..5,
        ) {
            let start = 1_000_000;
            let mut t = Target { hp: start, effects: Vec::new() };
            let template = EffectTemplate {
                id: "dot".into(),
                name: "Dot".into(),
                duration,
                damage_per_turn: Some(dot),
                heal_per_turn: None,
                attack_multiplier: None,
            };
            attach(&mut t, &template, source, magic);
            for _ in 0..(duration as usize + extra_calls) {
                apply_ticks(&mut t, magic);
            }
            let per_tick = if source == DamageClass::Magic { dot + magic / 2 } else { dot };
            prop_assert_eq!(start - t.hp, per_tick * duration);
            prop_assert!(t.effects.is_empty());
        }

        #[test]
        fn prop_multipliers_never_increase_attack(
            base in 0u32..500,
            mults in proptest::collection::vec(0.0f64..1.0, 0..4),
        ) {
            let effects: Vec<StatusEffect> = mults
                .iter()
                .enumerate()
                .map(|(i, m)| StatusEffect {
                    id: format!("m{}", i),
                    name: format!("m{}", i),
                    remaining: 2,
                    damage_per_turn: None,
                    heal_per_turn: None,
                    attack_multiplier: Some(*m),
                    source: DamageClass::Utility,
                })
                .collect();
            prop_assert!(modified_attack(base, &effects) <= base);
        }
    }
}
