use rand::Rng;
use rand::RngCore;
use rand::seq::SliceRandom;

use crate::family::FamilyTree;
use crate::model::{Theme, WorldEventDef};

/// Theme events whose year range covers `year`.
pub fn eligible_events(theme: &Theme, year: i32) -> Vec<&WorldEventDef> {
    theme
        .world_events
        .iter()
        .filter(|e| e.active_in(year))
        .collect()
}

/// Roll this year's world event. Eligible events are tried in random order and
/// the first one that triggers is applied; at most one fires per year.
pub fn roll_world_event(tree: &mut FamilyTree, year: i32, rng: &mut dyn RngCore) -> Option<String> {
    let mut candidates: Vec<WorldEventDef> = eligible_events(tree.theme(), year)
        .into_iter()
        .cloned()
        .collect();
    candidates.shuffle(rng);

    for event in candidates {
        let chance = event.chance_per_year.clamp(0.0, 1.0);
        if chance > 0.0 && rng.random_bool(chance) {
            return Some(tree.apply_world_event(&event, year));
        }
    }
    None
}
