use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::graph::shortest_path_lengths;
use super::tree::FamilyTree;
use crate::id::PersonId;
use crate::model::HistoryKind;

/// Why a person was removed from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "distance", rename_all = "snake_case")]
pub enum PruneReason {
    /// Reachable from the monarch, but further than the allowed distance.
    TooDistant(u32),
    /// No path to the monarch through the blood-relative subgraph.
    Peripheral,
    /// Nobody reigned when the pass ran.
    NoMonarch,
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::TooDistant(d) => write!(f, "{d} steps from the throne"),
            PruneReason::Peripheral => f.write_str("no tie of blood to the throne"),
            PruneReason::NoMonarch => f.write_str("no monarch reigned"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    pub removed: Vec<(PersonId, PruneReason)>,
    pub protected: usize,
}

impl PruneReport {
    pub fn count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Persons that pruning must never remove.
pub fn important_persons(tree: &FamilyTree) -> BTreeSet<PersonId> {
    let theme = tree.theme();
    let mut important: BTreeSet<PersonId> = tree
        .persons()
        .filter(|p| {
            p.is_placeholder_ancestor || p.titles.iter().any(|t| theme.is_top_tier_title(t))
        })
        .map(|p| p.id)
        .collect();

    if let Some(monarch) = tree.current_monarch().and_then(|m| tree.person(m)) {
        important.insert(monarch.id);
        important.extend(monarch.father);
        important.extend(monarch.mother);
        important.extend(monarch.spouse);
        important.extend(monarch.children.iter().copied());
    }
    important
}

/// Remove everyone who is neither important nor within `max_distance` steps
/// of the monarch in the blood-relative subgraph.
pub fn prune_distant_relatives(tree: &mut FamilyTree, max_distance: u32, year: i32) -> PruneReport {
    tree.ensure_living_monarch(year);
    let important = important_persons(tree);
    let distances = tree
        .current_monarch()
        .map(|m| shortest_path_lengths(&tree.graph().blood_subgraph(m), m));

    let mut report = PruneReport {
        protected: important.len(),
        ..PruneReport::default()
    };
    for person in tree.persons() {
        if important.contains(&person.id) {
            continue;
        }
        let reason = match &distances {
            None => PruneReason::NoMonarch,
            Some(distances) => match distances.get(&person.id) {
                Some(&d) if d > max_distance => PruneReason::TooDistant(d),
                Some(_) => continue,
                None => PruneReason::Peripheral,
            },
        };
        report.removed.push((person.id, reason));
    }

    for &(id, reason) in &report.removed {
        let name = tree.display_name(id);
        if tree.remove_person(id).is_none() {
            continue;
        }
        let detail = reason.to_string();
        let text = tree.narrate(&HistoryKind::Pruned, &name, None, year, Some(&detail));
        tree.history_mut()
            .record(Some(year), HistoryKind::Pruned, text, Some(id), None);
    }

    tracing::info!(
        year,
        removed = report.count(),
        protected = report.protected,
        remaining = tree.population(),
        "pruning pass"
    );
    report
}
