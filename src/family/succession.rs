use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::tree::FamilyTree;
use crate::id::PersonId;
use crate::model::{Gender, HistoryKind, Person, SuccessionRule};

// --- Elective council scoring ---
const MIN_LEADERSHIP_AGE: i32 = 16;
const POSITIVE_TRAIT_SCORE: i32 = 5;
const NEGATIVE_TRAIT_SCORE: i32 = -3;

/// Alive, noble and a real member of the family.
fn is_eligible(person: &Person, year: i32) -> bool {
    person.is_alive(year) && person.is_noble && !person.is_placeholder_ancestor
}

/// Children of `id` in claim order for the given rule.
fn ordered_children(tree: &FamilyTree, id: PersonId, rule: SuccessionRule) -> Vec<&Person> {
    let Some(parent) = tree.person(id) else {
        return Vec::new();
    };
    let mut children: Vec<&Person> = parent
        .children
        .iter()
        .filter_map(|c| tree.person(*c))
        .collect();
    match rule {
        SuccessionRule::PrimogenitureMalePreference => {
            children.sort_by_key(|c| (c.gender != Gender::Male, c.birth_year, c.id));
        }
        _ => children.sort_by_key(|c| (c.birth_year, c.id)),
    }
    children
}

/// Depth-first search of the lines descending from `root`. A dead noble child
/// passes the claim to their own line before the next sibling is tried.
fn search_line(
    tree: &FamilyTree,
    root: PersonId,
    rule: SuccessionRule,
    year: i32,
    visited: &mut BTreeSet<PersonId>,
) -> Option<PersonId> {
    for child in ordered_children(tree, root, rule) {
        if !visited.insert(child.id) {
            continue;
        }
        if is_eligible(child, year) {
            return Some(child.id);
        }
        if !child.is_alive(year)
            && child.is_noble
            && let Some(heir) = search_line(tree, child.id, rule, year, visited)
        {
            return Some(heir);
        }
    }
    None
}

fn parents_in_order(tree: &FamilyTree, id: PersonId) -> Vec<PersonId> {
    tree.person(id)
        .map(|p| [p.father, p.mother].into_iter().flatten().collect())
        .unwrap_or_default()
}

fn primogeniture(
    tree: &FamilyTree,
    deceased: PersonId,
    rule: SuccessionRule,
    year: i32,
) -> Option<PersonId> {
    let mut visited = BTreeSet::from([deceased]);
    if let Some(heir) = search_line(tree, deceased, rule, year, &mut visited) {
        return Some(heir);
    }

    // Collateral lines, one generation of ancestors at a time.
    let mut generation = parents_in_order(tree, deceased);
    while !generation.is_empty() {
        let mut next = Vec::new();
        for ancestor in generation {
            if !visited.insert(ancestor) {
                continue;
            }
            if let Some(heir) = search_line(tree, ancestor, rule, year, &mut visited) {
                return Some(heir);
            }
            next.extend(parents_in_order(tree, ancestor));
        }
        generation = next;
    }
    None
}

fn age_score(age: i32) -> i32 {
    match age {
        30..=55 => 6,
        25..=29 => 3,
        56..=65 => 2,
        a if a > 65 => -4,
        _ => 0,
    }
}

/// Council score for one candidate. The weights are a rough heuristic.
pub fn council_score(tree: &FamilyTree, person: &Person, year: i32) -> i32 {
    let theme = tree.theme();
    let traits: i32 = person
        .traits
        .iter()
        .map(|t| {
            if theme.is_positive_trait(t) {
                POSITIVE_TRAIT_SCORE
            } else if theme.is_negative_trait(t) {
                NEGATIVE_TRAIT_SCORE
            } else {
                0
            }
        })
        .sum();
    traits + age_score(person.age(year))
}

fn elective(tree: &FamilyTree, deceased: PersonId, year: i32) -> Option<PersonId> {
    tree.persons()
        .filter(|p| p.id != deceased && is_eligible(p, year) && p.age(year) >= MIN_LEADERSHIP_AGE)
        .min_by_key(|p| (Reverse(council_score(tree, p, year)), p.birth_year, p.id))
        .map(|p| p.id)
}

/// Resolve who should follow `deceased` on the throne under `rule`.
///
/// Pure: reads the tree only, and with the same tree, rule and year always
/// returns the same answer.
pub fn find_next_monarch(
    tree: &FamilyTree,
    deceased: PersonId,
    rule: SuccessionRule,
    year: i32,
) -> Option<PersonId> {
    match rule {
        SuccessionRule::PrimogenitureMalePreference | SuccessionRule::PrimogenitureAbsolute => {
            primogeniture(tree, deceased, rule, year)
        }
        SuccessionRule::ElectiveNobleCouncil => elective(tree, deceased, year),
    }
}

impl FamilyTree {
    /// Make `id` the reigning monarch. Anyone else still flagged as monarch
    /// loses the flag first.
    pub fn crown(&mut self, id: PersonId, year: i32) -> bool {
        if self.current_monarch == Some(id) {
            return true;
        }
        let Some(gender) = self
            .members
            .get(&id)
            .filter(|p| p.is_alive(year))
            .map(|p| p.gender)
        else {
            tracing::warn!(%id, year, "cannot crown a missing or dead person");
            return false;
        };

        for stale in self.members.values_mut().filter(|p| p.is_monarch && p.id != id) {
            stale.is_monarch = false;
            stale.reign_end_year = stale.reign_end_year.or(Some(year));
        }

        let title = self.theme.leader_title(gender).to_string();
        if let Some(person) = self.members.get_mut(&id) {
            person.add_title(&title, &self.theme, &mut self.history, year);
            if !person.is_monarch {
                person.is_monarch = true;
                person.reign_start_year = Some(year);
                person.reign_end_year = None;
            }
        }
        self.current_monarch = Some(id);
        self.monarch_history.push(id);
        self.vacant_since = None;
        if self.heir_apparent == Some(id) {
            self.heir_apparent = None;
        }

        let name = self.display_name(id);
        let text = self.narrate(&HistoryKind::SuccessionEnd, &name, None, year, Some(&title));
        self.history
            .record(Some(year), HistoryKind::SuccessionEnd, text, Some(id), None);
        tracing::info!(monarch = %id, year, %title, "crowned");
        true
    }

    /// Resolve and crown the successor of `deceased`. On failure the throne
    /// stays vacant until something else fills it.
    pub fn process_succession(&mut self, deceased: PersonId, year: i32) -> Option<PersonId> {
        self.end_reign_of_dead(deceased);
        let name = self.display_name(deceased);
        let text = self.narrate(&HistoryKind::SuccessionStart, &name, None, year, None);
        self.history.record(
            Some(year),
            HistoryKind::SuccessionStart,
            text,
            Some(deceased),
            None,
        );

        if let Some(heir) = find_next_monarch(self, deceased, self.succession_rule, year)
            && self.crown(heir, year)
        {
            return Some(heir);
        }

        if self.current_monarch == Some(deceased) {
            self.current_monarch = None;
        }
        self.vacant_since = self.vacant_since.or(Some(year));
        let text = self.narrate(&HistoryKind::SuccessionCrisis, &name, None, year, None);
        self.history.record(
            Some(year),
            HistoryKind::SuccessionCrisis,
            text,
            Some(deceased),
            None,
        );
        tracing::info!(%deceased, year, rule = %self.succession_rule, "succession crisis");
        None
    }

    /// Catch a monarch whose death was recorded without [`kill`](Self::kill):
    /// vacate the throne and run succession. Returns the reigning monarch
    /// afterwards.
    pub fn ensure_living_monarch(&mut self, year: i32) -> Option<PersonId> {
        let monarch = self.current_monarch?;
        let alive = self.members.get(&monarch).is_some_and(|p| p.is_alive(year));
        if alive {
            return Some(monarch);
        }
        tracing::warn!(%monarch, year, "reigning monarch found dead");
        self.process_succession(monarch, year)
    }

    /// Close the reign of a dead person still flagged as monarch. The reign
    /// ends in the death year and the widowed spouse is freed.
    fn end_reign_of_dead(&mut self, id: PersonId) {
        let Some(death) = self.members.get(&id).and_then(|p| p.death_year) else {
            return;
        };
        if let Some(person) = self.members.get_mut(&id)
            && person.is_monarch
        {
            person.is_monarch = false;
            person.reign_end_year = Some(death);
        }
        if self.current_monarch == Some(id) {
            self.current_monarch = None;
            self.vacant_since = self.vacant_since.or(Some(death));
        }
        if self.heir_apparent == Some(id) {
            self.heir_apparent = None;
            self.revoke_heir_titles(id, death);
        }
        self.clear_spouse(id);
    }

    /// Strip every heir-apparent title from `id`.
    pub(crate) fn revoke_heir_titles(&mut self, id: PersonId, year: i32) {
        let Some(person) = self.members.get_mut(&id) else {
            return;
        };
        let held: Vec<String> = person
            .titles
            .iter()
            .filter(|t| self.theme.is_heir_title(t))
            .cloned()
            .collect();
        for title in held {
            person.remove_title(&title, &self.theme, year);
            self.history.record(
                Some(year),
                HistoryKind::TitleRevoked,
                format!("{} {} is no longer {title}", person.name, person.surname),
                Some(id),
                None,
            );
        }
    }

    /// Recompute the heir apparent and move the heir title to them.
    pub fn designate_heir(&mut self, year: i32) -> Option<PersonId> {
        let monarch = self.current_monarch?;
        let heir = find_next_monarch(self, monarch, self.succession_rule, year);
        if heir == self.heir_apparent {
            return heir;
        }

        if let Some(old) = self.heir_apparent.take() {
            self.revoke_heir_titles(old, year);
        }

        let new_heir = heir?;
        let gender = self.members.get(&new_heir)?.gender;
        let title = self.theme.heir_title(gender).map(str::to_string);
        if let Some(title) = &title
            && let Some(person) = self.members.get_mut(&new_heir)
        {
            person.add_title(title, &self.theme, &mut self.history, year);
        }
        self.heir_apparent = Some(new_heir);

        let name = self.display_name(new_heir);
        let text = self.narrate(
            &HistoryKind::HeirDesignated,
            &name,
            None,
            year,
            title.as_deref(),
        );
        self.history.record(
            Some(year),
            HistoryKind::HeirDesignated,
            text,
            Some(new_heir),
            Some(monarch),
        );
        Some(new_heir)
    }
}
