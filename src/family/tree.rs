use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand::RngCore;

use super::graph::KinshipGraph;
use super::marriage;
use super::names;
use super::narrative::{NarrativeContext, Narrator, TemplateNarrator, render_template};
use crate::id::{IdGenerator, PersonId};
use crate::model::{
    Gender, HistoryKind, HistoryLog, Person, SuccessionRule, Theme, WorldEventDef,
};

// --- Mortality ---
const ELDER_AGE: i32 = 60;
const ELDER_MORTALITY: f64 = 0.03;
const AGED_AGE: i32 = 75;
const AGED_MORTALITY: f64 = 0.07;

// --- Marriage ---
const MARRIAGE_CHANCE: f64 = 0.35;
const FAVOURED_MARRIAGE_CHANCE: f64 = 0.75;

/// Everything needed to register a new person with [`FamilyTree::add_person`].
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
    pub gender: Gender,
    pub birth_year: i32,
    pub death_year: Option<i32>,
    pub is_noble: bool,
    pub traits: Vec<String>,
    pub titles: Vec<String>,
    pub father: Option<PersonId>,
    pub mother: Option<PersonId>,
    pub is_placeholder_ancestor: bool,
}

impl NewPerson {
    /// A living noble with no parents on record.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        gender: Gender,
        birth_year: i32,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            gender,
            birth_year,
            death_year: None,
            is_noble: true,
            traits: Vec::new(),
            titles: Vec::new(),
            father: None,
            mother: None,
            is_placeholder_ancestor: false,
        }
    }

    pub fn noble(mut self, is_noble: bool) -> Self {
        self.is_noble = is_noble;
        self
    }

    pub fn died(mut self, year: i32) -> Self {
        self.death_year = Some(year);
        self
    }

    pub fn traits(mut self, traits: Vec<String>) -> Self {
        self.traits = traits;
        self
    }

    pub fn titles(mut self, titles: Vec<String>) -> Self {
        self.titles = titles;
        self
    }

    pub fn child_of(mut self, father: Option<PersonId>, mother: Option<PersonId>) -> Self {
        self.father = father;
        self.mother = mother;
        self
    }

    pub fn placeholder(mut self) -> Self {
        self.is_placeholder_ancestor = true;
        self
    }
}

/// A timed mortality multiplier left behind by a world event.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub source: String,
    pub mortality_factor: f64,
    /// Last year in which the effect applies.
    pub expires_after: i32,
}

impl ActiveEffect {
    pub fn applies_in(&self, year: i32) -> bool {
        year <= self.expires_after
    }
}

/// Owner of every person in a dynasty and of the relationships between them.
///
/// Persons are only created through [`add_person`](Self::add_person) and only
/// destroyed by pruning; all links are ids resolved through this tree.
pub struct FamilyTree {
    pub(crate) dynasty_name: String,
    pub(crate) theme: Theme,
    pub(crate) members: BTreeMap<PersonId, Person>,
    pub(crate) graph: KinshipGraph,
    pub(crate) current_monarch: Option<PersonId>,
    pub(crate) monarch_history: Vec<PersonId>,
    pub(crate) heir_apparent: Option<PersonId>,
    pub(crate) succession_rule: SuccessionRule,
    pub(crate) current_year: i32,
    pub(crate) vacant_since: Option<i32>,
    pub(crate) wealth: i64,
    pub(crate) active_effects: Vec<ActiveEffect>,
    /// House name → year the first marriage alliance with it was made.
    pub(crate) alliances: BTreeMap<String, i32>,
    pub(crate) history: HistoryLog,
    id_gen: IdGenerator,
    narrator: Box<dyn Narrator>,
}

impl fmt::Debug for FamilyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyTree")
            .field("dynasty_name", &self.dynasty_name)
            .field("members", &self.members.len())
            .field("current_monarch", &self.current_monarch)
            .field("succession_rule", &self.succession_rule)
            .field("current_year", &self.current_year)
            .field("wealth", &self.wealth)
            .finish_non_exhaustive()
    }
}

impl FamilyTree {
    pub fn new(dynasty_name: impl Into<String>, theme: Theme, start_year: i32) -> Self {
        let succession_rule = theme.succession_rule;
        Self {
            dynasty_name: dynasty_name.into(),
            theme,
            members: BTreeMap::new(),
            graph: KinshipGraph::new(),
            current_monarch: None,
            monarch_history: Vec::new(),
            heir_apparent: None,
            succession_rule,
            current_year: start_year,
            vacant_since: None,
            wealth: 0,
            active_effects: Vec::new(),
            alliances: BTreeMap::new(),
            history: HistoryLog::new(),
            id_gen: IdGenerator::new(),
            narrator: Box::new(TemplateNarrator),
        }
    }

    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    // --- Read access ---

    pub fn dynasty_name(&self) -> &str {
        &self.dynasty_name
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn succession_rule(&self) -> SuccessionRule {
        self.succession_rule
    }

    pub fn set_succession_rule(&mut self, rule: SuccessionRule) {
        self.succession_rule = rule;
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn set_current_year(&mut self, year: i32) {
        self.current_year = year;
    }

    pub fn current_monarch(&self) -> Option<PersonId> {
        self.current_monarch
    }

    pub fn monarch_history(&self) -> &[PersonId] {
        &self.monarch_history
    }

    pub fn heir_apparent(&self) -> Option<PersonId> {
        self.heir_apparent
    }

    /// First year of the current vacancy, if the throne is empty.
    pub fn vacant_since(&self) -> Option<i32> {
        self.vacant_since
    }

    pub fn wealth(&self) -> i64 {
        self.wealth
    }

    pub fn alliances(&self) -> &BTreeMap<String, i32> {
        &self.alliances
    }

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.active_effects
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn graph(&self) -> &KinshipGraph {
        &self.graph
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.members.get(&id)
    }

    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.members.get_mut(&id)
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.members.values()
    }

    pub fn person_ids(&self) -> Vec<PersonId> {
        self.members.keys().copied().collect()
    }

    pub fn population(&self) -> usize {
        self.members.len()
    }

    pub fn living_nobles(&self, year: i32) -> Vec<PersonId> {
        self.members
            .values()
            .filter(|p| p.is_alive(year) && p.is_noble && !p.is_placeholder_ancestor)
            .map(|p| p.id)
            .collect()
    }

    /// Display name under the theme's surname convention.
    pub fn display_name(&self, id: PersonId) -> String {
        self.members
            .get(&id)
            .map(|p| p.full_name(self.theme.surname_convention))
            .unwrap_or_else(|| format!("person {id}"))
    }

    pub(crate) fn narrate(
        &self,
        kind: &HistoryKind,
        subject: &str,
        other: Option<&str>,
        year: i32,
        detail: Option<&str>,
    ) -> String {
        self.narrator.narrate(
            kind,
            &NarrativeContext {
                subject,
                other,
                year,
                detail,
            },
        )
    }

    // --- Registration ---

    /// Register a person, link them to any parents given, and log the birth
    /// (placeholder ancestors are not logged).
    pub fn add_person(&mut self, new_person: NewPerson) -> PersonId {
        let id = self.id_gen.next_id();
        let person = Person {
            id,
            name: new_person.name,
            surname: new_person.surname,
            gender: new_person.gender,
            birth_year: new_person.birth_year,
            death_year: new_person.death_year,
            father: None,
            mother: None,
            spouse: None,
            children: Vec::new(),
            is_noble: new_person.is_noble,
            is_monarch: false,
            reign_start_year: None,
            reign_end_year: None,
            titles: new_person.titles,
            traits: new_person.traits,
            is_placeholder_ancestor: new_person.is_placeholder_ancestor,
        };
        self.members.insert(id, person);
        self.graph.add_node(id);

        for parent in [new_person.father, new_person.mother].into_iter().flatten() {
            self.link_parent_child(parent, id);
        }

        if !new_person.is_placeholder_ancestor {
            let parents = match (new_person.father, new_person.mother) {
                (Some(f), Some(m)) => Some(format!(
                    "{} and {}",
                    self.display_name(f),
                    self.display_name(m)
                )),
                (Some(p), None) | (None, Some(p)) => Some(self.display_name(p)),
                (None, None) => None,
            };
            let subject = self.display_name(id);
            let text = self.narrate(
                &HistoryKind::Birth,
                &subject,
                parents.as_deref(),
                new_person.birth_year,
                None,
            );
            self.history.record(
                Some(new_person.birth_year),
                HistoryKind::Birth,
                text,
                Some(id),
                new_person.father.or(new_person.mother),
            );
        }
        id
    }

    /// Record `parent` as a parent of `child`. The parent's gender decides
    /// which slot is filled; an occupied slot is not overwritten.
    pub fn link_parent_child(&mut self, parent: PersonId, child: PersonId) -> bool {
        if parent == child {
            return false;
        }
        let Some(parent_gender) = self.members.get(&parent).map(|p| p.gender) else {
            tracing::warn!(%parent, %child, "parent link refused: unknown parent");
            return false;
        };
        let Some(child_person) = self.members.get_mut(&child) else {
            tracing::warn!(%parent, %child, "parent link refused: unknown child");
            return false;
        };
        let slot = match parent_gender {
            Gender::Male => &mut child_person.father,
            Gender::Female => &mut child_person.mother,
        };
        match *slot {
            Some(existing) if existing != parent => return false,
            _ => *slot = Some(parent),
        }
        if let Some(parent_person) = self.members.get_mut(&parent)
            && !parent_person.children.contains(&child)
        {
            parent_person.children.push(child);
        }
        self.graph.add_parent_edge(child, parent);
        true
    }

    /// Found the dynasty: register the founder (and spouse), then crown the founder.
    pub fn found_dynasty(
        &mut self,
        founder: NewPerson,
        spouse: Option<NewPerson>,
        year: i32,
    ) -> PersonId {
        self.current_year = year;
        let founder_id = self.add_person(founder);
        if let Some(spouse) = spouse {
            let spouse_id = self.add_person(spouse);
            self.marry(founder_id, spouse_id, year);
        }
        self.crown(founder_id, year);
        founder_id
    }

    // --- Marriage ---

    /// Marry two eligible persons of opposite gender. Leaves everything
    /// untouched and returns false when the pair is ineligible.
    pub fn marry(&mut self, a: PersonId, b: PersonId, year: i32) -> bool {
        let (Some(pa), Some(pb)) = (self.members.get(&a), self.members.get(&b)) else {
            tracing::warn!(%a, %b, year, "marriage refused: unknown person");
            return false;
        };
        if a == b || pa.gender == pb.gender {
            tracing::warn!(%a, %b, year, "marriage refused: incompatible pair");
            return false;
        }
        if !pa.can_marry(year, &self.theme) || !pb.can_marry(year, &self.theme) {
            tracing::warn!(%a, %b, year, "marriage refused: not eligible");
            return false;
        }
        let houses = (pa.surname.clone(), pb.surname.clone());

        if let Some(p) = self.members.get_mut(&a) {
            p.spouse = Some(b);
        }
        if let Some(p) = self.members.get_mut(&b) {
            p.spouse = Some(a);
        }
        self.graph.add_spouse_edge(a, b);

        for (own, other) in [(&houses.0, &houses.1), (&houses.1, &houses.0)] {
            if *own == self.dynasty_name && *other != self.dynasty_name {
                self.alliances.entry(other.clone()).or_insert(year);
            }
        }

        let (name_a, name_b) = (self.display_name(a), self.display_name(b));
        let text = self.narrate(&HistoryKind::Marriage, &name_a, Some(&name_b), year, None);
        self.history
            .record(Some(year), HistoryKind::Marriage, text, Some(a), Some(b));
        true
    }

    /// Dissolve `id`'s marriage on both sides. The graph keeps the spouse edge
    /// as a record of the marriage.
    pub fn clear_spouse(&mut self, id: PersonId) {
        let Some(spouse) = self.members.get_mut(&id).and_then(|p| p.spouse.take()) else {
            return;
        };
        if let Some(other) = self.members.get_mut(&spouse)
            && other.spouse == Some(id)
        {
            other.spouse = None;
        }
    }

    /// Conception gate. Only the mother is checked independently; a father
    /// defers to his wife.
    pub fn can_have_children(&self, id: PersonId, year: i32) -> bool {
        let Some(person) = self.members.get(&id) else {
            return false;
        };
        let Some(spouse) = person.spouse.and_then(|s| self.members.get(&s)) else {
            return false;
        };
        match person.gender {
            Gender::Female => {
                spouse.is_alive(year) && person.in_fertile_window(year, &self.theme)
            }
            Gender::Male => {
                spouse.gender == Gender::Female
                    && person.is_alive(year)
                    && spouse.in_fertile_window(year, &self.theme)
            }
        }
    }

    // --- Life and death ---

    /// Kill a person. Widows their spouse and vacates the throne if they were
    /// reigning; does not resolve succession.
    pub fn kill(&mut self, id: PersonId, year: i32) -> bool {
        let Some(person) = self.members.get_mut(&id) else {
            tracing::warn!(%id, year, "death refused: unknown person");
            return false;
        };
        if !person.die(year, &mut self.history) {
            return false;
        }
        self.clear_spouse(id);
        if self.heir_apparent == Some(id) {
            self.heir_apparent = None;
            self.revoke_heir_titles(id, year);
        }
        if self.current_monarch == Some(id) {
            self.current_monarch = None;
            self.vacant_since = Some(year);
            tracing::info!(%id, year, "monarch died; throne vacant");
        }
        true
    }

    /// Chance that `id` dies during `year`. Certain at the theme's max age.
    pub fn death_probability(&self, id: PersonId, year: i32) -> f64 {
        let Some(person) = self.members.get(&id) else {
            return 0.0;
        };
        let age = person.age(year);
        if age >= self.theme.max_age() {
            return 1.0;
        }
        let mut bracket = 0.0;
        if age > ELDER_AGE {
            bracket += ELDER_MORTALITY;
        }
        if age > AGED_AGE {
            bracket += AGED_MORTALITY;
        }
        let mut p = self.theme.base_mortality() + bracket * self.theme.life.mortality_factor;
        for effect in self.active_effects.iter().filter(|e| e.applies_in(year)) {
            p *= effect.mortality_factor;
        }
        p.clamp(0.0, 1.0)
    }

    /// One year of life for one person: mortality, then marriage, then conception.
    pub fn process_yearly_events_for_person(
        &mut self,
        id: PersonId,
        year: i32,
        rng: &mut dyn RngCore,
    ) {
        let Some(person) = self.members.get(&id) else {
            return;
        };
        if !person.is_alive(year) {
            return;
        }

        let p_death = self.death_probability(id, year);
        if p_death > 0.0 && rng.random_bool(p_death) {
            let was_monarch = self.current_monarch == Some(id);
            if self.kill(id, year) && was_monarch {
                self.process_succession(id, year);
            }
            return;
        }

        let Some(person) = self.members.get(&id) else {
            return;
        };
        if person.can_marry(year, &self.theme) {
            let favoured = self.current_monarch.is_some_and(|m| {
                m == id || person.father == Some(m) || person.mother == Some(m)
            });
            let chance = if favoured {
                FAVOURED_MARRIAGE_CHANCE
            } else {
                MARRIAGE_CHANCE
            };
            if rng.random_bool(chance) {
                marriage::arrange_marriage(self, id, year, rng);
            }
        }

        let is_wife = self
            .members
            .get(&id)
            .is_some_and(|p| p.gender == Gender::Female && p.spouse.is_some());
        if is_wife {
            self.attempt_conception(id, year, rng);
        }
    }

    /// One Bernoulli trial for a child this year. The newborn may die in its
    /// first year (death_year == birth_year).
    pub fn attempt_conception(
        &mut self,
        mother: PersonId,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Option<PersonId> {
        let is_female = self
            .members
            .get(&mother)
            .is_some_and(|p| p.gender == Gender::Female);
        if !is_female || !self.can_have_children(mother, year) {
            return None;
        }
        if !rng.random_bool(self.theme.pregnancy_chance()) {
            tracing::debug!(%mother, year, "no conception this year");
            return None;
        }
        let mother_person = self.members.get(&mother)?;
        let father = mother_person.spouse;
        let father_person = father.and_then(|f| self.members.get(&f));

        let gender = if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let name = names::random_given_name(&self.theme, gender, rng);
        let surname = names::child_surname(
            self.theme.surname_convention,
            father_person,
            Some(mother_person),
            gender,
        );
        let is_noble = mother_person.is_noble || father_person.is_some_and(|f| f.is_noble);

        let child = self.add_person(
            NewPerson::new(name, surname, gender, year)
                .noble(is_noble)
                .child_of(father, Some(mother)),
        );
        if rng.random_bool(self.theme.infant_mortality()) {
            self.kill(child, year);
        }
        Some(child)
    }

    // --- Dynasty state ---

    pub fn adjust_wealth(&mut self, delta: i64) {
        self.wealth = self.wealth.saturating_add(delta);
    }

    pub fn add_effect(&mut self, effect: ActiveEffect) {
        self.active_effects.push(effect);
    }

    /// Apply a triggered world event and log it. Returns the rendered text.
    pub fn apply_world_event(&mut self, def: &WorldEventDef, year: i32) -> String {
        if let Some(delta) = def.wealth_delta {
            self.adjust_wealth(delta);
        }
        if let Some(impact) = &def.mortality_impact
            && impact.duration_years > 0
        {
            self.add_effect(ActiveEffect {
                source: def.id.clone(),
                mortality_factor: impact.factor,
                expires_after: year + impact.duration_years as i32 - 1,
            });
        }
        if let Some(t) = &def.grant_trait
            && let Some(monarch) = self.current_monarch
            && let Some(person) = self.members.get_mut(&monarch)
            && !person.traits.contains(t)
        {
            person.traits.push(t.clone());
        }

        let monarch = match self.current_monarch {
            Some(id) => self.display_name(id),
            None => "the regency council".to_string(),
        };
        let text = render_template(
            &def.template,
            &[
                ("monarch", monarch),
                ("dynasty", self.dynasty_name.clone()),
                ("year", year.to_string()),
                ("wealth", self.wealth.to_string()),
            ],
        );
        tracing::info!(event = %def.id, year, "world event");
        self.history.record(
            Some(year),
            HistoryKind::WorldEvent,
            text.clone(),
            self.current_monarch,
            None,
        );
        text
    }

    /// Drop effects whose last year is before `year`.
    pub fn expire_effects(&mut self, year: i32) {
        self.active_effects.retain(|e| e.applies_in(year));
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// Remove a person and scrub every reference to them held by others.
    pub(crate) fn remove_person(&mut self, id: PersonId) -> Option<Person> {
        let removed = self.members.remove(&id)?;
        self.graph.remove_node(id);
        for parent in [removed.father, removed.mother].into_iter().flatten() {
            if let Some(p) = self.members.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }
        for child in &removed.children {
            if let Some(c) = self.members.get_mut(child) {
                if c.father == Some(id) {
                    c.father = None;
                }
                if c.mother == Some(id) {
                    c.mother = None;
                }
            }
        }
        if let Some(spouse) = removed.spouse
            && let Some(s) = self.members.get_mut(&spouse)
            && s.spouse == Some(id)
        {
            s.spouse = None;
        }
        if self.heir_apparent == Some(id) {
            self.heir_apparent = None;
        }
        if self.current_monarch == Some(id) {
            self.current_monarch = None;
        }
        Some(removed)
    }

    /// Structural problems in the tree; empty when every invariant holds.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let monarchs: Vec<PersonId> = self
            .members
            .values()
            .filter(|p| p.is_monarch)
            .map(|p| p.id)
            .collect();
        if monarchs.len() > 1 {
            problems.push(format!("more than one monarch: {monarchs:?}"));
        }
        for p in self.members.values() {
            if p.death_year.is_some() && p.is_monarch {
                problems.push(format!("{} is dead but still monarch", p.id));
            }
            if let Some(s) = p.spouse {
                match self.members.get(&s) {
                    Some(other) if other.spouse == Some(p.id) => {}
                    _ => problems.push(format!("{} -> {} spouse link is not symmetric", p.id, s)),
                }
            }
            for link in [p.father, p.mother].into_iter().flatten().chain(p.children.iter().copied()) {
                if !self.members.contains_key(&link) {
                    problems.push(format!("{} references missing person {}", p.id, link));
                }
            }
        }
        for node in self.graph.nodes() {
            if !self.members.contains_key(&node) {
                problems.push(format!("graph node {node} has no person"));
            }
        }
        for edge in self.graph.edges() {
            let (x, y) = match edge {
                super::graph::KinshipEdge::Parent { child, parent } => (child, parent),
                super::graph::KinshipEdge::Spouse { a, b } => (a, b),
            };
            if !self.members.contains_key(&x) || !self.members.contains_key(&y) {
                problems.push(format!("dangling edge {edge:?}"));
            }
        }
        if let Some(m) = self.current_monarch
            && !self.members.get(&m).is_some_and(|p| p.is_monarch)
        {
            problems.push(format!("current monarch {m} is not flagged as monarch"));
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn tree() -> FamilyTree {
        FamilyTree::new("Stonemark", Theme::default(), 1000)
    }

    fn founded() -> (FamilyTree, PersonId, PersonId) {
        let mut t = tree();
        let king = t.found_dynasty(
            NewPerson::new("Henry", "Stonemark", Gender::Male, 970),
            Some(NewPerson::new("Matilda", "Ravencrest", Gender::Female, 972)),
            1000,
        );
        let queen = t.person(king).and_then(|p| p.spouse).unwrap();
        (t, king, queen)
    }

    #[test]
    fn founding_crowns_and_marries() {
        let (t, king, queen) = founded();
        assert_eq!(t.current_monarch(), Some(king));
        assert_eq!(t.monarch_history(), &[king]);
        let k = t.person(king).unwrap();
        assert!(k.is_monarch);
        assert_eq!(k.primary_title(), Some("King"));
        assert_eq!(k.reign_start_year, Some(1000));
        assert_eq!(t.person(queen).unwrap().spouse, Some(king));
        assert_eq!(t.alliances().get("Ravencrest"), Some(&1000));
        assert!(t.invariant_violations().is_empty());
    }

    #[test]
    fn marriage_refusals_leave_state_untouched() {
        let (mut t, king, _) = founded();
        let other = t.add_person(NewPerson::new("Edith", "Ashford", Gender::Female, 980));
        assert!(!t.marry(king, other, 1000), "king already married");
        assert!(!t.marry(other, PersonId(999), 1000), "unknown id");
        let man = t.add_person(NewPerson::new("Hugh", "Ashford", Gender::Male, 980));
        let boy = t.add_person(NewPerson::new("Roland", "Ashford", Gender::Male, 990));
        assert!(!t.marry(man, boy, 1000), "same gender");
        assert!(t.person(other).unwrap().spouse.is_none());
        assert!(t.marry(man, other, 1000));
        assert!(t.invariant_violations().is_empty());
    }

    #[test]
    fn clear_spouse_is_symmetric() {
        let (mut t, king, queen) = founded();
        t.clear_spouse(queen);
        assert!(t.person(king).unwrap().spouse.is_none());
        assert!(t.person(queen).unwrap().spouse.is_none());
        assert_eq!(t.graph().spouses_of(king).collect::<Vec<_>>(), vec![queen]);
        assert!(t.invariant_violations().is_empty());
    }

    #[test]
    fn conception_gate_is_mother_driven() {
        let (mut t, king, queen) = founded();
        assert!(t.can_have_children(queen, 1000));
        assert!(t.can_have_children(king, 1000), "father defers to the queen");
        assert!(!t.can_have_children(queen, 1018), "queen is 46");
        t.kill(king, 1001);
        assert!(!t.can_have_children(queen, 1002), "widowed");
    }

    #[test]
    fn kill_vacates_throne_and_widows() {
        let (mut t, king, queen) = founded();
        assert!(t.kill(king, 1010));
        assert_eq!(t.current_monarch(), None);
        assert_eq!(t.vacant_since(), Some(1010));
        let k = t.person(king).unwrap();
        assert!(!k.is_monarch);
        assert_eq!(k.reign_end_year, Some(1010));
        assert!(t.person(queen).unwrap().spouse.is_none());
        assert!(!t.kill(king, 1011), "already dead");
        assert!(!t.kill(PersonId(404), 1011));
    }

    #[test]
    fn death_probability_shape() {
        let mut t = tree();
        let young = t.add_person(NewPerson::new("A", "Stonemark", Gender::Male, 980));
        let elder = t.add_person(NewPerson::new("B", "Stonemark", Gender::Male, 930));
        let aged = t.add_person(NewPerson::new("C", "Stonemark", Gender::Male, 920));
        let ancient = t.add_person(NewPerson::new("D", "Stonemark", Gender::Male, 900));

        let p_young = t.death_probability(young, 1000);
        let p_elder = t.death_probability(elder, 1000);
        let p_aged = t.death_probability(aged, 1000);
        assert!(p_young < p_elder && p_elder < p_aged);
        assert_eq!(t.death_probability(ancient, 1000), 1.0);

        t.add_effect(ActiveEffect {
            source: "plague".to_string(),
            mortality_factor: 2.0,
            expires_after: 1001,
        });
        assert!((t.death_probability(young, 1000) - 2.0 * p_young).abs() < 1e-12);
        t.expire_effects(1002);
        assert!(t.active_effects().is_empty());
    }

    #[test]
    fn zero_mortality_only_kills_at_max_age() {
        let mut theme = Theme::default();
        theme.life.mortality_factor = 0.0;
        let mut t = FamilyTree::new("Stonemark", theme, 1000);
        let old = t.add_person(NewPerson::new("A", "Stonemark", Gender::Male, 920));
        assert_eq!(t.death_probability(old, 1000), 0.0);
        assert_eq!(t.death_probability(old, 1015), 1.0);
    }

    #[test]
    fn conception_registers_child_with_both_parents() {
        let mut theme = Theme::default();
        theme.life.pregnancy_chance_factor = 10.0;
        theme.life.mortality_factor = 0.0;
        let mut t = FamilyTree::new("Stonemark", theme, 1000);
        let king = t.found_dynasty(
            NewPerson::new("Henry", "Stonemark", Gender::Male, 970),
            Some(NewPerson::new("Matilda", "Ravencrest", Gender::Female, 975)),
            1000,
        );
        let queen = t.person(king).and_then(|p| p.spouse).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        let child = t.attempt_conception(queen, 1001, &mut rng).unwrap();
        let c = t.person(child).unwrap();
        assert_eq!(c.father, Some(king));
        assert_eq!(c.mother, Some(queen));
        assert_eq!(c.surname, "Stonemark");
        assert_eq!(c.birth_year, 1001);
        assert!(c.is_noble);
        assert!(c.is_alive(1001));
        assert!(t.person(king).unwrap().children.contains(&child));
        assert_eq!(t.graph().parents_of(child).count(), 2);
        assert!(t.attempt_conception(king, 1001, &mut rng).is_none(), "only mothers conceive");
        assert!(t.invariant_violations().is_empty());
    }

    #[test]
    fn certain_infant_mortality() {
        let mut theme = Theme::default();
        theme.life.pregnancy_chance_factor = 10.0;
        theme.life.mortality_factor = 100.0;
        let mut t = FamilyTree::new("Stonemark", theme, 1000);
        let king = t.found_dynasty(
            NewPerson::new("Henry", "Stonemark", Gender::Male, 970),
            Some(NewPerson::new("Matilda", "Ravencrest", Gender::Female, 975)),
            1000,
        );
        let queen = t.person(king).and_then(|p| p.spouse).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let child = t.attempt_conception(queen, 1001, &mut rng).unwrap();
        assert_eq!(t.person(child).unwrap().death_year, Some(1001));
    }

    #[test]
    fn world_event_applies_every_effect() {
        let (mut t, king, _) = founded();
        let mut relic = t.theme().world_events[3].clone();
        relic.wealth_delta = Some(50);
        relic.mortality_impact = Some(crate::model::MortalityImpact {
            factor: 1.5,
            duration_years: 2,
        });
        let text = t.apply_world_event(&relic, 1005);
        assert!(text.contains("Henry Stonemark"), "{text}");
        assert!(text.contains("1005"));
        assert_eq!(t.wealth(), 50);
        assert!(t.person(king).unwrap().traits.contains(&"pious".to_string()));
        assert_eq!(t.active_effects()[0].expires_after, 1006);
        assert_eq!(t.history().entries_of_kind(&HistoryKind::WorldEvent).count(), 1);
    }

    #[test]
    fn remove_person_scrubs_back_references() {
        let (mut t, king, queen) = founded();
        let child = t.add_person(
            NewPerson::new("Edmund", "Stonemark", Gender::Male, 1001).child_of(Some(king), Some(queen)),
        );
        t.remove_person(queen);
        assert!(t.person(king).unwrap().spouse.is_none());
        assert_eq!(t.person(child).unwrap().mother, None);
        assert_eq!(t.person(child).unwrap().father, Some(king));
        assert!(t.invariant_violations().is_empty());
    }

    #[test]
    fn births_are_logged_except_placeholders() {
        let mut t = tree();
        t.add_person(NewPerson::new("A", "Stonemark", Gender::Male, 980));
        t.add_person(NewPerson::new("B", "Stonemark", Gender::Female, 950).placeholder());
        assert_eq!(t.history().entries_of_kind(&HistoryKind::Birth).count(), 1);
        assert_eq!(t.population(), 2);
        assert_eq!(t.living_nobles(1000).len(), 1, "placeholders are not counted");
    }
}
