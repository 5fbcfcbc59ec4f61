use crate::error::SimError;
use crate::family::{FamilyTree, NewPerson};
use crate::id::PersonId;
use crate::model::{Gender, SuccessionRule, Theme};
use crate::sim::{RunSummary, SimConfig, run};

const DEFAULT_DYNASTY: &str = "Stonemark";
const DEFAULT_AGE: i32 = 30;

/// Pending person in a [`Scenario`], enabling chained field setup.
///
/// Created by [`Scenario::person`]. Call [`.id()`](PersonRef::id) to add the
/// person to the tree and get their id back.
pub struct PersonRef<'a> {
    scenario: &'a mut Scenario,
    pending: NewPerson,
}

impl PersonRef<'_> {
    pub fn born(mut self, year: i32) -> Self { self.pending.birth_year = year; self }
    pub fn died(mut self, year: i32) -> Self { self.pending.death_year = Some(year); self }
    pub fn noble(mut self) -> Self { self.pending.is_noble = true; self }
    pub fn commoner(mut self) -> Self { self.pending.is_noble = false; self }
    pub fn surname(mut self, v: &str) -> Self { self.pending.surname = v.to_string(); self }
    pub fn traits(mut self, v: &[&str]) -> Self {
        self.pending.traits = v.iter().map(|t| t.to_string()).collect();
        self
    }
    pub fn child_of(mut self, father: Option<PersonId>, mother: Option<PersonId>) -> Self {
        self.pending.father = father;
        self.pending.mother = mother;
        self
    }

    /// Escape hatch: apply an arbitrary closure to the pending person.
    pub fn with(mut self, f: impl FnOnce(&mut NewPerson)) -> Self { f(&mut self.pending); self }

    /// Terminate the chain, add the person and return their id.
    pub fn id(self) -> PersonId {
        self.scenario.tree.add_person(self.pending)
    }
}

/// Fluent builder for constructing a [`FamilyTree`] by hand.
///
/// Used by tests for deterministic family setups, and by the binary as a
/// starting point before the turn loop takes over.
pub struct Scenario {
    tree: FamilyTree,
    year: i32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Create a new scenario starting at year 1000.
    pub fn new() -> Self {
        Self::at_year(1000)
    }

    /// Create a new scenario with the default theme, starting at `year`.
    pub fn at_year(year: i32) -> Self {
        Self {
            tree: FamilyTree::new(DEFAULT_DYNASTY, Theme::default(), year),
            year,
        }
    }

    pub fn dynasty(mut self, name: &str) -> Self {
        self.tree.dynasty_name = name.to_string();
        self
    }

    pub fn rule(mut self, rule: SuccessionRule) -> Self {
        self.tree.set_succession_rule(rule);
        self
    }

    /// Replace the theme. The succession rule is left as it is.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.tree.theme = theme;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    // -- Persons --

    /// Start a noble of the dynasty's house, 30 years old at the scenario year.
    pub fn person(&mut self, name: &str, gender: Gender) -> PersonRef<'_> {
        let surname = self.tree.dynasty_name().to_string();
        let born = self.year - DEFAULT_AGE;
        PersonRef {
            scenario: self,
            pending: NewPerson::new(name, surname, gender, born),
        }
    }

    // -- Relationships --

    pub fn make_parent_child(&mut self, parent: PersonId, child: PersonId) {
        self.tree.link_parent_child(parent, child);
    }

    /// Marry two persons. Pairs the normal rules refuse (the dead, or the
    /// already widowed) are linked directly, without a history entry.
    pub fn marry(&mut self, a: PersonId, b: PersonId) {
        if self.tree.marry(a, b, self.year) {
            return;
        }
        if a == b || self.tree.person(a).is_none() || self.tree.person(b).is_none() {
            return;
        }
        self.tree.clear_spouse(a);
        self.tree.clear_spouse(b);
        for (id, other) in [(a, b), (b, a)] {
            if let Some(p) = self.tree.person_mut(id) {
                p.spouse = Some(other);
            }
        }
        self.tree.graph.add_spouse_edge(a, b);
    }

    /// Crown `id` at the scenario year.
    pub fn crown(&mut self, id: PersonId) {
        self.tree.crown(id, self.year);
    }

    /// Kill `id` at the scenario year. Succession is not resolved.
    pub fn kill(&mut self, id: PersonId) {
        self.tree.kill(id, self.year);
    }

    // -- Finishing --

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FamilyTree {
        &mut self.tree
    }

    pub fn build(self) -> FamilyTree {
        self.tree
    }

    /// Run the turn loop from the scenario year with default settings.
    pub fn run(self, num_years: u32, seed: u64) -> Result<(FamilyTree, RunSummary), SimError> {
        let config = SimConfig::new(self.year, num_years, seed);
        self.run_with(&config)
    }

    pub fn run_with(self, config: &SimConfig) -> Result<(FamilyTree, RunSummary), SimError> {
        let mut tree = self.tree;
        let summary = run(&mut tree, config)?;
        Ok((tree, summary))
    }
}
