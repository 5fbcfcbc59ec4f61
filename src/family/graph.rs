use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::id::PersonId;

/// A single exported edge of the kinship graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KinshipEdge {
    /// Directed child → parent.
    Parent { child: PersonId, parent: PersonId },
    /// Undirected; stored with the smaller id first.
    Spouse { a: PersonId, b: PersonId },
}

/// Undirected adjacency over a subset of the population.
pub type Adjacency = BTreeMap<PersonId, BTreeSet<PersonId>>;

/// Parent/child and marriage edges between persons.
///
/// Spouse edges are kept after a widowing as a record of the marriage; they
/// only disappear when one endpoint is removed.
/// BTree collections keep traversal order deterministic.
#[derive(Debug, Clone, Default)]
pub struct KinshipGraph {
    nodes: BTreeSet<PersonId>,
    parents: BTreeMap<PersonId, BTreeSet<PersonId>>,
    children: BTreeMap<PersonId, BTreeSet<PersonId>>,
    spouses: BTreeSet<(PersonId, PersonId)>,
}

impl KinshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn canonical_pair(a: PersonId, b: PersonId) -> (PersonId, PersonId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn add_node(&mut self, id: PersonId) {
        self.nodes.insert(id);
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.nodes.contains(&id)
    }

    /// Add a child → parent edge. Both endpoints must already be nodes;
    /// returns false (and adds nothing) otherwise.
    pub fn add_parent_edge(&mut self, child: PersonId, parent: PersonId) -> bool {
        if child == parent || !self.contains(child) || !self.contains(parent) {
            return false;
        }
        self.parents.entry(child).or_default().insert(parent);
        self.children.entry(parent).or_default().insert(child);
        true
    }

    pub fn add_spouse_edge(&mut self, a: PersonId, b: PersonId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        self.spouses.insert(Self::canonical_pair(a, b));
        true
    }

    pub fn parents_of(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.parents.get(&id).into_iter().flatten().copied()
    }

    pub fn children_of(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.children.get(&id).into_iter().flatten().copied()
    }

    pub fn spouses_of(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.spouses.iter().filter_map(move |&(a, b)| {
            if a == id {
                Some(b)
            } else if b == id {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: PersonId) {
        if !self.nodes.remove(&id) {
            return;
        }
        if let Some(parents) = self.parents.remove(&id) {
            for parent in parents {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.remove(&id);
                    if siblings.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
        }
        if let Some(children) = self.children.remove(&id) {
            for child in children {
                if let Some(others) = self.parents.get_mut(&child) {
                    others.remove(&id);
                    if others.is_empty() {
                        self.parents.remove(&child);
                    }
                }
            }
        }
        self.spouses.retain(|&(a, b)| a != id && b != id);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.values().map(BTreeSet::len).sum::<usize>() + self.spouses.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.nodes.iter().copied()
    }

    /// All edges: parent edges first (by child), then spouse edges.
    pub fn edges(&self) -> Vec<KinshipEdge> {
        let mut out: Vec<KinshipEdge> = self
            .parents
            .iter()
            .flat_map(|(&child, parents)| {
                parents
                    .iter()
                    .map(move |&parent| KinshipEdge::Parent { child, parent })
            })
            .collect();
        out.extend(
            self.spouses
                .iter()
                .map(|&(a, b)| KinshipEdge::Spouse { a, b }),
        );
        out
    }

    /// Undirected blood-relative subgraph around `root`.
    ///
    /// Ancestors are collected by walking parent edges upward; descendants of
    /// the root and of every ancestor are then collected downward. Members are
    /// joined by their parent–child edges, and each member's spouses hang off
    /// it as leaves. Returns an empty map if `root` is not a node.
    pub fn blood_subgraph(&self, root: PersonId) -> Adjacency {
        let mut adjacency = Adjacency::new();
        if !self.contains(root) {
            return adjacency;
        }

        let mut ancestors = BTreeSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for parent in self.parents_of(current) {
                if ancestors.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        let mut blood = ancestors.clone();
        let mut queue: VecDeque<PersonId> = ancestors.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if blood.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        for &member in &blood {
            adjacency.entry(member).or_default();
            for parent in self.parents_of(member) {
                if blood.contains(&parent) {
                    link(&mut adjacency, member, parent);
                }
            }
        }
        for &member in &blood {
            for spouse in self.spouses_of(member) {
                link(&mut adjacency, member, spouse);
            }
        }
        adjacency
    }
}

fn link(adjacency: &mut Adjacency, a: PersonId, b: PersonId) {
    adjacency.entry(a).or_default().insert(b);
    adjacency.entry(b).or_default().insert(a);
}

/// Hop counts from `root` to every node reachable in `adjacency`.
pub fn shortest_path_lengths(adjacency: &Adjacency, root: PersonId) -> BTreeMap<PersonId, u32> {
    let mut distances = BTreeMap::new();
    if !adjacency.contains_key(&root) {
        return distances;
    }
    distances.insert(root, 0);
    let mut queue = VecDeque::from([(root, 0u32)]);
    while let Some((current, depth)) = queue.pop_front() {
        for &next in adjacency.get(&current).into_iter().flatten() {
            if !distances.contains_key(&next) {
                distances.insert(next, depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }
    distances
}
