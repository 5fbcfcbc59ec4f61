pub mod graph;
pub mod marriage;
pub mod names;
pub mod narrative;
pub mod pruning;
pub mod succession;
pub mod tree;

pub use graph::{Adjacency, KinshipEdge, KinshipGraph, shortest_path_lengths};
pub use marriage::arrange_marriage;
pub use narrative::{NarrativeContext, Narrator, TemplateNarrator};
pub use pruning::{PruneReason, PruneReport, important_persons, prune_distant_relatives};
pub use succession::{council_score, find_next_monarch};
pub use tree::{ActiveEffect, FamilyTree, NewPerson};
