use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a person inside a [`FamilyTree`](crate::family::FamilyTree).
///
/// Relationships between persons are stored as ids and resolved through the
/// owning tree, never as owned references.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic person id allocator. Ids are never handed out twice, even after
/// the person they named has been pruned.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume allocation after a restored population whose highest id is `start - 1`.
    pub fn starting_from(start: u64) -> Self {
        Self { next: start.max(1) }
    }

    pub fn next_id(&mut self) -> PersonId {
        let id = PersonId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> PersonId {
        PersonId(self.next)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids() {
        let mut id_gen = IdGenerator::new();
        assert_eq!(id_gen.next_id(), PersonId(1));
        assert_eq!(id_gen.next_id(), PersonId(2));
        assert_eq!(id_gen.peek(), PersonId(3));
    }

    #[test]
    fn resumes_after_restored_population() {
        let mut id_gen = IdGenerator::starting_from(100);
        assert_eq!(id_gen.next_id(), PersonId(100));
        assert_eq!(id_gen.next_id(), PersonId(101));
    }

    #[test]
    fn zero_start_is_bumped() {
        let mut id_gen = IdGenerator::starting_from(0);
        assert_eq!(id_gen.next_id(), PersonId(1));
    }

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PersonId(7)).unwrap(), "7");
        assert_eq!(PersonId(7).to_string(), "#7");
    }
}
