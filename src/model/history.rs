use serde::{Deserialize, Serialize};

use crate::id::PersonId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HistoryKind {
    Birth,
    Death,
    Marriage,
    TitleGranted,
    TitleRevoked,
    SuccessionStart,
    SuccessionEnd,
    SuccessionCrisis,
    HeirDesignated,
    WorldEvent,
    NobleArrived,
    Pruned,
    Generation,
    Custom(String),
}

string_enum_open!(HistoryKind, "history kind", {
    Birth => "birth",
    Death => "death",
    Marriage => "marriage",
    TitleGranted => "title_granted",
    TitleRevoked => "title_revoked",
    SuccessionStart => "succession_start",
    SuccessionEnd => "succession_end",
    SuccessionCrisis => "succession_crisis",
    HeirDesignated => "heir_designated",
    WorldEvent => "world_event",
    NobleArrived => "noble_arrived",
    Pruned => "pruned",
    Generation => "generation",
});

/// One immutable line of the dynasty's chronicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub year: Option<i32>,
    pub text: String,
    pub person1: Option<PersonId>,
    pub person2: Option<PersonId>,
    pub kind: HistoryKind,
}

/// Aggregate counters for one generation of the simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub start_year: Option<i32>,
    pub births: u32,
    pub deaths: u32,
    pub marriages: u32,
    pub successions: u32,
    pub pruned: u32,
}

/// Append-only event ledger with per-generation counters.
///
/// Entries can only be added; counters are rolled over by
/// [`start_generation`](Self::start_generation) but the ledger is never truncated.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    current: GenerationStats,
    completed: Vec<GenerationStats>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        year: Option<i32>,
        kind: HistoryKind,
        text: impl Into<String>,
        person1: Option<PersonId>,
        person2: Option<PersonId>,
    ) {
        match kind {
            HistoryKind::Birth => self.current.births += 1,
            HistoryKind::Death => self.current.deaths += 1,
            HistoryKind::Marriage => self.current.marriages += 1,
            HistoryKind::SuccessionEnd => self.current.successions += 1,
            HistoryKind::Pruned => self.current.pruned += 1,
            _ => {}
        }
        self.entries.push(HistoryEntry {
            year,
            text: text.into(),
            person1,
            person2,
            kind,
        });
    }

    /// Archive the running counters and begin a new generation at `year`.
    pub fn start_generation(&mut self, year: i32) {
        let next = GenerationStats {
            generation: self.current.generation + 1,
            start_year: Some(year),
            ..GenerationStats::default()
        };
        let finished = std::mem::replace(&mut self.current, next);
        self.completed.push(finished);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn entries_of_kind<'a>(
        &'a self,
        kind: &'a HistoryKind,
    ) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries.iter().filter(move |e| &e.kind == kind)
    }

    pub fn entries_involving(&self, id: PersonId) -> impl Iterator<Item = &HistoryEntry> {
        self.entries
            .iter()
            .filter(move |e| e.person1 == Some(id) || e.person2 == Some(id))
    }

    pub fn current_generation(&self) -> &GenerationStats {
        &self.current
    }

    pub fn completed_generations(&self) -> &[GenerationStats] {
        &self.completed
    }

    /// Completed generations followed by the one still running.
    pub fn all_generations(&self) -> impl Iterator<Item = &GenerationStats> {
        self.completed.iter().chain(std::iter::once(&self.current))
    }

    /// Narrative lines in the order they happened.
    pub fn chronicle(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| match e.year {
                Some(year) => format!("Year {year}: {}", e.text),
                None => e.text.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
