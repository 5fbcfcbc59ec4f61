pub mod db;
pub mod error;
pub mod family;
pub mod flush;
pub mod id;
pub mod model;
pub mod scenario;
pub mod sim;

pub use error::{SimError, ThemeError};
pub use family::{FamilyTree, NewPerson, PruneReason, PruneReport, find_next_monarch};
pub use id::{IdGenerator, PersonId};
pub use model::{
    Gender, HistoryEntry, HistoryKind, HistoryLog, Person, SuccessionRule, SurnameConvention,
    Theme,
};
pub use sim::{RunSummary, SimConfig, TurnOutcome, TurnReport, process_turn, run};
