#[macro_use]
mod macros;

pub mod history;
pub mod person;
pub mod theme;

pub use history::{GenerationStats, HistoryEntry, HistoryKind, HistoryLog};
pub use person::{Gender, Person};
pub use theme::{
    LifeFactors, MortalityImpact, SuccessionRule, SurnameConvention, Theme, WorldEventDef,
};
