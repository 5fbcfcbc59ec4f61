use serde::{Deserialize, Serialize};

use super::history::{HistoryKind, HistoryLog};
use super::theme::{SurnameConvention, Theme};
use crate::id::PersonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

string_enum!(Gender {
    Male => "male",
    Female => "female",
});

impl Gender {
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

/// A single member of the simulated population.
///
/// Family links are ids resolved through the owning
/// [`FamilyTree`](crate::family::FamilyTree); a `Person` never owns another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    pub gender: Gender,
    pub birth_year: i32,
    pub death_year: Option<i32>,

    pub father: Option<PersonId>,
    pub mother: Option<PersonId>,
    pub spouse: Option<PersonId>,
    /// Not ordered by birth; sort on `birth_year` where order matters.
    pub children: Vec<PersonId>,

    pub is_noble: bool,
    pub is_monarch: bool,
    pub reign_start_year: Option<i32>,
    pub reign_end_year: Option<i32>,

    /// Primary title first.
    pub titles: Vec<String>,
    pub traits: Vec<String>,

    /// Synthesized only to give an imported spouse parents. Never logged as a
    /// birth and never eligible to inherit.
    #[serde(default)]
    pub is_placeholder_ancestor: bool,
}

impl Person {
    /// Age in whole years at `as_of`, frozen at death. Asking before birth
    /// yields 0 rather than a negative age.
    pub fn age(&self, as_of: i32) -> i32 {
        if as_of < self.birth_year {
            tracing::warn!(
                person = %self.id,
                birth_year = self.birth_year,
                as_of,
                "age requested before birth"
            );
            return 0;
        }
        let end = match self.death_year {
            Some(death) => death.min(as_of),
            None => as_of,
        };
        end - self.birth_year
    }

    pub fn is_alive(&self, year: i32) -> bool {
        self.death_year.is_none_or(|death| year < death)
    }

    /// Marriage eligibility for this person alone. Non-nobles never marry.
    pub fn can_marry(&self, year: i32, theme: &Theme) -> bool {
        if !self.is_alive(year) || self.spouse.is_some() {
            return false;
        }
        if !self.is_noble || self.is_placeholder_ancestor {
            return false;
        }
        let age = self.age(year);
        age >= theme.min_marriage_age() && age <= theme.max_marriage_age(self.gender)
    }

    /// Mother-side conception gate: alive, inside the fertile window and below
    /// the child limit. The spouse check needs the tree and lives there.
    pub fn in_fertile_window(&self, year: i32, theme: &Theme) -> bool {
        if self.gender != Gender::Female || !self.is_alive(year) {
            return false;
        }
        let (min, max) = theme.fertile_age_range();
        let age = self.age(year);
        age >= min && age <= max && self.children.len() < theme.max_children()
    }

    /// Mark this person dead in `year`. Returns false if they already died at
    /// or before `year`.
    pub fn die(&mut self, year: i32, log: &mut HistoryLog) -> bool {
        if self.death_year.is_some_and(|death| death <= year) {
            return false;
        }
        self.death_year = Some(year);
        let reigned = self.is_monarch;
        if reigned {
            self.is_monarch = false;
            self.reign_end_year = Some(year);
        }
        let text = if reigned {
            format!("{} {} died while reigning, aged {}", self.name, self.surname, self.age(year))
        } else {
            format!("{} {} died, aged {}", self.name, self.surname, self.age(year))
        };
        log.record(Some(year), HistoryKind::Death, text, Some(self.id), None);
        true
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    /// Grant a title. Granting a ruler title makes this person monarch and
    /// drops any heir-apparent title they held.
    pub fn add_title(&mut self, title: &str, theme: &Theme, log: &mut HistoryLog, year: i32) {
        if self.has_title(title) {
            return;
        }
        if theme.is_monarch_title(title) {
            if !self.is_monarch {
                self.is_monarch = true;
                self.reign_start_year = Some(year);
                self.reign_end_year = None;
            }
            self.titles.retain(|t| !theme.is_heir_title(t));
            self.titles.insert(0, title.to_string());
        } else {
            self.titles.push(title.to_string());
        }
        log.record(
            Some(year),
            HistoryKind::TitleGranted,
            format!("{} {} was granted the title of {title}", self.name, self.surname),
            Some(self.id),
            None,
        );
    }

    /// Revoke a title. Losing the last ruler title ends the reign.
    pub fn remove_title(&mut self, title: &str, theme: &Theme, year: i32) {
        let before = self.titles.len();
        self.titles.retain(|t| t != title);
        if self.titles.len() == before {
            return;
        }
        if theme.is_monarch_title(title)
            && self.is_monarch
            && !self.titles.iter().any(|t| theme.is_monarch_title(t))
        {
            self.is_monarch = false;
            self.reign_end_year = Some(year);
        }
    }

    pub fn full_name(&self, convention: SurnameConvention) -> String {
        match convention {
            SurnameConvention::FamilyNameFirst => format!("{} {}", self.surname, self.name),
            _ => format!("{} {}", self.name, self.surname),
        }
    }

    /// The most senior title held, if any.
    pub fn primary_title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }
}
