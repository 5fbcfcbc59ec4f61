use rand::Rng;
use rand::RngCore;

use crate::model::{Gender, Person, SurnameConvention, Theme};

const FIRST_PREFIXES: &[&str] = &[
    "Al", "Ar", "Bal", "Bel", "Bor", "Cal", "Cor", "Dar", "Del", "Dor",
    "El", "Fal", "Gar", "Hal", "Kal", "Lor", "Mar", "Nor", "Ren", "Val",
];

const MALE_SUFFIXES: &[&str] = &["an", "ar", "en", "ic", "or", "ric", "us", "win"];
const FEMALE_SUFFIXES: &[&str] = &["a", "ia", "is", "wen", "ra", "ine", "ys", "eth"];

const FALLBACK_HOUSE: &str = "of the Marches";

/// Draw a given name from the theme pool, or build one from syllables when the
/// pool for that gender is empty.
pub fn random_given_name(theme: &Theme, gender: Gender, rng: &mut dyn RngCore) -> String {
    let pool = theme.names_for(gender);
    if !pool.is_empty() {
        return pool[rng.random_range(0..pool.len())].clone();
    }
    let prefix = FIRST_PREFIXES[rng.random_range(0..FIRST_PREFIXES.len())];
    let suffixes = match gender {
        Gender::Male => MALE_SUFFIXES,
        Gender::Female => FEMALE_SUFFIXES,
    };
    let suffix = suffixes[rng.random_range(0..suffixes.len())];
    format!("{prefix}{suffix}")
}

/// Pick a house from the theme's surname pool, avoiding `exclude` where the
/// pool allows it.
pub fn random_house(theme: &Theme, exclude: &[&str], rng: &mut dyn RngCore) -> String {
    let allowed: Vec<&String> = theme
        .surnames
        .iter()
        .filter(|s| !exclude.contains(&s.as_str()))
        .collect();
    if !allowed.is_empty() {
        return allowed[rng.random_range(0..allowed.len())].clone();
    }
    if !theme.surnames.is_empty() {
        return theme.surnames[rng.random_range(0..theme.surnames.len())].clone();
    }
    FALLBACK_HOUSE.to_string()
}

fn patronym(given: &str, child_gender: Gender) -> String {
    match child_gender {
        Gender::Male => format!("{given}son"),
        Gender::Female => format!("{given}dottir"),
    }
}

/// Surname for a newborn under the active convention.
pub fn child_surname(
    convention: SurnameConvention,
    father: Option<&Person>,
    mother: Option<&Person>,
    child_gender: Gender,
) -> String {
    match convention {
        SurnameConvention::Inherited | SurnameConvention::FamilyNameFirst => father
            .or(mother)
            .map(|p| p.surname.clone())
            .unwrap_or_else(|| FALLBACK_HOUSE.to_string()),
        SurnameConvention::Patronymic => match (father, mother) {
            (Some(f), _) => patronym(&f.name, child_gender),
            (None, Some(m)) => m.surname.clone(),
            (None, None) => FALLBACK_HOUSE.to_string(),
        },
        SurnameConvention::Matronymic => match (mother, father) {
            (Some(m), _) => patronym(&m.name, child_gender),
            (None, Some(f)) => f.surname.clone(),
            (None, None) => FALLBACK_HOUSE.to_string(),
        },
    }
}
