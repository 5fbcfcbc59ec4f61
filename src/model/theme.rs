use std::path::Path;

use serde::{Deserialize, Serialize};

use super::person::Gender;
use crate::error::ThemeError;

const BASE_MIN_MARRIAGE_AGE: f64 = 16.0;
const BASE_MAX_MARRIAGE_AGE_MALE: f64 = 60.0;
const BASE_MAX_MARRIAGE_AGE_FEMALE: f64 = 45.0;
const BASE_MIN_FERTILE_AGE: i32 = 16;
const BASE_MAX_FERTILE_AGE: f64 = 45.0;
const BASE_MAX_CHILDREN: f64 = 8.0;
const BASE_MAX_AGE: f64 = 95.0;
const BASE_PREGNANCY_CHANCE: f64 = 0.30;
const BASE_INFANT_MORTALITY: f64 = 0.08;
const BASE_ADULT_MORTALITY: f64 = 0.012;

/// How a newborn's surname is derived from its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SurnameConvention {
    #[default]
    Inherited,
    Patronymic,
    Matronymic,
    FamilyNameFirst,
}

string_enum!(SurnameConvention {
    Inherited => "inherited",
    Patronymic => "patronymic",
    Matronymic => "matronymic",
    FamilyNameFirst => "family_name_first",
});

/// Rule governing heir selection when the throne falls vacant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SuccessionRule {
    #[default]
    PrimogenitureMalePreference,
    PrimogenitureAbsolute,
    ElectiveNobleCouncil,
}

string_enum!(SuccessionRule {
    PrimogenitureMalePreference => "primogeniture_male_preference",
    PrimogenitureAbsolute => "primogeniture_absolute",
    ElectiveNobleCouncil => "elective_noble_council",
});

/// Numeric life-cycle tuning. Multipliers default to 1.0 ("no adjustment");
/// an absolute override, when present, wins over the multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeFactors {
    pub mortality_factor: f64,
    pub fertility_factor: f64,
    pub pregnancy_chance_factor: f64,
    pub max_children_factor: f64,
    pub max_age_factor: f64,
    pub marriage_age_factor: f64,

    pub min_marriage_age: Option<i32>,
    pub max_marriage_age_male: Option<i32>,
    pub max_marriage_age_female: Option<i32>,
    pub min_fertile_age: Option<i32>,
    pub max_fertile_age: Option<i32>,
    pub max_children: Option<u32>,
    pub max_age: Option<i32>,
    /// When set, arranged spouses are generated around this age instead of
    /// relative to the seeker.
    pub average_marriage_age: Option<i32>,
}

impl Default for LifeFactors {
    fn default() -> Self {
        Self {
            mortality_factor: 1.0,
            fertility_factor: 1.0,
            pregnancy_chance_factor: 1.0,
            max_children_factor: 1.0,
            max_age_factor: 1.0,
            marriage_age_factor: 1.0,
            min_marriage_age: None,
            max_marriage_age_male: None,
            max_marriage_age_female: None,
            min_fertile_age: None,
            max_fertile_age: None,
            max_children: None,
            max_age: None,
            average_marriage_age: None,
        }
    }
}

/// Temporary mortality multiplier applied by a world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityImpact {
    pub factor: f64,
    pub duration_years: u32,
}

/// A theme-defined occurrence that may trigger once in a given year.
///
/// `template` may reference `{monarch}`, `{dynasty}`, `{year}` and `{wealth}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEventDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    pub chance_per_year: f64,
    pub template: String,
    #[serde(default)]
    pub wealth_delta: Option<i64>,
    #[serde(default)]
    pub mortality_impact: Option<MortalityImpact>,
    #[serde(default)]
    pub grant_trait: Option<String>,
}

impl WorldEventDef {
    pub fn active_in(&self, year: i32) -> bool {
        self.start_year.is_none_or(|s| year >= s) && self.end_year.is_none_or(|e| year <= e)
    }
}

/// Per-dynasty configuration bundle. Read-only to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub male_names: Vec<String>,
    pub female_names: Vec<String>,
    /// Pool of houses that arranged spouses and newcomers are drawn from.
    pub surnames: Vec<String>,
    pub surname_convention: SurnameConvention,
    /// Ordered primary-to-lowest. Index 0 is the ruler, index 1 the heir apparent.
    pub male_titles: Vec<String>,
    pub female_titles: Vec<String>,
    pub succession_rule: SuccessionRule,
    pub life: LifeFactors,
    pub common_traits: Vec<String>,
    pub positive_traits: Vec<String>,
    pub negative_traits: Vec<String>,
    pub world_events: Vec<WorldEventDef>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "medieval".to_string(),
            male_names: strings(&[
                "Aldric", "Baldwin", "Conrad", "Edmund", "Geoffrey", "Godfrey", "Harold",
                "Henry", "Hugh", "Lothar", "Oswin", "Ranulf", "Robert", "Roland", "Stephen",
                "Theobald", "Walter", "William",
            ]),
            female_names: strings(&[
                "Adela", "Agnes", "Alys", "Beatrice", "Cecily", "Constance", "Edith", "Eleanor",
                "Emma", "Isabel", "Joan", "Matilda", "Maud", "Philippa", "Rosamund", "Sybil",
            ]),
            surnames: strings(&[
                "Ashford", "Blackthorn", "Brightwater", "Coldwell", "Dunmere", "Fairwind",
                "Greymoor", "Hartwood", "Ironhand", "Kingsward", "Longbridge", "Mossbank",
                "Northgate", "Oakshield", "Ravencrest", "Silverleaf", "Stonemark", "Whitevale",
            ]),
            surname_convention: SurnameConvention::Inherited,
            male_titles: strings(&["King", "Crown Prince", "Duke", "Count", "Baron", "Lord"]),
            female_titles: strings(&[
                "Queen",
                "Crown Princess",
                "Duchess",
                "Countess",
                "Baroness",
                "Lady",
            ]),
            succession_rule: SuccessionRule::PrimogenitureMalePreference,
            life: LifeFactors::default(),
            common_traits: strings(&[
                "brave", "just", "pious", "kind", "wise", "diligent", "ambitious", "cunning",
                "craven", "cruel", "greedy", "slothful", "wrathful", "deceitful",
            ]),
            positive_traits: strings(&["brave", "just", "pious", "kind", "wise", "diligent"]),
            negative_traits: strings(&[
                "craven", "cruel", "greedy", "slothful", "wrathful", "deceitful",
            ]),
            world_events: vec![
                WorldEventDef {
                    id: "plague".to_string(),
                    name: "The Pestilence".to_string(),
                    start_year: None,
                    end_year: None,
                    chance_per_year: 0.03,
                    template: "In {year} a pestilence swept the lands of House {dynasty}."
                        .to_string(),
                    wealth_delta: Some(-100),
                    mortality_impact: Some(MortalityImpact {
                        factor: 2.5,
                        duration_years: 3,
                    }),
                    grant_trait: None,
                },
                WorldEventDef {
                    id: "harvest".to_string(),
                    name: "Bountiful Harvest".to_string(),
                    start_year: None,
                    end_year: None,
                    chance_per_year: 0.08,
                    template: "The harvest of {year} filled the granaries; the treasury of \
                               House {dynasty} stands at {wealth}."
                        .to_string(),
                    wealth_delta: Some(200),
                    mortality_impact: None,
                    grant_trait: None,
                },
                WorldEventDef {
                    id: "bandits".to_string(),
                    name: "Bandit Raids".to_string(),
                    start_year: None,
                    end_year: None,
                    chance_per_year: 0.05,
                    template: "Bandits plundered the roads in {year}, and {monarch} paid dearly \
                               to restore order."
                        .to_string(),
                    wealth_delta: Some(-150),
                    mortality_impact: None,
                    grant_trait: None,
                },
                WorldEventDef {
                    id: "relic".to_string(),
                    name: "A Holy Relic".to_string(),
                    start_year: None,
                    end_year: None,
                    chance_per_year: 0.02,
                    template: "In {year} a holy relic was presented to {monarch}, who grew \
                               devout."
                        .to_string(),
                    wealth_delta: None,
                    mortality_impact: None,
                    grant_trait: Some("pious".to_string()),
                },
            ],
        }
    }
}

fn scaled(base: f64, factor: f64) -> i32 {
    (base * factor).round().max(0.0) as i32
}

impl Theme {
    /// Parse and validate a theme from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ThemeError> {
        let theme: Theme = serde_json::from_str(json)?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn from_path(path: &Path) -> Result<Self, ThemeError> {
        let json = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ThemeError> {
        if self.male_titles.is_empty() || self.female_titles.is_empty() {
            return Err(ThemeError::Invalid(
                "both title lists need at least a ruler title".to_string(),
            ));
        }
        let factors = [
            ("mortality_factor", self.life.mortality_factor),
            ("fertility_factor", self.life.fertility_factor),
            ("pregnancy_chance_factor", self.life.pregnancy_chance_factor),
            ("max_children_factor", self.life.max_children_factor),
            ("max_age_factor", self.life.max_age_factor),
            ("marriage_age_factor", self.life.marriage_age_factor),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(ThemeError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let min_marriage = self.min_marriage_age();
        for gender in Gender::ALL {
            if min_marriage > self.max_marriage_age(*gender) {
                return Err(ThemeError::Invalid(format!(
                    "minimum marriage age {min_marriage} exceeds the {gender} maximum"
                )));
            }
        }
        let (fertile_min, fertile_max) = self.fertile_age_range();
        if fertile_min > fertile_max {
            return Err(ThemeError::Invalid(format!(
                "fertile age range {fertile_min}..={fertile_max} is empty"
            )));
        }
        for event in &self.world_events {
            if !(0.0..=1.0).contains(&event.chance_per_year) {
                return Err(ThemeError::Invalid(format!(
                    "world event {} has chance {} outside 0..=1",
                    event.id, event.chance_per_year
                )));
            }
            if let Some(impact) = &event.mortality_impact
                && (!impact.factor.is_finite() || impact.factor < 0.0)
            {
                return Err(ThemeError::Invalid(format!(
                    "world event {} has a negative mortality factor",
                    event.id
                )));
            }
        }
        Ok(())
    }

    pub fn names_for(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male_names,
            Gender::Female => &self.female_names,
        }
    }

    pub fn titles_for(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male_titles,
            Gender::Female => &self.female_titles,
        }
    }

    // --- Titles ---

    /// Primary leader title for a ruler of the given gender.
    pub fn leader_title(&self, gender: Gender) -> &str {
        self.titles_for(gender).first().map_or("Ruler", String::as_str)
    }

    pub fn heir_title(&self, gender: Gender) -> Option<&str> {
        self.titles_for(gender).get(1).map(String::as_str)
    }

    pub fn is_monarch_title(&self, title: &str) -> bool {
        Gender::ALL.iter().any(|g| self.leader_title(*g) == title)
    }

    pub fn is_heir_title(&self, title: &str) -> bool {
        Gender::ALL.iter().any(|g| self.heir_title(*g) == Some(title))
    }

    /// The ruler and heir-apparent titles of either gender.
    pub fn is_top_tier_title(&self, title: &str) -> bool {
        self.is_monarch_title(title) || self.is_heir_title(title)
    }

    // --- Life cycle ---

    pub fn min_marriage_age(&self) -> i32 {
        self.life
            .min_marriage_age
            .unwrap_or_else(|| scaled(BASE_MIN_MARRIAGE_AGE, self.life.marriage_age_factor))
    }

    pub fn max_marriage_age(&self, gender: Gender) -> i32 {
        let (absolute, base) = match gender {
            Gender::Male => (self.life.max_marriage_age_male, BASE_MAX_MARRIAGE_AGE_MALE),
            Gender::Female => (self.life.max_marriage_age_female, BASE_MAX_MARRIAGE_AGE_FEMALE),
        };
        absolute.unwrap_or_else(|| scaled(base, self.life.marriage_age_factor))
    }

    /// Inclusive female fertile window in years of age.
    pub fn fertile_age_range(&self) -> (i32, i32) {
        let min = self.life.min_fertile_age.unwrap_or(BASE_MIN_FERTILE_AGE);
        let max = self
            .life
            .max_fertile_age
            .unwrap_or_else(|| scaled(BASE_MAX_FERTILE_AGE, self.life.fertility_factor));
        (min, max)
    }

    pub fn max_children(&self) -> usize {
        self.life
            .max_children
            .map(|n| n as usize)
            .unwrap_or_else(|| scaled(BASE_MAX_CHILDREN, self.life.max_children_factor) as usize)
    }

    /// Age at which death is certain.
    pub fn max_age(&self) -> i32 {
        self.life
            .max_age
            .unwrap_or_else(|| scaled(BASE_MAX_AGE, self.life.max_age_factor))
    }

    pub fn pregnancy_chance(&self) -> f64 {
        (BASE_PREGNANCY_CHANCE * self.life.pregnancy_chance_factor).clamp(0.0, 1.0)
    }

    pub fn infant_mortality(&self) -> f64 {
        (BASE_INFANT_MORTALITY * self.life.mortality_factor).clamp(0.0, 1.0)
    }

    pub fn base_mortality(&self) -> f64 {
        BASE_ADULT_MORTALITY * self.life.mortality_factor
    }

    // --- Traits ---

    pub fn is_positive_trait(&self, t: &str) -> bool {
        self.positive_traits.iter().any(|p| p == t)
    }

    pub fn is_negative_trait(&self, t: &str) -> bool {
        self.negative_traits.iter().any(|n| n == t)
    }
}
