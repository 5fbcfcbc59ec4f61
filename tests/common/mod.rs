#![allow(dead_code)]

use dynasty_sim::scenario::Scenario;
use dynasty_sim::{FamilyTree, Gender, NewPerson, PersonId, SimConfig, Theme};

/// Default theme with mortality switched off.
pub fn immortal_theme() -> Theme {
    let mut theme = Theme::default();
    theme.life.mortality_factor = 0.0;
    theme
}

/// A founder (male, 30) and his consort (female, 28), crowned in `year`.
pub fn founded_dynasty(theme: Theme, year: i32) -> (FamilyTree, PersonId) {
    let mut tree = FamilyTree::new("Stonemark", theme, year);
    let founder = tree.found_dynasty(
        NewPerson::new("Aldric", "Stonemark", Gender::Male, year - 30),
        Some(NewPerson::new("Isolde", "Ravencrest", Gender::Female, year - 28)),
        year,
    );
    (tree, founder)
}

/// No world events, no newcomers, no pruning.
pub fn quiet_config(start_year: i32, num_years: u32, seed: u64) -> SimConfig {
    SimConfig::new(start_year, num_years, seed)
        .with_world_events(false)
        .with_new_noble_chance(0.0)
        .with_pruning(0, 6)
}

pub struct RoyalFamily {
    pub grandfather: PersonId,
    pub king: PersonId,
    pub queen: PersonId,
    pub uncle: PersonId,
    pub cousin: PersonId,
    pub daughter: PersonId,
    pub son: PersonId,
    pub grandson: PersonId,
}

/// Three generations around a reigning king in year 1000:
///
/// ```text
/// grandfather (dead)
/// ├── king ── queen
/// │   ├── daughter (b. 980)
/// │   └── son (b. 982)
/// │       └── grandson (b. 999)
/// └── uncle
///     └── cousin
/// ```
pub fn royal_family(s: &mut Scenario) -> RoyalFamily {
    let grandfather = s.person("Osric", Gender::Male).born(920).died(990).id();
    let king = s.person("Henry", Gender::Male).born(950).child_of(Some(grandfather), None).id();
    let queen = s.person("Matilda", Gender::Female).surname("Ravencrest").born(955).id();
    s.marry(king, queen);
    s.crown(king);
    let uncle = s.person("Geoffrey", Gender::Male).born(953).child_of(Some(grandfather), None).id();
    let cousin = s.person("Walter", Gender::Male).born(978).child_of(Some(uncle), None).id();
    let daughter = s
        .person("Adela", Gender::Female)
        .born(980)
        .child_of(Some(king), Some(queen))
        .id();
    let son = s
        .person("Edmund", Gender::Male)
        .born(982)
        .child_of(Some(king), Some(queen))
        .id();
    let grandson = s.person("Robert", Gender::Male).born(999).child_of(Some(son), None).id();
    RoyalFamily {
        grandfather,
        king,
        queen,
        uncle,
        cousin,
        daughter,
        son,
        grandson,
    }
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
