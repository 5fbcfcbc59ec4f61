use std::path::PathBuf;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;

use super::world_events::roll_world_event;
use crate::error::SimError;
use crate::family::names;
use crate::family::{FamilyTree, NewPerson, prune_distant_relatives};
use crate::flush::flush_to_jsonl;
use crate::id::PersonId;
use crate::model::{Gender, HistoryKind};

const NEWCOMER_MIN_AGE: i32 = 16;
const NEWCOMER_MAX_AGE: i32 = 35;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub start_year: i32,
    pub num_years: u32,
    pub seed: u64,
    /// Prune every N years; 0 disables pruning.
    pub pruning_interval: u32,
    pub pruning_max_distance: u32,
    pub generation_length: u32,
    /// Chance per generation boundary that 1–3 unrelated nobles arrive.
    pub new_noble_chance: f64,
    /// Years a vacant throne with no living nobles is tolerated before the
    /// dynasty is declared extinct.
    pub extinction_grace_years: u32,
    pub world_events_enabled: bool,
    /// If set, flush the tree every N years.
    pub flush_interval: Option<u32>,
    /// Directory to write flush checkpoints into.
    pub output_dir: Option<PathBuf>,
}

impl SimConfig {
    pub fn new(start_year: i32, num_years: u32, seed: u64) -> Self {
        Self {
            start_year,
            num_years,
            seed,
            pruning_interval: 10,
            pruning_max_distance: 6,
            generation_length: 25,
            new_noble_chance: 0.3,
            extinction_grace_years: 5,
            world_events_enabled: true,
            flush_interval: None,
            output_dir: None,
        }
    }

    pub fn with_pruning(mut self, interval: u32, max_distance: u32) -> Self {
        self.pruning_interval = interval;
        self.pruning_max_distance = max_distance;
        self
    }

    pub fn with_generation_length(mut self, years: u32) -> Self {
        self.generation_length = years;
        self
    }

    pub fn with_new_noble_chance(mut self, chance: f64) -> Self {
        self.new_noble_chance = chance;
        self
    }

    pub fn with_extinction_grace(mut self, years: u32) -> Self {
        self.extinction_grace_years = years;
        self
    }

    pub fn with_world_events(mut self, enabled: bool) -> Self {
        self.world_events_enabled = enabled;
        self
    }

    pub fn with_flush(mut self, interval: u32, dir: impl Into<PathBuf>) -> Self {
        self.flush_interval = Some(interval);
        self.output_dir = Some(dir.into());
        self
    }

    fn offset(&self, year: i32) -> i32 {
        year - self.start_year
    }

    fn is_generation_boundary(&self, year: i32) -> bool {
        let offset = self.offset(year);
        self.generation_length > 0 && offset > 0 && offset % self.generation_length as i32 == 0
    }

    fn is_pruning_year(&self, year: i32) -> bool {
        let offset = self.offset(year);
        self.pruning_interval > 0 && offset > 0 && offset % self.pruning_interval as i32 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Continue,
    Extinct,
}

/// What happened during one simulated year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    pub population: usize,
    pub pruned: usize,
    pub world_event: Option<String>,
    pub newcomers: Vec<PersonId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub years_simulated: u32,
    pub final_year: i32,
    pub extinct: bool,
    /// Population recorded at the end of each simulated year.
    pub population_by_year: Vec<(i32, usize)>,
    pub pruned: usize,
}

/// Bring 1–3 unrelated nobles of other houses to court.
fn inject_nobles(tree: &mut FamilyTree, year: i32, rng: &mut dyn RngCore) -> Vec<PersonId> {
    let count = rng.random_range(1..=3);
    let mut arrived = Vec::with_capacity(count);
    for _ in 0..count {
        let gender = if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let name = names::random_given_name(tree.theme(), gender, rng);
        let house = names::random_house(tree.theme(), &[tree.dynasty_name()], rng);
        let born = year - rng.random_range(NEWCOMER_MIN_AGE..=NEWCOMER_MAX_AGE);
        let mut traits = tree.theme().common_traits.clone();
        traits.shuffle(rng);
        traits.truncate(rng.random_range(0..=2));

        let id = tree.add_person(NewPerson::new(name, house, gender, born).traits(traits));
        let subject = tree.display_name(id);
        let text = tree.narrate(&HistoryKind::NobleArrived, &subject, None, year, None);
        tree.history_mut()
            .record(Some(year), HistoryKind::NobleArrived, text, Some(id), None);
        arrived.push(id);
    }
    tracing::info!(year, count, "nobles arrived at court");
    arrived
}

fn is_extinct(tree: &FamilyTree, config: &SimConfig, year: i32) -> bool {
    if tree.current_monarch().is_some() {
        return false;
    }
    let vacant_since = tree.vacant_since().unwrap_or(config.start_year);
    year - vacant_since >= config.extinction_grace_years as i32
        && tree.living_nobles(year).is_empty()
}

/// Advance the tree by one year.
pub fn process_turn(
    tree: &mut FamilyTree,
    config: &SimConfig,
    year: i32,
    rng: &mut dyn RngCore,
) -> TurnReport {
    tree.set_current_year(year);
    tree.ensure_living_monarch(year);

    // (a) world events
    tree.expire_effects(year);
    let world_event = if config.world_events_enabled {
        roll_world_event(tree, year, rng)
    } else {
        None
    };

    // (b) everyone alive at the start of the year
    for id in tree.person_ids() {
        tree.process_yearly_events_for_person(id, year, rng);
    }

    // (c) generations and newcomers
    let mut newcomers = Vec::new();
    if config.is_generation_boundary(year) {
        tree.history_mut().start_generation(year);
        let name = tree.dynasty_name().to_string();
        let text = tree.narrate(&HistoryKind::Generation, &name, None, year, None);
        tree.history_mut()
            .record(Some(year), HistoryKind::Generation, text, None, None);
        if config.new_noble_chance > 0.0 && rng.random_bool(config.new_noble_chance.min(1.0)) {
            newcomers = inject_nobles(tree, year, rng);
        }
    }

    // (d) population before pruning
    let population = tree.population();

    // (e) pruning
    let pruned = if config.is_pruning_year(year) {
        prune_distant_relatives(tree, config.pruning_max_distance, year).count()
    } else {
        0
    };

    if tree.current_monarch().is_some() {
        tree.designate_heir(year);
    }

    // (g) extinction
    let outcome = if is_extinct(tree, config, year) {
        tracing::info!(year, dynasty = tree.dynasty_name(), "dynasty extinct");
        TurnOutcome::Extinct
    } else {
        TurnOutcome::Continue
    };

    TurnReport {
        outcome,
        population,
        pruned,
        world_event,
        newcomers,
    }
}

/// Run the simulation for the configured number of years.
///
/// Creates a deterministic RNG from `config.seed`, so the same seed always
/// produces the same history.
pub fn run(tree: &mut FamilyTree, config: &SimConfig) -> Result<RunSummary, SimError> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    run_with_rng(tree, config, &mut rng)
}

/// [`run`] with a caller-supplied random source.
pub fn run_with_rng(
    tree: &mut FamilyTree,
    config: &SimConfig,
    rng: &mut dyn RngCore,
) -> Result<RunSummary, SimError> {
    let mut summary = RunSummary {
        final_year: config.start_year,
        ..RunSummary::default()
    };

    for year_offset in 0..config.num_years {
        let year = config.start_year + year_offset as i32;
        let report = process_turn(tree, config, year, rng);

        summary.years_simulated += 1;
        summary.final_year = year;
        summary.population_by_year.push((year, report.population));
        summary.pruned += report.pruned;
        let extinct = report.outcome == TurnOutcome::Extinct;

        // Flush checkpoint at configured interval
        if let (Some(interval), Some(dir)) = (config.flush_interval, &config.output_dir) {
            let is_last_year = extinct || year_offset == config.num_years - 1;
            if is_last_year || (interval > 0 && (year_offset + 1) % interval == 0) {
                let checkpoint_dir = dir.join(format!("year_{year:06}"));
                flush_to_jsonl(tree, &checkpoint_dir).map_err(|source| SimError::Checkpoint {
                    path: checkpoint_dir.clone(),
                    source,
                })?;
                tracing::debug!(year, dir = %checkpoint_dir.display(), "checkpoint written");
            }
        }

        if extinct {
            summary.extinct = true;
            break;
        }
    }

    tracing::info!(
        years = summary.years_simulated,
        final_year = summary.final_year,
        extinct = summary.extinct,
        pruned = summary.pruned,
        population = tree.population(),
        "simulation finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    fn dynasty(theme: Theme) -> FamilyTree {
        let mut tree = FamilyTree::new("Stonemark", theme, 1000);
        tree.found_dynasty(
            NewPerson::new("Henry", "Stonemark", Gender::Male, 970),
            Some(NewPerson::new("Matilda", "Ravencrest", Gender::Female, 972)),
            1000,
        );
        tree
    }

    #[test]
    fn cadence_helpers() {
        let config = SimConfig::new(1000, 100, 0);
        assert!(!config.is_generation_boundary(1000));
        assert!(config.is_generation_boundary(1025));
        assert!(!config.is_generation_boundary(1026));
        assert!(config.is_pruning_year(1010));
        assert!(!config.is_pruning_year(1000));
        let off = config.with_pruning(0, 6).with_generation_length(0);
        assert!(!off.is_pruning_year(1010));
        assert!(!off.is_generation_boundary(1025));
    }

    #[test]
    fn generation_rollover_and_newcomers() {
        let mut theme = Theme::default();
        theme.life.mortality_factor = 0.0;
        let mut tree = dynasty(theme);
        let config = SimConfig::new(1000, 30, 1)
            .with_world_events(false)
            .with_new_noble_chance(1.0)
            .with_pruning(0, 6);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut newcomers = Vec::new();
        for year in 1000..1026 {
            newcomers.extend(process_turn(&mut tree, &config, year, &mut rng).newcomers);
        }
        assert_eq!(tree.history().completed_generations().len(), 1);
        assert!((1..=3).contains(&newcomers.len()));
        for id in newcomers {
            let p = tree.person(id).unwrap();
            assert!(p.is_noble);
            assert_ne!(p.surname, "Stonemark");
        }
    }

    #[test]
    fn vacant_throne_without_nobles_goes_extinct() {
        let mut tree = dynasty(Theme::default());
        let king = tree.current_monarch().unwrap();
        let queen = tree.person(king).and_then(|p| p.spouse).unwrap();
        tree.kill(king, 1000);
        tree.kill(queen, 1000);
        let config = SimConfig::new(1000, 20, 3)
            .with_world_events(false)
            .with_new_noble_chance(0.0)
            .with_extinction_grace(2);
        let summary = run(&mut tree, &config).unwrap();
        assert!(summary.extinct);
        assert_eq!(summary.final_year, 1002);
        assert_eq!(summary.years_simulated, 3);
    }

    #[test]
    fn same_seed_same_history() {
        let config = SimConfig::new(1000, 60, 42);
        let mut a = dynasty(Theme::default());
        let mut b = dynasty(Theme::default());
        let sa = run(&mut a, &config).unwrap();
        let sb = run(&mut b, &config).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(a.history().chronicle(), b.history().chronicle());
    }

    #[test]
    fn at_most_one_monarch_every_year() {
        let config = SimConfig::new(1000, 1, 0);
        let mut tree = dynasty(Theme::default());
        let mut rng = SmallRng::seed_from_u64(9);
        for year in 1000..1150 {
            let report = process_turn(&mut tree, &config, year, &mut rng);
            assert!(tree.persons().filter(|p| p.is_monarch).count() <= 1);
            assert!(tree.invariant_violations().is_empty(), "{:?}", tree.invariant_violations());
            if report.outcome == TurnOutcome::Extinct {
                break;
            }
        }
    }
}
