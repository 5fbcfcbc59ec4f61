use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

use dynasty_sim::family::names;
use dynasty_sim::{FamilyTree, Gender, NewPerson, SimConfig, SuccessionRule, Theme, run};

const FOUNDER_AGE: i32 = 30;
const CONSORT_AGE: i32 = 28;

/// Simulate the rise and fall of a noble house, one year at a time.
#[derive(Parser, Debug)]
#[command(name = "dynasty-sim")]
#[command(about = "Simulate a dynasty's births, marriages, deaths and successions")]
struct Args {
    /// Random seed (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of years to simulate
    #[arg(short, long, default_value_t = 200)]
    years: u32,

    /// First simulated year
    #[arg(long, default_value_t = 1000)]
    start_year: i32,

    /// Dynasty name (drawn from the theme's surnames if not specified)
    #[arg(short, long)]
    dynasty: Option<String>,

    /// Theme JSON file (built-in medieval theme if not specified)
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Succession rule, overriding the theme's default
    #[arg(long)]
    rule: Option<SuccessionRule>,

    /// Directory for JSONL checkpoints
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a checkpoint every N years (requires --output)
    #[arg(long, default_value_t = 25)]
    flush_interval: u32,

    /// Show per-person debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Number of chronicle lines to print at the end
    #[arg(long, default_value_t = 30)]
    tail: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let theme = match &args.theme {
        Some(path) => Theme::from_path(path)?,
        None => Theme::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    // Separate stream for the founding couple so the run itself depends only on the seed.
    let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);

    let dynasty = match &args.dynasty {
        Some(name) => name.clone(),
        None => names::random_house(&theme, &[], &mut rng),
    };
    let founder_name = names::random_given_name(&theme, Gender::Male, &mut rng);
    let consort_name = names::random_given_name(&theme, Gender::Female, &mut rng);
    let consort_house = names::random_house(&theme, &[dynasty.as_str()], &mut rng);

    let mut tree = FamilyTree::new(dynasty.clone(), theme, args.start_year);
    if let Some(rule) = args.rule {
        tree.set_succession_rule(rule);
    }
    tree.found_dynasty(
        NewPerson::new(founder_name, dynasty.clone(), Gender::Male, args.start_year - FOUNDER_AGE),
        Some(NewPerson::new(
            consort_name,
            consort_house,
            Gender::Female,
            args.start_year - CONSORT_AGE,
        )),
        args.start_year,
    );

    let mut config = SimConfig::new(args.start_year, args.years, seed);
    if let Some(dir) = &args.output {
        config = config.with_flush(args.flush_interval, dir);
    }

    println!(
        "House {dynasty}, seed {seed}, rule {}, {} years from {}",
        tree.succession_rule(),
        args.years,
        args.start_year
    );
    let summary = run(&mut tree, &config)?;

    println!();
    let chronicle = tree.history().chronicle();
    let skip = chronicle.len().saturating_sub(args.tail);
    for line in &chronicle[skip..] {
        println!("{line}");
    }

    println!();
    println!(
        "{:>4} {:>6} {:>7} {:>7} {:>9} {:>12} {:>7}",
        "gen", "start", "births", "deaths", "marriages", "successions", "pruned"
    );
    for g in tree.history().all_generations() {
        let start = g.start_year.map_or_else(|| "-".to_string(), |y| y.to_string());
        println!(
            "{:>4} {:>6} {:>7} {:>7} {:>9} {:>12} {:>7}",
            g.generation, start, g.births, g.deaths, g.marriages, g.successions, g.pruned
        );
    }

    println!();
    let monarch = tree
        .current_monarch()
        .map_or_else(|| "none".to_string(), |id| tree.display_name(id));
    println!(
        "Simulated {} years to {}. Extinct: {}. Population {}, {} pruned, {} monarchs. Reigning: {monarch}.",
        summary.years_simulated,
        summary.final_year,
        summary.extinct,
        tree.population(),
        summary.pruned,
        tree.monarch_history().len(),
    );
    Ok(())
}
