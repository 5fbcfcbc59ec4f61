mod common;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use dynasty_sim::model::HistoryKind;
use dynasty_sim::scenario::Scenario;
use dynasty_sim::{Gender, TurnOutcome, process_turn, run};

use common::{founded_dynasty, immortal_theme, quiet_config};

#[test]
fn age_is_clamped_at_death_and_never_negative() {
    let mut s = Scenario::at_year(1000);
    let id = s.person("Osric", Gender::Male).born(1000).died(1050).id();
    let tree = s.build();
    let p = tree.person(id).unwrap();

    assert_eq!(p.age(1050), 50);
    assert_eq!(p.age(1060), 50);
    assert_eq!(p.age(990), 0);
    assert!(p.is_alive(1000));
    assert!(p.is_alive(1049));
    assert!(!p.is_alive(1050));
    assert!(!p.is_alive(1100));
}

#[test]
fn spouse_links_stay_symmetric() {
    let mut s = Scenario::at_year(1000);
    let a = s.person("Henry", Gender::Male).born(975).id();
    let b = s.person("Matilda", Gender::Female).surname("Ravencrest").born(978).id();
    let c = s.person("Agnes", Gender::Female).surname("Ashford").born(980).id();
    let mut tree = s.build();

    assert!(tree.marry(a, b, 1000));
    assert_eq!(tree.person(a).unwrap().spouse, Some(b));
    assert_eq!(tree.person(b).unwrap().spouse, Some(a));
    assert!(!tree.marry(a, c, 1000), "already married");
    assert!(tree.person(c).unwrap().spouse.is_none());

    tree.clear_spouse(b);
    assert!(tree.person(a).unwrap().spouse.is_none());
    assert!(tree.person(b).unwrap().spouse.is_none());
    assert!(tree.marry(a, c, 1001));
    assert!(tree.invariant_violations().is_empty());
    assert_eq!(tree.alliances().len(), 2);
}

#[test]
fn immortal_dynasty_grows_under_its_founder() {
    let (mut tree, founder) = founded_dynasty(immortal_theme(), 1000);
    let config = quiet_config(1000, 50, 7);
    let mut rng = SmallRng::seed_from_u64(config.seed);

    let mut last = tree.population();
    for year in 1000..1050 {
        let report = process_turn(&mut tree, &config, year, &mut rng);
        assert_eq!(report.outcome, TurnOutcome::Continue);
        assert!(report.population >= last, "population shrank in {year}");
        last = report.population;
        assert_eq!(tree.current_monarch(), Some(founder));
        assert!(tree.person(founder).unwrap().is_monarch);
    }

    assert!(tree.population() > 2);
    assert_eq!(tree.history().entries_of_kind(&HistoryKind::Death).count(), 0);
    assert!(tree.history().entries_of_kind(&HistoryKind::Birth).count() > 2);
    assert!(tree.person(founder).unwrap().children.len() >= 1);
}

#[test]
fn long_run_keeps_invariants() {
    for seed in [1, 2, 3] {
        let (mut tree, _) = founded_dynasty(dynasty_sim::Theme::default(), 1000);
        let config = dynasty_sim::SimConfig::new(1000, 1, seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        for year in 1000..1200 {
            let report = process_turn(&mut tree, &config, year, &mut rng);
            assert!(tree.persons().filter(|p| p.is_monarch).count() <= 1);
            let violations = tree.invariant_violations();
            assert!(violations.is_empty(), "seed {seed}, {year}: {violations:?}");
            if report.outcome == TurnOutcome::Extinct {
                break;
            }
        }
    }
}

#[test]
fn same_seed_same_chronicle() {
    let config = dynasty_sim::SimConfig::new(1000, 120, 99);
    let (mut a, _) = founded_dynasty(dynasty_sim::Theme::default(), 1000);
    let (mut b, _) = founded_dynasty(dynasty_sim::Theme::default(), 1000);

    let sa = run(&mut a, &config).unwrap();
    let sb = run(&mut b, &config).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(a.history().chronicle(), b.history().chronicle());
    assert_eq!(a.current_monarch(), b.current_monarch());
}

#[test]
fn barren_court_dies_out_after_grace() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(930).id();
    s.crown(king);
    s.kill(king);
    let config = quiet_config(1000, 50, 0).with_extinction_grace(3);
    let (tree, summary) = s.run_with(&config).unwrap();

    assert!(summary.extinct);
    assert_eq!(summary.final_year, 1003);
    assert!(tree.current_monarch().is_none());
}

#[test]
fn turn_loop_replaces_a_monarch_found_dead() {
    let mut s = Scenario::at_year(1000).theme(immortal_theme());
    let king = s.person("Henry", Gender::Male).born(950).id();
    s.crown(king);
    let son = s.person("Edmund", Gender::Male).born(975).child_of(Some(king), None).id();
    let mut tree = s.build();
    tree.person_mut(king).unwrap().death_year = Some(1000);

    let config = quiet_config(1000, 5, 3);
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let report = process_turn(&mut tree, &config, 1000, &mut rng);

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert_eq!(tree.current_monarch(), Some(son));
    assert!(tree.person(son).unwrap().is_monarch);
    assert!(!tree.person(king).unwrap().is_monarch);
    assert_eq!(tree.person(king).unwrap().reign_end_year, Some(1000));
    assert!(tree.invariant_violations().is_empty(), "{:?}", tree.invariant_violations());
}

#[test]
fn heirless_monarch_found_dead_lets_dynasty_die_out() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(950).id();
    s.crown(king);
    let mut tree = s.build();
    tree.person_mut(king).unwrap().death_year = Some(1000);

    let config = quiet_config(1000, 30, 0).with_extinction_grace(2);
    let summary = run(&mut tree, &config).unwrap();

    assert!(summary.extinct);
    assert_eq!(summary.final_year, 1002);
    assert!(tree.persons().all(|p| !p.is_monarch));
}
