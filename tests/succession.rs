mod common;

use dynasty_sim::model::HistoryKind;
use dynasty_sim::scenario::Scenario;
use dynasty_sim::{Gender, SuccessionRule, find_next_monarch};

use common::royal_family;

#[test]
fn lone_monarch_death_leaves_throne_vacant() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(960).id();
    let queen = s.person("Matilda", Gender::Female).surname("Ravencrest").born(962).id();
    s.marry(king, queen);
    s.crown(king);
    let mut tree = s.build();
    tree.person_mut(king).unwrap().death_year = Some(1000);

    assert_eq!(tree.process_succession(king, 1000), None);
    assert_eq!(tree.current_monarch(), None);
    assert_eq!(tree.vacant_since(), Some(1000));
    assert!(tree.persons().all(|p| !p.is_monarch));
    let crisis: Vec<_> = tree
        .history()
        .entries_of_kind(&HistoryKind::SuccessionCrisis)
        .collect();
    assert_eq!(crisis.len(), 1);
    assert_eq!(crisis[0].person1, Some(king));
    assert_eq!(crisis[0].kind.as_str(), "succession_crisis");
}

#[test]
fn succession_closes_the_dead_reign() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(950).id();
    let queen = s.person("Matilda", Gender::Female).surname("Ravencrest").born(955).id();
    s.marry(king, queen);
    s.crown(king);
    let son = s.person("Edmund", Gender::Male).born(980).child_of(Some(king), Some(queen)).id();
    let mut tree = s.build();
    tree.person_mut(king).unwrap().death_year = Some(1003);

    assert_eq!(tree.process_succession(king, 1003), Some(son));
    let old = tree.person(king).unwrap();
    assert!(!old.is_monarch);
    assert_eq!(old.reign_end_year, Some(1003));
    assert!(tree.person(queen).unwrap().spouse.is_none());
    for p in tree.persons().filter(|p| p.death_year.is_some()) {
        assert!(!p.is_monarch, "{} is dead and flagged", p.id);
    }
    assert!(tree.invariant_violations().is_empty(), "{:?}", tree.invariant_violations());
}

#[test]
fn dead_heir_loses_heir_title() {
    let mut s = Scenario::at_year(1000);
    let f = royal_family(&mut s);
    let mut tree = s.build();
    assert_eq!(tree.designate_heir(1000), Some(f.son));

    tree.kill(f.son, 1002);
    assert_eq!(tree.heir_apparent(), None);
    assert!(!tree.person(f.son).unwrap().has_title("Crown Prince"));
    assert!(
        tree.history()
            .entries_of_kind(&HistoryKind::TitleRevoked)
            .any(|e| e.person1 == Some(f.son))
    );
}

#[test]
fn male_preference_picks_younger_son_over_elder_daughter() {
    let mut s = Scenario::at_year(1000).rule(SuccessionRule::PrimogenitureMalePreference);
    let king = s.person("Henry", Gender::Male).born(950).id();
    s.crown(king);
    let daughter = s.person("Adela", Gender::Female).born(980).child_of(Some(king), None).id();
    let son = s.person("Edmund", Gender::Male).born(982).child_of(Some(king), None).id();
    s.kill(king);
    let mut tree = s.build();

    assert_eq!(
        find_next_monarch(&tree, king, SuccessionRule::PrimogenitureMalePreference, 1000),
        Some(son)
    );
    assert_eq!(tree.process_succession(king, 1000), Some(son));
    assert_eq!(tree.current_monarch(), Some(son));
    let heir = tree.person(son).unwrap();
    assert!(heir.is_monarch);
    assert_eq!(heir.reign_start_year, Some(1000));
    assert_eq!(heir.primary_title(), Some("King"));
    assert!(!tree.person(daughter).unwrap().is_monarch);
    assert_eq!(tree.monarch_history(), &[king, son]);
}

#[test]
fn absolute_primogeniture_picks_eldest_child() {
    let mut s = Scenario::at_year(1000);
    let f = royal_family(&mut s);
    let tree = s.build();

    assert_eq!(
        find_next_monarch(&tree, f.king, SuccessionRule::PrimogenitureAbsolute, 1000),
        Some(f.daughter)
    );
    assert_eq!(
        find_next_monarch(&tree, f.king, SuccessionRule::PrimogenitureMalePreference, 1000),
        Some(f.son)
    );
}

#[test]
fn dead_heir_passes_claim_to_own_child_first() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(940).id();
    s.crown(king);
    let eldest = s.person("Edmund", Gender::Male).born(965).died(995).child_of(Some(king), None).id();
    let grandson = s.person("Robert", Gender::Male).born(990).child_of(Some(eldest), None).id();
    let younger = s.person("Hugh", Gender::Male).born(968).child_of(Some(king), None).id();
    let tree = s.build();

    let heir = find_next_monarch(&tree, king, SuccessionRule::PrimogenitureMalePreference, 1000);
    assert_eq!(heir, Some(grandson));
    assert_ne!(heir, Some(younger));
}

#[test]
fn childless_king_is_followed_by_collateral_line() {
    let mut s = Scenario::at_year(1000);
    let father = s.person("Osric", Gender::Male).born(920).died(980).id();
    let king = s.person("Henry", Gender::Male).born(950).child_of(Some(father), None).id();
    s.crown(king);
    let brother = s
        .person("Geoffrey", Gender::Male)
        .born(953)
        .died(998)
        .child_of(Some(father), None)
        .id();
    let nephew = s.person("Walter", Gender::Male).born(978).child_of(Some(brother), None).id();
    let tree = s.build();

    for rule in [
        SuccessionRule::PrimogenitureMalePreference,
        SuccessionRule::PrimogenitureAbsolute,
    ] {
        assert_eq!(find_next_monarch(&tree, king, rule, 1000), Some(nephew));
    }
}

#[test]
fn commoners_and_placeholders_never_inherit() {
    let mut s = Scenario::at_year(1000);
    let king = s.person("Henry", Gender::Male).born(950).id();
    s.crown(king);
    s.person("Tom", Gender::Male).born(975).commoner().child_of(Some(king), None).id();
    s.person("Ghost", Gender::Male)
        .born(976)
        .with(|p| p.is_placeholder_ancestor = true)
        .child_of(Some(king), None)
        .id();
    let tree = s.build();

    assert_eq!(
        find_next_monarch(&tree, king, SuccessionRule::PrimogenitureMalePreference, 1000),
        None
    );
}

#[test]
fn resolver_is_deterministic() {
    let mut s = Scenario::at_year(1000);
    let f = royal_family(&mut s);
    let tree = s.build();

    for rule in SuccessionRule::ALL {
        let first = find_next_monarch(&tree, f.king, *rule, 1000);
        for _ in 0..10 {
            assert_eq!(find_next_monarch(&tree, f.king, *rule, 1000), first);
        }
    }
}

#[test]
fn council_elects_best_scored_noble() {
    let mut s = Scenario::at_year(1000).rule(SuccessionRule::ElectiveNobleCouncil);
    let king = s.person("Henry", Gender::Male).born(940).id();
    s.crown(king);
    s.person("Hugh", Gender::Male).born(960).traits(&["cruel", "greedy"]).id();
    let wise = s
        .person("Agnes", Gender::Female)
        .surname("Ashford")
        .born(962)
        .traits(&["wise", "just"])
        .id();
    // too young to sit the throne regardless of traits
    s.person("Ralph", Gender::Male).born(990).traits(&["brave", "wise", "just"]).id();
    s.kill(king);
    let mut tree = s.build();

    assert_eq!(tree.process_succession(king, 1000), Some(wise));
    assert!(tree.person(wise).unwrap().has_title("Queen"));
}

#[test]
fn council_ties_go_to_the_elder() {
    let mut s = Scenario::at_year(1000).rule(SuccessionRule::ElectiveNobleCouncil);
    let king = s.person("Henry", Gender::Male).born(940).id();
    s.crown(king);
    s.person("Hugh", Gender::Male).born(962).id();
    let elder = s.person("Walter", Gender::Male).born(960).id();
    let tree = s.build();

    assert_eq!(
        find_next_monarch(&tree, king, SuccessionRule::ElectiveNobleCouncil, 1000),
        Some(elder)
    );
}

#[test]
fn heir_apparent_tracks_the_line() {
    let mut s = Scenario::at_year(1000);
    let f = royal_family(&mut s);
    let mut tree = s.build();

    assert_eq!(tree.designate_heir(1000), Some(f.son));
    assert!(tree.person(f.son).unwrap().has_title("Crown Prince"));

    tree.kill(f.son, 1001);
    assert_eq!(tree.designate_heir(1001), Some(f.grandson));
    assert!(tree.person(f.grandson).unwrap().has_title("Crown Prince"));
    assert_eq!(
        tree.history()
            .entries_of_kind(&HistoryKind::HeirDesignated)
            .count(),
        2
    );
}
