use rand::Rng;
use rand::RngCore;
use rand::seq::SliceRandom;

use super::names;
use super::tree::{FamilyTree, NewPerson};
use crate::id::PersonId;
use crate::model::Gender;

const AVERAGE_AGE_JITTER: i32 = 3;
const MAX_YOUNGER_WIFE: i32 = 8;
const MAX_OLDER_HUSBAND: i32 = 10;
const MAX_SPOUSE_TRAITS: usize = 2;
const PLACEHOLDER_PARENTS_CHANCE: f64 = 0.6;

/// Birth year for an arranged spouse, inside the spouse's marriage-age bounds.
fn spouse_birth_year(
    tree: &FamilyTree,
    seeker_gender: Gender,
    seeker_age: i32,
    year: i32,
    rng: &mut dyn RngCore,
) -> i32 {
    let theme = tree.theme();
    let spouse_gender = seeker_gender.opposite();
    let age = match theme.life.average_marriage_age {
        Some(avg) => avg + rng.random_range(-AVERAGE_AGE_JITTER..=AVERAGE_AGE_JITTER),
        None => match seeker_gender {
            Gender::Male => seeker_age - rng.random_range(0..=MAX_YOUNGER_WIFE),
            Gender::Female => seeker_age + rng.random_range(0..=MAX_OLDER_HUSBAND),
        },
    };
    let min = theme.min_marriage_age();
    let max = theme.max_marriage_age(spouse_gender).max(min);
    year - age.clamp(min, max)
}

/// Two deceased placeholder parents so the imported spouse has a lineage.
fn add_placeholder_parents(
    tree: &mut FamilyTree,
    surname: &str,
    spouse_birth: i32,
    year: i32,
    rng: &mut dyn RngCore,
) -> (PersonId, PersonId) {
    let last_death = year.max(spouse_birth + 1);
    let mut ids = [PersonId(0); 2];
    for (slot, (gender, min_gap, max_gap)) in
        [(Gender::Male, 20, 40), (Gender::Female, 18, 35)].into_iter().enumerate()
    {
        let name = names::random_given_name(tree.theme(), gender, rng);
        let born = spouse_birth - rng.random_range(min_gap..=max_gap);
        let died = rng.random_range(spouse_birth + 1..=last_death);
        ids[slot] = tree.add_person(
            NewPerson::new(name, surname, gender, born)
                .died(died)
                .placeholder(),
        );
    }
    (ids[0], ids[1])
}

/// Generate a suitable spouse from another house and marry them to `seeker`.
///
/// Returns the new spouse when the marriage took place. A refused marriage
/// leaves the generated spouse registered and unmarried.
pub fn arrange_marriage(
    tree: &mut FamilyTree,
    seeker: PersonId,
    year: i32,
    rng: &mut dyn RngCore,
) -> Option<PersonId> {
    let person = tree.person(seeker)?;
    if !person.can_marry(year, tree.theme()) {
        return None;
    }
    let seeker_gender = person.gender;
    let seeker_age = person.age(year);
    let seeker_house = person.surname.clone();

    let spouse_gender = seeker_gender.opposite();
    let name = names::random_given_name(tree.theme(), spouse_gender, rng);
    let house = names::random_house(
        tree.theme(),
        &[seeker_house.as_str(), tree.dynasty_name()],
        rng,
    );
    let birth_year = spouse_birth_year(tree, seeker_gender, seeker_age, year, rng);

    let mut pool = tree.theme().common_traits.clone();
    pool.shuffle(rng);
    let count = rng.random_range(0..=MAX_SPOUSE_TRAITS.min(pool.len()));
    pool.truncate(count);

    let parents = if rng.random_bool(PLACEHOLDER_PARENTS_CHANCE) {
        let (father, mother) = add_placeholder_parents(tree, &house, birth_year, year, rng);
        (Some(father), Some(mother))
    } else {
        (None, None)
    };

    let spouse = tree.add_person(
        NewPerson::new(name, house, spouse_gender, birth_year)
            .traits(pool)
            .child_of(parents.0, parents.1),
    );
    if tree.marry(seeker, spouse, year) {
        Some(spouse)
    } else {
        tracing::info!(%seeker, %spouse, year, "arranged marriage skipped");
        None
    }
}
