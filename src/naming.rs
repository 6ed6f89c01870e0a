//! Name and number supply for towns, streets, rural roads and routes
//!
//! The generator only talks to the `NameSource` trait. `DictionaryNames` is
//! the stock implementation: compound dictionaries shuffled once per seed and
//! handed out in order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::seeds::derive_seed;

/// Parity wanted for a new route number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParityPreference {
    None,
    Odd,
    Even,
}

/// Supplier of fresh names and numbers during generation.
///
/// Implementations must not repeat a name until their dictionaries run out,
/// and route numbers must strictly increase.
pub trait NameSource {
    fn next_town_name(&mut self) -> String;
    fn next_street_name(&mut self) -> String;
    fn next_rural_road_name(&mut self) -> String;
    fn next_route_number(&mut self, parity: ParityPreference) -> u32;
}

const TOWN_PREFIXES: &[&str] = &[
    "Ash", "Bay", "Birch", "Black", "Bright", "Cedar", "Clear", "Cold", "Copper", "Crow",
    "Deer", "East", "Elm", "Fair", "Fern", "Fox", "Glen", "Gold", "Granite", "Green",
    "Hawk", "Hazel", "High", "Holly", "Iron", "Lark", "Long", "Maple", "Marsh", "Mill",
    "North", "Oak", "Pine", "Red", "Rock", "Salt", "Sand", "Silver", "South", "Stone",
    "Sun", "Swan", "Thorn", "West", "White", "Willow", "Wolf", "Wren",
];

const TOWN_SUFFIXES: &[&str] = &[
    "bridge", "brook", "burg", "dale", "field", "ford", "gate", "haven", "hill", "hollow",
    "mere", "mont", "port", "ridge", "stead", "ton", "vale", "ville", "water", "wood",
];

const STREET_BASES: &[&str] = &[
    "Acorn", "Adams", "Beacon", "Bridge", "Broad", "Canal", "Center", "Chapel", "Cherry",
    "Church", "College", "Court", "Dock", "Elm", "Franklin", "Front", "Garden", "Grove",
    "Harbor", "High", "Hill", "Jefferson", "King", "Lake", "Linden", "Locust", "Madison",
    "Main", "Market", "Mill", "Monroe", "Park", "Pearl", "Pleasant", "Prospect", "Queen",
    "Railroad", "River", "School", "Spring", "State", "Union", "Vine", "Walnut", "Water",
    "Washington", "Winter",
];

const STREET_TYPES: &[&str] = &["St", "Ave", "Blvd", "Pl", "Ter", "Dr", "Ct"];

const RURAL_BASES: &[&str] = &[
    "Apple Orchard", "Barn", "Bluff", "Brushy", "Cattail", "Clover", "Cove", "Creamery",
    "Dairy", "Dune", "Ferry", "Flint", "Goose", "Gravel", "Hay Meadow", "Heron", "Kettle",
    "Lighthouse", "Lookout", "Mussel", "Old County", "Old Post", "Osprey", "Oyster",
    "Pasture", "Pond", "Quarry", "Sawmill", "Schoolhouse", "Sheep", "Shore", "Tidewater",
    "Turkey Hill", "Wharf", "Windmill",
];

const RURAL_TYPES: &[&str] = &["Rd", "Ln", "Pike", "Trl", "Way"];

/// One shuffled dictionary, dealt out in order
#[derive(Clone, Debug)]
struct Deck {
    entries: Vec<String>,
    next: usize,
    cycle: usize,
}

impl Deck {
    fn compound(prefixes: &[&str], suffixes: &[&str], separator: &str, rng: &mut ChaCha8Rng) -> Self {
        let mut entries: Vec<String> = prefixes
            .iter()
            .flat_map(|p| suffixes.iter().map(move |s| format!("{}{}{}", p, separator, s)))
            .collect();
        entries.shuffle(rng);
        Self {
            entries,
            next: 0,
            cycle: 0,
        }
    }

    fn deal(&mut self) -> String {
        if self.next >= self.entries.len() {
            self.next = 0;
            self.cycle += 1;
        }
        let entry = &self.entries[self.next];
        self.next += 1;
        if self.cycle == 0 {
            entry.clone()
        } else {
            format!("{} {}", entry, self.cycle + 1)
        }
    }
}

/// Seeded dictionary picker
#[derive(Clone, Debug)]
pub struct DictionaryNames {
    towns: Deck,
    streets: Deck,
    rural: Deck,
    numbers: ChaCha8Rng,
    last_number: u32,
}

impl DictionaryNames {
    pub fn new(seed: u64) -> Self {
        let mut town_rng = ChaCha8Rng::seed_from_u64(derive_seed(seed, "towns"));
        let mut street_rng = ChaCha8Rng::seed_from_u64(derive_seed(seed, "streets"));
        let mut rural_rng = ChaCha8Rng::seed_from_u64(derive_seed(seed, "rural"));
        Self {
            towns: Deck::compound(TOWN_PREFIXES, TOWN_SUFFIXES, "", &mut town_rng),
            streets: Deck::compound(STREET_BASES, STREET_TYPES, " ", &mut street_rng),
            rural: Deck::compound(RURAL_BASES, RURAL_TYPES, " ", &mut rural_rng),
            numbers: ChaCha8Rng::seed_from_u64(derive_seed(seed, "numbers")),
            last_number: 0,
        }
    }
}

impl NameSource for DictionaryNames {
    fn next_town_name(&mut self) -> String {
        self.towns.deal()
    }

    fn next_street_name(&mut self) -> String {
        self.streets.deal()
    }

    fn next_rural_road_name(&mut self) -> String {
        self.rural.deal()
    }

    /// Previous number plus one, with a random jump of up to 31 once past 20,
    /// then bumped to the wanted parity
    fn next_route_number(&mut self, parity: ParityPreference) -> u32 {
        let mut number = self.last_number + 1;
        if number > 20 {
            number += self.numbers.gen_range(0..32);
        }
        match parity {
            ParityPreference::Odd if number % 2 == 0 => number += 1,
            ParityPreference::Even if number % 2 == 1 => number += 1,
            _ => {}
        }
        self.last_number = number;
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_names() {
        let mut a = DictionaryNames::new(42);
        let mut b = DictionaryNames::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_town_name(), b.next_town_name());
            assert_eq!(a.next_street_name(), b.next_street_name());
        }
    }

    #[test]
    fn test_no_repeats_before_exhaustion() {
        let mut names = DictionaryNames::new(1);
        let capacity = RURAL_BASES.len() * RURAL_TYPES.len();
        let dealt: HashSet<String> = (0..capacity).map(|_| names.next_rural_road_name()).collect();
        assert_eq!(dealt.len(), capacity);
        // past the end, names carry a cycle number
        assert!(names.next_rural_road_name().ends_with(" 2"));
    }

    #[test]
    fn test_route_numbers_increase_with_parity() {
        let mut names = DictionaryNames::new(9);
        let mut last = 0;
        for i in 0..40 {
            let parity = if i % 2 == 0 { ParityPreference::Odd } else { ParityPreference::Even };
            let n = names.next_route_number(parity);
            assert!(n > last);
            match parity {
                ParityPreference::Odd => assert_eq!(n % 2, 1),
                ParityPreference::Even => assert_eq!(n % 2, 0),
                ParityPreference::None => {}
            }
            last = n;
        }
    }

    #[test]
    fn test_small_numbers_step_by_one() {
        let mut names = DictionaryNames::new(3);
        assert_eq!(names.next_route_number(ParityPreference::None), 1);
        assert_eq!(names.next_route_number(ParityPreference::None), 2);
        assert_eq!(names.next_route_number(ParityPreference::Even), 4);
        assert_eq!(names.next_route_number(ParityPreference::Odd), 5);
    }
}
