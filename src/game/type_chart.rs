use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Elemental type tag carried by creatures and moves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CreatureType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Multiplier applied by a legendary or mythical attacker.
pub const LEGENDARY_FACTOR: f64 = 2.0;

const LEGENDARY: &[&str] = &[
    "articuno", "zapdos", "moltres", "mewtwo", "raikou", "entei", "suicune", "lugia", "ho-oh",
    "regirock", "regice", "registeel", "latias", "latios", "kyogre", "groudon", "rayquaza",
    "uxie", "mesprit", "azelf", "dialga", "palkia", "heatran", "regigigas", "giratina",
    "cresselia", "cobalion", "terrakion", "virizion", "tornadus", "thundurus", "reshiram",
    "zekrom", "landorus", "kyurem", "xerneas", "yveltal", "zygarde", "tapu-koko", "tapu-lele",
    "tapu-bulu", "tapu-fini", "cosmog", "cosmoem", "solgaleo", "lunala", "necrozma",
    "zamazenta", "zacian", "eternatus", "kubfu", "urshifu", "regieleki", "regidrago",
    "glastrier", "spectrier", "calyrex", "enamorus", "ting-lu", "chien-pao", "wo-chien",
    "chi-yu", "koraidon", "miraidon", "ogerpon",
];

const MYTHICAL: &[&str] = &[
    "mew", "celebi", "jirachi", "deoxys", "phione", "manaphy", "darkrai", "shaymin", "arceus",
    "victini", "keldeo", "meloetta", "genesect", "diancie", "hoopa", "volcanion", "magearna",
    "marshadow", "zeraora", "meltan", "melmetal", "zarude",
];

impl CreatureType {
    /// Multiplier of an attack of type `self` against a single defender type.
    pub fn against(self, defender: CreatureType) -> f64 {
        use CreatureType::*;

        match (self, defender) {
            (Normal, Rock) | (Normal, Steel) => 0.5,
            (Normal, Ghost) => 0.0,

            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => 2.0,
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => 0.5,

            (Water, Fire) | (Water, Ground) | (Water, Rock) => 2.0,
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,

            (Electric, Water) | (Electric, Flying) => 2.0,
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => 0.5,
            (Electric, Ground) => 0.0,

            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => 2.0,
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => 0.5,

            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => 2.0,
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => 0.5,

            (Fighting, Normal)
            | (Fighting, Ice)
            | (Fighting, Rock)
            | (Fighting, Dark)
            | (Fighting, Steel) => 2.0,
            (Fighting, Poison)
            | (Fighting, Flying)
            | (Fighting, Psychic)
            | (Fighting, Bug)
            | (Fighting, Fairy) => 0.5,
            (Fighting, Ghost) => 0.0,

            (Poison, Grass) | (Poison, Fairy) => 2.0,
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, Steel) => 0.0,

            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => 2.0,
            (Ground, Grass) | (Ground, Bug) => 0.5,
            (Ground, Flying) => 0.0,

            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => 2.0,
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => 0.5,

            (Psychic, Fighting) | (Psychic, Poison) => 2.0,
            (Psychic, Psychic) | (Psychic, Steel) => 0.5,
            (Psychic, Dark) => 0.0,

            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => 2.0,
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => 0.5,

            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => 2.0,
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,

            (Ghost, Psychic) | (Ghost, Ghost) => 2.0,
            (Ghost, Dark) => 0.5,
            (Ghost, Normal) => 0.0,

            (Dragon, Dragon) => 2.0,
            (Dragon, Steel) => 0.5,
            (Dragon, Fairy) => 0.0,

            (Dark, Psychic) | (Dark, Ghost) => 2.0,
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,

            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => 2.0,
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => 0.5,

            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => 2.0,
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => 0.5,

            _ => 1.0,
        }
    }
}

/// Product of the single-type multipliers over every defender type.
pub fn effectiveness(attack: CreatureType, defender: &[CreatureType]) -> f64 {
    defender
        .iter()
        .fold(1.0, |acc, defender_type| acc * attack.against(*defender_type))
}

/// Full multiplier used by damage: type product times the legendary factor.
pub fn damage_multiplier(
    attack: CreatureType,
    defender: &[CreatureType],
    attacker_is_legendary: bool,
) -> f64 {
    let legendary_factor = if attacker_is_legendary {
        LEGENDARY_FACTOR
    } else {
        1.0
    };
    effectiveness(attack, defender) * legendary_factor
}

pub fn is_legendary_or_mythical(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    LEGENDARY.contains(&name.as_str()) || MYTHICAL.contains(&name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(CreatureType::Electric, CreatureType::Water, 2.0)]
    #[case(CreatureType::Electric, CreatureType::Ground, 0.0)]
    #[case(CreatureType::Fire, CreatureType::Water, 0.5)]
    #[case(CreatureType::Normal, CreatureType::Ghost, 0.0)]
    #[case(CreatureType::Dragon, CreatureType::Fairy, 0.0)]
    #[case(CreatureType::Water, CreatureType::Electric, 1.0)]
    #[case(CreatureType::Steel, CreatureType::Fairy, 2.0)]
    fn test_single_matchups(
        #[case] attack: CreatureType,
        #[case] defender: CreatureType,
        #[case] expected: f64,
    ) {
        assert_eq!(attack.against(defender), expected);
    }

    #[rstest]
    #[case(CreatureType::Fire, &[CreatureType::Grass, CreatureType::Steel], 4.0)]
    #[case(CreatureType::Fire, &[CreatureType::Grass, CreatureType::Water], 1.0)]
    #[case(CreatureType::Electric, &[CreatureType::Water, CreatureType::Ground], 0.0)]
    #[case(CreatureType::Ice, &[CreatureType::Fire, CreatureType::Steel], 0.25)]
    fn test_dual_type_products(
        #[case] attack: CreatureType,
        #[case] defender: &[CreatureType],
        #[case] expected: f64,
    ) {
        assert_eq!(effectiveness(attack, defender), expected);
    }

    #[test]
    fn test_multipliers_are_from_the_allowed_set() {
        for attack in CreatureType::iter() {
            for defender in CreatureType::iter() {
                let multiplier = attack.against(defender);
                assert!(
                    [0.0, 0.5, 1.0, 2.0].contains(&multiplier),
                    "{attack} vs {defender} gave {multiplier}"
                );
            }
        }
    }

    #[test]
    fn test_legendary_attacker_doubles_damage_multiplier() {
        let types = [CreatureType::Water];
        assert_eq!(damage_multiplier(CreatureType::Electric, &types, false), 2.0);
        assert_eq!(damage_multiplier(CreatureType::Electric, &types, true), 4.0);
    }

    #[rstest]
    #[case("mewtwo", true)]
    #[case("Mew", true)]
    #[case("ho-oh", true)]
    #[case("pikachu", false)]
    #[case("", false)]
    fn test_legendary_or_mythical_lookup(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_legendary_or_mythical(name), expected);
    }

    #[test]
    fn test_type_names_parse_case_insensitively() {
        assert_eq!(CreatureType::from_str("fire").unwrap(), CreatureType::Fire);
        assert_eq!(CreatureType::from_str("Psychic").unwrap(), CreatureType::Psychic);
        assert!(CreatureType::from_str("shadow").is_err());
        assert_eq!(CreatureType::Electric.to_string(), "electric");
    }
}
