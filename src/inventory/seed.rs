use crate::game::{BaseStats, CatalogEntry, CreatureType, Move};

use CreatureType::*;

fn entry(
    name: &str,
    (hp, attack, defense, speed): (u32, u32, u32, u32),
    types: &[CreatureType],
    moves: [(&str, u32, CreatureType); 4],
) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        base: BaseStats {
            hp,
            attack,
            defense,
            speed,
        },
        types: types.to_vec(),
        moves: moves
            .into_iter()
            .map(|(move_name, power, move_type)| Move::new(move_name, power, move_type))
            .collect(),
        sprite: Some(format!("/sprites/{name}.png")),
        is_legendary: false,
        is_mythical: false,
    }
}

/// Built-in creatures served when no external catalog is configured.
pub fn seed_catalog() -> Vec<CatalogEntry> {
    let mut entries = vec![
        entry(
            "bulbasaur",
            (45, 49, 49, 45),
            &[Grass, Poison],
            [
                ("vine-whip", 45, Grass),
                ("tackle", 40, Normal),
                ("razor-leaf", 55, Grass),
                ("sludge-bomb", 90, Poison),
            ],
        ),
        entry(
            "charmander",
            (39, 52, 43, 65),
            &[Fire],
            [
                ("ember", 40, Fire),
                ("scratch", 40, Normal),
                ("flamethrower", 90, Fire),
                ("dragon-claw", 80, Dragon),
            ],
        ),
        entry(
            "squirtle",
            (44, 48, 65, 43),
            &[Water],
            [
                ("water-gun", 40, Water),
                ("tackle", 40, Normal),
                ("bite", 60, Dark),
                ("hydro-pump", 110, Water),
            ],
        ),
        entry(
            "pikachu",
            (35, 55, 40, 90),
            &[Electric],
            [
                ("thunder-shock", 40, Electric),
                ("quick-attack", 40, Normal),
                ("thunderbolt", 90, Electric),
                ("iron-tail", 100, Steel),
            ],
        ),
        entry(
            "geodude",
            (40, 80, 100, 20),
            &[Rock, Ground],
            [
                ("rock-throw", 50, Rock),
                ("tackle", 40, Normal),
                ("earthquake", 100, Ground),
                ("rock-slide", 75, Rock),
            ],
        ),
        entry(
            "gastly",
            (30, 35, 30, 80),
            &[Ghost, Poison],
            [
                ("lick", 30, Ghost),
                ("shadow-ball", 80, Ghost),
                ("sludge-bomb", 90, Poison),
                ("dark-pulse", 80, Dark),
            ],
        ),
        entry(
            "machop",
            (70, 80, 50, 35),
            &[Fighting],
            [
                ("karate-chop", 50, Fighting),
                ("low-kick", 65, Fighting),
                ("cross-chop", 100, Fighting),
                ("rock-slide", 75, Rock),
            ],
        ),
        entry(
            "abra",
            (25, 20, 15, 90),
            &[Psychic],
            [
                ("confusion", 50, Psychic),
                ("psybeam", 65, Psychic),
                ("psychic", 90, Psychic),
                ("shadow-ball", 80, Ghost),
            ],
        ),
        entry(
            "eevee",
            (55, 55, 50, 55),
            &[Normal],
            [
                ("tackle", 40, Normal),
                ("quick-attack", 40, Normal),
                ("bite", 60, Dark),
                ("double-edge", 120, Normal),
            ],
        ),
        entry(
            "dratini",
            (41, 64, 45, 50),
            &[Dragon],
            [
                ("twister", 40, Dragon),
                ("slam", 80, Normal),
                ("dragon-pulse", 85, Dragon),
                ("aqua-tail", 90, Water),
            ],
        ),
        entry(
            "snorlax",
            (160, 110, 65, 30),
            &[Normal],
            [
                ("body-slam", 85, Normal),
                ("headbutt", 70, Normal),
                ("crunch", 80, Dark),
                ("giga-impact", 150, Normal),
            ],
        ),
        entry(
            "clefairy",
            (70, 45, 48, 35),
            &[Fairy],
            [
                ("pound", 40, Normal),
                ("disarming-voice", 40, Fairy),
                ("moonblast", 95, Fairy),
                ("meteor-mash", 90, Steel),
            ],
        ),
    ];

    let mut mewtwo = entry(
        "mewtwo",
        (106, 110, 90, 130),
        &[Psychic],
        [
            ("confusion", 50, Psychic),
            ("psychic", 90, Psychic),
            ("shadow-ball", 80, Ghost),
            ("aura-sphere", 80, Fighting),
        ],
    );
    mewtwo.is_legendary = true;
    entries.push(mewtwo);

    entries
}
