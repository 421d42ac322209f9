//! Record builders shared by the unit tests.

use crate::catalog::MemoryCatalog;
use schema::{
    BaseStats, ChainLink, CreatureRecord, DamageClass, ElementType, EvolutionChainRecord,
    MoveLearnEntry, MoveRecord, NamedResource, SpeciesRecord, SpriteRefs,
};

const API: &str = "https://pokeapi.co/api/v2";

pub fn move_ref(id: u32, name: &str) -> NamedResource {
    NamedResource::new(name, format!("{}/move/{}/", API, id))
}

/// Creature with the given base HP and 50 in every other stat.
pub fn creature(id: u32, name: &str, base_hp: u16) -> CreatureRecord {
    CreatureRecord {
        id,
        name: name.to_string(),
        base_stats: BaseStats::new(base_hp, 50, 50, 50),
        types: vec![ElementType::Normal],
        sprites: SpriteRefs::default(),
        moves: vec![],
        species: NamedResource::new(name, format!("{}/pokemon-species/{}/", API, id)),
    }
}

/// Creature whose move list holds `(move id, move name, level learned)` level-up entries.
pub fn creature_with_moves(id: u32, name: &str, moves: &[(u32, &str, u8)]) -> CreatureRecord {
    let mut record = creature(id, name, 45);
    record.moves = moves
        .iter()
        .map(|(move_id, move_name, level)| {
            MoveLearnEntry::level_up(move_ref(*move_id, move_name), *level)
        })
        .collect();
    record
}

pub fn offensive_move(id: u32, name: &str, power: u16) -> MoveRecord {
    MoveRecord {
        id,
        name: name.to_string(),
        power: Some(power),
        accuracy: Some(100),
        pp: Some(25),
        element: ElementType::Normal,
        damage_class: DamageClass::Physical,
    }
}

pub fn status_move(id: u32, name: &str) -> MoveRecord {
    MoveRecord {
        id,
        name: name.to_string(),
        power: None,
        accuracy: Some(100),
        pp: Some(30),
        element: ElementType::Normal,
        damage_class: DamageClass::Status,
    }
}

pub fn species(id: u32, name: &str, chain_id: Option<u32>) -> SpeciesRecord {
    SpeciesRecord {
        id,
        name: name.to_string(),
        evolution_chain_id: chain_id,
    }
}

/// Chain of single successors: `(species name, min level to evolve into it)`.
pub fn linear_chain(id: u32, stages: &[(&str, Option<u8>)]) -> EvolutionChainRecord {
    let mut link: Option<ChainLink> = None;
    for (name, min_level) in stages.iter().rev() {
        link = Some(ChainLink {
            species: NamedResource::new(*name, ""),
            min_level: *min_level,
            evolves_to: link.into_iter().collect(),
        });
    }
    EvolutionChainRecord {
        id,
        chain: link.unwrap_or(ChainLink {
            species: NamedResource::default(),
            min_level: None,
            evolves_to: vec![],
        }),
    }
}

/// A small but complete catalog: the kanto starter line for charmander,
/// bulbasaur and squirtle, pikachu, plus their early moves.
pub fn starter_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_creature(creature_with_moves(
            1,
            "bulbasaur",
            &[(33, "tackle", 1), (22, "vine-whip", 7)],
        ))
        .with_creature(creature_with_moves(
            4,
            "charmander",
            &[(10, "scratch", 1), (52, "ember", 7)],
        ))
        .with_creature(creature_with_moves(
            5,
            "charmeleon",
            &[(10, "scratch", 1), (52, "ember", 7)],
        ))
        .with_creature(creature_with_moves(
            7,
            "squirtle",
            &[(33, "tackle", 1), (55, "water-gun", 7)],
        ))
        .with_creature(creature_with_moves(25, "pikachu", &[(84, "thunder-shock", 1)]))
        .with_species(species(1, "bulbasaur", Some(1)))
        .with_species(species(4, "charmander", Some(2)))
        .with_species(species(5, "charmeleon", Some(2)))
        .with_species(species(7, "squirtle", Some(3)))
        .with_species(species(25, "pikachu", Some(10)))
        .with_evolution_chain(linear_chain(
            2,
            &[("charmander", None), ("charmeleon", Some(16)), ("charizard", Some(36))],
        ))
        .with_move(offensive_move(33, "tackle", 40))
        .with_move(offensive_move(10, "scratch", 40))
        .with_move(offensive_move(1, "pound", 40))
        .with_move(offensive_move(52, "ember", 40))
        .with_move(offensive_move(22, "vine-whip", 45))
        .with_move(offensive_move(55, "water-gun", 40))
        .with_move(offensive_move(84, "thunder-shock", 40))
}
