//! Random City Generation
//!
//! Seeded road grid plus scattered buildings. Same seed, same city.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

use city_model::{generate_building_id, Building, BuildingType, CityLayout, Tile, DEFAULT_GRID_SIZE};

/// Relative frequency of each building type
const TYPE_WEIGHTS: [(BuildingType, u32); 7] = [
    (BuildingType::House, 40),
    (BuildingType::Office, 14),
    (BuildingType::Factory, 10),
    (BuildingType::Mall, 8),
    (BuildingType::Park, 12),
    (BuildingType::School, 8),
    (BuildingType::Hospital, 8),
];

/// Knobs for [`generate_city`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub width: u32,
    pub height: u32,
    /// Tiles between parallel roads
    pub road_spacing: u32,
    /// Chance that any one road tile is left out
    pub road_gap_chance: f64,
    pub buildings: usize,
    /// Placement attempts per building before giving up
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_SIZE,
            height: DEFAULT_GRID_SIZE,
            road_spacing: 5,
            road_gap_chance: 0.05,
            buildings: 40,
            max_attempts: 50,
        }
    }
}

fn pick_type(rng: &mut SmallRng) -> BuildingType {
    let total: u32 = TYPE_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (building_type, weight) in TYPE_WEIGHTS {
        if roll < weight {
            return building_type;
        }
        roll -= weight;
    }
    BuildingType::House
}

/// Generates a valid layout from `seed`.
///
/// Roads run along every `road_spacing`-th row and column from a random
/// offset, with occasional gaps. Buildings go on free tiles; a building that
/// finds no free tile within `max_attempts` is dropped, so the result may
/// hold fewer than `config.buildings`.
pub fn generate_city(seed: u64, config: &GeneratorConfig) -> CityLayout {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut layout = CityLayout::new(config.width, config.height);
    if config.width == 0 || config.height == 0 {
        return layout;
    }

    let spacing = config.road_spacing.max(2);
    let mut roads: Vec<Tile> = Vec::new();
    let mut taken: HashSet<Tile> = HashSet::new();

    let offset_y = rng.gen_range(0..spacing.min(config.height));
    let offset_x = rng.gen_range(0..spacing.min(config.width));
    for y in (offset_y..config.height).step_by(spacing as usize) {
        for x in 0..config.width {
            roads.push(Tile::new(x, y));
        }
    }
    for x in (offset_x..config.width).step_by(spacing as usize) {
        for y in 0..config.height {
            roads.push(Tile::new(x, y));
        }
    }
    for tile in roads {
        if taken.contains(&tile) {
            continue;
        }
        if rng.gen_bool(config.road_gap_chance.clamp(0.0, 1.0)) {
            continue;
        }
        taken.insert(tile);
        layout.roads.push(tile);
    }

    let mut sequence = 1;
    for _ in 0..config.buildings {
        for _ in 0..config.max_attempts {
            let tile = Tile::new(rng.gen_range(0..config.width), rng.gen_range(0..config.height));
            if taken.insert(tile) {
                let building = Building::new(generate_building_id(sequence), pick_type(&mut rng));
                layout.place(building, tile);
                sequence += 1;
                break;
            }
        }
    }

    debug!(
        "Generated city from seed {}: {} road tiles, {} buildings",
        seed,
        layout.roads.len(),
        layout.buildings.len()
    );
    layout
}
