//! Integration tests for CELLSIM

use cellsim::config::{HighwayConfig, MotorwayConfig, OceanConfig};
use cellsim::highway::Car;
use cellsim::ocean::Creature;
use cellsim::{
    Config, Highway, Lane, Motorway, Ocean, RoadFeature, SimulationKind, Species, TieBreak,
    ToroidalGrid,
};

fn ocean_config(width: usize, height: usize) -> OceanConfig {
    OceanConfig {
        width,
        height,
        ..OceanConfig::default()
    }
}

fn free_road(length: usize) -> HighwayConfig {
    HighwayConfig {
        length,
        car_linger: 0.0,
        red_probability: 0.0,
        ..HighwayConfig::default()
    }
}

#[test]
fn test_wraparound_addresses_same_cell() {
    for (width, height) in [(1, 1), (3, 2), (7, 5)] {
        let mut grid: ToroidalGrid<u32> = ToroidalGrid::new(width, height).unwrap();
        let (w, h) = (width as i64, height as i64);

        for k in -3..=3 {
            grid.set(2 + k * w, 1 + k * h, Some((k + 10) as u32));
            assert_eq!(grid.get(2, 1), Some(&((k + 10) as u32)));
            assert_eq!(grid.get(2 - w, 1 - h), grid.get(2 + 5 * w, 1 + 5 * h));
        }
        assert_eq!(grid.occupied(), 1);
    }
}

#[test]
fn test_placement_round_trip() {
    let mut ocean = Ocean::new_with_seed(&ocean_config(4, 4), 1).unwrap();
    ocean.place(-1, 5, Some(Species::Fish));
    let fish = ocean.get(3, 1).copied().unwrap();
    assert_eq!(fish.species(), Species::Fish);
    assert_eq!(fish.age, 0);

    ocean.place(3, 1, None);
    assert!(ocean.get(3, 1).is_none());

    let mut highway = Highway::new_with_seed(&free_road(6), 1).unwrap();
    highway.place(-2, Some(RoadFeature::Car { velocity: 3 })).unwrap();
    assert_eq!(highway.car(4), Some(&Car { velocity: 3 }));

    let mut motorway = Motorway::new_with_seed(&MotorwayConfig::default(), 1).unwrap();
    motorway.place(Lane::Fast, 43, Some(2)).unwrap();
    assert_eq!(motorway.car(Lane::Fast, 1).map(|c| c.velocity), Some(2));
    motorway.place(Lane::Fast, 1, None).unwrap();
    assert_eq!(motorway.car_count(), 0);
}

#[test]
fn test_ocean_single_fish_scenario() {
    let mut ocean = Ocean::new_with_seed(&ocean_config(3, 3), 2024).unwrap();
    ocean.place(1, 1, Some(Species::Fish));

    ocean.step();
    assert_eq!(ocean.fish_count(), 2);
    let ages: Vec<u32> = ocean.creatures().map(|(_, c)| c.age).collect();
    assert!(ages.contains(&1));
    assert!(ages.contains(&0));

    // The newborn sits next to the original fish
    let parent = ocean.creatures().find(|(_, c)| c.age == 1).unwrap().0;
    let child = ocean.creatures().find(|(_, c)| c.age == 0).unwrap().0;
    let dx = (parent.0 as i64 - child.0 as i64).rem_euclid(3);
    let dy = (parent.1 as i64 - child.1 as i64).rem_euclid(3);
    assert!(matches!((dx, dy), (0, 1) | (0, 2) | (1, 0) | (2, 0)));

    ocean.step();
    let oldest: Vec<&Creature> = ocean
        .creatures()
        .map(|(_, c)| c)
        .filter(|c| c.age == 2)
        .collect();
    assert_eq!(oldest.len(), 1);
}

#[test]
fn test_ocean_exactly_once_update() {
    let mut config = ocean_config(20, 20);
    config.tie_break = TieBreak::Uniform;
    let mut ocean = Ocean::new_with_seed(&config, 77).unwrap();
    ocean.random_fill(0.15, 0.0).unwrap();
    let initial_fish = ocean.fish_count();
    assert!(initial_fish > 0);

    for step in 1..=6u32 {
        ocean.step();

        // Every creature has acted once and waits for the next generation
        for (_, creature) in ocean.creatures() {
            assert!(creature.is_pending(ocean.generation()));
        }

        // Without sharks nothing dies, so the founders are exactly `step` old
        let distribution = ocean.age_distribution();
        assert_eq!(distribution[&step].fish, initial_fish);
        assert_eq!(*distribution.keys().last().unwrap(), step);
    }
}

#[test]
fn test_lone_shark_starves_after_two_generations() {
    let mut config = ocean_config(5, 5);
    config.shark_cycle = 10;
    let mut ocean = Ocean::new_with_seed(&config, 5).unwrap();

    // Skip generation 0, which is a breeding generation
    ocean.step();
    ocean.place(2, 2, Some(Species::Shark));

    ocean.step();
    assert_eq!(ocean.shark_count(), 1);
    ocean.step();
    assert_eq!(ocean.shark_count(), 0);
    assert!(ocean.is_extinct());
}

#[test]
fn test_eating_resets_starvation() {
    let mut config = ocean_config(2, 1);
    config.shark_cycle = 10;
    let mut ocean = Ocean::new_with_seed(&config, 8).unwrap();

    ocean.step();
    ocean.place(0, 0, Some(Species::Shark));

    // Hungry: moves to the only free cell
    ocean.step();
    assert_eq!(ocean.get(1, 0).and_then(|c| c.starvation()), Some(1));

    // Eats the fish beside it
    ocean.place(0, 0, Some(Species::Fish));
    ocean.step();
    assert_eq!(ocean.fish_count(), 0);
    assert_eq!(ocean.get(1, 0).and_then(|c| c.starvation()), Some(2));

    // Two more hungry generations are needed
    ocean.step();
    assert_eq!(ocean.shark_count(), 1);
    ocean.step();
    assert_eq!(ocean.shark_count(), 0);
}

#[test]
fn test_ocean_reproducibility() {
    let config = Config::default();

    let mut ocean1 = SimulationKind::Ocean.build(&config, Some(99999)).unwrap();
    let mut ocean2 = SimulationKind::Ocean.build(&config, Some(99999)).unwrap();

    ocean1.run(50);
    ocean2.run(50);

    assert_eq!(ocean1.snapshot(), ocean2.snapshot());
    assert_eq!(ocean1.to_string(), ocean2.to_string());
}

#[test]
fn test_highway_single_car_scenario() {
    let mut highway = Highway::new_with_seed(&free_road(5), 1).unwrap();
    highway.place(0, Some(RoadFeature::Car { velocity: 0 })).unwrap();

    highway.step();
    assert_eq!(highway.car(1), Some(&Car { velocity: 1 }));

    // A lone car on a 5-cell road can never see more than 4 free cells
    highway.run(10);
    let (_, car) = highway.cars().next().unwrap();
    assert_eq!(car.velocity, 4);
}

#[test]
fn test_highway_saturates_at_max_velocity() {
    let mut highway = Highway::new_with_seed(&free_road(30), 1).unwrap();
    highway.place(0, Some(RoadFeature::Car { velocity: 0 })).unwrap();

    let mut positions = Vec::new();
    for _ in 0..7 {
        highway.step();
        positions.push(highway.cars().next().unwrap().0);
    }

    assert_eq!(positions, vec![1, 3, 6, 10, 15, 20, 25]);
    assert_eq!(highway.car(25), Some(&Car { velocity: 5 }));

    highway.step();
    assert_eq!(highway.car(0), Some(&Car { velocity: 5 }));
}

#[test]
fn test_highway_collision_freedom() {
    let config = HighwayConfig {
        length: 60,
        red_probability: 0.2,
        red_duration: 3,
        ..HighwayConfig::default()
    };
    let mut highway = Highway::new_with_seed(&config, 31337).unwrap();
    highway.random_fill(0.4, 0.1).unwrap();
    let cars = highway.car_count();

    for _ in 0..100 {
        let before = highway.road().clone();
        highway.step();

        // No car is lost to a shared cell
        assert_eq!(highway.car_count(), cars);

        for (pos, car) in highway.cars() {
            let origin = pos as i64 - car.velocity as i64;
            assert!(before.car(origin).is_some());
            assert!(car.velocity <= before.distance_to_next_obstacle(origin));
        }
    }
}

#[test]
fn test_highway_average_velocity_blend() {
    let mut highway = Highway::new_with_seed(&free_road(30), 1).unwrap();
    highway.place(0, Some(RoadFeature::Car { velocity: 0 })).unwrap();

    highway.step();
    assert_eq!(highway.average_velocity(), 0.5);
    highway.step();
    assert_eq!(highway.average_velocity(), 1.25);
}

#[test]
fn test_motorway_overtake_scenario() {
    let config = MotorwayConfig {
        length: 10,
        linger: 0.0,
        ..MotorwayConfig::default()
    };
    let mut motorway = Motorway::new_with_seed(&config, 1).unwrap();
    motorway.place(Lane::Normal, 2, Some(4)).unwrap();
    motorway.place(Lane::Normal, 3, Some(1)).unwrap();
    assert_eq!(motorway.gap_ahead(Lane::Normal, 2), Some(0));

    motorway.step();

    let fast = motorway.car(Lane::Fast, 7).copied().unwrap();
    assert_eq!(fast.velocity, 5);
    let slow = motorway.car(Lane::Normal, 5).copied().unwrap();
    assert_eq!(slow.velocity, 2);
}

#[test]
fn test_motorway_invariants() {
    let config = MotorwayConfig {
        length: 50,
        linger: 0.3,
        ..MotorwayConfig::default()
    };
    let mut motorway = Motorway::new_with_seed(&config, 4242).unwrap();
    motorway.random_fill(0.35).unwrap();
    let cars = motorway.car_count();

    for _ in 0..100 {
        motorway.step();
        assert_eq!(motorway.car_count(), cars);

        for lane in Lane::ALL {
            for (_, car) in motorway.cars(lane) {
                assert!(car.is_pending(motorway.generation()));
                assert!(car.velocity <= cellsim::traffic::MAX_VELOCITY);
            }
        }
    }
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join("cellsim_test_config.yaml");

    let mut config = Config::default();
    config.ocean.width = 17;
    config.ocean.tie_break = TieBreak::Uniform;
    config.save(&path).expect("Failed to save config");

    let loaded = Config::from_file(&path).expect("Failed to load config");
    assert_eq!(loaded.ocean.width, 17);
    assert_eq!(loaded.ocean.tie_break, TieBreak::Uniform);

    std::fs::write(&path, "highway:\n  car_linger: 2.0\n").unwrap();
    assert!(Config::from_file(&path).is_err());

    std::fs::remove_file(&path).ok();
}
