use antforage::ant::FEED_QUANTITY;
use antforage::components::distance;
use antforage::pheromones::SNAP_TO_ZERO;
use antforage::simulation::{MIN_FOOD_SEPARATION, MIN_NEST_DISTANCE};
use antforage::{
    Ant, Arena, FoodSource, ForagingState, Nest, PheromoneField, SimConfig, Simulation,
    Surroundings,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn calm() -> SimConfig {
    SimConfig {
        random_movement_factor: 0.0,
        ..SimConfig::default()
    }
}

#[test]
fn evaporation_scales_or_snaps_every_cell() {
    let mut field = PheromoneField::new(50, 50, 255.0);
    for i in 0..50 {
        field.deposit(i as f32, i as f32, 0.05 + i as f32 * 5.0);
    }
    let before = field.cells().to_vec();

    field.decay(0.98);

    for (old, new) in before.iter().zip(field.cells()) {
        let scaled = old * 0.98;
        if *old == 0.0 || scaled < SNAP_TO_ZERO {
            assert_eq!(*new, 0.0);
        } else {
            assert_eq!(*new, scaled);
        }
    }
}

#[test]
fn scenario_single_ant_walks_to_food() {
    let arena = Arena::new(800, 600);
    let config = calm();
    let mut field = PheromoneField::new(800, 600, config.field_cap);
    let nest = Nest::at_center(arena, config.nest_radius);
    let mut food = vec![FoodSource::new(600.0, 300.0, config.food_radius, 100.0)];
    let mut rng = StdRng::seed_from_u64(2024);

    let mut ant = Ant::new(nest.x, nest.y, 0.0);
    let mut found_at = None;
    for tick in 0..1_000 {
        field.decay(config.evaporation_rate);
        let mut world = Surroundings {
            arena,
            field: &mut field,
            nest: &nest,
            food: &mut food,
        };
        ant.update(&config, &mut world, &mut rng);
        if ant.state == ForagingState::Returning {
            found_at = Some(tick);
            break;
        }
    }

    assert!(found_at.is_some(), "ant never reached the food");
    assert!(distance(ant.x, ant.y, 600.0, 300.0) < config.food_radius / 2.0);
    assert_eq!(food[0].amount, 100.0 - FEED_QUANTITY);
}

#[test]
fn returning_ants_eventually_deliver() {
    let arena = Arena::new(800, 600);
    let config = calm();
    let mut field = PheromoneField::new(800, 600, config.field_cap);
    let nest = Nest::at_center(arena, config.nest_radius);
    let mut food = Vec::new();
    let mut rng = StdRng::seed_from_u64(3);

    let mut ant = Ant::new(650.0, 420.0, 2.0);
    ant.state = ForagingState::Returning;
    let mut delivered = false;
    for _ in 0..2_000 {
        let mut world = Surroundings {
            arena,
            field: &mut field,
            nest: &nest,
            food: &mut food,
        };
        ant.update(&config, &mut world, &mut rng);
        if ant.state == ForagingState::Searching {
            delivered = true;
            break;
        }
    }

    assert!(delivered);
    // the way home is marked
    assert!(field.total() > 0.0);
    assert!(ant.trail.len() > 10);
}

fn carrier_and_searcher() -> (Ant, Ant) {
    // the carrier's next deposit lands in cell (115, 85), which is where the
    // searcher's left sensor points after its own move
    let mut carrier = Ant::new(114.0, 85.5, 0.0);
    carrier.state = ForagingState::Returning;
    let searcher = Ant::new(100.0, 100.0, 0.0);
    (carrier, searcher)
}

fn run_one_tick(ants: &mut [Ant], field: &mut PheromoneField, seed: u64) {
    let arena = Arena::new(800, 600);
    let config = calm();
    let nest = Nest::at_center(arena, config.nest_radius);
    let mut food = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = Surroundings {
        arena,
        field,
        nest: &nest,
        food: &mut food,
    };
    for ant in ants.iter_mut() {
        ant.update(&config, &mut world, &mut rng);
    }
}

#[test]
fn later_ants_sense_deposits_from_the_same_tick() {
    let (carrier, searcher) = carrier_and_searcher();
    let mut field = PheromoneField::new(800, 600, 255.0);
    let mut ants = vec![carrier, searcher];

    run_one_tick(&mut ants, &mut field, 8);

    assert_eq!(field.sample_at(115.5, 85.5), calm().deposit_amount);
    let heading = ants[1].heading;
    assert!((-0.5..=-0.1).contains(&heading), "searcher heading {heading}");
}

#[test]
fn earlier_ants_do_not_see_deposits_made_after_them() {
    let (carrier, searcher) = carrier_and_searcher();
    let mut field = PheromoneField::new(800, 600, 255.0);
    let mut ants = vec![searcher, carrier];

    run_one_tick(&mut ants, &mut field, 8);

    assert!(field.sample_at(115.5, 85.5) > 0.0);
    assert_eq!(ants[0].heading, 0.0);
}

#[test]
fn population_follows_config_on_next_step() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 800, 600, 10);
    for _ in 0..50 {
        sim.step();
    }

    sim.update_config(SimConfig {
        population: 35,
        ..SimConfig::default()
    });
    sim.step();
    assert_eq!(sim.ants().len(), 35);

    sim.update_config(SimConfig {
        population: 120,
        ..SimConfig::default()
    });
    sim.step();
    assert_eq!(sim.ants().len(), 120);
    // newcomers have moved exactly one step away from the nest
    let nest = *sim.nest();
    let speed = sim.config().ant_speed;
    for ant in &sim.ants()[35..] {
        assert!(distance(ant.x, ant.y, nest.x, nest.y) <= speed + 1e-3);
    }
}

#[test]
fn reset_placement_keeps_distances() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 800, 600, 77);
    for _ in 0..20 {
        sim.reset();
        if sim.placement_relaxed() {
            continue;
        }
        let nest = *sim.nest();
        let food = sim.food();
        for (i, a) in food.iter().enumerate() {
            assert!(distance(a.x, a.y, nest.x, nest.y) >= MIN_NEST_DISTANCE);
            for b in &food[i + 1..] {
                assert!(distance(a.x, a.y, b.x, b.y) >= MIN_FOOD_SEPARATION);
            }
        }
    }
}

#[test]
fn colony_collects_food_over_time() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 800, 600, 5);
    let initial = sim.remaining_food();
    for _ in 0..5_000 {
        sim.step();
    }
    let stats = sim.stats();
    assert!(stats.discoveries > 0);
    assert!((initial - sim.remaining_food() - stats.food_collected).abs() < 1e-2);
    assert!(sim
        .field()
        .cells()
        .iter()
        .all(|&v| v >= 0.0 && v <= sim.config().field_cap));
}
