use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI};
use std::ops::RangeInclusive;

pub const POPULATION_RANGE: RangeInclusive<usize> = 10..=300;
pub const EVAPORATION_RANGE: RangeInclusive<f32> = 0.980..=0.999;
pub const RANDOM_FACTOR_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.5..=3.0;
pub const MAX_FOOD_COUNT: usize = 32;

/// Tunable parameters of a foraging run.
///
/// `food_radius` and `nest_radius` are display sizes; ants register contact
/// within half of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub population: usize,
    /// Fraction of each cell kept per tick.
    pub evaporation_rate: f32,
    pub deposit_amount: f32,
    pub ant_speed: f32,
    pub random_movement_factor: f32,
    pub sensor_angle: f32,
    pub sensor_distance: f32,
    pub field_cap: f32,
    pub food_count: usize,
    pub food_radius: f32,
    pub nest_radius: f32,
    pub initial_food_amount: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: 100,
            evaporation_rate: 0.995,
            deposit_amount: 10.0,
            ant_speed: 1.5,
            random_movement_factor: 0.3,
            sensor_angle: FRAC_PI_4,
            sensor_distance: 20.0,
            field_cap: 255.0,
            food_count: 3,
            food_radius: 20.0,
            nest_radius: 30.0,
            initial_food_amount: 100.0,
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_range(value: f32, fallback: f32, range: &RangeInclusive<f32>) -> f32 {
    finite_or(value, fallback).clamp(*range.start(), *range.end())
}

impl SimConfig {
    /// Returns a copy with every field forced into its valid range.
    /// Non-finite floats are replaced by the default before clamping.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            population: self
                .population
                .clamp(*POPULATION_RANGE.start(), *POPULATION_RANGE.end()),
            evaporation_rate: clamp_range(
                self.evaporation_rate,
                d.evaporation_rate,
                &EVAPORATION_RANGE,
            ),
            deposit_amount: finite_or(self.deposit_amount, d.deposit_amount).max(0.01),
            ant_speed: clamp_range(self.ant_speed, d.ant_speed, &SPEED_RANGE),
            random_movement_factor: clamp_range(
                self.random_movement_factor,
                d.random_movement_factor,
                &RANDOM_FACTOR_RANGE,
            ),
            sensor_angle: finite_or(self.sensor_angle, d.sensor_angle).clamp(0.0, PI),
            sensor_distance: finite_or(self.sensor_distance, d.sensor_distance).max(1.0),
            field_cap: finite_or(self.field_cap, d.field_cap).max(1.0),
            food_count: self.food_count.min(MAX_FOOD_COUNT),
            food_radius: finite_or(self.food_radius, d.food_radius).max(1.0),
            nest_radius: finite_or(self.nest_radius, d.nest_radius).max(1.0),
            initial_food_amount: finite_or(self.initial_food_amount, d.initial_food_amount)
                .max(0.0),
        }
    }
}
