//! Ant foraging on a shared, evaporating pheromone field.
//!
//! [`Simulation`] owns the arena and advances it with [`Simulation::step`];
//! renderers read it back through its accessors or [`Simulation::snapshot`].

pub mod ant;
pub mod colors;
pub mod components;
pub mod config;
pub mod error;
pub mod pheromones;
pub mod simulation;
pub mod video;

pub use ant::{Ant, AntEvent, AntView, Surroundings};
pub use colors::Palette;
pub use components::{Arena, FoodSource, ForagingState, Nest, TrailMemory, TrailPoint};
pub use config::SimConfig;
pub use error::{Error, Result};
pub use pheromones::PheromoneField;
pub use simulation::{SimStats, Simulation, Snapshot};
pub use video::{Frame, FrameRecorder};
