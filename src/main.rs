use antforage::video::timestamped_dir;
use antforage::{FrameRecorder, Simulation};
use bevy::prelude::*;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod cli;
mod systems;

use cli::Args;
use systems::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
        run_headless(&args)?;
        return Ok(());
    }

    run_viewer(&args);
    Ok(())
}

fn build_simulation(args: &Args) -> Simulation {
    let config = args.sim_config();
    match args.seed {
        Some(seed) => Simulation::with_seed(config, args.width, args.height, seed),
        None => Simulation::new(config, args.width, args.height),
    }
}

fn run_headless(args: &Args) -> antforage::Result<()> {
    let mut sim = build_simulation(args);
    let record_every = args.record_every.max(1);
    let mut recorder = args
        .record
        .as_ref()
        .map(|_| FrameRecorder::new((args.ticks / record_every) as usize + 1));

    if let Some(recorder) = recorder.as_mut() {
        recorder.capture(&sim);
    }

    for _ in 0..args.ticks {
        sim.step();
        let tick = sim.stats().tick;

        if let Some(recorder) = recorder.as_mut() {
            if tick % record_every == 0 {
                recorder.capture(&sim);
            }
        }
        if args.report_every > 0 && tick % args.report_every == 0 {
            tracing::info!(
                tick,
                ants = sim.ants().len(),
                returning = sim.returning_count(),
                deliveries = sim.stats().deliveries,
                remaining_food = sim.remaining_food(),
                "progress"
            );
        }
    }

    if let (Some(recorder), Some(dir)) = (recorder.as_ref(), args.record.as_deref()) {
        let written = recorder.save_png_sequence(dir)?;
        println!("Frames written: {} to {}", written, dir.display());
    }

    print_summary(&sim);
    Ok(())
}

fn print_summary(sim: &Simulation) {
    let stats = sim.stats();
    println!("Simulation summary");
    println!("  ticks: {}", stats.tick);
    println!("  ants: {} ({} returning)", sim.ants().len(), sim.returning_count());
    println!("  discoveries: {}", stats.discoveries);
    println!("  deliveries: {}", stats.deliveries);
    println!("  food collected: {:.1}", stats.food_collected);
    println!(
        "  food remaining: {:.1} in {}/{} sources",
        sim.remaining_food(),
        sim.active_food_count(),
        sim.food().len()
    );
}

fn run_viewer(args: &Args) {
    let settings = ViewerSettings {
        config: args.sim_config(),
        width: args.width,
        height: args.height,
        seed: args.seed,
        recording_dir: timestamped_dir(Path::new("recordings")),
    };
    let colors = ViewerColors::default();

    App::new()
        .add_plugins(DefaultPlugins.set(bevy::window::WindowPlugin {
            primary_window: Some(bevy::window::Window {
                title: "Ant Foraging".into(),
                resolution: (args.width as f32, args.height as f32).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(colors.background))
        .insert_resource(settings)
        .insert_resource(colors)
        .add_systems(Startup, (setup, setup_trail_visualization).chain())
        .add_systems(
            Update,
            (
                control_system,
                simulation_step_system,
                recording_system,
                update_trail_visualization,
                nest_visual_system,
                food_visual_system,
                ant_visual_system,
                update_stats_text,
                exit_system,
            )
                .chain(),
        )
        .run();
}
