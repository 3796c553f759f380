use antforage::video::save_frame_as_png;
use antforage::{Arena, FrameRecorder, Palette, SimConfig, Simulation};
use bevy::prelude::*;
use std::path::PathBuf;

/// Field cells covered by one trail sprite along each axis.
const TRAIL_BLOCK: usize = 5;
const RECORD_EVERY: u64 = 5;

#[derive(Resource)]
pub struct ViewerSettings {
    pub config: SimConfig,
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub recording_dir: PathBuf,
}

#[derive(Resource)]
pub struct SimulationState {
    pub sim: Simulation,
    pub paused: bool,
}

#[derive(Resource)]
pub struct RecordingState {
    pub recorder: FrameRecorder,
    pub active: bool,
    pub dir: PathBuf,
}

/// Bevy colours derived from the shared palette.
#[derive(Resource, Clone)]
pub struct ViewerColors {
    pub palette: Palette,
    pub background: Color,
    pub trail: Color,
    pub nest: Color,
    pub food_source: Color,
    pub ant_searching: Color,
    pub ant_returning: Color,
    pub text: Color,
}

impl Default for ViewerColors {
    fn default() -> Self {
        Self::from_palette(Palette::default())
    }
}

impl ViewerColors {
    pub fn from_palette(palette: Palette) -> Self {
        let rgb = |[r, g, b]: [u8; 3]| Color::srgb_u8(r, g, b);
        Self {
            background: rgb(palette.background),
            trail: rgb(palette.trail),
            nest: rgb(palette.nest),
            food_source: rgb(palette.food_source),
            ant_searching: rgb(palette.ant_searching),
            ant_returning: rgb(palette.ant_returning),
            text: rgb(palette.text),
            palette,
        }
    }
}

#[derive(Component)]
pub struct AntSprite {
    pub index: usize,
}

#[derive(Component)]
pub struct FoodSprite {
    pub index: usize,
}

#[derive(Component)]
pub struct NestSprite;

/// One sprite per `TRAIL_BLOCK`×`TRAIL_BLOCK` block of field cells.
#[derive(Component)]
pub struct TrailCell {
    pub column: usize,
    pub row: usize,
}

#[derive(Component)]
pub struct StatsText;

/// Arena coordinates grow rightward and downward from the top-left corner;
/// Bevy's world is centred with y pointing up.
fn to_world(arena: Arena, x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x - arena.width / 2.0, arena.height / 2.0 - y, z)
}

pub fn setup(mut commands: Commands, settings: Res<ViewerSettings>, colors: Res<ViewerColors>) {
    commands.spawn(Camera2dBundle::default());

    let sim = match settings.seed {
        Some(seed) => Simulation::with_seed(
            settings.config.clone(),
            settings.width,
            settings.height,
            seed,
        ),
        None => Simulation::new(settings.config.clone(), settings.width, settings.height),
    };

    let nest = *sim.nest();
    commands.spawn((
        SpriteBundle {
            sprite: Sprite {
                color: colors.nest,
                custom_size: Some(Vec2::splat(nest.radius)),
                ..default()
            },
            transform: Transform::from_translation(to_world(sim.arena(), nest.x, nest.y, 5.0)),
            ..default()
        },
        NestSprite,
    ));

    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 16.0,
                color: colors.text,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        StatsText,
    ));

    commands.insert_resource(RecordingState {
        recorder: FrameRecorder::with_palette(1_800, colors.palette.clone()),
        active: false,
        dir: settings.recording_dir.clone(),
    });
    commands.insert_resource(SimulationState { sim, paused: false });
}

pub fn setup_trail_visualization(mut commands: Commands, settings: Res<ViewerSettings>) {
    let arena = Arena::new(settings.width, settings.height);
    let columns = settings.width.div_ceil(TRAIL_BLOCK);
    let rows = settings.height.div_ceil(TRAIL_BLOCK);
    let side = TRAIL_BLOCK as f32;

    for row in 0..rows {
        for column in 0..columns {
            let x = (column as f32 + 0.5) * side;
            let y = (row as f32 + 0.5) * side;
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::NONE,
                        custom_size: Some(Vec2::splat(side)),
                        ..default()
                    },
                    transform: Transform::from_translation(to_world(arena, x, y, -10.0)),
                    ..default()
                },
                TrailCell { column, row },
            ));
        }
    }
}

pub fn simulation_step_system(mut state: ResMut<SimulationState>) {
    if !state.paused {
        state.sim.step();
    }
}

/// Keyboard stand-ins for the parameter sliders.
pub fn control_system(input: Res<ButtonInput<KeyCode>>, mut state: ResMut<SimulationState>) {
    if input.just_pressed(KeyCode::KeyR) {
        state.sim.reset();
    }
    if input.just_pressed(KeyCode::Space) {
        state.paused = !state.paused;
    }

    let mut config = state.sim.config().clone();
    if input.just_pressed(KeyCode::ArrowUp) {
        config.population += 10;
    }
    if input.just_pressed(KeyCode::ArrowDown) {
        config.population = config.population.saturating_sub(10);
    }
    if input.just_pressed(KeyCode::ArrowRight) {
        config.ant_speed += 0.1;
    }
    if input.just_pressed(KeyCode::ArrowLeft) {
        config.ant_speed -= 0.1;
    }
    if input.just_pressed(KeyCode::BracketRight) {
        config.evaporation_rate += 0.001;
    }
    if input.just_pressed(KeyCode::BracketLeft) {
        config.evaporation_rate -= 0.001;
    }
    if input.just_pressed(KeyCode::Equal) {
        config.random_movement_factor += 0.05;
    }
    if input.just_pressed(KeyCode::Minus) {
        config.random_movement_factor -= 0.05;
    }
    if &config != state.sim.config() {
        state.sim.update_config(config);
    }
}

/// V starts capturing every few ticks; pressing it again writes the PNG
/// sequence. P saves a single frame.
pub fn recording_system(
    input: Res<ButtonInput<KeyCode>>,
    state: Res<SimulationState>,
    mut recording: ResMut<RecordingState>,
) {
    if input.just_pressed(KeyCode::KeyP) {
        let frame = recording.recorder.render(&state.sim);
        let path = recording.dir.join(format!("still_{:06}.png", frame.tick));
        match std::fs::create_dir_all(&recording.dir)
            .map_err(antforage::Error::from)
            .and_then(|_| save_frame_as_png(&path, &frame))
        {
            Ok(()) => info!("saved frame to {}", path.display()),
            Err(e) => warn!("failed to save frame: {}", e),
        }
    }

    if input.just_pressed(KeyCode::KeyV) {
        if recording.active {
            match recording.recorder.save_png_sequence(&recording.dir) {
                Ok(written) => info!("saved {} frames to {}", written, recording.dir.display()),
                Err(e) => warn!("failed to save recording: {}", e),
            }
            recording.recorder.clear();
        } else {
            info!("recording started");
        }
        recording.active = !recording.active;
    }

    // while paused the tick stands still; the recorder skips repeats
    if recording.active && state.sim.stats().tick % RECORD_EVERY == 0 {
        recording.recorder.capture(&state.sim);
    }
}

pub fn update_trail_visualization(
    mut cells: Query<(&TrailCell, &mut Sprite)>,
    state: Res<SimulationState>,
    colors: Res<ViewerColors>,
) {
    let field = state.sim.field();
    let base = colors.trail.to_srgba();
    for (cell, mut sprite) in cells.iter_mut() {
        let level = field.block_max(cell.column, cell.row, TRAIL_BLOCK);
        sprite.color = if level > 0.0 {
            let intensity = (level / 255.0).clamp(0.0, 1.0);
            Color::srgba(base.red, base.green, base.blue, intensity)
        } else {
            Color::NONE
        };
    }
}

pub fn nest_visual_system(
    mut nests: Query<(&mut Transform, &mut Sprite), With<NestSprite>>,
    state: Res<SimulationState>,
) {
    let nest = state.sim.nest();
    for (mut transform, mut sprite) in nests.iter_mut() {
        transform.translation = to_world(state.sim.arena(), nest.x, nest.y, 5.0);
        sprite.custom_size = Some(Vec2::splat(nest.radius));
    }
}

/// Keeps one sprite per food source; depleted sources are hidden, not despawned.
pub fn food_visual_system(
    mut commands: Commands,
    mut sprites: Query<(Entity, &FoodSprite, &mut Transform, &mut Sprite, &mut Visibility)>,
    state: Res<SimulationState>,
    colors: Res<ViewerColors>,
) {
    let arena = state.sim.arena();
    let food = state.sim.food();
    let mut seen = vec![false; food.len()];
    let base = colors.food_source.to_srgba();

    for (entity, marker, mut transform, mut sprite, mut visibility) in sprites.iter_mut() {
        let Some(source) = food.get(marker.index) else {
            commands.entity(entity).despawn();
            continue;
        };
        seen[marker.index] = true;
        transform.translation = to_world(arena, source.x, source.y, 2.0);
        *visibility = if source.is_active() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        let intensity = if source.max_amount > 0.0 {
            (source.amount / source.max_amount).clamp(0.3, 1.0)
        } else {
            1.0
        };
        sprite.color = Color::srgba(base.red, base.green * intensity, base.blue, base.alpha);
        sprite.custom_size = Some(Vec2::splat(source.radius));
    }

    for (index, source) in food.iter().enumerate().filter(|(i, _)| !seen[*i]) {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: colors.food_source,
                    custom_size: Some(Vec2::splat(source.radius)),
                    ..default()
                },
                transform: Transform::from_translation(to_world(arena, source.x, source.y, 2.0)),
                ..default()
            },
            FoodSprite { index },
        ));
    }
}

/// Mirrors the ant list: spawns sprites for new ants, despawns extras,
/// and moves the rest.
pub fn ant_visual_system(
    mut commands: Commands,
    mut sprites: Query<(Entity, &AntSprite, &mut Transform, &mut Sprite)>,
    state: Res<SimulationState>,
    colors: Res<ViewerColors>,
) {
    let arena = state.sim.arena();
    let ants = state.sim.ants();
    let mut seen = vec![false; ants.len()];
    let color_for = |has_food: bool| {
        if has_food {
            colors.ant_returning
        } else {
            colors.ant_searching
        }
    };

    for (entity, marker, mut transform, mut sprite) in sprites.iter_mut() {
        let Some(ant) = ants.get(marker.index) else {
            commands.entity(entity).despawn();
            continue;
        };
        seen[marker.index] = true;
        transform.translation = to_world(arena, ant.x, ant.y, 6.0);
        transform.rotation = Quat::from_rotation_z(-ant.heading);
        sprite.color = color_for(ant.has_food());
    }

    for (index, ant) in ants.iter().enumerate().filter(|(i, _)| !seen[*i]) {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: color_for(ant.has_food()),
                    custom_size: Some(Vec2::new(6.0, 4.0)),
                    ..default()
                },
                transform: Transform::from_translation(to_world(arena, ant.x, ant.y, 6.0))
                    .with_rotation(Quat::from_rotation_z(-ant.heading)),
                ..default()
            },
            AntSprite { index },
        ));
    }
}

pub fn update_stats_text(
    mut texts: Query<&mut Text, With<StatsText>>,
    state: Res<SimulationState>,
    recording: Res<RecordingState>,
) {
    let sim = &state.sim;
    let config = sim.config();
    let stats = sim.stats();
    let value = format!(
        "Ants: {} ({} returning)\nEvaporation Rate: {:.3}\nRandom Factor: {:.2}\nSpeed: {:.1}\n\
         Deliveries: {}  Food left: {:.1}\nTick: {}{}{}\n\
         R reset  Space pause  Up/Down ants  Left/Right speed\n\
         [/] evaporation  -/= random  V record  P frame",
        sim.ants().len(),
        sim.returning_count(),
        1.0 - config.evaporation_rate,
        config.random_movement_factor,
        config.ant_speed,
        stats.deliveries,
        sim.remaining_food(),
        stats.tick,
        if state.paused { "  [paused]" } else { "" },
        if recording.active { "  [rec]" } else { "" },
    );

    for mut text in texts.iter_mut() {
        text.sections[0].value.clone_from(&value);
    }
}

pub fn exit_system(input: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if input.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}
