//! Headless lab app used by the integration tests

#![allow(dead_code)]

use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use lucklab::luck_lab::*;

pub const FRAME: Duration = Duration::from_millis(50);
pub const SEED: u64 = 0x1ab;

/// Stand-in for the glTF scene layer: every model is a row of unit cubes,
/// each turned a quarter or half turn so rest poses carry real rotations.
pub fn spawn_cube_models(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut requests: MessageReader<SpawnModel>,
    mut ready: MessageWriter<ModelReady>,
) {
    for request in requests.read() {
        let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
        let root = spawn_model_root(&mut commands, request);
        for (index, x) in part_offsets(request.key).into_iter().enumerate() {
            commands.spawn((
                Mesh3d(cube.clone()),
                Transform::from_xyz(x, 0.0, 0.0).with_rotation(rest_rotation(index)),
                ChildOf(root),
            ));
        }
        ready.write(ModelReady { root });
    }
}

/// Models laid out the way glTF scenes spawn: the root holds node entities
/// carrying the offsets, and each node holds one mesh primitive at identity.
pub fn spawn_gltf_shaped_models(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut requests: MessageReader<SpawnModel>,
    mut ready: MessageWriter<ModelReady>,
) {
    for request in requests.read() {
        let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
        let root = spawn_model_root(&mut commands, request);
        for (index, offset) in node_offsets(request.key).into_iter().enumerate() {
            let node = commands
                .spawn((
                    Transform::from_translation(offset).with_rotation(rest_rotation(index)),
                    ChildOf(root),
                ))
                .id();
            commands.spawn((Mesh3d(cube.clone()), Transform::default(), ChildOf(node)));
        }
        ready.write(ModelReady { root });
    }
}

fn spawn_model_root(commands: &mut Commands, request: &SpawnModel) -> Entity {
    commands
        .spawn((
            Transform::default(),
            LabModel { key: request.key },
            Name::new(request.path.clone()),
        ))
        .id()
}

/// Axis-aligned turns keep a unit cube's bounds unchanged.
pub fn rest_rotation(index: usize) -> Quat {
    match index % 4 {
        0 => Quat::from_rotation_x(FRAC_PI_2),
        1 => Quat::from_rotation_y(PI),
        2 => Quat::from_rotation_z(-FRAC_PI_2),
        _ => Quat::from_rotation_x(PI),
    }
}

pub fn part_offsets(key: ModelKey) -> Vec<f32> {
    match key {
        ModelKey::D6 => vec![-0.5, 0.0, 0.5],
        ModelKey::D12 => vec![-1.5, -0.5, 0.5, 1.5],
        ModelKey::Coin => vec![-0.5, 0.5],
    }
}

pub fn node_offsets(key: ModelKey) -> Vec<Vec3> {
    match key {
        ModelKey::D6 => vec![
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(-1.5, 0.0, 0.0),
            Vec3::new(0.0, 1.5, 0.0),
        ],
        ModelKey::D12 => vec![
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(-1.5, 0.0, 0.0),
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(0.0, 0.0, -1.5),
        ],
        ModelKey::Coin => vec![Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -0.5, 0.0)],
    }
}

pub fn lab_app() -> App {
    lab_app_with(LabConfig::default(), LaunchOptions::default())
}

pub fn lab_app_with(config: LabConfig, launch: LaunchOptions) -> App {
    let mut app = base_app(config, launch);
    app.add_systems(Update, spawn_cube_models.in_set(LabSet::Present));
    app
}

pub fn gltf_lab_app() -> App {
    let mut app = base_app(LabConfig::default(), LaunchOptions::default());
    app.add_systems(Update, spawn_gltf_shaped_models.in_set(LabSet::Present));
    app
}

fn base_app(config: LabConfig, launch: LaunchOptions) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .init_resource::<Assets<Mesh>>()
        .add_plugins(LuckLabCorePlugin {
            config,
            seed: Some(SEED),
            launch,
        });
    app
}

/// Run frames until `done` holds, up to `max_frames`. Returns whether it held.
pub fn run_until(app: &mut App, max_frames: usize, done: impl Fn(&World) -> bool) -> bool {
    for _ in 0..max_frames {
        app.update();
        if done(app.world()) {
            return true;
        }
    }
    false
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// A lab app with its launch model installed.
pub fn ready_app() -> App {
    wait_until_ready(lab_app())
}

pub fn ready_gltf_app() -> App {
    wait_until_ready(gltf_lab_app())
}

fn wait_until_ready(mut app: App) -> App {
    assert!(
        run_until(&mut app, 10, |world| !world.resource::<PartRegistry>().is_empty()),
        "launch model never became ready"
    );
    app
}

pub fn send<M: Message>(app: &mut App, message: M) {
    app.world_mut().write_message(message);
}

pub fn request_roll(app: &mut App) {
    send(
        app,
        RollRequested {
            source: RollSource::Manual,
        },
    );
}

pub fn completed_rolls(world: &World) -> u64 {
    world.resource::<RollLifecycle>().completed_rolls
}

pub fn is_idle(world: &World) -> bool {
    !world.resource::<LabFlags>().is_animating && world.resource::<RollLifecycle>().is_idle()
}

/// Current local pose of every registered part, in registry order.
pub fn part_poses(world: &World) -> Vec<(Entity, PartPose)> {
    world
        .resource::<PartRegistry>()
        .parts()
        .iter()
        .filter_map(|&part| {
            world
                .get::<Transform>(part)
                .map(|transform| (part, PartPose::from_transform(transform)))
        })
        .collect()
}

pub fn parts_at_rest(world: &World) -> bool {
    let registry = world.resource::<PartRegistry>();
    part_poses(world).iter().all(|(part, pose)| {
        registry
            .original(*part)
            .is_some_and(|original| original.approx_eq(pose, 1e-4))
    })
}

pub fn active_tweens(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&PartTween>();
    query.iter(app.world()).count()
}

pub fn root_transform(world: &World) -> Transform {
    let root = world
        .resource::<PartRegistry>()
        .root()
        .expect("model root");
    *world.get::<Transform>(root).expect("root transform")
}
