//! Scene setup: camera, key light, background music and wireframe display

use bevy::audio::{AudioSink, AudioSinkPlayback, PlaybackSettings};
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::pbr::wireframe::Wireframe;
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;

use crate::luck_lab::config::LabConfig;
use crate::luck_lab::types::*;

pub fn setup_scene(mut commands: Commands, config: Res<LabConfig>, asset_server: Res<AssetServer>) {
    let orbit = OrbitCamera::home();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 60f32.to_radians(),
            ..default()
        }),
        Tonemapping::AcesFitted,
        Bloom::NATURAL,
        AmbientLight {
            color: Color::WHITE,
            ..default()
        },
        orbit,
        orbit.transform(),
        MainCamera,
        Name::new("MainCamera"),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
        KeyLight,
        Name::new("KeyLight"),
    ));

    commands.spawn((
        AudioPlayer::new(asset_server.load(config.music_path.clone())),
        PlaybackSettings::LOOP.paused(),
        BackgroundMusic,
        Name::new("BackgroundMusic"),
    ));
}

/// Play or pause the background track to match [`SceneToggles::music_playing`].
pub fn sync_music_playback(
    toggles: Res<SceneToggles>,
    mut sinks: Query<&mut AudioSink, With<BackgroundMusic>>,
) {
    if !toggles.is_changed() {
        return;
    }
    for mut sink in &mut sinks {
        if toggles.music_playing {
            sink.play();
        } else {
            sink.pause();
        }
    }
}

/// Show or hide wireframes on the model parts, including freshly loaded ones.
pub fn sync_wireframe(
    mut commands: Commands,
    toggles: Res<SceneToggles>,
    parts: Query<Entity, With<LabPart>>,
    added: Query<Entity, Added<LabPart>>,
) {
    let targets: Vec<Entity> = if toggles.is_changed() {
        parts.iter().collect()
    } else {
        added.iter().collect()
    };
    for entity in targets {
        if toggles.wireframe {
            commands.entity(entity).insert(Wireframe);
        } else {
            commands.entity(entity).remove::<Wireframe>();
        }
    }
}
