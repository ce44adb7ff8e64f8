//! Orbit camera
//!
//! Drag with the left mouse button or use A/D to orbit, scroll or W/S to zoom.
//! Orbiting stays available during Fate Mode rolls.

use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;

use crate::luck_lab::types::*;

const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;
const KEY_ROTATION_SPEED: f32 = 1.0;
const KEY_ZOOM_SPEED: f32 = 2.0;
const SCROLL_ZOOM_PER_LINE: f32 = 0.25;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.05;

#[allow(clippy::too_many_arguments)]
pub fn orbit_camera(
    controls: Res<ControlAvailability>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    time: Res<Time>,
    panel: Query<&Interaction, Or<(With<LabButton>, With<LabPanel>, With<SizeSlider>)>>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform), With<MainCamera>>,
) {
    if !controls.camera_orbit {
        return;
    }
    let over_ui = panel.iter().any(|i| *i != Interaction::None);
    let dt = time.delta_secs();

    let mut yaw = 0.0;
    let mut pitch = 0.0;
    let mut zoom = 0.0;

    if mouse_buttons.pressed(MouseButton::Left) && !over_ui {
        yaw -= motion.delta.x * DRAG_RADIANS_PER_PIXEL;
        pitch += motion.delta.y * DRAG_RADIANS_PER_PIXEL;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        yaw += KEY_ROTATION_SPEED * dt;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        yaw -= KEY_ROTATION_SPEED * dt;
    }

    if !over_ui {
        zoom -= match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y * SCROLL_ZOOM_PER_LINE,
            MouseScrollUnit::Pixel => scroll.delta.y * SCROLL_ZOOM_PER_LINE / 40.0,
        };
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        zoom -= KEY_ZOOM_SPEED * dt;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        zoom += KEY_ZOOM_SPEED * dt;
    }

    if yaw == 0.0 && pitch == 0.0 && zoom == 0.0 {
        return;
    }

    for (mut orbit, mut transform) in &mut cameras {
        orbit.yaw += yaw;
        orbit.pitch = (orbit.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        orbit.distance =
            (orbit.distance + zoom).clamp(OrbitCamera::MIN_DISTANCE, OrbitCamera::MAX_DISTANCE);
        *transform = orbit.transform();
    }
}

pub fn handle_reset_view(
    mut requests: MessageReader<ResetCameraView>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform), With<MainCamera>>,
) {
    if requests.read().count() == 0 {
        return;
    }
    for (mut orbit, mut transform) in &mut cameras {
        *orbit = OrbitCamera::home();
        *transform = orbit.transform();
    }
    info!("Camera view reset");
}
