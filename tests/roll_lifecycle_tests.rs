//! End-to-end tests for the roll lifecycle, modes and model swaps

mod common;

use bevy::prelude::*;

use common::*;
use lucklab::luck_lab::*;

const ROLL_FRAMES: usize = 200;

fn finish_roll(app: &mut App) {
    let before = completed_rolls(app.world());
    assert!(
        run_until(app, ROLL_FRAMES, |world| completed_rolls(world) > before),
        "roll never completed"
    );
}

#[test]
fn test_launch_model_is_registered_and_normalized() {
    let app = ready_app();
    let world = app.world();

    let registry = world.resource::<PartRegistry>();
    assert_eq!(registry.parts().len(), 3);
    assert_eq!(registry.originals().len(), 3);
    for (index, part) in registry.parts().iter().enumerate() {
        assert_eq!(world.get::<LabPart>(*part), Some(&LabPart { index }));
    }

    // Three unit cubes in a row span two units.
    let scale = world.resource::<ModelScale>();
    assert!((scale.base - 0.5).abs() < 1e-5);
    let root = root_transform(world);
    assert!(root.scale.abs_diff_eq(Vec3::splat(0.5), 1e-5));
    assert!(root.translation.abs_diff_eq(Vec3::new(0.0, 0.25, 0.0), 1e-5));

    let status = world.resource::<LabStatus>();
    assert!(!status.loading);
    assert_eq!(status.result_text, IDLE_RESULT_TEXT);
    assert!(world.resource::<ControlAvailability>().roll);
}

#[test]
fn test_d6_roll_runs_every_phase() {
    let mut app = ready_app();
    request_roll(&mut app);
    app.update();

    {
        let world = app.world();
        assert!(world.resource::<LabFlags>().is_animating);
        assert_eq!(world.resource::<LabStatus>().result_text, EXPLODING_TEXT);
        let controls = world.resource::<ControlAvailability>();
        assert!(!controls.roll);
        assert!(!controls.model_select);
        assert!(!controls.size);
        assert!(controls.reset);
    }

    run_frames(&mut app, 10);
    assert!(!parts_at_rest(app.world()), "parts should be flying apart");

    assert!(run_until(&mut app, ROLL_FRAMES, |world| {
        world.resource::<LabStatus>().result_text == REASSEMBLING_TEXT
    }));

    finish_roll(&mut app);
    let world = app.world();
    assert!(is_idle(world));
    assert!(parts_at_rest(world));

    let text = &world.resource::<LabStatus>().result_text;
    let value: u32 = text
        .strip_prefix("D6: ")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("unexpected result text {text:?}"));
    assert!((1..=6).contains(&value));

    let history = world.resource::<RollHistory>();
    assert_eq!(history.latest(), Some(value.to_string().as_str()));
    assert_eq!(history.recorded(), 1);
    assert_eq!(
        world.resource::<RollLifecycle>().last_outcome,
        Some(RollOutcome::Die {
            model: ModelKey::D6,
            value
        })
    );
}

#[test]
fn test_animating_flag_spans_the_whole_roll() {
    let mut app = ready_app();
    request_roll(&mut app);
    app.update();
    assert!(app.world().resource::<LabFlags>().is_animating);

    let mut frames = 0;
    while completed_rolls(app.world()) == 0 {
        assert!(frames < ROLL_FRAMES, "roll never completed");
        assert!(
            app.world().resource::<LabFlags>().is_animating,
            "animating flag dropped on frame {frames} in {:?}",
            app.world().resource::<RollLifecycle>().phase
        );
        app.update();
        frames += 1;
    }
    assert!(!app.world().resource::<LabFlags>().is_animating);
    assert!(is_idle(app.world()));
    assert!(app.world().resource::<ControlAvailability>().roll);
}

#[test]
fn test_rotated_rest_poses_come_back_exactly() {
    let mut app = ready_app();
    let before = part_poses(app.world());
    assert!(before
        .iter()
        .all(|(_, pose)| pose.rotation.angle_between(Quat::IDENTITY) > 1.0));

    request_roll(&mut app);
    run_frames(&mut app, 10);
    assert!(!parts_at_rest(app.world()));
    finish_roll(&mut app);

    assert!(parts_at_rest(app.world()));
    for ((_, was), (_, now)) in before.iter().zip(part_poses(app.world())) {
        assert!(was.approx_eq(&now, 1e-4), "{was:?} became {now:?}");
    }
}

#[test]
fn test_gltf_nodes_explode_away_from_model_center() {
    let mut app = ready_gltf_app();
    let parts = app.world().resource::<PartRegistry>().parts().to_vec();
    assert_eq!(parts.len(), node_offsets(ModelKey::D6).len());

    request_roll(&mut app);
    app.update();

    let travel = app.world().resource::<LabConfig>().animation.explosion_strength;
    let world = app.world();
    for part in parts {
        let node = world.get::<ChildOf>(part).expect("primitive under a node").parent();
        let node_transform = world.get::<Transform>(node).expect("node transform");
        let to_model = Mat4::from_scale_rotation_translation(
            node_transform.scale,
            node_transform.rotation,
            node_transform.translation,
        );
        let tween = world.get::<PartTween>(part).expect("part is tweening");
        assert_eq!(tween.start.translation, Vec3::ZERO);

        let start = to_model.transform_point3(tween.start.translation);
        let end = to_model.transform_point3(tween.end.translation);
        let moved = end - start;
        assert!((moved.length() - travel).abs() < 1e-3, "moved {moved}");
        assert!(
            moved.normalize().dot(node_transform.translation.normalize()) > 0.99,
            "part under node at {} moved {moved}",
            node_transform.translation
        );
    }

    finish_roll(&mut app);
    assert!(parts_at_rest(app.world()));
}

#[test]
fn test_roll_requests_during_a_roll_are_dropped() {
    let mut app = ready_app();
    request_roll(&mut app);
    request_roll(&mut app);
    app.update();
    run_frames(&mut app, 5);
    request_roll(&mut app);

    run_frames(&mut app, ROLL_FRAMES);
    assert_eq!(completed_rolls(app.world()), 1);
    assert_eq!(app.world().resource::<RollHistory>().recorded(), 1);
    assert!(is_idle(app.world()));
}

#[test]
fn test_history_keeps_five_most_recent() {
    let mut app = ready_app();
    for _ in 0..6 {
        request_roll(&mut app);
        finish_roll(&mut app);
    }
    let history = app.world().resource::<RollHistory>();
    assert_eq!(history.limit(), 5);
    assert_eq!(history.recorded(), 5);
    assert!(history
        .render()
        .iter()
        .all(|v| v.parse::<u32>().is_ok_and(|n| (1..=6).contains(&n))));
}

#[test]
fn test_roll_fires_particle_burst() {
    struct Marker;
    impl ParticleBurst for Marker {
        fn burst(&self, commands: &mut Commands, origin: Vec3) -> Option<Entity> {
            Some(commands.spawn(Transform::from_translation(origin)).id())
        }
    }

    let mut app = ready_app();
    app.insert_resource(ParticleHooks::new(Marker));
    request_roll(&mut app);
    finish_roll(&mut app);
    app.update();

    let mut bursts = app.world_mut().query::<&ParticleBurstInstance>();
    assert_eq!(bursts.iter(app.world()).count(), 1);

    // Default lifetime is two seconds.
    run_frames(&mut app, 50);
    let mut bursts = app.world_mut().query::<&ParticleBurstInstance>();
    assert_eq!(bursts.iter(app.world()).count(), 0);
}

#[test]
fn test_glow_blocks_rolls_and_spins_model() {
    let mut app = ready_app();
    send(&mut app, ToggleGlowSpin);
    app.update();

    let light = app.world().resource::<GlowSpin>().light.expect("glow light");
    assert!(app.world().get::<PointLight>(light).is_some());
    assert!(app.world().resource::<LabFlags>().is_glowing_and_spinning);
    assert!(!app.world().resource::<ControlAvailability>().roll);

    request_roll(&mut app);
    run_frames(&mut app, 10);
    assert_eq!(completed_rolls(app.world()), 0);
    assert!(!app.world().resource::<LabFlags>().is_animating);
    assert!(root_transform(app.world()).rotation.angle_between(Quat::IDENTITY) > 0.1);

    send(&mut app, ToggleGlowSpin);
    app.update();
    assert!(!app.world().resource::<LabFlags>().is_glowing_and_spinning);
    assert!(app.world().resource::<GlowSpin>().light.is_none());
    assert!(app.world().get_entity(light).is_err());
}

#[test]
fn test_glow_rejected_while_animating() {
    let mut app = ready_app();
    request_roll(&mut app);
    app.update();
    send(&mut app, ToggleGlowSpin);
    app.update();

    assert!(!app.world().resource::<LabFlags>().is_glowing_and_spinning);
    assert!(app.world().resource::<GlowSpin>().light.is_none());
}

#[test]
fn test_fate_mode_rolls_once_per_interval() {
    let mut app = ready_app();
    send(&mut app, SetFateMode { enabled: true });
    app.update();

    {
        let world = app.world();
        assert!(world.resource::<LabFlags>().fate_mode_enabled);
        let controls = world.resource::<ControlAvailability>();
        assert!(controls.fate_toggle);
        assert!(controls.reset);
        assert!(!controls.roll);
        assert!(!controls.glow_toggle);
    }

    // Just short of the ten second interval.
    run_frames(&mut app, 190);
    assert_eq!(completed_rolls(app.world()), 0);
    assert!(!app.world().resource::<LabFlags>().is_animating);

    finish_roll(&mut app);
    run_frames(&mut app, 40);
    assert_eq!(completed_rolls(app.world()), 1);

    send(&mut app, SetFateMode { enabled: false });
    app.update();
    assert!(!app.world().resource::<LabFlags>().fate_mode_enabled);
    assert!(app.world().resource::<ControlAvailability>().roll);
}

#[test]
fn test_fate_mode_rejected_while_glowing() {
    let mut app = ready_app();
    send(&mut app, ToggleGlowSpin);
    app.update();
    send(&mut app, SetFateMode { enabled: true });
    app.update();
    assert!(!app.world().resource::<LabFlags>().fate_mode_enabled);
}

#[test]
fn test_size_change_rescales_and_keeps_rest_poses() {
    let mut app = ready_app();
    let before: Vec<_> = part_poses(app.world());

    send(&mut app, SetSizeMultiplier { multiplier: 2.0 });
    app.update();

    let world = app.world();
    assert_eq!(world.resource::<ModelScale>().multiplier, 2.0);
    let root = root_transform(world);
    assert!(root.scale.abs_diff_eq(Vec3::ONE, 1e-5));
    assert!(root.translation.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-5));
    assert_eq!(part_poses(world), before);
    assert!(parts_at_rest(world));

    send(&mut app, SetSizeMultiplier { multiplier: 9.0 });
    app.update();
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 2.0);

    send(&mut app, SetSizeMultiplier { multiplier: 0.1 });
    app.update();
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 0.5);
}

#[test]
fn test_size_change_ignored_during_roll() {
    let mut app = ready_app();
    request_roll(&mut app);
    app.update();
    send(&mut app, SetSizeMultiplier { multiplier: 2.0 });
    app.update();
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 1.0);

    finish_roll(&mut app);
    assert!(parts_at_rest(app.world()));
}

#[test]
fn test_size_change_ignored_while_glowing() {
    let mut app = ready_app();
    send(&mut app, ToggleGlowSpin);
    app.update();
    let root_before = root_transform(app.world());

    send(&mut app, SetSizeMultiplier { multiplier: 2.0 });
    app.update();
    let world = app.world();
    assert_eq!(world.resource::<ModelScale>().multiplier, 1.0);
    assert!(root_transform(world).scale.abs_diff_eq(root_before.scale, 1e-6));
    assert!(world.resource::<LabFlags>().is_glowing_and_spinning);
}

#[test]
fn test_size_change_ignored_in_fate_mode() {
    let mut app = ready_app();
    send(&mut app, SetFateMode { enabled: true });
    app.update();
    assert!(!app.world().resource::<ControlAvailability>().size);

    send(&mut app, SetSizeMultiplier { multiplier: 2.0 });
    app.update();
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 1.0);

    send(&mut app, SetFateMode { enabled: false });
    app.update();
    send(&mut app, SetSizeMultiplier { multiplier: 2.0 });
    app.update();
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 2.0);
}

#[test]
fn test_reset_interrupts_roll() {
    let mut app = ready_app();
    request_roll(&mut app);
    run_frames(&mut app, 8);
    send(&mut app, ResetRequested);
    app.update();

    assert!(is_idle(app.world()));
    assert!(parts_at_rest(app.world()));
    assert_eq!(active_tweens(&mut app), 0);
    assert_eq!(
        app.world().resource::<LabStatus>().result_text,
        IDLE_RESULT_TEXT
    );

    // Nothing from the cancelled roll lands later.
    run_frames(&mut app, ROLL_FRAMES);
    assert_eq!(completed_rolls(app.world()), 0);
    assert_eq!(app.world().resource::<RollHistory>().recorded(), 0);
}

#[test]
fn test_reset_switches_modes_off() {
    let mut app = ready_app();
    send(&mut app, ToggleGlowSpin);
    run_frames(&mut app, 10);
    send(&mut app, ResetRequested);
    app.update();

    let world = app.world();
    assert!(!world.resource::<LabFlags>().is_glowing_and_spinning);
    assert!(world.resource::<GlowSpin>().light.is_none());
    assert!(root_transform(world).rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));

    send(&mut app, SetFateMode { enabled: true });
    app.update();
    send(&mut app, ResetRequested);
    app.update();
    assert!(!app.world().resource::<LabFlags>().fate_mode_enabled);
    assert!(app.world().resource::<LabFlags>().can_interact());
}

#[test]
fn test_model_swap_keeps_history() {
    let mut app = ready_app();
    request_roll(&mut app);
    finish_roll(&mut app);
    let old_root = app.world().resource::<PartRegistry>().root().expect("root");

    send(
        &mut app,
        LoadModelRequested {
            key: "coin".to_string(),
        },
    );
    assert!(run_until(&mut app, 10, |world| {
        world.resource::<PartRegistry>().parts().len() == 2
    }));
    assert!(app.world().get_entity(old_root).is_err());
    assert_eq!(app.world().resource::<SelectedModel>().key, ModelKey::Coin);
    assert_eq!(app.world().resource::<RollHistory>().recorded(), 1);
    assert_eq!(app.world().resource::<ModelScale>().multiplier, 1.0);

    request_roll(&mut app);
    finish_roll(&mut app);
    let world = app.world();
    let text = &world.resource::<LabStatus>().result_text;
    assert!(text == "Coin: Heads" || text == "Coin: Tails", "{text}");
    let latest = world.resource::<RollHistory>().latest();
    assert!(matches!(latest, Some("Heads") | Some("Tails")));
    assert_eq!(world.resource::<RollHistory>().recorded(), 2);
}

#[test]
fn test_model_swap_mid_roll_interrupts() {
    let mut app = ready_app();
    request_roll(&mut app);
    run_frames(&mut app, 5);
    send(
        &mut app,
        LoadModelRequested {
            key: "d12".to_string(),
        },
    );
    assert!(run_until(&mut app, 10, |world| {
        world.resource::<PartRegistry>().parts().len() == 4
    }));

    assert!(is_idle(app.world()));
    assert_eq!(active_tweens(&mut app), 0);
    run_frames(&mut app, ROLL_FRAMES);
    assert_eq!(completed_rolls(app.world()), 0);

    request_roll(&mut app);
    finish_roll(&mut app);
    let text = app.world().resource::<LabStatus>().result_text.clone();
    let value: u32 = text
        .strip_prefix("D12: ")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("unexpected result text {text:?}"));
    assert!((1..=12).contains(&value));
}

#[test]
fn test_unknown_model_key_is_ignored() {
    let mut app = ready_app();
    let root = app.world().resource::<PartRegistry>().root();
    send(
        &mut app,
        LoadModelRequested {
            key: "d20".to_string(),
        },
    );
    run_frames(&mut app, 3);

    let world = app.world();
    assert_eq!(world.resource::<SelectedModel>().key, ModelKey::D6);
    assert_eq!(world.resource::<PartRegistry>().root(), root);
    assert!(!world.resource::<LabStatus>().loading);
}

#[test]
fn test_theme_selection() {
    let mut app = ready_app();
    assert_eq!(app.world().resource::<ActiveTheme>().key, DEFAULT_THEME_KEY);

    send(
        &mut app,
        SelectTheme {
            key: "fantasy".to_string(),
        },
    );
    app.update();
    let theme = app.world().resource::<ActiveTheme>();
    assert_eq!(theme.key, "fantasy");
    assert_eq!(theme.theme.name, "Mystical Grove");

    send(
        &mut app,
        SelectTheme {
            key: "vaporwave".to_string(),
        },
    );
    app.update();
    assert_eq!(app.world().resource::<ActiveTheme>().key, "fantasy");
}

#[test]
fn test_load_failure_shows_error() {
    let mut app = ready_app();
    send(
        &mut app,
        ModelLoadFailed {
            key: ModelKey::D12,
            path: "models/die12.glb".to_string(),
            reason: "file not found".to_string(),
        },
    );
    app.update();

    let status = app.world().resource::<LabStatus>();
    assert_eq!(status.result_text, LOAD_ERROR_TEXT);
    assert!(!status.loading);
    let error = status.load_error.as_deref().expect("load error");
    assert!(error.contains("models/die12.glb"));
}

#[test]
fn test_launch_options_apply_at_startup() {
    let mut app = lab_app_with(
        LabConfig::default(),
        LaunchOptions {
            model: ModelKey::Coin,
            theme: Some("scifi".to_string()),
            size: Some(1.5),
            fate: false,
        },
    );
    assert!(run_until(&mut app, 10, |world| {
        !world.resource::<PartRegistry>().is_empty()
    }));

    let world = app.world();
    assert_eq!(world.resource::<PartRegistry>().parts().len(), 2);
    assert_eq!(world.resource::<ActiveTheme>().key, "scifi");
    assert_eq!(world.resource::<ModelScale>().multiplier, 1.5);
}

#[test]
fn test_scene_toggles_flip() {
    let mut app = ready_app();
    let before = *app.world().resource::<SceneToggles>();
    send(&mut app, ToggleWireframe);
    send(&mut app, ToggleMusic);
    send(&mut app, ToggleAmbientLight);
    app.update();

    let after = app.world().resource::<SceneToggles>();
    assert_eq!(after.wireframe, !before.wireframe);
    assert_eq!(after.music_playing, !before.music_playing);
    assert_eq!(after.ambient_light, !before.ambient_light);
    assert_eq!(after.directional_light, before.directional_light);
}
