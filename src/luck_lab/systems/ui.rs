//! Control panel UI
//!
//! Material buttons and the size slider turn into lab request messages;
//! display systems mirror the lab state back into the panel every frame.

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_material_ui::prelude::*;
use bevy_material_ui::slider::{spawn_slider_control_with, MaterialSlider, SliderChangeEvent};

use crate::luck_lab::config::LabConfig;
use crate::luck_lab::types::*;

use super::theme::ActiveTheme;

/// Writers for every request a button can issue.
#[derive(SystemParam)]
pub struct LabRequests<'w> {
    pub roll: MessageWriter<'w, RollRequested>,
    pub reset: MessageWriter<'w, ResetRequested>,
    pub load_model: MessageWriter<'w, LoadModelRequested>,
    pub fate: MessageWriter<'w, SetFateMode>,
    pub glow: MessageWriter<'w, ToggleGlowSpin>,
    pub theme: MessageWriter<'w, SelectTheme>,
    pub wireframe: MessageWriter<'w, ToggleWireframe>,
    pub reset_view: MessageWriter<'w, ResetCameraView>,
    pub ambient: MessageWriter<'w, ToggleAmbientLight>,
    pub directional: MessageWriter<'w, ToggleDirectionalLight>,
    pub music: MessageWriter<'w, ToggleMusic>,
}

impl LabRequests<'_> {
    pub fn dispatch(&mut self, action: &LabAction, flags: &LabFlags) {
        match action {
            LabAction::Roll => {
                self.roll.write(RollRequested {
                    source: RollSource::Manual,
                });
            }
            LabAction::Reset => {
                self.reset.write(ResetRequested);
            }
            LabAction::SelectModel(key) => {
                self.load_model.write(LoadModelRequested {
                    key: key.key().to_string(),
                });
            }
            LabAction::ToggleFate => {
                self.fate.write(SetFateMode {
                    enabled: !flags.fate_mode_enabled,
                });
            }
            LabAction::ToggleGlow => {
                self.glow.write(ToggleGlowSpin);
            }
            LabAction::SelectTheme(key) => {
                self.theme.write(SelectTheme { key: key.clone() });
            }
            LabAction::ToggleWireframe => {
                self.wireframe.write(ToggleWireframe);
            }
            LabAction::ResetView => {
                self.reset_view.write(ResetCameraView);
            }
            LabAction::ToggleAmbientLight => {
                self.ambient.write(ToggleAmbientLight);
            }
            LabAction::ToggleDirectionalLight => {
                self.directional.write(ToggleDirectionalLight);
            }
            LabAction::ToggleMusic => {
                self.music.write(ToggleMusic);
            }
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    theme: &MaterialTheme,
    action: LabAction,
    label: &str,
    primary: bool,
) {
    let (builder, label_color) = if primary {
        (MaterialButtonBuilder::new(label).filled(), theme.on_primary)
    } else {
        (MaterialButtonBuilder::new(label).outlined(), theme.primary)
    };
    parent
        .spawn((builder.build(theme), LabButton(action)))
        .with_children(|button| {
            button.spawn((
                bevy_material_ui::button::ButtonLabel,
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(label_color),
                LabButtonLabel,
            ));
        });
}

fn spawn_row(parent: &mut ChildSpawnerCommands, build: impl FnOnce(&mut ChildSpawnerCommands)) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            align_items: AlignItems::Center,
            column_gap: Val::Px(6.0),
            row_gap: Val::Px(6.0),
            ..default()
        })
        .with_children(build);
}

fn spawn_heading(parent: &mut ChildSpawnerCommands, theme: &MaterialTheme, text: &str) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: 13.0,
            ..default()
        },
        TextColor(theme.on_surface_variant),
    ));
}

pub fn setup_ui(
    mut commands: Commands,
    config: Res<LabConfig>,
    scale: Res<ModelScale>,
    theme: Res<MaterialTheme>,
) {
    let theme = theme.as_ref();
    let themes: Vec<(String, String)> = config
        .themes
        .iter()
        .map(|(key, settings)| (key.clone(), settings.name.clone()))
        .collect();

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                width: Val::Px(320.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            BackgroundColor(theme.surface_container.with_alpha(0.9)),
            BorderRadius::all(Val::Px(12.0)),
            Interaction::None,
            LabPanel,
            Name::new("LabPanel"),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("Luck Lab"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(theme.on_surface),
            ));
            panel.spawn((
                Text::new(IDLE_RESULT_TEXT),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(theme.primary),
                ResultText,
            ));
            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(theme.on_surface_variant),
                LoadingIndicator,
            ));

            spawn_row(panel, |row| {
                spawn_button(row, theme, LabAction::Roll, "Roll", true);
                spawn_button(row, theme, LabAction::Reset, "Reset", false);
            });

            spawn_heading(panel, theme, "Model");
            spawn_row(panel, |row| {
                for key in ModelKey::ALL {
                    spawn_button(row, theme, LabAction::SelectModel(key), key.label(), false);
                }
            });

            spawn_heading(panel, theme, "Theme");
            spawn_row(panel, |row| {
                for (key, name) in &themes {
                    spawn_button(row, theme, LabAction::SelectTheme(key.clone()), name, false);
                }
            });

            spawn_heading(panel, theme, "Size");
            spawn_row(panel, |row| {
                row.spawn(Node {
                    width: Val::Px(220.0),
                    height: Val::Px(32.0),
                    ..default()
                })
                .with_children(|slot| {
                    let slider = MaterialSlider::new(config.size.min, config.size.max)
                        .with_value(scale.multiplier)
                        .track_height(6.0)
                        .thumb_radius(8.0);
                    spawn_slider_control_with(slot, theme, slider, SizeSlider);
                });
                row.spawn((
                    Text::new(scale.label()),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(theme.on_surface_variant),
                    SizeText,
                ));
            });

            spawn_heading(panel, theme, "Modes");
            spawn_row(panel, |row| {
                spawn_button(row, theme, LabAction::ToggleFate, "Fate Mode: OFF", false);
                spawn_button(row, theme, LabAction::ToggleGlow, "Glow & Spin", false);
            });

            spawn_heading(panel, theme, "Scene");
            spawn_row(panel, |row| {
                spawn_button(row, theme, LabAction::ToggleWireframe, "View Wireframe", false);
                spawn_button(row, theme, LabAction::ResetView, "Reset View", false);
                spawn_button(row, theme, LabAction::ToggleAmbientLight, "Ambient Light ON", false);
                spawn_button(
                    row,
                    theme,
                    LabAction::ToggleDirectionalLight,
                    "Directional Light ON",
                    false,
                );
                spawn_button(row, theme, LabAction::ToggleMusic, "Play Music", false);
            });

            spawn_heading(panel, theme, "History");
            for index in 0..config.history_limit {
                panel.spawn((
                    Text::new(format!("{}. {}", index + 1, HISTORY_PLACEHOLDER)),
                    TextFont {
                        font_size: 15.0,
                        ..default()
                    },
                    TextColor(theme.on_surface),
                    HistorySlot(index),
                ));
            }
        });
}

// ============================================================================
// Input
// ============================================================================

/// Turn button clicks into requests. Disabled buttons do nothing.
pub fn handle_lab_buttons(
    mut clicks: MessageReader<ButtonClickEvent>,
    buttons: Query<&LabButton>,
    controls: Res<ControlAvailability>,
    flags: Res<LabFlags>,
    mut requests: LabRequests,
) {
    for click in clicks.read() {
        let Ok(button) = buttons.get(click.entity) else {
            continue;
        };
        if !button.0.is_enabled(&controls) {
            debug!("Ignoring disabled control {:?}", button.0);
            continue;
        }
        requests.dispatch(&button.0, &flags);
    }
}

/// Slider moves become size requests, snapped to the configured step.
pub fn handle_size_slider(
    mut changes: MessageReader<SliderChangeEvent>,
    sliders: Query<(), With<SizeSlider>>,
    controls: Res<ControlAvailability>,
    scale: Res<ModelScale>,
    config: Res<LabConfig>,
    mut sizes: MessageWriter<SetSizeMultiplier>,
) {
    for change in changes.read() {
        if sliders.get(change.entity).is_err() || !controls.size {
            continue;
        }
        let multiplier = config.size.snap(change.value);
        if multiplier != scale.multiplier {
            sizes.write(SetSizeMultiplier { multiplier });
        }
    }
}

/// Space rolls, R resets.
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    controls: Res<ControlAvailability>,
    mut rolls: MessageWriter<RollRequested>,
    mut resets: MessageWriter<ResetRequested>,
) {
    if keyboard.just_pressed(KeyCode::Space) && controls.roll {
        rolls.write(RollRequested {
            source: RollSource::Manual,
        });
    }
    if keyboard.just_pressed(KeyCode::KeyR) && controls.reset {
        resets.write(ResetRequested);
    }
}

// ============================================================================
// Display
// ============================================================================

fn set_text(text: &mut Mut<Text>, value: &str) {
    if text.0 != value {
        text.0 = value.to_string();
    }
}

pub fn update_result_text(status: Res<LabStatus>, mut texts: Query<&mut Text, With<ResultText>>) {
    for mut text in &mut texts {
        set_text(&mut text, &status.result_text);
    }
}

pub fn update_loading_indicator(
    status: Res<LabStatus>,
    mut texts: Query<&mut Text, With<LoadingIndicator>>,
) {
    let message = if status.loading {
        "Loading model..."
    } else {
        status.load_error.as_deref().unwrap_or("")
    };
    for mut text in &mut texts {
        set_text(&mut text, message);
    }
}

pub fn update_history_list(
    history: Res<RollHistory>,
    mut slots: Query<(&HistorySlot, &mut Text)>,
) {
    if !history.is_changed() {
        return;
    }
    let rendered = history.render();
    for (slot, mut text) in &mut slots {
        let value = rendered
            .get(slot.0)
            .map(String::as_str)
            .unwrap_or(HISTORY_PLACEHOLDER);
        set_text(&mut text, &format!("{}. {}", slot.0 + 1, value));
    }
}

pub fn update_size_text(scale: Res<ModelScale>, mut texts: Query<&mut Text, With<SizeText>>) {
    for mut text in &mut texts {
        set_text(&mut text, &scale.label());
    }
}

/// Keep the slider on the applied multiplier, so rejected moves snap back.
pub fn sync_size_slider(
    scale: Res<ModelScale>,
    mut sliders: Query<&mut MaterialSlider, With<SizeSlider>>,
) {
    for mut slider in &mut sliders {
        let value = scale.multiplier.clamp(slider.min, slider.max);
        if (slider.value - value).abs() > 1e-4 {
            slider.value = value;
        }
    }
}

/// Disable buttons by availability (and the active model/theme option), and
/// refresh toggle captions.
pub fn update_lab_buttons(
    controls: Res<ControlAvailability>,
    flags: Res<LabFlags>,
    toggles: Res<SceneToggles>,
    selected: Res<SelectedModel>,
    active: Res<ActiveTheme>,
    mut buttons: Query<(&LabButton, &mut MaterialButton, &Children)>,
    mut labels: Query<&mut Text, With<LabButtonLabel>>,
) {
    for (button, mut material, children) in &mut buttons {
        let disabled =
            !button.0.is_enabled(&controls) || button.0.is_current(selected.key, &active.key);
        if material.disabled != disabled {
            material.disabled = disabled;
        }

        let Some(caption) = button.0.dynamic_label(&flags, &toggles) else {
            continue;
        };
        for child in children.to_vec() {
            if let Ok(mut text) = labels.get_mut(child) {
                set_text(&mut text, caption);
            }
        }
    }
}
