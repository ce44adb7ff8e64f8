// Hide console window on Windows for release builds (GUI app).
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

use lucklab::luck_lab::{LabConfig, LaunchOptions, LuckLabCorePlugin, LuckLabPlugin, ModelKey};

/// Luck Lab: explode and reassemble a 3D die or coin to roll it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to load first (d6, d12 or coin)
    #[arg(short, long, default_value = "d6")]
    model: String,

    /// Theme key to start with (e.g. "default", "fantasy", "scifi")
    #[arg(short, long)]
    theme: Option<String>,

    /// Size multiplier, clamped to the configured range
    #[arg(short, long)]
    size: Option<f32>,

    /// Start with Fate Mode enabled
    #[arg(long)]
    fate: bool,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Path to a RON or JSON lab config
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> AppExit {
    let args = Args::parse();

    // The log plugin isn't up yet, so config problems go to stderr.
    let config = match &args.config {
        Some(path) => LabConfig::load_from_path(path).unwrap_or_else(|e| {
            eprintln!("{e}; using default config");
            LabConfig::default()
        }),
        None => LabConfig::default(),
    };

    let model = ModelKey::parse(&args.model).unwrap_or_else(|e| {
        eprintln!("{e}; loading d6");
        ModelKey::D6
    });

    let launch = LaunchOptions {
        model,
        theme: args.theme,
        size: args.size,
        fate: args.fate,
    };

    let mut app = App::new();
    app.set_error_handler(bevy::ecs::error::warn);
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Luck Lab".to_string(),
                    ..default()
                }),
                ..default()
            })
            // Keep lab logs at info, but quiet the UI crate's scroll spam.
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                filter: "info,wgpu=error,bevy_material_ui=warn,bevy_material_ui::scroll=off"
                    .to_string(),
                ..default()
            }),
    )
    .add_plugins(LuckLabPlugin {
        core: LuckLabCorePlugin {
            config,
            seed: args.seed,
            launch,
        },
    });
    app.run()
}
