//! Type definitions for the Luck Lab
//!
//! This module is organized into submodules:
//! - `model` - Model keys and roll outcomes
//! - `history` - The fixed-length roll history
//! - `lifecycle` - Roll phases, lab flags, control availability and status
//! - `parts` - Parts, their rest poses and the model scale
//! - `messages` - Requests and notifications exchanged between systems
//! - `ui` - UI marker components and scene-level toggles

pub mod history;
pub mod lifecycle;
pub mod messages;
pub mod model;
pub mod parts;
pub mod ui;

pub use history::*;
pub use lifecycle::*;
pub use messages::*;
pub use model::*;
pub use parts::*;
pub use ui::*;
