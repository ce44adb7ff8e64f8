//! Luck Lab - an explode/reassemble 3D dice and coin roller built on Bevy.
//!
//! The `luck_lab` module holds everything: configuration, the roll lifecycle
//! state machine, the part registry, mode controllers and the Bevy plugins
//! that wire them into an application.

pub mod luck_lab;
