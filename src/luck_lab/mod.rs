pub mod config;
pub mod error;
pub mod hanabi_fx;
pub mod particles;
pub mod plugin;
pub mod systems;
pub mod types;

pub use config::*;
pub use error::*;
pub use particles::*;
pub use plugin::*;
pub use systems::*;
pub use types::*;
