//! Model keys and roll outcomes

use std::fmt;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::luck_lab::error::{LabError, LabResult};

/// The three models the lab can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    #[default]
    D6,
    D12,
    Coin,
}

impl ModelKey {
    pub const ALL: [ModelKey; 3] = [ModelKey::D6, ModelKey::D12, ModelKey::Coin];

    pub fn key(&self) -> &'static str {
        match self {
            ModelKey::D6 => "d6",
            ModelKey::D12 => "d12",
            ModelKey::Coin => "coin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelKey::D6 => "D6",
            ModelKey::D12 => "D12",
            ModelKey::Coin => "Coin",
        }
    }

    pub fn parse(s: &str) -> LabResult<ModelKey> {
        match s.trim().to_lowercase().as_str() {
            "d6" => Ok(ModelKey::D6),
            "d12" => Ok(ModelKey::D12),
            "coin" => Ok(ModelKey::Coin),
            _ => Err(LabError::UnknownAssetKey(s.to_string())),
        }
    }

    /// Number of faces of a die model; `None` for the coin.
    pub fn sides(&self) -> Option<u32> {
        match self {
            ModelKey::D6 => Some(6),
            ModelKey::D12 => Some(12),
            ModelKey::Coin => None,
        }
    }

    /// Draw a fair outcome for this model.
    pub fn roll(&self, rng: &mut impl Rng) -> RollOutcome {
        match self.sides() {
            Some(sides) => RollOutcome::Die {
                model: *self,
                value: rng.gen_range(1..=sides),
            },
            None => RollOutcome::Coin(if rng.gen_bool(0.5) {
                CoinFace::Heads
            } else {
                CoinFace::Tails
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub fn name(&self) -> &'static str {
        match self {
            CoinFace::Heads => "Heads",
            CoinFace::Tails => "Tails",
        }
    }
}

/// Result of one completed roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollOutcome {
    Die { model: ModelKey, value: u32 },
    Coin(CoinFace),
}

impl RollOutcome {
    /// The bare value as stored in the roll history.
    pub fn history_label(&self) -> String {
        match self {
            RollOutcome::Die { value, .. } => value.to_string(),
            RollOutcome::Coin(face) => face.name().to_string(),
        }
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollOutcome::Die { model, value } => write!(f, "{}: {}", model.label(), value),
            RollOutcome::Coin(face) => write!(f, "Coin: {}", face.name()),
        }
    }
}

/// The model currently selected in the asset selector.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SelectedModel {
    pub key: ModelKey,
}
