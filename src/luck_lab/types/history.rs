//! Fixed-length roll history

use bevy::prelude::*;

/// Shown in history slots that have no roll yet.
pub const HISTORY_PLACEHOLDER: &str = "-";

/// Most-recent-first log of roll outcomes.
///
/// The log always holds exactly `limit` slots; unused slots are `None` and
/// render as [`HISTORY_PLACEHOLDER`].
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RollHistory {
    slots: Vec<Option<String>>,
}

impl Default for RollHistory {
    fn default() -> Self {
        Self::with_limit(5)
    }
}

impl RollHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: vec![None; limit],
        }
    }

    pub fn limit(&self) -> usize {
        self.slots.len()
    }

    /// Insert at the front, evicting the oldest entry.
    pub fn record(&mut self, outcome: impl Into<String>) {
        if self.slots.is_empty() {
            return;
        }
        self.slots.pop();
        self.slots.insert(0, Some(outcome.into()));
    }

    /// Display strings for every slot, newest first.
    pub fn render(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.clone().unwrap_or_else(|| HISTORY_PLACEHOLDER.to_string()))
            .collect()
    }

    pub fn latest(&self) -> Option<&str> {
        self.slots.first().and_then(|slot| slot.as_deref())
    }

    /// Number of slots holding a real outcome.
    pub fn recorded(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
