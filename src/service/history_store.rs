use crate::models::error::StorageError;
use crate::models::log_record::History;
use crate::repo::DurableSlot;
use log::{debug, warn};

/// Reads and writes the whole history as one JSON blob in a durable slot
pub struct HistoryStore {
    slot: Box<dyn DurableSlot>,
}

impl HistoryStore {
    pub fn new(slot: impl DurableSlot + 'static) -> Self {
        Self {
            slot: Box::new(slot),
        }
    }

    pub fn slot_name(&self) -> &str {
        self.slot.name()
    }

    /// Load the persisted history.
    ///
    /// Missing, unreadable or unparsable content yields an empty history.
    pub fn load(&self) -> History {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Slot {} is empty, starting with no history", self.slot_name());
                return History::new();
            }
            Err(e) => {
                warn!("Failed to read slot {}: {}. Starting with no history", self.slot_name(), e);
                return History::new();
            }
        };

        match serde_json::from_str::<History>(&raw) {
            Ok(history) => {
                debug!("Loaded {} entries from slot {}", history.len(), self.slot_name());
                history
            }
            Err(e) => {
                warn!(
                    "Slot {} holds unparsable history ({}). Starting with no history",
                    self.slot_name(),
                    e
                );
                History::new()
            }
        }
    }

    /// Overwrite the slot with `history`
    pub fn save(&self, history: &History) -> Result<(), StorageError> {
        let blob = serde_json::to_string(history).map_err(|cause| StorageError::Serialize {
            slot: self.slot_name().to_string(),
            cause,
        })?;
        self.slot.write(&blob)
    }

    /// Reset the slot to an empty history. Safe to repeat.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&History::new())
    }
}
