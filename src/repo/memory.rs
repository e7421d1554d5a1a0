use crate::models::error::StorageError;
use crate::repo::DurableSlot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-process slot for tests; can be told to reject writes
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
    reject_writes: AtomicBool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(value: &str) -> Self {
        let slot = Self::new();
        *slot.value.lock().unwrap() = Some(value.to_string());
        slot
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn content(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }
}

impl DurableSlot for MemorySlot {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.content())
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(self.name().to_string()));
        }
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}
