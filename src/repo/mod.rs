use crate::models::error::StorageError;

#[cfg(test)]
pub mod memory;
pub mod sqlite;

/// A single named location holding the serialized history
pub trait DurableSlot: Send + Sync {
    fn name(&self) -> &str;

    /// Raw slot content, `None` if nothing was ever written
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the slot content in one step
    fn write(&self, value: &str) -> Result<(), StorageError>;
}

impl<T: DurableSlot + ?Sized> DurableSlot for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        (**self).write(value)
    }
}
