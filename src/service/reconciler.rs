use crate::models::error::StorageError;
use crate::models::log_record::{History, HistoryEntry, LogRecord};
use crate::service::history_store::HistoryStore;
use crate::service::transport::{encode_outbound, Transport};
use log::{debug, info, warn};
use std::sync::Arc;

/// Result of a history mutation
#[derive(Debug)]
pub struct Ingested {
    /// Snapshot of the history after the mutation
    pub history: Arc<History>,
    pub entry: HistoryEntry,
    /// Set when the new history could not be persisted; it is kept in memory anyway
    pub storage_warning: Option<StorageError>,
}

#[derive(Debug)]
pub struct Cleared {
    pub history: Arc<History>,
    pub removed: usize,
    pub storage_warning: Option<StorageError>,
}

/// Sole owner and writer of the history.
///
/// Keys come from a counter that only moves forward while the history is
/// non-empty, so two insertions never share a key.
pub struct Reconciler {
    store: HistoryStore,
    history: Arc<History>,
    next_key: u64,
}

impl Reconciler {
    /// Start from whatever the store holds
    pub fn open(store: HistoryStore) -> Self {
        let history = store.load();
        let next_key = history.next_free_key();
        info!(
            "Loaded {} history entries from slot {}",
            history.len(),
            store.slot_name()
        );
        Self {
            store,
            history: Arc::new(history),
            next_key,
        }
    }

    /// Current history; the returned snapshot never changes
    pub fn history(&self) -> Arc<History> {
        self.history.clone()
    }

    /// Prepend `record` and persist the result
    pub fn ingest(&mut self, record: LogRecord) -> Ingested {
        let key = self.next_key.to_string();
        self.next_key += 1;

        let entry = HistoryEntry::new(key, record);
        Arc::make_mut(&mut self.history).prepend(entry.clone());
        debug!(
            "Ingested {} record {} stamped {}",
            entry.level(),
            entry.key,
            entry.record.timestamp()
        );

        let storage_warning = self.persist();

        Ingested {
            history: self.history.clone(),
            entry,
            storage_warning,
        }
    }

    /// Operator-authored record: ingest, then hand it to the live connection
    pub fn submit(&mut self, record: LogRecord, transport: &dyn Transport) -> Ingested {
        let payload = encode_outbound(&record);
        let ingested = self.ingest(record);
        transport.send(payload);
        ingested
    }

    /// Drop every entry and reset the durable slot
    pub fn clear_all(&mut self) -> Cleared {
        let removed = self.history.len();
        self.history = Arc::new(History::new());
        self.next_key = 0;

        let storage_warning = match self.store.clear() {
            Ok(()) => None,
            Err(e) => {
                warn!("History cleared in memory but not in storage: {}", e);
                Some(e)
            }
        };
        info!("Cleared {} history entries", removed);

        Cleared {
            history: self.history.clone(),
            removed,
            storage_warning,
        }
    }

    fn persist(&self) -> Option<StorageError> {
        match self.store.save(&self.history) {
            Ok(()) => None,
            Err(e) => {
                warn!("History kept in memory but not persisted: {}", e);
                Some(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::log_record::Severity;
    use crate::repo::memory::MemorySlot;
    use crate::service::transport::BroadcastTransport;

    fn record(timestamp: &str, level: &str, message: &str) -> LogRecord {
        LogRecord::create(timestamp, level, message).unwrap()
    }

    fn reconciler_with_slot() -> (Reconciler, Arc<MemorySlot>) {
        let slot = Arc::new(MemorySlot::new());
        let reconciler = Reconciler::open(HistoryStore::new(slot.clone()));
        (reconciler, slot)
    }

    #[test]
    fn test_first_ingest_is_persisted_with_key_zero() {
        let (mut reconciler, slot) = reconciler_with_slot();

        let ingested = reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "boot"));

        assert!(ingested.storage_warning.is_none());
        assert_eq!(ingested.history.len(), 1);
        assert_eq!(ingested.entry.key, "0");

        let persisted: serde_json::Value = serde_json::from_str(&slot.content().unwrap()).unwrap();
        assert_eq!(
            persisted,
            serde_json::json!([{
                "key": "0",
                "timestamp": "2024-03-15T09:00:00.000Z",
                "level": "info",
                "message": "boot",
            }])
        );
    }

    #[test]
    fn test_ingest_is_newest_first() {
        let (mut reconciler, _slot) = reconciler_with_slot();

        for message in ["a", "b", "c", "d"] {
            let ingested = reconciler.ingest(record("2024-03-15T09:00:00.000Z", "debug", message));
            assert_eq!(ingested.history.get(0).unwrap().record.message(), message);
        }

        let history = reconciler.history();
        let ordered: Vec<&str> = history.iter().map(|e| e.record.message()).collect();
        assert_eq!(ordered, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_keys_are_unique() {
        let (mut reconciler, _slot) = reconciler_with_slot();

        for i in 0..20 {
            reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", &format!("m{}", i)));
        }

        let history = reconciler.history();
        let mut keys: Vec<&str> = history.iter().map(|e| e.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 20);
    }

    #[test]
    fn test_keys_continue_after_reload() {
        let slot = Arc::new(MemorySlot::new());
        {
            let mut reconciler = Reconciler::open(HistoryStore::new(slot.clone()));
            reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "first"));
            reconciler.ingest(record("2024-03-15T09:01:00.000Z", "info", "second"));
        }

        let mut reconciler = Reconciler::open(HistoryStore::new(slot.clone()));
        assert_eq!(reconciler.history().len(), 2);

        let ingested = reconciler.ingest(record("2024-03-15T09:02:00.000Z", "info", "third"));
        assert_eq!(ingested.entry.key, "2");
    }

    #[test]
    fn test_snapshots_are_not_mutated_by_later_ingest() {
        let (mut reconciler, _slot) = reconciler_with_slot();
        reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "one"));

        let snapshot = reconciler.history();
        reconciler.ingest(record("2024-03-15T09:01:00.000Z", "info", "two"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(reconciler.history().len(), 2);
    }

    #[test]
    fn test_storage_failure_keeps_history_in_memory() {
        let (mut reconciler, slot) = reconciler_with_slot();
        reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "saved"));
        slot.set_reject_writes(true);

        let ingested = reconciler.ingest(record("2024-03-15T09:01:00.000Z", "error", "unsaved"));

        assert!(matches!(ingested.storage_warning, Some(StorageError::Rejected(_))));
        assert_eq!(ingested.history.len(), 2);
        assert_eq!(ingested.history.get(0).unwrap().level(), Severity::Error);

        let persisted: serde_json::Value = serde_json::from_str(&slot.content().unwrap()).unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all_empties_memory_and_slot() {
        let (mut reconciler, slot) = reconciler_with_slot();
        reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "a"));
        reconciler.ingest(record("2024-03-15T10:00:00.000Z", "error", "b"));

        let cleared = reconciler.clear_all();

        assert!(cleared.history.is_empty());
        assert_eq!(cleared.removed, 2);
        assert_eq!(slot.content(), Some("[]".to_string()));
        assert!(HistoryStore::new(slot.clone()).load().is_empty());

        let ingested = reconciler.ingest(record("2024-03-15T11:00:00.000Z", "info", "fresh"));
        assert_eq!(ingested.entry.key, "0");
    }

    #[test]
    fn test_clear_all_reports_storage_failure_but_clears_memory() {
        let (mut reconciler, slot) = reconciler_with_slot();
        reconciler.ingest(record("2024-03-15T09:00:00.000Z", "info", "a"));
        slot.set_reject_writes(true);

        let cleared = reconciler.clear_all();

        assert!(matches!(cleared.storage_warning, Some(StorageError::Rejected(_))));
        assert!(cleared.history.is_empty());
        assert_eq!(cleared.removed, 1);
        assert!(reconciler.history().is_empty());

        let persisted: serde_json::Value = serde_json::from_str(&slot.content().unwrap()).unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_open_tolerates_huge_stored_key() {
        let slot = Arc::new(MemorySlot::with_content(
            r#"[{"key":"18446744073709551615","timestamp":"2024-03-15T09:00:00.000Z","level":"info","message":"tampered"}]"#,
        ));
        let mut reconciler = Reconciler::open(HistoryStore::new(slot.clone()));
        assert_eq!(reconciler.history().len(), 1);

        let first = reconciler.ingest(record("2024-03-15T09:01:00.000Z", "info", "next"));
        let second = reconciler.ingest(record("2024-03-15T09:02:00.000Z", "info", "after"));

        assert_eq!(first.entry.key, "1");
        assert_eq!(second.entry.key, "2");
        assert!(second.storage_warning.is_none());
    }

    #[test]
    fn test_submit_forwards_record_to_transport() {
        let (mut reconciler, _slot) = reconciler_with_slot();
        let transport = BroadcastTransport::new(4);
        let mut rx = transport.subscribe();
        let authored = record("2024-03-15T09:00:00.000Z", "warning", "operator note");

        let ingested = reconciler.submit(authored.clone(), &transport);

        assert_eq!(ingested.entry.record, authored);
        assert_eq!(reconciler.history().len(), 1);

        let payload = rx.try_recv().unwrap();
        let sent: LogRecord = serde_json::from_str(&payload).unwrap();
        assert_eq!(sent, authored);
    }
}
