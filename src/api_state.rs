use crate::models::api::LogStatsResponse;
use crate::models::config::Config;
use crate::models::error::TransportError;
use crate::models::log_record::{History, LogRecord, Severity};
use crate::service::reconciler::{Cleared, Ingested, Reconciler};
use crate::service::transport::{decode_inbound, reject_inbound, BroadcastTransport};
use std::sync::{Arc, Mutex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Single writer of the history; the lock spans the in-memory change and its save
    reconciler: Arc<Mutex<Reconciler>>,

    /// Live connection to stream subscribers
    transport: BroadcastTransport,
}

impl AppState {
    pub fn new(config: &Config, reconciler: Reconciler) -> Self {
        let transport = BroadcastTransport::new(config.stream_capacity);
        Self {
            reconciler: Arc::new(Mutex::new(reconciler)),
            transport,
        }
    }

    /// Current history snapshot
    pub fn get_history(&self) -> Arc<History> {
        self.reconciler.lock().unwrap().history()
    }

    /// Record arriving from the live connection
    pub fn receive_inbound(&self, payload: &str) -> Result<Ingested, TransportError> {
        let record = decode_inbound(payload).inspect_err(|e| reject_inbound(payload, e))?;
        Ok(self.reconciler.lock().unwrap().ingest(record))
    }

    /// Operator-authored record; also sent out over the live connection
    pub fn submit(&self, record: LogRecord) -> Ingested {
        self.reconciler
            .lock()
            .unwrap()
            .submit(record, &self.transport)
    }

    pub fn clear_all(&self) -> Cleared {
        self.reconciler.lock().unwrap().clear_all()
    }

    pub fn subscribe_stream(&self) -> tokio::sync::broadcast::Receiver<String> {
        self.transport.subscribe()
    }

    pub fn get_stats(&self) -> LogStatsResponse {
        let history = self.get_history();
        let count = |level: Severity| history.iter().filter(|e| e.level() == level).count();

        LogStatsResponse {
            debug_count: count(Severity::Debug),
            info_count: count(Severity::Info),
            warning_count: count(Severity::Warning),
            error_count: count(Severity::Error),
            total_count: history.len(),
        }
    }
}
