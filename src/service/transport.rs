use crate::models::error::TransportError;
use crate::models::log_record::LogRecord;
use log::{debug, warn};
use tokio::sync::broadcast;

/// Outbound side of the live connection
pub trait Transport: Send + Sync {
    /// Fire-and-forget; delivery failures stay inside the transport
    fn send(&self, payload: String);
}

/// Wire form of an outbound record
pub fn encode_outbound(record: &LogRecord) -> String {
    // LogRecord holds only strings and a unit enum, serialization cannot fail
    serde_json::to_string(record).unwrap_or_default()
}

/// Turn an inbound payload into a record, rejecting anything malformed
pub fn decode_inbound(payload: &str) -> Result<LogRecord, TransportError> {
    let record: LogRecord = serde_json::from_str(payload)?;
    record.validate()?;
    Ok(record)
}

/// Fans outbound payloads out to every connected stream subscriber
#[derive(Clone)]
pub struct BroadcastTransport {
    tx: broadcast::Sender<String>,
}

impl BroadcastTransport {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Transport for BroadcastTransport {
    fn send(&self, payload: String) {
        match self.tx.send(payload) {
            Ok(receivers) => debug!("Sent record to {} stream subscribers", receivers),
            Err(_) => debug!("No stream subscribers, outbound record dropped"),
        }
    }
}

/// Log and discard an inbound payload that failed to decode
pub fn reject_inbound(payload: &str, error: &TransportError) {
    warn!("Rejected inbound payload ({}): {:.200}", error, payload);
}
