use crate::api_state::AppState;
use crate::models::api::*;
use crate::models::error::LogViewError;
use crate::models::filter_spec::FilterSpec;
use crate::models::log_record::LogRecord;
use crate::service::filter::apply_filter;
use crate::service::reconciler::Ingested;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::tokio::time::{interval, Duration};
use rocket::{
    response::stream::{Event, EventStream},
    State,
};

type ApiError = (Status, Json<ErrorResponse>);

fn api_error(status: Status, error: &str, details: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details.to_string()),
        }),
    )
}

fn ingest_response(ingested: Ingested, message: &str) -> Json<IngestResponse> {
    Json(IngestResponse {
        success: true,
        message: message.to_string(),
        total: ingested.history.len(),
        entry: Some(ingested.entry),
        storage_warning: ingested.storage_warning.map(|e| e.to_string()),
    })
}

/// GET /api/logs - Filtered view of the history
#[get("/logs?<level>&<from>&<to>")]
pub fn get_logs(
    level: Option<String>,
    from: Option<String>,
    to: Option<String>,
    state: &State<AppState>,
) -> Result<Json<LogsResponse>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let spec = FilterSpec::from_params(level.as_deref(), from.as_deref(), to.as_deref(), today)
        .map_err(|e| api_error(Status::BadRequest, "Invalid filter", e))?;

    let history = state.get_history();
    let entries = apply_filter(&history, &spec);

    Ok(Json(LogsResponse {
        total: entries.len(),
        unfiltered: history.len(),
        entries,
    }))
}

/// POST /api/logs - Author a new record
#[post("/logs", format = "json", data = "<draft>")]
pub fn create_log(
    draft: Json<DraftRecordRequest>,
    state: &State<AppState>,
) -> Result<Json<IngestResponse>, ApiError> {
    let record = LogRecord::now(&draft.level, &draft.message)
        .map_err(|e| api_error(Status::UnprocessableEntity, "Invalid log record", e))?;

    let ingested = state.submit(record);
    log::info!("Operator added {} record {}", ingested.entry.level().label(), ingested.entry.key);

    Ok(ingest_response(ingested, "Log record added"))
}

/// POST /api/logs/clear - Clear the whole history
#[post("/logs/clear")]
pub fn clear_logs(state: &State<AppState>) -> Json<ClearResponse> {
    let cleared = state.clear_all();

    Json(ClearResponse {
        success: true,
        message: format!(
            "Cleared {} log entries, {} remaining",
            cleared.removed,
            cleared.history.len()
        ),
        removed: cleared.removed,
        storage_warning: cleared.storage_warning.map(|e| e.to_string()),
    })
}

/// GET /api/logs/stats - Entry counts per severity
#[get("/logs/stats")]
pub fn get_log_stats(state: &State<AppState>) -> Json<LogStatsResponse> {
    Json(state.get_stats())
}

/// POST /api/stream - Inbound side of the live connection
#[post("/stream", data = "<payload>")]
pub fn receive_record(
    payload: String,
    state: &State<AppState>,
) -> Result<Json<IngestResponse>, ApiError> {
    let ingested = state
        .receive_inbound(&payload)
        .map_err(|e| api_error(Status::BadRequest, "Rejected inbound payload", LogViewError::from(e)))?;

    Ok(ingest_response(ingested, "Log record received"))
}

/// GET /api/stream - Server-Sent Events carrying outbound records
#[get("/stream")]
pub fn record_events(state: &State<AppState>) -> EventStream![] {
    let mut receiver = state.subscribe_stream();

    EventStream! {
        let mut interval = interval(Duration::from_secs(15));

        loop {
            select! {
                payload = receiver.recv() => {
                    match payload {
                        Ok(payload) => {
                            yield Event::data(payload).event("record");
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            log::warn!("Stream subscriber lagged, skipped {} records", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = interval.tick() => {
                    // Keep idle connections open
                    yield Event::data("heartbeat").event("heartbeat");
                }
            }
        }
    }
}

/// GET /api/health - Health check endpoint
#[get("/health")]
pub fn health_check() -> &'static str {
    "OK"
}
