//! Audit log API endpoints
//!
//! List, detail, and CSV export over the in-memory event collection. Query
//! parameters arrive as strings and are converted into a typed
//! [`FilterSpec`] at this boundary; values outside the closed enumerations
//! and unparseable date bounds are rejected here with a 400 and never reach
//! the engine.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{ActionType, AuditEvent, EntityType, FilterSpec},
    services::{export, query},
    utils::error::{AppError, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/export", get(export_audit_logs))
        .route("/{id}", get(get_audit_log))
}

/// Query parameters shared by the list and export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    /// Filter by owning organization id (exact match)
    pub organization_id: Option<String>,
    /// Filter by entity type (organization, sub-organization, site, lab,
    /// gateway, instrument, user)
    pub entity_type: Option<String>,
    /// Filter by action type (create, update, delete, assign, unassign)
    pub action_type: Option<String>,
    /// Inclusive lower timestamp bound (RFC 3339 instant or YYYY-MM-DD)
    pub date_start: Option<String>,
    /// Inclusive upper timestamp bound (RFC 3339 instant or YYYY-MM-DD)
    pub date_end: Option<String>,
    /// Case-insensitive substring match on entity name or user name
    pub search: Option<String>,
}

impl AuditLogQuery {
    /// Convert the raw string parameters into a typed filter spec.
    ///
    /// Empty strings mean "no constraint" on every dimension, matching the
    /// behavior of cleared form fields in the viewer.
    fn into_spec(self) -> AppResult<FilterSpec> {
        Ok(FilterSpec {
            organization_id: none_if_empty(self.organization_id),
            entity_type: parse_enum_param::<EntityType>("entity_type", self.entity_type)?,
            action_type: parse_enum_param::<ActionType>("action_type", self.action_type)?,
            date_start: parse_date_param("date_start", self.date_start)?,
            date_end: parse_date_param("date_end", self.date_end)?,
            search_query: none_if_empty(self.search),
        })
    }
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse a closed-enumeration parameter through its serde wire form.
fn parse_enum_param<T: serde::de::DeserializeOwned>(
    name: &str,
    value: Option<String>,
) -> AppResult<Option<T>> {
    match none_if_empty(value) {
        Some(raw) => serde_json::from_value(serde_json::Value::String(raw.clone()))
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Unknown {} '{}'", name, raw))),
        None => Ok(None),
    }
}

/// Parse a date bound: a full RFC 3339 instant, or a bare date taken as
/// midnight UTC (what the viewer's date inputs submit).
fn parse_date_param(name: &str, value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    let Some(raw) = none_if_empty(value) else {
        return Ok(None);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        return Ok(Some(DateTime::from_naive_utc_and_offset(midnight, Utc)));
    }

    Err(AppError::BadRequest(format!(
        "Invalid {} '{}': expected an RFC 3339 instant or YYYY-MM-DD",
        name, raw
    )))
}

/// Response body for the list endpoint
#[derive(Debug, Serialize)]
pub struct AuditLogListResponse {
    pub events: Vec<AuditEvent>,
    /// Whether more events exist beyond this response. The whole collection
    /// is returned in one page, so this is always false today.
    pub has_more: bool,
}

/// List audit log entries matching the active filters
///
/// GET /api/v1/audit-logs
///
/// Query parameters: see [`AuditLogQuery`]. Omitted or empty parameters
/// leave that dimension unconstrained; all active constraints must hold.
async fn list_audit_logs(
    State(state): State<AppState>,
    Query(params): Query<AuditLogQuery>,
) -> AppResult<Json<AuditLogListResponse>> {
    let spec = params.into_spec()?;
    let events = query::filter(state.store.events(), &spec)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(AuditLogListResponse {
        events,
        has_more: false,
    }))
}

/// Get a single audit log entry, with its full change list and metadata
///
/// GET /api/v1/audit-logs/:id
async fn get_audit_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuditEvent>> {
    state
        .store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Audit event '{}' not found", id)))
}

/// Export the filtered audit log as a CSV download
///
/// GET /api/v1/audit-logs/export
///
/// Accepts the same query parameters as the list endpoint and responds with
/// a `text/csv` attachment named `audit-log-<ISO8601-timestamp>.csv`.
async fn export_audit_logs(
    State(state): State<AppState>,
    Query(params): Query<AuditLogQuery>,
) -> AppResult<impl IntoResponse> {
    let spec = params.into_spec()?;
    let events = query::filter(state.store.events(), &spec);
    let row_count = events.len();
    let csv = export::encode_csv(events);

    tracing::info!(rows = row_count, "Exporting audit log to CSV");

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                export::export_filename(Utc::now())
            ),
        ),
    ];

    Ok((headers, csv))
}
