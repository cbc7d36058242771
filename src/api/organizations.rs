//! Organization API endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::{models::Organization, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_organizations))
}

/// List the organizations available in the filter dropdown
///
/// GET /api/v1/organizations
///
/// The set is derived from the audit event collection itself (unique
/// id/name pairs, sorted by name), so it cannot drift from the events.
async fn list_organizations(State(state): State<AppState>) -> Json<Vec<Organization>> {
    Json(state.store.organizations())
}
