use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::dto::{EntriesResponse, FilterQuery, SubmitResponse};
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::form::{self, EntryForm, CONFIRMATION};
use crate::handlers::trends::load_scoped;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    AppJson(body): AppJson<EntryForm>,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let today = Utc::now().date_naive();
    let submission = form::submit(state.store.as_ref(), body, today).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: submission.id,
            message: CONFIRMATION,
            entry: submission.entry,
        }),
    ))
}

pub async fn list_entries(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FilterQuery>,
) -> AppResult<Json<EntriesResponse>> {
    let scoped = load_scoped(&state, &query).await?;

    let mut entries = scoped.filtered;
    entries.reverse();

    Ok(Json(EntriesResponse {
        filter: scoped.filter,
        entries,
        skipped_rows: scoped.report.skipped.len(),
    }))
}
