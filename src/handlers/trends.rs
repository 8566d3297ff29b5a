use axum::{extract::State, Json};
use chrono::Utc;

use crate::dto::{DateBounds, FilterQuery, TrendResponse};
use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::models::StoredEntry;
use crate::store::FetchReport;
use crate::trends::{self, TrendFilter};
use crate::AppState;

/// One full read of the store, scoped by the caller's filter.
pub(crate) struct Scoped {
    pub report: FetchReport,
    pub filter: TrendFilter,
    /// Matching rows, date ascending.
    pub filtered: Vec<StoredEntry>,
}

pub(crate) async fn load_scoped(state: &AppState, query: &FilterQuery) -> AppResult<Scoped> {
    let supplements = query.supplement_set()?;
    let start = query.start_date()?;
    let end = query.end_date()?;
    let report = state.store.fetch_all().await?;

    let filter = TrendFilter::resolve(
        supplements,
        start,
        end,
        &report.entries,
        Utc::now().date_naive(),
    );
    let filtered = trends::filter_entries(&report.entries, &filter);

    tracing::debug!(
        total = report.entries.len(),
        matched = filtered.len(),
        start = %filter.start,
        end = %filter.end,
        "Scoped health logs"
    );

    Ok(Scoped {
        report,
        filter,
        filtered,
    })
}

pub async fn get_trends(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FilterQuery>,
) -> AppResult<Json<TrendResponse>> {
    let Scoped {
        report,
        filter,
        filtered,
    } = load_scoped(&state, &query).await?;

    let computed = trends::compute(&filtered);

    let dates = report.entries.iter().map(|e| e.entry.date);
    let date_bounds = dates
        .clone()
        .min()
        .zip(dates.max())
        .map(|(min, max)| DateBounds { min, max });

    let mut available_supplements: Vec<_> =
        trends::present_supplements(&report.entries).into_iter().collect();
    available_supplements.sort_by_key(|s| s.as_str());

    let mut entries = filtered;
    entries.reverse();

    Ok(Json(TrendResponse {
        filter,
        available_supplements,
        date_bounds,
        series: computed.series,
        normalized: computed.normalized,
        composite: computed.composite,
        entries,
        skipped: report.skipped,
        warnings: report.warnings,
    }))
}
