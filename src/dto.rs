//! Request/response shapes for the JSON API.
//!
//! Conventions:
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - absent values are serialized as `null`, never omitted

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::form::EntryForm;
use crate::models::{LogEntry, RecordId, StoredEntry, Supplement};
use crate::schema::{TrendField, ValidationError};
use crate::store::{DecodeSkip, DecodeWarning};
use crate::trends::{CompositePoint, Series, TrendFilter};

// ============================================================================
// Form
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FieldOption {
    pub key: &'static str,
    pub label: &'static str,
}

/// GET /api/options — everything a client needs to draw the entry form
/// and the dashboard filters.
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub supplements: Vec<&'static str>,
    pub efficacy_scale: Vec<i32>,
    pub trend_fields: Vec<FieldOption>,
    pub defaults: EntryForm,
}

impl OptionsResponse {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            supplements: Supplement::ALL.iter().map(|s| s.as_str()).collect(),
            efficacy_scale: crate::schema::EFFICACY_SCALE.collect(),
            trend_fields: TrendField::ALL
                .iter()
                .map(|f| FieldOption {
                    key: f.column(),
                    label: f.label(),
                })
                .collect(),
            defaults: EntryForm {
                date: Some(today),
                ..EntryForm::default()
            },
        }
    }
}

/// POST /api/entries
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: RecordId,
    pub message: &'static str,
    pub entry: LogEntry,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Shared by GET /api/entries and GET /api/trends.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    /// Comma-separated supplement names. Absent means every supplement
    /// present; present but empty means none.
    pub supplements: Option<String>,
    /// `YYYY-MM-DD`; blank means unset.
    pub start: Option<String>,
    pub end: Option<String>,
}

impl FilterQuery {
    pub fn start_date(&self) -> Result<Option<NaiveDate>, ValidationError> {
        parse_date_param("start", self.start.as_deref())
    }

    pub fn end_date(&self) -> Result<Option<NaiveDate>, ValidationError> {
        parse_date_param("end", self.end.as_deref())
    }

    pub fn supplement_set(&self) -> Result<Option<BTreeSet<Supplement>>, ValidationError> {
        let Some(list) = self.supplements.as_deref() else {
            return Ok(None);
        };

        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.parse::<Supplement>()
                    .map_err(|e| ValidationError::new("supplements", e.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Some)
    }
}

fn parse_date_param(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::new(field, format!("expected YYYY-MM-DD, got {s:?}"))),
    }
}

#[derive(Debug, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// GET /api/entries — the raw table, newest first.
#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub filter: TrendFilter,
    pub entries: Vec<StoredEntry>,
    pub skipped_rows: usize,
}

/// GET /api/trends
#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub filter: TrendFilter,
    /// Filter choices offered by the dashboard, derived from stored rows.
    pub available_supplements: Vec<Supplement>,
    pub date_bounds: Option<DateBounds>,

    pub series: Vec<Series>,
    pub normalized: Vec<Series>,
    pub composite: Vec<CompositePoint>,

    /// Filtered rows, newest first.
    pub entries: Vec<StoredEntry>,

    pub skipped: Vec<DecodeSkip>,
    pub warnings: Vec<DecodeWarning>,
}
