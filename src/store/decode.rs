//! Best-effort decoding of `health_logs` rows read as JSON objects.
//!
//! Required columns that cannot be read drop the row. Optional columns that
//! cannot be read become absent and leave a warning.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::{Map, Value};

use super::{DecodeSkip, DecodeWarning, FetchReport};
use crate::models::{LogEntry, RecordId, StoredEntry, Supplement};
use crate::schema::normalize_text;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

pub fn decode_rows(rows: impl IntoIterator<Item = Value>) -> FetchReport {
    let mut report = FetchReport::default();

    for row in rows {
        match decode_row(&row) {
            Ok((entry, warnings)) => {
                report.entries.push(entry);
                report.warnings.extend(warnings);
            }
            Err(skip) => {
                tracing::warn!(
                    row_id = ?skip.row_id,
                    field = skip.field,
                    reason = %skip.reason,
                    "Skipping undecodable health log row"
                );
                report.skipped.push(skip);
            }
        }
    }

    for warning in &report.warnings {
        tracing::debug!(
            row_id = ?warning.row_id,
            field = warning.field,
            reason = %warning.reason,
            "Coerced unreadable column to missing"
        );
    }

    report
}

pub fn decode_row(row: &Value) -> Result<(StoredEntry, Vec<DecodeWarning>), DecodeSkip> {
    let obj = row.as_object().ok_or_else(|| DecodeSkip {
        row_id: None,
        field: "row",
        reason: "row is not a JSON object".into(),
    })?;

    let mut row = RowDecoder {
        obj,
        row_id: None,
        warnings: Vec::new(),
    };

    let id = row.required("id", parse_uuid)?;
    row.row_id = Some(id);
    let created_at = row.required("created_at", parse_timestamp)?;

    let melatonin_taken = row.required("melatonin_taken", parse_bool)?;
    let workout = row.required("workout", parse_bool)?;

    let entry = LogEntry {
        date: row.required("date", parse_date)?,
        supplement: row.required("supplement", parse_supplement)?,
        sleep_hours: row.required("sleep_hours", parse_f64)?,
        melatonin_taken,
        melatonin_mg: row.optional("melatonin_mg", parse_f64).filter(|_| melatonin_taken),
        wake_time: row.required("wake_time", parse_time)?,
        workout,
        workout_intensity: row.optional("workout_intensity", parse_i32).filter(|_| workout),
        breakfast: row.text("breakfast"),
        sunlight_hours: row.required("sunlight_hours", parse_f64)?,
        lunch: row.text("lunch"),
        snack: row.text("snack"),
        dinner: row.text("dinner"),
        dinner_time: row.required("dinner_time", parse_time)?,
        supplement_time: row.required("supplement_time", parse_time)?,
        initial_reaction: row.text("initial_reaction"),
        morning_mood: row.text("morning_mood"),
        am_med_efficacy: row.required("am_med_efficacy", parse_i32)?,
        afternoon_med_efficacy: row.required("afternoon_med_efficacy", parse_i32)?,
        pm_med_efficacy: row.required("pm_med_efficacy", parse_i32)?,
        notes: row.text("notes"),
    };

    Ok((
        StoredEntry {
            id,
            created_at,
            entry,
        },
        row.warnings,
    ))
}

struct RowDecoder<'a> {
    obj: &'a Map<String, Value>,
    row_id: Option<RecordId>,
    warnings: Vec<DecodeWarning>,
}

impl<'a> RowDecoder<'a> {
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    fn required<T>(
        &self,
        field: &'static str,
        parse: fn(&Value) -> Option<T>,
    ) -> Result<T, DecodeSkip> {
        let value = self.present(field).ok_or_else(|| DecodeSkip {
            row_id: self.row_id,
            field,
            reason: "missing value".into(),
        })?;
        parse(value).ok_or_else(|| DecodeSkip {
            row_id: self.row_id,
            field,
            reason: format!("unreadable value {value}"),
        })
    }

    fn optional<T>(&mut self, field: &'static str, parse: fn(&Value) -> Option<T>) -> Option<T> {
        let value = self.present(field)?;
        let parsed = parse(value);
        if parsed.is_none() {
            self.warnings.push(DecodeWarning {
                row_id: self.row_id,
                field,
                reason: format!("unreadable value {value}"),
            });
        }
        parsed
    }

    fn text(&mut self, field: &'static str) -> Option<String> {
        let text = self.optional(field, |v| v.as_str().map(str::to_string));
        normalize_text(text)
    }
}

fn parse_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn parse_i32(value: &Value) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    // Integral floats such as "7.0" are accepted.
    let n = parse_f64(value)?;
    if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return None;
    }
    Some(n as i32)
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Some(true),
            "false" | "f" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_time(value: &Value) -> Option<NaiveTime> {
    let s = value.as_str()?.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.as_str()?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_uuid(value: &Value) -> Option<RecordId> {
    value.as_str()?.trim().parse().ok()
}

fn parse_supplement(value: &Value) -> Option<Supplement> {
    value.as_str()?.parse().ok()
}
