use sqlx::PgPool;
use uuid::Uuid;

use super::{decode, FetchReport, LogStore, PersistenceError};
use crate::models::{LogEntry, RecordId};
use crate::schema::TABLE;

/// Gateway over the `health_logs` table. The pool is created by the caller
/// and owned here.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LogStore for PgLogStore {
    async fn insert(&self, entry: LogEntry) -> Result<RecordId, PersistenceError> {
        // Every column is bound; absent values are written as NULL.
        let sql = format!(
            r#"
            INSERT INTO {TABLE} (
                id, date, supplement,
                sleep_hours, melatonin_taken, melatonin_mg,
                wake_time, workout, workout_intensity,
                breakfast, sunlight_hours, lunch, snack, dinner, dinner_time,
                supplement_time, initial_reaction, morning_mood,
                am_med_efficacy, afternoon_med_efficacy, pm_med_efficacy,
                notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING id
            "#
        );

        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.date)
            .bind(entry.supplement.as_str())
            .bind(entry.sleep_hours)
            .bind(entry.melatonin_taken)
            .bind(entry.melatonin_mg)
            .bind(entry.wake_time)
            .bind(entry.workout)
            .bind(entry.workout_intensity)
            .bind(&entry.breakfast)
            .bind(entry.sunlight_hours)
            .bind(&entry.lunch)
            .bind(&entry.snack)
            .bind(&entry.dinner)
            .bind(entry.dinner_time)
            .bind(entry.supplement_time)
            .bind(&entry.initial_reaction)
            .bind(&entry.morning_mood)
            .bind(entry.am_med_efficacy)
            .bind(entry.afternoon_med_efficacy)
            .bind(entry.pm_med_efficacy)
            .bind(&entry.notes)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            id = %id,
            date = %entry.date,
            supplement = %entry.supplement,
            "Health log row inserted"
        );

        Ok(id)
    }

    async fn fetch_all(&self) -> Result<FetchReport, PersistenceError> {
        // Rows come back as JSON so one bad column cannot fail the whole read.
        let sql = format!("SELECT to_jsonb(h) FROM {TABLE} h ORDER BY h.date ASC, h.created_at ASC");
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let total = rows.len();
        let report = decode::decode_rows(rows);

        tracing::debug!(
            total,
            decoded = report.entries.len(),
            skipped = report.skipped.len(),
            warnings = report.warnings.len(),
            "Fetched health logs"
        );

        Ok(report)
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
