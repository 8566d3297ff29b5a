//! Entry form binding: turns one submitted form into at most one stored row.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{LogEntry, RecordId, Supplement};
use crate::schema::{normalize_text, RawEntry, ValidationError};
use crate::store::{LogStore, PersistenceError};

pub const CONFIRMATION: &str = "Saved!";

const DEFAULT_EFFICACY: i32 = 7;

/// Values as they arrive from the form. Missing keys take the form's
/// initial widget values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub supplement: String,

    pub sleep_hours: f64,
    pub melatonin_taken: bool,
    /// Ignored unless `melatonin_taken`.
    pub melatonin_mg: Option<f64>,

    pub wake_time: NaiveTime,
    pub workout: bool,
    /// Ignored unless `workout`.
    pub workout_intensity: Option<i32>,

    pub sunlight_hours: f64,

    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub snack: Option<String>,
    pub dinner: Option<String>,
    pub dinner_time: NaiveTime,

    pub supplement_time: NaiveTime,
    pub initial_reaction: Option<String>,
    pub morning_mood: Option<String>,

    pub am_med_efficacy: i32,
    pub afternoon_med_efficacy: i32,
    pub pm_med_efficacy: i32,

    pub notes: Option<String>,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            date: None,
            supplement: Supplement::default().as_str().to_string(),
            sleep_hours: 0.0,
            melatonin_taken: false,
            melatonin_mg: None,
            wake_time: hms(6, 0),
            workout: false,
            workout_intensity: None,
            sunlight_hours: 0.0,
            breakfast: None,
            lunch: None,
            snack: None,
            dinner: None,
            dinner_time: hms(19, 0),
            supplement_time: hms(8, 30),
            initial_reaction: None,
            morning_mood: None,
            am_med_efficacy: DEFAULT_EFFICACY,
            afternoon_med_efficacy: DEFAULT_EFFICACY,
            pm_med_efficacy: DEFAULT_EFFICACY,
            notes: None,
        }
    }
}

fn hms(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl EntryForm {
    /// Applies the disabled-field and blank-text rules.
    pub fn bind(self, today: NaiveDate) -> RawEntry {
        // A toggled-on field with no value keeps the widget's zero.
        let melatonin_mg = self
            .melatonin_taken
            .then(|| self.melatonin_mg.unwrap_or(0.0));
        let workout_intensity = self.workout.then(|| self.workout_intensity.unwrap_or(0));

        RawEntry {
            date: self.date.unwrap_or(today),
            supplement: self.supplement,
            sleep_hours: self.sleep_hours,
            melatonin_taken: self.melatonin_taken,
            melatonin_mg,
            wake_time: self.wake_time,
            workout: self.workout,
            workout_intensity,
            breakfast: normalize_text(self.breakfast),
            sunlight_hours: self.sunlight_hours,
            lunch: normalize_text(self.lunch),
            snack: normalize_text(self.snack),
            dinner: normalize_text(self.dinner),
            dinner_time: self.dinner_time,
            supplement_time: self.supplement_time,
            initial_reaction: normalize_text(self.initial_reaction),
            morning_mood: normalize_text(self.morning_mood),
            am_med_efficacy: self.am_med_efficacy,
            afternoon_med_efficacy: self.afternoon_med_efficacy,
            pm_med_efficacy: self.pm_med_efficacy,
            notes: normalize_text(self.notes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: RecordId,
    pub entry: LogEntry,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Validates the form and writes it. Nothing is written when validation
/// fails.
pub async fn submit(
    store: &dyn LogStore,
    form: EntryForm,
    today: NaiveDate,
) -> Result<Submission, SubmitError> {
    let entry = match form.bind(today).into_entry() {
        Ok(entry) => entry,
        Err(e) => {
            tracing::info!(field = e.field, message = %e.message, "Entry rejected");
            return Err(e.into());
        }
    };

    let id = store.insert(entry.clone()).await?;
    Ok(Submission { id, entry })
}
