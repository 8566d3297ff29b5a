//! Record schema for `health_logs`: column names, option sets, the chart
//! field catalogue, and the one place raw form values become a [`LogEntry`].

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use validator::Validate;

use crate::models::{LogEntry, Supplement};

pub const TABLE: &str = "health_logs";

pub const EFFICACY_SCALE: RangeInclusive<i32> = 1..=10;

/// Entry columns in schema order. Validation reports the first failing
/// field in this order.
pub const FIELDS: [&str; 21] = [
    "date",
    "supplement",
    "sleep_hours",
    "melatonin_taken",
    "melatonin_mg",
    "wake_time",
    "workout",
    "workout_intensity",
    "breakfast",
    "sunlight_hours",
    "lunch",
    "snack",
    "dinner",
    "dinner_time",
    "supplement_time",
    "initial_reaction",
    "morning_mood",
    "am_med_efficacy",
    "afternoon_med_efficacy",
    "pm_med_efficacy",
    "notes",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Typed form values before schema checks.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RawEntry {
    pub date: NaiveDate,
    pub supplement: String,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: f64,
    pub melatonin_taken: bool,
    #[validate(range(min = 0.0, max = 20.0, message = "Melatonin must be between 0 and 20 mg"))]
    pub melatonin_mg: Option<f64>,

    pub wake_time: NaiveTime,
    pub workout: bool,
    #[validate(range(min = 0, max = 10, message = "Workout intensity must be between 0 and 10"))]
    pub workout_intensity: Option<i32>,

    pub breakfast: Option<String>,
    #[validate(range(min = 0.0, max = 12.0, message = "Sunlight hours must be between 0 and 12"))]
    pub sunlight_hours: f64,
    pub lunch: Option<String>,
    pub snack: Option<String>,
    pub dinner: Option<String>,
    pub dinner_time: NaiveTime,

    pub supplement_time: NaiveTime,
    pub initial_reaction: Option<String>,
    pub morning_mood: Option<String>,

    #[validate(range(min = 1, max = 10, message = "AM efficacy must be between 1 and 10"))]
    pub am_med_efficacy: i32,
    #[validate(range(min = 1, max = 10, message = "Afternoon efficacy must be between 1 and 10"))]
    pub afternoon_med_efficacy: i32,
    #[validate(range(min = 1, max = 10, message = "PM efficacy must be between 1 and 10"))]
    pub pm_med_efficacy: i32,

    pub notes: Option<String>,
}

impl RawEntry {
    /// Checks every constraint and coerces free text. Pure.
    pub fn into_entry(self) -> Result<LogEntry, ValidationError> {
        // Range checks pass NaN through, so reject non-finite values first.
        for (field, value) in [
            ("sleep_hours", Some(self.sleep_hours)),
            ("melatonin_mg", self.melatonin_mg),
            ("sunlight_hours", Some(self.sunlight_hours)),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ValidationError::new(field, "must be a finite number"));
            }
        }

        if let Err(errors) = self.validate() {
            return Err(first_error(&errors));
        }

        let supplement = self
            .supplement
            .parse::<Supplement>()
            .map_err(|e| ValidationError::new("supplement", e.to_string()))?;

        if !self.melatonin_taken && self.melatonin_mg.is_some() {
            return Err(ValidationError::new(
                "melatonin_mg",
                "must be absent when melatonin was not taken",
            ));
        }
        if !self.workout && self.workout_intensity.is_some() {
            return Err(ValidationError::new(
                "workout_intensity",
                "must be absent when there was no workout",
            ));
        }

        Ok(LogEntry {
            date: self.date,
            supplement,
            sleep_hours: self.sleep_hours,
            melatonin_taken: self.melatonin_taken,
            melatonin_mg: self.melatonin_mg,
            wake_time: self.wake_time,
            workout: self.workout,
            workout_intensity: self.workout_intensity,
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
        })
    }
}

fn first_error(errors: &validator::ValidationErrors) -> ValidationError {
    let by_field = errors.field_errors();
    FIELDS
        .iter()
        .find_map(|&field| {
            let first = by_field.get(field)?.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            Some(ValidationError::new(field, message))
        })
        .unwrap_or_else(|| ValidationError::new("entry", errors.to_string()))
}

/// Trims free text; blank becomes absent.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Numeric columns charted on the dashboard and folded into the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendField {
    SleepHours,
    SunlightHours,
    WorkoutIntensity,
    AmMedEfficacy,
    AfternoonMedEfficacy,
    PmMedEfficacy,
}

impl TrendField {
    pub const ALL: [TrendField; 6] = [
        TrendField::SleepHours,
        TrendField::SunlightHours,
        TrendField::WorkoutIntensity,
        TrendField::AmMedEfficacy,
        TrendField::AfternoonMedEfficacy,
        TrendField::PmMedEfficacy,
    ];

    pub fn column(self) -> &'static str {
        match self {
            TrendField::SleepHours => "sleep_hours",
            TrendField::SunlightHours => "sunlight_hours",
            TrendField::WorkoutIntensity => "workout_intensity",
            TrendField::AmMedEfficacy => "am_med_efficacy",
            TrendField::AfternoonMedEfficacy => "afternoon_med_efficacy",
            TrendField::PmMedEfficacy => "pm_med_efficacy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendField::SleepHours => "Sleep (hrs)",
            TrendField::SunlightHours => "Sunlight (hrs)",
            TrendField::WorkoutIntensity => "Workout intensity",
            TrendField::AmMedEfficacy => "AM efficacy",
            TrendField::AfternoonMedEfficacy => "Afternoon efficacy",
            TrendField::PmMedEfficacy => "PM efficacy",
        }
    }

    /// `None` when the entry has no usable value for this field.
    pub fn value(self, entry: &LogEntry) -> Option<f64> {
        let value = match self {
            TrendField::SleepHours => Some(entry.sleep_hours),
            TrendField::SunlightHours => Some(entry.sunlight_hours),
            TrendField::WorkoutIntensity => entry.workout_intensity.map(f64::from),
            TrendField::AmMedEfficacy => Some(f64::from(entry.am_med_efficacy)),
            TrendField::AfternoonMedEfficacy => Some(f64::from(entry.afternoon_med_efficacy)),
            TrendField::PmMedEfficacy => Some(f64::from(entry.pm_med_efficacy)),
        };
        value.filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawEntry {
        RawEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            supplement: "Advanced Antioxidants".into(),
            sleep_hours: 7.5,
            melatonin_taken: true,
            melatonin_mg: Some(3.0),
            wake_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            workout: true,
            workout_intensity: Some(6),
            breakfast: Some("oats".into()),
            sunlight_hours: 2.0,
            lunch: Some("  ".into()),
            snack: None,
            dinner: Some(" salmon ".into()),
            dinner_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            supplement_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            initial_reaction: None,
            morning_mood: Some("rested".into()),
            am_med_efficacy: 7,
            afternoon_med_efficacy: 6,
            pm_med_efficacy: 5,
            notes: Some(String::new()),
        }
    }

    #[test]
    fn test_valid_raw_entry_converts() {
        let entry = raw().into_entry().unwrap();
        assert_eq!(entry.supplement, Supplement::AdvancedAntioxidants);
        assert_eq!(entry.melatonin_mg, Some(3.0));
        assert_eq!(entry.workout_intensity, Some(6));
    }

    #[test]
    fn test_blank_text_becomes_absent_and_text_is_trimmed() {
        let entry = raw().into_entry().unwrap();
        assert_eq!(entry.lunch, None);
        assert_eq!(entry.notes, None);
        assert_eq!(entry.dinner.as_deref(), Some("salmon"));
        assert_eq!(entry.breakfast.as_deref(), Some("oats"));
    }

    #[test]
    fn test_sleep_out_of_range_names_field() {
        let err = RawEntry { sleep_hours: 25.0, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "sleep_hours");
    }

    #[test]
    fn test_efficacy_out_of_scale_names_field() {
        let err = RawEntry { pm_med_efficacy: 0, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "pm_med_efficacy");

        let err = RawEntry { am_med_efficacy: 11, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "am_med_efficacy");
    }

    #[test]
    fn test_first_failing_field_in_schema_order_is_reported() {
        let err = RawEntry {
            sleep_hours: -1.0,
            pm_med_efficacy: 42,
            ..raw()
        }
        .into_entry()
        .unwrap_err();
        assert_eq!(err.field, "sleep_hours");
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = RawEntry { sunlight_hours: f64::NAN, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "sunlight_hours");
    }

    #[test]
    fn test_unknown_supplement_is_rejected() {
        let err = RawEntry { supplement: "Fish Oil".into(), ..raw() }
            .into_entry()
            .unwrap_err();
        assert_eq!(err.field, "supplement");
    }

    #[test]
    fn test_dependent_value_without_toggle_is_rejected() {
        let err = RawEntry { melatonin_taken: false, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "melatonin_mg");

        let err = RawEntry { workout: false, ..raw() }.into_entry().unwrap_err();
        assert_eq!(err.field, "workout_intensity");
    }

    #[test]
    fn test_zero_melatonin_is_kept_when_taken() {
        let entry = RawEntry { melatonin_mg: Some(0.0), ..raw() }.into_entry().unwrap();
        assert_eq!(entry.melatonin_mg, Some(0.0));
    }

    #[test]
    fn test_trend_field_values() {
        let entry = RawEntry {
            workout: false,
            workout_intensity: None,
            ..raw()
        }
        .into_entry()
        .unwrap();
        assert_eq!(TrendField::SleepHours.value(&entry), Some(7.5));
        assert_eq!(TrendField::WorkoutIntensity.value(&entry), None);
        assert_eq!(TrendField::AfternoonMedEfficacy.value(&entry), Some(6.0));
    }

    #[test]
    fn test_trend_field_catalogue_labels() {
        let labels: Vec<_> = TrendField::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            [
                "Sleep (hrs)",
                "Sunlight (hrs)",
                "Workout intensity",
                "AM efficacy",
                "Afternoon efficacy",
                "PM efficacy"
            ]
        );
    }
}
