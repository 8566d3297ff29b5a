use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned by the store when a row is appended.
pub type RecordId = Uuid;

/// The tracked product selected per entry.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Supplement {
    #[default]
    #[serde(rename = "Essential Capsules")]
    EssentialCapsules,
    #[serde(rename = "Advanced Antioxidants")]
    AdvancedAntioxidants,
    #[serde(rename = "NAC Ginger Curcumin")]
    NacGingerCurcumin,
    #[serde(rename = "Red Yeast Rice Garlic")]
    RedYeastRiceGarlic,
}

impl Supplement {
    /// Option list in form order. The first entry is the form default.
    pub const ALL: [Supplement; 4] = [
        Supplement::EssentialCapsules,
        Supplement::AdvancedAntioxidants,
        Supplement::NacGingerCurcumin,
        Supplement::RedYeastRiceGarlic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Supplement::EssentialCapsules => "Essential Capsules",
            Supplement::AdvancedAntioxidants => "Advanced Antioxidants",
            Supplement::NacGingerCurcumin => "NAC Ginger Curcumin",
            Supplement::RedYeastRiceGarlic => "Red Yeast Rice Garlic",
        }
    }
}

impl fmt::Display for Supplement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown supplement: {0:?}")]
pub struct UnknownSupplement(pub String);

impl FromStr for Supplement {
    type Err = UnknownSupplement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Supplement::ALL
            .into_iter()
            .find(|supplement| supplement.as_str() == name)
            .ok_or_else(|| UnknownSupplement(name.to_string()))
    }
}

/// One validated health-log record. Construct through
/// [`RawEntry::into_entry`](crate::schema::RawEntry::into_entry); downstream
/// code never re-validates.
///
/// `melatonin_mg` is `Some` only when `melatonin_taken`, and
/// `workout_intensity` is `Some` only when `workout`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub supplement: Supplement,

    pub sleep_hours: f64,
    pub melatonin_taken: bool,
    pub melatonin_mg: Option<f64>,

    pub wake_time: NaiveTime,
    pub workout: bool,
    pub workout_intensity: Option<i32>,

    pub breakfast: Option<String>,
    pub sunlight_hours: f64,
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

/// A record as read back from the store, with its system-managed columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEntry {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: LogEntry,
}

impl AsRef<LogEntry> for LogEntry {
    fn as_ref(&self) -> &LogEntry {
        self
    }
}

impl AsRef<LogEntry> for StoredEntry {
    fn as_ref(&self) -> &LogEntry {
        &self.entry
    }
}
