//! Trend computation over health-log records.
//!
//! Everything here is pure: filter a slice of records, pull out the charted
//! numeric series, min-max normalize each series, and fold the normalized
//! values into a per-date composite score.
//!
//! The composite averages only the fields that have a value on a date. A
//! gap is left out of both the sum and the count, so it never drags the
//! score toward zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{LogEntry, Supplement};
use crate::schema::TrendField;

/// Supplement set and inclusive date interval a dashboard is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendFilter {
    pub supplements: BTreeSet<Supplement>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TrendFilter {
    /// Fills whatever the caller left out from the data: every supplement
    /// present, and the earliest/latest date present. `today` is used for
    /// the dates only when there is no data at all.
    pub fn resolve<E: AsRef<LogEntry>>(
        supplements: Option<BTreeSet<Supplement>>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        entries: &[E],
        today: NaiveDate,
    ) -> Self {
        let dates = entries.iter().map(|e| e.as_ref().date);
        let first = dates.clone().min().unwrap_or(today);
        let last = dates.max().unwrap_or(today);

        Self {
            supplements: supplements.unwrap_or_else(|| present_supplements(entries)),
            start: start.unwrap_or(first),
            end: end.unwrap_or(last),
        }
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.supplements.contains(&entry.supplement)
            && entry.date >= self.start
            && entry.date <= self.end
    }
}

/// Distinct supplements that occur in `entries`.
pub fn present_supplements<E: AsRef<LogEntry>>(entries: &[E]) -> BTreeSet<Supplement> {
    entries.iter().map(|e| e.as_ref().supplement).collect()
}

/// Entries matching `filter`, sorted by date ascending. Entries sharing a
/// date keep their input order.
pub fn filter_entries<E: AsRef<LogEntry> + Clone>(entries: &[E], filter: &TrendFilter) -> Vec<E> {
    let mut kept: Vec<E> = entries
        .iter()
        .filter(|e| filter.matches(e.as_ref()))
        .cloned()
        .collect();
    kept.sort_by_key(|e| e.as_ref().date);
    kept
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub field: TrendField,
    pub label: &'static str,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// One series per charted field, each with one point per entry in date
/// order. Missing values stay `None`.
pub fn extract_series<E: AsRef<LogEntry>>(entries: &[E]) -> Vec<Series> {
    let mut ordered: Vec<&LogEntry> = entries.iter().map(|e| e.as_ref()).collect();
    ordered.sort_by_key(|e| e.date);

    TrendField::ALL
        .iter()
        .map(|&field| Series {
            field,
            label: field.label(),
            points: ordered
                .iter()
                .map(|e| SeriesPoint {
                    date: e.date,
                    value: field.value(e),
                })
                .collect(),
        })
        .collect()
}

/// Min-max normalization over the present values. A flat range (including
/// a single value) maps every present value to 0.0.
pub fn normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten().copied();
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| {
            v.map(|v| {
                if range > 0.0 {
                    (v - min) / range
                } else {
                    0.0
                }
            })
        })
        .collect()
}

pub fn normalize_series(series: &[Series]) -> Vec<Series> {
    series
        .iter()
        .map(|s| {
            let normalized = normalize(&s.values());
            Series {
                field: s.field,
                label: s.label,
                points: s
                    .points
                    .iter()
                    .zip(normalized)
                    .map(|(p, value)| SeriesPoint { date: p.date, value })
                    .collect(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositePoint {
    pub date: NaiveDate,
    /// `None` when no field has a value on this date.
    pub score: Option<f64>,
}

/// Per-date mean of the normalized values that are present on that date.
pub fn composite(normalized: &[Series]) -> Vec<CompositePoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for point in normalized.iter().flat_map(|s| &s.points) {
        let (sum, count) = by_date.entry(point.date).or_insert((0.0, 0));
        if let Some(value) = point.value {
            *sum += value;
            *count += 1;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| CompositePoint {
            date,
            score: (count > 0).then(|| sum / count as f64),
        })
        .collect()
}

/// Chart data for an already-filtered set of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    pub series: Vec<Series>,
    pub normalized: Vec<Series>,
    pub composite: Vec<CompositePoint>,
}

pub fn compute<E: AsRef<LogEntry>>(filtered: &[E]) -> Trends {
    let series = extract_series(filtered);
    let normalized = normalize_series(&series);
    let composite = composite(&normalized);
    Trends {
        series,
        normalized,
        composite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn entry(d: u32, supplement: Supplement, sleep: f64, sunlight: f64) -> LogEntry {
        LogEntry {
            date: day(d),
            supplement,
            sleep_hours: sleep,
            melatonin_taken: false,
            melatonin_mg: None,
            wake_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            workout: false,
            workout_intensity: None,
            breakfast: None,
            sunlight_hours: sunlight,
            lunch: None,
            snack: None,
            dinner: None,
            dinner_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            supplement_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            initial_reaction: None,
            morning_mood: None,
            am_med_efficacy: 5,
            afternoon_med_efficacy: 5,
            pm_med_efficacy: 5,
            notes: None,
        }
    }

    fn series_values(series: &[Series], field: TrendField) -> Vec<Option<f64>> {
        series
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.values())
            .unwrap_or_default()
    }

    fn only(fields: &[TrendField], points: &[(NaiveDate, Vec<Option<f64>>)]) -> Vec<Series> {
        fields
            .iter()
            .enumerate()
            .map(|(i, &field)| Series {
                field,
                label: field.label(),
                points: points
                    .iter()
                    .map(|(date, values)| SeriesPoint {
                        date: *date,
                        value: values[i],
                    })
                    .collect(),
            })
            .collect()
    }

    // ── filter ───────────────────────────────────────────────────────────

    #[test]
    fn test_filter_by_supplement_and_inclusive_dates() {
        let entries = vec![
            entry(1, Supplement::EssentialCapsules, 6.0, 1.0),
            entry(2, Supplement::AdvancedAntioxidants, 7.0, 1.0),
            entry(3, Supplement::EssentialCapsules, 8.0, 1.0),
            entry(4, Supplement::EssentialCapsules, 9.0, 1.0),
        ];
        let filter = TrendFilter {
            supplements: BTreeSet::from([Supplement::EssentialCapsules]),
            start: day(1),
            end: day(3),
        };

        let kept = filter_entries(&entries, &filter);
        let dates: Vec<_> = kept.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(3)]);
    }

    #[test]
    fn test_filter_is_identity_over_full_span() {
        let entries = vec![
            entry(1, Supplement::EssentialCapsules, 6.0, 1.0),
            entry(2, Supplement::RedYeastRiceGarlic, 7.0, 2.0),
            entry(5, Supplement::NacGingerCurcumin, 8.0, 3.0),
        ];
        let filter = TrendFilter::resolve(None, None, None, &entries, day(30));
        assert_eq!(filter.start, day(1));
        assert_eq!(filter.end, day(5));
        assert_eq!(filter_entries(&entries, &filter), entries);
    }

    #[test]
    fn test_filter_with_unmatched_supplement_is_empty() {
        let entries = vec![entry(1, Supplement::EssentialCapsules, 6.0, 1.0)];
        let filter = TrendFilter {
            supplements: BTreeSet::from([Supplement::RedYeastRiceGarlic]),
            start: day(1),
            end: day(31),
        };
        assert!(filter_entries(&entries, &filter).is_empty());
    }

    #[test]
    fn test_empty_supplement_set_or_inverted_interval_is_empty() {
        let entries = vec![entry(2, Supplement::EssentialCapsules, 6.0, 1.0)];

        let no_supplements = TrendFilter::resolve(Some(BTreeSet::new()), None, None, &entries, day(30));
        assert!(filter_entries(&entries, &no_supplements).is_empty());

        let inverted = TrendFilter::resolve(None, Some(day(3)), Some(day(1)), &entries, day(30));
        assert!(filter_entries(&entries, &inverted).is_empty());
    }

    #[test]
    fn test_filter_sorts_by_date() {
        let entries = vec![
            entry(3, Supplement::EssentialCapsules, 8.0, 1.0),
            entry(1, Supplement::EssentialCapsules, 6.0, 1.0),
        ];
        let filter = TrendFilter::resolve(None, None, None, &entries, day(30));
        let dates: Vec<_> = filter_entries(&entries, &filter).iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(3)]);
    }

    #[test]
    fn test_resolve_without_data_uses_today() {
        let entries: Vec<LogEntry> = Vec::new();
        let filter = TrendFilter::resolve(None, None, None, &entries, day(9));
        assert!(filter.supplements.is_empty());
        assert_eq!((filter.start, filter.end), (day(9), day(9)));
    }

    // ── normalize ────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_maps_min_to_zero_and_max_to_one() {
        let out = normalize(&[Some(4.0), Some(2.0), Some(10.0)]);
        assert_eq!(out, vec![Some(0.25), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_normalize_flat_or_single_is_zero() {
        assert_eq!(normalize(&[Some(3.0)]), vec![Some(0.0)]);
        assert_eq!(normalize(&[Some(5.0), Some(5.0)]), vec![Some(0.0), Some(0.0)]);
        assert_eq!(normalize(&[]), Vec::<Option<f64>>::new());
    }

    #[test]
    fn test_normalize_keeps_gaps_out_of_range() {
        let out = normalize(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(out, vec![Some(0.0), None, Some(1.0)]);
        assert_eq!(normalize(&[None, None]), vec![None, None]);
    }

    // ── series & composite ───────────────────────────────────────────────

    #[test]
    fn test_two_day_scenario() {
        let entries = vec![
            entry(1, Supplement::EssentialCapsules, 6.0, 1.0),
            entry(2, Supplement::EssentialCapsules, 8.0, 3.0),
        ];
        let trends = compute(&entries);

        assert_eq!(
            series_values(&trends.normalized, TrendField::SleepHours),
            vec![Some(0.0), Some(1.0)]
        );
        assert_eq!(
            series_values(&trends.normalized, TrendField::SunlightHours),
            vec![Some(0.0), Some(1.0)]
        );
        // Flat efficacy normalizes to 0.0; workout intensity is missing.
        let scores: Vec<_> = trends.composite.iter().map(|p| p.score).collect();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], Some(0.0));
        assert_eq!(scores[1], Some(0.4));
        assert_eq!(trends.composite[1].date, day(2));

        // Composite over just the two varying fields.
        let varying = only(
            &[TrendField::SleepHours, TrendField::SunlightHours],
            &[(day(1), vec![Some(0.0), Some(0.0)]), (day(2), vec![Some(1.0), Some(1.0)])],
        );
        let scores: Vec<_> = composite(&varying).iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_raw_series_keep_missing_values() {
        let mut with_workout = entry(2, Supplement::EssentialCapsules, 7.0, 2.0);
        with_workout.workout = true;
        with_workout.workout_intensity = Some(5);
        let entries = vec![entry(1, Supplement::EssentialCapsules, 6.0, 1.0), with_workout];

        let series = extract_series(&entries);
        assert_eq!(series.len(), 6);
        assert_eq!(
            series_values(&series, TrendField::WorkoutIntensity),
            vec![None, Some(5.0)]
        );
        assert_eq!(series[0].label, "Sleep (hrs)");
    }

    #[test]
    fn test_composite_excludes_missing_fields_from_denominator() {
        let normalized = only(
            &[TrendField::SleepHours, TrendField::WorkoutIntensity],
            &[(day(1), vec![Some(0.5), None]), (day(2), vec![Some(1.0), Some(0.0)])],
        );
        let scores: Vec<_> = composite(&normalized).iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![Some(0.5), Some(0.5)]);
    }

    #[test]
    fn test_composite_absent_when_every_field_missing() {
        let normalized = only(
            &[TrendField::SleepHours, TrendField::SunlightHours],
            &[(day(1), vec![None, None]), (day(2), vec![Some(0.0), Some(1.0)])],
        );
        let points = composite(&normalized);
        assert_eq!(points[0], CompositePoint { date: day(1), score: None });
        assert_eq!(points[1].score, Some(0.5));
    }

    #[test]
    fn test_composite_single_present_field_passes_through() {
        let normalized = only(
            &[TrendField::SleepHours, TrendField::SunlightHours, TrendField::PmMedEfficacy],
            &[(day(1), vec![None, Some(0.75), None])],
        );
        assert_eq!(composite(&normalized)[0].score, Some(0.75));
    }

    #[test]
    fn test_composite_pools_entries_sharing_a_date() {
        let normalized = only(
            &[TrendField::SleepHours],
            &[(day(1), vec![Some(0.0)]), (day(1), vec![Some(1.0)]), (day(2), vec![Some(1.0)])],
        );
        let points = composite(&normalized);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].score, Some(0.5));
    }

    #[test]
    fn test_compute_on_empty_input() {
        let entries: Vec<LogEntry> = Vec::new();
        let trends = compute(&entries);
        assert_eq!(trends.series.len(), 6);
        assert!(trends.series.iter().all(|s| s.points.is_empty()));
        assert!(trends.composite.is_empty());
    }
}
