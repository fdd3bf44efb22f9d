//! Mood analytics over a trailing window of journal entries.
//!
//! Every call recomputes from scratch: resolve the caller, fetch the entries
//! created inside the window, then fold them into per-day buckets and
//! window-wide statistics. Days are UTC calendar dates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::db::JournalStore;
use crate::dto::ActionResult;
use crate::models::entry::Entry;

/// Window selector for the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    SevenDays,
    FifteenDays,
    #[default]
    ThirtyDays,
}

impl Period {
    /// Unrecognized codes fall back to 30 days rather than erroring.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("7d") => Period::SevenDays,
            Some("15d") => Period::FifteenDays,
            _ => Period::ThirtyDays,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Period::SevenDays => 7,
            Period::FifteenDays => 15,
            Period::ThirtyDays => 30,
        }
    }

    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub average_score: f64,
    pub entry_count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodStats {
    pub total_entries: usize,
    pub average_score: f64,
    pub most_frequent_mood: Option<String>,
    pub daily_average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub timeline: Vec<TimelinePoint>,
    pub stats: MoodStats,
    pub entries: Vec<Entry>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Default)]
struct DayBucket {
    total_score: i64,
    count: u32,
}

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(total: f64, count: f64) -> f64 {
    if count == 0.0 {
        0.0
    } else {
        round1(total / count)
    }
}

/// One point per day that has entries, ascending by date.
pub fn build_timeline(entries: &[Entry]) -> Vec<TimelinePoint> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for entry in entries {
        let bucket = buckets.entry(entry.created_at.date_naive()).or_default();
        bucket.total_score += i64::from(entry.mood_score);
        bucket.count += 1;
    }

    buckets
        .into_iter()
        .map(|(date, bucket)| TimelinePoint {
            date,
            average_score: average(bucket.total_score as f64, f64::from(bucket.count)),
            entry_count: bucket.count,
        })
        .collect()
}

/// Most common mood tag. Ties go to the tag encountered first.
pub fn most_frequent_mood(entries: &[Entry]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        match index.get(entry.mood.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(entry.mood.as_str(), counts.len());
                counts.push((entry.mood.as_str(), 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (mood, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((mood, count));
        }
    }
    best.map(|(mood, _)| mood.to_string())
}

pub fn summarize(entries: &[Entry], period: Period) -> MoodStats {
    let total_entries = entries.len();
    let total_score: i64 = entries.iter().map(|e| i64::from(e.mood_score)).sum();

    MoodStats {
        total_entries,
        average_score: average(total_score as f64, total_entries as f64),
        most_frequent_mood: most_frequent_mood(entries),
        // Nominal window length, not the number of days with data.
        daily_average: round1(total_entries as f64 / period.days() as f64),
    }
}

pub fn build_analytics(entries: Vec<Entry>, period: Period) -> Analytics {
    Analytics {
        timeline: build_timeline(&entries),
        stats: summarize(&entries, period),
        entries,
    }
}

async fn try_compute(
    store: &dyn JournalStore,
    external_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Analytics, AnalyticsError> {
    let user = store
        .find_user_by_external_id(external_id)
        .await?
        .ok_or(AnalyticsError::UserNotFound)?;

    let entries = store
        .entries_since(user.id, period.window_start(now))
        .await?;

    tracing::debug!(
        user_id = %user.id,
        days = period.days(),
        entries = entries.len(),
        "Computing mood analytics"
    );

    Ok(build_analytics(entries, period))
}

/// Never fails outright: user-not-found and storage errors come back as a
/// tagged failure. `now` is captured once by the caller.
pub async fn compute_analytics(
    store: &dyn JournalStore,
    external_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> ActionResult<Analytics> {
    ActionResult::capture(
        try_compute(store, external_id, period, now).await,
        "generating analytics",
    )
}
