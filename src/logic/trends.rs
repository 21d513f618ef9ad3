use super::aggregation::{average, round_to};
use crate::models::{Parameter, SensorReading};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

pub const DEFAULT_RECENT_DAYS: i64 = 3;

/// Compares the last few days of readings against everything older.
///
/// A trend is the percentage change of the recent average relative to the
/// older average, rounded to one decimal. No trend is reported unless both
/// sides have at least one reading.
#[derive(Debug, Clone, Copy)]
pub struct TrendAnalyzer {
    recent_window: Duration,
}

impl TrendAnalyzer {
    pub fn new(recent_days: i64) -> Self {
        Self {
            recent_window: Duration::days(recent_days),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.recent_window
    }

    /// Splits into (recent, older); recent includes readings exactly at the cutoff.
    pub fn partition<'a>(
        &self,
        readings: &'a [SensorReading],
        now: DateTime<Utc>,
    ) -> (Vec<&'a SensorReading>, Vec<&'a SensorReading>) {
        let cutoff = self.cutoff(now);
        readings.iter().partition(|r| r.fecha >= cutoff)
    }

    pub fn analyze(&self, readings: &[SensorReading], now: DateTime<Utc>) -> BTreeMap<Parameter, f64> {
        let (recent, older) = self.partition(readings, now);
        if recent.is_empty() || older.is_empty() {
            return BTreeMap::new();
        }

        let mut trends = BTreeMap::new();
        for parameter in Parameter::ALL {
            let recent_avg = average(recent.iter().copied(), parameter);
            let older_avg = average(older.iter().copied(), parameter);

            let (Some(recent_avg), Some(older_avg)) = (recent_avg, older_avg) else {
                continue;
            };
            if let Some(delta) = percent_change(older_avg, recent_avg) {
                trends.insert(parameter, delta);
            }
        }

        trends
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_DAYS)
    }
}

/// Percentage change from `from` to `to`, one decimal. `None` when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let delta = (to - from) / from * 100.0;
    delta.is_finite().then(|| round_to(delta, 1))
}
