//! Night-time base load ("talon") estimation.

use crate::aggregator::HourlyConsumption;
use chrono::{DateTime, LocalResult, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use emgraph_common::HourKey;
use emgraph_config::AnalysisConfig;
use tracing::debug;

/// Selects recent buckets in the early hours of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    end_hour: u32,
    recency_days: i64,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self::new(6, 2)
    }
}

impl NightWindow {
    /// Hours `0..end_hour` that started fewer than `recency_days` whole days ago.
    pub const fn new(end_hour: u32, recency_days: i64) -> Self {
        Self {
            end_hour,
            recency_days,
        }
    }

    /// Window described by the analysis settings.
    pub const fn from_config(analysis: &AnalysisConfig) -> Self {
        Self::new(analysis.night_end_hour, analysis.recency_days)
    }

    /// Whether the bucket `key` qualifies relative to `now`.
    ///
    /// The bucket start is placed in `now`'s zone with standard time
    /// preferred: an ambiguous start takes the later instant and a start
    /// inside a DST gap takes the zone's standard offset.
    pub fn contains(&self, key: &HourKey, now: &DateTime<Tz>) -> bool {
        if key.hour() >= self.end_hour {
            return false;
        }
        let Some(start) = bucket_start(key, now.timezone()) else {
            debug!(%key, "Hour start is out of range, skipping");
            return false;
        };
        now.signed_duration_since(start).num_days() < self.recency_days
    }

    /// Qualifying buckets in chronological order.
    pub fn qualifying<'a>(
        &'a self,
        hourly: &'a HourlyConsumption,
        now: &'a DateTime<Tz>,
    ) -> impl Iterator<Item = (HourKey, f64)> + 'a {
        hourly.iter().filter(move |(key, _)| self.contains(key, now))
    }

    /// Unweighted mean of the qualifying buckets, `0.0` when none qualify.
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self, hourly: &HourlyConsumption, now: &DateTime<Tz>) -> f64 {
        let (count, sum) = self
            .qualifying(hourly, now)
            .fold((0usize, 0.0), |(count, sum), (_, value)| (count + 1, sum + value));

        debug!(buckets = count, "Night window selection");
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// UTC instant at which the local hour `key` starts in `tz`.
fn bucket_start(key: &HourKey, tz: Tz) -> Option<DateTime<Utc>> {
    let local = key.start();
    match tz.from_local_datetime(&local) {
        LocalResult::Single(start) => Some(start.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, standard) => Some(standard.with_timezone(&Utc)),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&local).base_utc_offset();
            local
                .checked_sub_signed(offset)
                .map(|utc| Utc.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emgraph_common::test_utils::{assert_approx_eq, mock_timestamp};

    fn key(s: &str) -> HourKey {
        s.parse().unwrap()
    }

    fn paris_now(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        mock_timestamp(y, m, d, h, 0, 0).with_timezone(&chrono_tz::Europe::Paris)
    }

    #[test]
    fn test_average_of_night_buckets() {
        let hourly: HourlyConsumption = [
            (key("2024-01-02 00"), 10.0),
            (key("2024-01-02 03"), 30.0),
            (key("2024-01-02 05"), 20.0),
            (key("2024-01-02 06"), 500.0),
            (key("2024-01-02 12"), 900.0),
        ]
        .into_iter()
        .collect();

        let now = paris_now(2024, 1, 2, 11);
        assert_approx_eq(NightWindow::default().average(&hourly, &now), 20.0, 1e-9);
    }

    #[test]
    fn test_no_night_bucket_gives_zero() {
        let hourly: HourlyConsumption = [(key("2024-01-02 06"), 500.0), (key("2024-01-02 18"), 1.0)]
            .into_iter()
            .collect();

        let now = paris_now(2024, 1, 2, 20);
        assert!(hourly.total() > 0.0);
        assert!(NightWindow::default().average(&hourly, &now).abs() < f64::EPSILON);
        assert!(NightWindow::default()
            .average(&HourlyConsumption::new(), &now)
            .abs()
            < f64::EPSILON);
    }

    #[test]
    fn test_recency_uses_whole_days() {
        let window = NightWindow::default();
        // 2024-01-03 10:00 local.
        let now = paris_now(2024, 1, 3, 9);

        // 1 day 9 hours ago.
        assert!(window.contains(&key("2024-01-02 01"), &now));
        // 2 days 9 hours ago.
        assert!(!window.contains(&key("2024-01-01 01"), &now));
        // 1 day 23 hours ago still counts as one whole day.
        let late = paris_now(2024, 1, 3, 22);
        assert!(window.contains(&key("2024-01-02 00"), &late));
    }

    #[test]
    fn test_end_hour_is_exclusive() {
        let window = NightWindow::new(6, 2);
        let now = paris_now(2024, 1, 2, 12);
        assert!(window.contains(&key("2024-01-02 05"), &now));
        assert!(!window.contains(&key("2024-01-02 06"), &now));
    }

    #[test]
    fn test_dst_gap_hour_takes_standard_offset() {
        // 02:00 does not exist in Paris on 2024-03-31.
        let gap = key("2024-03-31 02");
        assert_eq!(
            bucket_start(&gap, chrono_tz::Europe::Paris),
            Some(mock_timestamp(2024, 3, 31, 1, 0, 0))
        );

        let window = NightWindow::default();
        let now = paris_now(2024, 3, 31, 10);
        assert!(window.contains(&gap, &now));
        assert!(window.contains(&key("2024-03-31 03"), &now));
    }

    #[test]
    fn test_fall_back_hour_takes_standard_time() {
        // 02:00 occurs twice in Paris on 2024-10-27; the second one is 01:00 UTC.
        let repeated = key("2024-10-27 02");
        assert_eq!(
            bucket_start(&repeated, chrono_tz::Europe::Paris),
            Some(mock_timestamp(2024, 10, 27, 1, 0, 0))
        );

        // 2024-10-29 01:30 local, 47.5 hours after the standard-time start.
        let now = mock_timestamp(2024, 10, 29, 0, 30, 0).with_timezone(&chrono_tz::Europe::Paris);
        assert!(NightWindow::default().contains(&repeated, &now));
    }

    #[test]
    fn test_average_is_order_independent() {
        let a: HourlyConsumption = [(key("2024-01-02 01"), 4.0), (key("2024-01-02 02"), 8.0)]
            .into_iter()
            .collect();
        let b: HourlyConsumption = [(key("2024-01-02 02"), 8.0), (key("2024-01-02 01"), 4.0)]
            .into_iter()
            .collect();

        let now = paris_now(2024, 1, 2, 12);
        let window = NightWindow::default();
        assert_approx_eq(window.average(&a, &now), window.average(&b, &now), 1e-12);
        assert_approx_eq(window.average(&a, &now), 6.0, 1e-12);
    }

    #[test]
    fn test_from_config() {
        let analysis = AnalysisConfig {
            timezone: "UTC".to_string(),
            night_end_hour: 4,
            recency_days: 1,
        };
        assert_eq!(NightWindow::from_config(&analysis), NightWindow::new(4, 1));
    }
}
