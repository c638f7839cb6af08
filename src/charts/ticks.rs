//! Tick Placement Module
//! Generates time-axis tick marks at a fixed hour interval.

use chrono::{Duration, NaiveDateTime};

/// Ticks spanning `[start, end]`, stepped `hour_interval` hours from `start`,
/// with `end` appended when it does not land on the grid.
pub fn hour_ticks(start: NaiveDateTime, end: NaiveDateTime, hour_interval: u32) -> Vec<NaiveDateTime> {
    if end < start {
        return Vec::new();
    }
    if hour_interval == 0 {
        // Degenerate interval, keep only the endpoints.
        return if start == end {
            vec![start]
        } else {
            vec![start, end]
        };
    }

    let step = Duration::hours(hour_interval as i64);
    let mut ticks = Vec::new();
    let mut current = start;
    while current <= end {
        ticks.push(current);
        current += step;
    }
    if ticks.last() != Some(&end) {
        ticks.push(end);
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn full_day_at_six_hours_yields_five_ticks() {
        let start = at(0, 0);
        let end = start + Duration::hours(24);
        let ticks = hour_ticks(start, end, 6);
        assert_eq!(
            ticks,
            vec![
                start,
                start + Duration::hours(6),
                start + Duration::hours(12),
                start + Duration::hours(18),
                end,
            ]
        );
    }

    #[test]
    fn end_is_appended_when_off_grid() {
        let start = at(0, 0);
        let end = at(14, 30);
        let ticks = hour_ticks(start, end, 6);
        assert_eq!(ticks.first(), Some(&start));
        assert_eq!(ticks.last(), Some(&end));
        assert_eq!(ticks.len(), 4); // 00:00, 06:00, 12:00, 14:30
        assert_eq!(ticks[1] - ticks[0], Duration::hours(6));
    }

    #[test]
    fn single_instant_yields_single_tick() {
        let t = at(9, 15);
        assert_eq!(hour_ticks(t, t, 6), vec![t]);
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(hour_ticks(at(12, 0), at(0, 0), 6).is_empty());
    }
}
