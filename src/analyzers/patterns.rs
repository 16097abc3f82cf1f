//! Grouped views of ridership: by season, weather, day type, and hour.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzers::describe::Describe;
use crate::analyzers::utility::mean;
use crate::dataset::{DayRecord, HourRecord, season_label, weather_label, weekday_label};

/// Weather-situation code treated as extreme (heavy rain, storms).
pub const EXTREME_WEATHER_CODE: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub code: u8,
    pub label: String,
    pub stats: Describe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub code: u8,
    pub label: String,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPattern {
    /// Column order of every `means` row.
    pub weekdays: Vec<String>,
    pub rows: Vec<HourRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: u8,
    /// Mean count per weekday; `None` where no observation exists.
    pub means: Vec<Option<f64>>,
}

impl HourlyPattern {
    /// `(hour, weekday label, mean)` of the busiest cell.
    pub fn peak(&self) -> Option<(u8, &str, f64)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.means
                    .iter()
                    .zip(&self.weekdays)
                    .filter_map(move |(m, day)| m.map(|m| (row.hour, day.as_str(), m)))
            })
            .max_by(|a, b| a.2.total_cmp(&b.2))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeWeather {
    pub extreme_days: usize,
    /// `None` when the table has no extreme-weather day.
    pub extreme_mean: Option<f64>,
    pub overall_mean: f64,
}

pub fn counts(days: &[DayRecord]) -> Vec<f64> {
    days.iter().map(|d| f64::from(d.cnt)).collect()
}

/// Count distribution per season, ordered by season code.
pub fn by_season(days: &[DayRecord]) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for d in days {
        groups.entry(d.season).or_default().push(f64::from(d.cnt));
    }

    groups
        .into_iter()
        .map(|(code, values)| GroupSummary {
            code,
            label: season_label(code),
            stats: Describe::of(&values),
        })
        .collect()
}

/// Number of days per weather situation.
pub fn weather_distribution(days: &[DayRecord]) -> Vec<CategoryCount> {
    let mut tally: BTreeMap<u8, usize> = BTreeMap::new();
    for d in days {
        *tally.entry(d.weathersit).or_default() += 1;
    }

    tally
        .into_iter()
        .map(|(code, days)| CategoryCount {
            code,
            label: weather_label(code),
            days,
        })
        .collect()
}

/// Counts on working days and on holidays.
pub fn workday_holiday_counts(days: &[DayRecord]) -> (Vec<f64>, Vec<f64>) {
    let working = days
        .iter()
        .filter(|d| d.workingday == 1)
        .map(|d| f64::from(d.cnt))
        .collect();
    let holiday = days
        .iter()
        .filter(|d| d.holiday == 1)
        .map(|d| f64::from(d.cnt))
        .collect();
    (working, holiday)
}

/// Mean hourly count for every (hour, weekday) pair present in the data.
pub fn hourly_pattern(hours: &[HourRecord]) -> HourlyPattern {
    let mut cells: BTreeMap<(u8, u8), Vec<f64>> = BTreeMap::new();
    for h in hours {
        cells
            .entry((h.hr, h.weekday))
            .or_default()
            .push(f64::from(h.cnt));
    }

    let mut weekday_codes: Vec<u8> = cells.keys().map(|(_, wd)| *wd).collect();
    weekday_codes.sort_unstable();
    weekday_codes.dedup();

    let mut hour_codes: Vec<u8> = cells.keys().map(|(hr, _)| *hr).collect();
    hour_codes.dedup();

    let rows = hour_codes
        .into_iter()
        .map(|hour| HourRow {
            hour,
            means: weekday_codes
                .iter()
                .map(|wd| cells.get(&(hour, *wd)).map(|v| mean(v)))
                .collect(),
        })
        .collect();

    HourlyPattern {
        weekdays: weekday_codes.into_iter().map(weekday_label).collect(),
        rows,
    }
}

pub fn extreme_weather(days: &[DayRecord]) -> ExtremeWeather {
    let extreme: Vec<f64> = days
        .iter()
        .filter(|d| d.weathersit == EXTREME_WEATHER_CODE)
        .map(|d| f64::from(d.cnt))
        .collect();

    ExtremeWeather {
        extreme_days: extreme.len(),
        extreme_mean: (!extreme.is_empty()).then(|| mean(&extreme)),
        overall_mean: mean(&counts(days)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(season: u8, weathersit: u8, workingday: u8, holiday: u8, cnt: u32) -> DayRecord {
        DayRecord {
            instant: 1,
            dteday: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            season,
            yr: 0,
            mnth: 1,
            holiday,
            weekday: 0,
            workingday,
            weathersit,
            temp: 0.3,
            atemp: 0.3,
            hum: 0.5,
            windspeed: 0.2,
            casual: 0,
            registered: cnt,
            cnt,
        }
    }

    fn hour(hr: u8, weekday: u8, cnt: u32) -> HourRecord {
        HourRecord {
            instant: 1,
            dteday: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            season: 1,
            yr: 0,
            mnth: 1,
            hr,
            holiday: 0,
            weekday,
            workingday: 1,
            weathersit: 1,
            temp: 0.3,
            atemp: 0.3,
            hum: 0.5,
            windspeed: 0.2,
            casual: 0,
            registered: cnt,
            cnt,
        }
    }

    #[test]
    fn test_by_season_groups_and_labels() {
        let days = vec![day(3, 1, 1, 0, 100), day(1, 1, 1, 0, 10), day(3, 1, 1, 0, 200)];
        let seasons = by_season(&days);

        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].label, "Winter");
        assert_eq!(seasons[1].label, "Summer");
        assert_eq!(seasons[1].stats.mean, 150.0);
    }

    #[test]
    fn test_weather_distribution() {
        let days = vec![day(1, 1, 1, 0, 1), day(1, 2, 1, 0, 1), day(1, 1, 1, 0, 1)];
        let dist = weather_distribution(&days);
        assert_eq!(dist[0].days, 2);
        assert_eq!(dist[1].label, "Cloudy");
    }

    #[test]
    fn test_workday_holiday_split() {
        let days = vec![day(1, 1, 1, 0, 5), day(1, 1, 0, 1, 7), day(1, 1, 0, 0, 9)];
        let (working, holiday) = workday_holiday_counts(&days);
        assert_eq!(working, vec![5.0]);
        assert_eq!(holiday, vec![7.0]);
    }

    #[test]
    fn test_hourly_pattern_means_and_gaps() {
        let hours = vec![hour(8, 0, 10), hour(8, 0, 20), hour(17, 1, 40), hour(8, 1, 6)];
        let p = hourly_pattern(&hours);

        assert_eq!(p.weekdays, vec!["Monday", "Tuesday"]);
        assert_eq!(p.rows.len(), 2);
        assert_eq!(p.rows[0].hour, 8);
        assert_eq!(p.rows[0].means, vec![Some(15.0), Some(6.0)]);
        assert_eq!(p.rows[1].means, vec![None, Some(40.0)]);
        assert_eq!(p.peak(), Some((17, "Tuesday", 40.0)));
    }

    #[test]
    fn test_extreme_weather() {
        let days = vec![day(1, 3, 1, 0, 100), day(1, 1, 1, 0, 300)];
        let e = extreme_weather(&days);
        assert_eq!(e.extreme_days, 1);
        assert_eq!(e.extreme_mean, Some(100.0));
        assert_eq!(e.overall_mean, 200.0);

        let calm = extreme_weather(&[day(1, 1, 1, 0, 50)]);
        assert_eq!(calm.extreme_mean, None);
    }
}
