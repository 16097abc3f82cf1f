use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzers::correlation::{CorrelationMatrix, correlation_matrix};
use crate::analyzers::describe::Describe;
use crate::analyzers::histogram::{Histogram, histogram};
use crate::analyzers::patterns::{
    self, CategoryCount, ExtremeWeather, GroupSummary, HourlyPattern,
};
use crate::analyzers::regression::{Regression, regress};
use crate::analyzers::ttest::{TTest, ttest_ind};
use crate::dataset::{DayTable, HourTable};

/// Bin count of the daily ridership histogram.
pub const HISTOGRAM_BINS: usize = 30;

const REGRESSION_FEATURES: [&str; 4] = ["weathersit", "temp", "hum", "windspeed"];

#[derive(Debug, Serialize)]
pub struct Distributions {
    pub cnt: Describe,
    pub cnt_histogram: Histogram,
    pub temp: Describe,
    pub hum: Describe,
    pub windspeed: Describe,
    pub weather: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct DayTypeComparison {
    pub working_day: Describe,
    pub holiday: Describe,
    /// `None` when either group is too small to test.
    pub ttest: Option<TTest>,
}

/// Everything the analysis derives from the two tables.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub day_rows: usize,
    pub hour_rows: usize,
    pub distributions: Distributions,
    pub seasons: Vec<GroupSummary>,
    pub correlation: CorrelationMatrix,
    /// `None` when the design matrix cannot be solved.
    pub regression: Option<Regression>,
    pub day_type: DayTypeComparison,
    pub hourly_pattern: HourlyPattern,
    pub extreme_weather: ExtremeWeather,
}

pub fn build_report(day: &DayTable, hour: &HourTable) -> Report {
    let days = day.rows();
    let cnt = patterns::counts(days);
    let temp: Vec<f64> = days.iter().map(|d| d.temp).collect();
    let hum: Vec<f64> = days.iter().map(|d| d.hum).collect();
    let windspeed: Vec<f64> = days.iter().map(|d| d.windspeed).collect();
    let weathersit: Vec<f64> = days.iter().map(|d| f64::from(d.weathersit)).collect();

    let correlation = correlation_matrix(&[
        ("cnt", cnt.clone()),
        ("weathersit", weathersit),
        ("temp", temp.clone()),
        ("hum", hum.clone()),
        ("windspeed", windspeed.clone()),
    ]);

    let design: Vec<Vec<f64>> = days
        .iter()
        .map(|d| vec![f64::from(d.weathersit), d.temp, d.hum, d.windspeed])
        .collect();
    let regression = regress("cnt", &REGRESSION_FEATURES, &design, &cnt)
        .context("regression of cnt on weather variables")
        .inspect_err(|e| warn!(error = %format!("{e:#}"), "Skipping regression"))
        .ok();

    let (working, holiday) = patterns::workday_holiday_counts(days);
    let ttest = ttest_ind(&working, &holiday)
        .inspect_err(|e| warn!(error = %e, "Skipping working-day vs holiday t-test"))
        .ok();

    let report = Report {
        generated_at: Utc::now(),
        day_rows: day.len(),
        hour_rows: hour.len(),
        distributions: Distributions {
            cnt_histogram: histogram(&cnt, HISTOGRAM_BINS),
            cnt: Describe::of(&cnt),
            temp: Describe::of(&temp),
            hum: Describe::of(&hum),
            windspeed: Describe::of(&windspeed),
            weather: patterns::weather_distribution(days),
        },
        seasons: patterns::by_season(days),
        correlation,
        regression,
        day_type: DayTypeComparison {
            working_day: Describe::of(&working),
            holiday: Describe::of(&holiday),
            ttest,
        },
        hourly_pattern: patterns::hourly_pattern(hour.rows()),
        extreme_weather: patterns::extreme_weather(days),
    };

    debug!(
        day_rows = report.day_rows,
        hour_rows = report.hour_rows,
        "Report built"
    );
    report
}

/// Fails instead of degrading when a statistic cannot be computed.
pub fn build_strict_report(day: &DayTable, hour: &HourTable) -> Result<Report> {
    let report = build_report(day, hour);
    anyhow::ensure!(report.regression.is_some(), "regression could not be fitted");
    anyhow::ensure!(report.day_type.ttest.is_some(), "t-test could not be computed");
    Ok(report)
}
