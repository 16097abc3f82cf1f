//! Descriptive statistics and tests over the bike-sharing tables.
//!
//! Covers distributions, season and day-type comparisons, the weather
//! correlation matrix, an OLS fit of ridership on weather, and the
//! hour-by-weekday usage pattern. [`report::build_report`] ties them together.

pub mod correlation;
pub mod describe;
pub mod histogram;
pub mod patterns;
pub mod regression;
pub mod report;
pub mod ttest;
pub mod utility;
