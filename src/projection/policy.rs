use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{Scenario, Technology, Year};
use crate::error::{ProjectionError, ProjectionResult};

/// Inclusive year range written as `"2025-2030"` (or a single `"2030"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearRange {
    pub start: Year,
    pub end: Year,
}

impl YearRange {
    pub fn contains(&self, year: Year) -> bool {
        self.start <= year && year <= self.end
    }

    pub fn overlaps(&self, other: &YearRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl FromStr for YearRange {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim().parse::<Year>().map_err(|_| {
                ProjectionError::invalid_parameter("policy period", format!("'{s}' is not a year range"))
            })
        };

        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let year = parse(s)?;
                (year, year)
            }
        };
        if end < start {
            return Err(ProjectionError::invalid_parameter(
                "policy period",
                format!("'{s}' ends before it starts"),
            ));
        }
        Ok(YearRange { start, end })
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Deployment multipliers for one (technology, scenario)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySchedule {
    periods: Vec<(YearRange, f64)>,
}

impl PolicySchedule {
    /// Parse `{"start-end": multiplier}` entries, rejecting overlapping periods
    pub fn from_periods(
        technology: Technology,
        scenario: Scenario,
        raw: &BTreeMap<String, f64>,
    ) -> ProjectionResult<Self> {
        let mut periods = raw
            .iter()
            .map(|(range, multiplier)| {
                let range: YearRange = range.parse()?;
                if *multiplier < 0.0 {
                    return Err(ProjectionError::invalid_parameter(
                        format!("policy/{technology}/{scenario}/{range}"),
                        format!("multiplier {multiplier} is negative"),
                    ));
                }
                Ok((range, *multiplier))
            })
            .collect::<ProjectionResult<Vec<_>>>()?;
        periods.sort_by_key(|(range, _)| *range);

        if let Some(((first, _), (second, _))) = periods
            .iter()
            .tuple_windows()
            .find(|((a, _), (b, _))| a.overlaps(b))
        {
            return Err(ProjectionError::OverlappingPolicyPeriods {
                technology: technology.to_string(),
                scenario: scenario.to_string(),
                first: first.to_string(),
                second: second.to_string(),
            });
        }

        Ok(Self { periods })
    }

    /// Multiplier in force at `year`; 1.0 outside every period
    pub fn multiplier(&self, year: Year) -> f64 {
        self.periods
            .iter()
            .find(|(range, _)| range.contains(year))
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}
