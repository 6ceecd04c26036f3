//! Sparse year-indexed tables and their piecewise-linear interpolation.
//!
//! A [`Trajectory`] is never empty: construction from zero anchors fails, so
//! interpolation itself cannot fail once a store has been built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Year;
use crate::error::{ProjectionError, ProjectionResult};

/// Linear blend between two anchor values.
pub trait Lerp: Clone {
    /// Value at `fraction` of the way from `self` to `next` (0.0 = self, 1.0 = next)
    fn lerp(&self, next: &Self, fraction: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, next: &Self, fraction: f64) -> Self {
        self + (next - self) * fraction
    }
}

/// A field of a structured anchor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// Structured anchor (e.g. `{min, mid, max, capacity_factor}` of a cost table).
///
/// Numeric fields interpolate independently; text fields and numeric fields
/// missing from the later anchor are carried over from the earlier anchor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorRecord(BTreeMap<String, FieldValue>);

impl AnchorRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, field: &str, value: f64) -> Self {
        self.0.insert(field.to_string(), FieldValue::Number(value));
        self
    }

    pub fn with_text(mut self, field: &str, value: &str) -> Self {
        self.0
            .insert(field.to_string(), FieldValue::Text(value.to_string()));
        self
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field) {
            Some(FieldValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl Lerp for AnchorRecord {
    fn lerp(&self, next: &Self, fraction: f64) -> Self {
        let fields = self
            .0
            .iter()
            .map(|(key, value)| {
                let blended = match (value, next.0.get(key)) {
                    (FieldValue::Number(a), Some(FieldValue::Number(b))) => {
                        FieldValue::Number(a.lerp(b, fraction))
                    }
                    _ => value.clone(),
                };
                (key.clone(), blended)
            })
            .collect();
        AnchorRecord(fields)
    }
}

/// Non-empty, ordered `year -> value` table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory<T = f64> {
    anchors: BTreeMap<Year, T>,
}

impl<T: Lerp> Trajectory<T> {
    /// Build a trajectory, failing with [`ProjectionError::EmptyTrajectory`]
    /// when `anchors` is empty.
    pub fn new(name: &str, anchors: BTreeMap<Year, T>) -> ProjectionResult<Self> {
        if anchors.is_empty() {
            return Err(ProjectionError::EmptyTrajectory {
                name: name.to_string(),
            });
        }
        Ok(Self { anchors })
    }

    /// Merge historical and projected anchors; projections win on shared years.
    pub fn from_parts(
        name: &str,
        historical: BTreeMap<Year, T>,
        projections: BTreeMap<Year, T>,
    ) -> ProjectionResult<Self> {
        let mut anchors = historical;
        anchors.extend(projections);
        Self::new(name, anchors)
    }

    pub fn constant(year: Year, value: T) -> Self {
        Self {
            anchors: BTreeMap::from([(year, value)]),
        }
    }

    /// Value at `year`: exact at anchors, linear between them, flat outside.
    pub fn interpolate(&self, year: Year) -> T {
        if let Some(exact) = self.anchors.get(&year) {
            return exact.clone();
        }

        let before = self.anchors.range(..year).next_back();
        let after = self.anchors.range(year..).next();

        match (before, after) {
            (Some((&y1, v1)), Some((&y2, v2))) => {
                let fraction = f64::from(year - y1) / f64::from(y2 - y1);
                v1.lerp(v2, fraction)
            }
            // Only one side exists: flat extrapolation from the nearest anchor
            (Some((_, v)), None) | (None, Some((_, v))) => v.clone(),
            (None, None) => unreachable!("trajectory is constructed non-empty"),
        }
    }

    pub fn anchors(&self) -> impl Iterator<Item = (Year, &T)> {
        self.anchors.iter().map(|(y, v)| (*y, v))
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
