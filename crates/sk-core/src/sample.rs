//! Timestamped trajectory samples.

use nalgebra::DVector;

use crate::numeric::Real;

/// One observation of a trajectory: a timestamp plus a point in d-dimensional
/// value space.
///
/// Samples are compared under the Euclidean norm in value space and the
/// absolute difference in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    /// Timestamp of the observation.
    pub time: Real,

    /// Observed value, one entry per monitored dimension.
    pub coords: DVector<Real>,
}

impl TrajectorySample {
    pub fn new(time: Real, coords: DVector<Real>) -> Self {
        Self { time, coords }
    }

    /// Build a sample from a coordinate slice.
    pub fn from_slice(time: Real, coords: &[Real]) -> Self {
        Self {
            time,
            coords: DVector::from_column_slice(coords),
        }
    }

    /// Number of value-space dimensions.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Euclidean distance to another sample in value space (time ignored).
    pub fn distance_to(&self, other: &TrajectorySample) -> Real {
        self.coords.metric_distance(&other.coords)
    }

    /// Overwrite this sample in place, reusing the coordinate buffer when the
    /// dimensions match so steady-state use allocates nothing.
    pub fn assign_from(&mut self, other: &TrajectorySample) {
        self.time = other.time;
        if self.coords.len() == other.coords.len() {
            self.coords.copy_from(&other.coords);
        } else {
            self.coords = other.coords.clone();
        }
    }
}
