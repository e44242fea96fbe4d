//! Monitor configuration types.
//!
//! Plain serde-embeddable structs; validation happens at construction so the
//! streaming path never has to.

use serde::{Deserialize, Serialize};
use sk_core::{ensure_finite, Real};

use crate::error::{MonitorError, MonitorResult};

/// Parameters of the windowed reachability engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many segments back from the diagonal each band keeps. `0` selects
    /// the degenerate pointwise mode.
    pub window: usize,

    /// Distance bound, applied in value space and to timestamps alike.
    pub delta: Real,
}

impl EngineConfig {
    /// Validated construction.
    pub fn new(window: usize, delta: Real) -> MonitorResult<Self> {
        let config = Self { window, delta };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MonitorResult<()> {
        ensure_finite(self.delta, "delta")?;
        if self.delta < 0.0 {
            return Err(MonitorError::InvalidConfig {
                what: "delta must be non-negative",
            });
        }
        Ok(())
    }
}

/// Per-dimension scaling applied to samples before monitoring.
///
/// `time` multiplies timestamps, `coords[i]` multiplies value dimension `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleVector {
    pub time: Real,
    pub coords: Vec<Real>,
}

impl ScaleVector {
    /// Identity scaling for `dim` value dimensions.
    pub fn identity(dim: usize) -> Self {
        Self {
            time: 1.0,
            coords: vec![1.0; dim],
        }
    }

    pub fn validate(&self) -> MonitorResult<()> {
        ensure_finite(self.time, "time scale")?;
        for &s in &self.coords {
            ensure_finite(s, "coordinate scale")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_bad_delta() {
        assert!(EngineConfig::new(4, -0.1).is_err());
        assert!(EngineConfig::new(4, Real::NAN).is_err());
        assert!(EngineConfig::new(0, 0.0).is_ok());
    }

    #[test]
    fn scale_rejects_non_finite() {
        let mut scale = ScaleVector::identity(3);
        assert!(scale.validate().is_ok());
        scale.coords[1] = Real::INFINITY;
        assert!(scale.validate().is_err());
    }

    #[test]
    fn config_serde_round_trip() {
        let config = EngineConfig { window: 8, delta: 0.25 };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let scale = ScaleVector {
            time: 2.0,
            coords: vec![1.0, 0.5],
        };
        let json = serde_json::to_string(&scale).unwrap();
        let back: ScaleVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scale);
    }
}
