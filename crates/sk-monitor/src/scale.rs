//! Scaling preprocessor over the reachability engine.

use nalgebra::DVector;
use sk_core::TrajectorySample;
use tracing::{debug, warn};

use crate::config::{EngineConfig, ScaleVector};
use crate::engine::{Phase, ReachabilityEngine, StepVerdict};
use crate::error::MonitorResult;

/// Monitors sample pairs after per-dimension rescaling.
///
/// Timestamps are multiplied by the time scale and coordinates elementwise
/// by the per-dimension scales, then handed to the inner engine. Scratch
/// samples are reused across steps, so the hot path stays allocation-free.
pub struct ScaledEngine {
    engine: ReachabilityEngine,
    scale: ScaleVector,
    scratch_x: TrajectorySample,
    scratch_y: TrajectorySample,
}

impl ScaledEngine {
    pub fn new(config: EngineConfig, scale: ScaleVector) -> MonitorResult<Self> {
        scale.validate()?;
        let engine = ReachabilityEngine::new(config)?;
        debug!(
            window = config.window,
            delta = config.delta,
            dims = scale.coords.len(),
            "scaled monitor ready"
        );
        Ok(Self {
            engine,
            scale,
            scratch_x: TrajectorySample::from_slice(0.0, &[]),
            scratch_y: TrajectorySample::from_slice(0.0, &[]),
        })
    }

    pub fn scale(&self) -> &ScaleVector {
        &self.scale
    }

    pub fn engine(&self) -> &ReachabilityEngine {
        &self.engine
    }

    /// Rescale the pair and feed it to the engine.
    ///
    /// # Panics
    ///
    /// Panics if a sample's dimension differs from the scale vector's.
    pub fn process_sample(
        &mut self,
        x: &TrajectorySample,
        y: &TrajectorySample,
    ) -> StepVerdict {
        apply_scale(&self.scale, x, &mut self.scratch_x);
        apply_scale(&self.scale, y, &mut self.scratch_y);

        let was_stuck = self.engine.phase() == Phase::Stuck;
        let verdict = self.engine.process_sample(&self.scratch_x, &self.scratch_y);
        if !was_stuck && self.engine.phase() == Phase::Stuck {
            warn!("first sample pair infeasible; monitor stuck until reset");
        }
        verdict
    }

    /// Forget all samples; the wrapped engine behaves as freshly built.
    pub fn reset(&mut self) {
        self.engine.reset();
    }
}

fn apply_scale(scale: &ScaleVector, src: &TrajectorySample, dst: &mut TrajectorySample) {
    assert_eq!(
        scale.coords.len(),
        src.coords.len(),
        "sample dimension does not match scale vector"
    );
    dst.time = src.time * scale.time;
    if dst.coords.len() != src.coords.len() {
        dst.coords = DVector::zeros(src.coords.len());
    }
    for (i, &s) in scale.coords.iter().enumerate() {
        dst.coords[i] = src.coords[i] * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, v: &[f64]) -> TrajectorySample {
        TrajectorySample::from_slice(t, v)
    }

    #[test]
    fn identity_scale_matches_plain_engine() {
        let config = EngineConfig { window: 2, delta: 0.5 };
        let mut scaled = ScaledEngine::new(config, ScaleVector::identity(1)).unwrap();
        let mut plain = ReachabilityEngine::new(config).unwrap();

        for k in 0..8 {
            let t = k as f64;
            let x = sample(t, &[t]);
            let y = sample(t, &[t + 0.3]);
            assert_eq!(
                scaled.process_sample(&x, &y),
                plain.process_sample(&x, &y),
                "step {k}"
            );
        }
    }

    #[test]
    fn scaling_matches_prescaled_stream() {
        let config = EngineConfig { window: 2, delta: 0.5 };
        let scale = ScaleVector {
            time: 0.5,
            coords: vec![2.0, 0.1],
        };
        let mut scaled = ScaledEngine::new(config, scale.clone()).unwrap();
        let mut plain = ReachabilityEngine::new(config).unwrap();

        for k in 0..8 {
            let t = k as f64;
            let x = sample(t, &[0.1 * t, 10.0 * t]);
            let y = sample(t, &[0.1 * t + 0.2, 10.0 * t - 1.0]);

            let pre = |s: &TrajectorySample| {
                sample(
                    s.time * scale.time,
                    &[s.coords[0] * scale.coords[0], s.coords[1] * scale.coords[1]],
                )
            };
            assert_eq!(
                scaled.process_sample(&x, &y),
                plain.process_sample(&pre(&x), &pre(&y)),
                "step {k}"
            );
        }
    }

    #[test]
    fn scale_can_mask_a_dimension() {
        // Zeroing a dimension's scale removes it from the comparison.
        let config = EngineConfig { window: 1, delta: 0.5 };
        let scale = ScaleVector {
            time: 1.0,
            coords: vec![1.0, 0.0],
        };
        let mut eng = ScaledEngine::new(config, scale).unwrap();
        for k in 0..6 {
            let t = k as f64;
            let x = sample(t, &[t, 100.0 * t]);
            let y = sample(t, &[t, -100.0 * t]);
            let v = eng.process_sample(&x, &y);
            assert!(v.frontier_reachable && v.origin_reachable, "step {k}");
        }
    }

    #[test]
    fn reset_reaches_the_inner_engine() {
        let config = EngineConfig { window: 2, delta: 0.5 };
        let mut eng = ScaledEngine::new(config, ScaleVector::identity(1)).unwrap();
        eng.process_sample(&sample(0.0, &[0.0]), &sample(0.0, &[5.0]));
        eng.process_sample(&sample(1.0, &[1.0]), &sample(1.0, &[6.0]));
        assert_eq!(eng.engine().phase(), Phase::Stuck);

        eng.reset();
        assert_eq!(eng.engine().phase(), Phase::Init);
        let v = eng.process_sample(&sample(0.0, &[0.0]), &sample(0.0, &[0.0]));
        assert!(v.frontier_reachable && v.origin_reachable);
    }
}
