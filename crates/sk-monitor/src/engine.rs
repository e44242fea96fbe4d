//! The windowed reachability engine.
//!
//! Streams one sample pair per step over a diagonal band of the free-space
//! diagram and answers, per step, whether the two trajectories can still be
//! matched within the distance bound by a monotone correspondence that stays
//! inside the window.

use sk_core::{Real, TrajectorySample};
use sk_freespace::{Edge, EdgeSpan, FreeSpaceCell};

use crate::band::{Band, Role};
use crate::config::EngineConfig;
use crate::error::MonitorResult;
use crate::history::HistoryRing;

/// Lifecycle of the engine between resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No samples seen yet.
    Init,
    /// One pair stored; the next pair grounds the diagram.
    Ground,
    /// Normal streaming operation.
    Steady,
    /// The first pair was infeasible; only [`ReachabilityEngine::reset`]
    /// leaves this phase.
    Stuck,
}

/// Per-step answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepVerdict {
    /// Some free point on the diagram frontier is still reachable: a
    /// conforming correspondence may yet exist.
    pub frontier_reachable: bool,

    /// The current diagram corner itself is reachable: the streams are
    /// matched up through the newest pair.
    pub origin_reachable: bool,
}

impl StepVerdict {
    const BOTH: StepVerdict = StepVerdict {
        frontier_reachable: true,
        origin_reachable: true,
    };

    const NEITHER: StepVerdict = StepVerdict {
        frontier_reachable: false,
        origin_reachable: false,
    };
}

/// Which band a cell is built for.
#[derive(Clone, Copy)]
enum Axis {
    Row,
    Col,
}

/// Online monitor over a diagonal band of the free-space diagram.
///
/// All storage is allocated at construction; in the steady state
/// [`ReachabilityEngine::process_sample`] allocates nothing.
#[derive(Debug, Clone)]
pub struct ReachabilityEngine {
    config: EngineConfig,
    hist_x: HistoryRing,
    hist_y: HistoryRing,
    rows: [Band; 2],
    cols: [Band; 2],
    /// Band pair written by the most recent step.
    current: Role,
    /// Sample pairs consumed since the last reset.
    seen: u64,
    phase: Phase,
}

impl ReachabilityEngine {
    pub fn new(config: EngineConfig) -> MonitorResult<Self> {
        config.validate()?;
        let band_len = if config.window == 0 {
            0
        } else {
            config.window + 1
        };
        Ok(Self {
            config,
            hist_x: HistoryRing::new(config.window + 1),
            hist_y: HistoryRing::new(config.window + 1),
            rows: [Band::new(band_len), Band::new(band_len)],
            cols: [Band::new(band_len), Band::new(band_len)],
            current: Role::First,
            seen: 0,
            phase: Phase::Init,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sample pairs consumed since the last reset.
    pub fn samples_seen(&self) -> u64 {
        self.seen
    }

    /// Forget all samples; the engine behaves as freshly constructed.
    ///
    /// Buffers are kept and overwritten by later steps; every slot a step
    /// reads has been written earlier in the same run.
    pub fn reset(&mut self) {
        self.seen = 0;
        self.phase = Phase::Init;
    }

    /// Consume the next sample pair and report reachability.
    ///
    /// Total for finite inputs: configuration problems are rejected at
    /// construction, and an infeasible first pair parks the engine in
    /// [`Phase::Stuck`] instead of erroring.
    ///
    /// # Panics
    ///
    /// Panics if the samples' dimensions differ from each other or from
    /// earlier steps.
    pub fn process_sample(
        &mut self,
        x: &TrajectorySample,
        y: &TrajectorySample,
    ) -> StepVerdict {
        match self.phase {
            Phase::Stuck => StepVerdict::NEITHER,
            Phase::Init => {
                self.hist_x.put(0, x);
                self.hist_y.put(0, y);
                self.seen = 1;
                self.phase = Phase::Ground;
                StepVerdict::BOTH
            }
            Phase::Ground => self.ground_step(x, y),
            Phase::Steady => self.steady_step(x, y),
        }
    }

    /// Second pair: build the origin cell and check the diagram is grounded.
    fn ground_step(&mut self, x: &TrajectorySample, y: &TrajectorySample) -> StepVerdict {
        let delta = self.config.delta;

        if self.config.window == 0 {
            // Degenerate mode: the stored first pair is checked before its
            // single slot is overwritten.
            if !pointwise_within(self.hist_x.get(0), self.hist_y.get(0), delta) {
                self.phase = Phase::Stuck;
                return StepVerdict::NEITHER;
            }
            self.hist_x.put(1, x);
            self.hist_y.put(1, y);
            self.seen = 2;
            self.phase = Phase::Steady;
            return StepVerdict {
                frontier_reachable: pointwise_within(x, y, delta),
                origin_reachable: true,
            };
        }

        self.hist_x.put(1, x);
        self.hist_y.put(1, y);
        let cell = band_cell(&self.hist_x, &self.hist_y, 1, 0, Axis::Row, delta);

        // The diagram origin must itself be free.
        if !cell.edge(Edge::Bottom).starts_at_zero() {
            self.phase = Phase::Stuck;
            return StepVerdict::NEITHER;
        }

        let wi = self.current.flip().index();
        self.rows[wi][0] = cell;
        self.cols[wi][0] = cell;
        self.current = self.current.flip();
        self.seen = 2;
        self.phase = Phase::Steady;

        StepVerdict {
            frontier_reachable: cell.edge(Edge::Top).is_valid()
                || cell.edge(Edge::Right).is_valid(),
            origin_reachable: true,
        }
    }

    fn steady_step(&mut self, x: &TrajectorySample, y: &TrajectorySample) -> StepVerdict {
        let delta = self.config.delta;
        let window = self.config.window;
        let k = self.seen;

        self.hist_x.put(k, x);
        self.hist_y.put(k, y);
        self.seen += 1;

        if window == 0 {
            let ok = pointwise_within(x, y, delta);
            return StepVerdict {
                frontier_reachable: ok,
                origin_reachable: ok,
            };
        }

        // Retained real cells this step, and whether the synthetic cell past
        // the window is in play.
        let n = k.min(window as u64) as usize;
        let bounded = k > window as u64;
        let ri = self.current.index();
        let wi = self.current.flip().index();

        // Fresh free-space cells for both bands.
        for c in 0..n {
            self.rows[wi][c] = band_cell(&self.hist_x, &self.hist_y, k, c as u64, Axis::Row, delta);
            self.cols[wi][c] = band_cell(&self.hist_x, &self.hist_y, k, c as u64, Axis::Col, delta);
        }

        // Synthetic cell standing in for everything past the window: free
        // space on the trailing edge counts as reachable.
        if bounded {
            self.rows[wi][window] = FreeSpaceCell::INVALID
                .with_edge(Edge::Bottom, self.rows[ri][window - 1].edge(Edge::Top))
                .with_edge(Edge::Right, self.rows[wi][window - 1].edge(Edge::Left));
            self.cols[wi][window] = FreeSpaceCell::INVALID
                .with_edge(Edge::Left, self.cols[ri][window - 1].edge(Edge::Right))
                .with_edge(Edge::Top, self.cols[wi][window - 1].edge(Edge::Bottom));
        }

        // Propagate reach through both bands, far offsets first. A row
        // cell's left neighbour is the next offset of the same band, its
        // below neighbour sits in the previous band; columns mirror this.
        for c in (1..n).rev() {
            let left = if c + 1 < n || bounded {
                self.rows[wi][c + 1].edge(Edge::Right)
            } else {
                EdgeSpan::EMPTY
            };
            let below = self.rows[ri][c - 1].edge(Edge::Top);
            self.rows[wi][c] = self.rows[wi][c].propagate(left, below);

            let below = if c + 1 < n || bounded {
                self.cols[wi][c + 1].edge(Edge::Top)
            } else {
                EdgeSpan::EMPTY
            };
            let left = self.cols[ri][c - 1].edge(Edge::Right);
            self.cols[wi][c] = self.cols[wi][c].propagate(left, below);
        }

        // Corner step: the diagonal cell is shared by both bands and fed by
        // both of them. Offset 1 is a real cell when two or more offsets are
        // retained, and the synthetic cell when the window is 1.
        let corner_left = self.rows[wi][1].edge(Edge::Right);
        let corner_below = self.cols[wi][1].edge(Edge::Top);
        let corner = self.rows[wi][0].propagate(corner_left, corner_below);
        self.rows[wi][0] = corner;
        self.cols[wi][0] = corner;

        let mut frontier = false;
        for c in 0..n {
            if self.rows[wi][c].edge(Edge::Top).is_valid()
                || self.cols[wi][c].edge(Edge::Right).is_valid()
            {
                frontier = true;
                break;
            }
        }
        let origin = self.rows[wi][0].edge(Edge::Right).reaches_one();

        self.current = self.current.flip();
        StepVerdict {
            frontier_reachable: frontier,
            origin_reachable: origin,
        }
    }
}

/// Both coordinates and timestamps within `delta`, pointwise.
fn pointwise_within(a: &TrajectorySample, b: &TrajectorySample, delta: Real) -> bool {
    a.distance_to(b) <= delta && (a.time - b.time).abs() <= delta
}

/// Free-space cell for band offset `offset` at step `k`, spatial part
/// intersected with the temporal part built from the timestamps under the
/// same bound.
fn band_cell(
    hist_x: &HistoryRing,
    hist_y: &HistoryRing,
    k: u64,
    offset: u64,
    axis: Axis,
    delta: Real,
) -> FreeSpaceCell {
    let (xi, yi, corner) = match axis {
        Axis::Row => (k - 1 - offset, k - 1, (k - 1 - offset, k - 1)),
        Axis::Col => (k - 1, k - 1 - offset, (k - 1, k - 1 - offset)),
    };
    let (xa, xb) = (hist_x.get(xi), hist_x.get(xi + 1));
    let (ya, yb) = (hist_y.get(yi), hist_y.get(yi + 1));

    let spatial = FreeSpaceCell::from_segments(
        xa.coords.as_slice(),
        xb.coords.as_slice(),
        ya.coords.as_slice(),
        yb.coords.as_slice(),
        delta,
    );
    let temporal = FreeSpaceCell::from_segments(
        core::slice::from_ref(&xa.time),
        core::slice::from_ref(&xb.time),
        core::slice::from_ref(&ya.time),
        core::slice::from_ref(&yb.time),
        delta,
    );
    spatial.intersect(&temporal).with_corner(corner.0, corner.1)
}
