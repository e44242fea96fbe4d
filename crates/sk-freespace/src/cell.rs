//! Free-space cells and monotone reachability.
//!
//! A cell is the unit square parameterizing one segment of each trajectory:
//! the horizontal axis runs along the first segment, the vertical axis along
//! the second. The free space (parameter pairs whose points lie within the
//! distance bound) is convex, so the four edge spans capture everything
//! reachability needs.

use sk_core::Real;

use crate::span::EdgeSpan;

/// Edge of a free-space cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Bottom = 0,
    Right = 1,
    Top = 2,
    Left = 3,
}

/// Free portion of a segment, as seen from a fixed point.
///
/// Solves `‖q0 + u (q1 - q0) - p‖ <= delta` for `u` and clamps the solution
/// to the unit interval. A degenerate segment (`q0 == q1`) yields either the
/// full span or the empty one.
pub fn point_segment_span(p: &[Real], q0: &[Real], q1: &[Real], delta: Real) -> EdgeSpan {
    debug_assert_eq!(p.len(), q0.len());
    debug_assert_eq!(p.len(), q1.len());

    // Quadratic a u^2 + 2 b u + c <= 0 in the segment parameter.
    let mut a = 0.0;
    let mut b = 0.0;
    let mut c = -delta * delta;
    for i in 0..p.len() {
        let d = q1[i] - q0[i];
        let w = q0[i] - p[i];
        a += d * d;
        b += d * w;
        c += w * w;
    }

    if a == 0.0 {
        return if c <= 0.0 {
            EdgeSpan::FULL
        } else {
            EdgeSpan::EMPTY
        };
    }

    let disc = b * b - a * c;
    if disc < 0.0 {
        return EdgeSpan::EMPTY;
    }
    let root = disc.sqrt();
    let lo = (-b - root) / a;
    let hi = (-b + root) / a;
    if hi < 0.0 || lo > 1.0 {
        return EdgeSpan::EMPTY;
    }
    EdgeSpan::new(lo.max(0.0), hi.min(1.0))
}

/// One cell of the free-space diagram: four edge spans plus the cell's
/// conceptual position in the unbounded diagram.
///
/// The type is an immutable value; [`FreeSpaceCell::propagate`] returns a new
/// cell whose outward edges (Right, Top) carry reach spans instead of free
/// spans.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeSpaceCell {
    edges: [EdgeSpan; 4],
    corner: Option<(u64, u64)>,
}

impl FreeSpaceCell {
    /// Cell with all edges empty and no diagram position.
    pub const INVALID: FreeSpaceCell = FreeSpaceCell {
        edges: [EdgeSpan::EMPTY; 4],
        corner: None,
    };

    /// Free-space cell of the horizontal segment `ha -> hb` against the
    /// vertical segment `va -> vb`.
    pub fn from_segments(
        ha: &[Real],
        hb: &[Real],
        va: &[Real],
        vb: &[Real],
        delta: Real,
    ) -> FreeSpaceCell {
        FreeSpaceCell {
            edges: [
                point_segment_span(va, ha, hb, delta),
                point_segment_span(hb, va, vb, delta),
                point_segment_span(vb, ha, hb, delta),
                point_segment_span(ha, va, vb, delta),
            ],
            corner: None,
        }
    }

    /// Edge span for `edge`.
    pub fn edge(&self, edge: Edge) -> EdgeSpan {
        self.edges[edge as usize]
    }

    /// Edge-wise intersection. The diagram position is taken from `self` if
    /// set, else from `other`.
    pub fn intersect(&self, other: &FreeSpaceCell) -> FreeSpaceCell {
        let mut edges = [EdgeSpan::EMPTY; 4];
        for (i, slot) in edges.iter_mut().enumerate() {
            *slot = self.edges[i].intersect(other.edges[i]);
        }
        FreeSpaceCell {
            edges,
            corner: self.corner.or(other.corner),
        }
    }

    /// Same cell at diagram position `(i, j)`.
    pub fn with_corner(self, i: u64, j: u64) -> FreeSpaceCell {
        FreeSpaceCell {
            corner: Some((i, j)),
            ..self
        }
    }

    /// Same cell with one edge replaced.
    pub fn with_edge(self, edge: Edge, span: EdgeSpan) -> FreeSpaceCell {
        let mut edges = self.edges;
        edges[edge as usize] = span;
        FreeSpaceCell { edges, ..self }
    }

    /// Diagram position, if the cell has one.
    pub fn corner(&self) -> Option<(u64, u64)> {
        self.corner
    }

    /// Monotone reachability step.
    ///
    /// `left_reach` is the reach span on this cell's Left edge (the left
    /// neighbour's propagated Right edge), `below_reach` the reach span on
    /// its Bottom edge. Returns the cell with Right and Top replaced by
    /// reach spans:
    /// - an edge orthogonal to a reachable entry edge keeps its whole free
    ///   span (free space is convex);
    /// - an edge parallel to the only reachable entry edge keeps the part at
    ///   or above the entry's lower end (paths may not go back down or left).
    pub fn propagate(&self, left_reach: EdgeSpan, below_reach: EdgeSpan) -> FreeSpaceCell {
        let top_free = self.edges[Edge::Top as usize];
        let right_free = self.edges[Edge::Right as usize];

        let top = if left_reach.is_valid() {
            top_free
        } else if below_reach.is_valid() {
            top_free.raise_floor(below_reach.lo())
        } else {
            EdgeSpan::EMPTY
        };

        let right = if below_reach.is_valid() {
            right_free
        } else if left_reach.is_valid() {
            right_free.raise_floor(left_reach.lo())
        } else {
            EdgeSpan::EMPTY
        };

        self.with_edge(Edge::Top, top).with_edge(Edge::Right, right)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn spans_stay_in_the_unit_interval(
            p in -5.0_f64..5.0,
            q0 in -5.0_f64..5.0,
            q1 in -5.0_f64..5.0,
            delta in 0.0_f64..3.0,
        ) {
            let s = point_segment_span(&[p], &[q0], &[q1], delta);
            if s.is_valid() {
                prop_assert!(s.lo() >= 0.0);
                prop_assert!(s.hi() <= 1.0);
                prop_assert!(s.lo() <= s.hi());
            }
        }

        #[test]
        fn spans_grow_with_delta(
            p in -5.0_f64..5.0,
            q0 in -5.0_f64..5.0,
            q1 in -5.0_f64..5.0,
            delta in 0.0_f64..2.0,
            widen in 0.0_f64..2.0,
        ) {
            let tight = point_segment_span(&[p], &[q0], &[q1], delta);
            let loose = point_segment_span(&[p], &[q0], &[q1], delta + widen);
            if tight.is_valid() {
                prop_assert!(loose.is_valid());
                prop_assert!(loose.lo() <= tight.lo());
                prop_assert!(loose.hi() >= tight.hi());
            }
        }
    }
}
