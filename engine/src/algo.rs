//! Query algorithms and the endpoint types they operate on.

use crate::datastr::graph::*;

pub mod multi_level_dijkstra;

/// Compile-time direction selector for searches which exist in a forward and
/// a backward variant. The compiler resolves all direction branches
/// statically, mirroring how the two variants would read when written twice.
pub trait Direction {
    const FORWARD: bool;
    type Opposite: Direction;
}

/// Searches running along the travel direction.
pub struct Forward;

impl Direction for Forward {
    const FORWARD: bool = true;
    type Opposite = Backward;
}

/// Searches running against the travel direction.
pub struct Backward;

impl Direction for Backward {
    const FORWARD: bool = false;
    type Opposite = Forward;
}

/// One half of a snapped query point.
///
/// A coordinate snapped onto a road is represented by up to two graph nodes,
/// one per travel direction of the underlying road. Each half carries the
/// cost offsets of the fractional position of the snap on its segment.
#[derive(Debug, Clone, Copy)]
pub struct PhantomHalf {
    pub node: NodeId,
    pub enabled: bool,
    /// Weight between the segment entry and the snap position.
    pub weight: Weight,
    /// Duration between the segment entry and the snap position.
    pub duration: Duration,
    /// Meters between the segment entry and the snap position.
    pub distance: Distance,
}

impl PhantomHalf {
    pub fn disabled() -> PhantomHalf {
        PhantomHalf {
            node: INVALID_NODE_ID,
            enabled: false,
            weight: INVALID_EDGE_WEIGHT,
            duration: MAXIMAL_EDGE_DURATION,
            distance: INVALID_EDGE_DISTANCE,
        }
    }
}

/// A snapped query point - source or target of a matrix query.
#[derive(Debug, Clone, Copy)]
pub struct PhantomNode {
    pub forward: PhantomHalf,
    pub reverse: PhantomHalf,
}

impl PhantomNode {
    pub fn new(forward: PhantomHalf, reverse: PhantomHalf) -> PhantomNode {
        PhantomNode { forward, reverse }
    }

    /// A phantom sitting exactly at the entry of the segment of `node`,
    /// with no reverse counterpart.
    pub fn at_segment_entry(node: NodeId) -> PhantomNode {
        PhantomNode {
            forward: PhantomHalf {
                node,
                enabled: true,
                weight: 0,
                duration: 0,
                distance: 0.0,
            },
            reverse: PhantomHalf::disabled(),
        }
    }

    pub fn is_valid_forward_source(&self) -> bool {
        self.forward.enabled && self.forward.weight != INVALID_EDGE_WEIGHT
    }

    pub fn is_valid_forward_target(&self) -> bool {
        self.forward.enabled && self.forward.weight != INVALID_EDGE_WEIGHT
    }

    pub fn is_valid_reverse_source(&self) -> bool {
        self.reverse.enabled && self.reverse.weight != INVALID_EDGE_WEIGHT
    }

    pub fn is_valid_reverse_target(&self) -> bool {
        self.reverse.enabled && self.reverse.weight != INVALID_EDGE_WEIGHT
    }
}
