//! Graph representation for edge-based road networks.
//!
//! Several type aliases and the static graph the queries run on.

pub mod segment_graph;

pub use self::segment_graph::SegmentGraph;

/// Node ids are 32bit unsigned ints.
/// A node represents one directed road segment of the underlying network.
pub type NodeId = u32;
/// Edge ids are 32bit unsigned ints
pub type EdgeId = u32;
/// Weights are 32bit *signed* ints.
/// Source snap offsets enter searches negated, so weights of search states
/// can be transiently negative.
pub type Weight = i32;
/// Travel times, same unit conventions as weights.
pub type Duration = i32;
/// Geometric lengths in meters.
pub type Distance = f64;

/// Marks unreachable shortcut entries and uninitialized matrix cells.
pub const INVALID_EDGE_WEIGHT: Weight = Weight::MAX;
/// Travel time of an unreachable pair.
pub const MAXIMAL_EDGE_DURATION: Duration = Duration::MAX;
/// Geometric length of an unreachable pair.
pub const INVALID_EDGE_DISTANCE: Distance = Distance::MAX;
/// "No node", e.g. for matrix cells without a meeting node.
pub const INVALID_NODE_ID: NodeId = NodeId::MAX;

/// Payload of one stored half-edge.
///
/// Every edge is stored at both endpoints; the direction flags tell which
/// real travel directions the stored entry represents. A forward search
/// follows entries with `forward` set, a backward search entries with
/// `backward` set.
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    pub weight: Weight,
    pub duration: Duration,
    pub forward: bool,
    pub backward: bool,
}

/// A directed input edge for graph construction.
#[derive(Debug, Clone, Copy)]
pub struct DirectedEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Weight,
    pub duration: Duration,
}
