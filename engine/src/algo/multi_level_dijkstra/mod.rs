//! Matrix queries on a multi-level partition overlay.
//!
//! The searches are plain label-setting searches which additionally relax the
//! precomputed boundary-to-boundary shortcuts of the cell containing the
//! current node. How high a search may climb the overlay at a node is bounded
//! by the *query level*: the node may only use cells that do not yet contain
//! one of the endpoints the search still has to serve. Crossing from one cell
//! into another happens on the ordinary border edges of the level.
//!
//! Matrices with a single source (or single target) run one unidirectional
//! search. The general M-to-N case runs a pruned backward search per target
//! which stores its settled nodes in buckets, and a forward search per source
//! which joins against those buckets.

use crate::algo::*;
use crate::datastr::{cells::*, graph::*, partition::*, query_heap::QueryHeap};
use crate::report::*;

pub mod customization;
mod many_to_many;
mod one_to_many;
mod unpacking;

use self::many_to_many::NodeBucket;

/// Payload of the matrix search heaps.
/// Parent and shortcut flag form the back-pointer for packed path
/// reconstruction, the duration rides along for lexicographic tie breaking.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SearchPayload {
    pub parent: NodeId,
    pub from_shortcut: bool,
    pub duration: Duration,
}

/// Graph, partition and overlay metric bundled for querying.
pub struct MultiLevelGraph {
    graph: SegmentGraph,
    partition: MultiLevelPartition,
    metric: CellMetric,
}

impl MultiLevelGraph {
    pub fn new(graph: SegmentGraph, partition: MultiLevelPartition, metric: CellMetric) -> MultiLevelGraph {
        assert_eq!(partition.num_levels(), metric.num_levels());
        MultiLevelGraph { graph, partition, metric }
    }

    /// Bundle graph and partition and compute the overlay metric for them.
    pub fn customize(graph: SegmentGraph, partition: MultiLevelPartition) -> MultiLevelGraph {
        let metric = customization::customize(&graph, &partition);
        MultiLevelGraph { graph, partition, metric }
    }

    pub fn graph(&self) -> &SegmentGraph {
        &self.graph
    }

    pub fn partition(&self) -> &MultiLevelPartition {
        &self.partition
    }

    pub fn metric(&self) -> &CellMetric {
        &self.metric
    }
}

/// Reusable working storage of one query worker.
///
/// Queries reset the logical state of heaps and buckets at the start of each
/// search phase; the backing allocations are kept for the lifetime of the
/// workspace. A workspace must not be shared while a query is in flight.
pub struct Workspace {
    heap: QueryHeap<SearchPayload>,
    unpack_forward: QueryHeap<NodeId>,
    unpack_backward: QueryHeap<NodeId>,
    buckets: Vec<NodeBucket>,
}

impl Workspace {
    pub fn new(num_nodes: usize) -> Workspace {
        Workspace {
            heap: QueryHeap::new(num_nodes),
            unpack_forward: QueryHeap::new(num_nodes),
            unpack_backward: QueryHeap::new(num_nodes),
            buckets: Vec::new(),
        }
    }
}

/// The level at which edges out of `node` may be relaxed while the search
/// still has to serve `phantom`. Both halves contribute the highest level at
/// which their segment and `node` sit in different cells; a disabled half
/// poses no restriction.
fn query_level(partition: &MultiLevelPartition, node: NodeId, phantom: &PhantomNode) -> LevelId {
    let half_level = |half: &PhantomHalf| {
        if half.enabled {
            partition.highest_different_level(node, half.node)
        } else {
            INVALID_LEVEL
        }
    };
    std::cmp::min(half_level(&phantom.forward), half_level(&phantom.reverse))
}

/// Query level for the pruned backward halves of M-to-N searches: nodes whose
/// raw level reaches `maximal_level` are not expanded at all.
fn query_level_capped(partition: &MultiLevelPartition, node: NodeId, phantom: &PhantomNode, maximal_level: LevelId) -> LevelId {
    let level = query_level(partition, node, phantom);
    if level >= maximal_level {
        return INVALID_LEVEL;
    }
    level
}

/// Query level for unidirectional searches: the minimum over the source and
/// every target still pins the search down.
fn query_level_for_endpoints(
    partition: &MultiLevelPartition,
    node: NodeId,
    phantoms: &[PhantomNode],
    source_index: usize,
    target_indices: &[usize],
) -> LevelId {
    let mut level = query_level(partition, node, &phantoms[source_index]);
    for &index in target_indices {
        level = std::cmp::min(level, query_level(partition, node, &phantoms[index]));
    }
    level
}

/// Insert `node` with the given path costs, or lower its label if it was
/// already discovered and the new costs win the lexicographic comparison.
fn insert_or_decrease(heap: &mut QueryHeap<SearchPayload>, node: NodeId, weight: Weight, duration: Duration, parent: NodeId, from_shortcut: bool) {
    if !heap.was_inserted(node) {
        heap.insert(node, weight, SearchPayload { parent, from_shortcut, duration });
    } else if (weight, duration) < (heap.key(node), heap.data(node).duration) {
        *heap.data_mut(node) = SearchPayload { parent, from_shortcut, duration };
        heap.decrease_key(node, weight);
    }
}

/// Relax everything leaving `node` at the given query level: the shortcuts of
/// the cell containing the node, then the border edges of the level.
///
/// A node reached through a shortcut may not chain into another shortcut -
/// the shortcut tables already encode transitive reachability within the
/// cell.
fn relax_outgoing_edges<D: Direction>(
    data: &MultiLevelGraph,
    node: NodeId,
    weight: Weight,
    duration: Duration,
    level: LevelId,
    heap: &mut QueryHeap<SearchPayload>,
) {
    debug_assert!(!data.graph.is_excluded(node));

    if level == INVALID_LEVEL {
        return;
    }

    if level >= 1 && !heap.data(node).from_shortcut {
        let cell = data.metric.cell(level, data.partition.cell(level, node));
        if D::FORWARD {
            for ((&to, &shortcut_weight), &shortcut_duration) in
                cell.destination_nodes().iter().zip(cell.out_weights(node)).zip(cell.out_durations(node))
            {
                if shortcut_weight != INVALID_EDGE_WEIGHT && to != node {
                    insert_or_decrease(heap, to, weight + shortcut_weight, duration + shortcut_duration, node, true);
                }
            }
        } else {
            for ((&to, shortcut_weight), shortcut_duration) in
                cell.source_nodes().iter().zip(cell.in_weights(node)).zip(cell.in_durations(node))
            {
                if shortcut_weight != INVALID_EDGE_WEIGHT && to != node {
                    insert_or_decrease(heap, to, weight + shortcut_weight, duration + shortcut_duration, node, true);
                }
            }
        }
    }

    for edge in data.graph.border_edge_range(level, node) {
        let edge_data = data.graph.edge_data(edge);
        let traversable = if D::FORWARD { edge_data.forward } else { edge_data.backward };
        if traversable {
            let to = data.graph.head(edge);
            if data.graph.is_excluded(to) {
                continue;
            }
            debug_assert!(edge_data.weight > 0);
            insert_or_decrease(heap, to, weight + edge_data.weight, duration + edge_data.duration, node, false);
        }
    }
}

/// Seed a heap with the valid source halves of a phantom.
/// Source offsets enter negated so that every path through the seed cancels
/// them out once the positive part of the offset is covered.
fn insert_source_in_heap(heap: &mut QueryHeap<SearchPayload>, phantom: &PhantomNode) {
    if phantom.is_valid_forward_source() {
        let half = &phantom.forward;
        insert_or_decrease(heap, half.node, -half.weight, -half.duration, half.node, false);
    }
    if phantom.is_valid_reverse_source() {
        let half = &phantom.reverse;
        insert_or_decrease(heap, half.node, -half.weight, -half.duration, half.node, false);
    }
}

/// Seed a heap with the valid target halves of a phantom.
fn insert_target_in_heap(heap: &mut QueryHeap<SearchPayload>, phantom: &PhantomNode) {
    if phantom.is_valid_forward_target() {
        let half = &phantom.forward;
        insert_or_decrease(heap, half.node, half.weight, half.duration, half.node, false);
    }
    if phantom.is_valid_reverse_target() {
        let half = &phantom.reverse;
        insert_or_decrease(heap, half.node, half.weight, half.duration, half.node, false);
    }
}

/// Compute the matrices of shortest travel durations (and optionally
/// distances) between all sources and all targets.
///
/// `source_indices` and `target_indices` select the endpoints from
/// `phantoms`. The durations matrix is row-major with `target_indices.len()`
/// columns; unreachable pairs carry [`MAXIMAL_EDGE_DURATION`] and
/// [`INVALID_EDGE_DISTANCE`]. When `want_distance` is false the returned
/// distance vector is empty. `want_duration` is reserved; durations are
/// always computed.
///
/// Degenerate 1-to-N and N-to-1 matrices run a single unidirectional search.
/// Everything else runs the bucket-based bidirectional algorithm; since the
/// backward searches are the pruned ones, fewer sources than targets means
/// the search runs on flipped endpoint roles and transposes its result back.
pub fn table(
    workspace: &mut Workspace,
    data: &MultiLevelGraph,
    phantoms: &[PhantomNode],
    source_indices: &[usize],
    target_indices: &[usize],
    want_distance: bool,
    want_duration: bool,
) -> (Vec<Duration>, Vec<Distance>) {
    let _ = want_duration; // reserved

    report_silent!("algo", "multi_level_dijkstra_table");
    report_silent!("num_sources", source_indices.len());
    report_silent!("num_targets", target_indices.len());

    if source_indices.len() == 1 {
        one_to_many::search::<Forward>(workspace, data, phantoms, source_indices[0], target_indices, want_distance)
    } else if target_indices.len() == 1 {
        one_to_many::search::<Backward>(workspace, data, phantoms, target_indices[0], source_indices, want_distance)
    } else if target_indices.len() < source_indices.len() {
        many_to_many::search::<Backward>(workspace, data, phantoms, target_indices, source_indices, want_distance)
    } else {
        many_to_many::search::<Forward>(workspace, data, phantoms, source_indices, target_indices, want_distance)
    }
}

/// Owns the working storage for matrix queries against a borrowed overlay.
/// One server per worker thread; the overlay itself can be shared.
pub struct Server<'a> {
    data: &'a MultiLevelGraph,
    workspace: Workspace,
}

impl<'a> Server<'a> {
    pub fn new(data: &'a MultiLevelGraph) -> Server<'a> {
        Server {
            data,
            workspace: Workspace::new(data.graph().num_nodes()),
        }
    }

    pub fn table(
        &mut self,
        phantoms: &[PhantomNode],
        source_indices: &[usize],
        target_indices: &[usize],
        want_distance: bool,
    ) -> (Vec<Duration>, Vec<Distance>) {
        table(&mut self.workspace, self.data, phantoms, source_indices, target_indices, want_distance, true)
    }
}
