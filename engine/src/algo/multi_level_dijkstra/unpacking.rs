//! Packed path retrieval, shortcut unpacking and distance annotation.
//!
//! Searches leave behind packed paths: edge sequences in which an element may
//! be an overlay shortcut instead of a base graph edge. For geometric
//! distances every shortcut is expanded into its base edge sequence by a pair
//! of small searches between its endpoints, and the per-segment lengths are
//! summed up with the snap offsets of the two phantoms applied at the ends.

use super::many_to_many::NodeBucket;
use super::*;

/// An edge of a packed path, oriented in search direction.
#[derive(Debug, Clone, Copy)]
pub(super) struct PackedEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub from_shortcut: bool,
}

/// Walk the parent chain of a drained search heap from `middle` back to the
/// seed. Returns the path in search order, seed first.
pub(super) fn packed_path_from_heap(heap: &QueryHeap<SearchPayload>, middle: NodeId) -> Vec<PackedEdge> {
    let mut path = Vec::new();
    let mut current = middle;
    loop {
        let payload = heap.data(current);
        if payload.parent == current {
            break;
        }
        path.push(PackedEdge {
            from: payload.parent,
            to: current,
            from_shortcut: payload.from_shortcut,
        });
        current = payload.parent;
    }
    path.reverse();
    path
}

/// The single bucket of `node` for `column`.
/// More than one entry per node and column is a programming error.
fn bucket_at(buckets: &[NodeBucket], node: NodeId, column: usize) -> &NodeBucket {
    let position = buckets.partition_point(|bucket| (bucket.node, bucket.column) < (node, column));
    let entry = &buckets[position];
    debug_assert!(entry.node == node && entry.column == column);
    debug_assert!(buckets[position + 1..]
        .first()
        .map(|next| (next.node, next.column) != (node, column))
        .unwrap_or(true));
    entry
}

/// Continue a packed path from the meeting node to the target of `column` by
/// walking the bucket entries of the backward search tree.
pub(super) fn packed_path_from_buckets(buckets: &[NodeBucket], middle: NodeId, column: usize, path: &mut Vec<PackedEdge>) {
    let mut current = middle;
    loop {
        let entry = bucket_at(buckets, current, column);
        if entry.parent == current {
            break;
        }
        path.push(PackedEdge {
            from: current,
            to: entry.parent,
            from_shortcut: entry.from_shortcut,
        });
        current = entry.parent;
    }
}

/// Settle one node of an unpacking search and relax its base edges.
/// Updates the tentative meeting candidate against the opposite heap.
fn unpack_settle<D: Direction>(
    graph: &SegmentGraph,
    heap: &mut QueryHeap<NodeId>,
    opposite: &QueryHeap<NodeId>,
    tentative_weight: &mut Weight,
    meeting_node: &mut NodeId,
) {
    let node = match heap.pop() {
        Some(node) => node,
        None => return,
    };
    let weight = heap.key(node);

    if opposite.was_inserted(node) && weight + opposite.key(node) < *tentative_weight {
        *tentative_weight = weight + opposite.key(node);
        *meeting_node = node;
    }

    for edge in graph.neighbor_edge_indices(node) {
        let edge_data = graph.edge_data(edge);
        let traversable = if D::FORWARD { edge_data.forward } else { edge_data.backward };
        if traversable {
            let to = graph.head(edge);
            if graph.is_excluded(to) {
                continue;
            }
            let to_weight = weight + edge_data.weight;
            if !heap.was_inserted(to) {
                heap.insert(to, to_weight, node);
            } else if to_weight < heap.key(to) {
                *heap.data_mut(to) = node;
                heap.decrease_key(to, to_weight);
            }
        }
    }
}

/// Expand a shortcut into its base node sequence by meeting two base graph
/// searches in the middle, and append everything after `from` to `nodes`.
///
/// A shortcut on a reported path carries the weight of a shortest connection
/// of its endpoints, so the bidirectional search rediscovers a path of
/// exactly that weight.
fn unpack_shortcut<D: Direction>(
    data: &MultiLevelGraph,
    forward_heap: &mut QueryHeap<NodeId>,
    backward_heap: &mut QueryHeap<NodeId>,
    from: NodeId,
    to: NodeId,
    nodes: &mut Vec<NodeId>,
) {
    let graph = data.graph();
    forward_heap.clear();
    backward_heap.clear();
    forward_heap.insert(from, 0, from);
    backward_heap.insert(to, 0, to);

    let mut tentative_weight = INVALID_EDGE_WEIGHT;
    let mut meeting_node = INVALID_NODE_ID;

    loop {
        let forward_min = forward_heap.min_key().unwrap_or(INVALID_EDGE_WEIGHT);
        let backward_min = backward_heap.min_key().unwrap_or(INVALID_EDGE_WEIGHT);
        if forward_min as i64 + backward_min as i64 >= tentative_weight as i64 {
            break;
        }
        if forward_min <= backward_min {
            unpack_settle::<D>(graph, forward_heap, backward_heap, &mut tentative_weight, &mut meeting_node);
        } else {
            unpack_settle::<D::Opposite>(graph, backward_heap, forward_heap, &mut tentative_weight, &mut meeting_node);
        }
    }

    debug_assert!(meeting_node != INVALID_NODE_ID, "shortcut endpoints not connected in the base graph");
    if meeting_node == INVALID_NODE_ID {
        return;
    }

    let first_appended = nodes.len();
    let mut current = meeting_node;
    while current != from {
        nodes.push(current);
        current = *forward_heap.data(current);
    }
    nodes[first_appended..].reverse();

    let mut current = meeting_node;
    while current != to {
        let parent = *backward_heap.data(current);
        nodes.push(parent);
        current = parent;
    }
}

/// Geometric length of a packed path between two phantoms.
///
/// The packed path is oriented in search direction; for backward drivers the
/// actual travel direction is the reverse and the phantom roles are flipped.
/// The raw sum of segment lengths measures from the first segment entry of
/// the unpacked path to the last, so the snap offsets of the phantoms are
/// applied at both ends. An empty packed path means both phantoms sit on the
/// same segment and the distance is the difference of their snap offsets.
pub(super) fn annotate_packed_path<D: Direction>(
    data: &MultiLevelGraph,
    unpack_forward: &mut QueryHeap<NodeId>,
    unpack_backward: &mut QueryHeap<NodeId>,
    source_phantom: &PhantomNode,
    target_phantom: &PhantomNode,
    packed_path: &[PackedEdge],
) -> Distance {
    let (from_phantom, to_phantom) = if D::FORWARD {
        (source_phantom, target_phantom)
    } else {
        (target_phantom, source_phantom)
    };

    if packed_path.is_empty() {
        if from_phantom.is_valid_forward_source()
            && to_phantom.is_valid_forward_target()
            && to_phantom.forward.distance >= from_phantom.forward.distance
        {
            return to_phantom.forward.distance - from_phantom.forward.distance;
        } else if from_phantom.is_valid_reverse_source()
            && to_phantom.is_valid_reverse_target()
            && to_phantom.reverse.distance >= from_phantom.reverse.distance
        {
            return to_phantom.reverse.distance - from_phantom.reverse.distance;
        }
        return INVALID_EDGE_DISTANCE;
    }

    let mut nodes = Vec::with_capacity(packed_path.len() + 1);
    nodes.push(packed_path[0].from);
    for edge in packed_path {
        if edge.from_shortcut {
            unpack_shortcut::<D>(data, unpack_forward, unpack_backward, edge.from, edge.to, &mut nodes);
        } else {
            nodes.push(edge.to);
        }
    }

    // into actual travel direction
    if !D::FORWARD {
        nodes.reverse();
    }

    let mut distance = 0.0;
    for &node in &nodes[..nodes.len() - 1] {
        distance += data.graph().segment_distance(node);
    }

    let first = nodes[0];
    let last = *nodes.last().unwrap();
    if from_phantom.forward.enabled && from_phantom.forward.node == first {
        distance -= from_phantom.forward.distance;
    } else if from_phantom.reverse.enabled && from_phantom.reverse.node == first {
        distance -= from_phantom.reverse.distance;
    }
    if to_phantom.forward.enabled && to_phantom.forward.node == last {
        distance += to_phantom.forward.distance;
    } else if to_phantom.reverse.enabled && to_phantom.reverse.node == last {
        distance += to_phantom.reverse.distance;
    }

    distance
}
