//! Bucket-based bidirectional search for M-to-N matrices.
//!
//! One pruned backward search per target dumps its complete settled search
//! space into buckets. After a single sort, one forward search per source
//! joins its settled nodes against the buckets of all targets at once and
//! updates the result matrices wherever forward and backward spaces meet.

use super::unpacking::*;
use super::*;

/// One settled node of a backward search.
/// The column index ties the entry to its target; parent and shortcut flag
/// allow walking the backward search tree during path reconstruction.
#[derive(Debug, Clone, Copy)]
pub(super) struct NodeBucket {
    pub node: NodeId,
    pub parent: NodeId,
    pub from_shortcut: bool,
    pub column: usize,
    pub weight: Weight,
    pub duration: Duration,
}

/// All buckets of `node`, any column. The store has to be sorted.
pub(super) fn bucket_range(buckets: &[NodeBucket], node: NodeId) -> std::ops::Range<usize> {
    let start = buckets.partition_point(|bucket| bucket.node < node);
    let end = buckets.partition_point(|bucket| bucket.node <= node);
    start..end
}

/// Result matrix position of the pair. The reversed driver receives flipped
/// endpoint lists and writes transposed, so the returned matrix is laid out
/// in the orientation the caller asked for.
fn matrix_location<D: Direction>(row: usize, column: usize, num_sources: usize, num_targets: usize) -> usize {
    if D::FORWARD {
        row * num_targets + column
    } else {
        row + column * num_sources
    }
}

/// Settle one node of a backward search: record its bucket and relax edges
/// against the search direction, capped below the topmost level.
fn backward_step<D: Direction>(
    data: &MultiLevelGraph,
    column: usize,
    heap: &mut QueryHeap<SearchPayload>,
    buckets: &mut Vec<NodeBucket>,
    phantom: &PhantomNode,
) {
    let node = match heap.pop() {
        Some(node) => node,
        None => return,
    };
    let weight = heap.key(node);
    let SearchPayload {
        parent,
        from_shortcut,
        duration,
    } = *heap.data(node);

    buckets.push(NodeBucket {
        node,
        parent,
        from_shortcut,
        column,
        weight,
        duration,
    });

    let maximal_level = data.partition().num_levels() - 1;
    let level = query_level_capped(data.partition(), node, phantom, maximal_level);
    relax_outgoing_edges::<D::Opposite>(data, node, weight, duration, level, heap);
}

/// Settle one node of a forward search: join it against the buckets of all
/// backward spaces, then relax edges in search direction.
#[allow(clippy::too_many_arguments)]
fn forward_step<D: Direction>(
    data: &MultiLevelGraph,
    row: usize,
    num_sources: usize,
    num_targets: usize,
    heap: &mut QueryHeap<SearchPayload>,
    buckets: &[NodeBucket],
    weights: &mut [Weight],
    durations: &mut [Duration],
    middle_nodes: &mut [NodeId],
    phantom: &PhantomNode,
) {
    let node = match heap.pop() {
        Some(node) => node,
        None => return,
    };
    let source_weight = heap.key(node);
    let source_duration = heap.data(node).duration;

    for bucket in &buckets[bucket_range(buckets, node)] {
        let location = matrix_location::<D>(row, bucket.column, num_sources, num_targets);

        let new_weight = source_weight + bucket.weight;
        let new_duration = source_duration + bucket.duration;

        if new_weight >= 0 && (new_weight, new_duration) < (weights[location], durations[location]) {
            weights[location] = new_weight;
            durations[location] = new_duration;
            middle_nodes[location] = node;
        }
    }

    let level = query_level(data.partition(), node, phantom);
    relax_outgoing_edges::<D>(data, node, source_weight, source_duration, level, heap);
}

pub(super) fn search<D: Direction>(
    workspace: &mut Workspace,
    data: &MultiLevelGraph,
    phantoms: &[PhantomNode],
    source_indices: &[usize],
    target_indices: &[usize],
    want_distance: bool,
) -> (Vec<Duration>, Vec<Distance>) {
    let num_sources = source_indices.len();
    let num_targets = target_indices.len();
    let num_entries = num_sources * num_targets;

    let mut weights = vec![INVALID_EDGE_WEIGHT; num_entries];
    let mut durations = vec![MAXIMAL_EDGE_DURATION; num_entries];
    let mut middle_nodes = vec![INVALID_NODE_ID; num_entries];
    let mut distances = Vec::new();
    if want_distance {
        distances = vec![INVALID_EDGE_DISTANCE; num_entries];
    }

    let Workspace {
        heap,
        unpack_forward,
        unpack_backward,
        buckets,
    } = workspace;
    buckets.clear();

    // Populate buckets with the search spaces of all targets.
    for (column, &index) in target_indices.iter().enumerate() {
        let target_phantom = &phantoms[index];
        heap.clear();
        if D::FORWARD {
            insert_target_in_heap(heap, target_phantom);
        } else {
            insert_source_in_heap(heap, target_phantom);
        }

        while !heap.is_empty() {
            backward_step::<D>(data, column, heap, buckets, target_phantom);
        }
    }

    buckets.sort_unstable_by_key(|bucket| (bucket.node, bucket.column));

    // Find shortest paths from every source into the joint backward space.
    for (row, &index) in source_indices.iter().enumerate() {
        let source_phantom = &phantoms[index];
        heap.clear();
        if D::FORWARD {
            insert_source_in_heap(heap, source_phantom);
        } else {
            insert_target_in_heap(heap, source_phantom);
        }

        while !heap.is_empty() {
            forward_step::<D>(
                data,
                row,
                num_sources,
                num_targets,
                heap,
                buckets,
                &mut weights,
                &mut durations,
                &mut middle_nodes,
                source_phantom,
            );
        }

        if want_distance {
            fill_row_distances::<D>(
                data,
                phantoms,
                target_indices,
                row,
                index,
                num_sources,
                num_targets,
                heap,
                buckets,
                unpack_forward,
                unpack_backward,
                &middle_nodes,
                &mut distances,
            );
        }
    }

    (durations, distances)
}

/// Reconstruct the paths of one result row and annotate them with geometric
/// distances. Runs right after the row's forward search while its search
/// space is still in the heap.
#[allow(clippy::too_many_arguments)]
fn fill_row_distances<D: Direction>(
    data: &MultiLevelGraph,
    phantoms: &[PhantomNode],
    target_indices: &[usize],
    row: usize,
    source_index: usize,
    num_sources: usize,
    num_targets: usize,
    heap: &QueryHeap<SearchPayload>,
    buckets: &[NodeBucket],
    unpack_forward: &mut QueryHeap<NodeId>,
    unpack_backward: &mut QueryHeap<NodeId>,
    middle_nodes: &[NodeId],
    distances: &mut [Distance],
) {
    for (column, &target_index) in target_indices.iter().enumerate() {
        let location = matrix_location::<D>(row, column, num_sources, num_targets);

        if target_index == source_index {
            distances[location] = 0.0;
            continue;
        }
        let middle = middle_nodes[location];
        if middle == INVALID_NODE_ID {
            distances[location] = INVALID_EDGE_DISTANCE;
            continue;
        }

        let mut packed_path = packed_path_from_heap(heap, middle);
        packed_path_from_buckets(buckets, middle, column, &mut packed_path);

        distances[location] = annotate_packed_path::<D>(
            data,
            unpack_forward,
            unpack_backward,
            &phantoms[source_index],
            &phantoms[target_index],
            &packed_path,
        );
    }
}
