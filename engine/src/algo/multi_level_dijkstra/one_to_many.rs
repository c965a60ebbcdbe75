//! Unidirectional search for 1-to-N and N-to-1 matrices.
//!
//! A single label-setting search serves all targets at once. The query level
//! of a node is bounded by every endpoint the search still has to reach, so
//! the search only climbs as high as the least common cell it still serves.
//! N-to-1 matrices run the same driver in the backward direction with the
//! endpoint roles flipped; the resulting N x 1 matrix needs no transposition.

use super::unpacking::*;
use super::*;

/// One target slot, keyed by the graph node of a valid phantom half.
/// In the backward direction the offsets are negated, matching the
/// negative-seed convention for the phantoms that act as path starts.
#[derive(Debug, Clone, Copy)]
struct TargetEntry {
    node: NodeId,
    slot: usize,
    weight: Weight,
    duration: Duration,
    consumed: bool,
}

fn target_range(targets: &[TargetEntry], node: NodeId) -> std::ops::Range<usize> {
    let start = targets.partition_point(|entry| entry.node < node);
    let end = targets.partition_point(|entry| entry.node <= node);
    start..end
}

/// Offer the settled label of `node` to all target slots keyed by it.
/// A slot only commits once the combined weight is non-negative, i.e. once
/// the positive part of the source offset has been covered; committed slots
/// are erased from the index.
#[allow(clippy::too_many_arguments)]
fn update_target_values(
    targets: &mut [TargetEntry],
    remaining: &mut usize,
    weights: &mut [Weight],
    durations: &mut [Duration],
    meeting_nodes: &mut [NodeId],
    node: NodeId,
    weight: Weight,
    duration: Duration,
) {
    let range = target_range(targets, node);
    for entry in &mut targets[range] {
        if entry.consumed {
            continue;
        }
        let path_weight = weight + entry.weight;
        if path_weight >= 0 {
            let path_duration = duration + entry.duration;
            if (path_weight, path_duration) < (weights[entry.slot], durations[entry.slot]) {
                weights[entry.slot] = path_weight;
                durations[entry.slot] = path_duration;
                meeting_nodes[entry.slot] = node;
            }
            entry.consumed = true;
            *remaining -= 1;
        }
    }
}

pub(super) fn search<D: Direction>(
    workspace: &mut Workspace,
    data: &MultiLevelGraph,
    phantoms: &[PhantomNode],
    source_index: usize,
    target_indices: &[usize],
    want_distance: bool,
) -> (Vec<Duration>, Vec<Distance>) {
    let num_targets = target_indices.len();
    let mut weights = vec![INVALID_EDGE_WEIGHT; num_targets];
    let mut durations = vec![MAXIMAL_EDGE_DURATION; num_targets];
    let mut meeting_nodes = vec![INVALID_NODE_ID; num_targets];

    let mut targets: Vec<TargetEntry> = Vec::with_capacity(num_targets);
    for (slot, &index) in target_indices.iter().enumerate() {
        let phantom = &phantoms[index];
        let mut add = |half: &PhantomHalf, valid: bool| {
            if valid {
                let (weight, duration) = if D::FORWARD { (half.weight, half.duration) } else { (-half.weight, -half.duration) };
                targets.push(TargetEntry {
                    node: half.node,
                    slot,
                    weight,
                    duration,
                    consumed: false,
                });
            }
        };
        if D::FORWARD {
            add(&phantom.forward, phantom.is_valid_forward_target());
            add(&phantom.reverse, phantom.is_valid_reverse_target());
        } else {
            add(&phantom.forward, phantom.is_valid_forward_source());
            add(&phantom.reverse, phantom.is_valid_reverse_source());
        }
    }
    targets.sort_by_key(|entry| entry.node);
    let mut remaining = targets.len();

    let Workspace {
        heap,
        unpack_forward,
        unpack_backward,
        ..
    } = workspace;
    heap.clear();

    // Seed the heap with the valid halves of the source phantom and
    // immediately pull their base graph neighborhood in to bootstrap
    // expansion.
    {
        let source_phantom = &phantoms[source_index];
        let mut seeds = Vec::new();
        if D::FORWARD {
            if source_phantom.is_valid_forward_source() {
                let half = &source_phantom.forward;
                seeds.push((half.node, -half.weight, -half.duration));
            }
            if source_phantom.is_valid_reverse_source() {
                let half = &source_phantom.reverse;
                seeds.push((half.node, -half.weight, -half.duration));
            }
        } else {
            if source_phantom.is_valid_forward_target() {
                let half = &source_phantom.forward;
                seeds.push((half.node, half.weight, half.duration));
            }
            if source_phantom.is_valid_reverse_target() {
                let half = &source_phantom.reverse;
                seeds.push((half.node, half.weight, half.duration));
            }
        }

        for (node, weight, duration) in seeds {
            update_target_values(
                &mut targets,
                &mut remaining,
                &mut weights,
                &mut durations,
                &mut meeting_nodes,
                node,
                weight,
                duration,
            );
            insert_or_decrease(heap, node, weight, duration, node, false);

            for edge in data.graph().neighbor_edge_indices(node) {
                let edge_data = data.graph().edge_data(edge);
                let traversable = if D::FORWARD { edge_data.forward } else { edge_data.backward };
                if traversable {
                    let to = data.graph().head(edge);
                    if data.graph().is_excluded(to) {
                        continue;
                    }
                    insert_or_decrease(heap, to, weight + edge_data.weight, duration + edge_data.duration, node, false);
                }
            }
        }
    }

    while remaining > 0 {
        let node = match heap.pop() {
            Some(node) => node,
            None => break,
        };
        let weight = heap.key(node);
        let duration = heap.data(node).duration;

        update_target_values(
            &mut targets,
            &mut remaining,
            &mut weights,
            &mut durations,
            &mut meeting_nodes,
            node,
            weight,
            duration,
        );

        let level = query_level_for_endpoints(data.partition(), node, phantoms, source_index, target_indices);
        relax_outgoing_edges::<D>(data, node, weight, duration, level, heap);
    }

    let mut distances = Vec::new();
    if want_distance {
        distances = vec![INVALID_EDGE_DISTANCE; num_targets];
        for slot in 0..num_targets {
            let target_index = target_indices[slot];
            if target_index == source_index {
                distances[slot] = 0.0;
                continue;
            }
            if meeting_nodes[slot] == INVALID_NODE_ID {
                continue;
            }

            let packed_path = packed_path_from_heap(heap, meeting_nodes[slot]);
            distances[slot] = annotate_packed_path::<D>(
                data,
                unpack_forward,
                unpack_backward,
                &phantoms[source_index],
                &phantoms[target_index],
                &packed_path,
            );
        }
    }

    (durations, distances)
}
