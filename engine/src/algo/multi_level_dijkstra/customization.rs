//! Computes the overlay metric: per-cell shortcut tables over boundary nodes.
//!
//! For every cell, a boundary node classification pass over the
//! border-crossing half-edges is followed by one restricted search per source
//! boundary node. The searches never leave the cell and rank labels
//! lexicographically by (weight, duration), the same order the queries use,
//! so query tie breaking and table entries agree.
//! Cells of a level are independent and are processed in parallel.

use super::*;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Build the complete metric for all levels of the partition.
pub fn customize(graph: &SegmentGraph, partition: &MultiLevelPartition) -> CellMetric {
    silent_report_time_with_key("customization_running_time_ms", || {
        let mut levels = Vec::new();
        for level in 1..partition.num_levels() {
            let mut cell_nodes = vec![Vec::new(); partition.num_cells(level)];
            for node in 0..graph.num_nodes() as NodeId {
                cell_nodes[partition.cell(level, node) as usize].push(node);
            }

            let cells: Vec<CellShortcuts> = cell_nodes
                .par_iter()
                .enumerate()
                .map(|(cell, nodes)| customize_cell(graph, partition, level, cell as CellId, nodes))
                .collect();
            levels.push(cells);
        }
        CellMetric::new(levels)
    })
}

/// Build the shortcut table of a single cell.
/// `nodes` contains the cell's nodes in ascending id order.
fn customize_cell(graph: &SegmentGraph, partition: &MultiLevelPartition, level: LevelId, cell: CellId, nodes: &[NodeId]) -> CellShortcuts {
    let mut source_nodes = Vec::new();
    let mut destination_nodes = Vec::new();
    for &node in nodes {
        if graph.is_excluded(node) {
            continue;
        }
        let mut enterable = false;
        let mut leavable = false;
        for edge in graph.neighbor_edge_indices(node) {
            if partition.cell(level, graph.head(edge)) != cell {
                let edge_data = graph.edge_data(edge);
                // crossing the boundary outward makes the node a destination,
                // an inward crossing makes it a source
                leavable |= edge_data.forward;
                enterable |= edge_data.backward;
            }
        }
        if enterable {
            source_nodes.push(node);
        }
        if leavable {
            destination_nodes.push(node);
        }
    }

    let num_destinations = destination_nodes.len();
    let mut weights = vec![INVALID_EDGE_WEIGHT; source_nodes.len() * num_destinations];
    let mut durations = vec![MAXIMAL_EDGE_DURATION; source_nodes.len() * num_destinations];

    let mut labels = vec![(INVALID_EDGE_WEIGHT, MAXIMAL_EDGE_DURATION); nodes.len()];
    for (row, &source) in source_nodes.iter().enumerate() {
        for label in &mut labels {
            *label = (INVALID_EDGE_WEIGHT, MAXIMAL_EDGE_DURATION);
        }
        cell_search(graph, partition, level, cell, nodes, source, &mut labels);

        for (column, &destination) in destination_nodes.iter().enumerate() {
            let local = nodes.binary_search(&destination).unwrap();
            let (weight, duration) = labels[local];
            weights[row * num_destinations + column] = weight;
            durations[row * num_destinations + column] = duration;
        }
    }

    CellShortcuts::new(source_nodes, destination_nodes, weights, durations)
}

/// Lexicographic (weight, duration) search from `source`, restricted to the
/// nodes of the cell. Labels are indexed by position in `nodes`.
fn cell_search(
    graph: &SegmentGraph,
    partition: &MultiLevelPartition,
    level: LevelId,
    cell: CellId,
    nodes: &[NodeId],
    source: NodeId,
    labels: &mut [(Weight, Duration)],
) {
    let mut queue = BinaryHeap::new();
    let source_local = nodes.binary_search(&source).unwrap();
    labels[source_local] = (0, 0);
    queue.push(Reverse((0, 0, source)));

    while let Some(Reverse((weight, duration, node))) = queue.pop() {
        let local = nodes.binary_search(&node).unwrap();
        if (weight, duration) > labels[local] {
            continue; // stale entry
        }

        for edge in graph.neighbor_edge_indices(node) {
            let edge_data = graph.edge_data(edge);
            if !edge_data.forward {
                continue;
            }
            let to = graph.head(edge);
            if partition.cell(level, to) != cell || graph.is_excluded(to) {
                continue;
            }
            let to_local = nodes.binary_search(&to).unwrap();
            let to_label = (weight + edge_data.weight, duration + edge_data.duration);
            if to_label < labels[to_local] {
                labels[to_local] = to_label;
                queue.push(Reverse((to_label.0, to_label.1, to)));
            }
        }
    }
}
