//! Static adjacency array graph for multi-level matrix queries.
//!
//! Nodes and edges are identified by ids from `0` to `n-1` and `m-1`.
//! The graph is stored as an adjacency array using `first_out`, `head` and a
//! parallel edge payload collection. Each directed input edge is stored at
//! *both* endpoints (with mirrored direction flags), so one adjacency range
//! serves forward and backward searches alike.
//!
//! The adjacency of every node is ordered by descending *boundary level* -
//! the highest partition level at which the edge crosses a cell boundary.
//! The edges crossing a boundary at some level thus form a prefix of the
//! node's adjacency, which makes the border edge ranges of the searches a
//! partition point computation.

use super::*;
use crate::datastr::partition::*;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct SegmentGraph {
    // index of the first edge of each node, +1 entry in the end
    first_out: Vec<EdgeId>,
    // the node each stored half-edge points at
    head: Vec<NodeId>,
    edge_data: Vec<EdgeData>,
    // highest level at which the half-edge crosses a cell boundary
    boundary_level: Vec<LevelId>,
    // geometric length of the road segment each node represents
    segment_distance: Vec<Distance>,
    excluded: Vec<bool>,
}

impl SegmentGraph {
    /// Build the graph from directed edges and per-node segment lengths.
    /// The partition determines the boundary levels by which each adjacency
    /// is ordered.
    pub fn new(edges: &[DirectedEdge], segment_distance: Vec<Distance>, partition: &MultiLevelPartition) -> SegmentGraph {
        let n = segment_distance.len();
        assert!(n < NodeId::MAX as usize);

        let mut adjacency: Vec<Vec<(NodeId, EdgeData)>> = vec![Vec::new(); n];
        for edge in edges {
            assert!((edge.from as usize) < n && (edge.to as usize) < n);
            assert_ne!(edge.from, edge.to);
            assert!(edge.weight > 0, "edge weights have to be positive");
            assert!(edge.duration >= 0);

            adjacency[edge.from as usize].push((
                edge.to,
                EdgeData {
                    weight: edge.weight,
                    duration: edge.duration,
                    forward: true,
                    backward: false,
                },
            ));
            adjacency[edge.to as usize].push((
                edge.from,
                EdgeData {
                    weight: edge.weight,
                    duration: edge.duration,
                    forward: false,
                    backward: true,
                },
            ));
        }

        let mut first_out: Vec<EdgeId> = Vec::with_capacity(n + 1);
        first_out.push(0);
        let mut head = Vec::new();
        let mut edge_data = Vec::new();
        let mut boundary_level = Vec::new();

        for (node, mut links) in adjacency.into_iter().enumerate() {
            links.sort_by_key(|&(link_head, _)| std::cmp::Reverse(partition.highest_different_level(node as NodeId, link_head)));
            first_out.push(first_out.last().unwrap() + links.len() as EdgeId);
            for (link_head, data) in links {
                boundary_level.push(partition.highest_different_level(node as NodeId, link_head));
                head.push(link_head);
                edge_data.push(data);
            }
        }

        SegmentGraph {
            first_out,
            head,
            edge_data,
            boundary_level,
            segment_distance,
            excluded: vec![false; n],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    pub fn num_arcs(&self) -> usize {
        self.head.len()
    }

    /// The node the stored half-edge points at.
    pub fn head(&self, edge: usize) -> NodeId {
        self.head[edge]
    }

    pub fn edge_data(&self, edge: usize) -> &EdgeData {
        &self.edge_data[edge]
    }

    /// The range of edge ids which make up the complete adjacency of `node`.
    pub fn neighbor_edge_indices(&self, node: NodeId) -> Range<usize> {
        self.first_out[node as usize] as usize..self.first_out[node as usize + 1] as usize
    }

    /// The prefix of the adjacency of `node` crossing a cell boundary at
    /// `level`. At level 0 this is the complete adjacency.
    pub fn border_edge_range(&self, level: LevelId, node: NodeId) -> Range<usize> {
        let range = self.neighbor_edge_indices(node);
        let num_border = self.boundary_level[range.clone()].partition_point(|&edge_level| edge_level >= level);
        range.start..range.start + num_border
    }

    /// Is the node barred from routing?
    pub fn is_excluded(&self, node: NodeId) -> bool {
        self.excluded[node as usize]
    }

    /// Bar a node from routing, e.g. because of an active restriction.
    pub fn set_excluded(&mut self, node: NodeId, excluded: bool) {
        self.excluded[node as usize] = excluded;
    }

    /// Geometric length in meters of the road segment `node` represents.
    /// Only used for distance annotation.
    pub fn segment_distance(&self, node: NodeId) -> Distance {
        self.segment_distance[node as usize]
    }
}
