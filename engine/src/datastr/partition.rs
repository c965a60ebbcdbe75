//! Nested multi-level cell partition of the graph nodes.

use super::graph::NodeId;

/// Partition levels are 8bit unsigned ints.
/// Level 0 is the base graph, cells exist for levels `1..num_levels()`.
pub type LevelId = u8;
/// Cell ids are 32bit unsigned ints, consecutive within each level.
pub type CellId = u32;
/// Sentinel for "no usable level". Acts as infinity in minimum computations
/// over levels and as a hard stop for edge relaxation.
pub const INVALID_LEVEL: LevelId = LevelId::MAX;

/// A hierarchy of nested node partitions.
/// Cells at level l+1 are unions of cells at level l.
#[derive(Debug, Clone)]
pub struct MultiLevelPartition {
    // cells[l][node] is the cell of node at level l+1
    cells: Vec<Vec<CellId>>,
}

impl MultiLevelPartition {
    /// `cells[l][node]` contains the cell of `node` at level `l + 1`.
    /// All levels must cover the same set of nodes and the cells of
    /// consecutive levels must nest.
    pub fn new(cells: Vec<Vec<CellId>>) -> MultiLevelPartition {
        assert!(cells.len() < INVALID_LEVEL as usize - 1);
        for adjacent_levels in cells.windows(2) {
            assert_eq!(adjacent_levels[0].len(), adjacent_levels[1].len());
            let num_lower = adjacent_levels[0].iter().max().map(|&c| c as usize + 1).unwrap_or(0);
            let mut parent = vec![None; num_lower];
            for (&lower, &upper) in adjacent_levels[0].iter().zip(adjacent_levels[1].iter()) {
                match parent[lower as usize] {
                    None => parent[lower as usize] = Some(upper),
                    Some(cell) => assert_eq!(cell, upper, "cells of consecutive levels do not nest"),
                }
            }
        }
        MultiLevelPartition { cells }
    }

    /// Number of levels including the base graph at level 0.
    pub fn num_levels(&self) -> LevelId {
        self.cells.len() as LevelId + 1
    }

    /// Number of cells at the given level.
    pub fn num_cells(&self, level: LevelId) -> usize {
        self.cells[level as usize - 1].iter().max().map(|&c| c as usize + 1).unwrap_or(0)
    }

    /// The cell containing `node` at `level`. Only valid for `level >= 1`.
    pub fn cell(&self, level: LevelId, node: NodeId) -> CellId {
        self.cells[level as usize - 1][node as usize]
    }

    /// The highest level at which the two nodes are in different cells,
    /// 0 if they share a cell on every level (in particular for a node and
    /// itself).
    pub fn highest_different_level(&self, first: NodeId, second: NodeId) -> LevelId {
        for level in (1..self.num_levels()).rev() {
            if self.cell(level, first) != self.cell(level, second) {
                return level;
            }
        }
        0
    }
}
