//! Precomputed shortcut tables for the cells of the partition.
//!
//! For every cell the metric stores, for each *source* boundary node, the
//! shortest intra-cell weight and duration to every *destination* boundary
//! node. Unreachable pairs carry the invalid weight sentinel.

use super::graph::*;
use super::partition::*;

/// Shortcut tables of a single cell.
///
/// Weights and durations are row-major `|sources| x |destinations|`
/// matrices. Rows are served as slices, columns as strided iterators.
#[derive(Debug, Clone, Default)]
pub struct CellShortcuts {
    source_nodes: Vec<NodeId>,
    destination_nodes: Vec<NodeId>,
    weights: Vec<Weight>,
    durations: Vec<Duration>,
}

impl CellShortcuts {
    pub fn new(source_nodes: Vec<NodeId>, destination_nodes: Vec<NodeId>, weights: Vec<Weight>, durations: Vec<Duration>) -> CellShortcuts {
        assert_eq!(weights.len(), source_nodes.len() * destination_nodes.len());
        assert_eq!(durations.len(), weights.len());
        CellShortcuts {
            source_nodes,
            destination_nodes,
            weights,
            durations,
        }
    }

    /// Boundary nodes at which the cell can be entered, ascending by id.
    pub fn source_nodes(&self) -> &[NodeId] {
        &self.source_nodes
    }

    /// Boundary nodes at which the cell can be left, ascending by id.
    pub fn destination_nodes(&self) -> &[NodeId] {
        &self.destination_nodes
    }

    /// Weights from `node` to all destination nodes.
    /// Empty if `node` is not a source boundary node of the cell.
    pub fn out_weights(&self, node: NodeId) -> &[Weight] {
        self.out_row(&self.weights, node)
    }

    /// Durations from `node` to all destination nodes.
    pub fn out_durations(&self, node: NodeId) -> &[Duration] {
        self.out_row(&self.durations, node)
    }

    /// Weights from all source nodes to `node`.
    /// Empty if `node` is not a destination boundary node of the cell.
    pub fn in_weights(&self, node: NodeId) -> impl Iterator<Item = Weight> + '_ {
        self.in_column(&self.weights, node)
    }

    /// Durations from all source nodes to `node`.
    pub fn in_durations(&self, node: NodeId) -> impl Iterator<Item = Duration> + '_ {
        self.in_column(&self.durations, node)
    }

    fn out_row<'a, T>(&self, matrix: &'a [T], node: NodeId) -> &'a [T] {
        let num_destinations = self.destination_nodes.len();
        match self.source_nodes.binary_search(&node) {
            Ok(row) => &matrix[row * num_destinations..(row + 1) * num_destinations],
            Err(_) => &[],
        }
    }

    fn in_column<'a, T: Copy>(&self, matrix: &'a [T], node: NodeId) -> impl Iterator<Item = T> + 'a {
        let stride = self.destination_nodes.len().max(1);
        let offset = match self.destination_nodes.binary_search(&node) {
            Ok(column) => column,
            Err(_) => matrix.len(),
        };
        matrix.iter().copied().skip(offset).step_by(stride)
    }
}

/// The complete overlay metric: shortcut tables for every cell of every level.
#[derive(Debug, Clone)]
pub struct CellMetric {
    // cells[l][c] is the table of cell c at level l+1
    cells: Vec<Vec<CellShortcuts>>,
}

impl CellMetric {
    /// `cells[l][c]` contains the table of cell `c` at level `l + 1`.
    pub fn new(cells: Vec<Vec<CellShortcuts>>) -> CellMetric {
        CellMetric { cells }
    }

    pub fn num_levels(&self) -> LevelId {
        self.cells.len() as LevelId + 1
    }

    /// The shortcut table of the given cell. Only valid for `level >= 1`.
    pub fn cell(&self, level: LevelId, cell: CellId) -> &CellShortcuts {
        &self.cells[level as usize - 1][cell as usize]
    }
}
