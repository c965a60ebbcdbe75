//! Monotone priority queue with per-node payloads for matrix searches.

use super::graph::*;
use super::index_heap::*;

/// Queue state of one node, ordered by the cumulative weight key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct State {
    key: Weight,
    node: NodeId,
}

impl Indexing for State {
    #[inline]
    fn as_index(&self) -> usize {
        self.node as usize
    }
}

/// An indexed min-heap keyed by cumulative path weight which additionally
/// stores a payload for every node that was ever inserted during the current
/// search.
///
/// Both the payload and the last key of a node remain available after the
/// node was popped - path reconstruction walks parent chains through the
/// payloads once the queue has drained.
/// Clearing is `O(inserted)`, the backing storage is allocated once and kept.
#[derive(Debug, Clone)]
pub struct QueryHeap<Data> {
    queue: IndexdMinHeap<State>,
    keys: Vec<Weight>,
    data: Vec<Data>,
    inserted: Vec<NodeId>,
    in_search: Vec<bool>,
}

impl<Data: Clone + Default> QueryHeap<Data> {
    /// Storage for nodes with ids in `[0, max_id)`.
    pub fn new(max_id: usize) -> QueryHeap<Data> {
        QueryHeap {
            queue: IndexdMinHeap::new(max_id),
            keys: vec![INVALID_EDGE_WEIGHT; max_id],
            data: vec![Data::default(); max_id],
            inserted: Vec::new(),
            in_search: vec![false; max_id],
        }
    }

    /// Insert a node with its key and payload.
    /// Panics (in debug builds) if the node is already part of the search.
    pub fn insert(&mut self, node: NodeId, key: Weight, data: Data) {
        debug_assert!(!self.was_inserted(node));
        self.keys[node as usize] = key;
        self.data[node as usize] = data;
        self.in_search[node as usize] = true;
        self.inserted.push(node);
        self.queue.push(State { key, node });
    }

    /// Lower the key of a queued node.
    pub fn decrease_key(&mut self, node: NodeId, key: Weight) {
        self.keys[node as usize] = key;
        self.queue.decrease_key(State { key, node });
    }

    /// Was the node inserted at some point during the current search?
    /// Stays true after the node was popped.
    pub fn was_inserted(&self, node: NodeId) -> bool {
        self.in_search[node as usize]
    }

    /// The current key of a queued node, or the final key of a popped one.
    pub fn key(&self, node: NodeId) -> Weight {
        debug_assert!(self.was_inserted(node));
        self.keys[node as usize]
    }

    pub fn data(&self, node: NodeId) -> &Data {
        debug_assert!(self.was_inserted(node));
        &self.data[node as usize]
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut Data {
        debug_assert!(self.was_inserted(node));
        &mut self.data[node as usize]
    }

    /// Remove the node with the smallest key and return it.
    /// Key and payload of the node remain accessible.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.queue.pop().map(|State { node, .. }| node)
    }

    /// Smallest key currently queued.
    pub fn min_key(&self) -> Option<Weight> {
        self.queue.peek().map(|state| state.key)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Forget the current search. Capacity is retained.
    pub fn clear(&mut self) {
        self.queue.clear();
        for node in self.inserted.drain(..) {
            self.in_search[node as usize] = false;
        }
    }
}
