//! Map transition graph: maps as nodes, gates as directed edges.
//!
//! Only the next hop is ever needed because the world is re-observed after
//! every step, so the pathfinder answers "which edge do I take from here"
//! instead of materializing routes. It walks a reverse adjacency index
//! backward from the destination, breadth first.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::route::{NpcRef, TransitionEdge};

/// The directed graph of map transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    /// Edges in catalog order. Discovery order breaks BFS ties.
    edges: Vec<TransitionEdge>,
    /// Inbound adjacency: destination map -> indices of edges arriving there.
    inbound: BTreeMap<String, Vec<usize>>,
    /// Every gate position, for validating visible units.
    gates: BTreeSet<NpcRef>,
}

impl TransitionGraph {
    /// Build the graph from edges in catalog order.
    pub fn new(edges: Vec<TransitionEdge>) -> Self {
        let mut inbound: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut gates = BTreeSet::new();
        for (idx, edge) in edges.iter().enumerate() {
            inbound.entry(edge.to_map.clone()).or_default().push(idx);
            gates.insert(edge.gate_ref());
        }
        Self {
            edges,
            inbound,
            gates,
        }
    }

    /// All edges in catalog order.
    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }

    /// Whether a gate exists at this position.
    pub fn is_gate(&self, gate: &NpcRef) -> bool {
        self.gates.contains(gate)
    }

    /// The first edge to take from `current` toward `target`.
    ///
    /// Returns `None` when already there or when `target` is unreachable.
    pub fn next_edge(&self, current: &str, target: &str) -> Option<&TransitionEdge> {
        self.search(current, target, |_| true)
    }

    /// Like [`next_edge`](Self::next_edge), but ignores gates a player of
    /// `level` cannot pass.
    pub fn next_edge_for_level(
        &self,
        current: &str,
        target: &str,
        level: u32,
    ) -> Option<&TransitionEdge> {
        self.search(current, target, |edge| edge.admits(level))
    }

    /// The full hop sequence from `current` to `target`, following
    /// [`next_edge`](Self::next_edge) one map at a time.
    ///
    /// Returns an empty route when already there and `None` when unreachable.
    pub fn route(&self, current: &str, target: &str) -> Option<Vec<&TransitionEdge>> {
        let mut hops = Vec::new();
        let mut node = current;
        while node != target {
            if hops.len() >= self.edges.len() {
                return None;
            }
            let edge = self.next_edge(node, target)?;
            hops.push(edge);
            node = edge.to_map.as_str();
        }
        Some(hops)
    }

    fn search<F>(&self, current: &str, target: &str, usable: F) -> Option<&TransitionEdge>
    where
        F: Fn(&TransitionEdge) -> bool,
    {
        if current == target {
            return None;
        }
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        queue.push_back(target);
        visited.insert(target);

        while let Some(node) = queue.pop_front() {
            let Some(arrivals) = self.inbound.get(node) else {
                continue;
            };
            for edge in arrivals.iter().filter_map(|&idx| self.edges.get(idx)) {
                if !usable(edge) {
                    continue;
                }
                if edge.map == current {
                    return Some(edge);
                }
                if visited.insert(edge.map.as_str()) {
                    queue.push_back(edge.map.as_str());
                }
            }
        }
        None
    }
}
