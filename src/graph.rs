//! Lineage graph module.
//!
//! Provides the `LineageGraph` type: cards as nodes, one edge from every
//! predecessor to the card it produces, labelled with the edge kind. Used
//! for successor navigation, ancestry queries and cycle diagnostics. Stat
//! resolution itself follows the predecessor index, not this graph.

use crate::card_id::CardId;
use crate::lineage::{EdgeKind, SuccessorEdge};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Directed graph of card lineage.
///
/// An edge `A -> B` means A is consumed (or transformed) to produce B.
///
/// # Examples
///
/// ```rust
/// use evostat::graph::LineageGraph;
/// use evostat::{CardId, EdgeKind};
///
/// let mut graph = LineageGraph::new();
/// let first = CardId::new(1);
/// let second = CardId::new(2);
///
/// graph.add_edge(first, second, EdgeKind::SequentialEvolution);
///
/// let successors = graph.successors(first);
/// assert_eq!(successors.len(), 1);
/// assert_eq!(successors[0].card, second);
/// assert!(graph.find_cycle().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<CardId, EdgeKind>,
    node_map: HashMap<CardId, NodeIndex>,
}

impl LineageGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph if it doesn't exist.
    ///
    /// Returns the node index for this card.
    pub fn add_node(&mut self, card: CardId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&card) {
            idx
        } else {
            let idx = self.graph.add_node(card);
            self.node_map.insert(card, idx);
            idx
        }
    }

    /// Add an edge: `from` produces `to` through `kind`.
    ///
    /// Both nodes are added to the graph if they don't exist.
    pub fn add_edge(&mut self, from: CardId, to: CardId, kind: EdgeKind) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.add_edge(from_idx, to_idx, kind);
    }

    /// Check if a card is in the graph.
    pub fn contains_node(&self, card: CardId) -> bool {
        self.node_map.contains_key(&card)
    }

    /// Number of cards in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Cards produced from `card`, ordered by card ID.
    pub fn successors(&self, card: CardId) -> Vec<SuccessorEdge> {
        let Some(&idx) = self.node_map.get(&card) else {
            return Vec::new();
        };
        let mut successors: Vec<SuccessorEdge> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| SuccessorEdge {
                kind: *edge.weight(),
                card: self.graph[edge.target()],
            })
            .collect();
        successors.sort_by_key(|edge| (edge.card, edge.kind));
        successors
    }

    /// Every card that feeds into `card`, directly or transitively.
    ///
    /// Performs a reverse DFS from the card. The card itself is not
    /// included unless it sits on a cycle. The result is ordered by card ID.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evostat::graph::LineageGraph;
    /// use evostat::{CardId, EdgeKind};
    ///
    /// let mut graph = LineageGraph::new();
    /// let (a, b, c, other) = (CardId::new(1), CardId::new(2), CardId::new(3), CardId::new(9));
    /// graph.add_edge(a, b, EdgeKind::SequentialEvolution);
    /// graph.add_edge(b, c, EdgeKind::Awakening);
    /// graph.add_node(other);
    ///
    /// assert_eq!(graph.ancestors(c), vec![a, b]);
    /// assert!(graph.ancestors(a).is_empty());
    /// ```
    pub fn ancestors(&self, card: CardId) -> Vec<CardId> {
        let Some(&start) = self.node_map.get(&card) else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            for neighbor in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        let mut ancestors: Vec<CardId> = visited.into_iter().map(|idx| self.graph[idx]).collect();
        ancestors.sort();
        ancestors
    }

    /// Find a lineage cycle, if any.
    ///
    /// Uses depth-first search; returns the cycle path closed on the
    /// repeated card (`[A, B, A]`), following production order.
    pub fn find_cycle(&self) -> Option<Vec<CardId>> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();

        let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
        roots.sort_by_key(|&idx| self.graph[idx]);

        for node_idx in roots {
            if !visited.contains(&node_idx) {
                let mut cycle_path = Vec::new();
                if let Some(cycle) =
                    self.dfs_cycle_detect(node_idx, &mut visited, &mut rec_stack, &mut cycle_path)
                {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn dfs_cycle_detect(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
        cycle_path: &mut Vec<CardId>,
    ) -> Option<Vec<CardId>> {
        visited.insert(node);
        rec_stack.insert(node);
        cycle_path.push(self.graph[node]);

        for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle_detect(neighbor, visited, rec_stack, cycle_path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                let neighbor_card = self.graph[neighbor];
                let start = cycle_path
                    .iter()
                    .position(|&card| card == neighbor_card)
                    .unwrap_or(0);
                let mut cycle = cycle_path[start..].to_vec();
                cycle.push(neighbor_card);
                return Some(cycle);
            }
        }

        rec_stack.remove(&node);
        cycle_path.pop();
        None
    }
}
