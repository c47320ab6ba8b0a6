//! Assembling a directed tree over the variables from their pairwise mutual information.

use crate::error::Error;
use crate::information::MiEdge;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::mem::swap;
use std::str::FromStr;
use tracing::{debug, trace};

/// A directed graph over variable labels where every edge points from parent to child and is
/// weighted with the negated mutual information of its endpoints.
///
/// Nodes and edges are only ever added while a [`TreeStrategy`] builds the tree.
#[derive(Clone, Debug, Default)]
pub struct ChowLiuTree {
    graph: DiGraph<String, f64>,
    nodes: HashMap<String, NodeIndex>,
}

impl ChowLiuTree {
    fn new() -> Self {
        ChowLiuTree::default()
    }

    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_owned());
        self.nodes.insert(label.to_owned(), idx);
        idx
    }

    fn index(&self, label: &str) -> Option<NodeIndex> {
        self.nodes.get(label).copied()
    }

    /// The underlying graph, for rendering or further analysis.
    pub fn graph(&self) -> &DiGraph<String, f64> {
        &self.graph
    }

    /// The number of variables in the tree.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of parent-child edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if the variable was placed in the tree.
    pub fn contains(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    /// Variable labels in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Every edge as `(parent, child, weight)`, in the order they were added.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
                *edge.weight(),
            )
        })
    }

    /// The parent of a variable, or `None` for roots and unknown labels.
    pub fn parent(&self, label: &str) -> Option<&str> {
        let idx = self.index(label)?;
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|parent| self.graph[parent].as_str())
    }

    /// Returns `true` if the variable already has an incoming edge.
    pub fn has_parent(&self, label: &str) -> bool {
        self.parent(label).is_some()
    }

    /// The children of a variable.
    pub fn children(&self, label: &str) -> Vec<&str> {
        let mut children: Vec<&str> = match self.index(label) {
            Some(idx) => self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|child| self.graph[child].as_str())
                .collect(),
            None => Vec::new(),
        };
        // petgraph lists neighbors newest first.
        children.reverse();
        children
    }

    /// The weight of the edge from `parent` to `child`, if there is one.
    pub fn weight(&self, parent: &str, child: &str) -> Option<f64> {
        let edge = self.graph.find_edge(self.index(parent)?, self.index(child)?)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Variables without a parent, in the order they were added.
    pub fn roots(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Returns `true` if following parent links never comes back around.
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }
}

/// How a [`ChowLiuTree`] is assembled from a list of [`MiEdge`]s.
///
/// Both strategies first sort the edges by mutual information, highest first. The sort is stable,
/// so equal values keep the order the edges were given in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TreeStrategy {
    /// Walk the sorted edges and accept any edge that brings in at least one variable not yet
    /// inserted. The edge points from `a` to `b`, unless `b` already has a parent, in which case
    /// it is reversed.
    ///
    /// This is a heuristic: once both endpoints are inserted an edge is never reconsidered, so the
    /// result can be a forest and need not have the largest total mutual information.
    #[default]
    GreedyInsertionOrder,

    /// A maximum-weight spanning tree: Kruskal's algorithm over the sorted edges, then each
    /// connected component is oriented breadth-first away from the variable that appears first in
    /// the edge list.
    MaximumWeightSpanningTree,
}

impl FromStr for TreeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" | "greedy-insertion-order" => Ok(TreeStrategy::GreedyInsertionOrder),
            "spanning" | "maximum-weight-spanning-tree" => {
                Ok(TreeStrategy::MaximumWeightSpanningTree)
            }
            _ => Err(Error::UnsupportedStrategy(s.to_owned())),
        }
    }
}

impl TreeStrategy {
    /// Builds a tree from the given edges.
    ///
    /// ```
    /// use chow_liu::{MiEdge, TreeStrategy};
    ///
    /// let edge = |a: &str, b: &str, mi| MiEdge { a: a.into(), b: b.into(), mi };
    /// let edges = vec![edge("x", "y", 0.9), edge("x", "z", 0.1), edge("z", "y", 0.8)];
    ///
    /// let tree = TreeStrategy::GreedyInsertionOrder.build(&edges);
    /// assert_eq!(tree.parent("y"), Some("x"));
    /// // "y" already has a parent, so the edge from "z" is reversed.
    /// assert_eq!(tree.parent("z"), Some("y"));
    /// assert_eq!(tree.weight("x", "y"), Some(-0.9));
    /// ```
    pub fn build(self, edges: &[MiEdge]) -> ChowLiuTree {
        let tree = match self {
            TreeStrategy::GreedyInsertionOrder => greedy_insertion_order(edges),
            TreeStrategy::MaximumWeightSpanningTree => maximum_weight_spanning_tree(edges),
        };
        debug!(
            "{:?} built a tree with {} nodes and {} edges from {} candidates",
            self,
            tree.node_count(),
            tree.edge_count(),
            edges.len()
        );
        tree
    }
}

fn sorted_by_information(edges: &[MiEdge]) -> Vec<&MiEdge> {
    let mut sorted: Vec<&MiEdge> = edges.iter().collect();
    sorted.sort_by(|x, y| y.mi.partial_cmp(&x.mi).unwrap_or(Ordering::Equal));
    sorted
}

fn greedy_insertion_order(edges: &[MiEdge]) -> ChowLiuTree {
    let mut tree = ChowLiuTree::new();
    let mut inserted: HashSet<&str> = HashSet::new();

    for edge in sorted_by_information(edges) {
        let (a, b) = (edge.a.as_str(), edge.b.as_str());
        if a == b || (inserted.contains(a) && inserted.contains(b)) {
            trace!("skipping {} - {} ({:.5})", a, b, edge.mi);
            continue;
        }

        let a_idx = tree.ensure_node(a);
        let b_idx = tree.ensure_node(b);
        // Reversing keeps `b` from getting a second parent.
        let (parent, child) = if tree.has_parent(b) {
            (b_idx, a_idx)
        } else {
            (a_idx, b_idx)
        };
        tree.graph.add_edge(parent, child, -edge.mi);
        trace!(
            "{} -> {} ({:.5})",
            tree.graph[parent],
            tree.graph[child],
            edge.mi
        );

        inserted.insert(a);
        inserted.insert(b);
    }

    tree
}

fn maximum_weight_spanning_tree(edges: &[MiEdge]) -> ChowLiuTree {
    let mut tree = ChowLiuTree::new();
    for edge in edges {
        tree.ensure_node(&edge.a);
        tree.ensure_node(&edge.b);
    }

    let mut components = DisjointSets::new(tree.node_count());
    let mut adjacency: HashMap<NodeIndex, Vec<(NodeIndex, f64)>> = HashMap::new();
    for edge in sorted_by_information(edges) {
        let (a, b) = (tree.nodes[&edge.a], tree.nodes[&edge.b]);
        if components.union(a.index(), b.index()) {
            trace!("spanning {} - {} ({:.5})", edge.a, edge.b, edge.mi);
            adjacency.entry(a).or_default().push((b, edge.mi));
            adjacency.entry(b).or_default().push((a, edge.mi));
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let roots: Vec<NodeIndex> = tree.graph.node_indices().collect();
    for root in roots {
        if !visited.insert(root) {
            continue;
        }
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            for &(next, mi) in adjacency.get(&node).into_iter().flatten() {
                if visited.insert(next) {
                    tree.graph.add_edge(node, next, -mi);
                    queue.push_back(next);
                }
            }
        }
    }

    tree
}

/// Union-find over dense indices, with union by rank and path halving.
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        DisjointSets {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets containing `a` and `b`. Returns `false` if they were already the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let mut a = self.find(a);
        let mut b = self.find(b);
        if a == b {
            return false;
        }
        if self.rank[a] < self.rank[b] {
            swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        if self.rank[a] == self.rank[b] {
            self.rank[a] += 1;
        }
        true
    }
}
