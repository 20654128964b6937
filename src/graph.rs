//! Field dependency graph module.
//!
//! Provides the `FieldGraph` type: fields as nodes, declared-dependency
//! edges, cycle detection, topological ordering, and level batching. Built
//! once at registry-build time; evaluation order comes from here, never
//! from registration order.

use crate::error::CalcError;
use crate::field::Field;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A directed acyclic graph of field dependencies.
///
/// If field A depends on field B, B must be computed before A. Edges run
/// from dependency to dependent so that petgraph's topological sort yields
/// dependencies first.
///
/// # Examples
///
/// ```rust
/// use atscalc::graph::FieldGraph;
/// use atscalc::Field;
///
/// let mut graph = FieldGraph::new();
/// // INITIAL_AFS depends on ONHAND
/// graph.add_edge(Field::InitialAfs, Field::OnHand);
///
/// let order = graph.topological_sort().unwrap();
/// let onhand = order.iter().position(|f| *f == Field::OnHand).unwrap();
/// let afs = order.iter().position(|f| *f == Field::InitialAfs).unwrap();
/// assert!(onhand < afs);
/// ```
pub struct FieldGraph {
    graph: DiGraph<Field, ()>,
    node_map: HashMap<Field, NodeIndex>,
}

impl FieldGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node to the graph if it doesn't exist, returning its index.
    pub fn add_node(&mut self, field: Field) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&field) {
            idx
        } else {
            let idx = self.graph.add_node(field);
            self.node_map.insert(field, idx);
            idx
        }
    }

    /// Add a dependency edge: `dependent` depends on `dependency`.
    ///
    /// Both nodes are added automatically if missing.
    pub fn add_edge(&mut self, dependent: Field, dependency: Field) {
        let dependent_idx = self.add_node(dependent);
        let dependency_idx = self.add_node(dependency);
        self.graph.add_edge(dependency_idx, dependent_idx, ());
    }

    /// Check if a field is present in the graph.
    pub fn contains_node(&self, field: Field) -> bool {
        self.node_map.contains_key(&field)
    }

    /// All fields in the graph.
    pub fn nodes(&self) -> Vec<Field> {
        self.graph.node_indices().map(|idx| self.graph[idx]).collect()
    }

    /// Detect dependency cycles.
    ///
    /// Returns `Err(CalcError::Cycle)` carrying the cycle path when one is
    /// found.
    pub fn detect_cycles(&self) -> Result<(), CalcError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();

        for node_idx in self.graph.node_indices() {
            if !visited.contains(&node_idx) {
                let mut path = Vec::new();
                if let Some(cycle) =
                    self.dfs_cycle_detect(node_idx, &mut visited, &mut rec_stack, &mut path)
                {
                    return Err(cycle);
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle_detect(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<Field>,
    ) -> Option<CalcError> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(self.graph[node]);

        for neighbor in self
            .graph
            .neighbors_directed(node, petgraph::Direction::Outgoing)
        {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle_detect(neighbor, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                let neighbor_field = self.graph[neighbor];
                // Trim the path down to the cycle itself and close the loop.
                if let Some(start) = path.iter().position(|f| *f == neighbor_field) {
                    let mut cycle: Vec<Field> = path[start..].to_vec();
                    cycle.push(neighbor_field);
                    return Some(CalcError::Cycle { path: cycle });
                } else {
                    return Some(CalcError::Cycle {
                        path: vec![self.graph[node], neighbor_field, neighbor_field],
                    });
                }
            }
        }

        rec_stack.remove(&node);
        path.pop();
        None
    }

    /// Topological order of all fields, dependencies first.
    pub fn topological_sort(&self) -> Result<Vec<Field>, CalcError> {
        self.detect_cycles()?;

        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices.into_iter().map(|idx| self.graph[idx]).collect()),
            Err(cycle) => Err(CalcError::Cycle {
                path: vec![self.graph[cycle.node_id()]],
            }),
        }
    }

    /// Group fields into dependency levels.
    ///
    /// Every field's dependencies sit in a strictly earlier level, so fields
    /// within one level are mutually independent and a level can execute as
    /// one batch. Level membership is derived from the graph alone, never
    /// from registration order.
    pub fn batches(&self) -> Result<Vec<Vec<Field>>, CalcError> {
        let order = self.topological_sort()?;

        let mut level_of: HashMap<Field, usize> = HashMap::new();
        let mut levels: Vec<Vec<Field>> = Vec::new();

        for field in order {
            let idx = self.node_map[&field];
            let level = self
                .graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .map(|dep_idx| level_of[&self.graph[dep_idx]] + 1)
                .max()
                .unwrap_or(0);

            level_of.insert(field, level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(field);
        }

        // Deterministic order inside each batch.
        for batch in &mut levels {
            batch.sort_unstable();
        }

        Ok(levels)
    }
}

impl Default for FieldGraph {
    fn default() -> Self {
        Self::new()
    }
}
