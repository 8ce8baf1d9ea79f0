//! The component graph and its dependency ordering.
//!
//! Nodes and edges live in ordered maps so traversal is deterministic. The
//! graph can also be exported as Graphviz DOT through `petgraph`.

use std::collections::BTreeMap;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};

use scorpion_common::error::{Result, ScorpionError};
use scorpion_common::types::{ComponentId, LocalAlias};
use scorpion_common::value::ValueMap;

use crate::component::ComponentDescriptor;

/// One provisioned component: a workload or a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentInstance {
    /// Go import path of the constructor's package.
    pub package: String,
    /// Constructor function name.
    pub constructor: String,
    /// Argument struct type name.
    pub args_type: String,
    /// Logical path, used as the Pulumi resource name.
    pub name: String,
    /// Parameters, absent until some declaration supplies them.
    pub params: Option<ValueMap>,
    /// Workload node whose declaration supplied `params`.
    pub params_defined_by: Option<ComponentId>,
}

impl ComponentInstance {
    /// Creates a node without parameters.
    #[must_use]
    pub fn new(descriptor: &ComponentDescriptor, name: impl Into<String>) -> Self {
        Self {
            package: descriptor.package.clone(),
            constructor: descriptor.constructor.clone(),
            args_type: descriptor.args_type.clone(),
            name: name.into(),
            params: None,
            params_defined_by: None,
        }
    }
}

/// Nodes keyed by identifier, plus each node's outgoing edges keyed by local alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentGraph {
    /// Every node in the graph.
    pub nodes: BTreeMap<ComponentId, ComponentInstance>,
    /// Outgoing edges; absent for nodes with none.
    pub dependencies: BTreeMap<ComponentId, BTreeMap<LocalAlias, ComponentId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl ComponentGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outgoing edges of `id`, if any.
    #[must_use]
    pub fn dependencies_of(&self, id: &ComponentId) -> Option<&BTreeMap<LocalAlias, ComponentId>> {
        self.dependencies.get(id)
    }

    /// Calls `visitor` once per node, dependencies before dependents.
    ///
    /// Roots are taken in ascending identifier order and each node's
    /// dependencies in ascending alias order. Edge targets missing from
    /// `nodes` are still visited.
    ///
    /// # Errors
    ///
    /// Returns a cycle error naming the first node reached twice on the
    /// current path, or the first error returned by `visitor`.
    pub fn visit_in_dependency_order<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&ComponentId) -> Result<()>,
    {
        let mut marks = BTreeMap::new();
        for id in self.nodes.keys() {
            self.visit(id, &mut marks, &mut visitor)?;
        }
        Ok(())
    }

    fn visit<'a, F>(
        &'a self,
        id: &'a ComponentId,
        marks: &mut BTreeMap<&'a ComponentId, Mark>,
        visitor: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&ComponentId) -> Result<()>,
    {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(ScorpionError::Cycle {
                    node: id.to_string(),
                });
            }
            None => {}
        }
        let _ = marks.insert(id, Mark::InProgress);
        if let Some(deps) = self.dependencies.get(id) {
            for target in deps.values() {
                self.visit(target, marks, visitor)?;
            }
        }
        let _ = marks.insert(id, Mark::Done);
        visitor(id)
    }

    /// Collects the visitation order of [`Self::visit_in_dependency_order`].
    ///
    /// # Errors
    ///
    /// Returns a cycle error if the graph is not acyclic.
    pub fn dependency_order(&self) -> Result<Vec<ComponentId>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.visit_in_dependency_order(|id| {
            order.push(id.clone());
            Ok(())
        })?;
        Ok(order)
    }

    /// Renders the graph in Graphviz DOT format.
    ///
    /// Nodes are labelled with their logical names and edges with their
    /// aliases; edges point from dependent to dependency.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut graph: DiGraph<String, String> = DiGraph::new();
        let mut indices: BTreeMap<&ComponentId, NodeIndex> = BTreeMap::new();
        for (id, node) in &self.nodes {
            let _ = indices.insert(id, graph.add_node(node.name.clone()));
        }
        for (from, deps) in &self.dependencies {
            for (alias, to) in deps {
                let from_idx = *indices
                    .entry(from)
                    .or_insert_with(|| graph.add_node(from.to_string()));
                let to_idx = *indices
                    .entry(to)
                    .or_insert_with(|| graph.add_node(to.to_string()));
                let _ = graph.add_edge(from_idx, to_idx, alias.to_string());
            }
        }
        Dot::new(&graph).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> ComponentInstance {
        ComponentInstance {
            name: name.into(),
            ..ComponentInstance::default()
        }
    }

    fn graph(edges: &[(&str, &str, &str)], nodes: &[&str]) -> ComponentGraph {
        let mut g = ComponentGraph::new();
        for n in nodes {
            let _ = g.nodes.insert(ComponentId::new(*n), node(n));
        }
        for (from, alias, to) in edges {
            let _ = g
                .dependencies
                .entry(ComponentId::new(*from))
                .or_default()
                .insert(LocalAlias::new(*alias), ComponentId::new(*to));
        }
        g
    }

    fn names(order: &[ComponentId]) -> Vec<&str> {
        order.iter().map(ComponentId::as_str).collect()
    }

    #[test]
    fn empty_graph_visits_nothing() {
        let mut calls = 0;
        ComponentGraph::new()
            .visit_in_dependency_order(|_| {
                calls += 1;
                Ok(())
            })
            .expect("should succeed");
        assert_eq!(calls, 0);
    }

    #[test]
    fn diamond_is_post_order() {
        let g = graph(
            &[("a", "b", "b"), ("a", "c", "c"), ("b", "d", "d"), ("c", "d", "d")],
            &["a", "b", "c", "d"],
        );
        let order = g.dependency_order().expect("acyclic");
        assert_eq!(names(&order), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn dependencies_follow_alias_order_not_target_order() {
        let g = graph(&[("a", "first", "z"), ("a", "second", "y")], &["a", "y", "z"]);
        let order = g.dependency_order().expect("acyclic");
        assert_eq!(names(&order), vec!["z", "y", "a"]);
    }

    #[test]
    fn every_edge_points_backwards_in_order() {
        let g = graph(
            &[("w1", "db", "s"), ("w2", "db", "s"), ("w1", "c", "r"), ("r", "db", "s")],
            &["w1", "w2", "r", "s"],
        );
        let order = g.dependency_order().expect("acyclic");
        let pos = |n: &str| order.iter().position(|id| id.as_str() == n).expect(n);
        for (from, deps) in &g.dependencies {
            for to in deps.values() {
                assert!(pos(to.as_str()) < pos(from.as_str()), "{to} before {from}");
            }
        }
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn two_node_cycle_is_reported_at_root() {
        let g = graph(&[("a", "b", "b"), ("b", "a", "a")], &["a", "b"]);
        let err = g.dependency_order().expect_err("cycle");
        assert_eq!(err.to_string(), "cycle detected at node a");
    }

    #[test]
    fn cycle_never_visits_in_progress_nodes() {
        let g = graph(&[("a", "b", "b"), ("b", "c", "c"), ("c", "a", "a")], &["a", "b", "c"]);
        let mut visited = Vec::new();
        let result = g.visit_in_dependency_order(|id| {
            visited.push(id.clone());
            Ok(())
        });
        assert!(result.is_err());
        assert!(visited.is_empty(), "got: {visited:?}");
    }

    #[test]
    fn visitor_error_aborts_unchanged() {
        let g = graph(&[], &["a", "b"]);
        let mut calls = 0;
        let err = g
            .visit_in_dependency_order(|id| {
                calls += 1;
                Err(ScorpionError::MissingNode { id: id.to_string() })
            })
            .expect_err("visitor fails");
        assert_eq!(calls, 1);
        assert!(matches!(err, ScorpionError::MissingNode { ref id } if id == "a"));
    }

    #[test]
    fn missing_targets_are_still_visited() {
        let g = graph(&[("a", "ghost", "ghost")], &["a"]);
        let order = g.dependency_order().expect("acyclic");
        assert_eq!(names(&order), vec!["ghost", "a"]);
    }

    #[test]
    fn dot_output_names_nodes_and_aliases() {
        let g = graph(&[("a", "db", "b")], &["a", "b"]);
        let dot = g.to_dot();
        assert!(dot.starts_with("digraph {"), "got: {dot}");
        assert!(dot.contains("label = \"a\""), "got: {dot}");
        assert!(dot.contains("label = \"db\""), "got: {dot}");
        assert!(dot.trim_end().ends_with('}'));
    }
}
