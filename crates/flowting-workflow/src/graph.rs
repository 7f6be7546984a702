use crate::adjacency::topological_sort;
use crate::error::{Result, WorkflowError};
use crate::payload::to_backend_payload;
use crate::types::{BackendPayload, NodeKind, WorkflowEdge, WorkflowNode};
use crate::validation::{validate_graph, ValidationReport};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Framework-free workflow value owned by whatever edits it.
///
/// Mutations go through `add_node` / `add_edge` / `remove_*`, which keep
/// ids unique and edges pointing at existing nodes. `from_parts` skips
/// those checks so a saved canvas can be loaded and then validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> Result<()> {
        if self.contains_node(&node.id) {
            return Err(WorkflowError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Returns `false` when the edge already exists.
    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>) -> Result<bool> {
        let edge = WorkflowEdge::new(source, target);
        if edge.is_self_loop() {
            return Err(WorkflowError::SelfLoop(edge.source));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(WorkflowError::NodeNotFound(endpoint.clone()));
            }
        }
        if self.edges.contains(&edge) {
            debug!(source = %edge.source, target = %edge.target, "Ignoring duplicate edge");
            return Ok(false);
        }
        self.edges.push(edge);
        Ok(true)
    }

    /// Removes the node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<WorkflowNode> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        let node = self.nodes.remove(index);
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        debug!(node_id = id, removed_edges = before - self.edges.len(), "Removed node");
        Some(node)
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|edge| !(edge.source == source && edge.target == target));
        self.edges.len() != before
    }

    pub fn with_node(mut self, node: WorkflowNode) -> Result<Self> {
        self.add_node(node)?;
        Ok(self)
    }

    pub fn connect(mut self, source: impl Into<String>, target: impl Into<String>) -> Result<Self> {
        self.add_edge(source, target)?;
        Ok(self)
    }

    pub fn start_node(&self) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.kind == NodeKind::Start)
    }

    pub fn end_node(&self) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.kind == NodeKind::End)
    }

    pub fn reasoning_nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(|node| node.is_reasoning())
    }

    pub fn validate(&self) -> ValidationReport {
        validate_graph(self)
    }

    pub fn execution_order(&self) -> Result<Vec<String>> {
        topological_sort(self)
    }

    pub fn to_backend_payload(&self) -> Result<BackendPayload> {
        to_backend_payload(self)
    }
}
