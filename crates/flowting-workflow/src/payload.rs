use crate::adjacency::build_adjacency_list;
use crate::error::{Result, WorkflowError};
use crate::graph::WorkflowGraph;
use crate::types::{non_blank, BackendEdge, BackendNode, BackendPayload, NamedWorkflowPayload, NodeKind};
use crate::validation::validate_graph;
use tracing::debug;

pub const DEFAULT_WORKFLOW_NAME: &str = "Untitled Workflow";

/// Serializes the reasoning subgraph, refusing graphs that fail validation.
///
/// Nodes keep their insertion order and edges keep theirs; start/end
/// nodes and any edge touching them are left out.
pub fn to_backend_payload(graph: &WorkflowGraph) -> Result<BackendPayload> {
    let report = validate_graph(graph);
    if !report.valid {
        debug!(error_count = report.errors.len(), "Refusing to serialize invalid workflow");
        return Err(WorkflowError::GraphNotValid {
            error_count: report.errors.len(),
        });
    }

    let nodes = graph
        .reasoning_nodes()
        .map(|node| BackendNode {
            id: node.id.clone(),
            persona_id: match node.kind {
                NodeKind::Persona => non_blank(node.persona_id.as_deref()).map(str::to_string),
                _ => None,
            },
            model_id: match node.kind {
                NodeKind::Model => non_blank(node.model_id.as_deref()).map(str::to_string),
                _ => None,
            },
            knowledge_base_ids: node.knowledge_base_ids(),
        })
        .collect();

    let adjacency = build_adjacency_list(graph);
    let mut edges: Vec<BackendEdge> = Vec::new();
    for edge in graph.edges() {
        if !adjacency.successors(&edge.source).contains(&edge.target) {
            continue;
        }
        let backend_edge = BackendEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
        };
        if !edges.contains(&backend_edge) {
            edges.push(backend_edge);
        }
    }

    Ok(BackendPayload { nodes, edges })
}

/// Payload for saving a workflow under a name.
///
/// A blank name falls back to [`DEFAULT_WORKFLOW_NAME`]; a blank
/// description is dropped.
pub fn to_named_payload(
    graph: &WorkflowGraph,
    name: &str,
    description: Option<&str>,
) -> Result<NamedWorkflowPayload> {
    let name = match name.trim() {
        "" => DEFAULT_WORKFLOW_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };
    let description = non_blank(description).map(|d| d.trim().to_string());

    Ok(NamedWorkflowPayload {
        name,
        description,
        graph: to_backend_payload(graph)?,
    })
}
