pub mod adjacency;
pub mod error;
pub mod graph;
pub mod node;
pub mod payload;
pub mod summary;
pub mod types;
pub mod validation;

pub use adjacency::{build_adjacency_list, topological_sort, AdjacencyList};
pub use error::{Result, WorkflowError};
pub use graph::WorkflowGraph;
pub use node::{create_end_node, create_model_node, create_persona_node, create_start_node, NodeSpec};
pub use payload::{to_backend_payload, to_named_payload, DEFAULT_WORKFLOW_NAME};
pub use summary::GraphSummary;
pub use types::{
    BackendEdge, BackendNode, BackendPayload, KnowledgeBaseKind, KnowledgeBaseRef,
    NamedWorkflowPayload, NodeKind, Position, WorkflowEdge, WorkflowNode,
};
pub use validation::{
    validate_graph, validate_graph_with, ValidationCode, ValidationIssue, ValidationOptions,
    ValidationReport,
};

/// Execution plan for the reasoning nodes; same as [`topological_sort`].
pub fn execution_order(graph: &WorkflowGraph) -> Result<Vec<String>> {
    topological_sort(graph)
}
