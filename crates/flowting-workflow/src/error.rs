use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Malformed node construction input; the node never enters a graph.
    #[error("Invalid node spec: {0}")]
    InvalidNodeSpec(String),

    /// Nodes of one cycle among reasoning nodes, in edge order.
    #[error("Cycle detected among reasoning nodes: {}", .node_ids.join(" -> "))]
    CycleDetected { node_ids: Vec<String> },

    #[error("Workflow graph is not valid ({error_count} validation error(s))")]
    GraphNotValid { error_count: usize },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Edge would loop node {0} onto itself")]
    SelfLoop(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
