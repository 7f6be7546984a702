mod node;
mod payload;

pub use node::{
    KnowledgeBaseKind, KnowledgeBaseRef, NodeKind, Position, WorkflowEdge, WorkflowNode,
};
pub use payload::{BackendEdge, BackendNode, BackendPayload, NamedWorkflowPayload};

pub(crate) use node::non_blank;
