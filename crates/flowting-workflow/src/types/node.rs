use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    End,
    Persona,
    Model,
}

impl NodeKind {
    /// Persona and model nodes are the actual inference steps.
    pub fn is_reasoning(self) -> bool {
        matches!(self, NodeKind::Persona | NodeKind::Model)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_reasoning()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Persona => "persona",
            NodeKind::Model => "model",
        }
    }
}

/// Canvas coordinates; never read by the graph algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeBaseKind {
    Chat,
    Pin,
}

/// A chat or pin attached to a node as extra context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseRef {
    pub kind: KnowledgeBaseKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl KnowledgeBaseRef {
    pub fn chat(id: impl Into<String>) -> Self {
        Self {
            kind: KnowledgeBaseKind::Chat,
            id: id.into(),
            instruction: None,
        }
    }

    pub fn pin(id: impl Into<String>) -> Self {
        Self {
            kind: KnowledgeBaseKind::Pin,
            id: id.into(),
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default)]
    pub knowledge_bases: Vec<KnowledgeBaseRef>,
    #[serde(default)]
    pub position: Position,
}

impl WorkflowNode {
    pub fn is_reasoning(&self) -> bool {
        self.kind.is_reasoning()
    }

    pub fn is_start(&self) -> bool {
        self.kind == NodeKind::Start
    }

    pub fn is_end(&self) -> bool {
        self.kind == NodeKind::End
    }

    /// Whichever of `persona_id` / `model_id` is set and non-blank.
    pub fn reference(&self) -> Option<&str> {
        non_blank(self.persona_id.as_deref()).or_else(|| non_blank(self.model_id.as_deref()))
    }

    pub fn knowledge_base_ids(&self) -> Vec<String> {
        self.knowledge_bases.iter().map(|kb| kb.id.clone()).collect()
    }
}

/// Directed `(source, target)` pair between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: String,
    pub target: String,
}

impl WorkflowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
