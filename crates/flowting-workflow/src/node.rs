use crate::error::{Result, WorkflowError};
use crate::types::{KnowledgeBaseRef, NodeKind, Position, WorkflowNode};
use uuid::Uuid;

/// Builder for a single workflow node.
///
/// `build()` enforces the reference rule: persona nodes carry exactly a
/// `persona_id`, model nodes exactly a `model_id`, and start/end nodes
/// carry neither. A missing id is generated with uuid v4.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    kind: NodeKind,
    id: Option<String>,
    persona_id: Option<String>,
    model_id: Option<String>,
    knowledge_bases: Vec<KnowledgeBaseRef>,
    position: Position,
}

impl NodeSpec {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            persona_id: None,
            model_id: None,
            knowledge_bases: Vec::new(),
            position: Position::default(),
        }
    }

    pub fn start() -> Self {
        Self::new(NodeKind::Start)
    }

    pub fn end() -> Self {
        Self::new(NodeKind::End)
    }

    pub fn persona(persona_id: impl Into<String>) -> Self {
        Self::new(NodeKind::Persona).persona_id(persona_id)
    }

    pub fn model(model_id: impl Into<String>) -> Self {
        Self::new(NodeKind::Model).model_id(model_id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn persona_id(mut self, persona_id: impl Into<String>) -> Self {
        self.persona_id = Some(persona_id.into());
        self
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn knowledge_base(mut self, knowledge_base: KnowledgeBaseRef) -> Self {
        self.knowledge_bases.push(knowledge_base);
        self
    }

    pub fn knowledge_bases(mut self, knowledge_bases: impl IntoIterator<Item = KnowledgeBaseRef>) -> Self {
        self.knowledge_bases.extend(knowledge_bases);
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn build(self) -> Result<WorkflowNode> {
        let id = match self.id {
            Some(id) => {
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(WorkflowError::InvalidNodeSpec("node id is empty".to_string()));
                }
                trimmed.to_string()
            }
            None => Uuid::new_v4().to_string(),
        };

        let persona_id = normalize_reference("personaId", self.persona_id)?;
        let model_id = normalize_reference("modelId", self.model_id)?;

        match (self.kind, &persona_id, &model_id) {
            (NodeKind::Persona, Some(_), None) | (NodeKind::Model, None, Some(_)) => {}
            (NodeKind::Start | NodeKind::End, None, None) => {}
            (NodeKind::Persona, None, _) => {
                return Err(invalid(&id, "persona node requires a personaId"));
            }
            (NodeKind::Model, _, None) => {
                return Err(invalid(&id, "model node requires a modelId"));
            }
            (NodeKind::Persona | NodeKind::Model, Some(_), Some(_)) => {
                return Err(invalid(&id, "node must not set both personaId and modelId"));
            }
            (kind, _, _) => {
                return Err(invalid(
                    &id,
                    &format!("{} node must not reference a persona or model", kind.as_str()),
                ));
            }
        }

        let mut knowledge_bases: Vec<KnowledgeBaseRef> = Vec::with_capacity(self.knowledge_bases.len());
        for mut kb in self.knowledge_bases {
            let kb_id = kb.id.trim();
            if kb_id.is_empty() {
                return Err(invalid(&id, "knowledge base id is empty"));
            }
            kb.id = kb_id.to_string();
            if !knowledge_bases.iter().any(|existing| existing.id == kb.id) {
                knowledge_bases.push(kb);
            }
        }

        Ok(WorkflowNode {
            id,
            kind: self.kind,
            persona_id,
            model_id,
            knowledge_bases,
            position: self.position,
        })
    }
}

fn normalize_reference(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(WorkflowError::InvalidNodeSpec(format!("{field} is empty")))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

fn invalid(node_id: &str, reason: &str) -> WorkflowError {
    WorkflowError::InvalidNodeSpec(format!("{reason} (node {node_id})"))
}

pub fn create_start_node() -> WorkflowNode {
    WorkflowNode {
        id: Uuid::new_v4().to_string(),
        kind: NodeKind::Start,
        persona_id: None,
        model_id: None,
        knowledge_bases: Vec::new(),
        position: Position::default(),
    }
}

pub fn create_end_node() -> WorkflowNode {
    WorkflowNode {
        kind: NodeKind::End,
        ..create_start_node()
    }
}

pub fn create_persona_node(
    persona_id: impl Into<String>,
    knowledge_bases: impl IntoIterator<Item = KnowledgeBaseRef>,
) -> Result<WorkflowNode> {
    NodeSpec::persona(persona_id).knowledge_bases(knowledge_bases).build()
}

pub fn create_model_node(
    model_id: impl Into<String>,
    knowledge_bases: impl IntoIterator<Item = KnowledgeBaseRef>,
) -> Result<WorkflowNode> {
    NodeSpec::model(model_id).knowledge_bases(knowledge_bases).build()
}
