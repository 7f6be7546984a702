use crate::adjacency::{build_adjacency_list, sort_adjacency};
use crate::error::WorkflowError;
use crate::graph::WorkflowGraph;
use crate::types::{non_blank, NodeKind};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    DuplicateNode,
    DanglingEdge,
    SelfLoop,
    CycleDetected,
    InvalidReference,
    MissingStart,
    MissingEnd,
    MultipleStart,
    MultipleEnd,
    StartHasPredecessor,
    EndHasSuccessor,
    InvalidKnowledgeBase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: ValidationCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn new(code: ValidationCode, node_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            node_id: node_id.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Every failed check, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn has(&self, code: ValidationCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    pub fn codes(&self) -> Vec<ValidationCode> {
        self.errors.iter().map(|issue| issue.code).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Also fail when the graph has no start or no end node.
    pub require_terminals: bool,
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self {
            require_terminals: true,
        }
    }
}

pub fn validate_graph(graph: &WorkflowGraph) -> ValidationReport {
    validate_graph_with(graph, ValidationOptions::default())
}

/// Runs all checks without short-circuiting.
pub fn validate_graph_with(graph: &WorkflowGraph, options: ValidationOptions) -> ValidationReport {
    let mut errors = Vec::new();

    check_duplicate_ids(graph, &mut errors);
    check_dangling_edges(graph, &mut errors);
    check_self_loops(graph, &mut errors);
    check_acyclic(graph, &mut errors);
    check_references(graph, &mut errors);
    check_terminals(graph, options, &mut errors);
    check_knowledge_bases(graph, &mut errors);

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_duplicate_ids(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for node in graph.nodes() {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            errors.push(ValidationIssue::new(
                ValidationCode::DuplicateNode,
                Some(node.id.as_str()),
                format!("Duplicate node id {}", node.id),
            ));
        }
    }
}

fn check_dangling_edges(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    for edge in graph.edges() {
        for endpoint in [&edge.source, &edge.target] {
            if !graph.contains_node(endpoint) {
                errors.push(ValidationIssue::new(
                    ValidationCode::DanglingEdge,
                    Some(endpoint.as_str()),
                    format!(
                        "Edge {} -> {} references missing node {}",
                        edge.source, edge.target, endpoint
                    ),
                ));
            }
        }
    }
}

fn check_self_loops(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    for edge in graph.edges().iter().filter(|edge| edge.is_self_loop()) {
        errors.push(ValidationIssue::new(
            ValidationCode::SelfLoop,
            Some(edge.source.as_str()),
            format!("Node {} connects to itself", edge.source),
        ));
    }
}

fn check_acyclic(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    if let Err(WorkflowError::CycleDetected { node_ids }) = sort_adjacency(&build_adjacency_list(graph)) {
        errors.push(ValidationIssue::new(
            ValidationCode::CycleDetected,
            node_ids.first().map(String::as_str),
            format!("Workflow contains a cycle: {}", node_ids.join(" -> ")),
        ));
    }
}

fn check_references(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        let persona = non_blank(node.persona_id.as_deref()).is_some();
        let model = non_blank(node.model_id.as_deref()).is_some();
        let message = match node.kind {
            NodeKind::Persona if !persona || model => "Persona node must reference exactly one persona",
            NodeKind::Model if !model || persona => "Model node must reference exactly one model",
            NodeKind::Start | NodeKind::End if persona || model => {
                "Start and end nodes cannot reference a persona or model"
            }
            _ => continue,
        };
        errors.push(ValidationIssue::new(
            ValidationCode::InvalidReference,
            Some(node.id.as_str()),
            format!("{message} ({})", node.id),
        ));
    }
}

fn check_terminals(graph: &WorkflowGraph, options: ValidationOptions, errors: &mut Vec<ValidationIssue>) {
    for (kind, missing, multiple) in [
        (NodeKind::Start, ValidationCode::MissingStart, ValidationCode::MultipleStart),
        (NodeKind::End, ValidationCode::MissingEnd, ValidationCode::MultipleEnd),
    ] {
        let terminals: Vec<_> = graph.nodes().iter().filter(|node| node.kind == kind).collect();
        match terminals.len() {
            0 if options.require_terminals => errors.push(ValidationIssue::new(
                missing,
                None,
                format!("Workflow must have a {} node", kind.as_str()),
            )),
            0 | 1 => {}
            _ => {
                for extra in &terminals[1..] {
                    errors.push(ValidationIssue::new(
                        multiple,
                        Some(extra.id.as_str()),
                        format!("Workflow has more than one {} node", kind.as_str()),
                    ));
                }
            }
        }
    }

    for edge in graph.edges() {
        if graph.node(&edge.target).is_some_and(|node| node.is_start()) {
            errors.push(ValidationIssue::new(
                ValidationCode::StartHasPredecessor,
                Some(edge.target.as_str()),
                format!("Start node {} cannot have incoming edges", edge.target),
            ));
        }
        if graph.node(&edge.source).is_some_and(|node| node.is_end()) {
            errors.push(ValidationIssue::new(
                ValidationCode::EndHasSuccessor,
                Some(edge.source.as_str()),
                format!("End node {} cannot have outgoing edges", edge.source),
            ));
        }
    }
}

fn check_knowledge_bases(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        if node.knowledge_bases.iter().any(|kb| kb.id.trim().is_empty()) {
            errors.push(ValidationIssue::new(
                ValidationCode::InvalidKnowledgeBase,
                Some(node.id.as_str()),
                format!("Node {} has a knowledge base without an id", node.id),
            ));
        }
    }
}
