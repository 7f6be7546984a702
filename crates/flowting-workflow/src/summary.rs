use crate::adjacency::{build_adjacency_list, sort_adjacency};
use crate::error::WorkflowError;
use crate::graph::WorkflowGraph;
use std::fmt;

/// Human-readable dump of a graph for logs and the example binaries.
pub struct GraphSummary<'a> {
    graph: &'a WorkflowGraph,
}

impl<'a> GraphSummary<'a> {
    pub fn new(graph: &'a WorkflowGraph) -> Self {
        Self { graph }
    }
}

fn short(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(index, _)| &id[..index])
}

impl fmt::Display for GraphSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Workflow: {} node(s), {} edge(s)",
            self.graph.nodes().len(),
            self.graph.edges().len()
        )?;

        writeln!(f, "Nodes:")?;
        for node in self.graph.nodes() {
            match node.reference() {
                Some(reference) => writeln!(f, "  {} [{}] -> {}", short(&node.id), node.kind.as_str(), reference)?,
                None => writeln!(f, "  {} [{}]", short(&node.id), node.kind.as_str())?,
            }
        }

        let adjacency = build_adjacency_list(self.graph);
        writeln!(f, "Adjacency:")?;
        for (source, targets) in adjacency.iter() {
            let targets: Vec<&str> = targets.iter().map(|t| short(t)).collect();
            writeln!(f, "  {} -> [{}]", short(source), targets.join(", "))?;
        }

        match sort_adjacency(&adjacency) {
            Ok(order) => {
                let order: Vec<&str> = order.iter().map(|id| short(id)).collect();
                write!(f, "Execution order: {}", order.join(" -> "))
            }
            Err(WorkflowError::CycleDetected { node_ids }) => {
                let cycle: Vec<&str> = node_ids.iter().map(|id| short(id)).collect();
                write!(f, "Cycle detected! {}", cycle.join(" -> "))
            }
            Err(err) => write!(f, "Execution order unavailable: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeSpec;
    use crate::types::WorkflowEdge;

    #[test]
    fn test_summary_lists_order() {
        let graph = WorkflowGraph::new()
            .with_node(NodeSpec::persona("abc").id("P1").build().unwrap())
            .and_then(|g| g.with_node(NodeSpec::model("xyz").id("M1").build().unwrap()))
            .and_then(|g| g.connect("P1", "M1"))
            .unwrap();

        let text = GraphSummary::new(&graph).to_string();
        assert!(text.starts_with("Workflow: 2 node(s), 1 edge(s)"));
        assert!(text.contains("  P1 [persona] -> abc"));
        assert!(text.contains("  P1 -> [M1]"));
        assert!(text.ends_with("Execution order: P1 -> M1"));
    }

    #[test]
    fn test_summary_marks_cycles_and_shortens_ids() {
        let a = "aaaaaaaa-1111-4000-8000-000000000000";
        let b = "bbbbbbbb-2222-4000-8000-000000000000";
        let graph = WorkflowGraph::from_parts(
            vec![
                NodeSpec::persona("abc").id(a).build().unwrap(),
                NodeSpec::persona("abc").id(b).build().unwrap(),
            ],
            vec![WorkflowEdge::new(a, b), WorkflowEdge::new(b, a)],
        );

        let text = GraphSummary::new(&graph).to_string();
        assert!(text.contains("  aaaaaaaa -> [bbbbbbbb]"));
        assert!(text.ends_with("Cycle detected! aaaaaaaa -> bbbbbbbb"));
    }
}
