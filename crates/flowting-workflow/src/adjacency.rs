use crate::error::{Result, WorkflowError};
use crate::graph::WorkflowGraph;
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Reasoning-node adjacency in node insertion order.
///
/// Every reasoning node has an entry, possibly empty. Edges touching a
/// start/end node or an unknown id are left out, as are repeated edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyList {
    list: IndexMap<String, Vec<String>>,
}

impl AdjacencyList {
    pub fn successors(&self, node_id: &str) -> &[String] {
        self.list.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.list.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.list.iter()
    }

    fn in_degrees(&self) -> IndexMap<&str, usize> {
        let mut degrees: IndexMap<&str, usize> =
            self.list.keys().map(|id| (id.as_str(), 0)).collect();
        for targets in self.list.values() {
            for target in targets {
                if let Some(degree) = degrees.get_mut(target.as_str()) {
                    *degree += 1;
                }
            }
        }
        degrees
    }
}

pub fn build_adjacency_list(graph: &WorkflowGraph) -> AdjacencyList {
    let mut list: IndexMap<String, Vec<String>> = IndexMap::new();
    for node in graph.reasoning_nodes() {
        list.entry(node.id.clone()).or_default();
    }

    for edge in graph.edges() {
        if !list.contains_key(&edge.target) {
            continue;
        }
        if let Some(targets) = list.get_mut(&edge.source) {
            if !targets.contains(&edge.target) {
                targets.push(edge.target.clone());
            }
        }
    }

    AdjacencyList { list }
}

/// Kahn's algorithm over the reasoning subgraph.
///
/// Zero in-degree nodes are released in node insertion order, so a graph
/// without edges sorts to its insertion order.
pub fn topological_sort(graph: &WorkflowGraph) -> Result<Vec<String>> {
    sort_adjacency(&build_adjacency_list(graph))
}

pub(crate) fn sort_adjacency(adjacency: &AdjacencyList) -> Result<Vec<String>> {
    let mut in_degree = adjacency.in_degrees();
    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(adjacency.len());

    while let Some(node_id) = queue.pop_front() {
        order.push(node_id.to_string());
        for target in adjacency.successors(node_id) {
            if let Some(degree) = in_degree.get_mut(target.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target.as_str());
                }
            }
        }
    }

    if order.len() == adjacency.len() {
        return Ok(order);
    }

    let remaining: Vec<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree > 0)
        .map(|(id, _)| *id)
        .collect();
    Err(WorkflowError::CycleDetected {
        node_ids: find_cycle(adjacency, &remaining),
    })
}

/// Walks predecessors among the unsorted nodes until one repeats.
///
/// Every unsorted node keeps an unsorted predecessor, so the walk always
/// closes a cycle. The result is rotated to start at its earliest node.
fn find_cycle(adjacency: &AdjacencyList, remaining: &[&str]) -> Vec<String> {
    let Some(&first) = remaining.first() else {
        return Vec::new();
    };

    let mut path: Vec<&str> = vec![first];
    let mut current = first;
    loop {
        let Some(prev) = predecessor(adjacency, remaining, current) else {
            return remaining.iter().map(|id| id.to_string()).collect();
        };
        if let Some(pos) = path.iter().position(|id| *id == prev) {
            let mut cycle: Vec<&str> = path[pos..].to_vec();
            cycle.reverse();
            let start = cycle
                .iter()
                .enumerate()
                .min_by_key(|&(_, id)| remaining.iter().position(|r| r == id))
                .map(|(index, _)| index)
                .unwrap_or(0);
            cycle.rotate_left(start);
            return cycle.into_iter().map(str::to_string).collect();
        }
        path.push(prev);
        current = prev;
    }
}

fn predecessor<'a>(adjacency: &AdjacencyList, remaining: &[&'a str], node_id: &str) -> Option<&'a str> {
    remaining
        .iter()
        .copied()
        .find(|candidate| adjacency.successors(candidate).iter().any(|t| t == node_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{create_end_node, NodeSpec};
    use crate::types::{WorkflowEdge, WorkflowNode};

    fn persona(id: &str) -> WorkflowNode {
        NodeSpec::persona("abc").id(id).build().unwrap()
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> WorkflowGraph {
        WorkflowGraph::from_parts(
            ids.iter().map(|id| persona(id)).collect(),
            edges.iter().map(|(s, t)| WorkflowEdge::new(*s, *t)).collect(),
        )
    }

    #[test]
    fn test_adjacency_excludes_terminals_and_unknown_nodes() {
        let end = NodeSpec::end().id("E").build().unwrap();
        let g = WorkflowGraph::from_parts(
            vec![persona("A"), persona("B"), end],
            vec![
                WorkflowEdge::new("A", "B"),
                WorkflowEdge::new("A", "ghost"),
                WorkflowEdge::new("A", "B"),
                WorkflowEdge::new("B", "E"),
            ],
        );

        let adjacency = build_adjacency_list(&g);
        assert_eq!(adjacency.len(), 2);
        assert_eq!(adjacency.successors("A"), &["B".to_string()]);
        assert!(adjacency.successors("B").is_empty());
        assert!(!adjacency.contains("E"));
    }

    #[test]
    fn test_sort_without_edges_keeps_insertion_order() {
        let g = graph(&["N1", "N2", "N3"], &[]);
        assert_eq!(topological_sort(&g).unwrap(), vec!["N1", "N2", "N3"]);
    }

    #[test]
    fn test_sort_respects_edges_and_ties() {
        let g = graph(&["C", "A", "B", "D"], &[("A", "C"), ("B", "C"), ("C", "D")]);
        assert_eq!(topological_sort(&g).unwrap(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_sort_ignores_terminal_edges() {
        let start = NodeSpec::start().id("S").build().unwrap();
        let mut nodes = vec![start, persona("P1"), persona("P2")];
        nodes.push(create_end_node());
        let g = WorkflowGraph::from_parts(
            nodes,
            vec![WorkflowEdge::new("S", "P2"), WorkflowEdge::new("P2", "P1")],
        );

        assert_eq!(topological_sort(&g).unwrap(), vec!["P2", "P1"]);
    }

    #[test]
    fn test_cycle_is_reported_in_edge_order() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let err = topological_sort(&g).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::CycleDetected {
                node_ids: vec!["A".into(), "B".into(), "C".into()]
            }
        );
    }

    #[test]
    fn test_cycle_behind_acyclic_prefix() {
        let g = graph(
            &["X", "A", "B", "Y"],
            &[("X", "A"), ("A", "B"), ("B", "A"), ("B", "Y")],
        );
        let err = topological_sort(&g).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::CycleDetected {
                node_ids: vec!["A".into(), "B".into()]
            }
        );
    }
}
