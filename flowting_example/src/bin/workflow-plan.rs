use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flowting_example::init_logging;
use flowting_stream::ClientConfig;
use flowting_workflow::{
    to_named_payload, validate_graph_with, GraphSummary, KnowledgeBaseRef, NodeSpec,
    ValidationOptions, WorkflowGraph,
};

/// Validate a workflow graph and print its backend payload.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Saved canvas JSON; a sample research workflow is planned when omitted
    graph: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()?;
    init_logging(&config);

    let graph = match args.graph {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid workflow JSON in {}", path.display()))?
        }
        None => sample_graph()?,
    };

    println!("{}\n", GraphSummary::new(&graph));

    let report = validate_graph_with(&graph, ValidationOptions::strict());
    if !report.valid {
        println!("Validation failed:");
        for issue in &report.errors {
            println!("  - {}", issue);
        }
        std::process::exit(1);
    }

    let payload = to_named_payload(&graph, "Research pipeline", Some("Sample generated by workflow-plan"))?;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

fn sample_graph() -> Result<WorkflowGraph> {
    let start = NodeSpec::start().position(0.0, 200.0).build()?;
    let researcher = NodeSpec::persona("researcher")
        .knowledge_base(KnowledgeBaseRef::chat("kickoff-chat"))
        .position(250.0, 120.0)
        .build()?;
    let critic = NodeSpec::persona("critic")
        .knowledge_base(KnowledgeBaseRef::pin("style-guide").with_instruction("Follow the house style"))
        .position(250.0, 280.0)
        .build()?;
    let writer = NodeSpec::model("gpt-4o").position(500.0, 200.0).build()?;
    let end = NodeSpec::end().position(750.0, 200.0).build()?;

    let graph = WorkflowGraph::new()
        .with_node(start.clone())?
        .with_node(researcher.clone())?
        .with_node(critic.clone())?
        .with_node(writer.clone())?
        .with_node(end.clone())?
        .connect(&start.id, &researcher.id)?
        .connect(&start.id, &critic.id)?
        .connect(&researcher.id, &writer.id)?
        .connect(&critic.id, &writer.id)?
        .connect(&writer.id, &end.id)?;

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_path_is_optional() {
        let args = Args::try_parse_from(["workflow-plan"]).unwrap();
        assert!(args.graph.is_none());

        let args = Args::try_parse_from(["workflow-plan", "saved/canvas.json"]).unwrap();
        assert_eq!(args.graph, Some(PathBuf::from("saved/canvas.json")));
    }

    #[test]
    fn test_sample_graph_is_valid() {
        let graph = sample_graph().unwrap();
        assert!(validate_graph_with(&graph, ValidationOptions::strict()).valid);
    }
}
