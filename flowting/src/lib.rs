//! # Flowting
//!
//! Client-side core of the Flowting persona/workflow tooling:
//!
//! - **flowting-stream**: incremental reader for the persona test event
//!   stream, with typed events, sinks, and cancellation
//! - **flowting-workflow**: workflow graph model with validation,
//!   execution ordering, and backend payload serialization
//!
//! ## Streaming a persona test
//!
//! ```rust,no_run
//! use flowting::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = PersonaClient::new(&ClientConfig::load()?)?;
//!
//!     let callbacks = StreamCallbacks::new()
//!         .chunk(|delta| print!("{}", delta))
//!         .error(|message| eprintln!("error: {}", message));
//!
//!     let handle = client
//!         .test_persona(TestPersonaInput::new("Hello!").persona_id("42"), callbacks)
//!         .await;
//!     handle.join().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Building a workflow
//!
//! ```rust
//! use flowting::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let graph = WorkflowGraph::new()
//!     .with_node(NodeSpec::start().id("S").build()?)?
//!     .with_node(NodeSpec::persona("abc").id("P1").build()?)?
//!     .with_node(NodeSpec::model("xyz").id("M1").build()?)?
//!     .with_node(NodeSpec::end().id("E").build()?)?
//!     .connect("S", "P1")?
//!     .connect("P1", "M1")?
//!     .connect("M1", "E")?;
//!
//! assert!(graph.validate().valid);
//! assert_eq!(graph.execution_order()?, vec!["P1", "M1"]);
//!
//! let payload = graph.to_backend_payload()?;
//! assert_eq!(payload.nodes.len(), 2);
//! # Ok(())
//! # }
//! ```

// Re-export all public APIs
pub use flowting_stream as stream;
pub use flowting_workflow as workflow;

// Re-export commonly used types
pub use flowting_stream::{
    ClientConfig, PersonaClient, ResponseAccumulator, StreamCallbacks, StreamEvent, StreamHandle,
    StreamOutcome, StreamSink, TestPersonaInput,
};
pub use flowting_workflow::{
    BackendPayload, NodeKind, NodeSpec, ValidationReport, WorkflowError, WorkflowGraph,
};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::stream::{
        AbortHandle, ClientConfig, PersonaClient, PersonaTester, ResponseAccumulator,
        StreamCallbacks, StreamEvent, StreamOutcome, StreamSink, TestPersonaInput,
    };
    pub use crate::workflow::{
        GraphSummary, KnowledgeBaseRef, NodeKind, NodeSpec, ValidationOptions, WorkflowGraph,
    };
    pub use anyhow::Result;
}
