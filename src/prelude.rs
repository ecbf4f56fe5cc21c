//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions so an editor or
//! import pipeline can pull the whole surface in with one `use`.

// Parsing and serialization
pub use crate::parser::{ParseOutput, parse};
pub use crate::serializer::serialize;

// Definition model
pub use crate::workflow::{
    AlertFilter, Condition, ConditionKind, IntoWorkflow, Loop, NodeId, StepNode, Task, TaskKind,
    Trigger, WorkflowDefinition,
};

// Graph editing
pub use crate::graph::{
    Container, EdgeHandle, GraphEdge, GraphNode, GraphNodeKind, GraphView, NodeSpec,
    ValidationState, WorkflowStore,
};

// Validation
pub use crate::validation::{
    Violation, ViolationCategory, can_deploy, collect_violations, validate_graph, validate_node,
};

// Provider catalog
pub use crate::catalog::{ProviderCatalog, ProviderInfo};

// Error types
pub use crate::error::{GraphError, ParseError, ParseWarning, SerializeError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
