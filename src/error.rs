use thiserror::Error;

/// Errors that abort loading a textual workflow document.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("cannot parse file: {0}")]
    MalformedDocument(String),

    #[error("workflow document is missing required field '{field}'")]
    SemanticError { field: &'static str },
}

/// Non-fatal diagnostics produced while lowering a document.
///
/// Warnings never abort a load; the parser records them in the
/// [`ParseOutput`](crate::parser::ParseOutput) and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    #[error("action '{action}' references condition '{reference}', which is not declared")]
    UnresolvedAlias { action: String, reference: String },

    #[error("trigger declaration has unknown type '{trigger_type}' and was skipped")]
    UnknownTriggerType { trigger_type: String },

    #[error("condition '{name}' has unknown type '{condition_type}' and was skipped")]
    UnknownConditionType {
        name: String,
        condition_type: String,
    },
}

/// Errors that can occur while emitting the canonical textual form.
#[derive(Error, Debug, Clone)]
pub enum SerializeError {
    #[error("failed to emit workflow document: {0}")]
    Emit(String),
}

/// Errors returned by graph mutation operations.
///
/// A failed mutation leaves the graph unchanged; structural problems that
/// are representable in the graph are not errors but validation findings.
// `Display`/`Error` are implemented by hand below rather than derived via
// `thiserror`: the `SingleOutput` variant carries a field named `source`
// (the id of the source node), which `thiserror` would otherwise treat as the
// error's `std::error::Error::source()` and require to implement `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateTrigger { trigger_type: String },

    InvalidPlacement { kind: &'static str, edge_id: String },

    UnknownEdge(String),

    UnknownNode(String),

    SingleOutput { source: String },

    NoSelection,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateTrigger { trigger_type } => write!(
                f,
                "a '{trigger_type}' trigger already exists in this workflow"
            ),
            GraphError::InvalidPlacement { kind, edge_id } => {
                write!(f, "a {kind} node cannot be placed on edge '{edge_id}'")
            }
            GraphError::UnknownEdge(edge_id) => {
                write!(f, "edge '{edge_id}' does not exist in the graph")
            }
            GraphError::UnknownNode(node_id) => {
                write!(f, "node '{node_id}' does not exist in the graph")
            }
            GraphError::SingleOutput { source } => write!(
                f,
                "node '{source}' already has an outgoing connection; remove it before adding another"
            ),
            GraphError::NoSelection => write!(f, "no node is currently selected"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors that can occur when converting a custom front-end format into a
/// [`WorkflowDefinition`](crate::workflow::WorkflowDefinition).
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("invalid workflow data: {0}")]
    Invalid(String),
}
