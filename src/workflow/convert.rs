use super::definition::WorkflowDefinition;
use crate::error::ConversionError;

/// A trait for custom front-end formats that can be converted into a
/// [`WorkflowDefinition`].
///
/// The built-in YAML document format implements this, but any editor or
/// import pipeline with its own representation can provide a translation
/// layer the same way and then hand the result to the
/// [`WorkflowStore`](crate::graph::WorkflowStore).
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a workflow definition.
    fn into_workflow(self) -> Result<WorkflowDefinition, ConversionError>;
}
