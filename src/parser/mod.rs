//! Textual form → definition model.
//!
//! Parsing is a single left-to-right pass: steps are lowered first, then
//! each declared action, resolving `if` guards against the conditions
//! emitted so far. Fatal problems (undecodable text, missing required
//! fields) abort the load; everything else is recorded as a warning and
//! the pass keeps going.

pub(crate) mod lowering;

use crate::document::WorkflowFile;
use crate::error::{ParseError, ParseWarning};
use crate::workflow::WorkflowDefinition;

/// The result of a successful parse: the definition plus any non-fatal
/// diagnostics collected along the way.
#[derive(Debug)]
pub struct ParseOutput {
    pub workflow: WorkflowDefinition,
    pub warnings: Vec<ParseWarning>,
}

/// Parses a textual workflow document into a [`WorkflowDefinition`].
///
/// Fails with [`ParseError::MalformedDocument`] when the text is not
/// well-formed YAML, and with [`ParseError::SemanticError`] when the
/// `workflow`/`alert` wrapper, the `id`, or both step collections are
/// absent.
pub fn parse(text: &str) -> Result<ParseOutput, ParseError> {
    let file: WorkflowFile =
        serde_yaml::from_str(text).map_err(|e| ParseError::MalformedDocument(e.to_string()))?;
    let doc = file
        .into_payload()
        .ok_or(ParseError::SemanticError { field: "workflow" })?;
    lowering::lower(doc)
}
