//! The two-level rule engine the editor runs after every mutation.
//!
//! Per-node rules check one node's own structure; whole-graph rules check
//! ordering across the root sequence. [`validate_graph`] is the pure
//! deploy gate: depth-first in document order, stopping at the first
//! failing node. [`collect_violations`] is the exhaustive store-facing
//! pass that also records root-level metadata findings and
//! missing-provider annotations.

mod rules;

use serde::Serialize;

use crate::catalog::ProviderCatalog;
use crate::workflow::{StepNode, WorkflowDefinition};

pub use rules::validate_node;

/// Map key for root-level name findings.
pub const WORKFLOW_NAME_KEY: &str = "workflow_name";
/// Map key for root-level description findings.
pub const WORKFLOW_DESCRIPTION_KEY: &str = "workflow_description";

/// How a violation affects deployability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// A structural rule failed; blocks deployment.
    Structural,
    /// Root-level metadata is missing; blocks deployment.
    Metadata,
    /// The task's provider type is not installed; never blocks deployment.
    MissingProvider,
}

/// One recorded rule failure, keyed by the offending node's id or one of
/// the root-level sentinel keys.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub subject: String,
    pub reason: String,
    pub category: ViolationCategory,
}

impl Violation {
    pub fn structural(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            subject: subject.into(),
            reason: reason.into(),
            category: ViolationCategory::Structural,
        }
    }

    pub fn metadata(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            subject: subject.into(),
            reason: reason.into(),
            category: ViolationCategory::Metadata,
        }
    }

    pub fn missing_provider(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            subject: subject.into(),
            reason: reason.into(),
            category: ViolationCategory::MissingProvider,
        }
    }
}

/// Validates the whole graph, stopping at the first failing node.
///
/// Node rules run depth-first in document order; if every node passes,
/// the whole-graph ordering rule runs over the top-level sequence.
pub fn validate_graph(workflow: &WorkflowDefinition) -> Result<(), Violation> {
    fn check_nodes(nodes: &[StepNode]) -> Result<(), Violation> {
        for node in nodes {
            validate_node(node)
                .map_err(|reason| Violation::structural(node.id_string(), reason))?;
            check_nodes(node.children())?;
        }
        Ok(())
    }
    check_nodes(&workflow.sequence)?;

    match rules::steps_after_actions(workflow) {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// The exhaustive pass backing the store's validation map: every per-node
/// failure, the whole-graph ordering rule, root-level metadata findings,
/// and missing-provider annotations for the catalog.
pub fn collect_violations(
    workflow: &WorkflowDefinition,
    catalog: &ProviderCatalog,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    workflow.walk(&mut |node| {
        if let Err(reason) = validate_node(node) {
            violations.push(Violation::structural(node.id_string(), reason));
        }
    });

    if let Some(violation) = rules::steps_after_actions(workflow) {
        violations.push(violation);
    }

    if workflow.name.trim().is_empty() {
        violations.push(Violation::metadata(
            WORKFLOW_NAME_KEY,
            "workflow name is required",
        ));
    }
    if workflow.description.trim().is_empty() {
        violations.push(Violation::metadata(
            WORKFLOW_DESCRIPTION_KEY,
            "workflow description is required",
        ));
    }

    workflow.walk(&mut |node| {
        if let StepNode::Task(task) = node {
            if !catalog.contains(&task.provider_type) {
                violations.push(Violation::missing_provider(
                    node.id_string(),
                    format!("provider '{}' is not installed", task.provider_type),
                ));
            }
        }
    });

    violations
}

/// True when every recorded violation belongs to an allow-listed category.
pub fn can_deploy(violations: &[Violation]) -> bool {
    violations
        .iter()
        .all(|v| v.category == ViolationCategory::MissingProvider)
}
