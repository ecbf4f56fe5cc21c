use super::Violation;
use crate::workflow::{StepNode, TaskKind, WorkflowDefinition};

/// Checks one node's structural rules, returning the first violated
/// rule's reason.
pub fn validate_node(node: &StepNode) -> Result<(), String> {
    match node {
        StepNode::Task(task) => {
            if task.name.trim().is_empty() {
                return Err("task name must not be empty".to_string());
            }
            Ok(())
        }
        StepNode::Condition(condition) => {
            if condition.branch.is_empty() {
                return Err("branch must contain at least one action".to_string());
            }
            for child in &condition.branch {
                if !child.is_action_task() {
                    return Err("branch may only hold actions".to_string());
                }
            }
            Ok(())
        }
        StepNode::Loop(l) => {
            for child in &l.body {
                if !matches!(child, StepNode::Condition(_)) {
                    return Err("container may only hold conditions".to_string());
                }
            }
            Ok(())
        }
    }
}

/// The whole-graph ordering rule: once an action-tagged task appears in
/// the root sequence, no step-tagged task may follow it. The rule scans
/// the top level only; loop and condition bodies are a deliberate scope
/// limit.
pub(super) fn steps_after_actions(workflow: &WorkflowDefinition) -> Option<Violation> {
    let mut seen_action = false;
    for node in &workflow.sequence {
        if let StepNode::Task(task) = node {
            match task.kind {
                TaskKind::Action => seen_action = true,
                TaskKind::Step if seen_action => {
                    return Some(Violation::structural(
                        node.id_string(),
                        "steps cannot come after actions",
                    ));
                }
                TaskKind::Step => {}
            }
        }
    }
    None
}
