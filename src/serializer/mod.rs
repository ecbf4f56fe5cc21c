//! Definition model → canonical textual form.
//!
//! The inverse of parsing. Branch and loop structure is flattened back
//! into `steps`/`actions` entries: the first action of a condition's true
//! branch carries the reconstructed inline `condition` list and every
//! later action in the same branch references it through an `if` guard,
//! so re-parsing the output rebuilds the same structure. Field order is
//! fixed by the [`document`](crate::document) structs, which makes
//! repeated serialization of an unchanged definition stable.

use crate::document::{
    ActionDoc, ConditionDoc, FilterDoc, ProviderDoc, StepDoc, TriggerDoc, WorkflowDoc,
    WorkflowFile,
};
use crate::error::SerializeError;
use crate::workflow::{Condition, ConditionKind, StepNode, Task, Trigger, WorkflowDefinition};

/// Serializes a definition into the canonical textual document.
///
/// Total over any definition that passes the validator; the only failure
/// mode is a YAML emitter error, which valid definitions cannot trigger.
pub fn serialize(workflow: &WorkflowDefinition) -> Result<String, SerializeError> {
    let file = WorkflowFile {
        workflow: Some(build_doc(workflow)),
        alert: None,
    };
    serde_yaml::to_string(&file).map_err(|e| SerializeError::Emit(e.to_string()))
}

fn build_doc(workflow: &WorkflowDefinition) -> WorkflowDoc {
    let mut steps = Vec::new();
    let mut actions = Vec::new();
    for node in &workflow.sequence {
        emit_node(node, None, &mut steps, &mut actions);
    }

    let consts = if workflow.consts.is_empty() {
        None
    } else {
        Some(
            workflow
                .consts
                .iter()
                .map(|(k, v)| {
                    (
                        serde_yaml::Value::String(k.clone()),
                        serde_yaml::Value::String(v.clone()),
                    )
                })
                .collect(),
        )
    };

    // The step collections are always emitted, even empty, so the output
    // re-parses without hitting the missing-collection semantic error.
    WorkflowDoc {
        id: Some(workflow.id.clone()),
        name: Some(workflow.name.clone()),
        description: Some(workflow.description.clone()),
        disabled: Some(workflow.disabled),
        consts,
        triggers: Some(workflow.triggers.iter().map(trigger_doc).collect()),
        steps: Some(steps),
        actions: Some(actions),
    }
}

fn emit_node(
    node: &StepNode,
    loop_source: Option<&str>,
    steps: &mut Vec<StepDoc>,
    actions: &mut Vec<ActionDoc>,
) {
    match node {
        StepNode::Task(task) if task.is_step() => steps.push(step_doc(task)),
        StepNode::Task(task) => actions.push(action_doc(task, None, None, loop_source)),
        StepNode::Condition(condition) => emit_condition(condition, loop_source, actions),
        StepNode::Loop(l) => {
            for child in &l.body {
                emit_node(child, Some(&l.source), steps, actions);
            }
        }
    }
}

fn emit_condition(condition: &Condition, loop_source: Option<&str>, actions: &mut Vec<ActionDoc>) {
    let mut first = true;
    for child in &condition.branch {
        // Only action tasks are expressible in the textual form; anything
        // else in a branch is a validation finding, not serializer input.
        let StepNode::Task(task) = child else {
            continue;
        };
        if first {
            actions.push(action_doc(
                task,
                Some(vec![condition_doc(condition)]),
                None,
                loop_source,
            ));
            first = false;
        } else {
            let guard = format!("{{{{ {} }}}}", condition.alias_or_name());
            actions.push(action_doc(task, None, Some(guard), loop_source));
        }
    }
}

fn condition_doc(condition: &Condition) -> ConditionDoc {
    match &condition.kind {
        ConditionKind::Threshold { value, compare_to } => ConditionDoc {
            condition_type: "threshold".to_string(),
            name: condition.name.clone(),
            value: Some(serde_yaml::Value::String(value.clone())),
            compare_to: Some(serde_yaml::Value::String(compare_to.clone())),
            assert: None,
        },
        ConditionKind::Assert { assert } => ConditionDoc {
            condition_type: "assert".to_string(),
            name: condition.name.clone(),
            value: None,
            compare_to: None,
            assert: Some(assert.clone()),
        },
    }
}

fn step_doc(task: &Task) -> StepDoc {
    StepDoc {
        name: task.name.clone(),
        provider: provider_doc(task),
    }
}

fn action_doc(
    task: &Task,
    condition: Option<Vec<ConditionDoc>>,
    guard: Option<String>,
    loop_source: Option<&str>,
) -> ActionDoc {
    ActionDoc {
        name: task.name.clone(),
        provider: provider_doc(task),
        guard,
        condition,
        foreach: task
            .foreach
            .clone()
            .or_else(|| loop_source.map(str::to_string)),
        vars: if task.vars.is_empty() {
            None
        } else {
            Some(task.vars.clone())
        },
    }
}

fn provider_doc(task: &Task) -> ProviderDoc {
    // Configuration references are always rewritten into the canonical
    // templated form, synthesizing a default name for unnamed configs.
    let config_name = task
        .config
        .clone()
        .unwrap_or_else(|| format!("default-{}", task.provider_type));
    ProviderDoc {
        provider_type: task.provider_type.clone(),
        config: Some(format!("{{{{ providers.{} }}}}", config_name)),
        with: if task.with.is_empty() {
            None
        } else {
            Some(task.with.clone())
        },
    }
}

fn trigger_doc(trigger: &Trigger) -> TriggerDoc {
    match trigger {
        Trigger::Alert { filters } => TriggerDoc {
            trigger_type: "alert".to_string(),
            filters: if filters.is_empty() {
                None
            } else {
                Some(
                    filters
                        .iter()
                        .map(|f| FilterDoc {
                            key: f.key.clone(),
                            value: serde_yaml::Value::String(f.value.clone()),
                        })
                        .collect(),
                )
            },
            value: None,
            events: None,
        },
        Trigger::Manual => TriggerDoc {
            trigger_type: "manual".to_string(),
            filters: None,
            value: None,
            events: None,
        },
        Trigger::Interval { value } => TriggerDoc {
            trigger_type: "interval".to_string(),
            filters: None,
            value: Some(serde_yaml::Value::String(value.clone())),
            events: None,
        },
        Trigger::Incident { events } => TriggerDoc {
            trigger_type: "incident".to_string(),
            filters: None,
            value: None,
            events: Some(events.clone()),
        },
    }
}
