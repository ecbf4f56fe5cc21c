use super::ParseOutput;
use crate::document::{ActionDoc, ConditionDoc, ProviderDoc, StepDoc, TriggerDoc, WorkflowDoc};
use crate::error::{ParseError, ParseWarning};
use crate::workflow::definition::find_condition_in;
use crate::workflow::{
    AlertFilter, Condition, ConditionKind, Loop, StepNode, Task, Trigger, WorkflowDefinition,
};

/// Lowers a decoded document into the definition model.
pub(crate) fn lower(doc: WorkflowDoc) -> Result<ParseOutput, ParseError> {
    let id = doc.id.ok_or(ParseError::SemanticError { field: "id" })?;
    if doc.steps.is_none() && doc.actions.is_none() {
        return Err(ParseError::SemanticError {
            field: "steps/actions",
        });
    }

    // Absent metadata falls back along name -> id so a minimal document
    // still satisfies the root-level metadata rules.
    let name = doc
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| id.clone());
    let description = doc
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| name.clone());

    let consts = doc
        .consts
        .map(|mapping| {
            mapping
                .into_iter()
                .map(|(k, v)| (scalar_to_string(&k), scalar_to_string(&v)))
                .collect()
        })
        .unwrap_or_default();

    let mut warnings = Vec::new();
    let triggers = lower_triggers(doc.triggers.unwrap_or_default(), &mut warnings);

    let mut sequence: Vec<StepNode> = Vec::new();
    for step in doc.steps.unwrap_or_default() {
        sequence.push(StepNode::Task(lower_step(step)));
    }
    for action in doc.actions.unwrap_or_default() {
        lower_action(action, &mut sequence, &mut warnings);
    }

    Ok(ParseOutput {
        workflow: WorkflowDefinition {
            id,
            name,
            description,
            disabled: doc.disabled.unwrap_or(false),
            consts,
            triggers,
            sequence,
        },
        warnings,
    })
}

fn lower_step(doc: StepDoc) -> Task {
    let mut task = Task::step(doc.name, String::new());
    apply_provider(&mut task, doc.provider);
    task
}

/// Lowers one declared action, appending the node(s) it produces.
///
/// Inline `condition` lists take precedence over an `if` reference; a
/// `foreach` expression wraps the produced task or condition in a loop.
fn lower_action(doc: ActionDoc, sequence: &mut Vec<StepNode>, warnings: &mut Vec<ParseWarning>) {
    let mut task = Task::action(doc.name, String::new());
    apply_provider(&mut task, doc.provider);
    task.foreach = doc.foreach.clone();
    if let Some(vars) = doc.vars {
        task.vars = vars;
    }

    if let Some(condition_docs) = doc.condition {
        let mut appended = 0usize;
        for condition_doc in condition_docs {
            let Some(mut condition) = lower_condition(condition_doc, warnings) else {
                continue;
            };
            condition
                .branch
                .push(StepNode::Task(task.clone().with_fresh_id()));
            let node = match &doc.foreach {
                Some(source) => StepNode::Loop(Loop::new(
                    source.clone(),
                    vec![StepNode::Condition(condition)],
                )),
                None => StepNode::Condition(condition),
            };
            sequence.push(node);
            appended += 1;
        }
        if appended == 0 {
            push_unconditioned(task, sequence);
        }
    } else if let Some(reference) = doc.guard {
        let alias = strip_template(&reference);
        if condition_exists(sequence, &alias) {
            if let Some(condition) = find_condition_in(sequence, &alias) {
                task.guard = Some(alias);
                condition.branch.push(StepNode::Task(task));
            }
        } else {
            // Reviewed behavior: a dangling guard is dropped and the
            // action runs unconditioned. Surface it instead of
            // swallowing the typo.
            warnings.push(ParseWarning::UnresolvedAlias {
                action: task.name.clone(),
                reference,
            });
            push_unconditioned(task, sequence);
        }
    } else {
        push_unconditioned(task, sequence);
    }
}

fn condition_exists(nodes: &[StepNode], alias: &str) -> bool {
    nodes.iter().any(|node| match node {
        StepNode::Condition(c) => c.matches_alias(alias),
        StepNode::Loop(l) => condition_exists(&l.body, alias),
        StepNode::Task(_) => false,
    })
}

fn push_unconditioned(task: Task, sequence: &mut Vec<StepNode>) {
    match task.foreach.clone() {
        Some(source) => sequence.push(StepNode::Loop(Loop::new(source, vec![StepNode::Task(task)]))),
        None => sequence.push(StepNode::Task(task)),
    }
}

fn lower_condition(doc: ConditionDoc, warnings: &mut Vec<ParseWarning>) -> Option<Condition> {
    let kind = match doc.condition_type.as_str() {
        "threshold" => ConditionKind::Threshold {
            value: doc.value.as_ref().map(scalar_to_string).unwrap_or_default(),
            compare_to: doc
                .compare_to
                .as_ref()
                .map(scalar_to_string)
                .unwrap_or_default(),
        },
        "assert" => ConditionKind::Assert {
            assert: doc.assert.unwrap_or_default(),
        },
        other => {
            warnings.push(ParseWarning::UnknownConditionType {
                name: doc.name,
                condition_type: other.to_string(),
            });
            return None;
        }
    };
    Some(Condition::new(doc.name, kind))
}

fn lower_triggers(docs: Vec<TriggerDoc>, warnings: &mut Vec<ParseWarning>) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    for doc in docs {
        let trigger = match doc.trigger_type.as_str() {
            "alert" => Trigger::Alert {
                filters: doc
                    .filters
                    .unwrap_or_default()
                    .into_iter()
                    .map(|f| AlertFilter {
                        key: f.key,
                        value: scalar_to_string(&f.value),
                    })
                    .collect(),
            },
            "manual" => Trigger::Manual,
            "interval" => Trigger::Interval {
                value: doc.value.as_ref().map(scalar_to_string).unwrap_or_default(),
            },
            "incident" => Trigger::Incident {
                events: doc.events.unwrap_or_default(),
            },
            other => {
                warnings.push(ParseWarning::UnknownTriggerType {
                    trigger_type: other.to_string(),
                });
                continue;
            }
        };
        triggers.push(trigger);
    }
    triggers
}

fn apply_provider(task: &mut Task, provider: ProviderDoc) {
    task.provider_type = provider.provider_type;
    task.config = provider.config.as_deref().map(config_name);
    if let Some(with) = provider.with {
        task.with = with;
    }
}

/// Extracts the configuration name from a `{{ providers.<name> }}`
/// reference. A bare name passes through unchanged.
fn config_name(raw: &str) -> String {
    let inner = strip_template(raw);
    inner
        .strip_prefix("providers.")
        .unwrap_or(&inner)
        .to_string()
}

/// Removes `{{ }}` templating delimiters and surrounding whitespace.
pub(crate) fn strip_template(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("{{").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("}}").unwrap_or(trimmed);
    trimmed.trim().to_string()
}

/// Renders a YAML scalar the way the canonical form spells it.
pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
