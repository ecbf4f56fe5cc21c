//! Tests for the per-node and whole-graph rule engine.
mod common;
use common::*;
use tocsin::prelude::*;

#[test]
fn test_loop_may_only_hold_conditions() {
    let node = StepNode::Loop(Loop::new(
        "{{ steps.fetch.results }}",
        vec![StepNode::Task(Task::action("a1", "slack"))],
    ));
    let reason = validate_node(&node).expect_err("Loop with a task child must fail");
    assert_eq!(reason, "container may only hold conditions");
}

#[test]
fn test_loop_with_condition_children_passes() {
    let mut condition = Condition::assert_expr("c1", "{{ item }} > 1");
    condition
        .branch
        .push(StepNode::Task(Task::action("a1", "slack")));
    let node = StepNode::Loop(Loop::new(
        "{{ steps.fetch.results }}",
        vec![StepNode::Condition(condition)],
    ));
    assert!(validate_node(&node).is_ok());
}

#[test]
fn test_branch_must_not_be_empty() {
    let node = StepNode::Condition(Condition::threshold("c1", "5", "3"));
    let reason = validate_node(&node).expect_err("Empty branch must fail");
    assert_eq!(reason, "branch must contain at least one action");
}

#[test]
fn test_branch_may_only_hold_actions() {
    let mut condition = Condition::threshold("c1", "5", "3");
    condition
        .branch
        .push(StepNode::Task(Task::step("s1", "mock")));
    let reason = validate_node(&StepNode::Condition(condition))
        .expect_err("Step in a branch must fail");
    assert_eq!(reason, "branch may only hold actions");
}

#[test]
fn test_task_name_must_not_be_empty() {
    let node = StepNode::Task(Task::step("", "mock"));
    let reason = validate_node(&node).expect_err("Unnamed task must fail");
    assert_eq!(reason, "task name must not be empty");
}

#[test]
fn test_validate_graph_stops_at_first_failing_node() {
    let mut workflow = WorkflowDefinition::empty("w1", "w1");
    workflow
        .sequence
        .push(StepNode::Condition(Condition::threshold("c1", "5", "3")));
    workflow.sequence.push(StepNode::Task(Task::step("", "mock")));

    let violation = validate_graph(&workflow).expect_err("Graph must fail");
    assert_eq!(violation.reason, "branch must contain at least one action");
    assert_eq!(violation.subject, workflow.sequence[0].id_string());
}

#[test]
fn test_no_steps_after_actions_at_top_level() {
    let mut workflow = WorkflowDefinition::empty("w1", "w1");
    workflow
        .sequence
        .push(StepNode::Task(Task::action("a1", "slack")));
    workflow.sequence.push(StepNode::Task(Task::step("s1", "mock")));

    let violation = validate_graph(&workflow).expect_err("Graph must fail");
    assert_eq!(violation.reason, "steps cannot come after actions");
    assert_eq!(violation.subject, workflow.sequence[1].id_string());
}

#[test]
fn test_step_ordering_rule_ignores_nested_bodies() {
    // The ordering rule scans the top level only; an action inside a
    // branch does not poison later steps.
    let output = parse_ok(disk_alert_text());
    let mut workflow = output.workflow;
    workflow
        .sequence
        .push(StepNode::Task(Task::step("late-step", "mock")));

    assert!(validate_graph(&workflow).is_ok());
}

#[test]
fn test_missing_provider_is_recorded_but_never_blocks() {
    let workflow = parse_ok(minimal_text()).workflow;
    let violations = collect_violations(&workflow, &ProviderCatalog::default());

    assert_eq!(violations.len(), 2);
    assert!(
        violations
            .iter()
            .all(|v| v.category == ViolationCategory::MissingProvider)
    );
    assert!(can_deploy(&violations));
}

#[test]
fn test_structural_violations_block_deployment() {
    let mut workflow = parse_ok(minimal_text()).workflow;
    workflow
        .sequence
        .push(StepNode::Condition(Condition::threshold("c1", "5", "3")));

    let violations = collect_violations(&workflow, &sample_catalog());
    assert!(!can_deploy(&violations));
}

#[test]
fn test_metadata_sentinels() {
    let mut workflow = parse_ok(minimal_text()).workflow;
    workflow.name = String::new();
    workflow.description = String::new();

    let violations = collect_violations(&workflow, &sample_catalog());
    let subjects: Vec<&str> = violations.iter().map(|v| v.subject.as_str()).collect();
    assert!(subjects.contains(&"workflow_name"));
    assert!(subjects.contains(&"workflow_description"));
    assert!(!can_deploy(&violations));
}

#[test]
fn test_clean_workflow_collects_nothing() {
    let workflow = parse_ok(disk_alert_text()).workflow;
    let violations = collect_violations(&workflow, &sample_catalog());
    assert!(violations.is_empty());
    assert!(can_deploy(&violations));
}
