//! Tests for the graph mutation store: insertion, deletion, connection
//! rules, property edits, undo and the validation map.
mod common;
use common::*;
use tocsin::prelude::*;

fn minimal_store() -> WorkflowStore {
    WorkflowStore::new(parse_ok(minimal_text()).workflow, sample_catalog())
}

fn disk_store() -> WorkflowStore {
    WorkflowStore::new(parse_ok(disk_alert_text()).workflow, sample_catalog())
}

fn edge_between(store: &WorkflowStore, source: &str, target: &str) -> String {
    store
        .edges()
        .iter()
        .find(|e| e.source == source && e.target == target)
        .map(|e| e.id.clone())
        .expect("Expected an edge between the two nodes")
}

#[test]
fn test_store_derives_view_with_anchors() {
    let store = minimal_store();
    for anchor in ["trigger_start", "trigger_end", "root", "end"] {
        assert!(store.nodes().iter().any(|n| n.id == anchor));
    }
    assert!(store.nodes().iter().any(|n| n.id == "trigger-manual"));
    assert!(store.can_deploy());
}

#[test]
fn test_add_step_between_nodes() {
    let mut store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();
    let a1 = store.workflow().sequence[1].id_string();
    let edge = edge_between(&store, &s1, &a1);

    let new_id = store
        .add_node_between(
            &edge,
            NodeSpec::Step {
                name: "enrich".to_string(),
                provider_type: "mock".to_string(),
            },
        )
        .expect("Failed to insert step");

    assert_eq!(store.workflow().sequence[1].id_string(), new_id);
    assert_eq!(
        shape(&store.workflow().sequence),
        vec!["step:s1/mock", "step:enrich/mock", "action:a1/slack"]
    );
    // The split edge is re-derived around the new node.
    assert!(store.edges().iter().any(|e| e.source == s1 && e.target == new_id));
    assert!(store.edges().iter().any(|e| e.source == new_id && e.target == a1));
}

#[test]
fn test_add_action_into_condition_branch() {
    let mut store = disk_store();
    let condition_id = store.workflow().sequence[1].id_string();
    let first_branch_task = store.workflow().sequence[1].children()[0].id_string();
    let edge = edge_between(&store, &condition_id, &first_branch_task);

    store
        .add_node_between(
            &edge,
            NodeSpec::Action {
                name: "page-oncall".to_string(),
                provider_type: "slack".to_string(),
            },
        )
        .expect("Failed to insert action");

    assert_eq!(
        shape(&store.workflow().sequence)[1],
        "condition:usage-high[action:page-oncall/slack, action:notify-slack/slack, action:open-ticket/jira]"
    );
}

#[test]
fn test_add_trigger_in_reserved_region() {
    let mut store = minimal_store();
    let edge = edge_between(&store, "trigger_start", "trigger-manual");

    let node_id = store
        .add_node_between(
            &edge,
            NodeSpec::Trigger(Trigger::Interval {
                value: "300".to_string(),
            }),
        )
        .expect("Failed to insert trigger");

    assert_eq!(node_id, "trigger-interval");
    assert_eq!(store.workflow().triggers.len(), 2);
    assert!(store.nodes().iter().any(|n| n.id == "trigger-interval"));
}

#[test]
fn test_duplicate_trigger_is_rejected() {
    let mut store = minimal_store();
    let edge = edge_between(&store, "trigger_start", "trigger-manual");
    store
        .add_node_between(
            &edge,
            NodeSpec::Trigger(Trigger::Interval {
                value: "300".to_string(),
            }),
        )
        .expect("Failed to insert trigger");
    let node_count = store.nodes().len();

    let edge = edge_between(&store, "trigger_start", "trigger-interval");
    let result = store.add_node_between(
        &edge,
        NodeSpec::Trigger(Trigger::Interval {
            value: "600".to_string(),
        }),
    );

    assert_eq!(
        result,
        Err(GraphError::DuplicateTrigger {
            trigger_type: "interval".to_string(),
        })
    );
    // The graph is left unchanged.
    assert_eq!(store.nodes().len(), node_count);
    assert_eq!(store.workflow().triggers.len(), 2);
}

#[test]
fn test_trigger_placement_is_restricted_to_reserved_region() {
    let mut store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();
    let a1 = store.workflow().sequence[1].id_string();

    let step_edge = edge_between(&store, &s1, &a1);
    let result = store.add_node_between(&step_edge, NodeSpec::Trigger(Trigger::Manual));
    assert!(matches!(result, Err(GraphError::InvalidPlacement { .. })));

    let trigger_edge = edge_between(&store, "trigger_start", "trigger-manual");
    let result = store.add_node_between(
        &trigger_edge,
        NodeSpec::Step {
            name: "misplaced".to_string(),
            provider_type: "mock".to_string(),
        },
    );
    assert!(matches!(result, Err(GraphError::InvalidPlacement { .. })));
}

#[test]
fn test_delete_trigger_prunes_global_properties() {
    let mut store = minimal_store();
    let edge = edge_between(&store, "trigger_start", "trigger-manual");
    store
        .add_node_between(
            &edge,
            NodeSpec::Trigger(Trigger::Interval {
                value: "300".to_string(),
            }),
        )
        .expect("Failed to insert trigger");

    store
        .delete_nodes("trigger-interval")
        .expect("Failed to delete trigger");

    // The interval declaration is gone from the definition entirely.
    assert!(
        !store
            .workflow()
            .triggers
            .iter()
            .any(|t| matches!(t, Trigger::Interval { .. }))
    );
    assert!(store.nodes().iter().all(|n| n.id != "trigger-interval"));
}

#[test]
fn test_delete_task_reconnects_neighbours() {
    let mut store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();
    let a1 = store.workflow().sequence[1].id_string();

    store.delete_nodes(&s1).expect("Failed to delete step");

    assert_eq!(shape(&store.workflow().sequence), vec!["action:a1/slack"]);
    assert!(store.edges().iter().any(|e| e.source == "trigger_end" && e.target == a1));
}

#[test]
fn test_anchors_are_never_deletable() {
    let mut store = minimal_store();
    let node_count = store.nodes().len();
    for anchor in ["trigger_start", "trigger_end", "root", "end"] {
        store.delete_nodes(anchor).expect("Anchor delete is a no-op");
    }
    assert_eq!(store.nodes().len(), node_count);
}

#[test]
fn test_connect_fan_out_rules() {
    let mut store = disk_store();
    let condition_id = store.workflow().sequence[1].id_string();
    let step_id = store.workflow().sequence[0].id_string();

    // Non-branch nodes keep a single outgoing edge.
    let before = store.edges().iter().filter(|e| e.source == step_id).count();
    let result = store.on_connect(&step_id, "end");
    assert_eq!(
        result,
        Err(GraphError::SingleOutput {
            source: step_id.clone(),
        })
    );
    let after = store.edges().iter().filter(|e| e.source == step_id).count();
    assert_eq!(before, after);

    // Branch-kind nodes may fan out.
    let before = store
        .edges()
        .iter()
        .filter(|e| e.source == condition_id)
        .count();
    store
        .on_connect(&condition_id, &step_id)
        .expect("Failed to connect from condition");
    let after = store
        .edges()
        .iter()
        .filter(|e| e.source == condition_id)
        .count();
    assert_eq!(after, before + 1);
}

#[test]
fn test_connect_from_free_node_then_reject_second() {
    let mut store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();

    // "end" has no outgoing edge, so the first connection is accepted and
    // the second rejected: exactly one edge remains.
    store.on_connect("end", &s1).expect("Failed to connect");
    let result = store.on_connect("end", "root");
    assert_eq!(
        result,
        Err(GraphError::SingleOutput {
            source: "end".to_string(),
        })
    );
    assert_eq!(
        store.edges().iter().filter(|e| e.source == "end").count(),
        1
    );
}

#[test]
fn test_update_selected_task_parameters() {
    let mut store = minimal_store();
    let a1 = store.workflow().sequence[1].id_string();
    store.select(&a1).expect("Failed to select");

    store
        .update_selected_node_data("message", serde_json::json!("disk is full"))
        .expect("Failed to update");
    let StepNode::Task(task) = &store.workflow().sequence[1] else {
        panic!("Expected a task node");
    };
    assert_eq!(
        task.with.get("message").and_then(|v| v.as_str()),
        Some("disk is full")
    );

    // The null sentinel removes the property entirely.
    store
        .update_selected_node_data("message", serde_json::Value::Null)
        .expect("Failed to update");
    let StepNode::Task(task) = &store.workflow().sequence[1] else {
        panic!("Expected a task node");
    };
    assert!(!task.with.contains_key("message"));
}

#[test]
fn test_update_without_selection_fails() {
    let mut store = minimal_store();
    let result = store.update_selected_node_data("message", serde_json::json!("x"));
    assert_eq!(result, Err(GraphError::NoSelection));
}

#[test]
fn test_clearing_workflow_name_blocks_deployment() {
    let mut store = minimal_store();
    store.select("root").expect("Failed to select root");
    store
        .update_selected_node_data("name", serde_json::Value::Null)
        .expect("Failed to update");

    assert!(!store.can_deploy());
    assert_eq!(
        store.validation().reason("workflow_name"),
        Some("workflow name is required")
    );
}

#[test]
fn test_validation_map_records_structural_findings() {
    let mut store = minimal_store();
    let a1 = store.workflow().sequence[1].id_string();
    let edge = edge_between(&store, &a1, "end");
    let condition_id = store
        .add_node_between(
            &edge,
            NodeSpec::Condition {
                name: "c1".to_string(),
                kind: ConditionKind::Threshold {
                    value: "5".to_string(),
                    compare_to: "3".to_string(),
                },
            },
        )
        .expect("Failed to insert condition");

    assert!(!store.can_deploy());
    assert_eq!(
        store.validation().reason(&condition_id),
        Some("branch must contain at least one action")
    );
}

#[test]
fn test_undo_restores_previous_definition() {
    let mut store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();

    store.delete_nodes(&s1).expect("Failed to delete step");
    assert_eq!(store.workflow().sequence.len(), 1);

    assert!(store.undo());
    assert_eq!(
        shape(&store.workflow().sequence),
        vec!["step:s1/mock", "action:a1/slack"]
    );
    assert!(store.can_deploy());
}

#[test]
fn test_undo_on_fresh_store_is_a_no_op() {
    let mut store = minimal_store();
    assert!(!store.undo());
}

#[test]
fn test_available_parameters_follow_task_kind() {
    let store = minimal_store();
    let s1 = store.workflow().sequence[0].id_string();
    let a1 = store.workflow().sequence[1].id_string();

    // Steps surface query parameters, actions notify parameters.
    assert_eq!(
        store.available_parameters(&s1),
        Some(&["query".to_string()][..])
    );
    assert_eq!(
        store.available_parameters(&a1),
        Some(&["message".to_string(), "channel".to_string()][..])
    );
}

#[test]
fn test_empty_store_grows_from_skeleton() {
    let mut store = WorkflowStore::empty("fresh", "Fresh workflow", sample_catalog());
    assert!(store.workflow().sequence.is_empty());
    assert!(store.can_deploy());

    let edge = edge_between(&store, "trigger_end", "end");
    store
        .add_node_between(
            &edge,
            NodeSpec::Step {
                name: "fetch".to_string(),
                provider_type: "mock".to_string(),
            },
        )
        .expect("Failed to insert step");

    assert_eq!(shape(&store.workflow().sequence), vec!["step:fetch/mock"]);
    let canonical = store.to_document().expect("Failed to serialize");
    assert!(canonical.contains("fetch"));
}
