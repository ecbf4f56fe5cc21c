//! The authoritative, mutable graph behind an editing session.
//!
//! The store owns the live definition, the derived view, the provider
//! catalog and a bounded undo history. Every mutating operation is
//! followed synchronously by a full validation pass; callers read the
//! updated validation map instead of catching errors. One store backs one
//! editing session and is driven through exclusive access.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::Serialize;

use super::view::{
    Container, EdgeHandle, END, GraphEdge, GraphNode, GraphNodeKind, GraphView, ROOT, TRIGGER_END,
    TRIGGER_START, derive_view,
};
use crate::catalog::ProviderCatalog;
use crate::error::{GraphError, SerializeError};
use crate::serializer;
use crate::validation::{self, Violation};
use crate::workflow::{
    Condition, ConditionKind, Loop, StepNode, Task, TaskKind, Trigger, WorkflowDefinition,
};

/// Snapshots retained for undo.
const HISTORY_LIMIT: usize = 32;

/// What to create when splitting an edge.
#[derive(Debug, Clone)]
pub enum NodeSpec {
    Step { name: String, provider_type: String },
    Action { name: String, provider_type: String },
    Condition { name: String, kind: ConditionKind },
    Loop { source: String },
    Trigger(Trigger),
}

impl NodeSpec {
    fn kind_name(&self) -> &'static str {
        match self {
            NodeSpec::Step { .. } => "step",
            NodeSpec::Action { .. } => "action",
            NodeSpec::Condition { .. } => "condition",
            NodeSpec::Loop { .. } => "loop",
            NodeSpec::Trigger(_) => "trigger",
        }
    }

    /// The step node this spec creates; `None` for trigger specs, which
    /// do not live in the step sequence.
    fn step_node(self) -> Option<StepNode> {
        match self {
            NodeSpec::Step {
                name,
                provider_type,
            } => Some(StepNode::Task(Task::step(name, provider_type))),
            NodeSpec::Action {
                name,
                provider_type,
            } => Some(StepNode::Task(Task::action(name, provider_type))),
            NodeSpec::Condition { name, kind } => Some(StepNode::Condition(Condition::new(name, kind))),
            NodeSpec::Loop { source } => Some(StepNode::Loop(Loop::new(source, Vec::new()))),
            NodeSpec::Trigger(_) => None,
        }
    }
}

/// The findings of the last validation pass, keyed by node id or one of
/// the root-level sentinel keys.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationState {
    violations: AHashMap<String, Violation>,
    can_deploy: bool,
}

impl ValidationState {
    pub fn violations(&self) -> &AHashMap<String, Violation> {
        &self.violations
    }

    pub fn reason(&self, subject: &str) -> Option<&str> {
        self.violations.get(subject).map(|v| v.reason.as_str())
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn can_deploy(&self) -> bool {
        self.can_deploy
    }
}

pub struct WorkflowStore {
    workflow: WorkflowDefinition,
    catalog: ProviderCatalog,
    view: GraphView,
    selected: Option<String>,
    validation: ValidationState,
    history: VecDeque<WorkflowDefinition>,
}

impl WorkflowStore {
    pub fn new(workflow: WorkflowDefinition, catalog: ProviderCatalog) -> Self {
        let mut store = WorkflowStore {
            workflow,
            catalog,
            view: GraphView::default(),
            selected: None,
            validation: ValidationState::default(),
            history: VecDeque::new(),
        };
        store.rebuild();
        store
    }

    /// The "new workflow" skeleton: no triggers, an empty root sequence.
    pub fn empty(
        id: impl Into<String>,
        name: impl Into<String>,
        catalog: ProviderCatalog,
    ) -> Self {
        WorkflowStore::new(WorkflowDefinition::empty(id, name), catalog)
    }

    pub fn workflow(&self) -> &WorkflowDefinition {
        &self.workflow
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.view.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.view.edges
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn can_deploy(&self) -> bool {
        self.validation.can_deploy()
    }

    pub fn select(&mut self, node_id: &str) -> Result<(), GraphError> {
        if self.view.node(node_id).is_none() {
            return Err(GraphError::UnknownNode(node_id.to_string()));
        }
        self.selected = Some(node_id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Splits an edge and inserts the node the spec describes.
    ///
    /// Trigger specs are only placeable inside the reserved region and at
    /// most once per trigger type; a duplicate leaves the graph unchanged
    /// and reports [`GraphError::DuplicateTrigger`]. Inserting a trigger
    /// merges its declaration into the definition's trigger set.
    pub fn add_node_between(
        &mut self,
        edge_id: &str,
        spec: NodeSpec,
    ) -> Result<String, GraphError> {
        let edge = self
            .view
            .edge(edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.to_string()))?;
        let insertion = edge
            .insertion
            .clone()
            .ok_or_else(|| GraphError::InvalidPlacement {
                kind: spec.kind_name(),
                edge_id: edge_id.to_string(),
            })?;
        let in_trigger_region = insertion.container == Container::TriggerRegion;

        let spec = match spec {
            NodeSpec::Trigger(trigger) => {
                if !in_trigger_region {
                    return Err(GraphError::InvalidPlacement {
                        kind: "trigger",
                        edge_id: edge_id.to_string(),
                    });
                }
                if self
                    .workflow
                    .triggers
                    .iter()
                    .any(|t| t.type_name() == trigger.type_name())
                {
                    return Err(GraphError::DuplicateTrigger {
                        trigger_type: trigger.type_name().to_string(),
                    });
                }
                self.snapshot();
                let index = insertion.index.min(self.workflow.triggers.len());
                let node_id = trigger.graph_node_id();
                self.workflow.triggers.insert(index, trigger);
                self.rebuild();
                return Ok(node_id);
            }
            other => other,
        };

        if in_trigger_region {
            return Err(GraphError::InvalidPlacement {
                kind: spec.kind_name(),
                edge_id: edge_id.to_string(),
            });
        }
        // Checked above: only trigger specs return None here.
        let Some(node) = spec.step_node() else {
            return Err(GraphError::UnknownEdge(edge_id.to_string()));
        };
        let node_id = node.id_string();

        self.snapshot();
        let inserted = match &insertion.container {
            Container::Root => {
                let index = insertion.index.min(self.workflow.sequence.len());
                self.workflow.sequence.insert(index, node);
                true
            }
            Container::Branch(owner) => match self.workflow.condition_by_id_mut(owner) {
                Some(condition) => {
                    let index = insertion.index.min(condition.branch.len());
                    condition.branch.insert(index, node);
                    true
                }
                None => false,
            },
            Container::LoopBody(owner) => match self.workflow.loop_by_id_mut(owner) {
                Some(l) => {
                    let index = insertion.index.min(l.body.len());
                    l.body.insert(index, node);
                    true
                }
                None => false,
            },
            Container::TriggerRegion => false,
        };
        if !inserted {
            self.history.pop_back();
            return Err(GraphError::UnknownEdge(edge_id.to_string()));
        }
        self.rebuild();
        Ok(node_id)
    }

    /// Removes a node; the derived edges reconnect around it. Anchors and
    /// the root container are never user-deletable and are ignored.
    /// Deleting a trigger node prunes its declaration from the
    /// definition's global properties.
    pub fn delete_nodes(&mut self, node_id: &str) -> Result<(), GraphError> {
        if matches!(node_id, TRIGGER_START | TRIGGER_END | ROOT | END) {
            return Ok(());
        }
        if let Some(position) = self
            .workflow
            .triggers
            .iter()
            .position(|t| t.graph_node_id() == node_id)
        {
            self.snapshot();
            self.workflow.triggers.remove(position);
            self.rebuild();
            return Ok(());
        }
        if !self.workflow.contains_node(node_id) {
            return Err(GraphError::UnknownNode(node_id.to_string()));
        }
        self.snapshot();
        self.workflow.remove_node(node_id);
        self.rebuild();
        Ok(())
    }

    /// Connects two nodes. Fan-out is allowed only from branch-kind
    /// nodes; a second outgoing edge from any other node is rejected and
    /// the edge set stays unchanged. Reconnecting an existing pair is a
    /// no-op.
    pub fn on_connect(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        let is_branch = match self.view.node(source) {
            Some(node) => node.kind.is_branch(),
            None => return Err(GraphError::UnknownNode(source.to_string())),
        };
        if self.view.node(target).is_none() {
            return Err(GraphError::UnknownNode(target.to_string()));
        }
        let mut has_outgoing = false;
        for edge in self.view.outgoing(source) {
            if edge.target == target {
                return Ok(());
            }
            has_outgoing = true;
        }
        if !is_branch && has_outgoing {
            return Err(GraphError::SingleOutput {
                source: source.to_string(),
            });
        }
        self.view.edges.push(GraphEdge {
            id: GraphEdge::edge_id(source, EdgeHandle::Out, target),
            source: source.to_string(),
            handle: EdgeHandle::Out,
            target: target.to_string(),
            insertion: None,
        });
        self.revalidate();
        Ok(())
    }

    /// Sets a property on the currently selected node. A JSON null
    /// removes the property entirely rather than storing null. The root
    /// container accepts `name` and `description`.
    pub fn update_selected_node_data(
        &mut self,
        key: &str,
        data: serde_json::Value,
    ) -> Result<(), GraphError> {
        let Some(node_id) = self.selected.clone() else {
            return Err(GraphError::NoSelection);
        };
        self.snapshot();
        let applied = if node_id == ROOT {
            update_root(&mut self.workflow, key, &data);
            true
        } else if let Some(position) = self
            .workflow
            .triggers
            .iter()
            .position(|t| t.graph_node_id() == node_id)
        {
            update_trigger(&mut self.workflow.triggers[position], key, data);
            true
        } else if let Some(node) = self.workflow.node_mut(&node_id) {
            update_step_node(node, key, data);
            true
        } else {
            false
        };
        if !applied {
            self.history.pop_back();
            return Err(GraphError::UnknownNode(node_id));
        }
        self.rebuild();
        Ok(())
    }

    /// Restores the definition captured before the most recent mutation.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.workflow = previous;
                self.rebuild();
                true
            }
            None => false,
        }
    }

    /// Parameter names the catalog lists for a task's provider type:
    /// query parameters for steps, notify parameters for actions.
    pub fn available_parameters(&self, node_id: &str) -> Option<&[String]> {
        let mut found: Option<(String, TaskKind)> = None;
        self.workflow.walk(&mut |node| {
            if found.is_none() && node.id_string() == node_id {
                if let StepNode::Task(task) = node {
                    found = Some((task.provider_type.clone(), task.kind));
                }
            }
        });
        let (provider_type, kind) = found?;
        self.catalog.parameters_for(&provider_type, kind)
    }

    /// The canonical textual form of the current definition.
    pub fn to_document(&self) -> Result<String, SerializeError> {
        serializer::serialize(&self.workflow)
    }

    fn snapshot(&mut self) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(self.workflow.clone());
    }

    fn rebuild(&mut self) {
        self.view = derive_view(&self.workflow);
        if let Some(selected) = &self.selected {
            if self.view.node(selected).is_none() {
                self.selected = None;
            }
        }
        self.revalidate();
    }

    fn revalidate(&mut self) {
        let mut violations = validation::collect_violations(&self.workflow, &self.catalog);
        let roots = self
            .view
            .nodes
            .iter()
            .filter(|n| n.kind == GraphNodeKind::Root)
            .count();
        if roots != 1 {
            violations.push(Violation::structural(
                ROOT,
                "graph must contain exactly one root sequence",
            ));
        }
        let can_deploy = validation::can_deploy(&violations);
        let mut map = AHashMap::new();
        for violation in violations {
            map.entry(violation.subject.clone()).or_insert(violation);
        }
        self.validation = ValidationState {
            violations: map,
            can_deploy,
        };
    }
}

fn update_root(workflow: &mut WorkflowDefinition, key: &str, data: &serde_json::Value) {
    match key {
        "name" => workflow.name = string_value(data),
        "description" => workflow.description = string_value(data),
        "disabled" => workflow.disabled = data.as_bool().unwrap_or(false),
        _ => {}
    }
}

fn update_step_node(node: &mut StepNode, key: &str, data: serde_json::Value) {
    match node {
        StepNode::Task(task) => match key {
            "name" => task.name = string_value(&data),
            "foreach" => task.foreach = optional_string(data),
            _ => {
                if data.is_null() {
                    task.with.remove(key);
                } else {
                    task.with.insert(key.to_string(), data);
                }
            }
        },
        StepNode::Condition(condition) => match key {
            "name" => {
                let name = string_value(&data);
                condition.alias = Some(name.clone());
                condition.name = name;
            }
            "alias" => condition.alias = optional_string(data),
            "value" => {
                if let ConditionKind::Threshold { value, .. } = &mut condition.kind {
                    *value = string_value(&data);
                }
            }
            "compare_to" => {
                if let ConditionKind::Threshold { compare_to, .. } = &mut condition.kind {
                    *compare_to = string_value(&data);
                }
            }
            "assert" => {
                if let ConditionKind::Assert { assert } = &mut condition.kind {
                    *assert = string_value(&data);
                }
            }
            _ => {}
        },
        StepNode::Loop(l) => {
            if key == "source" || key == "value" {
                l.source = string_value(&data);
            }
        }
    }
}

fn update_trigger(trigger: &mut Trigger, key: &str, data: serde_json::Value) {
    match trigger {
        Trigger::Interval { value } => {
            if key == "value" {
                *value = string_value(&data);
            }
        }
        Trigger::Alert { filters } => {
            if data.is_null() {
                filters.retain(|f| f.key != key);
            } else {
                let value = string_value(&data);
                match filters.iter_mut().find(|f| f.key == key) {
                    Some(filter) => filter.value = value,
                    None => filters.push(crate::workflow::AlertFilter {
                        key: key.to_string(),
                        value,
                    }),
                }
            }
        }
        Trigger::Incident { events } => {
            if key == "events" {
                *events = match data {
                    serde_json::Value::Array(items) => {
                        items.iter().map(string_value).collect()
                    }
                    serde_json::Value::Null => Vec::new(),
                    other => vec![string_value(&other)],
                };
            }
        }
        Trigger::Manual => {}
    }
}

fn string_value(data: &serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn optional_string(data: serde_json::Value) -> Option<String> {
    if data.is_null() {
        None
    } else {
        Some(string_value(&data))
    }
}
