//! The node/edge view derived from a definition.
//!
//! The view is what an interactive editor renders: anchor nodes bound the
//! reserved trigger region, the synthetic root container owns the
//! top-level sequence, and every edge records the insertion point a node
//! dropped onto it would occupy. The view is recomputed from the
//! definition after each structural mutation.

use std::iter;

use itertools::Itertools;

use crate::workflow::{StepNode, WorkflowDefinition};

/// Anchor opening the reserved trigger region.
pub const TRIGGER_START: &str = "trigger_start";
/// Anchor closing the reserved trigger region.
pub const TRIGGER_END: &str = "trigger_end";
/// The synthetic root container. Never user-deletable.
pub const ROOT: &str = "root";
/// Terminal anchor of the step chain.
pub const END: &str = "end";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNodeKind {
    TriggerStart,
    TriggerEnd,
    Trigger,
    Root,
    End,
    Task,
    Condition,
    Loop,
}

impl GraphNodeKind {
    pub fn is_anchor(&self) -> bool {
        matches!(
            self,
            GraphNodeKind::TriggerStart
                | GraphNodeKind::TriggerEnd
                | GraphNodeKind::Root
                | GraphNodeKind::End
        )
    }

    /// Branch-kind nodes are the only legal fan-out sources.
    pub fn is_branch(&self) -> bool {
        matches!(self, GraphNodeKind::Condition)
    }
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub kind: GraphNodeKind,
    pub label: String,
}

/// The sequence a dropped node would be inserted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    TriggerRegion,
    Root,
    /// A condition's true branch, keyed by the condition's node id.
    Branch(String),
    /// A loop's body, keyed by the loop's node id.
    LoopBody(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPoint {
    pub container: Container,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeHandle {
    Out,
    True,
    False,
    Body,
}

impl EdgeHandle {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeHandle::Out => "out",
            EdgeHandle::True => "true",
            EdgeHandle::False => "false",
            EdgeHandle::Body => "body",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub handle: EdgeHandle,
    pub target: String,
    /// Where a node dropped on this edge lands. Manually drawn edges
    /// carry no insertion point.
    pub insertion: Option<InsertionPoint>,
}

impl GraphEdge {
    pub(crate) fn edge_id(source: &str, handle: EdgeHandle, target: &str) -> String {
        format!("{}:{}->{}", source, handle.as_str(), target)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn outgoing(&self, source: &str) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == source)
    }

    fn push_node(&mut self, id: impl Into<String>, kind: GraphNodeKind, label: impl Into<String>) {
        self.nodes.push(GraphNode {
            id: id.into(),
            kind,
            label: label.into(),
        });
    }

    fn push_edge(
        &mut self,
        source: &str,
        handle: EdgeHandle,
        target: &str,
        insertion: InsertionPoint,
    ) {
        self.edges.push(GraphEdge {
            id: GraphEdge::edge_id(source, handle, target),
            source: source.to_string(),
            handle,
            target: target.to_string(),
            insertion: Some(insertion),
        });
    }
}

/// Derives the editor view from a definition.
pub fn derive_view(workflow: &WorkflowDefinition) -> GraphView {
    let mut view = GraphView::default();

    view.push_node(TRIGGER_START, GraphNodeKind::TriggerStart, "triggers");
    for trigger in &workflow.triggers {
        view.push_node(
            trigger.graph_node_id(),
            GraphNodeKind::Trigger,
            trigger.type_name(),
        );
    }
    view.push_node(TRIGGER_END, GraphNodeKind::TriggerEnd, "triggers end");
    view.push_node(ROOT, GraphNodeKind::Root, workflow.name.as_str());

    // The reserved region chains linearly between its anchors.
    let trigger_chain = iter::once(TRIGGER_START.to_string())
        .chain(workflow.triggers.iter().map(|t| t.graph_node_id()))
        .chain(iter::once(TRIGGER_END.to_string()));
    for (index, (source, target)) in trigger_chain.tuple_windows().enumerate() {
        view.push_edge(
            &source,
            EdgeHandle::Out,
            &target,
            InsertionPoint {
                container: Container::TriggerRegion,
                index,
            },
        );
    }

    emit_sequence(
        &workflow.sequence,
        Container::Root,
        TRIGGER_END,
        EdgeHandle::Out,
        END,
        &mut view,
    );
    view.push_node(END, GraphNodeKind::End, "end");
    view
}

fn emit_sequence(
    sequence: &[StepNode],
    container: Container,
    entry: &str,
    entry_handle: EdgeHandle,
    exit: &str,
    view: &mut GraphView,
) {
    let Some(first) = sequence.first() else {
        view.push_edge(
            entry,
            entry_handle,
            exit,
            InsertionPoint {
                container,
                index: 0,
            },
        );
        return;
    };

    view.push_edge(
        entry,
        entry_handle,
        &first.id_string(),
        InsertionPoint {
            container: container.clone(),
            index: 0,
        },
    );
    for (i, node) in sequence.iter().enumerate() {
        let (next_target, next_index) = match sequence.get(i + 1) {
            Some(next) => (next.id_string(), i + 1),
            None => (exit.to_string(), sequence.len()),
        };
        emit_element(node, &container, &next_target, next_index, view);
    }
}

fn emit_element(
    node: &StepNode,
    container: &Container,
    next_target: &str,
    next_index: usize,
    view: &mut GraphView,
) {
    let id = node.id_string();
    match node {
        StepNode::Task(task) => {
            view.push_node(id.clone(), GraphNodeKind::Task, task.name.as_str());
            view.push_edge(
                &id,
                EdgeHandle::Out,
                next_target,
                InsertionPoint {
                    container: container.clone(),
                    index: next_index,
                },
            );
        }
        StepNode::Condition(condition) => {
            view.push_node(id.clone(), GraphNodeKind::Condition, condition.name.as_str());
            // The empty false branch bypasses straight to the merge target.
            view.push_edge(
                &id,
                EdgeHandle::False,
                next_target,
                InsertionPoint {
                    container: container.clone(),
                    index: next_index,
                },
            );
            emit_sequence(
                &condition.branch,
                Container::Branch(id.clone()),
                &id,
                EdgeHandle::True,
                next_target,
                view,
            );
        }
        StepNode::Loop(l) => {
            view.push_node(id.clone(), GraphNodeKind::Loop, l.source.as_str());
            emit_sequence(
                &l.body,
                Container::LoopBody(id.clone()),
                &id,
                EdgeHandle::Body,
                next_target,
                view,
            );
        }
    }
}
