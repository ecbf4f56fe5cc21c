use super::node::{Condition, StepNode};
use super::trigger::Trigger;

/// The root entity of an edited workflow document.
///
/// A definition owns the trigger declarations, the named constants and the
/// single root sequence of step nodes. It is created by parsing a textual
/// document or by synthesizing an empty skeleton, and is mutated only
/// through the [`WorkflowStore`](crate::graph::WorkflowStore).
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub disabled: bool,
    /// Ordered name → value constants.
    pub consts: Vec<(String, String)>,
    pub triggers: Vec<Trigger>,
    /// Children of the single root container.
    pub sequence: Vec<StepNode>,
}

impl WorkflowDefinition {
    /// The skeleton used for a fresh, unsaved workflow.
    pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        WorkflowDefinition {
            id: id.into(),
            description: name.clone(),
            name,
            disabled: false,
            consts: Vec::new(),
            triggers: Vec::new(),
            sequence: Vec::new(),
        }
    }

    /// Visits every step node depth-first in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a StepNode)) {
        fn walk_nodes<'a>(nodes: &'a [StepNode], visit: &mut impl FnMut(&'a StepNode)) {
            for node in nodes {
                visit(node);
                walk_nodes(node.children(), visit);
            }
        }
        walk_nodes(&self.sequence, visit);
    }

    pub fn contains_node(&self, id: &str) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if node.id_string() == id {
                found = true;
            }
        });
        found
    }

    /// Looks up a step node anywhere in the tree by its graph id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut StepNode> {
        fn find_in<'a>(nodes: &'a mut [StepNode], id: &str) -> Option<&'a mut StepNode> {
            for node in nodes.iter_mut() {
                if node.id_string() == id {
                    return Some(node);
                }
                match node {
                    StepNode::Condition(c) => {
                        if let Some(found) = find_in(&mut c.branch, id) {
                            return Some(found);
                        }
                    }
                    StepNode::Loop(l) => {
                        if let Some(found) = find_in(&mut l.body, id) {
                            return Some(found);
                        }
                    }
                    StepNode::Task(_) => {}
                }
            }
            None
        }
        find_in(&mut self.sequence, id)
    }

    /// Removes a node (and the subtree it owns) from wherever it sits.
    /// Returns false if no node with that id exists.
    pub fn remove_node(&mut self, id: &str) -> bool {
        fn remove_from(nodes: &mut Vec<StepNode>, id: &str) -> bool {
            if let Some(pos) = nodes.iter().position(|n| n.id_string() == id) {
                nodes.remove(pos);
                return true;
            }
            for node in nodes.iter_mut() {
                match node {
                    StepNode::Condition(c) => {
                        if remove_from(&mut c.branch, id) {
                            return true;
                        }
                    }
                    StepNode::Loop(l) => {
                        if remove_from(&mut l.body, id) {
                            return true;
                        }
                    }
                    StepNode::Task(_) => {}
                }
            }
            false
        }
        remove_from(&mut self.sequence, id)
    }

    /// Finds a previously emitted condition by alias, searching loop bodies
    /// as well: a condition wrapped in a loop stays referencable from later
    /// actions in the same scope.
    pub fn find_condition_mut(&mut self, alias: &str) -> Option<&mut Condition> {
        find_condition_in(&mut self.sequence, alias)
    }

    /// Looks up a condition node anywhere in the tree by its graph id.
    pub fn condition_by_id_mut(&mut self, id: &str) -> Option<&mut Condition> {
        match self.node_mut(id) {
            Some(StepNode::Condition(c)) => Some(c),
            _ => None,
        }
    }

    /// Looks up a loop node anywhere in the tree by its graph id.
    pub fn loop_by_id_mut(&mut self, id: &str) -> Option<&mut super::node::Loop> {
        match self.node_mut(id) {
            Some(StepNode::Loop(l)) => Some(l),
            _ => None,
        }
    }
}

pub(crate) fn find_condition_in<'a>(
    nodes: &'a mut [StepNode],
    alias: &str,
) -> Option<&'a mut Condition> {
    for node in nodes.iter_mut() {
        match node {
            StepNode::Condition(c) if c.matches_alias(alias) => return Some(c),
            StepNode::Loop(l) => {
                if let Some(c) = find_condition_in(&mut l.body, alias) {
                    return Some(c);
                }
            }
            _ => {}
        }
    }
    None
}
