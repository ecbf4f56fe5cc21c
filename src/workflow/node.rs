use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a graph node, stable across edits.
///
/// Ids are regenerated on every parse; round-tripping a document preserves
/// its semantics, not its ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates the next free id.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A single node in a workflow's step sequence.
#[derive(Debug, Clone)]
pub enum StepNode {
    Task(Task),
    Condition(Condition),
    Loop(Loop),
}

impl StepNode {
    pub fn id(&self) -> NodeId {
        match self {
            StepNode::Task(t) => t.id,
            StepNode::Condition(c) => c.id,
            StepNode::Loop(l) => l.id,
        }
    }

    /// The node's id in the form used by the derived graph view.
    pub fn id_string(&self) -> String {
        self.id().to_string()
    }

    /// Direct children: a condition's true branch or a loop's body.
    pub fn children(&self) -> &[StepNode] {
        match self {
            StepNode::Task(_) => &[],
            StepNode::Condition(c) => &c.branch,
            StepNode::Loop(l) => &l.body,
        }
    }

    pub fn is_action_task(&self) -> bool {
        matches!(
            self,
            StepNode::Task(Task {
                kind: TaskKind::Action,
                ..
            })
        )
    }
}

/// Whether a task runs unconditionally or is branch/loop eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs unconditionally in the main sequence.
    Step,
    /// May live inside a condition branch or a loop.
    Action,
}

/// A single provider invocation.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: NodeId,
    pub name: String,
    pub provider_type: String,
    pub kind: TaskKind,
    /// Provider configuration name, extracted from the templated reference.
    pub config: Option<String>,
    /// Provider parameters, as declared under `with`.
    pub with: serde_json::Map<String, serde_json::Value>,
    /// Action-local variables.
    pub vars: BTreeMap<String, String>,
    /// The condition alias this action referenced through an `if` guard.
    pub guard: Option<String>,
    /// Per-action iteration expression.
    pub foreach: Option<String>,
}

impl Task {
    pub fn new(kind: TaskKind, name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Task {
            id: NodeId::fresh(),
            name: name.into(),
            provider_type: provider_type.into(),
            kind,
            config: None,
            with: serde_json::Map::new(),
            vars: BTreeMap::new(),
            guard: None,
            foreach: None,
        }
    }

    pub fn step(name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Task::new(TaskKind::Step, name, provider_type)
    }

    pub fn action(name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Task::new(TaskKind::Action, name, provider_type)
    }

    /// Clones this task under a new identity. Used when one declared action
    /// fans out into several condition branches.
    pub fn with_fresh_id(mut self) -> Self {
        self.id = NodeId::fresh();
        self
    }

    pub fn is_step(&self) -> bool {
        self.kind == TaskKind::Step
    }

    pub fn is_action(&self) -> bool {
        self.kind == TaskKind::Action
    }
}

/// The guarded-branch variant a condition evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    Threshold { value: String, compare_to: String },
    Assert { assert: String },
}

impl ConditionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConditionKind::Threshold { .. } => "threshold",
            ConditionKind::Assert { .. } => "assert",
        }
    }
}

/// A branch node guarding a list of actions.
///
/// Only the true branch is modelled; the false branch is always empty in
/// the supported subset.
#[derive(Debug, Clone)]
pub struct Condition {
    pub id: NodeId,
    pub name: String,
    /// Name later actions use to join this branch through an `if` guard.
    pub alias: Option<String>,
    pub kind: ConditionKind,
    pub branch: Vec<StepNode>,
}

impl Condition {
    pub fn new(name: impl Into<String>, kind: ConditionKind) -> Self {
        let name = name.into();
        Condition {
            id: NodeId::fresh(),
            alias: Some(name.clone()),
            name,
            kind,
            branch: Vec::new(),
        }
    }

    pub fn threshold(
        name: impl Into<String>,
        value: impl Into<String>,
        compare_to: impl Into<String>,
    ) -> Self {
        Condition::new(
            name,
            ConditionKind::Threshold {
                value: value.into(),
                compare_to: compare_to.into(),
            },
        )
    }

    pub fn assert_expr(name: impl Into<String>, assert: impl Into<String>) -> Self {
        Condition::new(
            name,
            ConditionKind::Assert {
                assert: assert.into(),
            },
        )
    }

    /// The name this condition is referenced by from `if` guards.
    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn matches_alias(&self, reference: &str) -> bool {
        self.alias_or_name() == reference
    }
}

/// A container repeating its body once per element of an iteration source.
#[derive(Debug, Clone)]
pub struct Loop {
    pub id: NodeId,
    pub source: String,
    pub body: Vec<StepNode>,
}

impl Loop {
    pub fn new(source: impl Into<String>, body: Vec<StepNode>) -> Self {
        Loop {
            id: NodeId::fresh(),
            source: source.into(),
            body,
        }
    }
}
