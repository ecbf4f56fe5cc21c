//! Common test utilities for building workflow documents and catalogs.
use tocsin::prelude::*;

/// A workflow exercising steps, an aliased condition, an `if` reference
/// and two triggers.
#[allow(dead_code)]
pub fn disk_alert_text() -> &'static str {
    r#"
workflow:
  id: disk-usage
  name: Disk usage check
  description: Page when disk usage crosses the line
  disabled: false
  consts:
    threshold: "90"
  triggers:
    - type: alert
      filters:
        - key: source
          value: grafana
    - type: interval
      value: 300
  steps:
    - name: fetch-usage
      provider:
        type: victoriametrics
        config: "{{ providers.vm-main }}"
        with:
          query: disk_used_percent
  actions:
    - name: notify-slack
      provider:
        type: slack
        config: "{{ providers.ops-slack }}"
        with:
          message: disk usage is high
      condition:
        - type: threshold
          name: usage-high
          value: "{{ steps.fetch-usage.results }}"
          compare_to: "90"
    - name: open-ticket
      provider:
        type: jira
      if: "{{ usage-high }}"
"#
}

/// The minimal well-formed document: one step, one unconditioned action,
/// one manual trigger.
#[allow(dead_code)]
pub fn minimal_text() -> &'static str {
    r#"
workflow:
  id: w1
  triggers:
    - type: manual
  steps:
    - name: s1
      provider:
        type: mock
        config: "{{ providers.p1 }}"
  actions:
    - name: a1
      provider:
        type: slack
"#
}

/// A catalog covering every provider type the sample documents use.
#[allow(dead_code)]
pub fn sample_catalog() -> ProviderCatalog {
    ProviderCatalog::new(vec![
        ProviderInfo {
            provider_type: "victoriametrics".to_string(),
            can_query: true,
            can_notify: false,
            query_params: vec!["query".to_string(), "start".to_string()],
            notify_params: vec![],
        },
        ProviderInfo {
            provider_type: "slack".to_string(),
            can_query: false,
            can_notify: true,
            query_params: vec![],
            notify_params: vec!["message".to_string(), "channel".to_string()],
        },
        ProviderInfo {
            provider_type: "jira".to_string(),
            can_query: false,
            can_notify: true,
            query_params: vec![],
            notify_params: vec!["summary".to_string()],
        },
        ProviderInfo {
            provider_type: "mock".to_string(),
            can_query: true,
            can_notify: true,
            query_params: vec!["query".to_string()],
            notify_params: vec!["message".to_string()],
        },
    ])
}

/// Parses a document, failing the test on fatal errors.
#[allow(dead_code)]
pub fn parse_ok(text: &str) -> ParseOutput {
    parse(text).expect("Failed to parse workflow document")
}

/// Renders the branch/loop structure of a sequence as a flat list of
/// strings, so tests can compare structure without chasing node ids.
#[allow(dead_code)]
pub fn shape(nodes: &[StepNode]) -> Vec<String> {
    nodes.iter().map(describe).collect()
}

#[allow(dead_code)]
fn describe(node: &StepNode) -> String {
    match node {
        StepNode::Task(task) => {
            let kind = match task.kind {
                TaskKind::Step => "step",
                TaskKind::Action => "action",
            };
            format!("{}:{}/{}", kind, task.name, task.provider_type)
        }
        StepNode::Condition(condition) => format!(
            "condition:{}[{}]",
            condition.name,
            shape(&condition.branch).join(", ")
        ),
        StepNode::Loop(l) => format!("loop:{}[{}]", l.source, shape(&l.body).join(", ")),
    }
}

/// The multiset of (kind, name, provider type) triples across the whole
/// tree, sorted for comparison.
#[allow(dead_code)]
pub fn task_triples(workflow: &WorkflowDefinition) -> Vec<(String, String, String)> {
    let mut triples = Vec::new();
    workflow.walk(&mut |node| {
        if let StepNode::Task(task) = node {
            let kind = match task.kind {
                TaskKind::Step => "step",
                TaskKind::Action => "action",
            };
            triples.push((
                kind.to_string(),
                task.name.clone(),
                task.provider_type.clone(),
            ));
        }
    });
    triples.sort();
    triples
}
