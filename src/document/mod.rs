//! Raw, serde-mapped structures of the textual workflow form.
//!
//! The parser and the serializer both go through these types, so the
//! canonical field order of the emitted document is defined in exactly one
//! place: the declaration order below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::workflow::{IntoWorkflow, WorkflowDefinition};

/// Top-level wrapper. `workflow` is the current key; `alert` is the legacy
/// spelling older documents still carry. The two are equivalent.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<WorkflowDoc>,
}

impl WorkflowFile {
    /// The workflow payload, whichever wrapper key carried it.
    pub fn into_payload(self) -> Option<WorkflowDoc> {
        self.workflow.or(self.alert)
    }
}

impl IntoWorkflow for WorkflowFile {
    fn into_workflow(self) -> Result<WorkflowDefinition, ConversionError> {
        let doc = self
            .into_payload()
            .ok_or_else(|| ConversionError::Invalid("missing workflow payload".to_string()))?;
        let output = crate::parser::lowering::lower(doc)
            .map_err(|e| ConversionError::Invalid(e.to_string()))?;
        Ok(output.workflow)
    }
}

/// The workflow payload in canonical field order.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consts: Option<serde_yaml::Mapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Vec<TriggerDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionDoc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerDoc {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterDoc {
    pub key: String,
    pub value: serde_yaml::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StepDoc {
    pub name: String,
    pub provider: ProviderDoc,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionDoc {
    pub name: String,
    pub provider: ProviderDoc,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Vec<ConditionDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreach: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vars: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderDoc {
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConditionDoc {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_to: Option<serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assert: Option<String>,
}
