/// One key/value pair of an alert trigger's filter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AlertFilter {
    pub key: String,
    pub value: String,
}

/// A declaration of what causes a workflow to run.
///
/// Each trigger type appears at most once per workflow; the mutation store
/// rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fires on alerts matching all filter pairs.
    Alert { filters: Vec<AlertFilter> },
    /// Fires on explicit operator invocation.
    Manual,
    /// Fires on a fixed schedule.
    Interval { value: String },
    /// Fires on incident lifecycle events.
    Incident { events: Vec<String> },
}

impl Trigger {
    pub fn type_name(&self) -> &'static str {
        match self {
            Trigger::Alert { .. } => "alert",
            Trigger::Manual => "manual",
            Trigger::Interval { .. } => "interval",
            Trigger::Incident { .. } => "incident",
        }
    }

    /// The id of this trigger's node in the derived graph view.
    pub fn graph_node_id(&self) -> String {
        format!("trigger-{}", self.type_name())
    }
}
