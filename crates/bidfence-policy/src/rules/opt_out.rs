use crate::payload::ActivityPayload;
use crate::rules::{ComponentCondition, Match};
use bidfence_core::OptOutSignal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opt-out-signal condition: holds when the payload carries no opt-out facet
/// (pass-through) or the facet equals the expected value, and the component
/// filter covers the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptOutCondition {
    pub expected: OptOutSignal,
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
}

impl OptOutCondition {
    pub fn new(expected: OptOutSignal) -> Self {
        Self {
            expected,
            component: ComponentCondition::any(),
        }
    }
}

impl Match for OptOutCondition {
    fn matches(&self, payload: &ActivityPayload) -> bool {
        let signal_ok = match &payload.opt_out {
            Some(signal) => signal == &self.expected,
            None => true,
        };
        signal_ok && self.component.matches_component(&payload.component)
    }

    fn kind(&self) -> &'static str {
        "opt_out"
    }

    fn as_log_entry(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
