use crate::payload::ActivityPayload;
use crate::rules::{ComponentCondition, Match};
use bidfence_core::ScopeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Regulatory-scope condition: holds when the payload's scope facet names
/// this scope and the component filter covers the caller.
///
/// Unlike the geo and opt-out checks, an absent or empty scope facet is a
/// hard non-match. No facet means no regime is in force for the request, so
/// a rule keyed to a regime has nothing to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCondition {
    pub scope: ScopeId,
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
}

impl ScopeCondition {
    pub fn new(scope: impl Into<ScopeId>) -> Self {
        Self {
            scope: scope.into(),
            component: ComponentCondition::any(),
        }
    }
}

impl Match for ScopeCondition {
    fn matches(&self, payload: &ActivityPayload) -> bool {
        let scope_in_force = payload
            .scopes
            .as_ref()
            .is_some_and(|scopes| scopes.contains(&self.scope));
        scope_in_force && self.component.matches_component(&payload.component)
    }

    fn kind(&self) -> &'static str {
        "scope"
    }

    fn as_log_entry(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
