use crate::payload::ActivityPayload;
use crate::rules::{ComponentCondition, Match};
use bidfence_core::{GeoCode, OptOutSignal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geography condition: regulatory-scope applicability plus optional
/// geo-code and opt-out checks, narrowed by a component filter.
///
/// `scope_applies` is decided upstream when the account configuration is
/// resolved against the request's decoded consent facts. The geo and
/// opt-out checks pass through when the payload lacks the corresponding
/// facet, so one rule set applies uniformly across call sites that do and
/// do not carry the facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCondition {
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
    pub scope_applies: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_codes: Option<Vec<GeoCode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_out: Option<OptOutSignal>,
}

impl GeoCondition {
    fn geo_matches(&self, payload: &ActivityPayload) -> bool {
        let codes = match &self.geo_codes {
            Some(codes) => codes,
            None => return true,
        };
        let location = match &payload.geo {
            Some(location) => location,
            // facet absent: pass through
            None => return true,
        };
        codes.iter().any(|code| code.matches(location))
    }

    fn opt_out_matches(&self, payload: &ActivityPayload) -> bool {
        let expected = match &self.opt_out {
            Some(expected) => expected,
            None => return true,
        };
        match &payload.opt_out {
            Some(signal) => signal == expected,
            None => true,
        }
    }
}

impl Match for GeoCondition {
    fn matches(&self, payload: &ActivityPayload) -> bool {
        self.scope_applies
            && self.geo_matches(payload)
            && self.opt_out_matches(payload)
            && self.component.matches_component(&payload.component)
    }

    fn kind(&self) -> &'static str {
        "geo"
    }

    fn as_log_entry(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
