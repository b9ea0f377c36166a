use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use bidfence_core::{Activity, ComponentKind, ComponentName, GeoCode, OptOutSignal, ScopeId};

use crate::controller::ActivityController;
use crate::error::{PolicyError, PolicyResult};
use crate::registry::ActivityRegistry;
use crate::rules::{
    AndRule, ComponentCondition, GeoCondition, MatchRule, OptOutCondition, Rule, ScopeCondition,
};

// ---------------------------------------------------------------------------
// Account configuration shape
// ---------------------------------------------------------------------------

/// Per-account activity controls as produced by the account config loader.
///
/// Activities absent from the map compile to default-allow controllers, so a
/// partial configuration is valid; a malformed one is not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountActivityConfig {
    #[serde(default)]
    pub activities: HashMap<Activity, ActivityConfig>,
}

/// Controls for one activity: the default verdict plus an ordered list of
/// rule specifications. Earlier rules take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_true")]
    pub allow: bool,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule specification, discriminated by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    Component(ComponentRuleSpec),
    Geo(GeoRuleSpec),
    OptOut(OptOutRuleSpec),
    Scope(ScopeRuleSpec),
    And(AndRuleSpec),
}

/// Component-identity rule specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<BTreeSet<ComponentKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<BTreeSet<ComponentName>>,
    #[serde(default = "default_true")]
    pub allow: bool,
}

/// Geography rule specification.
///
/// `scope_applies` is filled in by the config resolver from decoded consent
/// facts; absent means the regime applies. Geo codes arrive as raw strings
/// and are parsed, and rejected if malformed, at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRuleSpec {
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
    #[serde(default = "default_true")]
    pub scope_applies: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_out: Option<OptOutSignal>,
    #[serde(default = "default_true")]
    pub allow: bool,
}

/// Opt-out-signal rule specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptOutRuleSpec {
    pub expected: OptOutSignal,
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
    #[serde(default = "default_true")]
    pub allow: bool,
}

/// Regulatory-scope rule specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeRuleSpec {
    pub scope: ScopeId,
    #[serde(default, skip_serializing_if = "ComponentCondition::is_any")]
    pub component: ComponentCondition,
    #[serde(default = "default_true")]
    pub allow: bool,
}

/// Composite rule specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndRuleSpec {
    pub rules: Vec<RuleSpec>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Compilation - explicit, fail-fast translation into a registry
// ---------------------------------------------------------------------------

impl AccountActivityConfig {
    /// Translate the configuration into a complete, validated registry.
    ///
    /// Fails on the first malformed rule. A specification that could never
    /// match, such as an empty filter list or an empty composite, is refused
    /// rather than compiled into a rule that silently misbehaves.
    pub fn compile(&self) -> PolicyResult<ActivityRegistry> {
        let mut controllers = HashMap::with_capacity(Activity::ALL.len());
        for activity in Activity::ALL {
            let controller = match self.activities.get(&activity) {
                Some(config) => compile_activity(activity, config)?,
                None => ActivityController::allow_all(),
            };
            controllers.insert(activity, controller);
        }
        debug!(
            configured = self.activities.len(),
            "compiled account activity controls"
        );
        ActivityRegistry::new(controllers)
    }
}

fn compile_activity(
    activity: Activity,
    config: &ActivityConfig,
) -> PolicyResult<ActivityController> {
    let rules = config
        .rules
        .iter()
        .map(|spec| compile_rule(activity, spec))
        .collect::<PolicyResult<Vec<_>>>()?;
    Ok(ActivityController::new(config.allow, rules))
}

fn compile_rule(activity: Activity, spec: &RuleSpec) -> PolicyResult<Box<dyn Rule>> {
    match spec {
        RuleSpec::Component(spec) => {
            let condition = ComponentCondition {
                kinds: spec.kinds.clone(),
                names: spec.names.clone(),
            };
            validate_component(activity, &condition)?;
            Ok(Box::new(MatchRule::new(condition, spec.allow)))
        }
        RuleSpec::Geo(spec) => {
            validate_component(activity, &spec.component)?;
            let geo_codes = match &spec.geo_codes {
                Some(raw) if raw.is_empty() => {
                    return Err(invalid(activity, "geo_codes must not be an empty list"));
                }
                Some(raw) => Some(
                    raw.iter()
                        .map(|code| {
                            GeoCode::parse(code).map_err(|e| invalid(activity, e.to_string()))
                        })
                        .collect::<PolicyResult<Vec<_>>>()?,
                ),
                None => None,
            };
            if spec
                .opt_out
                .as_ref()
                .is_some_and(|signal| signal.as_str().is_empty())
            {
                return Err(invalid(activity, "opt_out value must not be empty"));
            }
            let condition = GeoCondition {
                component: spec.component.clone(),
                scope_applies: spec.scope_applies,
                geo_codes,
                opt_out: spec.opt_out.clone(),
            };
            Ok(Box::new(MatchRule::new(condition, spec.allow)))
        }
        RuleSpec::OptOut(spec) => {
            validate_component(activity, &spec.component)?;
            if spec.expected.as_str().is_empty() {
                return Err(invalid(activity, "expected opt-out value must not be empty"));
            }
            let condition = OptOutCondition {
                expected: spec.expected.clone(),
                component: spec.component.clone(),
            };
            Ok(Box::new(MatchRule::new(condition, spec.allow)))
        }
        RuleSpec::Scope(spec) => {
            validate_component(activity, &spec.component)?;
            if spec.scope.as_str().is_empty() {
                return Err(invalid(activity, "scope id must not be empty"));
            }
            let condition = ScopeCondition {
                scope: spec.scope.clone(),
                component: spec.component.clone(),
            };
            Ok(Box::new(MatchRule::new(condition, spec.allow)))
        }
        RuleSpec::And(spec) => {
            if spec.rules.is_empty() {
                return Err(invalid(activity, "'and' rule list must not be empty"));
            }
            let rules = spec
                .rules
                .iter()
                .map(|sub| compile_rule(activity, sub))
                .collect::<PolicyResult<Vec<_>>>()?;
            Ok(Box::new(AndRule::new(rules)))
        }
    }
}

fn validate_component(activity: Activity, condition: &ComponentCondition) -> PolicyResult<()> {
    if condition.has_empty_filter() {
        return Err(invalid(
            activity,
            "component filter must not be an empty list",
        ));
    }
    Ok(())
}

fn invalid(activity: Activity, reason: impl Into<String>) -> PolicyError {
    PolicyError::InvalidRule {
        activity,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::TraceSink;
    use crate::payload::ActivityPayload;
    use bidfence_core::{Component, GeoLocation};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AccountActivityConfig {
        serde_json::from_value(value).unwrap()
    }

    fn make_payload() -> ActivityPayload {
        ActivityPayload::new(Component::bidder("acme"))
    }

    fn geo_payload(country: &str, region: Option<&str>) -> ActivityPayload {
        let mut geo = GeoLocation::new(country);
        if let Some(region) = region {
            geo = geo.with_region(region);
        }
        ActivityPayload::new(Component::bidder("acme")).with_geo(geo)
    }

    #[test]
    fn test_empty_config_allows_everything() {
        let registry = AccountActivityConfig::default().compile().unwrap();
        let mut sink = TraceSink::disabled();
        for activity in Activity::ALL {
            assert!(registry.is_allowed(activity, &make_payload(), &mut sink));
        }
    }

    #[test]
    fn test_component_rule_blocks_named_bidder() {
        let config = parse(json!({
            "activities": {
                "sync_user": {
                    "rules": [
                        { "kind": "component", "names": ["acme"], "allow": false }
                    ]
                }
            }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();
        assert!(!registry.is_allowed(Activity::SyncUser, &make_payload(), &mut sink));
        assert!(registry.is_allowed(
            Activity::SyncUser,
            &ActivityPayload::new(Component::bidder("zeta")),
            &mut sink
        ));
        // other activities keep their default-allow controllers
        assert!(registry.is_allowed(Activity::CallBidder, &make_payload(), &mut sink));
    }

    #[test]
    fn test_default_verdict_from_config() {
        let config = parse(json!({
            "activities": { "transmit_precise_geo": { "allow": false } }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();
        assert!(!registry.is_allowed(Activity::TransmitPreciseGeo, &make_payload(), &mut sink));
    }

    #[test]
    fn test_rule_order_is_priority() {
        let config = parse(json!({
            "activities": {
                "sync_user": {
                    "allow": false,
                    "rules": [
                        { "kind": "component", "names": ["acme"], "allow": true },
                        { "kind": "component", "names": ["acme"], "allow": false }
                    ]
                }
            }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();
        assert!(registry.is_allowed(Activity::SyncUser, &make_payload(), &mut sink));
    }

    #[test]
    fn test_geo_rule_end_to_end() {
        let config = parse(json!({
            "activities": {
                "transmit_precise_geo": {
                    "rules": [
                        { "kind": "geo", "geo_codes": ["US-CA", "us-co"], "allow": false }
                    ]
                }
            }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();
        assert!(!registry.is_allowed(
            Activity::TransmitPreciseGeo,
            &geo_payload("us", Some("ca")),
            &mut sink
        ));
        assert!(!registry.is_allowed(
            Activity::TransmitPreciseGeo,
            &geo_payload("US", Some("CO")),
            &mut sink
        ));
        assert!(registry.is_allowed(
            Activity::TransmitPreciseGeo,
            &geo_payload("US", Some("NY")),
            &mut sink
        ));
        // geo facet absent: the geo check passes through and the rule fires
        assert!(!registry.is_allowed(Activity::TransmitPreciseGeo, &make_payload(), &mut sink));
    }

    #[test]
    fn test_scope_applies_false_disables_geo_rule() {
        let config = parse(json!({
            "activities": {
                "transmit_precise_geo": {
                    "rules": [
                        { "kind": "geo", "scope_applies": false, "geo_codes": ["US"], "allow": false }
                    ]
                }
            }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();
        assert!(registry.is_allowed(
            Activity::TransmitPreciseGeo,
            &geo_payload("US", None),
            &mut sink
        ));
    }

    #[test]
    fn test_and_rule_composes() {
        let config = parse(json!({
            "activities": {
                "transmit_user_fpd": {
                    "allow": false,
                    "rules": [
                        { "kind": "and", "rules": [
                            { "kind": "scope", "scope": "usnat", "allow": true },
                            { "kind": "opt_out", "expected": "1", "allow": false }
                        ]}
                    ]
                }
            }
        }));
        let registry = config.compile().unwrap();
        let mut sink = TraceSink::disabled();

        // scope in force, user opted out: the trailing disallow wins
        let opted_out = make_payload()
            .with_scopes([ScopeId::from("usnat")])
            .with_opt_out(OptOutSignal::set());
        assert!(!registry.is_allowed(Activity::TransmitUserFpd, &opted_out, &mut sink));

        // scope in force, not opted out: the scope allow stands
        let not_opted_out = make_payload()
            .with_scopes([ScopeId::from("usnat")])
            .with_opt_out(OptOutSignal::new("0"));
        assert!(registry.is_allowed(Activity::TransmitUserFpd, &not_opted_out, &mut sink));
    }

    #[test]
    fn test_rejects_empty_component_filter() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "component", "names": [] } ] }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule {
                activity: Activity::SyncUser,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_empty_geo_codes() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "geo", "geo_codes": [] } ] }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_rejects_malformed_geo_code() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "geo", "geo_codes": ["US-"] } ] }
            }
        }));
        match config.compile().unwrap_err() {
            PolicyError::InvalidRule { reason, .. } => assert!(reason.contains("region")),
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_scope_id() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "scope", "scope": "" } ] }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_rejects_empty_expected_opt_out() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "opt_out", "expected": "" } ] }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_rejects_empty_and_list() {
        let config = parse(json!({
            "activities": {
                "sync_user": { "rules": [ { "kind": "and", "rules": [] } ] }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_validation_recurses_into_composites() {
        let config = parse(json!({
            "activities": {
                "sync_user": {
                    "rules": [
                        { "kind": "and", "rules": [
                            { "kind": "component", "names": [], "allow": false }
                        ]}
                    ]
                }
            }
        }));
        assert!(matches!(
            config.compile().unwrap_err(),
            PolicyError::InvalidRule { .. }
        ));
    }
}
