use std::collections::HashMap;

use bidfence_core::Activity;
use tracing::trace;

use crate::controller::ActivityController;
use crate::debug::TraceSink;
use crate::error::{PolicyError, PolicyResult};
use crate::payload::ActivityPayload;

/// One controller per known activity; the entry point callers use.
///
/// Completeness is validated at construction: a mapping that misses any
/// [`Activity`] is rejected outright rather than allowed to default
/// silently at call time. The registry is immutable afterwards and shared
/// across concurrent requests without locking.
#[derive(Debug)]
pub struct ActivityRegistry {
    controllers: HashMap<Activity, ActivityController>,
}

impl ActivityRegistry {
    pub fn new(controllers: HashMap<Activity, ActivityController>) -> PolicyResult<Self> {
        for activity in Activity::ALL {
            if !controllers.contains_key(&activity) {
                return Err(PolicyError::MissingActivity(activity));
            }
        }
        Ok(Self { controllers })
    }

    /// A registry that allows every activity unconditionally, the behavior
    /// of an account without activity configuration.
    pub fn allow_all() -> Self {
        let controllers = Activity::ALL
            .into_iter()
            .map(|activity| (activity, ActivityController::allow_all()))
            .collect();
        Self { controllers }
    }

    /// The controller for an activity. Infallible because completeness is
    /// enforced at construction.
    pub fn controller(&self, activity: Activity) -> &ActivityController {
        self.controllers
            .get(&activity)
            .expect("registry validated complete at construction")
    }

    /// Whether the activity is allowed for this payload. Records the
    /// invocation, every rule evaluated, and the result on the sink.
    pub fn is_allowed(
        &self,
        activity: Activity,
        payload: &ActivityPayload,
        sink: &mut TraceSink,
    ) -> bool {
        sink.record_invocation(activity, payload);
        let call = self.controller(activity).evaluate(payload, sink);
        trace!(
            activity = %activity,
            component = %payload.component,
            allowed = call.allowed,
            rules_evaluated = call.rules_evaluated,
            "activity verdict"
        );
        sink.record_result(activity, call.allowed);
        call.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::{TraceEntry, TraceLevel};
    use crate::rules::{Rule, Verdict};
    use bidfence_core::Component;
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct FixedRule(Verdict);

    impl Rule for FixedRule {
        fn evaluate(&self, _payload: &ActivityPayload) -> Verdict {
            self.0
        }

        fn as_log_entry(&self) -> Value {
            json!("fixed")
        }
    }

    fn make_payload() -> ActivityPayload {
        ActivityPayload::new(Component::bidder("acme"))
    }

    fn make_controllers() -> HashMap<Activity, ActivityController> {
        Activity::ALL
            .into_iter()
            .map(|activity| (activity, ActivityController::allow_all()))
            .collect()
    }

    #[test]
    fn test_construction_requires_every_activity() {
        let mut controllers = make_controllers();
        controllers.remove(&Activity::ReportAnalytics);
        let result = ActivityRegistry::new(controllers);
        assert_eq!(
            result.unwrap_err(),
            PolicyError::MissingActivity(Activity::ReportAnalytics)
        );
    }

    #[test]
    fn test_complete_mapping_constructs() {
        assert!(ActivityRegistry::new(make_controllers()).is_ok());
    }

    #[test]
    fn test_allow_all_permits_everything() {
        let registry = ActivityRegistry::allow_all();
        let mut sink = TraceSink::disabled();
        for activity in Activity::ALL {
            assert!(registry.is_allowed(activity, &make_payload(), &mut sink));
        }
    }

    #[test]
    fn test_dispatches_to_matching_controller() {
        let mut controllers = make_controllers();
        controllers.insert(
            Activity::SyncUser,
            ActivityController::new(true, vec![Box::new(FixedRule(Verdict::Disallow))]),
        );
        let registry = ActivityRegistry::new(controllers).unwrap();
        let mut sink = TraceSink::disabled();
        assert!(!registry.is_allowed(Activity::SyncUser, &make_payload(), &mut sink));
        assert!(registry.is_allowed(Activity::CallBidder, &make_payload(), &mut sink));
    }

    #[test]
    fn test_trace_spans_invocation_to_result() {
        let mut controllers = make_controllers();
        controllers.insert(
            Activity::SyncUser,
            ActivityController::new(
                true,
                vec![
                    Box::new(FixedRule(Verdict::Abstain)),
                    Box::new(FixedRule(Verdict::Disallow)),
                ],
            ),
        );
        let registry = ActivityRegistry::new(controllers).unwrap();
        let mut sink = TraceSink::new(Some(TraceLevel::Basic));
        registry.is_allowed(Activity::SyncUser, &make_payload(), &mut sink);

        let trace = sink.trace();
        assert_eq!(trace.len(), 5);
        assert!(matches!(
            trace[0],
            TraceEntry::ActivityInvoked {
                activity: Activity::SyncUser,
                ..
            }
        ));
        assert!(matches!(trace[1], TraceEntry::DefaultResult { allow: true }));
        assert!(matches!(
            trace[2],
            TraceEntry::RuleProcessed {
                verdict: Verdict::Abstain,
                ..
            }
        ));
        assert!(matches!(
            trace[3],
            TraceEntry::RuleProcessed {
                verdict: Verdict::Disallow,
                ..
            }
        ));
        assert!(matches!(
            trace[4],
            TraceEntry::ActivityResult {
                activity: Activity::SyncUser,
                allowed: false,
            }
        ));
    }

    #[test]
    fn test_rule_entries_bounded_by_rule_count() {
        let registry = ActivityRegistry::allow_all();
        let mut sink = TraceSink::new(Some(TraceLevel::Basic));
        registry.is_allowed(Activity::CallBidder, &make_payload(), &mut sink);
        // no rules configured: invocation, default, result
        assert_eq!(sink.trace().len(), 3);
    }
}
