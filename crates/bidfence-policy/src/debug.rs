use crate::payload::ActivityPayload;
use crate::rules::{Rule, Verdict};
use bidfence_core::Activity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// TraceLevel - how much detail the sink records
// ---------------------------------------------------------------------------

/// Requested trace verbosity. The sink holds an `Option<TraceLevel>`;
/// `None` disables recording entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Record every entry without per-rule configuration detail.
    Basic,
    /// Record every entry and embed each rule's log representation.
    Verbose,
}

// ---------------------------------------------------------------------------
// TraceEntry - one recorded evaluation step
// ---------------------------------------------------------------------------

/// One step of an activity evaluation, in recording order. Serializes into
/// the debug extension of an auction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum TraceEntry {
    /// An activity was invoked with this payload snapshot.
    ActivityInvoked {
        activity: Activity,
        payload: ActivityPayload,
    },
    /// The default verdict that applies if every rule abstains.
    DefaultResult { allow: bool },
    /// One rule was evaluated. `rule` carries the rule's log representation
    /// at verbose level and is absent otherwise.
    RuleProcessed {
        #[serde(skip_serializing_if = "Option::is_none")]
        rule: Option<Value>,
        verdict: Verdict,
    },
    /// The final boolean for the invocation.
    ActivityResult { activity: Activity, allowed: bool },
}

// ---------------------------------------------------------------------------
// TraceSink - per-request, append-only trace collector
// ---------------------------------------------------------------------------

/// Per-request trace collector.
///
/// Created fresh for each request, written only by the thread handling that
/// request, and discarded with it; needs no synchronization. The common
/// untraced path costs one level check per recording call.
#[derive(Debug, Default)]
pub struct TraceSink {
    level: Option<TraceLevel>,
    entries: Vec<TraceEntry>,
}

impl TraceSink {
    pub fn new(level: Option<TraceLevel>) -> Self {
        Self {
            level,
            entries: Vec::new(),
        }
    }

    /// A sink that records nothing.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn level(&self) -> Option<TraceLevel> {
        self.level
    }

    /// Ordered, read-only view of everything recorded so far.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub(crate) fn record_invocation(&mut self, activity: Activity, payload: &ActivityPayload) {
        if self.level.is_none() {
            return;
        }
        self.entries.push(TraceEntry::ActivityInvoked {
            activity,
            payload: payload.clone(),
        });
    }

    pub(crate) fn record_default(&mut self, allow: bool) {
        if self.level.is_none() {
            return;
        }
        self.entries.push(TraceEntry::DefaultResult { allow });
    }

    pub(crate) fn record_rule(&mut self, rule: &dyn Rule, verdict: Verdict) {
        let level = match self.level {
            Some(level) => level,
            None => return,
        };
        let rule = match level {
            TraceLevel::Verbose => Some(rule.as_log_entry()),
            TraceLevel::Basic => None,
        };
        self.entries.push(TraceEntry::RuleProcessed { rule, verdict });
    }

    pub(crate) fn record_result(&mut self, activity: Activity, allowed: bool) {
        if self.level.is_none() {
            return;
        }
        self.entries.push(TraceEntry::ActivityResult { activity, allowed });
    }
}
