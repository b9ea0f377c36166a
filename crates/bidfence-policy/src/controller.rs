use crate::debug::TraceSink;
use crate::payload::ActivityPayload;
use crate::rules::{Rule, Verdict};

/// Result of one controller evaluation.
///
/// `rules_evaluated` is the 1-based position of the deciding rule, or the
/// total rule count if every rule abstained and the default applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityCall {
    pub allowed: bool,
    pub rules_evaluated: usize,
}

/// Compiled policy for one activity: a default verdict plus an ordered rule
/// list. Built once by configuration compilation and immutable afterwards;
/// list order is evaluation priority.
#[derive(Debug)]
pub struct ActivityController {
    allow_by_default: bool,
    rules: Vec<Box<dyn Rule>>,
}

impl ActivityController {
    pub fn new(allow_by_default: bool, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            allow_by_default,
            rules,
        }
    }

    /// A controller that allows unconditionally, the behavior of an
    /// unconfigured activity.
    pub fn allow_all() -> Self {
        Self::new(true, Vec::new())
    }

    pub fn allow_by_default(&self) -> bool {
        self.allow_by_default
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Walk the rules in priority order, stopping at the first decisive
    /// verdict; fall back to the default when every rule abstains.
    pub fn evaluate(&self, payload: &ActivityPayload, sink: &mut TraceSink) -> ActivityCall {
        sink.record_default(self.allow_by_default);
        for (index, rule) in self.rules.iter().enumerate() {
            let verdict = rule.evaluate(payload);
            sink.record_rule(rule.as_ref(), verdict);
            if verdict.is_decisive() {
                return ActivityCall {
                    allowed: verdict == Verdict::Allow,
                    rules_evaluated: index + 1,
                };
            }
        }
        ActivityCall {
            allowed: self.allow_by_default,
            rules_evaluated: self.rules.len(),
        }
    }
}
