use crate::payload::ActivityPayload;
use crate::rules::{Rule, Verdict};
use serde_json::Value;

/// Combines sub-rules left to right. A decisive sub-verdict overwrites the
/// running result; a disallow is terminal and stops evaluation immediately.
/// If every sub-rule abstains, the combinator abstains.
#[derive(Debug)]
pub struct AndRule {
    rules: Vec<Box<dyn Rule>>,
}

impl AndRule {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Rule for AndRule {
    fn evaluate(&self, payload: &ActivityPayload) -> Verdict {
        let mut result = Verdict::Abstain;
        for rule in &self.rules {
            let verdict = rule.evaluate(payload);
            if verdict.is_decisive() {
                result = verdict;
            }
            if result == Verdict::Disallow {
                break;
            }
        }
        result
    }

    fn as_log_entry(&self) -> Value {
        let entries: Vec<Value> = self.rules.iter().map(|rule| rule.as_log_entry()).collect();
        serde_json::json!({ "and": entries })
    }
}
