use crate::payload::ActivityPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod and;
pub mod component;
pub mod geo;
pub mod opt_out;
pub mod scope;

pub use and::AndRule;
pub use component::ComponentCondition;
pub use geo::GeoCondition;
pub use opt_out::OptOutCondition;
pub use scope::ScopeCondition;

// ---------------------------------------------------------------------------
// Verdict - tri-state rule outcome
// ---------------------------------------------------------------------------

/// Outcome of evaluating one rule: allow, disallow, or no opinion.
///
/// `Abstain` is the identity of composition. It never overrides a decisive
/// verdict and never decides a call on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Allow,
    Disallow,
    Abstain,
}

impl Verdict {
    /// The verdict a matching rule yields for its configured polarity.
    pub fn from_allowed(allow: bool) -> Self {
        if allow {
            Verdict::Allow
        } else {
            Verdict::Disallow
        }
    }

    /// Whether this verdict decides the call (anything but abstain).
    pub fn is_decisive(self) -> bool {
        self != Verdict::Abstain
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "ALLOW"),
            Verdict::Disallow => write!(f, "DISALLOW"),
            Verdict::Abstain => write!(f, "ABSTAIN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule - the single polymorphic policy capability
// ---------------------------------------------------------------------------

/// An atomic or composite policy predicate over a context payload.
///
/// Implementations are immutable after construction and shared across
/// concurrent requests, hence `Send + Sync`. Evaluation is a pure function
/// of the payload and never fails.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Produce a verdict for the payload.
    fn evaluate(&self, payload: &ActivityPayload) -> Verdict;

    /// JSON representation of this rule for verbose traces.
    fn as_log_entry(&self) -> Value;
}

// ---------------------------------------------------------------------------
// Match + MatchRule - shared adapter for single-signal rules
// ---------------------------------------------------------------------------

/// A single-signal matching condition. Concrete conditions implement this;
/// [`MatchRule`] lifts them into [`Rule`]s with a configured verdict.
pub trait Match: fmt::Debug + Send + Sync {
    /// Whether the condition holds for the payload.
    fn matches(&self, payload: &ActivityPayload) -> bool;

    /// Stable condition name, shared by configuration and traces.
    fn kind(&self) -> &'static str;

    /// Condition detail for verbose traces.
    fn as_log_entry(&self) -> Value;
}

/// Lifts a [`Match`] condition into a [`Rule`]: the configured verdict when
/// the condition matches, abstain otherwise.
#[derive(Debug, Clone)]
pub struct MatchRule<M> {
    condition: M,
    allow: bool,
}

impl<M: Match> MatchRule<M> {
    pub fn new(condition: M, allow: bool) -> Self {
        Self { condition, allow }
    }

    pub fn condition(&self) -> &M {
        &self.condition
    }

    pub fn allow(&self) -> bool {
        self.allow
    }
}

impl<M: Match> Rule for MatchRule<M> {
    fn evaluate(&self, payload: &ActivityPayload) -> Verdict {
        if self.condition.matches(payload) {
            Verdict::from_allowed(self.allow)
        } else {
            Verdict::Abstain
        }
    }

    fn as_log_entry(&self) -> Value {
        serde_json::json!({
            "rule": self.condition.kind(),
            "condition": self.condition.as_log_entry(),
            "allow": self.allow,
        })
    }
}

/// Component-identity rule.
pub type ComponentRule = MatchRule<ComponentCondition>;
/// Geography rule with scope, geo-code, and opt-out conditions.
pub type GeoRule = MatchRule<GeoCondition>;
/// Opt-out-signal rule.
pub type OptOutRule = MatchRule<OptOutCondition>;
/// Regulatory-scope rule.
pub type ScopeRule = MatchRule<ScopeCondition>;
