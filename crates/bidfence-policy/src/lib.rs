//! Bidfence activity control engine.
//!
//! Before the auction server performs a regulated operation (calling a
//! bidder, syncing a user id, transmitting precise geo, passing first-party
//! data along) it asks this crate one question: is this activity allowed in
//! this context? Each activity carries a priority-ordered list of rules over
//! decoded privacy signals; evaluation stops at the first decisive verdict
//! and falls back to the activity's default when every rule abstains.
//!
//! Key properties:
//! - Tri-state rule verdicts (allow / disallow / abstain), with abstain as
//!   the identity of composition
//! - First-decisive-wins controller evaluation and a deny-short-circuit
//!   composite ([`AndRule`])
//! - Registry completeness validated at construction, never defaulted at
//!   call time
//! - Controllers are immutable and shared lock-free across requests
//! - Per-request debug trace sink (off / basic / verbose) that explains
//!   every verdict
//! - Explicit, fail-fast compilation from account configuration

pub mod config;
pub mod controller;
pub mod debug;
pub mod error;
pub mod payload;
pub mod registry;
pub mod rules;

pub use config::{
    AccountActivityConfig, ActivityConfig, AndRuleSpec, ComponentRuleSpec, GeoRuleSpec,
    OptOutRuleSpec, RuleSpec, ScopeRuleSpec,
};
pub use controller::{ActivityCall, ActivityController};
pub use debug::{TraceEntry, TraceLevel, TraceSink};
pub use error::{PolicyError, PolicyResult};
pub use payload::ActivityPayload;
pub use registry::ActivityRegistry;
pub use rules::{
    AndRule, ComponentCondition, ComponentRule, GeoCondition, GeoRule, Match, MatchRule,
    OptOutCondition, OptOutRule, Rule, ScopeCondition, ScopeRule, Verdict,
};
