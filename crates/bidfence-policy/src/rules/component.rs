use crate::payload::ActivityPayload;
use crate::rules::Match;
use bidfence_core::{Component, ComponentKind, ComponentName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Filters on the identity of the component invoking the activity.
///
/// An absent filter means "match any": a condition with neither kinds nor
/// names always matches. Present-but-empty filter sets could never match
/// and are rejected during configuration compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<BTreeSet<ComponentKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<BTreeSet<ComponentName>>,
}

impl ComponentCondition {
    /// The match-anything condition.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ComponentKind>,
    {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn with_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ComponentName>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Whether both filters are absent.
    pub fn is_any(&self) -> bool {
        self.kinds.is_none() && self.names.is_none()
    }

    /// Whether either filter is present but empty, a condition that can
    /// never hold.
    pub fn has_empty_filter(&self) -> bool {
        self.kinds.as_ref().is_some_and(|kinds| kinds.is_empty())
            || self.names.as_ref().is_some_and(|names| names.is_empty())
    }

    /// Whether the filters cover the given component.
    pub fn matches_component(&self, component: &Component) -> bool {
        let kind_ok = self
            .kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&component.kind));
        let name_ok = self
            .names
            .as_ref()
            .map_or(true, |names| names.contains(&component.name));
        kind_ok && name_ok
    }
}

impl Match for ComponentCondition {
    fn matches(&self, payload: &ActivityPayload) -> bool {
        self.matches_component(&payload.component)
    }

    fn kind(&self) -> &'static str {
        "component"
    }

    fn as_log_entry(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
