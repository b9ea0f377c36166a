use bidfence_core::{Component, GeoLocation, OptOutSignal, ScopeId};
use serde::Serialize;
use std::collections::BTreeSet;

/// Immutable per-call context: who is asking, plus whichever decoded privacy
/// facets the call site has on hand.
///
/// The payload is a capability union rather than a fixed record. Each rule
/// reads only the facets it understands; how a rule treats an absent facet
/// is part of that rule's matching contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityPayload {
    pub component: Component,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opt_out: Option<OptOutSignal>,
    /// Regulatory scopes in force for this request, resolved upstream from
    /// the request's consent strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<BTreeSet<ScopeId>>,
}

impl ActivityPayload {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            geo: None,
            opt_out: None,
            scopes: None,
        }
    }

    pub fn with_geo(mut self, geo: GeoLocation) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_opt_out(mut self, signal: OptOutSignal) -> Self {
        self.opt_out = Some(signal);
        self
    }

    pub fn with_scopes<I>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = ScopeId>,
    {
        self.scopes = Some(scopes.into_iter().collect());
        self
    }
}
