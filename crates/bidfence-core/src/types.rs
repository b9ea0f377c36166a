use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Activity - regulated operations the auction server can gate
// ---------------------------------------------------------------------------

/// One regulated operation the server performs on behalf of a request.
///
/// The enum is closed: adding a variant forces every match site and every
/// registry completeness check through the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Send the auction request to a bid adapter.
    CallBidder,
    /// Sync a user identifier with an external party.
    SyncUser,
    /// Transmit fine-grained geographic data downstream.
    TransmitPreciseGeo,
    /// Transmit user first-party data downstream.
    TransmitUserFpd,
    /// Transmit site first-party data downstream.
    TransmitSiteFpd,
    /// Hand the request to analytics adapters.
    ReportAnalytics,
}

impl Activity {
    /// Every activity, in declaration order. Registry completeness is
    /// checked against this list.
    pub const ALL: [Activity; 6] = [
        Activity::CallBidder,
        Activity::SyncUser,
        Activity::TransmitPreciseGeo,
        Activity::TransmitUserFpd,
        Activity::TransmitSiteFpd,
        Activity::ReportAnalytics,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::CallBidder => "call_bidder",
            Activity::SyncUser => "sync_user",
            Activity::TransmitPreciseGeo => "transmit_precise_geo",
            Activity::TransmitUserFpd => "transmit_user_fpd",
            Activity::TransmitSiteFpd => "transmit_site_fpd",
            Activity::ReportAnalytics => "report_analytics",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ComponentKind - pipeline participant types
// ---------------------------------------------------------------------------

/// The kind of pipeline participant on whose behalf an activity runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// A bid adapter.
    Bidder,
    /// An analytics adapter.
    Analytics,
    /// A real-time-data module.
    RtdModule,
    /// Any other pipeline module.
    GeneralModule,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Bidder => "bidder",
            ComponentKind::Analytics => "analytics",
            ComponentKind::RtdModule => "rtd_module",
            ComponentKind::GeneralModule => "general_module",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Typed identifiers - prevent stringly-typed confusion
// ---------------------------------------------------------------------------

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    ComponentName,
    "Registered name of a pipeline component (e.g. a bidder code)."
);
define_id!(
    ScopeId,
    "Name of a regulatory scope, e.g. a GPP section id such as \"usnat\"."
);

// ---------------------------------------------------------------------------
// Component - who is asking
// ---------------------------------------------------------------------------

/// A named, typed pipeline participant. Two components are the same exactly
/// when both kind and name are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: ComponentName,
}

impl Component {
    pub fn new(kind: ComponentKind, name: impl Into<ComponentName>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for the most common caller.
    pub fn bidder(name: impl Into<ComponentName>) -> Self {
        Self::new(ComponentKind::Bidder, name)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

// ---------------------------------------------------------------------------
// OptOutSignal - decoded opt-out preference value
// ---------------------------------------------------------------------------

/// A decoded opt-out signal carried on the request, such as the Global
/// Privacy Control header value. "1" is the conventional opted-out value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OptOutSignal(pub String);

impl OptOutSignal {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The conventional "user has opted out" value.
    pub fn set() -> Self {
        Self("1".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptOutSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OptOutSignal {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OptOutSignal {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
