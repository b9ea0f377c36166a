use bidfence_core::Activity;
use thiserror::Error;

/// Errors raised while building activity controls.
///
/// Evaluation itself never fails: `is_allowed` returns a plain boolean and
/// missing payload facets degrade to abstention instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The controller mapping misses an activity. Fatal at construction; a
    /// silent default at call time is never acceptable.
    #[error("no activity controller configured for '{0}'")]
    MissingActivity(Activity),

    /// A rule specification failed validation during compilation.
    #[error("invalid rule for activity '{activity}': {reason}")]
    InvalidRule { activity: Activity, reason: String },
}

pub type PolicyResult<T> = Result<T, PolicyError>;
