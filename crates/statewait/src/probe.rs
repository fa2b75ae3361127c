//! Single-probe observations

use crate::error::ProbeError;

/// What one status check saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult<T> {
    /// The resource exists and reports `state`
    Found { state: String, payload: T },
    /// The resource does not exist
    NotFound,
}

impl<T> ProbeResult<T> {
    /// The resource exists with the given state
    pub fn found(state: impl Into<String>, payload: T) -> Self {
        Self::Found {
            state: state.into(),
            payload,
        }
    }

    /// The resource is absent
    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the resource currently exists
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Observed state, `None` when absent
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Found { state, .. } => Some(state),
            Self::NotFound => None,
        }
    }

    /// Domain object returned by the probe, `None` when absent
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Found { payload, .. } => Some(payload),
            Self::NotFound => None,
        }
    }

    /// Consume into the payload
    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Found { payload, .. } => Some(payload),
            Self::NotFound => None,
        }
    }
}

/// Fold a probe's `Result` into an observation.
///
/// [`ProbeError::NotFound`] becomes [`ProbeResult::NotFound`] only when
/// absence is the success condition; otherwise it aborts like any other
/// probe error.
pub(crate) fn normalize<T>(
    result: Result<ProbeResult<T>, ProbeError>,
    absence_is_success: bool,
) -> Result<ProbeResult<T>, anyhow::Error> {
    match result {
        Ok(observed) => Ok(observed),
        Err(ProbeError::NotFound(_)) if absence_is_success => Ok(ProbeResult::NotFound),
        Err(e @ ProbeError::NotFound(_)) => Err(anyhow::Error::new(e)),
        Err(ProbeError::Other(e)) => Err(e),
    }
}
