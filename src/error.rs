//! Errors shared by the event-processing components.

use thiserror::Error;

/// A required field of an inbound event was missing or empty.
///
/// Components return this as a value instead of treating it as a fault: the
/// event is skipped and the dispatch loop keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompleteInput {
    #[error("event has no device identifier")]
    MissingDeviceId,

    #[error("event has no timestamp")]
    MissingTimestamp,

    #[error("current reported state is empty")]
    EmptySnapshot,

    #[error("credential identifier is missing")]
    MissingCredentialId,
}

/// Whether an error chain is an [`IncompleteInput`] no-op rather than a fault.
pub fn is_incomplete_input(error: &anyhow::Error) -> bool {
    error.downcast_ref::<IncompleteInput>().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_is_incomplete_input() {
        assert!(is_incomplete_input(&IncompleteInput::MissingCredentialId.into()));
        assert!(!is_incomplete_input(&anyhow::anyhow!("broker down")));

        let wrapped: anyhow::Result<()> =
            Err(IncompleteInput::MissingTimestamp).context("Failed to process event");
        assert!(is_incomplete_input(&wrapped.unwrap_err()));
    }
}
