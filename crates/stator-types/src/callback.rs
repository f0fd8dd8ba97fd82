//! Callback protocol: the vocabulary hooks use to report back to the engine.

use std::time::Duration;

use crate::metadata::Metadata;

/// Outcome classification reported by a hook invocation.
///
/// The status is the sole authority for control flow; the message and
/// metadata on [`CallbackResult`] are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackStatus {
    /// The hook completed and the transition may proceed.
    Success,
    /// The hook explicitly failed; the attempt is aborted and may be retried.
    Failure,
    /// The hook cannot classify the outcome; external resolution is required.
    Unknown,
    /// The hook asks for another attempt. Treated like `Success` by the
    /// single-attempt executor; the retry loop's budget governs re-runs.
    Retry,
}

/// Value returned by every hook invocation.
#[derive(Debug, Clone)]
pub struct CallbackResult {
    /// Outcome classification. Drives all engine control flow.
    pub status: CallbackStatus,
    /// Human-readable description of the outcome.
    pub message: String,
    /// Optional metadata delta, merged into the entity's metadata when the
    /// status is `Success` or `Retry`.
    pub metadata: Option<Metadata>,
    /// Suggested wait before a retry. Advisory only: the engine's actual
    /// wait comes from the caller's backoff function.
    pub retry_after: Option<Duration>,
}

impl CallbackResult {
    /// A successful outcome with no message or metadata.
    pub fn success() -> Self {
        Self {
            status: CallbackStatus::Success,
            message: String::new(),
            metadata: None,
            retry_after: None,
        }
    }

    /// An explicit failure carrying a message for the diagnostic trail.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: CallbackStatus::Failure,
            message: message.into(),
            metadata: None,
            retry_after: None,
        }
    }

    /// An unknown outcome requiring external resolution.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            status: CallbackStatus::Unknown,
            message: message.into(),
            metadata: None,
            retry_after: None,
        }
    }

    /// A request for another attempt.
    pub fn retry(message: impl Into<String>) -> Self {
        Self {
            status: CallbackStatus::Retry,
            message: message.into(),
            metadata: None,
            retry_after: None,
        }
    }

    /// Attach a metadata delta to the result.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach a suggested retry delay to the result.
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }
}
