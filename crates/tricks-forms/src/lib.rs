//! Tricks Forms Library
//!
//! Detects edit-form submissions that change nothing, so callers can skip the
//! save and show a "nothing changed" notice instead of a success notice.
//!
//! One [`FormContext`] is created per request when the form is bound and is
//! threaded through the pre-submit and post-submit phases; the
//! [`ChangeDetector`] itself holds no per-request state.

pub mod detector;
pub mod events;
pub mod snapshot;

// Re-export commonly used types
pub use detector::{
    ChangeDetector, DetectorState, Evaluation, FormContext, FormDescriptor, RedirectTarget,
};
pub use events::{FormEventSink, FormUnchangedEvent, RecordingEventSink, TracingEventSink};
pub use snapshot::{FieldSnapshot, Submission};
