//! Form-change detector
//!
//! Lifecycle of one request:
//!
//! 1. [`ChangeDetector::bind`]: the form is initialized with existing data
//!    (`Idle → FormBound`).
//! 2. [`ChangeDetector::pre_submit`]: raw values are available but not yet
//!    mapped; registered update forms get a deep "before" snapshot
//!    (`FormBound → SnapshotTaken`). Other forms stay `FormBound` and the
//!    detector ignores them from then on.
//! 3. [`ChangeDetector::post_submit`]: after validation the raw values are
//!    mapped onto a fresh model and compared with the snapshot
//!    (`SnapshotTaken → Evaluated`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tricks_core::AppError;

use crate::events::{FormEventSink, FormUnchangedEvent};
use crate::snapshot::{FieldSnapshot, Submission};

/// Which form is being handled and on behalf of which action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDescriptor {
    pub form_type: String,
    pub action_context: String,
}

impl FormDescriptor {
    pub fn new(form_type: impl Into<String>, action_context: impl Into<String>) -> Self {
        Self {
            form_type: form_type.into(),
            action_context: action_context.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    FormBound,
    SnapshotTaken,
    Evaluated,
}

impl fmt::Display for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorState::Idle => "idle",
            DetectorState::FormBound => "form_bound",
            DetectorState::SnapshotTaken => "snapshot_taken",
            DetectorState::Evaluated => "evaluated",
        };
        f.write_str(name)
    }
}

/// Per-request detector state. Created by [`ChangeDetector::bind`] and passed
/// to the later phases; dropped with the request.
#[derive(Debug)]
pub struct FormContext {
    descriptor: FormDescriptor,
    state: DetectorState,
    before: Option<FieldSnapshot>,
}

impl FormContext {
    fn idle(descriptor: FormDescriptor) -> Self {
        Self {
            descriptor,
            state: DetectorState::Idle,
            before: None,
        }
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&FieldSnapshot> {
        self.before.as_ref()
    }

    fn transition(&mut self, to: DetectorState) {
        tracing::debug!(
            form_type = %self.descriptor.form_type,
            from = %self.state,
            to = %to,
            "Form detector transition"
        );
        self.state = to;
    }

    fn expect_state(&self, expected: DetectorState, phase: &str) -> Result<(), AppError> {
        if self.state != expected {
            return Err(AppError::Internal(format!(
                "{} called for form '{}' in state {}, expected {}",
                phase, self.descriptor.form_type, self.state, expected
            )));
        }
        Ok(())
    }
}

/// Result of the post-submit phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Every field matches the data loaded before submission.
    Unchanged,
    /// At least one field differs; the caller saves as usual.
    Changed,
    /// No comparison was made (not an update form, model not enumerable,
    /// or the submission was invalid).
    Skipped,
}

/// Where the response should send the user after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    EditForm,
    Overview,
}

impl Evaluation {
    /// Unchanged submissions go back to the edit form, changed ones to the
    /// overview. Skipped evaluations carry no opinion.
    pub fn redirect(self) -> Option<RedirectTarget> {
        match self {
            Evaluation::Unchanged => Some(RedirectTarget::EditForm),
            Evaluation::Changed => Some(RedirectTarget::Overview),
            Evaluation::Skipped => None,
        }
    }
}

pub struct ChangeDetector {
    update_form_types: HashSet<String>,
    sink: Arc<dyn FormEventSink>,
}

impl ChangeDetector {
    pub fn new<I, S>(update_form_types: I, sink: Arc<dyn FormEventSink>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            update_form_types: update_form_types.into_iter().map(Into::into).collect(),
            sink,
        }
    }

    /// Whether `form_type` is registered as editing existing data.
    pub fn is_update_form(&self, form_type: &str) -> bool {
        self.update_form_types.contains(form_type)
    }

    /// A form was initialized with existing data.
    pub fn bind(&self, descriptor: FormDescriptor) -> FormContext {
        let mut ctx = FormContext::idle(descriptor);
        ctx.transition(DetectorState::FormBound);
        ctx
    }

    /// Raw values arrived; snapshot the model before it is mutated by mapping.
    pub fn pre_submit<T: Serialize>(
        &self,
        ctx: &mut FormContext,
        current: &T,
    ) -> Result<(), AppError> {
        ctx.expect_state(DetectorState::FormBound, "pre_submit")?;

        if !self.is_update_form(&ctx.descriptor.form_type) {
            tracing::debug!(
                form_type = %ctx.descriptor.form_type,
                "Not an update form, change detection skipped"
            );
            return Ok(());
        }

        let Some(snapshot) = FieldSnapshot::capture(current)? else {
            tracing::debug!(
                form_type = %ctx.descriptor.form_type,
                "Form data does not expose fields, change detection skipped"
            );
            return Ok(());
        };

        tracing::debug!(
            form_type = %ctx.descriptor.form_type,
            fields = snapshot.len(),
            "Captured pre-submit snapshot"
        );
        ctx.before = Some(snapshot);
        ctx.transition(DetectorState::SnapshotTaken);
        Ok(())
    }

    /// The form was validated; remap the raw values onto a fresh `T` and
    /// compare with the pre-submit snapshot.
    pub fn post_submit<T>(
        &self,
        ctx: &mut FormContext,
        submission: &Submission,
        is_valid: bool,
        user: &str,
    ) -> Result<Evaluation, AppError>
    where
        T: Serialize + DeserializeOwned,
    {
        match ctx.state {
            DetectorState::FormBound => return Ok(Evaluation::Skipped),
            DetectorState::SnapshotTaken => {}
            _ => ctx.expect_state(DetectorState::SnapshotTaken, "post_submit")?,
        }

        if !is_valid {
            tracing::debug!(
                form_type = %ctx.descriptor.form_type,
                "Invalid submission, change detection skipped"
            );
            return Ok(Evaluation::Skipped);
        }

        // The snapshot stays in the context until the comparison succeeds,
        // so a failed evaluation can be retried.
        let before = ctx.before.as_ref().ok_or_else(|| {
            AppError::Internal("Snapshot missing in snapshot_taken state".to_string())
        })?;

        let after_model: T = submission.map_into()?;
        let after = FieldSnapshot::capture(&after_model)?.ok_or_else(|| {
            AppError::SchemaMismatch {
                expected: before.field_names().iter().map(|n| n.to_string()).collect(),
                found: Vec::new(),
            }
        })?;

        let unchanged = before.compare(&after)?;
        ctx.before = None;
        ctx.transition(DetectorState::Evaluated);

        if !unchanged {
            return Ok(Evaluation::Changed);
        }

        self.sink.form_unchanged(&FormUnchangedEvent {
            action_context: ctx.descriptor.action_context.clone(),
            user: user.to_string(),
        });
        Ok(Evaluation::Unchanged)
    }
}
