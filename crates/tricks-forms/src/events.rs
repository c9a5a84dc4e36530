//! Events emitted by the change detector

use serde::Serialize;
use std::sync::Mutex;

/// Dispatched when a valid edit-form submission changed no field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormUnchangedEvent {
    /// Tag of the action being performed (e.g. `trick_edit`).
    pub action_context: String,
    /// Identity of the acting user.
    pub user: String,
}

/// Receiver for detector events (flash messages, notifications).
pub trait FormEventSink: Send + Sync {
    fn form_unchanged(&self, event: &FormUnchangedEvent);
}

/// Logs events and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl FormEventSink for TracingEventSink {
    fn form_unchanged(&self, event: &FormUnchangedEvent) {
        tracing::info!(
            action_context = %event.action_context,
            user = %event.user,
            "Form submitted without changes"
        );
    }
}

/// Keeps every event in memory, for request-scoped notice rendering.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<FormUnchangedEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FormUnchangedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl FormEventSink for RecordingEventSink {
    fn form_unchanged(&self, event: &FormUnchangedEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{ChangeDetector, Evaluation, FormDescriptor};
    use crate::snapshot::Submission;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Serialize, Deserialize)]
    struct AvatarDto {
        nickname: String,
    }

    fn event(user: &str) -> FormUnchangedEvent {
        FormUnchangedEvent {
            action_context: "profile_edit".to_string(),
            user: user.to_string(),
        }
    }

    #[test]
    fn test_recording_sink_keeps_events_in_order() {
        let sink = RecordingEventSink::new();
        sink.form_unchanged(&event("jane"));
        sink.form_unchanged(&event("john"));

        let users: Vec<String> = sink.events().into_iter().map(|e| e.user).collect();
        assert_eq!(users, vec!["jane", "john"]);
    }

    #[test]
    fn test_tracing_sink_drives_detector() {
        let detector = ChangeDetector::new(["profile_edit"], Arc::new(TracingEventSink));
        let mut ctx = detector.bind(FormDescriptor::new("profile_edit", "profile_edit"));
        let loaded = AvatarDto {
            nickname: "jane".to_string(),
        };

        detector.pre_submit(&mut ctx, &loaded).unwrap();
        let evaluation = detector
            .post_submit::<AvatarDto>(
                &mut ctx,
                &Submission::from_pairs([("nickname", json!("jane"))]),
                true,
                "jane",
            )
            .unwrap();

        assert_eq!(evaluation, Evaluation::Unchanged);
    }

    #[test]
    fn test_event_serializes_for_notices() {
        let value = serde_json::to_value(event("jane")).unwrap();
        assert_eq!(
            value,
            json!({"action_context": "profile_edit", "user": "jane"})
        );
    }
}
