use crate::messaging::event::{EventMessage, EventType};
use crate::timeline::diagnostics::{Diagnostic, DiagnosticSink, LogDiagnostics};
use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Callback function type for event handling
pub type EventCallback = Arc<dyn Fn(EventMessage) -> Result<()> + Send + Sync>;

struct Subscription {
    id: String,
    /// `None` receives every event.
    event_type: Option<EventType>,
    callback: EventCallback,
}

/// Synchronous in-process event bus.
///
/// Callbacks run on the publishing thread, in subscription order. A failing
/// callback is logged and does not stop delivery to the others.
#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish<T: Serialize>(
        &self,
        event_type: EventType,
        source_id: Option<Uuid>,
        payload: T,
    ) -> Result<usize> {
        let message = EventMessage::new(event_type, source_id, payload)?;
        Ok(self.dispatch(message))
    }

    /// Subscribe to an event type
    pub fn subscribe(&self, event_type: EventType, callback: EventCallback) -> String {
        self.add_subscription(Some(event_type), callback)
    }

    /// Subscribe to every event
    pub fn subscribe_all(&self, callback: EventCallback) -> String {
        self.add_subscription(None, callback)
    }

    /// Unsubscribe; returns false if the subscription was unknown
    pub fn unsubscribe(&self, subscription_id: &str) -> bool {
        let mut subscriptions = match self.subscriptions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != subscription_id);
        subscriptions.len() != before
    }

    fn add_subscription(&self, event_type: Option<EventType>, callback: EventCallback) -> String {
        let id = Uuid::new_v4().to_string();
        let mut subscriptions = match self.subscriptions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscriptions.push(Subscription {
            id: id.clone(),
            event_type,
            callback,
        });
        id
    }

    fn dispatch(&self, message: EventMessage) -> usize {
        // Snapshot the callbacks so handlers may subscribe or unsubscribe.
        let callbacks: Vec<EventCallback> = {
            let subscriptions = match self.subscriptions.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            subscriptions
                .iter()
                .filter(|s| s.event_type.as_ref().map_or(true, |t| *t == message.event_type))
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };

        debug!(
            "Dispatching {} to {} subscribers",
            message.routing_key(),
            callbacks.len()
        );

        for callback in &callbacks {
            if let Err(e) = callback(message.clone()) {
                warn!("Event handler for {} failed: {}", message.routing_key(), e);
            }
        }

        callbacks.len()
    }
}

impl DiagnosticSink for EventBus {
    fn report(&self, diagnostic: Diagnostic) {
        let event_type = match &diagnostic {
            Diagnostic::InvalidTimestamp { .. } => EventType::TimestampRejected,
            Diagnostic::MalformedIncident { .. } => EventType::IncidentMalformed,
        };
        let payload = serde_json::json!({
            "camera_id": diagnostic.camera_id().to_string(),
            "incident_id": diagnostic.incident_id().to_string(),
            "error": diagnostic.error().to_string(),
        });
        let incident_id = diagnostic.incident_id();

        LogDiagnostics.report(diagnostic);
        if let Err(e) = self.publish(event_type, Some(incident_id), payload) {
            warn!("Failed to publish diagnostic for incident {}: {}", incident_id, e);
        }
    }
}
