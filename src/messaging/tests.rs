use super::bus::{EventBus, EventCallback};
use super::event::{EventMessage, EventType};
use crate::error::Error;
use crate::timeline::diagnostics::{Diagnostic, DiagnosticSink};
use anyhow::Result;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn recorder() -> (Arc<Mutex<Vec<EventMessage>>>, EventCallback) {
    let received = Arc::new(Mutex::new(Vec::<EventMessage>::new()));
    let received_clone = received.clone();
    let callback: EventCallback = Arc::new(move |event: EventMessage| -> Result<()> {
        received_clone.lock().unwrap().push(event);
        Ok(())
    });
    (received, callback)
}

#[test]
fn test_publish_subscribe() -> Result<()> {
    let bus = EventBus::new();
    let (received, callback) = recorder();
    bus.subscribe(EventType::IncidentResolved, callback);

    let incident_id = Uuid::new_v4();
    let delivered = bus.publish(
        EventType::IncidentResolved,
        Some(incident_id),
        serde_json::json!({"resolved": true}),
    )?;
    bus.publish(EventType::SystemStartup, None, serde_json::Value::Null)?;

    assert_eq!(delivered, 1);
    let events = received.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::IncidentResolved);
    assert_eq!(events[0].routing_key(), format!("incident.resolved.{}", incident_id));
    assert_eq!(events[0].payload["resolved"], true);
    Ok(())
}

#[test]
fn test_subscribe_all_and_unsubscribe() -> Result<()> {
    let bus = EventBus::new();
    let (received, callback) = recorder();
    let subscription = bus.subscribe_all(callback);

    bus.publish(EventType::SystemStartup, None, "up")?;
    bus.publish(EventType::CamerasReloaded, None, 3)?;
    assert!(bus.unsubscribe(&subscription));
    assert!(!bus.unsubscribe(&subscription));
    bus.publish(EventType::SystemShutdown, None, "down")?;

    assert_eq!(received.lock().unwrap().len(), 2);
    Ok(())
}

#[test]
fn test_failing_handler_does_not_stop_delivery() -> Result<()> {
    let bus = EventBus::new();
    bus.subscribe_all(Arc::new(|_: EventMessage| -> Result<()> {
        Err(anyhow::anyhow!("handler exploded"))
    }));
    let (received, callback) = recorder();
    bus.subscribe_all(callback);

    assert_eq!(bus.publish(EventType::SystemStartup, None, ())?, 2);
    assert_eq!(received.lock().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_diagnostics_are_published() {
    let bus = EventBus::new();
    let (received, callback) = recorder();
    bus.subscribe(EventType::IncidentMalformed, callback);

    let incident_id = Uuid::new_v4();
    bus.report(Diagnostic::MalformedIncident {
        camera_id: Uuid::new_v4(),
        incident_id,
        error: Error::MalformedIncident {
            incident_id: incident_id.to_string(),
            reason: "ends before it starts".to_string(),
        },
    });

    let events = received.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source_id, Some(incident_id));
    assert_eq!(events[0].payload["incident_id"], incident_id.to_string());
}
