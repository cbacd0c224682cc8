//! Notifications emitted by an alert.
//!
//! Hosts subscribe through [`Notifier::subscribe`]; emission is
//! fire-and-forget and never blocks on receivers.

use tokio::sync::broadcast;
use tracing::debug;

use super::value::AlertValue;

/// Role reported when the backdrop dismissed the alert.
pub const BACKDROP_ROLE: &str = "backdrop";

/// What a dismissal resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DismissDetail {
    pub data: AlertValue,
    pub role: Option<String>,
}

impl DismissDetail {
    pub fn new(data: AlertValue, role: Option<String>) -> Self {
        Self { data, role }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            data: AlertValue::Undefined,
            role: Some(role.into()),
        }
    }
}

/// Lifecycle events of an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    DidLoad,
    WillPresent,
    DidPresent,
    WillDismiss(DismissDetail),
    DidDismiss(DismissDetail),
    DidUnload,
}

impl AlertEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            AlertEvent::DidLoad => "did-load",
            AlertEvent::WillPresent => "will-present",
            AlertEvent::DidPresent => "did-present",
            AlertEvent::WillDismiss(_) => "will-dismiss",
            AlertEvent::DidDismiss(_) => "did-dismiss",
            AlertEvent::DidUnload => "did-unload",
        }
    }
}

/// An event stamped with the id of the alert that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotification {
    pub alert_id: String,
    pub event: AlertEvent,
}

/// Publish side of an alert's notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    alert_id: String,
    sender: broadcast::Sender<AlertNotification>,
}

impl Notifier {
    pub fn new(alert_id: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            alert_id: alert_id.into(),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertNotification> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: AlertEvent) {
        debug!(alert_id = %self.alert_id, event = event.name(), "alert event");
        // No subscribers is not an error.
        let _ = self.sender.send(AlertNotification {
            alert_id: self.alert_id.clone(),
            event,
        });
    }
}

/// A dismiss request bubbling up from inside the alert, e.g. an inline action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DismissRequest {
    propagation_stopped: bool,
    default_prevented: bool,
}

impl DismissRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let notifier = Notifier::new("a", 4);
        notifier.emit(AlertEvent::DidLoad);
    }

    #[test]
    fn test_subscribers_receive_stamped_events() {
        let notifier = Notifier::new("a", 4);
        let mut rx = notifier.subscribe();

        notifier.emit(AlertEvent::WillPresent);

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.alert_id, "a");
        assert_eq!(notification.event, AlertEvent::WillPresent);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(AlertEvent::DidPresent.name(), "did-present");
        assert_eq!(
            AlertEvent::DidDismiss(DismissDetail::default()).name(),
            "did-dismiss"
        );
    }
}
