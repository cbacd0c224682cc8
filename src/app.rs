use std::rc::Rc;
use std::time::Duration;

use clap::ValueEnum;
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::alert::{
    Alert, AlertEvent, AlertNotification, AlertOptions, AlertServices, ButtonSpec, DismissDetail,
    FrameEngine, InputSpec, Pose,
};
use crate::config::Config;
use crate::ui::{AlertView, TerminalHost};

/// Which sample alert the demo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleKind {
    /// Login form with two text fields
    Text,
    /// Single choice between colors
    #[default]
    Radio,
    /// Multiple choice between toppings
    Checkbox,
    /// Plain confirmation
    None,
}

/// Build the sample alert declarations for `kind`.
pub fn sample_options(kind: SampleKind, base: AlertOptions) -> AlertOptions {
    let options = match kind {
        SampleKind::Text => base
            .title("Login")
            .message("Enter your credentials to continue.")
            .input(InputSpec::text().name("username").placeholder("Username"))
            .input(InputSpec::text().name("password").placeholder("Password")),
        SampleKind::Radio => base
            .title("Favorite color")
            .sub_title("Pick exactly one")
            .input(InputSpec::radio().label("Red").value("red").checked(true))
            .input(InputSpec::radio().label("Green").value("green"))
            .input(InputSpec::radio().label("Blue").value("blue")),
        SampleKind::Checkbox => base
            .title("Toppings")
            .message("Select at least one topping.")
            .input(InputSpec::checkbox().label("Cheese").value("cheese"))
            .input(InputSpec::checkbox().label("Olives").value("olives"))
            .input(InputSpec::checkbox().label("Basil").value("basil")),
        SampleKind::None => base
            .title("Discard draft?")
            .message("This action cannot be undone."),
    };

    let confirm = ButtonSpec::new("OK").css_class("primary");
    let confirm = if kind == SampleKind::Checkbox {
        confirm.handler(|value| !matches!(value, crate::alert::AlertValue::List(v) if v.is_empty()))
    } else {
        confirm
    };
    options
        .button(ButtonSpec::new("Cancel").role("cancel"))
        .button(confirm)
}

/// Demo state: the alert, its view and the host services it talks to.
pub struct App {
    pub alert: Alert,
    pub view: AlertView,
    pub host: Rc<TerminalHost>,
    poses: watch::Receiver<Option<Pose>>,
    events: broadcast::Receiver<AlertNotification>,
    /// Set once the alert reports did-dismiss.
    pub outcome: Option<DismissDetail>,
}

impl App {
    pub fn new(options: AlertOptions, config: &Config) -> Self {
        let engine = Rc::new(FrameEngine::new(Duration::from_millis(
            config.animation.frame_ms,
        )));
        let poses = engine.subscribe();
        let host = Rc::new(TerminalHost::new());

        let services = AlertServices::new(engine, host.clone()).with_config(config);
        let alert = Alert::new(options, services);
        host.set_focusable(alert.focus_order().len());
        let events = alert.subscribe();

        Self {
            alert,
            view: AlertView::new(),
            host,
            poses,
            events,
            outcome: None,
        }
    }

    /// Pull state published by the lifecycle into the view. Call once per frame.
    pub fn sync(&mut self) {
        self.host.set_focusable(self.alert.focus_order().len());
        if self.host.take_focus_request() {
            self.view.focus_first(&self.alert);
        }
        self.view.pose = *self.poses.borrow();

        while let Ok(notification) = self.events.try_recv() {
            info!(alert_id = %notification.alert_id, event = notification.event.name(), "alert event");
            if let AlertEvent::DidDismiss(detail) = notification.event {
                self.outcome = Some(detail);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::InteractionMode;

    #[test]
    fn test_sample_modes() {
        let cases = [
            (SampleKind::Text, InteractionMode::Text),
            (SampleKind::Radio, InteractionMode::Radio),
            (SampleKind::Checkbox, InteractionMode::Checkbox),
            (SampleKind::None, InteractionMode::None),
        ];
        for (kind, mode) in cases {
            let app = App::new(sample_options(kind, AlertOptions::new()), &Config::default());
            assert_eq!(app.alert.mode(), mode);
            assert_eq!(app.alert.buttons().len(), 2);
        }
    }

    #[test]
    fn test_checkbox_sample_requires_a_selection() {
        let mut app = App::new(
            sample_options(SampleKind::Checkbox, AlertOptions::new()),
            &Config::default(),
        );
        assert!(app.alert.button_click(1).is_none());

        app.alert.checkbox_click(2);
        assert!(app.alert.button_click(1).is_some());
    }
}
