//! Modal alert: title, message, inputs and action buttons.
//!
//! An [`Alert`] owns its canonical inputs and a [`PresentationLifecycle`].
//! Rendering is left to the host; this module provides everything the host
//! reads (ids, classes, focus order) and the handlers it calls back into.

pub mod animation;
pub mod button;
pub mod events;
pub mod input;
pub mod lifecycle;
pub mod selection;
pub mod value;

use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

pub use animation::{
    AnimationBuilder, AnimationEngine, AnimationError, AnimationHandle, AnimationRegistry,
    AnimationTarget, FrameEngine, Keyframes, Platform, Pose,
};
pub use button::{ButtonSpec, HandlerReturn};
pub use events::{AlertEvent, AlertNotification, DismissDetail, DismissRequest, Notifier};
pub use input::{CanonicalInput, InputKind, InputSpec, InteractionMode, KindConflict};
pub use lifecycle::{AlertHost, LifecycleOptions, LifecycleState, PresentationLifecycle, Transition};
pub use value::AlertValue;

use crate::config::{AlertDefaults, Config};

static NEXT_ALERT_ID: AtomicU64 = AtomicU64::new(0);

fn next_alert_id() -> String {
    format!("alert-{}", NEXT_ALERT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Everything a caller can set on an alert.
#[derive(Debug, Clone)]
pub struct AlertOptions {
    pub id: Option<String>,
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub message: Option<String>,
    pub css_class: Option<String>,
    pub buttons: Vec<ButtonSpec>,
    pub inputs: Vec<InputSpec>,
    pub enable_backdrop_dismiss: bool,
    pub translucent: bool,
    pub mode: Platform,
    pub enter_animation: Option<AnimationBuilder>,
    pub leave_animation: Option<AnimationBuilder>,
}

impl Default for AlertOptions {
    fn default() -> Self {
        Self {
            id: None,
            title: None,
            sub_title: None,
            message: None,
            css_class: None,
            buttons: Vec::new(),
            inputs: Vec::new(),
            enable_backdrop_dismiss: true,
            translucent: false,
            mode: Platform::default(),
            enter_animation: None,
            leave_animation: None,
        }
    }
}

impl AlertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `[alert]` config section.
    pub fn from_defaults(defaults: &AlertDefaults) -> Self {
        Self {
            enable_backdrop_dismiss: defaults.enable_backdrop_dismiss,
            translucent: defaults.translucent,
            mode: defaults.mode,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sub_title(mut self, sub_title: impl Into<String>) -> Self {
        self.sub_title = Some(sub_title.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn button(mut self, button: impl Into<ButtonSpec>) -> Self {
        self.buttons.push(button.into());
        self
    }

    pub fn enable_backdrop_dismiss(mut self, enabled: bool) -> Self {
        self.enable_backdrop_dismiss = enabled;
        self
    }

    pub fn translucent(mut self, translucent: bool) -> Self {
        self.translucent = translucent;
        self
    }

    pub fn mode(mut self, mode: Platform) -> Self {
        self.mode = mode;
        self
    }

    pub fn enter_animation(mut self, builder: AnimationBuilder) -> Self {
        self.enter_animation = Some(builder);
        self
    }

    pub fn leave_animation(mut self, builder: AnimationBuilder) -> Self {
        self.leave_animation = Some(builder);
        self
    }
}

/// Collaborators injected into an alert.
#[derive(Clone)]
pub struct AlertServices {
    pub engine: Rc<dyn AnimationEngine>,
    pub host: Rc<dyn AlertHost>,
    pub registry: Rc<AnimationRegistry>,
    pub animation_timeout: Option<Duration>,
    pub notification_capacity: usize,
}

impl AlertServices {
    pub fn new(engine: Rc<dyn AnimationEngine>, host: Rc<dyn AlertHost>) -> Self {
        Self {
            engine,
            host,
            registry: Rc::new(AnimationRegistry::new()),
            animation_timeout: None,
            notification_capacity: 32,
        }
    }

    /// Apply the animation and behavior sections of `config`.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.registry = Rc::new(AnimationRegistry::from_config(&config.animation));
        self.animation_timeout = config.animation.timeout_ms.map(Duration::from_millis);
        self.notification_capacity = config.behavior.notification_capacity;
        self
    }
}

/// Something in the alert that can take focus, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Input(usize),
    Button(usize),
}

/// A modal alert.
pub struct Alert {
    id: String,
    options: AlertOptions,
    inputs: Vec<CanonicalInput>,
    mode: InteractionMode,
    active_id: Option<String>,
    lifecycle: PresentationLifecycle,
}

impl Alert {
    pub fn new(options: AlertOptions, services: AlertServices) -> Self {
        let id = options
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(next_alert_id);
        let notifier = Notifier::new(id.clone(), services.notification_capacity);
        let lifecycle = PresentationLifecycle::new(
            AnimationTarget {
                alert_id: id.clone(),
            },
            services.engine,
            services.registry,
            services.host,
            notifier,
            LifecycleOptions {
                enter: options.enter_animation.clone(),
                leave: options.leave_animation.clone(),
                platform: options.mode,
                timeout: services.animation_timeout,
            },
        );

        let mut alert = Self {
            id,
            options,
            inputs: Vec::new(),
            mode: InteractionMode::None,
            active_id: None,
            lifecycle,
        };
        alert.render_pass();
        alert
    }

    /// Re-derive the canonical inputs and interaction mode from the declarations.
    pub fn render_pass(&mut self) {
        let (inputs, mode) = input::normalize(&self.options.inputs, &self.id).into_parts();
        self.inputs = inputs;
        self.mode = mode;
        if mode != InteractionMode::Radio {
            self.active_id = None;
        }
    }

    /// Replace the input declarations.
    pub fn set_inputs(&mut self, inputs: Vec<InputSpec>) {
        self.options.inputs = inputs;
        self.render_pass();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &AlertOptions {
        &self.options
    }

    pub fn inputs(&self) -> &[CanonicalInput] {
        &self.inputs
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn buttons(&self) -> &[ButtonSpec] {
        &self.options.buttons
    }

    /// Id of the active radio option, for `aria-activedescendant`.
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &PresentationLifecycle {
        &self.lifecycle
    }

    pub fn hdr_id(&self) -> String {
        format!("{}-hdr", self.id)
    }

    pub fn sub_hdr_id(&self) -> String {
        format!("{}-sub-hdr", self.id)
    }

    pub fn msg_id(&self) -> String {
        format!("{}-msg", self.id)
    }

    /// The id labelling the radio group: the title, else the subtitle.
    pub fn label_id(&self) -> String {
        if self.options.title.is_some() || self.options.sub_title.is_none() {
            self.hdr_id()
        } else {
            self.sub_hdr_id()
        }
    }

    /// Buttons stack vertically once there are more than two.
    pub fn button_group_vertical(&self) -> bool {
        self.options.buttons.len() > 2
    }

    /// Classes for the alert's root element.
    pub fn host_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if self.options.translucent {
            classes.push("alert-translucent".to_string());
            classes.push(format!("alert-translucent-{}", self.options.mode.as_str()));
        }
        if let Some(extra) = &self.options.css_class {
            classes.extend(extra.split_whitespace().map(str::to_string));
        }
        classes
    }

    /// Enabled inputs first, then buttons.
    pub fn focus_order(&self) -> Vec<FocusTarget> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| !input.disabled)
            .map(|(index, _)| FocusTarget::Input(index))
            .chain((0..self.options.buttons.len()).map(FocusTarget::Button))
            .collect()
    }

    /// The value the alert currently resolves to.
    pub fn value(&self) -> AlertValue {
        value::collect(&self.inputs, self.mode)
    }

    /// Select a radio option. Ignored unless the alert is in radio mode.
    pub fn radio_click(&mut self, index: usize) -> bool {
        if self.mode != InteractionMode::Radio {
            debug!(alert_id = %self.id, index, "radio click outside radio mode");
            return false;
        }
        let (inputs, active_id) = selection::select_radio(&self.inputs, index);
        if active_id.is_none() {
            return false;
        }
        self.active_id = active_id;
        self.commit(inputs);
        true
    }

    /// Toggle a checkbox. Ignored unless the alert is in checkbox mode.
    pub fn checkbox_click(&mut self, index: usize) -> bool {
        if self.mode != InteractionMode::Checkbox || index >= self.inputs.len() {
            debug!(alert_id = %self.id, index, "checkbox click ignored");
            return false;
        }
        let inputs = selection::toggle_checkbox(&self.inputs, index);
        self.commit(inputs);
        true
    }

    /// Replace the value of a text input.
    pub fn set_text_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        if self.mode != InteractionMode::Text {
            return false;
        }
        let Some(input) = self.inputs.get(index) else {
            return false;
        };
        let mut inputs = self.inputs.clone();
        inputs[index] = CanonicalInput {
            value: value.into(),
            ..input.clone()
        };
        self.commit(inputs);
        true
    }

    /// Store user-driven changes back into the declarations and re-render.
    fn commit(&mut self, inputs: Vec<CanonicalInput>) {
        self.options.inputs = inputs.iter().map(InputSpec::from).collect();
        self.render_pass();
    }

    /// Activate a button.
    ///
    /// Returns the dismissal to await, or `None` if the handler kept the alert open.
    pub fn button_click(
        &self,
        index: usize,
    ) -> Option<impl Future<Output = Transition> + 'static> {
        let button = self.options.buttons.get(index)?;
        let value = self.value();
        if !button::activate(button, &value) {
            debug!(alert_id = %self.id, button = %button.text, "handler kept alert open");
            return None;
        }
        Some(
            self.lifecycle
                .dismiss_with(DismissDetail::new(value, button.role.clone())),
        )
    }

    /// Handle a click on the backdrop.
    pub fn backdrop_click(&self) -> Option<impl Future<Output = Transition> + 'static> {
        if !self.options.enable_backdrop_dismiss {
            return None;
        }
        Some(
            self.lifecycle
                .dismiss_with(DismissDetail::role(events::BACKDROP_ROLE)),
        )
    }

    /// Intercept a dismiss request raised inside the alert.
    pub fn handle_dismiss_request(
        &self,
        request: &mut DismissRequest,
    ) -> impl Future<Output = Transition> + 'static {
        request.stop_propagation();
        request.prevent_default();
        self.lifecycle.dismiss()
    }

    pub fn present(&self) -> impl Future<Output = Transition> + 'static {
        self.lifecycle.present()
    }

    pub fn dismiss(&self) -> impl Future<Output = Transition> + 'static {
        self.lifecycle.dismiss()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertNotification> {
        self.lifecycle.notifier().subscribe()
    }

    /// Called by the host once the alert is mounted.
    pub fn did_load(&self) {
        self.lifecycle.notifier().emit(AlertEvent::DidLoad);
    }

    /// Called by the host once the alert is unmounted.
    pub fn did_unload(&self) {
        self.lifecycle.notifier().emit(AlertEvent::DidUnload);
    }
}
