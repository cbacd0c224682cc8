//! Present/dismiss state machine.
//!
//! State machine: Idle → Presenting → Presented → Dismissing → Dismissed
//!
//! Each transition suspends exactly once, while its animation plays. At most
//! one [`AnimationHandle`] is owned at a time; a newer transition destroys the
//! current handle before requesting its own.
//!
//! # Invariants
//!
//! - will-* events precede the animation, did-* events follow it
//! - every transition emits its events at most once
//! - the handle is destroyed before the next is created and before Dismissed
//! - the alert is detached exactly once, on entering Dismissed
//!
//! # Re-entrancy
//!
//! Transitions carry a generation number. A transition overtaken by a newer
//! one finishes as [`Transition::Superseded`]: no focus change, no did-*
//! event, no state change.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use super::animation::{
    AnimationBuilder, AnimationEngine, AnimationError, AnimationHandle, AnimationRegistry,
    AnimationTarget, Platform, ENTER_KEY, LEAVE_KEY,
};
use super::events::{AlertEvent, DismissDetail, Notifier};

/// Where an alert is in its presentation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Presenting,
    Presented,
    Dismissing,
    Dismissed,
}

/// How a call to present or dismiss ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The transition ran to completion.
    Completed,
    /// A newer transition took over while this one was animating.
    Superseded,
    /// The call was a no-op in the current state.
    Ignored,
}

/// Focus and visual-tree services provided by whoever renders the alert.
pub trait AlertHost {
    /// Focus the first focusable element of the alert. Returns `false` if there is none.
    fn focus_first(&self) -> bool;

    /// Queue removal of the alert from its container. Hosts may batch this.
    fn schedule_detach(&self);
}

/// Animation choices for one alert.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOptions {
    pub enter: Option<AnimationBuilder>,
    pub leave: Option<AnimationBuilder>,
    pub platform: Platform,
    /// Upper bound on each animation step; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    state: LifecycleState,
    handle: Option<AnimationHandle>,
    generation: u64,
}

#[derive(Clone, Copy)]
enum Phase {
    Enter,
    Leave,
}

/// Drives present and dismiss for one alert.
///
/// Cloning yields another handle to the same lifecycle.
#[derive(Clone)]
pub struct PresentationLifecycle {
    target: AnimationTarget,
    inner: Rc<RefCell<Inner>>,
    engine: Rc<dyn AnimationEngine>,
    registry: Rc<AnimationRegistry>,
    host: Rc<dyn AlertHost>,
    notifier: Notifier,
    options: Rc<LifecycleOptions>,
}

impl PresentationLifecycle {
    pub fn new(
        target: AnimationTarget,
        engine: Rc<dyn AnimationEngine>,
        registry: Rc<AnimationRegistry>,
        host: Rc<dyn AlertHost>,
        notifier: Notifier,
        options: LifecycleOptions,
    ) -> Self {
        Self {
            target,
            inner: Rc::new(RefCell::new(Inner::default())),
            engine,
            registry,
            host,
            notifier,
            options: Rc::new(options),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Whether an animation handle is currently owned.
    pub fn has_animation(&self) -> bool {
        self.inner.borrow().handle.is_some()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Animate the alert in.
    ///
    /// Valid from Idle, or again while Presenting (the newer call wins).
    pub fn present(&self) -> impl Future<Output = Transition> + 'static {
        let this = self.clone();
        async move { this.run_present().await }
    }

    /// Animate the alert out and detach it.
    ///
    /// A no-op once dismissal has started.
    pub fn dismiss(&self) -> impl Future<Output = Transition> + 'static {
        self.dismiss_with(DismissDetail::default())
    }

    /// Like [`dismiss`](Self::dismiss), reporting `detail` with the dismiss events.
    pub fn dismiss_with(&self, detail: DismissDetail) -> impl Future<Output = Transition> + 'static {
        let this = self.clone();
        async move { this.run_dismiss(detail).await }
    }

    async fn run_present(&self) -> Transition {
        let Some(generation) = self.begin(LifecycleState::Presenting) else {
            return Transition::Ignored;
        };
        self.notifier.emit(AlertEvent::WillPresent);

        self.animate(Phase::Enter, generation).await;

        if !self.finish(generation, LifecycleState::Presented) {
            return Transition::Superseded;
        }
        if !self.host.focus_first() {
            debug!(alert_id = %self.target.alert_id, "nothing to focus");
        }
        self.notifier.emit(AlertEvent::DidPresent);
        Transition::Completed
    }

    async fn run_dismiss(&self, detail: DismissDetail) -> Transition {
        let Some(generation) = self.begin(LifecycleState::Dismissing) else {
            return Transition::Ignored;
        };
        self.notifier.emit(AlertEvent::WillDismiss(detail.clone()));

        self.animate(Phase::Leave, generation).await;

        if !self.finish(generation, LifecycleState::Dismissed) {
            return Transition::Superseded;
        }
        self.notifier.emit(AlertEvent::DidDismiss(detail));
        self.host.schedule_detach();
        Transition::Completed
    }

    /// Enter `next` if allowed, destroying any owned handle. Returns the new generation.
    fn begin(&self, next: LifecycleState) -> Option<u64> {
        let mut inner = self.inner.borrow_mut();
        let allowed = match next {
            LifecycleState::Presenting => matches!(
                inner.state,
                LifecycleState::Idle | LifecycleState::Presenting
            ),
            LifecycleState::Dismissing => matches!(
                inner.state,
                LifecycleState::Idle | LifecycleState::Presenting | LifecycleState::Presented
            ),
            _ => false,
        };
        if !allowed {
            debug!(
                alert_id = %self.target.alert_id,
                state = ?inner.state,
                requested = ?next,
                "transition ignored"
            );
            return None;
        }

        if let Some(handle) = inner.handle.take() {
            self.engine.destroy(&handle);
        }
        inner.state = next;
        inner.generation += 1;
        debug!(alert_id = %self.target.alert_id, state = ?next, generation = inner.generation, "transition");
        Some(inner.generation)
    }

    /// Commit `next` unless a newer transition has started.
    fn finish(&self, generation: u64, next: LifecycleState) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.generation != generation {
            debug!(alert_id = %self.target.alert_id, generation, "transition superseded");
            return false;
        }
        inner.state = next;
        debug!(alert_id = %self.target.alert_id, state = ?next, "transition");
        true
    }

    fn resolve(&self, phase: Phase) -> AnimationBuilder {
        let (explicit, key, fallback) = match phase {
            Phase::Enter => (
                &self.options.enter,
                ENTER_KEY,
                self.options.platform.default_enter(),
            ),
            Phase::Leave => (
                &self.options.leave,
                LEAVE_KEY,
                self.options.platform.default_leave(),
            ),
        };
        match explicit {
            Some(builder) => builder.clone(),
            None => self.registry.get(key, fallback),
        }
    }

    /// Create, play and release one animation.
    ///
    /// Engine failures are logged and treated as completion.
    async fn animate(&self, phase: Phase, generation: u64) {
        let builder = self.resolve(phase);
        let handle = match self.bounded(self.engine.create(&builder, &self.target)).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(alert_id = %self.target.alert_id, builder = builder.name(), "{}", err);
                return;
            }
        };

        {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                drop(inner);
                self.engine.destroy(&handle);
                return;
            }
            inner.handle = Some(handle.clone());
        }

        let played = self.bounded(self.engine.play(&handle)).await;

        // A superseded transition's handle was already destroyed by `begin`.
        let current = {
            let mut inner = self.inner.borrow_mut();
            let current = inner.generation == generation;
            if current {
                inner.handle = None;
            }
            current
        };
        match played {
            Err(err) if current => {
                warn!(alert_id = %self.target.alert_id, builder = builder.name(), "{}", err)
            }
            Err(err) => {
                debug!(alert_id = %self.target.alert_id, builder = builder.name(), "{}", err)
            }
            Ok(()) => {}
        }
        if current {
            self.engine.destroy(&handle);
        }
    }

    async fn bounded<T>(
        &self,
        step: impl Future<Output = Result<T, AnimationError>>,
    ) -> Result<T, AnimationError> {
        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, step)
                .await
                .map_err(|_| AnimationError::TimedOut(limit))?,
            None => step.await,
        }
    }
}
