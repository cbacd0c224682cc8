//! Present/dismiss lifecycle tests.
//!
//! `ManualEngine` holds every animation until the test finishes it, so the
//! tests can interleave calls while a transition is in flight.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use insta::assert_snapshot;
use scry_alert::alert::{
    Alert, AlertEvent, AlertHost, AlertNotification, AlertOptions, AlertServices, AlertValue,
    AnimationBuilder, AnimationEngine, AnimationError, AnimationHandle, AnimationTarget,
    ButtonSpec, InputSpec, LifecycleState, Transition,
};
use tokio::sync::broadcast;

/// Log output captured from a scoped tracing subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event at DEBUG and above written to a buffer.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
    (out, text)
}

#[derive(Default)]
struct ManualEngine {
    next: Cell<u64>,
    log: RefCell<Vec<String>>,
    live: RefCell<Vec<u64>>,
    playing: RefCell<HashMap<u64, oneshot::Sender<()>>>,
}

impl ManualEngine {
    /// Let every playing animation run to its end.
    fn finish_all(&self) {
        let playing: Vec<_> = self.playing.borrow_mut().drain().collect();
        for (_, done) in playing {
            let _ = done.send(());
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

#[async_trait(?Send)]
impl AnimationEngine for ManualEngine {
    async fn create(
        &self,
        builder: &AnimationBuilder,
        _target: &AnimationTarget,
    ) -> Result<AnimationHandle, AnimationError> {
        let id = self.next.get();
        self.next.set(id + 1);
        self.log.borrow_mut().push(format!("create {} {}", id, builder.name()));
        self.live.borrow_mut().push(id);
        Ok(AnimationHandle::new(id))
    }

    async fn play(&self, handle: &AnimationHandle) -> Result<(), AnimationError> {
        let (done, finished) = oneshot::channel();
        self.playing.borrow_mut().insert(handle.id(), done);
        finished
            .await
            .map_err(|_| AnimationError::Destroyed(handle.id()))
    }

    fn destroy(&self, handle: &AnimationHandle) {
        self.log.borrow_mut().push(format!("destroy {}", handle.id()));
        self.live.borrow_mut().retain(|id| *id != handle.id());
        self.playing.borrow_mut().remove(&handle.id());
    }
}

#[derive(Default)]
struct RecordingHost {
    focus_calls: Cell<u32>,
    detach_calls: Cell<u32>,
}

impl AlertHost for RecordingHost {
    fn focus_first(&self) -> bool {
        self.focus_calls.set(self.focus_calls.get() + 1);
        true
    }

    fn schedule_detach(&self) {
        self.detach_calls.set(self.detach_calls.get() + 1);
    }
}

struct Harness {
    pool: LocalPool,
    engine: Rc<ManualEngine>,
    host: Rc<RecordingHost>,
    alert: Alert,
    events: broadcast::Receiver<AlertNotification>,
    results: Rc<RefCell<Vec<(&'static str, Transition)>>>,
}

impl Harness {
    fn new(options: AlertOptions) -> Self {
        let engine = Rc::new(ManualEngine::default());
        let host = Rc::new(RecordingHost::default());
        let alert = Alert::new(
            options.id("test"),
            AlertServices::new(engine.clone(), host.clone()),
        );
        let events = alert.subscribe();
        Self {
            pool: LocalPool::new(),
            engine,
            host,
            alert,
            events,
            results: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Spawn a transition and run everything until it blocks on an animation.
    fn run(&mut self, label: &'static str, transition: impl Future<Output = Transition> + 'static) {
        let results = Rc::clone(&self.results);
        self.pool
            .spawner()
            .spawn_local(async move {
                let outcome = transition.await;
                results.borrow_mut().push((label, outcome));
            })
            .expect("spawn transition");
        self.pool.run_until_stalled();
    }

    fn finish_animations(&mut self) {
        self.engine.finish_all();
        self.pool.run_until_stalled();
    }

    fn events(&mut self) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        while let Ok(notification) = self.events.try_recv() {
            assert_eq!(notification.alert_id, "test");
            events.push(notification.event);
        }
        events
    }

    fn event_names(&mut self) -> String {
        self.events()
            .iter()
            .map(AlertEvent::name)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn results(&self) -> Vec<(&'static str, Transition)> {
        self.results.borrow().clone()
    }
}

#[test]
fn full_lifecycle_emits_events_in_order() {
    let mut h = Harness::new(AlertOptions::new().button("OK"));

    h.alert.did_load();
    h.run("present", h.alert.present());
    assert_eq!(h.alert.state(), LifecycleState::Presenting);
    h.finish_animations();
    assert_eq!(h.alert.state(), LifecycleState::Presented);
    assert_eq!(h.host.focus_calls.get(), 1);

    h.run("dismiss", h.alert.dismiss());
    assert_eq!(h.alert.state(), LifecycleState::Dismissing);
    assert_eq!(h.host.detach_calls.get(), 0);
    h.finish_animations();
    assert_eq!(h.alert.state(), LifecycleState::Dismissed);
    h.alert.did_unload();

    assert_snapshot!(h.event_names(), @r###"
    did-load
    will-present
    did-present
    will-dismiss
    did-dismiss
    did-unload
    "###);
    assert_eq!(h.host.detach_calls.get(), 1);
    assert!(h.engine.live.borrow().is_empty());
    assert!(!h.alert.lifecycle().has_animation());
}

#[test]
fn double_dismiss_detaches_once() {
    let mut h = Harness::new(AlertOptions::new());
    h.run("present", h.alert.present());
    h.finish_animations();
    h.events();

    h.run("first", h.alert.dismiss());
    h.run("second", h.alert.dismiss());
    h.finish_animations();

    assert_eq!(
        h.results(),
        vec![
            ("present", Transition::Completed),
            ("second", Transition::Ignored),
            ("first", Transition::Completed),
        ]
    );
    assert_snapshot!(h.event_names(), @r###"
    will-dismiss
    did-dismiss
    "###);
    assert_eq!(h.host.detach_calls.get(), 1);

    // Still a no-op once fully dismissed
    h.run("third", h.alert.dismiss());
    assert_eq!(h.results().last(), Some(&("third", Transition::Ignored)));
    assert_eq!(h.host.detach_calls.get(), 1);
}

#[test]
fn re_present_destroys_handle_before_creating_next() {
    let mut h = Harness::new(AlertOptions::new());

    h.run("first", h.alert.present());
    h.run("second", h.alert.present());
    assert_eq!(
        h.engine.log(),
        vec!["create 0 md-enter", "destroy 0", "create 1 md-enter"]
    );

    h.finish_animations();
    assert_eq!(
        h.results(),
        vec![
            ("first", Transition::Superseded),
            ("second", Transition::Completed),
        ]
    );
    assert_snapshot!(h.event_names(), @r###"
    will-present
    will-present
    did-present
    "###);
    assert_eq!(h.host.focus_calls.get(), 1);
    assert!(h.engine.live.borrow().is_empty());
}

#[test]
fn superseded_playback_is_not_a_warning() {
    let (_, logs) = capture_logs(|| {
        let mut h = Harness::new(AlertOptions::new());
        h.run("first", h.alert.present());
        h.run("second", h.alert.present());
        h.finish_animations();
    });

    assert!(logs.contains("animation 0 was destroyed"));
    assert!(!logs.contains("WARN"));
}

#[test]
fn dismiss_while_presenting_supersedes_present() {
    let mut h = Harness::new(AlertOptions::new());

    h.run("present", h.alert.present());
    h.run("dismiss", h.alert.dismiss());
    h.finish_animations();

    assert_eq!(
        h.results(),
        vec![
            ("present", Transition::Superseded),
            ("dismiss", Transition::Completed),
        ]
    );
    assert_eq!(h.alert.state(), LifecycleState::Dismissed);
    assert_eq!(h.host.focus_calls.get(), 0);
    assert_snapshot!(h.event_names(), @r###"
    will-present
    will-dismiss
    did-dismiss
    "###);
}

#[test]
fn present_while_presented_is_ignored() {
    let mut h = Harness::new(AlertOptions::new());
    h.run("first", h.alert.present());
    h.finish_animations();

    h.run("again", h.alert.present());
    assert_eq!(h.results().last(), Some(&("again", Transition::Ignored)));
    assert_eq!(h.alert.state(), LifecycleState::Presented);
}

#[test]
fn stalled_animation_never_advances() {
    let mut h = Harness::new(AlertOptions::new());
    h.run("present", h.alert.present());

    h.pool.run_until_stalled();
    assert_eq!(h.alert.state(), LifecycleState::Presenting);
    assert!(h.alert.lifecycle().has_animation());
    assert!(h.results().is_empty());
}

#[test]
fn button_returning_false_keeps_alert_open() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut h = Harness::new(AlertOptions::new().button(ButtonSpec::new("Stay").handler(
        move |_: &AlertValue| {
            counter.set(counter.get() + 1);
            false
        },
    )));
    h.run("present", h.alert.present());
    h.finish_animations();
    h.events();

    assert!(h.alert.button_click(0).is_none());
    assert_eq!(calls.get(), 1);
    assert_eq!(h.alert.state(), LifecycleState::Presented);
    assert!(h.events().is_empty());
}

#[test]
fn button_dismissal_reports_value_and_role() {
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let mut h = Harness::new(
        AlertOptions::new()
            .input(InputSpec::radio().value("a"))
            .input(InputSpec::radio().value("b"))
            .button(
                ButtonSpec::new("OK")
                    .role("confirm")
                    .handler(move |value: &AlertValue| {
                        *sink.borrow_mut() = Some(value.clone());
                    }),
            ),
    );
    h.run("present", h.alert.present());
    h.finish_animations();
    h.events();

    h.alert.radio_click(1);
    let dismissal = h.alert.button_click(0).expect("button dismisses");
    h.run("button", dismissal);
    h.finish_animations();

    assert_eq!(*seen.borrow(), Some(AlertValue::Scalar("b".into())));
    let events = h.events();
    match &events[..] {
        [AlertEvent::WillDismiss(will), AlertEvent::DidDismiss(did)] => {
            assert_eq!(will, did);
            assert_eq!(did.data, AlertValue::Scalar("b".into()));
            assert_eq!(did.role.as_deref(), Some("confirm"));
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn backdrop_dismissal_respects_flag() {
    let mut h = Harness::new(AlertOptions::new().enable_backdrop_dismiss(false));
    h.run("present", h.alert.present());
    h.finish_animations();
    assert!(h.alert.backdrop_click().is_none());

    let mut h = Harness::new(AlertOptions::new());
    h.run("present", h.alert.present());
    h.finish_animations();
    h.events();

    let dismissal = h.alert.backdrop_click().expect("backdrop dismisses");
    h.run("backdrop", dismissal);
    h.finish_animations();

    let events = h.events();
    assert!(matches!(
        events.last(),
        Some(AlertEvent::DidDismiss(detail)) if detail.role.as_deref() == Some("backdrop")
    ));
}

#[test]
fn explicit_leave_animation_is_used() {
    let mut h = Harness::new(AlertOptions::new().leave_animation(AnimationBuilder::ios_leave()));
    h.run("present", h.alert.present());
    h.finish_animations();
    h.run("dismiss", h.alert.dismiss());

    assert_eq!(h.engine.log().last().map(String::as_str), Some("create 1 ios-leave"));
}

/// Never finishes playback.
struct StuckEngine {
    destroyed: Cell<u32>,
}

#[async_trait(?Send)]
impl AnimationEngine for StuckEngine {
    async fn create(
        &self,
        _builder: &AnimationBuilder,
        _target: &AnimationTarget,
    ) -> Result<AnimationHandle, AnimationError> {
        Ok(AnimationHandle::new(7))
    }

    async fn play(&self, _handle: &AnimationHandle) -> Result<(), AnimationError> {
        futures::future::pending().await
    }

    fn destroy(&self, _handle: &AnimationHandle) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn timeout_counts_as_completion() {
    let engine = Rc::new(StuckEngine {
        destroyed: Cell::new(0),
    });
    let host = Rc::new(RecordingHost::default());
    let mut services = AlertServices::new(engine.clone(), host.clone());
    services.animation_timeout = Some(Duration::from_millis(500));
    let alert = Alert::new(AlertOptions::new(), services);

    assert_eq!(alert.present().await, Transition::Completed);
    assert_eq!(alert.state(), LifecycleState::Presented);
    assert_eq!(engine.destroyed.get(), 1);
    assert_eq!(host.focus_calls.get(), 1);
}

/// Hands out the same token for every animation and finishes them in order.
#[derive(Default)]
struct SharedTokenEngine {
    log: RefCell<Vec<&'static str>>,
    playing: RefCell<VecDeque<oneshot::Sender<()>>>,
}

impl SharedTokenEngine {
    fn finish_oldest(&self) {
        if let Some(done) = self.playing.borrow_mut().pop_front() {
            let _ = done.send(());
        }
    }
}

#[async_trait(?Send)]
impl AnimationEngine for SharedTokenEngine {
    async fn create(
        &self,
        _builder: &AnimationBuilder,
        _target: &AnimationTarget,
    ) -> Result<AnimationHandle, AnimationError> {
        self.log.borrow_mut().push("create");
        Ok(AnimationHandle::new(7))
    }

    async fn play(&self, handle: &AnimationHandle) -> Result<(), AnimationError> {
        let (done, finished) = oneshot::channel();
        self.playing.borrow_mut().push_back(done);
        finished
            .await
            .map_err(|_| AnimationError::Destroyed(handle.id()))
    }

    fn destroy(&self, _handle: &AnimationHandle) {
        self.log.borrow_mut().push("destroy");
    }
}

#[test]
fn superseded_present_leaves_reused_token_alone() {
    let engine = Rc::new(SharedTokenEngine::default());
    let alert = Alert::new(
        AlertOptions::new(),
        AlertServices::new(engine.clone(), Rc::new(RecordingHost::default())),
    );
    let mut pool = LocalPool::new();
    let results = Rc::new(RefCell::new(Vec::new()));
    for (label, transition) in [("first", alert.present()), ("second", alert.present())] {
        let results = Rc::clone(&results);
        pool.spawner()
            .spawn_local(async move {
                let outcome = transition.await;
                results.borrow_mut().push((label, outcome));
            })
            .expect("spawn transition");
        pool.run_until_stalled();
    }
    assert_eq!(*engine.log.borrow(), vec!["create", "destroy", "create"]);

    // The stale first playback ends while the second is still running
    engine.finish_oldest();
    pool.run_until_stalled();
    assert_eq!(*engine.log.borrow(), vec!["create", "destroy", "create"]);
    assert_eq!(alert.state(), LifecycleState::Presenting);
    assert!(alert.lifecycle().has_animation());
    assert_eq!(*results.borrow(), vec![("first", Transition::Superseded)]);

    engine.finish_oldest();
    pool.run_until_stalled();
    assert_eq!(
        *engine.log.borrow(),
        vec!["create", "destroy", "create", "destroy"]
    );
    assert_eq!(alert.state(), LifecycleState::Presented);
    assert!(!alert.lifecycle().has_animation());
    assert_eq!(results.borrow().last(), Some(&("second", Transition::Completed)));
}
