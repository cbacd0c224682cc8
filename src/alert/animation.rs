//! Animation collaborator interface.
//!
//! The lifecycle never computes an animation itself. It resolves an
//! [`AnimationBuilder`], asks an [`AnimationEngine`] for a handle, plays it
//! and destroys it. [`FrameEngine`] is a tokio-timer engine that publishes
//! the current [`Pose`] for a renderer to pick up.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::AnimationConfig;

/// Registry key for the enter animation.
pub const ENTER_KEY: &str = "alertEnter";
/// Registry key for the leave animation.
pub const LEAVE_KEY: &str = "alertLeave";

/// Platform look, which selects the built-in default animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    #[default]
    Md,
}

impl Platform {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Md => "md",
        }
    }

    pub fn default_enter(&self) -> AnimationBuilder {
        match self {
            Platform::Ios => AnimationBuilder::ios_enter(),
            Platform::Md => AnimationBuilder::md_enter(),
        }
    }

    pub fn default_leave(&self) -> AnimationBuilder {
        match self {
            Platform::Ios => AnimationBuilder::ios_leave(),
            Platform::Md => AnimationBuilder::md_leave(),
        }
    }
}

/// Visual state of the alert wrapper at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    pub scale: f32,
}

impl Pose {
    pub const fn new(opacity: f32, scale: f32) -> Self {
        Self { opacity, scale }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// A linear transition between two poses.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    pub duration: Duration,
    pub from: Pose,
    pub to: Pose,
}

impl Keyframes {
    /// Interpolate at `progress`, clamped to [0.0, 1.0].
    pub fn sample(&self, progress: f32) -> Pose {
        let t = progress.clamp(0.0, 1.0);
        Pose {
            opacity: lerp(self.from.opacity, self.to.opacity, t),
            scale: lerp(self.from.scale, self.to.scale, t),
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// What an animation is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationTarget {
    pub alert_id: String,
}

/// A named recipe that builds [`Keyframes`] for a target.
#[derive(Clone)]
pub struct AnimationBuilder {
    name: Cow<'static, str>,
    build: Rc<dyn Fn(&AnimationTarget) -> Keyframes>,
}

impl AnimationBuilder {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        build: impl Fn(&AnimationTarget) -> Keyframes + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            build: Rc::new(build),
        }
    }

    /// A builder that always produces the same keyframes.
    pub fn fixed(name: impl Into<Cow<'static, str>>, keyframes: Keyframes) -> Self {
        Self::new(name, move |_| keyframes.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self, target: &AnimationTarget) -> Keyframes {
        (self.build)(target)
    }

    pub fn ios_enter() -> Self {
        Self::fixed(
            "ios-enter",
            Keyframes {
                duration: Duration::from_millis(200),
                from: Pose::new(0.01, 1.1),
                to: Pose::new(1.0, 1.0),
            },
        )
    }

    pub fn ios_leave() -> Self {
        Self::fixed(
            "ios-leave",
            Keyframes {
                duration: Duration::from_millis(200),
                from: Pose::new(1.0, 1.0),
                to: Pose::new(0.0, 0.9),
            },
        )
    }

    pub fn md_enter() -> Self {
        Self::fixed(
            "md-enter",
            Keyframes {
                duration: Duration::from_millis(150),
                from: Pose::new(0.01, 0.9),
                to: Pose::new(1.0, 1.0),
            },
        )
    }

    pub fn md_leave() -> Self {
        Self::fixed(
            "md-leave",
            Keyframes {
                duration: Duration::from_millis(150),
                from: Pose::new(0.99, 1.0),
                to: Pose::new(0.0, 0.9),
            },
        )
    }

    /// Look up a built-in builder by name (`ios-enter`, `md-leave`, ...).
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "ios-enter" => Some(Self::ios_enter()),
            "ios-leave" => Some(Self::ios_leave()),
            "md-enter" => Some(Self::md_enter()),
            "md-leave" => Some(Self::md_leave()),
            _ => None,
        }
    }
}

impl fmt::Debug for AnimationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimationBuilder").field(&self.name).finish()
    }
}

/// Builders overriding the platform defaults, keyed by [`ENTER_KEY`] / [`LEAVE_KEY`].
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    builders: HashMap<String, AnimationBuilder>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[animation]` config section.
    ///
    /// Unknown builder names are logged and skipped.
    pub fn from_config(config: &AnimationConfig) -> Self {
        let mut registry = Self::new();
        for (key, name) in [(ENTER_KEY, &config.alert_enter), (LEAVE_KEY, &config.alert_leave)] {
            let Some(name) = name else { continue };
            match AnimationBuilder::builtin(name) {
                Some(builder) => registry.register(key, builder),
                None => warn!(key, name = name.as_str(), "unknown animation builder"),
            }
        }
        registry
    }

    pub fn register(&mut self, key: impl Into<String>, builder: AnimationBuilder) {
        self.builders.insert(key.into(), builder);
    }

    /// The builder registered under `key`, else `fallback`.
    pub fn get(&self, key: &str, fallback: AnimationBuilder) -> AnimationBuilder {
        self.builders.get(key).cloned().unwrap_or(fallback)
    }
}

/// Opaque token for an animation owned by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnimationHandle {
    id: u64,
}

impl AnimationHandle {
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Errors an animation engine can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    #[error("failed to create animation: {0}")]
    Create(String),
    #[error("animation playback failed: {0}")]
    Playback(String),
    #[error("animation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("animation {0} was destroyed")]
    Destroyed(u64),
}

/// Builds, plays and releases animations.
#[async_trait(?Send)]
pub trait AnimationEngine {
    /// Build an animation for `target`.
    async fn create(
        &self,
        builder: &AnimationBuilder,
        target: &AnimationTarget,
    ) -> Result<AnimationHandle, AnimationError>;

    /// Play the animation; resolves once playback ends.
    async fn play(&self, handle: &AnimationHandle) -> Result<(), AnimationError>;

    /// Release the animation's resources. Must be idempotent.
    fn destroy(&self, handle: &AnimationHandle);
}

/// Plays keyframes frame by frame on tokio timers.
///
/// The sampled pose is published on a watch channel. Destroying a handle
/// stops its playback at the next frame.
pub struct FrameEngine {
    frame: Duration,
    next_id: Cell<u64>,
    live: RefCell<HashMap<u64, Keyframes>>,
    pose: watch::Sender<Option<Pose>>,
}

impl FrameEngine {
    pub fn new(frame: Duration) -> Self {
        let (pose, _) = watch::channel(None);
        Self {
            frame: frame.max(Duration::from_millis(1)),
            next_id: Cell::new(0),
            live: RefCell::new(HashMap::new()),
            pose,
        }
    }

    /// Receive the pose of the animation currently playing (`None` when idle).
    pub fn subscribe(&self) -> watch::Receiver<Option<Pose>> {
        self.pose.subscribe()
    }

    /// Number of animations not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

#[async_trait(?Send)]
impl AnimationEngine for FrameEngine {
    async fn create(
        &self,
        builder: &AnimationBuilder,
        target: &AnimationTarget,
    ) -> Result<AnimationHandle, AnimationError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let keyframes = builder.build(target);
        debug!(id, builder = builder.name(), duration = ?keyframes.duration, "animation created");
        self.live.borrow_mut().insert(id, keyframes);
        Ok(AnimationHandle::new(id))
    }

    async fn play(&self, handle: &AnimationHandle) -> Result<(), AnimationError> {
        let keyframes = self
            .live
            .borrow()
            .get(&handle.id)
            .cloned()
            .ok_or(AnimationError::Destroyed(handle.id))?;

        let frames = (keyframes.duration.as_millis() / self.frame.as_millis()).max(1) as u32;
        for frame in 0..=frames {
            if !self.live.borrow().contains_key(&handle.id) {
                return Err(AnimationError::Destroyed(handle.id));
            }
            self.pose
                .send_replace(Some(keyframes.sample(frame as f32 / frames as f32)));
            if frame < frames {
                tokio::time::sleep(self.frame).await;
            }
        }
        Ok(())
    }

    fn destroy(&self, handle: &AnimationHandle) {
        if self.live.borrow_mut().remove(&handle.id).is_some() {
            debug!(id = handle.id, "animation destroyed");
        }
    }
}
