//! Pipeline lifecycle
//!
//! A [`Pipeline`] owns one element's animation chain and its attachment to
//! the host: event listeners in a [`SharedRegistry`] and a self-renewing
//! callback in a [`FrameScheduler`].
//!
//! ```text
//! Unmounted --mount--> Mounted --unmount/drop--> Disposed
//! ```
//!
//! While mounted there is exactly one listener per event type the source
//! needs and at most one pending frame. Layout is read only when an event
//! arrives (and once at mount); frames only smooth, map, and write.

use crate::error::{MotionError, Result};
use crate::progress::{page_progress, ProgressSource};
use crate::range::ChannelMap;
use crate::render::{RenderTarget, Renderer, Transform};
use crate::scheduler::{FrameId, FrameScheduler};
use crate::smoothing::{Smoother2, Smoothing};
use referly_core::events::{event_types, Event, EventData, ListenerId, SharedRegistry};
use referly_core::{AppContext, Point, Rect, Viewport};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Layout queries for the animated element
pub trait LayoutProbe: Send {
    /// Bounding rect in document coordinates, or `None` if not mounted
    fn measure(&self) -> Option<Rect>;

    /// Full scrollable height of the document
    fn document_height(&self) -> f32 {
        0.0
    }
}

#[derive(Debug, Default)]
struct LayoutSnapshot {
    rect: Option<Rect>,
    document_height: f32,
}

/// Layout whose values are set by the host; counts every read
#[derive(Clone, Debug, Default)]
pub struct SharedLayout {
    snapshot: Arc<Mutex<LayoutSnapshot>>,
    reads: Arc<AtomicU64>,
}

impl SharedLayout {
    pub fn new(rect: Option<Rect>) -> Self {
        let layout = Self::default();
        layout.set_rect(rect);
        layout
    }

    fn snapshot(&self) -> MutexGuard<'_, LayoutSnapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_rect(&self, rect: Option<Rect>) {
        self.snapshot().rect = rect;
    }

    pub fn set_document_height(&self, height: f32) {
        self.snapshot().document_height = height;
    }

    /// Simulate the element leaving the tree
    pub fn detach(&self) {
        self.set_rect(None);
    }

    /// Number of layout reads performed so far
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl LayoutProbe for SharedLayout {
    fn measure(&self) -> Option<Rect> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.snapshot().rect
    }

    fn document_height(&self) -> f32 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.snapshot().document_height
    }
}

/// Everything that defines an animation, independent of the element
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub source: ProgressSource,
    pub smoothing: Smoothing,
    pub channels: ChannelMap,
}

impl PipelineConfig {
    pub fn new(source: ProgressSource) -> Self {
        Self {
            source,
            smoothing: Smoothing::default(),
            channels: ChannelMap::new(),
        }
    }

    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn channels(mut self, channels: ChannelMap) -> Self {
        self.channels = channels;
        self
    }
}

/// Lifecycle state of a pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Unmounted,
    Mounted,
    /// Terminal; listeners and frames have been released
    Disposed,
}

struct Core {
    source: ProgressSource,
    smoother: Smoother2,
    channels: ChannelMap,
    renderer: Renderer,
    target: Box<dyn RenderTarget>,
    layout: Box<dyn LayoutProbe>,
    viewport: Viewport,
    /// Rect from the most recent layout read
    rect: Option<Rect>,
    pointer: Option<Point>,
    phase: LifecyclePhase,
    frame: Option<FrameId>,
}

impl Core {
    /// Read layout and push a fresh raw sample into the smoother
    fn refresh(&mut self) {
        self.rect = self.layout.measure();
        let sample = match &mut self.source {
            ProgressSource::Scroll(scroll) => scroll
                .sample(self.rect, &self.viewport)
                .map(|p| Point::new(p, 0.0)),
            ProgressSource::Page => page_progress(self.layout.document_height(), &self.viewport)
                .map(|p| Point::new(p, 0.0)),
            ProgressSource::Pointer(tracker) => Some(tracker.sample(self.rect, self.pointer)),
            ProgressSource::Visibility(trigger) => {
                let visible = trigger.observe(self.rect, &self.viewport);
                Some(Point::new(if visible { 1.0 } else { 0.0 }, 0.0))
            }
            ProgressSource::Time(_) => None,
        };

        match sample {
            Some(signal) => self.smoother.set_target(signal),
            None => tracing::trace!("no progress sample, keeping previous target"),
        }
    }

    fn handle_event(&mut self, event: &Event) {
        if self.phase != LifecyclePhase::Mounted {
            return;
        }
        match event.data {
            EventData::Scroll { x, y } => {
                self.viewport.scroll_x = x;
                self.viewport.scroll_y = y;
            }
            EventData::Resize { width, height } => {
                self.viewport.width = width;
                self.viewport.height = height;
            }
            EventData::Pointer { x, y } => self.pointer = Some(Point::new(x, y)),
            EventData::None => {
                if event.event_type == event_types::POINTER_LEAVE {
                    self.pointer = None;
                }
            }
        }
        self.refresh();
    }

    fn tick(&mut self, dt: f32) {
        if let ProgressSource::Time(time) = &mut self.source {
            let phase = time.advance(dt);
            self.smoother.set_target(Point::new(phase, 0.0));
        }
        self.smoother.step(dt);
        let transform = self.channels.map(self.smoother.value());
        self.renderer.apply(self.target.as_mut(), transform);
    }
}

struct Attachment {
    registry: SharedRegistry,
    scheduler: FrameScheduler,
    listeners: SmallVec<[ListenerId; 2]>,
}

/// One element's animation, attached to a host while mounted
pub struct Pipeline {
    core: Arc<Mutex<Core>>,
    attachment: Option<Attachment>,
}

fn lock(core: &Mutex<Core>) -> MutexGuard<'_, Core> {
    core.lock().unwrap_or_else(|e| e.into_inner())
}

/// Request the next frame for `core`; the callback re-requests itself
/// for as long as the pipeline stays mounted.
fn schedule_frame(core: &Arc<Mutex<Core>>, scheduler: &FrameScheduler) -> FrameId {
    let weak: Weak<Mutex<Core>> = Arc::downgrade(core);
    let next = scheduler.clone();
    scheduler.request_frame(move |dt| {
        let Some(core) = weak.upgrade() else {
            return;
        };
        let mut guard = lock(&core);
        if guard.phase != LifecyclePhase::Mounted {
            return;
        }
        guard.tick(dt);
        guard.frame = Some(schedule_frame(&core, &next));
    })
}

impl Pipeline {
    pub fn new<L, T>(config: PipelineConfig, layout: L, target: T) -> Self
    where
        L: LayoutProbe + 'static,
        T: RenderTarget + 'static,
    {
        let neutral = config.source.neutral();
        let core = Core {
            source: config.source,
            smoother: Smoother2::new(config.smoothing, neutral),
            channels: config.channels,
            renderer: Renderer::new(),
            target: Box::new(target),
            layout: Box::new(layout),
            viewport: Viewport::default(),
            rect: None,
            pointer: None,
            phase: LifecyclePhase::Unmounted,
            frame: None,
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            attachment: None,
        }
    }

    /// Honour the user's reduced-motion preference: values jump straight
    /// to their targets instead of animating.
    pub fn respecting(self, ctx: &AppContext) -> Self {
        if ctx.prefers_reduced_motion() {
            let mut core = lock(&self.core);
            let current = core.smoother.value();
            core.smoother = Smoother2::new(Smoothing::None, current);
            drop(core);
        }
        self
    }

    pub fn phase(&self) -> LifecyclePhase {
        lock(&self.core).phase
    }

    pub fn is_mounted(&self) -> bool {
        self.phase() == LifecyclePhase::Mounted
    }

    /// Current smoothed signal
    pub fn signal(&self) -> Point {
        lock(&self.core).smoother.value()
    }

    /// Raw target the smoother is chasing
    pub fn target_signal(&self) -> Point {
        let core = lock(&self.core);
        Point::new(core.smoother.x.target(), core.smoother.y.target())
    }

    /// The last transform written to the target
    pub fn last_transform(&self) -> Option<Transform> {
        lock(&self.core).renderer.last()
    }

    /// Attach to a host.
    ///
    /// Takes one layout reading, starts the smoothed value at the current
    /// progress (no animation from zero on first paint; visibility
    /// entrances are the exception and play in), registers one
    /// listener per needed event type, and requests the first frame.
    /// Mounting an already-mounted pipeline does nothing.
    pub fn mount(
        &mut self,
        registry: &SharedRegistry,
        scheduler: &FrameScheduler,
        viewport: Viewport,
    ) -> Result<()> {
        let event_types = {
            let mut core = lock(&self.core);
            match core.phase {
                LifecyclePhase::Mounted => {
                    tracing::debug!("pipeline already mounted");
                    return Ok(());
                }
                LifecyclePhase::Disposed => return Err(MotionError::Disposed),
                LifecyclePhase::Unmounted => {}
            }

            core.viewport = viewport;
            core.refresh();
            // Entrances play from their hidden state even when already in view
            if !matches!(core.source, ProgressSource::Visibility(_)) {
                let start = Point::new(core.smoother.x.target(), core.smoother.y.target());
                core.smoother.snap_to(start);
            }
            core.phase = LifecyclePhase::Mounted;
            core.frame = Some(schedule_frame(&self.core, scheduler));
            core.source.event_types()
        };

        // Registry is locked without holding the core lock; dispatch takes
        // them in the opposite order.
        let mut listeners = SmallVec::new();
        {
            let mut reg = registry.lock().unwrap_or_else(|e| e.into_inner());
            for &event_type in event_types {
                let weak = Arc::downgrade(&self.core);
                listeners.push(reg.add_listener(event_type, move |event| {
                    if let Some(core) = weak.upgrade() {
                        lock(&core).handle_event(event);
                    }
                }));
            }
        }

        tracing::debug!(listeners = listeners.len(), "pipeline mounted");
        self.attachment = Some(Attachment {
            registry: registry.clone(),
            scheduler: scheduler.clone(),
            listeners,
        });
        Ok(())
    }

    /// Detach from the host: cancel the pending frame and remove every
    /// listener. The pipeline cannot be mounted again afterwards.
    pub fn unmount(&mut self) {
        let frame = {
            let mut core = lock(&self.core);
            if core.phase == LifecyclePhase::Disposed {
                return;
            }
            core.phase = LifecyclePhase::Disposed;
            core.frame.take()
        };

        let Some(attachment) = self.attachment.take() else {
            return;
        };
        if let Some(frame) = frame {
            attachment.scheduler.cancel_frame(frame);
        }
        let mut reg = attachment
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for id in &attachment.listeners {
            reg.remove_listener(*id);
        }
        tracing::debug!(listeners = attachment.listeners.len(), "pipeline unmounted");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("phase", &self.phase())
            .field("signal", &self.signal())
            .finish()
    }
}
