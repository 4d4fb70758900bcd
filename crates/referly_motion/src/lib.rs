//! Referly Motion
//!
//! The scroll-synchronized animation pipeline used by the marketing site's
//! visual components. One pipeline instance drives one element:
//!
//! ```text
//! ProgressSource -> Smoother -> ChannelMap -> Renderer
//!   (scroll,         (spring,     (breakpoint    (transform
//!    pointer,         lerp)        mapping,       write per
//!    visibility,                   fan-out)       frame)
//!    time)
//! ```
//!
//! [`Pipeline`] wraps the chain with mount/unmount handling: one listener
//! per event type while mounted, one pending frame callback at a time, and
//! everything released on unmount or drop.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Lerp Smoothing**: frame-rate independent exponential smoothing
//! - **Breakpoint Mapping**: clamped piecewise-linear ranges with optional easing
//! - **Resilient**: non-finite inputs are dropped, never rendered
//! - **Presets**: fade-up, parallax, reveal-once, cursor tilt, progress bar

pub mod easing;
pub mod error;
pub mod pipeline;
pub mod presets;
pub mod progress;
pub mod proximity;
pub mod range;
pub mod render;
pub mod scheduler;
pub mod smoothing;
pub mod spring;

pub use easing::Easing;
pub use error::{MotionError, Result};
pub use pipeline::{LayoutProbe, LifecyclePhase, Pipeline, PipelineConfig, SharedLayout};
pub use presets::MotionPreset;
pub use progress::{
    page_progress, Anchor, Edge, PointerTracker, ProgressSource, ScrollOffset, ScrollProgress,
    TimeSource, VisibilityTrigger,
};
pub use proximity::{ProximityField, ProximityNode};
pub use range::{Channel, ChannelBinding, ChannelMap, Input, RangeMap};
pub use render::{RecordingTarget, RenderTarget, Renderer, Transform};
pub use scheduler::{FrameId, FrameScheduler};
pub use smoothing::{Smoother, Smoother2, Smoothing};
pub use spring::{Spring, SpringConfig};
