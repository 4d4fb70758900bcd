//! Render application
//!
//! Writes mapped values to a visual target as compositor-friendly transform
//! and opacity changes. The renderer never reads layout; measurement happens
//! in event handlers, so a frame is a pure write.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Compositor-only visual properties of an element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation X in pixels
    pub translate_x: f32,
    /// Translation Y in pixels
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Rotation in degrees (Z-axis)
    pub rotate: f32,
    /// Rotation X in degrees (3D tilt)
    pub rotate_x: f32,
    /// Rotation Y in degrees (3D turn)
    pub rotate_y: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
    /// Blur radius in pixels
    pub blur: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotate: 0.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        opacity: 1.0,
        blur: 0.0,
    };

    pub fn is_finite(&self) -> bool {
        [
            self.translate_x,
            self.translate_y,
            self.scale_x,
            self.scale_y,
            self.rotate,
            self.rotate_x,
            self.rotate_y,
            self.opacity,
            self.blur,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// CSS `transform` value
    pub fn to_css_transform(&self) -> String {
        let mut css = format!(
            "translate3d({}px, {}px, 0px)",
            self.translate_x, self.translate_y
        );
        if self.scale_x == self.scale_y {
            let _ = write!(css, " scale({})", self.scale_x);
        } else {
            let _ = write!(css, " scale({}, {})", self.scale_x, self.scale_y);
        }
        let _ = write!(css, " rotate({}deg)", self.rotate);
        if self.rotate_x != 0.0 {
            let _ = write!(css, " rotateX({}deg)", self.rotate_x);
        }
        if self.rotate_y != 0.0 {
            let _ = write!(css, " rotateY({}deg)", self.rotate_y);
        }
        css
    }

    /// CSS `filter` value
    pub fn to_css_filter(&self) -> String {
        if self.blur > 0.0 {
            format!("blur({}px)", self.blur)
        } else {
            "none".to_string()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Anything a pipeline can draw into
pub trait RenderTarget: Send {
    /// False once the underlying element is gone; writes are skipped
    fn is_attached(&self) -> bool {
        true
    }

    fn apply(&mut self, transform: &Transform);
}

/// Applies transforms to a target, skipping redundant and invalid writes
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    last: Option<Transform>,
    writes: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `transform` to `target`. Returns true if a write happened.
    pub fn apply(&mut self, target: &mut dyn RenderTarget, transform: Transform) -> bool {
        if !target.is_attached() {
            return false;
        }
        if !transform.is_finite() {
            tracing::warn!(?transform, "skipping non-finite transform");
            return false;
        }
        if self.last == Some(transform) {
            return false;
        }
        target.apply(&transform);
        self.last = Some(transform);
        self.writes += 1;
        true
    }

    /// The last transform written
    pub fn last(&self) -> Option<Transform> {
        self.last
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

/// A target that logs every write, shareable between the pipeline and an observer
#[derive(Clone, Debug)]
pub struct RecordingTarget {
    log: Arc<Mutex<Vec<Transform>>>,
    attached: Arc<AtomicBool>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the element leaving the tree
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<Transform> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Transform> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    pub fn write_count(&self) -> usize {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for RecordingTarget {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn apply(&mut self, transform: &Transform) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_output() {
        let t = Transform {
            translate_y: 40.0,
            scale_x: 0.9,
            scale_y: 0.9,
            ..Transform::IDENTITY
        };
        assert_eq!(
            t.to_css_transform(),
            "translate3d(0px, 40px, 0px) scale(0.9) rotate(0deg)"
        );

        let tilt = Transform {
            rotate_x: 5.0,
            rotate_y: -3.0,
            scale_x: 0.5,
            ..Transform::IDENTITY
        };
        assert_eq!(
            tilt.to_css_transform(),
            "translate3d(0px, 0px, 0px) scale(0.5, 1) rotate(0deg) rotateX(5deg) rotateY(-3deg)"
        );
        assert_eq!(Transform::IDENTITY.to_css_filter(), "none");
    }

    #[test]
    fn renderer_skips_duplicates_and_non_finite() {
        let target = RecordingTarget::new();
        let mut sink = target.clone();
        let mut renderer = Renderer::new();

        assert!(renderer.apply(&mut sink, Transform::IDENTITY));
        assert!(!renderer.apply(&mut sink, Transform::IDENTITY));

        let bad = Transform {
            opacity: f32::NAN,
            ..Transform::IDENTITY
        };
        assert!(!renderer.apply(&mut sink, bad));
        assert_eq!(target.write_count(), 1);
        assert_eq!(renderer.last(), Some(Transform::IDENTITY));
    }

    #[test]
    fn detached_target_is_not_written() {
        let target = RecordingTarget::new();
        let mut sink = target.clone();
        target.detach();

        let mut renderer = Renderer::new();
        assert!(!renderer.apply(&mut sink, Transform::IDENTITY));
        assert_eq!(target.write_count(), 0);
    }
}
