//! Smoothing stage
//!
//! Turns a jumpy raw progress value into one fit for animation. Two forms are
//! used across the site: a physical spring, and per-frame exponential
//! smoothing (`current = lerp(current, target, factor)`).

use crate::spring::{Spring, SpringConfig};
use referly_core::Point;

/// Per-frame factor used by the site's hand-rolled followers
pub const DEFAULT_LERP_FACTOR: f32 = 0.08;

/// Reference frame rate the lerp factor is expressed against
const REFERENCE_FPS: f32 = 60.0;

/// Below this distance a lerp smoother snaps to its target
const LERP_REST_DELTA: f32 = 1e-4;

/// How a raw signal is smoothed
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Smoothing {
    /// Pass the raw value straight through
    None,
    /// Exponential smoothing; `factor` is the fraction of the remaining
    /// distance covered per 60 fps frame
    Lerp { factor: f32 },
    /// Spring physics
    Spring(SpringConfig),
}

impl Smoothing {
    pub fn lerp() -> Self {
        Smoothing::Lerp {
            factor: DEFAULT_LERP_FACTOR,
        }
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Spring(SpringConfig::default())
    }
}

#[derive(Clone, Debug)]
enum State {
    Immediate { value: f32 },
    Lerp { factor: f32, value: f32, target: f32 },
    Spring(Spring),
}

/// A smoothed scalar
#[derive(Clone, Debug)]
pub struct Smoother {
    state: State,
}

impl Smoother {
    pub fn new(smoothing: Smoothing, initial: f32) -> Self {
        let initial = if initial.is_finite() { initial } else { 0.0 };
        let state = match smoothing {
            Smoothing::None => State::Immediate { value: initial },
            Smoothing::Lerp { factor } => State::Lerp {
                factor: sanitize_factor(factor),
                value: initial,
                target: initial,
            },
            Smoothing::Spring(config) => State::Spring(Spring::new(config, initial)),
        };
        Self { state }
    }

    /// Set the value to chase. Non-finite targets are ignored so the
    /// smoothed output keeps its last valid value.
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() {
            tracing::debug!(target, "dropping non-finite progress sample");
            return;
        }
        match &mut self.state {
            State::Immediate { value } => *value = target,
            State::Lerp { target: t, .. } => *t = target,
            State::Spring(spring) => spring.set_target(target),
        }
    }

    pub fn target(&self) -> f32 {
        match &self.state {
            State::Immediate { value } => *value,
            State::Lerp { target, .. } => *target,
            State::Spring(spring) => spring.target(),
        }
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        match &mut self.state {
            State::Immediate { .. } => {}
            State::Lerp {
                factor,
                value,
                target,
            } => {
                let frames = dt * REFERENCE_FPS;
                let alpha = 1.0 - (1.0 - *factor).powf(frames);
                *value += (*target - *value) * alpha;
                if !value.is_finite() || (*target - *value).abs() < LERP_REST_DELTA {
                    *value = *target;
                }
            }
            State::Spring(spring) => spring.step(dt),
        }
    }

    pub fn value(&self) -> f32 {
        match &self.state {
            State::Immediate { value } => *value,
            State::Lerp { value, .. } => *value,
            State::Spring(spring) => spring.value(),
        }
    }

    pub fn is_settled(&self) -> bool {
        match &self.state {
            State::Immediate { .. } => true,
            State::Lerp { value, target, .. } => value == target,
            State::Spring(spring) => spring.is_settled(),
        }
    }

    /// Jump to a value with no transition
    pub fn snap_to(&mut self, to: f32) {
        if !to.is_finite() {
            return;
        }
        match &mut self.state {
            State::Immediate { value } => *value = to,
            State::Lerp { value, target, .. } => {
                *value = to;
                *target = to;
            }
            State::Spring(spring) => spring.snap_to(to),
        }
    }
}

fn sanitize_factor(factor: f32) -> f32 {
    if factor.is_finite() && factor > 0.0 {
        factor.min(1.0)
    } else {
        DEFAULT_LERP_FACTOR
    }
}

/// Two independently smoothed axes (pointer offsets, 2D progress)
#[derive(Clone, Debug)]
pub struct Smoother2 {
    pub x: Smoother,
    pub y: Smoother,
}

impl Smoother2 {
    pub fn new(smoothing: Smoothing, initial: Point) -> Self {
        Self {
            x: Smoother::new(smoothing, initial.x),
            y: Smoother::new(smoothing, initial.y),
        }
    }

    pub fn set_target(&mut self, target: Point) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn step(&mut self, dt: f32) {
        self.x.step(dt);
        self.y.step(dt);
    }

    pub fn value(&self) -> Point {
        Point::new(self.x.value(), self.y.value())
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }

    pub fn snap_to(&mut self, to: Point) {
        self.x.snap_to(to.x);
        self.y.snap_to(to.y);
    }
}
