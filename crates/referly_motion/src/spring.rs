//! Spring physics
//!
//! A damped harmonic oscillator pulled toward a target value, integrated
//! with RK4. Frame deltas are clamped and split into fixed sub-steps so a
//! long frame (tab switch, debugger pause) cannot destabilize the spring.

/// Largest frame delta a single `step` will simulate
pub const MAX_FRAME_DT: f32 = 0.064;

/// Largest integration sub-step
const MAX_SUBSTEP: f32 = 1.0 / 120.0;

/// Spring constants
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub const fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Critically damped spring (unit mass) for the given stiffness
    pub fn critical(stiffness: f32) -> Self {
        Self::new(stiffness, 2.0 * stiffness.max(0.0).sqrt(), 1.0)
    }

    /// Soft, slightly bouncy
    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// Visible overshoot
    pub const fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    pub const fn stiff() -> Self {
        Self::new(210.0, 20.0, 1.0)
    }

    pub const fn snappy() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// Heavily over-damped, slow settle
    pub const fn molasses() -> Self {
        Self::new(280.0, 120.0, 1.0)
    }

    /// Smoothing for scroll-linked progress (progress bars, section fades)
    pub const fn scroll() -> Self {
        Self::new(100.0, 30.0, 1.0)
    }

    /// Cursor followers and tilt cards
    pub const fn cursor() -> Self {
        Self::new(400.0, 28.0, 1.0)
    }

    /// Background parallax layers
    pub const fn parallax() -> Self {
        Self::new(50.0, 15.0, 1.0)
    }

    /// `damping / (2 * sqrt(stiffness * mass))`; 1.0 is critical damping
    pub fn damping_ratio(&self) -> f32 {
        let denom = 2.0 * (self.stiffness * self.mass).sqrt();
        if denom > 0.0 && denom.is_finite() {
            self.damping / denom
        } else {
            f32::INFINITY
        }
    }

    /// True for critically damped and over-damped configs (no overshoot)
    pub fn is_critically_damped(&self) -> bool {
        self.damping_ratio() >= 0.999
    }

    /// Replace nonsensical constants so integration stays finite
    fn sanitized(self) -> Self {
        let fallback = Self::default();
        Self {
            stiffness: if self.stiffness.is_finite() && self.stiffness >= 0.0 {
                self.stiffness
            } else {
                fallback.stiffness
            },
            damping: if self.damping.is_finite() && self.damping >= 0.0 {
                self.damping
            } else {
                fallback.damping
            },
            mass: if self.mass.is_finite() && self.mass > 0.0 {
                self.mass
            } else {
                fallback.mass
            },
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::critical(100.0)
    }
}

/// A spring-animated scalar
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    rest_delta: f32,
    rest_speed: f32,
}

impl Spring {
    /// Create a spring at rest at `initial`
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        let initial = if initial.is_finite() { initial } else { 0.0 };
        Self {
            config: config.sanitized(),
            value: initial,
            velocity: 0.0,
            target: initial,
            rest_delta: 0.001,
            rest_speed: 0.01,
        }
    }

    /// Builder: distance and speed below which the spring snaps to rest
    pub fn with_rest_threshold(mut self, delta: f32, speed: f32) -> Self {
        self.rest_delta = delta.abs();
        self.rest_speed = speed.abs();
        self
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget the spring. Velocity carries over, so retargeting mid-flight
    /// stays continuous. Non-finite targets are ignored.
    pub fn set_target(&mut self, target: f32) {
        if !target.is_finite() {
            tracing::warn!(target, "ignoring non-finite spring target");
            return;
        }
        self.target = target;
    }

    /// Jump to a value and stop
    pub fn snap_to(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.velocity == 0.0 && self.value == self.target
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || self.is_settled() {
            return;
        }

        let dt = dt.min(MAX_FRAME_DT);
        let substeps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.rk4(h);
        }

        if !self.value.is_finite() || !self.velocity.is_finite() {
            tracing::warn!(
                value = self.value,
                velocity = self.velocity,
                "spring diverged, resetting to target"
            );
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        if (self.target - self.value).abs() < self.rest_delta
            && self.velocity.abs() < self.rest_speed
        {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        (-stiffness * (x - self.target) - damping * v) / mass
    }

    fn rk4(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1x = v;
        let k1v = self.acceleration(x, v);

        let k2x = v + 0.5 * h * k1v;
        let k2v = self.acceleration(x + 0.5 * h * k1x, k2x);

        let k3x = v + 0.5 * h * k2v;
        let k3v = self.acceleration(x + 0.5 * h * k2x, k3x);

        let k4x = v + h * k3v;
        let k4v = self.acceleration(x + h * k3x, k4x);

        self.value = x + h / 6.0 * (k1x + 2.0 * k2x + 2.0 * k3x + k4x);
        self.velocity = v + h / 6.0 * (k1v + 2.0 * k2v + 2.0 * k3v + k4v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn default_is_critically_damped() {
        let config = SpringConfig::default();
        assert!((config.damping_ratio() - 1.0).abs() < 1e-6);
        assert!(config.is_critically_damped());
        assert!(!SpringConfig::wobbly().is_critically_damped());
    }

    #[test]
    fn converges_within_sixty_frames_without_overshoot() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0);
        spring.set_target(1.0);

        let mut max_seen = 0.0_f32;
        let mut within_one_percent = None;
        for frame in 1..=60 {
            spring.step(FRAME);
            max_seen = max_seen.max(spring.value());
            if within_one_percent.is_none() && (spring.value() - 1.0).abs() <= 0.01 {
                within_one_percent = Some(frame);
            }
        }

        assert!(within_one_percent.is_some());
        assert!(max_seen <= 1.0 + 1e-4, "overshoot: {max_seen}");
    }

    #[test]
    fn underdamped_spring_overshoots_then_settles() {
        let mut spring = Spring::new(SpringConfig::wobbly(), 0.0);
        spring.set_target(100.0);

        let mut max_seen = 0.0_f32;
        for _ in 0..600 {
            spring.step(FRAME);
            max_seen = max_seen.max(spring.value());
        }
        assert!(max_seen > 100.0);
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 100.0);
    }

    #[test]
    fn non_finite_target_keeps_last_valid() {
        let mut spring = Spring::new(SpringConfig::scroll(), 0.0);
        spring.set_target(0.5);
        spring.set_target(f32::NAN);
        spring.set_target(f32::INFINITY);
        assert_eq!(spring.target(), 0.5);

        for _ in 0..30 {
            spring.step(FRAME);
            assert!(spring.value().is_finite());
        }
    }

    #[test]
    fn huge_or_invalid_dt_is_harmless() {
        let mut spring = Spring::new(SpringConfig::snappy(), 0.0);
        spring.set_target(1.0);
        spring.step(f32::NAN);
        spring.step(-1.0);
        assert_eq!(spring.value(), 0.0);

        spring.step(10.0);
        assert!(spring.value().is_finite());
        assert!(spring.value() > 0.0 && spring.value() < 1.5);
    }

    #[test]
    fn invalid_config_falls_back() {
        let spring = Spring::new(SpringConfig::new(f32::NAN, -1.0, 0.0), f32::NAN);
        assert_eq!(spring.config(), SpringConfig::default());
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn retarget_mid_flight_is_continuous() {
        let mut spring = Spring::new(SpringConfig::stiff(), 0.0);
        spring.set_target(1.0);
        for _ in 0..5 {
            spring.step(FRAME);
        }
        let before = spring.value();
        spring.set_target(-1.0);
        spring.step(FRAME);
        assert!((spring.value() - before).abs() < 0.2);
    }
}
