//! Application context
//!
//! User-preference state (theme, sound effects, reduced motion) and the
//! navigation position. The context is created once at the application root
//! and handed to whatever needs it, usually as an `Arc<AppContext>`; there is
//! no hidden global instance, so tests construct their own.
//!
//! ```rust
//! use std::sync::Arc;
//! use referly_core::context::{AppContext, MotionPreference, ThemeMode};
//!
//! let ctx = Arc::new(
//!     AppContext::builder()
//!         .theme(ThemeMode::Dark)
//!         .motion(MotionPreference::Reduced)
//!         .build(),
//! );
//!
//! assert!(ctx.prefers_reduced_motion());
//! ctx.navigate("/dashboard");
//! assert_eq!(ctx.current_route(), "/dashboard");
//! ```

use std::sync::RwLock;

/// Color scheme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the operating system setting
    #[default]
    System,
}

/// Whether decorative motion should run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionPreference {
    #[default]
    Full,
    /// `prefers-reduced-motion: reduce`; animated values snap to targets
    Reduced,
}

/// UI sound-effect settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundSettings {
    pub enabled: bool,
    /// Playback volume in [0, 1]
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            volume: 0.5,
        }
    }
}

impl SoundSettings {
    /// Volume after applying the mute flag
    pub fn effective_volume(&self) -> f32 {
        if self.enabled {
            self.volume
        } else {
            0.0
        }
    }
}

/// Current route and back-stack
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    pub current_route: String,
    pub history: Vec<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_route: "/".to_string(),
            history: Vec::new(),
        }
    }
}

/// Shared user-preference and navigation state
#[derive(Debug, Default)]
pub struct AppContext {
    theme: RwLock<ThemeMode>,
    sound: RwLock<SoundSettings>,
    motion: RwLock<MotionPreference>,
    navigation: RwLock<NavigationState>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    pub fn theme(&self) -> ThemeMode {
        *self.theme.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        *self.theme.write().unwrap_or_else(|e| e.into_inner()) = theme;
        tracing::debug!(?theme, "theme changed");
    }

    /// Flip between light and dark; `System` resolves to dark.
    pub fn toggle_theme(&self) -> ThemeMode {
        let next = match self.theme() {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light | ThemeMode::System => ThemeMode::Dark,
        };
        self.set_theme(next);
        next
    }

    pub fn sound(&self) -> SoundSettings {
        *self.sound.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.sound.write().unwrap_or_else(|e| e.into_inner()).enabled = enabled;
    }

    /// Set the sound-effect volume, clamped to [0, 1]. Non-finite input is ignored.
    pub fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        self.sound.write().unwrap_or_else(|e| e.into_inner()).volume = volume.clamp(0.0, 1.0);
    }

    pub fn motion(&self) -> MotionPreference {
        *self.motion.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_motion(&self, motion: MotionPreference) {
        *self.motion.write().unwrap_or_else(|e| e.into_inner()) = motion;
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.motion() == MotionPreference::Reduced
    }

    pub fn current_route(&self) -> String {
        self.navigation
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .current_route
            .clone()
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Push a route. Navigating to the current route is a no-op.
    pub fn navigate(&self, route: impl Into<String>) {
        let route = route.into();
        let mut nav = self.navigation.write().unwrap_or_else(|e| e.into_inner());
        if nav.current_route == route {
            return;
        }
        let previous = std::mem::replace(&mut nav.current_route, route);
        nav.history.push(previous);
        tracing::debug!(route = %nav.current_route, "navigated");
    }

    /// Pop the back-stack. Returns the route now current, or None at the root.
    pub fn back(&self) -> Option<String> {
        let mut nav = self.navigation.write().unwrap_or_else(|e| e.into_inner());
        let previous = nav.history.pop()?;
        nav.current_route = previous;
        Some(nav.current_route.clone())
    }
}

/// Builder for [`AppContext`]
#[derive(Debug, Default)]
pub struct AppContextBuilder {
    theme: ThemeMode,
    sound: SoundSettings,
    motion: MotionPreference,
    route: Option<String>,
}

impl AppContextBuilder {
    pub fn theme(mut self, theme: ThemeMode) -> Self {
        self.theme = theme;
        self
    }

    pub fn sound(mut self, sound: SoundSettings) -> Self {
        self.sound = sound;
        self
    }

    pub fn motion(mut self, motion: MotionPreference) -> Self {
        self.motion = motion;
        self
    }

    pub fn initial_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn build(self) -> AppContext {
        let mut navigation = NavigationState::default();
        if let Some(route) = self.route {
            navigation.current_route = route;
        }
        AppContext {
            theme: RwLock::new(self.theme),
            sound: RwLock::new(self.sound),
            motion: RwLock::new(self.motion),
            navigation: RwLock::new(navigation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let ctx = AppContext::new();
        assert_eq!(ctx.theme(), ThemeMode::System);
        assert!(!ctx.prefers_reduced_motion());
        assert_eq!(ctx.current_route(), "/");
        assert_eq!(ctx.sound().effective_volume(), 0.0);
    }

    #[test]
    fn toggle_theme_cycles_light_dark() {
        let ctx = AppContext::new();
        assert_eq!(ctx.toggle_theme(), ThemeMode::Dark);
        assert_eq!(ctx.toggle_theme(), ThemeMode::Light);
        assert_eq!(ctx.toggle_theme(), ThemeMode::Dark);
    }

    #[test]
    fn volume_is_clamped_and_nan_ignored() {
        let ctx = AppContext::builder()
            .sound(SoundSettings {
                enabled: true,
                volume: 0.3,
            })
            .build();
        ctx.set_volume(4.0);
        assert_eq!(ctx.sound().volume, 1.0);
        ctx.set_volume(f32::NAN);
        assert_eq!(ctx.sound().volume, 1.0);
        ctx.set_volume(-1.0);
        assert_eq!(ctx.sound().effective_volume(), 0.0);
    }

    #[test]
    fn navigation_back_stack() {
        let ctx = AppContext::builder().initial_route("/home").build();
        ctx.navigate("/jobs");
        ctx.navigate("/jobs");
        ctx.navigate("/dashboard");
        assert_eq!(ctx.navigation().history, vec!["/home", "/jobs"]);

        assert_eq!(ctx.back().as_deref(), Some("/jobs"));
        assert_eq!(ctx.back().as_deref(), Some("/home"));
        assert_eq!(ctx.back(), None);
        assert_eq!(ctx.current_route(), "/home");
    }
}
