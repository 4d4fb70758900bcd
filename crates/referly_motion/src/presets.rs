//! Motion presets
//!
//! The handful of animation recipes the site's sections are built from.
//! Each returns a [`PipelineConfig`] ready to mount on an element.

use crate::easing::Easing;
use crate::error::Result;
use crate::pipeline::PipelineConfig;
use crate::progress::{
    PointerTracker, ProgressSource, ScrollOffset, ScrollProgress, TimeSource, VisibilityTrigger,
};
use crate::range::{Channel, ChannelMap, Input, RangeMap};
use crate::smoothing::Smoothing;
use crate::spring::SpringConfig;

/// Root margin used by reveal-on-scroll sections
pub const REVEAL_MARGIN: f32 = -100.0;

/// Pre-built pipeline configurations
pub struct MotionPreset;

impl MotionPreset {
    /// Fade in while rising `distance` pixels as the element scrolls into view
    pub fn fade_up(distance: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new()
            .channel(Channel::Opacity, RangeMap::new(&[0.0, 0.3], &[0.0, 1.0])?)
            .channel(
                Channel::TranslateY,
                RangeMap::new(&[0.0, 0.3], &[distance, 0.0])?.with_easing(Easing::EaseOut),
            );
        Ok(
            PipelineConfig::new(ProgressSource::Scroll(ScrollProgress::default()))
                .smoothing(Smoothing::Spring(SpringConfig::scroll()))
                .channels(channels),
        )
    }

    /// Background layer drifting `distance` pixels against the scroll
    /// direction over the element's pass through the viewport
    pub fn parallax(distance: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new().channel(
            Channel::TranslateY,
            RangeMap::linear(distance, -distance)?,
        );
        Ok(
            PipelineConfig::new(ProgressSource::Scroll(ScrollProgress::default()))
                .smoothing(Smoothing::Spring(SpringConfig::parallax()))
                .channels(channels),
        )
    }

    /// Grow from `from_scale` to full size by the time the element is centered
    pub fn scale_in(from_scale: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new()
            .channel(Channel::Scale, RangeMap::linear(from_scale, 1.0)?)
            .channel(Channel::Opacity, RangeMap::new(&[0.0, 0.6], &[0.0, 1.0])?);
        Ok(PipelineConfig::new(ProgressSource::Scroll(ScrollProgress::new(
            ScrollOffset::enter_to_center(),
        )))
        .smoothing(Smoothing::Spring(SpringConfig::scroll()))
        .channels(channels))
    }

    /// Play-once reveal: fade and rise the first time the element is seen
    pub fn reveal_once(distance: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new()
            .channel(Channel::Opacity, RangeMap::linear(0.0, 1.0)?)
            .channel(Channel::TranslateY, RangeMap::linear(distance, 0.0)?)
            .channel(Channel::Blur, RangeMap::linear(8.0, 0.0)?);
        Ok(PipelineConfig::new(ProgressSource::Visibility(
            VisibilityTrigger::once(REVEAL_MARGIN),
        ))
        .smoothing(Smoothing::Spring(SpringConfig::gentle()))
        .channels(channels))
    }

    /// 3D tilt toward the pointer, up to `max_degrees` on each axis
    pub fn cursor_tilt(max_degrees: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new()
            .bind(
                Channel::RotateY,
                Input::Primary,
                RangeMap::new(&[-1.0, 1.0], &[-max_degrees, max_degrees])?,
            )
            .bind(
                Channel::RotateX,
                Input::Secondary,
                RangeMap::new(&[-1.0, 1.0], &[max_degrees, -max_degrees])?,
            );
        Ok(
            PipelineConfig::new(ProgressSource::Pointer(PointerTracker::default()))
                .smoothing(Smoothing::Spring(SpringConfig::cursor()))
                .channels(channels),
        )
    }

    /// Reading-progress bar across the top of the page
    pub fn page_progress_bar() -> Result<PipelineConfig> {
        let channels = ChannelMap::new().channel(Channel::ScaleX, RangeMap::linear(0.0, 1.0)?);
        Ok(PipelineConfig::new(ProgressSource::Page)
            .smoothing(Smoothing::Spring(SpringConfig::scroll()))
            .channels(channels))
    }

    /// Idle bobbing for decorative shapes
    pub fn float(period_secs: f32, amplitude: f32) -> Result<PipelineConfig> {
        let channels = ChannelMap::new().channel(
            Channel::TranslateY,
            RangeMap::new(&[0.0, 0.5, 1.0], &[0.0, -amplitude, 0.0])?
                .with_easing(Easing::EaseInOut),
        );
        Ok(
            PipelineConfig::new(ProgressSource::Time(TimeSource::new(period_secs)))
                .smoothing(Smoothing::None)
                .channels(channels),
        )
    }

    /// Look a preset up by name with its default parameters
    pub fn by_name(name: &str) -> Option<Result<PipelineConfig>> {
        let config = match name {
            "fade-up" => Self::fade_up(60.0),
            "parallax" => Self::parallax(120.0),
            "scale-in" => Self::scale_in(0.8),
            "reveal-once" => Self::reveal_once(40.0),
            "cursor-tilt" => Self::cursor_tilt(12.0),
            "progress-bar" => Self::page_progress_bar(),
            "float" => Self::float(6.0, 16.0),
            _ => return None,
        };
        Some(config)
    }

    /// Names accepted by [`MotionPreset::by_name`]
    pub const NAMES: &'static [&'static str] = &[
        "fade-up",
        "parallax",
        "scale-in",
        "reveal-once",
        "cursor-tilt",
        "progress-bar",
        "float",
    ];

    /// Start delay for the `index`-th item of a staggered group
    pub fn stagger_delay(index: usize, base_ms: u32) -> u32 {
        (index as u32).saturating_mul(base_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use referly_core::Point;

    #[test]
    fn every_named_preset_builds() {
        for name in MotionPreset::NAMES {
            let config = MotionPreset::by_name(name)
                .unwrap_or_else(|| panic!("unknown preset {name}"))
                .unwrap();
            assert!(!config.channels.is_empty(), "{name}");
        }
        assert!(MotionPreset::by_name("wiggle").is_none());
    }

    #[test]
    fn fade_up_endpoints() {
        let config = MotionPreset::fade_up(60.0).unwrap();
        let start = config.channels.map(Point::ZERO);
        let done = config.channels.map(Point::new(0.5, 0.0));
        assert_eq!((start.opacity, start.translate_y), (0.0, 60.0));
        assert_eq!((done.opacity, done.translate_y), (1.0, 0.0));
    }

    #[test]
    fn cursor_tilt_tips_toward_pointer() {
        let config = MotionPreset::cursor_tilt(10.0).unwrap();
        let t = config.channels.map(Point::new(1.0, 1.0));
        assert_eq!(t.rotate_y, 10.0);
        assert_eq!(t.rotate_x, -10.0);
    }

    #[test]
    fn invalid_parameters_are_reported() {
        assert!(MotionPreset::parallax(f32::NAN).is_err());
    }

    #[test]
    fn stagger() {
        assert_eq!(MotionPreset::stagger_delay(0, 80), 0);
        assert_eq!(MotionPreset::stagger_delay(3, 80), 240);
    }
}
