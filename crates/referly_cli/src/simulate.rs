//! Headless pipeline simulation
//!
//! Mounts one preset on a synthetic page, scrolls from the top to
//! `scroll_to` over the first half of the run while sweeping the pointer
//! across the element, then lets the smoothing settle. Every transform
//! the renderer writes is printed as one JSON line.

use crate::config::SimulateConfig;
use anyhow::{Context, Result};
use referly_core::events::{Event, ListenerRegistry};
use referly_core::{AppContext, MotionPreference, Rect, Viewport};
use referly_motion::{
    FrameScheduler, MotionPreset, Pipeline, RecordingTarget, SharedLayout, Transform,
};
use serde_json::json;
use std::io::Write;

/// Run the simulation, writing JSON lines to `out`. Returns the number of writes.
pub fn run(config: &SimulateConfig, out: &mut dyn Write) -> Result<usize> {
    let preset = MotionPreset::by_name(&config.preset)
        .with_context(|| {
            format!(
                "Unknown preset '{}'. Available: {}",
                config.preset,
                MotionPreset::NAMES.join(", ")
            )
        })?
        .context("Failed to build preset")?;

    let rect = Rect::new(
        0.0,
        config.element_top,
        config.viewport_width,
        config.element_height,
    );
    let layout = SharedLayout::new(Some(rect));
    layout.set_document_height(config.document_height);

    let registry = ListenerRegistry::shared();
    let scheduler = FrameScheduler::new();
    let target = RecordingTarget::new();
    let viewport = Viewport::new(config.viewport_width, config.viewport_height);

    let motion = if config.reduced_motion {
        MotionPreference::Reduced
    } else {
        MotionPreference::Full
    };
    let ctx = AppContext::builder().motion(motion).build();
    let mut pipeline = Pipeline::new(preset, layout, target.clone()).respecting(&ctx);
    pipeline
        .mount(&registry, &scheduler, viewport)
        .context("Failed to mount pipeline")?;

    let dt = 1.0 / config.frame_rate.max(1.0);
    let input_frames = (config.frames / 2).max(1);
    let mut written = 0;

    for frame in 0..config.frames {
        let t = ((frame + 1) as f32 / input_frames as f32).min(1.0);
        let scroll = config.scroll_to * t;
        {
            let registry = registry
                .lock()
                .map_err(|_| anyhow::anyhow!("listener registry poisoned"))?;
            registry.dispatch(&Event::scroll(0.0, scroll));
            registry.dispatch(&Event::pointer_move(
                rect.left() + rect.width * t,
                rect.center().y,
            ));
        }

        scheduler.run_frame(dt);

        if target.write_count() > written {
            written = target.write_count();
            if let Some(transform) = target.last() {
                writeln!(out, "{}", frame_line(frame, scroll, &transform))?;
            }
        }
    }

    pipeline.unmount();
    tracing::debug!(
        preset = %config.preset,
        frames = config.frames,
        writes = written,
        "simulation finished"
    );
    Ok(written)
}

fn frame_line(frame: u32, scroll: f32, transform: &Transform) -> serde_json::Value {
    json!({
        "frame": frame,
        "scrollY": scroll,
        "opacity": transform.opacity,
        "translateX": transform.translate_x,
        "translateY": transform.translate_y,
        "scaleX": transform.scale_x,
        "scaleY": transform.scale_y,
        "rotate": transform.rotate,
        "rotateX": transform.rotate_x,
        "rotateY": transform.rotate_y,
        "blur": transform.blur,
        "transform": transform.to_css_transform(),
        "filter": transform.to_css_filter(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn lines(output: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn fade_up_reaches_full_opacity() {
        let config = SimulateConfig {
            frames: 240,
            scroll_to: 900.0,
            ..SimulateConfig::default()
        };
        let mut output = Vec::new();
        let writes = run(&config, &mut output).unwrap();

        let lines = lines(&output);
        assert_eq!(lines.len(), writes);
        assert!(writes > 10);
        let last = lines.last().unwrap();
        assert!((last["opacity"].as_f64().unwrap() - 1.0).abs() < 1e-2);
        assert_eq!(last["scrollY"], 900.0);
    }

    #[test]
    fn every_preset_runs() {
        for name in MotionPreset::NAMES {
            let config = SimulateConfig {
                preset: name.to_string(),
                frames: 30,
                ..SimulateConfig::default()
            };
            let mut output = Vec::new();
            run(&config, &mut output).unwrap();
        }
    }

    #[test]
    fn reduced_motion_jumps_to_targets() {
        let config = SimulateConfig {
            frames: 2,
            scroll_to: 900.0,
            reduced_motion: true,
            ..SimulateConfig::default()
        };
        let mut output = Vec::new();
        run(&config, &mut output).unwrap();
        let last = lines(&output).pop().unwrap();
        assert_eq!(last["opacity"], 1.0);
        assert_eq!(last["translateY"], 0.0);
    }

    #[test]
    fn unknown_preset_lists_names() {
        let config = SimulateConfig {
            preset: "spin".into(),
            ..SimulateConfig::default()
        };
        let err = run(&config, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("fade-up"));
    }
}
