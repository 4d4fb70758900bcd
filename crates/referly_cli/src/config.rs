//! Referly configuration file handling

use anyhow::{Context, Result};
use referly_functions::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "referly.toml";

/// Top-level configuration (referly.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReferlyConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub simulate: SimulateConfig,
}

/// Synthetic page used by `referly simulate`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimulateConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Frames per second of the simulated clock
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    #[serde(default = "default_scroll_to")]
    pub scroll_to: f32,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// Document-space top of the animated element
    #[serde(default = "default_element_top")]
    pub element_top: f32,
    #[serde(default = "default_element_height")]
    pub element_height: f32,
    #[serde(default = "default_document_height")]
    pub document_height: f32,
    /// Simulate `prefers-reduced-motion: reduce`
    #[serde(default)]
    pub reduced_motion: bool,
}

fn default_preset() -> String {
    "fade-up".to_string()
}

fn default_frames() -> u32 {
    120
}

fn default_frame_rate() -> f32 {
    60.0
}

fn default_scroll_to() -> f32 {
    800.0
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

fn default_element_top() -> f32 {
    1000.0
}

fn default_element_height() -> f32 {
    400.0
}

fn default_document_height() -> f32 {
    4800.0
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            frames: default_frames(),
            frame_rate: default_frame_rate(),
            scroll_to: default_scroll_to(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            element_top: default_element_top(),
            element_height: default_element_height(),
            document_height: default_document_height(),
            reduced_motion: false,
        }
    }
}

impl ReferlyConfig {
    /// Load configuration, then apply `AI_GATEWAY_*` environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `./referly.toml` is used if
    /// present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::load_file(Path::new(CONFIG_FILE))?,
            None => {
                tracing::debug!("no {CONFIG_FILE}, using defaults");
                Self::default()
            }
        };
        Ok(config.with_env())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_env(mut self) -> Self {
        self.gateway = self.gateway.with_env();
        self
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ReferlyConfig::parse("").unwrap();
        assert_eq!(config.gateway, GatewayConfig::default());
        assert_eq!(config.simulate, SimulateConfig::default());
    }

    #[test]
    fn partial_sections() {
        let config = ReferlyConfig::parse(
            r#"
            [gateway]
            model = "openai/gpt-5-mini"
            timeout_secs = 15

            [simulate]
            preset = "parallax"
            frames = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.model, "openai/gpt-5-mini");
        assert_eq!(config.gateway.timeout_secs, 15);
        assert_eq!(config.gateway.base_url, GatewayConfig::default().base_url);
        assert_eq!(config.simulate.preset, "parallax");
        assert_eq!(config.simulate.frames, 30);
        assert_eq!(config.simulate.viewport_width, 1280.0);
    }

    #[test]
    fn api_key_is_never_printed() {
        let mut config = ReferlyConfig::default();
        config.gateway.api_key = Some("secret".into());
        let text = config.to_toml().unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("[simulate]"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(ReferlyConfig::load(Some(Path::new("/nonexistent/referly.toml"))).is_err());
    }
}
