//! Ambient configuration (§10.3): a small TOML file under the platform
//! config directory, mirroring `sonido_config::paths`/`Preset::load` rather
//! than inventing a format. Every field defaults, so a missing file is not
//! an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "signet";
const CONFIG_FILE: &str = "config.toml";

/// User-facing defaults that the per-invocation flags fall back to when not
/// given explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignetConfig {
    /// Pitch-drift corrector chunk size in milliseconds (§4.6), 20..=200.
    #[serde(default = "default_chunk_ms")]
    pub chunk_ms: u32,

    /// Bit depth used when a `convert`/commit write doesn't specify one.
    #[serde(default = "default_output_bits")]
    pub default_output_bits: u16,

    /// Whether `signet-cli` draws an `indicatif` progress bar.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_chunk_ms() -> u32 {
    60
}

fn default_output_bits() -> u16 {
    16
}

fn default_true() -> bool {
    true
}

impl Default for SignetConfig {
    fn default() -> Self {
        Self {
            chunk_ms: default_chunk_ms(),
            default_output_bits: default_output_bits(),
            show_progress: default_true(),
        }
    }
}

/// `~/.config/signet/` on Linux, the platform equivalent elsewhere.
pub fn config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

impl SignetConfig {
    /// Load from the platform config path. A missing file yields defaults,
    /// not an error; a present-but-unparsable file is.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_pitch_corrector_contract() {
        let config = SignetConfig::default();
        assert_eq!(config.chunk_ms, 60);
        assert!(config.show_progress);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = SignetConfig { chunk_ms: 40, default_output_bits: 24, show_progress: false };
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: SignetConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: SignetConfig = toml::from_str("chunk_ms = 30").unwrap();
        assert_eq!(parsed.chunk_ms, 30);
        assert_eq!(parsed.default_output_bits, 16);
        assert!(parsed.show_progress);
    }
}
