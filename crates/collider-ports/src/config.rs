use crate::types::{BusLayout, AUDIO_BUS_LEN};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_sample_rate() -> u32 {
    44_100
}

fn default_channels() -> usize {
    2
}

fn default_strm_length() -> usize {
    1024
}

fn default_buf_length() -> usize {
    64
}

fn default_timer_period_ms() -> u64 {
    10
}

fn default_instance_gain() -> f32 {
    0.8
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Frames per outbound stream buffer.
    #[serde(default = "default_strm_length")]
    pub strm_length: usize,
    /// Frames per synthesis buffer.
    #[serde(default = "default_buf_length")]
    pub buf_length: usize,
    #[serde(default = "default_timer_period_ms")]
    pub timer_period_ms: u64,
    #[serde(default = "default_instance_gain")]
    pub instance_gain: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            strm_length: default_strm_length(),
            buf_length: default_buf_length(),
            timer_period_ms: default_timer_period_ms(),
            instance_gain: default_instance_gain(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".into()));
        }
        if self.channels == 0 || self.channels > AUDIO_BUS_LEN {
            return Err(ConfigError::Invalid(format!(
                "channels must be in 1..={AUDIO_BUS_LEN}, got {}",
                self.channels
            )));
        }
        if self.buf_length == 0 {
            return Err(ConfigError::Invalid("buf_length must be positive".into()));
        }
        if self.strm_length == 0 || self.strm_length % self.buf_length != 0 {
            return Err(ConfigError::Invalid(format!(
                "strm_length {} is not a multiple of buf_length {}",
                self.strm_length, self.buf_length
            )));
        }
        if self.timer_period_ms == 0 {
            return Err(ConfigError::Invalid("timer_period_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn timer_period(&self) -> Duration {
        Duration::from_millis(self.timer_period_ms)
    }

    pub fn bus_layout(&self) -> BusLayout {
        BusLayout::new(self.buf_length, self.channels)
    }
}
