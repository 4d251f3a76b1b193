//! Tuning knobs for the rain, the background music and the card text.
//!
//! Defaults reproduce the shipped experience; a JSON override can be supplied
//! from JS through `start_card_with_config` (feature `serde_json`).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

pub const DEFAULT_AUDIO_SRC: &str = "/music/background.mp3";

/// Upper bound on particles added by one heart tap.
pub const MAX_BURST: usize = 1000;

pub const DEFAULT_MESSAGE: &str = "When you feel sad, remember that\n\
you are a very kind and beautiful\n\
person with a pure heart, and be\n\
sure that we all love you and\n\
always wish you well. Finally,\n\
be happy❤️🫰.";

/// Half-open speed range `[min, max)` in percent of container height per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, name: &str) -> Result<()> {
        if !(self.min > 0.0) || !self.max.is_finite() || self.max < self.min {
            return Err(CardError::InvalidConfig(format!(
                "{name}: expected 0 < min <= max, got [{}, {})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RainConfig {
    pub spawn_period_ms: u32,
    pub advance_period_ms: u32,
    /// Starting `y` of every new particle (above the frame).
    pub spawn_y: f64,
    /// Particles with `y` at or past this are culled.
    pub cull_y: f64,
    /// Degrees added to rotation each tick.
    pub rotation_step: f64,
    pub ambient_speed: SpeedRange,
    pub burst_speed: SpeedRange,
    pub burst_count: usize,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            spawn_period_ms: 400,
            advance_period_ms: 50,
            spawn_y: -10.0,
            cull_y: 110.0,
            rotation_step: 4.0,
            ambient_speed: SpeedRange::new(1.5, 3.5),
            burst_speed: SpeedRange::new(2.0, 5.0),
            burst_count: 15,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AudioConfig {
    pub src: String,
    pub volume: f64,
    pub looping: bool,
    pub cross_origin: String,
    pub preload: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            src: DEFAULT_AUDIO_SRC.to_string(),
            volume: 0.6,
            looping: true,
            cross_origin: "anonymous".to_string(),
            preload: "auto".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CardConfig {
    pub rain: RainConfig,
    pub audio: AudioConfig,
    pub message: String,
    pub log_level: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            rain: RainConfig::default(),
            audio: AudioConfig::default(),
            message: DEFAULT_MESSAGE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl CardConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults and validate it.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: CardConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let rain = &self.rain;
        if rain.spawn_period_ms == 0 || rain.advance_period_ms == 0 {
            return Err(CardError::InvalidConfig(
                "schedule periods must be non-zero".into(),
            ));
        }
        if rain.burst_count == 0 || rain.burst_count > MAX_BURST {
            return Err(CardError::InvalidConfig(format!(
                "burst_count {} outside 1..={MAX_BURST}",
                rain.burst_count
            )));
        }
        rain.ambient_speed.check("ambient_speed")?;
        rain.burst_speed.check("burst_speed")?;
        if !(rain.cull_y > rain.spawn_y) {
            return Err(CardError::InvalidConfig(format!(
                "cull_y ({}) must lie below spawn_y ({})",
                rain.cull_y, rain.spawn_y
            )));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(CardError::InvalidConfig(format!(
                "volume {} outside [0, 1]",
                self.audio.volume
            )));
        }
        if self.audio.src.trim().is_empty() {
            return Err(CardError::InvalidConfig("audio src is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = CardConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.rain.spawn_period_ms, 400);
        assert_eq!(cfg.rain.advance_period_ms, 50);
        assert_eq!(cfg.rain.burst_count, 15);
        assert!((cfg.audio.volume - 0.6).abs() < 1e-9);
        assert!(cfg.audio.looping);
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let mut cfg = CardConfig::default();
        cfg.rain.burst_speed = SpeedRange::new(5.0, 2.0);
        assert!(matches!(cfg.validate(), Err(CardError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_period_and_loud_volume() {
        let mut cfg = CardConfig::default();
        cfg.rain.advance_period_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = CardConfig::default();
        cfg.audio.volume = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn burst_count_is_bounded() {
        let mut cfg = CardConfig::default();
        cfg.rain.burst_count = 0;
        assert!(matches!(cfg.validate(), Err(CardError::InvalidConfig(_))));
        cfg.rain.burst_count = MAX_BURST;
        assert!(cfg.validate().is_ok());
        cfg.rain.burst_count = MAX_BURST + 1;
        assert!(matches!(cfg.validate(), Err(CardError::InvalidConfig(_))));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn huge_burst_count_in_json_is_rejected() {
        // out of range on 64-bit, unparsable on 32-bit; never accepted
        assert!(CardConfig::from_json(r#"{ "rain": { "burst_count": 18446744073709551615 } }"#).is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CardConfig::from_json(r#"{ "rain": { "burst_count": 30 }, "log_level": "debug" }"#)
            .expect("partial override parses");
        assert_eq!(cfg.rain.burst_count, 30);
        assert_eq!(cfg.rain.spawn_period_ms, 400);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.audio.src, DEFAULT_AUDIO_SRC);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            CardConfig::from_json("{ rain: "),
            Err(CardError::ConfigParse(_))
        ));
    }
}
