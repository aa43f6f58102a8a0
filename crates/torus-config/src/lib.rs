use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use torus::{Curve, DEFAULT_FPS, ELAPSED_TIME_LIMIT_SECS, MAX_ELAPSED_TIME_LIMIT_SECS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TorusConfig {
    pub version: u32,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub demand: DemandSection,
    #[serde(default)]
    pub wallpaper: WallpaperSection,
}

/// Frame pacing settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderSection {
    /// Target frame rate; zero or negative selects on-demand rendering.
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Rate of the headless vsync source in Hz.
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: f32,
    #[serde(default = "default_elapsed_time_limit")]
    pub elapsed_time_limit: f32,
}

/// On-demand rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DemandSection {
    /// How often a background timer requests a frame, if at all.
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_interval: Option<Duration>,
}

/// Demo wallpaper settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WallpaperSection {
    #[serde(default = "default_extent")]
    pub width: u32,
    #[serde(default = "default_extent")]
    pub height: u32,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default = "default_period", deserialize_with = "deserialize_duration")]
    pub period: Duration,
    #[serde(default = "default_fade_in", deserialize_with = "deserialize_duration")]
    pub fade_in: Duration,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            version: 1,
            render: RenderSection::default(),
            demand: DemandSection::default(),
            wallpaper: WallpaperSection::default(),
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            refresh_rate: default_refresh_rate(),
            elapsed_time_limit: default_elapsed_time_limit(),
        }
    }
}

impl Default for WallpaperSection {
    fn default() -> Self {
        Self {
            width: default_extent(),
            height: default_extent(),
            curve: Curve::default(),
            period: default_period(),
            fade_in: default_fade_in(),
        }
    }
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

fn default_refresh_rate() -> f32 {
    60.0
}

fn default_elapsed_time_limit() -> f32 {
    ELAPSED_TIME_LIMIT_SECS
}

fn default_extent() -> u32 {
    64
}

fn default_period() -> Duration {
    Duration::from_secs(4)
}

fn default_fade_in() -> Duration {
    Duration::from_millis(500)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_default())
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl TorusConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: TorusConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// True when the configured rate selects on-demand rendering.
    pub fn on_demand(&self) -> bool {
        self.render.fps <= 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.render.fps.is_nan() {
            return Err(ConfigError::Invalid("render.fps must be a number".into()));
        }

        if !self.render.refresh_rate.is_finite() || self.render.refresh_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "render.refresh_rate must be > 0, got {}",
                self.render.refresh_rate
            )));
        }

        let limit = self.render.elapsed_time_limit;
        if limit.is_nan() || limit <= 0.0 || limit > MAX_ELAPSED_TIME_LIMIT_SECS {
            return Err(ConfigError::Invalid(format!(
                "render.elapsed_time_limit must be in (0, {MAX_ELAPSED_TIME_LIMIT_SECS}], got {limit}"
            )));
        }

        if let Some(interval) = self.demand.request_interval {
            if interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "demand.request_interval must be greater than zero".into(),
                ));
            }
        }

        if self.wallpaper.width == 0 || self.wallpaper.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "wallpaper size {}x{} must be non-zero",
                self.wallpaper.width, self.wallpaper.height
            )));
        }

        if self.wallpaper.period.is_zero() {
            return Err(ConfigError::Invalid(
                "wallpaper.period must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[render]
fps = 0
refresh_rate = 120
elapsed_time_limit = 3600

[demand]
request_interval = "250ms"

[wallpaper]
width = 32
height = 16
curve = "ease-in-out"
period = "2s"
fade_in = 1.5
"#;

    #[test]
    fn parses_sample_config() {
        let config = TorusConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert!(config.on_demand());
        assert_eq!(config.render.refresh_rate, 120.0);
        assert_eq!(config.render.elapsed_time_limit, 3600.0);
        assert_eq!(
            config.demand.request_interval,
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.wallpaper.curve, Curve::EaseInOut);
        assert_eq!(config.wallpaper.period, Duration::from_secs(2));
        assert_eq!(config.wallpaper.fade_in, Duration::from_millis(1500));
    }

    #[test]
    fn sections_default_when_missing() {
        let config = TorusConfig::from_toml_str("version = 1").expect("parse config");
        assert_eq!(config, TorusConfig::default());
        assert_eq!(config.render.fps, DEFAULT_FPS);
        assert!(!config.on_demand());
        assert_eq!(config.demand.request_interval, None);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = TorusConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_refresh_rate() {
        let err = TorusConfig::from_toml_str(
            r#"
version = 1
[render]
refresh_rate = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_request_interval() {
        let err = TorusConfig::from_toml_str(
            r#"
version = 1
[demand]
request_interval = "0s"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_wallpaper() {
        let err = TorusConfig::from_toml_str(
            r#"
version = 1
[wallpaper]
width = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_imprecise_elapsed_time_limit() {
        let err = TorusConfig::from_toml_str(
            r#"
version = 1
[render]
elapsed_time_limit = 500000
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unrepresentable_durations() {
        for field in ["period", "fade_in"] {
            for value in ["1e30", "inf"] {
                let err = TorusConfig::from_toml_str(&format!(
                    "version = 1\n[wallpaper]\n{field} = {value}\n"
                ))
                .unwrap_err();
                assert!(matches!(err, ConfigError::Parse(_)), "{field} = {value}");
            }
        }
    }

    #[test]
    fn rejects_bad_curve() {
        let err = TorusConfig::from_toml_str(
            r#"
version = 1
[wallpaper]
curve = "bounce"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
