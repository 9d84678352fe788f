use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MorphConfig {
    pub version: u32,
    #[serde(default)]
    pub images: Vec<PathBuf>,
    #[serde(default)]
    pub transition: TransitionSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub camera: CameraSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionSection {
    #[serde(
        default = "default_transition_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    #[serde(default)]
    pub curve: CurveSetting,
    /// Fraction of the transition by which the last slot starts after the first.
    #[serde(default = "default_stagger")]
    pub stagger: f32,
    /// Depth of the arc points travel along, relative to their path length.
    #[serde(default = "default_arc_height")]
    pub arc_height: f32,
}

impl Default for TransitionSection {
    fn default() -> Self {
        Self {
            duration: default_transition_duration(),
            curve: CurveSetting::default(),
            stagger: default_stagger(),
            arc_height: default_arc_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(default = "default_point_size")]
    pub point_size: f32,
    #[serde(
        default = "default_background",
        deserialize_with = "deserialize_background"
    )]
    pub background: [f32; 3],
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub grid_size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_window_size_opt")]
    pub window_size: Option<(u32, u32)>,
    #[serde(default)]
    pub color_space: ColorSpaceSetting,
    #[serde(default = "default_true")]
    pub thumbnails: bool,
    /// Adapter preference handed to wgpu when picking a GPU.
    #[serde(default)]
    pub gpu_power: GpuPowerSetting,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            point_size: default_point_size(),
            background: default_background(),
            antialias: None,
            fps: None,
            grid_size: None,
            window_size: None,
            color_space: ColorSpaceSetting::default(),
            thumbnails: true,
            gpu_power: GpuPowerSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraSection {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_distance")]
    pub distance: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            distance: default_distance(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveSetting {
    Linear,
    Smoothstep,
    EaseInOut,
    #[default]
    EaseOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuPowerSetting {
    Low,
    #[default]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

fn default_transition_duration() -> Duration {
    Duration::from_secs(4)
}

fn default_stagger() -> f32 {
    0.5
}

fn default_arc_height() -> f32 {
    0.2
}

fn default_point_size() -> f32 {
    1.0
}

fn default_background() -> [f32; 3] {
    // #2a251f
    [42.0 / 255.0, 37.0 / 255.0, 31.0 / 255.0]
}

fn default_fov() -> f32 {
    70.0
}

fn default_distance() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_else(default_transition_duration))
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
            parse_duration(v).map(Some).map_err(E::custom)
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
            if !v.is_finite() || v.is_sign_negative() {
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

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

fn deserialize_background<'de, D>(deserializer: D) -> Result<[f32; 3], D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hex_color(&raw).map_err(de::Error::custom)
}

fn deserialize_window_size_opt<'de, D>(deserializer: D) -> Result<Option<(u32, u32)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_window_size(&value).map_err(de::Error::custom))
        .transpose()
}

/// Parses a duration given either as seconds (`2.5`) or in humantime form (`1500ms`).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds.is_sign_negative() {
            return Err(format!("invalid duration '{raw}': must be non-negative"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{raw}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

/// Parses a GPU power preference: `low`/`integrated` or `high`/`discrete`.
pub fn parse_gpu_power(raw: &str) -> Result<GpuPowerSetting, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(GpuPowerSetting::Low),
        "high" | "high-performance" | "discrete" => Ok(GpuPowerSetting::High),
        other => Err(format!("unknown gpu power preference '{other}'; expected low or high")),
    }
}

/// Parses an antialiasing mode such as `auto`, `off` or a sample count.
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

/// Parses `#rrggbb` (leading `#` optional) into `[0, 1]` components.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid colour '{raw}'; expected #rrggbb"));
    }

    let mut rgb = [0.0; 3];
    for (channel, value) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[channel * 2..channel * 2 + 2], 16)
            .map_err(|err| format!("invalid colour '{raw}': {err}"))?;
        *value = f32::from(byte) / 255.0;
    }
    Ok(rgb)
}

/// Parses `WIDTHxHEIGHT`, also accepting `X` and `×` as separators.
pub fn parse_window_size(raw: &str) -> Result<(u32, u32), String> {
    let normalized = raw.trim().replace(['X', '×'], "x");
    let (width, height) = normalized
        .split_once('x')
        .ok_or_else(|| format!("invalid size '{raw}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{raw}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{raw}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{raw}' must be non-zero"));
    }
    Ok((width, height))
}

impl MorphConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: MorphConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads a config file; relative image paths are resolved against its directory.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for image in &mut self.images {
            if image.is_relative() {
                *image = base.join(&*image);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.images.iter().any(|path| path.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid(
                "images may not contain an empty path".into(),
            ));
        }

        let transition = &self.transition;
        if !(0.0..=1.0).contains(&transition.stagger) {
            return Err(ConfigError::Invalid(format!(
                "transition.stagger must be within [0, 1]; got {}",
                transition.stagger
            )));
        }
        if !transition.arc_height.is_finite() || transition.arc_height < 0.0 {
            return Err(ConfigError::Invalid(
                "transition.arc_height must be >= 0".into(),
            ));
        }

        let render = &self.render;
        if !render.point_size.is_finite() || render.point_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "render.point_size must be greater than zero".into(),
            ));
        }
        if let Some(fps) = render.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("render.fps must be >= 0".into()));
            }
        }
        if render.grid_size == Some(0) {
            return Err(ConfigError::Invalid(
                "render.grid_size must be greater than zero".into(),
            ));
        }

        if !(1.0..180.0).contains(&self.camera.fov) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be within [1, 180) degrees; got {}",
                self.camera.fov
            )));
        }
        if !self.camera.distance.is_finite() || self.camera.distance <= 0.0 {
            return Err(ConfigError::Invalid(
                "camera.distance must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            version: 1,
            images: Vec::new(),
            transition: TransitionSection::default(),
            render: RenderSection::default(),
            camera: CameraSection::default(),
        }
    }
}
