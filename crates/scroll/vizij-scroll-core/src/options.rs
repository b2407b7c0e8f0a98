//! Scene and controller configuration.
//!
//! [`SceneOptions`] is the validated, typed form consumed by
//! [`Scene::new`](crate::Scene::new). [`SceneDescriptor`] and
//! [`ControllerOptions`] are the loose JSON shapes hosts hand over; they
//! accept string booleans and numeric strings, and are converted to typed
//! values here so the scene never sees them.

use serde::{Deserialize, Serialize};

use crate::dom::{parse_float, ElementTarget};
use crate::duration::Duration;
use crate::error::ConfigError;
use crate::indicators::IndicatorOptions;
use crate::log_level::LogLevel;
use crate::pin::PinSettings;

/// Trigger hook as supplied: a fraction or one of the named positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookValue {
    Number(f64),
    Name(String),
}

impl Default for HookValue {
    fn default() -> Self {
        HookValue::Name("onCenter".to_string())
    }
}

impl From<f64> for HookValue {
    fn from(v: f64) -> Self {
        HookValue::Number(v)
    }
}

impl From<&str> for HookValue {
    fn from(v: &str) -> Self {
        HookValue::Name(v.to_string())
    }
}

/// Numbers are clamped to `[0, 1]`; `onEnter` is 1, `onCenter` 0.5 and
/// `onLeave` 0.
pub fn resolve_trigger_hook(value: &HookValue) -> Result<f64, ConfigError> {
    match value {
        HookValue::Number(v) if !v.is_nan() => Ok(v.clamp(0.0, 1.0)),
        HookValue::Number(v) => Err(ConfigError::InvalidTriggerHook {
            value: v.to_string(),
        }),
        HookValue::Name(name) => match name.as_str() {
            "onEnter" => Ok(1.0),
            "onCenter" => Ok(0.5),
            "onLeave" => Ok(0.0),
            other => Err(ConfigError::InvalidTriggerHook {
                value: other.to_string(),
            }),
        },
    }
}

/// Validated scene construction options.
#[derive(Debug, Clone)]
pub struct SceneOptions<N> {
    pub name: Option<String>,
    pub duration: Duration,
    pub offset: f64,
    pub trigger_element: Option<ElementTarget<N>>,
    pub trigger_hook: HookValue,
    pub reverse: bool,
    pub tween_changes: bool,
    pub log_level: LogLevel,
    pub enabled: bool,
}

impl<N> Default for SceneOptions<N> {
    fn default() -> Self {
        Self {
            name: None,
            duration: Duration::Fixed(0.0),
            offset: 0.0,
            trigger_element: None,
            trigger_hook: HookValue::default(),
            reverse: true,
            tween_changes: false,
            log_level: LogLevel::Warn,
            enabled: true,
        }
    }
}

impl<N> SceneOptions<N> {
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn trigger_element(mut self, target: impl Into<ElementTarget<N>>) -> Self {
        self.trigger_element = Some(target.into());
        self
    }

    pub fn trigger_hook(mut self, hook: impl Into<HookValue>) -> Self {
        self.trigger_hook = hook.into();
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn tween_changes(mut self, tween_changes: bool) -> Self {
        self.tween_changes = tween_changes;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ---------- descriptor values ----------

/// Boolean that also accepts `"true"` / `"false"` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Text(String),
}

impl BoolLike {
    /// `"false"` and the empty string are false; other strings are true.
    pub fn to_bool(&self) -> bool {
        match self {
            BoolLike::Bool(b) => *b,
            BoolLike::Text(t) => !matches!(t.trim(), "false" | ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Offset semantics: numeric strings are parsed, anything else rejected.
    pub fn to_offset(&self) -> Result<f64, ConfigError> {
        let value = match self {
            NumberOrText::Number(v) => Some(*v),
            NumberOrText::Text(t) => parse_float(t),
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ConfigError::InvalidOffset {
                value: match self {
                    NumberOrText::Number(v) => v.to_string(),
                    NumberOrText::Text(t) => t.clone(),
                },
            }),
        }
    }
}

/// Duration as it appears in JSON: pixels or a `"NN%"` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Number(f64),
    Text(String),
}

impl DurationValue {
    pub fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Number(v) => Duration::fixed(*v),
            DurationValue::Text(t) => Duration::parse(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDescriptor {
    pub element: String,
    #[serde(default)]
    pub push_followers: Option<BoolLike>,
    #[serde(default)]
    pub spacer_class: Option<String>,
}

impl PinDescriptor {
    pub fn settings(&self) -> PinSettings {
        let mut settings = PinSettings::default();
        if let Some(push) = &self.push_followers {
            settings.push_followers = Some(push.to_bool());
        }
        if let Some(class) = &self.spacer_class {
            settings.spacer_class = class.clone();
        }
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassToggleDescriptor {
    pub element: String,
    pub classes: String,
}

/// JSON scene description. Every field is optional; absent fields keep the
/// scene defaults (or, for global options, the scene's current value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDescriptor {
    pub name: Option<String>,
    pub duration: Option<DurationValue>,
    pub offset: Option<NumberOrText>,
    pub trigger_element: Option<String>,
    pub trigger_hook: Option<HookValue>,
    pub reverse: Option<BoolLike>,
    pub tween_changes: Option<BoolLike>,
    #[serde(alias = "loglevel")]
    pub log_level: Option<i64>,
    pub enabled: Option<BoolLike>,
    pub pin: Option<PinDescriptor>,
    pub class_toggle: Option<ClassToggleDescriptor>,
    pub indicators: Option<IndicatorOptions>,
}

impl SceneDescriptor {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Typed options, validating every present field.
    pub fn to_options<N>(&self) -> Result<SceneOptions<N>, ConfigError> {
        let mut options = SceneOptions::default();
        options.name = self.name.clone();
        if let Some(duration) = &self.duration {
            options.duration = duration.to_duration()?;
        }
        if let Some(offset) = &self.offset {
            options.offset = offset.to_offset()?;
        }
        if let Some(selector) = &self.trigger_element {
            options.trigger_element = Some(ElementTarget::Selector(selector.clone()));
        }
        if let Some(hook) = &self.trigger_hook {
            resolve_trigger_hook(hook)?;
            options.trigger_hook = hook.clone();
        }
        if let Some(reverse) = &self.reverse {
            options.reverse = reverse.to_bool();
        }
        if let Some(tween_changes) = &self.tween_changes {
            options.tween_changes = tween_changes.to_bool();
        }
        if let Some(level) = self.log_level {
            options.log_level = LogLevel::try_from(level)?;
        }
        if let Some(enabled) = &self.enabled {
            options.enabled = enabled.to_bool();
        }
        Ok(options)
    }
}

fn default_vertical() -> bool {
    true
}

fn default_refresh_interval() -> f64 {
    100.0
}

/// Controller construction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerOptions {
    /// Selector of the scroll container; `None` is the window.
    pub container: Option<String>,
    #[serde(default = "default_vertical")]
    pub vertical: bool,
    /// Milliseconds between refresh cycles; 0 disables them.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: f64,
    #[serde(alias = "loglevel")]
    pub log_level: LogLevel,
    pub smooth_scrolling: bool,
    pub add_indicators: bool,
    pub global_scene_options: Option<SceneDescriptor>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            container: None,
            vertical: default_vertical(),
            refresh_interval: default_refresh_interval(),
            log_level: LogLevel::Warn,
            smooth_scrolling: false,
            add_indicators: false,
            global_scene_options: None,
        }
    }
}

impl ControllerOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn validated_refresh_interval(&self) -> Result<f64, ConfigError> {
        if self.refresh_interval.is_finite() && self.refresh_interval >= 0.0 {
            Ok(self.refresh_interval)
        } else {
            Err(ConfigError::InvalidRefreshInterval {
                value: self.refresh_interval.to_string(),
            })
        }
    }
}
