//! Scene duration: fixed pixels, a share of the viewport, or a callback.

use std::fmt;
use std::rc::Rc;

use crate::dom::parse_float;
use crate::error::ConfigError;

#[derive(Clone)]
pub enum Duration {
    /// Pixels of scroll distance.
    Fixed(f64),
    /// Fraction of the controller's viewport size (`"50%"` is `0.5`).
    Percentage(f64),
    /// Re-evaluated on every refresh cycle.
    Dynamic(Rc<dyn Fn() -> f64>),
}

impl Duration {
    pub fn fixed(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Duration::Fixed(value))
        } else {
            Err(ConfigError::InvalidDuration {
                value: value.to_string(),
            })
        }
    }

    pub fn dynamic(f: impl Fn() -> f64 + 'static) -> Self {
        Duration::Dynamic(Rc::new(f))
    }

    /// `"NN%"` becomes a viewport share; anything else is read as a number
    /// of pixels.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if let Some(fraction) = parse_percentage(text) {
            return Ok(Duration::Percentage(fraction));
        }
        match parse_float(text) {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(Duration::Fixed(v)),
            _ => Err(ConfigError::InvalidDuration {
                value: text.to_string(),
            }),
        }
    }

    /// True when the resolved value may change between refresh cycles.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Duration::Fixed(_))
    }

    /// Pixel value. `viewport_size` is `None` while the scene is not attached
    /// to a controller, in which case percentages resolve to 0.
    pub fn resolve(&self, viewport_size: Option<f64>) -> Result<f64, ConfigError> {
        let value = match self {
            Duration::Fixed(v) => return Ok(*v),
            Duration::Percentage(fraction) => viewport_size.map_or(0.0, |size| size * fraction),
            Duration::Dynamic(f) => f(),
        };
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::InvalidDurationFn {
                value: value.to_string(),
            })
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::Fixed(0.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Duration::Percentage(p) => f.debug_tuple("Percentage").field(p).finish(),
            Duration::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Duration::Fixed(a), Duration::Fixed(b)) => a == b,
            (Duration::Percentage(a), Duration::Percentage(b)) => a == b,
            (Duration::Dynamic(a), Duration::Dynamic(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Matches `^(\.|\d)*\d+%$`.
fn parse_percentage(text: &str) -> Option<f64> {
    let body = text.strip_suffix('%')?;
    let last = body.chars().last()?;
    if !last.is_ascii_digit() || !body.chars().all(|c| c == '.' || c.is_ascii_digit()) {
        return None;
    }
    parse_float(body).map(|v| v / 100.0)
}
