#![forbid(unsafe_code)]

//! Scalar-to-color mapping.
//!
//! A value in the conventional parameter range `[-1, 1]` is mapped to
//! interpolation progress `[0, 1]` and then linearly blended between the
//! scheme's negative and positive endpoint colors, per channel.
//!
//! Progress outside `[0, 1]` is not rejected: the blend extrapolates and each
//! channel is then clamped into `0..=255`, so a weight of magnitude above one
//! still yields a valid, saturated color.
//!
//! ```
//! use nnviz_core::color::{ColorScheme, Rgb, interpolate};
//!
//! let red = Rgb::new(255, 0, 0);
//! let blue = Rgb::new(0, 0, 255);
//! assert_eq!(interpolate(red, blue, 0.5).to_hex(), "#7f007f");
//! assert_eq!(ColorScheme::default().color_for(-1.0), red);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// An opaque 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Fill used for input-layer nodes, which carry no value.
    pub const NEUTRAL: Self = Self::new(0xaa, 0xaa, 0xaa);
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase and zero-padded.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Build a color from three unvalidated channel inputs (red, green, blue).
    ///
    /// Values are checked, never clamped: anything outside `0..=255`, any
    /// float (even `12.0`), and any non-numeric text is rejected.
    pub fn try_from_channels(channels: &[ChannelInput; 3]) -> Result<Self, ConfigurationError> {
        let [r, g, b] = channels;
        Ok(Self::new(
            r.resolve("red")?,
            g.resolve("green")?,
            b.resolve("blue")?,
        ))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One color channel as it arrives from a config file or a text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ChannelInput {
    /// Validate into a channel byte. `channel` names the channel in errors.
    pub fn resolve(&self, channel: &'static str) -> Result<u8, ConfigurationError> {
        match self {
            Self::Integer(value) => in_range(channel, *value),
            // Channels are integer literals; `12.0` is as invalid as `12.5`.
            Self::Float(value) => Err(ConfigurationError::NonIntegerChannel {
                channel,
                value: *value,
            }),
            Self::Text(text) => parse_channel(channel, text),
        }
    }
}

impl From<u8> for ChannelInput {
    fn from(value: u8) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for ChannelInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Parse an integer channel literal such as the contents of a text field.
///
/// Surrounding whitespace (including a trailing newline) is ignored.
pub fn parse_channel(channel: &'static str, text: &str) -> Result<u8, ConfigurationError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return in_range(channel, value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            Err(ConfigurationError::NonIntegerChannel { channel, value })
        }
        _ => Err(ConfigurationError::NonNumericChannel {
            channel,
            input: text.to_owned(),
        }),
    }
}

fn in_range(channel: &'static str, value: i64) -> Result<u8, ConfigurationError> {
    u8::try_from(value).map_err(|_| ConfigurationError::ChannelOutOfRange {
        channel,
        value: value as f64,
    })
}

/// The two endpoint colors values are blended between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub negative: Rgb,
    pub positive: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            negative: Rgb::RED,
            positive: Rgb::BLUE,
        }
    }
}

impl ColorScheme {
    pub const fn new(negative: Rgb, positive: Rgb) -> Self {
        Self { negative, positive }
    }

    /// Validate six raw channels into a scheme.
    pub fn try_from_channels(
        negative: &[ChannelInput; 3],
        positive: &[ChannelInput; 3],
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            negative: Rgb::try_from_channels(negative)?,
            positive: Rgb::try_from_channels(positive)?,
        })
    }

    /// Color for a weight or bias value.
    #[inline]
    pub fn color_for(&self, value: f64) -> Rgb {
        interpolate(self.negative, self.positive, magnitude_to_progress(value))
    }
}

/// `a * (1 - t) + b * t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `max(lo, min(n, hi))`, truncated to an integer.
#[inline]
pub fn clamp(n: f64, lo: f64, hi: f64) -> i64 {
    n.min(hi).max(lo) as i64
}

/// [`clamp`] into a channel byte.
#[inline]
pub fn clamp_channel(n: f64) -> u8 {
    clamp(n, 0.0, 255.0) as u8
}

/// Per-channel [`lerp`] followed by [`clamp_channel`].
pub fn interpolate(negative: Rgb, positive: Rgb, progress: f64) -> Rgb {
    let channel = |a: u8, b: u8| clamp_channel(lerp(f64::from(a), f64::from(b), progress));
    Rgb::new(
        channel(negative.r, positive.r),
        channel(negative.g, positive.g),
        channel(negative.b, positive.b),
    )
}

/// Map a value from `[-1, 1]` onto progress `[0, 1]`. Extrapolates outside.
#[inline]
pub fn magnitude_to_progress(value: f64) -> f64 {
    (value + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(0, 10, 255).to_hex(), "#000aff");
        assert_eq!(Rgb::NEUTRAL.to_string(), "#aaaaaa");
    }

    #[test]
    fn endpoints_reproduce_scheme_colors() {
        let neg = Rgb::new(255, 12, 0);
        let pos = Rgb::new(0, 255, 255);
        assert_eq!(interpolate(neg, pos, 0.0), neg);
        assert_eq!(interpolate(neg, pos, 1.0), pos);
    }

    #[test]
    fn midpoint_truncates() {
        let c = interpolate(Rgb::RED, Rgb::BLUE, 0.75);
        assert_eq!(c, Rgb::new(63, 0, 191));
        let c = interpolate(Rgb::RED, Rgb::BLUE, 0.25);
        assert_eq!(c, Rgb::new(191, 0, 63));
    }

    #[test]
    fn extrapolation_saturates() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.color_for(5.0), Rgb::BLUE);
        assert_eq!(scheme.color_for(-7.5), Rgb::RED);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-3.2, 0.0, 255.0), 0);
        assert_eq!(clamp(254.9, 0.0, 255.0), 254);
        assert_eq!(clamp(1e9, 0.0, 255.0), 255);
    }

    #[test]
    fn progress_mapping() {
        assert_eq!(magnitude_to_progress(-1.0), 0.0);
        assert_eq!(magnitude_to_progress(0.0), 0.5);
        assert_eq!(magnitude_to_progress(1.0), 1.0);
        assert_eq!(magnitude_to_progress(3.0), 2.0);
    }

    #[test]
    fn channel_text_is_trimmed() {
        assert_eq!(parse_channel("red", " 255\n"), Ok(255));
        assert_eq!(parse_channel("red", "0"), Ok(0));
    }

    #[test]
    fn channel_text_rejects_bad_input() {
        assert_eq!(
            parse_channel("green", "256"),
            Err(ConfigurationError::ChannelOutOfRange {
                channel: "green",
                value: 256.0
            })
        );
        assert_eq!(
            parse_channel("green", "-1"),
            Err(ConfigurationError::ChannelOutOfRange {
                channel: "green",
                value: -1.0
            })
        );
        assert_eq!(
            parse_channel("blue", "12.5"),
            Err(ConfigurationError::NonIntegerChannel {
                channel: "blue",
                value: 12.5
            })
        );
        assert!(matches!(
            parse_channel("blue", "teal"),
            Err(ConfigurationError::NonNumericChannel { channel: "blue", .. })
        ));
    }

    #[test]
    fn float_channels_are_rejected() {
        assert_eq!(
            ChannelInput::Float(12.0).resolve("red"),
            Err(ConfigurationError::NonIntegerChannel {
                channel: "red",
                value: 12.0
            })
        );
        assert_eq!(
            ChannelInput::Float(12.0).resolve("red"),
            parse_channel("red", "12.0")
        );
        assert!(ChannelInput::Float(0.5).resolve("red").is_err());
        assert!(ChannelInput::Float(f64::NAN).resolve("red").is_err());
        assert!(ChannelInput::Float(300.0).resolve("red").is_err());
    }

    #[test]
    fn non_finite_text_is_not_numeric() {
        for text in ["nan", "inf", "-inf", "NaN"] {
            assert!(
                matches!(
                    parse_channel("red", text),
                    Err(ConfigurationError::NonNumericChannel { channel: "red", .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn scheme_from_channels_validates_every_channel() {
        let neg = [ChannelInput::from(10), "20".into(), ChannelInput::Integer(30)];
        let pos = [ChannelInput::from(1), ChannelInput::from(2), ChannelInput::Integer(999)];
        assert!(ColorScheme::try_from_channels(&neg, &pos).is_err());

        let pos = [ChannelInput::from(1), ChannelInput::from(2), ChannelInput::from(3)];
        let scheme = ColorScheme::try_from_channels(&neg, &pos).unwrap();
        assert_eq!(scheme.negative, Rgb::new(10, 20, 30));
        assert_eq!(scheme.positive, Rgb::new(1, 2, 3));
    }

    #[test]
    fn untagged_channels_deserialize() {
        let parsed: Vec<ChannelInput> = serde_json::from_str(r#"[7, 1.5, "x"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                ChannelInput::Integer(7),
                ChannelInput::Float(1.5),
                ChannelInput::Text("x".into())
            ]
        );
    }
}
