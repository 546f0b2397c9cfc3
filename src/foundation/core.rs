use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Normalized scroll progress in `[0, 1]`.
///
/// Construction always clamps; NaN collapses to `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    /// Start of the scroll range.
    pub const ZERO: Self = Self(0.0);
    /// End of the scroll range.
    pub const ONE: Self = Self(1.0);

    /// Clamp `value` into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Raw scalar value.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for Progress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// Logical viewport dimensions plus device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Logical width in CSS-like pixels.
    pub width: f64,
    /// Logical height in CSS-like pixels.
    pub height: f64,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Build a viewport, rejecting non-finite or negative sizes.
    ///
    /// A missing or nonsensical pixel ratio (`<= 0`, NaN) falls back to `1`.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> ReelResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(ReelError::validation(format!(
                "viewport size must be finite and non-negative, got {width}x{height}"
            )));
        }
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    /// Physical drawing-surface size: `logical * dpr`, truncated like a canvas backing store.
    pub fn physical_size(self) -> (u32, u32) {
        let w = (self.width * self.device_pixel_ratio).floor().max(0.0);
        let h = (self.height * self.device_pixel_ratio).floor().max(0.0);
        (w as u32, h as u32)
    }

    /// Whether either logical dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> ReelResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> ReelResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ReelError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(ReelError::validation("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::opaque(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(ReelError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
