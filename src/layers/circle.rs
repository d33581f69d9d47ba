use crate::{Error, Result};
use serde::{Serialize, Serializer};

/// RGBA color parsed from a CSS hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`
    pub fn parse(hex: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 | 8 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
                a: if digits.len() == 8 {
                    channel(&digits[6..8])?
                } else {
                    255
                },
            }),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "egui")]
impl From<Color> for egui::Color32 {
    fn from(color: Color) -> Self {
        egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties of a circle layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CirclePaint {
    #[serde(rename = "circle-radius")]
    pub radius: f64,
    #[serde(rename = "circle-color")]
    pub color: Color,
}

/// Draws a circle at every point of its source's features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleLayer {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    kind: &'static str,
    pub paint: CirclePaint,
}

impl CircleLayer {
    pub fn new(id: impl Into<String>, source: impl Into<String>, paint: CirclePaint) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: "circle",
            paint,
        }
    }

    /// Layer definition in the rendering engine's JSON form
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "source": self.source,
            "type": self.kind,
            "paint": self.paint,
        })
    }
}
