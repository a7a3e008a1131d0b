//! RGB colors as they travel on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::ProtocolError;

/// An opaque RGB color.
///
/// On the wire a color is a hex string, `"#RRGGBB"`. Parsing accepts
/// either case; formatting always emits uppercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_case_hex() {
        let color: Rgb = "#ff00Aa".parse().unwrap();
        assert_eq!(color, Rgb::new(255, 0, 170));
        assert_eq!(color.to_string(), "#FF00AA");
    }

    #[test]
    fn test_parse_rejects_missing_hash_and_bad_length() {
        assert!("000000".parse::<Rgb>().is_err());
        assert!("#00000".parse::<Rgb>().is_err());
        assert!("#GG0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_color_as_json_string() {
        let json = serde_json::to_string(&Rgb::BLACK).unwrap();
        assert_eq!(json, r##""#000000""##);
        let back: Rgb = serde_json::from_str(r##""#ffffff""##).unwrap();
        assert_eq!(back, Rgb::WHITE);
    }
}
