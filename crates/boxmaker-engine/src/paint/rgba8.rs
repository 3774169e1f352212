use std::str::FromStr;

use thiserror::Error;

/// Straight-alpha sRGB color as four bytes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB bytes.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_image(self) -> image::Rgba<u8> {
        image::Rgba(self.to_array())
    }
}

impl From<[u8; 4]> for Rgba8 {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// Error returned when parsing a `#rrggbb` / `#rrggbbaa` color.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("invalid color '{0}': expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError(pub String);

impl FromStr for Rgba8 {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_hex_as_opaque() {
        assert_eq!("#ff8000".parse::<Rgba8>(), Ok(Rgba8::rgb(255, 128, 0)));
    }

    #[test]
    fn parses_rgba_hex_without_hash() {
        assert_eq!("10203040".parse::<Rgba8>(), Ok(Rgba8::new(0x10, 0x20, 0x30, 0x40)));
    }

    #[test]
    fn rejects_bad_length_and_digits() {
        assert!("#fff".parse::<Rgba8>().is_err());
        assert!("#gg0000".parse::<Rgba8>().is_err());
    }
}
