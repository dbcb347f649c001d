//! ANSI colour for chart strokes, chosen by the `color` render option.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex colour digit in `{0}`")]
    InvalidHexDigit(String),
    #[error("unknown colour `{0}` (use a name or #RRGGBB)")]
    Unknown(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnsiCode {
    /// SGR foreground code 30..=37.
    Basic(u8),
    /// True-colour escape `ESC[38;2;R;G;Bm`.
    Rgb(u8, u8, u8),
}

impl AnsiCode {
    pub const fn industrial_orange() -> Self {
        Self::Rgb(210, 135, 10)
    }

    /// Colour names or `#rrggbb`.
    pub fn from_name(s: &str) -> Result<Self, ColorError> {
        let basic = match s.trim().to_ascii_lowercase().as_str() {
            "black" => 30,
            "red" => 31,
            "green" => 32,
            "yellow" => 33,
            "blue" => 34,
            "magenta" => 35,
            "cyan" => 36,
            "white" => 37,
            "orange" | "industrial" => return Ok(Self::industrial_orange()),
            _ => return Self::from_hex(s),
        };
        Ok(Self::Basic(basic))
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let h = hex.trim();
        let Some(h) = h.strip_prefix('#') else {
            return Err(ColorError::Unknown(hex.to_owned()));
        };
        if h.len() != 6 || !h.is_ascii() {
            return Err(ColorError::Unknown(hex.to_owned()));
        }
        let byte = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHexDigit(hex.to_owned()))
        };
        Ok(Self::Rgb(byte(&h[..2])?, byte(&h[2..4])?, byte(&h[4..])?))
    }
}

impl fmt::Display for AnsiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(n) => write!(f, "\x1b[{n}m"),
            Self::Rgb(r, g, b) => write!(f, "\x1b[38;2;{r};{g};{b}m"),
        }
    }
}

pub const RESET: &str = "\x1b[0m";

/// Wrap `text` in colour + reset sequence; plain text when `color` is `None`.
#[inline]
pub fn colorize(color: Option<&AnsiCode>, text: &str) -> String {
    match color {
        Some(c) => format!("{c}{text}{RESET}"),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_hex() {
        assert_eq!(AnsiCode::from_name("Blue"), Ok(AnsiCode::Basic(34)));
        assert_eq!(AnsiCode::from_name("#6048c1"), Ok(AnsiCode::Rgb(0x60, 0x48, 0xc1)));
        assert_eq!(AnsiCode::Rgb(1, 2, 3).to_string(), "\x1b[38;2;1;2;3m");
        assert!(matches!(AnsiCode::from_name("#12345"), Err(ColorError::Unknown(_))));
        assert!(matches!(AnsiCode::from_name("#zz0000"), Err(ColorError::InvalidHexDigit(_))));
        assert!(matches!(AnsiCode::from_name("mauve"), Err(ColorError::Unknown(_))));
    }

    #[test]
    fn colorize_without_color_is_plain() {
        assert_eq!(colorize(None, "x"), "x");
        assert_eq!(colorize(Some(&AnsiCode::Basic(31)), "x"), "\x1b[31mx\x1b[0m");
    }
}
