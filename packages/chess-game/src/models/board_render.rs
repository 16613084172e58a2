use chess::Square;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightRole {
    MoveOrigin,
    MoveDestination,
    Check,
    Capture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub square: Square,
    pub role: HighlightRole,
}

/// Everything needed to draw the current state of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRenderSpec {
    pub fen: String,
    pub last_move: Option<(Square, Square)>,
    pub check: Option<Square>,
    pub capture: Option<Square>,
}

impl BoardRenderSpec {
    pub fn snapshot(fen: String) -> Self {
        BoardRenderSpec {
            fen,
            last_move: None,
            check: None,
            capture: None,
        }
    }

    pub fn highlights(&self) -> Vec<Highlight> {
        let mut highlights = Vec::new();
        if let Some((from, to)) = self.last_move {
            highlights.push(Highlight {
                square: from,
                role: HighlightRole::MoveOrigin,
            });
            highlights.push(Highlight {
                square: to,
                role: HighlightRole::MoveDestination,
            });
        }
        if let Some(square) = self.capture {
            highlights.push(Highlight {
                square,
                role: HighlightRole::Capture,
            });
        }
        if let Some(square) = self.check {
            highlights.push(Highlight {
                square,
                role: HighlightRole::Check,
            });
        }
        highlights
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidColor(pub String);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid color: {}", self.0)
    }
}

impl std::error::Error for InvalidColor {}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#RRGGBB` or the short `#RGB` form.
    pub fn parse_hex(value: &str) -> Result<Self, InvalidColor> {
        let invalid = || InvalidColor(value.to_string());
        let digits = value.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Rgb::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => Ok(Rgb::new(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub light: Rgb,
    pub dark: Rgb,
    pub highlight: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            light: Rgb::new(255, 255, 255),
            dark: Rgb::new(20, 93, 191),
            highlight: Rgb::new(255, 229, 119),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemePreference {
    sidebar_bg: Option<String>,
    mention_highlight_bg: Option<String>,
    center_channel_bg: Option<String>,
}

impl Palette {
    /// Builds a palette from a chat theme preference. Colors that are missing or
    /// unparsable keep their defaults.
    pub fn from_theme_json(theme: &str) -> Self {
        let mut palette = Palette::default();
        let theme: ThemePreference = match serde_json::from_str(theme) {
            Ok(theme) => theme,
            Err(e) => {
                debug!("Could not read theme preference: {}", e);
                return palette;
            }
        };

        let pick = |value: Option<String>, fallback: Rgb| match value {
            Some(value) => Rgb::parse_hex(&value).unwrap_or_else(|e| {
                debug!("Ignoring theme color: {}", e);
                fallback
            }),
            None => fallback,
        };
        palette.light = pick(theme.center_channel_bg, palette.light);
        palette.dark = pick(theme.sidebar_bg, palette.dark);
        palette.highlight = pick(theme.mention_highlight_bg, palette.highlight);
        palette
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("#FFFFFF", Rgb::new(255, 255, 255))]
    #[case("#145dbf", Rgb::new(20, 93, 191))]
    #[case("#fff", Rgb::new(255, 255, 255))]
    #[case("#0a0", Rgb::new(0, 170, 0))]
    fn test_parse_hex(#[case] input: &str, #[case] expected: Rgb) {
        assert_eq!(Rgb::parse_hex(input), Ok(expected));
    }

    #[rstest]
    #[case("FFFFFF")]
    #[case("#FFFFF")]
    #[case("#GGGGGG")]
    #[case("")]
    fn test_parse_hex_rejects_malformed(#[case] input: &str) {
        assert!(Rgb::parse_hex(input).is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::new(20, 93, 191).to_hex(), "#145DBF");
    }

    #[test]
    fn test_palette_from_theme() {
        let theme = r##"{"sidebarBg":"#1e325c","mentionHighlightBg":"#ffd470","centerChannelBg":"#ffffff","linkColor":"#2389d7"}"##;

        let palette = Palette::from_theme_json(theme);

        assert_eq!(palette.dark, Rgb::new(30, 50, 92));
        assert_eq!(palette.highlight, Rgb::new(255, 212, 112));
        assert_eq!(palette.light, Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_palette_keeps_defaults_for_bad_values() {
        let palette = Palette::from_theme_json(r#"{"sidebarBg":"navy"}"#);
        assert_eq!(palette, Palette::default());

        let palette = Palette::from_theme_json("not json");
        assert_eq!(palette, Palette::default());
    }

    #[test]
    fn test_highlights_in_role_order() {
        let square = |s: &str| Square::from_str(s).unwrap();
        let spec = BoardRenderSpec {
            fen: String::new(),
            last_move: Some((square("e5"), square("d6"))),
            check: None,
            capture: Some(square("d5")),
        };

        let roles: Vec<HighlightRole> = spec.highlights().iter().map(|h| h.role).collect();

        assert_eq!(
            roles,
            vec![
                HighlightRole::MoveOrigin,
                HighlightRole::MoveDestination,
                HighlightRole::Capture
            ]
        );
        assert!(BoardRenderSpec::snapshot(String::new())
            .highlights()
            .is_empty());
    }
}
