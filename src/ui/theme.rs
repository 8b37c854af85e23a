//! Terminal color themes.

use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors used when rendering. Whether they are emitted at all is decided
/// globally through `colored::control`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub muted: Color,
    pub title: Color,
    pub accent: Color,
    pub error: Color,
}

impl Palette {
    pub fn muted(&self, text: &str) -> ColoredString {
        text.color(self.muted)
    }

    pub fn title(&self, text: &str) -> ColoredString {
        text.color(self.title).bold()
    }

    pub fn accent(&self, text: &str) -> ColoredString {
        text.color(self.accent)
    }

    pub fn error(&self, text: &str) -> ColoredString {
        text.color(self.error)
    }
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                muted: Color::BrightBlack,
                title: Color::BrightWhite,
                accent: Color::TrueColor { r: 95, g: 175, b: 255 },
                error: Color::TrueColor { r: 255, g: 135, b: 95 },
            },
            Self::Light => Palette {
                muted: Color::White,
                title: Color::Black,
                accent: Color::Blue,
                error: Color::Red,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_override_strips_colors() {
        colored::control::set_override(false);
        let palette = Theme::Dark.palette();
        assert_eq!(palette.error("= Error").to_string(), "= Error");
        assert_eq!(palette.title("= 4").to_string(), "= 4");
    }
}
