use ratatui::prelude::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub(crate) text_fg: Color,
    pub(crate) status_fg: Color,
    pub(crate) status_bg: Color,
    pub(crate) error_fg: Color,
    /// Caret escapes and visible tabs.
    pub(crate) nonprint_fg: Color,
    pub(crate) tilde_fg: Color,
    pub(crate) panel_border: Color,
}

impl Theme {
    pub(crate) fn default_theme() -> Self {
        Self::light()
    }

    pub(crate) fn light() -> Self {
        Self {
            text_fg: Color::Reset,
            status_fg: Color::Black,
            status_bg: Color::White,
            error_fg: Color::Red,
            nonprint_fg: Color::Blue,
            tilde_fg: Color::Blue,
            panel_border: Color::DarkGray,
        }
    }

    pub(crate) fn dark() -> Self {
        Self {
            text_fg: Color::Reset,
            status_fg: Color::White,
            status_bg: Color::Rgb(32, 32, 32),
            error_fg: Color::Rgb(255, 95, 95),
            nonprint_fg: Color::Rgb(102, 153, 204),
            tilde_fg: Color::Rgb(102, 153, 204),
            panel_border: Color::Rgb(96, 96, 96),
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}
