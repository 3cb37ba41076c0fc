//! Colour palettes for the dark and light themes.

use ratatui::style::{Color, Modifier, Style};

/// Colours used by every panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Screen background.
    pub background: Color,
    /// Main text.
    pub foreground: Color,
    /// Hints and secondary text.
    pub muted: Color,
    /// Unfocused borders.
    pub border: Color,
    /// Title, focus and highlight.
    pub accent: Color,
    /// Rising prices.
    pub up: Color,
    /// Falling prices and errors.
    pub down: Color,
    /// Horizontal drawing levels.
    pub level: Color,
}

impl Palette {
    /// Dark or light palette.
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Palette {
            background: Color::Rgb(30, 30, 30),
            foreground: Color::Rgb(240, 240, 240),
            muted: Color::Rgb(150, 150, 150),
            border: Color::Rgb(80, 80, 80),
            accent: Color::Rgb(76, 175, 80),
            up: Color::Rgb(76, 175, 80),
            down: Color::Rgb(244, 67, 54),
            level: Color::Yellow,
        }
    }

    /// Light theme.
    pub fn light() -> Self {
        Palette {
            background: Color::Rgb(250, 250, 250),
            foreground: Color::Rgb(30, 30, 30),
            muted: Color::Rgb(110, 110, 110),
            border: Color::Rgb(190, 190, 190),
            accent: Color::Rgb(46, 125, 50),
            up: Color::Rgb(46, 125, 50),
            down: Color::Rgb(198, 40, 40),
            level: Color::Rgb(191, 144, 0),
        }
    }

    /// Default text on the background.
    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Border style, accented when focused.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Selected row or active item.
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Green when `change` is positive, red otherwise.
    pub fn change(&self, change: f64) -> Style {
        Style::default().fg(if change > 0.0 { self.up } else { self.down })
    }
}
