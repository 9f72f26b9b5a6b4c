use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};

use super::Theme;

pub struct ThemedStyles<'a> {
    theme: &'a dyn Theme,
}

impl<'a> ThemedStyles<'a> {
    pub fn new(theme: &'a dyn Theme) -> Self {
        Self { theme }
    }

    pub fn surface(&self) -> Style {
        Style::default()
            .bg(self.theme.surface())
            .fg(self.theme.foreground())
    }

    /// A bordered panel; the border lights up when the panel has focus.
    pub fn panel<'t>(&self, title: &'t str, focused: bool) -> Block<'t> {
        let border = if focused {
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.border())
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border)
            .style(self.surface())
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.theme.foreground_dim())
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.theme.foreground())
    }

    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.theme.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn selection(&self) -> Style {
        Style::default()
            .bg(self.theme.selection())
            .fg(self.theme.foreground())
    }

    pub fn keybind(&self) -> Style {
        Style::default()
            .fg(self.theme.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn badge(&self) -> Style {
        Style::default()
            .bg(self.theme.error())
            .fg(self.theme.background())
            .add_modifier(Modifier::BOLD)
    }

    /// Colour for a free-form sentiment tag.
    pub fn sentiment(&self, tag: Option<&str>) -> Style {
        let tag = tag.unwrap_or("").to_lowercase();
        let color = if tag.contains("positive") {
            self.theme.success()
        } else if tag.contains("negative") {
            self.theme.error()
        } else if tag.contains("neutral") {
            self.theme.warning()
        } else {
            self.theme.foreground_dim()
        };
        Style::default().fg(color)
    }
}
