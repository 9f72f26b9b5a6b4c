mod styles;

pub use styles::ThemedStyles;

use ratatui::style::Color;

pub trait Theme: Send + Sync {
    fn name(&self) -> &'static str;

    fn background(&self) -> Color;
    fn foreground(&self) -> Color;
    fn foreground_dim(&self) -> Color;

    fn surface(&self) -> Color;
    fn border(&self) -> Color;
    fn selection(&self) -> Color;

    fn accent(&self) -> Color;
    fn accent_secondary(&self) -> Color;

    fn success(&self) -> Color;
    fn warning(&self) -> Color;
    fn error(&self) -> Color;
    fn info(&self) -> Color;
}

/// A theme described as plain data: twelve `0xRRGGBB` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub background: u32,
    pub foreground: u32,
    pub foreground_dim: u32,
    pub surface: u32,
    pub border: u32,
    pub selection: u32,
    pub accent: u32,
    pub accent_secondary: u32,
    pub success: u32,
    pub warning: u32,
    pub error: u32,
    pub info: u32,
}

pub const HONEYCOMB: Palette = Palette {
    name: "Honeycomb",
    background: 0x1b1710,
    foreground: 0xf2e6c9,
    foreground_dim: 0x8a7d62,
    surface: 0x262016,
    border: 0x4a3f2a,
    selection: 0x5c4a22,
    accent: 0xf5b700,
    accent_secondary: 0xe07a1f,
    success: 0x9ccc65,
    warning: 0xffca28,
    error: 0xef5350,
    info: 0x4fc3f7,
};

pub const TOKYO_NIGHT: Palette = Palette {
    name: "Tokyo Night",
    background: 0x1a1b26,
    foreground: 0xc0caf5,
    foreground_dim: 0x565f89,
    surface: 0x24283b,
    border: 0x414868,
    selection: 0x364a82,
    accent: 0x7aa2f7,
    accent_secondary: 0xbb9af7,
    success: 0x9ece6a,
    warning: 0xe0af68,
    error: 0xf7768e,
    info: 0x7dcfff,
};

pub const CATPPUCCIN_LATTE: Palette = Palette {
    name: "Catppuccin Latte",
    background: 0xeff1f5,
    foreground: 0x4c4f69,
    foreground_dim: 0x9ca0b0,
    surface: 0xe6e9ef,
    border: 0xbcc0cc,
    selection: 0xdce0e8,
    accent: 0x8839ef,
    accent_secondary: 0xea76cb,
    success: 0x40a02b,
    warning: 0xdf8e1d,
    error: 0xd20f39,
    info: 0x1e66f5,
};

pub fn hex_to_color(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Color::Rgb(r, g, b)
}

impl Theme for Palette {
    fn name(&self) -> &'static str {
        self.name
    }

    fn background(&self) -> Color {
        hex_to_color(self.background)
    }

    fn foreground(&self) -> Color {
        hex_to_color(self.foreground)
    }

    fn foreground_dim(&self) -> Color {
        hex_to_color(self.foreground_dim)
    }

    fn surface(&self) -> Color {
        hex_to_color(self.surface)
    }

    fn border(&self) -> Color {
        hex_to_color(self.border)
    }

    fn selection(&self) -> Color {
        hex_to_color(self.selection)
    }

    fn accent(&self) -> Color {
        hex_to_color(self.accent)
    }

    fn accent_secondary(&self) -> Color {
        hex_to_color(self.accent_secondary)
    }

    fn success(&self) -> Color {
        hex_to_color(self.success)
    }

    fn warning(&self) -> Color {
        hex_to_color(self.warning)
    }

    fn error(&self) -> Color {
        hex_to_color(self.error)
    }

    fn info(&self) -> Color {
        hex_to_color(self.info)
    }
}

pub struct ThemeManager {
    palettes: Vec<Palette>,
    current_index: usize,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self {
            palettes: vec![HONEYCOMB, TOKYO_NIGHT, CATPPUCCIN_LATTE],
            current_index: 0,
        }
    }

    pub fn current_theme(&self) -> &dyn Theme {
        &self.palettes[self.current_index]
    }

    pub fn cycle_theme(&mut self) {
        self.current_index = (self.current_index + 1) % self.palettes.len();
    }

    pub fn set_theme_by_name(&mut self, name: &str) -> bool {
        match self
            .palettes
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    pub fn current_theme_name(&self) -> &'static str {
        self.current_theme().name()
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color(0xf5b700), Color::Rgb(0xf5, 0xb7, 0x00));
    }

    #[test]
    fn test_cycle_wraps() {
        let mut manager = ThemeManager::new();
        assert_eq!(manager.current_theme_name(), "Honeycomb");
        for _ in 0..3 {
            manager.cycle_theme();
        }
        assert_eq!(manager.current_theme_name(), "Honeycomb");
    }

    #[test]
    fn test_set_theme_by_name() {
        let mut manager = ThemeManager::new();
        assert!(manager.set_theme_by_name("tokyo night"));
        assert_eq!(manager.current_theme_name(), "Tokyo Night");
        assert!(!manager.set_theme_by_name("solarized"));
    }
}
