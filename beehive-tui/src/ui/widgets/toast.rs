use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use uuid::Uuid;

use crate::theme::Theme;

const DEFAULT_TTL: Duration = Duration::from_secs(4);
const ERROR_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (ToastLevel::Info, true) => "ℹ",
            (ToastLevel::Success, true) => "✓",
            (ToastLevel::Warning, true) => "⚠",
            (ToastLevel::Error, true) => "✗",
            (ToastLevel::Info, false) => "i",
            (ToastLevel::Success, false) => "+",
            (ToastLevel::Warning, false) => "!",
            (ToastLevel::Error, false) => "x",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        let ttl = if level == ToastLevel::Error {
            ERROR_TTL
        } else {
            DEFAULT_TTL
        };
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            level,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    /// Fraction of the lifetime left, from 1.0 down to 0.0.
    pub fn remaining(&self) -> f32 {
        let total = self.ttl.as_secs_f32();
        if total == 0.0 {
            return 0.0;
        }
        1.0 - (self.created_at.elapsed().as_secs_f32() / total).clamp(0.0, 1.0)
    }
}

#[derive(Debug)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    max_visible: usize,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: Vec::new(),
            max_visible: 4,
        }
    }

    pub fn push(&mut self, toast: Toast) -> Uuid {
        let id = toast.id;
        self.toasts.push(toast);
        id
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastLevel::Error));
    }

    pub fn dismiss(&mut self, id: Uuid) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn cleanup(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    /// Newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev().take(self.max_visible)
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect, theme: &dyn Theme, unicode: bool) {
        let width = 44u16.min(screen.width.saturating_sub(4));
        let height = 4u16;
        let x = screen.width.saturating_sub(width + 2);
        let mut y = 4u16;

        for toast in self.visible() {
            if y + height > screen.height {
                break;
            }
            Self::render_toast(frame, Rect::new(x, y, width, height), toast, theme, unicode);
            y += height;
        }
    }

    fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast, theme: &dyn Theme, unicode: bool) {
        frame.render_widget(Clear, area);

        let color = match toast.level {
            ToastLevel::Info => theme.info(),
            ToastLevel::Success => theme.success(),
            ToastLevel::Warning => theme.warning(),
            ToastLevel::Error => theme.error(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.surface()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let bar_width = (inner.width as f32 * toast.remaining()) as usize;
        let bar = if unicode { "─" } else { "-" };
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{} ", toast.level.icon(unicode)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(toast.message.as_str(), Style::default().fg(theme.foreground())),
            ]),
            Line::from(Span::styled(bar.repeat(bar_width), Style::default().fg(color))),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_levels() {
        assert_eq!(ToastLevel::Success.icon(true), "✓");
        assert_eq!(ToastLevel::Error.icon(false), "x");
    }

    #[test]
    fn test_errors_linger_longer() {
        let info = Toast::new("saved", ToastLevel::Info);
        let error = Toast::new("failed", ToastLevel::Error);
        assert!(error.ttl > info.ttl);
        assert!(!error.is_expired());
        assert!(info.remaining() > 0.9);
    }

    #[test]
    fn test_toast_manager_cleanup() {
        let mut manager = ToastManager::new();
        manager.push(Toast::new("gone", ToastLevel::Info).with_ttl(Duration::from_millis(1)));
        manager.success("stays");

        std::thread::sleep(Duration::from_millis(10));
        manager.cleanup();

        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_toast_manager_dismiss() {
        let mut manager = ToastManager::new();
        let id = manager.push(Toast::new("test", ToastLevel::Warning));
        manager.info("other");

        manager.dismiss(id);
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_visible_is_newest_first_and_capped() {
        let mut manager = ToastManager::new();
        for i in 0..6 {
            manager.info(format!("toast {}", i));
        }
        let visible: Vec<_> = manager.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(visible.len(), 4);
        assert_eq!(visible[0], "toast 5");
    }
}
