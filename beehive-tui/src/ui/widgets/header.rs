use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(18),
                Constraint::Min(20),
                Constraint::Length(30),
            ])
            .split(area);

        let mark = if app.unicode { "⬢ " } else { "# " };
        let logo = Paragraph::new(Line::from(vec![
            Span::styled(mark, Style::default().fg(theme.accent())),
            Span::styled(
                "Beehive ",
                Style::default()
                    .fg(theme.foreground())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("v{}", VERSION), styles.dimmed()),
        ]))
        .style(Style::default().bg(theme.background()));
        frame.render_widget(logo, chunks[0]);

        let titles: Vec<Line> = app
            .tabs
            .iter()
            .enumerate()
            .map(|(i, screen)| {
                let style = if *screen == app.current {
                    styles.accent_bold()
                } else {
                    styles.dimmed()
                };
                Line::from(Span::styled(format!("{} {}", i + 1, screen.name()), style))
            })
            .collect();
        let selected = app.tabs.iter().position(|screen| *screen == app.current);
        let mut tabs = Tabs::new(titles)
            .style(Style::default().bg(theme.background()))
            .highlight_style(Style::default().fg(theme.accent()))
            .divider(Span::raw(" │ "));
        if let Some(index) = selected {
            tabs = tabs.select(index);
        }
        frame.render_widget(tabs, chunks[1]);

        let mut right = Vec::new();
        if app.session.is_admin() {
            let bell = app.bell.view();
            let icon = if app.unicode { "🔔" } else { "N" };
            right.push(Span::styled(format!("{} ", icon), styles.text()));
            if bell.has_badge() {
                right.push(Span::styled(format!(" {} ", bell.badge), styles.badge()));
            } else {
                right.push(Span::styled("0", styles.dimmed()));
            }
            right.push(Span::raw("  "));
        }
        right.push(Span::styled(app.session.display_name(), styles.text()));
        right.push(Span::styled(
            format!(" {}", chrono::Local::now().format("%H:%M")),
            styles.dimmed(),
        ));
        let status = Paragraph::new(Line::from(right))
            .alignment(Alignment::Right)
            .style(Style::default().bg(theme.background()));
        frame.render_widget(status, chunks[2]);
    }
}
