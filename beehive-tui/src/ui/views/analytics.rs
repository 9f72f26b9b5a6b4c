use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;

pub struct AnalyticsView;

impl AnalyticsView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);
        let view = app.dashboard.view();

        let Some(analytics) = view.analytics else {
            frame.render_widget(
                Paragraph::new("Loading analytics…")
                    .alignment(Alignment::Center)
                    .style(styles.dimmed())
                    .block(styles.panel(" Analytics ", true)),
                area,
            );
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let totals = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Images       ", styles.dimmed()),
                Span::styled(analytics.images.to_string(), styles.accent_bold()),
            ]),
            Line::from(vec![
                Span::styled("  Voice notes  ", styles.dimmed()),
                Span::styled(analytics.voice_notes.to_string(), styles.accent_bold()),
            ]),
            Line::from(vec![
                Span::styled("  Total media  ", styles.dimmed()),
                Span::styled(analytics.total_media.to_string(), styles.accent_bold()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "  Recent: {} images, {} voice notes",
                    analytics.recent_images, analytics.recent_voice_notes
                ),
                styles.text(),
            )),
        ];
        frame.render_widget(
            Paragraph::new(totals).block(styles.panel(" Media ", false)),
            columns[0],
        );

        let block = styles.panel(" Sentiment of recent uploads ", true);
        let inner = block.inner(columns[1]);
        frame.render_widget(block, columns[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
            ])
            .split(inner);
        let breakdown = analytics.sentiment;
        let gauges = [
            ("positive", breakdown.positive, theme.success()),
            ("neutral", breakdown.neutral, theme.warning()),
            ("negative", breakdown.negative, theme.error()),
        ];
        for (row, (label, percent, color)) in rows.iter().zip(gauges) {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color).bg(theme.surface()))
                .ratio((percent / 100.0).clamp(0.0, 1.0))
                .label(format!("{} {:.1}%", label, percent));
            frame.render_widget(gauge, *row);
        }
        if breakdown.untagged > 0 {
            frame.render_widget(
                Paragraph::new(format!("{} untagged", breakdown.untagged)).style(styles.dimmed()),
                rows[3],
            );
        }
    }
}
