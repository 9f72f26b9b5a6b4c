use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;

const WIDTH: u16 = 56;
const MAX_HEIGHT: u16 = 18;

/// The bell's dropdown, anchored under the header on the right.
pub struct NotificationsDropdown;

impl NotificationsDropdown {
    pub fn render(frame: &mut Frame, screen: Rect, app: &App) {
        let styles = ThemedStyles::new(app.current_theme());
        let view = app.bell.view();

        let width = WIDTH.min(screen.width);
        let wanted = (view.items.len() as u16).saturating_mul(2).max(1) + 2;
        let height = wanted.min(MAX_HEIGHT).min(screen.height.saturating_sub(1));
        let area = Rect::new(screen.width.saturating_sub(width), 1, width, height);
        frame.render_widget(Clear, area);

        let title = if view.has_badge() {
            format!(" Notifications · {} new ", view.badge)
        } else {
            " Notifications ".to_string()
        };
        let block = styles.panel(&title, true);

        if view.items.is_empty() {
            frame.render_widget(
                Paragraph::new("You're all caught up")
                    .style(styles.dimmed())
                    .block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = view
            .items
            .iter()
            .map(|notification| {
                let marker = if notification.seen { "  " } else { "• " };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(marker, styles.accent_bold()),
                        Span::styled(notification.summary(), styles.text()),
                    ]),
                    Line::from(Span::styled(
                        format!(
                            "  {}",
                            notification
                                .timestamp
                                .with_timezone(&Local)
                                .format("%b %d %H:%M")
                        ),
                        styles.dimmed(),
                    )),
                ])
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}
