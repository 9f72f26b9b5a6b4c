use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use beehive_core::views::{bubbles, Alignment as Side};
use beehive_core::ConversationEndpoint;

use crate::app::{App, InputTarget, Screen};
use crate::theme::ThemedStyles;

pub struct ChatPanel;

impl ChatPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);
        let view = app.chat.view();
        let composing = app.input_target == Some(InputTarget::Draft);

        let title = match &view.endpoint {
            Some(ConversationEndpoint::AdminChannel) => " Chat with Admin ".to_string(),
            Some(ConversationEndpoint::User(id)) => {
                let contacts = app.contacts.view();
                let name = contacts
                    .selected_user()
                    .filter(|user| &user.id == id)
                    .map(|user| user.display_name().to_string())
                    .unwrap_or_else(|| id.clone());
                format!(" Chat with {} ", name)
            }
            None => " Chat ".to_string(),
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        let focused = app.current == Screen::Chat || composing;
        let block = styles.panel(&title, focused);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);

        if view.endpoint.is_none() {
            frame.render_widget(
                Paragraph::new("Select a user to start chatting")
                    .alignment(Alignment::Center)
                    .style(styles.dimmed()),
                inner,
            );
        } else if view.is_empty() {
            frame.render_widget(
                Paragraph::new("No messages yet.")
                    .alignment(Alignment::Center)
                    .style(styles.dimmed()),
                inner,
            );
        } else {
            let mut lines = Vec::new();
            for bubble in bubbles(&view, app.session.user_id()) {
                let (align, body) = match bubble.alignment {
                    Side::Outgoing => (Alignment::Right, Style::default().fg(theme.accent())),
                    Side::Incoming => (Alignment::Left, styles.text()),
                };
                let time = bubble
                    .message
                    .timestamp
                    .with_timezone(&Local)
                    .format("%b %d %H:%M")
                    .to_string();
                lines.push(
                    Line::from(Span::styled(bubble.message.content.clone(), body)).alignment(align),
                );
                lines.push(Line::from(Span::styled(time, styles.dimmed())).alignment(align));
                lines.push(Line::from(""));
            }
            // Each message takes three lines; the newest sit at the bottom.
            let total = lines.len() as u16;
            let bottom = total.saturating_sub(inner.height);
            let offset = bottom.saturating_sub((view.scroll as u16).saturating_mul(3));
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .scroll((offset, 0)),
                inner,
            );
        }

        let input_title = if composing {
            " Message (Enter to send, Esc to stop) "
        } else {
            " Message (i to type) "
        };
        let input_block = styles.panel(input_title, composing);
        let cursor = if composing { "▏" } else { "" };
        let input = Paragraph::new(Line::from(vec![
            Span::styled(view.draft.clone(), styles.text()),
            Span::styled(cursor, styles.accent_bold()),
        ]))
        .block(input_block);
        frame.render_widget(input, chunks[1]);
    }
}
