use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, InputTarget};
use crate::theme::ThemedStyles;

pub struct UsersPanel;

/// "5m ago" style rendering of a last-active time.
pub fn last_seen(at: chrono::DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{}m ago", m),
        m if m < 60 * 24 => format!("{}h ago", m / 60),
        _ => at.with_timezone(&Local).format("%b %d").to_string(),
    }
}

impl UsersPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);
        let view = app.contacts.view();
        let searching = app.input_target == Some(InputTarget::Search);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let search = Paragraph::new(Line::from(vec![
            Span::styled("/ ", styles.dimmed()),
            Span::styled(view.search.clone(), styles.text()),
        ]))
        .block(styles.panel(" Search ", searching));
        frame.render_widget(search, chunks[0]);

        let visible = view.filtered();
        let title = format!(" Users ({}) ", visible.len());
        let items: Vec<ListItem> = visible
            .iter()
            .map(|user| {
                let seen = user
                    .last_active_at()
                    .map(last_seen)
                    .unwrap_or_else(|| "never".to_string());
                ListItem::new(vec![
                    Line::from(Span::styled(user.display_name().to_string(), styles.text())),
                    Line::from(Span::styled(
                        format!("  {} · {}", user.email, seen),
                        styles.dimmed(),
                    )),
                ])
            })
            .collect();

        let selected = view
            .selected
            .as_deref()
            .and_then(|id| visible.iter().position(|user| user.id == id));
        let mut state = ListState::default().with_selected(selected);
        let list = List::new(items)
            .block(styles.panel(&title, !searching))
            .highlight_style(styles.selection())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_last_seen() {
        assert_eq!(last_seen(Utc::now()), "just now");
        assert_eq!(last_seen(Utc::now() - Duration::minutes(5)), "5m ago");
        assert_eq!(last_seen(Utc::now() - Duration::hours(3)), "3h ago");
    }
}
