use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use beehive_core::{PollState, UserAction, ViewBinding};

use crate::app::{App, InputTarget, Screen};
use crate::events::InputMode;
use crate::theme::ThemedStyles;

pub struct Footer;

fn key_for(action: UserAction) -> Option<&'static str> {
    match action {
        UserAction::Send => Some("i"),
        UserAction::SelectConversation => Some("j/k"),
        UserAction::MarkSeen => Some("n"),
        UserAction::ToggleView => Some("v"),
        UserAction::FilterBySentiment => Some("f"),
        UserAction::PlayAudio => Some("a"),
        UserAction::EditUpload => Some("e"),
        UserAction::DeleteUpload => Some("d"),
        UserAction::Refresh => Some("r"),
        UserAction::CreateUpload => None,
    }
}

/// The key hints for what the current screen allows right now.
pub fn key_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    match app.input_mode() {
        InputMode::Confirm => return vec![("y", "confirm"), ("n", "cancel")],
        InputMode::Insert => {
            let mut hints = vec![("Enter", "submit"), ("Esc", "cancel")];
            if matches!(
                app.input_target,
                Some(InputTarget::UploadForm) | Some(InputTarget::Editor)
            ) {
                hints.insert(1, ("Tab", "next field"));
            }
            return hints;
        }
        InputMode::Normal => {}
    }

    let session = &app.session;
    let mut actions = match &app.current {
        Screen::Chat => app.chat.view().available_actions(session),
        Screen::Users => {
            let mut actions = app.contacts.view().available_actions(session);
            actions.extend(app.chat.view().available_actions(session));
            actions
        }
        Screen::Gallery | Screen::UserUploads(_) => app.gallery.view().available_actions(session),
        Screen::Dashboard | Screen::Analytics => app.dashboard.view().available_actions(session),
        Screen::Upload => Vec::new(),
    };
    actions.extend(app.bell.view().available_actions(session));

    let mut hints: Vec<(&'static str, &'static str)> = Vec::new();
    for action in actions {
        if let Some(key) = key_for(action) {
            if !hints.iter().any(|(k, _)| *k == key) {
                hints.push((key, action.label()));
            }
        }
    }
    match app.current {
        Screen::Upload => hints.push(("i", "fill form")),
        Screen::Users => {
            hints.push(("/", "search"));
            hints.push(("u", "uploads"));
        }
        Screen::UserUploads(_) => hints.push(("Esc", "back")),
        _ => {}
    }
    hints.extend([("Tab", "next view"), ("t", "theme"), ("q", "quit")]);
    hints
}

impl Footer {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let spans: Vec<Span> = key_hints(app)
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), styles.keybind()),
                    Span::styled(format!(":{desc} "), styles.dimmed()),
                ]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface())),
            chunks[0],
        );

        let status_line = match app.current_status() {
            Some(status) if status.last_outcome() == Some(PollState::Failed) => {
                let reason = status
                    .last_error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                let stale = if status.is_stale() { " (stale)" } else { "" };
                Line::from(Span::styled(
                    format!("{}{} ", reason, stale),
                    Style::default().fg(theme.error()),
                ))
            }
            Some(status) if status.in_flight => {
                Line::from(Span::styled("syncing… ", Style::default().fg(theme.info())))
            }
            _ => Line::from(Span::styled(
                format!("{} ", app.status_message.as_deref().unwrap_or("Ready")),
                styles.dimmed(),
            )),
        };
        frame.render_widget(
            Paragraph::new(status_line)
                .alignment(Alignment::Right)
                .style(Style::default().bg(theme.surface())),
            chunks[1],
        );
    }
}
