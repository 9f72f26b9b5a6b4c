use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use beehive_core::models::UploadKind;

use crate::app::App;
use crate::theme::ThemedStyles;

pub struct DashboardPanel;

impl DashboardPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(app.current_theme());
        let view = app.dashboard.view();

        let Some(snapshot) = view.snapshot.as_ref() else {
            let block = styles.panel(" Dashboard ", true);
            frame.render_widget(
                Paragraph::new("Loading dashboard…")
                    .alignment(Alignment::Center)
                    .style(styles.dimmed())
                    .block(block),
                area,
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(5)])
            .split(area);

        let stats = [
            ("Users", snapshot.stats.total_users),
            ("Images", snapshot.stats.total_images),
            ("Voice notes", snapshot.stats.total_voice_notes),
            ("Total media", snapshot.stats.total_media),
        ];
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(chunks[0]);
        for (card, (label, value)) in cards.iter().zip(stats) {
            let body = vec![
                Line::from(Span::styled(value.to_string(), styles.accent_bold())),
                Line::from(Span::styled(label, styles.dimmed())),
            ];
            frame.render_widget(
                Paragraph::new(body)
                    .alignment(Alignment::Center)
                    .block(styles.panel("", false)),
                *card,
            );
        }

        let header = Row::new(vec!["Title", "User", "Type", "Sentiment", "When"])
            .style(styles.accent_bold());
        let rows: Vec<Row> = view
            .recent()
            .iter()
            .map(|upload| {
                let kind = match upload.kind {
                    UploadKind::Image => "image",
                    UploadKind::Voice => "voice",
                };
                let when = upload
                    .timestamp
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(upload.title.clone()),
                    Cell::from(upload.user.clone()),
                    Cell::from(kind),
                    Cell::from(upload.sentiment.clone().unwrap_or_default())
                        .style(styles.sentiment(upload.sentiment.as_deref())),
                    Cell::from(when),
                ])
            })
            .collect();

        let selected = view
            .selected
            .as_deref()
            .and_then(|id| view.recent().iter().position(|upload| upload.id == id));
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Percentage(20),
                Constraint::Length(6),
                Constraint::Length(10),
                Constraint::Length(17),
            ],
        )
        .header(header)
        .block(styles.panel(" Recent uploads ", true))
        .row_highlight_style(styles.selection())
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }
}
