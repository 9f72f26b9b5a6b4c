use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use beehive_core::{GalleryMode, GalleryView, Upload};

use crate::app::{App, Screen};
use crate::theme::ThemedStyles;
use crate::ui::layout::MainLayout;

const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 6;

pub struct GalleryPanel;

impl GalleryPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(app.current_theme());
        let view = app.gallery.view();

        let owner = match &app.current {
            Screen::UserUploads(id) => format!("Uploads of {}", id),
            _ => "My Gallery".to_string(),
        };
        let filter = if view.filter.is_empty() {
            String::new()
        } else {
            format!(" · {}", view.filter.tags.join(","))
        };
        let title = format!(" {} · {}{} ", owner, view.mode, filter);
        let block = styles.panel(&title, true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = view.visible();
        if visible.is_empty() {
            let message = if view.uploads.is_empty() {
                "No uploads yet"
            } else {
                "Nothing matches the current filter (f to change)"
            };
            frame.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .style(styles.dimmed()),
                inner,
            );
            return;
        }

        match view.mode {
            GalleryMode::Grid => Self::render_grid(frame, inner, app, &view, &visible),
            GalleryMode::List => Self::render_list(frame, inner, app, &view, &visible),
            GalleryMode::Rolling => Self::render_rolling(frame, inner, app, &view, &visible),
        }
    }

    fn card_lines<'a>(
        app: &App,
        view: &GalleryView,
        upload: &'a Upload,
        styles: &ThemedStyles,
    ) -> Vec<Line<'a>> {
        let kind = if upload.is_pdf() { "pdf" } else { "image" };
        let mut lines = vec![
            Line::from(Span::styled(upload.title.as_str(), styles.accent_bold())),
            Line::from(vec![
                Span::styled(
                    upload.sentiment.as_deref().unwrap_or("untagged"),
                    styles.sentiment(upload.sentiment.as_deref()),
                ),
                Span::styled(format!(" · {}", kind), styles.dimmed()),
            ]),
        ];
        if let Some(audio) = upload.audio() {
            let note = if app.unicode { "♪" } else { "~" };
            let state = if view.expanded_audio.as_deref() == Some(upload.id.as_str()) {
                format!("{} playing {}", note, audio)
            } else {
                format!("{} voice note", note)
            };
            lines.push(Line::from(Span::styled(state, styles.text())));
        }
        lines
    }

    fn render_grid(frame: &mut Frame, area: Rect, app: &App, view: &GalleryView, visible: &[&Upload]) {
        let styles = ThemedStyles::new(app.current_theme());
        let columns = (area.width / CARD_WIDTH).max(1) as usize;
        let rows_fit = (area.height / CARD_HEIGHT).max(1) as usize;
        let selected_row = view.carousel_index / columns;
        let first_row = selected_row.saturating_sub(rows_fit - 1);

        for (i, upload) in visible.iter().enumerate().skip(first_row * columns) {
            let row = i / columns - first_row;
            if row >= rows_fit {
                break;
            }
            let col = i % columns;
            let card = Rect::new(
                area.x + col as u16 * CARD_WIDTH,
                area.y + row as u16 * CARD_HEIGHT,
                CARD_WIDTH.min(area.width),
                CARD_HEIGHT.min(area.height),
            );
            let block = styles.panel(upload.filename.as_str(), i == view.carousel_index);
            let paragraph = Paragraph::new(Self::card_lines(app, view, upload, &styles))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, card);
        }
    }

    fn render_list(frame: &mut Frame, area: Rect, app: &App, view: &GalleryView, visible: &[&Upload]) {
        let styles = ThemedStyles::new(app.current_theme());
        let header = Row::new(vec!["Title", "File", "Sentiment", "Voice", "Uploaded"])
            .style(styles.accent_bold());
        let rows: Vec<Row> = visible
            .iter()
            .map(|upload| {
                let uploaded = upload
                    .created_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(upload.title.clone()),
                    Cell::from(upload.filename.clone()),
                    Cell::from(upload.sentiment.clone().unwrap_or_default())
                        .style(styles.sentiment(upload.sentiment.as_deref())),
                    Cell::from(if upload.audio().is_some() { "yes" } else { "" }),
                    Cell::from(uploaded),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Length(12),
                Constraint::Length(6),
                Constraint::Length(11),
            ],
        )
        .header(header)
        .row_highlight_style(styles.selection())
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(view.carousel_index));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_rolling(frame: &mut Frame, area: Rect, app: &App, view: &GalleryView, visible: &[&Upload]) {
        let styles = ThemedStyles::new(app.current_theme());
        let Some(upload) = visible.get(view.carousel_index) else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);

        let mut lines = Self::card_lines(app, view, upload, &styles);
        lines.insert(1, Line::from(Span::styled(upload.filename.as_str(), styles.dimmed())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(upload.description.as_str(), styles.text())));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let (prev, next) = if app.unicode { ("◀", "▶") } else { ("<", ">") };
        let position = format!(
            "{}  {}/{}  {}",
            prev,
            view.carousel_index + 1,
            visible.len(),
            next
        );
        frame.render_widget(
            Paragraph::new(Span::styled(position, styles.keybind())).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

pub struct ConfirmPrompt;

impl ConfirmPrompt {
    pub fn render(frame: &mut Frame, screen: Rect, app: &App) {
        let theme = app.current_theme();
        let styles = ThemedStyles::new(theme);
        let gallery = app.gallery.view();
        let title = app
            .pending_delete
            .as_deref()
            .and_then(|id| gallery.uploads.iter().find(|upload| upload.id == id))
            .map(|upload| upload.title.clone())
            .unwrap_or_else(|| "this upload".to_string());

        let area = MainLayout::centered(screen, 48, 5);
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(" Delete upload ")
            .borders(Borders::ALL)
            .border_style(ratatui::style::Style::default().fg(theme.error()).add_modifier(Modifier::BOLD))
            .style(styles.surface());
        let body = vec![
            Line::from(Span::styled(format!("Delete \"{}\"?", title), styles.text())),
            Line::from(vec![
                Span::styled("y", styles.keybind()),
                Span::styled(" delete   ", styles.dimmed()),
                Span::styled("n", styles.keybind()),
                Span::styled(" keep", styles.dimmed()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(body).block(block).alignment(Alignment::Center),
            area,
        );
    }
}
