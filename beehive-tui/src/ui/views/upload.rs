use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use beehive_core::models::ALLOWED_EXTENSIONS;

use crate::app::{App, InputTarget};
use crate::forms::{FormField, UploadForm};
use crate::theme::ThemedStyles;
use crate::ui::layout::MainLayout;

fn render_form(frame: &mut Frame, area: Rect, app: &App, form: &UploadForm, active: bool) {
    let styles = ThemedStyles::new(app.current_theme());
    let fields = form.fields();
    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let focused = active && form.focused() == *field;
        let value = match field {
            FormField::Sentiment => format!("{}  (space to cycle)", form.sentiment),
            _ => form.value(*field),
        };
        let cursor = if focused && *field != FormField::Sentiment {
            "▏"
        } else {
            ""
        };
        let title = format!(" {} ", field.label());
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled(value, styles.text()),
            Span::styled(cursor, styles.accent_bold()),
        ]))
        .block(styles.panel(&title, focused));
        frame.render_widget(paragraph, rows[i]);
    }
}

pub struct UploadFormPanel;

impl UploadFormPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(app.current_theme());
        let active = app.input_target == Some(InputTarget::UploadForm);
        let block = styles.panel(" New Upload ", active);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(10)])
            .split(inner);
        let hint = Paragraph::new(vec![
            Line::from(Span::styled(
                "Files are comma separated paths; the voice note is optional.",
                styles.dimmed(),
            )),
            Line::from(Span::styled(
                format!("Allowed: {}", ALLOWED_EXTENSIONS.join(", ")),
                styles.dimmed(),
            )),
        ]);
        frame.render_widget(hint, chunks[0]);
        render_form(frame, chunks[1], app, &app.upload_form, active);
    }
}

pub struct EditorOverlay;

impl EditorOverlay {
    pub fn render(frame: &mut Frame, screen: Rect, app: &App, form: &UploadForm) {
        let styles = ThemedStyles::new(app.current_theme());
        let area = MainLayout::centered(screen, 60, 13);
        frame.render_widget(Clear, area);
        let block = styles.panel(" Edit Upload ", true);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_form(frame, inner, app, form, true);
    }
}
