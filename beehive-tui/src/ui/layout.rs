use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::{App, Screen};
use crate::events::InputMode;
use crate::ui::views::{
    AnalyticsView, ChatPanel, ConfirmPrompt, DashboardPanel, EditorOverlay, GalleryPanel,
    NotificationsDropdown, UploadFormPanel, UsersPanel,
};
use crate::ui::widgets::{Footer, Header};

pub struct MainLayout;

impl MainLayout {
    pub fn render(frame: &mut Frame, app: &App) {
        let theme = app.current_theme();
        let size = frame.area();

        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(theme.background())
                    .fg(theme.foreground()),
            ),
            size,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(size);

        Header::render(frame, chunks[0], app);

        let content = chunks[1].inner(Margin::new(1, 0));
        match &app.current {
            Screen::Chat => ChatPanel::render(frame, content, app),
            Screen::Users => {
                let columns = Self::two_columns(content, 35);
                UsersPanel::render(frame, columns[0], app);
                ChatPanel::render(frame, columns[1], app);
            }
            Screen::Gallery | Screen::UserUploads(_) => GalleryPanel::render(frame, content, app),
            Screen::Upload => UploadFormPanel::render(frame, content, app),
            Screen::Dashboard => DashboardPanel::render(frame, content, app),
            Screen::Analytics => AnalyticsView::render(frame, content, app),
        }

        Footer::render(frame, chunks[2], app);

        if app.bell.view().open {
            NotificationsDropdown::render(frame, size, app);
        }
        if let Some(editor) = &app.editor {
            EditorOverlay::render(frame, size, app, editor);
        }
        if app.input_mode() == InputMode::Confirm {
            ConfirmPrompt::render(frame, size, app);
        }

        app.toasts.render(frame, size, theme, app.unicode);
    }

    pub fn two_columns(area: Rect, left_percent: u16) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(left_percent),
                Constraint::Percentage(100 - left_percent),
            ])
            .split(area)
            .to_vec()
    }

    /// A rectangle of the given size centred in `area`, shrunk to fit.
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}
