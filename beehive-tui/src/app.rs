use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

use beehive_core::views::conversation_key;
use beehive_core::{
    Ack, BeehiveConfig, BeehiveResult, ChatUsersFetcher, ChatUsersView, ChatView,
    DashboardFetcher, DashboardView, GalleryView, MessagesFetcher, NotificationView,
    NotificationsFetcher, Page, PollStatus, Resolution, RouteTable, Sentiment, SentimentFilter,
    Session, SubmitError, Synchronizer, UploadScope, UploadsFetcher, Wiring, CHAT_USERS_KEY,
    DASHBOARD_KEY, NOTIFICATIONS_KEY,
};

use crate::events::{Action, EventHandler, InputMode};
use crate::forms::UploadForm;
use crate::theme::{Theme, ThemeManager};
use crate::ui::layout::MainLayout;
use crate::ui::widgets::ToastManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Gallery,
    Upload,
    Dashboard,
    Users,
    Analytics,
    UserUploads(String),
}

impl Screen {
    pub fn for_page(page: Page) -> Option<Screen> {
        match page {
            Page::Home => Some(Screen::Chat),
            Page::Gallery => Some(Screen::Gallery),
            Page::Upload => Some(Screen::Upload),
            Page::AdminDashboard => Some(Screen::Dashboard),
            Page::AdminUsers => Some(Screen::Users),
            Page::AdminAnalytics => Some(Screen::Analytics),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Chat => "Chat",
            Screen::Gallery => "Gallery",
            Screen::Upload => "Upload",
            Screen::Dashboard => "Dashboard",
            Screen::Users => "Users",
            Screen::Analytics => "Analytics",
            Screen::UserUploads(_) => "User Uploads",
        }
    }
}

/// Where typed characters go while the handler is in insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Draft,
    Search,
    UploadForm,
    Editor,
}

pub struct App {
    pub should_quit: bool,
    pub session: Session,
    pub routes: RouteTable,
    pub tabs: Vec<Screen>,
    pub current: Screen,
    pub theme_manager: ThemeManager,
    pub event_handler: EventHandler,
    pub toasts: ToastManager,
    pub status_message: Option<String>,
    pub input_target: Option<InputTarget>,
    pub upload_form: UploadForm,
    pub editor: Option<UploadForm>,
    pub pending_delete: Option<String>,
    pub unicode: bool,
    tick_rate: Duration,

    pub chat: Synchronizer<MessagesFetcher, ChatView>,
    pub contacts: Synchronizer<ChatUsersFetcher, ChatUsersView>,
    pub bell: Synchronizer<NotificationsFetcher, NotificationView>,
    pub gallery: Synchronizer<UploadsFetcher, GalleryView>,
    pub dashboard: Synchronizer<DashboardFetcher, DashboardView>,
}

impl App {
    pub fn new(config: &BeehiveConfig, wiring: &Wiring) -> Self {
        let session = wiring.session.clone();
        let routes = RouteTable::standard();
        let tabs: Vec<Screen> = routes
            .nav_for(session.role())
            .into_iter()
            .filter_map(|route| Screen::for_page(route.page))
            .collect();
        let current = tabs.first().cloned().unwrap_or(Screen::Chat);
        let scope = if session.is_admin() {
            UploadScope::Admin
        } else {
            UploadScope::Own
        };

        Self {
            should_quit: false,
            status_message: Some(format!(
                "Signed in as {} ({})",
                session.display_name(),
                session.role()
            )),
            session,
            routes,
            tabs,
            current,
            theme_manager: ThemeManager::new(),
            event_handler: EventHandler::new(),
            toasts: ToastManager::new(),
            input_target: None,
            upload_form: UploadForm::default(),
            editor: None,
            pending_delete: None,
            unicode: config.tui.unicode_enabled,
            tick_rate: Duration::from_millis(config.tui.tick_rate_ms),
            chat: wiring.chat(),
            contacts: wiring.chat_users(),
            bell: wiring.notifications(),
            gallery: wiring.uploads(scope),
            dashboard: wiring.dashboard(),
        }
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        if self.session.is_admin() {
            self.bell.mount(NOTIFICATIONS_KEY).await?;
        }
        let first = self.current.clone();
        self.enter(&first).await?;

        loop {
            self.toasts.cleanup();

            terminal.draw(|frame| {
                MainLayout::render(frame, self);
            })?;

            if event::poll(self.tick_rate)? {
                let evt = event::read()?;
                if let Some(action) = self.event_handler.handle_event(evt) {
                    self.execute_action(action).await;
                }
            }

            if self.should_quit {
                break;
            }

            // The contact list auto-selects its first user once it loads.
            if self.current == Screen::Users {
                if let Err(e) = self.sync_conversation().await {
                    warn!(error = %e, "Could not follow the selected conversation");
                }
            }
        }

        let current = self.current.clone();
        self.leave(&current).await;
        self.bell.unmount().await;
        info!("TUI closed");
        Ok(())
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.theme_manager.current_theme()
    }

    pub fn input_mode(&self) -> InputMode {
        self.event_handler.input_mode()
    }

    /// Poll status of the resource the current screen is showing.
    pub fn current_status(&self) -> Option<PollStatus> {
        match self.current {
            Screen::Chat => Some(self.chat.status()),
            Screen::Users => Some(self.contacts.status()),
            Screen::Gallery | Screen::UserUploads(_) => Some(self.gallery.status()),
            Screen::Dashboard | Screen::Analytics => Some(self.dashboard.status()),
            Screen::Upload => None,
        }
    }

    async fn enter(&mut self, screen: &Screen) -> BeehiveResult<()> {
        debug!(screen = screen.name(), "Entering screen");
        match screen {
            Screen::Chat => {
                let view = self.chat.view();
                if let Some(endpoint) = view.endpoint {
                    self.chat
                        .mount(conversation_key(&endpoint, &self.session))
                        .await?;
                }
            }
            Screen::Users => {
                self.contacts.mount(CHAT_USERS_KEY).await?;
                self.sync_conversation().await?;
            }
            Screen::Gallery => {
                let owner = self.session.user_id().to_string();
                self.gallery.mount(owner).await?;
            }
            Screen::UserUploads(user_id) => self.gallery.mount(user_id.as_str()).await?,
            Screen::Dashboard | Screen::Analytics => self.dashboard.mount(DASHBOARD_KEY).await?,
            Screen::Upload => {}
        }
        Ok(())
    }

    async fn leave(&mut self, screen: &Screen) {
        match screen {
            Screen::Chat => self.chat.unmount().await,
            Screen::Users => {
                self.contacts.unmount().await;
                self.chat.unmount().await;
            }
            Screen::Gallery | Screen::UserUploads(_) => self.gallery.unmount().await,
            Screen::Dashboard | Screen::Analytics => self.dashboard.unmount().await,
            Screen::Upload => {}
        }
    }

    pub async fn switch_to(&mut self, screen: Screen) {
        if screen == self.current {
            return;
        }
        let previous = std::mem::replace(&mut self.current, screen.clone());
        self.leave(&previous).await;
        self.input_target = None;
        self.event_handler.set_input_mode(InputMode::Normal);
        if let Err(e) = self.enter(&screen).await {
            warn!(screen = screen.name(), error = %e, "Could not start polling");
            self.toasts.error(format!("{}: {}", screen.name(), e));
        }
    }

    /// Points the chat drawer at the contact selected in the users list.
    async fn sync_conversation(&mut self) -> BeehiveResult<()> {
        let Some(endpoint) = self.contacts.view().endpoint() else {
            return Ok(());
        };
        let key = conversation_key(&endpoint, &self.session);
        if self.chat.scheduler().current_key().await.as_ref() == Some(&key) {
            return Ok(());
        }
        self.chat.update_view(|view| view.select(endpoint));
        self.chat.mount(key).await
    }

    /// Navigates by path, honouring the same role checks as the navigation bar.
    pub async fn navigate(&mut self, path: &str) {
        match self.routes.resolve(path, Some(&self.session)) {
            Resolution::Render { page, params } => {
                let screen = match (page, params.get("id")) {
                    (Page::AdminUserUploads, Some(id)) => Some(Screen::UserUploads(id.clone())),
                    (page, _) => Screen::for_page(page),
                };
                match screen {
                    Some(screen) => self.switch_to(screen).await,
                    None => self.toasts.warning(format!("{} has no screen here", page.title())),
                }
            }
            Resolution::Redirect(to) => self.toasts.warning(format!("Redirected to {}", to)),
            Resolution::NotFound => self.toasts.warning(format!("No route for {}", path)),
        }
    }

    fn tab_index(&self) -> Option<usize> {
        self.tabs.iter().position(|tab| *tab == self.current)
    }

    async fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextView | Action::PrevView => {
                if self.tabs.is_empty() {
                    return;
                }
                let len = self.tabs.len();
                let index = self.tab_index().unwrap_or(0);
                let next = if action == Action::NextView {
                    (index + 1) % len
                } else {
                    (index + len - 1) % len
                };
                self.switch_to(self.tabs[next].clone()).await;
            }
            Action::GoToView(index) => {
                if let Some(screen) = self.tabs.get(index).cloned() {
                    self.switch_to(screen).await;
                }
            }
            Action::Up => self.move_selection(-1).await,
            Action::Down => self.move_selection(1).await,
            Action::Left => self.gallery.update_view(|view| view.previous()),
            Action::Right => self.gallery.update_view(|view| view.next()),
            Action::Select => self.handle_select().await,
            Action::Back => self.handle_back().await,
            Action::Refresh => self.refresh_current().await,
            Action::ToggleTheme => {
                self.theme_manager.cycle_theme();
                self.status_message =
                    Some(format!("Theme: {}", self.theme_manager.current_theme_name()));
            }
            Action::ToggleBell => self.toggle_bell().await,
            Action::Compose => self.begin_input(self.compose_target()),
            Action::Search => {
                let target = (self.current == Screen::Users).then_some(InputTarget::Search);
                self.begin_input(target);
            }
            Action::ToggleMode if self.on_gallery() => {
                self.gallery.update_view(|view| view.toggle_mode())
            }
            Action::ToggleAudio if self.on_gallery() => self.toggle_audio(),
            Action::CycleFilter if self.on_gallery() => self.cycle_filter(),
            Action::Edit if self.on_gallery() => self.begin_edit(),
            Action::Delete if self.on_gallery() => self.begin_delete(),
            Action::OpenUploads => self.open_selected_uploads().await,
            Action::Input(c) => self.type_char(c),
            Action::Backspace => self.backspace(),
            Action::NextField => self.next_field(),
            Action::Submit => self.submit_input().await,
            Action::CancelInput => self.cancel_input(),
            Action::Confirm(answer) => self.confirm_delete(answer).await,
            _ => {}
        }
    }

    fn on_gallery(&self) -> bool {
        matches!(self.current, Screen::Gallery | Screen::UserUploads(_))
    }

    async fn move_selection(&mut self, delta: isize) {
        match self.current {
            Screen::Chat => self.scroll_chat(delta),
            Screen::Users => {
                self.contacts.update_view(|view| view.select_offset(delta));
                if let Err(e) = self.sync_conversation().await {
                    self.toasts.error(e.to_string());
                }
            }
            Screen::Gallery | Screen::UserUploads(_) => self.gallery.update_view(|view| {
                if delta < 0 {
                    view.previous()
                } else {
                    view.next()
                }
            }),
            Screen::Dashboard => self.dashboard.update_view(|view| view.select_next()),
            _ => {}
        }
    }

    fn scroll_chat(&self, delta: isize) {
        self.chat.update_view(|view| {
            if delta < 0 {
                view.scroll_up(1)
            } else {
                view.scroll_down(1)
            }
        });
    }

    async fn handle_select(&mut self) {
        match self.current {
            Screen::Users => self.open_selected_uploads().await,
            Screen::Gallery | Screen::UserUploads(_) => self.toggle_audio(),
            _ => {}
        }
    }

    async fn handle_back(&mut self) {
        if self.bell.view().open {
            self.bell.close_dropdown();
        } else if matches!(self.current, Screen::UserUploads(_)) {
            self.switch_to(Screen::Users).await;
        }
    }

    async fn refresh_current(&mut self) {
        let refreshed = match self.current {
            Screen::Chat => self.chat.scheduler().refresh_now().await,
            Screen::Users => {
                let contacts = self.contacts.scheduler().refresh_now().await;
                let chat = self.chat.scheduler().refresh_now().await;
                contacts || chat
            }
            Screen::Gallery | Screen::UserUploads(_) => {
                self.gallery.scheduler().refresh_now().await
            }
            Screen::Dashboard | Screen::Analytics => {
                self.dashboard.scheduler().refresh_now().await
            }
            Screen::Upload => false,
        };
        self.status_message = Some(if refreshed {
            "Refreshing...".to_string()
        } else {
            "Nothing to refresh".to_string()
        });
    }

    async fn toggle_bell(&mut self) {
        if !self.session.is_admin() {
            return;
        }
        if self.bell.view().open {
            self.bell.close_dropdown();
            return;
        }
        match self.bell.open_dropdown().await {
            Ok(Ack::NotificationsSeen(seen)) if seen.is_empty() => {
                self.status_message = Some("No new notifications".to_string())
            }
            Ok(_) => {}
            Err(e) => self.report_failure("Notifications", &e),
        }
    }

    fn compose_target(&self) -> Option<InputTarget> {
        match self.current {
            Screen::Chat | Screen::Users if self.chat.view().can_send() => {
                Some(InputTarget::Draft)
            }
            Screen::Upload => Some(InputTarget::UploadForm),
            _ => None,
        }
    }

    fn begin_input(&mut self, target: Option<InputTarget>) {
        self.input_target = target;
        let mode = if target.is_some() {
            InputMode::Insert
        } else {
            InputMode::Normal
        };
        self.event_handler.set_input_mode(mode);
    }

    fn toggle_audio(&mut self) {
        let Some(id) = self
            .gallery
            .view()
            .current()
            .filter(|upload| upload.audio().is_some())
            .map(|upload| upload.id.clone())
        else {
            return;
        };
        self.gallery.update_view(|view| view.toggle_audio(&id));
    }

    /// Steps through no filter, then each sentiment on its own.
    fn cycle_filter(&mut self) {
        let current = self.gallery.view().filter;
        let position = current.tags.first().and_then(|tag| {
            Sentiment::ALL
                .iter()
                .position(|sentiment| sentiment.as_str() == tag)
        });
        let next = match position {
            None => SentimentFilter::any([Sentiment::ALL[0].as_str()]),
            Some(i) if i + 1 < Sentiment::ALL.len() => {
                SentimentFilter::any([Sentiment::ALL[i + 1].as_str()])
            }
            Some(_) => SentimentFilter::default(),
        };
        self.status_message = Some(match next.tags.first() {
            Some(tag) => format!("Showing {} uploads", tag),
            None => "Showing all uploads".to_string(),
        });
        self.gallery.update_view(|view| view.set_filter(next));
    }

    fn begin_edit(&mut self) {
        if let Some(upload) = self.gallery.view().current() {
            self.editor = Some(UploadForm::for_edit(upload));
            self.begin_input(Some(InputTarget::Editor));
        }
    }

    fn begin_delete(&mut self) {
        if let Some(upload) = self.gallery.view().current() {
            self.pending_delete = Some(upload.id.clone());
            self.event_handler.set_input_mode(InputMode::Confirm);
        }
    }

    async fn confirm_delete(&mut self, confirmed: bool) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        match self
            .gallery
            .submit(beehive_core::Action::DeleteUpload { id })
            .await
        {
            Ok(_) => self.toasts.success("Upload deleted"),
            Err(e) => self.report_failure("Delete", &e),
        }
    }

    async fn open_selected_uploads(&mut self) {
        if self.current != Screen::Users {
            return;
        }
        if let Some(id) = self.contacts.view().selected {
            self.navigate(&format!("/admin/users/{}/uploads", id)).await;
        }
    }

    fn type_char(&mut self, c: char) {
        match self.input_target {
            Some(InputTarget::Draft) => self.chat.update_view(|view| view.draft.push(c)),
            Some(InputTarget::Search) => {
                self.contacts.update_view(|view| view.search.push(c))
            }
            Some(InputTarget::UploadForm) => self.upload_form.input(c),
            Some(InputTarget::Editor) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.input(c);
                }
            }
            None => {}
        }
    }

    fn backspace(&mut self) {
        match self.input_target {
            Some(InputTarget::Draft) => self.chat.update_view(|view| {
                view.draft.pop();
            }),
            Some(InputTarget::Search) => self.contacts.update_view(|view| {
                view.search.pop();
            }),
            Some(InputTarget::UploadForm) => self.upload_form.backspace(),
            Some(InputTarget::Editor) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.backspace();
                }
            }
            None => {}
        }
    }

    fn next_field(&mut self) {
        match self.input_target {
            Some(InputTarget::UploadForm) => self.upload_form.next_field(),
            Some(InputTarget::Editor) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.next_field();
                }
            }
            _ => {}
        }
    }

    fn cancel_input(&mut self) {
        if self.input_target == Some(InputTarget::Editor) {
            self.editor = None;
        }
        self.input_target = None;
    }

    async fn submit_input(&mut self) {
        match self.input_target {
            Some(InputTarget::Draft) => self.send_draft().await,
            Some(InputTarget::Search) => {
                self.begin_input(None);
                if let Err(e) = self.sync_conversation().await {
                    self.toasts.error(e.to_string());
                }
            }
            Some(InputTarget::UploadForm) => {
                let action = self.upload_form.to_action();
                match self.gallery.submit(action).await {
                    Ok(Ack::UploadCreated { message }) => {
                        self.toasts.success(message);
                        self.upload_form = UploadForm::default();
                        self.begin_input(None);
                    }
                    Ok(_) => self.begin_input(None),
                    Err(e) => self.report_failure("Upload", &e),
                }
            }
            Some(InputTarget::Editor) => {
                let Some(action) = self.editor.as_ref().map(UploadForm::to_action) else {
                    return;
                };
                match self.gallery.submit(action).await {
                    Ok(_) => {
                        self.toasts.success("Upload updated");
                        self.editor = None;
                        self.begin_input(None);
                    }
                    Err(e) => self.report_failure("Edit", &e),
                }
            }
            None => {}
        }
    }

    /// The draft stays in place when the send fails so it can be retried.
    async fn send_draft(&mut self) {
        let Some(action) = self.chat.view().send_action() else {
            self.toasts.warning("Pick a conversation first");
            return;
        };
        match self.chat.submit(action).await {
            Ok(_) => self.status_message = Some("Message sent".to_string()),
            Err(e) => self.report_failure("Send", &e),
        }
    }

    fn report_failure(&mut self, what: &str, error: &SubmitError) {
        if error.is_precondition() {
            self.toasts.warning(format!("{}: {}", what, error));
        } else {
            self.toasts.error(format!("{} failed: {}", what, error));
        }
    }
}
