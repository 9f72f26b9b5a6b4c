use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    GoToView(usize),
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    Refresh,
    ToggleTheme,
    ToggleBell,
    Compose,
    Search,
    ToggleMode,
    ToggleAudio,
    CycleFilter,
    Edit,
    Delete,
    OpenUploads,
    Input(char),
    Backspace,
    NextField,
    Submit,
    CancelInput,
    Confirm(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keystrokes go into a text field.
    Insert,
    /// A yes/no question is on screen.
    Confirm,
}

pub struct EventHandler {
    input_mode: InputMode,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            input_mode: InputMode::Normal,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode_key(key),
            InputMode::Insert => self.handle_insert_mode_key(key),
            InputMode::Confirm => self.handle_confirm_mode_key(key),
        }
    }

    fn handle_normal_mode_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Tab => Some(Action::NextView),
            KeyCode::BackTab => Some(Action::PrevView),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::Left),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::Right),
            KeyCode::Enter => Some(Action::Select),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('t') => Some(Action::ToggleTheme),
            KeyCode::Char('n') => Some(Action::ToggleBell),
            KeyCode::Char('v') => Some(Action::ToggleMode),
            KeyCode::Char('a') => Some(Action::ToggleAudio),
            KeyCode::Char('f') => Some(Action::CycleFilter),
            KeyCode::Char('e') => Some(Action::Edit),
            KeyCode::Char('d') => Some(Action::Delete),
            KeyCode::Char('u') => Some(Action::OpenUploads),
            KeyCode::Char('i') => {
                self.input_mode = InputMode::Insert;
                Some(Action::Compose)
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Insert;
                Some(Action::Search)
            }
            KeyCode::Char(c @ '1'..='9') => Some(Action::GoToView(c as usize - '1' as usize)),
            _ => None,
        }
    }

    fn handle_insert_mode_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                Some(Action::CancelInput)
            }
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab => Some(Action::NextField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        }
    }

    fn handle_confirm_mode_key(&mut self, key: KeyEvent) -> Option<Action> {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return None,
        };
        self.input_mode = InputMode::Normal;
        Some(Action::Confirm(answer))
    }
}
