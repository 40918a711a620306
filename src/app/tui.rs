// app/tui.rs
// Terminal form for entering connection details and running the export

use crate::config::ConnectionConfig;
use crossterm::event::{self, Event, KeyCode};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::io;
pub use super::tui_export::tui_export_flow;

#[derive(Debug, PartialEq)]
pub enum TuiStep {
    Welcome,
    EnterHost,
    EnterPort,
    EnterDbName,
    EnterUsername,
    EnterPassword,
    Confirm,
    Progress,
    Done(String),
}

#[derive(Debug)]
pub struct TuiState {
    pub step: TuiStep,
    pub host: String,
    pub port: String,
    pub dbname: String,
    pub username: String,
    pub password: String,
    pub input_buffer: String,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            step: TuiStep::Welcome,
            host: String::new(),
            port: String::new(),
            dbname: String::new(),
            username: String::new(),
            password: String::new(),
            input_buffer: String::new(),
        }
    }
}

/// What to do after a key press.
#[derive(Debug, PartialEq)]
pub enum TuiAction {
    Continue,
    Export,
    Quit,
}

pub async fn run_tui() -> anyhow::Result<()> {
    // Clear the terminal before starting TUI
    crossterm::execute!(io::stdout(), crossterm::terminal::Clear(crossterm::terminal::ClearType::All), crossterm::cursor::MoveTo(0, 0))?;
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    let result = event_loop(&mut stdout).await;
    crossterm::terminal::disable_raw_mode()?;
    result
}

async fn event_loop(stdout: &mut io::Stdout) -> anyhow::Result<()> {
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut state = TuiState::default();

    loop {
        terminal.draw(|f| draw(f, &state))?;

        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match state.handle_key(key.code) {
                    TuiAction::Continue => {}
                    TuiAction::Quit => return Ok(()),
                    TuiAction::Export => {
                        terminal.draw(|f| draw(f, &state))?;
                        state.step = match tui_export_flow(&state).await {
                            Ok(msg) => TuiStep::Done(msg),
                            Err(e) => TuiStep::Done(format!("Export failed: {:#}", e)),
                        };
                    }
                }
            }
        }
    }
}

fn draw(f: &mut Frame, state: &TuiState) {
    let size = f.size();
    let (title, body) = match &state.step {
        TuiStep::Welcome => ("pg-sqlite-export", "Welcome! Press any key to begin.".to_string()),
        TuiStep::EnterHost => ("Enter Host (default localhost)", state.input_buffer.clone()),
        TuiStep::EnterPort => ("Enter Port (default 5432)", state.input_buffer.clone()),
        TuiStep::EnterDbName => ("Enter Database Name", state.input_buffer.clone()),
        TuiStep::EnterUsername => ("Enter Username", state.input_buffer.clone()),
        TuiStep::EnterPassword => ("Enter Password (hidden)", "*".repeat(state.input_buffer.chars().count())),
        TuiStep::Confirm => (
            "Confirm",
            format!(
                "Host: {}\nPort: {}\nDatabase: {}\nUser: {}\nPress Enter to Export, Esc to go back",
                state.host, state.port, state.dbname, state.username
            ),
        ),
        TuiStep::Progress => ("Exporting...", "Please wait...".to_string()),
        TuiStep::Done(msg) => ("Done", format!("{}\nPress Enter or Esc to exit", msg)),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new(body).block(block), size);
}

impl TuiState {
    pub fn handle_key(&mut self, code: KeyCode) -> TuiAction {
        match self.step {
            TuiStep::Welcome => {
                self.step = TuiStep::EnterHost;
                TuiAction::Continue
            }
            TuiStep::EnterHost
            | TuiStep::EnterPort
            | TuiStep::EnterDbName
            | TuiStep::EnterUsername
            | TuiStep::EnterPassword => {
                match code {
                    KeyCode::Enter => self.commit_input(),
                    KeyCode::Char(c) => self.input_buffer.push(c),
                    KeyCode::Backspace => {
                        self.input_buffer.pop();
                    }
                    KeyCode::Esc => {
                        if self.step == TuiStep::EnterHost {
                            return TuiAction::Quit;
                        }
                        self.step_back();
                    }
                    _ => {}
                }
                TuiAction::Continue
            }
            TuiStep::Confirm => match code {
                KeyCode::Enter => {
                    self.step = TuiStep::Progress;
                    TuiAction::Export
                }
                KeyCode::Esc => {
                    self.step = TuiStep::EnterPassword;
                    TuiAction::Continue
                }
                _ => TuiAction::Continue,
            },
            TuiStep::Done(_) => match code {
                KeyCode::Esc | KeyCode::Enter => TuiAction::Quit,
                _ => TuiAction::Continue,
            },
            TuiStep::Progress => TuiAction::Continue,
        }
    }

    fn commit_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        self.step = match self.step {
            TuiStep::EnterHost => {
                self.host = value;
                TuiStep::EnterPort
            }
            TuiStep::EnterPort => {
                self.port = value;
                TuiStep::EnterDbName
            }
            TuiStep::EnterDbName => {
                self.dbname = value;
                TuiStep::EnterUsername
            }
            TuiStep::EnterUsername => {
                self.username = value;
                TuiStep::EnterPassword
            }
            TuiStep::EnterPassword => {
                self.password = value;
                TuiStep::Confirm
            }
            _ => return,
        };
    }

    fn step_back(&mut self) {
        self.input_buffer.clear();
        self.step = match self.step {
            TuiStep::EnterPort => TuiStep::EnterHost,
            TuiStep::EnterDbName => TuiStep::EnterPort,
            TuiStep::EnterUsername => TuiStep::EnterDbName,
            TuiStep::EnterPassword => TuiStep::EnterUsername,
            _ => return,
        };
    }

    /// Blank fields are left unset so defaults and validation apply.
    pub fn connection_config(&self) -> anyhow::Result<ConnectionConfig> {
        let field = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let port = match field(&self.port) {
            Some(p) => Some(p.parse::<u16>().map_err(|_| anyhow::anyhow!("Invalid port: {}", p))?),
            None => None,
        };
        Ok(ConnectionConfig {
            host: field(&self.host),
            port,
            dbname: field(&self.dbname),
            user: field(&self.username),
            // passwords are taken verbatim
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_line(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_key(KeyCode::Char(c));
        }
        state.handle_key(KeyCode::Enter);
    }

    #[test]
    fn walks_through_every_field_to_confirm() {
        let mut state = TuiState::default();
        state.handle_key(KeyCode::Char(' '));
        assert_eq!(state.step, TuiStep::EnterHost);
        type_line(&mut state, "localhost");
        type_line(&mut state, "5432");
        type_line(&mut state, "test");
        type_line(&mut state, "tester");
        type_line(&mut state, "pw");
        assert_eq!(state.step, TuiStep::Confirm);
        assert_eq!(state.handle_key(KeyCode::Enter), TuiAction::Export);
        assert_eq!(state.step, TuiStep::Progress);

        let config = state.connection_config().unwrap();
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(5432));
        assert_eq!(config.dbname.as_deref(), Some("test"));
        assert_eq!(config.user.as_deref(), Some("tester"));
        assert_eq!(config.password.as_deref(), Some("pw"));
    }

    #[test]
    fn backspace_and_escape_edit_the_form() {
        let mut state = TuiState { step: TuiStep::EnterHost, ..Default::default() };
        type_line(&mut state, "hostx");
        assert_eq!(state.step, TuiStep::EnterPort);
        state.handle_key(KeyCode::Esc);
        assert_eq!(state.step, TuiStep::EnterHost);

        state.handle_key(KeyCode::Char('a'));
        state.handle_key(KeyCode::Char('b'));
        state.handle_key(KeyCode::Backspace);
        assert_eq!(state.input_buffer, "a");
        assert_eq!(state.handle_key(KeyCode::Esc), TuiAction::Quit);
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let state = TuiState {
            dbname: "test".to_string(),
            username: "tester".to_string(),
            ..Default::default()
        };
        let params = state.connection_config().unwrap().resolve().unwrap();
        assert_eq!(params.host, "localhost");
        assert_eq!(params.port, 5432);
        assert_eq!(params.password, "");
    }

    #[test]
    fn invalid_port_is_reported() {
        let state = TuiState { port: "54x2".to_string(), ..Default::default() };
        assert!(state.connection_config().is_err());
    }

    #[test]
    fn done_screen_exits_on_enter() {
        let mut state = TuiState { step: TuiStep::Done("ok".to_string()), ..Default::default() };
        assert_eq!(state.handle_key(KeyCode::Char('x')), TuiAction::Continue);
        assert_eq!(state.handle_key(KeyCode::Enter), TuiAction::Quit);
    }
}
