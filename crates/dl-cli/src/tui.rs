use dl_core::DialogueError;

use crate::PlaySession;

#[cfg(coverage)]
pub(crate) fn run_chat_window(
    session: &mut PlaySession,
    _title: &str,
    log_level: Option<&str>,
) -> Result<i32, DialogueError> {
    crate::init_logging(log_level);
    crate::run_line_mode(session)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;

    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use dl_core::DialogueError;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;

    use crate::chat_state::ChatState;
    use crate::tui_render::render_chat;
    use crate::{map_tui_io, PlaySession};

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, DialogueError> {
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_tui_io)?;
            Ok(Self { terminal })
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    pub(super) fn run_chat_window(
        session: &mut PlaySession,
        title: &str,
    ) -> Result<i32, DialogueError> {
        let mut terminal = TuiTerminal::new()?;
        let mut ui = ChatState::new();
        let output = session.output()?;
        let diagnostics = session.take_diagnostics();
        ui.apply_output(output, diagnostics);

        loop {
            terminal
                .terminal
                .draw(|frame| render_chat(frame, &ui, title))
                .map_err(map_tui_io)?;

            let Event::Key(key) = event::read().map_err(map_tui_io)? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let control = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if control => break,
                KeyCode::Char('r') if control => ui.restart(session),
                KeyCode::Enter => {
                    if ui.submit(session) {
                        break;
                    }
                }
                KeyCode::Backspace => {
                    ui.input_buffer.pop();
                }
                KeyCode::Char(ch) if !control && !key.modifiers.contains(KeyModifiers::ALT) => {
                    ui.input_buffer.push(ch);
                }
                _ => {}
            }
        }

        Ok(0)
    }
}

/// Full-screen chat when both ends are a terminal, line mode otherwise.
/// The chat window reports diagnostics in its status line, so only line
/// mode installs a log subscriber.
#[cfg(not(coverage))]
pub(crate) fn run_chat_window(
    session: &mut PlaySession,
    title: &str,
    log_level: Option<&str>,
) -> Result<i32, DialogueError> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        crate::init_logging(log_level);
        return crate::run_line_mode(session);
    }
    rich::run_chat_window(session, title)
}
