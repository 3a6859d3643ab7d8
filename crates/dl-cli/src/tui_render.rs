#![cfg(not(coverage))]

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::chat_state::{ChatState, Speaker};
use crate::PlayCommand;

const ELLIPSIS: &str = "…";

pub(crate) fn render_chat(frame: &mut Frame<'_>, ui: &ChatState, title: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let background = Style::default().bg(Color::Black);
    let content_width = (rows[0].width as usize).saturating_sub(2).max(8);
    let visible_rows = (rows[0].height as usize).saturating_sub(2).max(1);

    let mut history_rows: Vec<Line<'_>> = Vec::new();
    for line in &ui.history {
        let style = match line.speaker {
            Speaker::System => background.fg(Color::Green),
            Speaker::User => background.fg(Color::White),
        };
        let prefix = match line.speaker {
            Speaker::System => "",
            Speaker::User => "> ",
        };
        for row in wrap_line_to_width(&format!("{}{}", prefix, line.text), content_width) {
            history_rows.push(Line::from(Span::styled(row, style)));
        }
    }
    if history_rows.len() > visible_rows {
        history_rows.drain(..history_rows.len() - visible_rows);
    }
    let history = Paragraph::new(history_rows).style(background).block(
        Block::default()
            .borders(Borders::ALL)
            .title(truncate_to_width(title, content_width)),
    );
    frame.render_widget(history, rows[0]);

    let input_title = match &ui.waiting_call {
        Some(name) => format!("result for {}", name),
        None => "response".to_string(),
    };
    let input = Paragraph::new(Line::from(Span::styled(
        truncate_to_width(&format!("{}_", ui.input_buffer), content_width),
        background.fg(Color::White),
    )))
    .style(background)
    .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, rows[1]);

    let status_text = if ui.help_visible {
        format!("{} | enter submit | ctrl-r restart | esc quit", PlayCommand::HELP_TEXT)
    } else {
        format!("status: {}", ui.status)
    };
    let status = Paragraph::new(Line::from(Span::styled(
        truncate_to_width(&status_text, rows[2].width as usize),
        Style::default().fg(Color::Yellow),
    )));
    frame.render_widget(status, rows[2]);
}

fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

fn wrap_line_to_width(value: &str, width: usize) -> Vec<String> {
    let chars = value.chars().collect::<Vec<_>>();
    if width == 0 || chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tui_render_tests {
    use super::*;
    use crate::chat_state::ChatLine;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn truncate_and_wrap_respect_width() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
        assert_eq!(
            wrap_line_to_width("abcdefg", 3),
            vec!["abc".to_string(), "def".to_string(), "g".to_string()]
        );
        assert_eq!(wrap_line_to_width("", 3), vec![String::new()]);
    }

    #[test]
    fn renders_history_input_and_status() {
        let mut ui = ChatState::new();
        ui.history.push(ChatLine {
            speaker: Speaker::System,
            text: "Name?".to_string(),
        });
        ui.input_buffer = "Ada".to_string();
        let mut terminal =
            Terminal::new(TestBackend::new(40, 10)).expect("terminal should build");
        terminal
            .draw(|frame| render_chat(frame, &ui, "greeting.dlg"))
            .expect("draw should pass");
        let screen = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(screen.contains("Name?"));
        assert!(screen.contains("Ada_"));
        assert!(screen.contains("status: ready"));
    }
}
