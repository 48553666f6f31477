use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::session::Session;

/// Drive the session until it closes; returns the process exit code.
pub fn run(session: Session) -> Result<i32> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;

    let code = event_loop(session);

    // Teardown is best effort: in dmenu mode stdout is already closed by
    // the time we get here.
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);

    code
}

fn event_loop(mut session: Session) -> Result<i32> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        session.refresh();
        session.preview_selected();
        terminal.draw(|frame| draw(frame, &session))?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Ok(0),
            KeyCode::Char('c') if ctrl => return Ok(0),
            KeyCode::Enter => {
                if let Some(code) = session.commit() {
                    return Ok(code);
                }
            }
            KeyCode::Tab => session.next_mode(),
            KeyCode::BackTab => session.previous_mode(),
            KeyCode::Up => session.move_selection(-1),
            KeyCode::Down => session.move_selection(1),
            KeyCode::Backspace => session.pop_char(),
            KeyCode::Char('v') if ctrl => {
                if let Some(display) = session.selected_display() {
                    session.set_query(display);
                }
            }
            KeyCode::Char(ch) if !ctrl => session.push_char(ch),
            _ => {}
        }
    }
}

fn draw(frame: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.area());

    let input = Line::from(vec![
        Span::styled(
            format!("{}: ", session.mode_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(session.query()),
    ]);
    frame.render_widget(Paragraph::new(input), chunks[0]);

    let items: Vec<ListItem> = session.displays().map(ListItem::new).collect();
    let results = List::new(items).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Black)
            .bg(Color::Green),
    );

    let mut state = ListState::default();
    state.select((session.result_count() > 0).then_some(session.selected()));
    frame.render_stateful_widget(results, chunks[1], &mut state);
}
