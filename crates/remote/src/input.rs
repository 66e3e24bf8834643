use std::io;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use discobot_protocol::Direction;
use futures::{Stream, StreamExt as _};

use crate::dispatch::PortWriter;
use crate::display;
use crate::error::Result;
use crate::session::Session;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Toggle(Direction),
    ReleaseAll,
    Leave,
}

/// The arrow keys and w/a/s/d both toggle directions, so either hand works.
pub fn action_for_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(Action::Leave),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') => Action::Toggle(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Action::Toggle(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Action::Toggle(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Action::Toggle(Direction::Right),
        KeyCode::Char(' ') => Action::ReleaseAll,
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => Action::Leave,
        _ => return None,
    };
    Some(action)
}

fn redraw<W: PortWriter>(session: &Session<W>) {
    eprint!("\r{}    ", display::status_line(session.signals()));
}

/// Drives the robot from key presses until the user leaves. Everything is
/// released when leaving, so the robot doesn't keep going on its own.
///
/// This expects the terminal to be in raw mode.
pub async fn drive<W: PortWriter>(
    events: &mut (impl Stream<Item = io::Result<Event>> + Unpin),
    session: &mut Session<W>,
) -> Result<()> {
    redraw(session);
    while let Some(ev) = events.next().await.transpose()? {
        let Event::Key(key) = ev else {
            continue;
        };
        let Some(action) = action_for_key(&key) else {
            continue;
        };
        let sent = match action {
            Action::Toggle(d) => session.toggle(d).map(|_| ()),
            Action::ReleaseAll => session.release_all(),
            Action::Leave => break,
        };
        if let Err(e) = sent {
            eprint!("\r\nerror: {e}\r\n");
        }
        redraw(session);
    }

    if let Err(e) = session.release_all() {
        eprint!("\r\nerror: {e}");
    }
    redraw(session);
    eprint!("\r\n");
    Ok(())
}
