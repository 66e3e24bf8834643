use crossterm::style::{style, Stylize as _};
use discobot_protocol::{resolve, Direction, SignalState};

fn arrow(d: Direction) -> &'static str {
    match d {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Left => "◀",
        Direction::Right => "▶",
    }
}

/// The four arrows, with the held ones drawn inverted.
pub fn pad(signals: &SignalState) -> String {
    let arrows: Vec<String> = [Direction::Left, Direction::Up, Direction::Down, Direction::Right]
        .into_iter()
        .map(|d| {
            if signals.is_set(d) {
                format!("{}", style(format!(" {} ", arrow(d))).reverse())
            } else {
                format!(" {} ", arrow(d))
            }
        })
        .collect();
    arrows.join("")
}

pub fn status_line(signals: &SignalState) -> String {
    format!("{}  {}", pad(signals), resolve(signals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_arrows_stand_out() {
        let idle = pad(&SignalState::new());
        assert_eq!(idle, " ◀  ▲  ▼  ▶ ");
        assert_ne!(pad(&SignalState::from_held([Direction::Up])), idle);
    }

    #[test]
    fn status_names_the_command() {
        let signals = SignalState::from_held([Direction::Down, Direction::Right]);
        assert!(status_line(&signals).ends_with("BACK_RIGHT (5)"));
        assert!(status_line(&SignalState::new()).ends_with("STOP (8)"));
    }
}
