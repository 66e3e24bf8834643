use serde::{Deserialize, Serialize};

use crate::{Direction, MotionCommand};

/// Which directions are currently held.
///
/// The only way to change a `SignalState` is [`SignalState::toggle`], which
/// never lets a direction and its opposite be held together.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

/// The outcome of a single [`SignalState::toggle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Toggle {
    pub direction: Direction,
    /// The value the toggle tried to give `direction`.
    pub pressed: bool,
    /// The toggle was undone because the opposite direction was already held.
    pub vetoed: bool,
    /// The command to send, if any. Vetoed toggles don't send anything.
    pub command: Option<MotionCommand>,
}

impl SignalState {
    pub fn new() -> SignalState {
        SignalState::default()
    }

    /// Builds a state with exactly these directions held, without applying
    /// the opposite-pair veto.
    pub fn from_held(dirs: impl IntoIterator<Item = Direction>) -> SignalState {
        let mut ret = SignalState::default();
        for d in dirs {
            ret.set(d, true);
        }
        ret
    }

    pub fn is_set(&self, d: Direction) -> bool {
        match d {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn set(&mut self, d: Direction, value: bool) {
        match d {
            Direction::Up => self.up = value,
            Direction::Down => self.down = value,
            Direction::Left => self.left = value,
            Direction::Right => self.right = value,
        }
    }

    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |d| self.is_set(*d))
    }

    pub fn is_idle(&self) -> bool {
        self.held().next().is_none()
    }

    /// Flips `d` and works out what the robot should do about it.
    pub fn toggle(&mut self, d: Direction) -> Toggle {
        let pressed = !self.is_set(d);
        self.set(d, pressed);

        let command = match (d, pressed) {
            (Direction::Up, true) => self.up_pressed(),
            (Direction::Up, false) => self.up_released(),
            (Direction::Down, true) => self.down_pressed(),
            (Direction::Down, false) => self.down_released(),
            (Direction::Left, true) => self.left_pressed(),
            (Direction::Left, false) => self.left_released(),
            (Direction::Right, true) => self.right_pressed(),
            (Direction::Right, false) => self.right_released(),
        };

        Toggle {
            direction: d,
            pressed,
            vetoed: pressed && !self.is_set(d),
            command,
        }
    }

    // The handlers below run after the flag has already been flipped. A
    // pressed handler that finds the opposite direction held undoes its own
    // press.

    fn up_pressed(&mut self) -> Option<MotionCommand> {
        if !self.down && !self.left && !self.right {
            Some(MotionCommand::Forward)
        } else if self.down {
            self.up = false;
            None
        } else if self.left {
            Some(MotionCommand::ForwardLeft)
        } else {
            Some(MotionCommand::ForwardRight)
        }
    }

    fn up_released(&mut self) -> Option<MotionCommand> {
        if !self.down && !self.left && !self.right {
            Some(MotionCommand::Stop)
        } else if self.down {
            None
        } else if self.left {
            Some(MotionCommand::SpinLeft)
        } else {
            Some(MotionCommand::SpinRight)
        }
    }

    fn down_pressed(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.left && !self.right {
            Some(MotionCommand::Backward)
        } else if self.up {
            self.down = false;
            None
        } else if self.left {
            Some(MotionCommand::BackLeft)
        } else {
            Some(MotionCommand::BackRight)
        }
    }

    fn down_released(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.left && !self.right {
            Some(MotionCommand::Stop)
        } else if self.up {
            None
        } else if self.left {
            Some(MotionCommand::SpinLeft)
        } else {
            Some(MotionCommand::SpinRight)
        }
    }

    fn left_pressed(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.down && !self.right {
            Some(MotionCommand::SpinLeft)
        } else if self.right {
            self.left = false;
            None
        } else if self.up {
            Some(MotionCommand::ForwardLeft)
        } else {
            Some(MotionCommand::BackLeft)
        }
    }

    fn left_released(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.down && !self.right {
            Some(MotionCommand::Stop)
        } else if self.right {
            None
        } else if self.up {
            Some(MotionCommand::Forward)
        } else {
            Some(MotionCommand::Backward)
        }
    }

    fn right_pressed(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.down && !self.left {
            Some(MotionCommand::SpinRight)
        } else if self.left {
            self.right = false;
            None
        } else if self.up {
            Some(MotionCommand::ForwardRight)
        } else {
            Some(MotionCommand::BackRight)
        }
    }

    fn right_released(&mut self) -> Option<MotionCommand> {
        if !self.up && !self.down && !self.left {
            Some(MotionCommand::Stop)
        } else if self.left {
            None
        } else if self.up {
            Some(MotionCommand::Forward)
        } else {
            Some(MotionCommand::Backward)
        }
    }
}

/// The command that a combination of held directions stands for.
///
/// This is total: opposite directions cancel each other out, so even
/// combinations that `toggle` never produces have an answer.
pub fn resolve(state: &SignalState) -> MotionCommand {
    use core::cmp::Ordering::*;

    let forward = state.up.cmp(&state.down);
    let rightward = state.right.cmp(&state.left);
    match (forward, rightward) {
        (Equal, Equal) => MotionCommand::Stop,
        (Greater, Equal) => MotionCommand::Forward,
        (Less, Equal) => MotionCommand::Backward,
        (Equal, Greater) => MotionCommand::SpinRight,
        (Equal, Less) => MotionCommand::SpinLeft,
        (Greater, Less) => MotionCommand::ForwardLeft,
        (Greater, Greater) => MotionCommand::ForwardRight,
        (Less, Less) => MotionCommand::BackLeft,
        (Less, Greater) => MotionCommand::BackRight,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use proptest::prelude::*;
    use Direction::*;
    use MotionCommand::*;

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Up), Just(Down), Just(Left), Just(Right)]
    }

    fn run(toggles: &[Direction]) -> (SignalState, Vec<Option<MotionCommand>>) {
        let mut state = SignalState::new();
        let cmds = toggles.iter().map(|d| state.toggle(*d).command).collect();
        (state, cmds)
    }

    fn reachable() -> HashSet<SignalState> {
        let mut seen = HashSet::from([SignalState::new()]);
        let mut frontier = vec![SignalState::new()];
        while let Some(state) = frontier.pop() {
            for d in Direction::ALL {
                let mut next = state;
                next.toggle(d);
                if seen.insert(next) {
                    frontier.push(next);
                }
            }
        }
        seen
    }

    #[test]
    fn idle_is_stop() {
        assert_eq!(resolve(&SignalState::new()), Stop);
        assert!(SignalState::new().is_idle());
    }

    #[test]
    fn forward_then_forward_left() {
        let (state, cmds) = run(&[Up, Left]);
        assert_eq!(cmds, vec![Some(Forward), Some(ForwardLeft)]);
        assert!(state.is_set(Up) && state.is_set(Left));
    }

    #[test]
    fn spin_right_then_stop() {
        let (state, cmds) = run(&[Right, Right]);
        assert_eq!(cmds, vec![Some(SpinRight), Some(Stop)]);
        assert!(state.is_idle());
    }

    #[test]
    fn down_is_vetoed_while_up_is_held() {
        let mut state = SignalState::new();
        state.toggle(Up);
        let t = state.toggle(Down);
        assert_eq!(
            t,
            Toggle {
                direction: Down,
                pressed: true,
                vetoed: true,
                command: None,
            }
        );
        assert!(state.is_set(Up));
        assert!(!state.is_set(Down));
    }

    #[test]
    fn right_is_vetoed_while_left_is_held() {
        let (state, cmds) = run(&[Up, Left, Right]);
        assert_eq!(cmds, vec![Some(Forward), Some(ForwardLeft), None]);
        assert_eq!(state, SignalState::from_held([Up, Left]));
    }

    #[test]
    fn releasing_one_half_of_a_diagonal() {
        assert_eq!(run(&[Up, Left, Up]).1[2], Some(SpinLeft));
        assert_eq!(run(&[Up, Right, Up]).1[2], Some(SpinRight));
        assert_eq!(run(&[Down, Left, Down]).1[2], Some(SpinLeft));
        assert_eq!(run(&[Down, Right, Down]).1[2], Some(SpinRight));
        assert_eq!(run(&[Up, Left, Left]).1[2], Some(Forward));
        assert_eq!(run(&[Down, Right, Right]).1[2], Some(Backward));
        assert_eq!(run(&[Left, Down]).1, vec![Some(SpinLeft), Some(BackLeft)]);
        assert_eq!(run(&[Right, Up]).1, vec![Some(SpinRight), Some(ForwardRight)]);
    }

    #[test]
    fn reachable_states() {
        let states = reachable();
        // Each axis is either idle or held one way.
        assert_eq!(states.len(), 9);

        let cmds: HashSet<_> = states.iter().map(resolve).collect();
        assert_eq!(cmds.len(), MotionCommand::ALL.len());
    }

    #[test]
    fn opposite_pairs_cancel() {
        assert_eq!(resolve(&SignalState::from_held([Up, Down])), Stop);
        assert_eq!(resolve(&SignalState::from_held([Left, Right])), Stop);
        assert_eq!(resolve(&SignalState::from_held([Up, Down, Left])), SpinLeft);
        assert_eq!(resolve(&SignalState::from_held(Direction::ALL)), Stop);
    }

    proptest! {
        #[test]
        fn opposites_never_held_together(toggles in prop::collection::vec(direction(), 0..64)) {
            let mut state = SignalState::new();
            for d in toggles {
                state.toggle(d);
                assert!(!(state.is_set(Up) && state.is_set(Down)));
                assert!(!(state.is_set(Left) && state.is_set(Right)));
            }
        }

        // Every toggle that actually changes something sends exactly the
        // command that the new combination stands for.
        #[test]
        fn handlers_agree_with_resolve(toggles in prop::collection::vec(direction(), 0..64)) {
            let mut state = SignalState::new();
            for d in toggles {
                let before = state;
                let t = state.toggle(d);
                if t.vetoed {
                    assert_eq!(state, before);
                    assert_eq!(t.command, None);
                } else {
                    assert_eq!(t.command, Some(resolve(&state)));
                    assert_eq!(state.is_set(d), t.pressed);
                }
            }
        }

        #[test]
        fn press_then_release_is_a_round_trip(d in direction()) {
            let (state, cmds) = run(&[d, d]);
            assert_eq!(state, SignalState::new());
            assert_eq!(cmds.last().copied().flatten(), Some(Stop));
        }
    }
}
