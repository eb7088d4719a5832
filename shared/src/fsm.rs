use rust_fsm::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceState {
    Idle,
    WaitingForText,
    Racing,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RaceEvent {
    Joined,
    ParagraphReceived,
    WinnerAnnounced,
    Reset,
}

impl StateMachineImpl for RaceState {
    type Input = RaceEvent;
    type State = RaceState;
    type Output = ();
    const INITIAL_STATE: Self::State = RaceState::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (RaceState::Idle, RaceEvent::Joined) => Some(RaceState::WaitingForText),
            (RaceState::WaitingForText, RaceEvent::ParagraphReceived) => Some(RaceState::Racing),
            (RaceState::Racing, RaceEvent::WinnerAnnounced) => Some(RaceState::Finished),
            (RaceState::Finished, RaceEvent::Reset) => Some(RaceState::Idle),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

impl Default for RaceState {
    fn default() -> Self {
        RaceState::Idle
    }
}

impl RaceState {
    /// Only `Racing` accepts typed input.
    pub fn accepts_input(self) -> bool {
        self == RaceState::Racing
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RaceState::Idle => "idle",
            RaceState::WaitingForText => "waiting",
            RaceState::Racing => "racing",
            RaceState::Finished => "finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [RaceState; 4] = [
        RaceState::Idle,
        RaceState::WaitingForText,
        RaceState::Racing,
        RaceState::Finished,
    ];

    #[test]
    fn happy_path_runs_forward() {
        let mut state = RaceState::default();
        for event in [
            RaceEvent::Joined,
            RaceEvent::ParagraphReceived,
            RaceEvent::WinnerAnnounced,
        ] {
            state = RaceState::transition(&state, &event).unwrap();
        }
        assert_eq!(state, RaceState::Finished);
        assert_eq!(
            RaceState::transition(&state, &RaceEvent::Reset),
            Some(RaceState::Idle)
        );
    }

    #[test]
    fn racing_never_returns_to_waiting() {
        for event in [RaceEvent::Joined, RaceEvent::ParagraphReceived, RaceEvent::Reset] {
            assert_eq!(RaceState::transition(&RaceState::Racing, &event), None);
        }
    }

    #[test]
    fn winner_only_ends_a_running_race() {
        for state in [RaceState::Idle, RaceState::WaitingForText, RaceState::Finished] {
            assert_eq!(RaceState::transition(&state, &RaceEvent::WinnerAnnounced), None);
        }
    }

    #[test]
    fn reset_only_from_finished() {
        for state in ALL_STATES {
            let next = RaceState::transition(&state, &RaceEvent::Reset);
            if state == RaceState::Finished {
                assert_eq!(next, Some(RaceState::Idle));
            } else {
                assert_eq!(next, None);
            }
        }
    }

    #[test]
    fn only_racing_accepts_input() {
        let accepting: Vec<_> = ALL_STATES.iter().filter(|s| s.accepts_input()).collect();
        assert_eq!(accepting, vec![&RaceState::Racing]);
    }
}
