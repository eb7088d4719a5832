use crate::fsm::RaceState;
use crate::protocol::PlayerId;
use crate::validator::{validate, Validation};

/// Client-local state of one race page. Timestamps are milliseconds since
/// the Unix epoch, as reported by the host clock.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceSession {
    pub room_id: String,
    pub self_id: PlayerId,
    pub paragraph: String,
    pub status: RaceState,
    pub start_timestamp: Option<u64>,
    pub typed_text: String,
    pub last_correct_length: usize,
    pub is_correct: bool,
    pub progress: f64,
    pub wpm: u32,
    pub winner_id: Option<PlayerId>,
}

impl RaceSession {
    pub fn new(room_id: impl Into<String>, self_id: impl Into<PlayerId>) -> Self {
        Self {
            room_id: room_id.into(),
            self_id: self_id.into(),
            paragraph: String::new(),
            status: RaceState::default(),
            start_timestamp: None,
            typed_text: String::new(),
            last_correct_length: 0,
            is_correct: true,
            progress: 0.0,
            wpm: 0,
            winner_id: None,
        }
    }

    /// Installs the race text. The start timestamp is captured only the first
    /// time a paragraph arrives; it survives until [`RaceSession::clear_round`].
    pub(crate) fn begin(&mut self, paragraph: String, now_ms: u64) {
        self.paragraph = paragraph;
        if self.start_timestamp.is_none() {
            self.start_timestamp = Some(now_ms);
        }
        self.typed_text.clear();
        self.apply_validation(Validation::EMPTY);
    }

    pub(crate) fn set_typed_text(&mut self, text: &str) -> Validation {
        self.typed_text.clear();
        self.typed_text.push_str(text);
        let validation = validate(&self.typed_text, &self.paragraph);
        self.apply_validation(validation);
        validation
    }

    pub(crate) fn clear_round(&mut self) {
        self.paragraph.clear();
        self.typed_text.clear();
        self.start_timestamp = None;
        self.winner_id = None;
        self.wpm = 0;
        self.apply_validation(Validation::EMPTY);
    }

    fn apply_validation(&mut self, validation: Validation) {
        self.is_correct = validation.is_correct;
        self.progress = validation.progress;
        self.last_correct_length = validation.correct_len;
    }

    pub fn is_winner(&self) -> bool {
        self.winner_id.as_deref() == Some(self.self_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_timestamp_is_set_once() {
        let mut session = RaceSession::new("room", "alice");
        session.begin("first".to_string(), 1_000);
        session.begin("second".to_string(), 5_000);
        assert_eq!(session.start_timestamp, Some(1_000));
        assert_eq!(session.paragraph, "second");
    }

    #[test]
    fn typed_text_tracks_validation() {
        let mut session = RaceSession::new("room", "alice");
        session.begin("hello".to_string(), 0);
        session.set_typed_text("hex");
        assert!(!session.is_correct);
        assert_eq!(session.progress, 0.0);
        assert_eq!(session.last_correct_length, 2);

        session.set_typed_text("hel");
        assert!(session.is_correct);
        assert_eq!(session.last_correct_length, 3);
    }

    #[test]
    fn clear_round_forgets_the_race() {
        let mut session = RaceSession::new("room", "alice");
        session.begin("hello".to_string(), 42);
        session.set_typed_text("hello");
        session.wpm = 30;
        session.winner_id = Some("alice".to_string());
        assert!(session.is_winner());

        session.clear_round();
        assert!(session.paragraph.is_empty());
        assert!(session.typed_text.is_empty());
        assert_eq!(session.start_timestamp, None);
        assert_eq!(session.winner_id, None);
        assert_eq!(session.wpm, 0);
        assert_eq!(session.progress, 0.0);
        assert_eq!(session.room_id, "room");
    }
}
