//! Client-side race state machine.
//!
//! [`RaceClient`] owns the [`RaceSession`] and [`Roster`] of one race page and
//! is driven by three inputs: inbound service messages, local text edits and
//! the one-second metrics tick. It performs no I/O; outbound messages are
//! returned to the caller, which hands them to the transport.

use crate::fsm::{RaceEvent, RaceState};
use crate::protocol::{ClientMsg, ServerMsg};
use crate::roster::{Roster, Standing};
use crate::session::RaceSession;
use crate::validator::Validation;
use crate::wpm::wpm_at;
use rust_fsm::StateMachineImpl;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct RaceClient {
    session: RaceSession,
    roster: Roster,
}

impl RaceClient {
    pub fn new(room_id: impl Into<String>, self_id: impl Into<String>) -> Self {
        Self {
            session: RaceSession::new(room_id, self_id),
            roster: Roster::new(),
        }
    }

    pub fn session(&self) -> &RaceSession {
        &self.session
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn status(&self) -> RaceState {
        self.session.status
    }

    pub fn leaderboard(&self) -> Vec<Standing> {
        self.roster.leaderboard()
    }

    fn fire(&mut self, event: RaceEvent) -> Option<RaceState> {
        let next = RaceState::transition(&self.session.status, &event)?;
        debug!(
            "room {}: {:?} --{:?}--> {:?}",
            self.session.room_id, self.session.status, event, next
        );
        self.session.status = next;
        Some(next)
    }

    /// Announces membership. Only valid from `Idle`; emitting the join is
    /// enough to start waiting for text.
    pub fn join(&mut self) -> Option<ClientMsg> {
        self.fire(RaceEvent::Joined)?;
        info!(
            "{} joining room {}",
            self.session.self_id, self.session.room_id
        );
        Some(ClientMsg::JoinRoom {
            room_id: self.session.room_id.clone(),
            player_id: self.session.self_id.clone(),
        })
    }

    /// Applies one inbound message. Returns the new state when the message
    /// caused a transition.
    pub fn handle(&mut self, msg: ServerMsg, now_ms: u64) -> Option<RaceState> {
        match msg {
            ServerMsg::Paragraph(text) => {
                if text.is_empty() {
                    debug!("ignoring empty paragraph");
                    return None;
                }
                if self.session.status != RaceState::WaitingForText {
                    debug!(
                        "ignoring paragraph while {}",
                        self.session.status.as_str()
                    );
                    return None;
                }
                let next = self.fire(RaceEvent::ParagraphReceived)?;
                self.session.begin(text, now_ms);
                info!(
                    "race started in room {} ({} chars)",
                    self.session.room_id,
                    self.session.paragraph.chars().count()
                );
                Some(next)
            }
            ServerMsg::Winner { player_id } => {
                let next = match self.fire(RaceEvent::WinnerAnnounced) {
                    Some(next) => next,
                    None => {
                        debug!(
                            "ignoring winner {} while {}",
                            player_id,
                            self.session.status.as_str()
                        );
                        return None;
                    }
                };
                info!("{} won in room {}", player_id, self.session.room_id);
                self.session.winner_id = Some(player_id);
                Some(next)
            }
            other => {
                self.roster.apply(&other);
                None
            }
        }
    }

    /// Replaces the typed text with `text`. Ignored unless racing; otherwise
    /// returns the standing to push to the service.
    pub fn type_text(&mut self, text: &str) -> Option<ClientMsg> {
        if !self.session.status.accepts_input() {
            return None;
        }
        self.session.set_typed_text(text);
        Some(self.progress_msg())
    }

    pub fn validation(&self) -> Validation {
        Validation {
            is_correct: self.session.is_correct,
            progress: self.session.progress,
            correct_len: self.session.last_correct_length,
        }
    }

    /// Metrics tick. Recomputes self WPM while racing and returns an update
    /// when the value changed.
    pub fn tick(&mut self, now_ms: u64) -> Option<ClientMsg> {
        if self.session.status != RaceState::Racing {
            return None;
        }
        let started = self.session.start_timestamp?;
        let wpm = wpm_at(&self.session.typed_text, started, now_ms);
        if wpm == self.session.wpm {
            return None;
        }
        self.session.wpm = wpm;
        Some(self.progress_msg())
    }

    /// "Play again": leaves `Finished` for `Idle` and forgets the round. The
    /// roster and any open connection are kept.
    pub fn reset(&mut self) -> bool {
        if self.fire(RaceEvent::Reset).is_none() {
            return false;
        }
        self.session.clear_round();
        true
    }

    fn progress_msg(&self) -> ClientMsg {
        ClientMsg::UpdateProgress {
            room_id: self.session.room_id.clone(),
            player_id: self.session.self_id.clone(),
            progress: self.session.progress,
            wpm: self.session.wpm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PlayerStats, Players};

    fn racing(paragraph: &str, now_ms: u64) -> RaceClient {
        let mut client = RaceClient::new("room", "alice");
        client.join().unwrap();
        client.handle(ServerMsg::Paragraph(paragraph.to_string()), now_ms);
        assert_eq!(client.status(), RaceState::Racing);
        client
    }

    #[test]
    fn join_moves_to_waiting_once() {
        let mut client = RaceClient::new("room", "alice");
        assert_eq!(
            client.join(),
            Some(ClientMsg::JoinRoom {
                room_id: "room".to_string(),
                player_id: "alice".to_string(),
            })
        );
        assert_eq!(client.status(), RaceState::WaitingForText);
        assert_eq!(client.join(), None);
    }

    #[test]
    fn paragraph_starts_the_race() {
        let mut client = RaceClient::new("room", "alice");
        client.join();
        let next = client.handle(ServerMsg::Paragraph("hello".to_string()), 7_000);
        assert_eq!(next, Some(RaceState::Racing));
        assert_eq!(client.session().start_timestamp, Some(7_000));
        assert!(client.session().typed_text.is_empty());
    }

    #[test]
    fn empty_paragraph_keeps_waiting() {
        let mut client = RaceClient::new("room", "alice");
        client.join();
        assert_eq!(client.handle(ServerMsg::Paragraph(String::new()), 0), None);
        assert_eq!(client.status(), RaceState::WaitingForText);
    }

    #[test]
    fn second_paragraph_does_not_restart() {
        let mut client = racing("hello", 1_000);
        client.type_text("he");
        assert_eq!(client.handle(ServerMsg::Paragraph("other".to_string()), 9_000), None);
        assert_eq!(client.session().paragraph, "hello");
        assert_eq!(client.session().typed_text, "he");
        assert_eq!(client.session().start_timestamp, Some(1_000));
    }

    #[test]
    fn input_outside_racing_is_ignored() {
        let mut client = RaceClient::new("room", "alice");
        assert_eq!(client.type_text("abc"), None);
        client.join();
        assert_eq!(client.type_text("abc"), None);
        assert!(client.session().typed_text.is_empty());
    }

    #[test]
    fn typing_reports_progress() {
        let mut client = racing("the quick fox", 0);
        match client.type_text("the quick") {
            Some(ClientMsg::UpdateProgress { progress, wpm, .. }) => {
                assert!((progress - 900.0 / 13.0).abs() < 1e-9);
                assert_eq!(wpm, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(client.validation().is_correct);
    }

    #[test]
    fn winner_finishes_and_freezes_input() {
        let mut client = racing("hi", 0);
        let next = client.handle(
            ServerMsg::Winner {
                player_id: "bob".to_string(),
            },
            500,
        );
        assert_eq!(next, Some(RaceState::Finished));
        assert_eq!(client.session().winner_id.as_deref(), Some("bob"));
        assert!(!client.session().is_winner());
        assert_eq!(client.type_text("h"), None);
        assert_eq!(client.tick(2_000), None);
    }

    #[test]
    fn winner_before_racing_is_ignored() {
        let mut client = RaceClient::new("room", "alice");
        client.join();
        let winner = ServerMsg::Winner {
            player_id: "bob".to_string(),
        };
        assert_eq!(client.handle(winner, 0), None);
        assert_eq!(client.status(), RaceState::WaitingForText);
        assert_eq!(client.session().winner_id, None);
    }

    #[test]
    fn local_completion_does_not_finish() {
        let mut client = racing("hi", 0);
        client.type_text("hi");
        assert_eq!(client.session().progress, 100.0);
        assert_eq!(client.status(), RaceState::Racing);
    }

    #[test]
    fn tick_updates_wpm_only_on_change() {
        let mut client = racing("one two three four five six", 0);
        client.type_text("one two three four fi");
        match client.tick(30_000) {
            Some(ClientMsg::UpdateProgress { wpm, .. }) => assert_eq!(wpm, 10),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(client.session().wpm, 10);
        assert_eq!(client.tick(30_000), None);
    }

    #[test]
    fn first_tick_with_no_input_stays_zero() {
        let mut client = racing("hello", 0);
        assert_eq!(client.tick(1_000), None);
        assert_eq!(client.session().wpm, 0);
    }

    #[test]
    fn reset_returns_to_idle_and_allows_rejoin() {
        let mut client = racing("hi", 0);
        assert!(!RaceClient::new("r", "x").reset());
        client.handle(
            ServerMsg::Winner {
                player_id: "alice".to_string(),
            },
            0,
        );
        assert!(client.session().is_winner());
        assert!(client.reset());
        assert_eq!(client.status(), RaceState::Idle);
        assert_eq!(client.session().winner_id, None);
        assert_eq!(client.session().start_timestamp, None);
        assert!(client.join().is_some());
        assert_eq!(client.status(), RaceState::WaitingForText);
    }

    #[test]
    fn roster_messages_apply_in_any_state() {
        let mut client = RaceClient::new("room", "alice");
        let mut players = Players::new();
        players.insert("bob".to_string(), PlayerStats { progress: 20.0, wpm: 12 });
        assert_eq!(client.handle(ServerMsg::ProgressUpdate { players }, 0), None);
        assert_eq!(client.status(), RaceState::Idle);
        assert_eq!(client.leaderboard()[0].id, "bob");
    }
}
