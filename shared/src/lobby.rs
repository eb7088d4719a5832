use crate::error::RaceError;
use crate::protocol::{PlayerId, ServerMsg};
use tracing::debug;

/// Names seen joining while the room-selection page is open, in arrival
/// order and without repeats. Only the joining id is read; any roster
/// carried along is ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lobby {
    users: Vec<PlayerId>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[PlayerId] {
        &self.users
    }

    /// Records a `playerJoined`. Returns true when the name is new.
    pub fn observe(&mut self, msg: &ServerMsg) -> bool {
        match msg {
            ServerMsg::PlayerJoined { player_id, .. } if !self.users.contains(player_id) => {
                debug!("lobby saw {}", player_id);
                self.users.push(player_id.clone());
                true
            }
            _ => false,
        }
    }

    pub fn receive(&mut self, text: &str) -> Result<bool, RaceError> {
        let msg = ServerMsg::from_json(text)?;
        Ok(self.observe(&msg))
    }

    pub fn summary(&self) -> String {
        if self.users.is_empty() {
            "No users yet".to_string()
        } else {
            self.users.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lobby_says_so() {
        assert_eq!(Lobby::new().summary(), "No users yet");
    }

    #[test]
    fn joins_are_listed_once_in_arrival_order() {
        let mut lobby = Lobby::new();
        assert!(lobby
            .receive(r#"{"event":"playerJoined","data":{"playerId":"bob"}}"#)
            .unwrap());
        assert!(lobby
            .receive(r#"{"event":"playerJoined","data":{"playerId":"alice","players":{"alice":{"progress":0.0,"wpm":0},"bob":{"progress":0.0,"wpm":0}}}}"#)
            .unwrap());
        assert!(!lobby
            .receive(r#"{"event":"playerJoined","data":{"playerId":"bob"}}"#)
            .unwrap());
        assert_eq!(lobby.users(), ["bob".to_string(), "alice".to_string()]);
        assert_eq!(lobby.summary(), "bob, alice");
    }

    #[test]
    fn other_events_and_garbage_leave_it_alone() {
        let mut lobby = Lobby::new();
        assert!(!lobby.receive(r#"{"event":"winner","data":{"playerId":"bob"}}"#).unwrap());
        assert!(matches!(lobby.receive("nope"), Err(RaceError::Malformed(_))));
        assert!(lobby.users().is_empty());
    }
}
