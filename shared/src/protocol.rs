use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Participants are identified by their display name.
pub type PlayerId = String;

/// Standing of one participant as exchanged with the coordination service.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerStats {
    pub progress: f64,
    pub wpm: u32,
}

/// Full roster payload, keyed by participant id.
pub type Players = BTreeMap<PlayerId, PlayerStats>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMsg {
    JoinRoom {
        room_id: String,
        player_id: PlayerId,
    },
    UpdateProgress {
        room_id: String,
        player_id: PlayerId,
        progress: f64,
        wpm: u32,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMsg {
    Paragraph(String),
    ProgressUpdate {
        players: Players,
    },
    PlayerJoined {
        player_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        players: Option<Players>,
    },
    PlayerLeft {
        player_id: PlayerId,
        players: Players,
    },
    Winner {
        player_id: PlayerId,
    },
}

impl ClientMsg {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl ServerMsg {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_room_uses_contract_names() {
        let msg = ClientMsg::JoinRoom {
            room_id: "abc".to_string(),
            player_id: "alice".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({ "event": "joinRoom", "data": { "roomId": "abc", "playerId": "alice" } })
        );
    }

    #[test]
    fn update_progress_carries_standing() {
        let msg = ClientMsg::UpdateProgress {
            room_id: "abc".to_string(),
            player_id: "alice".to_string(),
            progress: 50.0,
            wpm: 42,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "updateProgress");
        assert_eq!(value["data"]["progress"], 50.0);
        assert_eq!(value["data"]["wpm"], 42);
    }

    #[test]
    fn paragraph_is_a_bare_string() {
        let msg = ServerMsg::from_json(r#"{"event":"paragraph","data":"the quick fox"}"#).unwrap();
        assert_eq!(msg, ServerMsg::Paragraph("the quick fox".to_string()));
    }

    #[test]
    fn player_joined_accepts_both_shapes() {
        let bare = ServerMsg::from_json(r#"{"event":"playerJoined","data":{"playerId":"bob"}}"#)
            .unwrap();
        assert_eq!(
            bare,
            ServerMsg::PlayerJoined {
                player_id: "bob".to_string(),
                players: None,
            }
        );

        let full = ServerMsg::from_json(
            r#"{"event":"playerJoined","data":{"playerId":"bob","players":{"bob":{"progress":0,"wpm":0}}}}"#,
        )
        .unwrap();
        match full {
            ServerMsg::PlayerJoined { players: Some(p), .. } => {
                assert_eq!(p.get("bob"), Some(&PlayerStats::default()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn id_only_join_omits_players_on_the_wire() {
        let msg = ServerMsg::PlayerJoined {
            player_id: "bob".to_string(),
            players: None,
        };
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"event":"playerJoined","data":{"playerId":"bob"}}"#
        );
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        assert!(ServerMsg::from_json(r#"{"event":"playerLeft","data":{"playerId":"bob"}}"#).is_err());
        assert!(ServerMsg::from_json(r#"{"event":"progressUpdate","data":{}}"#).is_err());
        assert!(ServerMsg::from_json(r#"{"event":"winner","data":{}}"#).is_err());
        assert!(ServerMsg::from_json(r#"{"event":"teleport","data":{}}"#).is_err());
    }
}
