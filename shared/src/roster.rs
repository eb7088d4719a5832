//! Local view of who is in the room and how far along they are.

use crate::protocol::{PlayerId, PlayerStats, Players, ServerMsg};
use std::cmp::Ordering;
use tracing::debug;

/// One row of the rendered leaderboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    pub id: PlayerId,
    pub progress: f64,
    pub wpm: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    players: Players,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full snapshot: the last one wins, stale entries are dropped.
    pub fn replace(&mut self, players: Players) {
        self.players = players;
    }

    /// Adds `id` with zeroed stats unless it is already present.
    pub fn insert_if_absent(&mut self, id: &str) -> bool {
        if self.players.contains_key(id) {
            return false;
        }
        self.players.insert(id.to_string(), PlayerStats::default());
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<PlayerStats> {
        self.players.remove(id)
    }

    /// Folds one inbound message into the roster. Returns false for messages
    /// that carry no roster information.
    pub fn apply(&mut self, msg: &ServerMsg) -> bool {
        match msg {
            ServerMsg::ProgressUpdate { players } => {
                self.replace(players.clone());
            }
            ServerMsg::PlayerJoined {
                players: Some(players),
                ..
            } => {
                self.replace(players.clone());
            }
            ServerMsg::PlayerJoined {
                player_id,
                players: None,
            } => {
                self.insert_if_absent(player_id);
            }
            ServerMsg::PlayerLeft { player_id, players } => {
                self.replace(players.clone());
                if self.remove(player_id).is_some() {
                    debug!("dropped {} still listed in its own leave snapshot", player_id);
                }
            }
            ServerMsg::Paragraph(_) | ServerMsg::Winner { .. } => return false,
        }
        true
    }

    pub fn get(&self, id: &str) -> Option<&PlayerStats> {
        self.players.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Participants ordered by descending progress. Equal progress falls back
    /// to id order, so the ordering is stable across recomputations.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let mut rows: Vec<Standing> = self
            .players
            .iter()
            .map(|(id, stats)| Standing {
                id: id.clone(),
                progress: stats.progress,
                wpm: stats.wpm,
            })
            .collect();
        rows.sort_by(|a, b| by_progress_desc(a.progress, b.progress));
        rows
    }
}

fn by_progress_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
