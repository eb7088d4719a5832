use dashmap::DashMap;
use rust_fsm::*;
use shared::protocol::{PlayerId, PlayerStats, Players, ServerMsg};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoomPhase {
    #[default]
    Waiting,
    Racing,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomEvent {
    Start,
    Finish,
    Reset,
}

impl StateMachineImpl for RoomPhase {
    type Input = RoomEvent;
    type State = RoomPhase;
    type Output = ();
    const INITIAL_STATE: Self::State = RoomPhase::Waiting;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (RoomPhase::Waiting, RoomEvent::Start) => Some(RoomPhase::Racing),
            (RoomPhase::Racing, RoomEvent::Finish) => Some(RoomPhase::Finished),
            (RoomPhase::Racing, RoomEvent::Reset) => Some(RoomPhase::Waiting),
            (RoomPhase::Finished, RoomEvent::Reset) => Some(RoomPhase::Waiting),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

#[derive(Default)]
struct RoomInner {
    phase: RoomPhase,
    players: Players,
    /// Connections currently joined under each name. A name stays in the
    /// room until its last connection leaves.
    connections: HashMap<PlayerId, HashSet<Uuid>>,
    paragraph: Option<String>,
    winner: Option<PlayerId>,
}

impl RoomInner {
    fn fire(&mut self, event: RoomEvent) -> bool {
        match RoomPhase::transition(&self.phase, &event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }

    fn new_round(&mut self) {
        for stats in self.players.values_mut() {
            *stats = PlayerStats::default();
        }
        self.paragraph = None;
        self.winner = None;
        self.fire(RoomEvent::Reset);
    }
}

/// What a connection has to do after joining.
#[derive(Clone, Debug, PartialEq)]
pub enum Joined {
    /// Not enough players yet.
    Waiting,
    /// Enough players are waiting; fetch a paragraph and call [`Room::start`].
    Ready,
    /// The race is already running; the joiner gets the paragraph directly.
    Racing(String),
}

/// One race room: the players in it, the current paragraph and the winner.
/// Everything a member needs to hear goes out on `tx`.
pub struct Room {
    pub id: String,
    inner: RwLock<RoomInner>,
    tx: broadcast::Sender<ServerMsg>,
}

impl Room {
    pub fn new(id: String) -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            id,
            inner: RwLock::new(RoomInner::default()),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// No subscriber and no player. A room whose state is locked right now
    /// counts as busy.
    pub fn is_vacant(&self) -> bool {
        self.subscriber_count() == 0
            && self
                .inner
                .try_read()
                .map(|inner| inner.players.is_empty())
                .unwrap_or(false)
    }

    pub async fn phase(&self) -> RoomPhase {
        self.inner.read().await.phase
    }

    pub async fn players(&self) -> Players {
        self.inner.read().await.players.clone()
    }

    /// Adds `player_id` on connection `conn_id` (idempotent per connection)
    /// and reports whether the room is ready to start.
    pub async fn join(&self, conn_id: Uuid, player_id: &str, min_players: usize) -> Joined {
        let mut inner = self.inner.write().await;

        if inner.phase == RoomPhase::Finished {
            info!("Room {} starting a new round", self.id);
            inner.new_round();
        }

        if !inner.players.contains_key(player_id) {
            inner
                .players
                .insert(player_id.to_string(), PlayerStats::default());
        }
        inner
            .connections
            .entry(player_id.to_string())
            .or_default()
            .insert(conn_id);
        info!(
            "Player {} in room {} ({} players)",
            player_id,
            self.id,
            inner.players.len()
        );
        let _ = self.tx.send(ServerMsg::PlayerJoined {
            player_id: player_id.to_string(),
            players: Some(inner.players.clone()),
        });

        let phase = inner.phase;
        match phase {
            RoomPhase::Waiting if inner.players.len() >= min_players => Joined::Ready,
            RoomPhase::Racing => match inner.paragraph.clone() {
                Some(text) => Joined::Racing(text),
                None => Joined::Waiting,
            },
            _ => Joined::Waiting,
        }
    }

    /// Starts the race with `text` if the room is still waiting with enough
    /// players. Only the first of several concurrent callers succeeds.
    pub async fn start(&self, text: String, min_players: usize) -> bool {
        let mut inner = self.inner.write().await;
        if inner.phase != RoomPhase::Waiting
            || inner.players.is_empty()
            || inner.players.len() < min_players
        {
            debug!("Room {} not starting while {:?}", self.id, inner.phase);
            return false;
        }
        inner.fire(RoomEvent::Start);
        inner.paragraph = Some(text.clone());
        info!("Room {} racing with {} players", self.id, inner.players.len());
        let _ = self.tx.send(ServerMsg::Paragraph(text));
        true
    }

    /// Records a player's standing. The first to reach 100 while racing wins.
    /// Returns false when the player is not in this room.
    pub async fn update_progress(&self, player_id: &str, progress: f64, wpm: u32) -> bool {
        let mut inner = self.inner.write().await;
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 100.0)
        } else {
            0.0
        };

        match inner.players.get_mut(player_id) {
            Some(stats) => *stats = PlayerStats { progress, wpm },
            None => return false,
        }
        let _ = self.tx.send(ServerMsg::ProgressUpdate {
            players: inner.players.clone(),
        });

        if progress >= 100.0 && inner.winner.is_none() && inner.fire(RoomEvent::Finish) {
            info!("Player {} won room {}", player_id, self.id);
            inner.winner = Some(player_id.to_string());
            let _ = self.tx.send(ServerMsg::Winner {
                player_id: player_id.to_string(),
            });
        }
        true
    }

    /// Detaches connection `conn_id` from `player_id`. The player leaves, and
    /// the rest of the room hears about it, once no connection holds the name.
    pub async fn leave(&self, conn_id: Uuid, player_id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(conns) = inner.connections.get_mut(player_id) {
            conns.remove(&conn_id);
            if !conns.is_empty() {
                debug!(
                    "Player {} still connected to room {} ({} connections)",
                    player_id,
                    self.id,
                    conns.len()
                );
                return;
            }
        }
        inner.connections.remove(player_id);
        if inner.players.remove(player_id).is_none() {
            return;
        }
        info!("Player {} left room {}", player_id, self.id);
        let _ = self.tx.send(ServerMsg::PlayerLeft {
            player_id: player_id.to_string(),
            players: inner.players.clone(),
        });
        if inner.players.is_empty() {
            inner.new_round();
        }
    }
}

/// Finds or creates room `room_id` and subscribes to it while the registry
/// entry is still held, so [`remove_if_vacant`] cannot drop it in between.
pub fn enter(
    rooms: &DashMap<String, Arc<Room>>,
    room_id: &str,
) -> (Arc<Room>, broadcast::Receiver<ServerMsg>) {
    let entry = rooms
        .entry(room_id.to_string())
        .or_insert_with(|| Arc::new(Room::new(room_id.to_string())));
    let rx = entry.subscribe();
    (entry.value().clone(), rx)
}

/// Drops room `room_id` from the registry once nobody is subscribed to it
/// and nobody is playing in it.
pub fn remove_if_vacant(rooms: &DashMap<String, Arc<Room>>, room_id: &str) -> bool {
    rooms
        .remove_if(room_id, |_, room| room.is_vacant())
        .is_some()
}
