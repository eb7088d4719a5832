use crate::room::{enter, remove_if_vacant, Joined, Room};
use crate::AppState;
use axum::extract::ws::{Message, WebSocket};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use shared::protocol::{ClientMsg, PlayerId, ServerMsg};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The room and name a connection joined as.
struct Membership {
    room: Arc<Room>,
    player_id: PlayerId,
}

pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = Uuid::new_v4();
    let mut membership: Option<Membership> = None;
    let mut room_rx: Option<broadcast::Receiver<ServerMsg>> = None;

    info!("New WebSocket connection {}", conn_id);

    loop {
        tokio::select! {
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg = match ClientMsg::from_json(&text) {
                            Ok(msg) => msg,
                            Err(e) => {
                                warn!("Dropping malformed frame from {}: {}", conn_id, e);
                                continue;
                            }
                        };
                        match client_msg {
                            ClientMsg::JoinRoom { room_id, player_id } => {
                                if room_id.is_empty() || player_id.is_empty() {
                                    warn!("Connection {} sent joinRoom without identity", conn_id);
                                    continue;
                                }

                                let same = membership
                                    .as_ref()
                                    .is_some_and(|m| m.room.id == room_id && m.player_id == player_id);
                                if !same {
                                    if let Some(old) = membership.take() {
                                        room_rx = None;
                                        leave(&state, conn_id, old).await;
                                    }
                                    let (room, rx) = enter(&state.rooms, &room_id);
                                    room_rx = Some(rx);
                                    membership = Some(Membership { room, player_id });
                                }

                                if let Some(m) = membership.as_ref() {
                                    match m.room.join(conn_id, &m.player_id, state.min_players).await {
                                        Joined::Ready => {
                                            let text = state.passages.random_passage().await;
                                            if !m.room.start(text, state.min_players).await {
                                                debug!("Room {} already started or short of players", m.room.id);
                                            }
                                        }
                                        Joined::Racing(text) => {
                                            if send(&mut sender, &ServerMsg::Paragraph(text)).await.is_err() {
                                                break;
                                            }
                                        }
                                        Joined::Waiting => {}
                                    }
                                }
                            }
                            ClientMsg::UpdateProgress { room_id, player_id, progress, wpm } => {
                                match membership.as_ref() {
                                    Some(m) if m.room.id == room_id && m.player_id == player_id => {
                                        m.room.update_progress(&player_id, progress, wpm).await;
                                    }
                                    _ => {
                                        warn!(
                                            "Connection {} sent progress for {} in {} without joining",
                                            conn_id, player_id, room_id
                                        );
                                    }
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }

            room_msg = async {
                if let Some(ref mut rx) = room_rx {
                    rx.recv().await
                } else {
                    std::future::pending().await
                }
            } => {
                match room_msg {
                    Ok(msg) => {
                        debug!("Forwarding to {}: {:?}", conn_id, msg);
                        if send(&mut sender, &msg).await.is_err() {
                            info!("Failed to send to {}", conn_id);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Broadcast channel closed for {}", conn_id);
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Connection {} lagged, skipped {} messages", conn_id, skipped);
                        continue;
                    }
                }
            }
        }
    }

    drop(room_rx);
    if let Some(m) = membership {
        leave(&state, conn_id, m).await;
    }
    info!("Connection {} closed", conn_id);
}

async fn leave(state: &AppState, conn_id: Uuid, membership: Membership) {
    let Membership { room, player_id } = membership;
    room.leave(conn_id, &player_id).await;
    if remove_if_vacant(&state.rooms, &room.id) {
        info!("Room {} is empty, dropped", room.id);
    }
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), axum::Error> {
    match msg.to_json() {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            warn!("Failed to encode {:?}: {}", msg, e);
            Ok(())
        }
    }
}
