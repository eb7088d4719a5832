//! Arrivals shown on the room-selection page. The page holds its own socket
//! while it is mounted and lists every `playerJoined` that reaches it.

use crate::websocket::WsTransport;
use leptos::prelude::*;
use shared::lobby::Lobby;
use shared::{Transport, TransportError};
use std::cell::RefCell;
use web_sys::console;

thread_local! {
    static WATCH: RefCell<Option<Watch>> = const { RefCell::new(None) };
}

struct Watch {
    transport: WsTransport,
    lobby: Lobby,
    users: RwSignal<String>,
}

pub fn watch(url: &str, users: RwSignal<String>) -> Result<(), TransportError> {
    release();
    let transport = WsTransport::connect(url, on_text, || {
        console::log_1(&"Disconnected from server".into());
    })?;
    let lobby = Lobby::new();
    users.set(lobby.summary());
    WATCH.with(|cell| {
        *cell.borrow_mut() = Some(Watch {
            transport,
            lobby,
            users,
        })
    });
    Ok(())
}

pub fn release() {
    let watch = WATCH.with(|cell| cell.borrow_mut().take());
    if let Some(mut watch) = watch {
        watch.transport.close();
    }
}

fn on_text(text: String) {
    WATCH.with(|cell| {
        if let Some(watch) = cell.borrow_mut().as_mut() {
            match watch.lobby.receive(&text) {
                Ok(true) => watch.users.set(watch.lobby.summary()),
                Ok(false) => {}
                Err(e) => console::warn_1(&e.to_string().into()),
            }
        }
    });
}
