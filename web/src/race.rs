//! The race currently shown by the race page.
//!
//! At most one race is active per page. [`start`] acquires it (socket plus
//! metrics interval) and [`release`] tears both down; the race page calls
//! `release` from its cleanup, so every way off the page closes the socket.

use crate::websocket::WsTransport;
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use shared::bootstrap::RaceTicket;
use shared::fsm::RaceState;
use shared::roster::Standing;
use shared::wpm::TICK_INTERVAL_MS;
use shared::{Link, RaceClient, RaceConnection, RaceError};
use std::cell::RefCell;
use web_sys::console;

thread_local! {
    static ACTIVE: RefCell<Option<ActiveRace>> = const { RefCell::new(None) };
}

/// Snapshot of the race rendered by the page.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceView {
    pub self_id: String,
    pub status: RaceState,
    pub paragraph: String,
    pub typed: String,
    pub is_correct: bool,
    pub progress: f64,
    pub correct_len: usize,
    /// The whole paragraph has been typed exactly.
    pub complete: bool,
    pub wpm: u32,
    pub winner: Option<String>,
    pub leaderboard: Vec<Standing>,
    pub connected: bool,
}

impl RaceView {
    pub fn from_client(client: &RaceClient, link: Link) -> Self {
        let session = client.session();
        Self {
            self_id: session.self_id.clone(),
            status: session.status,
            paragraph: session.paragraph.clone(),
            typed: session.typed_text.clone(),
            is_correct: session.is_correct,
            progress: session.progress,
            correct_len: session.last_correct_length,
            complete: client.validation().is_complete(),
            wpm: session.wpm,
            winner: session.winner_id.clone(),
            leaderboard: client.leaderboard(),
            connected: link == Link::Open,
        }
    }

    pub fn winner_line(&self) -> String {
        match self.winner.as_deref() {
            Some(w) if w == self.self_id => "You won!".to_string(),
            Some(w) => format!("{} won!", w),
            None => String::new(),
        }
    }
}

struct ActiveRace {
    conn: RaceConnection<WsTransport>,
    view: RwSignal<RaceView>,
    metrics: Option<Interval>,
}

impl ActiveRace {
    /// Publishes the new snapshot and keeps the metrics interval running
    /// exactly while racing.
    fn sync(&mut self) {
        let racing = self.conn.client().status() == RaceState::Racing;
        match (racing, self.metrics.is_some()) {
            (true, false) => {
                self.metrics = Some(Interval::new(TICK_INTERVAL_MS, || {
                    with_active(|race| {
                        if let Err(e) = race.conn.tick(now_ms()) {
                            log_error(&e);
                        }
                        race.sync();
                    });
                }));
            }
            (false, true) => {
                // dropping the interval cancels it
                self.metrics = None;
            }
            _ => {}
        }
        self.view
            .set(RaceView::from_client(self.conn.client(), self.conn.link()));
    }
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn log_error(e: &RaceError) {
    console::warn_1(&e.to_string().into());
}

fn with_active<R>(f: impl FnOnce(&mut ActiveRace) -> R) -> Option<R> {
    ACTIVE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Opens the socket for `ticket` and announces the join.
pub fn start(ticket: RaceTicket, url: &str, view: RwSignal<RaceView>) -> Result<(), RaceError> {
    release();

    let client = RaceClient::new(ticket.room_id, ticket.display_name);
    let mut conn = RaceConnection::new(client);
    conn.open(|| WsTransport::connect(url, on_text, on_disconnect))?;

    let mut race = ActiveRace {
        conn,
        view,
        metrics: None,
    };
    race.sync();
    ACTIVE.with(|cell| *cell.borrow_mut() = Some(race));
    Ok(())
}

/// Closes the socket and cancels the metrics interval.
pub fn release() {
    let race = ACTIVE.with(|cell| cell.borrow_mut().take());
    if let Some(mut race) = race {
        race.metrics = None;
        race.conn.close();
    }
}

pub fn type_text(text: &str) {
    with_active(|race| {
        if let Err(e) = race.conn.type_text(text) {
            log_error(&e);
        }
        race.sync();
    });
}

/// Back to `Idle`, then straight into the next round on the same socket.
pub fn play_again() {
    with_active(|race| {
        if race.conn.reset() {
            if let Err(e) = race.conn.rejoin() {
                log_error(&e);
            }
        }
        race.sync();
    });
}

fn on_text(text: String) {
    with_active(|race| {
        if let Err(e) = race.conn.receive(&text, now_ms()) {
            log_error(&e);
        }
        race.sync();
    });
}

fn on_disconnect() {
    with_active(|race| {
        race.conn.disconnected();
        race.sync();
    });
}
