//! Connection lifecycle for one race page.
//!
//! [`RaceConnection`] owns at most one [`Transport`] and the [`RaceClient`] it
//! feeds. Opening is idempotent and announces membership; closing releases the
//! transport, which must unregister its event handlers so no late frame can
//! reach the client. Business logic stays in the client; this layer only
//! decodes, dispatches and forwards.

use crate::client::RaceClient;
use crate::error::{RaceError, TransportError};
use crate::fsm::RaceState;
use crate::protocol::{ClientMsg, ServerMsg};
use tracing::{debug, info, warn};

/// A bidirectional text channel to the coordination service.
pub trait Transport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Tears the channel down and drops every registered handler.
    fn close(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
    Closed,
    Open,
    /// The transport reported a disconnect. Local state is kept but frozen.
    Lost,
}

pub struct RaceConnection<T: Transport> {
    transport: Option<T>,
    link: Link,
    client: RaceClient,
}

impl<T: Transport> RaceConnection<T> {
    pub fn new(client: RaceClient) -> Self {
        Self {
            transport: None,
            link: Link::Closed,
            client,
        }
    }

    pub fn client(&self) -> &RaceClient {
        &self.client
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// Establishes the transport and announces membership. A second call while
    /// a transport is held is a no-op and returns `Ok(false)`.
    pub fn open<F>(&mut self, connect: F) -> Result<bool, RaceError>
    where
        F: FnOnce() -> Result<T, TransportError>,
    {
        if self.transport.is_some() {
            debug!("connection already open");
            return Ok(false);
        }
        self.transport = Some(connect()?);
        self.link = Link::Open;
        info!("connection opened for room {}", self.client.session().room_id);

        if let Some(join) = self.client.join() {
            self.send(&join)?;
        }
        Ok(true)
    }

    /// Releases the transport and discards the session, so a later `open`
    /// starts from `Idle` and announces membership again. Safe to call on
    /// every exit path.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            info!("connection closed for room {}", self.client.session().room_id);
        }
        self.link = Link::Closed;
        if self.client.status() != RaceState::Idle {
            let session = self.client.session();
            self.client = RaceClient::new(session.room_id.clone(), session.self_id.clone());
        }
    }

    /// Transport-level disconnect notice. Logged only; no retry and no reset.
    pub fn disconnected(&mut self) {
        if self.link == Link::Open {
            warn!(
                "disconnected from room {} while {}",
                self.client.session().room_id,
                self.client.status().as_str()
            );
            self.link = Link::Lost;
        }
    }

    /// Decodes and dispatches one inbound frame. Returns the new race state
    /// when the frame caused a transition.
    pub fn receive(&mut self, text: &str, now_ms: u64) -> Result<Option<RaceState>, RaceError> {
        if self.link != Link::Open {
            debug!("dropping frame on {:?} connection", self.link);
            return Ok(None);
        }
        let msg = ServerMsg::from_json(text)?;
        Ok(self.client.handle(msg, now_ms))
    }

    /// Local text edit. Pushes the resulting standing when the edit counted.
    pub fn type_text(&mut self, text: &str) -> Result<(), RaceError> {
        match self.client.type_text(text) {
            Some(update) => self.push(&update),
            None => Ok(()),
        }
    }

    /// One-second metrics tick. Stops once the link is lost.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), RaceError> {
        if self.link != Link::Open {
            return Ok(());
        }
        match self.client.tick(now_ms) {
            Some(update) => self.send(&update),
            None => Ok(()),
        }
    }

    /// Leaves `Finished` for `Idle` without touching the transport.
    pub fn reset(&mut self) -> bool {
        self.client.reset()
    }

    /// Re-announces membership after a reset, reusing the open transport.
    pub fn rejoin(&mut self) -> Result<bool, RaceError> {
        if self.link != Link::Open {
            return Err(RaceError::NotConnected);
        }
        match self.client.join() {
            Some(join) => self.send(&join).map(|_| true),
            None => Ok(false),
        }
    }

    fn push(&mut self, msg: &ClientMsg) -> Result<(), RaceError> {
        if self.link == Link::Lost {
            debug!("link lost, keeping update local");
            return Ok(());
        }
        self.send(msg)
    }

    fn send(&mut self, msg: &ClientMsg) -> Result<(), RaceError> {
        let transport = self.transport.as_mut().ok_or(RaceError::NotConnected)?;
        let text = msg.to_json()?;
        transport.send_text(&text)?;
        Ok(())
    }
}

impl<T: Transport> Drop for RaceConnection<T> {
    fn drop(&mut self) {
        self.close();
    }
}
