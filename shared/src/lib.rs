//! Race synchronization core shared by the browser client and the
//! coordination service: the wire contract plus the client-side race state
//! machine, input validation, metrics and roster reconciliation.

pub mod bootstrap;
pub mod client;
pub mod connection;
pub mod error;
pub mod fsm;
pub mod lobby;
pub mod protocol;
pub mod roster;
pub mod session;
pub mod validator;
pub mod wpm;

pub use client::RaceClient;
pub use connection::{Link, RaceConnection, Transport};
pub use error::{BootstrapError, RaceError, TransportError};
