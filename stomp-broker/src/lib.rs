//! The STOMP 1.2 broker session engine: destination registry, subscription
//! and acknowledgement bookkeeping, client-scoped transactions, the
//! connection state machine and heartbeat negotiation.
//!
//! This crate knows nothing about sockets: frames arrive through
//! [`session::Session::handle_frame`] and leave through a [`sink::FrameSink`]
//! supplied by the transport. See `stomp-tokio` for the async driver that
//! wires this engine to a TCP listener.

pub mod ack;
pub mod auth;
pub mod config;
pub mod destination;
pub mod error;
pub mod heartbeat;
pub mod hooks;
pub mod outbound;
pub mod server;
pub mod session;
pub mod sink;
pub mod subscription;
pub mod transaction;

pub use ack::AckMode;
pub use auth::AuthProvider;
pub use config::{Heartbeat, ServerConfig};
pub use destination::{DestinationKind, Registry};
pub use error::ProtocolError;
pub use outbound::Outbound;
pub use server::Server;
pub use session::{Session, State};
pub use sink::{FrameSink, SendError};
pub use subscription::Subscription;
pub use transaction::{Buffered, Transaction};
