//! Async TCP transport for the STOMP broker engine in `stomp-broker`.
//!
//! Owns the socket, the per-connection read/write loop and the heartbeat
//! timers; the protocol and session semantics live entirely in
//! `stomp-broker` and `stomp-protocol`.

use std::time::Duration;

mod connection;
mod listener;
mod sink;

pub use connection::run_connection;
pub use listener::serve;
pub use sink::MpscSink;

/// How often the connection loop checks whether it's time to send a ping
/// or whether the peer has gone quiet. Independent of the negotiated
/// heartbeat periods themselves, which are usually much longer.
const TIMER_RESOLUTION: Duration = Duration::from_millis(100);
