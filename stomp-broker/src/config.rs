#[cfg(feature = "serde")]
use serde::Deserialize;

/// Heartbeat period pair, in milliseconds, as the server advertises in its
/// own `heart-beat` header: `sx` is how often the server promises to send,
/// `sy` is how often it expects to hear from the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Heartbeat {
	pub sx: u64,
	pub sy: u64,
}

impl Default for Heartbeat {
	fn default() -> Self {
		Self { sx: 1000, sy: 1000 }
	}
}

/// Server-wide configuration. Mirrors the enumerated options in the spec's
/// "External Interfaces" section.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServerConfig {
	pub heartbeat: Heartbeat,

	/// `<= 0` disables the per-transaction frame cap.
	pub max_frame_in_transaction: i64,

	/// `0` disables chunking: a COMMIT dispatches its whole buffer in one
	/// scheduler turn.
	pub transaction_chunk_size: usize,

	pub max_body_length: usize,
	pub max_header_length: usize,
	pub max_headers: usize,

	/// When set, CONNECT requires a successful [`crate::auth::AuthProvider`]
	/// call.
	pub secured: bool,

	/// Accept a trailing `\n` between frames (most clients send one after
	/// the NUL terminator).
	pub trailing_line: bool,

	/// Versions offered during CONNECT negotiation, highest-preferred last
	/// is not assumed -- the negotiation picks the highest version common
	/// to this list and the client's `accept-version`.
	pub supported_versions: Vec<String>,

	/// Remove a destination from the registry once its last subscriber
	/// unsubscribes.
	pub auto_gc_destinations: bool,

	/// Reject ACK/NACK frames bearing an unrecognised ack-id with an ERROR
	/// instead of silently ignoring them.
	pub strict_ack: bool,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			heartbeat: Heartbeat::default(),
			max_frame_in_transaction: 1000,
			transaction_chunk_size: 0,
			max_body_length: 16 * 1024 * 1024,
			max_header_length: 8 * 1024,
			max_headers: 1000,
			secured: false,
			trailing_line: true,
			supported_versions: vec!["1.0".to_owned(), "1.1".to_owned(), "1.2".to_owned()],
			auto_gc_destinations: true,
			strict_ack: false,
		}
	}
}

impl ServerConfig {
	/// `None` when the cap is disabled (`max_frame_in_transaction <= 0`).
	pub fn transaction_frame_cap(&self) -> Option<usize> {
		if self.max_frame_in_transaction <= 0 {
			None
		} else {
			Some(self.max_frame_in_transaction as usize)
		}
	}

	pub fn limits(&self) -> stomp_protocol::Limits {
		stomp_protocol::Limits {
			max_header_length: self.max_header_length,
			max_headers: self.max_headers,
			max_body_length: self.max_body_length,
			trailing_line: self.trailing_line,
		}
	}
}
