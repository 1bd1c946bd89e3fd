use crate::headers::{name, HeaderList};
use crate::Command;
use bytes::Bytes;

/// A complete STOMP frame: command, ordered headers and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	pub command: Command,
	pub headers: HeaderList,
	pub body: Bytes,
}

/// What a single read of the transport yields.
///
/// Mirrors the three-way split a STOMP connection can produce: a
/// complete frame, a bare heartbeat (a lone EOL received between frames),
/// or end-of-stream.
#[derive(Debug)]
pub enum Transmission {
	HeartBeat,
	CompleteFrame(Frame),
	ConnectionClosed,
}

impl Frame {
	pub fn new(command: Command, headers: HeaderList, body: impl Into<Bytes>) -> Self {
		Self {
			command,
			headers,
			body: body.into(),
		}
	}

	pub fn with_command(command: Command) -> Self {
		Self {
			command,
			headers: HeaderList::new(),
			body: Bytes::new(),
		}
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name)
	}

	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.headers.set(name, value);
		self
	}

	/// CONNECT/CONNECTED frames don't escape header values (1.0 compat).
	pub fn escapes_headers(&self) -> bool {
		!matches!(self.command, Command::Connect | Command::Stomp | Command::Connected)
	}

	// -- constructors for frames the broker emits --------------------------

	pub fn connected(version: &str, session: &str, server: &str, heart_beat: (u64, u64)) -> Self {
		let mut headers = HeaderList::with_capacity(4);
		headers
			.push(name::VERSION, version)
			.push(name::SESSION, session)
			.push(name::SERVER, server)
			.push(name::HEART_BEAT, format!("{},{}", heart_beat.0, heart_beat.1));
		Self::new(Command::Connected, headers, Bytes::new())
	}

	pub fn receipt(receipt_id: &str) -> Self {
		let mut headers = HeaderList::with_capacity(1);
		headers.push(name::RECEIPT_ID, receipt_id);
		Self::new(Command::Receipt, headers, Bytes::new())
	}

	pub fn error(message: &str, body: impl Into<Bytes>) -> Self {
		let mut headers = HeaderList::with_capacity(1);
		headers.push(name::MESSAGE, message);
		Self::new(Command::Error, headers, body)
	}

	pub fn message(
		destination: &str,
		subscription: &str,
		message_id: &str,
		ack_id: Option<&str>,
		source_headers: &HeaderList,
		body: impl Into<Bytes>,
	) -> Self {
		let mut headers = HeaderList::with_capacity(source_headers.len() + 3);
		for (k, v) in source_headers.iter() {
			// `transaction` is kept: a MESSAGE delivered from a committed
			// transaction carries the tx-id it was sent under. `receipt` and
			// `content-length` are per-hop and recomputed for this frame.
			if matches!(k, name::DESTINATION | name::RECEIPT | name::CONTENT_LENGTH) {
				continue;
			}
			headers.push(k, v);
		}
		headers.push(name::DESTINATION, destination);
		headers.push(name::SUBSCRIPTION, subscription);
		headers.push(name::MESSAGE_ID, message_id);
		if let Some(ack_id) = ack_id {
			headers.push(name::ACK, ack_id);
		}
		Self::new(Command::Message, headers, body)
	}
}
