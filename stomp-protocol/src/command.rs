use core::fmt;

/// The STOMP 1.2 frame commands.
///
/// `STOMP` is an alias for `CONNECT` accepted on the wire but never emitted
/// by a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
	Connect,
	Stomp,
	Connected,
	Send,
	Subscribe,
	Unsubscribe,
	Ack,
	Nack,
	Begin,
	Commit,
	Abort,
	Disconnect,
	Message,
	Receipt,
	Error,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown STOMP command: {0:?}")]
pub struct UnknownCommand(pub(crate) String);

impl Command {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Connect => "CONNECT",
			Self::Stomp => "STOMP",
			Self::Connected => "CONNECTED",
			Self::Send => "SEND",
			Self::Subscribe => "SUBSCRIBE",
			Self::Unsubscribe => "UNSUBSCRIBE",
			Self::Ack => "ACK",
			Self::Nack => "NACK",
			Self::Begin => "BEGIN",
			Self::Commit => "COMMIT",
			Self::Abort => "ABORT",
			Self::Disconnect => "DISCONNECT",
			Self::Message => "MESSAGE",
			Self::Receipt => "RECEIPT",
			Self::Error => "ERROR",
		}
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl core::str::FromStr for Command {
	type Err = UnknownCommand;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"CONNECT" => Self::Connect,
			"STOMP" => Self::Stomp,
			"CONNECTED" => Self::Connected,
			"SEND" => Self::Send,
			"SUBSCRIBE" => Self::Subscribe,
			"UNSUBSCRIBE" => Self::Unsubscribe,
			"ACK" => Self::Ack,
			"NACK" => Self::Nack,
			"BEGIN" => Self::Begin,
			"COMMIT" => Self::Commit,
			"ABORT" => Self::Abort,
			"DISCONNECT" => Self::Disconnect,
			"MESSAGE" => Self::Message,
			"RECEIPT" => Self::Receipt,
			"ERROR" => Self::Error,
			other => return Err(UnknownCommand(other.to_owned())),
		})
	}
}
