use stomp_protocol::CodecError;
use thiserror::Error;

/// A protocol-level fault. Every variant maps to an ERROR frame `message`
/// header (see [`ProtocolError::message`]) and, per the spec, is always
/// followed by closing the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
	#[error("already connected")]
	AlreadyConnected,
	#[error("not connected")]
	NotConnected,
	#[error("no acceptable STOMP version in accept-version: {0:?}")]
	UnsupportedVersion(String),
	#[error("Authentication failed")]
	AuthenticationFailed,
	#[error("missing required header '{0}'")]
	MissingHeader(&'static str),
	#[error("duplicate subscription id")]
	DuplicateSubscription,
	#[error("unknown subscription")]
	UnknownSubscription,
	#[error("Already existing transaction")]
	AlreadyExistingTransaction,
	#[error("Unknown transaction")]
	UnknownTransaction,
	#[error("too many frames in transaction")]
	TooManyFramesInTransaction,
	#[error("frame body exceeds the configured length limit")]
	BodyTooLong,
	#[error("frame has too many headers, or a header exceeds the configured length limit")]
	HeaderLimitExceeded,
	#[error("unknown command '{0}'")]
	UnknownCommand(String),
	#[error("{0}")]
	MalformedFrame(String),
}

/// The parser is an external collaborator (spec §1), but any fault it
/// raises still has to become an ERROR frame and a close, same as every
/// other [`ProtocolError`] -- see `Session::fail_with_codec_error`.
impl From<CodecError> for ProtocolError {
	fn from(err: CodecError) -> Self {
		match err {
			CodecError::HeaderTooLong | CodecError::TooManyHeaders => Self::HeaderLimitExceeded,
			CodecError::BodyTooLong => Self::BodyTooLong,
			other => Self::MalformedFrame(other.to_string()),
		}
	}
}

impl ProtocolError {
	/// The literal text the spec requires in the ERROR frame's `message`
	/// header. Kept distinct from `Display` so wording changes to the
	/// human-readable error don't silently break the wire contract tests
	/// match against (see spec scenarios S3-S5).
	pub fn message(&self) -> String {
		match self {
			Self::AlreadyConnected => "already connected".to_owned(),
			Self::NotConnected => "not connected".to_owned(),
			Self::UnsupportedVersion(_) => "no acceptable version".to_owned(),
			Self::AuthenticationFailed => "Authentication failed".to_owned(),
			Self::MissingHeader(h) => format!("missing required header '{h}'"),
			Self::DuplicateSubscription => "duplicate subscription id".to_owned(),
			Self::UnknownSubscription => "unknown subscription".to_owned(),
			Self::AlreadyExistingTransaction => "Already existing transaction".to_owned(),
			Self::UnknownTransaction => "Unknown transaction".to_owned(),
			Self::TooManyFramesInTransaction => "too many frames in transaction".to_owned(),
			Self::BodyTooLong | Self::HeaderLimitExceeded => self.to_string(),
			Self::UnknownCommand(cmd) => format!("unknown command '{cmd}'"),
			Self::MalformedFrame(detail) => detail.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_and_body_limit_errors_map_to_dedicated_variants() {
		assert_eq!(ProtocolError::from(CodecError::TooManyHeaders), ProtocolError::HeaderLimitExceeded);
		assert_eq!(ProtocolError::from(CodecError::HeaderTooLong), ProtocolError::HeaderLimitExceeded);
		assert_eq!(ProtocolError::from(CodecError::BodyTooLong), ProtocolError::BodyTooLong);
	}

	#[test]
	fn other_codec_faults_carry_their_detail_through() {
		let err = ProtocolError::from(CodecError::Malformed("missing command line"));
		assert!(matches!(err, ProtocolError::MalformedFrame(_)));
		assert!(err.message().contains("missing command line"));
	}
}
