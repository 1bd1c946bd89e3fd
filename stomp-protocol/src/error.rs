use thiserror::Error;

/// Errors raised while scanning or decoding a frame from the transport.
#[derive(Debug, Error)]
pub enum CodecError {
	#[error("frame exceeds configured header length limit")]
	HeaderTooLong,
	#[error("frame has more headers than the configured limit")]
	TooManyHeaders,
	#[error("frame body exceeds the configured length limit")]
	BodyTooLong,
	#[error("malformed frame: {0}")]
	Malformed(&'static str),
	#[error("invalid header escape sequence")]
	InvalidEscape(#[from] crate::headers::InvalidEscape),
	#[error("unknown command: {0}")]
	UnknownCommand(#[from] crate::command::UnknownCommand),
	#[error("content-length header is not a valid integer")]
	InvalidContentLength,
	#[error(transparent)]
	Utf8(#[from] core::str::Utf8Error),
}

#[derive(Debug, Error)]
#[error("frame does not fit in the output buffer")]
pub struct SerializeError;
