//! Wire codec for STOMP 1.0/1.1/1.2 text framing.
//!
//! A transmission is either a complete frame (command line, header lines,
//! blank line, body, NUL terminator) or a bare heartbeat: a single EOL
//! received while idle between frames. [`scan`] reports how many bytes of
//! a buffer make up the next transmission without consuming anything,
//! mirroring the check/parse split `stomp-protocol` inherited from the
//! binary MQTT frame reader it was adapted from -- here the "length
//! prefix" is simply "read until NUL", optionally bounded by
//! `content-length`.

use crate::{
	command::Command,
	error::{CodecError, SerializeError},
	frame::{Frame, Transmission},
	headers::{self, name, HeaderList},
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Frame-parser guards, configurable per [`Limits::default`].
#[derive(Clone, Copy, Debug)]
pub struct Limits {
	pub max_header_length: usize,
	pub max_headers: usize,
	pub max_body_length: usize,
	/// Whether a lone EOL between frames is tolerated as a bare heartbeat
	/// rather than treated as the start of a malformed frame. Most clients
	/// send one after every frame's NUL terminator.
	pub trailing_line: bool,
}

impl Default for Limits {
	fn default() -> Self {
		Self {
			max_header_length: 8 * 1024,
			max_headers: 1000,
			max_body_length: 16 * 1024 * 1024,
			trailing_line: true,
		}
	}
}

/// Outcome of scanning a buffer for the next transmission.
pub enum Scan {
	/// Not enough data buffered yet.
	Incomplete,
	/// A bare heartbeat EOL; consume `len` bytes.
	HeartBeat { len: usize },
	/// A complete frame; consume `len` bytes and hand them to [`parse`].
	Frame { len: usize },
}

/// Scans `buf` for the next transmission without consuming it.
pub fn scan(buf: &[u8], limits: &Limits) -> Result<Scan, CodecError> {
	// A lone '\n' (optionally preceded by '\r') before any command text is
	// a heartbeat.
	if let Some(&first) = buf.first() {
		if first == b'\n' {
			if !limits.trailing_line {
				return Err(CodecError::Malformed("unexpected EOL between frames"));
			}
			return Ok(Scan::HeartBeat { len: 1 });
		}
	} else {
		return Ok(Scan::Incomplete);
	}

	let Some(command_end) = find_newline(buf, 0) else {
		if buf.len() > limits.max_header_length {
			return Err(CodecError::HeaderTooLong);
		}
		return Ok(Scan::Incomplete);
	};

	let mut pos = command_end + 1;
	let mut header_count = 0usize;
	let mut content_length: Option<usize> = None;

	loop {
		if pos > buf.len() {
			return Ok(Scan::Incomplete);
		}
		// A blank line (just EOL) ends the header block.
		if buf[pos..].first() == Some(&b'\n') {
			pos += 1;
			break;
		}
		if buf[pos..].first() == Some(&b'\r') && buf.get(pos + 1) == Some(&b'\n') {
			pos += 2;
			break;
		}

		let Some(line_end) = find_newline(buf, pos) else {
			if buf.len() - pos > limits.max_header_length {
				return Err(CodecError::HeaderTooLong);
			}
			return Ok(Scan::Incomplete);
		};

		header_count += 1;
		if header_count > limits.max_headers {
			return Err(CodecError::TooManyHeaders);
		}
		if line_end - pos > limits.max_header_length {
			return Err(CodecError::HeaderTooLong);
		}

		if content_length.is_none() {
			if let Ok(line) = std::str::from_utf8(&buf[pos..trim_cr(buf, pos, line_end)]) {
				if let Some(value) = line.strip_prefix("content-length:") {
					content_length =
						Some(value.trim().parse().map_err(|_| CodecError::InvalidContentLength)?);
				}
			}
		}

		pos = line_end + 1;
	}

	let body_start = pos;
	let body_end = match content_length {
		Some(len) => {
			if len > limits.max_body_length {
				return Err(CodecError::BodyTooLong);
			}
			let end = body_start.checked_add(len).ok_or(CodecError::BodyTooLong)?;
			if end >= buf.len() {
				return Ok(Scan::Incomplete);
			}
			if buf[end] != 0 {
				return Err(CodecError::Malformed("expected NUL at end of content-length body"));
			}
			end
		}
		None => {
			let Some(nul) = buf[body_start..].iter().position(|&b| b == 0) else {
				if buf.len() - body_start > limits.max_body_length {
					return Err(CodecError::BodyTooLong);
				}
				return Ok(Scan::Incomplete);
			};
			if nul > limits.max_body_length {
				return Err(CodecError::BodyTooLong);
			}
			body_start + nul
		}
	};

	Ok(Scan::Frame { len: body_end + 1 })
}

fn find_newline(buf: &[u8], from: usize) -> Option<usize> {
	buf[from..].iter().position(|&b| b == b'\n').map(|p| from + p)
}

fn trim_cr(buf: &[u8], start: usize, end: usize) -> usize {
	if end > start && buf[end - 1] == b'\r' {
		end - 1
	} else {
		end
	}
}

/// Parses exactly one complete transmission of `len` bytes, as reported by
/// a prior call to [`scan`].
pub fn parse(buf: &[u8]) -> Result<Transmission, CodecError> {
	if buf.first() == Some(&b'\n') {
		return Ok(Transmission::HeartBeat);
	}

	let command_end = find_newline(buf, 0).ok_or(CodecError::Malformed("missing command line"))?;
	let command_line = std::str::from_utf8(&buf[..trim_cr(buf, 0, command_end)])?;
	let command: Command = command_line.parse()?;
	let unescape_headers = !matches!(command, Command::Connect | Command::Stomp | Command::Connected);

	let mut pos = command_end + 1;
	let mut headers = HeaderList::new();
	loop {
		if buf[pos..].first() == Some(&b'\n') {
			pos += 1;
			break;
		}
		if buf[pos..].first() == Some(&b'\r') && buf.get(pos + 1) == Some(&b'\n') {
			pos += 2;
			break;
		}

		let line_end = find_newline(buf, pos).ok_or(CodecError::Malformed("unterminated header line"))?;
		let line = std::str::from_utf8(&buf[pos..trim_cr(buf, pos, line_end)])?;
		let Some((raw_key, raw_value)) = line.split_once(':') else {
			return Err(CodecError::Malformed("header line missing ':'"));
		};

		let (key, value) = if unescape_headers {
			(headers::unescape(raw_key)?, headers::unescape(raw_value)?)
		} else {
			(raw_key.to_owned(), raw_value.to_owned())
		};
		headers.push(key, value);

		pos = line_end + 1;
	}

	let content_length: Option<usize> = match headers.get(name::CONTENT_LENGTH) {
		Some(v) => Some(v.parse().map_err(|_| CodecError::InvalidContentLength)?),
		None => None,
	};

	let body_start = pos;
	let body_end = match content_length {
		Some(len) => body_start + len,
		None => buf[body_start..]
			.iter()
			.position(|&b| b == 0)
			.map(|p| body_start + p)
			.ok_or(CodecError::Malformed("missing NUL terminator"))?,
	};

	let body = Bytes::copy_from_slice(&buf[body_start..body_end]);
	Ok(Transmission::CompleteFrame(Frame { command, headers, body }))
}

/// Consumes the next transmission from `buf`, returning `None` if more
/// data is needed.
pub fn decode(buf: &mut BytesMut, limits: &Limits) -> Result<Option<Transmission>, CodecError> {
	match scan(buf, limits)? {
		Scan::Incomplete => Ok(None),
		Scan::HeartBeat { len } => {
			buf.advance(len);
			Ok(Some(Transmission::HeartBeat))
		}
		Scan::Frame { len } => {
			let transmission = parse(&buf[..len])?;
			buf.advance(len);
			Ok(Some(transmission))
		}
	}
}

/// Serializes `frame` onto `dst`, escaping header values per 1.2 (unless
/// this is a CONNECT/CONNECTED frame) and writing an exact
/// `content-length`.
pub fn encode(frame: &Frame, dst: &mut BytesMut) -> Result<(), SerializeError> {
	dst.put_slice(frame.command.as_str().as_bytes());
	dst.put_u8(b'\n');

	let escape_headers = frame.escapes_headers();
	for (k, v) in frame.headers.iter() {
		if k == name::CONTENT_LENGTH {
			continue;
		}
		if escape_headers {
			dst.put_slice(headers::escape(k).as_bytes());
			dst.put_u8(b':');
			dst.put_slice(headers::escape(v).as_bytes());
		} else {
			dst.put_slice(k.as_bytes());
			dst.put_u8(b':');
			dst.put_slice(v.as_bytes());
		}
		dst.put_u8(b'\n');
	}

	if !frame.body.is_empty() || frame.headers.contains(name::CONTENT_LENGTH) {
		dst.put_slice(format!("content-length:{}\n", frame.body.len()).as_bytes());
	}

	dst.put_u8(b'\n');
	dst.put_slice(&frame.body);
	dst.put_u8(0);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::headers::name;

	fn limits() -> Limits {
		Limits::default()
	}

	#[test]
	fn round_trips_a_send_frame() {
		let mut headers = HeaderList::new();
		headers.push(name::DESTINATION, "/queue/a");
		headers.push(name::RECEIPT, "r-1");
		let frame = Frame::new(Command::Send, headers, Bytes::from_static(b"hello"));

		let mut buf = BytesMut::new();
		encode(&frame, &mut buf).unwrap();

		let decoded = decode(&mut buf, &limits()).unwrap().unwrap();
		let Transmission::CompleteFrame(decoded) = decoded else {
			panic!("expected a complete frame");
		};
		assert_eq!(decoded.command, Command::Send);
		assert_eq!(decoded.header(name::DESTINATION), Some("/queue/a"));
		assert_eq!(&decoded.body[..], b"hello");
		assert!(buf.is_empty());
	}

	#[test]
	fn escapes_and_unescapes_header_values() {
		let mut headers = HeaderList::new();
		headers.push(name::MESSAGE, "bad:frame\nwith\\stuff");
		let frame = Frame::new(Command::Error, headers, Bytes::new());

		let mut buf = BytesMut::new();
		encode(&frame, &mut buf).unwrap();

		let decoded = decode(&mut buf, &limits()).unwrap().unwrap();
		let Transmission::CompleteFrame(decoded) = decoded else {
			panic!("expected a complete frame");
		};
		assert_eq!(decoded.header(name::MESSAGE), Some("bad:frame\nwith\\stuff"));
	}

	#[test]
	fn connect_frames_are_not_escaped() {
		let mut buf = BytesMut::from(&b"CONNECT\naccept-version:1.2\nhost:localhost\n\n\0"[..]);
		let decoded = decode(&mut buf, &limits()).unwrap().unwrap();
		let Transmission::CompleteFrame(frame) = decoded else {
			panic!("expected a complete frame");
		};
		assert_eq!(frame.command, Command::Connect);
		assert_eq!(frame.header(name::HOST), Some("localhost"));
	}

	#[test]
	fn a_lone_newline_is_a_heartbeat() {
		let mut buf = BytesMut::from(&b"\n"[..]);
		let decoded = decode(&mut buf, &limits()).unwrap().unwrap();
		assert!(matches!(decoded, Transmission::HeartBeat));
		assert!(buf.is_empty());
	}

	#[test]
	fn incomplete_frame_returns_none() {
		let mut buf = BytesMut::from(&b"SEND\ndestination:/queue/a\n\nhel"[..]);
		assert!(decode(&mut buf, &limits()).unwrap().is_none());
	}

	#[test]
	fn content_length_bounds_body_with_embedded_nul() {
		let mut buf = BytesMut::new();
		buf.put_slice(b"SEND\ndestination:/queue/a\ncontent-length:5\n\nhe\0lo\0");
		let decoded = decode(&mut buf, &limits()).unwrap().unwrap();
		let Transmission::CompleteFrame(frame) = decoded else {
			panic!("expected a complete frame");
		};
		assert_eq!(&frame.body[..], b"he\0lo");
	}

	#[test]
	fn trailing_line_can_be_disabled() {
		let mut limits = limits();
		limits.trailing_line = false;
		let mut buf = BytesMut::from(&b"\n"[..]);
		assert!(matches!(decode(&mut buf, &limits), Err(CodecError::Malformed(_))));
	}

	#[test]
	fn rejects_too_many_headers() {
		let mut limits = limits();
		limits.max_headers = 1;
		let mut buf = BytesMut::new();
		buf.put_slice(b"SEND\na:1\nb:2\n\n\0");
		assert!(matches!(decode(&mut buf, &limits), Err(CodecError::TooManyHeaders)));
	}
}
