//! Header name constants and the ordered header list.
//!
//! STOMP headers are a multimap: repeated header names are legal on the
//! wire and, per the spec, "only the first header entry should be used".
//! [`HeaderList`] preserves insertion order (so serialization round-trips
//! the client's own header order) but [`HeaderList::get`] always resolves
//! to the first match.

use core::fmt;

pub mod name {
	pub const DESTINATION: &str = "destination";
	pub const ID: &str = "id";
	pub const SUBSCRIPTION: &str = "subscription";
	pub const ACK: &str = "ack";
	pub const MESSAGE_ID: &str = "message-id";
	pub const TRANSACTION: &str = "transaction";
	pub const RECEIPT: &str = "receipt";
	pub const RECEIPT_ID: &str = "receipt-id";
	pub const HEART_BEAT: &str = "heart-beat";
	pub const CONTENT_LENGTH: &str = "content-length";
	pub const CONTENT_TYPE: &str = "content-type";
	pub const ACCEPT_VERSION: &str = "accept-version";
	pub const VERSION: &str = "version";
	pub const HOST: &str = "host";
	pub const LOGIN: &str = "login";
	pub const PASSCODE: &str = "passcode";
	pub const SESSION: &str = "session";
	pub const SERVER: &str = "server";
	pub const MESSAGE: &str = "message";
}

/// An ordered `key: value` header list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn with_capacity(cap: usize) -> Self {
		Self(Vec::with_capacity(cap))
	}

	/// Appends a header, preserving any existing entry with the same name.
	pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.0.push((name.into(), value.into()));
		self
	}

	/// Returns the value of the first header with this name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	/// Replaces all existing headers with this name with a single entry.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
		let name = name.into();
		self.0.retain(|(k, _)| k != &name);
		self.0.push((name, value.into()));
		self
	}

	pub fn remove(&mut self, name: &str) -> &mut Self {
		self.0.retain(|(k, _)| k != name);
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.iter().any(|(k, _)| k == name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for HeaderList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (k, v) in &self.0 {
			writeln!(f, "{k}:{v}")?;
		}
		Ok(())
	}
}

impl FromIterator<(String, String)> for HeaderList {
	fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// Escapes `\r`, `\n`, `:` and `\` per STOMP 1.2 section "Value Encoding".
///
/// CONNECT and CONNECTED frames are exempt (1.0 backward compatibility) and
/// should be passed through [`HeaderList`] unescaped by the caller.
pub fn escape(value: &str) -> String {
	if !value.contains(['\\', '\r', '\n', ':']) {
		return value.to_owned();
	}

	let mut out = String::with_capacity(value.len() + 4);
	for c in value.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\r' => out.push_str("\\r"),
			'\n' => out.push_str("\\n"),
			':' => out.push_str("\\c"),
			_ => out.push(c),
		}
	}
	out
}

#[derive(Debug, thiserror::Error)]
#[error("invalid header escape sequence")]
pub struct InvalidEscape;

/// Reverses [`escape`]. An unrecognised escape sequence (anything other
/// than `\r`, `\n`, `\c`, `\\`) is a protocol error per the spec.
pub fn unescape(value: &str) -> Result<String, InvalidEscape> {
	if !value.contains('\\') {
		return Ok(value.to_owned());
	}

	let mut out = String::with_capacity(value.len());
	let mut chars = value.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('r') => out.push('\r'),
			Some('n') => out.push('\n'),
			Some('c') => out.push(':'),
			Some('\\') => out.push('\\'),
			_ => return Err(InvalidEscape),
		}
	}
	Ok(out)
}
