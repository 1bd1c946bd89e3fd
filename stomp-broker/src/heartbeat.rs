//! Heart-beat negotiation, kept free of any timer so it can be unit tested
//! without an async runtime. The actual ticking lives with the transport.

/// One side's proposal: `(x, y)` where `x` is the shortest interval it can
/// guarantee sending at and `y` is the shortest interval it wants to
/// receive at, both in milliseconds. `0` means "none".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal {
	pub x: u64,
	pub y: u64,
}

/// The negotiated outcome for one connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Negotiated {
	/// How often the server must send something to the client, or `0` for
	/// never.
	pub outgoing_ms: u64,
	/// How often the client promised to send something, or `0` if the
	/// server won't police it.
	pub incoming_ms: u64,
}

/// Negotiates heart-beats per the STOMP 1.1+ `heart-beat` header rules:
/// `ping = cx==0 || sy==0 ? 0 : max(cx, sy)`, `pong = sx==0 || cy==0 ? 0 :
/// max(sx, cy)`, where `client` is `(cx, cy)` and `server` is `(sx, sy)`.
pub fn negotiate(client: Proposal, server: Proposal) -> Negotiated {
	let outgoing_ms = if client.x == 0 || server.y == 0 { 0 } else { client.x.max(server.y) };
	let incoming_ms = if server.x == 0 || client.y == 0 { 0 } else { server.x.max(client.y) };
	Negotiated { outgoing_ms, incoming_ms }
}

/// Parses a `heart-beat` header value (`"x,y"`), defaulting to `(0, 0)` if
/// absent or malformed.
pub fn parse_header(value: Option<&str>) -> Proposal {
	let Some(value) = value else { return Proposal { x: 0, y: 0 } };
	let mut parts = value.splitn(2, ',');
	let x = parts.next().and_then(|p| p.trim().parse().ok()).unwrap_or(0);
	let y = parts.next().and_then(|p| p.trim().parse().ok()).unwrap_or(0);
	Proposal { x, y }
}

/// A connection is overdue for disconnection once it's been silent for
/// longer than twice the interval it promised to send at.
pub fn is_overdue(incoming_ms: u64, silence_ms: u64) -> bool {
	incoming_ms != 0 && silence_ms > incoming_ms.saturating_mul(2)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn negotiates_the_slower_of_the_two_sides() {
		let negotiated = negotiate(Proposal { x: 5000, y: 5000 }, Proposal { x: 1000, y: 1000 });
		assert_eq!(negotiated.outgoing_ms, 5000);
		assert_eq!(negotiated.incoming_ms, 5000);
	}

	#[test]
	fn outgoing_uses_client_x_and_server_y_incoming_uses_server_x_and_client_y() {
		// client heart-beat: cx=3000,cy=4000; server heart-beat: sx=1000,sy=1000.
		let negotiated = negotiate(Proposal { x: 3000, y: 4000 }, Proposal { x: 1000, y: 1000 });
		assert_eq!(negotiated.outgoing_ms, 3000, "ping = max(cx, sy)");
		assert_eq!(negotiated.incoming_ms, 4000, "pong = max(sx, cy)");
	}

	#[test]
	fn either_side_can_opt_out() {
		let negotiated = negotiate(Proposal { x: 0, y: 5000 }, Proposal { x: 1000, y: 1000 });
		assert_eq!(negotiated.outgoing_ms, 0, "client.x == 0 disables outgoing pings");
		assert_eq!(negotiated.incoming_ms, 5000);
	}

	#[test]
	fn overdue_after_twice_the_promised_interval() {
		assert!(!is_overdue(1000, 1999));
		assert!(is_overdue(1000, 2001));
		assert!(!is_overdue(0, 100_000), "no promise means no deadline");
	}
}
