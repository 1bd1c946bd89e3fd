use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use stomp_broker::auth::AuthProvider;
use stomp_broker::server::Server;
use stomp_broker::session::{Session, State};
use stomp_protocol::{decode, encode, CodecError, Limits, Transmission};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::interval;

use crate::sink::MpscSink;
use crate::TIMER_RESOLUTION;

const READ_BUF_CAPACITY: usize = 8 * 1024;
const OUTBOUND_QUEUE_CAPACITY: usize = 1024;

/// Drives one accepted TCP connection end to end: decodes frames off the
/// socket into a [`Session`], writes whatever the session emits back out
/// through its [`MpscSink`], and polices the negotiated heartbeat.
///
/// Mirrors the teacher's single-task read/write loop (no `tokio_util`
/// framed codec): a `BytesMut` read buffer fed by `read_buf`, decoded in a
/// tight inner loop since one `read()` can deliver several frames.
pub async fn run_connection<A: AuthProvider + 'static>(stream: TcpStream, server: Arc<Server<A>>) {
	if let Err(err) = stream.set_nodelay(true) {
		tracing::debug!(?err, "failed to set TCP_NODELAY");
	}

	let (mut read_half, mut write_half) = stream.into_split();
	let (sink, mut outbound_rx) = MpscSink::new(OUTBOUND_QUEUE_CAPACITY);
	let mut session = server.new_session(Arc::new(sink));
	let connection_id = session.connection_id;

	let limits = server.config().limits();
	let mut read_buf = BytesMut::with_capacity(READ_BUF_CAPACITY);
	let mut write_buf = BytesMut::with_capacity(READ_BUF_CAPACITY);

	let mut last_sent = Instant::now();
	let mut last_received = Instant::now();
	let mut ticker = interval(TIMER_RESOLUTION);

	loop {
		tokio::select! {
			read = read_half.read_buf(&mut read_buf) => {
				match read {
					Ok(0) => {
						tracing::debug!(connection_id, "connection closed by peer");
						session.handle_transport_closed();
						break;
					}
					Ok(_) => {
						last_received = Instant::now();
						if let Err(err) = drain_frames(&mut read_buf, &limits, &mut session).await {
							tracing::warn!(connection_id, ?err, "closing connection after a frame error");
							session.fail_with_codec_error(err);
							break;
						}
					}
					Err(err) => {
						tracing::debug!(connection_id, ?err, "read error");
						session.handle_transport_closed();
						break;
					}
				}
			}

			outbound = outbound_rx.recv() => {
				let Some(outbound) = outbound else { break };
				if let stomp_broker::Outbound::Delivery { ref subscription_id, ref message_id, ack_required: true, .. } = outbound {
					session.record_delivery(subscription_id, message_id);
				}
				if write_frame(&mut write_half, &mut write_buf, outbound.into_frame()).await.is_err() {
					break;
				}
				last_sent = Instant::now();
			}

			_ = ticker.tick() => {
				let negotiated = session.negotiated_heartbeat();
				if negotiated.outgoing_ms != 0 && last_sent.elapsed().as_millis() as u64 >= negotiated.outgoing_ms {
					if write_half.write_all(b"\n").await.is_err() {
						break;
					}
					last_sent = Instant::now();
				}
				if stomp_broker::heartbeat::is_overdue(negotiated.incoming_ms, last_received.elapsed().as_millis() as u64) {
					tracing::info!(connection_id, "closing idle connection: heartbeat overdue");
					session.handle_transport_closed();
					break;
				}
			}
		}

		if session.state() == State::Closed {
			break;
		}
	}

	// A frame handled just before close (an ERROR, or a requested RECEIPT
	// ahead of DISCONNECT) may still be sitting in the outbound queue;
	// flush it before the socket goes away.
	while let Ok(outbound) = outbound_rx.try_recv() {
		let _ = write_frame(&mut write_half, &mut write_buf, outbound.into_frame()).await;
	}
	let _ = write_half.shutdown().await;
}

async fn write_frame(
	write_half: &mut tokio::net::tcp::OwnedWriteHalf,
	write_buf: &mut BytesMut,
	frame: stomp_protocol::Frame,
) -> std::io::Result<()> {
	write_buf.clear();
	if encode(&frame, write_buf).is_err() {
		tracing::warn!("dropped a frame that didn't fit the output buffer");
		return Ok(());
	}
	write_half.write_all(write_buf).await
}

async fn drain_frames<A: AuthProvider>(
	buf: &mut BytesMut,
	limits: &Limits,
	session: &mut Session<A>,
) -> Result<(), CodecError> {
	loop {
		match decode(buf, limits)? {
			None => return Ok(()),
			Some(Transmission::HeartBeat) => {}
			Some(Transmission::CompleteFrame(frame)) => {
				session.handle_frame(frame).await;
				if session.state() == State::Closed {
					return Ok(());
				}
			}
			Some(Transmission::ConnectionClosed) => {
				session.handle_transport_closed();
				return Ok(());
			}
		}
	}
}
