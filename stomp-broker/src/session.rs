use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use stomp_protocol::{headers::name, Command, Frame, HeaderList};
use tracing::{debug, warn};

use crate::ack::AckMode;
use crate::auth::AuthProvider;
use crate::config::ServerConfig;
use crate::destination::Registry;
use crate::error::ProtocolError;
use crate::heartbeat::{self, Negotiated, Proposal};
use crate::hooks::Hooks;
use crate::outbound::Outbound;
use crate::sink::FrameSink;
use crate::subscription::Subscription;
use crate::transaction::{Buffered, Transaction};

/// Where a connection sits in the STOMP handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
	Connecting,
	Connected,
	Closed,
}

/// The per-connection frame dispatch state machine: owns this connection's
/// subscriptions and transactions, and is the only thing that ever mutates
/// them -- see the design notes on why that keeps ack bookkeeping and the
/// transaction table lock-free.
///
/// A `Session` is driven entirely by its caller feeding it frames and
/// reading its emitted [`Outbound`] writes off `sink`; it owns no timers
/// and no socket, which is why it's unit-testable without an async
/// runtime beyond the `await` points below.
pub struct Session<A: AuthProvider> {
	pub connection_id: u64,
	state: State,
	config: Arc<ServerConfig>,
	registry: Arc<Registry>,
	auth: Arc<A>,
	sink: Arc<dyn FrameSink>,
	hooks: Arc<dyn Hooks>,
	live_transactions: Arc<AtomicI64>,
	subscriptions: HashMap<String, Subscription>,
	transactions: HashMap<String, Transaction>,
	next_message_id: AtomicU64,
	heartbeat: Negotiated,
	version: String,
}

impl<A: AuthProvider> Session<A> {
	pub fn new(
		connection_id: u64,
		config: Arc<ServerConfig>,
		registry: Arc<Registry>,
		auth: Arc<A>,
		sink: Arc<dyn FrameSink>,
		hooks: Arc<dyn Hooks>,
		live_transactions: Arc<AtomicI64>,
	) -> Self {
		Self {
			connection_id,
			state: State::Connecting,
			config,
			registry,
			auth,
			sink,
			hooks,
			live_transactions,
			subscriptions: HashMap::new(),
			transactions: HashMap::new(),
			next_message_id: AtomicU64::new(0),
			heartbeat: Negotiated { outgoing_ms: 0, incoming_ms: 0 },
			version: String::new(),
		}
	}

	pub fn state(&self) -> State {
		self.state
	}

	pub fn negotiated_heartbeat(&self) -> Negotiated {
		self.heartbeat
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	/// The single entry point: feed it every frame the transport decodes,
	/// in arrival order. Handling one frame is sequential and atomic
	/// end-to-end, per the spec's concurrency model -- the only `await`
	/// points are the auth callback on CONNECT and the scheduler yield
	/// between transaction chunks on COMMIT.
	pub async fn handle_frame(&mut self, frame: Frame) {
		match self.state {
			State::Closed => {}
			State::Connecting => match frame.command {
				Command::Connect | Command::Stomp => self.handle_connect(frame).await,
				_ => self.fail(ProtocolError::NotConnected),
			},
			State::Connected => match frame.command {
				Command::Connect | Command::Stomp => self.fail(ProtocolError::AlreadyConnected),
				Command::Send => self.handle_send(frame),
				Command::Subscribe => self.handle_subscribe(frame),
				Command::Unsubscribe => self.handle_unsubscribe(frame),
				Command::Begin => self.handle_begin(frame),
				Command::Commit => self.handle_commit(frame).await,
				Command::Abort => self.handle_abort(frame),
				Command::Ack => self.handle_ack_or_nack(frame, true),
				Command::Nack => self.handle_ack_or_nack(frame, false),
				Command::Disconnect => self.handle_disconnect(frame),
				Command::Connected | Command::Message | Command::Receipt | Command::Error => {
					self.fail(ProtocolError::UnknownCommand(frame.command.to_string()))
				}
			},
		}
	}

	/// Called when the transport observes the connection dropping, so
	/// teardown still runs even without a final DISCONNECT.
	pub fn handle_transport_closed(&mut self) {
		self.teardown();
	}

	/// Called when the transport's codec rejects a frame (malformed,
	/// over a resource limit, an unrecognised command line). The parser
	/// is an external collaborator (spec §1) but its faults still close
	/// the connection the same way any other protocol error does.
	pub fn fail_with_codec_error(&mut self, err: stomp_protocol::CodecError) {
		self.fail(ProtocolError::from(err));
	}

	/// Records a delivered MESSAGE as pending-ack on the receiving
	/// subscription, once this connection's own task has dequeued it off
	/// its [`FrameSink`] -- see the design notes on [`crate::outbound::Outbound`]
	/// for why this happens here rather than at the producing destination.
	/// A no-op if the subscription has since been removed, or doesn't
	/// require acks.
	pub fn record_delivery(&mut self, subscription_id: &str, message_id: &str) {
		if let Some(sub) = self.subscriptions.get_mut(subscription_id) {
			sub.record_pending(message_id);
		}
	}

	async fn handle_connect(&mut self, frame: Frame) {
		let accept_version = frame.header(name::ACCEPT_VERSION).unwrap_or("1.0");
		let offered: Vec<&str> = accept_version.split(',').map(str::trim).collect();

		let mut candidates: Vec<&str> =
			self.config.supported_versions.iter().map(String::as_str).filter(|v| offered.contains(v)).collect();
		candidates.sort_by_key(|v| parse_version(v).unwrap_or((0, 0)));

		let Some(&version) = candidates.last() else {
			self.fail(ProtocolError::UnsupportedVersion(accept_version.to_owned()));
			return;
		};

		if self.config.secured {
			let login = frame.header(name::LOGIN);
			let passcode = frame.header(name::PASSCODE);
			if !self.auth.authenticate(login, passcode).await {
				self.fail(ProtocolError::AuthenticationFailed);
				return;
			}
		}

		let client_proposal = heartbeat::parse_header(frame.header(name::HEART_BEAT));
		let server_proposal = Proposal { x: self.config.heartbeat.sx, y: self.config.heartbeat.sy };
		self.heartbeat = heartbeat::negotiate(client_proposal, server_proposal);

		self.version = version.to_owned();
		self.state = State::Connected;
		let session_id = format!("sess-{}", self.connection_id);
		debug!(
			connection_id = self.connection_id,
			version = %self.version,
			outgoing_ms = self.heartbeat.outgoing_ms,
			incoming_ms = self.heartbeat.incoming_ms,
			"connection established"
		);
		self.emit(Frame::connected(
			&self.version,
			&session_id,
			"stomp-broker/0.1",
			(self.heartbeat.outgoing_ms, self.heartbeat.incoming_ms),
		));
		self.hooks.on_connected(self.connection_id);
	}

	fn handle_send(&mut self, frame: Frame) {
		if frame.header(name::DESTINATION).is_none() {
			self.fail(ProtocolError::MissingHeader(name::DESTINATION));
			return;
		}

		if let Some(tx_id) = frame.header(name::TRANSACTION).map(str::to_owned) {
			if self.buffer_in_transaction(&tx_id, Buffered::Send(frame.clone())) {
				self.emit_receipt_if_requested(&frame.headers);
			}
			return;
		}

		self.hooks.on_send(self.connection_id, &frame);
		let destination = frame.header(name::DESTINATION).expect("checked above").to_owned();
		self.registry.dispatch(&destination, &frame.headers, &frame.body, || self.fresh_message_id());
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn handle_subscribe(&mut self, frame: Frame) {
		let Some(id) = frame.header(name::ID).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::ID));
			return;
		};
		let Some(destination) = frame.header(name::DESTINATION).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::DESTINATION));
			return;
		};
		if self.subscriptions.contains_key(&id) {
			self.fail(ProtocolError::DuplicateSubscription);
			return;
		}

		let ack_mode = AckMode::parse(frame.header(name::ACK));
		self.subscriptions.insert(id.clone(), Subscription::new(id.clone(), destination.clone(), ack_mode));
		self.registry.subscribe(&destination, self.connection_id, id.clone(), ack_mode, self.sink.clone());
		self.hooks.on_subscribe(self.connection_id, &destination, &id);
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn handle_unsubscribe(&mut self, frame: Frame) {
		let Some(id) = frame.header(name::ID).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::ID));
			return;
		};
		let Some(sub) = self.subscriptions.remove(&id) else {
			self.fail(ProtocolError::UnknownSubscription);
			return;
		};
		self.registry.unsubscribe(&sub.destination, self.connection_id, &id, self.config.auto_gc_destinations);
		self.hooks.on_unsubscribe(self.connection_id, &id);
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn handle_begin(&mut self, frame: Frame) {
		let Some(tx_id) = frame.header(name::TRANSACTION).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::TRANSACTION));
			return;
		};
		if self.transactions.contains_key(&tx_id) {
			self.fail(ProtocolError::AlreadyExistingTransaction);
			return;
		}
		self.transactions.insert(tx_id.clone(), Transaction::new(tx_id.clone()));
		self.live_transactions.fetch_add(1, Ordering::SeqCst);
		self.hooks.on_transaction_begin(self.connection_id, &tx_id);
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn handle_abort(&mut self, frame: Frame) {
		let Some(tx_id) = frame.header(name::TRANSACTION).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::TRANSACTION));
			return;
		};
		if self.transactions.remove(&tx_id).is_none() {
			self.fail(ProtocolError::UnknownTransaction);
			return;
		}
		self.live_transactions.fetch_sub(1, Ordering::SeqCst);
		self.hooks.on_transaction_end(self.connection_id, &tx_id, false);
		self.emit_receipt_if_requested(&frame.headers);
	}

	async fn handle_commit(&mut self, frame: Frame) {
		let Some(tx_id) = frame.header(name::TRANSACTION).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::TRANSACTION));
			return;
		};
		let Some(tx) = self.transactions.remove(&tx_id) else {
			self.fail(ProtocolError::UnknownTransaction);
			return;
		};
		self.live_transactions.fetch_sub(1, Ordering::SeqCst);

		let chunk_size = self.config.transaction_chunk_size;
		for (index, op) in tx.into_buffer().into_iter().enumerate() {
			self.apply_buffered(op);
			if chunk_size > 0 && (index + 1) % chunk_size == 0 {
				tokio::task::yield_now().await;
			}
		}

		self.hooks.on_transaction_end(self.connection_id, &tx_id, true);
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn apply_buffered(&mut self, op: Buffered) {
		match op {
			Buffered::Send(send_frame) => {
				if let Some(destination) = send_frame.header(name::DESTINATION).map(str::to_owned) {
					self.registry.dispatch(&destination, &send_frame.headers, &send_frame.body, || self.fresh_message_id());
				}
			}
			Buffered::Ack { ack_id } => self.resolve_ack(&ack_id, true),
			Buffered::Nack { ack_id } => self.resolve_ack(&ack_id, false),
		}
	}

	fn handle_ack_or_nack(&mut self, frame: Frame, is_ack: bool) {
		let Some(ack_id) = frame.header(name::ID).map(str::to_owned) else {
			self.fail(ProtocolError::MissingHeader(name::ID));
			return;
		};

		if let Some(tx_id) = frame.header(name::TRANSACTION).map(str::to_owned) {
			let op = if is_ack { Buffered::Ack { ack_id } } else { Buffered::Nack { ack_id } };
			if self.buffer_in_transaction(&tx_id, op) {
				self.emit_receipt_if_requested(&frame.headers);
			}
			return;
		}

		self.resolve_ack(&ack_id, is_ack);
		self.emit_receipt_if_requested(&frame.headers);
	}

	fn handle_disconnect(&mut self, frame: Frame) {
		self.emit_receipt_if_requested(&frame.headers);
		self.teardown();
	}

	/// Locates the subscription (on this connection) whose pending-ack
	/// queue owns `ack_id`, resolves it per ack mode, and applies the
	/// outcome to the destination registry. A nack on a queue destination
	/// triggers redelivery; an ack is bookkeeping only.
	fn resolve_ack(&mut self, ack_id: &str, is_ack: bool) {
		let resolved = self.subscriptions.values_mut().find_map(|sub| {
			let resolved = sub.resolve(ack_id)?;
			Some((sub.destination.clone(), resolved))
		});

		let Some((destination, resolved)) = resolved else {
			if self.config.strict_ack {
				self.fail(ProtocolError::UnknownSubscription);
			}
			return;
		};

		for message_id in resolved.message_ids {
			if is_ack {
				self.registry.ack(&destination, &message_id);
			} else {
				self.registry.nack(&destination, &message_id, || self.fresh_message_id());
			}
		}
	}

	/// Appends `op` to the named transaction's buffer, failing the
	/// connection (and thereby destroying every transaction it holds) if
	/// the transaction is unknown or already at capacity. Returns whether
	/// the op was buffered, so the caller knows whether to still emit a
	/// receipt.
	fn buffer_in_transaction(&mut self, tx_id: &str, op: Buffered) -> bool {
		let cap = self.config.transaction_frame_cap();
		match self.transactions.get_mut(tx_id) {
			None => {
				self.fail(ProtocolError::UnknownTransaction);
				false
			}
			Some(tx) => match tx.push(op, cap) {
				Ok(()) => true,
				Err(_) => {
					self.fail(ProtocolError::TooManyFramesInTransaction);
					false
				}
			},
		}
	}

	fn fresh_message_id(&self) -> String {
		format!("{}-{}", self.connection_id, self.next_message_id.fetch_add(1, Ordering::Relaxed))
	}

	fn emit(&self, frame: Frame) {
		if self.sink.try_send(Outbound::Direct(frame)).is_err() {
			self.sink.close();
		}
	}

	fn emit_receipt_if_requested(&self, headers: &HeaderList) {
		if let Some(receipt_id) = headers.get(name::RECEIPT) {
			self.emit(Frame::receipt(receipt_id));
		}
	}

	/// Every ERROR frame is followed by closing the connection (spec
	/// §4.4/§7), which cascades through the same teardown a clean
	/// DISCONNECT or dropped transport triggers.
	fn fail(&mut self, error: ProtocolError) {
		warn!(connection_id = self.connection_id, %error, "closing connection after a protocol error");
		self.emit(Frame::error(&error.message(), Bytes::new()));
		self.teardown();
	}

	fn teardown(&mut self) {
		if self.state == State::Closed {
			return;
		}
		self.state = State::Closed;

		// `Registry::disconnect` purges this connection's subscriptions *and*
		// its in-flight redelivery records across every destination in one
		// pass; a per-subscription `unsubscribe` loop would leak the latter.
		self.subscriptions.clear();
		self.registry.disconnect(self.connection_id, self.config.auto_gc_destinations);

		if !self.transactions.is_empty() {
			self.live_transactions.fetch_sub(self.transactions.len() as i64, Ordering::SeqCst);
			self.transactions.clear();
		}

		self.sink.close();
		self.hooks.on_disconnect(self.connection_id);
	}
}

fn parse_version(s: &str) -> Option<(u32, u32)> {
	let mut parts = s.splitn(2, '.');
	let major = parts.next()?.parse().ok()?;
	let minor = parts.next().unwrap_or("0").parse().ok()?;
	Some((major, minor))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth::{AllowAll, DenyAll};
	use crate::sink::RecordingSink;
	use stomp_protocol::Command;

	fn connect_frame() -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::ACCEPT_VERSION, "1.0,1.1,1.2");
		Frame::new(Command::Connect, headers, Bytes::new())
	}

	fn session_with(auth: impl AuthProvider + 'static, sink: Arc<RecordingSink>) -> Session<impl AuthProvider> {
		Session::new(
			1,
			Arc::new(ServerConfig::default()),
			Arc::new(Registry::new()),
			Arc::new(auth),
			sink,
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		)
	}

	#[tokio::test]
	async fn connect_negotiates_the_highest_common_version() {
		let sink = Arc::new(RecordingSink::new());
		let mut session = session_with(AllowAll, sink.clone());

		session.handle_frame(connect_frame()).await;

		assert_eq!(session.state(), State::Connected);
		let frames = sink.frames();
		assert_eq!(frames[0].command, Command::Connected);
		assert_eq!(frames[0].header(name::VERSION), Some("1.2"));
	}

	#[tokio::test]
	async fn failed_auth_emits_error_and_closes() {
		let sink = Arc::new(RecordingSink::new());
		let config = Arc::new(ServerConfig { secured: true, ..ServerConfig::default() });
		let mut session = Session::new(
			1,
			config,
			Arc::new(Registry::new()),
			Arc::new(DenyAll),
			sink.clone(),
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		);

		session.handle_frame(connect_frame()).await;

		assert_eq!(session.state(), State::Closed);
		let frames = sink.frames();
		assert_eq!(frames[0].command, Command::Error);
		assert_eq!(frames[0].header(name::MESSAGE), Some("Authentication failed"));
		assert!(sink.is_closed());
	}

	#[tokio::test]
	async fn second_connect_is_rejected() {
		let sink = Arc::new(RecordingSink::new());
		let mut session = session_with(AllowAll, sink.clone());
		session.handle_frame(connect_frame()).await;
		session.handle_frame(connect_frame()).await;

		let frames = sink.frames();
		assert_eq!(frames[1].command, Command::Error);
		assert_eq!(frames[1].header(name::MESSAGE), Some("already connected"));
	}

	#[tokio::test]
	async fn s1_basic_commit_delivers_in_order() {
		let registry = Arc::new(Registry::new());
		let subscriber = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/a", 2, "sub-0", AckMode::Auto, subscriber.clone());

		let sink = Arc::new(RecordingSink::new());
		let mut session = Session::new(
			1,
			Arc::new(ServerConfig::default()),
			registry,
			Arc::new(AllowAll),
			sink.clone(),
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		);
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		for body in ["Hello", "World", "!!!"] {
			session.handle_frame(send("/queue/a", "my-tx", body)).await;
		}
		session.handle_frame(commit("my-tx")).await;

		assert!(sink.frames().iter().all(|f| f.command != Command::Error));
		let delivered = subscriber.frames();
		assert_eq!(delivered.len(), 3);
		let bodies: Vec<&[u8]> = delivered.iter().map(|f| f.body.as_ref()).collect();
		assert_eq!(bodies, vec![b"Hello".as_ref(), b"World".as_ref(), b"!!!".as_ref()]);
		assert!(delivered.iter().all(|f| f.header(name::TRANSACTION) == Some("my-tx")));
	}

	#[tokio::test]
	async fn s2_abort_delivers_nothing() {
		let registry = Arc::new(Registry::new());
		let subscriber = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/a", 2, "sub-0", AckMode::Auto, subscriber.clone());

		let sink = Arc::new(RecordingSink::new());
		let mut session = Session::new(
			1,
			Arc::new(ServerConfig::default()),
			registry,
			Arc::new(AllowAll),
			sink,
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		);
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		for body in ["Hello", "World", "!!!"] {
			session.handle_frame(send("/queue/a", "my-tx", body)).await;
		}
		session.handle_frame(abort("my-tx")).await;

		assert!(subscriber.frames().is_empty());
	}

	#[tokio::test]
	async fn s3_duplicate_begin_errors() {
		let sink = Arc::new(RecordingSink::new());
		let mut session = session_with(AllowAll, sink.clone());
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		session.handle_frame(send("/queue/a", "my-tx", "Hello")).await;
		session.handle_frame(send("/queue/a", "my-tx", "World")).await;
		session.handle_frame(begin("my-tx")).await;

		let frames = sink.frames();
		let error = frames.iter().find(|f| f.command == Command::Error).expect("expected an ERROR frame");
		assert_eq!(error.header(name::MESSAGE), Some("Already existing transaction"));
	}

	#[tokio::test]
	async fn s4_commit_unknown_transaction_errors() {
		let live = Arc::new(AtomicI64::new(0));
		let sink = Arc::new(RecordingSink::new());
		let mut session = Session::new(
			1,
			Arc::new(ServerConfig::default()),
			Arc::new(Registry::new()),
			Arc::new(AllowAll),
			sink.clone(),
			Arc::new(crate::hooks::NoopHooks),
			live.clone(),
		);
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		for body in ["a", "b", "c"] {
			session.handle_frame(send("/queue/a", "my-tx", body)).await;
		}
		session.handle_frame(commit("illegal")).await;

		let frames = sink.frames();
		let error = frames.iter().find(|f| f.command == Command::Error).expect("expected an ERROR frame");
		assert_eq!(error.header(name::MESSAGE), Some("Unknown transaction"));
		assert_eq!(live.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn s5_frame_cap_drops_the_whole_transaction() {
		let registry = Arc::new(Registry::new());
		let subscriber = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/a", 2, "sub-0", AckMode::Auto, subscriber.clone());

		let live = Arc::new(AtomicI64::new(0));
		let config = Arc::new(ServerConfig { max_frame_in_transaction: 2, ..ServerConfig::default() });
		let sink = Arc::new(RecordingSink::new());
		let mut session =
			Session::new(1, config, registry, Arc::new(AllowAll), sink.clone(), Arc::new(crate::hooks::NoopHooks), live.clone());
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		for body in ["a", "b", "c"] {
			session.handle_frame(send("/queue/a", "my-tx", body)).await;
		}
		session.handle_frame(commit("my-tx")).await;

		let frames = sink.frames();
		assert_eq!(frames.iter().filter(|f| f.command == Command::Error).count(), 1);
		assert_eq!(live.load(Ordering::SeqCst), 0);
		assert!(subscriber.frames().is_empty());
	}

	#[tokio::test]
	async fn s6_chunked_commit_preserves_order() {
		let registry = Arc::new(Registry::new());
		let subscriber = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/a", 2, "sub-0", AckMode::Auto, subscriber.clone());

		let config = Arc::new(ServerConfig {
			transaction_chunk_size: 100,
			max_frame_in_transaction: 10_000,
			..ServerConfig::default()
		});
		let sink = Arc::new(RecordingSink::new());
		let mut session = Session::new(
			1,
			config,
			registry,
			Arc::new(AllowAll),
			sink.clone(),
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		);
		session.handle_frame(connect_frame()).await;

		session.handle_frame(begin("my-tx")).await;
		for i in 0..5000 {
			session.handle_frame(send("/queue/a", "my-tx", &format!("Hello-{i}"))).await;
		}
		session.handle_frame(commit("my-tx")).await;

		assert!(sink.frames().iter().all(|f| f.command != Command::Error));
		let delivered = subscriber.frames();
		assert_eq!(delivered.len(), 5000);
		for (i, frame) in delivered.iter().enumerate() {
			assert_eq!(frame.body.as_ref(), format!("Hello-{i}").as_bytes());
		}
	}

	#[tokio::test]
	async fn strict_ack_requires_a_delivery_recorded_first() {
		let config = Arc::new(ServerConfig { strict_ack: true, ..ServerConfig::default() });
		let sink = Arc::new(RecordingSink::new());
		let mut session = Session::new(
			1,
			config,
			Arc::new(Registry::new()),
			Arc::new(AllowAll),
			sink.clone(),
			Arc::new(crate::hooks::NoopHooks),
			Arc::new(AtomicI64::new(0)),
		);
		session.handle_frame(connect_frame()).await;
		session.handle_frame(subscribe("sub-0", "/queue/a", "client")).await;

		session.handle_frame(ack("sub-0", "m-0")).await;
		assert_eq!(sink.frames().last().unwrap().command, Command::Error, "unrecorded ack-id should error in strict mode");

		session.record_delivery("sub-0", "m-0");
		session.handle_frame(ack("sub-0", "m-0")).await;
		assert!(sink.frames().iter().all(|f| f.command != Command::Error));
	}

	#[tokio::test]
	async fn client_ack_resolves_cumulatively() {
		let mut session = session_with(AllowAll, Arc::new(RecordingSink::new()));
		session.handle_frame(connect_frame()).await;
		session.handle_frame(subscribe("sub-0", "/queue/a", "client")).await;

		for id in ["m-0", "m-1", "m-2"] {
			session.record_delivery("sub-0", id);
		}
		let sub = session.subscriptions.get("sub-0").unwrap();
		assert!(sub.has_pending("m-0") && sub.has_pending("m-1") && sub.has_pending("m-2"));

		// Acking m-1 cumulatively clears m-0 and m-1, leaving m-2 pending.
		session.handle_frame(ack("sub-0", "m-1")).await;
		let sub = session.subscriptions.get("sub-0").unwrap();
		assert!(!sub.has_pending("m-0"));
		assert!(!sub.has_pending("m-1"));
		assert!(sub.has_pending("m-2"));
	}

	fn subscribe(id: &str, destination: &str, ack: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::ID, id);
		headers.push(name::DESTINATION, destination);
		headers.push(name::ACK, ack);
		Frame::new(Command::Subscribe, headers, Bytes::new())
	}

	fn ack(id: &str, ack_id: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::ID, ack_id);
		headers.push(name::SUBSCRIPTION, id);
		Frame::new(Command::Ack, headers, Bytes::new())
	}

	fn begin(tx: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::TRANSACTION, tx);
		Frame::new(Command::Begin, headers, Bytes::new())
	}

	fn abort(tx: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::TRANSACTION, tx);
		Frame::new(Command::Abort, headers, Bytes::new())
	}

	fn commit(tx: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::TRANSACTION, tx);
		Frame::new(Command::Commit, headers, Bytes::new())
	}

	fn send(destination: &str, tx: &str, body: &str) -> Frame {
		let mut headers = HeaderList::new();
		headers.push(name::DESTINATION, destination);
		headers.push(name::TRANSACTION, tx);
		Frame::new(Command::Send, headers, Bytes::copy_from_slice(body.as_bytes()))
	}
}
