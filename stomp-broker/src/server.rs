use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::ServerConfig;
use crate::destination::Registry;
use crate::hooks::{Hooks, NoopHooks};
use crate::sink::FrameSink;
use crate::session::Session;

/// Ties together everything a transport needs to host connections: the
/// shared destination registry, server configuration, the auth provider
/// and a per-server live-transaction count.
///
/// The transaction count is kept here rather than in a process-wide
/// static, so multiple `Server`s (as in tests) don't share counters -- see
/// the design notes.
pub struct Server<A: AuthProvider> {
	config: Arc<ServerConfig>,
	registry: Arc<Registry>,
	auth: Arc<A>,
	hooks: Arc<dyn Hooks>,
	live_transactions: Arc<AtomicI64>,
	next_connection_id: AtomicU64,
}

impl<A: AuthProvider> Server<A> {
	pub fn new(config: ServerConfig, auth: A) -> Self {
		Self::with_hooks(config, auth, NoopHooks)
	}

	pub fn with_hooks(config: ServerConfig, auth: A, hooks: impl Hooks + 'static) -> Self {
		Self {
			config: Arc::new(config),
			registry: Arc::new(Registry::new()),
			auth: Arc::new(auth),
			hooks: Arc::new(hooks),
			live_transactions: Arc::new(AtomicI64::new(0)),
			next_connection_id: AtomicU64::new(0),
		}
	}

	pub fn config(&self) -> &ServerConfig {
		&self.config
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	/// The number of transactions currently open across every connection,
	/// for tests and observability.
	pub fn live_transaction_count(&self) -> i64 {
		self.live_transactions.load(Ordering::SeqCst)
	}

	/// Creates a fresh per-connection [`Session`], in `CONNECTING` state,
	/// writing through `sink`.
	pub fn new_session(&self, sink: Arc<dyn FrameSink>) -> Session<A> {
		let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
		Session::new(
			connection_id,
			self.config.clone(),
			self.registry.clone(),
			self.auth.clone(),
			sink,
			self.hooks.clone(),
			self.live_transactions.clone(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth::AllowAll;
	use crate::sink::RecordingSink;

	#[test]
	fn connection_ids_are_distinct_and_increasing() {
		let server = Server::new(ServerConfig::default(), AllowAll);
		let a = server.new_session(Arc::new(RecordingSink::new()));
		let b = server.new_session(Arc::new(RecordingSink::new()));
		assert_ne!(a.connection_id, b.connection_id);
	}
}
