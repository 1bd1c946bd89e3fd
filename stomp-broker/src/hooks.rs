use stomp_protocol::Frame;

/// Plug-in points around command handling.
///
/// Every method has a no-op default; [`Session`](crate::session::Session)
/// calls them before/after applying the standard semantics for the
/// matching command, so a server instance can observe or extend behaviour
/// (metrics, auditing, destination allow-lists) without forking the
/// dispatcher itself.
pub trait Hooks: Send + Sync {
	fn on_connected(&self, _connection_id: u64) {}
	fn on_send(&self, _connection_id: u64, _frame: &Frame) {}
	fn on_subscribe(&self, _connection_id: u64, _destination: &str, _subscription_id: &str) {}
	fn on_unsubscribe(&self, _connection_id: u64, _subscription_id: &str) {}
	fn on_transaction_begin(&self, _connection_id: u64, _transaction_id: &str) {}
	fn on_transaction_end(&self, _connection_id: u64, _transaction_id: &str, _committed: bool) {}
	fn on_disconnect(&self, _connection_id: u64) {}
}

/// The default: every hook is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}
