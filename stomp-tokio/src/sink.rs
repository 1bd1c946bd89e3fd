use std::sync::atomic::{AtomicBool, Ordering};

use stomp_broker::{FrameSink, Outbound, SendError};
use tokio::sync::mpsc;

/// A [`FrameSink`] backed by a bounded channel read by the connection's
/// write half.
///
/// `try_send` only enqueues; nothing here ever awaits the transport, so a
/// destination dispatching to many subscribers never blocks on one slow
/// one -- per the spec's dispatch-sink backpressure design note, a full
/// queue closes the consumer rather than applying backpressure upstream.
pub struct MpscSink {
	tx: mpsc::Sender<Outbound>,
	closed: AtomicBool,
}

impl MpscSink {
	pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
		let (tx, rx) = mpsc::channel(capacity);
		(Self { tx, closed: AtomicBool::new(false) }, rx)
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

impl FrameSink for MpscSink {
	fn try_send(&self, item: Outbound) -> Result<(), SendError> {
		if self.is_closed() {
			return Err(SendError::Closed);
		}
		self.tx.try_send(item).map_err(|err| match err {
			mpsc::error::TrySendError::Full(_) => SendError::Full,
			mpsc::error::TrySendError::Closed(_) => SendError::Closed,
		})
	}

	fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
	}
}
