use crate::outbound::Outbound;
use stomp_protocol::Frame;

/// The write half of a connection, as seen by the engine.
///
/// Dispatch never awaits a slow consumer: [`FrameSink::try_send`] is
/// non-blocking so one backed-up subscriber can't stall delivery to the
/// others sharing a destination. A bounded transport implementation should
/// treat [`SendError::Full`] the same as [`SendError::Closed`] -- per the
/// design notes, an overfull per-connection queue is a reason to close
/// that consumer, not to apply backpressure to the producer.
pub trait FrameSink: Send + Sync {
	fn try_send(&self, item: Outbound) -> Result<(), SendError>;

	/// Requests that the underlying transport close. Idempotent.
	fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
	#[error("the connection's write queue is full")]
	Full,
	#[error("the connection is already closed")]
	Closed,
}

/// An in-memory sink that records every frame it's sent, for tests.
#[derive(Default)]
pub struct RecordingSink {
	frames: std::sync::Mutex<Vec<Frame>>,
	closed: std::sync::atomic::AtomicBool,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn frames(&self) -> Vec<Frame> {
		self.frames.lock().unwrap().clone()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(std::sync::atomic::Ordering::SeqCst)
	}
}

impl FrameSink for RecordingSink {
	fn try_send(&self, item: Outbound) -> Result<(), SendError> {
		if self.is_closed() {
			return Err(SendError::Closed);
		}
		self.frames.lock().unwrap().push(item.into_frame());
		Ok(())
	}

	fn close(&self) {
		self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
	}
}
