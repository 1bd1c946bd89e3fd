use stomp_protocol::Frame;

/// A single client action deferred until COMMIT.
#[derive(Debug)]
pub enum Buffered {
	Send(Frame),
	Ack { ack_id: String },
	Nack { ack_id: String },
}

/// A client-scoped buffer opened by BEGIN, replayed by COMMIT or discarded
/// by ABORT. Owned exclusively by its connection -- see the design notes
/// on why the transaction table needs no cross-connection lock.
#[derive(Debug)]
pub struct Transaction {
	pub id: String,
	buffer: Vec<Buffered>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded;

impl Transaction {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), buffer: Vec::new() }
	}

	/// Appends `op`, rejecting it if `cap` (frames already buffered) would
	/// be reached. `cap` of `None` means the check is disabled.
	pub fn push(&mut self, op: Buffered, cap: Option<usize>) -> Result<(), CapacityExceeded> {
		if let Some(cap) = cap {
			if self.buffer.len() >= cap {
				return Err(CapacityExceeded);
			}
		}
		self.buffer.push(op);
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.buffer.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	/// Drains the buffer in insertion order, for COMMIT.
	pub fn into_buffer(self) -> Vec<Buffered> {
		self.buffer
	}
}
