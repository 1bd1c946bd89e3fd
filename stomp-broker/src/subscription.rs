use crate::ack::AckMode;
use std::collections::VecDeque;

/// One SUBSCRIBE, live for as long as the owning connection hasn't
/// UNSUBSCRIBEd or disconnected.
///
/// `pending_acks` holds message ids in delivery order: [`Session::record_delivery`](crate::session::Session::record_delivery)
/// appends to it as deliveries are dequeued, and ACK/NACK handling in
/// [`crate::session::Session`] drains from it via [`Subscription::resolve`].
#[derive(Debug)]
pub struct Subscription {
	pub id: String,
	pub destination: String,
	pub ack_mode: AckMode,
	pending_acks: VecDeque<String>,
}

/// Outcome of resolving an ack-id against a subscription's pending queue.
pub struct Resolved {
	/// Message ids the ack/nack applies to, oldest first.
	pub message_ids: Vec<String>,
}

impl Subscription {
	pub fn new(id: impl Into<String>, destination: impl Into<String>, ack_mode: AckMode) -> Self {
		Self {
			id: id.into(),
			destination: destination.into(),
			ack_mode,
			pending_acks: VecDeque::new(),
		}
	}

	pub fn record_pending(&mut self, message_id: impl Into<String>) {
		if self.ack_mode.requires_ack() {
			self.pending_acks.push_back(message_id.into());
		}
	}

	pub fn has_pending(&self, message_id: &str) -> bool {
		self.pending_acks.iter().any(|id| id == message_id)
	}

	/// Resolves an ACK/NACK for `ack_id` per the subscription's ack mode:
	/// `client` removes it and every id queued before it; `client-individual`
	/// removes only the exact match. Returns `None` if `ack_id` isn't
	/// pending.
	pub fn resolve(&mut self, ack_id: &str) -> Option<Resolved> {
		let position = self.pending_acks.iter().position(|id| id == ack_id)?;

		let resolved = match self.ack_mode {
			AckMode::ClientIndividual => {
				let id = self.pending_acks.remove(position).expect("position was just found");
				vec![id]
			}
			AckMode::Client | AckMode::Auto => self.pending_acks.drain(..=position).collect(),
		};

		Some(Resolved { message_ids: resolved })
	}
}
