use stomp_protocol::Frame;

/// What a [`crate::sink::FrameSink`] actually carries.
///
/// Splitting `Delivery` out from a bare frame lets the connection that owns
/// a subscription record the message as pending-ack itself, from its own
/// task, the moment it dequeues the delivery -- rather than the producing
/// connection (or the shared destination) reaching into state that isn't
/// its own to mutate. See the design notes on why `pending_acks` stays
/// connection-local.
#[derive(Debug)]
pub enum Outbound {
	/// A frame with no ack bookkeeping attached: RECEIPT, ERROR, CONNECTED...
	Direct(Frame),
	/// A MESSAGE delivered to one of this connection's subscriptions.
	Delivery {
		frame: Frame,
		subscription_id: String,
		message_id: String,
		ack_required: bool,
	},
}

impl Outbound {
	pub fn into_frame(self) -> Frame {
		match self {
			Self::Direct(frame) => frame,
			Self::Delivery { frame, .. } => frame,
		}
	}
}
