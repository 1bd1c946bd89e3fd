use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use stomp_protocol::{Frame, HeaderList};

use crate::ack::AckMode;
use crate::outbound::Outbound;
use crate::sink::FrameSink;

/// Fan-out discipline for a destination, fixed at creation from its name
/// prefix -- see the design notes on why this is inferred rather than
/// declared on SUBSCRIBE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationKind {
	Topic,
	Queue,
}

impl DestinationKind {
	/// `/queue/...` destinations round-robin; everything else, including
	/// `/topic/...`, fans out.
	pub fn infer(name: &str) -> Self {
		if name.starts_with("/queue/") {
			Self::Queue
		} else {
			Self::Topic
		}
	}
}

/// A connection's presence on a destination, as seen by the registry.
struct Subscriber {
	connection_id: u64,
	subscription_id: String,
	ack_mode: AckMode,
	sink: Arc<dyn FrameSink>,
}

/// A Queue message handed out but not yet acked, kept only long enough to
/// redeliver it on NACK.
struct InFlight {
	headers: HeaderList,
	body: Bytes,
	origin_connection_id: u64,
	origin_subscription_id: String,
}

#[derive(Default)]
struct Inner {
	subscribers: Vec<Subscriber>,
	cursor: usize,
	in_flight: HashMap<String, InFlight>,
}

/// One `/queue/...` or `/topic/...` destination.
///
/// The subscriber list and round-robin cursor live behind one mutex, held
/// only long enough to snapshot who a SEND goes to (or to mutate the list
/// on SUBSCRIBE/UNSUBSCRIBE/disconnect); the actual write to each
/// [`FrameSink`] happens after the guard is dropped, so a slow subscriber on
/// this destination can't stall another's delivery -- see the design
/// notes and spec's concurrency model.
pub struct Destination {
	pub name: String,
	pub kind: DestinationKind,
	inner: Mutex<Inner>,
}

impl Destination {
	fn new(name: String) -> Self {
		let kind = DestinationKind::infer(&name);
		Self { name, kind, inner: Mutex::new(Inner::default()) }
	}

	pub fn subscriber_count(&self) -> usize {
		self.inner.lock().unwrap().subscribers.len()
	}

	fn add_subscriber(&self, sub: Subscriber) {
		self.inner.lock().unwrap().subscribers.push(sub);
	}

	/// Removes one connection's subscription. Returns `true` if the
	/// destination is now empty and eligible for garbage collection.
	fn remove_subscriber(&self, connection_id: u64, subscription_id: &str) -> bool {
		let mut inner = self.inner.lock().unwrap();
		inner
			.subscribers
			.retain(|s| !(s.connection_id == connection_id && s.subscription_id == subscription_id));
		inner.subscribers.is_empty()
	}

	/// Removes every subscription belonging to `connection_id`, for
	/// teardown. Returns `true` if the destination is now empty.
	fn remove_connection(&self, connection_id: u64) -> bool {
		let mut inner = self.inner.lock().unwrap();
		inner.subscribers.retain(|s| s.connection_id != connection_id);
		inner.in_flight.retain(|_, f| f.origin_connection_id != connection_id);
		inner.subscribers.is_empty()
	}

	/// Delivers a SEND to this destination's subscribers: every subscriber
	/// for a topic, one subscriber (round-robin) for a queue. Builds the
	/// MESSAGE frames and takes the delivery snapshot under the lock, then
	/// returns it for the caller to write outside the lock.
	fn plan_dispatch(
		&self,
		send_headers: &HeaderList,
		body: &Bytes,
		mut next_message_id: impl FnMut() -> String,
	) -> Vec<(Arc<dyn FrameSink>, Outbound)> {
		let mut inner = self.inner.lock().unwrap();
		if inner.subscribers.is_empty() {
			return Vec::new();
		}

		let targets: Vec<usize> = match self.kind {
			DestinationKind::Topic => (0..inner.subscribers.len()).collect(),
			DestinationKind::Queue => {
				let idx = inner.cursor % inner.subscribers.len();
				inner.cursor = inner.cursor.wrapping_add(1);
				vec![idx]
			}
		};

		let is_queue = matches!(self.kind, DestinationKind::Queue);
		let mut planned = Vec::with_capacity(targets.len());
		for idx in targets {
			let message_id = next_message_id();
			let sub = &inner.subscribers[idx];
			let ack_required = sub.ack_mode.requires_ack();
			let ack_id = ack_required.then(|| message_id.clone());
			let frame = Frame::message(
				&self.name,
				&sub.subscription_id,
				&message_id,
				ack_id.as_deref(),
				send_headers,
				body.clone(),
			);

			if is_queue && ack_required {
				inner.in_flight.insert(
					message_id.clone(),
					InFlight {
						headers: send_headers.clone(),
						body: body.clone(),
						origin_connection_id: sub.connection_id,
						origin_subscription_id: sub.subscription_id.clone(),
					},
				);
			}

			planned.push((
				sub.sink.clone(),
				Outbound::Delivery { frame, subscription_id: sub.subscription_id.clone(), message_id, ack_required },
			));
		}
		planned
	}

	/// A queue message was acked: it's delivered, drop its redelivery
	/// record.
	fn ack(&self, message_id: &str) {
		self.inner.lock().unwrap().in_flight.remove(message_id);
	}

	/// A queue message was nacked: redeliver it, round-robining again and
	/// skipping the subscriber that just nacked it when another one exists.
	fn nack(&self, message_id: &str, mut next_message_id: impl FnMut() -> String) -> Option<(Arc<dyn FrameSink>, Outbound)> {
		let mut inner = self.inner.lock().unwrap();
		let entry = inner.in_flight.remove(message_id)?;
		if inner.subscribers.is_empty() {
			return None;
		}

		let mut idx = inner.cursor % inner.subscribers.len();
		inner.cursor = inner.cursor.wrapping_add(1);
		if inner.subscribers.len() > 1 {
			let origin = inner.subscribers.iter().position(|s| {
				s.connection_id == entry.origin_connection_id && s.subscription_id == entry.origin_subscription_id
			});
			if origin == Some(idx) {
				idx = (idx + 1) % inner.subscribers.len();
				inner.cursor = inner.cursor.wrapping_add(1);
			}
		}

		let sub = &inner.subscribers[idx];
		let new_message_id = next_message_id();
		let ack_required = sub.ack_mode.requires_ack();
		let ack_id = ack_required.then(|| new_message_id.clone());
		let frame = Frame::message(&self.name, &sub.subscription_id, &new_message_id, ack_id.as_deref(), &entry.headers, entry.body.clone());

		if ack_required {
			inner.in_flight.insert(
				new_message_id.clone(),
				InFlight {
					headers: entry.headers,
					body: entry.body,
					origin_connection_id: sub.connection_id,
					origin_subscription_id: sub.subscription_id.clone(),
				},
			);
		}

		Some((
			sub.sink.clone(),
			Outbound::Delivery { frame, subscription_id: sub.subscription_id.clone(), message_id: new_message_id, ack_required },
		))
	}
}

/// All live destinations, keyed by name.
///
/// Destinations are created lazily on first SUBSCRIBE or SEND and dropped
/// once their last subscriber leaves, when `auto_gc_destinations` is set --
/// see [`crate::config::ServerConfig`].
#[derive(Default)]
pub struct Registry {
	destinations: RwLock<HashMap<String, Arc<Destination>>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	fn get_or_create(&self, name: &str) -> Arc<Destination> {
		if let Some(dest) = self.destinations.read().unwrap().get(name) {
			return dest.clone();
		}
		self.destinations
			.write()
			.unwrap()
			.entry(name.to_owned())
			.or_insert_with(|| Arc::new(Destination::new(name.to_owned())))
			.clone()
	}

	pub fn lookup(&self, name: &str) -> Option<Arc<Destination>> {
		self.destinations.read().unwrap().get(name).cloned()
	}

	pub fn subscribe(
		&self,
		destination: &str,
		connection_id: u64,
		subscription_id: impl Into<String>,
		ack_mode: AckMode,
		sink: Arc<dyn FrameSink>,
	) {
		let dest = self.get_or_create(destination);
		dest.add_subscriber(Subscriber { connection_id, subscription_id: subscription_id.into(), ack_mode, sink });
	}

	/// Removes one subscription, garbage collecting the destination if it's
	/// now empty and `gc` is enabled.
	pub fn unsubscribe(&self, destination: &str, connection_id: u64, subscription_id: &str, gc: bool) {
		let Some(dest) = self.lookup(destination) else { return };
		let empty = dest.remove_subscriber(connection_id, subscription_id);
		if empty && gc {
			self.remove_if_empty(destination);
		}
	}

	/// Removes every subscription held by `connection_id`, across every
	/// destination, for teardown.
	pub fn disconnect(&self, connection_id: u64, gc: bool) {
		let names: Vec<String> = self.destinations.read().unwrap().keys().cloned().collect();
		for name in names {
			let Some(dest) = self.lookup(&name) else { continue };
			let empty = dest.remove_connection(connection_id);
			if empty && gc {
				self.remove_if_empty(&name);
			}
		}
	}

	fn remove_if_empty(&self, name: &str) {
		let mut destinations = self.destinations.write().unwrap();
		if let Some(dest) = destinations.get(name) {
			if dest.subscriber_count() == 0 {
				destinations.remove(name);
			}
		}
	}

	/// Dispatches a SEND, writing to every chosen [`FrameSink`] outside the
	/// destination's lock. A write that fails closes only that subscriber's
	/// connection.
	pub fn dispatch(&self, destination: &str, headers: &HeaderList, body: &Bytes, next_message_id: impl FnMut() -> String) {
		let dest = self.get_or_create(destination);
		let planned = dest.plan_dispatch(headers, body, next_message_id);
		for (sink, outbound) in planned {
			if sink.try_send(outbound).is_err() {
				sink.close();
			}
		}
	}

	pub fn ack(&self, destination: &str, message_id: &str) {
		if let Some(dest) = self.lookup(destination) {
			dest.ack(message_id);
		}
	}

	pub fn nack(&self, destination: &str, message_id: &str, next_message_id: impl FnMut() -> String) {
		let Some(dest) = self.lookup(destination) else { return };
		if let Some((sink, outbound)) = dest.nack(message_id, next_message_id) {
			if sink.try_send(outbound).is_err() {
				sink.close();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::RecordingSink;
	use std::sync::atomic::{AtomicU64, Ordering};

	fn ids() -> impl FnMut() -> String {
		let counter = AtomicU64::new(0);
		move || format!("m-{}", counter.fetch_add(1, Ordering::SeqCst))
	}

	#[test]
	fn topic_fans_out_to_every_subscriber() {
		let registry = Registry::new();
		let a = Arc::new(RecordingSink::new());
		let b = Arc::new(RecordingSink::new());
		registry.subscribe("/topic/news", 1, "sub-a", AckMode::Auto, a.clone());
		registry.subscribe("/topic/news", 2, "sub-b", AckMode::Auto, b.clone());

		registry.dispatch("/topic/news", &HeaderList::new(), &Bytes::from_static(b"hi"), ids());

		assert_eq!(a.frames().len(), 1);
		assert_eq!(b.frames().len(), 1);
	}

	#[test]
	fn queue_round_robins_across_subscribers() {
		let registry = Registry::new();
		let a = Arc::new(RecordingSink::new());
		let b = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/work", 1, "sub-a", AckMode::Auto, a.clone());
		registry.subscribe("/queue/work", 2, "sub-b", AckMode::Auto, b.clone());

		for _ in 0..2 {
			registry.dispatch("/queue/work", &HeaderList::new(), &Bytes::from_static(b"job"), ids());
		}

		assert_eq!(a.frames().len(), 1);
		assert_eq!(b.frames().len(), 1);
	}

	#[test]
	fn queue_nack_redelivers_to_the_other_subscriber() {
		let registry = Registry::new();
		let a = Arc::new(RecordingSink::new());
		let b = Arc::new(RecordingSink::new());
		registry.subscribe("/queue/work", 1, "sub-a", AckMode::Client, a.clone());
		registry.subscribe("/queue/work", 2, "sub-b", AckMode::Client, b.clone());

		registry.dispatch("/queue/work", &HeaderList::new(), &Bytes::from_static(b"job"), ids());
		assert_eq!(a.frames().len(), 1);
		let delivered_id = a.frames()[0].header(stomp_protocol::headers::name::MESSAGE_ID).unwrap().to_owned();

		registry.nack("/queue/work", &delivered_id, ids());

		assert_eq!(b.frames().len(), 1, "the other subscriber should receive the redelivery");
	}

	#[test]
	fn unsubscribe_garbage_collects_empty_destinations() {
		let registry = Registry::new();
		let a = Arc::new(RecordingSink::new());
		registry.subscribe("/topic/news", 1, "sub-a", AckMode::Auto, a);
		registry.unsubscribe("/topic/news", 1, "sub-a", true);

		assert!(registry.lookup("/topic/news").is_none());
	}
}
