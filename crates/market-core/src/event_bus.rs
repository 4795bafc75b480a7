//! Event bus for the change-notification feed.
//!
//! Wraps a tokio broadcast channel carrying [`MarketEvent`] change
//! notices. Publishing never blocks; a publish with no subscribers is not
//! an error worth surfacing, so callers discard the result.

use market_types::MarketEvent;
use tokio::sync::broadcast;

/// Default buffer size for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Broadcast bus distributing change notices to read-path consumers.
///
/// Consumers must treat every received notice as a signal to refetch full
/// current state; notices carry ids only, never row payloads.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes a change notice to all current subscribers.
	///
	/// Returns the number of subscribers the notice reached, or an error
	/// if there are none.
	pub fn publish(
		&self,
		event: MarketEvent,
	) -> Result<usize, broadcast::error::SendError<MarketEvent>> {
		self.sender.send(event)
	}

	/// Subscribes to the feed from this point onward.
	pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_types::OrderChange;

	#[tokio::test]
	async fn test_publish_reaches_subscriber() {
		let bus = EventBus::default();
		let mut rx = bus.subscribe();

		bus.publish(MarketEvent::Order(OrderChange::Created {
			order_id: "o-1".to_string(),
		}))
		.unwrap();

		let event = rx.recv().await.unwrap();
		assert!(matches!(
			event,
			MarketEvent::Order(OrderChange::Created { order_id }) if order_id == "o-1"
		));
	}

	#[test]
	fn test_publish_without_subscribers_is_err() {
		let bus = EventBus::default();
		let result = bus.publish(MarketEvent::Order(OrderChange::StatusChanged {
			order_id: "o-1".to_string(),
		}));
		assert!(result.is_err());
	}
}
