//! Order state machine implementation.
//!
//! Manages order status transitions with validation, ensuring orders move
//! through valid lifecycle states: pending -> confirmed -> preparing ->
//! ready -> picked_up -> delivered, with cancellation available up to and
//! including `ready`. This machine is the sole authority on whether a
//! requested order transition is legal.

use crate::CoreError;
use chrono::Utc;
use market_storage::{StorageError, StorageService};
use market_types::{Order, OrderStatus, StorageKey};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Static transition table - each status maps to its allowed next statuses.
///
/// Terminal statuses (`Delivered`, `Cancelled`) map to the empty set.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Confirmed, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Confirmed,
		HashSet::from([OrderStatus::Preparing, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Preparing,
		HashSet::from([OrderStatus::Ready, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Ready,
		HashSet::from([OrderStatus::PickedUp, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::PickedUp,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks if a state transition is valid.
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
	}

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, CoreError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CoreError::NotFound {
					entity: "Order",
					id: order_id.to_string(),
				},
				other => CoreError::Storage(other.to_string()),
			})
	}

	/// Stores a new order.
	pub async fn store_order(&self, order: &Order) -> Result<(), CoreError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, order)
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))
	}

	/// Updates an order with a closure and persists it.
	///
	/// `updated_at` is stamped automatically on every persisted change.
	pub async fn update_order_with<F>(
		&self,
		order_id: &str,
		updater: F,
	) -> Result<Order, CoreError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.get_order(order_id).await?;

		// Apply the update
		updater(&mut order);
		order.updated_at = Utc::now();

		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		Ok(order)
	}

	/// Transitions an order to a new status with validation.
	///
	/// Fails with `NotFound` if the order does not exist and with
	/// `InvalidOrderTransition` (naming both statuses) if the requested
	/// status is not reachable from the current one. On success only the
	/// status (and `updated_at`) change; there is no cascade to any
	/// delivery assignment.
	pub async fn transition_order(
		&self,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, CoreError> {
		let order = self.get_order(order_id).await?;

		if !Self::is_valid_transition(order.status, new_status) {
			return Err(CoreError::InvalidOrderTransition {
				current: order.status,
				requested: new_status,
			});
		}

		self.update_order_with(order_id, |o| {
			o.status = new_status;
		})
		.await
	}

	/// Writes an order's status without consulting the transition table.
	///
	/// Reserved for the assignment cascade: once an assignment exists, the
	/// order's status is a derived view of the assignment's status, and
	/// the assignment machine is authoritative.
	pub(crate) async fn set_status_unchecked(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<Order, CoreError> {
		self.update_order_with(order_id, |o| {
			o.status = status;
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::{memory_storage, sample_order};

	#[test]
	fn test_transition_table_edges() {
		use OrderStatus::*;

		let cases = [
			(Pending, Confirmed, true),
			(Pending, Cancelled, true),
			(Pending, Delivered, false),
			(Confirmed, Preparing, true),
			(Confirmed, Ready, false),
			(Preparing, Ready, true),
			(Ready, PickedUp, true),
			(Ready, Delivered, false),
			(PickedUp, Delivered, true),
			(PickedUp, Cancelled, false),
		];
		for (from, to, expected) in cases {
			assert_eq!(
				OrderStateMachine::is_valid_transition(from, to),
				expected,
				"{} -> {}",
				from,
				to
			);
		}
	}

	#[test]
	fn test_terminal_states_have_no_exits() {
		use OrderStatus::*;

		for from in [Delivered, Cancelled] {
			for to in [
				Pending, Confirmed, Preparing, Ready, PickedUp, Delivered, Cancelled,
			] {
				assert!(!OrderStateMachine::is_valid_transition(from, to));
			}
		}
	}

	#[tokio::test]
	async fn test_transition_persists_new_status() {
		let storage = memory_storage();
		let machine = OrderStateMachine::new(storage);
		let order = sample_order(OrderStatus::Pending);
		machine.store_order(&order).await.unwrap();

		let updated = machine
			.transition_order(&order.id, OrderStatus::Confirmed)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Confirmed);

		let fetched = machine.get_order(&order.id).await.unwrap();
		assert_eq!(fetched.status, OrderStatus::Confirmed);
		assert!(fetched.updated_at >= order.updated_at);
	}

	#[tokio::test]
	async fn test_illegal_transition_names_both_statuses() {
		let storage = memory_storage();
		let machine = OrderStateMachine::new(storage);
		let order = sample_order(OrderStatus::Pending);
		machine.store_order(&order).await.unwrap();

		let err = machine
			.transition_order(&order.id, OrderStatus::Delivered)
			.await
			.unwrap_err();
		match err {
			CoreError::InvalidOrderTransition { current, requested } => {
				assert_eq!(current, OrderStatus::Pending);
				assert_eq!(requested, OrderStatus::Delivered);
			}
			other => panic!("unexpected error: {:?}", other),
		}

		// The stored order is untouched.
		let fetched = machine.get_order(&order.id).await.unwrap();
		assert_eq!(fetched.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn test_missing_order_is_not_found() {
		let storage = memory_storage();
		let machine = OrderStateMachine::new(storage);

		let err = machine
			.transition_order("missing", OrderStatus::Confirmed)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::NotFound { entity: "Order", .. }));
	}

	#[tokio::test]
	async fn test_transition_changes_no_other_fields() {
		let storage = memory_storage();
		let machine = OrderStateMachine::new(storage);
		let order = sample_order(OrderStatus::Pending);
		machine.store_order(&order).await.unwrap();

		let updated = machine
			.transition_order(&order.id, OrderStatus::Cancelled)
			.await
			.unwrap();
		assert_eq!(updated.total_amount, order.total_amount);
		assert_eq!(updated.delivery_address, order.delivery_address);
		assert_eq!(updated.customer_id, order.customer_id);
		assert_eq!(updated.vendor_id, order.vendor_id);
	}
}
