//! Delivery assignment state machine implementation.
//!
//! Manages assignment status transitions along the strict monotonic
//! lifecycle pending -> accepted -> picked_up -> delivered (no skips, no
//! cancellation path), stamps each milestone timestamp exactly once, and
//! cascades every accepted transition into the linked order's status.
//!
//! The cascade is a compensated pair of writes: the assignment row is
//! persisted first, and if the subsequent order write fails the previous
//! assignment row is restored, so this code path never leaves the pair
//! observably half-updated.

use crate::state::OrderStateMachine;
use crate::CoreError;
use chrono::Utc;
use market_storage::{StorageError, StorageService};
use market_types::{AssignmentStatus, DeliveryAssignment, OrderStatus, StorageKey};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Static transition table for assignments.
///
/// Strictly monotonic; `Delivered` is terminal.
static TRANSITIONS: Lazy<HashMap<AssignmentStatus, HashSet<AssignmentStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		AssignmentStatus::Pending,
		HashSet::from([AssignmentStatus::Accepted]),
	);
	m.insert(
		AssignmentStatus::Accepted,
		HashSet::from([AssignmentStatus::PickedUp]),
	);
	m.insert(
		AssignmentStatus::PickedUp,
		HashSet::from([AssignmentStatus::Delivered]),
	);
	m.insert(AssignmentStatus::Delivered, HashSet::new()); // terminal
	m
});

/// Manages assignment state transitions, timestamps and the order cascade.
pub struct AssignmentStateMachine {
	storage: Arc<StorageService>,
	orders: Arc<OrderStateMachine>,
	/// Order status implied by an assignment reaching `accepted`.
	///
	/// Policy knob: the historical mapping is `confirmed`, which skips the
	/// `preparing`/`ready` stages of the order graph.
	accepted_order_status: OrderStatus,
}

impl AssignmentStateMachine {
	pub fn new(
		storage: Arc<StorageService>,
		orders: Arc<OrderStateMachine>,
		accepted_order_status: OrderStatus,
	) -> Self {
		Self {
			storage,
			orders,
			accepted_order_status,
		}
	}

	/// Checks if a state transition is valid.
	pub fn is_valid_transition(from: AssignmentStatus, to: AssignmentStatus) -> bool {
		TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
	}

	/// Maps an assignment status to the order status it implies.
	///
	/// Once an assignment exists, the linked order's status is a derived
	/// view of the assignment's status; this mapping deliberately does not
	/// consult the order transition table.
	pub fn implied_order_status(&self, status: AssignmentStatus) -> OrderStatus {
		match status {
			AssignmentStatus::Pending => OrderStatus::Pending,
			AssignmentStatus::Accepted => self.accepted_order_status,
			AssignmentStatus::PickedUp => OrderStatus::PickedUp,
			AssignmentStatus::Delivered => OrderStatus::Delivered,
		}
	}

	/// Gets an assignment by ID.
	pub async fn get_assignment(
		&self,
		assignment_id: &str,
	) -> Result<DeliveryAssignment, CoreError> {
		self.storage
			.retrieve(StorageKey::Assignments.as_str(), assignment_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CoreError::NotFound {
					entity: "Assignment",
					id: assignment_id.to_string(),
				},
				other => CoreError::Storage(other.to_string()),
			})
	}

	/// Stores a new assignment.
	pub async fn store_assignment(
		&self,
		assignment: &DeliveryAssignment,
	) -> Result<(), CoreError> {
		self.storage
			.store(StorageKey::Assignments.as_str(), &assignment.id, assignment)
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))
	}

	/// Transitions an assignment to a new status and cascades to the order.
	///
	/// Fails with `NotFound` if the assignment does not exist and with
	/// `InvalidAssignmentTransition` (naming both statuses) on any attempt
	/// to skip, regress or leave the terminal state - a second `delivered`
	/// call is rejected rather than re-stamping `delivered_at`.
	pub async fn transition_assignment(
		&self,
		assignment_id: &str,
		new_status: AssignmentStatus,
	) -> Result<DeliveryAssignment, CoreError> {
		let previous = self.get_assignment(assignment_id).await?;

		if !Self::is_valid_transition(previous.status, new_status) {
			return Err(CoreError::InvalidAssignmentTransition {
				current: previous.status,
				requested: new_status,
			});
		}

		let mut assignment = previous.clone();
		assignment.status = new_status;

		// Stamp the milestone that was just reached; earlier stamps are
		// left untouched. The strict table guarantees each status is
		// reached at most once.
		let now = Utc::now();
		match new_status {
			AssignmentStatus::Pending => {}
			AssignmentStatus::Accepted => assignment.accepted_at = Some(now),
			AssignmentStatus::PickedUp => assignment.picked_up_at = Some(now),
			AssignmentStatus::Delivered => assignment.delivered_at = Some(now),
		}

		self.storage
			.update(StorageKey::Assignments.as_str(), assignment_id, &assignment)
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		// Cascade: the linked order's status follows the assignment's.
		let implied = self.implied_order_status(new_status);
		if let Err(e) = self
			.orders
			.set_status_unchecked(&assignment.order_id, implied)
			.await
		{
			// Compensate the assignment write so the pair stays consistent.
			tracing::error!(
				assignment_id = %assignment_id,
				order_id = %assignment.order_id,
				"Order cascade failed, restoring previous assignment state: {}",
				e
			);
			if let Err(restore_err) = self
				.storage
				.update(StorageKey::Assignments.as_str(), assignment_id, &previous)
				.await
			{
				tracing::error!(
					assignment_id = %assignment_id,
					"Failed to restore assignment after cascade failure: {}",
					restore_err
				);
			}
			return Err(CoreError::Storage(format!(
				"failed to cascade order status: {}",
				e
			)));
		}

		Ok(assignment)
	}
}
