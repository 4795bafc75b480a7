//! Delivery matching service.
//!
//! On order creation, selects an eligible delivery person and opens a
//! delivery assignment for the order. Selection is deliberately naive:
//! the first person with `is_active && is_available` wins, with the
//! tie-break left to the storage backend's iteration order - no ranking,
//! no proximity, no load balancing.
//!
//! The selected person is CLAIMED: `is_available` is flipped to false
//! under the service's claim lock before the assignment is created, so
//! two concurrent matches cannot book the same person - the second match
//! observes zero candidates. Finding nobody is not an error; the order
//! simply proceeds without an assignment.

use crate::state::OrderStateMachine;
use crate::CoreError;
use chrono::Utc;
use market_storage::StorageService;
use market_types::{
	AssignmentStatus, DeliveryAssignment, DeliveryPerson, Order, StorageKey,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Matches newly created orders to available delivery persons.
pub struct MatchingService {
	storage: Arc<StorageService>,
	orders: Arc<OrderStateMachine>,
	/// Serializes candidate selection and the availability claim.
	claim_lock: Mutex<()>,
}

impl MatchingService {
	pub fn new(storage: Arc<StorageService>, orders: Arc<OrderStateMachine>) -> Self {
		Self {
			storage,
			orders,
			claim_lock: Mutex::new(()),
		}
	}

	/// Matches an order to a delivery person, if one is available.
	///
	/// Returns `Ok(None)` on the silent degraded path: no eligible
	/// candidate, or the order already has a non-delivered assignment
	/// (at most one active assignment per order).
	pub async fn match_delivery(
		&self,
		order: &Order,
	) -> Result<Option<DeliveryAssignment>, CoreError> {
		if let Some(existing) = self.active_assignment_for(&order.id).await? {
			tracing::warn!(
				order_id = %order.id,
				assignment_id = %existing.id,
				"Order already has an active assignment, skipping match"
			);
			return Ok(None);
		}

		let _guard = self.claim_lock.lock().await;

		let candidates: Vec<DeliveryPerson> = self
			.storage
			.list(StorageKey::DeliveryPersons.as_str())
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		let mut person = match candidates
			.into_iter()
			.find(|p| p.is_active && p.is_available)
		{
			Some(person) => person,
			None => {
				tracing::info!(
					order_id = %order.id,
					"No delivery person available, order proceeds without assignment"
				);
				return Ok(None);
			}
		};

		// Claim the candidate before opening the assignment so a
		// concurrent match sees zero candidates.
		person.is_available = false;
		self.storage
			.update(StorageKey::DeliveryPersons.as_str(), &person.id, &person)
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		let assignment = DeliveryAssignment {
			id: Uuid::new_v4().to_string(),
			order_id: order.id.clone(),
			delivery_person_id: person.id.clone(),
			status: AssignmentStatus::Pending,
			assigned_at: Utc::now(),
			accepted_at: None,
			picked_up_at: None,
			delivered_at: None,
		};

		if let Err(e) = self
			.storage
			.store(
				StorageKey::Assignments.as_str(),
				&assignment.id,
				&assignment,
			)
			.await
		{
			self.release_claim(&mut person).await;
			return Err(CoreError::Storage(e.to_string()));
		}

		// Back-link the delivery person onto the order.
		if let Err(e) = self
			.orders
			.update_order_with(&order.id, |o| {
				o.delivery_person_id = Some(person.id.clone());
			})
			.await
		{
			tracing::error!(
				order_id = %order.id,
				assignment_id = %assignment.id,
				"Failed to back-link assignment onto order, rolling back match: {}",
				e
			);
			if let Err(remove_err) = self
				.storage
				.remove(StorageKey::Assignments.as_str(), &assignment.id)
				.await
			{
				tracing::error!(
					assignment_id = %assignment.id,
					"Failed to remove assignment during rollback: {}",
					remove_err
				);
			}
			self.release_claim(&mut person).await;
			return Err(e);
		}

		tracing::info!(
			order_id = %order.id,
			assignment_id = %assignment.id,
			delivery_person_id = %person.id,
			"Opened delivery assignment"
		);

		Ok(Some(assignment))
	}

	/// Finds a non-delivered assignment already open for the order.
	async fn active_assignment_for(
		&self,
		order_id: &str,
	) -> Result<Option<DeliveryAssignment>, CoreError> {
		let assignments: Vec<DeliveryAssignment> = self
			.storage
			.list(StorageKey::Assignments.as_str())
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		Ok(assignments
			.into_iter()
			.find(|a| a.order_id == order_id && a.status != AssignmentStatus::Delivered))
	}

	/// Best-effort undo of an availability claim after a failed match.
	async fn release_claim(&self, person: &mut DeliveryPerson) {
		person.is_available = true;
		if let Err(e) = self
			.storage
			.update(StorageKey::DeliveryPersons.as_str(), &person.id, person)
			.await
		{
			tracing::error!(
				delivery_person_id = %person.id,
				"Failed to release claimed delivery person: {}",
				e
			);
		}
	}
}
