//! Order creation workflow.
//!
//! Composes a validated cart into an order plus its line items, then
//! invokes the delivery matching service. Validation happens before any
//! write. After the order row exists, the workflow favors partial success:
//! a failure to persist line items or to match a delivery person is logged
//! and the order is still returned - order existence outranks item
//! completeness in this design.

use crate::matching::MatchingService;
use crate::state::OrderStateMachine;
use crate::CoreError;
use chrono::Utc;
use market_storage::StorageService;
use market_types::{
	CreateOrderRequest, DeliveryAssignment, Order, OrderItem, OrderStatus, StorageKey,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Builds orders out of incoming cart submissions.
pub struct OrderWorkflow {
	storage: Arc<StorageService>,
	orders: Arc<OrderStateMachine>,
	matching: Arc<MatchingService>,
}

impl OrderWorkflow {
	pub fn new(
		storage: Arc<StorageService>,
		orders: Arc<OrderStateMachine>,
		matching: Arc<MatchingService>,
	) -> Self {
		Self {
			storage,
			orders,
			matching,
		}
	}

	/// Creates an order from a cart submission.
	///
	/// Returns the created order and the delivery assignment opened for
	/// it, if a delivery person was available.
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<(Order, Option<DeliveryAssignment>), CoreError> {
		validate_request(&request)?;

		let total_amount: Decimal = request
			.items
			.iter()
			.map(|item| item.unit_price * Decimal::from(item.quantity))
			.sum();

		let now = Utc::now();
		let mut order = Order {
			id: Uuid::new_v4().to_string(),
			customer_id: request.customer_id.clone(),
			vendor_id: request.vendor_id.clone(),
			delivery_person_id: None,
			status: OrderStatus::Pending,
			total_amount,
			delivery_address: request.delivery_address.clone(),
			delivery_notes: request.delivery_notes.clone(),
			created_at: now,
			updated_at: now,
		};

		self.orders.store_order(&order).await?;

		let items: Vec<OrderItem> = request
			.items
			.iter()
			.map(|item| OrderItem {
				id: Uuid::new_v4().to_string(),
				order_id: order.id.clone(),
				menu_item_id: item.menu_item_id.clone(),
				name: item.name.clone(),
				quantity: item.quantity,
				unit_price: item.unit_price,
				notes: item.notes.clone(),
				created_at: now,
			})
			.collect();

		// Order was created; a failure to persist its items is tolerated.
		if let Err(e) = self
			.storage
			.store(StorageKey::OrderItems.as_str(), &order.id, &items)
			.await
		{
			tracing::error!(order_id = %order.id, "Failed to store order items: {}", e);
		}

		let assignment = match self.matching.match_delivery(&order).await {
			Ok(assignment) => assignment,
			Err(e) => {
				tracing::warn!(order_id = %order.id, "Delivery matching failed: {}", e);
				None
			}
		};
		if let Some(assignment) = &assignment {
			order.delivery_person_id = Some(assignment.delivery_person_id.clone());
		}

		tracing::info!(
			order_id = %order.id,
			total_amount = %order.total_amount,
			matched = assignment.is_some(),
			"Created order"
		);

		Ok((order, assignment))
	}
}

/// Rejects malformed cart submissions before any write happens.
fn validate_request(request: &CreateOrderRequest) -> Result<(), CoreError> {
	if request.customer_id.trim().is_empty() {
		return Err(CoreError::InvalidInput(
			"customer_id is required".to_string(),
		));
	}
	if request.vendor_id.trim().is_empty() {
		return Err(CoreError::InvalidInput("vendor_id is required".to_string()));
	}
	if request.delivery_address.trim().is_empty() {
		return Err(CoreError::InvalidInput(
			"delivery_address is required".to_string(),
		));
	}
	if request.items.is_empty() {
		return Err(CoreError::InvalidInput(
			"items must not be empty".to_string(),
		));
	}
	for item in &request.items {
		if item.quantity < 1 {
			return Err(CoreError::InvalidInput(format!(
				"item '{}' has quantity {}, expected at least 1",
				item.name, item.quantity
			)));
		}
		if item.unit_price.is_sign_negative() {
			return Err(CoreError::InvalidInput(format!(
				"item '{}' has a negative unit price",
				item.name
			)));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::{memory_storage, sample_delivery_person, sample_request};
	use rust_decimal::Decimal;

	fn workflow(storage: Arc<StorageService>) -> OrderWorkflow {
		let orders = Arc::new(OrderStateMachine::new(storage.clone()));
		let matching = Arc::new(MatchingService::new(storage.clone(), orders.clone()));
		OrderWorkflow::new(storage, orders, matching)
	}

	#[tokio::test]
	async fn test_total_is_sum_of_line_totals() {
		let storage = memory_storage();
		let workflow = workflow(storage);

		// 10 x 2 + 5 x 1 = 25
		let request = sample_request(vec![(Decimal::from(10), 2), (Decimal::from(5), 1)]);
		let (order, _) = workflow.create_order(request).await.unwrap();
		assert_eq!(order.total_amount, Decimal::from(25));
		assert_eq!(order.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn test_empty_items_rejected_before_any_write() {
		let storage = memory_storage();
		let workflow = workflow(storage.clone());

		let request = sample_request(vec![]);
		let err = workflow.create_order(request).await.unwrap_err();
		assert!(matches!(err, CoreError::InvalidInput(_)));

		let orders: Vec<Order> = storage.list(StorageKey::Orders.as_str()).await.unwrap();
		assert!(orders.is_empty());
	}

	#[tokio::test]
	async fn test_blank_fields_rejected() {
		let storage = memory_storage();
		let workflow = workflow(storage);

		let mut request = sample_request(vec![(Decimal::from(4), 1)]);
		request.vendor_id = String::new();
		assert!(matches!(
			workflow.create_order(request).await,
			Err(CoreError::InvalidInput(_))
		));

		let mut request = sample_request(vec![(Decimal::from(4), 1)]);
		request.delivery_address = "  ".to_string();
		assert!(matches!(
			workflow.create_order(request).await,
			Err(CoreError::InvalidInput(_))
		));

		let request = sample_request(vec![(Decimal::from(4), 0)]);
		assert!(matches!(
			workflow.create_order(request).await,
			Err(CoreError::InvalidInput(_))
		));

		let request = sample_request(vec![(Decimal::from(-4), 1)]);
		assert!(matches!(
			workflow.create_order(request).await,
			Err(CoreError::InvalidInput(_))
		));
	}

	#[tokio::test]
	async fn test_order_without_candidates_has_no_assignment() {
		let storage = memory_storage();
		let workflow = workflow(storage);

		let request = sample_request(vec![(Decimal::from(7), 1)]);
		let (order, assignment) = workflow.create_order(request).await.unwrap();
		assert!(assignment.is_none());
		assert!(order.delivery_person_id.is_none());
	}

	#[tokio::test]
	async fn test_order_with_candidate_gets_assignment_and_items() {
		let storage = memory_storage();
		let workflow = workflow(storage.clone());

		let person = sample_delivery_person(true, true);
		storage
			.store(StorageKey::DeliveryPersons.as_str(), &person.id, &person)
			.await
			.unwrap();

		let request = sample_request(vec![(Decimal::from(3), 2)]);
		let (order, assignment) = workflow.create_order(request).await.unwrap();

		let assignment = assignment.unwrap();
		assert_eq!(assignment.order_id, order.id);
		assert_eq!(
			order.delivery_person_id.as_deref(),
			Some(person.id.as_str())
		);

		let items: Vec<OrderItem> = storage
			.retrieve(StorageKey::OrderItems.as_str(), &order.id)
			.await
			.unwrap();
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].quantity, 2);
		assert_eq!(items[0].order_id, order.id);
	}
}
