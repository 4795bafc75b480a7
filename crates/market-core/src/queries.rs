//! Read accessors for the order and delivery views.
//!
//! Queries are expressed as a namespace listing plus in-process filtering,
//! with the row joins (vendor, items, assignment, customer contact)
//! resolved per result. Joins are tolerant: a missing joined row degrades
//! to `None`/empty rather than failing the whole read.

use crate::CoreError;
use market_storage::{StorageError, StorageService};
use market_types::{
	AssignmentDetails, AssignmentStatus, Customer, CustomerContact, DeliveryAssignment, Order,
	OrderDetails, OrderItem, StorageKey, Vendor,
};
use std::sync::Arc;

/// Filter for order listings; all fields combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
	pub vendor_id: Option<String>,
	pub customer_id: Option<String>,
	pub delivery_person_id: Option<String>,
}

/// Query side of the marketplace: joined read models over the raw tables.
pub struct QueryService {
	storage: Arc<StorageService>,
}

impl QueryService {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Fetches a single order with vendor, items and assignment attached.
	pub async fn get_order_details(&self, order_id: &str) -> Result<OrderDetails, CoreError> {
		let order: Order = self
			.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CoreError::NotFound {
					entity: "Order",
					id: order_id.to_string(),
				},
				other => CoreError::Storage(other.to_string()),
			})?;

		let delivery_assignment = self.assignment_for_order(&order.id).await?;
		Ok(OrderDetails {
			vendor: self.join_vendor(&order.vendor_id).await,
			items: self.join_items(&order.id).await,
			delivery_assignment,
			customer: None,
			order,
		})
	}

	/// Lists orders matching the filter, newest-created first.
	///
	/// Each result carries vendor and items joins.
	pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderDetails>, CoreError> {
		let mut orders: Vec<Order> = self
			.storage
			.list(StorageKey::Orders.as_str())
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		orders.retain(|order| {
			filter
				.vendor_id
				.as_ref()
				.is_none_or(|v| &order.vendor_id == v)
				&& filter
					.customer_id
					.as_ref()
					.is_none_or(|c| &order.customer_id == c)
				&& filter
					.delivery_person_id
					.as_ref()
					.is_none_or(|d| order.delivery_person_id.as_ref() == Some(d))
		});
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		let mut details = Vec::with_capacity(orders.len());
		for order in orders {
			details.push(OrderDetails {
				vendor: self.join_vendor(&order.vendor_id).await,
				items: self.join_items(&order.id).await,
				delivery_assignment: None,
				customer: None,
				order,
			});
		}
		Ok(details)
	}

	/// Lists non-delivered assignments, newest-assigned first.
	///
	/// Optionally filtered to one delivery person; each result carries the
	/// full order join including customer contact.
	pub async fn list_active_assignments(
		&self,
		delivery_person_id: Option<&str>,
	) -> Result<Vec<AssignmentDetails>, CoreError> {
		let mut assignments: Vec<DeliveryAssignment> = self
			.storage
			.list(StorageKey::Assignments.as_str())
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		assignments.retain(|a| {
			a.status != AssignmentStatus::Delivered
				&& delivery_person_id.is_none_or(|id| a.delivery_person_id == id)
		});
		assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));

		let mut details = Vec::with_capacity(assignments.len());
		for assignment in assignments {
			let order = self.join_order_for_delivery(&assignment.order_id).await;
			details.push(AssignmentDetails { assignment, order });
		}
		Ok(details)
	}

	/// Fetches a single assignment with its full order join.
	pub async fn get_assignment_details(
		&self,
		assignment_id: &str,
	) -> Result<AssignmentDetails, CoreError> {
		let assignment: DeliveryAssignment = self
			.storage
			.retrieve(StorageKey::Assignments.as_str(), assignment_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => CoreError::NotFound {
					entity: "Assignment",
					id: assignment_id.to_string(),
				},
				other => CoreError::Storage(other.to_string()),
			})?;

		let order = self.join_order_for_delivery(&assignment.order_id).await;
		Ok(AssignmentDetails { assignment, order })
	}

	/// Joins the delivery-side view of an order: vendor, items and
	/// customer contact.
	async fn join_order_for_delivery(&self, order_id: &str) -> Option<OrderDetails> {
		let order: Order = match self
			.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
		{
			Ok(order) => order,
			Err(StorageError::NotFound) => return None,
			Err(e) => {
				tracing::warn!(order_id = %order_id, "Order join failed: {}", e);
				return None;
			}
		};

		let customer = self
			.join_row::<Customer>(StorageKey::Customers, &order.customer_id)
			.await
			.map(|c| CustomerContact::from(&c));

		Some(OrderDetails {
			vendor: self.join_vendor(&order.vendor_id).await,
			items: self.join_items(&order.id).await,
			delivery_assignment: None,
			customer,
			order,
		})
	}

	/// Finds the assignment attached to an order, preferring the newest.
	async fn assignment_for_order(
		&self,
		order_id: &str,
	) -> Result<Option<DeliveryAssignment>, CoreError> {
		let mut assignments: Vec<DeliveryAssignment> = self
			.storage
			.list(StorageKey::Assignments.as_str())
			.await
			.map_err(|e| CoreError::Storage(e.to_string()))?;

		assignments.retain(|a| a.order_id == order_id);
		assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
		Ok(assignments.into_iter().next())
	}

	async fn join_vendor(&self, vendor_id: &str) -> Option<Vendor> {
		self.join_row(StorageKey::Vendors, vendor_id).await
	}

	async fn join_items(&self, order_id: &str) -> Vec<OrderItem> {
		self.join_row::<Vec<OrderItem>>(StorageKey::OrderItems, order_id)
			.await
			.unwrap_or_default()
	}

	/// Tolerant single-row join: absence and backend trouble both degrade
	/// to `None`, with the latter logged.
	async fn join_row<T: serde::de::DeserializeOwned>(
		&self,
		table: StorageKey,
		id: &str,
	) -> Option<T> {
		match self.storage.retrieve(table.as_str(), id).await {
			Ok(row) => Some(row),
			Err(StorageError::NotFound) => None,
			Err(e) => {
				tracing::warn!(table = table.as_str(), id = %id, "Join failed: {}", e);
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::{
		memory_storage, sample_assignment, sample_customer, sample_order, sample_vendor,
	};
	use chrono::Duration;
	use market_types::OrderStatus;

	async fn store_order(storage: &StorageService, order: &Order) {
		storage
			.store(StorageKey::Orders.as_str(), &order.id, order)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_get_order_details_joins_everything() {
		let storage = memory_storage();
		let queries = QueryService::new(storage.clone());

		let vendor = sample_vendor();
		storage
			.store(StorageKey::Vendors.as_str(), &vendor.id, &vendor)
			.await
			.unwrap();

		let mut order = sample_order(OrderStatus::Pending);
		order.vendor_id = vendor.id.clone();
		store_order(&storage, &order).await;

		let assignment = sample_assignment(&order.id, AssignmentStatus::Pending);
		storage
			.store(StorageKey::Assignments.as_str(), &assignment.id, &assignment)
			.await
			.unwrap();

		let details = queries.get_order_details(&order.id).await.unwrap();
		assert_eq!(details.order.id, order.id);
		assert_eq!(details.vendor.unwrap().id, vendor.id);
		assert!(details.items.is_empty());
		assert_eq!(details.delivery_assignment.unwrap().id, assignment.id);
	}

	#[tokio::test]
	async fn test_get_order_details_missing_order() {
		let storage = memory_storage();
		let queries = QueryService::new(storage);

		let err = queries.get_order_details("missing").await.unwrap_err();
		assert!(matches!(err, CoreError::NotFound { entity: "Order", .. }));
	}

	#[tokio::test]
	async fn test_list_orders_filters_and_sorts_newest_first() {
		let storage = memory_storage();
		let queries = QueryService::new(storage.clone());

		let mut older = sample_order(OrderStatus::Pending);
		older.vendor_id = "vendor-a".to_string();
		let mut newer = sample_order(OrderStatus::Pending);
		newer.vendor_id = "vendor-a".to_string();
		newer.created_at = older.created_at + Duration::seconds(5);
		let mut other_vendor = sample_order(OrderStatus::Pending);
		other_vendor.vendor_id = "vendor-b".to_string();

		store_order(&storage, &older).await;
		store_order(&storage, &newer).await;
		store_order(&storage, &other_vendor).await;

		let filter = OrderFilter {
			vendor_id: Some("vendor-a".to_string()),
			..OrderFilter::default()
		};
		let listed = queries.list_orders(&filter).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].order.id, newer.id);
		assert_eq!(listed[1].order.id, older.id);
	}

	#[tokio::test]
	async fn test_active_assignments_exclude_delivered_and_sort_desc() {
		let storage = memory_storage();
		let queries = QueryService::new(storage.clone());

		let customer = sample_customer();
		storage
			.store(StorageKey::Customers.as_str(), &customer.id, &customer)
			.await
			.unwrap();

		let mut order = sample_order(OrderStatus::Pending);
		order.customer_id = customer.id.clone();
		store_order(&storage, &order).await;

		let mut first = sample_assignment(&order.id, AssignmentStatus::Pending);
		let mut second = sample_assignment(&order.id, AssignmentStatus::Accepted);
		second.assigned_at = first.assigned_at + Duration::seconds(10);
		first.delivery_person_id = "courier-1".to_string();
		second.delivery_person_id = "courier-1".to_string();
		let mut delivered = sample_assignment(&order.id, AssignmentStatus::Delivered);
		delivered.delivery_person_id = "courier-1".to_string();

		for a in [&first, &second, &delivered] {
			storage
				.store(StorageKey::Assignments.as_str(), &a.id, a)
				.await
				.unwrap();
		}

		let listed = queries
			.list_active_assignments(Some("courier-1"))
			.await
			.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].assignment.id, second.id);
		assert_eq!(listed[1].assignment.id, first.id);

		// The delivery view joins customer contact onto the order.
		let joined_order = listed[0].order.as_ref().unwrap();
		assert_eq!(joined_order.customer.as_ref().unwrap().name, customer.name);

		let none = queries
			.list_active_assignments(Some("courier-2"))
			.await
			.unwrap();
		assert!(none.is_empty());
	}

	#[tokio::test]
	async fn test_get_assignment_details_missing() {
		let storage = memory_storage();
		let queries = QueryService::new(storage);

		let err = queries.get_assignment_details("missing").await.unwrap_err();
		assert!(matches!(
			err,
			CoreError::NotFound {
				entity: "Assignment",
				..
			}
		));
	}
}
