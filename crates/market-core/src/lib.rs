//! Core engine for the marketplace system.
//!
//! This module provides the order lifecycle and delivery-assignment
//! coordination logic: the two linked state machines, the delivery
//! matching rule, the order creation workflow and the joined read
//! accessors, all exposed through the [`MarketEngine`] facade. The engine
//! publishes change notices for every successful write so long-lived read
//! paths can refetch current state.

use market_config::Config;
use market_storage::{StorageFactory, StorageService};
use market_types::{
	AssignmentChange, AssignmentDetails, AssignmentStatus, CreateOrderRequest,
	DeliveryAssignment, MarketEvent, Order, OrderChange, OrderDetails, OrderStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

pub mod event_bus;
pub mod matching;
pub mod queries;
pub mod seed;
pub mod state;
pub mod workflow;

pub use event_bus::EventBus;
pub use matching::MatchingService;
pub use queries::{OrderFilter, QueryService};
pub use state::{AssignmentStateMachine, OrderStateMachine};
pub use workflow::OrderWorkflow;

/// Utility function to truncate an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub(crate) fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Errors produced by the core operations.
///
/// The four variants mirror the system's error taxonomy: user-correctable
/// input problems, status-graph violations (always naming both the
/// current and the requested status), absent entities, and backend
/// failures that callers surface as opaque dependency errors.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Missing or malformed request fields.
	#[error("{0}")]
	InvalidInput(String),
	/// Requested order status is not reachable from the current one.
	#[error("Cannot transition from {current} to {requested}")]
	InvalidOrderTransition {
		current: OrderStatus,
		requested: OrderStatus,
	},
	/// Requested assignment status is not reachable from the current one.
	#[error("Cannot transition from {current} to {requested}")]
	InvalidAssignmentTransition {
		current: AssignmentStatus,
		requested: AssignmentStatus,
	},
	/// Referenced entity absent.
	#[error("{entity} not found: {id}")]
	NotFound { entity: &'static str, id: String },
	/// Storage backend failure.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Main engine coordinating the marketplace core.
///
/// Composes the storage service, both state machines, the matching
/// service, the order creation workflow and the query side, and owns the
/// event bus feeding change notices to subscribers.
#[derive(Clone)]
pub struct MarketEngine {
	config: Config,
	storage: Arc<StorageService>,
	orders: Arc<OrderStateMachine>,
	assignments: Arc<AssignmentStateMachine>,
	workflow: Arc<OrderWorkflow>,
	queries: Arc<QueryService>,
	event_bus: EventBus,
}

impl std::fmt::Debug for MarketEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MarketEngine").finish_non_exhaustive()
	}
}

impl MarketEngine {
	/// Creates a new engine over an already-constructed storage service.
	pub fn new(config: Config, storage: Arc<StorageService>) -> Self {
		let orders = Arc::new(OrderStateMachine::new(storage.clone()));
		let assignments = Arc::new(AssignmentStateMachine::new(
			storage.clone(),
			orders.clone(),
			config.assignment.accepted_order_status,
		));
		let matching = Arc::new(MatchingService::new(storage.clone(), orders.clone()));
		let workflow = Arc::new(OrderWorkflow::new(
			storage.clone(),
			orders.clone(),
			matching,
		));
		let queries = Arc::new(QueryService::new(storage.clone()));

		Self {
			config,
			storage,
			orders,
			assignments,
			workflow,
			queries,
			event_bus: EventBus::default(),
		}
	}

	/// Creates an order from a cart submission and publishes the notices.
	#[instrument(skip_all, fields(vendor_id = %truncate_id(&request.vendor_id)))]
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, CoreError> {
		let (order, assignment) = self.workflow.create_order(request).await?;

		self.event_bus
			.publish(MarketEvent::Order(OrderChange::Created {
				order_id: order.id.clone(),
			}))
			.ok();
		if let Some(assignment) = assignment {
			self.event_bus
				.publish(MarketEvent::Assignment(AssignmentChange::Created {
					assignment_id: assignment.id,
					order_id: order.id.clone(),
					delivery_person_id: assignment.delivery_person_id,
				}))
				.ok();
		}

		Ok(order)
	}

	/// Transitions an order through the validated status graph.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn transition_order(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<Order, CoreError> {
		let order = self.orders.transition_order(order_id, status).await?;

		self.event_bus
			.publish(MarketEvent::Order(OrderChange::StatusChanged {
				order_id: order.id.clone(),
			}))
			.ok();

		Ok(order)
	}

	/// Transitions an assignment and cascades into the linked order.
	#[instrument(skip_all, fields(assignment_id = %truncate_id(assignment_id)))]
	pub async fn transition_assignment(
		&self,
		assignment_id: &str,
		status: AssignmentStatus,
	) -> Result<DeliveryAssignment, CoreError> {
		let assignment = self
			.assignments
			.transition_assignment(assignment_id, status)
			.await?;

		// Two notices: the assignment changed and, through the cascade,
		// so did the linked order.
		self.event_bus
			.publish(MarketEvent::Assignment(AssignmentChange::StatusChanged {
				assignment_id: assignment.id.clone(),
				order_id: assignment.order_id.clone(),
			}))
			.ok();
		self.event_bus
			.publish(MarketEvent::Order(OrderChange::StatusChanged {
				order_id: assignment.order_id.clone(),
			}))
			.ok();

		Ok(assignment)
	}

	/// Fetches a single order with vendor, items and assignment attached.
	pub async fn get_order_details(&self, order_id: &str) -> Result<OrderDetails, CoreError> {
		self.queries.get_order_details(order_id).await
	}

	/// Lists orders matching the filter, newest first.
	pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderDetails>, CoreError> {
		self.queries.list_orders(filter).await
	}

	/// Lists active assignments, optionally for one delivery person.
	pub async fn list_active_assignments(
		&self,
		delivery_person_id: Option<&str>,
	) -> Result<Vec<AssignmentDetails>, CoreError> {
		self.queries.list_active_assignments(delivery_person_id).await
	}

	/// Fetches a single assignment with its full order join.
	pub async fn get_assignment_details(
		&self,
		assignment_id: &str,
	) -> Result<AssignmentDetails, CoreError> {
		self.queries.get_assignment_details(assignment_id).await
	}

	/// Seeds the demo directory rows configured under `[demo]`.
	pub async fn seed_demo_data(&self) -> Result<(), CoreError> {
		seed::seed_demo_data(&self.storage, &self.config.demo).await
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}
}

/// Builds a [`MarketEngine`] from configuration and storage factories.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new builder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, resolving the configured primary storage
	/// backend through the factory map and validating its configuration
	/// against the backend's schema.
	pub fn build(
		self,
		storage_factories: HashMap<String, StorageFactory>,
	) -> Result<MarketEngine, EngineError> {
		let primary = &self.config.storage.primary;
		let factory = storage_factories.get(primary).ok_or_else(|| {
			EngineError::Config(format!("No storage factory registered for '{}'", primary))
		})?;
		let backend_config = self
			.config
			.storage
			.implementations
			.get(primary)
			.ok_or_else(|| {
				EngineError::Config(format!("No configuration for storage '{}'", primary))
			})?;

		let backend =
			factory(backend_config).map_err(|e| EngineError::Storage(e.to_string()))?;
		backend
			.config_schema()
			.validate(backend_config)
			.map_err(|e| EngineError::Config(e.to_string()))?;

		let storage = Arc::new(StorageService::new(backend));
		Ok(MarketEngine::new(self.config, storage))
	}
}

#[cfg(test)]
pub(crate) mod testutil {
	//! Shared fixtures for the core unit tests.

	use chrono::Utc;
	use market_storage::{implementations::memory::MemoryStorage, StorageService};
	use market_types::{
		AssignmentStatus, CreateOrderRequest, Customer, DeliveryAssignment, DeliveryPerson,
		Order, OrderItemInput, OrderStatus, Vendor,
	};
	use rust_decimal::Decimal;
	use std::sync::Arc;
	use uuid::Uuid;

	pub fn memory_storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	pub fn sample_order(status: OrderStatus) -> Order {
		let now = Utc::now();
		Order {
			id: Uuid::new_v4().to_string(),
			customer_id: "customer-1".to_string(),
			vendor_id: "vendor-1".to_string(),
			delivery_person_id: None,
			status,
			total_amount: Decimal::from(25),
			delivery_address: "1 Test Lane".to_string(),
			delivery_notes: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn sample_assignment(order_id: &str, status: AssignmentStatus) -> DeliveryAssignment {
		DeliveryAssignment {
			id: Uuid::new_v4().to_string(),
			order_id: order_id.to_string(),
			delivery_person_id: "courier-1".to_string(),
			status,
			assigned_at: Utc::now(),
			accepted_at: None,
			picked_up_at: None,
			delivered_at: None,
		}
	}

	pub fn sample_delivery_person(is_active: bool, is_available: bool) -> DeliveryPerson {
		DeliveryPerson {
			id: Uuid::new_v4().to_string(),
			user_id: None,
			is_active,
			is_available,
			vehicle_type: "bicycle".to_string(),
			created_at: Utc::now(),
		}
	}

	pub fn sample_vendor() -> Vendor {
		Vendor {
			id: Uuid::new_v4().to_string(),
			user_id: None,
			name: "Test Vendor".to_string(),
			description: None,
			logo_url: None,
			address: None,
			is_active: true,
			created_at: Utc::now(),
		}
	}

	pub fn sample_customer() -> Customer {
		Customer {
			id: Uuid::new_v4().to_string(),
			name: "Test Customer".to_string(),
			phone: Some("+1-555-0199".to_string()),
			created_at: Utc::now(),
		}
	}

	pub fn sample_request(items: Vec<(Decimal, u32)>) -> CreateOrderRequest {
		CreateOrderRequest {
			customer_id: "customer-1".to_string(),
			vendor_id: "vendor-1".to_string(),
			items: items
				.into_iter()
				.enumerate()
				.map(|(i, (unit_price, quantity))| OrderItemInput {
					menu_item_id: format!("menu-{}", i),
					name: format!("Item {}", i),
					quantity,
					unit_price,
					notes: None,
				})
				.collect(),
			delivery_address: "1 Test Lane".to_string(),
			delivery_notes: None,
		}
	}
}
