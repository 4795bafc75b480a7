//! Order endpoint implementations.
//!
//! Implements creation, listing, retrieval and status transitions for
//! orders. Bodies are validated at the boundary; business rules live in
//! the core engine.

use axum::http::HeaderMap;
use market_core::{MarketEngine, OrderFilter};
use market_types::{
	ApiError, CreateOrderRequest, OrderResponse, OrderRowResponse, OrdersResponse, Role,
	UpdateOrderStatusRequest,
};
use serde_json::Value;
use tracing::info;

use super::{actor_from_headers, map_core_error, parse_body, OrdersQuery};

/// Processes POST /orders.
pub async fn create_order(
	engine: &MarketEngine,
	headers: &HeaderMap,
	payload: Value,
) -> Result<OrderRowResponse, ApiError> {
	let actor = actor_from_headers(headers, &engine.config().demo, Role::Customer);
	let request: CreateOrderRequest = parse_body(payload)?;

	info!(actor_id = %actor.actor_id, role = %actor.role, "Creating order");

	let order = engine
		.create_order(request)
		.await
		.map_err(map_core_error)?;

	Ok(OrderRowResponse { order })
}

/// Processes GET /orders with optional party filters.
pub async fn list_orders(
	engine: &MarketEngine,
	query: OrdersQuery,
) -> Result<OrdersResponse, ApiError> {
	let filter = OrderFilter {
		vendor_id: query.vendor_id,
		customer_id: query.customer_id,
		delivery_person_id: query.delivery_person_id,
	};

	let orders = engine
		.list_orders(&filter)
		.await
		.map_err(map_core_error)?;

	Ok(OrdersResponse { orders })
}

/// Processes GET /orders/{id}.
pub async fn get_order(engine: &MarketEngine, id: &str) -> Result<OrderResponse, ApiError> {
	let order = engine
		.get_order_details(id)
		.await
		.map_err(map_core_error)?;

	Ok(OrderResponse { order })
}

/// Processes PATCH /orders/{id}/status.
pub async fn update_order_status(
	engine: &MarketEngine,
	headers: &HeaderMap,
	id: &str,
	payload: Value,
) -> Result<OrderRowResponse, ApiError> {
	let actor = actor_from_headers(headers, &engine.config().demo, Role::Vendor);
	let request: UpdateOrderStatusRequest = parse_body(payload)?;

	info!(
		actor_id = %actor.actor_id,
		role = %actor.role,
		status = %request.status,
		"Updating order status"
	);

	let order = engine
		.transition_order(id, request.status)
		.await
		.map_err(map_core_error)?;

	Ok(OrderRowResponse { order })
}
