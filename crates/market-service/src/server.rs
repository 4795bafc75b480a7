//! HTTP server for the marketplace API.
//!
//! This module provides the routing and axum glue for the order and
//! delivery endpoints; the handler logic itself lives in [`crate::apis`].

use axum::{
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::Json,
	routing::{get, patch, post},
	Router,
};
use market_config::ApiConfig;
use market_core::MarketEngine;
use market_types::{
	ApiError, AssignmentResponse, AssignmentRowResponse, AssignmentsResponse, OrderResponse,
	OrderRowResponse, OrdersResponse,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::{self, AssignmentsQuery, OrdersQuery};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<MarketEngine>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for all endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<MarketEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	let app = Router::new()
		.route(
			"/orders",
			post(handle_create_order).get(handle_list_orders),
		)
		.route("/orders/{id}", get(handle_get_order))
		.route("/orders/{id}/status", patch(handle_update_order_status))
		.route("/delivery/assignments", get(handle_list_assignments))
		.route(
			"/delivery/assignments/{id}",
			get(handle_get_assignment).patch(handle_update_assignment),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Marketplace API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /orders requests.
async fn handle_create_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<OrderRowResponse>), ApiError> {
	let response = apis::orders::create_order(&state.engine, &headers, payload).await?;
	Ok((StatusCode::CREATED, Json(response)))
}

/// Handles GET /orders requests.
async fn handle_list_orders(
	State(state): State<AppState>,
	Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>, ApiError> {
	let response = apis::orders::list_orders(&state.engine, query).await?;
	Ok(Json(response))
}

/// Handles GET /orders/{id} requests.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<OrderResponse>, ApiError> {
	let response = apis::orders::get_order(&state.engine, &id).await?;
	Ok(Json(response))
}

/// Handles PATCH /orders/{id}/status requests.
async fn handle_update_order_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<Json<OrderRowResponse>, ApiError> {
	let response =
		apis::orders::update_order_status(&state.engine, &headers, &id, payload).await?;
	Ok(Json(response))
}

/// Handles GET /delivery/assignments requests.
async fn handle_list_assignments(
	State(state): State<AppState>,
	Query(query): Query<AssignmentsQuery>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
	let response = apis::assignments::list_assignments(&state.engine, query).await?;
	Ok(Json(response))
}

/// Handles GET /delivery/assignments/{id} requests.
async fn handle_get_assignment(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, ApiError> {
	let response = apis::assignments::get_assignment(&state.engine, &id).await?;
	Ok(Json(response))
}

/// Handles PATCH /delivery/assignments/{id} requests.
async fn handle_update_assignment(
	Path(id): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<Json<AssignmentRowResponse>, ApiError> {
	let response =
		apis::assignments::update_assignment(&state.engine, &headers, &id, payload).await?;
	Ok(Json(response))
}
