//! API types for the marketplace HTTP API.
//!
//! This module defines the request and response types for the order and
//! delivery endpoints, plus the error envelope returned on every failure.
//! Request bodies deny unknown fields so that malformed input is rejected
//! at the boundary before any business logic runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
	AssignmentDetails, AssignmentStatus, DeliveryAssignment, Order, OrderDetails, OrderStatus,
};

/// A line item as submitted by the client when placing an order.
///
/// Name and price are client-supplied snapshots of the menu item; they are
/// not re-validated against the vendor's current menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemInput {
	/// Menu item this line was built from.
	pub menu_item_id: String,
	/// Name snapshot at order time.
	pub name: String,
	/// Number of units ordered.
	pub quantity: u32,
	/// Unit price snapshot at order time.
	pub unit_price: Decimal,
	/// Free-form per-item notes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
	/// Customer placing the order.
	pub customer_id: String,
	/// Vendor the order is placed against.
	pub vendor_id: String,
	/// Line items; must be non-empty.
	pub items: Vec<OrderItemInput>,
	/// Destination address; must be non-empty.
	pub delivery_address: String,
	/// Free-form delivery instructions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivery_notes: Option<String>,
}

/// Request body for `PATCH /orders/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
	/// Requested new status.
	pub status: OrderStatus,
}

/// Request body for `PATCH /delivery/assignments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAssignmentStatusRequest {
	/// Requested new status.
	pub status: AssignmentStatus,
}

/// Response envelope for a bare order row (create and status update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRowResponse {
	/// The created or updated order row.
	pub order: Order,
}

/// Response envelope for a single joined order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
	/// The order with vendor, items and assignment joined.
	pub order: OrderDetails,
}

/// Response envelope for an order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
	/// Orders with vendor and items joined, newest first.
	pub orders: Vec<OrderDetails>,
}

/// Response envelope for a bare assignment row (status update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRowResponse {
	/// The updated assignment row.
	pub assignment: DeliveryAssignment,
}

/// Response envelope for a single joined assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
	/// The assignment with its full order joined.
	pub assignment: AssignmentDetails,
}

/// Response envelope for an assignment listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsResponse {
	/// Active assignments, newest-assigned first.
	pub assignments: Vec<AssignmentDetails>,
}

/// API error response body.
///
/// Every failure returns this envelope: a human-readable message plus a
/// stable machine-readable kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Human-readable description.
	pub error: String,
	/// Stable machine-readable error kind.
	pub kind: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or malformed request fields (400).
	InvalidInput { message: String },
	/// Status graph violation; names current and requested state (400).
	InvalidTransition { message: String },
	/// Referenced entity absent (404).
	NotFound { message: String },
	/// Storage backend failure; opaque to the caller (500).
	DependencyFailure { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::InvalidInput { .. } => 400,
			ApiError::InvalidTransition { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::DependencyFailure { .. } => 500,
		}
	}

	/// Get the stable machine-readable kind for this error.
	pub fn kind(&self) -> &'static str {
		match self {
			ApiError::InvalidInput { .. } => "invalid_input",
			ApiError::InvalidTransition { .. } => "invalid_transition",
			ApiError::NotFound { .. } => "not_found",
			ApiError::DependencyFailure { .. } => "dependency_failure",
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::InvalidInput { message } => message.clone(),
			ApiError::InvalidTransition { message } => message.clone(),
			ApiError::NotFound { message } => message.clone(),
			// Dependency failures stay opaque; the detail is logged server-side.
			ApiError::DependencyFailure { .. } => "Internal server error".to_string(),
		};
		ErrorResponse {
			error: message,
			kind: self.kind().to_string(),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
			ApiError::InvalidTransition { message } => write!(f, "Invalid transition: {}", message),
			ApiError::NotFound { message } => write!(f, "Not found: {}", message),
			ApiError::DependencyFailure { message } => write!(f, "Dependency failure: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			404 => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
