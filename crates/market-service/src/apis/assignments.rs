//! Delivery assignment endpoint implementations.
//!
//! Implements the delivery person's queue view, single-assignment
//! retrieval and status transitions. An accepted transition cascades the
//! linked order's status inside the core engine.

use axum::http::HeaderMap;
use market_core::MarketEngine;
use market_types::{
	ApiError, AssignmentResponse, AssignmentRowResponse, AssignmentsResponse, Role,
	UpdateAssignmentStatusRequest,
};
use serde_json::Value;
use tracing::info;

use super::{actor_from_headers, map_core_error, parse_body, AssignmentsQuery};

/// Processes GET /delivery/assignments.
///
/// Lists active (non-delivered) assignments, newest-assigned first, with
/// the full order join on each.
pub async fn list_assignments(
	engine: &MarketEngine,
	query: AssignmentsQuery,
) -> Result<AssignmentsResponse, ApiError> {
	let assignments = engine
		.list_active_assignments(query.delivery_person_id.as_deref())
		.await
		.map_err(map_core_error)?;

	Ok(AssignmentsResponse { assignments })
}

/// Processes GET /delivery/assignments/{id}.
pub async fn get_assignment(
	engine: &MarketEngine,
	id: &str,
) -> Result<AssignmentResponse, ApiError> {
	let assignment = engine
		.get_assignment_details(id)
		.await
		.map_err(map_core_error)?;

	Ok(AssignmentResponse { assignment })
}

/// Processes PATCH /delivery/assignments/{id}.
pub async fn update_assignment(
	engine: &MarketEngine,
	headers: &HeaderMap,
	id: &str,
	payload: Value,
) -> Result<AssignmentRowResponse, ApiError> {
	let actor = actor_from_headers(headers, &engine.config().demo, Role::Delivery);
	let request: UpdateAssignmentStatusRequest = parse_body(payload)?;

	info!(
		actor_id = %actor.actor_id,
		role = %actor.role,
		status = %request.status,
		"Updating assignment status"
	);

	let assignment = engine
		.transition_assignment(id, request.status)
		.await
		.map_err(map_core_error)?;

	Ok(AssignmentRowResponse { assignment })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apis::orders::create_order;
	use crate::apis::tests_support::{demo_engine, demo_order_payload};
	use market_types::{AssignmentStatus, OrderStatus};

	async fn created_assignment_id(engine: &MarketEngine) -> (String, String) {
		let headers = HeaderMap::new();
		let created = create_order(engine, &headers, demo_order_payload(engine))
			.await
			.unwrap();
		let details = engine.get_order_details(&created.order.id).await.unwrap();
		(created.order.id, details.delivery_assignment.unwrap().id)
	}

	#[tokio::test]
	async fn test_queue_lists_active_assignments_with_joins() {
		let engine = demo_engine().await;
		let (order_id, assignment_id) = created_assignment_id(&engine).await;

		let listed = list_assignments(&engine, AssignmentsQuery::default())
			.await
			.unwrap();
		assert_eq!(listed.assignments.len(), 1);
		assert_eq!(listed.assignments[0].assignment.id, assignment_id);

		let joined_order = listed.assignments[0].order.as_ref().unwrap();
		assert_eq!(joined_order.order.id, order_id);
		assert_eq!(joined_order.items.len(), 2);
		assert!(joined_order.vendor.is_some());
		assert!(joined_order.customer.is_some());

		let fetched = get_assignment(&engine, &assignment_id).await.unwrap();
		assert_eq!(fetched.assignment.assignment.id, assignment_id);
	}

	#[tokio::test]
	async fn test_accept_cascades_order_to_confirmed() {
		let engine = demo_engine().await;
		let (order_id, assignment_id) = created_assignment_id(&engine).await;

		let headers = HeaderMap::new();
		let accepted = update_assignment(
			&engine,
			&headers,
			&assignment_id,
			serde_json::json!({ "status": "accepted" }),
		)
		.await
		.unwrap();
		assert_eq!(accepted.assignment.status, AssignmentStatus::Accepted);
		assert!(accepted.assignment.accepted_at.is_some());
		assert!(accepted.assignment.picked_up_at.is_none());
		assert!(accepted.assignment.delivered_at.is_none());

		let order = engine.get_order_details(&order_id).await.unwrap().order;
		assert_eq!(order.status, OrderStatus::Confirmed);
	}

	#[tokio::test]
	async fn test_skipping_statuses_is_rejected() {
		let engine = demo_engine().await;
		let (_order_id, assignment_id) = created_assignment_id(&engine).await;

		let headers = HeaderMap::new();
		let err = update_assignment(
			&engine,
			&headers,
			&assignment_id,
			serde_json::json!({ "status": "delivered" }),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.kind(), "invalid_transition");
	}

	#[tokio::test]
	async fn test_missing_assignment_and_body_validation() {
		let engine = demo_engine().await;

		let headers = HeaderMap::new();
		let err = update_assignment(
			&engine,
			&headers,
			"missing",
			serde_json::json!({ "status": "accepted" }),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 404);

		let err = get_assignment(&engine, "missing").await.unwrap_err();
		assert_eq!(err.status_code(), 404);

		let (_order_id, assignment_id) = created_assignment_id(&engine).await;
		let err = update_assignment(
			&engine,
			&headers,
			&assignment_id,
			serde_json::json!({}),
		)
		.await
		.unwrap_err();
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.kind(), "invalid_input");
	}

	#[tokio::test]
	async fn test_delivered_assignment_leaves_queue() {
		let engine = demo_engine().await;
		let (order_id, assignment_id) = created_assignment_id(&engine).await;

		let headers = HeaderMap::new();
		for status in ["accepted", "picked_up", "delivered"] {
			update_assignment(
				&engine,
				&headers,
				&assignment_id,
				serde_json::json!({ "status": status }),
			)
			.await
			.unwrap();
		}

		let order = engine.get_order_details(&order_id).await.unwrap().order;
		assert_eq!(order.status, OrderStatus::Delivered);

		let listed = list_assignments(&engine, AssignmentsQuery::default())
			.await
			.unwrap();
		assert!(listed.assignments.is_empty());
	}
}
