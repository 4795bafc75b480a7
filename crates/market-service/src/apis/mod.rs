//! Handler logic for the marketplace API endpoints.
//!
//! Each submodule implements the processing behind one endpoint family;
//! this module holds what they share: explicit request-body validation,
//! the core-to-HTTP error mapping, and the request-scoped actor context.

pub mod assignments;
pub mod orders;

use axum::http::HeaderMap;
use market_config::DemoConfig;
use market_core::CoreError;
use market_types::{ActorContext, ApiError, Role};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Query parameters accepted by GET /orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
	pub vendor_id: Option<String>,
	pub customer_id: Option<String>,
	pub delivery_person_id: Option<String>,
}

/// Query parameters accepted by GET /delivery/assignments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentsQuery {
	pub delivery_person_id: Option<String>,
}

/// Deserializes a request body with explicit schema validation.
///
/// Unknown, missing and mistyped fields are all rejected here, before
/// any business logic runs.
pub(crate) fn parse_body<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, ApiError> {
	serde_json::from_value(payload).map_err(|e| ApiError::InvalidInput {
		message: format!("Invalid request body: {}", e),
	})
}

/// Maps a core error onto the HTTP error taxonomy.
///
/// Dependency failures are logged here with full detail; the caller only
/// sees an opaque message.
pub(crate) fn map_core_error(err: CoreError) -> ApiError {
	match err {
		CoreError::InvalidInput(message) => ApiError::InvalidInput { message },
		CoreError::InvalidOrderTransition { .. } => ApiError::InvalidTransition {
			message: err.to_string(),
		},
		CoreError::InvalidAssignmentTransition { .. } => ApiError::InvalidTransition {
			message: err.to_string(),
		},
		CoreError::NotFound { entity, ref id } => {
			tracing::debug!(entity, id = %id, "Entity not found");
			ApiError::NotFound {
				message: format!("{} not found", entity),
			}
		}
		CoreError::Storage(message) => {
			tracing::error!("Storage failure: {}", message);
			ApiError::DependencyFailure { message }
		}
	}
}

/// Extracts the acting identity for this request.
///
/// Reads the `x-actor-id` and `x-actor-role` headers; absent or
/// unparsable values fall back to the endpoint's default role and the
/// matching demo identity. This keeps identity an explicit per-request
/// value rather than ambient state, even though the demo has no real
/// authentication.
pub(crate) fn actor_from_headers(
	headers: &HeaderMap,
	demo: &DemoConfig,
	default_role: Role,
) -> ActorContext {
	let role = headers
		.get("x-actor-role")
		.and_then(|v| v.to_str().ok())
		.and_then(|s| s.parse::<Role>().ok())
		.unwrap_or(default_role);

	let actor_id = headers
		.get("x-actor-id")
		.and_then(|v| v.to_str().ok())
		.map(str::to_string)
		.unwrap_or_else(|| match role {
			Role::Customer => demo.customer_id.clone(),
			Role::Vendor => demo.vendor_id.clone(),
			Role::Delivery => demo
				.delivery_person_ids
				.first()
				.cloned()
				.unwrap_or_default(),
		});

	ActorContext::new(actor_id, role)
}
