//! Delivery assignment types for the marketplace system.
//!
//! A delivery assignment binds an order to a delivery person and carries
//! its own status lifecycle, loosely coupled to the order lifecycle
//! through the cascade performed by the assignment manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::OrderDetails;

/// Status of a delivery assignment.
///
/// The lifecycle is strictly monotonic: `Pending -> Accepted -> PickedUp
/// -> Delivered`, with no skips and no cancellation path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
	/// Assignment has been offered to the delivery person.
	Pending,
	/// Delivery person has accepted the assignment.
	Accepted,
	/// Delivery person has picked the order up from the vendor.
	PickedUp,
	/// Order has been handed to the customer (terminal).
	Delivered,
}

impl fmt::Display for AssignmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AssignmentStatus::Pending => "pending",
			AssignmentStatus::Accepted => "accepted",
			AssignmentStatus::PickedUp => "picked_up",
			AssignmentStatus::Delivered => "delivered",
		};
		write!(f, "{}", s)
	}
}

/// The binding of an order to a delivery person.
///
/// Created by the matching service when a delivery person is available at
/// order-creation time; never deleted. Each timestamp field is stamped
/// exactly once, when the corresponding status is first reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAssignment {
	/// Unique identifier for this assignment.
	pub id: String,
	/// Order this assignment delivers.
	pub order_id: String,
	/// Delivery person the order is assigned to.
	pub delivery_person_id: String,
	/// Current status of the assignment.
	pub status: AssignmentStatus,
	/// Timestamp when the assignment was created.
	pub assigned_at: DateTime<Utc>,
	/// Timestamp when the assignment was first accepted.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub accepted_at: Option<DateTime<Utc>>,
	/// Timestamp when the order was first picked up.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub picked_up_at: Option<DateTime<Utc>>,
	/// Timestamp when the order was first delivered.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<DateTime<Utc>>,
}

/// A delivery person eligible for matching.
///
/// `is_active` and `is_available` are the sole eligibility filter used by
/// the matching service; `is_available` doubles as the claim flag once a
/// match succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPerson {
	/// Unique identifier for this delivery person.
	pub id: String,
	/// Backing user account, if linked.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	/// Whether the delivery person is active at all.
	pub is_active: bool,
	/// Whether the delivery person can take a new assignment.
	pub is_available: bool,
	/// Vehicle used for deliveries.
	pub vehicle_type: String,
	/// Timestamp when this record was created.
	pub created_at: DateTime<Utc>,
}

/// An assignment joined with its full order details.
///
/// Served by the delivery endpoints; the order carries vendor, items and
/// customer contact joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDetails {
	/// The assignment row itself.
	#[serde(flatten)]
	pub assignment: DeliveryAssignment,
	/// The order being delivered, with vendor/items/customer joined.
	pub order: Option<OrderDetails>,
}
