//! Order types for the marketplace system.
//!
//! This module defines the order entity, its line items and the status
//! enum driving the order lifecycle, together with the joined read models
//! returned by the query side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CustomerContact, DeliveryAssignment, Vendor};

/// Status of an order in the marketplace.
///
/// Transitions between statuses are validated by the order lifecycle
/// manager; the variants here only name the states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been placed but not yet confirmed by the vendor.
	Pending,
	/// Vendor has confirmed the order.
	Confirmed,
	/// Vendor is preparing the order.
	Preparing,
	/// Order is ready for pickup by the delivery person.
	Ready,
	/// Delivery person has picked the order up.
	PickedUp,
	/// Order has been delivered (terminal).
	Delivered,
	/// Order has been cancelled (terminal).
	Cancelled,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::PickedUp => "picked_up",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		};
		write!(f, "{}", s)
	}
}

/// A customer's purchase request against one vendor.
///
/// Orders are created in `Pending` status by the order creation workflow,
/// mutated only through validated status transitions, and never deleted;
/// terminal orders (`Delivered`, `Cancelled`) are retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Customer who placed the order.
	pub customer_id: String,
	/// Vendor the order was placed against.
	pub vendor_id: String,
	/// Delivery person assigned to the order, once matched.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_person_id: Option<String>,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Sum of `quantity * unit_price` over the order items, fixed at
	/// creation time and never re-derived.
	pub total_amount: Decimal,
	/// Destination address for the delivery.
	pub delivery_address: String,
	/// Free-form delivery instructions.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_notes: Option<String>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
}

/// A single line item of an order.
///
/// Items snapshot the menu item's name and price at order time and are
/// intentionally decoupled from any later menu edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
	/// Unique identifier for this line item.
	pub id: String,
	/// Order this item belongs to.
	pub order_id: String,
	/// Menu item this line was created from.
	pub menu_item_id: String,
	/// Name snapshot at order time.
	pub name: String,
	/// Number of units ordered, always at least 1.
	pub quantity: u32,
	/// Unit price snapshot at order time.
	pub unit_price: Decimal,
	/// Free-form per-item notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
	/// Timestamp when this item was created.
	pub created_at: DateTime<Utc>,
}

/// An order joined with its vendor, items and (optionally) delivery data.
///
/// This is the read model served by the order endpoints; which joins are
/// populated depends on the accessor that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
	/// The order row itself.
	#[serde(flatten)]
	pub order: Order,
	/// Vendor the order was placed against, if still present.
	pub vendor: Option<Vendor>,
	/// Line items belonging to the order.
	pub items: Vec<OrderItem>,
	/// Delivery assignment opened for the order, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_assignment: Option<DeliveryAssignment>,
	/// Customer contact details, populated on delivery-side views.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer: Option<CustomerContact>,
}
