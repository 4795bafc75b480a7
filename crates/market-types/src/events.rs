//! Change-notice event types for the notification feed.
//!
//! This module defines the event system used to signal row changes to
//! long-lived read paths (order tracking, vendor queue, delivery queue).
//! Notices carry entity ids ONLY: a consumer must treat each notice as a
//! signal to refetch full current state, never as a delta to apply.

use serde::{Deserialize, Serialize};

/// Main event type encompassing all marketplace change notices.
///
/// Events are categorized by the table that changed, allowing consumers
/// to filter and handle specific notice types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MarketEvent {
	/// Notices about order rows.
	Order(OrderChange),
	/// Notices about delivery assignment rows.
	Assignment(AssignmentChange),
}

/// Change notices for the orders table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderChange {
	/// A new order has been created.
	Created { order_id: String },
	/// An order's status has changed.
	StatusChanged { order_id: String },
}

/// Change notices for the delivery assignments table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssignmentChange {
	/// A new assignment has been opened for an order.
	Created {
		assignment_id: String,
		order_id: String,
		delivery_person_id: String,
	},
	/// An assignment's status has changed (and the linked order's status
	/// has been cascaded).
	StatusChanged {
		assignment_id: String,
		order_id: String,
	},
}
