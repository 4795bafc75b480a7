//! Vendor and customer directory records.
//!
//! These are the read-side rows joined onto orders and assignments. The
//! core never mutates them; they exist so that query accessors can attach
//! vendor and customer-contact information to their results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vendor selling through the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
	/// Unique identifier for this vendor.
	pub id: String,
	/// Backing user account, if linked.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	/// Display name.
	pub name: String,
	/// Short description shown to customers.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Logo image URL.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub logo_url: Option<String>,
	/// Pickup address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	/// Whether the vendor is currently taking orders.
	pub is_active: bool,
	/// Timestamp when this record was created.
	pub created_at: DateTime<Utc>,
}

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
	/// Unique identifier for this customer.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Contact phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// Timestamp when this record was created.
	pub created_at: DateTime<Utc>,
}

/// Customer contact details joined onto delivery-side views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
	/// Display name.
	pub name: String,
	/// Contact phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
}

impl From<&Customer> for CustomerContact {
	fn from(customer: &Customer) -> Self {
		Self {
			name: customer.name.clone(),
			phone: customer.phone.clone(),
		}
	}
}
