//! Storage-related types for the marketplace system.

use std::str::FromStr;

/// Storage tables for the different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Table for order rows
	Orders,
	/// Table for order line items, keyed by owning order
	OrderItems,
	/// Table for delivery assignments
	Assignments,
	/// Table for delivery person records
	DeliveryPersons,
	/// Table for vendor records
	Vendors,
	/// Table for customer records
	Customers,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::OrderItems => "order_items",
			StorageKey::Assignments => "delivery_assignments",
			StorageKey::DeliveryPersons => "delivery_persons",
			StorageKey::Vendors => "vendors",
			StorageKey::Customers => "customers",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::OrderItems,
			Self::Assignments,
			Self::DeliveryPersons,
			Self::Vendors,
			Self::Customers,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"order_items" => Ok(Self::OrderItems),
			"delivery_assignments" => Ok(Self::Assignments),
			"delivery_persons" => Ok(Self::DeliveryPersons),
			"vendors" => Ok(Self::Vendors),
			"customers" => Ok(Self::Customers),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
