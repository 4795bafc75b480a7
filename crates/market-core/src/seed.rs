//! Demo directory seeding.
//!
//! Populates the vendor, customer and delivery person tables with the
//! fixed demo identities from configuration. Seeding is idempotent: rows
//! that already exist are left alone, so restarts never clobber state
//! accumulated during a demo run.

use crate::CoreError;
use chrono::Utc;
use market_config::DemoConfig;
use market_storage::StorageService;
use market_types::{Customer, DeliveryPerson, StorageKey, Vendor};

/// Seeds the demo directory rows if they are not already present.
pub async fn seed_demo_data(storage: &StorageService, demo: &DemoConfig) -> Result<(), CoreError> {
	let now = Utc::now();

	if !exists(storage, StorageKey::Customers, &demo.customer_id).await? {
		let customer = Customer {
			id: demo.customer_id.clone(),
			name: "Casey Demo".to_string(),
			phone: Some("+1-555-0100".to_string()),
			created_at: now,
		};
		store(storage, StorageKey::Customers, &customer.id, &customer).await?;
	}

	if !exists(storage, StorageKey::Vendors, &demo.vendor_id).await? {
		let vendor = Vendor {
			id: demo.vendor_id.clone(),
			user_id: None,
			name: "Demo Diner".to_string(),
			description: Some("All-day breakfast and burgers".to_string()),
			logo_url: None,
			address: Some("12 Market Street".to_string()),
			is_active: true,
			created_at: now,
		};
		store(storage, StorageKey::Vendors, &vendor.id, &vendor).await?;
	}

	let vehicles = ["bicycle", "scooter", "car"];
	for (index, id) in demo.delivery_person_ids.iter().enumerate() {
		if exists(storage, StorageKey::DeliveryPersons, id).await? {
			continue;
		}
		let person = DeliveryPerson {
			id: id.clone(),
			user_id: None,
			is_active: true,
			is_available: true,
			vehicle_type: vehicles[index % vehicles.len()].to_string(),
			created_at: now,
		};
		store(storage, StorageKey::DeliveryPersons, id, &person).await?;
	}

	tracing::info!(
		delivery_persons = demo.delivery_person_ids.len(),
		"Demo directory data seeded"
	);
	Ok(())
}

async fn exists(
	storage: &StorageService,
	table: StorageKey,
	id: &str,
) -> Result<bool, CoreError> {
	storage
		.exists(table.as_str(), id)
		.await
		.map_err(|e| CoreError::Storage(e.to_string()))
}

async fn store<T: serde::Serialize>(
	storage: &StorageService,
	table: StorageKey,
	id: &str,
	row: &T,
) -> Result<(), CoreError> {
	storage
		.store(table.as_str(), id, row)
		.await
		.map_err(|e| CoreError::Storage(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::memory_storage;

	#[tokio::test]
	async fn test_seed_is_idempotent() {
		let storage = memory_storage();
		let demo = DemoConfig::default();

		seed_demo_data(&storage, &demo).await.unwrap();

		// Claim a delivery person, then seed again; the claim survives.
		let mut person: DeliveryPerson = storage
			.retrieve(
				StorageKey::DeliveryPersons.as_str(),
				&demo.delivery_person_ids[0],
			)
			.await
			.unwrap();
		person.is_available = false;
		storage
			.update(StorageKey::DeliveryPersons.as_str(), &person.id, &person)
			.await
			.unwrap();

		seed_demo_data(&storage, &demo).await.unwrap();

		let reread: DeliveryPerson = storage
			.retrieve(
				StorageKey::DeliveryPersons.as_str(),
				&demo.delivery_person_ids[0],
			)
			.await
			.unwrap();
		assert!(!reread.is_available);

		let vendor: Vendor = storage
			.retrieve(StorageKey::Vendors.as_str(), &demo.vendor_id)
			.await
			.unwrap();
		assert!(vendor.is_active);
	}
}
