//! Request-scoped actor identity.
//!
//! The original design kept the active role in ambient session state; here
//! the acting identity is an explicit value extracted per request and
//! passed into each handler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role an actor performs for the duration of one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Places orders.
	Customer,
	/// Confirms and prepares orders.
	Vendor,
	/// Accepts and fulfils delivery assignments.
	Delivery,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Role::Customer => "customer",
			Role::Vendor => "vendor",
			Role::Delivery => "delivery",
		};
		write!(f, "{}", s)
	}
}

impl FromStr for Role {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customer" => Ok(Self::Customer),
			"vendor" => Ok(Self::Vendor),
			"delivery" => Ok(Self::Delivery),
			_ => Err(()),
		}
	}
}

/// The acting identity for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
	/// Identity of the actor making the request.
	pub actor_id: String,
	/// Role the actor is acting under.
	pub role: Role,
}

impl ActorContext {
	/// Creates a new actor context.
	pub fn new(actor_id: impl Into<String>, role: Role) -> Self {
		Self {
			actor_id: actor_id.into(),
			role,
		}
	}
}
