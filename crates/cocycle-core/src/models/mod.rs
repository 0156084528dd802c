//! Data models for ride service entities.
//!
//! This module contains the read-only snapshots returned by the ride
//! service:
//!
//! - `Ride`: a planned group ride with time, place, pace and capacity
//! - `Route`: the path geometry a ride follows
//! - `Participant`: a user's membership record against a ride
//! - `Coordinate`: a latitude/longitude pair shared by all of the above

pub mod participant;
pub mod ride;
pub mod route;

pub use participant::Participant;
pub use ride::{Ride, RideStatus, RideType};
pub use route::{Coordinate, Route};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing key for fields with a default
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
