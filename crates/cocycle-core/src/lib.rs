//! Cocycle Core - ride detail client library.
//!
//! This crate provides everything needed to show a single group ride:
//!
//! - `api`: read-only HTTP client for rides, participants and upcoming rides
//! - `cache`: deduplicating, time-windowed query cache over the client
//! - `models`: the service's data snapshots
//! - `view`: pure derivation of display fields from those snapshots
//! - `map`: route framing, overlays and map surface lifecycle
//! - `config`: environment-driven configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod map;
pub mod models;
pub mod view;

pub use api::{ApiClient, ApiError, RideService, UpcomingFilter};
pub use cache::{QueryCache, QueryState, RideQueries};
pub use config::Config;
pub use models::{Coordinate, Participant, Ride, RideStatus, RideType, Route};
