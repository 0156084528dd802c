//! In-memory query cache for ride service data.
//!
//! This module provides the `QueryCache`, an explicitly constructed context
//! object shared by every consumer for the lifetime of a session. It starts
//! empty and is cleared with `QueryCache::clear` when the session ends.
//!
//! Entries are addressed by hierarchical `QueryKey`s and served from memory
//! while inside their staleness window. Concurrent reads of one key share a
//! single in-flight fetch, and failed fetches are retried once before the
//! error reaches the caller.
//!
//! `RideQueries` binds the cache to a `RideService` with the per-resource
//! staleness windows:
//! - Ride detail: 5 minutes
//! - Participants: 2 minutes
//! - Upcoming list: 2 minutes

pub mod guard;
pub mod key;
pub mod manager;
pub mod queries;

pub use guard::{RequestGuard, Ticket};
pub use key::{ride_keys, QueryKey};
pub use manager::{Cached, QueryCache, QueryOptions, QueryState};
pub use queries::{
    RideQueries, PARTICIPANTS_STALE_TIME, RIDE_STALE_TIME, UPCOMING_STALE_TIME,
};
