//! REST API client module for the ride service.
//!
//! This module provides the `ApiClient` for reading rides, their
//! participants and the upcoming ride list. Every failure is classified
//! into an `ApiError`; callers never see raw transport errors.
//!
//! The `RideService` trait is the seam the query cache depends on, so the
//! cache can be exercised without a network.

pub mod client;
pub mod error;

pub use client::{ApiClient, RideService, UpcomingFilter};
pub use error::ApiError;
