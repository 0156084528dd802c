//! API client for the ride service.
//!
//! This module provides the `ApiClient` struct for the read-only ride
//! endpoints, plus the `RideService` trait the query cache is written
//! against.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{Participant, Ride};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// There is no separate timeout policy; a request that hangs past this fails
/// as a network error and falls under the cache's retry rule.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Optional location filter for the upcoming ride list.
///
/// Every supplied parameter becomes a query parameter and part of the cache
/// key; absent parameters are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpcomingFilter {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Search radius in kilometers
    pub radius: Option<f64>,
}

impl UpcomingFilter {
    pub fn near(lat: f64, lng: f64, radius: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            radius: Some(radius),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_none() && self.lng.is_none() && self.radius.is_none()
    }

    /// `?lat=..&lng=..&radius=..` with only the supplied parameters, or "".
    pub fn query_string(&self) -> String {
        let params: Vec<String> = [("lat", self.lat), ("lng", self.lng), ("radius", self.radius)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| format!("{}={}", name, v)))
            .collect();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

/// Read operations the rest of the system needs from the ride service.
pub trait RideService: Send + Sync + 'static {
    fn fetch_ride(&self, id: &str) -> impl Future<Output = Result<Ride, ApiError>> + Send;

    fn fetch_participants(
        &self,
        ride_id: &str,
    ) -> impl Future<Output = Result<Vec<Participant>, ApiError>> + Send;

    fn fetch_upcoming(
        &self,
        filter: &UpcomingFilter,
    ) -> impl Future<Output = Result<Vec<Ride>, ApiError>> + Send;
}

/// API client for the ride service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Check if response is successful, classifying the body into an error if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Issue one GET against `endpoint` and decode the JSON body.
    /// No retries here; retry is the query cache's policy.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Request failed to send");
                ApiError::Network(e.to_string())
            })?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            ApiError::Decode(format!("{} ({})", e, endpoint))
        })
    }
}

/// Path segment for a ride id, percent-encoded
fn ride_path(id: &str) -> String {
    format!("/api/rides/{}", urlencoding::encode(id))
}

impl RideService for ApiClient {
    /// Fetch a single ride, with its route embedded when the service has one
    async fn fetch_ride(&self, id: &str) -> Result<Ride, ApiError> {
        self.request(&ride_path(id)).await
    }

    /// Fetch the participant list of a ride, in service order
    async fn fetch_participants(&self, ride_id: &str) -> Result<Vec<Participant>, ApiError> {
        self.request(&format!("{}/participants", ride_path(ride_id)))
            .await
    }

    /// Fetch upcoming rides, optionally near a point
    async fn fetch_upcoming(&self, filter: &UpcomingFilter) -> Result<Vec<Ride>, ApiError> {
        self.request(&format!("/api/rides/upcoming{}", filter.query_string()))
            .await
    }
}
