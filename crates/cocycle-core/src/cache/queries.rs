use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiError, RideService, UpcomingFilter};
use crate::models::{Participant, Ride};

use super::{ride_keys, QueryCache, QueryOptions};

/// Ride detail changes rarely once published.
pub const RIDE_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Participants join and leave more often than ride details change.
pub const PARTICIPANTS_STALE_TIME: Duration = Duration::from_secs(2 * 60);

pub const UPCOMING_STALE_TIME: Duration = Duration::from_secs(2 * 60);

/// Cached ride reads: a `RideService` behind a shared `QueryCache`.
pub struct RideQueries<S> {
    service: Arc<S>,
    cache: QueryCache,
}

impl<S> Clone for RideQueries<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: self.cache.clone(),
        }
    }
}

impl<S: RideService> RideQueries<S> {
    pub fn new(service: S, cache: QueryCache) -> Self {
        Self {
            service: Arc::new(service),
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Single ride by id
    pub async fn ride(&self, id: &str) -> Result<Arc<Ride>, ApiError> {
        let service = Arc::clone(&self.service);
        let id = id.to_string();
        self.cache
            .fetch(
                ride_keys::detail(&id),
                QueryOptions::stale_after(RIDE_STALE_TIME),
                move || {
                    let service = Arc::clone(&service);
                    let id = id.clone();
                    async move { service.fetch_ride(&id).await }
                },
            )
            .await
    }

    /// Participant list of a ride, in service order
    pub async fn participants(&self, ride_id: &str) -> Result<Arc<Vec<Participant>>, ApiError> {
        let service = Arc::clone(&self.service);
        let ride_id = ride_id.to_string();
        self.cache
            .fetch(
                ride_keys::participants(&ride_id),
                QueryOptions::stale_after(PARTICIPANTS_STALE_TIME),
                move || {
                    let service = Arc::clone(&service);
                    let ride_id = ride_id.clone();
                    async move { service.fetch_participants(&ride_id).await }
                },
            )
            .await
    }

    /// Upcoming rides, optionally filtered by location
    pub async fn upcoming(&self, filter: UpcomingFilter) -> Result<Arc<Vec<Ride>>, ApiError> {
        let service = Arc::clone(&self.service);
        self.cache
            .fetch(
                ride_keys::upcoming(&filter),
                QueryOptions::stale_after(UPCOMING_STALE_TIME),
                move || {
                    let service = Arc::clone(&service);
                    async move { service.fetch_upcoming(&filter).await }
                },
            )
            .await
    }

    /// Drop the cached ride and its participants so the next read refetches
    pub async fn invalidate_ride(&self, id: &str) -> usize {
        self.cache.invalidate_prefix(&ride_keys::detail(id)).await
    }
}
